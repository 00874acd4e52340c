pub mod agent;
pub mod conversation;
pub mod driver;
pub mod host;
pub mod tooling;
