pub mod address;
pub mod model;
pub mod rpc;
pub mod store;
