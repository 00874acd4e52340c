mod directive;
mod errors;
mod instructions;
mod processor;
mod runtime;


pub use directive::AgentDirective;
pub use errors::{AgentError, ToolError};
pub use processor::{Agent, TurnProcessor};
