//! Tool schema (what the model is told) and function registry (what actually runs).

mod registry;
mod schema;

pub use registry::{Dispatch, FunctionRegistry, HolidayArgs, ToolId, ToolOutput};
pub use schema::{ToolDescriptor, ToolSchema};
