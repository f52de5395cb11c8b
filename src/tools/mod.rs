//! Tool synthesis and invocation.
//!
//! [`synthesize`] turns a [`Document`](crate::spec::Document) into one
//! [`ApiTool`] per operation, [`ToolRegistry`] indexes them by name, and
//! [`Invoker`] proxies a call to the underlying HTTP API.

pub mod invoker;
pub mod registry;
pub mod synthesizer;
pub mod types;

pub use invoker::{Invoker, PreparedRequest};
pub use registry::ToolRegistry;
pub use synthesizer::synthesize;
pub use types::{
    ApiTool, InvocationFailure, InvocationOutcome, ParamSource, ToolParameter, ERROR_MARKER,
};
