mod toolset;
mod types;

pub use types::Cli;
