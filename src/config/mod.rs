//! Harness configuration: option structs and the solver's XML template.

pub mod options;
pub mod template;

pub use options::{GenOptions, RunOptions};
pub use template::ConfigTemplate;
