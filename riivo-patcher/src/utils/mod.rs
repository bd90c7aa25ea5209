//! Shared utilities for the riivo-patcher CLI

pub mod format;
pub mod progress;
pub mod prompt;
pub mod tree;

pub use format::*;
pub use progress::*;
pub use prompt::*;
