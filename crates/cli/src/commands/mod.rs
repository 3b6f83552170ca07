//! CLI command implementations.

mod build;
mod compile;
mod helpers;
mod offline;
mod render;

pub use build::build;
pub use compile::compile;
pub use render::{render, AoiArgs};

#[cfg(test)]
mod tests;
