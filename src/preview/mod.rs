//! Everything shown to or asked of the user on the terminal.

pub mod prompt;
mod renderer;

pub use renderer::PreviewRenderer;
