//! Output formatting for CLI.

mod json;
mod progress;
mod text;

pub use json::JsonOutput;
pub use progress::Spinner;
pub use text::TextOutput;
