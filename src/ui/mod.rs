//! Terminal control surface: start/pause/resume/stop with comment prompts

mod app;
mod prompt;
mod terminal_guard;
mod text_input;

pub use app::App;
pub use prompt::{Prompt, PromptKind};
pub use terminal_guard::{install_panic_hook, TerminalGuard};
pub use text_input::TextInputState;
