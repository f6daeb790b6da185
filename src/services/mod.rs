//! History rendering and the system calls around it

pub mod browser;
pub mod history;

pub use browser::open_in_browser;
pub use history::{render_history, write_history};
