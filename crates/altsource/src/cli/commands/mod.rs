//! CLI commands

mod inspect;
mod refresh;
mod status;

pub use inspect::InspectCommand;
pub use refresh::RefreshCommand;
pub use status::StatusCommand;
