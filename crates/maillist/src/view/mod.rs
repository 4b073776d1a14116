//! View components for the application.

mod console;
mod form;
mod notice;
mod toolbar;

pub use console::{view_console, view_progress};
pub use form::view_form;
pub use notice::view_notice;
pub use toolbar::{ToolbarState, view_toolbar};
