//! Styling and theming for the application.

mod theme;
pub mod widgets;

pub use theme::iced_theme;
