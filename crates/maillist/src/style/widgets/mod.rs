//! Widget styles that read the active palette.

#![allow(clippy::needless_update)] // Explicit struct updates for clarity

mod buttons;
mod containers;
mod inputs;
pub mod palette;
mod shadows;

pub use containers::{background_style, card_style, console_style, notice_style, toolbar_style};

pub use buttons::{
    console_button_style, notice_button_style, send_button_style, toolbar_button_style,
};

pub use inputs::{field_input_style, scrollable_style};
