//! Mapping from the saved theme name to the toolkit theme.

use maillist_core::ThemeName;

/// Toolkit theme used for widgets without a custom style.
#[must_use]
pub const fn iced_theme(theme: ThemeName) -> iced::Theme {
    match theme {
        ThemeName::Dark => iced::Theme::Dark,
        ThemeName::Light | ThemeName::Default => iced::Theme::Light,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_maps_to_dark() {
        assert_eq!(iced_theme(ThemeName::Dark), iced::Theme::Dark);
        assert_eq!(iced_theme(ThemeName::Default), iced::Theme::Light);
    }
}
