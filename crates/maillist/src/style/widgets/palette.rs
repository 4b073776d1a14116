//! Color palettes for the three interface themes.
//!
//! Style functions read the active palette through [`current`], so switching
//! themes is a single [`set_theme`] call followed by a redraw.

use iced::Color;
use maillist_core::ThemeName;

/// Complete color palette for the application.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    // Primary brand colors
    pub primary: Color,
    pub primary_light: Color,
    pub primary_dark: Color,

    // Surface colors
    pub surface: Color,
    pub surface_sunken: Color,
    pub background: Color,

    // Text colors
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub text_on_primary: Color,

    // Accent colors
    pub accent_green: Color,
    pub accent_yellow: Color,
    pub accent_red: Color,

    // State colors
    pub selected: Color,
    pub hover: Color,

    // Border colors
    pub border_subtle: Color,
    pub border_medium: Color,

    // Shadow color
    pub shadow: Color,
}

impl Palette {
    /// Light palette: soft whites with a friendly blue.
    #[must_use]
    pub const fn light() -> Self {
        Self {
            primary: Color::from_rgb(0.0, 0.48, 0.95),
            primary_light: Color::from_rgb(0.35, 0.65, 1.0),
            primary_dark: Color::from_rgb(0.0, 0.38, 0.80),

            surface: Color::WHITE,
            surface_sunken: Color::from_rgb(0.97, 0.975, 0.99),
            background: Color::from_rgb(0.98, 0.985, 0.99),

            text_primary: Color::from_rgb(0.08, 0.10, 0.14),
            text_secondary: Color::from_rgb(0.42, 0.46, 0.54),
            text_muted: Color::from_rgb(0.60, 0.64, 0.70),
            text_on_primary: Color::WHITE,

            accent_green: Color::from_rgb(0.2, 0.75, 0.45),
            accent_yellow: Color::from_rgb(1.0, 0.75, 0.0),
            accent_red: Color::from_rgb(0.98, 0.28, 0.35),

            selected: Color::from_rgb(0.94, 0.97, 1.0),
            hover: Color::from_rgb(0.97, 0.98, 0.99),

            border_subtle: Color::from_rgb(0.92, 0.93, 0.95),
            border_medium: Color::from_rgb(0.86, 0.88, 0.91),

            shadow: Color::from_rgba(0.0, 0.0, 0.0, 0.04),
        }
    }

    /// Dark palette: terminal-style teal on charcoal.
    #[must_use]
    pub const fn dark() -> Self {
        Self {
            primary: Color::from_rgb(0.0, 1.0, 0.8), // #00FFCC
            primary_light: Color::from_rgb(0.2, 1.0, 0.85),
            primary_dark: Color::from_rgb(0.0, 0.8, 0.65),

            surface: Color::from_rgb(0.12, 0.13, 0.15),
            surface_sunken: Color::from_rgb(0.10, 0.11, 0.13),
            background: Color::from_rgb(0.08, 0.09, 0.11),

            text_primary: Color::from_rgb(0.92, 0.93, 0.95),
            text_secondary: Color::from_rgb(0.65, 0.68, 0.72),
            text_muted: Color::from_rgb(0.50, 0.53, 0.58),
            text_on_primary: Color::from_rgb(0.08, 0.09, 0.11),

            accent_green: Color::from_rgb(0.2, 0.9, 0.5),
            accent_yellow: Color::from_rgb(1.0, 0.85, 0.2),
            accent_red: Color::from_rgb(1.0, 0.35, 0.4),

            selected: Color::from_rgb(0.10, 0.18, 0.20),
            hover: Color::from_rgb(0.14, 0.15, 0.17),

            border_subtle: Color::from_rgb(0.20, 0.21, 0.24),
            border_medium: Color::from_rgb(0.28, 0.29, 0.32),

            shadow: Color::from_rgba(0.0, 0.0, 0.0, 0.20),
        }
    }

    /// Plain gray palette close to the toolkit's stock look.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            primary: Color::from_rgb(0.18, 0.45, 0.92),
            primary_light: Color::from_rgb(0.35, 0.58, 0.98),
            primary_dark: Color::from_rgb(0.12, 0.35, 0.78),

            surface: Color::WHITE,
            surface_sunken: Color::from_rgb(0.92, 0.925, 0.94),
            background: Color::from_rgb(0.945, 0.95, 0.96),

            text_primary: Color::from_rgb(0.10, 0.12, 0.16),
            text_secondary: Color::from_rgb(0.40, 0.44, 0.52),
            text_muted: Color::from_rgb(0.58, 0.62, 0.68),
            text_on_primary: Color::WHITE,

            accent_green: Color::from_rgb(0.15, 0.68, 0.38),
            accent_yellow: Color::from_rgb(0.92, 0.70, 0.0),
            accent_red: Color::from_rgb(0.88, 0.22, 0.28),

            selected: Color::from_rgb(0.92, 0.95, 1.0),
            hover: Color::from_rgb(0.96, 0.97, 0.99),

            border_subtle: Color::from_rgb(0.90, 0.91, 0.93),
            border_medium: Color::from_rgb(0.84, 0.86, 0.89),

            shadow: Color::from_rgba(0.0, 0.0, 0.0, 0.06),
        }
    }

    /// Gets the palette for a theme.
    #[must_use]
    pub const fn for_theme(theme: ThemeName) -> Self {
        match theme {
            ThemeName::Light => Self::light(),
            ThemeName::Dark => Self::dark(),
            ThemeName::Default => Self::plain(),
        }
    }
}

/// Current active palette.
pub static CURRENT: std::sync::LazyLock<std::sync::RwLock<Palette>> =
    std::sync::LazyLock::new(|| std::sync::RwLock::new(Palette::dark()));

/// Sets the current global palette.
pub fn set_theme(theme: ThemeName) {
    if let Ok(mut palette) = CURRENT.write() {
        *palette = Palette::for_theme(theme);
    }
}

/// Gets a copy of the current palette.
#[must_use]
pub fn current() -> Palette {
    CURRENT.read().map_or_else(|_| Palette::dark(), |p| *p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_theme_swaps_palette() {
        set_theme(ThemeName::Light);
        assert_eq!(current().background, Palette::light().background);

        set_theme(ThemeName::Default);
        assert_eq!(current().background, Palette::plain().background);

        set_theme(ThemeName::Dark);
        assert_eq!(current().primary, Palette::dark().primary);
    }
}
