//! Button styles, one per place a button appears.

use iced::widget::button::{Status, Style};
use iced::{Background, Border, Color};

use super::palette::{self, Palette};
use super::shadows::{self, radius};

/// Solid button in `fill`; darkens on press, goes flat when disabled.
fn filled(p: &Palette, fill: Color, status: Status) -> Style {
    let (background, shadow) = match status {
        Status::Active => (fill, shadows::glow(fill)),
        Status::Hovered => (Color { a: 0.85, ..fill }, shadows::glow_strong(fill)),
        Status::Pressed => (
            Color::from_rgb(fill.r * 0.8, fill.g * 0.8, fill.b * 0.8),
            shadows::subtle(),
        ),
        Status::Disabled => (p.border_medium, shadows::none()),
    };

    Style {
        background: Some(Background::Color(background)),
        text_color: if status == Status::Disabled {
            p.text_muted
        } else {
            p.text_on_primary
        },
        border: Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius: radius::MEDIUM.into(),
        },
        shadow,
        snap: false,
    }
}

/// Send button: green once there is an account to send from.
pub fn send_button_style(_theme: &iced::Theme, status: Status) -> Style {
    let p = palette::current();
    filled(&p, p.accent_green, status)
}

/// Outlined toolbar action; the outline picks up the brand color on hover.
pub fn toolbar_button_style(_theme: &iced::Theme, status: Status) -> Style {
    let p = palette::current();

    let (outline, text_color, background) = match status {
        Status::Active => (p.border_medium, p.text_primary, p.surface),
        Status::Hovered => (p.primary, p.primary, p.surface),
        Status::Pressed => (p.primary_dark, p.primary_dark, p.selected),
        Status::Disabled => (p.border_subtle, p.text_muted, p.surface),
    };

    Style {
        background: Some(Background::Color(background)),
        text_color,
        border: Border {
            color: outline,
            width: 1.0,
            radius: radius::MEDIUM.into(),
        },
        shadow: shadows::none(),
        snap: false,
    }
}

/// Small chip for the console and progress bar controls.
pub fn console_button_style(_theme: &iced::Theme, status: Status) -> Style {
    let p = palette::current();

    let background = match status {
        Status::Hovered => p.hover,
        Status::Pressed => p.selected,
        Status::Active | Status::Disabled => p.surface_sunken,
    };

    Style {
        background: Some(Background::Color(background)),
        text_color: if status == Status::Disabled {
            p.text_muted
        } else {
            p.text_secondary
        },
        border: Border {
            color: p.border_subtle,
            width: 1.0,
            radius: radius::SMALL.into(),
        },
        shadow: shadows::none(),
        snap: false,
    }
}

/// Notice banner buttons, tinted with the banner's accent.
///
/// `confirm` selects the filled OK button; otherwise the outlined Cancel.
pub fn notice_button_style(alert: bool, confirm: bool) -> impl Fn(&iced::Theme, Status) -> Style {
    move |_theme, status| notice_button(&palette::current(), alert, confirm, status)
}

fn notice_button(p: &Palette, alert: bool, confirm: bool, status: Status) -> Style {
    let accent = if alert { p.accent_red } else { p.accent_yellow };

    if confirm {
        return Style {
            text_color: p.background,
            ..filled(p, accent, status)
        };
    }

    let background = match status {
        Status::Hovered | Status::Pressed => Color { a: 0.2, ..accent },
        Status::Active | Status::Disabled => Color::TRANSPARENT,
    };
    Style {
        background: Some(Background::Color(background)),
        text_color: p.text_primary,
        border: Border {
            color: accent,
            width: 1.0,
            radius: radius::MEDIUM.into(),
        },
        shadow: shadows::none(),
        snap: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_button_flat_when_disabled() {
        let p = Palette::light();
        let active = filled(&p, p.accent_green, Status::Active);
        let disabled = filled(&p, p.accent_green, Status::Disabled);

        assert_eq!(active.background, Some(Background::Color(p.accent_green)));
        assert_eq!(disabled.background, Some(Background::Color(p.border_medium)));
        assert_eq!(disabled.shadow, shadows::none());
        assert_eq!(disabled.text_color, p.text_muted);
    }

    #[test]
    fn test_notice_buttons_follow_accent() {
        let p = Palette::dark();

        let alert_cancel = notice_button(&p, true, false, Status::Active);
        assert_eq!(alert_cancel.border.color, p.accent_red);
        assert_eq!(alert_cancel.background, Some(Background::Color(Color::TRANSPARENT)));

        let question_ok = notice_button(&p, false, true, Status::Active);
        assert_eq!(question_ok.background, Some(Background::Color(p.accent_yellow)));
        assert_eq!(question_ok.text_color, p.background);
    }
}
