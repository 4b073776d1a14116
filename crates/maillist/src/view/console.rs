//! Console log and progress bar.

use iced::widget::text::Wrapping;
use iced::widget::{Column, Space, button, column, container, progress_bar, row, scrollable, text};
use iced::{Alignment, Element, Length};

use maillist_core::ProgressBar;

use crate::message::Message;
use crate::style::widgets::{console_button_style, console_style, palette, scrollable_style};

/// Renders the console with its controls.
pub fn view_console(lines: &[String], wrap: bool) -> Element<'_, Message> {
    let p = palette::current();
    let wrapping = if wrap { Wrapping::Word } else { Wrapping::None };

    let log = lines.iter().fold(Column::new().spacing(2), |log, line| {
        let color = if line.starts_with("ERROR") || line.contains("Error!") {
            p.accent_red
        } else {
            p.text_secondary
        };
        log.push(
            text(line.as_str())
                .size(13)
                .font(iced::Font::MONOSPACE)
                .wrapping(wrapping)
                .color(color),
        )
    });

    let controls = row![
        text("Console").size(13).color(p.text_secondary),
        Space::new().width(Length::Fill),
        button(text(if wrap { "Wrap: on" } else { "Wrap: off" }).size(12))
            .padding([4, 10])
            .style(console_button_style)
            .on_press(Message::ToggleConsoleWrap),
        button(text("Clear").size(12))
            .padding([4, 10])
            .style(console_button_style)
            .on_press(Message::ClearConsole),
    ]
    .spacing(6)
    .align_y(Alignment::Center);

    let body = container(
        scrollable(log.width(Length::Fill))
            .anchor_bottom()
            .height(Length::Fill)
            .style(scrollable_style),
    )
    .padding(10)
    .height(Length::Fill)
    .style(console_style);

    column![controls, body]
        .spacing(6)
        .height(Length::FillPortion(2))
        .into()
}

/// Renders the progress bar with its reset button.
#[allow(clippy::cast_precision_loss)]
pub fn view_progress(progress: ProgressBar, sending: bool) -> Element<'static, Message> {
    let p = palette::current();
    let (min, max) = (progress.min as f32, progress.max.max(progress.min + 1) as f32);

    let caption = text(format!("{} / {}", progress.value, progress.max))
        .size(12)
        .color(p.text_muted);

    row![
        progress_bar(min..=max, progress.value as f32),
        caption,
        button(text("Reset").size(12))
            .padding([4, 10])
            .style(console_button_style)
            .on_press_maybe((!sending).then_some(Message::ResetProgress)),
    ]
    .spacing(10)
    .align_y(Alignment::Center)
    .into()
}
