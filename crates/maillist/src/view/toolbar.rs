//! Toolbar with the application actions.

use iced::widget::{Space, button, container, row, text};
use iced::{Alignment, Element, Length};

use maillist_core::ThemeName;

use crate::message::Message;
use crate::style::widgets::{palette, send_button_style, toolbar_button_style, toolbar_style};

/// What the toolbar needs to know about the controller.
#[derive(Debug, Clone, Copy)]
pub struct ToolbarState<'a> {
    /// Authorized account, if any.
    pub account: Option<&'a str>,
    /// A batch is in flight.
    pub sending: bool,
    /// An authorization is in flight.
    pub authorizing: bool,
    /// Active theme.
    pub theme: ThemeName,
}

/// Renders the toolbar.
pub fn view_toolbar(state: ToolbarState<'_>) -> Element<'static, Message> {
    let p = palette::current();

    let title = text("MailList")
        .size(22)
        .font(iced::Font {
            weight: iced::font::Weight::Bold,
            ..Default::default()
        })
        .color(p.primary);

    let status = match (state.account, state.authorizing) {
        (_, true) => text("Authorizing...").color(p.accent_yellow),
        (Some(email), false) => text(email.to_string()).color(p.accent_green),
        (None, false) => text("Not authorized").color(p.text_muted),
    }
    .size(13);

    let send = button(text(if state.sending { "Sending..." } else { "Send" }).size(14))
        .padding([8, 18])
        .style(send_button_style)
        .on_press_maybe((!state.sending && state.account.is_some()).then_some(Message::Send));

    let authorize = toolbar_button("Authorize", Message::Authorize);
    let reauthorize = toolbar_button("Re-authorize", Message::ForceAuthorize);
    let clear = toolbar_button("Clear fields", Message::ClearFields);
    let theme = toolbar_button(format!("Theme: {}", state.theme), Message::CycleTheme);

    let content = row![
        title,
        Space::new().width(16),
        status,
        Space::new().width(Length::Fill),
        authorize,
        reauthorize,
        clear,
        theme,
        send,
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .padding([10, 16])
        .style(toolbar_style)
        .into()
}

fn toolbar_button(label: impl Into<String>, message: Message) -> Element<'static, Message> {
    button(text(label.into()).size(13))
        .padding([8, 12])
        .style(toolbar_button_style)
        .on_press(message)
        .into()
}
