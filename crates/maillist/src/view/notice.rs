//! Banner for a notice waiting on the user.

use iced::widget::{Space, button, container, row, text};
use iced::{Alignment, Element, Length};

use maillist_core::Notice;

use crate::message::Message;
use crate::style::widgets::{notice_button_style, notice_style};

/// Renders `notice` with OK, plus Cancel when it asks a question.
pub fn view_notice(notice: &Notice) -> Element<'static, Message> {
    let alert = matches!(notice, Notice::CredentialsMissing(_));

    let ok = button(text("OK").size(13))
        .padding([6, 16])
        .style(notice_button_style(alert, true))
        .on_press(Message::ConfirmNotice);

    let mut content = row![
        text(notice.text()).size(14).width(Length::Fill),
        Space::new().width(12),
        ok,
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    if notice.is_question() {
        content = content.push(
            button(text("Cancel").size(13))
                .padding([6, 16])
                .style(notice_button_style(alert, false))
                .on_press(Message::DismissNotice),
        );
    }

    container(content)
        .width(Length::Fill)
        .padding([10, 16])
        .style(notice_style(alert))
        .into()
}
