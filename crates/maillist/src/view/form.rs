//! Compose form: subject, body, recipients and body type.

use iced::widget::{column, container, radio, row, text, text_editor, text_input};
use iced::{Alignment, Element, Length};

use maillist_core::BodyKind;

use crate::message::Message;
use crate::style::widgets::{card_style, field_input_style, palette};

/// Renders the compose form.
pub fn view_form<'a>(
    subject: &'a str,
    body: &'a text_editor::Content,
    recipients: &'a text_editor::Content,
    body_kind: Option<BodyKind>,
) -> Element<'a, Message> {
    let subject_input = text_input("Subject", subject)
        .on_input(Message::SubjectChanged)
        .padding(10)
        .size(14)
        .style(field_input_style);

    let body_editor = text_editor(body)
        .placeholder("Message body")
        .on_action(Message::BodyEdited)
        .padding(10)
        .height(Length::Fill);

    let kinds = BodyKind::ALL.iter().fold(row![].spacing(16), |row, kind| {
        row.push(radio(kind.as_str(), *kind, body_kind, Message::BodyKindSelected).size(16))
    });

    let recipients_editor = text_editor(recipients)
        .placeholder("one@example.com\ntwo@example.com")
        .on_action(Message::RecipientsEdited)
        .padding(10)
        .height(Length::Fill);

    let message_column = column![
        label("Subject"),
        subject_input,
        label("Body"),
        body_editor,
        row![label("Body type"), kinds]
            .spacing(16)
            .align_y(Alignment::Center),
    ]
    .spacing(8)
    .width(Length::FillPortion(3));

    let recipients_column = column![label("Recipients, one per line"), recipients_editor]
        .spacing(8)
        .width(Length::FillPortion(2));

    container(row![message_column, recipients_column].spacing(16))
        .padding(16)
        .height(Length::FillPortion(3))
        .style(card_style)
        .into()
}

fn label(caption: &str) -> Element<'_, Message> {
    text(caption)
        .size(13)
        .color(palette::current().text_secondary)
        .into()
}
