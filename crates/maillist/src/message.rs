//! Message types for application events.
//!
//! In the Elm architecture, Messages are events that trigger state changes.

use iced::widget::text_editor;
use maillist_core::BodyKind;

/// Application messages (events).
#[derive(Debug, Clone)]
pub enum Message {
    // Compose form
    /// Subject line edited.
    SubjectChanged(String),
    /// Body editor action.
    BodyEdited(text_editor::Action),
    /// Recipients editor action.
    RecipientsEdited(text_editor::Action),
    /// Plain or HTML radio selected.
    BodyKindSelected(BodyKind),
    /// Empty subject, body and recipients.
    ClearFields,

    // Toolbar
    /// Send the message to every recipient.
    Send,
    /// Authorize with the cached token or a browser login.
    Authorize,
    /// Discard the cached token and log in again.
    ForceAuthorize,
    /// Switch to the next theme.
    CycleTheme,

    // Notice banner
    /// OK on the pending notice.
    ConfirmNotice,
    /// Cancel on the pending notice.
    DismissNotice,

    // Console and progress
    /// Empty the console.
    ClearConsole,
    /// Toggle word wrap in the console.
    ToggleConsoleWrap,
    /// Reset the progress bar.
    ResetProgress,

    /// Periodic drain of background task events.
    Tick,
    /// Settings written to disk.
    SettingsSaved(Result<(), String>),
}
