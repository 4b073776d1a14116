//! `MailList` - send one message to a list of recipients through Gmail.
//!
//! Built with Rust and the iced GUI framework. Authorization and sending run
//! on a background worker pool; the window drains their events on a timer.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod message;
mod style;
mod view;

use std::time::Duration;

use iced::widget::{column, container, text_editor};
use iced::{Element, Length, Subscription, Task};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use maillist_core::{
    Authenticator, BodyKind, Controller, Form, GmailBackend, Settings, TaskRunner,
};

use message::Message;
use style::widgets::{background_style, palette};
use view::ToolbarState;

/// How often the window drains background task events.
const TICK: Duration = Duration::from_millis(100);

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maillist=debug,maillist_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting MailList");

    // Worker pool runtime; lives until the window closes
    let runtime = tokio::runtime::Runtime::new()?;
    let settings = runtime.block_on(Settings::load()).unwrap_or_else(|e| {
        warn!("Could not load settings, using defaults: {e}");
        Settings::default()
    });
    let handle = runtime.handle().clone();

    iced::application(
        move || (MailList::new(settings.clone(), handle.clone()), Task::none()),
        MailList::update,
        MailList::view,
    )
    .title(MailList::title)
    .theme(MailList::theme)
    .subscription(MailList::subscription)
    .run()?;

    Ok(())
}

/// Main application state.
struct MailList {
    /// Authorization, sending and console state.
    controller: Controller<GmailBackend>,
    /// Settings as loaded; the theme is written back on change.
    settings: Settings,
    /// Subject line.
    subject: String,
    /// Body editor.
    body: text_editor::Content,
    /// Recipients editor, one address per line.
    recipients: text_editor::Content,
    /// Selected body type.
    body_kind: Option<BodyKind>,
    /// Whether console lines wrap.
    console_wrap: bool,
}

impl MailList {
    fn new(settings: Settings, handle: tokio::runtime::Handle) -> Self {
        let runner = settings.pool_size.map_or_else(
            || TaskRunner::with_available_parallelism(handle.clone()),
            |size| TaskRunner::new(handle.clone(), size),
        );

        let authenticator = Authenticator::new(
            GmailBackend::new(settings.login_timeout()),
            settings.credentials_path.clone(),
            settings.token_path.clone(),
        );

        palette::set_theme(settings.theme);
        let mut controller = Controller::new(runner, authenticator, settings.theme);
        controller.start();

        Self {
            controller,
            settings,
            subject: String::new(),
            body: text_editor::Content::new(),
            recipients: text_editor::Content::new(),
            body_kind: Some(BodyKind::Plain),
            console_wrap: true,
        }
    }

    /// Snapshot of the compose form for the controller.
    fn form(&self) -> Form {
        Form {
            subject: self.subject.clone(),
            body: self.body.text().trim_end_matches('\n').to_string(),
            recipients: self.recipients.text(),
            body_kind: self.body_kind,
        }
    }

    /// Update state based on message.
    #[allow(clippy::needless_pass_by_value)]
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SubjectChanged(subject) => self.subject = subject,
            Message::BodyEdited(action) => self.body.perform(action),
            Message::RecipientsEdited(action) => self.recipients.perform(action),
            Message::BodyKindSelected(kind) => self.body_kind = Some(kind),
            Message::ClearFields => {
                self.subject.clear();
                self.body = text_editor::Content::new();
                self.recipients = text_editor::Content::new();
                self.controller.fields_cleared();
            }
            Message::Send => {
                let form = self.form();
                self.controller.send(&form);
            }
            Message::Authorize => self.controller.start_authorize(false),
            Message::ForceAuthorize => self.controller.force_authorize(),
            Message::CycleTheme => {
                self.controller.cycle_theme();
                let theme = self.controller.theme();
                palette::set_theme(theme);
                self.settings.theme = theme;
                return Task::perform(save_settings(self.settings.clone()), Message::SettingsSaved);
            }
            Message::ConfirmNotice => self.controller.confirm_notice(),
            Message::DismissNotice => self.controller.dismiss_notice(),
            Message::ClearConsole => self.controller.clear_console(),
            Message::ToggleConsoleWrap => self.console_wrap = !self.console_wrap,
            Message::ResetProgress => self.controller.reset_progress(),
            Message::Tick => {
                self.controller.poll();
            }
            Message::SettingsSaved(Ok(())) => {}
            Message::SettingsSaved(Err(e)) => {
                self.controller.log(format!("ERROR: could not save settings: {e}"));
            }
        }
        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        let toolbar = view::view_toolbar(ToolbarState {
            account: self
                .controller
                .profile()
                .map(|profile| profile.email_address.as_str()),
            sending: self.controller.is_sending(),
            authorizing: self.controller.is_authorizing(),
            theme: self.controller.theme(),
        });

        let mut content = column![].spacing(12).padding(16);
        if let Some(notice) = self.controller.notice() {
            content = content.push(view::view_notice(notice));
        }
        content = content
            .push(view::view_form(
                &self.subject,
                &self.body,
                &self.recipients,
                self.body_kind,
            ))
            .push(view::view_progress(
                self.controller.progress(),
                self.controller.is_sending(),
            ))
            .push(view::view_console(self.controller.console(), self.console_wrap));

        container(column![toolbar, content.height(Length::Fill)])
            .width(Length::Fill)
            .height(Length::Fill)
            .style(background_style)
            .into()
    }

    fn title(&self) -> String {
        self.controller.title().to_string()
    }

    fn theme(&self) -> iced::Theme {
        style::iced_theme(self.controller.theme())
    }

    fn subscription(&self) -> Subscription<Message> {
        iced::time::every(TICK).map(|_| Message::Tick)
    }
}

/// Save application settings to file.
async fn save_settings(settings: Settings) -> Result<(), String> {
    settings.save().await.map_err(|e| e.to_string())
}
