//! Application state driven by the interface.
//!
//! The controller never blocks: authorization and sending are submitted to
//! the [`TaskRunner`], and [`Controller::poll`] folds their events back into
//! the console, progress bar and flags.

use crate::auth::{Authenticator, Backend};
use crate::batch::{BatchSummary, parse_recipients, send_batch};
use crate::compose::{BodyKind, Message};
use crate::config::ThemeName;
use crate::error::Error;
use crate::gmail::{ME, Profile};
use crate::sender::{Emailer, SendOutcome};
use crate::task::{Progress, TaskEvent, TaskHandle, TaskId, TaskRunner};
use std::path::PathBuf;
use tracing::info;

/// Window title before authorization.
pub const APP_TITLE: &str = "MailList";

/// Snapshot of the compose form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Newline-separated recipient addresses.
    pub recipients: String,
    /// Selected body kind, if any.
    pub body_kind: Option<BodyKind>,
}

/// Prompt waiting for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// An authorization is already in flight; confirm to start another.
    AuthorizationRunning {
        /// Tasks running in the pool.
        active: usize,
        /// Pool size.
        capacity: usize,
    },
    /// No client registration file.
    CredentialsMissing(PathBuf),
    /// Subject, body or recipients left empty.
    FormIncomplete,
    /// No body kind selected.
    InvalidBodyKind,
}

impl Notice {
    /// Returns true if the notice offers a choice rather than just OK.
    #[must_use]
    pub const fn is_question(&self) -> bool {
        matches!(self, Self::AuthorizationRunning { .. })
    }

    /// Text shown to the user.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::AuthorizationRunning { active, capacity } => format!(
                "An authorization is already running ({active} of {capacity} workers busy). \
                 Start another one anyway?"
            ),
            Self::CredentialsMissing(path) => format!(
                "Client credentials not found. Download the OAuth client file from the \
                 Google Cloud console and save it as {}.",
                path.display()
            ),
            Self::FormIncomplete => Error::FormIncomplete.to_string(),
            Self::InvalidBodyKind => "Choose a body type: plain or html.".to_string(),
        }
    }
}

/// Progress bar state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressBar {
    /// Lower bound.
    pub min: usize,
    /// Upper bound.
    pub max: usize,
    /// Current value.
    pub value: usize,
}

impl ProgressBar {
    /// A bar from zero to `max`.
    #[must_use]
    pub const fn new(max: usize) -> Self {
        Self { min: 0, max, value: 0 }
    }

    /// Moves one step forward, stopping at `max`.
    pub fn advance(&mut self) {
        self.value = (self.value + 1).min(self.max);
    }

    /// Completed fraction in `0.0..=1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f32 {
        let span = self.max.saturating_sub(self.min);
        if span == 0 {
            return 0.0;
        }
        self.value.saturating_sub(self.min) as f32 / span as f32
    }
}

/// What an authorization task hands back.
#[derive(Debug)]
pub enum AuthOutcome<B: Backend> {
    /// Authorized; the authenticator now holds the session.
    Authorized(Box<Authenticator<B>>),
    /// No client registration file at this path.
    CredentialsMissing(PathBuf),
}

type AuthHandle<B> = TaskHandle<AuthOutcome<B>, String>;
type SendHandle = TaskHandle<BatchSummary, SendOutcome>;

/// Interface-independent application state.
#[derive(Debug)]
pub struct Controller<B: Backend> {
    runner: TaskRunner,
    authenticator: Authenticator<B>,
    authorized: bool,
    console: Vec<String>,
    progress: ProgressBar,
    notice: Option<Notice>,
    pending_restart: bool,
    theme: ThemeName,
    title: String,
    auth_tasks: Vec<AuthHandle<B>>,
    send_tasks: Vec<SendHandle>,
}

impl<B: Backend> Controller<B> {
    /// Creates an idle controller; see [`Controller::start`].
    #[must_use]
    pub fn new(runner: TaskRunner, authenticator: Authenticator<B>, theme: ThemeName) -> Self {
        Self {
            runner,
            authenticator,
            authorized: false,
            console: Vec::new(),
            progress: ProgressBar::default(),
            notice: None,
            pending_restart: false,
            theme,
            title: APP_TITLE.to_string(),
            auth_tasks: Vec::new(),
            send_tasks: Vec::new(),
        }
    }

    /// Reports the pool size and starts the first authorization.
    pub fn start(&mut self) {
        self.log(format!(
            "{} threads available for multi-threading",
            self.runner.capacity()
        ));
        self.start_authorize(false);
    }

    /// True while a batch is in flight.
    #[must_use]
    pub fn is_sending(&self) -> bool {
        !self.send_tasks.is_empty()
    }

    /// True while an authorization is in flight.
    #[must_use]
    pub fn is_authorizing(&self) -> bool {
        !self.auth_tasks.is_empty()
    }

    /// True once an authorization has succeeded.
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        self.authorized
    }

    /// Authorized account, if any.
    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        self.authenticator.profile()
    }

    /// Console lines, oldest first.
    #[must_use]
    pub fn console(&self) -> &[String] {
        &self.console
    }

    /// Progress bar state.
    #[must_use]
    pub const fn progress(&self) -> ProgressBar {
        self.progress
    }

    /// Pending notice.
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Current theme.
    #[must_use]
    pub const fn theme(&self) -> ThemeName {
        self.theme
    }

    /// Window title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Appends a console line.
    pub fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        info!("{line}");
        self.console.push(line);
    }

    /// Notes that the compose fields were emptied.
    pub fn fields_cleared(&mut self) {
        self.log("Fields Cleared");
    }

    /// Empties the console.
    pub fn clear_console(&mut self) {
        self.console.clear();
    }

    /// Switches to the next theme.
    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        self.log(format!("Setting GUI theme to \"{}\"", self.theme));
    }

    /// Starts an authorization.
    ///
    /// With one already in flight and `confirmed` false, raises
    /// [`Notice::AuthorizationRunning`] instead.
    pub fn start_authorize(&mut self, confirmed: bool) {
        self.authorize(confirmed, false);
    }

    /// Discards the cached token and authorizes from scratch.
    ///
    /// The token is moved aside by the submitted task, so while another
    /// authorization is in flight nothing is removed until the raised
    /// notice is confirmed. Dismissing it keeps the token.
    pub fn force_authorize(&mut self) {
        self.log("Re-authorizing . . .");
        self.authorize(false, true);
    }

    fn authorize(&mut self, confirmed: bool, restart: bool) {
        if self.is_authorizing() && !confirmed {
            self.pending_restart = restart;
            self.notice = Some(Notice::AuthorizationRunning {
                active: self.runner.active_count(),
                capacity: self.runner.capacity(),
            });
            return;
        }

        self.log("Authorizing . . .");
        let authenticator = self.authenticator.clone();
        let handle = self.runner.submit(move |progress| {
            run_authorization(authenticator, restart, progress)
        });
        self.auth_tasks.push(handle);
    }

    /// Accepts the pending notice.
    pub fn confirm_notice(&mut self) {
        if let Some(Notice::AuthorizationRunning { .. }) = self.notice.take() {
            let restart = std::mem::take(&mut self.pending_restart);
            self.authorize(true, restart);
        }
    }

    /// Declines the pending notice.
    pub fn dismiss_notice(&mut self) {
        if let Some(Notice::AuthorizationRunning { .. }) = self.notice.take() {
            self.pending_restart = false;
            self.log("Re-authorization cancelled.");
        }
    }

    /// Validates the form and submits a batch send.
    pub fn send(&mut self, form: &Form) {
        if self.is_sending() {
            self.log("Already sending, wait for the current batch to finish.");
            return;
        }
        if !self.authorized {
            self.log("Not authorized. Press Authorize first.");
            return;
        }

        let recipients = parse_recipients(&form.recipients);
        let Some(first) = recipients.first() else {
            self.notice = Some(Notice::FormIncomplete);
            return;
        };
        if form.subject.trim().is_empty() || form.body.trim().is_empty() {
            self.notice = Some(Notice::FormIncomplete);
            return;
        }
        let Some(body_kind) = form.body_kind else {
            self.notice = Some(Notice::InvalidBodyKind);
            return;
        };

        let sender = self
            .profile()
            .map_or_else(|| ME.to_string(), |p| p.email_address.clone());
        let message = match Message::create(first, sender, &form.subject, &form.body, body_kind) {
            Ok(message) => message,
            Err(e) => {
                self.log(format!("ERROR: {e}"));
                return;
            }
        };

        self.progress = ProgressBar::new(recipients.len());
        self.log(format!("Sending to {} recipients . . .", recipients.len()));

        let client = self.authenticator.client().cloned();
        let handle = self
            .runner
            .submit(move |progress: Progress<SendOutcome>| async move {
                let mut emailer = Emailer::new(client, message);
                let summary = send_batch(&mut emailer, recipients, |outcome| {
                    progress.emit(outcome);
                })
                .await;
                anyhow::Ok(summary)
            });
        self.send_tasks.push(handle);
    }

    /// Resets the progress bar unless a batch is in flight.
    pub fn reset_progress(&mut self) {
        if self.is_sending() {
            self.log("Cannot reset progress while sending.");
            return;
        }
        self.progress = ProgressBar::default();
    }

    /// Applies every pending task event. Returns true if anything changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;

        let mut auth_tasks = std::mem::take(&mut self.auth_tasks);
        for handle in &mut auth_tasks {
            let id = handle.id();
            for event in handle.drain() {
                changed = true;
                self.apply_auth_event(id, event);
            }
        }
        auth_tasks.retain(|handle| !handle.is_finished());
        self.auth_tasks = auth_tasks;

        let mut send_tasks = std::mem::take(&mut self.send_tasks);
        for handle in &mut send_tasks {
            let id = handle.id();
            for event in handle.drain() {
                changed = true;
                self.apply_send_event(id, event);
            }
        }
        send_tasks.retain(|handle| !handle.is_finished());
        self.send_tasks = send_tasks;

        changed
    }

    fn apply_auth_event(&mut self, id: TaskId, event: TaskEvent<AuthOutcome<B>, String>) {
        match event {
            TaskEvent::Progress(line) => self.log(line),
            TaskEvent::Result(AuthOutcome::Authorized(authenticator)) => {
                self.authenticator = *authenticator;
                self.authorized = true;
                if let Some(email) = self.profile().map(|p| p.email_address.clone()) {
                    self.title = format!("{APP_TITLE} - {email}");
                    self.log(format!("Authorized as {email}"));
                }
            }
            TaskEvent::Result(AuthOutcome::CredentialsMissing(path)) => {
                self.authenticator.forget();
                self.authorized = false;
                self.title = APP_TITLE.to_string();
                self.log(format!("ERROR: no client credentials at {}", path.display()));
                self.notice = Some(Notice::CredentialsMissing(path));
            }
            TaskEvent::Error(failure) => self.log(format!("ERROR: {failure}")),
            TaskEvent::Finished => self.log(format!("Authorization thread {id} completed")),
        }
    }

    fn apply_send_event(&mut self, id: TaskId, event: TaskEvent<BatchSummary, SendOutcome>) {
        match event {
            TaskEvent::Progress(outcome) => {
                self.progress.advance();
                self.log(outcome.to_string());
            }
            TaskEvent::Result(summary) => self.log(format!(
                "Sent {} of {} messages",
                summary.sent,
                summary.total()
            )),
            TaskEvent::Error(failure) => self.log(format!("ERROR: {failure}")),
            TaskEvent::Finished => self.log(format!("Send thread {id} completed")),
        }
    }
}

/// Body of an authorization task; runs on the worker pool.
async fn run_authorization<B: Backend>(
    mut authenticator: Authenticator<B>,
    restart: bool,
    progress: Progress<String>,
) -> anyhow::Result<AuthOutcome<B>> {
    if restart && let Some(archived) = authenticator.remove().await? {
        progress.emit(format!("Old token moved to {}", archived.display()));
    }
    progress.emit("Waiting for the browser login . . .");

    match authenticator.start().await {
        Ok(_) => Ok(AuthOutcome::Authorized(Box::new(authenticator))),
        Err(Error::ConfigurationMissing(path)) => Ok(AuthOutcome::CredentialsMissing(path)),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::compose::RawMessage;
    use crate::gmail::{ApiError, MailApi, Receipt};
    use maillist_oauth::{ClientSecrets, Token};

    /// Backend that is never expected to be reached.
    #[derive(Debug, Clone)]
    struct Offline;

    impl MailApi for Offline {
        async fn get_profile(&self) -> Result<Profile, ApiError> {
            Err(ApiError::Transport("offline".into()))
        }

        async fn send(&self, _: &str, _: &RawMessage) -> Result<Receipt, ApiError> {
            Err(ApiError::Transport("offline".into()))
        }
    }

    impl Backend for Offline {
        type Client = Self;

        async fn authorize(&self, _: &ClientSecrets) -> crate::Result<Token> {
            Err(Error::AuthorizationIncomplete("offline".into()))
        }

        async fn refresh(&self, _: &ClientSecrets, _: &Token) -> crate::Result<Token> {
            Err(Error::AuthorizationIncomplete("offline".into()))
        }

        fn connect(&self, _: &Token) -> crate::Result<Self> {
            Ok(Self)
        }
    }

    fn controller() -> Controller<Offline> {
        let runner = TaskRunner::new(tokio::runtime::Handle::current(), 2);
        let dir = std::env::temp_dir().join("maillist-controller-unit");
        let authenticator = Authenticator::new(
            Offline,
            dir.join("credentials.json"),
            dir.join("token.json"),
        );
        Controller::new(runner, authenticator, ThemeName::Dark)
    }

    fn form() -> Form {
        Form {
            subject: "Hi".into(),
            body: "Test".into(),
            recipients: "a@x.com\nb@x.com".into(),
            body_kind: Some(BodyKind::Plain),
        }
    }

    #[test]
    fn test_progress_bar() {
        let mut bar = ProgressBar::new(2);
        assert_eq!(bar.fraction(), 0.0);
        bar.advance();
        assert_eq!(bar.fraction(), 0.5);
        bar.advance();
        bar.advance();
        assert_eq!(bar.value, 2);
        assert_eq!(ProgressBar::default().fraction(), 0.0);
    }

    #[tokio::test]
    async fn test_theme_cycle_logs() {
        let mut controller = controller();
        controller.cycle_theme();
        controller.cycle_theme();
        controller.cycle_theme();

        assert_eq!(controller.theme(), ThemeName::Dark);
        assert_eq!(
            controller.console(),
            [
                "Setting GUI theme to \"light\"",
                "Setting GUI theme to \"default\"",
                "Setting GUI theme to \"dark\"",
            ]
        );
        controller.clear_console();
        assert!(controller.console().is_empty());
    }

    #[tokio::test]
    async fn test_fields_cleared_logs() {
        let mut controller = controller();
        controller.fields_cleared();
        assert_eq!(controller.console(), ["Fields Cleared"]);
    }

    #[tokio::test]
    async fn test_send_requires_authorization() {
        let mut controller = controller();
        controller.send(&form());

        assert!(!controller.is_sending());
        assert_eq!(controller.console(), ["Not authorized. Press Authorize first."]);
    }

    #[tokio::test]
    async fn test_form_validation() {
        let mut controller = controller();
        controller.authorized = true;

        for incomplete in [
            Form { subject: " ".into(), ..form() },
            Form { body: String::new(), ..form() },
            Form { recipients: "\n \n".into(), ..form() },
        ] {
            controller.send(&incomplete);
            assert_eq!(controller.notice(), Some(&Notice::FormIncomplete));
            controller.dismiss_notice();
        }

        controller.send(&Form { body_kind: None, ..form() });
        assert_eq!(controller.notice(), Some(&Notice::InvalidBodyKind));
        assert!(!controller.is_sending());
        assert!(controller.console().is_empty());
    }

    #[tokio::test]
    async fn test_notice_text() {
        let notice = Notice::AuthorizationRunning { active: 1, capacity: 4 };
        assert!(notice.is_question());
        assert!(notice.text().contains("1 of 4"));
        assert!(!Notice::FormIncomplete.is_question());
    }

    #[tokio::test]
    async fn test_reset_progress_when_idle() {
        let mut controller = controller();
        controller.progress = ProgressBar { min: 0, max: 3, value: 3 };
        controller.reset_progress();
        assert_eq!(controller.progress(), ProgressBar::default());
    }
}
