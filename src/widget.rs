//! The widget controller: owns popup state, messages, the credential store,
//! and the task scheduler, and turns page events into transitions.
//!
//! Hosts feed [`UiEvent`]s through [`Widget::handle`], arm the timers returned
//! by [`Widget::take_timer_requests`], call [`Widget::fire`] when they elapse,
//! and honor [`Widget::take_navigation`]. Tests drive the same code with
//! [`Widget::advance`] instead of real timers.

use crate::auth::store::{CredentialStore, KeyValueStore};
use crate::auth::submit::{LoginForm, SignupForm, SubmitOutcome};
use crate::auth::validation::Field;
use crate::config::WidgetConfig;
use crate::messaging::{MessageKind, Messaging};
use crate::popup::{transition_for, Popup, PopupStateMachine, Transition, UiEvent};
use crate::scheduler::{Scheduler, TaskId, TimerRequest};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const LOGIN_PROMPT: &str = "Please enter your credentials to log in.";

/// Read access to the current input values of a popup's form.
pub trait FormFields {
    /// The field's raw value, or an empty string when the input is missing.
    fn value(&self, popup: Popup, field: Field) -> String;
}

/// Fixed field values, for native hosts and tests.
#[derive(Clone, Debug, Default)]
pub struct FormSnapshot {
    values: HashMap<(Popup, Field), String>,
}

impl FormSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, popup: Popup, field: Field, value: &str) -> Self {
        self.values.insert((popup, field), value.to_string());
        self
    }
}

impl FormFields for FormSnapshot {
    fn value(&self, popup: Popup, field: Field) -> String {
        self.values.get(&(popup, field)).cloned().unwrap_or_default()
    }
}

#[derive(Debug)]
pub(crate) enum Task {
    ExpireMessage {
        popup: Popup,
        expiry: CancellationToken,
    },
    SwitchToLogin,
    FinishLogin {
        email: String,
    },
    Navigate,
}

/// What the host should do with the originating DOM event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventOutcome {
    pub transition: Transition,
    pub prevent_default: bool,
    pub stop_propagation: bool,
    pub submit: Option<SubmitOutcome>,
}

#[derive(Debug)]
pub struct Widget<S> {
    pub(crate) config: WidgetConfig,
    pub(crate) store: CredentialStore<S>,
    pub(crate) popups: PopupStateMachine,
    pub(crate) messages: Messaging,
    pub(crate) scheduler: Scheduler<Task>,
    navigation: Option<String>,
}

impl<S: KeyValueStore> Widget<S> {
    pub fn new(storage: S, config: WidgetConfig) -> Self {
        let store = CredentialStore::new(
            storage,
            config.users_key.clone(),
            config.session_key.clone(),
        );
        Self {
            config,
            store,
            popups: PopupStateMachine::new(),
            messages: Messaging::default(),
            scheduler: Scheduler::new(),
            navigation: None,
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn store(&self) -> &CredentialStore<S> {
        &self.store
    }

    pub fn popups(&self) -> &PopupStateMachine {
        &self.popups
    }

    pub fn messages(&self) -> &Messaging {
        &self.messages
    }

    /// Tasks that will still run when their timers elapse.
    pub fn live_tasks(&self) -> usize {
        self.scheduler.live_len()
    }

    /// Maps `event` to its transition and applies it.
    pub fn handle(&mut self, event: UiEvent, fields: &dyn FormFields) -> EventOutcome {
        let transition = transition_for(event, self.popups.visibility());
        debug!(?event, ?transition, "ui event");

        let mut outcome = EventOutcome {
            transition,
            prevent_default: false,
            stop_propagation: false,
            submit: None,
        };

        match transition {
            Transition::Open(popup) => self.open(popup),
            Transition::CloseAll => self.close_all(),
            Transition::SwitchTo(popup) => {
                outcome.prevent_default = true;
                // the click must not reach the document-level outside-click check
                outcome.stop_propagation = true;
                self.switch_to(popup);
            }
            Transition::Submit(popup) => {
                outcome.prevent_default = true;
                outcome.submit = Some(match popup {
                    Popup::Login => self.submit_login(&LoginForm::read(fields)),
                    Popup::Signup => self.submit_signup(&SignupForm::read(fields)),
                });
            }
            Transition::Ignore => {}
        }

        outcome
    }

    pub fn open(&mut self, popup: Popup) {
        self.popups.open(popup, &mut self.messages);
    }

    pub fn close(&mut self, popup: Popup) {
        self.popups.close(popup, &mut self.messages);
    }

    pub fn close_all(&mut self) {
        self.popups.close_all(&mut self.messages);
    }

    pub fn switch_to(&mut self, popup: Popup) {
        self.popups.switch_to(popup, &mut self.messages);
    }

    /// Replaces the popup's banner and schedules its auto-hide.
    pub fn show_form_message(&mut self, popup: Popup, text: impl Into<String>, kind: MessageKind) {
        let expiry = self.messages.show_form_message(popup, text, kind);
        self.scheduler.schedule(
            self.config.message_ttl_ms,
            Some(expiry.clone()),
            Task::ExpireMessage { popup, expiry },
        );
    }

    /// Timers scheduled since the last call; the host arms one per request.
    pub fn take_timer_requests(&mut self) -> Vec<TimerRequest> {
        self.scheduler.take_armed()
    }

    /// Destination the host should navigate to, once requested.
    pub fn take_navigation(&mut self) -> Option<String> {
        self.navigation.take()
    }

    pub fn navigation_requested(&self) -> bool {
        self.navigation.is_some()
    }

    /// Runs a scheduled task. Returns `false` if it was cancelled or already ran.
    pub fn fire(&mut self, id: TaskId) -> bool {
        match self.scheduler.take(id) {
            Some(task) => {
                self.run(task);
                true
            }
            None => false,
        }
    }

    /// Advances the virtual clock, running every task that comes due on the way.
    pub fn advance(&mut self, ms: u64) {
        let target = self.scheduler.now_ms() + ms;
        while let Some(id) = self.scheduler.next_due(target) {
            self.fire(id);
        }
        self.scheduler.set_now(target);
    }

    pub(crate) fn schedule(
        &mut self,
        delay_ms: u32,
        cancel: Option<CancellationToken>,
        task: Task,
    ) -> TaskId {
        self.scheduler.schedule(delay_ms, cancel, task)
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::ExpireMessage { popup, expiry } => {
                self.messages.expire_form_message(popup, &expiry);
            }
            Task::SwitchToLogin => {
                self.messages.clear_errors(Popup::Signup);
                self.switch_to(Popup::Login);
                self.show_form_message(Popup::Login, LOGIN_PROMPT, MessageKind::Info);
            }
            Task::FinishLogin { email } => {
                self.messages.clear_errors(Popup::Login);
                self.close_all();
                if let Err(err) = self.store.set_logged_in(&email) {
                    warn!(%email, "unable to persist logged-in marker: {err}");
                }
                let delay = self.config.redirect_after_close_ms();
                self.schedule(delay, None, Task::Navigate);
            }
            Task::Navigate => {
                info!(destination = %self.config.redirect_url, "navigating after login");
                self.navigation = Some(self.config.redirect_url.clone());
            }
        }
    }
}
