//! Popup visibility state machine.
//!
//! Exactly one of `None`, `Login`, `Signup` is visible at a time. Every UI
//! event maps to one [`Transition`]; closing a popup clears its messages and
//! cancels the token that guards timers bound to it.

use crate::messaging::Messaging;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Popup {
    Login,
    Signup,
}

impl Popup {
    pub const ALL: [Popup; 2] = [Popup::Login, Popup::Signup];

    pub fn other(self) -> Popup {
        match self {
            Popup::Login => Popup::Signup,
            Popup::Signup => Popup::Login,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PopupVisibility {
    #[default]
    None,
    Login,
    Signup,
}

impl PopupVisibility {
    pub fn visible(self) -> Option<Popup> {
        match self {
            PopupVisibility::None => None,
            PopupVisibility::Login => Some(Popup::Login),
            PopupVisibility::Signup => Some(Popup::Signup),
        }
    }
}

impl From<Popup> for PopupVisibility {
    fn from(popup: Popup) -> Self {
        match popup {
            Popup::Login => PopupVisibility::Login,
            Popup::Signup => PopupVisibility::Signup,
        }
    }
}

/// Page events the widget reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiEvent {
    OpenClicked,
    CloseClicked,
    LoginToSignupClicked,
    SignupToLoginClicked,
    /// A click anywhere on the document.
    DocumentClicked {
        inside_popup: bool,
        on_open_control: bool,
    },
    EnterPressed,
    SubmitClicked(Popup),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Open(Popup),
    CloseAll,
    SwitchTo(Popup),
    Submit(Popup),
    Ignore,
}

/// Maps an event to the transition it triggers in the current state.
pub fn transition_for(event: UiEvent, visibility: PopupVisibility) -> Transition {
    match event {
        UiEvent::OpenClicked => Transition::Open(Popup::Login),
        UiEvent::CloseClicked => Transition::CloseAll,
        UiEvent::LoginToSignupClicked => Transition::SwitchTo(Popup::Signup),
        UiEvent::SignupToLoginClicked => Transition::SwitchTo(Popup::Login),
        UiEvent::DocumentClicked {
            inside_popup,
            on_open_control,
        } => {
            if visibility == PopupVisibility::None || inside_popup || on_open_control {
                Transition::Ignore
            } else {
                Transition::CloseAll
            }
        }
        UiEvent::EnterPressed => visibility
            .visible()
            .map_or(Transition::Ignore, Transition::Submit),
        UiEvent::SubmitClicked(popup) => Transition::Submit(popup),
    }
}

#[derive(Debug)]
pub struct PopupStateMachine {
    visibility: PopupVisibility,
    page_active: bool,
    login_token: CancellationToken,
    signup_token: CancellationToken,
}

impl Default for PopupStateMachine {
    fn default() -> Self {
        Self {
            visibility: PopupVisibility::None,
            page_active: false,
            login_token: CancellationToken::new(),
            signup_token: CancellationToken::new(),
        }
    }
}

impl PopupStateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visibility(&self) -> PopupVisibility {
        self.visibility
    }

    pub fn is_visible(&self, popup: Popup) -> bool {
        self.visibility == PopupVisibility::from(popup)
    }

    /// Whether the page carries the "popup active" marker.
    pub fn page_active(&self) -> bool {
        self.page_active
    }

    /// Token cancelled the next time `popup` closes.
    pub fn token(&self, popup: Popup) -> CancellationToken {
        match popup {
            Popup::Login => self.login_token.clone(),
            Popup::Signup => self.signup_token.clone(),
        }
    }

    pub fn open(&mut self, popup: Popup, messages: &mut Messaging) {
        if let Some(current) = self.visibility.visible() {
            if current != popup {
                self.hide(current, messages);
            }
        }
        self.visibility = popup.into();
        self.page_active = true;
        debug!(?popup, "popup opened");
    }

    pub fn close(&mut self, popup: Popup, messages: &mut Messaging) {
        self.hide(popup, messages);
        if self.visibility == PopupVisibility::None {
            self.page_active = false;
        }
        debug!(?popup, "popup closed");
    }

    pub fn close_all(&mut self, messages: &mut Messaging) {
        for popup in Popup::ALL {
            self.hide(popup, messages);
        }
        self.page_active = false;
        debug!("all popups closed");
    }

    /// Closes the visible popup and opens `target` without dropping the page marker.
    pub fn switch_to(&mut self, target: Popup, messages: &mut Messaging) {
        self.hide(target.other(), messages);
        self.visibility = target.into();
        self.page_active = true;
        debug!(?target, "popup switched");
    }

    fn hide(&mut self, popup: Popup, messages: &mut Messaging) {
        if self.is_visible(popup) {
            self.visibility = PopupVisibility::None;
        }
        messages.clear(popup);

        let token = match popup {
            Popup::Login => &mut self.login_token,
            Popup::Signup => &mut self.signup_token,
        };
        token.cancel();
        *token = CancellationToken::new();
    }
}
