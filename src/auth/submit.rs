//! Signup and login submit handlers.
//!
//! Each handler clears the scope's old errors, validates every field, and only
//! then touches the credential store. Every failure ends as field errors plus a
//! form banner; nothing propagates past the handler.
//!
//! Flow Overview: a successful signup stores the record and schedules the
//! switch to login. A successful login schedules the popup close, which in
//! turn schedules navigation, so the page always closes before it leaves.

use crate::auth::store::KeyValueStore;
use crate::auth::validation::{validate_login, validate_signup, Field, FieldError};
use crate::messaging::MessageKind;
use crate::popup::Popup;
use crate::widget::{FormFields, Task, Widget};
use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info};

pub const FIX_ERRORS: &str = "Please fix the errors above.";
pub const EMAIL_TAKEN: &str = "This email is already registered.";
pub const EMAIL_TAKEN_HINT: &str = "Please use another email or log in.";
pub const SIGNUP_SAVED: &str = "Sign up successful! You can now log in.";
pub const SIGNUP_SAVE_FAILED: &str = "Unable to save your account. Please try again.";
pub const UNKNOWN_EMAIL: &str = "No account found with this email.";
pub const UNKNOWN_EMAIL_HINT: &str = "Please sign up first.";
pub const WRONG_PASSWORD: &str = "Incorrect password.";
pub const LOGIN_FAILED: &str = "Login failed. Check your credentials.";

/// Signup input captured from the form. The email is trimmed on read.
#[derive(Debug)]
pub struct SignupForm {
    pub email: String,
    password: SecretString,
    confirm_password: SecretString,
}

impl SignupForm {
    pub fn new(email: &str, password: &str, confirm_password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: SecretString::from(password.to_string()),
            confirm_password: SecretString::from(confirm_password.to_string()),
        }
    }

    pub fn read(fields: &dyn FormFields) -> Self {
        Self::new(
            &fields.value(Popup::Signup, Field::Email),
            &fields.value(Popup::Signup, Field::Password),
            &fields.value(Popup::Signup, Field::ConfirmPassword),
        )
    }
}

/// Login input captured from the form. The email is trimmed on read.
#[derive(Debug)]
pub struct LoginForm {
    pub email: String,
    password: SecretString,
}

impl LoginForm {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: SecretString::from(password.to_string()),
        }
    }

    pub fn read(fields: &dyn FormFields) -> Self {
        Self::new(
            &fields.value(Popup::Login, Field::Email),
            &fields.value(Popup::Login, Field::Password),
        )
    }
}

/// How a submission ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Invalid,
    EmailTaken,
    StorageFailed,
    Registered { email: String },
    UnknownEmail,
    WrongPassword,
    LoggedIn { email: String },
}

impl<S: KeyValueStore> Widget<S> {
    pub fn submit_signup(&mut self, form: &SignupForm) -> SubmitOutcome {
        self.messages.clear_errors(Popup::Signup);

        let errors = validate_signup(
            &form.email,
            form.password.expose_secret(),
            form.confirm_password.expose_secret(),
            self.config.min_password_length,
        );
        if !errors.is_empty() {
            return self.reject_invalid(Popup::Signup, errors);
        }

        if self.store.get(&form.email).is_some() {
            info!(email = %form.email, "signup rejected: email already registered");
            self.messages
                .show_error(Popup::Signup, FieldError::new(Field::Email, EMAIL_TAKEN));
            self.show_form_message(Popup::Signup, EMAIL_TAKEN_HINT, MessageKind::Error);
            return SubmitOutcome::EmailTaken;
        }

        if let Err(err) = self.store.put(&form.email, form.password.expose_secret()) {
            error!(email = %form.email, "signup could not be stored: {err}");
            self.show_form_message(Popup::Signup, SIGNUP_SAVE_FAILED, MessageKind::Error);
            return SubmitOutcome::StorageFailed;
        }

        info!(email = %form.email, "signup stored");
        self.show_form_message(Popup::Signup, SIGNUP_SAVED, MessageKind::Success);

        let cancel = self.popups.token(Popup::Signup);
        self.schedule(
            self.config.signup_switch_delay_ms,
            Some(cancel),
            Task::SwitchToLogin,
        );

        SubmitOutcome::Registered {
            email: form.email.to_lowercase(),
        }
    }

    pub fn submit_login(&mut self, form: &LoginForm) -> SubmitOutcome {
        self.messages.clear_errors(Popup::Login);

        let errors = validate_login(&form.email, form.password.expose_secret());
        if !errors.is_empty() {
            return self.reject_invalid(Popup::Login, errors);
        }

        let Some(user) = self.store.get(&form.email) else {
            info!(email = %form.email, "login rejected: unknown email");
            self.messages
                .show_error(Popup::Login, FieldError::new(Field::Email, UNKNOWN_EMAIL));
            self.show_form_message(Popup::Login, UNKNOWN_EMAIL_HINT, MessageKind::Error);
            return SubmitOutcome::UnknownEmail;
        };

        if user.password != form.password.expose_secret() {
            info!(email = %user.email, "login rejected: wrong password");
            self.messages
                .show_error(Popup::Login, FieldError::new(Field::Password, WRONG_PASSWORD));
            self.show_form_message(Popup::Login, LOGIN_FAILED, MessageKind::Error);
            return SubmitOutcome::WrongPassword;
        }

        info!(email = %user.email, "login accepted");
        self.show_form_message(
            Popup::Login,
            format!("Welcome back, {}!", user.email),
            MessageKind::Success,
        );
        self.schedule(
            self.config.login_close_delay_ms,
            None,
            Task::FinishLogin {
                email: user.email.clone(),
            },
        );

        SubmitOutcome::LoggedIn { email: user.email }
    }

    fn reject_invalid(&mut self, popup: Popup, errors: Vec<FieldError>) -> SubmitOutcome {
        for field_error in errors {
            self.messages.show_error(popup, field_error);
        }
        self.show_form_message(popup, FIX_ERRORS, MessageKind::Error);
        SubmitOutcome::Invalid
    }
}
