//! Field errors and form banners, kept as data per popup scope.
//!
//! A field holds at most one error; a popup holds at most one form message.
//! The browser adapter renders this model after every event, so removing an
//! entry here is what removes it from the page.

use crate::auth::validation::{Field, FieldError};
use crate::popup::Popup;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

/// Banner styles, mirrored as CSS classes on the rendered element. `Info`
/// also carries `success` so stylesheets that only know success and error
/// still style it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Success,
    Info,
}

impl MessageKind {
    pub fn css_class(self) -> &'static str {
        match self {
            MessageKind::Error => "error",
            MessageKind::Success => "success",
            MessageKind::Info => "success info",
        }
    }
}

/// The banner shown under a form. Its token is cancelled when the banner is
/// replaced or cleared, which disarms the pending auto-hide.
#[derive(Clone, Debug)]
pub struct FormMessage {
    pub text: String,
    pub kind: MessageKind,
    expiry: CancellationToken,
}

impl FormMessage {
    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }

    pub fn expiry(&self) -> &CancellationToken {
        &self.expiry
    }
}

#[derive(Debug, Default)]
pub struct ScopeMessages {
    field_errors: BTreeMap<Field, String>,
    form_message: Option<FormMessage>,
}

impl ScopeMessages {
    pub fn field_error(&self, field: Field) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }

    pub fn field_errors(&self) -> impl Iterator<Item = (Field, &str)> {
        self.field_errors
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }

    pub fn error_count(&self) -> usize {
        self.field_errors.len()
    }

    pub fn form_message(&self) -> Option<&FormMessage> {
        self.form_message.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty() && self.form_message.is_none()
    }

    fn take_form_message(&mut self) {
        if let Some(message) = self.form_message.take() {
            message.expiry.cancel();
        }
    }
}

#[derive(Debug, Default)]
pub struct Messaging {
    login: ScopeMessages,
    signup: ScopeMessages,
}

impl Messaging {
    pub fn scope(&self, popup: Popup) -> &ScopeMessages {
        match popup {
            Popup::Login => &self.login,
            Popup::Signup => &self.signup,
        }
    }

    fn scope_mut(&mut self, popup: Popup) -> &mut ScopeMessages {
        match popup {
            Popup::Login => &mut self.login,
            Popup::Signup => &mut self.signup,
        }
    }

    /// Binds `error` to its field, replacing any earlier error there.
    pub fn show_error(&mut self, popup: Popup, error: FieldError) {
        self.scope_mut(popup)
            .field_errors
            .insert(error.field, error.message);
    }

    /// Drops every field error in the scope. Form messages are left alone.
    pub fn clear_errors(&mut self, popup: Popup) {
        self.scope_mut(popup).field_errors.clear();
    }

    /// Replaces the scope's banner and returns the token guarding its auto-hide.
    pub fn show_form_message(
        &mut self,
        popup: Popup,
        text: impl Into<String>,
        kind: MessageKind,
    ) -> CancellationToken {
        let scope = self.scope_mut(popup);
        scope.take_form_message();

        let expiry = CancellationToken::new();
        scope.form_message = Some(FormMessage {
            text: text.into(),
            kind,
            expiry: expiry.clone(),
        });
        expiry
    }

    /// Auto-hide callback: removes the banner only if it is still the one
    /// `expiry` was issued for.
    pub fn expire_form_message(&mut self, popup: Popup, expiry: &CancellationToken) -> bool {
        if expiry.is_cancelled() {
            return false;
        }
        let scope = self.scope_mut(popup);
        if scope.form_message.is_none() {
            return false;
        }
        scope.take_form_message();
        true
    }

    /// Removes field errors and the banner; used when a popup closes.
    pub fn clear(&mut self, popup: Popup) {
        let scope = self.scope_mut(popup);
        scope.field_errors.clear();
        scope.take_form_message();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_error_replaces_old_on_same_field() {
        let mut messages = Messaging::default();
        messages.show_error(Popup::Signup, FieldError::new(Field::Email, "first"));
        messages.show_error(Popup::Signup, FieldError::new(Field::Email, "second"));

        let scope = messages.scope(Popup::Signup);
        assert_eq!(scope.error_count(), 1);
        assert_eq!(scope.field_error(Field::Email), Some("second"));
    }

    #[test]
    fn clear_errors_is_idempotent_and_keeps_banner() {
        let mut messages = Messaging::default();
        messages.clear_errors(Popup::Login);
        messages.show_error(Popup::Login, FieldError::new(Field::Password, "bad"));
        messages.show_form_message(
            Popup::Login,
            "Please fix the errors above.",
            MessageKind::Error,
        );

        messages.clear_errors(Popup::Login);
        messages.clear_errors(Popup::Login);

        let scope = messages.scope(Popup::Login);
        assert_eq!(scope.error_count(), 0);
        assert!(scope.form_message().is_some());
    }

    #[test]
    fn scopes_are_independent() {
        let mut messages = Messaging::default();
        messages.show_error(Popup::Login, FieldError::new(Field::Email, "x"));
        messages.clear(Popup::Signup);
        assert_eq!(messages.scope(Popup::Login).error_count(), 1);
    }

    #[test]
    fn replacing_a_banner_disarms_the_old_expiry() {
        let mut messages = Messaging::default();
        let first = messages.show_form_message(Popup::Signup, "one", MessageKind::Error);
        let second = messages.show_form_message(Popup::Signup, "two", MessageKind::Success);

        assert!(first.is_cancelled());
        assert!(!messages.expire_form_message(Popup::Signup, &first));

        let banner = messages.scope(Popup::Signup).form_message().unwrap();
        assert_eq!(banner.text, "two");
        assert!(!banner.is_error());

        assert!(messages.expire_form_message(Popup::Signup, &second));
        assert!(messages.scope(Popup::Signup).form_message().is_none());
    }

    #[test]
    fn clear_removes_everything_and_cancels_expiry() {
        let mut messages = Messaging::default();
        messages.show_error(Popup::Login, FieldError::new(Field::Email, "x"));
        let expiry = messages.show_form_message(Popup::Login, "hi", MessageKind::Info);

        messages.clear(Popup::Login);

        assert!(messages.scope(Popup::Login).is_empty());
        assert!(expiry.is_cancelled());
        assert!(!messages.expire_form_message(Popup::Login, &expiry));
    }

    #[test]
    fn css_classes() {
        assert_eq!(MessageKind::Error.css_class(), "error");
        assert_eq!(MessageKind::Success.css_class(), "success");
        assert_eq!(MessageKind::Info.css_class(), "success info");
    }
}
