use popauth::auth::store::{KeyValueStore, MemoryStorage};
use popauth::auth::submit::{
    SubmitOutcome, EMAIL_TAKEN, LOGIN_FAILED, SIGNUP_SAVED, WRONG_PASSWORD,
};
use popauth::auth::validation::Field;
use popauth::messaging::MessageKind;
use popauth::widget::{FormSnapshot, LOGIN_PROMPT};
use popauth::{Popup, PopupVisibility, UiEvent, Widget, WidgetConfig};

fn widget() -> Widget<MemoryStorage> {
    Widget::new(MemoryStorage::new(), WidgetConfig::default())
}

fn signup_form(email: &str, password: &str, confirm: &str) -> FormSnapshot {
    FormSnapshot::new()
        .with(Popup::Signup, Field::Email, email)
        .with(Popup::Signup, Field::Password, password)
        .with(Popup::Signup, Field::ConfirmPassword, confirm)
}

fn login_form(email: &str, password: &str) -> FormSnapshot {
    FormSnapshot::new()
        .with(Popup::Login, Field::Email, email)
        .with(Popup::Login, Field::Password, password)
}

fn open_signup(widget: &mut Widget<MemoryStorage>) {
    let fields = FormSnapshot::new();
    widget.handle(UiEvent::OpenClicked, &fields);
    widget.handle(UiEvent::LoginToSignupClicked, &fields);
    assert_eq!(widget.popups().visibility(), PopupVisibility::Signup);
}

fn banner_text(widget: &Widget<MemoryStorage>, popup: Popup) -> Option<String> {
    widget
        .messages()
        .scope(popup)
        .form_message()
        .map(|message| message.text.clone())
}

#[test]
fn signup_then_login_round_trip() {
    let mut widget = widget();
    open_signup(&mut widget);

    let outcome = widget.handle(
        UiEvent::SubmitClicked(Popup::Signup),
        &signup_form("a@b.com", "secret1", "secret1"),
    );
    assert_eq!(
        outcome.submit,
        Some(SubmitOutcome::Registered {
            email: "a@b.com".to_string()
        })
    );
    assert!(outcome.prevent_default);
    assert_eq!(banner_text(&widget, Popup::Signup).as_deref(), Some(SIGNUP_SAVED));
    assert_eq!(widget.store().load_table().len(), 1);
    assert!(widget.store().get("a@b.com").is_some());

    // the switch to login happens 1100 ms later
    widget.advance(1099);
    assert_eq!(widget.popups().visibility(), PopupVisibility::Signup);
    widget.advance(1);
    assert_eq!(widget.popups().visibility(), PopupVisibility::Login);
    assert!(widget.messages().scope(Popup::Signup).is_empty());

    let prompt = widget.messages().scope(Popup::Login).form_message().unwrap();
    assert_eq!(prompt.text, LOGIN_PROMPT);
    assert_eq!(prompt.kind, MessageKind::Info);

    let outcome = widget.handle(UiEvent::EnterPressed, &login_form("A@B.com", "secret1"));
    assert!(outcome.prevent_default);
    assert_eq!(
        outcome.submit,
        Some(SubmitOutcome::LoggedIn {
            email: "a@b.com".to_string()
        })
    );
    assert_eq!(
        banner_text(&widget, Popup::Login).as_deref(),
        Some("Welcome back, a@b.com!")
    );
}

#[test]
fn duplicate_signup_is_rejected_without_touching_the_store() {
    let mut widget = widget();
    open_signup(&mut widget);
    let form = signup_form("a@b.com", "secret1", "secret1");
    widget.handle(UiEvent::SubmitClicked(Popup::Signup), &form);
    let before = widget.store().storage().get_item("demo_users").unwrap();

    let outcome = widget.handle(
        UiEvent::SubmitClicked(Popup::Signup),
        &signup_form("A@B.COM", "another1", "another1"),
    );

    assert_eq!(outcome.submit, Some(SubmitOutcome::EmailTaken));
    assert_eq!(
        widget.messages().scope(Popup::Signup).field_error(Field::Email),
        Some(EMAIL_TAKEN)
    );
    assert_eq!(widget.store().storage().get_item("demo_users").unwrap(), before);
}

#[test]
fn successful_login_closes_then_navigates() {
    let mut widget = widget();
    widget.store().put("a@b.com", "secret1").unwrap();
    widget.handle(UiEvent::OpenClicked, &FormSnapshot::new());

    widget.handle(
        UiEvent::SubmitClicked(Popup::Login),
        &login_form("a@b.com", "secret1"),
    );

    widget.advance(899);
    assert_eq!(widget.popups().visibility(), PopupVisibility::Login);
    assert_eq!(widget.store().logged_in(), None);

    widget.advance(1);
    assert_eq!(widget.popups().visibility(), PopupVisibility::None);
    assert!(!widget.popups().page_active());
    assert!(widget.messages().scope(Popup::Login).is_empty());
    assert_eq!(widget.store().logged_in(), Some("a@b.com".to_string()));
    assert!(!widget.navigation_requested());

    widget.advance(100);
    assert_eq!(widget.take_navigation(), Some("./HTML/news.html".to_string()));
    assert_eq!(widget.take_navigation(), None);
}

#[test]
fn wrong_password_never_navigates() {
    let mut widget = widget();
    widget.store().put("a@b.com", "secret1").unwrap();
    widget.handle(UiEvent::OpenClicked, &FormSnapshot::new());

    let outcome = widget.handle(
        UiEvent::SubmitClicked(Popup::Login),
        &login_form("a@b.com", "wrong"),
    );

    assert_eq!(outcome.submit, Some(SubmitOutcome::WrongPassword));
    assert_eq!(
        widget.messages().scope(Popup::Login).field_error(Field::Password),
        Some(WRONG_PASSWORD)
    );
    assert_eq!(banner_text(&widget, Popup::Login).as_deref(), Some(LOGIN_FAILED));

    widget.advance(10_000);
    assert!(!widget.navigation_requested());
    assert_eq!(widget.popups().visibility(), PopupVisibility::Login);
    assert_eq!(banner_text(&widget, Popup::Login), None);
}

#[test]
fn closing_signup_cancels_the_pending_switch() {
    let mut widget = widget();
    open_signup(&mut widget);
    widget.handle(
        UiEvent::SubmitClicked(Popup::Signup),
        &signup_form("a@b.com", "secret1", "secret1"),
    );

    widget.advance(500);
    widget.handle(UiEvent::CloseClicked, &FormSnapshot::new());
    assert_eq!(widget.live_tasks(), 0);

    widget.advance(2000);
    assert_eq!(widget.popups().visibility(), PopupVisibility::None);
    assert!(widget.messages().scope(Popup::Login).is_empty());
    // the account was stored before the popup closed
    assert!(widget.store().get("a@b.com").is_some());
}

#[test]
fn closing_always_empties_the_scope() {
    let mut widget = widget();
    widget.handle(UiEvent::OpenClicked, &FormSnapshot::new());
    widget.handle(UiEvent::SubmitClicked(Popup::Login), &login_form("", ""));
    assert_eq!(widget.messages().scope(Popup::Login).error_count(), 2);

    widget.handle(
        UiEvent::DocumentClicked {
            inside_popup: false,
            on_open_control: false,
        },
        &FormSnapshot::new(),
    );

    let scope = widget.messages().scope(Popup::Login);
    assert_eq!(scope.error_count(), 0);
    assert!(scope.form_message().is_none());
    assert_eq!(widget.live_tasks(), 0);
}

#[test]
fn clicks_inside_the_popup_keep_it_open() {
    let mut widget = widget();
    widget.handle(UiEvent::OpenClicked, &FormSnapshot::new());
    widget.handle(
        UiEvent::DocumentClicked {
            inside_popup: true,
            on_open_control: false,
        },
        &FormSnapshot::new(),
    );
    assert_eq!(widget.popups().visibility(), PopupVisibility::Login);
}

#[test]
fn corrupt_table_does_not_break_signup() {
    let storage = MemoryStorage::new();
    storage.set_item("demo_users", "{{{").unwrap();
    let mut widget = Widget::new(storage, WidgetConfig::default());
    open_signup(&mut widget);

    let outcome = widget.handle(
        UiEvent::SubmitClicked(Popup::Signup),
        &signup_form("a@b.com", "secret1", "secret1"),
    );

    assert!(matches!(outcome.submit, Some(SubmitOutcome::Registered { .. })));
    assert_eq!(widget.store().load_table().len(), 1);
}

#[test]
fn custom_storage_keys_are_honored() {
    let config = WidgetConfig {
        users_key: "users_v2".to_string(),
        session_key: "who".to_string(),
        ..WidgetConfig::default()
    };
    let mut widget = Widget::new(MemoryStorage::new(), config);
    open_signup(&mut widget);
    widget.handle(
        UiEvent::SubmitClicked(Popup::Signup),
        &signup_form("a@b.com", "secret1", "secret1"),
    );

    assert!(widget.store().storage().get_item("users_v2").unwrap().is_some());
    assert_eq!(widget.store().storage().get_item("demo_users").unwrap(), None);
}
