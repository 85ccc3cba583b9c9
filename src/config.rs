//! Widget configuration with build-time defaults and an optional runtime
//! override. The runtime override is read from `window.POPAUTH_CONFIG` (if
//! present) so a static page can point the widget at other storage keys or a
//! different landing page without rebuilding. Values are public; do not store
//! secrets here.

use crate::auth::validation::Field;
use tracing::Level;

/// Where a logical form field can be found inside a popup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldLocator {
    /// A CSS selector evaluated relative to the popup container.
    Selector(String),
    /// The n-th (zero-based) `input[type="password"]` inside the popup.
    PasswordInput(usize),
}

impl FieldLocator {
    fn selector(value: &str) -> Self {
        Self::Selector(value.to_string())
    }
}

/// Accepted identifiers per logical field, tried in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldIdentifiers {
    pub email: Vec<FieldLocator>,
    pub password: Vec<FieldLocator>,
    pub confirm_password: Vec<FieldLocator>,
}

impl FieldIdentifiers {
    #[must_use]
    pub fn for_field(&self, field: Field) -> &[FieldLocator] {
        match field {
            Field::Email => &self.email,
            Field::Password => &self.password,
            Field::ConfirmPassword => &self.confirm_password,
        }
    }
}

impl Default for FieldIdentifiers {
    fn default() -> Self {
        Self {
            email: vec![
                FieldLocator::selector(r#"input[type="text"], input[name="email"]"#),
                FieldLocator::selector("#email"),
            ],
            password: vec![FieldLocator::PasswordInput(0)],
            // the page ships the confirm input as `comfirm-password`; accept both spellings
            confirm_password: vec![
                FieldLocator::selector("#comfirm-password, #confirm-password"),
                FieldLocator::PasswordInput(1),
            ],
        }
    }
}

/// Selectors for the page elements the widget binds to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selectors {
    pub open_control: String,
    pub login_popup: String,
    pub signup_popup: String,
    pub close_controls: String,
    pub login_to_signup: String,
    pub signup_to_login: String,
    pub submit_control: String,
    pub input_box: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            open_control: "#open".to_string(),
            login_popup: "#login-form".to_string(),
            signup_popup: "#signup-form".to_string(),
            close_controls: ".close-bn".to_string(),
            login_to_signup: "#login-form .signup".to_string(),
            signup_to_login: "#goto-login".to_string(),
            submit_control: ".button button".to_string(),
            input_box: ".inputbox".to_string(),
        }
    }
}

/// Widget configuration: storage keys, delays, and DOM bindings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetConfig {
    pub users_key: String,
    pub session_key: String,
    pub redirect_url: String,
    pub message_ttl_ms: u32,
    pub signup_switch_delay_ms: u32,
    pub login_close_delay_ms: u32,
    pub redirect_delay_ms: u32,
    pub min_password_length: usize,
    pub log_level: Level,
    pub selectors: Selectors,
    pub fields: FieldIdentifiers,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            users_key: "demo_users".to_string(),
            session_key: "demo_logged_in".to_string(),
            redirect_url: "./HTML/news.html".to_string(),
            message_ttl_ms: 3000,
            signup_switch_delay_ms: 1100,
            login_close_delay_ms: 900,
            redirect_delay_ms: 1000,
            min_password_length: 6,
            log_level: Level::WARN,
            selectors: Selectors::default(),
            fields: FieldIdentifiers::default(),
        }
    }
}

impl WidgetConfig {
    /// Loads defaults, applies build-time environment variables, then runtime overrides.
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::default();

        let build_time = RuntimeConfig {
            redirect_url: option_env!("POPAUTH_REDIRECT_URL").and_then(normalize_runtime_value),
            users_key: option_env!("POPAUTH_USERS_KEY").and_then(normalize_runtime_value),
            session_key: option_env!("POPAUTH_SESSION_KEY").and_then(normalize_runtime_value),
            log_level: option_env!("POPAUTH_LOG_LEVEL").and_then(parse_log_level),
        };
        apply_runtime_overrides(&mut config, build_time);

        if let Some(runtime) = runtime_config() {
            apply_runtime_overrides(&mut config, runtime);
        }

        config
    }

    /// Delay between the post-login close and the navigation it precedes.
    #[must_use]
    pub fn redirect_after_close_ms(&self) -> u32 {
        self.redirect_delay_ms.saturating_sub(self.login_close_delay_ms)
    }
}

#[derive(Default)]
struct RuntimeConfig {
    redirect_url: Option<String>,
    users_key: Option<String>,
    session_key: Option<String>,
    log_level: Option<Level>,
}

/// Accepts `error`..`trace` (any case) or `0`..`4`.
pub fn parse_log_level(level: &str) -> Option<Level> {
    let level = level.trim();
    if let Ok(parsed) = level.parse::<u8>() {
        return match parsed {
            0 => Some(Level::ERROR),
            1 => Some(Level::WARN),
            2 => Some(Level::INFO),
            3 => Some(Level::DEBUG),
            4 => Some(Level::TRACE),
            _ => None,
        };
    }

    match level.to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

fn apply_runtime_overrides(config: &mut WidgetConfig, runtime: RuntimeConfig) {
    if let Some(value) = runtime.redirect_url {
        config.redirect_url = value;
    }
    if let Some(value) = runtime.users_key {
        config.users_key = value;
    }
    if let Some(value) = runtime.session_key {
        config.session_key = value;
    }
    if let Some(value) = runtime.log_level {
        config.log_level = value;
    }
}

#[cfg(target_arch = "wasm32")]
fn runtime_config() -> Option<RuntimeConfig> {
    use js_sys::{Object, Reflect};
    use wasm_bindgen::JsValue;

    let window = web_sys::window()?;
    let config = Reflect::get(&window, &JsValue::from_str("POPAUTH_CONFIG")).ok()?;
    if config.is_null() || config.is_undefined() {
        return None;
    }
    let object = Object::from(config);

    Some(RuntimeConfig {
        redirect_url: read_runtime_value(&object, "redirect_url"),
        users_key: read_runtime_value(&object, "users_key"),
        session_key: read_runtime_value(&object, "session_key"),
        log_level: read_runtime_value(&object, "log_level")
            .and_then(|value| parse_log_level(&value)),
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn runtime_config() -> Option<RuntimeConfig> {
    None
}

#[cfg(target_arch = "wasm32")]
fn read_runtime_value(object: &js_sys::Object, key: &str) -> Option<String> {
    let value = js_sys::Reflect::get(object, &wasm_bindgen::JsValue::from_str(key))
        .ok()?
        .as_string()?;
    normalize_runtime_value(&value)
}

fn normalize_runtime_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
