//! Login and signup popup controller for a static page.
//!
//! The crate keeps every rule of the widget in plain Rust so it can be driven
//! and tested natively: which popup is visible, what counts as valid input,
//! which errors and banners are shown, and how a submission is checked against
//! and written to a local credential table. The `web` module (wasm32 only)
//! binds that controller to existing DOM elements.
//!
//! ## Flows
//!
//! ### Signup
//!
//! 1. **Validate:** email, password, and confirmation are checked in one pass.
//! 2. **Register:** an email not yet in the table is stored (plaintext, demo only).
//! 3. **Switch:** after a short delay the signup popup closes and login opens.
//!
//! ### Login
//!
//! 1. **Validate:** email format and password presence.
//! 2. **Check:** the record is looked up by normalized email and compared.
//! 3. **Leave:** popups close, the logged-in marker is stored, then the page navigates.
//!
//! The credential table is a demo: there is no hashing and no server.

pub mod auth;
#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
pub mod config;
pub mod errors;
pub mod messaging;
pub mod popup;
pub mod scheduler;
pub mod widget;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub use config::WidgetConfig;
pub use errors::StorageError;
pub use popup::{Popup, PopupVisibility, UiEvent};
pub use widget::{EventOutcome, Widget};
