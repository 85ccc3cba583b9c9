//! Demo authentication: field rules, the local credential table, and the
//! submit handlers that tie them to the popups. Nothing here talks to a
//! server and passwords are kept in plaintext; never reuse this for real
//! accounts. Passwords must not be logged.

pub mod store;
pub mod submit;
pub mod validation;
