//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business rules and talk to persistence through the
//! `store` traits so route handlers can stay focused on protocol translation
//! and session plumbing.

pub mod account;
pub mod mailer;
pub mod password;
pub mod preferences;
pub mod registration;
pub mod roster;
pub mod session;
