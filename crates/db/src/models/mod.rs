//! Database entity models and DTOs.

pub mod account;
pub mod media;
pub mod message;
pub mod notification;
pub mod oauth_state;
pub mod pending_registration;
pub mod session;
