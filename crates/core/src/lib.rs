//! Domain types shared across the Beehive workspace.
//!
//! Pure logic only: the credential/decision model, role rules, error
//! taxonomy, and input validation. No I/O happens in this crate.

pub mod auth;
pub mod error;
pub mod roles;
pub mod types;
pub mod validation;
