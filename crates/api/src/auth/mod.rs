//! Authentication building blocks.
//!
//! `password` and `token` are the low-level credential primitives, `oidc`
//! talks to Google, and `resolver` is the single place where a presented
//! credential becomes a verified identity and role.

pub mod oidc;
pub mod password;
pub mod resolver;
pub mod token;
