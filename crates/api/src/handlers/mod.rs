//! HTTP handlers, grouped by resource.

pub mod account;
pub mod admin;
pub mod auth;
pub mod chat;
pub mod media;
pub mod oauth;
