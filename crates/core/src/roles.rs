//! Well-known role name constants.
//!
//! These must match the seed values in the `accounts` migration.

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

/// Whether `actual` meets a requirement of `required`.
///
/// `admin` satisfies every requirement; `user` satisfies only `user`.
pub fn role_satisfies(required: &str, actual: &str) -> bool {
    actual == ROLE_ADMIN || actual == required
}
