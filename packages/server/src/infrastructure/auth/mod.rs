//! Authentication strategies backed by a principal directory.
//!
//! Strategies are tried in the order they are handed to the
//! [`Authenticator`](crate::domain::Authenticator):
//!
//! 1. `token`: bearer credential (`?token=` or `Authorization: Bearer`)
//! 2. `session`: server-side session referenced by the `BANTER_SESSION` cookie

pub mod directory;
pub mod session;
pub mod token;

pub use directory::{DirectoryError, PrincipalDirectory, PrincipalEntry};
pub use session::{SESSION_COOKIE, SessionCookieStrategy};
pub use token::QueryTokenStrategy;
