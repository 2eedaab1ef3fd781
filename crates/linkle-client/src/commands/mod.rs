//! User-facing operations, grouped by domain.
//!
//! Each sub-module adds methods to [`AppState`](crate::AppState).  Read
//! paths never fail: store errors are logged at `warn` and replaced by empty
//! defaults.  Operations whose failure the user must see return
//! [`ClientError`](crate::ClientError).

pub mod account;
pub mod inbox;
pub mod listings;
pub mod membership;
pub mod organizers;
pub mod settings;
