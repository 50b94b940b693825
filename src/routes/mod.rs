//! Router Module Index
//!
//! One router per resource, each nested under its own prefix by `create_router`.
//! Access control is not applied here: every handler declares its gate through its
//! extractor arguments (`AuthUser`, `AdminUser`, `MaybeAuthUser`).

/// `/account`: sign-in, sign-up, password and email flows, favorites.
pub mod account;

/// `/categories`: taxonomy reads for everyone, writes for admins.
pub mod categories;

/// `/news`: feeds, search, articles and their comments.
pub mod news;
