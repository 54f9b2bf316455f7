//! Session management against the marketplace REST API.
//!
//! # Architecture
//!
//! - [`SessionClient`] owns the credential pair and is the only component
//!   that talks to the `/api/auth/` endpoints
//! - Credentials live in an injected [`CredentialStore`] so the same client
//!   runs against a file (CLI), memory (tests) or nothing at all
//!   ([`DetachedStore`], for contexts without persistent storage)
//! - Access-token expiry is recovered from with exactly one refresh per
//!   call; a second 401 is handed back to the caller untouched
//!
//! # Lifecycle
//!
//! `Anonymous → Authenticated` on sign-in, `→ Anonymous` on logout or when
//! the refresh token itself is rejected.

mod client;
mod credentials;
mod profile;

pub use client::{SessionClient, SessionState};
pub use credentials::{
    ACCESS_KEY, CredentialPair, CredentialStore, DetachedStore, FileStore, MemoryStore,
    REFRESH_KEY, StorageError,
};
pub use profile::{RegisteredUser, Registration, UserProfile};
