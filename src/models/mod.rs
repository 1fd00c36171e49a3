//! Data models for Vocero console entities.
//!
//! The session layer only deals with the authenticated user: the `Role`
//! issued by the server and the `UserProfile` snapshot returned by the login
//! and profile endpoints.

pub mod user;

pub use user::{Role, UserProfile};
