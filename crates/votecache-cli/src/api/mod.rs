//! REST client for the HowTheyVote.eu API.
//!
//! Only the vote detail endpoint is used; it returns a vote's metadata
//! together with every member's position and profile.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
