//! DeArrow community titles
//!
//! DeArrow users submit replacement titles for clickbait videos. When one
//! exists it tends to follow the plain "Artist - Track" shape, which makes it
//! a better input for title parsing than the uploader's title.
//!
//! Lookups use the hash-prefix endpoint, so the service never sees the full
//! video id.

mod client;
pub mod dto;

pub use client::DeArrowClient;
