//! YouTube Music catalog search
//!
//! Queries the InnerTube `search` endpoint the YouTube Music web client
//! uses. Searching for a quoted video id returns that video as a song or
//! video result, with artist and album links and the catalog's video type.
//!
//! No authentication is needed for search.

pub mod dto;
mod adapter;
mod client;

pub use adapter::to_candidates;
pub use client::YtMusicClient;
