//! Filmot video index
//!
//! Filmot keeps metadata for videos that have since gone private or been
//! removed, which is exactly where yt-dlp gives up. Lookups need an API key.

mod client;
pub mod dto;

pub use client::FilmotClient;
