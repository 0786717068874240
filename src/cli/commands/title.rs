//! Title parsing diagnostics.

use crate::title;

/// Print each stage of parsing a title
pub fn cmd_parse_title(raw: &str, channel: &str) {
    let cleaned = title::normalize(raw);
    let (rule, artist, track) = title::split_with_rule(channel, &cleaned);

    println!("Title:      {}", raw);
    if cleaned != raw {
        println!("Normalized: {}", cleaned);
    }
    println!("Rule:       {:?}", rule);
    println!("Artist:     {}", artist);
    println!("Track:      {}", track);
}
