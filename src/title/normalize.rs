//! Title normalization: ordered, case-insensitive rewrite passes.
//!
//! Each pass runs on the output of the previous one, so later patterns can
//! assume the earlier noise is already gone. A pass that does not match
//! leaves the title untouched.

use std::sync::LazyLock;

use regex::Regex;

/// One rewrite pass.
struct Rewrite {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl Rewrite {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(&format!("(?i){pattern}")).expect("rewrite pattern must compile"),
            replacement,
        }
    }
}

static REWRITES: LazyLock<Vec<Rewrite>> = LazyLock::new(|| {
    vec![
        // [genre] or 【genre】 at the start
        Rewrite::new("leading-tag", r"^((\[[^\]]+\])|(【[^】]+】))\s*-*\s*", ""),
        // CD and vinyl track numbers: "A1. ", "12. "
        Rewrite::new("track-number", r"^\s*([a-z]{1,2}|[0-9]{1,2})[1-9]?\.\s+", ""),
        Rewrite::new("dash-before-bracket", r"-\s*([「【『])", "${1}"),
        // 【*Music Video*】, (*MV*), ［*PV*］
        Rewrite::new(
            "bracketed-music-video",
            r"[(［【][^(［【]*?((Music Video)|(MV)|(PV)).*?[】］)]",
            "",
        ),
        Rewrite::new(
            "bracketed-official-video",
            r"[(［【][^(［【]*?Official .*Video.*?[】］)]",
            "",
        ),
        Rewrite::new("bracketed-lyrics", r"[(［【][^(［【]*?lyrics.*?[】］)]", ""),
        Rewrite::new("bracketed-origin", r"[(［【]((オリジナル)|(東方)).*?[】］)]+?", ""),
        Rewrite::new(
            "video-marker-at-bracket",
            r"((?:Music Video)|MV|PV)([「［【『』】］」])",
            "${2}",
        ),
        Rewrite::new("trailing-video-marker", r"\s+(MV|PV)$", ""),
        Rewrite::new("short-lyrics-tag", r"[\(\[][^)\]]lyrics[)\]]", ""),
        // TVアニメ「Show」... ノンクレジットOP ｜ rest
        Rewrite::new("anime-credit", r"TVアニメ[「『][^」』]*[」』][^｜|／]*[｜|／]\s*", ""),
    ]
});

/// Strip annotation noise from a raw video title.
pub fn normalize(title: &str) -> String {
    let mut current = title.to_string();
    for rewrite in REWRITES.iter() {
        let next = rewrite.pattern.replace_all(&current, rewrite.replacement);
        if next != current {
            tracing::trace!(pass = rewrite.name, before = %current, after = %next, "rewrote title");
            current = next.into_owned();
        }
    }
    current.trim().to_string()
}
