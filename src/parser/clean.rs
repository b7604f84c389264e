use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?[^>]+(>|$)").unwrap());
static MD_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static HREF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"href="([^"]+)""#).unwrap());

/// Drop HTML tags, then collapse `[label](target)` to `label`.
/// Used on the company and location cells.
pub fn strip_markup(cell: &str) -> String {
    let without_tags = TAG_RE.replace_all(cell, "");
    MD_LINK_RE.replace_all(&without_tags, "$1").into_owned()
}

/// First `href="..."` target in the cell, or the cell itself when there is none.
pub fn extract_link(cell: &str) -> String {
    match HREF_RE.captures(cell) {
        Some(caps) => caps[1].to_string(),
        None => cell.to_string(),
    }
}

// ── Tests ──
