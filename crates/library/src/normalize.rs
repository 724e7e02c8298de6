//! Name and identifier normalization.
//!
//! Names are display-only, but the same title scanned locally and fetched
//! remotely must still produce byte-identical strings. Ids are the join key
//! and get persisted, so every normalizer must be total and deterministic.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::GameId;

static TRADEMARKS: LazyLock<Regex> = LazyLock::new(|| regex(r"[™©®]"));
static BRACKETED: LazyLock<Regex> = LazyLock::new(|| regex(r"\[.*?\]"));
static PARENTHESIZED: LazyLock<Regex> = LazyLock::new(|| regex(r"\(.*?\)"));
static COLON: LazyLock<Regex> = LazyLock::new(|| regex(r"\s*:\s*"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| regex(r"\s+"));
static TRAILING_THE: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i),\s*the$"));

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

/// Removes trademark, registered and copyright marks.
pub fn remove_trademarks(raw: &str) -> String {
    TRADEMARKS.replace_all(raw, "").into_owned()
}

/// Canonical display form of a game title.
///
/// Bracketed and parenthesized tags are dropped unless the name would
/// become empty, spacing around `:` is normalized, whitespace collapsed
/// and a trailing `, The` moved to the front.
pub fn normalize_name(raw: &str) -> String {
    let name = remove_trademarks(raw).replace('_', " ");
    let name = remove_unless_empty(&BRACKETED, &name);
    let name = remove_unless_empty(&PARENTHESIZED, &name);
    let name = COLON.replace_all(&name, ": ");
    let name = WHITESPACE.replace_all(&name, " ");
    let name = name.trim();

    if TRAILING_THE.is_match(name) {
        let stripped = TRAILING_THE.replace(name, "");
        return format!("The {}", stripped.trim());
    }

    name.to_string()
}

fn remove_unless_empty(pattern: &Regex, input: &str) -> String {
    let removed = pattern.replace_all(input, "");
    if removed.trim().is_empty() {
        input.to_string()
    } else {
        removed.into_owned()
    }
}

/// Platform-specific canonicalization of ids and names.
pub trait IdNormalizer {
    /// Maps a raw platform value to its canonical id.
    ///
    /// Must be total and idempotent: canonical input maps to itself.
    fn normalize_id(&self, raw: &str) -> GameId;

    /// Suffixes the platform appends to titles.
    ///
    /// Matched case-insensitively and only as whole trailing words.
    fn name_suffixes(&self) -> &'static [&'static str] {
        &[]
    }

    /// Normalizes `raw` and strips this platform's suffixes.
    fn normalize_name(&self, raw: &str) -> String {
        let mut name = normalize_name(raw);
        for suffix in self.name_suffixes() {
            if let Some(stripped) = strip_suffix_ignore_case(&name, suffix) {
                let stripped = stripped.trim_end_matches([' ', '-', ':']);
                if !stripped.is_empty() {
                    name = stripped.to_string();
                }
            }
        }
        name
    }
}

fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let split = name.len().checked_sub(suffix.len())?;
    if !name.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = name.split_at(split);
    let at_word_start = head.chars().next_back().is_none_or(|c| !c.is_alphanumeric());
    (at_word_start && tail.eq_ignore_ascii_case(suffix)).then_some(head)
}
