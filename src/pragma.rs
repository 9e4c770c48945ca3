// Copyright 2026 Martin Pool

//! Source-comment pragmas that suppress mutation on a single line.
//!
//! A trailing line comment of the form `// pragma: no mutate` (optionally
//! followed by `: category, category, ...`) marks the mutations touching
//! that line as forbidden, the same way `cosmic-ray` lets a source line
//! opt itself out of mutation without an attribute.

use once_cell::sync::Lazy;
use regex::Regex;

/// True if `line` carries a `no mutate` pragma that applies to `genre_name`.
///
/// With no category list the pragma suppresses every genre on that line;
/// with a category list (comma-separated genre names, matched
/// case-insensitively) it only suppresses the named ones.
pub fn line_is_excluded(line: &str, genre_name: &str) -> bool {
    static PRAGMA_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"pragma:\s*no\s*mutate(?:\s*:\s*(?P<categories>[\w, ]+))?").unwrap());
    let Some(comment_start) = line.find("//") else {
        return false;
    };
    let Some(captures) = PRAGMA_RE.captures(&line[comment_start..]) else {
        return false;
    };
    match captures.name("categories") {
        None => true,
        Some(categories) => categories
            .as_str()
            .split(',')
            .map(str::trim)
            .any(|c| c.eq_ignore_ascii_case(genre_name)),
    }
}
