//! Web-safe name normalization.

use mediadesk_core::{AppError, AppResult};

/// Marks removed outright rather than turned into a separator.
const DROPPED: [char; 6] = ['\'', '"', '`', '^', '~', '?'];

/// Normalize a display name into a single path segment.
///
/// The name is transliterated to ASCII and lowercased. Quote-like marks
/// (`'`, `"`, `` ` ``, `^`, `~`, `?`) are dropped, every other run of
/// characters outside `[a-z0-9.]` becomes one `-`, runs of `.` collapse to
/// one, a `-` touching a `.` is dropped, and leading/trailing `-` and `.`
/// are trimmed. A name that normalizes to nothing is rejected.
pub fn normalize_name(name: &str) -> AppResult<String> {
    let ascii = deunicode::deunicode(name);
    let mut out = String::with_capacity(ascii.len());

    for ch in ascii.chars() {
        let ch = ch.to_ascii_lowercase();
        if DROPPED.contains(&ch) {
            continue;
        }
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            out.push(ch);
        } else if ch == '.' {
            match out.chars().last() {
                Some('.') => {}
                Some('-') => {
                    out.pop();
                    out.push('.');
                }
                _ => out.push('.'),
            }
        } else if !matches!(out.chars().last(), Some('-') | Some('.')) {
            out.push('-');
        }
    }

    let trimmed = out.trim_matches(|c| c == '-' || c == '.');
    if trimmed.is_empty() {
        return Err(AppError::invalid_name(format!(
            "Name '{name}' does not contain any usable characters"
        )));
    }

    Ok(trimmed.to_string())
}

/// Split a basename into stem and extension (`"a.tar.gz"` → `("a.tar", Some("gz"))`).
pub fn split_extension(basename: &str) -> (&str, Option<&str>) {
    match basename.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < basename.len() => {
            (&basename[..idx], Some(&basename[idx + 1..]))
        }
        _ => (basename, None),
    }
}
