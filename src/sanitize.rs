// src/sanitize.rs

use crate::error::{KeepError, Result};

pub const NOTE_SUFFIX: &str = ".txt";

/// Reduce a user supplied identifier to a safe note filename.
///
/// Directory components are dropped, surrounding whitespace trimmed, the
/// `.txt` suffix appended when missing, and every character outside
/// `[A-Za-z0-9_.-]` replaced (not removed) with `_`.
pub fn sanitize_name(raw: &str) -> Result<String> {
    let base = raw.rsplit('/').next().unwrap_or("").trim();
    if base.is_empty() {
        return Err(KeepError::InvalidName);
    }

    let mut name = base.to_string();
    if !name.ends_with(NOTE_SUFFIX) {
        name.push_str(NOTE_SUFFIX);
    }

    Ok(name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect())
}
