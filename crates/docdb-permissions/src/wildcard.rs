// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Caller pattern matching.
//!
//! A caller pattern is either a literal caller name (`com.example.app`) or a
//! literal prefix followed by a trailing wildcard (`com.example.*`). The bare
//! wildcard `*` matches every caller.
//!
//! Rules:
//! - patterns are non-empty
//! - `*` may appear at most once, as the last character
//! - unless the pattern is the bare `*`, the wildcard must follow a `.`

/// Wildcard marker.
pub const WILDCARD: char = '*';

/// Returns true if `pattern` is a well-formed caller pattern.
pub fn is_valid(pattern: &str) -> bool {
	if pattern.is_empty() {
		return false;
	}
	match pattern.find(WILDCARD) {
		None => true,
		Some(pos) => {
			if pos != pattern.len() - 1 {
				return false;
			}
			pos == 0 || pattern[..pos].ends_with('.')
		}
	}
}

/// Returns true if `pattern` ends with the wildcard marker.
pub fn is_wildcard(pattern: &str) -> bool {
	pattern.ends_with(WILDCARD)
}

/// The literal part of a pattern (everything before a trailing wildcard).
pub fn literal_prefix(pattern: &str) -> &str {
	pattern.strip_suffix(WILDCARD).unwrap_or(pattern)
}

/// Matches a stored pattern against a concrete caller.
///
/// Patterns without a wildcard only match by equality.
pub fn matches(pattern: &str, caller: &str) -> bool {
	match pattern.strip_suffix(WILDCARD) {
		Some(prefix) => caller.starts_with(prefix),
		None => pattern == caller,
	}
}
