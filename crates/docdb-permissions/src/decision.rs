// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Grant values and query decisions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PermissionError;

/// Value stored for a single operation in the index.
///
/// There is no "undefined" variant: the index can only ever hold an explicit
/// allow or deny.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantValue {
	Allow,
	Deny,
}

impl GrantValue {
	pub const ALLOW: &'static str = "allow";
	pub const DENY: &'static str = "deny";

	pub fn as_str(&self) -> &'static str {
		match self {
			GrantValue::Allow => Self::ALLOW,
			GrantValue::Deny => Self::DENY,
		}
	}
}

impl FromStr for GrantValue {
	type Err = PermissionError;

	/// Only the exact lowercase strings are accepted.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			Self::ALLOW => Ok(GrantValue::Allow),
			Self::DENY => Ok(GrantValue::Deny),
			other => Err(PermissionError::InvalidPermissions(other.to_string())),
		}
	}
}

impl fmt::Display for GrantValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Result of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
	/// No applicable grant.
	#[default]
	Undefined,
	Allow,
	Deny,
}

impl Decision {
	pub fn is_allowed(&self) -> bool {
		matches!(self, Decision::Allow)
	}

	pub fn is_undefined(&self) -> bool {
		matches!(self, Decision::Undefined)
	}
}

impl From<GrantValue> for Decision {
	fn from(value: GrantValue) -> Self {
		match value {
			GrantValue::Allow => Decision::Allow,
			GrantValue::Deny => Decision::Deny,
		}
	}
}

impl fmt::Display for Decision {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Decision::Undefined => f.write_str("undefined"),
			Decision::Allow => f.write_str("allow"),
			Decision::Deny => f.write_str("deny"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_allow_and_deny() {
		assert_eq!("allow".parse::<GrantValue>().unwrap(), GrantValue::Allow);
		assert_eq!("deny".parse::<GrantValue>().unwrap(), GrantValue::Deny);
	}

	#[test]
	fn rejects_anything_else() {
		for value in ["maybe", "Allow", "DENY", "", " allow", "undefined"] {
			let err = value.parse::<GrantValue>().unwrap_err();
			assert!(
				matches!(err, PermissionError::InvalidPermissions(ref v) if v == value),
				"{value:?} should be rejected"
			);
		}
	}

	#[test]
	fn grant_values_map_to_decisions() {
		assert_eq!(Decision::from(GrantValue::Allow), Decision::Allow);
		assert_eq!(Decision::from(GrantValue::Deny), Decision::Deny);
		assert!(Decision::default().is_undefined());
		assert!(Decision::Allow.is_allowed());
		assert!(!Decision::Deny.is_allowed());
	}
}
