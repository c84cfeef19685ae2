// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Engine configuration.
//!
//! ```json
//! {
//!   "permissionsEnabled": true,
//!   "permissions": [ { "type": "...", "object": "...", "caller": "...", "operations": { ... } } ]
//! }
//! ```
//!
//! Unset fields leave the engine's current state alone, so configurations
//! layer the same way across repeated `configure` calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PermissionError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsConfig {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub permissions_enabled: Option<bool>,
	/// Built-in grant records, validated when they are ingested.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub permissions: Vec<Value>,
}

impl PermissionsConfig {
	pub fn from_value(value: &Value) -> Result<Self> {
		Self::deserialize(value).map_err(|e| PermissionError::InvalidConfig(e.to_string()))
	}

	pub fn from_json_str(json: &str) -> Result<Self> {
		serde_json::from_str(json).map_err(|e| PermissionError::InvalidConfig(e.to_string()))
	}

	pub fn with_enabled(mut self, enabled: bool) -> Self {
		self.permissions_enabled = Some(enabled);
		self
	}

	pub fn with_grant(mut self, grant: Value) -> Self {
		self.permissions.push(grant);
		self
	}

	/// Overlays `other`: a set flag overrides, built-in grants accumulate.
	pub fn merge(&mut self, other: Self) {
		if other.permissions_enabled.is_some() {
			self.permissions_enabled = other.permissions_enabled;
		}
		self.permissions.extend(other.permissions);
	}
}
