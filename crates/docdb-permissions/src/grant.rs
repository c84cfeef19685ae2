// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Grant record fields and their persisted form.
//!
//! A grant record looks like:
//!
//! ```json
//! {
//!   "type": "db.kind",
//!   "object": "com.example.contact:1",
//!   "caller": "com.example.*",
//!   "operations": { "read": "allow", "update": "deny" }
//! }
//! ```

use serde_json::{Map, Value};

use crate::decision::GrantValue;
use crate::error::{PermissionError, Result};
use crate::index::OperationMap;
use crate::types::{ID_KEY, KIND_KEY, PERMISSION_KIND_ID};

pub const TYPE_KEY: &str = "type";
pub const OBJECT_KEY: &str = "object";
pub const CALLER_KEY: &str = "caller";
pub const OPERATIONS_KEY: &str = "operations";

/// Borrowed view of the required fields of a grant record.
#[derive(Debug, Clone, Copy)]
pub struct GrantFields<'a> {
	pub type_name: &'a str,
	pub object: &'a str,
	pub caller: &'a str,
	pub operations: &'a Map<String, Value>,
}

impl<'a> GrantFields<'a> {
	/// Pulls the four required fields out of a record.
	pub fn extract(record: &'a Value) -> Result<Self> {
		let record = record.as_object().ok_or(PermissionError::InvalidField {
			field: "record",
			expected: "an object",
		})?;

		Ok(Self {
			type_name: required_str(record, TYPE_KEY)?,
			object: required_str(record, OBJECT_KEY)?,
			caller: required_str(record, CALLER_KEY)?,
			operations: required(record, OPERATIONS_KEY)?
				.as_object()
				.ok_or(PermissionError::InvalidField {
					field: OPERATIONS_KEY,
					expected: "an object",
				})?,
		})
	}

	/// Parses every operation value. Fails on the first value that is not
	/// exactly `"allow"` or `"deny"`.
	pub fn parse_operations(&self) -> Result<OperationMap> {
		self
			.operations
			.iter()
			.map(|(name, value)| -> Result<(String, GrantValue)> {
				let value = value
					.as_str()
					.ok_or_else(|| PermissionError::InvalidPermissions(value.to_string()))?;
				Ok((name.clone(), value.parse::<GrantValue>()?))
			})
			.collect()
	}

	/// Id of the persisted grant document.
	pub fn document_id(&self) -> String {
		permission_id(self.type_name, self.object, self.caller)
	}
}

/// `_permissions/{type}-{object}-{caller}`
pub fn permission_id(type_name: &str, object: &str, caller: &str) -> String {
	format!("_permissions/{type_name}-{object}-{caller}")
}

/// Copy of `record` tagged with its synthesized id and the permission kind.
pub fn to_document(record: &Value, id: String) -> Value {
	let mut doc = record.clone();
	if let Value::Object(fields) = &mut doc {
		fields.insert(ID_KEY.to_string(), Value::String(id));
		fields.insert(
			KIND_KEY.to_string(),
			Value::String(PERMISSION_KIND_ID.to_string()),
		);
	}
	doc
}

fn required<'a>(record: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value> {
	record.get(field).ok_or(PermissionError::MissingField(field))
}

fn required_str<'a>(record: &'a Map<String, Value>, field: &'static str) -> Result<&'a str> {
	required(record, field)?
		.as_str()
		.ok_or(PermissionError::InvalidField {
			field,
			expected: "a string",
		})
}
