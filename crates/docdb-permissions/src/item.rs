// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-record wrapper used by the database write path.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::StoreError;
use crate::types::{ID_KEY, KIND_KEY};

/// A JSON document with accessors for its id and kind tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectItem {
	obj: Value,
}

impl ObjectItem {
	pub fn new(obj: Value) -> Self {
		Self { obj }
	}

	/// The `_id` value, if the document has one.
	pub fn id(&self) -> Option<&Value> {
		self.obj.get(ID_KEY)
	}

	/// The `_kind` tag. Every stored document must have one.
	pub fn kind_id(&self) -> Result<&str, StoreError> {
		self
			.obj
			.get(KIND_KEY)
			.and_then(Value::as_str)
			.ok_or(StoreError::MissingKind)
	}

	/// Number of top-level fields.
	pub fn size(&self) -> usize {
		self.obj.as_object().map(|fields| fields.len()).unwrap_or(0)
	}

	pub fn as_value(&self) -> &Value {
		&self.obj
	}

	pub fn into_value(self) -> Value {
		self.obj
	}
}

impl Serialize for ObjectItem {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.obj.serialize(serializer)
	}
}
