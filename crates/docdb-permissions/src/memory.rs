// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory implementations of the database and kind engine contracts.
//!
//! Used by the bulk image generator and by tests. Documents are kept in id
//! order so snapshots are deterministic.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::decision::Decision;
use crate::error::{PermissionError, StoreError};
use crate::item::ObjectItem;
use crate::lock::SchemaLock;
use crate::store::{Database, GrantLookup, KindEngine};
use crate::types::{
	OperationKind, RequestContext, ID_KEY, KIND_KEY, KIND_PERMISSION_TYPE, WILDCARD_OPERATION,
};
use crate::wildcard;

#[derive(Debug, Default)]
pub struct MemoryDatabase {
	docs: RwLock<BTreeMap<String, Value>>,
	schema_lock: SchemaLock,
	read_only: AtomicBool,
}

impl MemoryDatabase {
	pub fn new() -> Self {
		Self::default()
	}

	/// Rejects writes and flushes while set.
	pub fn set_read_only(&self, read_only: bool) {
		self.read_only.store(read_only, Ordering::SeqCst);
	}

	pub fn get(&self, id: &str) -> Option<Value> {
		self.docs.read().get(id).cloned()
	}

	pub fn len(&self) -> usize {
		self.docs.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.docs.read().is_empty()
	}

	/// Every document, ordered by id.
	pub fn snapshot(&self) -> Vec<Value> {
		self.docs.read().values().cloned().collect()
	}

	/// Removes every document.
	pub fn drop_all(&self) {
		self.docs.write().clear();
	}

	fn ensure_writable(&self) -> Result<(), StoreError> {
		if self.read_only.load(Ordering::SeqCst) {
			return Err(StoreError::Internal("database is read-only".to_string()));
		}
		Ok(())
	}
}

impl Database for MemoryDatabase {
	fn put(&self, doc: Value, req: &RequestContext) -> Result<(), StoreError> {
		self.ensure_writable()?;

		let item = ObjectItem::new(doc);
		if !item.as_value().is_object() {
			return Err(StoreError::InvalidDocument(
				"document must be a JSON object".to_string(),
			));
		}
		item.kind_id()?;

		let existing_id = match item.id() {
			Some(Value::String(id)) => Some(id.clone()),
			Some(other) => {
				return Err(StoreError::InvalidDocument(format!(
					"'_id' must be a string, got {other}"
				)))
			}
			None => None,
		};

		let mut doc = item.into_value();
		let id = match existing_id {
			Some(id) => id,
			None => {
				let id = Uuid::new_v4().to_string();
				if let Value::Object(fields) = &mut doc {
					fields.insert(ID_KEY.to_string(), Value::String(id.clone()));
				}
				id
			}
		};

		trace!(%id, caller = %req.caller, admin = req.admin, "storing document");
		self.docs.write().insert(id, doc);
		Ok(())
	}

	fn find_by_kind(&self, kind_id: &str) -> Result<Vec<Value>, StoreError> {
		Ok(self
			.docs
			.read()
			.values()
			.filter(|doc| doc.get(KIND_KEY).and_then(Value::as_str) == Some(kind_id))
			.cloned()
			.collect())
	}

	fn schema_lock(&self) -> &SchemaLock {
		&self.schema_lock
	}

	fn flush(&self) -> Result<(), StoreError> {
		self.ensure_writable()
	}
}

/// Minimal kind definition: an id and the caller that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindDef {
	pub id: String,
	/// Caller name or wildcard pattern with full rights on the kind.
	pub owner: String,
}

#[derive(Debug, Default)]
pub struct KindRegistry {
	kinds: RwLock<HashMap<String, KindDef>>,
}

impl KindRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers (or replaces) a kind from its JSON definition.
	pub fn put_kind(&self, def: &Value) -> Result<KindDef, PermissionError> {
		let kind = KindDef::deserialize(def).map_err(|_| PermissionError::InvalidField {
			field: "kind",
			expected: "an object with string 'id' and 'owner'",
		})?;
		if !wildcard::is_valid(&kind.owner) {
			return Err(PermissionError::InvalidCaller(kind.owner));
		}

		debug!(kind_id = %kind.id, owner = %kind.owner, "kind registered");
		self.kinds.write().insert(kind.id.clone(), kind.clone());
		Ok(kind)
	}

	pub fn get(&self, kind_id: &str) -> Option<KindDef> {
		self.kinds.read().get(kind_id).cloned()
	}

	pub fn contains(&self, kind_id: &str) -> bool {
		self.kinds.read().contains_key(kind_id)
	}

	pub fn len(&self) -> usize {
		self.kinds.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.kinds.read().is_empty()
	}

	pub fn clear(&self) {
		self.kinds.write().clear();
	}
}

impl KindEngine for KindRegistry {
	/// Admin requests and disabled enforcement pass. Otherwise the caller
	/// must own the kind or hold an allow grant for the operation (or `*`)
	/// on it.
	fn check_permission(
		&self,
		grants: &dyn GrantLookup,
		kind_id: &str,
		op: OperationKind,
		req: &RequestContext,
	) -> Result<(), PermissionError> {
		if req.admin || !grants.is_enabled() {
			return Ok(());
		}

		let kind = self
			.get(kind_id)
			.ok_or_else(|| PermissionError::KindNotFound(kind_id.to_string()))?;
		if wildcard::matches(&kind.owner, &req.caller) {
			return Ok(());
		}

		let decision = match grants.check(KIND_PERMISSION_TYPE, kind_id, &req.caller, op.as_str()) {
			Decision::Undefined => {
				grants.check(KIND_PERMISSION_TYPE, kind_id, &req.caller, WILDCARD_OPERATION)
			}
			decision => decision,
		};

		if decision.is_allowed() {
			Ok(())
		} else {
			Err(PermissionError::PermissionDenied {
				kind_id: kind_id.to_string(),
				caller: req.caller.clone(),
				operation: op.to_string(),
			})
		}
	}
}
