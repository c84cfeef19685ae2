// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Contracts the permission engine consumes from the surrounding database.

use serde_json::Value;

use crate::decision::Decision;
use crate::error::{PermissionError, StoreError};
use crate::lock::SchemaLock;
use crate::types::{OperationKind, RequestContext};

/// Document persistence and lock state.
pub trait Database: Send + Sync {
	/// Writes a document. `req` is already elevated when the engine writes
	/// its own grant documents.
	fn put(&self, doc: Value, req: &RequestContext) -> Result<(), StoreError>;

	/// All stored documents tagged with `kind_id`.
	fn find_by_kind(&self, kind_id: &str) -> Result<Vec<Value>, StoreError>;

	/// The exclusive lock that serializes grant ingestion against checks.
	fn schema_lock(&self) -> &SchemaLock;

	/// Releases anything the database holds for the engine.
	fn flush(&self) -> Result<(), StoreError> {
		Ok(())
	}
}

/// Read access to ingested grants.
pub trait GrantLookup {
	fn check(&self, type_name: &str, object: &str, caller: &str, operation: &str) -> Decision;

	/// Whether permission enforcement is switched on.
	fn is_enabled(&self) -> bool;
}

/// Schema engine: answers whether a request may operate on a kind.
pub trait KindEngine: Send + Sync {
	fn check_permission(
		&self,
		grants: &dyn GrantLookup,
		kind_id: &str,
		op: OperationKind,
		req: &RequestContext,
	) -> Result<(), PermissionError>;
}
