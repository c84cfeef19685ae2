// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission engine: grant ingestion and permission checks.
//!
//! The engine owns the in-memory [`PermissionIndex`] and talks to two
//! collaborators handed in at construction:
//!
//! - a [`Database`] that persists grant documents and owns the schema lock
//! - a [`KindEngine`] that answers the recursive permission check made when
//!   a grant targets the kind-permission type itself
//!
//! # Locking
//!
//! The engine does no locking of its own. Every mutating call takes `&mut
//! self` and a [`SchemaWriteGuard`] taken on the database's schema lock;
//! [`PolicyEngine::check`] takes `&self` and may run concurrently with other
//! checks.
//!
//! # Lifecycle
//!
//! ```text
//! Unconfigured --configure--> Configured --close--> Closed
//!                               ^     |
//!                               +-----+ configure
//! ```
//!
//! Mutating calls on a closed engine fail with [`PermissionError::Closed`].

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, trace, warn};

use crate::config::PermissionsConfig;
use crate::decision::Decision;
use crate::error::{PermissionError, Result};
use crate::grant::{self, GrantFields};
use crate::index::PermissionIndex;
use crate::lock::SchemaWriteGuard;
use crate::store::{Database, GrantLookup, KindEngine};
use crate::types::{
	OperationKind, RequestContext, KIND_PERMISSION_TYPE, PERMISSION_KIND_ID, WILDCARD_OPERATION,
};
use crate::wildcard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
	Unconfigured,
	Configured,
	Closed,
}

pub struct PolicyEngine {
	db: Arc<dyn Database>,
	kinds: Arc<dyn KindEngine>,
	index: PermissionIndex,
	enabled: bool,
	state: EngineState,
}

impl PolicyEngine {
	/// Creates an empty, enabled engine.
	pub fn new(db: Arc<dyn Database>, kinds: Arc<dyn KindEngine>) -> Self {
		Self {
			db,
			kinds,
			index: PermissionIndex::new(),
			enabled: true,
			state: EngineState::Unconfigured,
		}
	}

	pub fn state(&self) -> EngineState {
		self.state
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	/// Number of (type, object, caller) grants in the index.
	pub fn grant_count(&self) -> usize {
		self.index.len()
	}

	/// Ingests one grant record.
	///
	/// Validation (required fields, caller pattern, the kind-permission
	/// self-check, operation values) completes before anything changes. With
	/// `persist`, the grant document is written after the index is updated
	/// and the index entry is rolled back if that write fails.
	#[instrument(
		level = "debug",
		skip(self, record, req, lock),
		fields(caller = %req.caller, admin = req.admin)
	)]
	pub fn put(
		&mut self,
		record: &Value,
		req: &RequestContext,
		persist: bool,
		lock: &SchemaWriteGuard<'_>,
	) -> Result<()> {
		self.assert_write_locked(lock);
		self.ensure_open()?;

		let fields = GrantFields::extract(record)?;
		if !wildcard::is_valid(fields.caller) {
			return Err(PermissionError::InvalidCaller(fields.caller.to_string()));
		}

		// Grants on kinds may only be written by someone allowed to update
		// the kind itself.
		if fields.type_name == KIND_PERMISSION_TYPE {
			self
				.kinds
				.check_permission(&*self, fields.object, OperationKind::Update, req)?;
		}

		let operations = fields.parse_operations()?;
		let previous = self.index.replace(
			fields.type_name,
			fields.object,
			fields.caller,
			operations,
		);

		if persist {
			let doc = grant::to_document(record, fields.document_id());
			if let Err(err) = self.db.put(doc, &req.elevated()) {
				warn!(
					type_name = fields.type_name,
					object = fields.object,
					grant_caller = fields.caller,
					error = %err,
					"failed to persist grant, rolling back index entry"
				);
				self.index.restore(
					fields.type_name,
					fields.object,
					fields.caller,
					previous,
				);
				return Err(err.into());
			}
		}

		debug!(
			type_name = fields.type_name,
			object = fields.object,
			grant_caller = fields.caller,
			operations = fields.operations.len(),
			replaced = previous.is_some(),
			persist,
			"grant ingested"
		);
		Ok(())
	}

	/// Ingests and persists a batch of grant records, stopping at the first
	/// failure. Returns the number ingested.
	pub fn put_all(
		&mut self,
		records: &[Value],
		req: &RequestContext,
		lock: &SchemaWriteGuard<'_>,
	) -> Result<usize> {
		for record in records {
			self.put(record, req, true, lock)?;
		}
		Ok(records.len())
	}

	/// Looks up the decision for `operation`.
	///
	/// Resolution: type, then object, then caller (exact name first, then
	/// the matching wildcard pattern with the longest literal prefix), then
	/// operation. Any miss yields [`Decision::Undefined`].
	#[instrument(level = "trace", skip(self))]
	pub fn check(&self, type_name: &str, object: &str, caller: &str, operation: &str) -> Decision {
		let decision = self
			.index
			.lookup(type_name, object, caller, operation)
			.map(Decision::from)
			.unwrap_or_default();
		trace!(%decision, "permission checked");
		decision
	}

	/// Like [`check`](Self::check), falling back to the `"*"` operation
	/// when `operation` itself has no grant.
	pub fn check_operation_or_wildcard(
		&self,
		type_name: &str,
		object: &str,
		caller: &str,
		operation: &str,
	) -> Decision {
		match self.check(type_name, object, caller, operation) {
			Decision::Undefined if operation != WILDCARD_OPERATION => {
				self.check(type_name, object, caller, WILDCARD_OPERATION)
			}
			decision => decision,
		}
	}

	/// Applies `config`: sets the enabled flag when present, then seeds the
	/// built-in grants (not persisted).
	pub fn configure(
		&mut self,
		config: &PermissionsConfig,
		req: &RequestContext,
		lock: &SchemaWriteGuard<'_>,
	) -> Result<()> {
		self.assert_write_locked(lock);
		self.ensure_open()?;

		if let Some(enabled) = config.permissions_enabled {
			self.enabled = enabled;
		}

		let admin = req.elevated();
		for grant in &config.permissions {
			self.put(grant, &admin, false, lock)?;
		}

		self.state = EngineState::Configured;
		info!(
			enabled = self.enabled,
			builtin_grants = config.permissions.len(),
			"permission engine configured"
		);
		Ok(())
	}

	/// Configures the engine and reloads every grant persisted in the
	/// database by earlier sessions.
	pub fn open(
		&mut self,
		config: &PermissionsConfig,
		req: &RequestContext,
		lock: &SchemaWriteGuard<'_>,
	) -> Result<()> {
		self.configure(config, req, lock)?;

		let admin = req.elevated();
		let stored = self.db.find_by_kind(PERMISSION_KIND_ID)?;
		for doc in &stored {
			self.put(doc, &admin, false, lock)?;
		}

		info!(
			reloaded = stored.len(),
			grants = self.index.len(),
			"permission engine opened"
		);
		Ok(())
	}

	/// Drops every grant and releases the database. Both steps always run;
	/// the first error is returned.
	pub fn close(&mut self) -> Result<()> {
		if self.state == EngineState::Closed {
			return Ok(());
		}

		let mut result = Ok(());
		let cleared = self.index.len();
		self.index.clear();
		self.state = EngineState::Closed;
		accumulate(&mut result, self.db.flush().map_err(PermissionError::from));

		info!(cleared, "permission engine closed");
		result
	}

	fn ensure_open(&self) -> Result<()> {
		if self.state == EngineState::Closed {
			return Err(PermissionError::Closed);
		}
		Ok(())
	}

	fn assert_write_locked(&self, lock: &SchemaWriteGuard<'_>) {
		debug_assert!(
			lock.guards(self.db.schema_lock()),
			"schema write guard was taken on another database's lock"
		);
	}
}

impl GrantLookup for PolicyEngine {
	fn check(&self, type_name: &str, object: &str, caller: &str, operation: &str) -> Decision {
		PolicyEngine::check(self, type_name, object, caller, operation)
	}

	fn is_enabled(&self) -> bool {
		self.enabled
	}
}

/// Keeps the first error.
fn accumulate(result: &mut Result<()>, next: Result<()>) {
	if result.is_ok() {
		*result = next;
	}
}
