// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory grant index.
//!
//! Four nested levels, each owning the next:
//!
//! ```text
//! type -> object -> caller pattern -> operation -> GrantValue
//! ```
//!
//! Caller patterns are kept in a `BTreeMap` so the wildcard scan visits them
//! in a stable order; the winner among several matching wildcards is decided
//! by longest literal prefix, not by iteration order.

use std::collections::{BTreeMap, HashMap};

use crate::decision::GrantValue;
use crate::wildcard;

/// Operation name -> stored value for one (type, object, caller) triple.
pub type OperationMap = HashMap<String, GrantValue>;

type CallerMap = BTreeMap<String, OperationMap>;
type ObjectMap = HashMap<String, CallerMap>;

#[derive(Debug, Default)]
pub struct PermissionIndex {
	types: HashMap<String, ObjectMap>,
}

impl PermissionIndex {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the operation map for a triple, creating the type, object and
	/// caller levels as needed. Returns the previous map, if any.
	pub fn replace(
		&mut self,
		type_name: &str,
		object: &str,
		caller: &str,
		operations: OperationMap,
	) -> Option<OperationMap> {
		self
			.types
			.entry(type_name.to_string())
			.or_default()
			.entry(object.to_string())
			.or_default()
			.insert(caller.to_string(), operations)
	}

	/// Undoes a [`replace`](Self::replace): puts `previous` back, or removes
	/// the entry (and any level left empty) when there was none.
	pub fn restore(
		&mut self,
		type_name: &str,
		object: &str,
		caller: &str,
		previous: Option<OperationMap>,
	) {
		if let Some(previous) = previous {
			self.replace(type_name, object, caller, previous);
			return;
		}

		let Some(objects) = self.types.get_mut(type_name) else {
			return;
		};
		if let Some(callers) = objects.get_mut(object) {
			callers.remove(caller);
			if callers.is_empty() {
				objects.remove(object);
			}
		}
		if objects.is_empty() {
			self.types.remove(type_name);
		}
	}

	/// Looks up the stored value for an operation.
	///
	/// `None` means no applicable grant at some level.
	pub fn lookup(
		&self,
		type_name: &str,
		object: &str,
		caller: &str,
		operation: &str,
	) -> Option<GrantValue> {
		let callers = self.types.get(type_name)?.get(object)?;
		let operations = Self::resolve_caller(callers, caller)?;
		operations.get(operation).copied()
	}

	/// Exact match first, then the matching wildcard with the longest
	/// literal prefix.
	fn resolve_caller<'a>(callers: &'a CallerMap, caller: &str) -> Option<&'a OperationMap> {
		if let Some(operations) = callers.get(caller) {
			return Some(operations);
		}

		callers
			.iter()
			.filter(|(pattern, _)| wildcard::is_wildcard(pattern) && wildcard::matches(pattern, caller))
			.max_by_key(|(pattern, _)| wildcard::literal_prefix(pattern).len())
			.map(|(_, operations)| operations)
	}

	/// Returns the operation map stored for an exact triple.
	pub fn get(&self, type_name: &str, object: &str, caller: &str) -> Option<&OperationMap> {
		self.types.get(type_name)?.get(object)?.get(caller)
	}

	/// Number of (type, object, caller) entries.
	pub fn len(&self) -> usize {
		self
			.types
			.values()
			.flat_map(|objects| objects.values())
			.map(|callers| callers.len())
			.sum()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	pub fn clear(&mut self) {
		self.types.clear();
	}
}
