// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schema lock owned by the database.
//!
//! The permission engine never acquires this lock. Mutating engine calls take
//! a [`SchemaWriteGuard`] instead, which can only be obtained by holding the
//! lock exclusively.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
pub struct SchemaLock {
	inner: RwLock<()>,
}

impl SchemaLock {
	pub fn new() -> Self {
		Self::default()
	}

	/// Blocks until the lock is held exclusively.
	pub fn write(&self) -> SchemaWriteGuard<'_> {
		SchemaWriteGuard {
			lock: self,
			_guard: self.inner.write(),
		}
	}

	/// Blocks until the lock is held shared.
	pub fn read(&self) -> SchemaReadGuard<'_> {
		SchemaReadGuard {
			_guard: self.inner.read(),
		}
	}

	pub fn is_write_locked(&self) -> bool {
		self.inner.is_locked_exclusive()
	}
}

/// Proof that the schema lock is held exclusively.
#[must_use = "the schema lock is released when the guard is dropped"]
pub struct SchemaWriteGuard<'a> {
	lock: &'a SchemaLock,
	_guard: RwLockWriteGuard<'a, ()>,
}

impl SchemaWriteGuard<'_> {
	/// Returns true if this guard was taken on `lock`.
	pub fn guards(&self, lock: &SchemaLock) -> bool {
		std::ptr::eq(self.lock, lock)
	}
}

#[must_use = "the schema lock is released when the guard is dropped"]
pub struct SchemaReadGuard<'a> {
	_guard: RwLockReadGuard<'a, ()>,
}
