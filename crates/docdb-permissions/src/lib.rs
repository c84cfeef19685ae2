// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission engine for docdb.
//!
//! Decides whether a caller may perform an operation on a `(type, object)`
//! resource, based on grant records ingested through the database write path.
//!
//! - [`PolicyEngine`]: ingests grants (`put`), answers checks (`check`),
//!   applies configuration (`configure`/`open`) and tears down (`close`)
//! - [`wildcard`]: caller pattern validation and matching
//! - [`Database`] / [`KindEngine`]: contracts the engine consumes from the
//!   surrounding database
//! - [`memory`]: in-memory implementations of those contracts
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use docdb_permissions::memory::{KindRegistry, MemoryDatabase};
//! use docdb_permissions::{Database, Decision, PolicyEngine, RequestContext};
//! use serde_json::json;
//!
//! let db = Arc::new(MemoryDatabase::new());
//! let mut engine = PolicyEngine::new(db.clone(), Arc::new(KindRegistry::new()));
//!
//! let lock = db.schema_lock().write();
//! engine
//!     .put(
//!         &json!({
//!             "type": "com.example.kind",
//!             "object": "db.kind",
//!             "caller": "com.example.*",
//!             "operations": { "read": "allow", "write": "deny" }
//!         }),
//!         &RequestContext::admin("com.example.setup"),
//!         false,
//!         &lock,
//!     )
//!     .unwrap();
//! drop(lock);
//!
//! assert_eq!(
//!     engine.check("com.example.kind", "db.kind", "com.example.app1", "read"),
//!     Decision::Allow
//! );
//! ```

pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod grant;
pub mod index;
pub mod item;
pub mod lock;
pub mod memory;
pub mod store;
pub mod types;
pub mod wildcard;

pub use config::PermissionsConfig;
pub use decision::{Decision, GrantValue};
pub use engine::{EngineState, PolicyEngine};
pub use error::{PermissionError, Result, StoreError};
pub use grant::{permission_id, GrantFields};
pub use index::{OperationMap, PermissionIndex};
pub use item::ObjectItem;
pub use lock::{SchemaLock, SchemaReadGuard, SchemaWriteGuard};
pub use store::{Database, GrantLookup, KindEngine};
pub use types::{
	OperationKind, RequestContext, ID_KEY, KIND_KEY, KIND_PERMISSION_TYPE, PERMISSION_KIND_ID,
	WILDCARD_OPERATION,
};
