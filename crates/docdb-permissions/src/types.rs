// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request context, operation kinds and reserved names.

use serde::{Deserialize, Serialize};

/// Document field holding the id.
pub const ID_KEY: &str = "_id";
/// Document field holding the kind tag.
pub const KIND_KEY: &str = "_kind";

/// Kind tag of persisted grant documents.
pub const PERMISSION_KIND_ID: &str = "permission";
/// Resource type whose grants govern access to kinds. Writing a grant of
/// this type requires update permission on the target kind.
pub const KIND_PERMISSION_TYPE: &str = "db.kind";
/// Operation name matching any operation in a grant.
pub const WILDCARD_OPERATION: &str = "*";

/// Who is acting, and with what privilege.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
	pub caller: String,
	pub admin: bool,
}

impl RequestContext {
	/// Creates an unprivileged request for `caller`.
	pub fn new(caller: impl Into<String>) -> Self {
		Self {
			caller: caller.into(),
			admin: false,
		}
	}

	/// Creates an administrative request for `caller`.
	pub fn admin(caller: impl Into<String>) -> Self {
		Self {
			caller: caller.into(),
			admin: true,
		}
	}

	/// Same caller, with administrative privilege.
	pub fn elevated(&self) -> Self {
		Self {
			caller: self.caller.clone(),
			admin: true,
		}
	}
}

/// Operations checked against kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
	Create,
	Read,
	Update,
	Delete,
	Extend,
}

impl OperationKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			OperationKind::Create => "create",
			OperationKind::Read => "read",
			OperationKind::Update => "update",
			OperationKind::Delete => "delete",
			OperationKind::Extend => "extend",
		}
	}
}

impl std::fmt::Display for OperationKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
