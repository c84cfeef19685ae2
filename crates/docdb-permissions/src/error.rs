// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for grant ingestion and the database collaborators.

use thiserror::Error;

/// Result type for permission engine operations.
pub type Result<T> = std::result::Result<T, PermissionError>;

/// Errors raised while ingesting grants or configuring the engine.
///
/// `check` never produces one of these: a missing grant is reported as
/// [`Decision::Undefined`](crate::Decision::Undefined).
#[derive(Debug, Error)]
pub enum PermissionError {
	#[error("missing required field '{0}'")]
	MissingField(&'static str),

	#[error("invalid field '{field}': expected {expected}")]
	InvalidField {
		field: &'static str,
		expected: &'static str,
	},

	#[error("invalid caller pattern '{0}'")]
	InvalidCaller(String),

	#[error("invalid permission value '{0}'")]
	InvalidPermissions(String),

	#[error("permission denied: '{caller}' may not {operation} kind '{kind_id}'")]
	PermissionDenied {
		kind_id: String,
		caller: String,
		operation: String,
	},

	#[error("kind not found: {0}")]
	KindNotFound(String),

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("permission engine is closed")]
	Closed,

	#[error("store error: {0}")]
	Store(#[from] StoreError),
}

/// Errors surfaced by a [`Database`](crate::Database) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("document has no '_kind'")]
	MissingKind,

	#[error("invalid document: {0}")]
	InvalidDocument(String),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("internal error: {0}")]
	Internal(String),
}
