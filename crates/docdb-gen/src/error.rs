// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for configuration loading and image generation.

use std::path::PathBuf;

use docdb_permissions::{PermissionError, StoreError};

use crate::loader::Phase;

/// Errors that can occur while resolving the generator configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// Config file could not be read
	#[error("failed to read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// TOML parsing error
	#[error("TOML parse error in {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },
}

impl ConfigError {
	pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidValue {
			key: key.into(),
			message: message.into(),
		}
	}
}

/// Errors that abort an image build.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	#[error("I/O error at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid JSON in {path}: {source}")]
	Json {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("{path} is not a regular file")]
	NotAFile { path: PathBuf },

	#[error("unexpected content in {path}: expected {expected}")]
	InvalidShape {
		path: PathBuf,
		expected: &'static str,
	},

	#[error("invalid built-in permissions in {path}: {source}")]
	BuiltinPermissions {
		path: PathBuf,
		#[source]
		source: PermissionError,
	},

	#[error("failed to open permission engine: {0}")]
	Open(#[source] PermissionError),

	#[error("failed to close permission engine: {0}")]
	Close(#[source] PermissionError),

	#[error("{phase} phase failed on {path}: {source}")]
	Permission {
		phase: Phase,
		path: PathBuf,
		#[source]
		source: PermissionError,
	},

	#[error("{phase} phase failed on {path}: {source}")]
	Store {
		phase: Phase,
		path: PathBuf,
		#[source]
		source: StoreError,
	},

	#[error("document in {path} has unknown kind '{kind_id}'")]
	UnknownKind { path: PathBuf, kind_id: String },
}

impl LoadError {
	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io {
			path: path.into(),
			source,
		}
	}
}
