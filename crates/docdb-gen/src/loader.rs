// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Image generation from an input directory.
//!
//! The input holds three subdirectories, loaded in a fixed order so that
//! grants can refer to kinds and documents are written once both exist:
//!
//! ```text
//! <input>/kinds/        kind definitions (object or array of objects)
//! <input>/permissions/  grant records (array)
//! <input>/data/         documents (object or array of objects)
//! ```
//!
//! Files within a phase are loaded in file-name order.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docdb_permissions::memory::{KindRegistry, MemoryDatabase};
use docdb_permissions::{Database, ObjectItem, PermissionsConfig, PolicyEngine, RequestContext};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::GenConfig;
use crate::error::LoadError;

/// Caller name recorded on every write made by the generator.
pub const GENERATOR_CALLER: &str = "com.docdb.gen";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	Kinds,
	Permissions,
	Data,
}

impl Phase {
	pub const ALL: [Phase; 3] = [Phase::Kinds, Phase::Permissions, Phase::Data];

	pub fn dir_name(&self) -> &'static str {
		match self {
			Phase::Kinds => "kinds",
			Phase::Permissions => "permissions",
			Phase::Data => "data",
		}
	}
}

impl fmt::Display for Phase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.dir_name())
	}
}

/// Records loaded per phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
	pub kinds: usize,
	pub permissions: usize,
	pub documents: usize,
}

impl LoadSummary {
	fn add(&mut self, phase: Phase, count: usize) {
		match phase {
			Phase::Kinds => self.kinds += count,
			Phase::Permissions => self.permissions += count,
			Phase::Data => self.documents += count,
		}
	}
}

/// A database under construction with its kind registry and permission
/// engine.
pub struct Image {
	db: Arc<MemoryDatabase>,
	kinds: Arc<KindRegistry>,
	engine: PolicyEngine,
	req: RequestContext,
}

impl Image {
	/// Opens an empty image and configures its engine.
	pub fn open(config: &PermissionsConfig) -> Result<Self, LoadError> {
		let db = Arc::new(MemoryDatabase::new());
		let kinds = Arc::new(KindRegistry::new());
		let mut engine = PolicyEngine::new(db.clone(), kinds.clone());
		let req = RequestContext::admin(GENERATOR_CALLER);

		{
			let lock = db.schema_lock().write();
			engine.open(config, &req, &lock).map_err(LoadError::Open)?;
		}

		Ok(Self {
			db,
			kinds,
			engine,
			req,
		})
	}

	pub fn database(&self) -> &MemoryDatabase {
		&self.db
	}

	pub fn kinds(&self) -> &KindRegistry {
		&self.kinds
	}

	pub fn engine(&self) -> &PolicyEngine {
		&self.engine
	}

	/// Loads all three phases from `input`.
	pub fn load_all(&mut self, input: &Path) -> Result<LoadSummary, LoadError> {
		let mut summary = LoadSummary::default();
		for phase in Phase::ALL {
			let count = self.load_phase(phase, &input.join(phase.dir_name()))?;
			summary.add(phase, count);
		}
		Ok(summary)
	}

	/// Loads every file in `dir`, stopping at the first failure.
	#[instrument(level = "debug", skip(self, dir), fields(dir = %dir.display()))]
	pub fn load_phase(&mut self, phase: Phase, dir: &Path) -> Result<usize, LoadError> {
		let mut total = 0;
		for path in sorted_entries(dir)? {
			let count = self.load_file(phase, &path)?;
			debug!(path = %path.display(), count, "file loaded");
			total += count;
		}
		info!(%phase, records = total, "phase complete");
		Ok(total)
	}

	/// Loads one file and returns the number of records it held.
	pub fn load_file(&mut self, phase: Phase, path: &Path) -> Result<usize, LoadError> {
		let content = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
		let value: Value = serde_json::from_str(&content).map_err(|e| LoadError::Json {
			path: path.to_path_buf(),
			source: e,
		})?;

		match phase {
			Phase::Kinds => {
				let defs = one_or_many(value, path, "a kind object or an array of kinds")?;
				for def in &defs {
					self
						.kinds
						.put_kind(def)
						.map_err(|e| permission_error(phase, path, e))?;
				}
				Ok(defs.len())
			}
			Phase::Permissions => {
				let Value::Array(records) = value else {
					return Err(LoadError::InvalidShape {
						path: path.to_path_buf(),
						expected: "an array of grant records",
					});
				};
				let lock = self.db.schema_lock().write();
				self
					.engine
					.put_all(&records, &self.req, &lock)
					.map_err(|e| permission_error(phase, path, e))
			}
			Phase::Data => {
				let docs = one_or_many(value, path, "a document or an array of documents")?;
				let count = docs.len();
				for doc in docs {
					self.put_document(doc, path)?;
				}
				Ok(count)
			}
		}
	}

	fn put_document(&self, doc: Value, path: &Path) -> Result<(), LoadError> {
		let item = ObjectItem::new(doc);
		if let Ok(kind_id) = item.kind_id() {
			if !self.kinds.contains(kind_id) {
				return Err(LoadError::UnknownKind {
					path: path.to_path_buf(),
					kind_id: kind_id.to_string(),
				});
			}
		}

		self
			.db
			.put(item.into_value(), &self.req)
			.map_err(|e| LoadError::Store {
				phase: Phase::Data,
				path: path.to_path_buf(),
				source: e,
			})
	}

	/// Writes every stored document to `output` as a pretty-printed JSON
	/// array. Returns the number written.
	pub fn write_snapshot(&self, output: &Path) -> Result<usize, LoadError> {
		let docs = self.db.snapshot();
		let json = serde_json::to_string_pretty(&docs).map_err(|e| LoadError::Json {
			path: output.to_path_buf(),
			source: e,
		})?;
		fs::write(output, json).map_err(|e| LoadError::io(output, e))?;
		info!(path = %output.display(), documents = docs.len(), "image written");
		Ok(docs.len())
	}

	/// Closes the engine and forgets every kind.
	pub fn close(mut self) -> Result<(), LoadError> {
		self.kinds.clear();
		self.engine.close().map_err(LoadError::Close)
	}
}

/// Builds the image described by `input` into `output`.
///
/// On failure the output path is removed when `config.drop_on_error` is set.
#[instrument(skip(input, output, config), fields(input = %input.display(), output = %output.display()))]
pub fn generate(input: &Path, output: &Path, config: &GenConfig) -> Result<LoadSummary, LoadError> {
	let result = engine_config(config).and_then(|engine_config| build(input, output, &engine_config));

	match &result {
		Ok(summary) => info!(
			kinds = summary.kinds,
			permissions = summary.permissions,
			documents = summary.documents,
			"image generated"
		),
		Err(err) => {
			warn!(error = %err, "image generation failed");
			if config.drop_on_error {
				drop_image(output);
			}
		}
	}
	result
}

fn build(input: &Path, output: &Path, config: &PermissionsConfig) -> Result<LoadSummary, LoadError> {
	let mut image = Image::open(config)?;
	let result = image
		.load_all(input)
		.and_then(|summary| image.write_snapshot(output).map(|_| summary));
	let closed = image.close();

	let summary = result?;
	closed?;
	Ok(summary)
}

/// Engine configuration: the built-in permissions file (if any) with the
/// configured enabled flag laid over it.
pub fn engine_config(config: &GenConfig) -> Result<PermissionsConfig, LoadError> {
	let mut engine_config = match &config.builtin_permissions {
		Some(path) => {
			let content = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
			PermissionsConfig::from_json_str(&content).map_err(|e| {
				LoadError::BuiltinPermissions {
					path: path.clone(),
					source: e,
				}
			})?
		}
		None => PermissionsConfig::default(),
	};

	engine_config.merge(PermissionsConfig {
		permissions_enabled: config.permissions_enabled,
		permissions: Vec::new(),
	});
	Ok(engine_config)
}

fn drop_image(output: &Path) {
	match fs::remove_file(output) {
		Ok(()) => info!(path = %output.display(), "dropped partial image"),
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
		Err(e) => warn!(path = %output.display(), error = %e, "failed to drop image"),
	}
}

/// Regular files in `dir`, ordered by file name. Any other entry is an
/// error.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
	let mut paths = fs::read_dir(dir)
		.map_err(|e| LoadError::io(dir, e))?
		.map(|entry| entry.map(|e| e.path()))
		.collect::<Result<Vec<_>, _>>()
		.map_err(|e| LoadError::io(dir, e))?;
	paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

	for path in &paths {
		let metadata = fs::metadata(path).map_err(|e| LoadError::io(path, e))?;
		if !metadata.is_file() {
			return Err(LoadError::NotAFile { path: path.clone() });
		}
	}
	Ok(paths)
}

fn one_or_many(value: Value, path: &Path, expected: &'static str) -> Result<Vec<Value>, LoadError> {
	let values = match value {
		Value::Array(values) => values,
		other => vec![other],
	};
	if values.iter().all(Value::is_object) {
		Ok(values)
	} else {
		Err(LoadError::InvalidShape {
			path: path.to_path_buf(),
			expected,
		})
	}
}

fn permission_error(
	phase: Phase,
	path: &Path,
	source: docdb_permissions::PermissionError,
) -> LoadError {
	LoadError::Permission {
		phase,
		path: path.to_path_buf(),
		source,
	}
}
