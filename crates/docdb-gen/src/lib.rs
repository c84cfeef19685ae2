// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bulk loader that builds a docdb image from a directory tree.
//!
//! Kinds are registered first, then grants are ingested through the
//! permission engine, then documents are stored. The result is written as a
//! JSON snapshot of every stored document.

pub mod config;
pub mod error;
pub mod loader;

pub use config::{
	load_config, load_config_with_cli, CliSource, ConfigSource, DefaultsSource, EnvSource, GenConfig,
	GenConfigLayer, Precedence, TomlSource,
};
pub use error::{ConfigError, LoadError};
pub use loader::{engine_config, generate, Image, LoadSummary, Phase, GENERATOR_CALLER};
