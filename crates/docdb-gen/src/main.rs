// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! docdb image generator binary.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use docdb_gen::{generate, load_config_with_cli, GenConfigLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// docdb-gen - build a docdb image from kinds, permissions and data.
#[derive(Parser, Debug)]
#[command(
	name = "docdb-gen",
	about = "Build a docdb image from a directory of kinds, permissions and data",
	version
)]
struct Args {
	/// Directory containing kinds/, permissions/ and data/
	input: PathBuf,

	/// Path of the image to write
	output: PathBuf,

	/// TOML configuration file
	#[arg(long, short, env = "DOCDB_GEN_CONFIG")]
	config: Option<PathBuf>,

	/// Enable or disable permission enforcement
	#[arg(long)]
	permissions_enabled: Option<bool>,

	/// JSON file with built-in grants (`{"permissionsEnabled": .., "permissions": [..]}`)
	#[arg(long)]
	builtin_permissions: Option<PathBuf>,

	/// Leave the output in place when generation fails
	#[arg(long)]
	keep_on_error: bool,

	/// Log level used when RUST_LOG is unset
	#[arg(long)]
	log_level: Option<String>,
}

impl Args {
	fn config_layer(&self) -> GenConfigLayer {
		GenConfigLayer {
			permissions_enabled: self.permissions_enabled,
			builtin_permissions: self.builtin_permissions.clone(),
			drop_on_error: self.keep_on_error.then_some(false),
			log_level: self.log_level.clone(),
		}
	}
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let config = load_config_with_cli(args.config.clone(), args.config_layer())
		.context("failed to load configuration")?;

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.log_level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();

	tracing::info!(
		input = %args.input.display(),
		output = %args.output.display(),
		permissions_enabled = ?config.permissions_enabled,
		drop_on_error = config.drop_on_error,
		"starting docdb-gen"
	);

	let summary = generate(&args.input, &args.output, &config).with_context(|| {
		format!(
			"failed to generate image from {} into {}",
			args.input.display(),
			args.output.display()
		)
	})?;

	println!(
		"loaded {} kinds, {} grants, {} documents into {}",
		summary.kinds,
		summary.permissions,
		summary.documents,
		args.output.display()
	);
	Ok(())
}
