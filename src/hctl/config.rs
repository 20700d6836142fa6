// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashctl
// File: config.rs
// Author: hashctl maintainers

//! Layered run options: built-in defaults, then the TOML config file,
//! then `HASHCTL_*` environment variables. CLI flags are applied on top
//! by the caller.
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `HASHCTL_ARGON2__MEMORY_COST=19456`.

use crate::hctl::hash::Options;
use figment::{
	providers::{Env, Format, Serialized, Toml},
	Figment,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_PREFIX: &str = "HASHCTL_";
const CONFIG_FILE: &str = "hashctl/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to load configuration: {0}")]
	Load(#[from] Box<figment::Error>),
	#[error("invalid configuration: {0}")]
	Invalid(String),
}

impl From<figment::Error> for ConfigError {
	fn from(value: figment::Error) -> Self {
		ConfigError::Load(Box::new(value))
	}
}

pub struct ConfigLoader {
	path: Option<PathBuf>,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	/// Loader reading `<config dir>/hashctl/config.toml`, where the config
	/// dir honours `XDG_CONFIG_HOME`.
	pub fn new() -> Self {
		Self {
			path: dirs::config_dir().map(|dir| dir.join(CONFIG_FILE)),
		}
	}

	pub fn with_path(path: impl Into<PathBuf>) -> Self {
		Self {
			path: Some(path.into()),
		}
	}

	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	pub fn figment(&self) -> Figment {
		let mut figment =
			Figment::new().merge(Serialized::defaults(Options::default()));
		if let Some(path) = self.path.as_ref().filter(|p| p.exists()) {
			figment = figment.merge(Toml::file(path));
		}
		figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
	}

	pub fn load(&self) -> Result<Options, ConfigError> {
		let options: Options = self.figment().extract()?;
		validate(&options)?;
		Ok(options)
	}
}

/// Rejects settings the scheduler cannot run with. Password-hash
/// parameters are checked by the engine, per task.
pub fn validate(options: &Options) -> Result<(), ConfigError> {
	if options.concurrency == 0 {
		return Err(ConfigError::Invalid(
			"concurrency must be at least 1".to_string(),
		));
	}
	if options.algorithm.trim().is_empty() {
		return Err(ConfigError::Invalid(
			"algorithm must not be empty".to_string(),
		));
	}
	Ok(())
}
