// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashctl
// File: hash.rs
// Author: hashctl maintainers

//! Single-input digest engine.
//!
//! Streaming algorithms read the input in fixed-size chunks, so file size
//! does not bound memory. Password hashes (bcrypt, Argon2id) have no
//! incremental interface: the whole input is read into memory first, which
//! costs the input's size per in-flight task, plus `memory_cost` KiB of
//! working memory for Argon2id.

use crate::hctl::catalog::{self, AlgorithmDescriptor, PasswordScheme};
use argon2::{
	password_hash::{PasswordHasher, SaltString},
	Algorithm as Argon2Algorithm, Argon2, Params as Argon2Params,
	Version as Argon2Version,
};
use digest::Digest;
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

const CHUNK_SIZE: usize = 64 * 1024;

/// Salt used by Argon2id in [`SaltMode::Fixed`].
///
/// The same input always yields the same digest under this salt. Not
/// for credential storage; see [`SaltMode::Random`].
pub const ARGON2_FIXED_SALT: &[u8] = b"hashctl-argon2id-salt";

/// bcrypt only looks at the first 72 bytes of its input.
pub const BCRYPT_MAX_INPUT: usize = 72;
pub const BCRYPT_MIN_COST: u32 = 4;
pub const BCRYPT_MAX_COST: u32 = 31;

/// Incremental hash state fed chunk by chunk.
pub trait Accumulator: Send {
	fn update(&mut self, data: &[u8]);
	fn finalize(self: Box<Self>) -> Vec<u8>;
}

impl<D> Accumulator for D
where
	D: Digest + Send,
{
	fn update(&mut self, data: &[u8]) {
		Digest::update(self, data);
	}

	fn finalize(self: Box<Self>) -> Vec<u8> {
		Digest::finalize(*self).to_vec()
	}
}

/// CRC-32 (IEEE), finalized as four big-endian bytes.
#[derive(Default)]
pub struct Crc32(crc32fast::Hasher);

impl Accumulator for Crc32 {
	fn update(&mut self, data: &[u8]) {
		self.0.update(data);
	}

	fn finalize(self: Box<Self>) -> Vec<u8> {
		self.0.finalize().to_be_bytes().to_vec()
	}
}

/// BLAKE3 through its native hasher, 32-byte output.
#[derive(Default)]
pub struct Blake3(blake3::Hasher);

impl Accumulator for Blake3 {
	fn update(&mut self, data: &[u8]) {
		self.0.update(data);
	}

	fn finalize(self: Box<Self>) -> Vec<u8> {
		self.0.finalize().as_bytes().to_vec()
	}
}

#[derive(
	Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SaltMode {
	#[default]
	Fixed,
	Random,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Argon2Config {
	pub time_cost: u32,
	/// KiB.
	pub memory_cost: u32,
	pub lanes: u32,
	pub key_length: u32,
	pub salt_mode: SaltMode,
}

impl Default for Argon2Config {
	fn default() -> Self {
		Argon2Config {
			time_cost: 1,
			memory_cost: 64 * 1024,
			lanes: 4,
			key_length: 32,
			salt_mode: SaltMode::Fixed,
		}
	}
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BcryptConfig {
	pub cost: u32,
}

impl Default for BcryptConfig {
	fn default() -> Self {
		BcryptConfig { cost: 10 }
	}
}

/// Per-invocation settings, fixed for the whole run.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
	pub algorithm: String,
	/// Upper bound on tasks hashed at the same time.
	pub concurrency: usize,
	pub bcrypt: BcryptConfig,
	pub argon2: Argon2Config,
}

impl Default for Options {
	fn default() -> Self {
		Options {
			algorithm: "sha256".to_string(),
			concurrency: default_concurrency(),
			bcrypt: BcryptConfig::default(),
			argon2: Argon2Config::default(),
		}
	}
}

impl Options {
	pub fn with_algorithm(algorithm: impl Into<String>) -> Self {
		Options {
			algorithm: algorithm.into(),
			..Options::default()
		}
	}
}

pub fn default_concurrency() -> usize {
	std::thread::available_parallelism()
		.map(|n| n.get())
		.unwrap_or(1)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
	UnknownAlgorithm,
	Io,
	PasswordHashFailure,
}

#[derive(Debug, Error)]
pub enum DigestError {
	#[error("unknown algorithm: {0}")]
	UnknownAlgorithm(String),
	#[error("cannot read input: {source}")]
	Io {
		input: String,
		#[source]
		source: io::Error,
	},
	#[error("{algorithm}: {reason}")]
	PasswordHashFailure {
		algorithm: &'static str,
		reason: String,
	},
}

impl DigestError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			DigestError::UnknownAlgorithm(_) => ErrorKind::UnknownAlgorithm,
			DigestError::Io { .. } => ErrorKind::Io,
			DigestError::PasswordHashFailure { .. } => {
				ErrorKind::PasswordHashFailure
			}
		}
	}

	fn io(input: impl Into<String>, source: io::Error) -> Self {
		DigestError::Io {
			input: input.into(),
			source,
		}
	}

	fn password(algorithm: &'static str, reason: impl ToString) -> Self {
		DigestError::PasswordHashFailure {
			algorithm,
			reason: reason.to_string(),
		}
	}
}

/// What to hash: an in-memory string or a file on disk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TaskInput {
	Text(String),
	File(PathBuf),
}

impl TaskInput {
	pub fn label(&self) -> String {
		match self {
			TaskInput::Text(text) => text.clone(),
			TaskInput::File(path) => path.display().to_string(),
		}
	}

	pub fn is_file(&self) -> bool {
		matches!(self, TaskInput::File(_))
	}
}

/// Outcome of hashing one input. `digest` is empty when `error` is set.
#[derive(Debug)]
pub struct DigestResult {
	pub input: String,
	pub digest: String,
	pub error: Option<DigestError>,
	pub is_file: bool,
	pub elapsed: Duration,
}

impl DigestResult {
	pub fn from_outcome(
		input: &TaskInput,
		outcome: Result<String, DigestError>,
		elapsed: Duration,
	) -> Self {
		let (digest, error) = match outcome {
			Ok(digest) => (digest, None),
			Err(err) => (String::new(), Some(err)),
		};
		DigestResult {
			input: input.label(),
			digest,
			error,
			is_file: input.is_file(),
			elapsed,
		}
	}

	pub fn failed(input: &TaskInput, error: DigestError) -> Self {
		Self::from_outcome(input, Err(error), Duration::ZERO)
	}

	pub fn is_ok(&self) -> bool {
		self.error.is_none()
	}

	pub fn error_kind(&self) -> Option<ErrorKind> {
		self.error.as_ref().map(DigestError::kind)
	}
}

/// Digest one input with an already resolved algorithm.
pub fn digest(
	input: &TaskInput,
	descriptor: &AlgorithmDescriptor,
	options: &Options,
) -> Result<String, DigestError> {
	match input {
		TaskInput::Text(text) => {
			digest_reader(text.as_bytes(), text, descriptor, options)
		}
		TaskInput::File(path) => {
			let label = path.display().to_string();
			let file = File::open(path)
				.map_err(|source| DigestError::io(&label, source))?;
			digest_reader(file, &label, descriptor, options)
		}
	}
}

/// Digest everything `reader` yields. `label` names the source in I/O
/// errors.
pub fn digest_reader<R: Read>(
	mut reader: R,
	label: &str,
	descriptor: &AlgorithmDescriptor,
	options: &Options,
) -> Result<String, DigestError> {
	if let Some(accumulator) = descriptor.accumulator() {
		let bytes = stream(accumulator, reader)
			.map_err(|source| DigestError::io(label, source))?;
		return Ok(hex::encode(bytes));
	}
	let mut data = Vec::new();
	reader
		.read_to_end(&mut data)
		.map_err(|source| DigestError::io(label, source))?;
	match descriptor.password_scheme() {
		Some(PasswordScheme::Bcrypt) => {
			hash_bcrypt(&data, &options.bcrypt)
		}
		Some(PasswordScheme::Argon2id) => {
			hash_argon2id(&data, &options.argon2)
		}
		None => Err(DigestError::UnknownAlgorithm(
			descriptor.identifier.to_string(),
		)),
	}
}

fn stream<R: Read>(
	mut accumulator: Box<dyn Accumulator>,
	mut reader: R,
) -> io::Result<Vec<u8>> {
	let mut buffer = vec![0u8; CHUNK_SIZE];
	loop {
		match reader.read(&mut buffer) {
			Ok(0) => break,
			Ok(count) => accumulator.update(&buffer[..count]),
			Err(err) if err.kind() == io::ErrorKind::Interrupted => {
				continue
			}
			Err(err) => return Err(err),
		}
	}
	Ok(accumulator.finalize())
}

/// bcrypt in its native `$2b$<cost>$<salt><hash>` form. Inputs longer
/// than 72 bytes are truncated, never rejected. The salt is random, so
/// two runs on the same input differ; compare with `bcrypt::verify`.
pub fn hash_bcrypt(
	password: &[u8],
	config: &BcryptConfig,
) -> Result<String, DigestError> {
	if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&config.cost) {
		return Err(DigestError::password(
			"bcrypt",
			format!(
				"cost {} outside {}..={}",
				config.cost, BCRYPT_MIN_COST, BCRYPT_MAX_COST
			),
		));
	}
	let effective = &password[..password.len().min(BCRYPT_MAX_INPUT)];
	bcrypt::hash(effective, config.cost)
		.map_err(|err| DigestError::password("bcrypt", err))
}

/// Argon2id (v0x13).
///
/// With [`SaltMode::Fixed`] the raw key is derived with
/// [`ARGON2_FIXED_SALT`] and returned as hex, so the output is
/// reproducible and must not be used to store credentials. With
/// [`SaltMode::Random`] a fresh salt is drawn from the OS and the PHC
/// string (which embeds salt and parameters) is returned.
pub fn hash_argon2id(
	password: &[u8],
	config: &Argon2Config,
) -> Result<String, DigestError> {
	let params = Argon2Params::new(
		config.memory_cost,
		config.time_cost,
		config.lanes,
		Some(config.key_length as usize),
	)
	.map_err(|err| DigestError::password("argon2id", err))?;
	let argon2 = Argon2::new(
		Argon2Algorithm::Argon2id,
		Argon2Version::V0x13,
		params,
	);
	match config.salt_mode {
		SaltMode::Fixed => {
			let mut output = vec![0u8; config.key_length as usize];
			argon2
				.hash_password_into(
					password,
					ARGON2_FIXED_SALT,
					&mut output,
				)
				.map_err(|err| DigestError::password("argon2id", err))?;
			Ok(hex::encode(output))
		}
		SaltMode::Random => {
			let salt = SaltString::generate(&mut OsRng);
			let phc = argon2
				.hash_password(password, &salt)
				.map_err(|err| DigestError::password("argon2id", err))?;
			Ok(phc.to_string())
		}
	}
}

/// Hash one input, resolving nothing: `descriptor` is `None` when the
/// algorithm was not found in the catalog.
pub fn compute(
	input: &TaskInput,
	descriptor: Option<&AlgorithmDescriptor>,
	options: &Options,
) -> DigestResult {
	let start = Instant::now();
	let outcome = match descriptor {
		Some(descriptor) => digest(input, descriptor, options),
		None => Err(DigestError::UnknownAlgorithm(
			options.algorithm.clone(),
		)),
	};
	DigestResult::from_outcome(input, outcome, start.elapsed())
}

pub fn hash_string(input: &str, options: &Options) -> DigestResult {
	compute(
		&TaskInput::Text(input.to_string()),
		catalog::lookup(&options.algorithm),
		options,
	)
}

pub fn hash_file(path: &Path, options: &Options) -> DigestResult {
	compute(
		&TaskInput::File(path.to_path_buf()),
		catalog::lookup(&options.algorithm),
		options,
	)
}
