// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashctl
// File: output.rs
// Author: hashctl maintainers

//! Terminal rendering for digest results and the algorithm list.

use crate::hctl::catalog::{AlgorithmDescriptor, Catalog, Category};
use crate::hctl::hash::{DigestResult, SaltMode};
use colored::Colorize;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RenderOptions {
	/// Print only the digest, without the input it came from.
	pub hash_only: bool,
	/// Append the per-input elapsed time.
	pub timing: bool,
}

/// Counts gathered while results stream through [`ResultPrinter`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BatchSummary {
	pub succeeded: usize,
	pub failed: usize,
	pub elapsed: Duration,
}

impl BatchSummary {
	pub fn total(&self) -> usize {
		self.succeeded + self.failed
	}

	pub fn exit_code(&self) -> i32 {
		if self.failed > 0 {
			1
		} else {
			0
		}
	}
}

/// Formats one successful result as `<digest>  <input>`.
pub fn format_success(
	result: &DigestResult,
	options: RenderOptions,
) -> String {
	let mut line = if options.hash_only {
		result.digest.clone()
	} else {
		format!("{}  {}", result.digest, result.input)
	};
	if options.timing {
		line.push_str(&format!(
			"  {}",
			format_duration(result.elapsed).dimmed()
		));
	}
	line
}

pub fn format_failure(result: &DigestResult) -> String {
	let message = result
		.error
		.as_ref()
		.map(|err| err.to_string())
		.unwrap_or_default();
	format!("{} {}: {}", "error:".red().bold(), result.input, message)
}

fn format_duration(elapsed: Duration) -> String {
	let micros = elapsed.as_micros();
	if micros < 1_000 {
		format!("{}µs", micros)
	} else if micros < 1_000_000 {
		format!("{:.2}ms", micros as f64 / 1_000.0)
	} else {
		format!("{:.2}s", elapsed.as_secs_f64())
	}
}

/// Sink for batch results: successes to stdout, failures to stderr.
pub struct ResultPrinter {
	options: RenderOptions,
	summary: BatchSummary,
}

impl ResultPrinter {
	pub fn new(options: RenderOptions) -> Self {
		Self {
			options,
			summary: BatchSummary::default(),
		}
	}

	pub fn emit(&mut self, result: DigestResult) {
		if result.is_ok() {
			self.summary.succeeded += 1;
			println!("{}", format_success(&result, self.options));
		} else {
			self.summary.failed += 1;
			eprintln!("{}", format_failure(&result));
		}
		self.summary.elapsed += result.elapsed;
	}

	pub fn summary(&self) -> BatchSummary {
		self.summary
	}
}

pub fn format_summary(summary: &BatchSummary, wall: Duration) -> String {
	format!(
		"{} inputs: {} hashed, {} failed in {} (cpu {})",
		summary.total(),
		summary.succeeded,
		summary.failed,
		format_duration(wall),
		format_duration(summary.elapsed)
	)
}

/// Catalog listing, one block per category.
pub fn render_catalog(catalog: &Catalog) -> Vec<String> {
	let mut lines = Vec::new();
	for (category, members) in catalog.grouped() {
		let heading = if category == Category::PasswordHash {
			category.label().yellow().bold()
		} else {
			category.label().cyan().bold()
		};
		lines.push(heading.to_string());
		for descriptor in members {
			lines.push(format!(
				"  {} {}",
				format!("{:<14}", descriptor.identifier).bold(),
				descriptor.description.dimmed()
			));
		}
		lines.push(String::new());
	}
	lines
}

/// Banner printed once before hashing with a broken digest.
pub fn weak_warning(descriptor: &AlgorithmDescriptor) -> Option<String> {
	if !descriptor.weak {
		return None;
	}
	Some(format!(
		"⚠ WARNING: {} is a weak algorithm (collisions known). Use SHA-256 or BLAKE3 for new digests.",
		descriptor.display_name
	))
}

/// Notice printed before Argon2id runs with the constant salt.
pub fn fixed_salt_notice(salt_mode: SaltMode) -> Option<&'static str> {
	match salt_mode {
		SaltMode::Fixed => Some(
			"note: argon2id uses a fixed salt so digests are reproducible; do not store them as password hashes (see --argon2-random-salt)",
		),
		SaltMode::Random => None,
	}
}

pub fn emit_notice(message: &str) {
	eprintln!("{}", message.yellow());
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hctl::catalog::{self, shared};
	use crate::hctl::hash::{hash_string, Options};

	fn plain() {
		colored::control::set_override(false);
	}

	#[test]
	fn success_line_has_digest_then_input() {
		plain();
		let result = hash_string("abc", &Options::with_algorithm("md5"));
		assert_eq!(
			format_success(&result, RenderOptions::default()),
			"900150983cd24fb0d6963f7d28e17f72  abc"
		);
		let hash_only = RenderOptions {
			hash_only: true,
			timing: false,
		};
		assert_eq!(
			format_success(&result, hash_only),
			"900150983cd24fb0d6963f7d28e17f72"
		);
	}

	#[test]
	fn failure_line_names_input_and_error() {
		plain();
		let result = hash_string("abc", &Options::with_algorithm("zzz"));
		assert_eq!(
			format_failure(&result),
			"error: abc: unknown algorithm: zzz"
		);
	}

	#[test]
	fn durations_pick_a_readable_unit() {
		assert_eq!(format_duration(Duration::from_micros(15)), "15µs");
		assert_eq!(format_duration(Duration::from_micros(2_500)), "2.50ms");
		assert_eq!(format_duration(Duration::from_millis(1_500)), "1.50s");
	}

	#[test]
	fn catalog_listing_lists_every_algorithm_once() {
		plain();
		let catalog = shared();
		let lines = render_catalog(&catalog);
		assert_eq!(lines[0], "Checksums (Non-Cryptographic)");
		for id in catalog.identifiers() {
			let hits = lines
				.iter()
				.filter(|line| {
					line.split_whitespace().next() == Some(id)
				})
				.count();
			assert_eq!(hits, 1, "{id}");
		}
	}

	#[test]
	fn only_weak_algorithms_get_a_banner() {
		let md5 = catalog::lookup("md5").unwrap();
		let sha256 = catalog::lookup("sha256").unwrap();
		assert!(weak_warning(md5).unwrap().contains("MD5"));
		assert!(weak_warning(sha256).is_none());
	}

	#[test]
	fn summary_line_counts_every_input() {
		let summary = BatchSummary {
			succeeded: 3,
			failed: 1,
			elapsed: Duration::from_micros(40),
		};
		assert_eq!(
			format_summary(&summary, Duration::from_micros(25)),
			"4 inputs: 3 hashed, 1 failed in 25µs (cpu 40µs)"
		);
	}

	#[test]
	fn summary_exit_code_reflects_failures() {
		let mut summary = BatchSummary::default();
		assert_eq!(summary.exit_code(), 0);
		summary.failed = 1;
		summary.succeeded = 2;
		assert_eq!(summary.total(), 3);
		assert_eq!(summary.exit_code(), 1);
	}
}
