// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashctl
// File: command_line.rs
// Author: hashctl maintainers

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn hashctl(config_dir: &Path, args: &[&str]) -> Output {
	let config = config_dir.join("none.toml");
	let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hashctl"));
	for (key, _) in std::env::vars() {
		if key.starts_with("HASHCTL_") {
			cmd.env_remove(key);
		}
	}
	cmd.env("NO_COLOR", "1")
		.arg("--config")
		.arg(&config)
		.args(args);
	cmd.output().expect("failed to run hashctl")
}

fn stdout_of(output: &Output) -> String {
	String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
	String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn string_hash_only_prints_bare_digest() {
	let dir = tempfile::tempdir().unwrap();
	let output =
		hashctl(dir.path(), &["string", "-a", "sha256", "-H", "abc"]);
	assert!(output.status.success(), "{}", stderr_of(&output));
	assert_eq!(
		stdout_of(&output).trim(),
		"ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
	);
}

#[test]
fn strings_are_printed_in_argument_order() {
	let dir = tempfile::tempdir().unwrap();
	let output = hashctl(
		dir.path(),
		&["string", "-a", "crc32", "-j", "4", "one", "two", "three"],
	);
	assert!(output.status.success());
	let inputs: Vec<String> = stdout_of(&output)
		.lines()
		.map(|line| line.split("  ").nth(1).unwrap_or("").to_string())
		.collect();
	assert_eq!(inputs, vec!["one", "two", "three"]);
}

#[test]
fn files_are_printed_in_argument_order() {
	let dir = tempfile::tempdir().unwrap();
	let mut names = Vec::new();
	for (i, size) in [400_000usize, 10, 200_000, 0].iter().enumerate() {
		let path = dir.path().join(format!("f{i}.bin"));
		fs::write(&path, vec![b'z'; *size]).unwrap();
		names.push(path.display().to_string());
	}
	let mut args = vec!["file", "-a", "sha512", "-j", "4"];
	args.extend(names.iter().map(String::as_str));
	let output = hashctl(dir.path(), &args);
	assert!(output.status.success(), "{}", stderr_of(&output));

	let stdout = stdout_of(&output);
	let lines: Vec<&str> = stdout.lines().collect();
	assert_eq!(lines.len(), names.len());
	for (line, name) in lines.iter().zip(&names) {
		assert!(line.ends_with(&format!("  {name}")), "{line}");
	}
}

#[test]
fn missing_file_fails_alone_and_sets_exit_status() {
	let dir = tempfile::tempdir().unwrap();
	let present = dir.path().join("present.txt");
	fs::write(&present, "abc").unwrap();
	let missing = dir.path().join("missing.txt");
	let output = hashctl(
		dir.path(),
		&[
			"file",
			"-a",
			"md5",
			missing.to_str().unwrap(),
			present.to_str().unwrap(),
		],
	);
	assert_eq!(output.status.code(), Some(1));
	assert!(stdout_of(&output)
		.starts_with("900150983cd24fb0d6963f7d28e17f72  "));
	let stderr = stderr_of(&output);
	assert!(stderr.contains("error:"), "{stderr}");
	assert!(stderr.contains("missing.txt"), "{stderr}");
}

#[test]
fn unknown_algorithm_exits_with_failure() {
	let dir = tempfile::tempdir().unwrap();
	let output = hashctl(dir.path(), &["string", "-a", "md6", "abc"]);
	assert_eq!(output.status.code(), Some(1));
	assert!(stdout_of(&output).is_empty());
	assert!(stderr_of(&output).contains("unknown algorithm: md6"));
}

#[test]
fn weak_algorithm_prints_one_banner() {
	let dir = tempfile::tempdir().unwrap();
	let output =
		hashctl(dir.path(), &["string", "-a", "md5", "a", "b", "c"]);
	assert!(output.status.success());
	let stderr = stderr_of(&output);
	let banners = stderr
		.lines()
		.filter(|line| line.contains("weak algorithm"))
		.count();
	assert_eq!(banners, 1, "{stderr}");
}

#[test]
fn argon2id_defaults_to_a_reproducible_digest() {
	let dir = tempfile::tempdir().unwrap();
	let args = [
		"string",
		"-a",
		"argon2id",
		"--argon2-memory-cost",
		"64",
		"--argon2-lanes",
		"1",
		"-H",
		"secret",
	];
	let first = hashctl(dir.path(), &args);
	let second = hashctl(dir.path(), &args);
	assert!(first.status.success(), "{}", stderr_of(&first));
	assert_eq!(stdout_of(&first), stdout_of(&second));
	assert!(stderr_of(&first).contains("fixed salt"));
}

#[test]
fn config_file_supplies_the_algorithm() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(dir.path().join("none.toml"), "algorithm = \"md5\"\n")
		.unwrap();
	let output = hashctl(dir.path(), &["string", "-H", "abc"]);
	assert!(output.status.success());
	assert_eq!(
		stdout_of(&output).trim(),
		"900150983cd24fb0d6963f7d28e17f72"
	);
}

#[test]
fn list_groups_algorithms_by_category() {
	let dir = tempfile::tempdir().unwrap();
	let output = hashctl(dir.path(), &["list"]);
	assert!(output.status.success());
	let stdout = stdout_of(&output);
	let checksums = stdout.find("Checksums (Non-Cryptographic)").unwrap();
	let fast = stdout.find("Fast Cryptographic Hashes").unwrap();
	let password = stdout.find("Password Hashing / KDFs").unwrap();
	assert!(checksums < fast && fast < password);
	assert!(stdout[password..].contains("argon2id"));
	assert!(stdout[checksums..fast].contains("crc32"));
}

#[test]
fn zero_jobs_is_rejected() {
	let dir = tempfile::tempdir().unwrap();
	let output =
		hashctl(dir.path(), &["string", "-a", "sha256", "-j", "0", "x"]);
	assert!(!output.status.success());
	assert!(stderr_of(&output).contains("concurrency"));
}
