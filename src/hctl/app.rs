// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashctl
// File: app.rs
// Author: hashctl maintainers

use crate::hctl::batch::{run_batch, Task};
use crate::hctl::catalog::{self, PasswordScheme};
use crate::hctl::config::{self, ConfigLoader};
use crate::hctl::hash::{Options, SaltMode};
use crate::hctl::output::{
	self, BatchSummary, RenderOptions, ResultPrinter,
};
use clap::{crate_name, crate_version, Arg, ArgAction, ArgMatches};
use clap_complete::{generate, Shell};
use colored::Colorize;
use dialoguer::{Confirm, Input, Select};
use std::error::Error;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Log filter (EnvFilter syntax), e.g. `HASHCTL_LOG=hashctl=debug`.
pub const LOG_ENV: &str = "HASHCTL_LOG";

const HELP_TEMPLATE: &str = "{before-help}{name} {version}
{about-with-newline}
Primary command families:
  hashctl string -a <alg> <TEXT>...  Hash strings (e.g. hashctl string -a sha256 'text')
  hashctl file -a <alg> <FILE>...    Hash files in parallel, printed in argument order
  hashctl list                       Show every algorithm grouped by category
{usage-heading} {usage}

{all-args}{after-help}
";

fn digest_args() -> Vec<Arg> {
	vec![
		Arg::new("algorithm")
			.short('a')
			.long("algorithm")
			.help("Algorithm identifier, see `hashctl list` [default: sha256]")
			.display_order(1),
		Arg::new("jobs")
			.short('j')
			.long("jobs")
			.value_parser(clap::value_parser!(usize))
			.help("Maximum inputs hashed at once [default: CPU count]"),
		Arg::new("bcrypt-cost")
			.long("bcrypt-cost")
			.value_parser(clap::value_parser!(u32))
			.help("bcrypt cost factor, 4 to 31 [default: 10]"),
		Arg::new("argon2-time-cost")
			.long("argon2-time-cost")
			.value_parser(clap::value_parser!(u32))
			.help("Argon2id time cost (iterations) [default: 1]"),
		Arg::new("argon2-memory-cost")
			.long("argon2-memory-cost")
			.value_parser(clap::value_parser!(u32))
			.help("Argon2id memory cost (KiB) [default: 65536]"),
		Arg::new("argon2-lanes")
			.long("argon2-lanes")
			.value_parser(clap::value_parser!(u32))
			.help("Argon2id parallelism lanes [default: 4]"),
		Arg::new("argon2-key-length")
			.long("argon2-key-length")
			.value_parser(clap::value_parser!(u32))
			.help("Argon2id output length (bytes) [default: 32]"),
		Arg::new("argon2-random-salt")
			.long("argon2-random-salt")
			.help("Salt Argon2id randomly and print a PHC string instead of a reproducible digest")
			.action(ArgAction::SetTrue),
		Arg::new("hash-only")
			.short('H')
			.long("hash-only")
			.help("Print only the hash value without the source input")
			.action(ArgAction::SetTrue),
		Arg::new("timing")
			.long("timing")
			.help("Show per-input elapsed time and a batch summary")
			.action(ArgAction::SetTrue),
	]
}

pub fn build_cli() -> clap::Command {
	clap::Command::new(crate_name!())
		.version(crate_version!())
		.about("Compute checksums, fast hashes and password digests for strings and files")
		.help_template(HELP_TEMPLATE)
		.arg(
			Arg::new("config")
				.short('c')
				.long("config")
				.global(true)
				.value_parser(clap::value_parser!(PathBuf))
				.help("Config file [default: <config dir>/hashctl/config.toml]"),
		)
		.arg(
			Arg::new("verbose")
				.short('v')
				.long("verbose")
				.global(true)
				.help("Log scheduling details to stderr")
				.action(ArgAction::SetTrue),
		)
		.subcommand(
			clap::Command::new("string")
				.about("Hash one or more strings")
				.arg(
					Arg::new("INPUT")
						.help("Strings to hash")
						.num_args(1..)
						.required(true),
				)
				.args(digest_args()),
		)
		.subcommand(
			clap::Command::new("file")
				.about("Hash one or more files")
				.arg(
					Arg::new("FILE")
						.help("Files to hash")
						.num_args(1..)
						.required(true)
						.value_parser(clap::value_parser!(PathBuf)),
				)
				.args(digest_args()),
		)
		.subcommand(
			clap::Command::new("list")
				.about("List available algorithms by category"),
		)
		.subcommand(
			clap::Command::new("version")
				.about("Print version and platform"),
		)
		.subcommand(
			clap::Command::new("completions")
				.about("Generate shell completions")
				.arg(
					Arg::new("shell")
						.required(true)
						.value_parser(clap::value_parser!(Shell)),
				),
		)
		.subcommand(
			clap::Command::new("interactive")
				.about("Pick an algorithm and inputs from menus"),
		)
}

/// Fold CLI flags over options loaded from config and environment.
pub fn apply_overrides(options: &mut Options, matches: &ArgMatches) {
	if let Some(algorithm) = matches.get_one::<String>("algorithm") {
		options.algorithm = algorithm.clone();
	}
	if let Some(jobs) = matches.get_one::<usize>("jobs") {
		options.concurrency = *jobs;
	}
	if let Some(cost) = matches.get_one::<u32>("bcrypt-cost") {
		options.bcrypt.cost = *cost;
	}
	if let Some(time) = matches.get_one::<u32>("argon2-time-cost") {
		options.argon2.time_cost = *time;
	}
	if let Some(memory) = matches.get_one::<u32>("argon2-memory-cost")
	{
		options.argon2.memory_cost = *memory;
	}
	if let Some(lanes) = matches.get_one::<u32>("argon2-lanes") {
		options.argon2.lanes = *lanes;
	}
	if let Some(length) = matches.get_one::<u32>("argon2-key-length")
	{
		options.argon2.key_length = *length;
	}
	if matches.get_flag("argon2-random-salt") {
		options.argon2.salt_mode = SaltMode::Random;
	}
}

fn resolve_options(
	loader: &ConfigLoader,
	matches: &ArgMatches,
) -> Result<Options, Box<dyn Error>> {
	debug!(config = ?loader.path(), "loading configuration");
	let mut options = loader.load()?;
	apply_overrides(&mut options, matches);
	config::validate(&options)?;
	Ok(options)
}

fn render_options(matches: &ArgMatches) -> RenderOptions {
	RenderOptions {
		hash_only: matches.get_flag("hash-only"),
		timing: matches.get_flag("timing"),
	}
}

fn init_logging(verbose: bool) {
	let fallback = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_env(LOG_ENV)
		.unwrap_or_else(|_| EnvFilter::new(fallback));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.with_target(false)
		.try_init();
}

fn hash_batch(
	tasks: &[Task],
	options: &Options,
	render: RenderOptions,
) -> BatchSummary {
	if let Some(descriptor) = catalog::lookup(&options.algorithm) {
		if let Some(banner) = output::weak_warning(descriptor) {
			output::emit_notice(&banner);
		}
		if descriptor.password_scheme() == Some(PasswordScheme::Argon2id)
		{
			if let Some(notice) =
				output::fixed_salt_notice(options.argon2.salt_mode)
			{
				output::emit_notice(notice);
			}
		}
	}
	let start = Instant::now();
	let mut printer = ResultPrinter::new(render);
	run_batch(tasks, options, |result| printer.emit(result));
	let summary = printer.summary();
	if render.timing {
		eprintln!(
			"{}",
			output::format_summary(&summary, start.elapsed())
		);
	}
	summary
}

fn finish(summary: BatchSummary) -> Result<(), Box<dyn Error>> {
	if summary.exit_code() != 0 {
		std::process::exit(summary.exit_code());
	}
	Ok(())
}

fn print_version() {
	println!("{} {}", crate_name!().bold(), crate_version!());
	println!(
		"{}  {}/{}",
		"platform".dimmed(),
		std::env::consts::OS,
		std::env::consts::ARCH
	);
	println!(
		"{}  {}",
		"algorithms".dimmed(),
		catalog::shared().len()
	);
}

fn prompt_paths() -> Result<Vec<PathBuf>, Box<dyn Error>> {
	let mut paths = Vec::new();
	loop {
		let entry = Input::<String>::new()
			.with_prompt("File path (empty line to finish)")
			.allow_empty(true)
			.interact_text()?;
		let entry = entry.trim();
		if entry.is_empty() {
			if paths.is_empty() {
				continue;
			}
			break;
		}
		paths.push(PathBuf::from(entry));
	}
	Ok(paths)
}

fn run_interactive_mode(
	loader: &ConfigLoader,
) -> Result<(), Box<dyn Error>> {
	let mut options = loader.load()?;
	let catalog = catalog::shared();
	let labels: Vec<&str> = catalog
		.sorted()
		.into_iter()
		.map(|d| d.display_name)
		.collect();
	let modes = ["Hash a string", "Hash files"];
	loop {
		let current = catalog
			.lookup(&options.algorithm)
			.and_then(|d| labels.iter().position(|l| *l == d.display_name))
			.unwrap_or(0);
		let choice = Select::new()
			.with_prompt("Select algorithm")
			.items(&labels)
			.default(current)
			.interact()?;
		if let Some(identifier) = labels
			.get(choice)
			.and_then(|name| catalog.identifier_for_display_name(name))
		{
			options.algorithm = identifier.to_string();
		}
		let mode = Select::new()
			.with_prompt("Input")
			.items(&modes)
			.default(0)
			.interact()?;
		let tasks = if mode == 0 {
			let text = Input::<String>::new()
				.with_prompt("Text to hash")
				.allow_empty(true)
				.interact_text()?;
			Task::from_strings([text])
		} else {
			Task::from_paths(prompt_paths()?)
		};
		hash_batch(&tasks, &options, RenderOptions::default());
		let again = Confirm::new()
			.with_prompt("Hash something else?")
			.default(true)
			.interact()?;
		if !again {
			break;
		}
	}
	Ok(())
}

pub fn run() -> Result<(), Box<dyn Error>> {
	let matches = build_cli().get_matches();
	init_logging(matches.get_flag("verbose"));
	let loader = match matches.get_one::<PathBuf>("config") {
		Some(path) => ConfigLoader::with_path(path.clone()),
		None => ConfigLoader::new(),
	};

	match matches.subcommand() {
		Some(("string", sub)) => {
			let inputs: Vec<String> = sub
				.get_many::<String>("INPUT")
				.map(|values| values.cloned().collect())
				.unwrap_or_default();
			let options = resolve_options(&loader, sub)?;
			let tasks = Task::from_strings(inputs);
			finish(hash_batch(&tasks, &options, render_options(sub)))
		}
		Some(("file", sub)) => {
			let paths: Vec<PathBuf> = sub
				.get_many::<PathBuf>("FILE")
				.map(|values| values.cloned().collect())
				.unwrap_or_default();
			let options = resolve_options(&loader, sub)?;
			let tasks = Task::from_paths(paths);
			finish(hash_batch(&tasks, &options, render_options(sub)))
		}
		Some(("list", _)) => {
			for line in output::render_catalog(&catalog::shared()) {
				println!("{}", line);
			}
			Ok(())
		}
		Some(("version", _)) => {
			print_version();
			Ok(())
		}
		Some(("completions", sub)) => {
			if let Some(shell) = sub.get_one::<Shell>("shell").copied() {
				let mut cmd = build_cli();
				generate(shell, &mut cmd, crate_name!(), &mut io::stdout());
			}
			Ok(())
		}
		Some(("interactive", _)) => run_interactive_mode(&loader),
		Some((other, _)) => {
			Err(format!("unsupported command `{}`", other).into())
		}
		None if io::stdin().is_terminal() => {
			run_interactive_mode(&loader)
		}
		None => {
			build_cli().print_help()?;
			Ok(())
		}
	}
}
