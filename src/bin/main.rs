// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashctl
// File: main.rs
// Author: hashctl maintainers

use hashctl::hctl::app;

fn main() -> Result<(), Box<dyn std::error::Error>> {
	app::run()?;
	Ok(())
}
