// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashctl
// File: lib.rs
// Author: hashctl maintainers

pub mod hctl {
	pub mod app;
	pub mod batch;
	pub mod catalog;
	pub mod config;
	pub mod hash;
	pub mod output;
	pub mod sequencer;
}
