// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashctl
// File: batch.rs
// Author: hashctl maintainers

//! Bounded-concurrency batch hashing with ordered delivery.

use crate::hctl::catalog;
use crate::hctl::hash::{
	self, DigestError, DigestResult, Options, TaskInput,
};
use crate::hctl::sequencer::Sequencer;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// One unit of work. `index` is the task's position in the batch, which
/// is also the order results are delivered in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Task {
	pub index: usize,
	pub input: TaskInput,
}

impl Task {
	pub fn from_strings<I, S>(inputs: I) -> Vec<Task>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		inputs
			.into_iter()
			.enumerate()
			.map(|(index, text)| Task {
				index,
				input: TaskInput::Text(text.into()),
			})
			.collect()
	}

	pub fn from_paths<I, P>(paths: I) -> Vec<Task>
	where
		I: IntoIterator<Item = P>,
		P: Into<PathBuf>,
	{
		paths
			.into_iter()
			.enumerate()
			.map(|(index, path)| Task {
				index,
				input: TaskInput::File(path.into()),
			})
			.collect()
	}
}

/// Hash every task with `options.algorithm`, at most
/// `options.concurrency` at a time, and feed the results to `sink` in
/// task order. Blocks until all of them have been delivered and returns
/// how many were.
///
/// An unknown algorithm fails every task with `UnknownAlgorithm` without
/// reading any input or starting a worker. Other failures stay local to
/// their task.
pub fn run_batch<F>(tasks: &[Task], options: &Options, sink: F) -> usize
where
	F: FnMut(DigestResult) + Send,
{
	let Some(descriptor) = catalog::lookup(&options.algorithm) else {
		warn!(
			algorithm = %options.algorithm,
			tasks = tasks.len(),
			"unknown algorithm, failing batch without hashing"
		);
		let mut sink = sink;
		for task in tasks {
			sink(DigestResult::failed(
				&task.input,
				DigestError::UnknownAlgorithm(options.algorithm.clone()),
			));
		}
		return tasks.len();
	};

	let workers = worker_count(options.concurrency, tasks.len());
	info!(
		algorithm = descriptor.identifier,
		tasks = tasks.len(),
		workers,
		"starting batch"
	);
	run_ordered(
		tasks,
		workers,
		|task| {
			let result =
				hash::compute(&task.input, Some(descriptor), options);
			debug!(
				index = task.index,
				ok = result.is_ok(),
				elapsed_us = result.elapsed.as_micros() as u64,
				"task finished"
			);
			result
		},
		sink,
	)
}

/// Number of workers actually started: `requested` clamped to
/// `1..=tasks`, and zero for an empty batch.
pub fn worker_count(requested: usize, tasks: usize) -> usize {
	requested.max(1).min(tasks)
}

/// Run `compute` over `items` on a pool of `workers` threads and pass
/// each output to `sink` in item order. The pool size bounds how many
/// items are in flight; a slow item only holds back delivery, never the
/// other workers. A single worker runs on the calling thread.
pub fn run_ordered<T, R, C, F>(
	items: &[T],
	workers: usize,
	compute: C,
	sink: F,
) -> usize
where
	T: Sync,
	R: Send,
	C: Fn(&T) -> R + Sync + Send,
	F: FnMut(R) + Send,
{
	match worker_count(workers, items.len()) {
		0 => 0,
		1 => run_sequential(items, compute, sink),
		workers => {
			let pool = match ThreadPoolBuilder::new()
				.num_threads(workers)
				.thread_name(|i| format!("hashctl-worker-{i}"))
				.build()
			{
				Ok(pool) => pool,
				Err(err) => {
					warn!(
						workers,
						error = %err,
						"cannot start worker pool, hashing sequentially"
					);
					return run_sequential(items, compute, sink);
				}
			};
			let sequencer = Sequencer::new(sink);
			pool.install(|| {
				items.par_iter().enumerate().for_each(|(index, item)| {
					sequencer.complete(index, compute(item));
				})
			});
			debug!(
				delivered = sequencer.delivered(),
				buffered = sequencer.buffered(),
				"worker pool drained"
			);
			sequencer.delivered()
		}
	}
}

fn run_sequential<T, R, C, F>(
	items: &[T],
	compute: C,
	mut sink: F,
) -> usize
where
	C: Fn(&T) -> R,
	F: FnMut(R),
{
	for item in items {
		sink(compute(item));
	}
	items.len()
}
