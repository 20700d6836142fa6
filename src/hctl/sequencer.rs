// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashctl
// File: sequencer.rs
// Author: hashctl maintainers

//! Reorders out-of-order completions into input order.
//!
//! Workers call [`Sequencer::complete`] from any thread. The item is stored
//! under the lock and every item that is now contiguous with the last
//! delivered one is flushed to the sink, still under the lock. A worker
//! whose item is not yet due returns immediately.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::warn;

struct State<T, F> {
	pending: BTreeMap<usize, T>,
	next: usize,
	sink: F,
}

impl<T, F> State<T, F>
where
	F: FnMut(T),
{
	fn flush(&mut self) {
		while let Some(item) = self.pending.remove(&self.next) {
			(self.sink)(item);
			self.next += 1;
		}
	}
}

pub struct Sequencer<T, F> {
	state: Mutex<State<T, F>>,
}

impl<T, F> Sequencer<T, F>
where
	F: FnMut(T),
{
	pub fn new(sink: F) -> Self {
		Self {
			state: Mutex::new(State {
				pending: BTreeMap::new(),
				next: 0,
				sink,
			}),
		}
	}

	/// Hand over the item for `index`. Returns `false` if that index was
	/// already delivered or is already waiting; the item is dropped.
	pub fn complete(&self, index: usize, item: T) -> bool {
		let mut state = self.state.lock();
		if index < state.next || state.pending.contains_key(&index) {
			warn!(index, "duplicate completion ignored");
			return false;
		}
		state.pending.insert(index, item);
		state.flush();
		true
	}

	/// Index the sink expects next, which is also the number of items
	/// delivered so far.
	pub fn delivered(&self) -> usize {
		self.state.lock().next
	}

	/// Items completed but still waiting on an earlier index.
	pub fn buffered(&self) -> usize {
		self.state.lock().pending.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Barrier;
	use std::thread;

	#[test]
	fn buffers_until_gap_is_filled() {
		let mut seen = Vec::new();
		let sequencer = Sequencer::new(|item| seen.push(item));
		assert!(sequencer.complete(2, "c"));
		assert!(sequencer.complete(1, "b"));
		assert_eq!(sequencer.delivered(), 0);
		assert_eq!(sequencer.buffered(), 2);

		assert!(sequencer.complete(0, "a"));
		assert_eq!(sequencer.delivered(), 3);
		assert_eq!(sequencer.buffered(), 0);
		drop(sequencer);
		assert_eq!(seen, vec!["a", "b", "c"]);
	}

	#[test]
	fn rejects_duplicate_indexes() {
		let mut seen = Vec::new();
		let sequencer = Sequencer::new(|item| seen.push(item));
		assert!(sequencer.complete(0, 10));
		assert!(!sequencer.complete(0, 11));
		assert!(sequencer.complete(2, 12));
		assert!(!sequencer.complete(2, 13));
		drop(sequencer);
		assert_eq!(seen, vec![10]);
	}

	#[test]
	fn concurrent_reverse_completion_is_delivered_in_order() {
		const N: usize = 64;
		let mut seen = Vec::new();
		let sequencer = Sequencer::new(|item| seen.push(item));
		let barrier = Barrier::new(N);
		thread::scope(|scope| {
			for index in (0..N).rev() {
				let sequencer = &sequencer;
				let barrier = &barrier;
				scope.spawn(move || {
					barrier.wait();
					sequencer.complete(index, index);
				});
			}
		});
		assert_eq!(sequencer.delivered(), N);
		drop(sequencer);
		assert_eq!(seen, (0..N).collect::<Vec<_>>());
	}
}
