//! Hierarchical section numbering.
//!
//! Depths are normalised against the first heading seen, and a jump of more
//! than one level is treated as a single step deeper. For levels
//! `[1, 2, 2, 3, 2, 1, 2]` the labels are
//! `1. 1.1. 1.2. 1.2.1. 1.3. 2. 2.1.`.
use std::fmt::Write;

const MAX_DEPTH: usize = 6;

/// Counter state for one table-of-contents run.
#[derive(Debug, Clone, Default)]
pub struct NumberingState {
  counters:             [u32; MAX_DEPTH],
  baseline_level:       Option<u8>,
  last_effective_depth: usize,
}

impl NumberingState {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Advance the counters for a heading at `level` and return its label
  /// (e.g. `"1.2.3."`) together with its effective depth (1-based).
  pub fn next(&mut self, level: u8) -> (String, usize) {
    let baseline = *self.baseline_level.get_or_insert(level);

    let relative = i32::from(level) - i32::from(baseline) + 1;
    let mut depth = usize::try_from(relative.max(1)).unwrap_or(1);
    depth = depth.min(self.last_effective_depth + 1).min(MAX_DEPTH);

    for counter in &mut self.counters[depth..] {
      *counter = 0;
    }
    self.counters[depth - 1] += 1;
    self.last_effective_depth = depth;

    let mut label = String::with_capacity(depth * 3);
    for counter in &self.counters[..depth] {
      let _ = write!(label, "{counter}.");
    }
    (label, depth)
  }
}
