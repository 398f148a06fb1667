//! Injectable random choice
//!
//! Every random decision made during a search (which untried action to expand,
//! which action a rollout plays, how a sampled copy reshuffles its hidden
//! information) goes through a [`Chooser`]. Production code passes a seeded
//! `ChaCha20Rng`; tests can pass a [`ScriptedChooser`] to pin every decision.

use rand::Rng;

/// A source of "pick one of N" decisions.
pub trait Chooser {
    /// Return an index in `0..len`.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `len` is zero.
    fn choose_index(&mut self, len: usize) -> usize;
}

impl<R: Rng> Chooser for R {
    #[inline]
    fn choose_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot choose from an empty set");
        self.gen_range(0..len)
    }
}

/// Pick one element of `items`, or `None` if it is empty.
pub fn choose<'a, T, C: Chooser + ?Sized>(chooser: &mut C, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        Some(&items[chooser.choose_index(items.len())])
    }
}

/// Fisher-Yates shuffle driven by a chooser.
pub fn shuffle<T, C: Chooser + ?Sized>(chooser: &mut C, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = chooser.choose_index(i + 1);
        items.swap(i, j);
    }
}

/// Deterministic chooser that replays a fixed script.
///
/// Each call takes the next scripted value modulo `len`, cycling back to the
/// start of the script when it runs out. An empty script always picks index 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChooser {
    script: Vec<usize>,
    cursor: usize,
}

impl ScriptedChooser {
    pub fn new(script: Vec<usize>) -> Self {
        Self { script, cursor: 0 }
    }

    /// A chooser that always picks the first candidate.
    pub fn first() -> Self {
        Self::default()
    }

    /// Number of decisions made so far.
    pub fn calls(&self) -> usize {
        self.cursor
    }
}

impl Chooser for ScriptedChooser {
    fn choose_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot choose from an empty set");
        let value = if self.script.is_empty() {
            0
        } else {
            self.script[self.cursor % self.script.len()]
        };
        self.cursor += 1;
        value % len
    }
}
