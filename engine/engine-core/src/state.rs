//! State adapter trait connecting a simulation to the search engine
//!
//! The search never inspects game rules directly. Everything it needs from a
//! battle (what can be done, what happens when it is done, whether the battle is
//! over and how well it went) goes through this trait.

use std::fmt::{Debug, Display};

use crate::chooser::Chooser;

/// A mutable, simulatable game state.
///
/// Implementations own all of their hidden information (draw order, enemy
/// intents, internal RNG). The search only ever mutates copies produced by
/// [`GameState::sample_copy`], so the true state handed to a search is never
/// changed by it.
///
/// # Contract
///
/// * `legal_actions` is non-empty unless `is_terminal` is true.
/// * `apply` is only called with an action returned by `legal_actions` on a
///   state reachable at the same tree position. Behavior for other actions is
///   up to the implementation.
/// * `is_terminal` is monotone: once true it stays true for that instance.
/// * `evaluate` is only meaningful on terminal states, is stable, and higher is
///   better for the searching agent.
/// * `sample_copy` returns an independent instance whose hidden randomness has
///   been re-resolved using `chooser`.
///
/// # Example
///
/// ```rust
/// use engine_core::{Chooser, GameState};
///
/// #[derive(Debug, Clone)]
/// struct Countdown {
///     remaining: u32,
///     score: f32,
/// }
///
/// impl GameState for Countdown {
///     type Action = u32;
///
///     fn legal_actions(&self) -> Vec<u32> {
///         if self.remaining == 0 {
///             Vec::new()
///         } else {
///             (1..=self.remaining.min(2)).collect()
///         }
///     }
///
///     fn apply(&mut self, action: &u32) {
///         self.remaining -= *action;
///         self.score += *action as f32;
///     }
///
///     fn is_terminal(&self) -> bool {
///         self.remaining == 0
///     }
///
///     fn evaluate(&self) -> f32 {
///         self.score
///     }
///
///     fn sample_copy<C: Chooser + ?Sized>(&self, _chooser: &mut C) -> Self {
///         self.clone()
///     }
/// }
///
/// let mut state = Countdown { remaining: 3, score: 0.0 };
/// assert_eq!(state.legal_actions(), vec![1, 2]);
/// state.apply(&2);
/// state.apply(&1);
/// assert!(state.is_terminal());
/// assert_eq!(state.evaluate(), 3.0);
/// ```
pub trait GameState {
    /// Abstract action type labelling tree edges.
    ///
    /// Equality identifies edges: two actions that compare equal are the same
    /// child of a node, even when they were produced by different samples.
    /// `Display` is used when rendering the search tree.
    type Action: Clone + PartialEq + Debug + Display;

    /// Enumerate the distinct legal actions from this state.
    fn legal_actions(&self) -> Vec<Self::Action>;

    /// Apply an action, mutating the state in place.
    fn apply(&mut self, action: &Self::Action);

    /// Whether the battle is over.
    fn is_terminal(&self) -> bool;

    /// Scalar outcome of a terminal state.
    fn evaluate(&self) -> f32;

    /// Produce an independent copy with hidden randomness resolved afresh.
    fn sample_copy<C: Chooser + ?Sized>(&self, chooser: &mut C) -> Self
    where
        Self: Sized;
}
