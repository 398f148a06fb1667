//! Abstract and concrete battle actions
//!
//! The search labels its edges with [`GameAction`]s, which name a card by
//! identity (name and upgrade level) rather than by its position in the hand.
//! Hand positions shift as cards are drawn and played, and differ between
//! sampled copies of the same state, so only identity is stable across
//! iterations. Before an action can be played it is resolved back to a
//! [`PlayerAction`] against the actual hand.

use std::fmt;

use tracing::warn;

/// Identity of a card: two cards with the same key are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardKey {
    pub name: String,
    pub upgrades: u8,
}

impl CardKey {
    pub fn new(name: impl Into<String>, upgrades: u8) -> Self {
        Self {
            name: name.into(),
            upgrades,
        }
    }
}

impl fmt::Display for CardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrades {
            0 => write!(f, "{}", self.name),
            1 => write!(f, "{}+", self.name),
            n => write!(f, "{}+{}", self.name, n),
        }
    }
}

/// Anything held in a hand that can be matched against a [`CardKey`].
pub trait HandCard {
    fn name(&self) -> &str;
    fn upgrade_count(&self) -> u8;

    fn key(&self) -> CardKey {
        CardKey::new(self.name(), self.upgrade_count())
    }

    fn matches(&self, key: &CardKey) -> bool {
        self.name() == key.name && self.upgrade_count() == key.upgrades
    }
}

/// Abstract move used as a search tree edge label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// End the agent's turn.
    EndTurn,
    /// Play any card in hand with this identity.
    Play(CardKey),
}

/// Concrete move understood by the battle simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    EndAgentTurn,
    /// Play the card at this index of the hand.
    PlayCard(usize),
}

impl GameAction {
    pub fn play(name: impl Into<String>, upgrades: u8) -> Self {
        GameAction::Play(CardKey::new(name, upgrades))
    }

    /// The card this action plays, if any.
    pub fn card(&self) -> Option<&CardKey> {
        match self {
            GameAction::EndTurn => None,
            GameAction::Play(key) => Some(key),
        }
    }

    /// Find the first card in `hand` matching this action.
    pub fn find_in<C: HandCard>(&self, hand: &[C]) -> Option<usize> {
        let key = self.card()?;
        hand.iter().position(|card| card.matches(key))
    }

    /// Resolve this action against the current hand.
    ///
    /// A card that is no longer in the hand resolves to
    /// [`PlayerAction::EndAgentTurn`] so that a stale lookup degrades to a safe
    /// move instead of aborting the caller.
    pub fn to_action<C: HandCard>(&self, hand: &[C]) -> PlayerAction {
        match self {
            GameAction::EndTurn => PlayerAction::EndAgentTurn,
            GameAction::Play(key) => match self.find_in(hand) {
                Some(index) => PlayerAction::PlayCard(index),
                None => {
                    warn!(card = %key, hand_size = hand.len(), "Card not in hand, ending turn instead");
                    PlayerAction::EndAgentTurn
                }
            },
        }
    }
}

impl fmt::Display for GameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameAction::EndTurn => write!(f, "End Turn"),
            GameAction::Play(key) => write!(f, "Play {}", key),
        }
    }
}
