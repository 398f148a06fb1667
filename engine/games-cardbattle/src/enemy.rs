//! Enemies and their intents

use std::fmt;

use engine_core::{choose, Chooser};

/// What an enemy will do on its next turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Hit the player `times` times for `damage` (plus strength) each.
    Attack { damage: u32, times: u32 },
    /// Hit once and gain block.
    AttackBlock { damage: u32, block: u32 },
    /// Gain block.
    Block(u32),
    /// Gain strength.
    Buff(u32),
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Attack { damage, times: 1 } => write!(f, "attack {}", damage),
            Intent::Attack { damage, times } => write!(f, "attack {}x{}", damage, times),
            Intent::AttackBlock { damage, block } => write!(f, "attack {} block {}", damage, block),
            Intent::Block(block) => write!(f, "block {}", block),
            Intent::Buff(strength) => write!(f, "buff {}", strength),
        }
    }
}

/// An enemy combatant.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub block: u32,
    pub strength: u32,
    /// Remaining turns of vulnerable (incoming damage x1.5)
    pub vulnerable: u32,
    /// Move set the next intent is drawn from
    pub moves: Vec<Intent>,
    pub intent: Intent,
}

impl Enemy {
    /// Create an enemy. The opening intent is the first move until
    /// [`Enemy::roll_intent`] is called.
    pub fn new(name: impl Into<String>, hp: u32, moves: Vec<Intent>) -> Self {
        debug_assert!(!moves.is_empty(), "enemy needs at least one move");
        let intent = moves.first().copied().unwrap_or(Intent::Block(0));
        Self {
            name: name.into(),
            hp,
            max_hp: hp,
            block: 0,
            strength: 0,
            vulnerable: 0,
            moves,
            intent,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Draw the next intent uniformly from the move set.
    pub fn roll_intent<C: Chooser + ?Sized>(&mut self, chooser: &mut C) {
        if let Some(intent) = choose(chooser, &self.moves) {
            self.intent = *intent;
        }
    }

    /// Apply incoming damage through vulnerable and block.
    /// Returns the hp actually lost.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let amount = if self.vulnerable > 0 {
            amount * 3 / 2
        } else {
            amount
        };
        let absorbed = amount.min(self.block);
        self.block -= absorbed;
        let lost = (amount - absorbed).min(self.hp);
        self.hp -= lost;
        lost
    }

    /// Resolve the current intent against this enemy's own stats.
    /// Returns the hits the player must take, each already including strength.
    pub fn act(&mut self) -> Vec<u32> {
        // Block from the previous round expires when the enemy acts again
        self.block = 0;
        let hits = match self.intent {
            Intent::Attack { damage, times } => vec![damage + self.strength; times as usize],
            Intent::AttackBlock { damage, block } => {
                self.block += block;
                vec![damage + self.strength]
            }
            Intent::Block(block) => {
                self.block += block;
                Vec::new()
            }
            Intent::Buff(strength) => {
                self.strength += strength;
                Vec::new()
            }
        };
        self.vulnerable = self.vulnerable.saturating_sub(1);
        hits
    }
}
