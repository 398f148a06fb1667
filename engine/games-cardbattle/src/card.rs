//! Card definitions
//!
//! A card is a [`CardKind`] plus an upgrade level. Upgrades are cumulative:
//! every level adds the kind's per-upgrade bonus on top of its base numbers.

use std::fmt;

use engine_core::HandCard;

/// The cards available to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    Strike,
    Defend,
    Bash,
    PommelStrike,
    ShrugItOff,
}

/// What a card does when it resolves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardEffect {
    /// Damage dealt to the target before vulnerable and block
    pub damage: u32,
    /// Block gained by the player
    pub block: u32,
    /// Turns of vulnerable applied to the target
    pub vulnerable: u32,
    /// Cards drawn after resolving
    pub draw: u32,
}

impl CardKind {
    pub const ALL: [CardKind; 5] = [
        CardKind::Strike,
        CardKind::Defend,
        CardKind::Bash,
        CardKind::PommelStrike,
        CardKind::ShrugItOff,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CardKind::Strike => "Strike",
            CardKind::Defend => "Defend",
            CardKind::Bash => "Bash",
            CardKind::PommelStrike => "Pommel Strike",
            CardKind::ShrugItOff => "Shrug It Off",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn cost(self) -> u32 {
        match self {
            CardKind::Bash => 2,
            _ => 1,
        }
    }

    /// Whether the card needs an enemy target.
    pub fn targeted(self) -> bool {
        matches!(self, CardKind::Strike | CardKind::Bash | CardKind::PommelStrike)
    }

    /// Effect at the given upgrade level.
    pub fn effect(self, upgrades: u8) -> CardEffect {
        let n = upgrades as u32;
        match self {
            CardKind::Strike => CardEffect {
                damage: 6 + 3 * n,
                ..CardEffect::default()
            },
            CardKind::Defend => CardEffect {
                block: 5 + 3 * n,
                ..CardEffect::default()
            },
            CardKind::Bash => CardEffect {
                damage: 8 + 2 * n,
                vulnerable: 2 + n,
                ..CardEffect::default()
            },
            CardKind::PommelStrike => CardEffect {
                damage: 9 + n,
                draw: 1 + n,
                ..CardEffect::default()
            },
            CardKind::ShrugItOff => CardEffect {
                block: 8 + 3 * n,
                draw: 1,
                ..CardEffect::default()
            },
        }
    }
}

/// A card instance in the deck, hand or discard pile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub kind: CardKind,
    pub upgrades: u8,
}

impl Card {
    pub fn new(kind: CardKind) -> Self {
        Self { kind, upgrades: 0 }
    }

    pub fn upgraded(kind: CardKind, upgrades: u8) -> Self {
        Self { kind, upgrades }
    }

    pub fn cost(&self) -> u32 {
        self.kind.cost()
    }

    pub fn effect(&self) -> CardEffect {
        self.kind.effect(self.upgrades)
    }
}

impl HandCard for Card {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn upgrade_count(&self) -> u8 {
        self.upgrades
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// The standard starting deck: five Strikes, four Defends and a Bash.
pub fn starter_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(10);
    deck.extend((0..5).map(|_| Card::new(CardKind::Strike)));
    deck.extend((0..4).map(|_| Card::new(CardKind::Defend)));
    deck.push(Card::new(CardKind::Bash));
    deck
}
