//! Battle state and turn structure
//!
//! A battle is one player against a group of enemies. The player's turn
//! starts by drawing [`HAND_SIZE`] cards with [`ENERGY_PER_TURN`] energy;
//! cards are played one at a time until the player ends the turn. Enemies then
//! resolve the intents they announced and draw new ones.
//!
//! The draw order and future enemy intents are hidden information. Both come
//! from the battle's own RNG, which [`GameState::sample_copy`] replaces along
//! with a reshuffled draw pile.

use std::fmt;

use engine_core::{shuffle, Chooser, GameAction, GameState, HandCard, PlayerAction};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::trace;

use crate::card::Card;
use crate::enemy::Enemy;

/// Cards drawn at the start of every player turn.
pub const HAND_SIZE: usize = 5;

/// Energy available at the start of every player turn.
pub const ENERGY_PER_TURN: u32 = 3;

/// Cards beyond this are left in the draw pile.
pub const MAX_HAND_SIZE: usize = 10;

/// Turn limit after which the battle ends without a winner.
pub const DEFAULT_MAX_TURNS: u32 = 20;

/// Reasons a player action is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BattleError {
    #[error("battle is already over")]
    BattleOver,

    #[error("no card at hand index {index} (hand size {hand_size})")]
    NoSuchCard { index: usize, hand_size: usize },

    #[error("no {0} in hand")]
    CardNotInHand(String),

    #[error("{card} costs {cost} energy but only {available} is available")]
    NotEnoughEnergy {
        card: String,
        cost: u32,
        available: u32,
    },

    #[error("enemy {0} is not a valid target")]
    InvalidTarget(usize),
}

/// The player combatant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub hp: u32,
    pub max_hp: u32,
    pub block: u32,
    pub energy: u32,
}

impl Player {
    pub fn new(hp: u32) -> Self {
        Self {
            hp,
            max_hp: hp,
            block: 0,
            energy: 0,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Apply incoming damage through block. Returns the hp actually lost.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let absorbed = amount.min(self.block);
        self.block -= absorbed;
        let lost = (amount - absorbed).min(self.hp);
        self.hp -= lost;
        lost
    }
}

/// Complete state of one battle.
#[derive(Debug, Clone)]
pub struct Battle {
    player: Player,
    enemies: Vec<Enemy>,
    hand: Vec<Card>,
    /// Top of the pile is the end of the Vec
    draw_pile: Vec<Card>,
    discard_pile: Vec<Card>,
    turn: u32,
    max_turns: u32,
    starting_enemy_hp: u32,
    rng: ChaCha20Rng,
}

impl Battle {
    /// Start a battle: shuffle the deck, announce enemy intents and begin the
    /// first player turn.
    pub fn new(player_hp: u32, deck: Vec<Card>, enemies: Vec<Enemy>, seed: u64) -> Self {
        let starting_enemy_hp = enemies.iter().map(|e| e.hp).sum();
        let mut battle = Self {
            player: Player::new(player_hp),
            enemies,
            hand: Vec::new(),
            draw_pile: deck,
            discard_pile: Vec::new(),
            turn: 1,
            max_turns: DEFAULT_MAX_TURNS,
            starting_enemy_hp,
            rng: ChaCha20Rng::seed_from_u64(seed),
        };
        shuffle(&mut battle.rng, &mut battle.draw_pile);
        battle.roll_intents();
        battle.start_player_turn();
        battle
    }

    /// Builder pattern: set the turn limit.
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn draw_pile(&self) -> &[Card] {
        &self.draw_pile
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard_pile
    }

    /// Current turn, starting at 1.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    pub fn won(&self) -> bool {
        self.player.is_alive() && self.enemies.iter().all(|e| !e.is_alive())
    }

    pub fn lost(&self) -> bool {
        !self.player.is_alive()
    }

    /// Whether the battle has ended by death, victory or the turn limit.
    pub fn is_over(&self) -> bool {
        self.lost() || self.won() || self.turn > self.max_turns
    }

    /// Indices of enemies that can be targeted.
    pub fn target_candidates(&self) -> Vec<usize> {
        self.enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_alive())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn first_target(&self) -> Option<usize> {
        self.enemies.iter().position(|e| e.is_alive())
    }

    /// Concrete actions the player may take: end turn plus every affordable
    /// card in hand, by position.
    pub fn legal_player_actions(&self) -> Vec<PlayerAction> {
        if self.is_over() {
            return Vec::new();
        }
        let mut actions = vec![PlayerAction::EndAgentTurn];
        actions.extend(
            self.hand
                .iter()
                .enumerate()
                .filter(|(_, card)| card.cost() <= self.player.energy)
                .map(|(i, _)| PlayerAction::PlayCard(i)),
        );
        actions
    }

    /// Perform a concrete action. `target` is only used by targeted cards.
    pub fn take_action(&mut self, action: PlayerAction, target: usize) -> Result<(), BattleError> {
        match action {
            PlayerAction::EndAgentTurn => self.end_turn(),
            PlayerAction::PlayCard(index) => self.play_card(index, target),
        }
    }

    /// Play the card at `index` of the hand.
    pub fn play_card(&mut self, index: usize, target: usize) -> Result<(), BattleError> {
        if self.is_over() {
            return Err(BattleError::BattleOver);
        }
        let card = self.hand.get(index).ok_or(BattleError::NoSuchCard {
            index,
            hand_size: self.hand.len(),
        })?;
        if card.cost() > self.player.energy {
            return Err(BattleError::NotEnoughEnergy {
                card: card.to_string(),
                cost: card.cost(),
                available: self.player.energy,
            });
        }
        let targeted = card.kind.targeted();
        if targeted && !self.enemies.get(target).is_some_and(|e| e.is_alive()) {
            return Err(BattleError::InvalidTarget(target));
        }

        let card = self.hand.remove(index);
        let effect = card.effect();
        self.player.energy -= card.cost();
        self.player.block += effect.block;
        if targeted {
            let enemy = &mut self.enemies[target];
            enemy.take_damage(effect.damage);
            enemy.vulnerable += effect.vulnerable;
        }
        trace!(card = %card, target, "Played card");

        self.draw(effect.draw as usize);
        self.discard_pile.push(card);
        Ok(())
    }

    /// End the player's turn and let the enemies act.
    pub fn end_turn(&mut self) -> Result<(), BattleError> {
        if self.is_over() {
            return Err(BattleError::BattleOver);
        }
        self.discard_pile.append(&mut self.hand);

        for enemy in self.enemies.iter_mut().filter(|e| e.is_alive()) {
            for hit in enemy.act() {
                self.player.take_damage(hit);
            }
            if !self.player.is_alive() {
                break;
            }
        }

        self.turn += 1;
        if !self.is_over() {
            self.roll_intents();
            self.start_player_turn();
        }
        Ok(())
    }

    /// Outcome in `[0, 1]`, higher is better for the player.
    ///
    /// A win scores at least 0.5, scaled up by the fraction of hp kept.
    /// Anything else scores below 0.4, scaled by the fraction of enemy hp removed.
    pub fn score(&self) -> f32 {
        if self.won() {
            0.5 + 0.5 * self.player.hp as f32 / self.player.max_hp.max(1) as f32
        } else if self.starting_enemy_hp == 0 {
            0.0
        } else {
            let remaining: u32 = self.enemies.iter().map(|e| e.hp).sum();
            let removed = self.starting_enemy_hp.saturating_sub(remaining);
            0.4 * removed as f32 / self.starting_enemy_hp as f32
        }
    }

    fn start_player_turn(&mut self) {
        self.player.block = 0;
        self.player.energy = ENERGY_PER_TURN;
        self.draw(HAND_SIZE);
    }

    fn roll_intents(&mut self) {
        for enemy in self.enemies.iter_mut().filter(|e| e.is_alive()) {
            enemy.roll_intent(&mut self.rng);
        }
    }

    /// Draw up to `count` cards, reshuffling the discard pile into the draw
    /// pile when it runs out.
    fn draw(&mut self, count: usize) {
        for _ in 0..count {
            if self.hand.len() >= MAX_HAND_SIZE {
                break;
            }
            if self.draw_pile.is_empty() {
                if self.discard_pile.is_empty() {
                    break;
                }
                self.draw_pile.append(&mut self.discard_pile);
                shuffle(&mut self.rng, &mut self.draw_pile);
            }
            if let Some(card) = self.draw_pile.pop() {
                self.hand.push(card);
            }
        }
    }
}

impl GameState for Battle {
    type Action = GameAction;

    /// End turn first, then one action per distinct affordable card identity
    /// in hand order.
    fn legal_actions(&self) -> Vec<GameAction> {
        if self.is_over() {
            return Vec::new();
        }
        let mut actions = vec![GameAction::EndTurn];
        for card in &self.hand {
            if card.cost() > self.player.energy {
                continue;
            }
            let action = GameAction::Play(card.key());
            if !actions.contains(&action) {
                actions.push(action);
            }
        }
        actions
    }

    /// Resolve the action by card identity and target the first living enemy.
    /// An action that cannot be played in this state ends the turn instead.
    fn apply(&mut self, action: &GameAction) {
        let result = match action {
            GameAction::EndTurn => self.end_turn(),
            GameAction::Play(key) => match action.find_in(&self.hand) {
                Some(index) => {
                    let target = self.first_target().unwrap_or(0);
                    self.play_card(index, target)
                }
                None => Err(BattleError::CardNotInHand(key.to_string())),
            },
        };

        if let Err(err) = result {
            trace!(%action, %err, "Action not applicable here, ending turn");
            if !self.is_over() {
                // end_turn only fails on a finished battle
                let _ = self.end_turn();
            }
        }
    }

    fn is_terminal(&self) -> bool {
        self.is_over()
    }

    fn evaluate(&self) -> f32 {
        self.score()
    }

    fn sample_copy<C: Chooser + ?Sized>(&self, chooser: &mut C) -> Self {
        let mut copy = self.clone();
        shuffle(chooser, &mut copy.draw_pile);
        copy.rng = ChaCha20Rng::seed_from_u64(chooser.choose_index(usize::MAX) as u64);
        copy
    }
}

impl fmt::Display for Battle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "turn {} | hp {}/{} block {} energy {}",
            self.turn, self.player.hp, self.player.max_hp, self.player.block, self.player.energy
        )?;
        for enemy in &self.enemies {
            if enemy.is_alive() {
                write!(f, " | {} {}/{} ({})", enemy.name, enemy.hp, enemy.max_hp, enemy.intent)?;
            } else {
                write!(f, " | {} dead", enemy.name)?;
            }
        }
        Ok(())
    }
}
