//! Session state machine: the two-player game session and every operation
//! that advances it.
//!
//! This module contains:
//! - `GamePhase`, the per-turn phase machine
//! - `GameError`, the serializable error type shared with callers
//! - `GameState` and its operations (roll, claim, battle, upgrade, gear,
//!   duels, spells, turn handoff)
//!
//! All operations validate against the current turn and phase, mutate the
//! state in place, and append human-readable lines to the session log.
//! Randomness (dice, deck shuffles) comes from `rand::thread_rng`; dice
//! accept an override so tests can drive exact movement.

use crate::board::{Board, BoardLayout, PlayerId, SpaceId, UnitSnapshot};
use crate::cards::{AbilityEffect, CardId};
use crate::catalog::{CardCatalog, Deck};
use crate::combat;
use crate::economy;
use crate::gear;
use crate::player::{PlayerState, OPENING_HAND_SIZE};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Where the active player is within their turn.
///
/// `RollMove` starts every turn; landing picks one of the three middle
/// phases from the landing space's ownership; `EndTurn` means the landing
/// action has been resolved and only free actions remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    RollMove,
    Claim,
    Battle,
    Upgrade,
    EndTurn,
}

/// How the two players' decks are built at session creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckMode {
    /// One shuffled copy of the deck, split between the players
    Shared,
    /// Each player gets their own shuffled copy
    Separate,
}

/// Errors that can occur during game operations.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("Action not allowed in the {0:?} phase")]
    InvalidPhase(GamePhase),

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Space not found: {0}")]
    SpaceNotFound(SpaceId),

    #[error("Card not found: {0}")]
    CardNotFound(CardId),

    #[error("Card {0} is not in your hand")]
    CardNotInHand(CardId),

    #[error("Not enough deployment points: need {needed}, have {available}")]
    InsufficientDp { needed: u32, available: u32 },

    #[error("Your token is not on that space")]
    WrongPosition,

    #[error("Space is already owned")]
    AlreadyOwned,

    #[error("No defending unit on that space")]
    NoDefender,

    #[error("Invalid action: {0}")]
    InvalidArgument(String),
}

/// Full state of one two-player session.
///
/// Serializes to a single JSON document; persistence is exactly
/// serialize-then-write with no migration logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub id: String,
    pub players: HashMap<PlayerId, PlayerState>,
    pub board: Board,
    /// Token positions on the track
    pub player_positions: HashMap<PlayerId, SpaceId>,
    pub player_turn: PlayerId,
    pub current_phase: GamePhase,
    /// Global turn counter; one player's whole turn is one tick
    pub turn_number: u32,
    pub last_dice_roll: Option<u32>,
    pub log: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

impl GameState {
    /// Create a new session for two players from a deck template.
    ///
    /// Player 1 starts at space 0 and moves first; player 2 starts halfway
    /// around the track. Both draw an opening hand.
    pub fn new(
        id: &str,
        player1_id: &str,
        player2_id: &str,
        deck: &Deck,
        mode: DeckMode,
        catalog: &CardCatalog,
        layout: &BoardLayout,
    ) -> Result<Self, GameError> {
        if player1_id.is_empty() || player2_id.is_empty() {
            return Err(GameError::InvalidArgument(
                "player ids must be non-empty".to_string(),
            ));
        }
        if player1_id == player2_id {
            return Err(GameError::InvalidArgument(
                "players must be distinct".to_string(),
            ));
        }
        for &card_id in &deck.cards {
            if catalog.find_card(card_id).is_none() {
                return Err(GameError::CardNotFound(card_id));
            }
        }

        let board = Board::circular(layout);
        let mut rng = rand::thread_rng();

        let mut p1 = PlayerState::new(player1_id);
        let mut p2 = PlayerState::new(player2_id);

        match mode {
            DeckMode::Shared => {
                let mut pool = deck.cards.clone();
                pool.shuffle(&mut rng);
                let half = pool.len().div_ceil(2);
                p2.deck_card_ids = pool.split_off(half);
                p1.deck_card_ids = pool;
            }
            DeckMode::Separate => {
                let mut d1 = deck.cards.clone();
                let mut d2 = deck.cards.clone();
                d1.shuffle(&mut rng);
                d2.shuffle(&mut rng);
                p1.deck_card_ids = d1;
                p2.deck_card_ids = d2;
            }
        }

        p1.draw(OPENING_HAND_SIZE);
        p2.draw(OPENING_HAND_SIZE);

        let mut player_positions = HashMap::new();
        player_positions.insert(p1.id.clone(), 0);
        player_positions.insert(p2.id.clone(), board.total_spaces() / 2);

        let mut players = HashMap::new();
        let first = p1.id.clone();
        players.insert(p1.id.clone(), p1);
        players.insert(p2.id.clone(), p2);

        Ok(Self {
            id: id.to_string(),
            players,
            board,
            player_positions,
            player_turn: first,
            current_phase: GamePhase::RollMove,
            turn_number: 1,
            last_dice_roll: None,
            log: vec!["Game started.".to_string()],
            last_updated: Utc::now(),
        })
    }

    /// Refresh the modification timestamp. Called by every mutating op.
    fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    fn player(&self, id: &str) -> Result<&PlayerState, GameError> {
        self.players
            .get(id)
            .ok_or_else(|| GameError::PlayerNotFound(id.to_string()))
    }

    fn player_mut(&mut self, id: &str) -> Result<&mut PlayerState, GameError> {
        self.players
            .get_mut(id)
            .ok_or_else(|| GameError::PlayerNotFound(id.to_string()))
    }

    /// The opponent of `id`. Sessions hold exactly two players.
    pub fn opponent_of(&self, id: &str) -> Result<&PlayerId, GameError> {
        self.players
            .keys()
            .find(|p| p.as_str() != id)
            .ok_or_else(|| GameError::PlayerNotFound(id.to_string()))
    }

    fn ensure_turn(&self, player_id: &str) -> Result<(), GameError> {
        self.player(player_id)?;
        if self.player_turn != player_id {
            return Err(GameError::NotYourTurn);
        }
        Ok(())
    }

    fn ensure_phase(&self, phase: GamePhase) -> Result<(), GameError> {
        if self.current_phase != phase {
            return Err(GameError::InvalidPhase(self.current_phase));
        }
        Ok(())
    }

    fn position_of(&self, player_id: &str) -> Result<SpaceId, GameError> {
        self.player_positions
            .get(player_id)
            .copied()
            .ok_or_else(|| GameError::PlayerNotFound(player_id.to_string()))
    }

    fn ensure_at_space(&self, player_id: &str, space_id: SpaceId) -> Result<(), GameError> {
        if self.position_of(player_id)? != space_id {
            return Err(GameError::WrongPosition);
        }
        Ok(())
    }

    /// Transfer ownership of a space, keeping the players' owned-space
    /// mirrors in sync with `BoardSpace.owner`.
    fn set_owner(&mut self, space_id: SpaceId, new_owner: Option<String>) -> Result<(), GameError> {
        let space = self
            .board
            .space_mut(space_id)
            .ok_or(GameError::SpaceNotFound(space_id))?;
        let previous = space.owner.take();
        space.owner = new_owner.clone();

        if let Some(old) = previous {
            if let Some(player) = self.players.get_mut(&old) {
                player.owned_space_ids.remove(&space_id);
            }
        }
        if let Some(new) = new_owner {
            if let Some(player) = self.players.get_mut(&new) {
                player.owned_space_ids.insert(space_id);
            }
        }
        Ok(())
    }

    /// Spend DP for a card, or report exactly how short the player is.
    fn charge_deployment(&mut self, player_id: &str, card_id: CardId, catalog: &CardCatalog) -> Result<(), GameError> {
        let card = catalog
            .find_card(card_id)
            .ok_or(GameError::CardNotFound(card_id))?;
        let cost = economy::deployment_cost(card);
        let player = self.player_mut(player_id)?;
        if player.deployment_points < cost {
            return Err(GameError::InsufficientDp {
                needed: cost,
                available: player.deployment_points,
            });
        }
        player.spend_dp(cost);
        Ok(())
    }

    /// Roll the dice and advance the caller's token.
    ///
    /// `dice_override` replaces the random roll when given (clamped to a
    /// plain d6 range by validation). Completing a lap awards DP that grows
    /// with each circuit. The landing space's ownership picks the next
    /// phase. Returns the roll and the landing space.
    pub fn roll_and_move(
        &mut self,
        player_id: &str,
        dice_override: Option<u32>,
    ) -> Result<(u32, SpaceId), GameError> {
        self.ensure_turn(player_id)?;
        self.ensure_phase(GamePhase::RollMove)?;

        let roll = match dice_override {
            Some(r) if (1..=6).contains(&r) => r,
            Some(r) => {
                return Err(GameError::InvalidArgument(format!(
                    "dice roll {} out of range",
                    r
                )))
            }
            None => rand::thread_rng().gen_range(1..=6),
        };

        let from = self.position_of(player_id)?;
        let to = self.board.advance(from, roll);
        let completed_lap = from + roll >= self.board.total_spaces();

        self.player_positions.insert(player_id.to_string(), to);
        self.last_dice_roll = Some(roll);
        self.log
            .push(format!("{} rolled a {} and moved to space {}.", player_id, roll, to));

        if completed_lap {
            let player = self.player_mut(player_id)?;
            let award = economy::dp_from_lap(player.laps_completed);
            player.laps_completed += 1;
            player.gain_dp(award);
            player.position_dp += award;
            self.log
                .push(format!("{} completed a lap and gained {} DP!", player_id, award));
        }

        let space = self
            .board
            .space(to)
            .ok_or(GameError::SpaceNotFound(to))?;
        self.current_phase = match space.owner.as_deref() {
            None => GamePhase::Claim,
            Some(owner) if owner == player_id => GamePhase::Upgrade,
            Some(_) => GamePhase::Battle,
        };

        self.touch();
        Ok((roll, to))
    }

    /// Claim the unowned space the caller is standing on.
    ///
    /// With a card: deploys it as the garrison, paying its deployment cost.
    /// Without: a bare land grab that leaves the space undefended.
    pub fn claim_space(
        &mut self,
        player_id: &str,
        space_id: SpaceId,
        card_id: Option<CardId>,
        catalog: &CardCatalog,
    ) -> Result<(), GameError> {
        self.ensure_turn(player_id)?;
        self.ensure_phase(GamePhase::Claim)?;
        self.ensure_at_space(player_id, space_id)?;

        {
            let space = self
                .board
                .space(space_id)
                .ok_or(GameError::SpaceNotFound(space_id))?;
            if space.owner.is_some() {
                return Err(GameError::AlreadyOwned);
            }
        }

        if let Some(card_id) = card_id {
            let card = catalog
                .find_card(card_id)
                .ok_or(GameError::CardNotFound(card_id))?
                .clone();
            if !card.category.is_placeable() {
                return Err(GameError::InvalidArgument(format!(
                    "{} cannot garrison a space",
                    card.name
                )));
            }
            if !self.player(player_id)?.has_in_hand(card_id) {
                return Err(GameError::CardNotInHand(card_id));
            }

            self.charge_deployment(player_id, card_id, catalog)?;
            self.player_mut(player_id)?.remove_from_hand(card_id);

            let snapshot = UnitSnapshot::from_card(&card, player_id, self.turn_number);
            let space = self
                .board
                .space_mut(space_id)
                .ok_or(GameError::SpaceNotFound(space_id))?;
            space.unit = Some(snapshot);
            self.log.push(format!(
                "{} claimed space {} and deployed {}.",
                player_id, space_id, card.name
            ));
        } else {
            self.log
                .push(format!("{} claimed space {}.", player_id, space_id));
        }

        self.set_owner(space_id, Some(player_id.to_string()))?;
        self.current_phase = GamePhase::EndTurn;
        self.touch();
        Ok(())
    }

    /// Challenge the garrison of the enemy space the caller landed on.
    ///
    /// The challenging card leaves the hand either way: on a win it becomes
    /// the new garrison and the space changes hands; on a loss it is
    /// discarded and the toll moves from attacker to defender.
    pub fn attack(
        &mut self,
        player_id: &str,
        space_id: SpaceId,
        card_id: CardId,
        catalog: &CardCatalog,
    ) -> Result<(), GameError> {
        self.ensure_turn(player_id)?;
        self.ensure_phase(GamePhase::Battle)?;
        self.ensure_at_space(player_id, space_id)?;

        let (defender, space_snapshot) = {
            let space = self
                .board
                .space(space_id)
                .ok_or(GameError::SpaceNotFound(space_id))?;
            match space.owner.as_deref() {
                None => {
                    return Err(GameError::InvalidArgument(
                        "space is unowned; claim it instead".to_string(),
                    ))
                }
                Some(owner) if owner == player_id => {
                    return Err(GameError::InvalidArgument(
                        "cannot attack your own space".to_string(),
                    ))
                }
                Some(_) => {}
            }
            let unit = space.unit.clone().ok_or(GameError::NoDefender)?;
            (unit, space.clone())
        };

        let card = catalog
            .find_card(card_id)
            .ok_or(GameError::CardNotFound(card_id))?
            .clone();
        if !card.category.is_placeable() {
            return Err(GameError::InvalidArgument(format!(
                "{} cannot fight for a space",
                card.name
            )));
        }
        if !self.player(player_id)?.has_in_hand(card_id) {
            return Err(GameError::CardNotInHand(card_id));
        }

        let outcome = combat::resolve_territory(&card, &defender, &space_snapshot);
        self.log.extend(outcome.log.iter().cloned());

        self.player_mut(player_id)?.remove_from_hand(card_id);

        if outcome.attacker_wins {
            // Spend the deployment cost saturating rather than failing: the
            // card is already committed to the battle at this point.
            let cost = economy::deployment_cost(&card);
            self.player_mut(player_id)?.spend_dp(cost);
            let snapshot = UnitSnapshot::from_card(&card, player_id, self.turn_number);
            {
                let space = self
                    .board
                    .space_mut(space_id)
                    .ok_or(GameError::SpaceNotFound(space_id))?;
                space.unit = Some(snapshot);
            }
            self.set_owner(space_id, Some(player_id.to_string()))?;
        } else {
            let toll = outcome.toll_amount;
            self.player_mut(player_id)?.discard_pile.push(card_id);
            self.player_mut(player_id)?.spend_dp(toll);
            let defender_owner = defender.player_id.clone();
            if let Ok(owner) = self.player_mut(&defender_owner) {
                owner.gain_dp(toll);
                owner.combat_dp += toll;
            }
        }

        self.current_phase = GamePhase::EndTurn;
        self.touch();
        Ok(())
    }

    /// Pay the toll on an enemy space instead of fighting for it.
    pub fn pay_toll(&mut self, player_id: &str, space_id: SpaceId) -> Result<u32, GameError> {
        self.ensure_turn(player_id)?;
        self.ensure_phase(GamePhase::Battle)?;
        self.ensure_at_space(player_id, space_id)?;

        let (toll, owner_id) = {
            let space = self
                .board
                .space(space_id)
                .ok_or(GameError::SpaceNotFound(space_id))?;
            let owner = match space.owner.as_deref() {
                Some(owner) if owner != player_id => owner.to_string(),
                _ => {
                    return Err(GameError::InvalidArgument(
                        "no toll due on this space".to_string(),
                    ))
                }
            };
            (economy::toll_for_space(space), owner)
        };

        self.player_mut(player_id)?.spend_dp(toll);
        {
            let owner = self.player_mut(&owner_id)?;
            owner.gain_dp(toll);
            owner.combat_dp += toll;
        }
        self.log.push(format!(
            "{} paid a {} DP toll to {}.",
            player_id, toll, owner_id
        ));

        self.current_phase = GamePhase::EndTurn;
        self.touch();
        Ok(toll)
    }

    /// Upgrade the owned space the caller is standing on.
    ///
    /// Costs the space's current toll; the new level raises both toll and
    /// income, and the upgrade itself pays out a small DP bonus.
    pub fn upgrade_space(&mut self, player_id: &str, space_id: SpaceId) -> Result<(), GameError> {
        self.ensure_turn(player_id)?;
        self.ensure_phase(GamePhase::Upgrade)?;
        self.ensure_at_space(player_id, space_id)?;

        let cost = {
            let space = self
                .board
                .space(space_id)
                .ok_or(GameError::SpaceNotFound(space_id))?;
            if space.owner.as_deref() != Some(player_id) {
                return Err(GameError::InvalidArgument(
                    "you can only upgrade your own spaces".to_string(),
                ));
            }
            economy::toll_for_space(space)
        };

        {
            let player = self.player(player_id)?;
            if player.deployment_points < cost {
                return Err(GameError::InsufficientDp {
                    needed: cost,
                    available: player.deployment_points,
                });
            }
        }

        let new_level = {
            let space = self
                .board
                .space_mut(space_id)
                .ok_or(GameError::SpaceNotFound(space_id))?;
            space.level += 1;
            space.level
        };

        // The award is a one-time payout, not income: it goes to spendable
        // DP only, so `territory_dp` stays a pure recomputation of the board.
        let bonus = economy::dp_from_upgrade(new_level);
        {
            let player = self.player_mut(player_id)?;
            player.spend_dp(cost);
            player.gain_dp(bonus);
        }
        self.log.push(format!(
            "{} upgraded space {} to level {} for {} DP.",
            player_id, space_id, new_level, cost
        ));

        self.current_phase = GamePhase::EndTurn;
        self.touch();
        Ok(())
    }

    /// Attach a gear card from hand to one of the caller's garrisons.
    ///
    /// Allowed in any phase of the caller's turn.
    pub fn equip_gear(
        &mut self,
        player_id: &str,
        space_id: SpaceId,
        gear_card_id: CardId,
        catalog: &CardCatalog,
    ) -> Result<(), GameError> {
        self.ensure_turn(player_id)?;

        let gear_card = catalog
            .find_card(gear_card_id)
            .ok_or(GameError::CardNotFound(gear_card_id))?
            .clone();
        if !gear_card.category.is_equippable() {
            return Err(GameError::InvalidArgument(format!(
                "{} is not gear",
                gear_card.name
            )));
        }
        if !self.player(player_id)?.has_in_hand(gear_card_id) {
            return Err(GameError::CardNotInHand(gear_card_id));
        }

        {
            let space = self
                .board
                .space(space_id)
                .ok_or(GameError::SpaceNotFound(space_id))?;
            let unit = space.unit.as_ref().ok_or(GameError::NoDefender)?;
            if unit.player_id != player_id {
                return Err(GameError::InvalidArgument(
                    "you can only equip your own units".to_string(),
                ));
            }
        }

        self.charge_deployment(player_id, gear_card_id, catalog)?;
        self.player_mut(player_id)?.remove_from_hand(gear_card_id);

        let space = self
            .board
            .space_mut(space_id)
            .ok_or(GameError::SpaceNotFound(space_id))?;
        let unit = space.unit.as_mut().ok_or(GameError::NoDefender)?;
        gear::equip(unit, &gear_card);
        let unit_name = unit.name.clone();

        self.log.push(format!(
            "{} equipped {} with {}.",
            player_id, unit_name, gear_card.name
        ));
        self.touch();
        Ok(())
    }

    /// Detach a gear card from a garrison and return it to hand.
    ///
    /// Removing a gear id the unit doesn't carry is a no-op, not an error.
    /// The unit's stats are rebuilt from its base card plus the remaining
    /// gear, so stacked modifiers stay consistent.
    pub fn unequip_gear(
        &mut self,
        player_id: &str,
        space_id: SpaceId,
        gear_card_id: CardId,
        catalog: &CardCatalog,
    ) -> Result<(), GameError> {
        self.ensure_turn(player_id)?;

        let (base_card, remaining_ids) = {
            let space = self
                .board
                .space(space_id)
                .ok_or(GameError::SpaceNotFound(space_id))?;
            let unit = space.unit.as_ref().ok_or(GameError::NoDefender)?;
            if unit.player_id != player_id {
                return Err(GameError::InvalidArgument(
                    "you can only unequip your own units".to_string(),
                ));
            }
            let remaining = match gear::remaining_after_removal(unit, gear_card_id) {
                Some(remaining) => remaining,
                None => return Ok(()),
            };
            let base = catalog
                .find_card(unit.card_id)
                .ok_or(GameError::CardNotFound(unit.card_id))?
                .clone();
            (base, remaining)
        };

        let mut remaining_cards = Vec::with_capacity(remaining_ids.len());
        for id in &remaining_ids {
            remaining_cards.push(
                catalog
                    .find_card(*id)
                    .ok_or(GameError::CardNotFound(*id))?
                    .clone(),
            );
        }

        {
            let space = self
                .board
                .space_mut(space_id)
                .ok_or(GameError::SpaceNotFound(space_id))?;
            let unit = space.unit.as_mut().ok_or(GameError::NoDefender)?;
            let refs: Vec<&crate::cards::CardDefinition> = remaining_cards.iter().collect();
            gear::recompute_from_base(unit, &base_card, &refs);
        }

        self.player_mut(player_id)?.hand_card_ids.push(gear_card_id);
        self.log
            .push(format!("{} unequipped a gear card from space {}.", player_id, space_id));
        self.touch();
        Ok(())
    }

    /// Order one of the caller's garrisons to attack an enemy garrison.
    ///
    /// Duel rules: damage floored at 1 after defense, counterattack unless
    /// the attacker strikes first, defeat removes the unit but not the
    /// space's ownership. Attacking exhausts the unit until the owner's
    /// next turn.
    pub fn attack_unit(
        &mut self,
        player_id: &str,
        attacker_space_id: SpaceId,
        defender_space_id: SpaceId,
        catalog: &CardCatalog,
    ) -> Result<(), GameError> {
        self.ensure_turn(player_id)?;

        let attacker = {
            let space = self
                .board
                .space(attacker_space_id)
                .ok_or(GameError::SpaceNotFound(attacker_space_id))?;
            let unit = space.unit.as_ref().ok_or(GameError::NoDefender)?;
            if unit.player_id != player_id {
                return Err(GameError::InvalidArgument(
                    "that unit is not yours".to_string(),
                ));
            }
            if unit.exhausted {
                return Err(GameError::InvalidArgument(
                    "unit has already attacked this turn".to_string(),
                ));
            }
            unit.clone()
        };

        let defender = {
            let space = self
                .board
                .space(defender_space_id)
                .ok_or(GameError::SpaceNotFound(defender_space_id))?;
            let unit = space.unit.as_ref().ok_or(GameError::NoDefender)?;
            if unit.player_id == player_id {
                return Err(GameError::InvalidArgument(
                    "cannot attack your own unit".to_string(),
                ));
            }
            unit.clone()
        };

        let outcome = combat::resolve_duel(&attacker, &defender);
        self.log.extend(outcome.log.iter().cloned());

        {
            let space = self
                .board
                .space_mut(defender_space_id)
                .ok_or(GameError::SpaceNotFound(defender_space_id))?;
            if outcome.defender_defeated {
                space.unit = None;
            } else if let Some(unit) = space.unit.as_mut() {
                unit.current_health -= outcome.damage_to_defender;
            }
        }

        {
            let space = self
                .board
                .space_mut(attacker_space_id)
                .ok_or(GameError::SpaceNotFound(attacker_space_id))?;
            if outcome.attacker_defeated {
                space.unit = None;
            } else if let Some(unit) = space.unit.as_mut() {
                unit.current_health -= outcome.damage_to_attacker;
                unit.exhausted = true;
                if outcome.defender_defeated {
                    unit.defeats += 1;
                }
            }
        }

        if outcome.defender_defeated && !outcome.attacker_defeated {
            self.check_evolution_at(attacker_space_id, catalog)?;
        }

        self.touch();
        Ok(())
    }

    /// Cast a spell card from hand at a board space.
    ///
    /// Damage spells strike the garrison there; named effects from the
    /// ability table (heals, buffs) apply to a friendly garrison. The card
    /// always goes to the discard pile.
    pub fn cast_spell(
        &mut self,
        player_id: &str,
        card_id: CardId,
        target_space_id: SpaceId,
        catalog: &CardCatalog,
    ) -> Result<(), GameError> {
        self.ensure_turn(player_id)?;

        let card = catalog
            .find_card(card_id)
            .ok_or(GameError::CardNotFound(card_id))?
            .clone();
        if !card.category.is_castable() {
            return Err(GameError::InvalidArgument(format!(
                "{} is not a spell",
                card.name
            )));
        }
        if !self.player(player_id)?.has_in_hand(card_id) {
            return Err(GameError::CardNotInHand(card_id));
        }
        {
            let space = self
                .board
                .space(target_space_id)
                .ok_or(GameError::SpaceNotFound(target_space_id))?;
            let unit = space.unit.as_ref().ok_or(GameError::NoDefender)?;
            // Beneficial spells only land on the caster's own garrison.
            if card.base_damage == 0 && unit.player_id != player_id {
                return Err(GameError::InvalidArgument(format!(
                    "{} can only target your own units",
                    card.name
                )));
            }
        }

        self.charge_deployment(player_id, card_id, catalog)?;
        {
            let player = self.player_mut(player_id)?;
            player.remove_from_hand(card_id);
            player.discard_pile.push(card_id);
        }

        let mut lines = Vec::new();
        let mut destroyed = false;
        {
            let space = self
                .board
                .space_mut(target_space_id)
                .ok_or(GameError::SpaceNotFound(target_space_id))?;
            let unit = space.unit.as_mut().ok_or(GameError::NoDefender)?;

            if card.base_damage > 0 {
                unit.current_health -= card.base_damage;
                lines.push(format!(
                    "{} hit {} for {} damage.",
                    card.name, unit.name, card.base_damage
                ));
                if unit.current_health <= 0 {
                    lines.push(format!("{} is destroyed!", unit.name));
                    destroyed = true;
                }
            }

            if !destroyed {
                for ability in &card.abilities {
                    match crate::cards::effect_for(ability) {
                        Some(AbilityEffect::Heal { amount }) => {
                            unit.current_health =
                                (unit.current_health + amount).min(unit.max_health);
                            lines.push(format!("{} was healed.", unit.name));
                        }
                        Some(AbilityEffect::StatBuff { damage, defense }) => {
                            unit.damage += damage;
                            unit.defense += defense;
                            lines.push(format!("{} was strengthened.", unit.name));
                        }
                        Some(AbilityEffect::DefenseSwap {
                            damage_gain,
                            defense_loss,
                        }) => {
                            unit.damage += damage_gain;
                            unit.defense = (unit.defense - defense_loss).max(0);
                            lines.push(format!("{} traded defense for fury.", unit.name));
                        }
                        None => {
                            lines.push(format!("{} had no effect.", ability));
                        }
                    }
                }
            }

            if destroyed {
                space.unit = None;
            }
        }

        self.log.extend(lines);
        self.touch();
        Ok(())
    }

    /// Draw cards from the caller's own deck. Allowed any time on their
    /// turn; drawing past an empty deck is not an error.
    pub fn draw_cards(&mut self, player_id: &str, count: usize) -> Result<usize, GameError> {
        self.ensure_turn(player_id)?;
        let drawn = self.player_mut(player_id)?.draw(count);
        if drawn > 0 {
            self.log
                .push(format!("{} drew {} card(s).", player_id, drawn));
        } else {
            self.log
                .push(format!("{}'s deck is empty.", player_id));
        }
        self.touch();
        Ok(drawn)
    }

    /// End the caller's turn and hand the session to the opponent.
    ///
    /// Legal in any phase of the caller's turn, so it doubles as an
    /// explicit skip. The outgoing player's survivors get an evolution
    /// check; the incoming player collects turn income, refreshes their
    /// exhausted units, and draws one card.
    pub fn end_turn(&mut self, player_id: &str, catalog: &CardCatalog) -> Result<(), GameError> {
        self.ensure_turn(player_id)?;

        self.check_evolutions_for(player_id, catalog)?;

        let next = self.opponent_of(player_id)?.clone();
        self.player_turn = next.clone();
        self.turn_number += 1;
        self.current_phase = GamePhase::RollMove;
        self.last_dice_roll = None;

        let income = economy::turn_income(&self.board, &next);
        let territory = economy::territory_income(&self.board, &next);
        {
            let player = self.player_mut(&next)?;
            player.gain_dp(income);
            player.territory_dp = territory;
        }

        for space in &mut self.board.spaces {
            if let Some(unit) = space.unit.as_mut() {
                if unit.player_id == next {
                    unit.exhausted = false;
                }
            }
        }

        self.player_mut(&next)?.draw(1);
        self.log
            .push(format!("{} ended their turn. {} gained {} DP.", player_id, next, income));
        self.touch();
        Ok(())
    }

    /// Run evolution checks on every garrison a player owns.
    fn check_evolutions_for(
        &mut self,
        player_id: &str,
        catalog: &CardCatalog,
    ) -> Result<(), GameError> {
        let candidates: Vec<SpaceId> = self
            .board
            .spaces
            .iter()
            .filter(|s| {
                s.unit
                    .as_ref()
                    .map(|u| u.player_id == player_id)
                    .unwrap_or(false)
            })
            .map(|s| s.id)
            .collect();
        for space_id in candidates {
            self.check_evolution_at(space_id, catalog)?;
        }
        Ok(())
    }

    /// Evolve the garrison at a space if its card's conditions are met.
    ///
    /// The evolved form replaces the snapshot wholesale; equipped gear is
    /// re-applied on top of the new base stats.
    fn check_evolution_at(
        &mut self,
        space_id: SpaceId,
        catalog: &CardCatalog,
    ) -> Result<(), GameError> {
        let (old_name, owner, gear_ids, evolved_id) = {
            let space = self
                .board
                .space(space_id)
                .ok_or(GameError::SpaceNotFound(space_id))?;
            let unit = match space.unit.as_ref() {
                Some(unit) => unit,
                None => return Ok(()),
            };
            let base = catalog
                .find_card(unit.card_id)
                .ok_or(GameError::CardNotFound(unit.card_id))?;
            let evolution = match &base.evolution {
                Some(evo) => evo,
                None => return Ok(()),
            };
            if !evolution.conditions_met(unit.turns_survived(self.turn_number), unit.defeats) {
                return Ok(());
            }
            let evolved_id = match evolution.evolves_to {
                Some(id) => id,
                None => return Ok(()),
            };
            (
                unit.name.clone(),
                unit.player_id.clone(),
                unit.equipped_gear_ids.clone(),
                evolved_id,
            )
        };

        let evolved_card = catalog
            .find_card(evolved_id)
            .ok_or(GameError::CardNotFound(evolved_id))?
            .clone();
        let mut snapshot = UnitSnapshot::from_card(&evolved_card, &owner, self.turn_number);
        for gear_id in gear_ids {
            let gear_card = catalog
                .find_card(gear_id)
                .ok_or(GameError::CardNotFound(gear_id))?;
            gear::equip(&mut snapshot, gear_card);
        }

        let space = self
            .board
            .space_mut(space_id)
            .ok_or(GameError::SpaceNotFound(space_id))?;
        space.unit = Some(snapshot);
        self.log
            .push(format!("{} evolved into {}!", old_name, evolved_card.name));
        Ok(())
    }
}
