//! Player state: health, deployment points, hand, deck, and territory.

use crate::board::{PlayerId, SpaceId};
use crate::cards::CardId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Starting health for every player.
pub const STARTING_HEALTH: i32 = 20;

/// Starting deployment points for every player.
pub const STARTING_DP: u32 = 2;

/// Opening hand size drawn at session creation.
pub const OPENING_HAND_SIZE: usize = 5;

/// One player's complete state within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub health: i32,
    /// Current spendable deployment points
    pub deployment_points: u32,
    /// Hand, in draw order; duplicates allowed if the deck held duplicates
    pub hand_card_ids: Vec<CardId>,
    /// Draw pile; the front is the next draw
    pub deck_card_ids: Vec<CardId>,
    pub discard_pile: Vec<CardId>,
    /// Mirror of `BoardSpace.owner` for O(1) ownership queries.
    ///
    /// Invariant: `space.owner == Some(self.id)` iff this set contains the
    /// space id. Ordered set so serialized output is stable.
    pub owned_space_ids: BTreeSet<SpaceId>,
    /// Derived income components, recomputed from the board on each refresh
    pub territory_dp: u32,
    pub combat_dp: u32,
    pub position_dp: u32,
    /// Full circuits of the track completed by this player's token
    pub laps_completed: u32,
}

impl PlayerState {
    /// Create a fresh player with starting health and DP.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            health: STARTING_HEALTH,
            deployment_points: STARTING_DP,
            hand_card_ids: Vec::new(),
            deck_card_ids: Vec::new(),
            discard_pile: Vec::new(),
            owned_space_ids: BTreeSet::new(),
            territory_dp: 0,
            combat_dp: 0,
            position_dp: 0,
            laps_completed: 0,
        }
    }

    /// Whether a card is currently in hand.
    pub fn has_in_hand(&self, card_id: CardId) -> bool {
        self.hand_card_ids.contains(&card_id)
    }

    /// Remove the first copy of a card from hand. Returns false if absent.
    pub fn remove_from_hand(&mut self, card_id: CardId) -> bool {
        if let Some(pos) = self.hand_card_ids.iter().position(|&id| id == card_id) {
            self.hand_card_ids.remove(pos);
            true
        } else {
            false
        }
    }

    /// Move up to `count` cards from the top of the deck into the hand.
    ///
    /// Returns how many were actually drawn; drawing from an empty deck is
    /// not an error.
    pub fn draw(&mut self, count: usize) -> usize {
        let available = count.min(self.deck_card_ids.len());
        for _ in 0..available {
            let card = self.deck_card_ids.remove(0);
            self.hand_card_ids.push(card);
        }
        available
    }

    /// Spend deployment points, saturating at zero.
    pub fn spend_dp(&mut self, amount: u32) {
        self.deployment_points = self.deployment_points.saturating_sub(amount);
    }

    /// Gain deployment points.
    pub fn gain_dp(&mut self, amount: u32) {
        self.deployment_points += amount;
    }
}
