//! Concurrent session store.
//!
//! Sessions live in a `DashMap` keyed by generated session ids. Every
//! operation works clone-modify-commit: the engine runs against a copy of
//! the state and the copy replaces the stored one only on success, so a
//! rejected or half-applied operation never leaks into the store.

use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;
use warfront_core::{
    BoardLayout, CardCatalog, CardId, DeckMode, DeckRegistry, GameError, GameState, SpaceId,
};

/// Errors surfaced by the session service.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Unknown deck: {0}")]
    UnknownDeck(String),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// In-memory store of active sessions plus the shared card data.
///
/// The catalog and deck registry are immutable after construction and
/// shared by every session, so operations borrow them without locking.
pub struct SessionStore {
    sessions: DashMap<String, GameState>,
    catalog: CardCatalog,
    decks: DeckRegistry,
    layout: BoardLayout,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Store backed by the built-in card set and deck templates.
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            catalog: CardCatalog::builtin(),
            decks: DeckRegistry::builtin(),
            layout: BoardLayout::default(),
        }
    }

    /// The card catalog shared by every session.
    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    /// The available deck templates.
    pub fn decks(&self) -> &DeckRegistry {
        &self.decks
    }

    /// Create a new session for two players and return a snapshot of it.
    pub fn create_session(
        &self,
        player1_id: &str,
        player2_id: &str,
        deck_id: &str,
        mode: DeckMode,
    ) -> Result<GameState, StoreError> {
        let deck = self
            .decks
            .deck(deck_id)
            .ok_or_else(|| StoreError::UnknownDeck(deck_id.to_string()))?;

        let session_id = Uuid::new_v4().to_string();
        let state = GameState::new(
            &session_id,
            player1_id,
            player2_id,
            deck,
            mode,
            &self.catalog,
            &self.layout,
        )?;

        info!(session = %session_id, %player1_id, %player2_id, deck = %deck_id, "session created");
        self.sessions.insert(session_id, state.clone());
        Ok(state)
    }

    /// Snapshot a session's current state.
    pub fn get_session(&self, session_id: &str) -> Result<GameState, StoreError> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))
    }

    /// Ids of every live session.
    pub fn session_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop a session. Returns the final state if it existed.
    pub fn remove_session(&self, session_id: &str) -> Option<GameState> {
        let removed = self.sessions.remove(session_id).map(|(_, state)| state);
        if removed.is_some() {
            info!(session = %session_id, "session removed");
        }
        removed
    }

    /// Run an engine operation against a copy of the session and commit the
    /// copy only if the operation succeeds.
    fn update<T>(
        &self,
        session_id: &str,
        op: impl FnOnce(&mut GameState) -> Result<T, GameError>,
    ) -> Result<T, StoreError> {
        let mut entry = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;

        let mut working = entry.clone();
        let result = op(&mut working)?;
        *entry = working;
        Ok(result)
    }

    /// Roll and move the player's token. Returns the roll and the landing
    /// space, so callers can report both without a second lookup.
    pub fn roll_and_move(
        &self,
        session_id: &str,
        player_id: &str,
        dice_override: Option<u32>,
    ) -> Result<(u32, SpaceId), StoreError> {
        let (roll, position) = self.update(session_id, |state| {
            state.roll_and_move(player_id, dice_override)
        })?;
        info!(session = %session_id, %player_id, roll, position, "roll_and_move");
        Ok((roll, position))
    }

    /// Claim the space the player is standing on, optionally deploying a
    /// unit as its garrison.
    pub fn claim_space(
        &self,
        session_id: &str,
        player_id: &str,
        space_id: SpaceId,
        card_id: Option<CardId>,
    ) -> Result<GameState, StoreError> {
        self.update(session_id, |state| {
            state.claim_space(player_id, space_id, card_id, &self.catalog)
        })?;
        info!(session = %session_id, %player_id, space_id, ?card_id, "claim_space");
        self.get_session(session_id)
    }

    /// Fight for an enemy-owned space with a card from hand.
    pub fn attack(
        &self,
        session_id: &str,
        player_id: &str,
        space_id: SpaceId,
        card_id: CardId,
    ) -> Result<GameState, StoreError> {
        self.update(session_id, |state| {
            state.attack(player_id, space_id, card_id, &self.catalog)
        })?;
        info!(session = %session_id, %player_id, space_id, card_id, "attack");
        self.get_session(session_id)
    }

    /// Pay the toll on an enemy space instead of fighting.
    pub fn pay_toll(
        &self,
        session_id: &str,
        player_id: &str,
        space_id: SpaceId,
    ) -> Result<u32, StoreError> {
        let toll = self.update(session_id, |state| state.pay_toll(player_id, space_id))?;
        info!(session = %session_id, %player_id, space_id, toll, "pay_toll");
        Ok(toll)
    }

    /// Upgrade an owned space the player is standing on.
    pub fn upgrade_space(
        &self,
        session_id: &str,
        player_id: &str,
        space_id: SpaceId,
    ) -> Result<GameState, StoreError> {
        self.update(session_id, |state| state.upgrade_space(player_id, space_id))?;
        info!(session = %session_id, %player_id, space_id, "upgrade_space");
        self.get_session(session_id)
    }

    /// Attach a gear card from hand to one of the player's garrisons.
    pub fn equip_gear(
        &self,
        session_id: &str,
        player_id: &str,
        space_id: SpaceId,
        gear_card_id: CardId,
    ) -> Result<GameState, StoreError> {
        self.update(session_id, |state| {
            state.equip_gear(player_id, space_id, gear_card_id, &self.catalog)
        })?;
        info!(session = %session_id, %player_id, space_id, gear_card_id, "equip_gear");
        self.get_session(session_id)
    }

    /// Detach a gear card and return it to the player's hand.
    pub fn unequip_gear(
        &self,
        session_id: &str,
        player_id: &str,
        space_id: SpaceId,
        gear_card_id: CardId,
    ) -> Result<GameState, StoreError> {
        self.update(session_id, |state| {
            state.unequip_gear(player_id, space_id, gear_card_id, &self.catalog)
        })?;
        info!(session = %session_id, %player_id, space_id, gear_card_id, "unequip_gear");
        self.get_session(session_id)
    }

    /// Order a garrison duel between two spaces.
    pub fn attack_unit(
        &self,
        session_id: &str,
        player_id: &str,
        attacker_space_id: SpaceId,
        defender_space_id: SpaceId,
    ) -> Result<GameState, StoreError> {
        self.update(session_id, |state| {
            state.attack_unit(player_id, attacker_space_id, defender_space_id, &self.catalog)
        })?;
        info!(
            session = %session_id, %player_id,
            attacker_space_id, defender_space_id, "attack_unit"
        );
        self.get_session(session_id)
    }

    /// Cast a spell card from hand at a board space.
    pub fn cast_spell(
        &self,
        session_id: &str,
        player_id: &str,
        card_id: CardId,
        target_space_id: SpaceId,
    ) -> Result<GameState, StoreError> {
        self.update(session_id, |state| {
            state.cast_spell(player_id, card_id, target_space_id, &self.catalog)
        })?;
        info!(session = %session_id, %player_id, card_id, target_space_id, "cast_spell");
        self.get_session(session_id)
    }

    /// Draw cards from the player's own deck. Returns how many were drawn.
    pub fn draw_cards(
        &self,
        session_id: &str,
        player_id: &str,
        count: usize,
    ) -> Result<usize, StoreError> {
        let drawn = self.update(session_id, |state| state.draw_cards(player_id, count))?;
        info!(session = %session_id, %player_id, drawn, "draw_cards");
        Ok(drawn)
    }

    /// End the player's turn and hand the session to the opponent.
    pub fn end_turn(&self, session_id: &str, player_id: &str) -> Result<GameState, StoreError> {
        self.update(session_id, |state| state.end_turn(player_id, &self.catalog))?;
        info!(session = %session_id, %player_id, "end_turn");
        self.get_session(session_id)
    }

    /// Write one session to a JSON file.
    pub fn save_session(
        &self,
        session_id: &str,
        path: &std::path::Path,
    ) -> Result<(), StoreError> {
        let state = self.get_session(session_id)?;
        crate::persist::save_session(&state, path)?;
        info!(session = %session_id, path = %path.display(), "session saved");
        Ok(())
    }

    /// Load a session from a JSON file, replacing any live session with the
    /// same id. Returns the loaded state.
    pub fn load_session(&self, path: &std::path::Path) -> Result<GameState, StoreError> {
        let state = crate::persist::load_session(path)?;
        info!(session = %state.id, path = %path.display(), "session loaded");
        self.sessions.insert(state.id.clone(), state.clone());
        Ok(state)
    }
}
