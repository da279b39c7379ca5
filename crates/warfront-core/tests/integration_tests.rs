//! Integration tests for the Warfront game engine
//!
//! These tests drive full sessions through the public API the way a
//! service layer would: create a session, then call operations in turn
//! order with dice overrides for deterministic movement.

use warfront_core::{
    BoardLayout, CardCatalog, DeckMode, DeckRegistry, GameError, GamePhase, GameState,
    UnitSnapshot, OPENING_HAND_SIZE, STARTING_DP,
};

fn setup() -> (GameState, CardCatalog) {
    let catalog = CardCatalog::builtin();
    let registry = DeckRegistry::builtin();
    let deck = registry.deck("standard").expect("standard deck").clone();
    let state = GameState::new(
        "it-game",
        "alice",
        "bob",
        &deck,
        DeckMode::Separate,
        &catalog,
        &BoardLayout::default(),
    )
    .expect("session created");
    (state, catalog)
}

#[test]
fn test_full_opening_turn() {
    let (mut state, catalog) = setup();

    // Alice rolls a 3 onto an unclaimed space and takes it with a unit.
    state.roll_and_move("alice", Some(3)).expect("rolled");
    assert_eq!(state.current_phase, GamePhase::Claim);

    let alice = state.players.get_mut("alice").unwrap();
    alice.hand_card_ids.push(1); // Shock Trooper, cost 1
    assert_eq!(alice.deployment_points, STARTING_DP);

    state
        .claim_space("alice", 3, Some(1), &catalog)
        .expect("claimed");
    assert_eq!(state.players["alice"].deployment_points, STARTING_DP - 1);

    state.end_turn("alice", &catalog).expect("ended turn");
    assert_eq!(state.player_turn, "bob");
    assert_eq!(state.current_phase, GamePhase::RollMove);

    // Bob's turn proceeds from his own position, halfway around.
    state.roll_and_move("bob", Some(2)).expect("rolled");
    assert_eq!(state.player_positions["bob"], 14);
}

#[test]
fn test_ownership_mirror_stays_consistent() {
    let (mut state, catalog) = setup();

    state.roll_and_move("alice", Some(3)).expect("rolled");
    state
        .claim_space("alice", 3, None, &catalog)
        .expect("claimed");

    // Every owned space appears in exactly one player's mirror, and every
    // mirror entry points back at a space owned by that player.
    for space in &state.board.spaces {
        match &space.owner {
            Some(owner) => {
                assert!(state.players[owner].owned_space_ids.contains(&space.id));
                let other = state.opponent_of(owner).unwrap();
                assert!(!state.players[other].owned_space_ids.contains(&space.id));
            }
            None => {
                for player in state.players.values() {
                    assert!(!player.owned_space_ids.contains(&space.id));
                }
            }
        }
    }
}

#[test]
fn test_conquest_moves_mirror_between_players() {
    let (mut state, catalog) = setup();

    // Bob holds space 3 with a weak garrison.
    let conscript = catalog.find_card(6).unwrap();
    state.board.space_mut(3).unwrap().unit = Some(UnitSnapshot::from_card(conscript, "bob", 1));
    state.board.space_mut(3).unwrap().owner = Some("bob".to_string());
    state
        .players
        .get_mut("bob")
        .unwrap()
        .owned_space_ids
        .insert(3);

    state.roll_and_move("alice", Some(3)).expect("rolled");
    assert_eq!(state.current_phase, GamePhase::Battle);

    let alice = state.players.get_mut("alice").unwrap();
    alice.hand_card_ids.push(7); // Veteran Sergeant, 4 damage
    alice.deployment_points = 10;

    state.attack("alice", 3, 7, &catalog).expect("attacked");

    assert_eq!(state.board.space(3).unwrap().owner.as_deref(), Some("alice"));
    assert!(state.players["alice"].owned_space_ids.contains(&3));
    assert!(!state.players["bob"].owned_space_ids.contains(&3));
}

#[test]
fn test_dp_never_goes_negative_through_a_lost_battle() {
    let (mut state, catalog) = setup();

    // Bob garrisons space 3 with something unbeatable by a conscript.
    let sergeant = catalog.find_card(7).unwrap();
    state.board.space_mut(3).unwrap().unit = Some(UnitSnapshot::from_card(sergeant, "bob", 1));
    state.board.space_mut(3).unwrap().owner = Some("bob".to_string());
    state
        .players
        .get_mut("bob")
        .unwrap()
        .owned_space_ids
        .insert(3);

    state.roll_and_move("alice", Some(3)).expect("rolled");

    let alice = state.players.get_mut("alice").unwrap();
    alice.hand_card_ids.push(6);
    alice.deployment_points = 1; // far less than the toll

    state.attack("alice", 3, 6, &catalog).expect("attacked");
    assert_eq!(state.players["alice"].deployment_points, 0);
}

#[test]
fn test_claim_with_exact_dp_lands_at_zero() {
    let (mut state, catalog) = setup();

    state.roll_and_move("alice", Some(3)).expect("rolled");

    let alice = state.players.get_mut("alice").unwrap();
    alice.hand_card_ids.push(3); // Occult Adept, cost 2
    assert_eq!(alice.deployment_points, STARTING_DP);

    state
        .claim_space("alice", 3, Some(3), &catalog)
        .expect("claimed");

    assert_eq!(state.players["alice"].deployment_points, 0);
    assert_eq!(state.board.space(3).unwrap().owner.as_deref(), Some("alice"));
}

#[test]
fn test_wraparound_movement_and_lap_reward() {
    let (mut state, _) = setup();
    state.player_positions.insert("alice".to_string(), 23);

    state.roll_and_move("alice", Some(4)).expect("rolled");

    assert_eq!(state.player_positions["alice"], 3);
    assert_eq!(state.players["alice"].laps_completed, 1);
    assert_eq!(state.players["alice"].position_dp, 1);
}

#[test]
fn test_shared_deck_partitions_the_pool() {
    let catalog = CardCatalog::builtin();
    let registry = DeckRegistry::builtin();
    let deck = registry.deck("standard").expect("standard deck").clone();
    let state = GameState::new(
        "it-shared",
        "alice",
        "bob",
        &deck,
        DeckMode::Shared,
        &catalog,
        &BoardLayout::default(),
    )
    .expect("session created");

    let mut combined: Vec<u32> = Vec::new();
    for player in state.players.values() {
        combined.extend(&player.hand_card_ids);
        combined.extend(&player.deck_card_ids);
    }
    combined.sort_unstable();

    let mut expected = deck.cards.clone();
    expected.sort_unstable();
    assert_eq!(combined, expected, "shared pool split without loss or duplication");

    // Drawn cards left the draw pile: hand and deck never share a card.
    for player in state.players.values() {
        for card in &player.hand_card_ids {
            assert!(!player.deck_card_ids.contains(card));
        }
    }
}

#[test]
fn test_separate_decks_give_full_copies() {
    let (state, _) = setup();
    let registry = DeckRegistry::builtin();
    let deck = registry.deck("standard").unwrap();

    for player in state.players.values() {
        assert_eq!(
            player.hand_card_ids.len() + player.deck_card_ids.len(),
            deck.cards.len()
        );
        assert_eq!(player.hand_card_ids.len(), OPENING_HAND_SIZE);
    }
}

#[test]
fn test_rejected_actions_leave_state_untouched() {
    let (mut state, catalog) = setup();
    let before = state.clone();

    assert_eq!(
        state.roll_and_move("bob", Some(3)).unwrap_err(),
        GameError::NotYourTurn
    );
    assert_eq!(
        state.end_turn("bob", &catalog).unwrap_err(),
        GameError::NotYourTurn
    );
    assert!(matches!(
        state.claim_space("alice", 3, None, &catalog),
        Err(GameError::InvalidPhase(_))
    ));

    assert_eq!(state, before);
}

#[test]
fn test_gear_equip_unequip_is_idempotent_on_stats() {
    let (mut state, catalog) = setup();

    let card = catalog.find_card(2).unwrap();
    state.board.space_mut(2).unwrap().unit = Some(UnitSnapshot::from_card(card, "alice", 1));

    let baseline = state.board.space(2).unwrap().unit.clone().unwrap();

    let alice = state.players.get_mut("alice").unwrap();
    alice.hand_card_ids.extend([21, 23]); // blade and sidearm
    alice.deployment_points = 10;

    state.equip_gear("alice", 2, 21, &catalog).expect("equip blade");
    state.equip_gear("alice", 2, 23, &catalog).expect("equip sidearm");
    state.unequip_gear("alice", 2, 23, &catalog).expect("remove sidearm");
    state.unequip_gear("alice", 2, 21, &catalog).expect("remove blade");

    let after = state.board.space(2).unwrap().unit.clone().unwrap();
    assert_eq!(after.damage, baseline.damage);
    assert_eq!(after.defense, baseline.defense);
    assert_eq!(after.max_health, baseline.max_health);
    assert_eq!(after.abilities, baseline.abilities);
    assert!(after.equipped_gear_ids.is_empty());
}

#[test]
fn test_session_survives_serde_round_trip_mid_game() {
    let (mut state, catalog) = setup();

    state.roll_and_move("alice", Some(3)).expect("rolled");
    state
        .players
        .get_mut("alice")
        .unwrap()
        .hand_card_ids
        .push(1);
    state
        .claim_space("alice", 3, Some(1), &catalog)
        .expect("claimed");
    state.end_turn("alice", &catalog).expect("ended");

    let json = serde_json::to_string(&state).expect("serializes");
    let mut restored: GameState = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(state, restored);

    // The restored session keeps playing.
    restored.roll_and_move("bob", Some(2)).expect("rolled");
    assert_eq!(restored.player_positions["bob"], 14);
}

#[test]
fn test_exhaustion_resets_on_owners_next_turn() {
    let (mut state, catalog) = setup();

    // Alice's unit duels on her turn, exhausting it.
    let strong = catalog.find_card(7).unwrap();
    let weak = catalog.find_card(6).unwrap();
    state.board.space_mut(2).unwrap().unit = Some(UnitSnapshot::from_card(strong, "alice", 1));
    state.board.space_mut(5).unwrap().unit = Some(UnitSnapshot::from_card(weak, "bob", 1));

    state.attack_unit("alice", 2, 5, &catalog).expect("duel");
    assert!(state.board.space(2).unwrap().unit.as_ref().unwrap().exhausted);

    // Still exhausted through bob's turn...
    state.end_turn("alice", &catalog).expect("alice ends");
    assert!(state.board.space(2).unwrap().unit.as_ref().unwrap().exhausted);

    // ...and refreshed when alice's turn comes back around.
    state.end_turn("bob", &catalog).expect("bob ends");
    assert!(!state.board.space(2).unwrap().unit.as_ref().unwrap().exhausted);
}
