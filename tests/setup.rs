mod common;

use common::*;
use hexbound_rules::board::{EdgeId, PlayerMode};
use hexbound_rules::game::event::{DomainEvent, Placement};
use hexbound_rules::game::state::Phase;
use hexbound_rules::game::{
    Game, GameAction, PlacementRule, PlayerId, ResourceBundle, Violation, legal_actions,
};
use hexbound_rules::types::PieceKind;

#[test]
fn setup_runs_in_snake_order_then_starts_turn_one() {
    let (mut state, mut rng) = setup_state(5);
    let mut settlement_order = Vec::new();
    let mut events = Vec::new();
    while state.turn.phase == Phase::Setup {
        let actor = state.turn.active;
        let action = legal_actions(&state, actor).into_iter().next().unwrap();
        if matches!(action, GameAction::BuildSettlement { .. }) {
            settlement_order.push(actor);
        }
        let reduction = step(&state, &mut rng, actor, action);
        events.extend(reduction.events.into_iter().map(|e| e.event));
        state = reduction.state;
    }

    assert_eq!(settlement_order, vec![P1, P2, P3, P4, P4, P3, P2, P1]);
    assert_eq!(state.turn.phase, Phase::PreRoll);
    assert_eq!(state.turn.turn_number, 1);
    assert_eq!(state.turn.active, P1);
    assert!(state.turn.setup.is_none());
    for player in state.players.iter() {
        assert_eq!(player.settlements.len(), 2);
        assert_eq!(player.roads.len(), 2);
    }
    assert!(matches!(
        &events[events.len() - 2..],
        [
            DomainEvent::SetupPhaseEnded,
            DomainEvent::TurnStarted {
                player: P1,
                turn_number: 1
            }
        ]
    ));
}

#[test]
fn second_settlement_grants_adjacent_resources() {
    let (mut state, mut rng) = setup_state(8);
    let mut last_node = None;
    let mut granted: Vec<(PlayerId, ResourceBundle)> = Vec::new();
    while state.turn.phase == Phase::Setup {
        let actor = state.turn.active;
        let action = legal_actions(&state, actor).into_iter().next().unwrap();
        let reduction = step(&state, &mut rng, actor, action);
        for sequenced in &reduction.events {
            match &sequenced.event {
                DomainEvent::SetupPiecePlaced {
                    location: Placement::Node(node),
                    ..
                } => last_node = Some(*node),
                DomainEvent::StartingResourcesGranted { player, resources } => {
                    let mut expected = ResourceBundle::zero();
                    for resource in state.board.node_resources(last_node.unwrap()) {
                        expected.add_resource(resource, 1);
                    }
                    assert_eq!(*resources, expected);
                    granted.push((*player, *resources));
                }
                _ => {}
            }
        }
        state = reduction.state;
    }

    for player in state.players.iter() {
        let total = granted
            .iter()
            .filter(|(id, _)| *id == player.id)
            .fold(ResourceBundle::zero(), |acc, (_, bundle)| acc + *bundle);
        assert_eq!(player.resources, total);
    }
    assert_eq!(
        state.total_resources(),
        hexbound_rules::game::bank::starting_supply(PlayerMode::Standard)
    );
}

#[test]
fn distance_rule_rejection_leaves_state_unchanged() {
    let mut game = Game::new(config(PlayerMode::Standard), seats(4), 21).unwrap();
    let node = game.state().board.node_ids().next().unwrap();
    game.submit(P1, &GameAction::BuildSettlement { node, is_free: true })
        .unwrap();
    let road = game.state().board.node_edges(node)[0];
    game.submit(P1, &GameAction::BuildRoad { edge: road, is_free: true })
        .unwrap();

    let neighbor = game.state().board.neighbors(node)[0];
    let before = serde_json::to_string(game.state()).unwrap();
    let index = game.event_index();
    let rejection = game
        .submit(
            P2,
            &GameAction::BuildSettlement {
                node: neighbor,
                is_free: true,
            },
        )
        .unwrap_err();

    assert!(rejection.contains(&Violation::IllegalPlacement(PlacementRule::DistanceRule)));
    assert_eq!(serde_json::to_string(game.state()).unwrap(), before);
    assert_eq!(game.event_index(), index);
    assert!(game.events_since(index).unwrap().is_empty());
}

#[test]
fn setup_road_must_touch_the_new_settlement() {
    let (state, mut rng) = setup_state(2);
    let node = state.board.node_ids().next().unwrap();
    let state = step(
        &state,
        &mut rng,
        P1,
        GameAction::BuildSettlement { node, is_free: true },
    )
    .state;

    let far = state
        .board
        .edge_ids()
        .find(|edge| !state.board.edge(*edge).unwrap().touches(node))
        .unwrap();
    let rejection = hexbound_rules::game::validate(
        &state,
        P1,
        &GameAction::BuildRoad {
            edge: far,
            is_free: true,
        },
    )
    .unwrap_err();
    assert_eq!(
        rejection.violations(),
        &[Violation::IllegalPlacement(PlacementRule::NotConnected)]
    );

    let second = hexbound_rules::game::validate(
        &state,
        P1,
        &GameAction::BuildSettlement {
            node: state.board.node_ids().last().unwrap(),
            is_free: true,
        },
    )
    .unwrap_err();
    assert_eq!(second.violations(), &[Violation::SetupPieceExpected]);
}

#[test]
fn setup_pieces_are_recorded_as_setup_events() {
    let (state, mut rng) = setup_state(4);
    let node = state.board.node_ids().nth(10).unwrap();
    let reduction = step(
        &state,
        &mut rng,
        P1,
        GameAction::BuildSettlement { node, is_free: true },
    );
    assert_eq!(reduction.events.len(), 1);
    assert_eq!(
        reduction.events[0].event,
        DomainEvent::SetupPiecePlaced {
            player: P1,
            piece: PieceKind::Settlement,
            location: Placement::Node(node),
        }
    );
    assert!(reduction.state.player(P1).unwrap().resources.is_empty());

    let edge: EdgeId = reduction.state.board.node_edges(node)[0];
    let next = step(
        &reduction.state,
        &mut rng,
        P1,
        GameAction::BuildRoad { edge, is_free: true },
    );
    let names: Vec<&str> = next.events.iter().map(|e| e.event.name()).collect();
    assert_eq!(names, vec!["setupPiecePlaced", "setupTurnAdvanced"]);
    assert_eq!(next.state.turn.active, P2);
    assert_eq!(next.events[0].index, 1);
}

#[test]
fn five_seat_board_supports_extended_setup() {
    let mut rng = hexbound_rules::rng::GameRng::new(9);
    let state = hexbound_rules::game::GameState::new(
        config(PlayerMode::Extended),
        seats(5),
        &mut rng,
    )
    .unwrap();
    let state = finish_setup(state, &mut rng);
    assert_eq!(state.turn.phase, Phase::PreRoll);
    assert!(state.players.iter().all(|p| p.settlements.len() == 2));
}
