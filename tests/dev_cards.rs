mod common;

use common::*;
use hexbound_rules::game::bank::Bank;
use hexbound_rules::game::event::DomainEvent;
use hexbound_rules::game::state::{BuildingKind, GameState};
use hexbound_rules::game::{
    COST_CITY, COST_DEVELOPMENT, COST_SETTLEMENT, GameAction, PlacementRule, ResourceBundle,
    Violation, validate,
};
use hexbound_rules::types::{DevelopmentCard, Resource};

fn stack_deck(state: &mut GameState, deck: Vec<DevelopmentCard>) {
    let resources = *state.bank.resources();
    state.bank = Bank::with_deck(resources, deck);
}

#[test]
fn bought_cards_wait_a_turn() {
    let (mut state, mut rng) = main_state(40);
    stack_deck(&mut state, vec![DevelopmentCard::Monopoly, DevelopmentCard::Knight]);
    give(&mut state, P1, COST_DEVELOPMENT);

    let bought = step(&state, &mut rng, P1, GameAction::BuyDevelopmentCard);
    assert_eq!(
        bought.events[0].event,
        DomainEvent::DevelopmentCardBought {
            player: P1,
            kind: DevelopmentCard::Knight
        }
    );
    let mut state = bought.state;
    assert_eq!(state.bank.development_deck_len(), 1);
    assert!(state.player(P1).unwrap().resources.is_empty());

    let knight = GameAction::PlayKnight {
        move_robber_to: state
            .board
            .hexes()
            .iter()
            .map(|hex| hex.id)
            .find(|hex| *hex != state.robber)
            .unwrap(),
        steal_from: None,
    };
    assert_eq!(
        validate(&state, P1, &knight).unwrap_err().violations(),
        &[Violation::CardBoughtThisTurn]
    );
    assert_eq!(
        validate(&state, P1, &GameAction::PlayMonopoly {
            resource: Resource::Ore
        })
        .unwrap_err()
        .violations(),
        &[Violation::CardNotOwned]
    );

    state.turn.turn_number += 1;
    assert!(validate(&state, P1, &knight).is_ok());
}

#[test]
fn empty_deck_cannot_be_bought_from() {
    let (mut state, _) = main_state(41);
    stack_deck(&mut state, Vec::new());
    give(&mut state, P1, COST_DEVELOPMENT);
    assert_eq!(
        validate(&state, P1, &GameAction::BuyDevelopmentCard)
            .unwrap_err()
            .violations(),
        &[Violation::DeckEmpty]
    );
}

#[test]
fn year_of_plenty_draws_two_and_blocks_other_cards() {
    let (mut state, mut rng) = main_state(42);
    give_card(&mut state, P1, DevelopmentCard::YearOfPlenty);
    give_card(&mut state, P1, DevelopmentCard::Monopoly);

    let played = step(
        &state,
        &mut rng,
        P1,
        GameAction::PlayYearOfPlenty {
            first: Resource::Grain,
            second: Resource::Grain,
        },
    );
    let names: Vec<&str> = played.events.iter().map(|e| e.event.name()).collect();
    assert_eq!(names, vec!["developmentCardPlayed", "yearOfPlentyTaken"]);
    let state = played.state;
    assert_eq!(
        state.player(P1).unwrap().resources,
        ResourceBundle::single(Resource::Grain, 2)
    );
    assert_eq!(
        validate(&state, P1, &GameAction::PlayMonopoly {
            resource: Resource::Ore
        })
        .unwrap_err()
        .violations(),
        &[Violation::CardAlreadyPlayedThisTurn]
    );
}

#[test]
fn year_of_plenty_needs_both_cards_in_the_bank() {
    let (mut state, _) = main_state(43);
    give_card(&mut state, P1, DevelopmentCard::YearOfPlenty);
    give(&mut state, P2, ResourceBundle::single(Resource::Grain, 18));
    let action = GameAction::PlayYearOfPlenty {
        first: Resource::Grain,
        second: Resource::Grain,
    };
    assert_eq!(
        validate(&state, P1, &action).unwrap_err().violations(),
        &[Violation::BankInsufficient]
    );
    let mixed = GameAction::PlayYearOfPlenty {
        first: Resource::Grain,
        second: Resource::Ore,
    };
    assert!(validate(&state, P1, &mixed).is_ok());
}

#[test]
fn monopoly_collects_from_every_opponent() {
    let (mut state, mut rng) = main_state(44);
    give_card(&mut state, P1, DevelopmentCard::Monopoly);
    give(&mut state, P1, ResourceBundle::single(Resource::Wool, 1));
    give(&mut state, P2, ResourceBundle::new(1, 0, 0, 0, 2));
    give(&mut state, P4, ResourceBundle::single(Resource::Wool, 1));

    let played = step(
        &state,
        &mut rng,
        P1,
        GameAction::PlayMonopoly {
            resource: Resource::Wool,
        },
    );
    assert_eq!(
        played.events[1].event,
        DomainEvent::MonopolyCollected {
            player: P1,
            resource: Resource::Wool,
            collected: vec![(P2, 2), (P4, 1)],
        }
    );
    let state = played.state;
    assert_eq!(state.player(P1).unwrap().resources.get(Resource::Wool), 4);
    assert_eq!(
        state.player(P2).unwrap().resources,
        ResourceBundle::single(Resource::Brick, 1)
    );
    assert!(state.player(P4).unwrap().resources.is_empty());
}

#[test]
fn road_building_places_two_free_roads() {
    let (mut state, mut rng) = main_state(45);
    give_card(&mut state, P1, DevelopmentCard::RoadBuilding);
    give(&mut state, P1, COST_DEVELOPMENT);
    let node = state.board.node_ids().nth(20).unwrap();
    put_settlement(&mut state, P1, node);

    let state = step(&state, &mut rng, P1, GameAction::PlayRoadBuilding).state;
    assert_eq!(state.turn.free_roads, 2);
    assert_eq!(
        validate(&state, P1, &GameAction::BuyDevelopmentCard)
            .unwrap_err()
            .violations(),
        &[Violation::FreeRoadsPending]
    );

    let first = state.board.node_edges(node)[0];
    let placed = step(
        &state,
        &mut rng,
        P1,
        GameAction::PlaceRoadBuildingRoad { edge: first },
    );
    assert_eq!(
        placed.events[0].event,
        DomainEvent::RoadBuilt {
            player: P1,
            edge: first,
            resources_spent: ResourceBundle::zero(),
            was_free: true,
        }
    );
    let state = placed.state;
    assert_eq!(state.turn.free_roads, 1);

    let second = state.board.node_edges(node)[1];
    let state = step(
        &state,
        &mut rng,
        P1,
        GameAction::PlaceRoadBuildingRoad { edge: second },
    )
    .state;
    assert_eq!(state.turn.free_roads, 0);
    assert_eq!(state.player(P1).unwrap().roads.len(), 2);
    assert_eq!(state.player(P1).unwrap().resources, COST_DEVELOPMENT);
    assert_eq!(
        validate(
            &state,
            P1,
            &GameAction::PlaceRoadBuildingRoad {
                edge: state.board.node_edges(node)[0]
            }
        )
        .unwrap_err()
        .violations()[0],
        Violation::NoFreeRoads
    );
    assert!(validate(&state, P1, &GameAction::BuyDevelopmentCard).is_ok());
}

#[test]
fn victory_point_card_can_win_immediately() {
    let (mut state, mut rng) = main_state(46);
    state.config.vps_to_win = 3;
    stack_deck(&mut state, vec![DevelopmentCard::VictoryPoint]);
    let first = state.board.node_ids().next().unwrap();
    let far = state
        .board
        .node_ids()
        .find(|n| *n != first && !state.board.neighbors(first).contains(n))
        .unwrap();
    put_settlement(&mut state, P1, first);
    put_settlement(&mut state, P1, far);
    give(&mut state, P1, COST_DEVELOPMENT);

    assert_eq!(state.public_victory_points(P1), 2);
    let bought = step(&state, &mut rng, P1, GameAction::BuyDevelopmentCard);
    assert_eq!(
        bought.events.last().map(|e| &e.event),
        Some(&DomainEvent::PlayerWon {
            player: P1,
            points: 3
        })
    );
    assert_eq!(bought.state.public_victory_points(P1), 2);
}

#[test]
fn building_rules_in_main_phase() {
    let (mut state, mut rng) = main_state(47);
    let home = state.board.node_ids().nth(30).unwrap();
    put_settlement(&mut state, P1, home);
    let edge = state.board.node_edges(home)[0];
    put_road(&mut state, P1, edge);
    let next = edge_nodes(&state, edge)
        .into_iter()
        .find(|n| *n != home)
        .unwrap();
    give(&mut state, P1, COST_SETTLEMENT);

    let adjacent = GameAction::BuildSettlement {
        node: next,
        is_free: false,
    };
    assert_eq!(
        validate(&state, P1, &adjacent).unwrap_err().violations(),
        &[Violation::IllegalPlacement(PlacementRule::DistanceRule)]
    );
    let free = GameAction::BuildSettlement {
        node: next,
        is_free: true,
    };
    assert!(validate(&state, P1, &free)
        .unwrap_err()
        .contains(&Violation::FreeBuildUnavailable));

    let loose = state
        .board
        .node_ids()
        .find(|n| {
            *n != home
                && state.board.neighbors(*n).iter().all(|m| *m != home)
                && state.board.node_edges(*n).iter().all(|e| *e != edge)
        })
        .unwrap();
    assert_eq!(
        validate(
            &state,
            P1,
            &GameAction::BuildSettlement {
                node: loose,
                is_free: false
            }
        )
        .unwrap_err()
        .violations(),
        &[Violation::IllegalPlacement(PlacementRule::NotConnected)]
    );

    give(&mut state, P1, COST_CITY);
    let city = step(&state, &mut rng, P1, GameAction::BuildCity { node: home });
    let state = city.state;
    assert_eq!(
        state.building_at(home).map(|b| b.kind),
        Some(BuildingKind::City)
    );
    assert_eq!(state.victory_points(P1), 2);
    assert_eq!(state.player(P1).unwrap().resources, COST_SETTLEMENT);
    assert_eq!(
        validate(&state, P1, &GameAction::BuildCity { node: home })
            .unwrap_err()
            .violations(),
        &[
            Violation::IllegalPlacement(PlacementRule::NoSettlementToUpgrade),
            Violation::InsufficientResources
        ]
    );
}
