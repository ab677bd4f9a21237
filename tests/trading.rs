mod common;

use common::*;
use hexbound_rules::board::PortKind;
use hexbound_rules::game::event::DomainEvent;
use hexbound_rules::game::state::{Phase, TradeStatus};
use hexbound_rules::game::{
    GameAction, ResourceBundle, TradeId, Violation, pending_actors, validate,
};
use hexbound_rules::types::Resource;

fn brick_for_ore(targets: Option<Vec<hexbound_rules::game::PlayerId>>) -> GameAction {
    GameAction::ProposeTrade {
        offering: ResourceBundle::single(Resource::Brick, 1),
        requesting: ResourceBundle::single(Resource::Ore, 1),
        targets,
    }
}

#[test]
fn open_offer_is_accepted_by_one_player_only() {
    let (mut state, mut rng) = main_state(30);
    give(&mut state, P1, ResourceBundle::single(Resource::Brick, 2));
    give(&mut state, P2, ResourceBundle::single(Resource::Ore, 1));
    give(&mut state, P4, ResourceBundle::single(Resource::Ore, 1));

    let proposed = step(&state, &mut rng, P1, brick_for_ore(None));
    let state = proposed.state;
    let trade_id = TradeId(0);
    assert!(matches!(
        &proposed.events[0].event,
        DomainEvent::TradeProposed { offer } if offer.id == trade_id && offer.is_open()
    ));
    assert_eq!(pending_actors(&state), vec![P1, P2, P3, P4]);

    let accept = GameAction::AcceptTrade { trade_id };
    assert_eq!(
        validate(&state, P3, &accept).unwrap_err().violations(),
        &[Violation::InsufficientResources]
    );
    assert_eq!(
        validate(&state, P1, &accept).unwrap_err().violations(),
        &[Violation::TradeNotTargetingYou]
    );

    let state = step(&state, &mut rng, P2, accept.clone()).state;
    assert_eq!(
        state.player(P1).unwrap().resources,
        ResourceBundle::new(1, 0, 1, 0, 0)
    );
    assert_eq!(
        state.player(P2).unwrap().resources,
        ResourceBundle::single(Resource::Brick, 1)
    );
    assert_eq!(state.trades[&trade_id].status, TradeStatus::Accepted);
    assert_eq!(
        validate(&state, P4, &accept).unwrap_err().violations(),
        &[Violation::TradeNotFound]
    );
    assert_eq!(pending_actors(&state), vec![P1]);
}

#[test]
fn targeted_offer_ignores_other_players() {
    let (mut state, mut rng) = main_state(31);
    give(&mut state, P1, ResourceBundle::single(Resource::Brick, 1));
    give(&mut state, P2, ResourceBundle::single(Resource::Ore, 1));
    let state = step(&state, &mut rng, P1, brick_for_ore(Some(vec![P3]))).state;
    let trade_id = TradeId(0);

    assert_eq!(
        validate(&state, P2, &GameAction::AcceptTrade { trade_id })
            .unwrap_err()
            .violations(),
        &[Violation::TradeNotTargetingYou]
    );
    assert_eq!(pending_actors(&state), vec![P1, P3]);

    let rejected = step(&state, &mut rng, P3, GameAction::RejectTrade { trade_id });
    assert_eq!(
        rejected.events[0].event,
        DomainEvent::TradeRejected {
            trade_id,
            rejecter: P3
        }
    );
    assert_eq!(rejected.state.trades[&trade_id].status, TradeStatus::Rejected);
    assert_eq!(rejected.state.total_resources(), state.total_resources());
}

#[test]
fn malformed_offers_are_rejected() {
    let (mut state, _) = main_state(32);
    give(&mut state, P1, ResourceBundle::single(Resource::Brick, 1));

    let empty = GameAction::ProposeTrade {
        offering: ResourceBundle::zero(),
        requesting: ResourceBundle::single(Resource::Ore, 1),
        targets: None,
    };
    assert_eq!(
        validate(&state, P1, &empty).unwrap_err().violations(),
        &[Violation::InvalidTrade]
    );

    let to_self = brick_for_ore(Some(vec![P1]));
    assert_eq!(
        validate(&state, P1, &to_self).unwrap_err().violations(),
        &[Violation::InvalidTrade]
    );

    let unaffordable = GameAction::ProposeTrade {
        offering: ResourceBundle::single(Resource::Brick, 3),
        requesting: ResourceBundle::single(Resource::Brick, 1),
        targets: None,
    };
    assert_eq!(
        validate(&state, P1, &unaffordable).unwrap_err().violations(),
        &[Violation::InvalidTrade, Violation::InsufficientResources]
    );
}

#[test]
fn ending_the_turn_cancels_open_offers() {
    let (mut state, mut rng) = main_state(33);
    give(&mut state, P1, ResourceBundle::single(Resource::Brick, 1));
    let state = step(&state, &mut rng, P1, brick_for_ore(None)).state;

    let ended = step(&state, &mut rng, P1, GameAction::EndTurn);
    let names: Vec<&str> = ended.events.iter().map(|e| e.event.name()).collect();
    assert_eq!(names, vec!["tradeCancelled", "turnEnded", "turnStarted"]);
    let state = ended.state;
    assert_eq!(state.trades[&TradeId(0)].status, TradeStatus::Cancelled);
    assert_eq!(state.turn.active, P2);
    assert_eq!(state.turn.turn_number, 2);
    assert_eq!(state.turn.phase, Phase::PreRoll);
    assert_eq!(state.open_trades().count(), 0);
}

#[test]
fn only_the_proposer_cancels() {
    let (mut state, mut rng) = main_state(34);
    give(&mut state, P1, ResourceBundle::single(Resource::Brick, 1));
    let state = step(&state, &mut rng, P1, brick_for_ore(None)).state;
    let cancel = GameAction::CancelTrade {
        trade_id: TradeId(0),
    };
    assert_eq!(
        validate(&state, P2, &cancel).unwrap_err().violations(),
        &[Violation::NotYourTurn]
    );
    let cancelled = step(&state, &mut rng, P1, cancel);
    assert_eq!(
        cancelled.state.trades[&TradeId(0)].status,
        TradeStatus::Cancelled
    );
}

#[test]
fn maritime_trade_uses_default_and_port_ratios() {
    let (mut state, mut rng) = main_state(35);
    give(&mut state, P1, ResourceBundle::single(Resource::Wool, 4));

    let three = GameAction::MaritimeTrade {
        giving: Resource::Wool,
        giving_amount: 3,
        receiving: Resource::Ore,
    };
    assert_eq!(
        validate(&state, P1, &three).unwrap_err().violations(),
        &[Violation::PortRatioUnavailable]
    );
    let same = GameAction::MaritimeTrade {
        giving: Resource::Wool,
        giving_amount: 4,
        receiving: Resource::Wool,
    };
    assert!(validate(&state, P1, &same)
        .unwrap_err()
        .contains(&Violation::InvalidTrade));

    let traded = step(
        &state,
        &mut rng,
        P1,
        GameAction::MaritimeTrade {
            giving: Resource::Wool,
            giving_amount: 4,
            receiving: Resource::Ore,
        },
    );
    assert_eq!(
        traded.state.player(P1).unwrap().resources,
        ResourceBundle::single(Resource::Ore, 1)
    );
    assert_eq!(traded.state.total_resources(), state.total_resources());

    let mut state = traded.state;
    let (port_resource, port_node) = state
        .board
        .ports()
        .iter()
        .find_map(|port| match port.kind {
            PortKind::Specific(resource) => Some((resource, port.nodes[0])),
            PortKind::Generic => None,
        })
        .unwrap();
    put_settlement(&mut state, P1, port_node);
    assert_eq!(state.maritime_ratio(P1, port_resource), Some(2));
    give(&mut state, P1, ResourceBundle::single(port_resource, 2));
    let held = state.player(P1).unwrap().resources.get(port_resource);
    let receiving = Resource::ALL
        .into_iter()
        .find(|r| *r != port_resource)
        .unwrap();
    let traded = step(
        &state,
        &mut rng,
        P1,
        GameAction::MaritimeTrade {
            giving: port_resource,
            giving_amount: 2,
            receiving,
        },
    );
    assert_eq!(
        traded.events[0].event,
        DomainEvent::MaritimeTradeExecuted {
            player: P1,
            giving: port_resource,
            giving_amount: 2,
            receiving,
        }
    );
    assert_eq!(
        traded.state.player(P1).unwrap().resources.get(port_resource),
        held - 2
    );
}

#[test]
fn maritime_trade_needs_bank_stock() {
    let (mut state, _) = main_state(36);
    give(&mut state, P1, ResourceBundle::single(Resource::Wool, 4));
    give(&mut state, P2, ResourceBundle::single(Resource::Ore, 19));
    let action = GameAction::MaritimeTrade {
        giving: Resource::Wool,
        giving_amount: 4,
        receiving: Resource::Ore,
    };
    assert_eq!(
        validate(&state, P1, &action).unwrap_err().violations(),
        &[Violation::BankInsufficient]
    );
}

#[test]
fn port_owner_trades_only_at_port_ratio() {
    let (mut state, mut rng) = main_state(35);
    let (port_resource, port_node) = state
        .board
        .ports()
        .iter()
        .find_map(|port| match port.kind {
            PortKind::Specific(resource) => Some((resource, port.nodes[0])),
            PortKind::Generic => None,
        })
        .unwrap();
    put_settlement(&mut state, P1, port_node);
    give(&mut state, P1, ResourceBundle::single(port_resource, 4));
    let receiving = Resource::ALL
        .into_iter()
        .find(|r| *r != port_resource)
        .unwrap();

    let four_for_one = GameAction::MaritimeTrade {
        giving: port_resource,
        giving_amount: 4,
        receiving,
    };
    assert_eq!(
        validate(&state, P1, &four_for_one).unwrap_err().violations(),
        &[Violation::PortRatioUnavailable]
    );

    let held = state.player(P1).unwrap().resources.get(port_resource);
    let traded = step(
        &state,
        &mut rng,
        P1,
        GameAction::MaritimeTrade {
            giving: port_resource,
            giving_amount: 2,
            receiving,
        },
    );
    assert_eq!(
        traded.state.player(P1).unwrap().resources.get(port_resource),
        held - 2
    );
}
