//! Legal-move enumeration for drivers and playout tests.
//!
//! Candidates are generated per phase and filtered through [`validate`], so this module can
//! never disagree with the validator about what is allowed.

use std::cmp::Reverse;

use itertools::Itertools;

use crate::game::action::GameAction;
use crate::game::players::PlayerId;
use crate::game::resources::ResourceBundle;
use crate::game::state::{GameState, Phase};
use crate::game::validate::validate;
use crate::types::Resource;

/// Players who may act right now, in seat order.
pub fn pending_actors(state: &GameState) -> Vec<PlayerId> {
    match state.turn.phase {
        Phase::Ended => Vec::new(),
        Phase::Discarding => state
            .player_ids()
            .filter(|id| state.turn.pending_discards.contains_key(id))
            .collect(),
        Phase::Main => state
            .player_ids()
            .filter(|id| {
                *id == state.turn.active || state.open_trades().any(|offer| offer.addresses(*id))
            })
            .collect(),
        _ => vec![state.turn.active],
    }
}

/// Every action `actor` may submit. Discards are represented by a single greedy bundle and
/// trade proposals by one-for-one swaps open to the whole table.
pub fn legal_actions(state: &GameState, actor: PlayerId) -> Vec<GameAction> {
    if state.player(actor).is_none() || state.is_over() {
        return Vec::new();
    }
    candidates(state, actor)
        .into_iter()
        .filter(|action| validate(state, actor, action).is_ok())
        .collect()
}

fn candidates(state: &GameState, actor: PlayerId) -> Vec<GameAction> {
    let board = &state.board;
    let mut out = Vec::new();
    match state.turn.phase {
        Phase::Setup => {
            for node in board.node_ids() {
                out.push(GameAction::BuildSettlement {
                    node,
                    is_free: true,
                });
            }
            for edge in board.edge_ids() {
                out.push(GameAction::BuildRoad {
                    edge,
                    is_free: true,
                });
            }
        }
        Phase::PreRoll => {
            out.push(GameAction::RollDice);
            knights(state, actor, &mut out);
        }
        Phase::Main => {
            out.push(GameAction::EndTurn);
            if state.turn.free_roads > 0 {
                for edge in board.edge_ids() {
                    out.push(GameAction::PlaceRoadBuildingRoad { edge });
                }
                return out;
            }
            for edge in board.edge_ids() {
                out.push(GameAction::BuildRoad {
                    edge,
                    is_free: false,
                });
            }
            for node in board.node_ids() {
                out.push(GameAction::BuildSettlement {
                    node,
                    is_free: false,
                });
                out.push(GameAction::BuildCity { node });
            }
            out.push(GameAction::BuyDevelopmentCard);
            out.push(GameAction::PlayRoadBuilding);
            for (first, second) in Resource::ALL
                .iter()
                .copied()
                .tuple_combinations()
                .chain(Resource::ALL.iter().map(|r| (*r, *r)))
            {
                out.push(GameAction::PlayYearOfPlenty { first, second });
            }
            for resource in Resource::ALL {
                out.push(GameAction::PlayMonopoly { resource });
            }
            knights(state, actor, &mut out);
            trades(state, actor, &mut out);
        }
        Phase::MovingRobber => {
            for hex in board.hexes() {
                out.push(GameAction::MoveRobber { hex: hex.id });
            }
        }
        Phase::Stealing => {
            for target in state.robber_victims(state.robber, actor) {
                out.push(GameAction::StealResource { target });
            }
        }
        Phase::Discarding => {
            if let Some(bundle) = greedy_discard(state, actor) {
                out.push(GameAction::DiscardResources { bundle });
            }
        }
        Phase::Ended => {}
    }
    out
}

fn knights(state: &GameState, actor: PlayerId, out: &mut Vec<GameAction>) {
    for hex in state.board.hexes() {
        let victims = state.robber_victims(hex.id, actor);
        if victims.is_empty() {
            out.push(GameAction::PlayKnight {
                move_robber_to: hex.id,
                steal_from: None,
            });
        }
        for victim in victims {
            out.push(GameAction::PlayKnight {
                move_robber_to: hex.id,
                steal_from: Some(victim),
            });
        }
    }
}

fn trades(state: &GameState, actor: PlayerId, out: &mut Vec<GameAction>) {
    for offer in state.open_trades() {
        out.push(GameAction::AcceptTrade { trade_id: offer.id });
        out.push(GameAction::RejectTrade { trade_id: offer.id });
        out.push(GameAction::CancelTrade { trade_id: offer.id });
    }
    let Some(player) = state.player(actor) else {
        return;
    };
    for (giving, receiving) in Resource::ALL
        .iter()
        .copied()
        .cartesian_product(Resource::ALL)
        .filter(|(giving, receiving)| giving != receiving)
    {
        if player.resources.get(giving) > 0 {
            out.push(GameAction::ProposeTrade {
                offering: ResourceBundle::single(giving, 1),
                requesting: ResourceBundle::single(receiving, 1),
                targets: None,
            });
        }
        if let Some(giving_amount) = state.maritime_ratio(actor, giving) {
            out.push(GameAction::MaritimeTrade {
                giving,
                giving_amount,
                receiving,
            });
        }
    }
}

/// Gives up the owed count one card at a time from the largest pile; ties go to the
/// earlier resource.
pub fn greedy_discard(state: &GameState, actor: PlayerId) -> Option<ResourceBundle> {
    let owed = *state.turn.pending_discards.get(&actor)?;
    let mut remaining = state.player(actor)?.resources;
    let mut bundle = ResourceBundle::zero();
    for _ in 0..owed {
        let resource = Resource::ALL
            .into_iter()
            .filter(|resource| remaining.get(*resource) > 0)
            .min_by_key(|resource| Reverse(remaining.get(*resource)))?;
        remaining.set(resource, remaining.get(resource) - 1);
        bundle.add_resource(resource, 1);
    }
    Some(bundle)
}
