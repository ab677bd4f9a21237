//! Event application.
//!
//! [`apply_event`] folds one authoritative event onto a state without re-validating it. The
//! reducer derives new state through the same code path, so replaying a reduction's events
//! always lands on the state it returned.

use crate::board::{EdgeId, NodeId};
use crate::game::event::{DomainEvent, Placement, SequencedEvent};
use crate::game::players::{HeldCard, Player, PlayerId};
use crate::game::resources::{COST_DEVELOPMENT, ResourceBundle, ResourceError};
use crate::game::state::{
    Building, BuildingKind, GameState, Phase, SetupProgress, TradeId, TradeStatus,
};
use crate::types::{DevelopmentCard, PieceKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("expected event #{expected}, got #{found}")]
    OutOfSequence { expected: u64, found: u64 },
    #[error("event names unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("event names unknown trade {0}")]
    UnknownTrade(TradeId),
    #[error("resource underflow: {0}")]
    ResourceUnderflow(#[from] ResourceError),
    #[error("development deck is empty")]
    DeckEmpty,
    #[error("{player} holds no playable {card}")]
    CardNotHeld {
        player: PlayerId,
        card: DevelopmentCard,
    },
    #[error("setup placement does not match piece kind {0}")]
    MismatchedPlacement(PieceKind),
}

/// Applies one event. The event must carry the state's next index.
pub fn apply_event(state: &GameState, event: &SequencedEvent) -> Result<GameState, ReplayError> {
    apply_events(state, std::iter::once(event))
}

/// Folds an ordered run of events onto `state`.
pub fn apply_events<'a>(
    state: &GameState,
    events: impl IntoIterator<Item = &'a SequencedEvent>,
) -> Result<GameState, ReplayError> {
    let mut next = state.clone();
    for sequenced in events {
        if sequenced.index != next.event_index {
            return Err(ReplayError::OutOfSequence {
                expected: next.event_index,
                found: sequenced.index,
            });
        }
        apply_domain_event(&mut next, &sequenced.event)?;
        next.event_index += 1;
    }
    Ok(next)
}

/// Mutates a working copy. Callers own the copy and the event index.
pub(crate) fn apply_domain_event(
    state: &mut GameState,
    event: &DomainEvent,
) -> Result<(), ReplayError> {
    match event {
        DomainEvent::DiceRolled { die1, die2, .. } => {
            state.turn.last_roll = Some((*die1, *die2));
            state.turn.phase = if die1 + die2 == 7 {
                Phase::MovingRobber
            } else {
                Phase::Main
            };
        }
        DomainEvent::TurnStarted {
            player,
            turn_number,
        } => {
            seated(state, *player)?;
            let turn = &mut state.turn;
            turn.active = *player;
            turn.turn_number = *turn_number;
            turn.phase = Phase::PreRoll;
            turn.last_roll = None;
            turn.pending_discards.clear();
            turn.free_roads = 0;
            turn.dev_card_played = false;
            turn.knight_played = false;
        }
        DomainEvent::TurnEnded { .. } => {
            state.turn.free_roads = 0;
        }
        DomainEvent::RoadBuilt {
            player,
            edge,
            resources_spent,
            was_free,
        } => {
            pay_bank(state, *player, resources_spent)?;
            place_road(state, *player, *edge)?;
            if *was_free {
                state.turn.free_roads = state.turn.free_roads.saturating_sub(1);
            }
        }
        DomainEvent::SettlementBuilt {
            player,
            node,
            resources_spent,
            ..
        } => {
            pay_bank(state, *player, resources_spent)?;
            place_settlement(state, *player, *node)?;
        }
        DomainEvent::CityBuilt {
            player,
            node,
            resources_spent,
            ..
        } => {
            pay_bank(state, *player, resources_spent)?;
            place_city(state, *player, *node)?;
        }
        DomainEvent::ResourcesProduced { production, .. } => {
            for (player, bundle) in production {
                draw_bank(state, *player, bundle)?;
            }
        }
        DomainEvent::RobberMoved { player, hex } => {
            state.robber = *hex;
            state.turn.phase = if state.robber_victims(*hex, *player).is_empty() {
                state.resume_phase()
            } else {
                Phase::Stealing
            };
        }
        DomainEvent::ResourceStolen {
            thief,
            victim,
            resource,
        } => {
            transfer(state, *victim, *thief, &ResourceBundle::single(*resource, 1))?;
            state.turn.phase = state.resume_phase();
        }
        DomainEvent::DevelopmentCardBought { player, kind } => {
            pay_bank(state, *player, &COST_DEVELOPMENT)?;
            state
                .bank
                .draw_development_card()
                .ok_or(ReplayError::DeckEmpty)?;
            let bought_turn = state.turn.turn_number;
            player_mut(state, *player)?.dev_cards.push_back(HeldCard {
                kind: *kind,
                bought_turn,
            });
        }
        DomainEvent::DevelopmentCardPlayed { player, kind } => {
            let turn_number = state.turn.turn_number;
            let holder = player_mut(state, *player)?;
            if !holder.take_playable_card(*kind, turn_number) {
                return Err(ReplayError::CardNotHeld {
                    player: *player,
                    card: *kind,
                });
            }
            match kind {
                DevelopmentCard::Knight => {
                    holder.knights_played += 1;
                    state.turn.knight_played = true;
                }
                DevelopmentCard::RoadBuilding => {
                    let roads_left = holder.pieces_left(PieceKind::Road);
                    state.turn.free_roads = roads_left.min(2) as u8;
                    state.turn.dev_card_played = true;
                }
                _ => state.turn.dev_card_played = true,
            }
        }
        DomainEvent::YearOfPlentyTaken { player, resources }
        | DomainEvent::StartingResourcesGranted { player, resources } => {
            draw_bank(state, *player, resources)?;
        }
        DomainEvent::MonopolyCollected {
            player,
            resource,
            collected,
        } => {
            for (victim, amount) in collected {
                transfer(state, *victim, *player, &ResourceBundle::single(*resource, *amount))?;
            }
        }
        DomainEvent::MaritimeTradeExecuted {
            player,
            giving,
            giving_amount,
            receiving,
        } => {
            pay_bank(state, *player, &ResourceBundle::single(*giving, *giving_amount))?;
            draw_bank(state, *player, &ResourceBundle::single(*receiving, 1))?;
        }
        DomainEvent::ResourcesDiscarded { player, resources } => {
            pay_bank(state, *player, resources)?;
            state.turn.pending_discards.remove(player);
            if state.turn.pending_discards.is_empty() {
                state.turn.phase = Phase::MovingRobber;
            }
        }
        DomainEvent::TradeProposed { offer } => {
            seated(state, offer.proposer)?;
            state.next_trade_id = state.next_trade_id.max(offer.id.0 + 1);
            state.trades.insert(offer.id, offer.clone());
        }
        DomainEvent::TradeAccepted { trade_id, accepter } => {
            let offer = state
                .trades
                .get(trade_id)
                .cloned()
                .ok_or(ReplayError::UnknownTrade(*trade_id))?;
            transfer(state, offer.proposer, *accepter, &offer.offering)?;
            transfer(state, *accepter, offer.proposer, &offer.requesting)?;
            set_trade_status(state, *trade_id, TradeStatus::Accepted)?;
        }
        DomainEvent::TradeRejected { trade_id, .. } => {
            set_trade_status(state, *trade_id, TradeStatus::Rejected)?;
        }
        DomainEvent::TradeCancelled { trade_id } => {
            set_trade_status(state, *trade_id, TradeStatus::Cancelled)?;
        }
        DomainEvent::PlayerWon { player, .. } => {
            seated(state, *player)?;
            state.winner.get_or_insert(*player);
            state.turn.phase = Phase::Ended;
        }
        DomainEvent::LongestRoadAwarded { new_holder, length } => {
            seated(state, *new_holder)?;
            state.awards.longest_road = Some((*new_holder, *length));
        }
        DomainEvent::LargestArmyAwarded {
            new_holder,
            knights,
        } => {
            seated(state, *new_holder)?;
            state.awards.largest_army = Some((*new_holder, *knights));
        }
        DomainEvent::SetupPiecePlaced {
            player,
            piece,
            location,
        } => match (piece, location) {
            (PieceKind::Settlement, Placement::Node(node)) => {
                place_settlement(state, *player, *node)?;
                if let Some(setup) = state.turn.setup.as_mut() {
                    setup.needs_road = true;
                    setup.last_settlement = Some(*node);
                }
            }
            (PieceKind::Road, Placement::Edge(edge)) => {
                place_road(state, *player, *edge)?;
                if let Some(setup) = state.turn.setup.as_mut() {
                    setup.needs_road = false;
                }
            }
            _ => return Err(ReplayError::MismatchedPlacement(*piece)),
        },
        DomainEvent::SetupTurnAdvanced {
            next_player,
            setup_round,
            setup_player_index,
            setup_forward,
        } => {
            seated(state, *next_player)?;
            state.turn.active = *next_player;
            state.turn.setup = Some(SetupProgress {
                round: *setup_round,
                player_index: *setup_player_index,
                forward: *setup_forward,
                ..SetupProgress::start()
            });
        }
        DomainEvent::SetupPhaseEnded => {
            state.turn.setup = None;
            state.turn.turn_number = 1;
            state.turn.phase = Phase::PreRoll;
            if let Some(first) = state.players.front() {
                state.turn.active = first.id;
            }
        }
        DomainEvent::MustDiscard { requirements } => {
            for (player, _) in requirements {
                seated(state, *player)?;
            }
            state.turn.pending_discards = requirements.iter().copied().collect();
            if !state.turn.pending_discards.is_empty() {
                state.turn.phase = Phase::Discarding;
            }
        }
    }
    Ok(())
}

fn seated(state: &GameState, id: PlayerId) -> Result<(), ReplayError> {
    state
        .player(id)
        .map(|_| ())
        .ok_or(ReplayError::UnknownPlayer(id))
}

fn player_mut(state: &mut GameState, id: PlayerId) -> Result<&mut Player, ReplayError> {
    state.player_mut(id).ok_or(ReplayError::UnknownPlayer(id))
}

fn pay_bank(state: &mut GameState, id: PlayerId, bundle: &ResourceBundle) -> Result<(), ReplayError> {
    let player = player_mut(state, id)?;
    player.resources = player.resources.checked_sub(bundle)?;
    state.bank.receive(bundle);
    Ok(())
}

fn draw_bank(state: &mut GameState, id: PlayerId, bundle: &ResourceBundle) -> Result<(), ReplayError> {
    seated(state, id)?;
    state.bank.dispense(bundle)?;
    player_mut(state, id)?.resources += *bundle;
    Ok(())
}

fn transfer(
    state: &mut GameState,
    from: PlayerId,
    to: PlayerId,
    bundle: &ResourceBundle,
) -> Result<(), ReplayError> {
    seated(state, to)?;
    let giver = player_mut(state, from)?;
    giver.resources = giver.resources.checked_sub(bundle)?;
    player_mut(state, to)?.resources += *bundle;
    Ok(())
}

fn place_road(state: &mut GameState, id: PlayerId, edge: EdgeId) -> Result<(), ReplayError> {
    player_mut(state, id)?.roads.insert(edge);
    state.buildings.roads.insert(edge, id);
    Ok(())
}

fn place_settlement(state: &mut GameState, id: PlayerId, node: NodeId) -> Result<(), ReplayError> {
    player_mut(state, id)?.settlements.insert(node);
    state.buildings.nodes.insert(
        node,
        Building {
            owner: id,
            kind: BuildingKind::Settlement,
        },
    );
    Ok(())
}

fn place_city(state: &mut GameState, id: PlayerId, node: NodeId) -> Result<(), ReplayError> {
    let player = player_mut(state, id)?;
    player.settlements.remove(&node);
    player.cities.insert(node);
    state.buildings.nodes.insert(
        node,
        Building {
            owner: id,
            kind: BuildingKind::City,
        },
    );
    Ok(())
}

fn set_trade_status(
    state: &mut GameState,
    trade_id: TradeId,
    status: TradeStatus,
) -> Result<(), ReplayError> {
    let offer = state
        .trades
        .get_mut(&trade_id)
        .ok_or(ReplayError::UnknownTrade(trade_id))?;
    offer.status = status;
    Ok(())
}
