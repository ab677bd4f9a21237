//! The reducer: validated action in, new state and ordered events out.
//!
//! Each derived event is applied to a working copy as soon as it is produced, and follow-up
//! events (awards, victory) are derived from that updated copy.

use tracing::{debug, error, info};

use crate::game::action::GameAction;
use crate::game::apply::apply_domain_event;
use crate::game::awards::{largest_army_update, longest_road_update};
use crate::game::event::{DomainEvent, Placement, SequencedEvent};
use crate::game::players::PlayerId;
use crate::game::resources::{COST_CITY, COST_ROAD, COST_SETTLEMENT, ResourceBundle};
use crate::game::state::{GameState, Phase, TradeId, TradeOffer, TradeStatus};
use crate::game::validate::{Rejection, validate};
use crate::rng::GameRng;
use crate::types::{DevelopmentCard, PieceKind, Resource};

/// Hands above this size must discard half on a 7.
pub const HAND_LIMIT: u32 = 7;

#[derive(Debug, Clone)]
pub struct Reduction {
    pub state: GameState,
    pub events: Vec<SequencedEvent>,
}

/// Validates, then reduces. `state` is untouched on rejection.
pub fn process(
    state: &GameState,
    actor: PlayerId,
    action: &GameAction,
    rng: &mut GameRng,
) -> Result<Reduction, Rejection> {
    if let Err(rejection) = validate(state, actor, action) {
        debug!(
            %actor,
            action = %action.kind(),
            violations = ?rejection.violations(),
            "action rejected"
        );
        return Err(rejection);
    }
    Ok(reduce(state, actor, action, rng))
}

/// Applies an action the validator accepted. Never fails; a broken precondition is a bug
/// and panics in debug builds.
pub fn reduce(
    state: &GameState,
    actor: PlayerId,
    action: &GameAction,
    rng: &mut GameRng,
) -> Reduction {
    let mut reducer = Reducer {
        state: state.clone(),
        events: Vec::new(),
        actor,
    };
    reducer.run(action, rng);
    reducer.check_winner();
    debug!(
        %actor,
        action = %action.kind(),
        events = reducer.events.len(),
        next_index = reducer.state.event_index,
        "action applied"
    );
    Reduction {
        state: reducer.state,
        events: reducer.events,
    }
}

struct Reducer {
    state: GameState,
    events: Vec<SequencedEvent>,
    actor: PlayerId,
}

impl Reducer {
    fn emit(&mut self, event: DomainEvent) {
        if let Err(err) = apply_domain_event(&mut self.state, &event) {
            breach(&format!("{} event did not apply: {err}", event.name()));
        }
        let index = self.state.event_index;
        self.state.event_index += 1;
        self.events.push(SequencedEvent { index, event });
    }

    fn run(&mut self, action: &GameAction, rng: &mut GameRng) {
        let actor = self.actor;
        let in_setup = self.state.turn.phase == Phase::Setup;
        match action {
            GameAction::RollDice => self.roll(rng),
            GameAction::BuildRoad { edge, .. } if in_setup => {
                self.emit(DomainEvent::SetupPiecePlaced {
                    player: actor,
                    piece: PieceKind::Road,
                    location: Placement::Edge(*edge),
                });
                self.update_longest_road();
                self.advance_setup();
            }
            GameAction::BuildRoad { edge, .. } => {
                self.emit(DomainEvent::RoadBuilt {
                    player: actor,
                    edge: *edge,
                    resources_spent: COST_ROAD,
                    was_free: false,
                });
                self.update_longest_road();
            }
            GameAction::PlaceRoadBuildingRoad { edge } => {
                self.emit(DomainEvent::RoadBuilt {
                    player: actor,
                    edge: *edge,
                    resources_spent: ResourceBundle::zero(),
                    was_free: true,
                });
                self.update_longest_road();
            }
            GameAction::BuildSettlement { node, .. } if in_setup => {
                let second_round = self.state.turn.setup.as_ref().is_some_and(|s| s.round == 1);
                self.emit(DomainEvent::SetupPiecePlaced {
                    player: actor,
                    piece: PieceKind::Settlement,
                    location: Placement::Node(*node),
                });
                if second_round {
                    let mut grant = ResourceBundle::zero();
                    for resource in self.state.board.node_resources(*node) {
                        grant.add_resource(resource, 1);
                    }
                    let grant = clamp_to(grant, self.state.bank.resources());
                    if !grant.is_empty() {
                        self.emit(DomainEvent::StartingResourcesGranted {
                            player: actor,
                            resources: grant,
                        });
                    }
                }
            }
            GameAction::BuildSettlement { node, .. } => {
                self.emit(DomainEvent::SettlementBuilt {
                    player: actor,
                    node: *node,
                    resources_spent: COST_SETTLEMENT,
                    was_free: false,
                });
                self.update_longest_road();
            }
            GameAction::BuildCity { node } => {
                self.emit(DomainEvent::CityBuilt {
                    player: actor,
                    node: *node,
                    resources_spent: COST_CITY,
                    was_free: false,
                });
            }
            GameAction::BuyDevelopmentCard => {
                let Some(kind) = self.state.bank.next_development_card() else {
                    breach("development card bought from an empty deck");
                    return;
                };
                self.emit(DomainEvent::DevelopmentCardBought {
                    player: actor,
                    kind,
                });
            }
            GameAction::PlayKnight {
                move_robber_to,
                steal_from,
            } => {
                self.emit(DomainEvent::DevelopmentCardPlayed {
                    player: actor,
                    kind: DevelopmentCard::Knight,
                });
                self.emit(DomainEvent::RobberMoved {
                    player: actor,
                    hex: *move_robber_to,
                });
                if let Some(victim) = steal_from {
                    self.steal(*victim, rng);
                }
                if let Some(event) = largest_army_update(&self.state) {
                    info!(?event, "largest army changed");
                    self.emit(event);
                }
            }
            GameAction::PlayRoadBuilding => {
                self.emit(DomainEvent::DevelopmentCardPlayed {
                    player: actor,
                    kind: DevelopmentCard::RoadBuilding,
                });
            }
            GameAction::PlayYearOfPlenty { first, second } => {
                self.emit(DomainEvent::DevelopmentCardPlayed {
                    player: actor,
                    kind: DevelopmentCard::YearOfPlenty,
                });
                let mut resources = ResourceBundle::single(*first, 1);
                resources.add_resource(*second, 1);
                self.emit(DomainEvent::YearOfPlentyTaken {
                    player: actor,
                    resources,
                });
            }
            GameAction::PlayMonopoly { resource } => {
                self.emit(DomainEvent::DevelopmentCardPlayed {
                    player: actor,
                    kind: DevelopmentCard::Monopoly,
                });
                let collected = self
                    .state
                    .players
                    .iter()
                    .filter(|player| player.id != actor)
                    .map(|player| (player.id, player.resources.get(*resource)))
                    .filter(|(_, amount)| *amount > 0)
                    .collect();
                self.emit(DomainEvent::MonopolyCollected {
                    player: actor,
                    resource: *resource,
                    collected,
                });
            }
            GameAction::MoveRobber { hex } => {
                self.emit(DomainEvent::RobberMoved {
                    player: actor,
                    hex: *hex,
                });
            }
            GameAction::StealResource { target } => self.steal(*target, rng),
            GameAction::DiscardResources { bundle } => {
                self.emit(DomainEvent::ResourcesDiscarded {
                    player: actor,
                    resources: *bundle,
                });
            }
            GameAction::ProposeTrade {
                offering,
                requesting,
                targets,
            } => {
                let offer = TradeOffer {
                    id: TradeId(self.state.next_trade_id),
                    proposer: actor,
                    offering: *offering,
                    requesting: *requesting,
                    targets: targets.clone(),
                    status: TradeStatus::Open,
                };
                self.emit(DomainEvent::TradeProposed { offer });
            }
            GameAction::AcceptTrade { trade_id } => {
                self.emit(DomainEvent::TradeAccepted {
                    trade_id: *trade_id,
                    accepter: actor,
                });
            }
            GameAction::RejectTrade { trade_id } => {
                self.emit(DomainEvent::TradeRejected {
                    trade_id: *trade_id,
                    rejecter: actor,
                });
            }
            GameAction::CancelTrade { trade_id } => {
                self.emit(DomainEvent::TradeCancelled {
                    trade_id: *trade_id,
                });
            }
            GameAction::MaritimeTrade {
                giving,
                giving_amount,
                receiving,
            } => {
                self.emit(DomainEvent::MaritimeTradeExecuted {
                    player: actor,
                    giving: *giving,
                    giving_amount: *giving_amount,
                    receiving: *receiving,
                });
            }
            GameAction::EndTurn => self.end_turn(),
        }
    }

    fn roll(&mut self, rng: &mut GameRng) {
        let die1 = rng.roll_die();
        let die2 = rng.roll_die();
        self.emit(DomainEvent::DiceRolled {
            player: self.actor,
            die1,
            die2,
        });
        let roll = die1 + die2;
        if roll == 7 {
            let requirements: Vec<(PlayerId, u8)> = self
                .state
                .players
                .iter()
                .filter(|player| player.resources.total() > HAND_LIMIT)
                .map(|player| (player.id, (player.resources.total() / 2) as u8))
                .collect();
            if !requirements.is_empty() {
                self.emit(DomainEvent::MustDiscard { requirements });
            }
            return;
        }

        let demand = self.production_demand(roll);
        let production: Vec<(PlayerId, ResourceBundle)> =
            share_production(&demand, self.state.bank.resources())
                .into_iter()
                .filter(|(_, bundle)| !bundle.is_empty())
                .collect();
        if !production.is_empty() {
            self.emit(DomainEvent::ResourcesProduced { roll, production });
        }
    }

    /// What each seat would collect on `roll` with an unlimited bank.
    fn production_demand(&self, roll: u8) -> Vec<(PlayerId, ResourceBundle)> {
        let state = &self.state;
        let mut demand: Vec<(PlayerId, ResourceBundle)> = state
            .player_ids()
            .map(|id| (id, ResourceBundle::zero()))
            .collect();
        for hex in state.board.hexes_for_roll(roll) {
            if hex.id == state.robber {
                continue;
            }
            let Some(resource) = hex.terrain else {
                continue;
            };
            for node in hex.nodes {
                let Some(building) = state.building_at(node) else {
                    continue;
                };
                if let Some(seat) = state.seat_of(building.owner) {
                    demand[seat]
                        .1
                        .add_resource(resource, building.yield_multiplier());
                }
            }
        }
        demand
    }

    fn steal(&mut self, victim: PlayerId, rng: &mut GameRng) {
        let cards: Vec<Resource> = self
            .state
            .player(victim)
            .map(|player| player.resources.cards().collect())
            .unwrap_or_default();
        if cards.is_empty() {
            breach("steal from a player without cards");
            return;
        }
        let resource = cards[rng.index(cards.len())];
        self.emit(DomainEvent::ResourceStolen {
            thief: self.actor,
            victim,
            resource,
        });
    }

    fn update_longest_road(&mut self) {
        if let Some(event) = longest_road_update(&self.state) {
            info!(?event, "longest road changed");
            self.emit(event);
        }
    }

    fn advance_setup(&mut self) {
        let Some(progress) = self.state.turn.setup.clone() else {
            return;
        };
        let seats = self.state.players.len() as u8;
        let next = match (progress.round, progress.forward) {
            (0, true) if progress.player_index + 1 < seats => {
                Some((0, progress.player_index + 1, true))
            }
            (0, true) => Some((1, seats.saturating_sub(1), false)),
            (_, false) if progress.player_index > 0 => Some((1, progress.player_index - 1, false)),
            _ => None,
        };

        match next {
            Some((round, index, forward)) => {
                let Some(next_player) = self.state.players.get(index as usize).map(|p| p.id)
                else {
                    breach("setup cursor ran past the last seat");
                    return;
                };
                self.emit(DomainEvent::SetupTurnAdvanced {
                    next_player,
                    setup_round: round,
                    setup_player_index: index,
                    setup_forward: forward,
                });
            }
            None => {
                self.emit(DomainEvent::SetupPhaseEnded);
                let first = self.state.turn.active;
                info!(game_id = %self.state.config.game_id, "setup complete");
                self.emit(DomainEvent::TurnStarted {
                    player: first,
                    turn_number: 1,
                });
            }
        }
    }

    fn end_turn(&mut self) {
        let actor = self.actor;
        let stale: Vec<TradeId> = self
            .state
            .open_trades()
            .filter(|offer| offer.proposer == actor)
            .map(|offer| offer.id)
            .collect();
        for trade_id in stale {
            self.emit(DomainEvent::TradeCancelled { trade_id });
        }
        self.emit(DomainEvent::TurnEnded { player: actor });
        let next = self.state.next_player(actor);
        let turn_number = self.state.turn.turn_number + 1;
        self.emit(DomainEvent::TurnStarted {
            player: next,
            turn_number,
        });
    }

    fn check_winner(&mut self) {
        if self.state.is_over() {
            return;
        }
        let active = self.state.turn.active;
        let points = self.state.victory_points(active);
        if points >= self.state.config.vps_to_win {
            info!(game_id = %self.state.config.game_id, winner = %active, points, "game won");
            self.emit(DomainEvent::PlayerWon {
                player: active,
                points,
            });
        }
    }
}

fn breach(message: &str) {
    if cfg!(debug_assertions) {
        panic!("reducer contract breach: {message}");
    }
    error!(message, "reducer contract breach");
}

fn clamp_to(wanted: ResourceBundle, available: &ResourceBundle) -> ResourceBundle {
    let mut granted = wanted;
    for (resource, amount) in wanted.iter() {
        granted.set(resource, amount.min(available.get(resource)));
    }
    granted
}

/// Splits a roll's demand against a limited bank. Where a resource runs short each seat gets
/// `floor(wanted * supply / demand)`; leftover cards go one at a time in seat order.
pub fn share_production(
    demand: &[(PlayerId, ResourceBundle)],
    supply: &ResourceBundle,
) -> Vec<(PlayerId, ResourceBundle)> {
    let mut granted: Vec<(PlayerId, ResourceBundle)> = demand
        .iter()
        .map(|(id, _)| (*id, ResourceBundle::zero()))
        .collect();
    for resource in Resource::ALL {
        let total: u32 = demand
            .iter()
            .map(|(_, wanted)| u32::from(wanted.get(resource)))
            .sum();
        let available = u32::from(supply.get(resource));
        if total <= available {
            for (slot, (_, wanted)) in granted.iter_mut().zip(demand) {
                slot.1.set(resource, wanted.get(resource));
            }
            continue;
        }

        let mut handed = 0;
        for (slot, (_, wanted)) in granted.iter_mut().zip(demand) {
            let share = u32::from(wanted.get(resource)) * available / total;
            slot.1.set(resource, share as u8);
            handed += share;
        }
        let mut leftover = available - handed;
        while leftover > 0 {
            let mut progressed = false;
            for (slot, (_, wanted)) in granted.iter_mut().zip(demand) {
                if leftover == 0 {
                    break;
                }
                if slot.1.get(resource) < wanted.get(resource) {
                    slot.1.add_resource(resource, 1);
                    leftover -= 1;
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }
    }
    granted
}
