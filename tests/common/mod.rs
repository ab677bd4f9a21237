#![allow(dead_code)]

use hexbound_rules::board::{EdgeId, LayoutMode, NodeId, PlayerMode};
use hexbound_rules::game::players::HeldCard;
use hexbound_rules::game::state::{Building, BuildingKind, Phase};
use hexbound_rules::game::{
    GameAction, GameConfig, GameState, PlayerId, Reduction, ResourceBundle, SeatedPlayer,
    legal_actions, process,
};
use hexbound_rules::rng::GameRng;
use hexbound_rules::types::{Color, DevelopmentCard};
use uuid::Uuid;

pub const P1: PlayerId = PlayerId(1);
pub const P2: PlayerId = PlayerId(2);
pub const P3: PlayerId = PlayerId(3);
pub const P4: PlayerId = PlayerId(4);

pub fn config(mode: PlayerMode) -> GameConfig {
    GameConfig {
        game_id: Uuid::nil(),
        player_mode: mode,
        layout: LayoutMode::Beginner,
        vps_to_win: 10,
    }
}

/// Players `P1..=Pn` in seat order.
pub fn seats(count: u32) -> Vec<SeatedPlayer> {
    (1..=count)
        .map(|id| {
            SeatedPlayer::new(
                PlayerId(id),
                format!("player-{id}"),
                Color::ORDERED[(id - 1) as usize],
            )
        })
        .collect()
}

/// Fresh four-seat beginner game, still in setup.
pub fn setup_state(seed: u64) -> (GameState, GameRng) {
    let mut rng = GameRng::new(seed);
    let state = GameState::new(config(PlayerMode::Standard), seats(4), &mut rng).unwrap();
    (state, rng)
}

/// A four-seat board with no pieces, P1 to act in `main` on turn 1 after a non-7 roll.
pub fn main_state(seed: u64) -> (GameState, GameRng) {
    let (mut state, rng) = setup_state(seed);
    state.turn.setup = None;
    state.turn.phase = Phase::Main;
    state.turn.turn_number = 1;
    state.turn.last_roll = Some((2, 3));
    (state, rng)
}

pub fn step(
    state: &GameState,
    rng: &mut GameRng,
    actor: PlayerId,
    action: GameAction,
) -> Reduction {
    match process(state, actor, &action, rng) {
        Ok(reduction) => reduction,
        Err(rejection) => panic!("{actor} {action:?}: {rejection}"),
    }
}

/// Plays the whole setup phase taking the first legal placement each time.
pub fn finish_setup(mut state: GameState, rng: &mut GameRng) -> GameState {
    while state.turn.phase == Phase::Setup {
        let actor = state.turn.active;
        let action = legal_actions(&state, actor)
            .into_iter()
            .next()
            .expect("setup always has a legal placement");
        state = step(&state, rng, actor, action).state;
    }
    state
}

/// Moves cards from the bank to `player`.
pub fn give(state: &mut GameState, player: PlayerId, bundle: ResourceBundle) {
    state.bank.dispense(&bundle).unwrap();
    state.player_mut(player).unwrap().resources += bundle;
}

pub fn put_settlement(state: &mut GameState, player: PlayerId, node: NodeId) {
    state.player_mut(player).unwrap().settlements.insert(node);
    state.buildings.nodes.insert(
        node,
        Building {
            owner: player,
            kind: BuildingKind::Settlement,
        },
    );
}

pub fn put_road(state: &mut GameState, player: PlayerId, edge: EdgeId) {
    state.player_mut(player).unwrap().roads.insert(edge);
    state.buildings.roads.insert(edge, player);
}

/// Hands `player` a card bought on an earlier turn.
pub fn give_card(state: &mut GameState, player: PlayerId, kind: DevelopmentCard) {
    state
        .player_mut(player)
        .unwrap()
        .dev_cards
        .push_back(HeldCard {
            kind,
            bought_turn: 0,
        });
}

/// A generator whose next two dice satisfy `want`.
pub fn rng_rolling(want: impl Fn(u8) -> bool) -> GameRng {
    (0..10_000)
        .map(GameRng::new)
        .find(|rng| {
            let mut probe = rng.clone();
            want(probe.roll_die() + probe.roll_die())
        })
        .expect("some seed rolls the wanted total")
}

/// Both endpoints of `edge`.
pub fn edge_nodes(state: &GameState, edge: EdgeId) -> [NodeId; 2] {
    state.board.edge(edge).unwrap().nodes
}
