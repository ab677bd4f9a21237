use std::collections::HashMap;
use std::time::{Duration, Instant};

use clap::Parser;
use hexbound_rules::game::{GameState, SeatedPlayer, legal_actions, pending_actors};
use hexbound_rules::types::ActionKind;
use hexbound_rules::{
    Color, Game, GameAction, GameConfig, GameRng, LayoutMode, PlayerId, PlayerMode,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser, Clone)]
#[command(name = "hexbound-simulate")]
#[command(about = "Self-play driver: random legal moves through the full rules pipeline")]
struct Args {
    /// Seed for the first game; game `i` uses `seed + i`
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 5)]
    games: u32,

    /// Seats at the table (3-6)
    #[arg(long, default_value_t = 4)]
    players: usize,

    /// Board layout: random or beginner
    #[arg(long, default_value_t = LayoutMode::Random)]
    layout: LayoutMode,

    /// Points needed to win
    #[arg(long, default_value_t = 10)]
    vps_to_win: u8,

    /// Give up on a game after this many accepted actions
    #[arg(long, default_value_t = 20_000)]
    max_actions: u32,
}

#[derive(Debug, Default)]
struct Totals {
    games: u32,
    finished: u32,
    wins: HashMap<Color, u32>,
    actions: u64,
    turns: u64,
    duration: Duration,
}

impl Totals {
    fn record(&mut self, state: &GameState, actions: u32, duration: Duration) {
        self.games += 1;
        self.actions += u64::from(actions);
        self.turns += u64::from(state.turn.turn_number);
        self.duration += duration;
        if let Some(player) = state.winner.and_then(|id| state.player(id)) {
            self.finished += 1;
            *self.wins.entry(player.color).or_insert(0) += 1;
        }
    }

    fn average(&self, total: u64) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        total as f64 / f64::from(self.games)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let Some(player_mode) = PlayerMode::for_seat_count(args.players) else {
        eprintln!("Error: {} seats is not a supported table size (3-6)", args.players);
        std::process::exit(1);
    };

    let mut totals = Totals::default();
    for game_idx in 0..args.games {
        let seed = args.seed.wrapping_add(u64::from(game_idx));
        let config = GameConfig {
            game_id: Uuid::from_u64_pair(args.seed, u64::from(game_idx)),
            player_mode,
            layout: args.layout,
            vps_to_win: args.vps_to_win,
        };
        let seats = Color::ORDERED
            .iter()
            .take(args.players)
            .enumerate()
            .map(|(idx, color)| SeatedPlayer::new(PlayerId(idx as u32), format!("bot-{idx}"), *color))
            .collect();
        let mut game = match Game::new(config, seats, seed) {
            Ok(game) => game,
            Err(err) => {
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        };

        let start = Instant::now();
        let actions = play(&mut game, seed, args.max_actions);
        let duration = start.elapsed();
        totals.record(game.state(), actions, duration);

        let state = game.state();
        let winner = state
            .winner
            .and_then(|id| state.player(id))
            .map_or_else(|| "none".to_string(), |p| p.color.to_string());
        info!(
            game = game_idx + 1,
            seed,
            %winner,
            turns = state.turn.turn_number,
            actions,
            events = state.event_index,
            ?duration,
            "game finished"
        );
    }

    print_summary(&totals);
}

/// Drives one game with uniformly random legal choices. Returns the accepted action count.
fn play(game: &mut Game, seed: u64, max_actions: u32) -> u32 {
    // separate stream so the driver's choices never perturb the game's own RNG
    let mut chooser = GameRng::new(seed ^ 0x5eed_cafe);
    let mut accepted = 0;
    while !game.state().is_over() && accepted < max_actions {
        let actors = pending_actors(game.state());
        let Some(actor) = chooser.choose(&actors).copied() else {
            break;
        };
        let options = pick_pool(legal_actions(game.state(), actor), &mut chooser);
        let Some(action) = chooser.choose(&options).cloned() else {
            warn!(%actor, phase = %game.state().phase(), "no legal action, abandoning game");
            break;
        };
        match game.submit(actor, &action) {
            Ok(events) => {
                accepted += 1;
                debug!(%actor, action = %action.kind(), events = events.len(), "step");
            }
            Err(rejection) => {
                warn!(%actor, action = %action.kind(), %rejection, "legal action rejected");
                break;
            }
        }
    }
    if !game.state().is_over() {
        warn!(max_actions, "game stopped without a winner");
    }
    accepted
}

/// Trading keeps a random game going forever, so it is only chosen occasionally.
fn pick_pool(actions: Vec<GameAction>, chooser: &mut GameRng) -> Vec<GameAction> {
    let (trading, other): (Vec<GameAction>, Vec<GameAction>) =
        actions.into_iter().partition(|action| {
            matches!(
                action.kind(),
                ActionKind::ProposeTrade | ActionKind::MaritimeTrade | ActionKind::CancelTrade
            )
        });
    if other.is_empty() || (!trading.is_empty() && chooser.index(10) == 0) {
        trading
    } else {
        other
    }
}

fn print_summary(totals: &Totals) {
    println!("\n{}", "=".repeat(60));
    println!("SIMULATION SUMMARY");
    println!("{}", "=".repeat(60));
    println!("{:<10} {:<8} {:<10}", "Color", "Wins", "Win Rate");
    println!("{}", "-".repeat(30));
    for color in Color::ORDERED {
        let Some(wins) = totals.wins.get(&color) else {
            continue;
        };
        let rate = f64::from(*wins) / f64::from(totals.games.max(1)) * 100.0;
        println!("{:<10} {:<8} {:<9.1}%", color.to_string(), wins, rate);
    }
    println!("\n  Games: {} ({} won)", totals.games, totals.finished);
    println!("  Avg Turns: {:.2}", totals.average(totals.turns));
    println!("  Avg Actions: {:.2}", totals.average(totals.actions));
    if totals.games > 0 {
        println!("  Avg Duration: {:.2?}", totals.duration / totals.games);
    }
}
