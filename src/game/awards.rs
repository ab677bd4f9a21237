//! Longest Road and Largest Army.
//!
//! Road length is the longest trail through a player's roads: edges may not repeat, nodes
//! may. Buildings of other players do not cut a chain. Both titles change hands only on a
//! strictly greater count and require a minimum to qualify.

use im::OrdSet;

use crate::board::{Board, EdgeId, NodeId};
use crate::game::event::DomainEvent;
use crate::game::players::PlayerId;
use crate::game::state::GameState;

pub const LONGEST_ROAD_MIN: u8 = 5;
pub const LARGEST_ARMY_MIN: u8 = 3;

/// Length of the longest edge-simple path through `roads`.
pub fn longest_road(board: &Board, roads: &OrdSet<EdgeId>) -> u8 {
    let mut used = vec![false; board.edges().len()];
    let starts: OrdSet<NodeId> = roads
        .iter()
        .filter_map(|edge| board.edge(*edge))
        .flat_map(|edge| edge.nodes)
        .collect();
    starts
        .iter()
        .map(|node| extend(board, roads, *node, &mut used))
        .max()
        .unwrap_or(0)
}

fn extend(board: &Board, roads: &OrdSet<EdgeId>, node: NodeId, used: &mut [bool]) -> u8 {
    let mut best = 0;
    for edge_id in board.node_edges(node) {
        if used[edge_id.index()] || !roads.contains(edge_id) {
            continue;
        }
        let Some(edge) = board.edge(*edge_id) else {
            continue;
        };
        used[edge_id.index()] = true;
        let length = 1 + extend(board, roads, edge.other(node), used);
        used[edge_id.index()] = false;
        best = best.max(length);
    }
    best
}

/// Picks the record holder from `(player, count)` pairs in seat order. The current holder
/// keeps the title unless someone strictly exceeds their current count.
fn pick_holder(
    current: Option<(PlayerId, u8)>,
    counts: impl IntoIterator<Item = (PlayerId, u8)>,
    minimum: u8,
) -> Option<(PlayerId, u8)> {
    let counts: Vec<(PlayerId, u8)> = counts.into_iter().collect();
    let mut best = current.map(|(holder, _)| {
        let count = counts
            .iter()
            .find(|(player, _)| *player == holder)
            .map_or(0, |(_, count)| *count);
        (holder, count)
    });
    for (player, count) in counts {
        if count < minimum {
            continue;
        }
        match best {
            Some((_, held)) if count <= held => {}
            _ => best = Some((player, count)),
        }
    }
    best.filter(|(_, count)| *count >= minimum)
}

/// The `longestRoadAwarded` event due after a road or building change, if the record moved.
pub fn longest_road_update(state: &GameState) -> Option<DomainEvent> {
    let counts: Vec<(PlayerId, u8)> = state
        .players
        .iter()
        .map(|player| (player.id, longest_road(&state.board, &player.roads)))
        .collect();
    let current = state.awards.longest_road;
    let next = pick_holder(current, counts, LONGEST_ROAD_MIN);
    match next {
        Some((holder, length)) if next != current => Some(DomainEvent::LongestRoadAwarded {
            new_holder: holder,
            length,
        }),
        _ => None,
    }
}

/// The `largestArmyAwarded` event due after a knight, if the record moved.
pub fn largest_army_update(state: &GameState) -> Option<DomainEvent> {
    let counts = state
        .players
        .iter()
        .map(|player| (player.id, player.knights_played));
    let current = state.awards.largest_army;
    let next = pick_holder(current, counts, LARGEST_ARMY_MIN);
    match next {
        Some((holder, knights)) if next != current => Some(DomainEvent::LargestArmyAwarded {
            new_holder: holder,
            knights,
        }),
        _ => None,
    }
}
