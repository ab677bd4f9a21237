use once_cell::sync::Lazy;

use super::{PlayerMode, PortKind};
use crate::types::Resource;

/// Fixed per-mode ingredients of a board: shape, tile and token pools, port placement and the
/// hand-built beginner arrangement.
#[derive(Debug, Clone)]
pub struct MapTemplate {
    pub row_lengths: Vec<usize>,
    /// `None` is a desert.
    pub tile_resources: Vec<Option<Resource>>,
    pub numbers: Vec<u8>,
    pub port_kinds: Vec<PortKind>,
    /// Positions in the clockwise coast ring that carry a port.
    pub port_slots: Vec<usize>,
    pub beginner_tiles: Vec<Option<Resource>>,
    pub beginner_numbers: Vec<u8>,
    pub beginner_ports: Vec<PortKind>,
}

impl MapTemplate {
    pub fn for_mode(mode: PlayerMode) -> &'static MapTemplate {
        match mode {
            PlayerMode::Standard => &STANDARD_TEMPLATE,
            PlayerMode::Extended => &EXTENDED_TEMPLATE,
        }
    }
}

fn repeat(resource: Option<Resource>, count: usize) -> impl Iterator<Item = Option<Resource>> {
    std::iter::repeat(resource).take(count)
}

fn slots_from_gaps(gaps: &[usize]) -> Vec<usize> {
    gaps.iter()
        .scan(0, |position, gap| {
            let slot = *position;
            *position += gap;
            Some(slot)
        })
        .collect()
}

fn parse_tiles(codes: &str) -> Vec<Option<Resource>> {
    codes
        .split_whitespace()
        .map(|code| match code {
            "B" => Some(Resource::Brick),
            "L" => Some(Resource::Lumber),
            "O" => Some(Resource::Ore),
            "G" => Some(Resource::Grain),
            "W" => Some(Resource::Wool),
            _ => None,
        })
        .collect()
}

const G: PortKind = PortKind::Generic;
const BRICK: PortKind = PortKind::Specific(Resource::Brick);
const LUMBER: PortKind = PortKind::Specific(Resource::Lumber);
const ORE: PortKind = PortKind::Specific(Resource::Ore);
const GRAIN: PortKind = PortKind::Specific(Resource::Grain);
const WOOL: PortKind = PortKind::Specific(Resource::Wool);

static STANDARD_TEMPLATE: Lazy<MapTemplate> = Lazy::new(|| MapTemplate {
    row_lengths: vec![3, 4, 5, 4, 3],
    tile_resources: repeat(Some(Resource::Lumber), 4)
        .chain(repeat(Some(Resource::Brick), 3))
        .chain(repeat(Some(Resource::Wool), 4))
        .chain(repeat(Some(Resource::Grain), 4))
        .chain(repeat(Some(Resource::Ore), 3))
        .chain(repeat(None, 1))
        .collect(),
    numbers: vec![2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12],
    port_kinds: vec![G, G, G, G, BRICK, LUMBER, ORE, GRAIN, WOOL],
    port_slots: slots_from_gaps(&[3, 3, 4, 3, 3, 4, 3, 3, 4]),
    beginner_tiles: parse_tiles(
        "O W L \
         G B W B \
         G L - L O \
         L O G W \
         B G W",
    ),
    beginner_numbers: vec![10, 2, 9, 12, 6, 4, 10, 9, 11, 3, 8, 8, 3, 4, 5, 5, 6, 11],
    beginner_ports: vec![G, WOOL, G, ORE, GRAIN, G, LUMBER, BRICK, G],
});

static EXTENDED_TEMPLATE: Lazy<MapTemplate> = Lazy::new(|| MapTemplate {
    row_lengths: vec![3, 4, 5, 6, 5, 4, 3],
    tile_resources: repeat(Some(Resource::Brick), 5)
        .chain(repeat(Some(Resource::Lumber), 6))
        .chain(repeat(Some(Resource::Ore), 5))
        .chain(repeat(Some(Resource::Grain), 6))
        .chain(repeat(Some(Resource::Wool), 6))
        .chain(repeat(None, 2))
        .collect(),
    numbers: [2, 2]
        .into_iter()
        .chain([3, 4, 5, 6, 8, 9, 10, 11].into_iter().flat_map(|n| [n; 3]))
        .chain([12, 12])
        .collect(),
    port_kinds: vec![G, G, G, G, G, BRICK, LUMBER, ORE, GRAIN, WOOL, WOOL],
    port_slots: slots_from_gaps(&[4, 3, 4, 3, 4, 3, 4, 3, 4, 3, 3]),
    beginner_tiles: parse_tiles(
        "O W G \
         L B O W \
         B - W L G \
         G O L G O L \
         - B O B G \
         G W B W \
         L W L",
    ),
    beginner_numbers: vec![
        6, 3, 4, 12, 2, 6, 9, 9, 2, 10, 11, 8, 5, 11, 8, 9, 3, 4, 12, 3, 5, 6, 11, 10, 5, 10, 4,
        8,
    ],
    beginner_ports: vec![G, WOOL, G, ORE, GRAIN, G, LUMBER, BRICK, G, WOOL, G],
});
