//! Board topology and tile assignment.
//!
//! A [`Board`] is generated once per game and never mutated. Hexes, nodes (corners) and edges
//! (sides) are numbered densely in reading order so every other module refers to them by id
//! and looks adjacency up in fixed tables.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::coords::{CubeCoord, Direction, row_layout};
use crate::rng::GameRng;
use crate::types::Resource;

mod layout;

pub use layout::MapTemplate;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct HexId(pub u8);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u16);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EdgeId(pub u16);

impl HexId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl NodeId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl EdgeId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for HexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hex#{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge#{}", self.0)
    }
}

/// Seat-count mode. Chooses the board size, bank size and development deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerMode {
    /// Three or four seats on 19 hexes.
    #[default]
    Standard,
    /// Five or six seats on 30 hexes.
    Extended,
}

impl PlayerMode {
    pub fn seats(self) -> std::ops::RangeInclusive<usize> {
        match self {
            PlayerMode::Standard => 3..=4,
            PlayerMode::Extended => 5..=6,
        }
    }

    pub fn for_seat_count(count: usize) -> Option<Self> {
        [PlayerMode::Standard, PlayerMode::Extended]
            .into_iter()
            .find(|mode| mode.seats().contains(&count))
    }
}

impl fmt::Display for PlayerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlayerMode::Standard => "STANDARD",
            PlayerMode::Extended => "EXTENDED",
        };
        write!(f, "{label}")
    }
}

impl FromStr for PlayerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" | "3-4" => Ok(PlayerMode::Standard),
            "extended" | "5-6" => Ok(PlayerMode::Extended),
            _ => Err(format!("unknown player mode: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Tiles, number tokens and ports shuffled with the game RNG.
    #[default]
    Random,
    /// Fixed arrangement with no two red numbers (6 and 8) on neighbouring hexes.
    Beginner,
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LayoutMode::Random => "RANDOM",
            LayoutMode::Beginner => "BEGINNER",
        };
        write!(f, "{label}")
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(LayoutMode::Random),
            "beginner" => Ok(LayoutMode::Beginner),
            _ => Err(format!("unknown layout: {s}")),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PortKind {
    /// 3:1 for any resource.
    Generic,
    /// 2:1 for one resource.
    Specific(Resource),
}

impl PortKind {
    pub const fn ratio(self) -> u8 {
        match self {
            PortKind::Generic => 3,
            PortKind::Specific(_) => 2,
        }
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortKind::Generic => write!(f, "3:1"),
            PortKind::Specific(resource) => write!(f, "2:1 {resource}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hex {
    pub id: HexId,
    pub coord: CubeCoord,
    /// `None` is a desert.
    pub terrain: Option<Resource>,
    pub number: Option<u8>,
    /// Indexed by [`crate::coords::Corner::index`].
    pub nodes: [NodeId; 6],
    /// Indexed by [`Direction::index`].
    pub edges: [EdgeId; 6],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub hexes: SmallVec<[HexId; 3]>,
    pub edges: SmallVec<[EdgeId; 3]>,
    pub neighbors: SmallVec<[NodeId; 3]>,
    pub port: Option<PortKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub nodes: [NodeId; 2],
    pub hexes: SmallVec<[HexId; 2]>,
}

impl Edge {
    /// The endpoint that is not `node`.
    pub fn other(&self, node: NodeId) -> NodeId {
        if self.nodes[0] == node {
            self.nodes[1]
        } else {
            self.nodes[0]
        }
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: u8,
    pub kind: PortKind,
    pub edge: EdgeId,
    pub nodes: [NodeId; 2],
}

/// Shape-only adjacency for one player mode, shared by every board of that mode.
#[derive(Debug)]
struct Topology {
    coords: Vec<CubeCoord>,
    hex_nodes: Vec<[NodeId; 6]>,
    hex_edges: Vec<[EdgeId; 6]>,
    edge_nodes: Vec<[NodeId; 2]>,
    node_count: usize,
    coast: Vec<EdgeId>,
}

static STANDARD_TOPOLOGY: Lazy<Topology> =
    Lazy::new(|| Topology::build(&MapTemplate::for_mode(PlayerMode::Standard).row_lengths));
static EXTENDED_TOPOLOGY: Lazy<Topology> =
    Lazy::new(|| Topology::build(&MapTemplate::for_mode(PlayerMode::Extended).row_lengths));

impl Topology {
    fn for_mode(mode: PlayerMode) -> &'static Topology {
        match mode {
            PlayerMode::Standard => &STANDARD_TOPOLOGY,
            PlayerMode::Extended => &EXTENDED_TOPOLOGY,
        }
    }

    fn build(row_lengths: &[usize]) -> Self {
        let coords = row_layout(row_lengths);
        let mut hex_nodes: Vec<[NodeId; 6]> = Vec::with_capacity(coords.len());
        let mut hex_edges: Vec<[EdgeId; 6]> = Vec::with_capacity(coords.len());
        let mut edge_nodes: Vec<[NodeId; 2]> = Vec::new();
        let mut node_autoinc: u16 = 0;

        for (idx, coord) in coords.iter().enumerate() {
            let mut nodes: [Option<NodeId>; 6] = [None; 6];
            let mut edges: [Option<EdgeId>; 6] = [None; 6];

            // borrow shared corners and sides from neighbours numbered earlier
            for direction in Direction::ALL {
                let neighbor_coord = coord.step(direction);
                let Some(earlier) = coords[..idx].iter().position(|c| *c == neighbor_coord) else {
                    continue;
                };
                let back = direction.opposite();
                let (a, b) = direction.corners();
                let (back_a, back_b) = back.corners();
                nodes[a.index()] = Some(hex_nodes[earlier][back_b.index()]);
                nodes[b.index()] = Some(hex_nodes[earlier][back_a.index()]);
                edges[direction.index()] = Some(hex_edges[earlier][back.index()]);
            }

            let nodes: [NodeId; 6] = nodes.map(|slot| {
                slot.unwrap_or_else(|| {
                    let id = NodeId(node_autoinc);
                    node_autoinc += 1;
                    id
                })
            });

            let mut finalized_edges = [EdgeId(0); 6];
            for direction in Direction::ALL {
                finalized_edges[direction.index()] = match edges[direction.index()] {
                    Some(id) => id,
                    None => {
                        let (a, b) = direction.corners();
                        let id = EdgeId(edge_nodes.len() as u16);
                        edge_nodes.push([nodes[a.index()], nodes[b.index()]]);
                        id
                    }
                };
            }

            hex_nodes.push(nodes);
            hex_edges.push(finalized_edges);
        }

        let coast = coast_ring(&hex_edges, &edge_nodes);
        Self {
            coords,
            hex_nodes,
            hex_edges,
            edge_nodes,
            node_count: node_autoinc as usize,
            coast,
        }
    }
}

/// Coastal edges (sides of exactly one hex) in clockwise order, starting with the
/// north-west side of the first hex.
fn coast_ring(hex_edges: &[[EdgeId; 6]], edge_nodes: &[[NodeId; 2]]) -> Vec<EdgeId> {
    let mut side_counts = vec![0u8; edge_nodes.len()];
    for edges in hex_edges {
        for edge in edges {
            side_counts[edge.index()] += 1;
        }
    }
    let coastal: Vec<EdgeId> = (0..edge_nodes.len())
        .filter(|&idx| side_counts[idx] == 1)
        .map(|idx| EdgeId(idx as u16))
        .collect();

    let Some(first) = hex_edges.first() else {
        return Vec::new();
    };
    let start = first[Direction::NorthWest.index()];
    let mut ring = vec![start];
    let mut current = start;
    // the north-west side runs from the NW corner to the N corner
    let mut node = edge_nodes[start.index()][1];

    while let Some(&next) = coastal
        .iter()
        .find(|&&e| e != current && edge_nodes[e.index()].contains(&node))
    {
        if next == start {
            break;
        }
        ring.push(next);
        let [a, b] = edge_nodes[next.index()];
        node = if a == node { b } else { a };
        current = next;
    }
    ring
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    player_mode: PlayerMode,
    layout: LayoutMode,
    hexes: Vec<Hex>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    ports: Vec<Port>,
    coast: Vec<EdgeId>,
}

impl Board {
    /// Builds a board for `mode`. Random layouts shuffle tiles, then number tokens, then port
    /// kinds, in that order, so the same RNG position always yields the same board.
    pub fn generate(mode: PlayerMode, layout: LayoutMode, rng: &mut GameRng) -> Self {
        let template = MapTemplate::for_mode(mode);
        let (tiles, numbers, port_kinds) = match layout {
            LayoutMode::Random => {
                let mut tiles = template.tile_resources.clone();
                let mut numbers = template.numbers.clone();
                let mut port_kinds = template.port_kinds.clone();
                rng.shuffle(&mut tiles);
                rng.shuffle(&mut numbers);
                rng.shuffle(&mut port_kinds);
                (tiles, numbers, port_kinds)
            }
            LayoutMode::Beginner => (
                template.beginner_tiles.clone(),
                template.beginner_numbers.clone(),
                template.beginner_ports.clone(),
            ),
        };
        Self::from_parts(mode, layout, &tiles, &numbers, &port_kinds)
    }

    /// Assembles a board from explicit tile, number and port sequences. Numbers are consumed
    /// in hex order, skipping deserts.
    pub fn from_parts(
        mode: PlayerMode,
        layout: LayoutMode,
        tiles: &[Option<Resource>],
        numbers: &[u8],
        port_kinds: &[PortKind],
    ) -> Self {
        let topology = Topology::for_mode(mode);
        let template = MapTemplate::for_mode(mode);

        let mut numbers = numbers.iter().copied();
        let hexes: Vec<Hex> = topology
            .coords
            .iter()
            .enumerate()
            .map(|(idx, coord)| {
                let terrain = tiles.get(idx).copied().flatten();
                let number = terrain.and_then(|_| numbers.next());
                Hex {
                    id: HexId(idx as u8),
                    coord: *coord,
                    terrain,
                    number,
                    nodes: topology.hex_nodes[idx],
                    edges: topology.hex_edges[idx],
                }
            })
            .collect();

        let mut nodes: Vec<Node> = (0..topology.node_count)
            .map(|idx| Node {
                id: NodeId(idx as u16),
                hexes: SmallVec::new(),
                edges: SmallVec::new(),
                neighbors: SmallVec::new(),
                port: None,
            })
            .collect();
        let mut edges: Vec<Edge> = topology
            .edge_nodes
            .iter()
            .enumerate()
            .map(|(idx, pair)| Edge {
                id: EdgeId(idx as u16),
                nodes: *pair,
                hexes: SmallVec::new(),
            })
            .collect();

        for hex in &hexes {
            for node in hex.nodes {
                nodes[node.index()].hexes.push(hex.id);
            }
            for edge in hex.edges {
                edges[edge.index()].hexes.push(hex.id);
            }
        }
        for edge in &edges {
            let [a, b] = edge.nodes;
            nodes[a.index()].edges.push(edge.id);
            nodes[a.index()].neighbors.push(b);
            nodes[b.index()].edges.push(edge.id);
            nodes[b.index()].neighbors.push(a);
        }

        let ports: Vec<Port> = template
            .port_slots
            .iter()
            .zip(port_kinds)
            .enumerate()
            .filter_map(|(idx, (slot, kind))| {
                let edge = *topology.coast.get(*slot)?;
                Some(Port {
                    id: idx as u8,
                    kind: *kind,
                    edge,
                    nodes: topology.edge_nodes[edge.index()],
                })
            })
            .collect();
        for port in &ports {
            for node in port.nodes {
                nodes[node.index()].port = Some(port.kind);
            }
        }

        Self {
            player_mode: mode,
            layout,
            hexes,
            nodes,
            edges,
            ports,
            coast: topology.coast.clone(),
        }
    }

    pub fn hexes(&self) -> &[Hex] {
        &self.hexes
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Coastal edges in clockwise ring order.
    pub fn coast(&self) -> &[EdgeId] {
        &self.coast
    }

    pub fn hex(&self, id: HexId) -> Option<&Hex> {
        self.hexes.get(id.index())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|node| node.id)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.iter().map(|edge| edge.id)
    }

    /// First desert hex, where the robber starts.
    pub fn desert(&self) -> Option<HexId> {
        self.hexes
            .iter()
            .find(|hex| hex.terrain.is_none())
            .map(|hex| hex.id)
    }

    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map(|n| n.neighbors.as_slice()).unwrap_or(&[])
    }

    pub fn node_edges(&self, node: NodeId) -> &[EdgeId] {
        self.node(node).map(|n| n.edges.as_slice()).unwrap_or(&[])
    }

    pub fn node_hexes(&self, node: NodeId) -> &[HexId] {
        self.node(node).map(|n| n.hexes.as_slice()).unwrap_or(&[])
    }

    pub fn hex_nodes(&self, hex: HexId) -> &[NodeId] {
        self.hex(hex).map(|h| h.nodes.as_slice()).unwrap_or(&[])
    }

    /// Hexes producing on `roll`.
    pub fn hexes_for_roll(&self, roll: u8) -> impl Iterator<Item = &Hex> + '_ {
        self.hexes.iter().filter(move |hex| hex.number == Some(roll))
    }

    /// Resources produced by the hexes around `node`, one entry per hex.
    pub fn node_resources(&self, node: NodeId) -> impl Iterator<Item = Resource> + '_ {
        self.node_hexes(node)
            .iter()
            .filter_map(|hex| self.hex(*hex).and_then(|h| h.terrain))
    }

    pub fn port_kind(&self, node: NodeId) -> Option<PortKind> {
        self.node(node).and_then(|n| n.port)
    }

    /// Best bank ratio for `resource` granted by a port at one of `nodes`, or 4.
    pub fn port_ratio(&self, nodes: impl IntoIterator<Item = NodeId>, resource: Resource) -> u8 {
        nodes
            .into_iter()
            .filter_map(|node| self.port_kind(node))
            .filter(|kind| match kind {
                PortKind::Generic => true,
                PortKind::Specific(r) => *r == resource,
            })
            .map(PortKind::ratio)
            .min()
            .unwrap_or(4)
    }
}
