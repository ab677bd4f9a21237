use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Side of a pointy-top hex, also the direction towards the neighbour across that side.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    East,
    SouthEast,
    SouthWest,
    West,
    NorthWest,
    NorthEast,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::NorthEast,
    ];

    pub const fn index(self) -> usize {
        match self {
            Direction::East => 0,
            Direction::SouthEast => 1,
            Direction::SouthWest => 2,
            Direction::West => 3,
            Direction::NorthWest => 4,
            Direction::NorthEast => 5,
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
            Direction::NorthEast => Direction::SouthWest,
        }
    }

    pub const fn unit_vector(self) -> CubeCoord {
        match self {
            Direction::East => CubeCoord::new(1, -1, 0),
            Direction::SouthEast => CubeCoord::new(0, -1, 1),
            Direction::SouthWest => CubeCoord::new(-1, 0, 1),
            Direction::West => CubeCoord::new(-1, 1, 0),
            Direction::NorthWest => CubeCoord::new(0, 1, -1),
            Direction::NorthEast => CubeCoord::new(1, 0, -1),
        }
    }

    /// The two corners bounding this side, in clockwise order.
    pub const fn corners(self) -> (Corner, Corner) {
        match self {
            Direction::East => (Corner::NorthEast, Corner::SouthEast),
            Direction::SouthEast => (Corner::SouthEast, Corner::South),
            Direction::SouthWest => (Corner::South, Corner::SouthWest),
            Direction::West => (Corner::SouthWest, Corner::NorthWest),
            Direction::NorthWest => (Corner::NorthWest, Corner::North),
            Direction::NorthEast => (Corner::North, Corner::NorthEast),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Corner {
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl Corner {
    pub const ALL: [Corner; 6] = [
        Corner::North,
        Corner::NorthEast,
        Corner::SouthEast,
        Corner::South,
        Corner::SouthWest,
        Corner::NorthWest,
    ];

    pub const fn index(self) -> usize {
        match self {
            Corner::North => 0,
            Corner::NorthEast => 1,
            Corner::SouthEast => 2,
            Corner::South => 3,
            Corner::SouthWest => 4,
            Corner::NorthWest => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CubeCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CubeCoord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        debug_assert!(x + y + z == 0, "cube coordinates must sum to zero");
        Self { x, y, z }
    }

    pub const fn add(self, other: CubeCoord) -> Self {
        CubeCoord::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn step(self, direction: Direction) -> Self {
        self.add(direction.unit_vector())
    }

    pub fn neighbors(self) -> impl Iterator<Item = CubeCoord> {
        Direction::ALL.into_iter().map(move |dir| self.step(dir))
    }
}

impl Default for CubeCoord {
    fn default() -> Self {
        CubeCoord::new(0, 0, 0)
    }
}

/// Lays out hexes row by row, top to bottom and west to east. A longer row starts
/// half a hex further west than the row above it, a shorter one half a hex further east.
pub fn row_layout(row_lengths: &[usize]) -> Vec<CubeCoord> {
    let mut coords = Vec::with_capacity(row_lengths.iter().sum());
    let mut row_start = CubeCoord::default();
    for (row, &length) in row_lengths.iter().enumerate() {
        let mut cursor = row_start;
        for _ in 0..length {
            coords.push(cursor);
            cursor = cursor.step(Direction::East);
        }
        if let Some(&next) = row_lengths.get(row + 1) {
            let shift = if next > length {
                Direction::SouthWest
            } else {
                Direction::SouthEast
            };
            row_start = row_start.step(shift);
        }
    }
    coords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_sides_share_reversed_corners() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let back = dir.opposite().unit_vector();
            assert_eq!(dir.unit_vector().add(back), CubeCoord::default());
        }
    }

    #[test]
    fn row_layout_produces_expected_counts() {
        assert_eq!(row_layout(&[3, 4, 5, 4, 3]).len(), 19);
        assert_eq!(row_layout(&[3, 4, 5, 6, 5, 4, 3]).len(), 30);
    }

    #[test]
    fn rows_are_contiguous() {
        let coords = row_layout(&[3, 4, 5, 4, 3]);
        // every hex after the first touches at least one earlier hex
        for (idx, coord) in coords.iter().enumerate().skip(1) {
            assert!(
                coords[..idx]
                    .iter()
                    .any(|earlier| coord.neighbors().any(|n| n == *earlier))
            );
        }
    }
}
