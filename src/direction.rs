//! Discrete arrow orientations used as classification labels
//!
//! Angles are measured counter-clockwise (as displayed) from an arrow pointing
//! up in the pixel buffer. An up-pointing sprite rotated by 90° therefore
//! points left, which is why `90°` is bound to [`Direction::West`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of discrete orientations
pub const NUM_DIRECTIONS: usize = 8;

/// Canonical rotation angles in degrees, evenly spaced over the full circle
pub const ANGLES: [u16; NUM_DIRECTIONS] = [0, 45, 90, 135, 180, 225, 270, 315];

/// Compass direction bound to one canonical angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    NorthWest,
    West,
    SouthWest,
    South,
    SouthEast,
    East,
    NorthEast,
}

impl Direction {
    /// All directions in canonical angle order
    pub const ALL: [Direction; NUM_DIRECTIONS] = [
        Direction::North,
        Direction::NorthWest,
        Direction::West,
        Direction::SouthWest,
        Direction::South,
        Direction::SouthEast,
        Direction::East,
        Direction::NorthEast,
    ];

    /// Rotation angle in degrees
    #[must_use]
    pub fn angle(self) -> u16 {
        match self {
            Direction::North => 0,
            Direction::NorthWest => 45,
            Direction::West => 90,
            Direction::SouthWest => 135,
            Direction::South => 180,
            Direction::SouthEast => 225,
            Direction::East => 270,
            Direction::NorthEast => 315,
        }
    }

    /// Exact lookup of the direction for a canonical angle
    ///
    /// Returns `None` for anything that is not one of [`ANGLES`].
    #[must_use]
    pub fn from_angle(angle: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.angle() == angle)
    }

    /// Lowercase label name as written to the manifest
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::NorthWest => "north_west",
            Direction::West => "west",
            Direction::SouthWest => "south_west",
            Direction::South => "south",
            Direction::SouthEast => "south_east",
            Direction::East => "east",
            Direction::NorthEast => "north_east",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.name() == s)
            .ok_or_else(|| format!("unknown direction '{}'", s))
    }
}
