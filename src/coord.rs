//! Integer 3D points.
//!
//! Figures are stored in "doubled" coordinates: after translating a set of
//! positions so the minimum corner is at the origin, every value becomes
//! `2 * original - max`. Spans of odd and even length then both center on
//! the origin with integral values, and orthogonal neighbors are always
//! 2 apart:
//!
//! ```text
//! 0,1        -> -1,1
//! 0,1,2      -> -2,0,2
//! 0,1,2,3    -> -3,-1,1,3
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

/// A 3D coordinate.
///
/// Ordering is the canonical geometric order used for signatures and for
/// writing figures: Z high-to-low, then Y high-to-low, then X low-to-high.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord::new(0, 0, 0);

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Scales every component, e.g. to turn a unit offset into a doubled one.
    #[inline]
    pub const fn scale(self, factor: i32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Halves every component (exact for the even values produced by
    /// normalizing doubled coordinates).
    #[inline]
    pub const fn halve(self) -> Self {
        Self::new(self.x >> 1, self.y >> 1, self.z >> 1)
    }

    /// Number of axes with a non-zero extent, when `self` is a set of maxima.
    pub fn dimensions(self) -> usize {
        [self.x, self.y, self.z].iter().filter(|&&v| v > 0).count()
    }

    /// Translates coordinates so the minimum x, y, z values are all zero.
    ///
    /// Returns the maximum coordinate after translation (the extents), or
    /// `None`, leaving `coords` unchanged, if an extent overflows `i32`.
    pub fn normalize(coords: &mut [Coord]) -> Option<Coord> {
        let Some(first) = coords.first().copied() else {
            return Some(Coord::ORIGIN);
        };
        let (min, max) = coords.iter().fold((first, first), |(min, max), c| {
            (
                Coord::new(min.x.min(c.x), min.y.min(c.y), min.z.min(c.z)),
                Coord::new(max.x.max(c.x), max.y.max(c.y), max.z.max(c.z)),
            )
        });

        let extents = Coord::new(
            max.x.checked_sub(min.x)?,
            max.y.checked_sub(min.y)?,
            max.z.checked_sub(min.z)?,
        );
        for coord in coords.iter_mut() {
            *coord = *coord - min;
        }

        Some(extents)
    }

    /// Centers normalized coordinates (range `0..=maxes`) on the origin
    /// using the doubled convention.
    pub fn center(coords: &mut [Coord], maxes: Coord) {
        for coord in coords.iter_mut() {
            *coord = coord.scale(2) - maxes;
        }
    }
}

impl Add for Coord {
    type Output = Coord;

    #[inline]
    fn add(self, other: Coord) -> Coord {
        Coord::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Coord {
    type Output = Coord;

    #[inline]
    fn sub(self, other: Coord) -> Coord {
        Coord::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .z
            .cmp(&self.z)
            .then_with(|| other.y.cmp(&self.y))
            .then_with(|| self.x.cmp(&other.x))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}
