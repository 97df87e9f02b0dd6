//! 3D rotation and reflection utilities.
//!
//! A cube has 24 proper rotations (the rotation group of a cube): one of the
//! 6 axis directions is chosen to receive the original +Z axis, then there are
//! 4 quarter turns around it. Composing each rotation with a mirror gives the
//! 24 improper transforms, 48 in all.
//!
//! Each closure is named by where the input components end up, e.g. index 1
//! sends `(x, y, z)` to `(-y, x, z)`.

use crate::coord::Coord;

/// Number of proper rotations of a cube.
pub const NUM_ROTATIONS: usize = 24;

/// All 24 rotation functions for a cube.
///
/// Organized as 6 axis choices for the original +Z axis x 4 quarter turns:
/// - Rotations 0-3: +Z stays up
/// - Rotations 4-7: -Z up
/// - Rotations 8-11: +Y up
/// - Rotations 12-15: -Y up
/// - Rotations 16-19: +X up
/// - Rotations 20-23: -X up
///
/// The bounding-box tables in [`box_rotations`] refer to these indices.
pub const ROTATIONS: [fn(Coord) -> Coord; NUM_ROTATIONS] = [
    // +Z up, rotate around Z axis
    |c| Coord::new(c.x, c.y, c.z), // identity
    |c| Coord::new(-c.y, c.x, c.z),
    |c| Coord::new(-c.x, -c.y, c.z),
    |c| Coord::new(c.y, -c.x, c.z),
    // -Z up
    |c| Coord::new(-c.x, c.y, -c.z),
    |c| Coord::new(-c.y, -c.x, -c.z),
    |c| Coord::new(c.x, -c.y, -c.z),
    |c| Coord::new(c.y, c.x, -c.z),
    // +Y up
    |c| Coord::new(c.x, -c.z, c.y),
    |c| Coord::new(c.z, c.x, c.y),
    |c| Coord::new(-c.x, c.z, c.y),
    |c| Coord::new(-c.z, -c.x, c.y),
    // -Y up
    |c| Coord::new(c.x, c.z, -c.y),
    |c| Coord::new(-c.z, c.x, -c.y),
    |c| Coord::new(-c.x, -c.z, -c.y),
    |c| Coord::new(c.z, -c.x, -c.y),
    // +X up
    |c| Coord::new(-c.z, c.y, c.x),
    |c| Coord::new(-c.y, -c.z, c.x),
    |c| Coord::new(c.z, -c.y, c.x),
    |c| Coord::new(c.y, c.z, c.x),
    // -X up
    |c| Coord::new(c.z, c.y, -c.x),
    |c| Coord::new(-c.y, c.z, -c.x),
    |c| Coord::new(-c.z, -c.y, -c.x),
    |c| Coord::new(c.y, -c.z, -c.x),
];

/// Identity and the three half turns: symmetries of every centered box.
const HALF_TURNS: [u8; 4] = [0, 2, 4, 6];
/// Quarter turns around Z, valid when the X and Y extents match.
const QUARTER_TURNS_XY: [u8; 4] = [1, 3, 5, 7];
/// Quarter turns around Y, valid when the X and Z extents match.
const QUARTER_TURNS_XZ: [u8; 4] = [16, 18, 20, 22];
/// Quarter turns around X, valid when the Y and Z extents match.
const QUARTER_TURNS_YZ: [u8; 4] = [8, 10, 12, 14];
/// Diagonal turns, valid only for a cube.
const CUBE_DIAGONALS: [u8; 8] = [9, 11, 13, 15, 17, 19, 21, 23];

/// A reflection plane, applied to a coordinate before rotating it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mirror {
    /// Negate Z.
    Z,
    /// Negate X. Used for figures flat in Z, where a Z mirror is a no-op on
    /// positions.
    X,
}

impl Mirror {
    /// Chooses the mirror basis for a figure with the given extents.
    pub fn for_extents(maxes: Coord) -> Self {
        if maxes.z > 0 {
            Mirror::Z
        } else {
            Mirror::X
        }
    }

    #[inline]
    fn apply(self, c: Coord) -> Coord {
        match self {
            Mirror::Z => Coord::new(c.x, c.y, -c.z),
            Mirror::X => Coord::new(-c.x, c.y, c.z),
        }
    }
}

/// One of the 48 rotations and reflections of a cube.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Transform {
    rotation: u8,
    mirror: Option<Mirror>,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        rotation: 0,
        mirror: None,
    };

    /// A proper rotation by index into [`ROTATIONS`].
    pub const fn rotation(index: u8) -> Self {
        Self {
            rotation: index,
            mirror: None,
        }
    }

    /// The rotation at `index` preceded by `mirror`.
    pub const fn mirrored(index: u8, mirror: Mirror) -> Self {
        Self {
            rotation: index,
            mirror: Some(mirror),
        }
    }

    /// True for the improper (reflecting) transforms, which turn each of
    /// the two chiral pieces into the other.
    #[inline]
    pub fn is_mirror(self) -> bool {
        self.mirror.is_some()
    }

    #[inline]
    pub fn apply(self, coord: Coord) -> Coord {
        let coord = match self.mirror {
            Some(mirror) => mirror.apply(coord),
            None => coord,
        };
        ROTATIONS[self.rotation as usize](coord)
    }
}

/// Rotations that map a centered box with the given extents onto itself.
///
/// Always contains the identity (first) and the three half turns; quarter
/// turns are added for each pair of equal extents and the diagonal turns
/// when all three extents are equal, giving all 24 for a cube.
pub fn box_rotations(maxes: Coord) -> Vec<u8> {
    let mut rotations = HALF_TURNS.to_vec();

    if maxes.x == maxes.y {
        rotations.extend_from_slice(&QUARTER_TURNS_XY);
    }
    if maxes.x == maxes.z {
        rotations.extend_from_slice(&QUARTER_TURNS_XZ);
    }
    if maxes.y == maxes.z {
        rotations.extend_from_slice(&QUARTER_TURNS_YZ);
    }
    if maxes.x == maxes.y && maxes.y == maxes.z {
        rotations.extend_from_slice(&CUBE_DIAGONALS);
    }

    rotations
}

/// Generates the rotation-distinct orientations of a piece.
///
/// `offsets` are the piece's cubes relative to its center cube (the center
/// itself excluded). Each of the 24 rotations is applied, the full cube set
/// (center included) is normalized to the origin and sorted so that
/// orientations differing only by translation compare equal, and only the
/// first rotation producing each distinct shape is kept.
///
/// Returns the rotated offsets of each kept orientation, still relative to
/// the center cube. Symmetric pieces produce fewer than 24.
pub fn unique_orientations(offsets: &[Coord]) -> Vec<Vec<Coord>> {
    let mut seen: Vec<Vec<Coord>> = Vec::new();
    let mut orientations = Vec::new();

    for rotate in &ROTATIONS {
        let rotated: Vec<Coord> = offsets.iter().map(|&offset| rotate(offset)).collect();

        let mut shape: Vec<Coord> = rotated.clone();
        shape.push(Coord::ORIGIN);
        Coord::normalize(&mut shape);
        shape.sort();

        if !seen.contains(&shape) {
            seen.push(shape);
            orientations.push(rotated);
        }
    }

    orientations
}
