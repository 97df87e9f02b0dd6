//! Soma piece definitions and the per-piece placement state machine.
//!
//! Each piece is defined by the offsets of its cubes from a distinguished
//! center cube. Orientations rotate those offsets around the center, and a
//! placement seats the center on one cubicle of the figure.

use std::fmt;

use crate::coord::Coord;
use crate::geometry::unique_orientations;
use crate::shape::Shape;

/// Number of pieces in the Soma set.
pub const NUM_PIECES: usize = 7;

/// Maximum number of cubes in any single piece.
pub const MAX_PIECE_SIZE: usize = 4;

/// Occupant code of an empty cubicle.
pub const EMPTY: u8 = 0;

/// Character used for an empty cubicle when writing figures.
pub const EMPTY_NAME: char = '#';

/// Cube offsets from each piece's center cube, in occupant code order.
const OFFSETS: [&[Coord]; NUM_PIECES] = [
    // c: tripod
    &[Coord::new(1, 0, 0), Coord::new(0, 1, 0), Coord::new(0, 0, 1)],
    // p
    &[Coord::new(1, 0, 0), Coord::new(1, 1, 0), Coord::new(0, 0, 1)],
    // n
    &[Coord::new(-1, 0, 0), Coord::new(-1, 1, 0), Coord::new(0, 0, 1)],
    // z
    &[Coord::new(1, 1, 0), Coord::new(0, 1, 0), Coord::new(-1, 0, 0)],
    // t
    &[Coord::new(1, 0, 0), Coord::new(0, 1, 0), Coord::new(-1, 0, 0)],
    // l
    &[Coord::new(1, 1, 0), Coord::new(1, 0, 0), Coord::new(-1, 0, 0)],
    // 3
    &[Coord::new(1, 0, 0), Coord::new(0, 1, 0)],
];

/// The seven Soma pieces.
///
/// `Pos` and `Neg` are mirror images of each other (the chiral pair).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    /// Tripod corner (4 cubes).
    Corner,
    /// Right-handed screw (4 cubes).
    Pos,
    /// Left-handed screw (4 cubes).
    Neg,
    /// S-shaped piece (4 cubes).
    Zee,
    /// T-shaped piece (4 cubes).
    Tee,
    /// L-shaped piece (4 cubes).
    Ell,
    /// Small L piece (3 cubes).
    Three,
}

impl PieceKind {
    /// All pieces, in occupant code order.
    pub const ALL: [PieceKind; NUM_PIECES] = [
        PieceKind::Corner,
        PieceKind::Pos,
        PieceKind::Neg,
        PieceKind::Zee,
        PieceKind::Tee,
        PieceKind::Ell,
        PieceKind::Three,
    ];

    /// Occupant code, 1 through 7.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1..=7 => Some(Self::ALL[code as usize - 1]),
            _ => None,
        }
    }

    /// User-visible letter, also used in figure files.
    pub const fn name(self) -> char {
        match self {
            PieceKind::Corner => 'c',
            PieceKind::Pos => 'p',
            PieceKind::Neg => 'n',
            PieceKind::Zee => 'z',
            PieceKind::Tee => 't',
            PieceKind::Ell => 'l',
            PieceKind::Three => '3',
        }
    }

    pub fn from_name(name: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Offsets of the non-center cubes from the center cube.
    #[inline]
    pub const fn offsets(self) -> &'static [Coord] {
        OFFSETS[self as usize]
    }

    /// Number of cubes, center included.
    #[inline]
    pub const fn size(self) -> usize {
        self.offsets().len() + 1
    }

    /// True for the two mirror-image pieces.
    #[inline]
    pub const fn is_chiral(self) -> bool {
        matches!(self, PieceKind::Pos | PieceKind::Neg)
    }

    /// Occupant code after reflecting a figure: the chiral pair swap, every
    /// other code is unchanged.
    #[inline]
    pub const fn mirror_code(code: u8) -> u8 {
        const POS: u8 = PieceKind::Pos.code();
        const NEG: u8 = PieceKind::Neg.code();
        match code {
            POS => NEG,
            NEG => POS,
            other => other,
        }
    }

    /// Letter for an occupant code, `#` for empty.
    pub fn code_name(code: u8) -> char {
        Self::from_code(code).map_or(EMPTY_NAME, PieceKind::name)
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Which checks to run after tentatively placing a piece.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Checks {
    pub orphans: bool,
    pub duplicates: bool,
}

impl Checks {
    pub const NONE: Checks = Checks {
        orphans: false,
        duplicates: false,
    };
}

/// Search position of a free piece: the cubicle holding its center and the
/// index into that cubicle's valid orientation list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cursor {
    cubicle: usize,
    orientation: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PieceState {
    /// Free piece, not in the figure.
    Unplaced,
    /// Free piece, occupying the figure at the cursor.
    Placed(Cursor),
    /// Fixed by the figure. `counted` alternates so that the search sees a
    /// successful placement going forward and a failure when backtracking.
    PrePlaced { counted: bool },
}

/// Counters reported by the statistics table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlacementStats {
    /// Placements accepted.
    pub successes: u64,
    /// Placements made and then withdrawn by a check.
    pub failures: u64,
    /// Withdrawn because the partial figure duplicated an earlier one.
    pub duplicates: u64,
    /// Withdrawn because an empty cubicle could no longer be filled.
    pub orphans: u64,
    /// Orientations that fit the empty figure, summed over all cubicles.
    pub valid_orientations: u64,
}

/// One piece with its orientations and search state.
#[derive(Clone, Debug)]
pub struct Piece {
    kind: PieceKind,
    /// Rotation-distinct orientations: rotated offsets from the center.
    orientations: Vec<Vec<Coord>>,
    /// Per figure cubicle, the orientations that fit there when the figure
    /// holds nothing but pre-placed pieces.
    valid_orientations: Vec<Vec<usize>>,
    state: PieceState,
    stats: PlacementStats,
}

impl Piece {
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            orientations: unique_orientations(kind.offsets()),
            valid_orientations: Vec::new(),
            state: PieceState::Unplaced,
            stats: PlacementStats::default(),
        }
    }

    #[inline]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn orientations(&self) -> &[Vec<Coord>] {
        &self.orientations
    }

    pub fn stats(&self) -> &PlacementStats {
        &self.stats
    }

    /// Full reset, for a new figure.
    pub fn reset(&mut self) {
        self.valid_orientations.clear();
        self.state = PieceState::Unplaced;
        self.stats = PlacementStats::default();
    }

    /// Marks the piece as fixed by the figure.
    pub fn pre_place(&mut self) {
        self.state = PieceState::PrePlaced { counted: false };
    }

    #[inline]
    pub fn is_pre_placed(&self) -> bool {
        matches!(self.state, PieceState::PrePlaced { .. })
    }

    /// True while the piece occupies the figure (or, if pre-placed, while
    /// the search counts it as placed).
    pub fn is_placed(&self) -> bool {
        matches!(
            self.state,
            PieceState::Placed(_) | PieceState::PrePlaced { counted: true }
        )
    }

    /// Computes, for every cubicle, the orientations that fit there
    /// regardless of where other free pieces go.
    pub fn set_valid_orientations(&mut self, shape: &Shape) {
        self.valid_orientations = (0..shape.len())
            .map(|cubicle| {
                (0..self.orientations.len())
                    .filter(|&orientation| shape.fits(cubicle, &self.orientations[orientation]))
                    .collect()
            })
            .collect();
        self.stats.valid_orientations =
            self.valid_orientations.iter().map(|v| v.len() as u64).sum();
    }

    /// Places the piece at its first (or, if already placed, next) position
    /// and orientation that fits and passes `checks`.
    ///
    /// Returns false, with the piece removed and its cursor reset, when no
    /// further placement exists.
    pub fn place(&mut self, shape: &mut Shape, depth: usize, checks: Checks) -> bool {
        if let PieceState::PrePlaced { counted } = &mut self.state {
            *counted = !*counted;
            return *counted;
        }

        let mut cursor = match self.state {
            PieceState::Placed(current) => {
                shape.remove_piece(depth);
                self.advance(shape, current)
            }
            _ => shape
                .first_primary()
                .map(|cubicle| Cursor { cubicle, orientation: 0 }),
        };

        while let Some(current) = cursor {
            if !self.occupy(shape, depth, current) {
                cursor = self.advance(shape, current);
                continue;
            }

            // duplicate check first, it is cheaper than the orphan scan
            let duplicate = checks.duplicates && {
                let seen = shape.is_duplicate(depth);
                if !seen {
                    shape.add_solution(depth);
                }
                seen
            };
            let orphan = !duplicate && checks.orphans && shape.has_orphan();

            if duplicate || orphan {
                shape.remove_piece(depth);
                self.stats.failures += 1;
                if duplicate {
                    self.stats.duplicates += 1;
                } else {
                    self.stats.orphans += 1;
                }
                cursor = self.advance(shape, current);
                continue;
            }

            self.state = PieceState::Placed(current);
            self.stats.successes += 1;
            return true;
        }

        self.state = PieceState::Unplaced;
        false
    }

    /// Takes the piece out of the search: removes it from the figure if it
    /// occupies it and rewinds the cursor. Pre-placed cubicles stay filled.
    pub fn withdraw(&mut self, shape: &mut Shape, depth: usize) {
        match self.state {
            PieceState::Placed(_) => {
                shape.remove_piece(depth);
                self.state = PieceState::Unplaced;
            }
            PieceState::PrePlaced { .. } => {
                self.state = PieceState::PrePlaced { counted: false };
            }
            PieceState::Unplaced => {}
        }
    }

    fn occupy(&self, shape: &mut Shape, depth: usize, cursor: Cursor) -> bool {
        let Some(&orientation) = self
            .valid_orientations
            .get(cursor.cubicle)
            .and_then(|valid| valid.get(cursor.orientation))
        else {
            return false;
        };
        shape.place_piece(
            cursor.cubicle,
            self.kind.code(),
            depth,
            &self.orientations[orientation],
        )
    }

    /// Next valid orientation at the same cubicle, else the first one at the
    /// next primary cubicle.
    fn advance(&self, shape: &Shape, cursor: Cursor) -> Option<Cursor> {
        let valid_here = self
            .valid_orientations
            .get(cursor.cubicle)
            .map_or(0, Vec::len);
        if cursor.orientation + 1 < valid_here {
            Some(Cursor {
                orientation: cursor.orientation + 1,
                ..cursor
            })
        } else {
            shape
                .next_primary(cursor.cubicle)
                .map(|cubicle| Cursor { cubicle, orientation: 0 })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ROTATIONS;

    fn normalized(cubes: &[Coord]) -> Vec<Coord> {
        let mut shape = cubes.to_vec();
        shape.push(Coord::ORIGIN);
        Coord::normalize(&mut shape);
        shape.sort();
        shape
    }

    #[test]
    fn test_codes_and_names_roundtrip() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_code(kind.code()), Some(kind));
            assert_eq!(PieceKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(PieceKind::from_code(EMPTY), None);
        assert_eq!(PieceKind::from_name('o'), None);
        assert_eq!(PieceKind::code_name(EMPTY), '#');
    }

    #[test]
    fn test_piece_sizes_fill_figure() {
        let total: usize = PieceKind::ALL.iter().map(|kind| kind.size()).sum();
        assert_eq!(total, 27);
        assert_eq!(PieceKind::Three.size(), 3);
    }

    #[test]
    fn test_orientation_counts() {
        let counts: Vec<(char, usize)> = PieceKind::ALL
            .iter()
            .map(|&kind| (kind.name(), Piece::new(kind).orientations().len()))
            .collect();
        assert_eq!(
            counts,
            vec![
                ('c', 8),
                ('p', 12),
                ('n', 12),
                ('z', 12),
                ('t', 12),
                ('l', 24),
                ('3', 12),
            ]
        );
    }

    #[test]
    fn test_orientations_are_not_rotations_of_each_other() {
        for kind in PieceKind::ALL {
            let piece = Piece::new(kind);
            let shapes: Vec<Vec<Coord>> =
                piece.orientations().iter().map(|o| normalized(o)).collect();
            for (i, first) in piece.orientations().iter().enumerate() {
                for rotate in &ROTATIONS {
                    let rotated: Vec<Coord> = first.iter().map(|&c| rotate(c)).collect();
                    let image = normalized(&rotated);
                    let matches = shapes.iter().filter(|shape| **shape == image).count();
                    assert_eq!(matches, 1, "piece {kind} orientation {i} is not unique");
                }
            }
        }
    }

    #[test]
    fn test_regenerating_orientations_is_stable() {
        for kind in PieceKind::ALL {
            assert_eq!(Piece::new(kind).orientations(), Piece::new(kind).orientations());
        }
    }

    #[test]
    fn test_chiral_pair_are_mirror_images() {
        let pos = normalized(PieceKind::Pos.offsets());
        let mirrored: Vec<Coord> = PieceKind::Neg
            .offsets()
            .iter()
            .map(|&c| Coord::new(-c.x, c.y, c.z))
            .collect();
        assert_eq!(normalized(&mirrored), pos);

        // but no rotation maps one onto the other
        let neg_shapes: Vec<Vec<Coord>> = Piece::new(PieceKind::Neg)
            .orientations()
            .iter()
            .map(|o| normalized(o))
            .collect();
        assert!(!neg_shapes.contains(&pos));
    }

    #[test]
    fn test_mirror_code_swaps_only_chiral_pair() {
        assert_eq!(PieceKind::mirror_code(PieceKind::Pos.code()), PieceKind::Neg.code());
        assert_eq!(PieceKind::mirror_code(PieceKind::Neg.code()), PieceKind::Pos.code());
        assert_eq!(PieceKind::mirror_code(PieceKind::Tee.code()), PieceKind::Tee.code());
        assert_eq!(PieceKind::mirror_code(EMPTY), EMPTY);
    }

    #[test]
    fn test_pre_placed_piece_alternates() {
        let mut shape = Shape::default();
        let mut piece = Piece::new(PieceKind::Tee);
        piece.pre_place();
        assert!(!piece.is_placed());
        assert!(piece.place(&mut shape, 0, Checks::NONE));
        assert!(piece.is_placed());
        assert!(!piece.place(&mut shape, 0, Checks::NONE));
        assert!(piece.place(&mut shape, 0, Checks::NONE));
        piece.withdraw(&mut shape, 0);
        assert!(!piece.is_placed());
        assert!(piece.is_pre_placed());
    }

    #[test]
    fn test_free_piece_fails_on_empty_figure() {
        let mut shape = Shape::default();
        let mut piece = Piece::new(PieceKind::Corner);
        piece.set_valid_orientations(&shape);
        assert!(!piece.place(&mut shape, 0, Checks::NONE));
        assert!(!piece.is_placed());
    }
}
