//! Figure geometry and occupancy.
//!
//! A [`Shape`] holds the 27 cubicles of a figure in canonical order, each
//! with its neighbors precomputed, split into orthogonally connected
//! components. Pieces are placed by writing their occupant code into the
//! cubicles they cover; the search depth indexes every per-piece record.

mod duplicates;
mod symmetry;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::coord::Coord;
use crate::error::FigureError;
use crate::figure::FigureSpec;
use crate::pieces::{PieceKind, EMPTY, MAX_PIECE_SIZE, NUM_PIECES};
use crate::signature::Signature;

pub use symmetry::Symmetry;

/// Number of cubicles in every Soma figure.
pub const NUM_CUBICLES: usize = 27;

/// Largest unit extent of a figure along any axis.
pub const MAX_EXTENT: i32 = 1024;

/// Unit offsets with every component in `-1..=1`.
const NUM_OFFSETS: usize = 27;

/// Index of a unit offset into [`Cubicle`] adjacency, `None` if any
/// component is outside `-1..=1`.
#[inline]
fn offset_index(offset: Coord) -> Option<usize> {
    let unit = -1..=1;
    if unit.contains(&offset.x) && unit.contains(&offset.y) && unit.contains(&offset.z) {
        Some(((offset.x + 1) * 9 + (offset.y + 1) * 3 + (offset.z + 1)) as usize)
    } else {
        None
    }
}

#[inline]
fn index_offset(index: usize) -> Coord {
    let index = index as i32;
    Coord::new(index / 9 - 1, (index / 3) % 3 - 1, index % 3 - 1)
}

/// The six orthogonal directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Front,
    Back,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Down,
        Direction::Front,
        Direction::Back,
        Direction::Left,
        Direction::Right,
    ];

    pub const fn offset(self) -> Coord {
        match self {
            Direction::Up => Coord::new(0, 0, 1),
            Direction::Down => Coord::new(0, 0, -1),
            Direction::Front => Coord::new(0, 1, 0),
            Direction::Back => Coord::new(0, -1, 0),
            Direction::Left => Coord::new(-1, 0, 0),
            Direction::Right => Coord::new(1, 0, 0),
        }
    }
}

/// Pruning status of a cubicle at one search depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CubicleStatus {
    #[default]
    Unset,
    /// Holds a piece.
    Occupied,
    /// Empty, and tried as a piece center.
    Primary,
    /// Empty, but symmetric to a primary cubicle under the current
    /// occupancy, so never tried as a piece center.
    Duplicate,
}

/// One unit cell of a figure.
#[derive(Clone, Debug)]
pub struct Cubicle {
    /// Doubled, centered position.
    position: Coord,
    occupant: u8,
    /// Cubicle at each unit offset (face and edge neighbors included).
    adjacent: [Option<usize>; NUM_OFFSETS],
    component: usize,
    status: CubicleStatus,
}

impl Cubicle {
    #[inline]
    pub fn position(&self) -> Coord {
        self.position
    }

    /// Occupant code, [`EMPTY`] if free.
    #[inline]
    pub fn occupant(&self) -> u8 {
        self.occupant
    }

    pub fn piece(&self) -> Option<PieceKind> {
        PieceKind::from_code(self.occupant)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupant == EMPTY
    }

    #[inline]
    pub fn status(&self) -> CubicleStatus {
        self.status
    }

    /// Index of the separated component holding this cubicle.
    pub fn component(&self) -> usize {
        self.component
    }

    /// Cubicle at a unit offset from this one.
    #[inline]
    pub fn adjacent(&self, offset: Coord) -> Option<usize> {
        offset_index(offset).and_then(|index| self.adjacent[index])
    }

    #[inline]
    pub fn neighbor(&self, direction: Direction) -> Option<usize> {
        self.adjacent(direction.offset())
    }
}

/// An orthogonally connected part of a figure.
///
/// Symmetries are found on positions re-centered on the component's own
/// bounding box, independently of the rest of the figure.
#[derive(Clone, Debug)]
pub struct Component {
    /// Figure cubicle indices, in the component's canonical order.
    members: Vec<usize>,
    maxes: Coord,
    /// True symmetries of the component, identity first.
    symmetries: Vec<Symmetry>,
}

impl Component {
    fn new(members: Vec<usize>, cubicles: &[Cubicle]) -> Result<Self, FigureError> {
        let size = members.len();
        if size < 3 || !matches!(size % 4, 0 | 3) {
            return Err(FigureError::UnsolvableComponent { size });
        }

        // figure positions are doubled, so normalized ones are all even
        let mut positions: Vec<Coord> = members.iter().map(|&i| cubicles[i].position).collect();
        let maxes = Coord::normalize(&mut positions)
            .ok_or(FigureError::FigureTooLarge { limit: MAX_EXTENT })?
            .halve();
        if maxes.dimensions() < 2 {
            return Err(FigureError::DegenerateComponent);
        }
        for position in &mut positions {
            *position = position.halve();
        }
        Coord::center(&mut positions, maxes);

        let mut paired: Vec<(Coord, usize)> = positions.into_iter().zip(members).collect();
        paired.sort_unstable_by_key(|&(position, _)| position);
        let (positions, members): (Vec<Coord>, Vec<usize>) = paired.into_iter().unzip();

        let symmetries = symmetry::symmetry_group(&positions, maxes);
        Ok(Self {
            members,
            maxes,
            symmetries,
        })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn maxes(&self) -> Coord {
        self.maxes
    }

    pub fn symmetries(&self) -> &[Symmetry] {
        &self.symmetries
    }

    /// Occupancy of the component in its canonical order.
    pub fn signature(&self, cubicles: &[Cubicle]) -> Signature {
        Signature::from_codes(self.members.iter().map(|&i| cubicles[i].occupant))
    }

    /// Occupancy after applying one of the component's symmetries.
    pub fn transformed_signature(&self, cubicles: &[Cubicle], symmetry: &Symmetry) -> Signature {
        let mirror = symmetry.transform().is_mirror();
        let mut signature = Signature::default();
        for (&member, &target) in self.members.iter().zip(symmetry.permutation()) {
            let code = cubicles[member].occupant;
            let code = if mirror { PieceKind::mirror_code(code) } else { code };
            signature.set(target as usize, code);
        }
        signature
    }
}

/// Cubicles covered by the piece placed at one depth.
#[derive(Clone, Copy, Debug, Default)]
struct PlacedCells {
    cells: [usize; MAX_PIECE_SIZE],
    len: usize,
}

/// Primary and duplicate cubicle counts at one depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub primary: u64,
    pub duplicate: u64,
}

/// A loaded figure and its search state.
#[derive(Clone, Debug, Default)]
pub struct Shape {
    cubicles: Vec<Cubicle>,
    maxes: Coord,
    components: Vec<Component>,
    placed: [PlacedCells; NUM_PIECES],
    /// Signatures seen at each depth, under every applicable symmetry.
    solutions: [FxHashSet<Signature>; NUM_PIECES],
    saved_statuses: [Vec<CubicleStatus>; NUM_PIECES],
    status_counts: [StatusCounts; NUM_PIECES],
}

impl Shape {
    /// Builds and validates a figure. Pre-placed cubicles start occupied.
    pub fn build(spec: &FigureSpec) -> Result<Self, FigureError> {
        let found = spec.cubicles.len();
        if found != NUM_CUBICLES {
            return Err(FigureError::CubicleCount {
                found,
                expected: NUM_CUBICLES,
            });
        }

        let mut grid: Vec<Coord> = spec.cubicles.iter().map(|c| c.position).collect();
        let too_large = FigureError::FigureTooLarge { limit: MAX_EXTENT };
        let maxes = Coord::normalize(&mut grid).ok_or_else(|| too_large.clone())?;
        if maxes.x > MAX_EXTENT || maxes.y > MAX_EXTENT || maxes.z > MAX_EXTENT {
            return Err(too_large);
        }

        let mut order: Vec<usize> = (0..found).collect();
        order.sort_by_key(|&i| grid[i]);
        if let Some(pair) = order.windows(2).find(|pair| grid[pair[0]] == grid[pair[1]]) {
            return Err(FigureError::DuplicatePosition(spec.cubicles[pair[0]].position));
        }

        let index: FxHashMap<Coord, usize> = order
            .iter()
            .enumerate()
            .map(|(sorted, &original)| (grid[original], sorted))
            .collect();

        let mut cubicles: Vec<Cubicle> = order
            .iter()
            .map(|&original| {
                let unit = grid[original];
                let mut adjacent = [None; NUM_OFFSETS];
                for (slot, neighbor) in adjacent.iter_mut().enumerate() {
                    *neighbor = index.get(&(unit + index_offset(slot))).copied();
                }
                Cubicle {
                    position: unit.scale(2) - maxes,
                    occupant: spec.cubicles[original]
                        .piece
                        .map_or(EMPTY, PieceKind::code),
                    adjacent,
                    component: 0,
                    status: CubicleStatus::Unset,
                }
            })
            .collect();

        let components = Self::find_components(&mut cubicles)?;

        Ok(Self {
            cubicles,
            maxes,
            components,
            ..Self::default()
        })
    }

    /// Splits the figure into orthogonally connected components, ordered
    /// by their first cubicle.
    fn find_components(cubicles: &mut [Cubicle]) -> Result<Vec<Component>, FigureError> {
        let mut assigned = vec![false; cubicles.len()];
        let mut components = Vec::new();

        for start in 0..cubicles.len() {
            if assigned[start] {
                continue;
            }
            let id = components.len();
            let mut members = vec![start];
            let mut stack = vec![start];
            assigned[start] = true;

            while let Some(current) = stack.pop() {
                cubicles[current].component = id;
                for direction in Direction::ALL {
                    if let Some(next) = cubicles[current].neighbor(direction) {
                        if !assigned[next] {
                            assigned[next] = true;
                            members.push(next);
                            stack.push(next);
                        }
                    }
                }
            }

            components.push(Component::new(members, cubicles)?);
        }

        Ok(components)
    }

    /// Number of cubicles, 0 before a figure is loaded.
    #[inline]
    pub fn len(&self) -> usize {
        self.cubicles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cubicles.is_empty()
    }

    pub fn cubicles(&self) -> &[Cubicle] {
        &self.cubicles
    }

    /// Doubled extents of the figure's bounding box.
    pub fn maxes(&self) -> Coord {
        self.maxes
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn status_counts(&self, depth: usize) -> StatusCounts {
        self.status_counts[depth]
    }

    /// True if the center and every offset cubicle exist and are free.
    pub fn fits(&self, center: usize, offsets: &[Coord]) -> bool {
        let Some(cubicle) = self.cubicles.get(center) else {
            return false;
        };
        cubicle.is_empty()
            && offsets.iter().all(|&offset| {
                cubicle
                    .adjacent(offset)
                    .is_some_and(|neighbor| self.cubicles[neighbor].is_empty())
            })
    }

    /// Writes `code` into the center and offset cubicles if they are all
    /// free, recording them as the piece at `depth`.
    pub fn place_piece(&mut self, center: usize, code: u8, depth: usize, offsets: &[Coord]) -> bool {
        if !self.fits(center, offsets) {
            return false;
        }

        let mut placed = PlacedCells {
            cells: [center; MAX_PIECE_SIZE],
            len: offsets.len() + 1,
        };
        for (cell, &offset) in placed.cells[1..].iter_mut().zip(offsets) {
            if let Some(neighbor) = self.cubicles[center].adjacent(offset) {
                *cell = neighbor;
            }
        }
        for &cell in &placed.cells[..placed.len] {
            self.cubicles[cell].occupant = code;
        }
        self.placed[depth] = placed;
        true
    }

    /// Empties the cubicles of the piece placed at `depth`.
    pub fn remove_piece(&mut self, depth: usize) {
        let placed = std::mem::take(&mut self.placed[depth]);
        for &cell in &placed.cells[..placed.len] {
            self.cubicles[cell].occupant = EMPTY;
        }
    }

    pub fn first_primary(&self) -> Option<usize> {
        self.cubicles
            .iter()
            .position(|cubicle| cubicle.status == CubicleStatus::Primary)
    }

    /// First primary cubicle after `after`.
    pub fn next_primary(&self, after: usize) -> Option<usize> {
        let start = after + 1;
        self.cubicles
            .get(start..)?
            .iter()
            .position(|cubicle| cubicle.status == CubicleStatus::Primary)
            .map(|offset| start + offset)
    }

    /// True if some empty cubicle can no longer be covered: either it has
    /// no empty orthogonal neighbor, or it and its single empty neighbor
    /// form a pair sealed off from every other empty cubicle.
    pub fn has_orphan(&self) -> bool {
        let mut handled = 0u32;

        for (index, cubicle) in self.cubicles.iter().enumerate() {
            if !cubicle.is_empty() || handled & (1 << index) != 0 {
                continue;
            }

            let (count, twin) = self.empty_neighbors(cubicle);
            match (count, twin) {
                (0, _) => return true,
                (1, Some(twin)) => {
                    if let (1, Some(back)) = self.empty_neighbors(&self.cubicles[twin]) {
                        if back == index {
                            return true;
                        }
                    }
                    handled |= 1 << twin;
                }
                _ => {}
            }
        }

        false
    }

    /// Number of empty orthogonal neighbors and the last one seen.
    #[inline]
    fn empty_neighbors(&self, cubicle: &Cubicle) -> (usize, Option<usize>) {
        Direction::ALL
            .iter()
            .filter_map(|&direction| cubicle.neighbor(direction))
            .filter(|&neighbor| self.cubicles[neighbor].is_empty())
            .fold((0, None), |(count, _), neighbor| (count + 1, Some(neighbor)))
    }

    /// Occupancy of the whole figure: each component's signature in turn.
    pub fn signature(&self) -> Signature {
        let mut signature = Signature::default();
        let mut offset = 0;
        for component in &self.components {
            let part = component.signature(&self.cubicles);
            signature.splice(offset, &part, component.len());
            offset += component.len();
        }
        signature
    }
}
