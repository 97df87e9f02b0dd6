//! Top-level Soma solver.
//!
//! The search places the seven pieces in a fixed order, one per depth.
//! Each piece walks its own cursor over primary cubicles and orientations;
//! the solver advances to the next depth when a piece fits, and steps back
//! when a piece runs out of placements. Between calls to [`Soma::solve`]
//! the whole search state is kept, so successive calls return successive
//! solutions.
//!
//! Pruning, each enabled per depth:
//! - orphan checks reject placements leaving an empty cubicle (or sealed
//!   empty pair) that no piece can fill,
//! - duplicate checks reject partial figures that are rotations or mirror
//!   images of ones already explored (depth 6 checks complete solutions),
//! - symmetry checks skip centers symmetric to an earlier cubicle.

use log::{debug, trace};

use crate::config::{PieceOrder, SolverConfig, StepMask};
use crate::coord::Coord;
use crate::error::{ConfigError, FigureError};
use crate::figure::{FigureSpec, Solution};
use crate::pieces::{Checks, Piece, PieceKind, PlacementStats, NUM_PIECES};
use crate::shape::{Shape, StatusCounts};

const LAST_DEPTH: usize = NUM_PIECES - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SearchState {
    /// No figure loaded.
    Idle,
    /// Ready to continue the search.
    Searching,
    /// A solution occupies the figure.
    Solved,
    /// Every placement has been tried.
    Exhausted,
}

/// Counters for one search depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepthStatistics {
    pub piece: PieceKind,
    /// Rotation-distinct orientations of the piece.
    pub orientations: usize,
    pub placements: PlacementStats,
    pub statuses: StatusCounts,
}

/// Soma puzzle solver for one figure at a time.
#[derive(Clone, Debug)]
pub struct Soma {
    config: SolverConfig,
    /// Pieces in search order; index is depth.
    pieces: Vec<Piece>,
    shape: Shape,
    /// Masks in effect for the loaded figure.
    duplicates: StepMask,
    symmetries: StepMask,
    pos_depth: usize,
    neg_depth: usize,
    active: usize,
    state: SearchState,
}

impl Default for Soma {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl Soma {
    pub fn new(config: SolverConfig) -> Self {
        let mut soma = Self {
            config,
            pieces: PieceKind::ALL.into_iter().map(Piece::new).collect(),
            shape: Shape::default(),
            duplicates: config.duplicates,
            symmetries: config.symmetries,
            pos_depth: 0,
            neg_depth: 0,
            active: 0,
            state: SearchState::Idle,
        };
        soma.order_pieces(config.piece_order);
        soma
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Sets the optimization masks and piece order used from the next
    /// figure load on.
    ///
    /// An invalid piece order is rejected: the masks are still applied but
    /// the default order is installed.
    pub fn configure(
        &mut self,
        orphans: StepMask,
        duplicates: StepMask,
        symmetries: StepMask,
        piece_order: &str,
    ) -> Result<(), ConfigError> {
        let (piece_order, result) = match piece_order.parse::<PieceOrder>() {
            Ok(order) => (order, Ok(())),
            Err(err) => (PieceOrder::DEFAULT, Err(err)),
        };
        self.set_config(SolverConfig {
            orphans,
            duplicates,
            symmetries,
            piece_order,
        });
        result
    }

    /// Replaces the configuration and unloads the current figure.
    pub fn set_config(&mut self, config: SolverConfig) {
        self.config = config;
        self.order_pieces(config.piece_order);
        self.reset();
    }

    fn order_pieces(&mut self, order: PieceOrder) {
        self.pieces.sort_by_key(|piece| order.depth_of(piece.kind()));
        self.pos_depth = order.depth_of(PieceKind::Pos);
        self.neg_depth = order.depth_of(PieceKind::Neg);
    }

    /// Forgets the loaded figure and all search state.
    pub fn reset(&mut self) {
        for piece in &mut self.pieces {
            piece.reset();
        }
        self.shape = Shape::default();
        self.active = 0;
        self.state = SearchState::Idle;
    }

    /// Loads a figure in the text format.
    pub fn load_figure(&mut self, text: &str) -> Result<(), FigureError> {
        let spec: FigureSpec = text.parse()?;
        self.load(&spec)
    }

    /// Loads a figure from positions and per-position piece letters.
    pub fn load_explicit(&mut self, positions: &[Coord], pieces: &str) -> Result<(), FigureError> {
        let spec = FigureSpec::from_coordinates(positions, pieces)?;
        self.load(&spec)
    }

    /// Validates and installs a figure. On error the solver is unchanged.
    pub fn load(&mut self, spec: &FigureSpec) -> Result<(), FigureError> {
        spec.check_pre_placed()?;
        let shape = Shape::build(spec)?;
        let pre_placed = spec.pre_placed();

        self.shape = shape;
        self.active = 0;
        self.state = SearchState::Searching;
        for piece in &mut self.pieces {
            piece.reset();
            if pre_placed.contains(&piece.kind()) {
                piece.pre_place();
            } else {
                piece.set_valid_orientations(&self.shape);
            }
        }

        // separated components are checked as whole figures only
        if self.shape.components().len() == 1 {
            self.duplicates = self.config.duplicates;
            self.symmetries = self.config.symmetries;
        } else {
            self.duplicates = StepMask::NONE.with(0).with(LAST_DEPTH);
            self.symmetries = StepMask::NONE;
        }

        debug!(
            "loaded figure: {} component(s), symmetries {:?}, pre-placed {:?}",
            self.shape.components().len(),
            self.shape
                .components()
                .iter()
                .map(|component| component.symmetries().len())
                .collect::<Vec<_>>(),
            pre_placed.iter().map(|kind| kind.name()).collect::<String>(),
        );
        debug!(
            "checks: orphans {}, duplicates {}, symmetries {}, order {}",
            self.config.orphans, self.duplicates, self.symmetries, self.config.piece_order
        );

        self.shape
            .set_statuses(0, self.pieces[0].kind(), self.symmetries.contains(0));
        Ok(())
    }

    /// Finds the next solution. Returns false when there are no more (or
    /// no figure is loaded); the figure then keeps its last occupancy.
    pub fn solve(&mut self) -> bool {
        match self.state {
            SearchState::Idle | SearchState::Exhausted => return false,
            SearchState::Solved => self.backtrack(),
            SearchState::Searching => {}
        }

        loop {
            let depth = self.active;
            let checks = if depth == LAST_DEPTH {
                Checks::NONE
            } else {
                Checks {
                    orphans: self.config.orphans.contains(depth),
                    duplicates: self.duplicates.contains(depth),
                }
            };

            if !self.pieces[depth].place(&mut self.shape, depth, checks) {
                if depth == 0 {
                    self.state = SearchState::Exhausted;
                    return false;
                }
                self.active -= 1;
                self.shape.restore_statuses(self.active);
                continue;
            }

            if depth == LAST_DEPTH {
                if self.duplicates.contains(LAST_DEPTH) {
                    if self.shape.is_duplicate(LAST_DEPTH) {
                        self.backtrack();
                        continue;
                    }
                    self.shape.add_solution(LAST_DEPTH);
                }
                trace!("solution found");
                self.state = SearchState::Solved;
                return true;
            }

            self.active += 1;
            let next = self.active;
            if checks.duplicates {
                // the chiral pair shares one set of signatures
                if next == self.pos_depth {
                    self.shape.clear_solutions(self.pos_depth);
                    self.shape.clear_solutions(self.neg_depth);
                } else if next != self.neg_depth {
                    self.shape.clear_solutions(next);
                }
            }
            self.shape
                .set_statuses(next, self.pieces[next].kind(), self.symmetries.contains(next));
        }
    }

    /// Withdraws the last piece, and every pre-placed piece before it,
    /// back to the nearest free piece that can move on.
    fn backtrack(&mut self) {
        loop {
            let depth = self.active;
            self.shape.restore_statuses(depth);
            self.pieces[depth].withdraw(&mut self.shape, depth);
            if depth == 0 {
                break;
            }
            self.active -= 1;
            if !self.pieces[depth].is_pre_placed() || self.active == 0 {
                break;
            }
        }
        self.shape.restore_statuses(self.active);
    }

    /// Iterator over the remaining solutions.
    pub fn solutions(&mut self) -> Solutions<'_> {
        Solutions { soma: self }
    }

    /// Current occupancy of the figure.
    pub fn current_solution(&self) -> Solution {
        Solution::from_shape(&self.shape)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Per-depth counters since the figure was loaded.
    pub fn statistics(&self) -> Vec<DepthStatistics> {
        self.pieces
            .iter()
            .enumerate()
            .map(|(depth, piece)| DepthStatistics {
                piece: piece.kind(),
                orientations: piece.orientations().len(),
                placements: *piece.stats(),
                statuses: self.shape.status_counts(depth),
            })
            .collect()
    }
}

/// Yields each remaining solution of a [`Soma`].
pub struct Solutions<'a> {
    soma: &'a mut Soma,
}

impl Iterator for Solutions<'_> {
    type Item = Solution;

    fn next(&mut self) -> Option<Self::Item> {
        self.soma
            .solve()
            .then(|| self.soma.current_solution())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    const CUBE: &str = "\
ooo
ooo
ooo

ooo
ooo
ooo

ooo
ooo
ooo
";

    /// 2x3x2 block beside a 3x3 slab with a 3x2 slab under it.
    const SEPARATED: &str = "\
ooo.ooo
ooo.ooo
....ooo

ooo.ooo
ooo.ooo
";

    fn count(text: &str, config: SolverConfig) -> usize {
        let mut soma = Soma::new(config);
        soma.load_figure(text).unwrap();
        soma.solutions().count()
    }

    fn steps(s: &str) -> StepMask {
        s.parse().unwrap()
    }

    #[test]
    fn test_cube_distinct_solutions() {
        assert_eq!(count(CUBE, SolverConfig::default()), 240);
    }

    #[test]
    fn test_cube_all_solutions() {
        let config = SolverConfig::default().with_all_rotations();
        assert_eq!(count(CUBE, config), 11520);

        // orphan checks only skip dead ends
        let unpruned = SolverConfig {
            orphans: StepMask::NONE,
            ..config
        };
        assert_eq!(count(CUBE, unpruned), 11520);
    }

    #[test]
    fn test_checks_do_not_change_distinct_count() {
        let without_orphans = SolverConfig {
            orphans: StepMask::NONE,
            ..SolverConfig::default()
        };
        assert_eq!(count(CUBE, without_orphans), 240);

        let final_only = SolverConfig {
            duplicates: steps("7"),
            ..SolverConfig::default()
        };
        assert_eq!(count(CUBE, final_only), 240);

        let every_step = SolverConfig {
            duplicates: StepMask::ALL,
            ..SolverConfig::default()
        };
        assert_eq!(count(CUBE, every_step), 240);

        let first_symmetry = SolverConfig {
            symmetries: steps("1"),
            ..SolverConfig::default()
        };
        assert_eq!(count(CUBE, first_symmetry), 240);

        let reordered = SolverConfig {
            piece_order: "l3pnztc".parse().unwrap(),
            ..SolverConfig::default()
        };
        assert_eq!(count(CUBE, reordered), 240);
    }

    #[test]
    fn test_solutions_are_complete_and_distinct() {
        let mut soma = Soma::default();
        soma.load_figure(CUBE).unwrap();
        let mut seen = FxHashSet::default();
        for solution in soma.solutions() {
            assert!(solution.is_complete());
            let counts: Vec<usize> = PieceKind::ALL
                .iter()
                .map(|&kind| {
                    solution
                        .cubicles()
                        .iter()
                        .filter(|c| c.piece == Some(kind))
                        .count()
                })
                .collect();
            assert_eq!(counts, vec![4, 4, 4, 4, 4, 4, 3]);
            assert!(seen.insert(solution));
        }
        assert_eq!(seen.len(), 240);
        assert!(!soma.solve());
    }

    #[test]
    fn test_first_solution_snapshot() {
        let mut soma = Soma::default();
        soma.load_figure(CUBE).unwrap();
        assert!(soma.solve());
        insta::assert_snapshot!(soma.current_solution().to_string(), @r###"
        3zz
        zzc
        ttt

        33c
        ncc
        ptl

        nnl
        npl
        ppl
        "###);
    }

    #[test]
    fn test_written_solution_reloads_as_only_solution() {
        let mut soma = Soma::default();
        soma.load_figure(CUBE).unwrap();
        assert!(soma.solve());
        let first = soma.current_solution();
        let text = first.to_string();

        let mut fixed = Soma::default();
        fixed.load_figure(&text).unwrap();
        assert!(fixed.solve());
        assert_eq!(fixed.current_solution(), first);
        assert!(!fixed.solve());
        assert!(!fixed.solve());
    }

    #[test]
    fn test_pre_placed_piece_limits_solutions() {
        let mut soma = Soma::default();
        soma.load_figure(CUBE).unwrap();
        assert!(soma.solve());
        let solution = soma.current_solution();

        // keep only the corner piece of the first solution
        let positions: Vec<Coord> = solution
            .cubicles()
            .iter()
            .map(|c| c.position.halve())
            .collect();
        let letters: String = solution
            .cubicles()
            .iter()
            .map(|c| match c.piece {
                Some(PieceKind::Corner) => 'c',
                _ => 'o',
            })
            .collect();

        let mut partial = Soma::default();
        partial.load_explicit(&positions, &letters).unwrap();
        let found: Vec<Solution> = partial.solutions().collect();
        assert_eq!(found.len(), 37);
        for other in &found {
            for (fixed, cubicle) in solution.cubicles().iter().zip(other.cubicles()) {
                if fixed.piece == Some(PieceKind::Corner) {
                    assert_eq!(cubicle.piece, Some(PieceKind::Corner));
                }
            }
        }
    }

    #[test]
    fn test_failed_load_keeps_state() {
        let mut soma = Soma::default();
        soma.load_figure(CUBE).unwrap();
        assert!(soma.solve());
        let before = soma.current_solution();

        let bad = CUBE.replacen("ooo", "ttt", 1);
        assert_eq!(
            soma.load_figure(&bad),
            Err(FigureError::PrePlacedCount {
                name: 't',
                found: 3,
                expected: 4
            })
        );
        assert_eq!(soma.current_solution(), before);
        assert!(soma.solve());
        assert_ne!(soma.current_solution(), before);
    }

    #[test]
    fn test_far_cubicle_is_rejected() {
        let mut positions: Vec<Coord> = (0..26)
            .map(|i| Coord::new(i % 3, (i / 3) % 3, i / 9))
            .collect();
        positions.push(Coord::new(2_000_000_000, 0, 0));

        let mut soma = Soma::default();
        assert!(matches!(
            soma.load_explicit(&positions, ""),
            Err(FigureError::FigureTooLarge { .. })
        ));
        assert!(!soma.solve());
    }

    #[test]
    fn test_solve_without_figure() {
        let mut soma = Soma::default();
        assert!(!soma.solve());
        soma.load_figure(CUBE).unwrap();
        assert!(soma.solve());
        soma.reset();
        assert!(!soma.solve());
        assert!(soma.current_solution().cubicles().is_empty());
    }

    #[test]
    fn test_unsolvable_figure() {
        // one corner cubicle moved away from the cube
        let figure = "\
ooo
ooo
oo.

ooo
ooo
ooo

ooo.
ooo.
ooo.
...o
";
        let mut soma = Soma::default();
        assert_eq!(
            soma.load_figure(figure),
            Err(FigureError::UnsolvableComponent { size: 26 })
        );
        assert!(!soma.solve());
    }

    #[test]
    fn test_separated_figure() {
        assert_eq!(count(SEPARATED, SolverConfig::default()), 21);
        // complete solutions of separated figures are always compared
        assert_eq!(
            count(SEPARATED, SolverConfig::default().with_all_rotations()),
            21
        );
        let unchecked = SolverConfig {
            duplicates: StepMask::NONE,
            ..SolverConfig::default()
        };
        assert_eq!(count(SEPARATED, unchecked), 21);
    }

    #[test]
    fn test_separated_figure_forces_checks() {
        let mut soma = Soma::new(SolverConfig {
            duplicates: steps("1234567"),
            symmetries: steps("1"),
            ..SolverConfig::default()
        });
        soma.load_figure(SEPARATED).unwrap();
        assert_eq!(soma.duplicates, steps("17"));
        assert!(soma.symmetries.is_empty());
        assert_eq!(soma.solutions().count(), 21);

        soma.set_config(SolverConfig::default().with_all_rotations());
        soma.load_figure(SEPARATED).unwrap();
        assert_eq!(soma.duplicates, steps("17"));
    }

    #[test]
    fn test_configure_rejects_bad_order() {
        let mut soma = Soma::default();
        let result = soma.configure(StepMask::NONE, steps("17"), StepMask::NONE, "ztcpnl");
        assert_eq!(
            result,
            Err(ConfigError::PieceOrderLength {
                found: 6,
                expected: 7
            })
        );
        assert_eq!(soma.config().piece_order, PieceOrder::DEFAULT);
        assert!(soma.config().orphans.is_empty());

        soma.configure(StepMask::NONE, steps("17"), StepMask::NONE, "3lntpcz")
            .unwrap();
        let order: String = soma.pieces.iter().map(|p| p.kind().name()).collect();
        assert_eq!(order, "3lntpcz");
        soma.load_figure(CUBE).unwrap();
        assert_eq!(soma.solutions().count(), 240);
    }

    #[test]
    fn test_statistics() {
        let mut soma = Soma::default();
        soma.load_figure(CUBE).unwrap();
        assert_eq!(soma.solutions().count(), 240);
        let stats = soma.statistics();
        let order: String = stats.iter().map(|s| s.piece.name()).collect();
        assert_eq!(order, "ztcpnl3");

        let column = |f: fn(&DepthStatistics) -> u64| stats.iter().map(f).collect::<Vec<_>>();
        assert_eq!(
            column(|s| s.orientations as u64),
            vec![12, 12, 8, 12, 12, 24, 12]
        );
        // the last piece also counts fits later rejected as duplicates
        assert_eq!(
            column(|s| s.placements.successes),
            vec![2, 60, 540, 1359, 537, 422, 273]
        );
        assert_eq!(
            column(|s| s.placements.duplicates),
            vec![70, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            column(|s| s.placements.orphans),
            vec![0, 11, 266, 1939, 1771, 461, 0]
        );
    }
}
