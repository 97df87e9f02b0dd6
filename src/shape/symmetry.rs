//! Symmetry groups of figure components and per-depth pruning status.

use rustc_hash::FxHashMap;

use super::{Cubicle, CubicleStatus, Shape};
use crate::coord::Coord;
use crate::geometry::{box_rotations, Mirror, Transform};
use crate::pieces::PieceKind;

/// A transform that maps a component onto itself, with the resulting
/// permutation of its cubicles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symmetry {
    transform: Transform,
    /// `permutation[i]` is the canonical index that cubicle `i` moves to.
    permutation: Vec<u8>,
}

impl Symmetry {
    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn permutation(&self) -> &[u8] {
        &self.permutation
    }
}

/// Finds every rotation, and rotation after mirroring, that maps the
/// centered `positions` onto themselves. The identity comes first.
///
/// Only rotations preserving the bounding box can qualify, so the
/// candidates come from [`box_rotations`].
pub(super) fn symmetry_group(positions: &[Coord], maxes: Coord) -> Vec<Symmetry> {
    let index: FxHashMap<Coord, u8> = positions
        .iter()
        .enumerate()
        .map(|(i, &position)| (position, i as u8))
        .collect();
    let mirror = Mirror::for_extents(maxes);

    let mut group = Vec::new();
    for rotation in box_rotations(maxes) {
        for transform in [
            Transform::rotation(rotation),
            Transform::mirrored(rotation, mirror),
        ] {
            let permutation: Option<Vec<u8>> = positions
                .iter()
                .map(|&position| index.get(&transform.apply(position)).copied())
                .collect();
            if let Some(permutation) = permutation {
                group.push(Symmetry {
                    transform,
                    permutation,
                });
            }
        }
    }
    group
}

impl Shape {
    /// Computes the status of every cubicle before placing `kind` at
    /// `depth`, and saves it for [`Shape::restore_statuses`].
    ///
    /// Without symmetry checking every empty cubicle is primary. With it,
    /// each component's occupancy is tested against the component's
    /// symmetries; empty cubicles that an invariant symmetry maps onto an
    /// earlier primary cubicle become duplicates. Mirrored symmetries are
    /// skipped for the chiral pieces, whose mirror image is the other piece.
    pub fn set_statuses(&mut self, depth: usize, kind: PieceKind, check_symmetry: bool) {
        for cubicle in &mut self.cubicles {
            cubicle.status = match (cubicle.is_empty(), check_symmetry) {
                (false, _) => CubicleStatus::Occupied,
                (true, false) => CubicleStatus::Primary,
                (true, true) => CubicleStatus::Unset,
            };
        }

        if check_symmetry {
            let Shape {
                cubicles,
                components,
                ..
            } = self;
            for component in components.iter() {
                let current = component.signature(cubicles);
                let invariant: Vec<&Symmetry> = component.symmetries[1..]
                    .iter()
                    .filter(|symmetry| !(kind.is_chiral() && symmetry.transform.is_mirror()))
                    .filter(|symmetry| component.transformed_signature(cubicles, symmetry) == current)
                    .collect();
                mark_orbits(cubicles, &component.members, &invariant);
            }
        }

        let saved = &mut self.saved_statuses[depth];
        saved.clear();
        saved.extend(self.cubicles.iter().map(Cubicle::status));

        let counts = &mut self.status_counts[depth];
        for status in saved.iter() {
            match status {
                CubicleStatus::Primary => counts.primary += 1,
                CubicleStatus::Duplicate => counts.duplicate += 1,
                _ => {}
            }
        }
    }

    /// Reinstates the statuses saved when `depth` was entered.
    pub fn restore_statuses(&mut self, depth: usize) {
        for (cubicle, &status) in self.cubicles.iter_mut().zip(&self.saved_statuses[depth]) {
            cubicle.status = status;
        }
    }
}

/// Walks unset cubicles in canonical order: each becomes primary, and for
/// every symmetry the unset cubicle it maps onto the primary becomes a
/// duplicate.
fn mark_orbits(cubicles: &mut [Cubicle], members: &[usize], symmetries: &[&Symmetry]) {
    for primary in 0..members.len() {
        if cubicles[members[primary]].status != CubicleStatus::Unset {
            continue;
        }
        cubicles[members[primary]].status = CubicleStatus::Primary;

        for symmetry in symmetries {
            let image = (primary..members.len()).find(|&candidate| {
                symmetry.permutation[candidate] as usize == primary
                    && cubicles[members[candidate]].status == CubicleStatus::Unset
            });
            if let Some(candidate) = image {
                cubicles[members[candidate]].status = CubicleStatus::Duplicate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::tests::{fill, shape, CUBE};
    use crate::shape::StatusCounts;

    fn statuses(shape: &Shape) -> String {
        shape
            .cubicles()
            .iter()
            .map(|cubicle| match cubicle.status() {
                CubicleStatus::Unset => '?',
                CubicleStatus::Occupied => '#',
                CubicleStatus::Primary => 'P',
                CubicleStatus::Duplicate => '-',
            })
            .collect()
    }

    #[test]
    fn test_cube_group() {
        let cube = shape(CUBE);
        let group = cube.components()[0].symmetries();
        assert_eq!(group.len(), 48);
        assert_eq!(group[0].transform(), Transform::IDENTITY);
        assert_eq!(group.iter().filter(|s| s.transform().is_mirror()).count(), 24);
    }

    #[test]
    fn test_group_of_lopsided_figure() {
        // two full slabs under a staircase: only the diagonal mirror remains
        let figure = "\
oo.
o..
...

ooo
oo.
o..

ooo
ooo
ooo

ooo
ooo
ooo
";
        let stairs = shape(figure);
        let group = stairs.components()[0].symmetries();
        assert_eq!(group.len(), 2);
        assert_eq!(group[0].transform(), Transform::IDENTITY);
        assert_eq!(group[1].transform(), Transform::mirrored(5, Mirror::Z));
    }

    #[test]
    fn test_permutations_are_bijections() {
        let cube = shape(CUBE);
        for symmetry in cube.components()[0].symmetries() {
            let mut seen = symmetry.permutation().to_vec();
            seen.sort_unstable();
            assert_eq!(seen, (0..27).collect::<Vec<u8>>());
        }
    }

    #[test]
    fn test_statuses_without_symmetry() {
        let mut cube = shape(CUBE);
        fill(&mut cube, &[0, 1], 3);
        cube.set_statuses(0, PieceKind::Tee, false);
        assert_eq!(statuses(&cube), format!("##{}", "P".repeat(25)));
    }

    #[test]
    fn test_empty_cube_has_four_primary_cubicles() {
        let mut cube = shape(CUBE);
        cube.set_statuses(0, PieceKind::Tee, true);
        // a corner, an edge, a face center and the center
        insta::assert_snapshot!(statuses(&cube), @"PP--P--------P-------------");
        assert_eq!(
            cube.status_counts(0),
            StatusCounts {
                primary: 4,
                duplicate: 23
            }
        );
    }

    #[test]
    fn test_partial_occupancy_reduces_symmetry() {
        let mut cube = shape(CUBE);
        // with the top slice filled only the symmetries fixing Z remain
        fill(&mut cube, &(0..9).collect::<Vec<_>>(), 1);
        cube.set_statuses(1, PieceKind::Tee, true);
        insta::assert_snapshot!(statuses(&cube), @"#########PP--P----PP--P----");
    }

    #[test]
    fn test_restore_statuses() {
        let mut cube = shape(CUBE);
        cube.set_statuses(0, PieceKind::Tee, true);
        let first = statuses(&cube);

        fill(&mut cube, &[0, 1, 2], 7);
        cube.set_statuses(1, PieceKind::Tee, true);
        assert_ne!(statuses(&cube), first);

        fill(&mut cube, &[0, 1, 2], 0);
        cube.restore_statuses(0);
        assert_eq!(statuses(&cube), first);
    }
}
