//! Duplicate detection: per-depth sets of occupancy signatures.
//!
//! When a partial (or complete) solution is accepted, its signature under
//! every symmetry of the figure is recorded for that depth. A later
//! placement whose signature is already recorded is a rotation or mirror
//! image of one already explored and is rejected.
//!
//! A figure with separated components can rotate each component on its
//! own, so the recorded signatures are every combination of the
//! components' transformed signatures. Mirroring one component swaps the
//! chiral pieces inside it only, so combinations that mirror some
//! components but not others are only recorded for complete solutions,
//! and only when they still hold exactly one of each chiral piece.

use super::{Component, Cubicle, Shape};
use crate::pieces::{PieceKind, NUM_PIECES};
use crate::signature::Signature;

/// One distinct transformed signature of a component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Variant {
    signature: Signature,
    mirrored: bool,
    /// Cubicles holding the first and the second chiral piece.
    chiral_cells: [usize; 2],
}

impl Component {
    fn variants(&self, cubicles: &[Cubicle]) -> Vec<Variant> {
        let mut variants: Vec<Variant> = Vec::with_capacity(self.symmetries.len());
        for symmetry in &self.symmetries {
            let signature = self.transformed_signature(cubicles, symmetry);
            let mut chiral_cells = [0; 2];
            for index in 0..self.len() {
                match PieceKind::from_code(signature.get(index)) {
                    Some(PieceKind::Pos) => chiral_cells[0] += 1,
                    Some(PieceKind::Neg) => chiral_cells[1] += 1,
                    _ => {}
                }
            }
            let variant = Variant {
                signature,
                mirrored: symmetry.transform().is_mirror(),
                chiral_cells,
            };
            if !variants.contains(&variant) {
                variants.push(variant);
            }
        }
        variants
    }
}

impl Shape {
    /// True if the current occupancy was recorded at `depth`.
    pub fn is_duplicate(&self, depth: usize) -> bool {
        self.solutions[depth].contains(&self.signature())
    }

    /// Records the current occupancy under every symmetry of the figure.
    pub fn add_solution(&mut self, depth: usize) {
        if let [component] = self.components.as_slice() {
            for symmetry in &component.symmetries {
                self.solutions[depth].insert(component.transformed_signature(&self.cubicles, symmetry));
            }
            return;
        }

        let complete = depth == NUM_PIECES - 1;
        let variants: Vec<Vec<Variant>> = self
            .components
            .iter()
            .map(|component| component.variants(&self.cubicles))
            .collect();
        let lengths: Vec<usize> = self.components.iter().map(Component::len).collect();
        let chiral_size = PieceKind::Pos.size();

        // odometer over one variant per component
        let mut choice = vec![0; variants.len()];
        loop {
            let mut signature = Signature::default();
            let mut offset = 0;
            let mut mirrored = 0;
            let mut chiral_cells = [0; 2];
            for ((options, &picked), &len) in variants.iter().zip(&choice).zip(&lengths) {
                let variant = &options[picked];
                signature.splice(offset, &variant.signature, len);
                offset += len;
                mirrored += usize::from(variant.mirrored);
                chiral_cells[0] += variant.chiral_cells[0];
                chiral_cells[1] += variant.chiral_cells[1];
            }

            let consistent = if complete {
                chiral_cells == [chiral_size; 2]
            } else {
                mirrored == 0 || mirrored == variants.len()
            };
            if consistent {
                self.solutions[depth].insert(signature);
            }

            let mut wheel = 0;
            loop {
                if wheel == choice.len() {
                    return;
                }
                choice[wheel] += 1;
                if choice[wheel] < variants[wheel].len() {
                    break;
                }
                choice[wheel] = 0;
                wheel += 1;
            }
        }
    }

    /// Forgets the signatures recorded at `depth`.
    pub fn clear_solutions(&mut self, depth: usize) {
        self.solutions[depth].clear();
    }

    /// Number of signatures recorded at `depth`.
    pub fn solution_count(&self, depth: usize) -> usize {
        self.solutions[depth].len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::tests::{fill, shape, CUBE};

    #[test]
    fn test_rotated_partial_is_duplicate() {
        let mut cube = shape(CUBE);
        // corner cubicle plus its x neighbor
        fill(&mut cube, &[0, 1], 7);
        assert!(!cube.is_duplicate(0));
        cube.add_solution(0);
        assert!(cube.is_duplicate(0));

        // the same pair at the opposite corner of the bottom slice
        fill(&mut cube, &[0, 1], 0);
        fill(&mut cube, &[26, 25], 7);
        assert!(cube.is_duplicate(0));

        // an edge pair is not equivalent to a corner pair
        fill(&mut cube, &[26, 25], 0);
        fill(&mut cube, &[1, 4], 7);
        assert!(!cube.is_duplicate(0));

        // other depths are unaffected
        fill(&mut cube, &[1, 4], 0);
        fill(&mut cube, &[0, 1], 7);
        assert!(!cube.is_duplicate(1));
    }

    #[test]
    fn test_mirror_swaps_chiral_pieces() {
        let mut cube = shape(CUBE);
        fill(&mut cube, &[0, 1], PieceKind::Pos.code());
        cube.add_solution(0);

        fill(&mut cube, &[0, 1], PieceKind::Neg.code());
        assert!(cube.is_duplicate(0));
    }

    #[test]
    fn test_cube_records_each_distinct_image_once() {
        let mut cube = shape(CUBE);
        fill(&mut cube, &[13], 1);
        cube.add_solution(0);
        // the center is fixed by every symmetry
        assert_eq!(cube.solution_count(0), 1);

        cube.clear_solutions(0);
        fill(&mut cube, &[13], 0);
        fill(&mut cube, &[0], 1);
        cube.add_solution(0);
        assert_eq!(cube.solution_count(0), 8);
    }

    const SEPARATED: &str = "\
oo.ooooo
oo.ooooo
...ooooo

oo.
oo.

oo.
oo.
";

    #[test]
    fn test_components_rotate_independently() {
        let mut figure = shape(SEPARATED);
        let block = figure.components()[0].members().to_vec();
        let slab = figure.components()[1].members().to_vec();

        fill(&mut figure, &[block[0]], 5);
        fill(&mut figure, &[slab[0]], 5);
        figure.add_solution(0);

        // move only the block's mark to its opposite corner
        fill(&mut figure, &[block[0]], 0);
        fill(&mut figure, &[block[block.len() - 1]], 5);
        assert!(figure.is_duplicate(0));
    }

    #[test]
    fn test_complete_solutions_keep_one_of_each_chiral_piece() {
        let mut figure = shape(SEPARATED);
        let block = figure.components()[0].members().to_vec();
        let slab = figure.components()[1].members().to_vec();

        // a mirrored copy of one component alone would hold two of the
        // same chiral piece and must not be recorded
        fill(&mut figure, &block[..4], PieceKind::Pos.code());
        fill(&mut figure, &slab[..4], PieceKind::Neg.code());
        figure.add_solution(NUM_PIECES - 1);

        fill(&mut figure, &block[..4], PieceKind::Neg.code());
        assert!(!figure.is_duplicate(NUM_PIECES - 1));

        fill(&mut figure, &slab[..4], PieceKind::Pos.code());
        assert!(figure.is_duplicate(NUM_PIECES - 1));
    }
}
