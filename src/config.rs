//! Solver configuration: per-depth optimization masks and piece order.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::pieces::{PieceKind, NUM_PIECES};

/// Set of search depths (0-based) at which an optimization runs.
///
/// Parsed from and displayed as 1-based step digits, e.g. `"17"` for the
/// first and last piece, or `"0"` for none.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StepMask(u8);

impl StepMask {
    pub const NONE: StepMask = StepMask(0);
    pub const ALL: StepMask = StepMask((1 << NUM_PIECES) - 1);

    pub const fn from_bits(bits: u8) -> Self {
        StepMask(bits & Self::ALL.0)
    }

    #[inline]
    pub const fn contains(self, depth: usize) -> bool {
        depth < NUM_PIECES && self.0 & (1 << depth) != 0
    }

    pub const fn with(self, depth: usize) -> Self {
        Self::from_bits(self.0 | (1 << depth))
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Depths in ascending order.
    pub fn depths(self) -> impl Iterator<Item = usize> {
        (0..NUM_PIECES).filter(move |&depth| self.contains(depth))
    }
}

impl FromStr for StepMask {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "0" {
            return Ok(StepMask::NONE);
        }
        if s.is_empty() {
            return Err(ConfigError::EmptySteps);
        }

        let mut mask = StepMask::NONE;
        for (count, digit) in s.chars().enumerate() {
            if count >= NUM_PIECES {
                return Err(ConfigError::TooManySteps {
                    count: s.chars().count(),
                    limit: NUM_PIECES,
                });
            }
            match digit.to_digit(10) {
                Some(step @ 1..=7) => mask = mask.with(step as usize - 1),
                _ => return Err(ConfigError::BadStep { digit }),
            }
        }
        Ok(mask)
    }
}

impl fmt::Display for StepMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "0");
        }
        for depth in self.depths() {
            write!(f, "{}", depth + 1)?;
        }
        Ok(())
    }
}

/// Order in which the search places the seven pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PieceOrder([PieceKind; NUM_PIECES]);

impl PieceOrder {
    /// Default order, best on a large set of figures.
    pub const DEFAULT: PieceOrder = PieceOrder([
        PieceKind::Zee,
        PieceKind::Tee,
        PieceKind::Corner,
        PieceKind::Pos,
        PieceKind::Neg,
        PieceKind::Ell,
        PieceKind::Three,
    ]);

    pub fn kinds(&self) -> &[PieceKind; NUM_PIECES] {
        &self.0
    }

    /// Search depth of `kind`.
    pub fn depth_of(&self, kind: PieceKind) -> usize {
        self.0.iter().position(|&k| k == kind).unwrap_or(NUM_PIECES)
    }
}

impl Default for PieceOrder {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for PieceOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let letters: Vec<char> = s.chars().collect();
        if letters.len() != NUM_PIECES {
            return Err(ConfigError::PieceOrderLength {
                found: letters.len(),
                expected: NUM_PIECES,
            });
        }

        let mut order = [PieceKind::Corner; NUM_PIECES];
        let mut seen = [false; NUM_PIECES];
        for (slot, &letter) in order.iter_mut().zip(&letters) {
            let kind =
                PieceKind::from_name(letter).ok_or(ConfigError::PieceOrderLetter { letter })?;
            let index = kind.code() as usize - 1;
            if seen[index] {
                return Err(ConfigError::PieceOrderLetter { letter });
            }
            seen[index] = true;
            *slot = kind;
        }
        Ok(PieceOrder(order))
    }
}

impl fmt::Display for PieceOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for kind in self.0 {
            write!(f, "{}", kind.name())?;
        }
        Ok(())
    }
}

/// Search options, applied to each figure at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    /// Depths after which an orphan check runs.
    pub orphans: StepMask,
    /// Depths after which a duplicate check runs. Depth 6 checks complete
    /// solutions.
    pub duplicates: StepMask,
    /// Depths before which symmetric cubicles are excluded.
    pub symmetries: StepMask,
    pub piece_order: PieceOrder,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            orphans: StepMask::from_bits(0b011_1111),
            duplicates: StepMask::from_bits(0b100_0001),
            symmetries: StepMask::NONE,
            piece_order: PieceOrder::DEFAULT,
        }
    }
}

impl SolverConfig {
    /// Reports every solution, rotated and mirrored copies included.
    pub fn with_all_rotations(self) -> Self {
        Self {
            duplicates: StepMask::NONE,
            symmetries: StepMask::NONE,
            ..self
        }
    }

    /// Describes combinations that are accepted but can miss solutions or
    /// report wrong counts. Only meaningful when enumerating all solutions.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let last = NUM_PIECES - 1;

        if !self.duplicates.is_empty() && !self.duplicates.contains(last) {
            warnings.push(format!(
                "no piece {} in duplicate steps \"{}\", it will be added for separated figures",
                NUM_PIECES, self.duplicates
            ));
            if (0..last).any(|depth| !self.duplicates.contains(depth)) {
                warnings.push(format!(
                    "neither piece {} nor all of 1-{} in duplicate steps \"{}\", \
                     possible failed or incorrect number of solutions",
                    NUM_PIECES, last, self.duplicates
                ));
            }
        }

        let moving_center: String = self
            .symmetries
            .depths()
            .map(|depth| self.piece_order.kinds()[depth])
            .filter(|kind| {
                matches!(
                    kind,
                    PieceKind::Pos | PieceKind::Neg | PieceKind::Zee | PieceKind::Ell
                )
            })
            .map(PieceKind::name)
            .collect();
        if !moving_center.is_empty() {
            warnings.push(format!(
                "one or more of \"{}\" in piece order \"{}\" match symmetry steps \"{}\", \
                 possible failed or incorrect number of solutions",
                moving_center, self.piece_order, self.symmetries
            ));
        }

        let pos = self.piece_order.depth_of(PieceKind::Pos);
        let neg = self.piece_order.depth_of(PieceKind::Neg);
        let checks_pair = (0..last).any(|depth| self.duplicates.contains(depth));
        if checks_pair && pos + 1 != neg {
            warnings.push(format!(
                "piece order \"{}\" does not have 'n' directly after 'p', \
                 incorrect number of solutions possible with duplicate steps \"{}\"",
                self.piece_order, self.duplicates
            ));
        }

        warnings
    }
}
