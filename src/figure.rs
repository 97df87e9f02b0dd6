//! Figure file formats.
//!
//! The text format draws a figure as Z slices, top slice first, separated
//! by blank lines. Each slice is Y lines (top line = highest Y) of X
//! characters: `.` or space for no cubicle, a piece letter for a cubicle
//! holding that pre-placed piece, anything else (conventionally `o`) for a
//! free cubicle. `#` comments out the rest of a line.
//!
//! ```text
//! # the classic battleship
//! ....o....
//! .........
//!
//! ...ooo...
//! .........
//!
//! ..coooo..
//! .........
//!
//! occoooooo
//! oocoooooo
//! ```
//!
//! The coordinate-list format has one `x y z code` line per cubicle, code
//! being `o` or a piece letter.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashSet;

use crate::coord::Coord;
use crate::error::FigureError;
use crate::pieces::{PieceKind, EMPTY_NAME};
use crate::shape::{Shape, NUM_CUBICLES};

/// Letter for a free cubicle in coordinate lists.
pub const FREE_NAME: char = 'o';

const COMMENT: char = '#';

/// One cubicle as read from a figure description.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FigureCubicle {
    pub position: Coord,
    /// Piece pre-placed in this cubicle, if any.
    pub piece: Option<PieceKind>,
}

/// A parsed but not yet validated figure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FigureSpec {
    pub cubicles: Vec<FigureCubicle>,
}

impl FigureSpec {
    /// Builds a figure from positions and a string of piece letters, the
    /// `n`th letter applying to the `n`th position. `o` (or a missing
    /// letter) leaves the cubicle free.
    pub fn from_coordinates(positions: &[Coord], pieces: &str) -> Result<Self, FigureError> {
        let mut letters = pieces.chars();
        let cubicles = positions
            .iter()
            .enumerate()
            .map(|(index, &position)| -> Result<FigureCubicle, FigureError> {
                let piece = match letters.next() {
                    None | Some(FREE_NAME) => None,
                    Some(code) => Some(
                        PieceKind::from_name(code)
                            .ok_or(FigureError::BadPieceCode { line: index + 1, code })?,
                    ),
                };
                Ok(FigureCubicle { position, piece })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { cubicles })
    }

    /// Parses the coordinate-list format.
    pub fn parse_coordinate_list(text: &str) -> Result<Self, FigureError> {
        let mut cubicles = Vec::with_capacity(NUM_CUBICLES);

        for (number, line) in text.lines().enumerate() {
            let line_number = number + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            let malformed = || FigureError::MalformedLine {
                line: line_number,
                text: line.to_string(),
            };
            let [x, y, z, code] = fields[..] else {
                return Err(malformed());
            };
            let axis = |field: &str| field.parse::<i32>().map_err(|_| malformed());
            let position = Coord::new(axis(x)?, axis(y)?, axis(z)?);

            let mut chars = code.chars();
            let (Some(code), None) = (chars.next(), chars.next()) else {
                return Err(malformed());
            };
            let piece = match code {
                FREE_NAME => None,
                other => Some(PieceKind::from_name(other).ok_or(FigureError::BadPieceCode {
                    line: line_number,
                    code: other,
                })?),
            };
            cubicles.push(FigureCubicle { position, piece });
        }

        if cubicles.len() != NUM_CUBICLES {
            return Err(FigureError::CubicleCount {
                found: cubicles.len(),
                expected: NUM_CUBICLES,
            });
        }
        Ok(Self { cubicles })
    }

    /// Pieces with at least one pre-placed cubicle, in code order.
    pub fn pre_placed(&self) -> Vec<PieceKind> {
        PieceKind::ALL
            .into_iter()
            .filter(|&kind| self.cubicles.iter().any(|c| c.piece == Some(kind)))
            .collect()
    }

    /// Every pre-placed piece must cover exactly as many cubicles as it has
    /// cubes. Shapes are not checked.
    pub fn check_pre_placed(&self) -> Result<(), FigureError> {
        for kind in self.pre_placed() {
            let found = self
                .cubicles
                .iter()
                .filter(|c| c.piece == Some(kind))
                .count();
            if found != kind.size() {
                return Err(FigureError::PrePlacedCount {
                    name: kind.name(),
                    found,
                    expected: kind.size(),
                });
            }
        }
        Ok(())
    }
}

impl FromStr for FigureSpec {
    type Err = FigureError;

    /// Parses the text format. Requires exactly 27 cubicles.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        // (column, line within slice, slice, character)
        let mut raw: Vec<(i32, i32, i32, char)> = Vec::new();
        let mut line_in_slice = 0;
        let mut slice = 0;
        let mut max_line = 0;
        let mut started = false;
        let mut pending_slice = false;

        for (number, line) in text.lines().enumerate() {
            let content = match line.find(COMMENT) {
                Some(end) => &line[..end],
                None => line,
            };

            if content.chars().all(|c| c == ' ' || c == '\t') {
                if started {
                    line_in_slice = 0;
                    pending_slice = true;
                }
                continue;
            }
            started = true;
            if pending_slice {
                slice += 1;
                pending_slice = false;
            }

            for (column, c) in content.chars().enumerate() {
                match c {
                    '\t' => return Err(FigureError::TabCharacter { line: number + 1 }),
                    '.' | ' ' => {}
                    _ => raw.push((column as i32, line_in_slice, slice, c)),
                }
            }
            max_line = max_line.max(line_in_slice);
            line_in_slice += 1;
        }

        if raw.len() != NUM_CUBICLES {
            return Err(FigureError::CubicleCount {
                found: raw.len(),
                expected: NUM_CUBICLES,
            });
        }

        let cubicles = raw
            .into_iter()
            .map(|(x, line, layer, c)| FigureCubicle {
                position: Coord::new(x, max_line - line, slice - layer),
                piece: PieceKind::from_name(c),
            })
            .collect();
        Ok(Self { cubicles })
    }
}

/// A cubicle of a figure together with the piece filling it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SolvedCubicle {
    /// Doubled, centered position.
    pub position: Coord,
    pub piece: Option<PieceKind>,
}

/// Snapshot of a figure's occupancy, in canonical cubicle order.
///
/// `Display` writes the text format; a complete solution written this
/// way reads back as a fully pre-placed figure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Solution {
    maxes: Coord,
    cubicles: Vec<SolvedCubicle>,
}

impl Solution {
    pub fn from_shape(shape: &Shape) -> Self {
        Self {
            maxes: shape.maxes(),
            cubicles: shape
                .cubicles()
                .iter()
                .map(|cubicle| SolvedCubicle {
                    position: cubicle.position(),
                    piece: cubicle.piece(),
                })
                .collect(),
        }
    }

    pub fn cubicles(&self) -> &[SolvedCubicle] {
        &self.cubicles
    }

    pub fn is_complete(&self) -> bool {
        self.cubicles.iter().all(|c| c.piece.is_some())
    }

    /// `(x,y,z):c` per cubicle, one per line.
    pub fn coordinate_list(&self) -> String {
        self.cubicles
            .iter()
            .map(|c| format!("{}:{}\n", c.position, c.piece.map_or(EMPTY_NAME, PieceKind::name)))
            .collect()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: FxHashSet<i32> = self.cubicles.iter().map(|c| c.position.x).collect();
        let mut cubicles = self.cubicles.iter().peekable();
        let Coord { x: mx, y: my, z: mz } = self.maxes;

        for z in (-mz..=mz).rev().step_by(2) {
            if z != mz {
                writeln!(f)?;
            }
            for y in (-my..=my).rev().step_by(2) {
                for x in (-mx..=mx).step_by(2) {
                    let here = Coord::new(x, y, z);
                    match cubicles.next_if(|c| c.position == here) {
                        Some(c) => write!(f, "{}", c.piece.map_or(EMPTY_NAME, PieceKind::name))?,
                        None if columns.contains(&x) => write!(f, ".")?,
                        None => write!(f, " ")?,
                    }
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
