//! Error types for figure loading and solver configuration.

use thiserror::Error;

use crate::coord::Coord;

/// A figure that cannot be loaded. The solver's previous state is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FigureError {
    #[error("illegal tab character in line {line}")]
    TabCharacter { line: usize },

    #[error("bad number of cubicles: {found} instead of {expected}")]
    CubicleCount { found: usize, expected: usize },

    #[error("figure spans more than {limit} cubicles along an axis")]
    FigureTooLarge { limit: i32 },

    #[error("duplicate cubicle at {0}")]
    DuplicatePosition(Coord),

    #[error("has separated part with unsolvable number of cubicles ({size})")]
    UnsolvableComponent { size: usize },

    #[error("unsolvable one- or zero-dimensional shape or part of shape")]
    DegenerateComponent,

    #[error("pre-placed piece '{name}' has {found} cubes instead of correct {expected}")]
    PrePlacedCount {
        name: char,
        found: usize,
        expected: usize,
    },

    #[error("bad piece code {code:?} in line {line}")]
    BadPieceCode { line: usize, code: char },

    #[error("malformed coordinate line {line}: {text:?}")]
    MalformedLine { line: usize, text: String },
}

/// Invalid solver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("piece order must have exactly {expected} characters, got {found}")]
    PieceOrderLength { found: usize, expected: usize },

    #[error("piece order must contain each of \"cpnztl3\" exactly once ('{letter}')")]
    PieceOrderLetter { letter: char },

    #[error("bad step number '{digit}', must be 1 through 7 (or 0 for none)")]
    BadStep { digit: char },

    #[error("too many step numbers ({count}, at most {limit})")]
    TooManySteps { count: usize, limit: usize },

    #[error("empty step list, use 0 for none")]
    EmptySteps,
}

/// Any error surfaced by the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Figure(#[from] FigureError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = FigureError::CubicleCount {
            found: 26,
            expected: 27,
        };
        assert_eq!(err.to_string(), "bad number of cubicles: 26 instead of 27");

        let err = FigureError::PrePlacedCount {
            name: 'z',
            found: 3,
            expected: 4,
        };
        assert_eq!(
            err.to_string(),
            "pre-placed piece 'z' has 3 cubes instead of correct 4"
        );
    }

    #[test]
    fn test_umbrella_conversion() {
        let err: Error = ConfigError::BadStep { digit: '9' }.into();
        assert!(matches!(err, Error::Config(ConfigError::BadStep { digit: '9' })));
        assert_eq!(
            err.to_string(),
            "bad step number '9', must be 1 through 7 (or 0 for none)"
        );
    }
}
