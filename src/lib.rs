//! Soma Cube Solver Library
//!
//! Finds the ways the seven Soma pieces fill a 27-cubicle figure, one
//! solution at a time, optionally skipping rotated and mirrored copies of
//! solutions already found.

pub mod config;
pub mod coord;
pub mod error;
pub mod figure;
pub mod geometry;
pub mod pieces;
pub mod shape;
pub mod signature;
pub mod solver;

pub use config::{PieceOrder, SolverConfig, StepMask};
pub use coord::Coord;
pub use error::{ConfigError, Error, FigureError, Result};
pub use figure::{FigureSpec, Solution};
pub use pieces::PieceKind;
pub use solver::{DepthStatistics, Soma};
