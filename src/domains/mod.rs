//! Puzzle domains that plug into the search engines.
//!
//! Each domain parses an instance file into a [`PuzzleInstance`], which is
//! also the [`SearchDomain`] the engines search over.

pub mod generator;
pub mod maze;
pub mod numberlink;
pub mod puzzle;

pub use maze::Maze;
pub use numberlink::NumberLink;
pub use puzzle::EightPuzzle;

use crate::search::SearchDomain;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a puzzle instance.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("instance is empty")]
    Empty,

    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid cell '{cell}' at row {row}, column {col}")]
    InvalidCell { cell: char, row: usize, col: usize },

    #[error("board {rows}x{cols} is outside the supported size")]
    BoardSize { rows: usize, cols: usize },

    #[error("{0}")]
    Invalid(String),
}

/// A parsed puzzle instance.
pub trait PuzzleInstance: SearchDomain + Sized {
    /// Short name used on the command line.
    const NAME: &'static str;

    fn parse(text: &str) -> Result<Self, InstanceError>;

    /// Payload of the state the search starts from.
    fn initial_state(&self) -> Vec<u8>;

    /// Explicit goal payload, for domains whose goal is not implicit.
    fn goal_state(&self) -> Option<Vec<u8>> {
        None
    }

    /// Human-readable rendering of one state.
    fn render(&self, state: &[u8]) -> String;

    /// Human-readable rendering of a solution path.
    fn render_solution(&self, path: &[Vec<u8>]) -> String {
        path.iter()
            .map(|state| self.render(state))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn load(path: &Path) -> Result<Self, InstanceError> {
        let text = fs::read_to_string(path).map_err(|source| InstanceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }
}

/// Split grid text into rows of equal width, dropping line endings and
/// trailing blank lines.
pub(crate) fn grid_rows(text: &str) -> Result<Vec<&[u8]>, InstanceError> {
    let mut rows: Vec<&[u8]> = text
        .lines()
        .map(|line| line.trim_end_matches('\r').as_bytes())
        .collect();
    while rows.last().is_some_and(|row| row.is_empty()) {
        rows.pop();
    }
    let Some(first) = rows.first() else {
        return Err(InstanceError::Empty);
    };
    let expected = first.len();
    for (row, cells) in rows.iter().enumerate() {
        if cells.len() != expected {
            return Err(InstanceError::RaggedRow {
                row,
                expected,
                actual: cells.len(),
            });
        }
    }
    if expected == 0 || rows.len() > usize::from(u16::MAX) || expected > usize::from(u16::MAX) {
        return Err(InstanceError::BoardSize {
            rows: rows.len(),
            cols: expected,
        });
    }
    Ok(rows)
}

/// Grid coordinate `(col, row)` encoded as two little-endian `u16`.
pub(crate) fn encode_coord(col: usize, row: usize, out: &mut [u8]) {
    out[0..2].copy_from_slice(&(col as u16).to_le_bytes());
    out[2..4].copy_from_slice(&(row as u16).to_le_bytes());
}

pub(crate) fn decode_coord(bytes: &[u8]) -> (usize, usize) {
    let col = u16::from_le_bytes([bytes[0], bytes[1]]);
    let row = u16::from_le_bytes([bytes[2], bytes[3]]);
    (usize::from(col), usize::from(row))
}

/// Neighbours of `(col, row)` in the order down, up, left, right.
pub(crate) fn grid_neighbors(
    col: usize,
    row: usize,
    cols: usize,
    rows: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let down = (row + 1 < rows).then(|| (col, row + 1));
    let up = row.checked_sub(1).map(|r| (col, r));
    let left = col.checked_sub(1).map(|c| (c, row));
    let right = (col + 1 < cols).then(|| (col + 1, row));
    [down, up, left, right].into_iter().flatten()
}
