//! The 8-puzzle: slide tiles into the blank until the board reads
//! `1 2 3 / 4 5 6 / 7 8 -`.
//!
//! States are the nine cell characters in row-major order.

use crate::domains::{InstanceError, PuzzleInstance};
use crate::search::{Cost, SearchDomain, Successors};

pub const SIDE: usize = 3;
pub const CELLS: usize = SIDE * SIDE;
pub const BLANK: u8 = b'-';

/// The solved board.
pub const GOAL: [u8; CELLS] = *b"12345678-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EightPuzzle {
    board: [u8; CELLS],
}

impl EightPuzzle {
    pub fn new(board: [u8; CELLS]) -> Result<Self, InstanceError> {
        let mut sorted = board;
        sorted.sort_unstable();
        let mut expected = GOAL;
        expected.sort_unstable();
        if sorted != expected {
            return Err(InstanceError::Invalid(format!(
                "board {:?} is not a permutation of 1-8 and '-'",
                String::from_utf8_lossy(&board)
            )));
        }
        Ok(Self { board })
    }

    pub fn board(&self) -> &[u8; CELLS] {
        &self.board
    }
}

/// Sum of Manhattan distances of every tile to its goal cell.
pub fn manhattan(state: &[u8]) -> Cost {
    state
        .iter()
        .take(CELLS)
        .enumerate()
        .filter(|&(_, &tile)| (b'1'..=b'8').contains(&tile))
        .map(|(index, &tile)| {
            let target = usize::from(tile - b'1');
            let (row, col) = (index / SIDE, index % SIDE);
            let (goal_row, goal_col) = (target / SIDE, target % SIDE);
            (row.abs_diff(goal_row) + col.abs_diff(goal_col)) as Cost
        })
        .sum()
}

impl SearchDomain for EightPuzzle {
    fn state_size(&self) -> usize {
        CELLS
    }

    fn heuristic(&self, state: &[u8], _goal: Option<&[u8]>) -> Cost {
        manhattan(state)
    }

    fn expand(&self, state: &[u8], out: &mut Successors) {
        let Some(blank) = state.iter().position(|&c| c == BLANK) else {
            return;
        };
        let (row, col) = (blank / SIDE, blank % SIDE);

        let mut slide = |from: usize| {
            let mut next = [0u8; CELLS];
            next.copy_from_slice(state);
            next.swap(blank, from);
            out.push(&next);
        };
        if row > 0 {
            slide(blank - SIDE);
        }
        if row < SIDE - 1 {
            slide(blank + SIDE);
        }
        if col > 0 {
            slide(blank - 1);
        }
        if col < SIDE - 1 {
            slide(blank + 1);
        }
    }

    fn is_goal(&self, state: &[u8], _goal: Option<&[u8]>) -> bool {
        state == GOAL
    }
}

impl PuzzleInstance for EightPuzzle {
    const NAME: &'static str = "puzzle";

    /// Nine cells in row-major order, optionally separated by whitespace.
    fn parse(text: &str) -> Result<Self, InstanceError> {
        let cells: Vec<u8> = text
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        if cells.is_empty() {
            return Err(InstanceError::Empty);
        }
        let board: [u8; CELLS] = cells.as_slice().try_into().map_err(|_| {
            InstanceError::Invalid(format!("expected {} cells, found {}", CELLS, cells.len()))
        })?;
        if let Some(index) = board
            .iter()
            .position(|&c| c != BLANK && !(b'1'..=b'8').contains(&c))
        {
            return Err(InstanceError::InvalidCell {
                cell: char::from(board[index]),
                row: index / SIDE,
                col: index % SIDE,
            });
        }
        Self::new(board)
    }

    fn initial_state(&self) -> Vec<u8> {
        self.board.to_vec()
    }

    fn render(&self, state: &[u8]) -> String {
        state
            .chunks(SIDE)
            .map(|row| {
                row.iter()
                    .map(|&c| char::from(c).to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
            + "\n"
    }
}
