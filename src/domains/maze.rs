//! Grid maze: walk from the gate in the top row to the gate in the bottom
//! row.
//!
//! `.` cells are walkable, anything else is wall. The entry is `(col 1,
//! row 0)` and the exit `(cols - 2, rows - 1)`. A state is the walker's
//! position.

use crate::domains::{
    InstanceError, PuzzleInstance, decode_coord, encode_coord, grid_neighbors, grid_rows,
};
use crate::search::{Cost, SearchDomain, Successors};

pub const OPEN: u8 = b'.';
/// Marks the entry so the walker never steps back onto it.
pub const VISITED: u8 = b'c';
/// Marks path cells in a rendered solution.
pub const TRAIL: u8 = b'o';

const STATE_SIZE: usize = 4;

#[derive(Debug, Clone)]
pub struct Maze {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
    entry: (usize, usize),
    exit: (usize, usize),
}

impl Maze {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn entry(&self) -> (usize, usize) {
        self.entry
    }

    pub fn exit(&self) -> (usize, usize) {
        self.exit
    }

    pub fn encode(&self, col: usize, row: usize) -> Vec<u8> {
        let mut state = vec![0; STATE_SIZE];
        encode_coord(col, row, &mut state);
        state
    }

    fn cell(&self, col: usize, row: usize) -> u8 {
        self.cells[row * self.cols + col]
    }
}

impl SearchDomain for Maze {
    fn state_size(&self) -> usize {
        STATE_SIZE
    }

    fn heuristic(&self, state: &[u8], _goal: Option<&[u8]>) -> Cost {
        let (col, row) = decode_coord(state);
        (col.abs_diff(self.exit.0) + row.abs_diff(self.exit.1)) as Cost
    }

    fn expand(&self, state: &[u8], out: &mut Successors) {
        let (col, row) = decode_coord(state);
        let mut next = [0u8; STATE_SIZE];
        for (c, r) in grid_neighbors(col, row, self.cols, self.rows) {
            if self.cell(c, r) == OPEN {
                encode_coord(c, r, &mut next);
                out.push(&next);
            }
        }
    }

    fn is_goal(&self, state: &[u8], _goal: Option<&[u8]>) -> bool {
        decode_coord(state) == self.exit
    }
}

impl PuzzleInstance for Maze {
    const NAME: &'static str = "maze";

    fn parse(text: &str) -> Result<Self, InstanceError> {
        let grid = grid_rows(text)?;
        let (rows, cols) = (grid.len(), grid[0].len());
        if rows < 2 || cols < 3 {
            return Err(InstanceError::BoardSize { rows, cols });
        }

        let mut cells: Vec<u8> = grid.concat();
        let entry = (1, 0);
        let exit = (cols - 2, rows - 1);
        if cells[exit.1 * cols + exit.0] != OPEN {
            return Err(InstanceError::Invalid(format!(
                "exit cell ({}, {}) is not walkable",
                exit.0, exit.1
            )));
        }
        cells[entry.0] = VISITED;

        Ok(Self {
            rows,
            cols,
            cells,
            entry,
            exit,
        })
    }

    fn initial_state(&self) -> Vec<u8> {
        self.encode(self.entry.0, self.entry.1)
    }

    fn render(&self, state: &[u8]) -> String {
        let (col, row) = decode_coord(state);
        format!("({}, {})\n", col, row)
    }

    /// The maze with every cell on the path marked.
    fn render_solution(&self, path: &[Vec<u8>]) -> String {
        let mut cells = self.cells.clone();
        cells[self.entry.1 * self.cols + self.entry.0] = OPEN;
        for state in path {
            let (col, row) = decode_coord(state);
            cells[row * self.cols + col] = TRAIL;
        }
        cells
            .chunks(self.cols)
            .map(|row| String::from_utf8_lossy(row).into_owned() + "\n")
            .collect()
    }
}
