//! Number Link: connect each pair of equal letters with a path of cells.
//!
//! The board holds letter pairs `A..Z` on `.` empty cells. Each pair grows a
//! path from its first occurrence (row-major) towards the second. A state is
//! the board with claimed cells marked by the pair's lowercase letter,
//! followed by every pair's current head and the number of connected pairs.

use crate::domains::{
    InstanceError, PuzzleInstance, decode_coord, encode_coord, grid_neighbors, grid_rows,
};
use crate::search::{Cost, SearchDomain, Successors};

pub const EMPTY: u8 = b'.';
const COORD_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    pub letter: u8,
    pub start: (usize, usize),
    pub end: (usize, usize),
}

#[derive(Debug, Clone)]
pub struct NumberLink {
    rows: usize,
    cols: usize,
    board: Vec<u8>,
    pairs: Vec<Pair>,
}

impl NumberLink {
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    fn board_len(&self) -> usize {
        self.rows * self.cols
    }

    fn head_offset(&self, pair: usize) -> usize {
        self.board_len() + pair * COORD_SIZE
    }

    fn head(&self, state: &[u8], pair: usize) -> (usize, usize) {
        decode_coord(&state[self.head_offset(pair)..])
    }

    fn matched(&self, state: &[u8]) -> usize {
        usize::from(state[self.state_size() - 1])
    }
}

impl SearchDomain for NumberLink {
    fn state_size(&self) -> usize {
        self.board_len() + self.pairs.len() * COORD_SIZE + 1
    }

    fn heuristic(&self, state: &[u8], _goal: Option<&[u8]>) -> Cost {
        self.pairs
            .iter()
            .enumerate()
            .map(|(i, pair)| {
                let (col, row) = self.head(state, i);
                (col.abs_diff(pair.end.0) + row.abs_diff(pair.end.1)) as Cost
            })
            .sum()
    }

    fn expand(&self, state: &[u8], out: &mut Successors) {
        let matched_at = self.state_size() - 1;
        let mut next = state.to_vec();

        for (i, pair) in self.pairs.iter().enumerate() {
            let head = self.head(state, i);
            if head == pair.end {
                continue;
            }
            for (col, row) in grid_neighbors(head.0, head.1, self.cols, self.rows) {
                next.copy_from_slice(state);
                let offset = self.head_offset(i);
                encode_coord(col, row, &mut next[offset..offset + COORD_SIZE]);

                if (col, row) == pair.end {
                    next[matched_at] = next[matched_at].saturating_add(1);
                } else {
                    let index = row * self.cols + col;
                    if state[index] != EMPTY {
                        continue;
                    }
                    next[index] = pair.letter.to_ascii_lowercase();
                }
                out.push(&next);
            }
        }
    }

    fn is_goal(&self, state: &[u8], _goal: Option<&[u8]>) -> bool {
        self.matched(state) == self.pairs.len()
    }
}

impl PuzzleInstance for NumberLink {
    const NAME: &'static str = "numberlink";

    fn parse(text: &str) -> Result<Self, InstanceError> {
        let grid = grid_rows(text)?;
        let (rows, cols) = (grid.len(), grid[0].len());

        let mut found: [Vec<(usize, usize)>; 26] = Default::default();
        for (row, cells) in grid.iter().enumerate() {
            for (col, &cell) in cells.iter().enumerate() {
                match cell {
                    EMPTY => {}
                    b'A'..=b'Z' => found[usize::from(cell - b'A')].push((col, row)),
                    _ => {
                        return Err(InstanceError::InvalidCell {
                            cell: char::from(cell),
                            row,
                            col,
                        });
                    }
                }
            }
        }

        let mut pairs = Vec::new();
        for (letter, cells) in (b'A'..=b'Z').zip(found.iter()) {
            match cells.as_slice() {
                [] => {}
                &[start, end] => pairs.push(Pair { letter, start, end }),
                _ => {
                    return Err(InstanceError::Invalid(format!(
                        "letter {} appears {} times, expected exactly 2",
                        char::from(letter),
                        cells.len()
                    )));
                }
            }
        }
        if pairs.is_empty() {
            return Err(InstanceError::Invalid("board has no letter pairs".to_string()));
        }

        Ok(Self {
            rows,
            cols,
            board: grid.concat(),
            pairs,
        })
    }

    fn initial_state(&self) -> Vec<u8> {
        let mut state = vec![0; self.state_size()];
        state[..self.board_len()].copy_from_slice(&self.board);
        for (i, pair) in self.pairs.iter().enumerate() {
            let offset = self.head_offset(i);
            encode_coord(
                pair.start.0,
                pair.start.1,
                &mut state[offset..offset + COORD_SIZE],
            );
        }
        state
    }

    fn render(&self, state: &[u8]) -> String {
        state[..self.board_len()]
            .chunks(self.cols)
            .map(|row| String::from_utf8_lossy(row).into_owned() + "\n")
            .collect()
    }

    /// The final board, where every connected path is drawn.
    fn render_solution(&self, path: &[Vec<u8>]) -> String {
        path.last().map(|state| self.render(state)).unwrap_or_default()
    }
}
