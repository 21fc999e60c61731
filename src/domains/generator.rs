//! Random instance generators.

use crate::domains::maze::OPEN;
use crate::domains::puzzle::{BLANK, CELLS, GOAL, SIDE};
use rand::Rng;

const WALL: u8 = b'X';

/// Shuffle the solved 8-puzzle with `moves` random blank moves, so the result
/// is always solvable. Returns the board in instance-file format.
pub fn generate_puzzle<R: Rng>(moves: usize, rng: &mut R) -> String {
    let mut board = GOAL;
    let mut blank = CELLS - 1;

    for _ in 0..moves {
        let mut options = [0usize; 4];
        let mut count = 0;
        if blank >= SIDE {
            options[count] = blank - SIDE;
            count += 1;
        }
        if blank < CELLS - SIDE {
            options[count] = blank + SIDE;
            count += 1;
        }
        if blank % SIDE != 0 {
            options[count] = blank - 1;
            count += 1;
        }
        if blank % SIDE != SIDE - 1 {
            options[count] = blank + 1;
            count += 1;
        }
        let target = options[rng.random_range(0..count)];
        board.swap(blank, target);
        blank = target;
    }
    debug_assert_eq!(board[blank], BLANK);

    let cells: Vec<String> = board.iter().map(|&c| char::from(c).to_string()).collect();
    cells.join(" ") + "\n"
}

/// Options for [`generate_maze`].
#[derive(Debug, Clone)]
pub struct MazeOptions {
    /// Rooms per row.
    pub width: usize,
    /// Rooms per column.
    pub height: usize,
    /// Extra walls to knock down after carving, creating loops.
    pub remove_walls: usize,
}

impl Default for MazeOptions {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            remove_walls: 0,
        }
    }
}

impl MazeOptions {
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn with_remove_walls(mut self, walls: usize) -> Self {
        self.remove_walls = walls;
        self
    }
}

/// Carve a perfect maze with a randomised depth-first walk over a grid of
/// rooms, then open the gates at `(1, 0)` and `(cols - 2, rows - 1)`.
///
/// The text grid is `2 * width + 1` columns by `2 * height + 1` rows; rooms
/// sit at odd coordinates.
pub fn generate_maze<R: Rng>(options: &MazeOptions, rng: &mut R) -> String {
    let (width, height) = (options.width.max(1), options.height.max(1));
    let (cols, rows) = (2 * width + 1, 2 * height + 1);
    let mut grid = vec![WALL; rows * cols];
    let mut visited = vec![false; width * height];

    let room = |x: usize, y: usize| (2 * y + 1) * cols + 2 * x + 1;

    let start = (rng.random_range(0..width), rng.random_range(0..height));
    visited[start.1 * width + start.0] = true;
    grid[room(start.0, start.1)] = OPEN;
    let mut stack = vec![start];

    while let Some(&(x, y)) = stack.last() {
        let mut options_buf = [(0usize, 0usize); 4];
        let mut count = 0;
        let candidates = [
            (y > 0).then(|| (x, y - 1)),
            (y + 1 < height).then(|| (x, y + 1)),
            (x > 0).then(|| (x - 1, y)),
            (x + 1 < width).then(|| (x + 1, y)),
        ];
        for (nx, ny) in candidates.into_iter().flatten() {
            if !visited[ny * width + nx] {
                options_buf[count] = (nx, ny);
                count += 1;
            }
        }
        if count == 0 {
            stack.pop();
            continue;
        }

        let (nx, ny) = options_buf[rng.random_range(0..count)];
        visited[ny * width + nx] = true;
        // the wall between two rooms sits halfway between them
        let wall = (room(x, y) + room(nx, ny)) / 2;
        grid[wall] = OPEN;
        grid[room(nx, ny)] = OPEN;
        stack.push((nx, ny));
    }

    remove_walls(&mut grid, cols, rows, options.remove_walls, rng);

    grid[1] = OPEN;
    grid[(rows - 1) * cols + cols - 2] = OPEN;

    grid.chunks(cols)
        .map(|row| String::from_utf8_lossy(row).into_owned() + "\n")
        .collect()
}

/// Knock down up to `count` interior walls that separate two rooms.
fn remove_walls<R: Rng>(grid: &mut [u8], cols: usize, rows: usize, count: usize, rng: &mut R) {
    let mut candidates: Vec<usize> = (1..rows - 1)
        .flat_map(|row| (1..cols - 1).map(move |col| (row, col)))
        .filter(|&(row, col)| (row % 2 == 1) != (col % 2 == 1))
        .map(|(row, col)| row * cols + col)
        .filter(|&index| grid[index] == WALL)
        .collect();

    for _ in 0..count.min(candidates.len()) {
        let pick = rng.random_range(0..candidates.len());
        let index = candidates.swap_remove(pick);
        grid[index] = OPEN;
    }
}
