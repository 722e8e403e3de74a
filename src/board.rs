use crate::grid::{Adjacency, GridLayout, MAX_GRID_WIDTH};
use std::fmt;

/// A parsed game board: a sequence of tiles with letter and word multipliers,
/// and an adjacency relation between tile positions.
///
/// A board is parsed from a description string:
/// * an uppercase letter or `?` starts a new tile,
/// * `.` starts a new empty tile (a hole in an irregular grid),
/// * a lowercase letter extends the current tile (digraphs like `Qu`),
/// * `:` increments the letter multiplier and `;` the word multiplier for
///   the next tile (both reset to 1 once applied),
/// * anything else is ignored.
///
/// Tiles are connected by mapping them onto the grid's enabled cells in
/// row-major order. Parsing never fails: a description without tile tokens
/// yields an empty board.
///
/// ## Examples
/// ```
/// use wordgrid_solver::Board;
///
/// let board = Board::parse("C:AT", None);
/// assert_eq!(board.size(), 3);
/// assert_eq!(board.tile(1), "A");
/// assert_eq!(board.letter_mult(1), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Board {
    letters: String,
    tiles: Vec<String>,
    letter_mult: Vec<u8>,
    word_mult: Vec<u8>,
    /// Row-major `size * size` matrix; `None` means fully connected.
    adjacency: Option<Vec<bool>>,
}

impl Board {
    /// Parse a board description, connecting tiles according to `grid`.
    /// Without a grid every tile is adjacent to every other tile.
    pub fn parse(letters: &str, grid: Option<&GridLayout>) -> Board {
        let mut board = Board {
            letters: String::from(letters),
            tiles: Vec::new(),
            letter_mult: Vec::new(),
            word_mult: Vec::new(),
            adjacency: None,
        };
        board.parse_tiles();
        board.build_adjacency(grid);
        board
    }

    fn parse_tiles(&mut self) {
        let mut letter_multiplier: u8 = 1;
        let mut word_multiplier: u8 = 1;

        let letters = std::mem::take(&mut self.letters);
        for c in letters.chars() {
            match c {
                ':' => letter_multiplier = letter_multiplier.saturating_add(1),
                ';' => word_multiplier = word_multiplier.saturating_add(1),
                'a'..='z' => {
                    if let Some(tile) = self.tiles.last_mut() {
                        tile.push(c);
                    }
                }
                'A'..='Z' | '?' => {
                    self.letter_mult.push(letter_multiplier);
                    self.word_mult.push(word_multiplier);
                    letter_multiplier = 1;
                    word_multiplier = 1;
                    self.tiles.push(String::from(c));
                }
                '.' => {
                    self.letter_mult.push(letter_multiplier);
                    self.word_mult.push(word_multiplier);
                    letter_multiplier = 1;
                    word_multiplier = 1;
                    self.tiles.push(String::new());
                }
                _ => {}
            }
        }
        self.letters = letters;
    }

    /// Build the tile adjacency matrix by mapping tiles onto the grid's
    /// enabled cells in row-major order. Tiles past the last enabled cell
    /// get no adjacency entries.
    fn build_adjacency(&mut self, grid: Option<&GridLayout>) {
        let grid = match grid {
            Some(g) if g.adjacency() != Adjacency::Full => g,
            _ => return,
        };
        let size = self.size();
        let diagonal = grid.adjacency() == Adjacency::Diagonal;

        // cell -> tile index, row-major over enabled cells
        let mut cell_tile = [[usize::MAX; MAX_GRID_WIDTH]; MAX_GRID_WIDTH];
        let mut pos = 0;
        for row in 0..MAX_GRID_WIDTH {
            for col in 0..MAX_GRID_WIDTH {
                if grid.is_cell_set(row, col) && pos < size {
                    cell_tile[row][col] = pos;
                    pos += 1;
                }
            }
        }

        let mut matrix = vec![false; size * size];
        for row in 0..MAX_GRID_WIDTH {
            for col in 0..MAX_GRID_WIDTH {
                let pos = cell_tile[row][col];
                if pos == usize::MAX {
                    continue;
                }
                let offsets: &[(isize, isize)] = if diagonal {
                    &[
                        (-1, -1),
                        (-1, 0),
                        (-1, 1),
                        (0, -1),
                        (0, 1),
                        (1, -1),
                        (1, 0),
                        (1, 1),
                    ]
                } else {
                    &[(-1, 0), (1, 0), (0, -1), (0, 1)]
                };
                for &(dr, dc) in offsets {
                    let r = row as isize + dr;
                    let c = col as isize + dc;
                    if r < 0 || c < 0 || r >= MAX_GRID_WIDTH as isize || c >= MAX_GRID_WIDTH as isize
                    {
                        continue;
                    }
                    let neighbour = cell_tile[r as usize][c as usize];
                    if neighbour != usize::MAX {
                        matrix[pos * size + neighbour] = true;
                    }
                }
            }
        }
        self.adjacency = Some(matrix);
    }

    /// The number of tiles on the board, holes included.
    pub fn size(&self) -> usize {
        self.tiles.len()
    }

    /// The letters of tile `i`. Empty for a hole.
    pub fn tile(&self, i: usize) -> &str {
        &self.tiles[i]
    }

    pub fn letter_mult(&self, i: usize) -> u8 {
        self.letter_mult[i]
    }

    pub fn word_mult(&self, i: usize) -> u8 {
        self.word_mult[i]
    }

    /// Are tiles `i` and `j` neighbours?
    pub fn is_adjacent(&self, i: usize, j: usize) -> bool {
        match &self.adjacency {
            Some(matrix) => matrix[i * self.size() + j],
            None => true,
        }
    }

    /// The original board description string.
    pub fn letters(&self) -> &str {
        &self.letters
    }

    /// Re-emit tile `i` as description grammar text: multiplier markers,
    /// then the tile letters, or `.` for a hole.
    pub fn tile_token(&self, i: usize) -> String {
        let mut token = String::new();
        for _ in 1..self.letter_mult[i] {
            token.push(':');
        }
        for _ in 1..self.word_mult[i] {
            token.push(';');
        }
        if self.tiles[i].is_empty() {
            token.push('.');
        } else {
            token.push_str(&self.tiles[i]);
        }
        token
    }
}

/// Display the board as a canonical description string.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for i in 0..self.size() {
            write!(f, "{}", self.tile_token(i))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_4x4(adjacency: Adjacency) -> GridLayout {
        let mut grid = GridLayout::new(adjacency);
        for x in 0..4 {
            for y in 0..4 {
                grid.set_cell(x, y);
            }
        }
        grid
    }

    #[test]
    fn test_parse_tiles() {
        let board = Board::parse("CAT", None);
        assert_eq!(board.size(), 3);
        assert_eq!(board.tile(0), "C");
        assert_eq!(board.tile(2), "T");
        assert_eq!(board.letter_mult(0), 1);
        assert_eq!(board.word_mult(0), 1);
    }

    #[test]
    fn test_parse_digraph() {
        let board = Board::parse("QuIT", None);
        assert_eq!(board.size(), 3);
        assert_eq!(board.tile(0), "Qu");
        assert_eq!(board.tile(1), "I");
    }

    #[test]
    fn test_parse_multipliers() {
        let board = Board::parse(":A;;BC", None);
        assert_eq!(board.letter_mult(0), 2);
        assert_eq!(board.word_mult(0), 1);
        assert_eq!(board.word_mult(1), 3);
        // multipliers reset after being applied
        assert_eq!(board.letter_mult(2), 1);
        assert_eq!(board.word_mult(2), 1);
    }

    #[test]
    fn test_parse_holes_and_junk() {
        let board = Board::parse("A.b?X 1-#", None);
        // "b" extends the hole tile, junk is ignored
        assert_eq!(board.size(), 4);
        assert_eq!(board.tile(0), "A");
        assert_eq!(board.tile(1), "b");
        assert_eq!(board.tile(2), "?");
        assert_eq!(board.tile(3), "X");
    }

    #[test]
    fn test_parse_leading_lowercase() {
        // a lowercase letter with no tile to extend is dropped
        let board = Board::parse("aB", None);
        assert_eq!(board.size(), 1);
        assert_eq!(board.tile(0), "B");
    }

    #[test]
    fn test_straight_adjacency() {
        let grid = grid_4x4(Adjacency::Straight);
        let board = Board::parse("ABCDEFGHIJKLMNOP", Some(&grid));
        // tile 0 is at (0,0): right and down neighbours only
        assert!(board.is_adjacent(0, 1));
        assert!(board.is_adjacent(0, 4));
        assert!(!board.is_adjacent(0, 5));
        assert!(!board.is_adjacent(0, 2));
        // symmetric, irreflexive
        assert!(board.is_adjacent(1, 0));
        assert!(!board.is_adjacent(0, 0));
    }

    #[test]
    fn test_diagonal_adjacency() {
        let grid = grid_4x4(Adjacency::Diagonal);
        let board = Board::parse("ABCDEFGHIJKLMNOP", Some(&grid));
        assert!(board.is_adjacent(0, 5));
        assert!(board.is_adjacent(5, 0));
        assert!(board.is_adjacent(5, 10));
        assert!(!board.is_adjacent(0, 10));
    }

    #[test]
    fn test_full_adjacency() {
        let grid = grid_4x4(Adjacency::Full);
        let board = Board::parse("ABCD", Some(&grid));
        assert!(board.is_adjacent(0, 3));
        assert!(board.is_adjacent(3, 0));
    }

    #[test]
    fn test_excess_tiles_unconnected() {
        let mut grid = GridLayout::new(Adjacency::Straight);
        grid.set_cell(0, 0);
        grid.set_cell(0, 1);
        let board = Board::parse("ABC", Some(&grid));
        assert!(board.is_adjacent(0, 1));
        // tile 2 has no cell, so no neighbours
        assert!(!board.is_adjacent(1, 2));
        assert!(!board.is_adjacent(2, 0));
    }

    #[test]
    fn test_tile_token() {
        let board = Board::parse(":;Qu.X", None);
        assert_eq!(board.tile_token(0), ":;Qu");
        assert_eq!(board.tile_token(1), ".");
        assert_eq!(board.tile_token(2), "X");
        assert_eq!(board.to_string(), ":;Qu.X");
    }

    #[test]
    fn test_empty_board() {
        let board = Board::parse("  123", None);
        assert_eq!(board.size(), 0);
    }
}
