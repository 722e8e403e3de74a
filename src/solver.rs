use crate::board::Board;
use crate::rules::ScoringRules;
use crate::solution::Solution;
use crate::trie::{self, Trie};
use crate::Error;
use std::fs::read_to_string;

/// Finds every dictionary word spellable on a board.
///
/// A solver owns the dictionary [`Trie`] plus per-solve scratch buffers.
/// Each call to [`solve`](Solver::solve) fully resets the scratch, so
/// repeated solves are deterministic; the buffers are single-owner and a
/// solver must not be shared between concurrent solves.
///
/// ## Examples
/// ```
/// use wordgrid_solver::{Board, ScoringRules, Solver};
///
/// let mut solver = Solver::from_words(&["cat", "cats"]);
/// let board = Board::parse("CATS", None);
/// let solutions = solver.solve(&board, &ScoringRules::default());
/// assert_eq!(solutions.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Solver {
    trie: Trie,
    solutions: Vec<Solution>,
    used: Vec<bool>,
    path: Vec<u8>,
    /// Chosen letter per tile for `?` tiles, 0 when unassigned.
    wildcard: Vec<u8>,
}

impl Solver {
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Build a solver from a list of words.
    pub fn from_words(words: &[&str]) -> Solver {
        let mut solver = Solver::new();
        for word in words {
            solver.add_word(word);
        }
        solver
    }

    /// Build a solver from a word file containing whitespace separated
    /// words.
    /// ## Errors
    /// Fails if the word file can not be read.
    pub fn from_wordfile(path: &str) -> Result<Solver, Error> {
        let mut solver = Solver::new();
        let contents = read_to_string(path).map_err(|source| Error::ReadError {
            path: String::from(path),
            source,
        })?;
        for word in contents.split_whitespace() {
            solver.add_word(word);
        }
        Ok(solver)
    }

    /// Add a single word to the dictionary.
    pub fn add_word(&mut self, word: &str) {
        self.trie.insert(word);
    }

    /// Access the dictionary.
    pub fn dictionary(&self) -> &Trie {
        &self.trie
    }

    /// Enumerate all solutions on `board`. Every walk over adjacent,
    /// unused, non-empty tiles whose letters spell a dictionary word of at
    /// least `min_word_length` letters yields one [`Solution`]. Distinct
    /// paths spelling the same word yield distinct entries; deduplication
    /// is the caller's concern.
    ///
    /// The returned list is unsorted (walk order).
    pub fn solve(&mut self, board: &Board, rules: &ScoringRules) -> Vec<Solution> {
        let size = board.size();
        self.solutions.clear();
        self.used.clear();
        self.used.resize(size, false);
        self.path.clear();
        self.wildcard.clear();
        self.wildcard.resize(size, 0);

        for i in 0..size {
            self.walk(board, rules, i, trie::ROOT, board.tile(i));
        }
        std::mem::take(&mut self.solutions)
    }

    /// One step of the walk: consume the letters of the tile at `pos`
    /// descending from `node`, then emit and recurse into neighbours.
    fn walk(&mut self, board: &Board, rules: &ScoringRules, pos: usize, node: usize, tile: &str) {
        if tile.is_empty() {
            return;
        }

        let mut node = node;
        let chars: Vec<char> = tile.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c == '?' {
                // branch once per letter, deterministically A..Z
                let rest: String = chars[i + 1..].iter().collect();
                for letter in b'A'..=b'Z' {
                    self.wildcard[pos] = letter;
                    let mut substituted = String::with_capacity(rest.len() + 1);
                    substituted.push(letter as char);
                    substituted.push_str(&rest);
                    self.walk(board, rules, pos, node, &substituted);
                }
                return;
            }

            node = match self.trie.child_of(node, c.to_ascii_uppercase()) {
                Some(next) => next,
                None => return,
            };

            // a Q tile implies a following U; the u of a Qu digraph tile
            // is part of that expansion, not a second letter
            if rules.q_is_qu && c.to_ascii_uppercase() == 'Q' {
                node = match self.trie.child_of(node, 'U') {
                    Some(next) => next,
                    None => return,
                };
                if chars.get(i + 1).map_or(false, |u| u.eq_ignore_ascii_case(&'u')) {
                    i += 1;
                }
            }
            i += 1;
        }

        self.used[pos] = true;
        self.path.push(pos as u8);

        if self.trie.is_terminal(node) {
            let solution = self.score_path(board, rules, &self.path);
            if solution.word_length() >= rules.min_word_length {
                self.solutions.push(solution);
            }
        }

        for next in 0..board.size() {
            if !self.used[next] && board.is_adjacent(pos, next) {
                self.walk(board, rules, next, node, board.tile(next));
            }
        }

        self.used[pos] = false;
        self.path.pop();
    }

    /// Score the word spelled by `path` under `rules`.
    ///
    /// Scoring is a pure function of the path, the board and the rules,
    /// apart from wildcard tiles which take the letter assigned during the
    /// current walk. The emitted word carries `Qu` expansion.
    pub fn score_path(&self, board: &Board, rules: &ScoringRules, path: &[u8]) -> Solution {
        let mut word = String::new();
        let mut word_length = 0usize;
        let mut letter_points = 0u32;
        let mut word_multiplier = 1u32;

        for &pos in path {
            let pos = pos as usize;
            let mut tile_value = 0u32;

            let chars: Vec<char> = board.tile(pos).chars().collect();
            let mut i = 0;
            while i < chars.len() {
                let c = chars[i];
                let (letter, is_wildcard) = if c == '?' {
                    (self.wildcard[pos] as char, true)
                } else {
                    (c, false)
                };

                word_length += 1;
                word.push(letter.to_ascii_uppercase());

                if letter.to_ascii_uppercase() == 'Q' && rules.q_is_qu {
                    word.push('U');
                    if rules.qu_length == 2 {
                        word_length += 1;
                    }
                    // the u of a Qu digraph tile is covered by the expansion
                    if chars.get(i + 1).map_or(false, |u| u.eq_ignore_ascii_case(&'u')) {
                        i += 1;
                    }
                }

                if !is_wildcard || rules.wild_card_points {
                    tile_value += rules.letter_value(letter);
                }
                i += 1;
            }

            letter_points += tile_value * board.letter_mult(pos) as u32;
            word_multiplier *= board.word_mult(pos) as u32;
        }

        if word_length < rules.min_word_length {
            return Solution::new(word, path, word_length, 0, 0, 1, 0.0);
        }

        if word_length <= rules.short_word_length {
            if rules.short_word_multiplier {
                return Solution::new(
                    word,
                    path,
                    word_length,
                    word_multiplier * rules.short_word_points,
                    rules.short_word_points,
                    word_multiplier,
                    0.0,
                );
            }
            return Solution::new(
                word,
                path,
                word_length,
                rules.short_word_points,
                rules.short_word_points,
                1,
                0.0,
            );
        }

        let length_bonus = rules.length_bonus(word_length);
        let raw = if rules.multiply_length_bonus {
            letter_points as f64 * word_multiplier as f64 * length_bonus
        } else {
            (letter_points * word_multiplier) as f64 + length_bonus
        };
        let score = if rules.round_bonus_up {
            raw.ceil()
        } else {
            raw.trunc()
        } as u32;

        Solution::new(
            word,
            path,
            word_length,
            score,
            letter_points,
            word_multiplier,
            length_bonus,
        )
    }
}
