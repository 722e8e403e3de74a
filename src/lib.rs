//! A configurable word game solver library for Rust.
//! <br>
//! This crate finds every dictionary word spellable on a game board,
//! scores the solutions, analyzes boards, generates new boards toward a
//! target difficulty, and validates that boards and words are producible
//! from a game's letter distribution.
//!
//! A game is described by a rule set: a grid (which cells exist and how
//! they connect), scoring rules (letter values, multipliers, length
//! bonuses), a letter distribution (dice or a tile pool) and a dictionary.
//! Boards are plain strings: `"HELO"` is a four tile board, `"Qu"` makes a
//! digraph tile, `:`/`;` mark letter and word multipliers, `?` is a
//! wildcard and `.` a hole.
//!
//! # Basic usage
//! ```
//! use wordgrid_solver::{Board, ScoringRules, Solver};
//!
//! let mut solver = Solver::from_words(&["rust", "ruts", "rut"]);
//! let mut rules = ScoringRules::default();
//! rules.set_letter_value('r', 1);
//! rules.set_letter_value('u', 2);
//! rules.set_letter_value('t', 1);
//! rules.set_letter_value('s', 1);
//!
//! let board = Board::parse("RUTS", None);
//! let mut solutions = solver.solve(&board, &rules);
//! solutions.sort();
//! for solution in &solutions {
//!     println!("{} {}", solution.word(), solution.score());
//! }
//! assert_eq!(solutions.len(), 3);
//! ```

mod analysis;
mod board;
mod config;
mod distribution;
mod dlx;
mod error;
mod flow;
mod generator;
mod grid;
mod rules;
mod solution;
mod solver;
mod trie;
mod validator;

pub use crate::analysis::SolutionAnalysis;
pub use crate::board::Board;
pub use crate::config::{Config, GameRules, Preferences, RuleSet};
pub use crate::distribution::{GenerationMethod, LetterDistribution};
pub use crate::dlx::Dlx;
pub use crate::error::Error;
pub use crate::flow::FlowNetwork;
pub use crate::generator::{generate_board, generate_simple_board, Dice};
pub use crate::grid::{Adjacency, GridLayout, MAX_GRID_WIDTH};
pub use crate::rules::ScoringRules;
pub use crate::solution::{dedup_solutions, Solution};
pub use crate::solver::Solver;
pub use crate::trie::Trie;
pub use crate::validator::{Validator, ValidatorStats};
