use crate::board::Board;
use crate::config::RuleSet;
use crate::distribution::GenerationMethod;
use crate::solution::dedup_solutions;
use crate::solver::Solver;
use crate::Error;
use rand::Rng;
use std::fs::read_to_string;

/// How many consecutive rejected mutations end a targeted search.
const MAX_DUDS: i32 = 200;

/// A set of rolled dice: which die sits at each board position and which
/// face it shows.
#[derive(Debug, Clone)]
pub struct Dice {
    dice: Vec<Vec<String>>,
    /// positions[i] is the die at board position i.
    positions: Vec<usize>,
    /// faces[i] is the face shown by the die at board position i.
    faces: Vec<usize>,
}

impl Dice {
    /// Take ownership of the dice and roll them all.
    pub fn new<R: Rng>(dice: Vec<Vec<String>>, rng: &mut R) -> Dice {
        let count = dice.len();
        let mut rolled = Dice {
            dice,
            positions: (0..count).collect(),
            faces: vec![0; count],
        };
        rolled.roll_all(rng);
        rolled
    }

    /// The board letters spelled by the current roll.
    pub fn letters(&self) -> String {
        let mut letters = String::new();
        for i in 0..self.dice.len() {
            letters.push_str(&self.dice[self.positions[i]][self.faces[i]]);
        }
        letters
    }

    /// Swap the dice at board positions `i` and `j`.
    pub fn swap_dice(&mut self, i: usize, j: usize) {
        self.positions.swap(i, j);
        self.faces.swap(i, j);
    }

    /// Randomly select a face for the die at position `i`.
    pub fn roll_one<R: Rng>(&mut self, i: usize, rng: &mut R) {
        self.faces[i] = rng.gen_range(0..self.dice[self.positions[i]].len());
    }

    /// Re-roll every die and scramble their positions.
    pub fn roll_all<R: Rng>(&mut self, rng: &mut R) {
        for i in 0..self.dice.len() {
            self.positions[i] = i;
            self.roll_one(i, rng);
        }
        self.scramble(rng);
    }

    fn scramble<R: Rng>(&mut self, rng: &mut R) {
        let mut max = self.dice.len();
        while max > 1 {
            let r = rng.gen_range(0..max - 1);
            self.swap_dice(r, max - 1);
            max -= 1;
        }
    }

    pub fn len(&self) -> usize {
        self.dice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }
}

/// The number of tiles a generated board gets: the configured random board
/// size, bounded by the grid when there is one (0 means fill the grid).
fn board_size(rules: &RuleSet) -> usize {
    let requested = rules.scoring.random_board_size;
    match rules.grid {
        Some(grid) => {
            let cells = grid.cell_count();
            if requested == 0 || cells < requested {
                cells
            } else {
                requested
            }
        }
        None => requested,
    }
}

/// Shuffled dice trimmed to the board size.
fn prepared_dice<R: Rng>(rules: &RuleSet, rng: &mut R) -> Result<Vec<Vec<String>>, Error> {
    let letters = rules.letters.ok_or(Error::UnsupportedGeneration)?;
    let mut dice = letters.dice.clone();
    if letters.shuffle_dice {
        shuffle(&mut dice, rng);
    }
    dice.truncate(board_size(rules));
    Ok(dice)
}

fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    use rand::seq::SliceRandom;
    items.shuffle(rng);
}

/// Generate a board with no word or score target: one roll of the dice, one
/// sample of the pool, or one line of the word list.
pub fn generate_simple_board<R: Rng>(rules: &RuleSet, rng: &mut R) -> Result<String, Error> {
    let letters = rules.letters.ok_or(Error::UnsupportedGeneration)?;
    match letters.method {
        Some(GenerationMethod::Dice) => {
            let dice = prepared_dice(rules, rng)?;
            let mut board = String::new();
            for die in &dice {
                board.push_str(&die[rng.gen_range(0..die.len())]);
            }
            Ok(board)
        }
        Some(GenerationMethod::LetterPropensity) => {
            let max_letters = board_size(rules);
            let mut pool = letters.propensity.clone();
            let mut board = String::new();
            if letters.sample_without_replacement {
                for i in 0..max_letters.min(pool.len()) {
                    let j = i + rng.gen_range(0..pool.len() - i);
                    board.push_str(&pool[j]);
                    pool.swap(i, j);
                }
            } else if !pool.is_empty() {
                for _ in 0..max_letters {
                    board.push_str(&pool[rng.gen_range(0..pool.len())]);
                }
            }
            Ok(board)
        }
        Some(GenerationMethod::WordList) => {
            let path = &letters.word_list_file;
            let contents = read_to_string(path).map_err(|source| Error::ReadError {
                path: String::from(path),
                source,
            })?;
            // reservoir sample one line
            let mut board = String::new();
            for (lines, word) in contents.split_whitespace().enumerate() {
                if rng.gen_range(0.0..1.0) <= 1.0 / (lines + 1) as f64 {
                    board = String::from(word);
                }
            }
            if letters.shuffle_letters {
                let parsed = Board::parse(&board, rules.grid);
                let mut tokens: Vec<String> =
                    (0..parsed.size()).map(|i| parsed.tile_token(i)).collect();
                shuffle(&mut tokens, rng);
                board = tokens.concat();
            }
            Ok(board)
        }
        None => Err(Error::UnsupportedGeneration),
    }
}

/// Solve a candidate board and reduce it to (distinct words, total points).
fn board_metrics(solver: &mut Solver, rules: &RuleSet, letters: &str) -> (i64, i64) {
    let board = Board::parse(letters, rules.grid);
    let mut solutions = solver.solve(&board, rules.scoring);
    solutions.sort();
    dedup_solutions(&mut solutions);
    let points: i64 = solutions.iter().map(|s| s.score() as i64).sum();
    (solutions.len() as i64, points)
}

/// Accept a candidate whose metrics improve on the best seen, or whose loss
/// is within a tolerance that shrinks as the search progresses.
fn accepts(
    reverse_target: bool,
    (score, points): (i64, i64),
    (best_score, best_points): (i64, i64),
    changes: i64,
) -> bool {
    let tolerance = 250 / changes;
    if reverse_target {
        score < best_score || points < best_points || score - best_score < tolerance
    } else {
        score > best_score || points > best_points || best_score - score < tolerance
    }
}

/// Has the search target been met?
fn target_met(
    reverse_target: bool,
    (best_score, best_points): (i64, i64),
    (min_words, min_score): (i64, i64),
) -> bool {
    if reverse_target {
        best_score <= min_words && best_points <= min_score
    } else {
        best_score >= min_words && best_points >= min_score
    }
}

/// Generate a board whose solution count and total points reach the given
/// targets (or fall below them when `reverse_target` is set), by mutating
/// the best board seen so far until `MAX_DUDS` consecutive mutations fail
/// to be accepted.
///
/// The `solver` must already carry the game dictionary.
/// ## Errors
/// Targeted generation works for dice and propensity distributions only.
pub fn generate_board<R: Rng>(
    rules: &RuleSet,
    solver: &mut Solver,
    min_words: usize,
    min_score: usize,
    reverse_target: bool,
    rng: &mut R,
) -> Result<String, Error> {
    let letters = rules.letters.ok_or(Error::UnsupportedGeneration)?;
    match letters.method {
        Some(GenerationMethod::Dice) => {
            generate_dice_board(rules, solver, min_words, min_score, reverse_target, rng)
        }
        Some(GenerationMethod::LetterPropensity) => {
            generate_prop_board(rules, solver, min_words, min_score, reverse_target, rng)
        }
        _ => Err(Error::UnsupportedGeneration),
    }
}

fn generate_dice_board<R: Rng>(
    rules: &RuleSet,
    solver: &mut Solver,
    min_words: usize,
    min_score: usize,
    reverse_target: bool,
    rng: &mut R,
) -> Result<String, Error> {
    let is_anagram = rules.grid.map_or(true, |grid| {
        grid.adjacency() == crate::grid::Adjacency::Full
    });
    let dice = prepared_dice(rules, rng)?;
    if dice.is_empty() {
        return Ok(String::new());
    }
    let num_dice = dice.len();
    let targets = (min_words as i64, min_score as i64);
    let mut best = Dice::new(dice, rng);
    let mut best_metrics = if reverse_target {
        (i64::MAX, i64::MAX)
    } else {
        (0, 0)
    };
    let mut duds = 0;
    let mut changes: i64 = 1;

    loop {
        let mut candidate = best.clone();

        // anagram boards are fully connected, a positional swap changes
        // nothing there
        if is_anagram || rng.gen_range(0..2) == 1 {
            let i = rng.gen_range(0..num_dice);
            candidate.roll_one(i, rng);
        } else {
            let i = rng.gen_range(0..num_dice);
            let j = rng.gen_range(0..num_dice);
            candidate.swap_dice(i, j);
        }

        let metrics = board_metrics(solver, rules, &candidate.letters());
        if accepts(reverse_target, metrics, best_metrics, changes) {
            best = candidate;
            best_metrics = metrics;
            duds = 0;
            changes += 1;
        } else {
            duds += 1;
        }

        if duds >= MAX_DUDS || target_met(reverse_target, best_metrics, targets) {
            return Ok(best.letters());
        }
    }
}

fn generate_prop_board<R: Rng>(
    rules: &RuleSet,
    solver: &mut Solver,
    min_words: usize,
    min_score: usize,
    reverse_target: bool,
    rng: &mut R,
) -> Result<String, Error> {
    let letters = rules.letters.ok_or(Error::UnsupportedGeneration)?;
    let is_anagram = rules.grid.map_or(true, |grid| {
        grid.adjacency() == crate::grid::Adjacency::Full
    });
    let max_letters = board_size(rules);
    let prop_letters = &letters.propensity;
    if prop_letters.is_empty() || max_letters == 0 {
        return Ok(String::new());
    }

    let mut best: Vec<String> = Vec::new();
    let mut pool: Vec<String> = Vec::new();
    if letters.sample_without_replacement {
        let mut remaining = prop_letters.clone();
        let drawn = max_letters.min(remaining.len());
        for i in 0..drawn {
            let j = i + rng.gen_range(0..remaining.len() - i);
            best.push(remaining[j].clone());
            remaining.swap(i, j);
        }
        pool.extend_from_slice(&remaining[drawn..]);
    } else {
        for _ in 0..max_letters {
            best.push(prop_letters[rng.gen_range(0..prop_letters.len())].clone());
        }
    }
    let num_letters = best.len();

    // fully connected and nothing left to swap in: no productive move
    if is_anagram && letters.sample_without_replacement && pool.is_empty() {
        return Ok(best.concat());
    }

    let targets = (min_words as i64, min_score as i64);
    let mut best_metrics = if reverse_target {
        (i64::MAX, i64::MAX)
    } else {
        (0, 0)
    };
    let mut duds = 0;
    let mut changes: i64 = 1;

    loop {
        let mut candidate = best.clone();
        let saved_pool = pool.clone();

        let draw_allowed = !(letters.sample_without_replacement && pool.is_empty());
        if is_anagram || (rng.gen_range(0..2) == 1 && draw_allowed) {
            // change one of the letters
            let i = rng.gen_range(0..num_letters);
            if letters.sample_without_replacement {
                let j = rng.gen_range(0..pool.len());
                std::mem::swap(&mut candidate[i], &mut pool[j]);
            } else {
                let j = rng.gen_range(0..prop_letters.len());
                candidate[i] = prop_letters[j].clone();
            }
        } else {
            let i = rng.gen_range(0..num_letters);
            let j = rng.gen_range(0..num_letters);
            candidate.swap(i, j);
        }

        let metrics = board_metrics(solver, rules, &candidate.concat());
        if accepts(reverse_target, metrics, best_metrics, changes) {
            best = candidate;
            best_metrics = metrics;
            duds = 0;
            changes += 1;
        } else {
            duds += 1;
            pool = saved_pool;
        }

        if duds >= MAX_DUDS || target_met(reverse_target, best_metrics, targets) {
            return Ok(best.concat());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSet;
    use crate::distribution::LetterDistribution;
    use crate::grid::{Adjacency, GridLayout};
    use crate::rules::ScoringRules;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grid_2x2() -> GridLayout {
        let mut grid = GridLayout::new(Adjacency::Straight);
        for x in 0..2 {
            for y in 0..2 {
                grid.set_cell(x, y);
            }
        }
        grid
    }

    fn scoring() -> ScoringRules {
        let mut scoring = ScoringRules::default();
        scoring.q_is_qu = false;
        for c in b'A'..=b'Z' {
            scoring.set_letter_value(c as char, 1);
        }
        scoring
    }

    fn rule_set<'a>(
        grid: Option<&'a GridLayout>,
        letters: &'a LetterDistribution,
        scoring: &'a ScoringRules,
    ) -> RuleSet<'a> {
        RuleSet {
            name: String::from("test"),
            grid,
            wordfile: None,
            scoring,
            letters: Some(letters),
            preferences: Default::default(),
        }
    }

    #[test]
    fn test_dice_roll() {
        let mut rng = StdRng::seed_from_u64(1);
        let dice = vec![
            vec![String::from("A")],
            vec![String::from("B")],
            vec![String::from("C")],
        ];
        let mut rolled = Dice::new(dice, &mut rng);
        let mut letters: Vec<char> = rolled.letters().chars().collect();
        letters.sort_unstable();
        assert_eq!(letters, vec!['A', 'B', 'C']);

        rolled.swap_dice(0, 2);
        let mut letters: Vec<char> = rolled.letters().chars().collect();
        letters.sort_unstable();
        assert_eq!(letters, vec!['A', 'B', 'C']);
    }

    #[test]
    fn test_simple_dice_board() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut letters = LetterDistribution::default();
        letters.method = Some(GenerationMethod::Dice);
        letters.set_dice_letters("AB,CD,EF,GH");
        let grid = grid_2x2();
        let scoring = scoring();
        let rules = rule_set(Some(&grid), &letters, &scoring);

        let board = generate_simple_board(&rules, &mut rng).unwrap();
        assert_eq!(board.len(), 4);
        let mut validator = crate::validator::Validator::new();
        assert!(validator.validate_board(&rules, &board));
    }

    #[test]
    fn test_simple_board_respects_random_board_size() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut letters = LetterDistribution::default();
        letters.method = Some(GenerationMethod::Dice);
        letters.set_dice_letters("AB,CD,EF,GH");
        let grid = grid_2x2();
        let mut scoring = scoring();
        scoring.random_board_size = 2;
        let rules = rule_set(Some(&grid), &letters, &scoring);
        let board = generate_simple_board(&rules, &mut rng).unwrap();
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_simple_propensity_board_without_replacement() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut letters = LetterDistribution::default();
        letters.method = Some(GenerationMethod::LetterPropensity);
        letters.set_propensity_letters("ABCD");
        let grid = grid_2x2();
        let scoring = scoring();
        let rules = rule_set(Some(&grid), &letters, &scoring);

        let board = generate_simple_board(&rules, &mut rng).unwrap();
        let mut tiles: Vec<char> = board.chars().collect();
        tiles.sort_unstable();
        // the whole pool is drawn exactly once
        assert_eq!(tiles, vec!['A', 'B', 'C', 'D']);
    }

    #[test]
    fn test_generator_reaches_target() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut letters = LetterDistribution::default();
        letters.method = Some(GenerationMethod::Dice);
        letters.set_dice_letters("AT,AT,AT,AT");
        let grid = grid_2x2();
        let scoring = scoring();
        let rules = rule_set(Some(&grid), &letters, &scoring);
        let mut solver = Solver::from_words(&["at", "ta", "tat", "att"]);

        let board = generate_board(&rules, &mut solver, 2, 2, false, &mut rng).unwrap();
        let (words, points) = board_metrics(&mut solver, &rules, &board);
        // either the target was met or the search exhausted its duds; with
        // these dice a 2-word board always exists
        assert!(words >= 2 && points >= 2, "{}: {} {}", board, words, points);
        // whatever was produced must be a legal roll of the dice
        let mut validator = crate::validator::Validator::new();
        assert!(validator.validate_board(&rules, &board));
    }

    #[test]
    fn test_generator_minimizing() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut letters = LetterDistribution::default();
        letters.method = Some(GenerationMethod::Dice);
        letters.set_dice_letters("AX,TX");
        let grid = grid_2x2();
        let scoring = scoring();
        let rules = rule_set(Some(&grid), &letters, &scoring);
        let mut solver = Solver::from_words(&["at", "ta"]);

        let board = generate_board(&rules, &mut solver, 0, 0, true, &mut rng).unwrap();
        let (words, points) = board_metrics(&mut solver, &rules, &board);
        assert_eq!((words, points), (0, 0), "{}", board);
    }

    #[test]
    fn test_acceptance_predicate() {
        // improvement in either metric is always accepted
        assert!(accepts(false, (10, 50), (5, 100), 1000));
        assert!(accepts(false, (3, 120), (5, 100), 1000));
        // a small loss is tolerated early but not late
        assert!(accepts(false, (4, 90), (5, 100), 100));
        assert!(!accepts(false, (4, 90), (5, 100), 300));
        // minimizing mirrors the comparisons
        assert!(accepts(true, (4, 90), (5, 100), 1000));
        assert!(!accepts(true, (7, 110), (5, 100), 300));
        assert!(accepts(true, (6, 110), (5, 100), 100));
    }

    #[test]
    fn test_target_met() {
        assert!(target_met(false, (50, 200), (50, 200)));
        assert!(!target_met(false, (49, 300), (50, 200)));
        assert!(target_met(true, (0, 0), (5, 10)));
        assert!(!target_met(true, (6, 0), (5, 10)));
    }

    #[test]
    fn test_generator_propensity() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut letters = LetterDistribution::default();
        letters.method = Some(GenerationMethod::LetterPropensity);
        letters.set_propensity_letters("AATTXXXX");
        let grid = grid_2x2();
        let scoring = scoring();
        let rules = rule_set(Some(&grid), &letters, &scoring);
        let mut solver = Solver::from_words(&["at", "ta"]);

        let board = generate_board(&rules, &mut solver, 1, 1, false, &mut rng).unwrap();
        let (words, _) = board_metrics(&mut solver, &rules, &board);
        assert!(words >= 1, "{}", board);
    }

    #[test]
    fn test_anagram_empty_pool_returns_unchanged() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut letters = LetterDistribution::default();
        letters.method = Some(GenerationMethod::LetterPropensity);
        letters.set_propensity_letters("ABCD");
        let mut scoring = scoring();
        scoring.random_board_size = 4;
        // no grid: fully connected, pool exhausted by the draw
        let rules = rule_set(None, &letters, &scoring);
        let mut solver = Solver::from_words(&["zzz"]);

        let board = generate_board(&rules, &mut solver, 100, 100, false, &mut rng).unwrap();
        let mut tiles: Vec<char> = board.chars().collect();
        tiles.sort_unstable();
        assert_eq!(tiles, vec!['A', 'B', 'C', 'D']);
    }

    #[test]
    fn test_wordlist_generation_unsupported() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut letters = LetterDistribution::default();
        letters.method = Some(GenerationMethod::WordList);
        let scoring = scoring();
        let rules = rule_set(None, &letters, &scoring);
        let mut solver = Solver::new();
        assert!(generate_board(&rules, &mut solver, 1, 1, false, &mut rng).is_err());
    }
}
