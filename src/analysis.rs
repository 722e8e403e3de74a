use crate::board::Board;
use crate::solution::Solution;
use std::collections::{BTreeMap, HashSet};

/// Aggregate statistics over the solutions of one board, queryable through
/// a format string.
///
/// The input list must be sorted word ascending, score descending (the
/// [`Solution`](crate::Solution) order): per-word statistics take the first
/// and highest scoring instance of each word, and the per-position credit
/// set resets whenever the word changes in the stream.
#[derive(Debug, Default)]
pub struct SolutionAnalysis {
    /// Count of distinct n-letter words; 0 holds the total.
    word_length_counts: BTreeMap<usize, u64>,
    /// Points of distinct n-letter words; 0 holds the total.
    point_length_counts: BTreeMap<usize, u64>,
    /// Count of distinct words with n or more letters.
    word_lengthp_counts: BTreeMap<usize, u64>,
    /// Points of distinct words with n or more letters.
    point_lengthp_counts: BTreeMap<usize, u64>,
    /// Distinct words whose path touches position n (1-based); 0 holds the
    /// board total.
    position_words: BTreeMap<usize, u64>,
    /// Points of distinct words whose path touches position n.
    position_points: BTreeMap<usize, u64>,
    /// Highest scoring n-letter word; 0 holds the overall best.
    best_words: BTreeMap<usize, String>,
    best_word_points: BTreeMap<usize, u64>,
    board_letters: String,
}

impl SolutionAnalysis {
    pub fn new(board: &Board, solutions: &[Solution]) -> SolutionAnalysis {
        let mut analysis = SolutionAnalysis {
            board_letters: String::from(board.letters()),
            ..SolutionAnalysis::default()
        };

        let mut last_word = "";
        let mut last_word_positions: HashSet<usize> = HashSet::new();

        for solution in solutions {
            let score = solution.score() as u64;
            let word = solution.word();
            let word_length = word.len();

            if word != last_word {
                last_word_positions.clear();
            }

            if analysis.best_word_points.get(&word_length).copied().unwrap_or(0) < score {
                analysis.best_words.insert(word_length, String::from(word));
                analysis.best_word_points.insert(word_length, score);
            }
            if analysis.best_word_points.get(&0).copied().unwrap_or(0) < score {
                analysis.best_words.insert(0, String::from(word));
                analysis.best_word_points.insert(0, score);
            }

            if word != last_word {
                // first instance of this word: count it once, at its
                // highest score
                *analysis.word_length_counts.entry(word_length).or_default() += 1;
                *analysis.word_length_counts.entry(0).or_default() += 1;
                *analysis.point_length_counts.entry(word_length).or_default() += score;
                *analysis.point_length_counts.entry(0).or_default() += score;

                for n in 0..=word_length {
                    *analysis.word_lengthp_counts.entry(n).or_default() += 1;
                    *analysis.point_lengthp_counts.entry(n).or_default() += score;
                }

                *analysis.position_words.entry(0).or_default() += 1;
                *analysis.position_points.entry(0).or_default() += score;
            }

            // every instance credits the positions it touches, but a word
            // never credits the same position twice
            for &pos in solution.positions() {
                let pos = pos as usize + 1; // 0-based to 1-based
                if last_word_positions.insert(pos) {
                    *analysis.position_words.entry(pos).or_default() += 1;
                    *analysis.position_points.entry(pos).or_default() += score;
                }
            }

            last_word = solution.word();
        }
        analysis
    }

    /// Evaluate an analysis format string:
    ///
    /// * `%B` the board letters
    /// * `%nW` / `%nS` distinct words / points touching position `n`
    ///   (totals at `n` = 0 or omitted)
    /// * `%nC` / `%nP` count / points of distinct n-letter words
    /// * `%n+C` / `%n+P` the same for words of n or more letters
    /// * `%nX` / `%nY` the highest scoring n-letter word and its score
    /// * `*` in place of trailing digits of `n` substitutes `star_value`
    /// * `%%` a literal percent sign
    ///
    /// The escapes `\t`, `\n` and `\\` are recognized.
    pub fn format(&self, fmt: &str, star_value: usize) -> String {
        let mut result = String::new();
        let mut chars = fmt.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '%' => {
                    let mut counter = 0usize;
                    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                        counter = counter * 10 + d as usize;
                        chars.next();
                    }
                    let mut plus_flag = false;
                    if chars.peek() == Some(&'+') {
                        plus_flag = true;
                        chars.next();
                    }
                    if chars.peek() == Some(&'*') {
                        counter = star_value;
                        chars.next();
                    }
                    let spec = match chars.next() {
                        Some(spec) => spec,
                        None => break,
                    };
                    match spec {
                        'B' => result.push_str(&self.board_letters),
                        'W' => result.push_str(&lookup(&self.position_words, counter)),
                        'S' => result.push_str(&lookup(&self.position_points, counter)),
                        'X' => {
                            result.push_str(self.best_words.get(&counter).map_or("", String::as_str))
                        }
                        'Y' => result.push_str(&lookup(&self.best_word_points, counter)),
                        'C' => {
                            let counts = if plus_flag {
                                &self.word_lengthp_counts
                            } else {
                                &self.word_length_counts
                            };
                            result.push_str(&lookup(counts, counter));
                        }
                        'P' => {
                            let counts = if plus_flag {
                                &self.point_lengthp_counts
                            } else {
                                &self.point_length_counts
                            };
                            result.push_str(&lookup(counts, counter));
                        }
                        '%' => result.push('%'),
                        other => {
                            result.push('%');
                            result.push(other);
                        }
                    }
                }
                '\\' => {
                    let escape = match chars.next() {
                        Some(escape) => escape,
                        None => break,
                    };
                    match escape {
                        '\\' => result.push('\\'),
                        't' => result.push('\t'),
                        'n' => result.push('\n'),
                        other => {
                            result.push('\\');
                            result.push(other);
                        }
                    }
                }
                other => result.push(other),
            }
        }
        result
    }
}

fn lookup(map: &BTreeMap<usize, u64>, key: usize) -> String {
    map.get(&key).copied().unwrap_or(0).to_string()
}
