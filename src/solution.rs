use std::cmp::Ordering;

/// A dictionary word discovered on a board, with its scoring breakdown and
/// the path of tile positions that spells it.
///
/// The path length can differ from the word length: a digraph tile emits
/// more than one letter, and `Qu` expansion adds letters no tile carries.
#[derive(Debug, Clone)]
pub struct Solution {
    word: String,
    positions: Vec<u8>,
    word_length: usize,
    score: u32,
    letter_points: u32,
    word_multiplier: u32,
    length_bonus: f64,
}

impl Solution {
    pub fn new(
        word: String,
        positions: &[u8],
        word_length: usize,
        score: u32,
        letter_points: u32,
        word_multiplier: u32,
        length_bonus: f64,
    ) -> Solution {
        Solution {
            word,
            positions: positions.to_vec(),
            word_length,
            score,
            letter_points,
            word_multiplier,
            length_bonus,
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Tile indices of the path, in walk order (0-based).
    pub fn positions(&self) -> &[u8] {
        &self.positions
    }

    pub fn word_length(&self) -> usize {
        self.word_length
    }

    pub fn letter_points(&self) -> u32 {
        self.letter_points
    }

    pub fn word_multiplier(&self) -> u32 {
        self.word_multiplier
    }

    pub fn length_bonus(&self) -> f64 {
        self.length_bonus
    }

    /// Format this solution according to `fmt`:
    ///
    /// * `%w` the word
    /// * `%s` the score
    /// * `%l` the letter points
    /// * `%m` the word multiplier
    /// * `%b` the length bonus
    /// * `%p<sep>` the 1-based positions joined by `<sep>`
    /// * `%(...)` text emitted only when `expand_paren` is true (used
    ///   between solutions but not after the last); `\)` escapes a closing
    ///   parenthesis inside the block
    /// * `%%` a literal percent sign
    ///
    /// The escapes `\t`, `\n` and `\\` are recognized everywhere.
    pub fn format(&self, fmt: &str, expand_paren: bool) -> String {
        let mut result = String::new();
        let mut chars = fmt.chars();
        while let Some(c) = chars.next() {
            match c {
                '%' => {
                    let spec = match chars.next() {
                        Some(spec) => spec,
                        None => break,
                    };
                    match spec {
                        'w' => result.push_str(&self.word),
                        's' => result.push_str(&self.score.to_string()),
                        'b' => result.push_str(&self.length_bonus.to_string()),
                        'm' => result.push_str(&self.word_multiplier.to_string()),
                        'l' => result.push_str(&self.letter_points.to_string()),
                        '%' => result.push('%'),
                        'p' => {
                            let separator = match chars.next() {
                                Some(separator) => separator,
                                None => return result,
                            };
                            for (i, &pos) in self.positions.iter().enumerate() {
                                if i > 0 {
                                    result.push(separator);
                                }
                                // 0-based to 1-based
                                result.push_str(&(pos as usize + 1).to_string());
                            }
                        }
                        '(' => {
                            let mut in_escape = false;
                            for c in chars.by_ref() {
                                let c = if in_escape {
                                    in_escape = false;
                                    match c {
                                        't' => '\t',
                                        'n' => '\n',
                                        other => other,
                                    }
                                } else if c == '\\' {
                                    in_escape = true;
                                    continue;
                                } else if c == ')' {
                                    break;
                                } else {
                                    c
                                };
                                if expand_paren {
                                    result.push(c);
                                }
                            }
                        }
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

/// Solutions order by word ascending, then score descending, so that after
/// a sort the first entry for each word is its highest scoring instance.
impl Ord for Solution {
    fn cmp(&self, other: &Self) -> Ordering {
        self.word
            .cmp(&other.word)
            .then_with(|| other.score.cmp(&self.score))
    }
}

impl PartialOrd for Solution {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        self.word == other.word && self.score == other.score
    }
}

impl Eq for Solution {}

/// Drop all but the first entry per word from a sorted solution list.
/// With the [`Ord`] order above that keeps the highest scoring instance.
pub fn dedup_solutions(solutions: &mut Vec<Solution>) {
    solutions.dedup_by(|a, b| a.word == b.word);
}
