use crate::board::Board;
use crate::config::RuleSet;
use crate::distribution::GenerationMethod;
use crate::dlx::Dlx;
use crate::flow::FlowNetwork;
use multiset::HashMultiSet;
use std::collections::BTreeMap;
use std::fmt;

/// Counters describing how the validator reached its decisions.
#[derive(Debug, Default, Clone)]
pub struct ValidatorStats {
    /// Times bipartite max-flow was employed.
    pub flow_used: usize,
    /// Times max-flow found a match.
    pub flow_found: usize,
    /// Times exact cover was employed.
    pub dlx_used: usize,
    /// Times exact cover found a cover.
    pub dlx_found: usize,
    /// Times a word was rejected for exceeding the dice capacity.
    pub long_words: usize,
}

impl fmt::Display for ValidatorStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Validator stats: ")?;
        writeln!(f, "Flow used:  {}", self.flow_used)?;
        writeln!(f, "Flow found: {}", self.flow_found)?;
        writeln!(f, "DLX used:   {}", self.dlx_used)?;
        writeln!(f, "DLX found:  {}", self.dlx_found)?;
        write!(f, "Long words: {}", self.long_words)
    }
}

/// Decides whether a board or word can be produced from a game's letter
/// distribution.
///
/// Boards and single-letter words reduce to bipartite matching, solved with
/// max-flow. Multi-letter faces break the one-letter-per-die assumption, so
/// word validation falls back to exact cover when such a face occurs in the
/// word and matching alone fails.
#[derive(Debug, Default)]
pub struct Validator {
    debug: bool,
    stats: ValidatorStats,
}

impl Validator {
    pub fn new() -> Validator {
        Validator::default()
    }

    /// Route decision traces to stderr.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn stats(&self) -> &ValidatorStats {
        &self.stats
    }

    fn trace(&self, message: &str) {
        if self.debug {
            eprintln!("{}", message);
        }
    }

    /// Can `input`, parsed as a board, be produced from the game's letter
    /// distribution? Multiplier markers and other junk are ignored; a board
    /// need not use all dice.
    pub fn validate_board(&mut self, rules: &RuleSet, input: &str) -> bool {
        let letters = match rules.letters {
            Some(letters) => letters,
            None => {
                self.trace("No letter distribution configured");
                return false;
            }
        };
        // wildcards are legal board tiles
        let stripped = strip(input, true);
        let board = Board::parse(&stripped, rules.grid);
        let board_tiles: Vec<String> = (0..board.size())
            .map(|i| board.tile(i).to_ascii_uppercase())
            .collect();

        match letters.method {
            Some(GenerationMethod::Dice) => {
                let dice = prepared_dice(&letters.dice, false);
                self.validate_dice_board(&dice, &board_tiles)
            }
            Some(GenerationMethod::LetterPropensity) => {
                let pool = prepared_pool(&letters.propensity);
                self.validate_propensity_board(
                    &pool,
                    &board_tiles,
                    letters.sample_without_replacement,
                )
            }
            _ => {
                self.trace("Unsupported distribution method");
                false
            }
        }
    }

    /// Can `input`, read as a word, be spelled by selecting at most one
    /// face per die (or one tile per pool entry)? Under `q_is_qu` the faces
    /// carry the `Qu` expansion; the word itself is taken literally.
    pub fn validate_word(&mut self, rules: &RuleSet, input: &str) -> bool {
        let letters = match rules.letters {
            Some(letters) => letters,
            None => {
                self.trace("No letter distribution configured");
                return false;
            }
        };
        let word = strip(input, false).to_ascii_uppercase();

        match letters.method {
            Some(GenerationMethod::Dice) => {
                let mut dice = prepared_dice(&letters.dice, rules.scoring.q_is_qu);
                for die in &mut dice {
                    die.sort();
                    die.dedup();
                }
                self.validate_dice_word(&dice, &word)
            }
            Some(GenerationMethod::LetterPropensity) => {
                let mut pool: Vec<String> = letters
                    .propensity
                    .iter()
                    .map(|tile| {
                        let tile = strip(tile, true).to_ascii_uppercase();
                        if rules.scoring.q_is_qu {
                            expand_qu(&tile)
                        } else {
                            tile
                        }
                    })
                    .collect();
                if !letters.sample_without_replacement {
                    pool.sort();
                    pool.dedup();
                }
                self.validate_propensity_word(&pool, &word, letters.sample_without_replacement)
            }
            _ => {
                self.trace("Unsupported distribution method");
                false
            }
        }
    }

    /// Bipartite matching of dice against board tiles: an edge wherever a
    /// die has a face equal to the tile, accepted when every tile is
    /// matched.
    fn validate_dice_board(&mut self, dice: &[Vec<String>], board_tiles: &[String]) -> bool {
        self.stats.flow_used += 1;
        // 0 = source, 1..=dice = dice, then tiles, last = sink
        let mut net = FlowNetwork::new(dice.len() + board_tiles.len() + 2);
        let source = 0;
        let sink = dice.len() + board_tiles.len() + 1;

        for i in 1..=dice.len() {
            net.add_edge(source, i);
        }
        for k in 1..=board_tiles.len() {
            net.add_edge(k + dice.len(), sink);
        }
        for (i, die) in dice.iter().enumerate() {
            for face in die {
                for (k, tile) in board_tiles.iter().enumerate() {
                    if face == tile {
                        net.add_edge(i + 1, k + 1 + dice.len());
                    }
                }
            }
        }

        let found = net.max_flow(source, sink) == board_tiles.len();
        if found {
            self.stats.flow_found += 1;
        }
        found
    }

    fn validate_dice_word(&mut self, dice: &[Vec<String>], word: &str) -> bool {
        self.trace("Checking with max-flow");
        self.stats.flow_used += 1;
        let word_chars: Vec<char> = word.chars().collect();

        // 0 = source, 1..=dice = dice, then word positions, last = sink
        let mut net = FlowNetwork::new(dice.len() + word_chars.len() + 2);
        let source = 0;
        let sink = dice.len() + word_chars.len() + 1;

        for i in 1..=dice.len() {
            net.add_edge(source, i);
        }
        for k in 1..=word_chars.len() {
            net.add_edge(k + dice.len(), sink);
        }
        for (i, die) in dice.iter().enumerate() {
            for face in die {
                if face.chars().count() > 1 {
                    continue;
                }
                let face_char = match face.chars().next() {
                    Some(c) => c,
                    None => continue,
                };
                for (k, &c) in word_chars.iter().enumerate() {
                    if face_char == c || face_char == '?' {
                        net.add_edge(i + 1, k + 1 + dice.len());
                    }
                }
            }
        }

        if net.max_flow(source, sink) == word_chars.len() {
            self.trace("Max-flow found a solution, done");
            self.stats.flow_found += 1;
            return true;
        }

        // a word longer than the dice can ever produce needs no search
        let capacity: usize = dice
            .iter()
            .map(|die| die.iter().map(|face| face.chars().count()).max().unwrap_or(0))
            .sum();
        if word_chars.len() > capacity {
            self.trace("Word is too long to be spelled with candidate dice, done");
            self.stats.long_words += 1;
            return false;
        }

        // fall back to exact cover only when a multi-letter face occurs in
        // the word
        let fallback = dice.iter().flatten().any(|face| {
            face.chars().count() > 1 && multi_letter_face_matches(face, word)
        });
        if !fallback {
            self.trace("Max-flow failed and no multi-letter face matches, done");
            return false;
        }

        self.trace("Max-flow failed, falling back to exact cover");
        self.stats.dlx_used += 1;

        // columns: one per word position, then one per die
        let mut dlx = Dlx::new();
        for _ in 0..word_chars.len() + dice.len() {
            dlx.add_column();
        }
        for (i, die) in dice.iter().enumerate() {
            let die_column = word_chars.len() + i;
            for face in die {
                add_face_rows(&mut dlx, face, &word_chars, die_column);
            }
            // the die may go unused
            dlx.add_row(&[die_column]);
        }

        let found = dlx.solve_first();
        if found {
            self.trace("Exact cover found a solution, done");
            self.stats.dlx_found += 1;
        } else {
            self.trace("Exact cover found no solution, done");
        }
        found
    }

    /// Each board tile must exist in the pool; under sample-without-
    /// replacement a pool entry is consumed per tile.
    fn validate_propensity_board(
        &mut self,
        pool: &[String],
        board_tiles: &[String],
        sample_without_replacement: bool,
    ) -> bool {
        self.trace("Checking board against tile pool");
        let mut remaining: HashMultiSet<String> = HashMultiSet::new();
        for tile in pool {
            remaining.insert(tile.clone());
        }
        for tile in board_tiles {
            if remaining.count_of(tile) == 0 {
                self.trace(&format!("Tile '{}' does not exist in pool, done", tile));
                return false;
            }
            if sample_without_replacement {
                remaining.remove(tile);
            }
        }
        true
    }

    fn validate_propensity_word(
        &mut self,
        pool: &[String],
        word: &str,
        sample_without_replacement: bool,
    ) -> bool {
        self.trace("Checking word against tile pool");
        let mut remaining: HashMultiSet<String> = HashMultiSet::new();
        for tile in pool {
            remaining.insert(tile.clone());
        }
        let mut matched = true;
        for c in word.chars() {
            let single = c.to_string();
            let tile = if remaining.count_of(&single) > 0 {
                single
            } else if remaining.count_of(&String::from("?")) > 0 {
                String::from("?")
            } else {
                matched = false;
                break;
            };
            if sample_without_replacement {
                remaining.remove(&tile);
            }
        }
        if matched {
            return true;
        }

        // single letter tiles were not enough: exact cover when a
        // multi-letter tile occurs in the word
        let fallback = pool
            .iter()
            .any(|tile| tile.chars().count() > 1 && multi_letter_face_matches(tile, word));
        if !fallback {
            self.trace("No single-letter match and no multi-letter tile matches, done");
            return false;
        }

        self.trace("Falling back to exact cover");
        self.stats.dlx_used += 1;
        let word_chars: Vec<char> = word.chars().collect();

        // how many instances of each distinct tile get a DLX die column:
        // bounded by pool multiplicity without replacement, by occurrence
        // count otherwise
        let mut pool_counts: BTreeMap<&String, usize> = BTreeMap::new();
        for tile in pool {
            *pool_counts.entry(tile).or_default() += 1;
        }

        let mut tiles: Vec<&String> = Vec::new();
        for (tile, &count) in &pool_counts {
            let uses = if tile.as_str() == "?" {
                // with replacement a wildcard would already have matched
                if sample_without_replacement {
                    word_chars.len().min(count)
                } else {
                    0
                }
            } else {
                let (text, from) = match tile.strip_prefix('?') {
                    Some(rest) if !rest.is_empty() => (rest, 1),
                    _ => (tile.as_str(), 0),
                };
                let matches = occurrences(word, text, from);
                if sample_without_replacement {
                    matches.min(count)
                } else {
                    matches
                }
            };
            for _ in 0..uses {
                tiles.push(tile);
            }
        }

        let mut dlx = Dlx::new();
        for _ in 0..word_chars.len() + tiles.len() {
            dlx.add_column();
        }
        for (i, tile) in tiles.iter().enumerate() {
            let tile_column = word_chars.len() + i;
            add_face_rows(&mut dlx, tile, &word_chars, tile_column);
            dlx.add_row(&[tile_column]);
        }

        let found = dlx.solve_first();
        if found {
            self.trace("Exact cover found a solution, done");
            self.stats.dlx_found += 1;
        } else {
            self.trace("Exact cover found no solution, done");
        }
        found
    }
}

/// Retain letters (and `?` if `keep_wildcard`) from `s`, preserving case.
fn strip(s: &str, keep_wildcard: bool) -> String {
    s.chars()
        .filter(|&c| c.is_ascii_alphabetic() || (keep_wildcard && c == '?'))
        .collect()
}

/// Rewrite every `Q` to `QU`.
fn expand_qu(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        result.push(c);
        if c == 'Q' {
            result.push('U');
        }
    }
    result
}

/// Normalize dice faces: strip junk, uppercase, optionally expand `Q`.
fn prepared_dice(dice: &[Vec<String>], expand: bool) -> Vec<Vec<String>> {
    dice.iter()
        .map(|die| {
            die.iter()
                .map(|face| {
                    let face = strip(face, true).to_ascii_uppercase();
                    if expand {
                        expand_qu(&face)
                    } else {
                        face
                    }
                })
                .collect()
        })
        .collect()
}

/// Normalize a propensity pool: strip junk, uppercase.
fn prepared_pool(pool: &[String]) -> Vec<String> {
    pool.iter()
        .map(|tile| strip(tile, true).to_ascii_uppercase())
        .collect()
}

/// Does a multi-letter face justify the exact cover fallback? Either the
/// face occurs in the word, or it is a wildcard followed by fixed letters
/// that occur past the first position.
fn multi_letter_face_matches(face: &str, word: &str) -> bool {
    if let Some(rest) = face.strip_prefix('?') {
        !rest.is_empty() && occurrences(word, rest, 1) > 0
    } else {
        word.contains(face)
    }
}

/// Count occurrences of `text` in `word` starting at or after `from`
/// (overlapping, one per start position).
fn occurrences(word: &str, text: &str, from: usize) -> usize {
    if text.is_empty() {
        return 0;
    }
    let chars: Vec<char> = word.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let mut count = 0;
    let mut pos = from;
    while pos + text.len() <= chars.len() {
        if chars[pos..pos + text.len()] == text[..] {
            count += 1;
        }
        pos += 1;
    }
    count
}

/// Add exact cover rows for one die face (or pool tile) against the word:
/// a wildcard covers any one position, a fixed face covers each of its
/// occurrences, a wildcard-prefixed face covers the position before each
/// occurrence of its fixed part.
fn add_face_rows(dlx: &mut Dlx, face: &str, word_chars: &[char], die_column: usize) {
    if face == "?" {
        for k in 0..word_chars.len() {
            dlx.add_row(&[k, die_column]);
        }
        return;
    }

    let (text, start, wildcard) = match face.strip_prefix('?') {
        Some(rest) if !rest.is_empty() => (rest, 1, true),
        _ => (face, 0, false),
    };
    let text_chars: Vec<char> = text.chars().collect();
    if text_chars.is_empty() {
        return;
    }

    let mut pos = start;
    while pos + text_chars.len() <= word_chars.len() {
        if word_chars[pos..pos + text_chars.len()] == text_chars[..] {
            let mut columns: Vec<usize> = (pos..pos + text_chars.len()).collect();
            if wildcard {
                columns.push(pos - 1);
            }
            columns.push(die_column);
            dlx.add_row(&columns);
        }
        pos += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSet;
    use crate::distribution::LetterDistribution;
    use crate::rules::ScoringRules;

    fn dice_rules(dice: &str, q_is_qu: bool) -> (LetterDistribution, ScoringRules) {
        let mut letters = LetterDistribution::default();
        letters.method = Some(GenerationMethod::Dice);
        letters.set_dice_letters(dice);
        let mut scoring = ScoringRules::default();
        scoring.q_is_qu = q_is_qu;
        (letters, scoring)
    }

    fn prop_rules(
        tiles: &str,
        without_replacement: bool,
        q_is_qu: bool,
    ) -> (LetterDistribution, ScoringRules) {
        let mut letters = LetterDistribution::default();
        letters.method = Some(GenerationMethod::LetterPropensity);
        letters.set_propensity_letters(tiles);
        letters.sample_without_replacement = without_replacement;
        let mut scoring = ScoringRules::default();
        scoring.q_is_qu = q_is_qu;
        (letters, scoring)
    }

    fn rule_set<'a>(
        letters: &'a LetterDistribution,
        scoring: &'a ScoringRules,
    ) -> RuleSet<'a> {
        RuleSet {
            name: String::from("test"),
            grid: None,
            wordfile: None,
            scoring,
            letters: Some(letters),
            preferences: Default::default(),
        }
    }

    #[test]
    fn test_dice_word_single_letter() {
        let (letters, scoring) = dice_rules("AB,AC,T", false);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        assert!(validator.validate_word(&rules, "CAT"));
        assert_eq!(validator.stats().flow_found, 1);
        assert_eq!(validator.stats().dlx_used, 0);
        // only one die provides a T
        assert!(!validator.validate_word(&rules, "ATT"));
    }

    #[test]
    fn test_dice_word_wildcard_face() {
        let (letters, scoring) = dice_rules("?B,AC,T", false);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        assert!(validator.validate_word(&rules, "TAX"));
    }

    #[test]
    fn test_dice_word_qu_expansion() {
        // die faces are expanded to QU; the word covers positions 0-1
        // with the one multi-letter face, forcing the exact cover phase
        let (letters, scoring) = dice_rules("QX,I,T", true);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        assert!(validator.validate_word(&rules, "QUIT"));
        assert_eq!(validator.stats().dlx_used, 1);
        assert_eq!(validator.stats().dlx_found, 1);
    }

    #[test]
    fn test_dice_word_too_long() {
        let (letters, scoring) = dice_rules("QX,I,T", true);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        // 7 letters > capacity 4 (QU + I + T)
        assert!(!validator.validate_word(&rules, "QUIXOTE"));
        assert_eq!(validator.stats().long_words, 1);
        assert_eq!(validator.stats().dlx_used, 0);
    }

    #[test]
    fn test_dice_word_no_matching_multi_face() {
        let (letters, scoring) = dice_rules("ThE,B,C", false);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        // flow fails and TH does not occur in BEC
        assert!(!validator.validate_word(&rules, "BEC"));
        assert_eq!(validator.stats().dlx_used, 0);
    }

    #[test]
    fn test_dice_word_digraph_face() {
        let (letters, scoring) = dice_rules("ThA,E,N", false);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        assert!(validator.validate_word(&rules, "THEN"));
        assert_eq!(validator.stats().dlx_found, 1);
        // the TH face cannot double as a T
        assert!(!validator.validate_word(&rules, "TEN"));
    }

    #[test]
    fn test_flow_and_dlx_agree_on_single_letter_dice() {
        let (letters, scoring) = dice_rules("AB,AC,TN", false);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        for word in ["CAT", "BAN", "ANT", "TAB", "BAT"] {
            let by_flow = validator.validate_word(&rules, word);

            // decide the same instance with exact cover alone
            let dice = prepared_dice(&letters.dice, false);
            let word_chars: Vec<char> = word.chars().collect();
            let mut dlx = Dlx::new();
            for _ in 0..word_chars.len() + dice.len() {
                dlx.add_column();
            }
            for (i, die) in dice.iter().enumerate() {
                let die_column = word_chars.len() + i;
                for face in die {
                    add_face_rows(&mut dlx, face, &word_chars, die_column);
                }
                dlx.add_row(&[die_column]);
            }
            assert_eq!(by_flow, dlx.solve_first(), "{}", word);
        }
    }

    #[test]
    fn test_dice_board() {
        let (letters, scoring) = dice_rules("AB,AC,T", false);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        assert!(validator.validate_board(&rules, "BAT"));
        assert!(validator.validate_board(&rules, "CAT"));
        // a board need not use every die
        assert!(validator.validate_board(&rules, "AT"));
        // but no die offers a D
        assert!(!validator.validate_board(&rules, "DAT"));
        // both B tiles would need the same die
        assert!(!validator.validate_board(&rules, "BB"));
    }

    #[test]
    fn test_dice_board_digraph_tiles() {
        let (letters, scoring) = dice_rules("QuX,I,T", false);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        // the Qu tile matches the Qu face directly
        assert!(validator.validate_board(&rules, "QuIT"));
        assert!(!validator.validate_board(&rules, "QIT"));
    }

    #[test]
    fn test_dice_board_ignores_markers() {
        let (letters, scoring) = dice_rules("AB,AC,T", false);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        assert!(validator.validate_board(&rules, ":B;A T!"));
    }

    #[test]
    fn test_propensity_board() {
        let (letters, scoring) = prop_rules("AABC", true, false);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        assert!(validator.validate_board(&rules, "BACA"));
        assert!(validator.validate_board(&rules, "AA"));
        // three As exceed the pool
        assert!(!validator.validate_board(&rules, "AAA"));
    }

    #[test]
    fn test_propensity_board_with_replacement() {
        let (letters, scoring) = prop_rules("ABC", false, false);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        assert!(validator.validate_board(&rules, "AAAA"));
        assert!(!validator.validate_board(&rules, "AAD"));
    }

    #[test]
    fn test_propensity_word() {
        let (letters, scoring) = prop_rules("AABC", true, false);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        assert!(validator.validate_word(&rules, "CAB"));
        assert!(!validator.validate_word(&rules, "CABS"));
    }

    #[test]
    fn test_propensity_word_wildcard_tile() {
        let (letters, scoring) = prop_rules("AB?", true, false);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        // the wildcard stands in for the missing S
        assert!(validator.validate_word(&rules, "ABS"));
        assert!(!validator.validate_word(&rules, "ABSS"));
    }

    #[test]
    fn test_propensity_word_multi_letter_tile() {
        let (letters, scoring) = prop_rules("ThEN", true, false);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        assert!(validator.validate_word(&rules, "THEN"));
        assert_eq!(validator.stats().dlx_found, 1);
    }

    #[test]
    fn test_propensity_word_multiplicity_cap() {
        // one TH tile cannot cover two THs without replacement
        let (letters, scoring) = prop_rules("ThETE", true, false);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        assert!(!validator.validate_word(&rules, "THTHEE"));

        let (letters, scoring) = prop_rules("ThETE", false, false);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        assert!(validator.validate_word(&rules, "THTHEE"));
    }

    #[test]
    fn test_monotonicity() {
        // adding dice never invalidates a word
        let (letters, scoring) = dice_rules("AB,AC,T", false);
        let rules = rule_set(&letters, &scoring);
        let mut validator = Validator::new();
        assert!(validator.validate_word(&rules, "CAT"));

        let (more, scoring) = dice_rules("AB,AC,T,XY,Z", false);
        let rules = rule_set(&more, &scoring);
        assert!(validator.validate_word(&rules, "CAT"));
    }

    #[test]
    fn test_missing_distribution() {
        let scoring = ScoringRules::default();
        let rules = RuleSet {
            name: String::from("test"),
            grid: None,
            wordfile: None,
            scoring: &scoring,
            letters: None,
            preferences: Default::default(),
        };
        let mut validator = Validator::new();
        assert!(!validator.validate_word(&rules, "CAT"));
        assert!(!validator.validate_board(&rules, "CAT"));
    }

    #[test]
    fn test_expand_qu() {
        assert_eq!(expand_qu("Q"), "QU");
        assert_eq!(expand_qu("QQ"), "QUQU");
        assert_eq!(expand_qu("AQX"), "AQUX");
    }

    #[test]
    fn test_occurrences() {
        assert_eq!(occurrences("BANANA", "ANA", 0), 2);
        assert_eq!(occurrences("BANANA", "B", 1), 0);
        assert_eq!(occurrences("BANANA", "NA", 1), 2);
    }
}
