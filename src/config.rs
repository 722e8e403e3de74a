use crate::distribution::{GenerationMethod, LetterDistribution};
use crate::grid::GridLayout;
use crate::rules::ScoringRules;
use crate::Error;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::read_to_string;

/// A string to string preference map attached to a game (output formats
/// and the like).
#[derive(Debug, Default, Clone)]
pub struct Preferences(HashMap<String, String>);

impl Preferences {
    /// Look up `key`, empty when unset.
    pub fn preference(&self, key: &str) -> &str {
        self.0.get(key).map_or("", String::as_str)
    }

    pub fn set_preference(&mut self, key: &str, value: &str) {
        self.0.insert(String::from(key), String::from(value));
    }

    /// Copy entries from `defaults` that this map does not set itself.
    fn inherit(&mut self, defaults: &Preferences) {
        for (key, value) in &defaults.0 {
            self.0.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
}

/// A named game: references into the other configuration sections.
#[derive(Debug, Default, Clone)]
pub struct GameRules {
    pub grid_design: String,
    pub scoring_rules: String,
    pub letter_distribution: String,
    pub dictionary: String,
    pub preferences: String,
}

/// The loaded configuration: named grids, dictionaries, scoring rules,
/// letter distributions, games and preferences.
#[derive(Debug, Default)]
pub struct Config {
    pub grids: HashMap<String, GridLayout>,
    pub dictionaries: HashMap<String, String>,
    pub scoring_rules: HashMap<String, ScoringRules>,
    pub distributions: HashMap<String, LetterDistribution>,
    pub games: HashMap<String, GameRules>,
    pub preferences: HashMap<String, Preferences>,
}

/// The resolved rule set for one game. Grid, dictionary and letter
/// distribution are optional; commands that need a missing one fail at
/// the point of use.
#[derive(Debug)]
pub struct RuleSet<'a> {
    pub name: String,
    pub grid: Option<&'a GridLayout>,
    pub wordfile: Option<&'a str>,
    pub scoring: &'a ScoringRules,
    pub letters: Option<&'a LetterDistribution>,
    pub preferences: Preferences,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawGrid {
    #[serde(rename = "Tiles")]
    tiles: Vec<Value>,
    #[serde(rename = "Adjacency")]
    adjacency: String,
}

#[derive(Deserialize)]
#[serde(default)]
struct RawScoringRules {
    #[serde(rename = "QIsQu")]
    q_is_qu: bool,
    #[serde(rename = "QuLength")]
    qu_length: usize,
    #[serde(rename = "MinWordLength")]
    min_word_length: usize,
    #[serde(rename = "ShortWordLength")]
    short_word_length: usize,
    #[serde(rename = "ShortWordPoints")]
    short_word_points: u32,
    #[serde(rename = "ShortWordMultiplier")]
    short_word_multiplier: bool,
    #[serde(rename = "WildCardPoints")]
    wild_card_points: bool,
    #[serde(rename = "RoundBonusUp")]
    round_bonus_up: bool,
    #[serde(rename = "MultiplyLengthBonus")]
    multiply_length_bonus: bool,
    #[serde(rename = "RandomBoardSize")]
    random_board_size: usize,
    #[serde(rename = "LetterValues")]
    letter_values: HashMap<String, u32>,
    #[serde(rename = "LengthBonuses")]
    length_bonuses: HashMap<String, f64>,
}

impl Default for RawScoringRules {
    fn default() -> Self {
        RawScoringRules {
            q_is_qu: true,
            qu_length: 2,
            min_word_length: 1,
            short_word_length: 0,
            short_word_points: 0,
            short_word_multiplier: false,
            wild_card_points: false,
            round_bonus_up: false,
            multiply_length_bonus: false,
            random_board_size: 0,
            letter_values: HashMap::new(),
            length_bonuses: HashMap::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawDistribution {
    #[serde(rename = "GenerationMethod")]
    generation_method: String,
    #[serde(rename = "DiceLetters")]
    dice_letters: String,
    #[serde(rename = "PropensityLetters")]
    propensity_letters: String,
    #[serde(rename = "WordListFile")]
    word_list_file: String,
    #[serde(rename = "ShuffleLetters")]
    shuffle_letters: bool,
    #[serde(rename = "SampleWithoutReplacement")]
    sample_without_replacement: bool,
    #[serde(rename = "ShuffleDice")]
    shuffle_dice: bool,
}

impl Default for RawDistribution {
    fn default() -> Self {
        RawDistribution {
            generation_method: String::new(),
            dice_letters: String::new(),
            propensity_letters: String::new(),
            word_list_file: String::new(),
            shuffle_letters: true,
            sample_without_replacement: true,
            shuffle_dice: true,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawGameRules {
    #[serde(rename = "GridDesign")]
    grid_design: String,
    #[serde(rename = "ScoringRules")]
    scoring_rules: String,
    #[serde(rename = "LetterDistribution")]
    letter_distribution: String,
    #[serde(rename = "Dictionary")]
    dictionary: String,
    #[serde(rename = "Preferences")]
    preferences: String,
}

impl Config {
    /// Read a configuration document from `path`.
    ///
    /// The document is a JSON object with `Grids`, `Dictionaries`,
    /// `ScoringRules`, `LetterDistributions`, `GameRules` and
    /// `Preferences` sections. Unknown fields are ignored; an entry that
    /// fails to parse is reported on stderr and skipped.
    ///
    /// ## Errors
    /// Fails if the file can not be read or is not valid JSON.
    pub fn from_file(path: &str) -> Result<Config, Error> {
        let contents = read_to_string(path).map_err(|source| Error::ConfigReadError {
            path: String::from(path),
            source,
        })?;
        let root: Value =
            serde_json::from_str(&contents).map_err(|source| Error::ConfigParseError {
                path: String::from(path),
                source,
            })?;
        Ok(Config::from_value(&root))
    }

    /// Build a configuration from an already parsed JSON document.
    pub fn from_value(root: &Value) -> Config {
        let mut config = Config::default();

        for (name, data) in entries(root, "Grids") {
            match serde_json::from_value::<RawGrid>(data.clone()) {
                Ok(raw) => {
                    if let Some(grid) = read_grid(name, &raw) {
                        config.grids.insert(name.clone(), grid);
                    }
                }
                Err(err) => warn_entry("grid", name, &err),
            }
        }

        for (name, data) in entries(root, "Dictionaries") {
            match data.as_str() {
                Some(file) => {
                    config.dictionaries.insert(name.clone(), String::from(file));
                }
                None => eprintln!(
                    "Error processing config: dictionary \"{}\" is not a file name",
                    name
                ),
            }
        }

        for (name, data) in entries(root, "ScoringRules") {
            match serde_json::from_value::<RawScoringRules>(data.clone()) {
                Ok(raw) => {
                    config.scoring_rules.insert(name.clone(), read_scoring(name, &raw));
                }
                Err(err) => warn_entry("scoring rules", name, &err),
            }
        }

        for (name, data) in entries(root, "LetterDistributions") {
            match serde_json::from_value::<RawDistribution>(data.clone()) {
                Ok(raw) => {
                    config.distributions.insert(name.clone(), read_distribution(name, &raw));
                }
                Err(err) => warn_entry("letter distribution", name, &err),
            }
        }

        for (name, data) in entries(root, "GameRules") {
            match serde_json::from_value::<RawGameRules>(data.clone()) {
                Ok(raw) => {
                    config.games.insert(
                        name.clone(),
                        GameRules {
                            grid_design: raw.grid_design,
                            scoring_rules: raw.scoring_rules,
                            letter_distribution: raw.letter_distribution,
                            dictionary: raw.dictionary,
                            preferences: raw.preferences,
                        },
                    );
                }
                Err(err) => warn_entry("game rules", name, &err),
            }
        }

        for (name, data) in entries(root, "Preferences") {
            match serde_json::from_value::<HashMap<String, String>>(data.clone()) {
                Ok(map) => {
                    config.preferences.insert(name.clone(), Preferences(map));
                }
                Err(err) => warn_entry("preferences", name, &err),
            }
        }

        config
    }

    /// Resolve the rule set for `game`.
    ///
    /// ## Errors
    /// If the game is unknown, or its scoring rules reference dangles.
    /// Grid, dictionary, letter distribution and preferences references
    /// may be absent or dangling; those resolve to `None`/empty.
    pub fn rule_set<'a>(&'a self, game: &str) -> Result<RuleSet<'a>, Error> {
        let rules = self
            .games
            .get(game)
            .ok_or_else(|| Error::UnknownGame(String::from(game)))?;

        let scoring = self.scoring_rules.get(&rules.scoring_rules).ok_or_else(|| {
            Error::UnknownReference {
                game: String::from(game),
                kind: "scoring rules",
                name: rules.scoring_rules.clone(),
            }
        })?;

        let mut preferences = self
            .preferences
            .get(&rules.preferences)
            .cloned()
            .unwrap_or_default();
        if let Some(defaults) = self.preferences.get("Default") {
            preferences.inherit(defaults);
        }

        Ok(RuleSet {
            name: String::from(game),
            grid: self.grids.get(&rules.grid_design),
            wordfile: self
                .dictionaries
                .get(&rules.dictionary)
                .map(String::as_str),
            scoring,
            letters: self.distributions.get(&rules.letter_distribution),
            preferences,
        })
    }
}

fn entries<'a>(root: &'a Value, section: &str) -> Vec<(&'a String, &'a Value)> {
    root.get(section)
        .and_then(Value::as_object)
        .map(|map| map.iter().collect())
        .unwrap_or_default()
}

fn warn_entry(kind: &str, name: &str, err: &serde_json::Error) {
    eprintln!(
        "Error processing config: while processing {} \"{}\": {}",
        kind, name, err
    );
}

fn read_grid(name: &str, raw: &RawGrid) -> Option<GridLayout> {
    let adjacency = if raw.adjacency.is_empty() {
        crate::grid::Adjacency::Full
    } else {
        match raw.adjacency.parse() {
            Ok(adjacency) => adjacency,
            Err(_) => {
                eprintln!(
                    "Error processing config: grid \"{}\" has invalid adjacency \"{}\"",
                    name, raw.adjacency
                );
                return None;
            }
        }
    };
    let mut grid = GridLayout::new(adjacency);
    for (i, tile) in raw.tiles.iter().enumerate() {
        let pair = serde_json::from_value::<(i64, i64)>(tile.clone()).ok();
        match pair {
            Some((x, y)) if (1..=10).contains(&x) && (1..=10).contains(&y) => {
                grid.set_cell(x as usize - 1, y as usize - 1);
            }
            Some((x, y)) => eprintln!(
                "Error processing config: grid \"{}\": position {},{} is out of range for tile #{}",
                name,
                x,
                y,
                i + 1
            ),
            None => eprintln!(
                "Error processing config: grid \"{}\": invalid tile specification for tile #{}",
                name,
                i + 1
            ),
        }
    }
    Some(grid)
}

fn read_scoring(name: &str, raw: &RawScoringRules) -> ScoringRules {
    let mut scoring = ScoringRules::default();
    scoring.q_is_qu = raw.q_is_qu;
    scoring.qu_length = raw.qu_length;
    scoring.min_word_length = raw.min_word_length;
    scoring.short_word_length = raw.short_word_length;
    scoring.short_word_points = raw.short_word_points;
    scoring.short_word_multiplier = raw.short_word_multiplier;
    scoring.wild_card_points = raw.wild_card_points;
    scoring.round_bonus_up = raw.round_bonus_up;
    scoring.multiply_length_bonus = raw.multiply_length_bonus;
    scoring.random_board_size = raw.random_board_size;
    for (letter, &value) in &raw.letter_values {
        match letter.chars().next() {
            Some(c) if letter.chars().count() == 1 && c.is_ascii_alphabetic() => {
                scoring.set_letter_value(c, value);
            }
            _ => eprintln!(
                "Error processing config: scoring rules \"{}\": invalid letter \"{}\"",
                name, letter
            ),
        }
    }
    for (length, &bonus) in &raw.length_bonuses {
        match length.parse::<usize>() {
            Ok(length) => scoring.set_length_bonus(length, bonus),
            Err(_) => eprintln!(
                "Error processing config: scoring rules \"{}\": invalid length \"{}\"",
                name, length
            ),
        }
    }
    scoring
}

fn read_distribution(name: &str, raw: &RawDistribution) -> LetterDistribution {
    let method = match raw.generation_method.as_str() {
        "Dice" => Some(GenerationMethod::Dice),
        "LetterPropensity" => Some(GenerationMethod::LetterPropensity),
        "WordList" => Some(GenerationMethod::WordList),
        "" => None,
        other => {
            eprintln!(
                "Error processing config: letter distribution \"{}\" has unknown generation method \"{}\"",
                name, other
            );
            None
        }
    };
    let mut letters = LetterDistribution {
        method,
        word_list_file: raw.word_list_file.clone(),
        shuffle_letters: raw.shuffle_letters,
        sample_without_replacement: raw.sample_without_replacement,
        shuffle_dice: raw.shuffle_dice,
        ..LetterDistribution::default()
    };
    letters.set_dice_letters(&raw.dice_letters);
    letters.set_propensity_letters(&raw.propensity_letters);
    letters
}
