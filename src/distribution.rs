/// How random boards are produced from a letter distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMethod {
    /// A fixed set of dice, one face showing per board position.
    Dice,
    /// A pool of tiles drawn with or without replacement.
    LetterPropensity,
    /// Whole boards taken from a word list file.
    WordList,
}

/// The letter distribution for a game: the raw material random boards are
/// made from, and the reference for validating entered boards and words.
#[derive(Debug, Clone)]
pub struct LetterDistribution {
    pub method: Option<GenerationMethod>,
    /// Each die is a list of face strings.
    pub dice: Vec<Vec<String>>,
    /// Ordered tile pool for propensity games.
    pub propensity: Vec<String>,
    pub word_list_file: String,
    pub shuffle_letters: bool,
    pub sample_without_replacement: bool,
    pub shuffle_dice: bool,
}

impl Default for LetterDistribution {
    fn default() -> Self {
        LetterDistribution {
            method: None,
            dice: Vec::new(),
            propensity: Vec::new(),
            word_list_file: String::new(),
            shuffle_letters: true,
            sample_without_replacement: true,
            shuffle_dice: true,
        }
    }
}

/// Split a tile list string into tile tokens.
///
/// Uppercase letters, `?` and `.` each start a token; lowercase letters
/// extend the previous token; `:` and `;` multiplier markers prefix the next
/// token. Anything else is ignored.
fn parse_tiles(letters: &str) -> Vec<String> {
    let mut tiles = Vec::new();
    let mut pending = String::new();
    for c in letters.chars() {
        match c {
            ':' | ';' => pending.push(c),
            'A'..='Z' | '?' | '.' => {
                pending.push(c);
                tiles.push(std::mem::take(&mut pending));
            }
            'a'..='z' => {
                if let Some(tile) = tiles.last_mut() {
                    tile.push(c);
                }
            }
            _ => {}
        }
    }
    tiles
}

impl LetterDistribution {
    /// Set the dice from a face list string. Dice are separated by commas;
    /// faces follow the tile token grammar.
    ///
    /// ## Examples
    /// ```
    /// use wordgrid_solver::LetterDistribution;
    ///
    /// let mut letters = LetterDistribution::default();
    /// letters.set_dice_letters("AB,QuX");
    /// assert_eq!(letters.dice, vec![vec!["A", "B"], vec!["Qu", "X"]]);
    /// ```
    pub fn set_dice_letters(&mut self, letters: &str) {
        self.dice.clear();
        let mut pending = String::new();
        let mut sides: Vec<String> = Vec::new();
        for c in letters.chars() {
            match c {
                ':' | ';' => pending.push(c),
                'A'..='Z' | '?' | '.' => {
                    pending.push(c);
                    sides.push(std::mem::take(&mut pending));
                }
                'a'..='z' => {
                    if let Some(side) = sides.last_mut() {
                        side.push(c);
                    }
                }
                ',' => {
                    if !sides.is_empty() {
                        self.dice.push(std::mem::take(&mut sides));
                        pending.clear();
                    }
                }
                _ => {}
            }
        }
        if !sides.is_empty() {
            self.dice.push(sides);
        }
    }

    /// Set the propensity pool from a tile list string.
    pub fn set_propensity_letters(&mut self, letters: &str) {
        self.propensity = parse_tiles(letters);
    }
}
