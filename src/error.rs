use thiserror::Error;

#[derive(Error, Debug)]
/// Errors that can be returned
pub enum Error {
    /// Error reading a word list file
    #[error("Wordfile \"{path}\" could not be read")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    /// Error reading the configuration file
    #[error("Config file \"{path}\" could not be read")]
    ConfigReadError {
        path: String,
        source: std::io::Error,
    },

    /// The configuration file is not a valid JSON document
    #[error("Config file \"{path}\" could not be parsed")]
    ConfigParseError {
        path: String,
        source: serde_json::Error,
    },

    /// The requested game is not defined in the configuration
    #[error("Game \"{0}\" is not defined in the configuration")]
    UnknownGame(String),

    /// A game references a named record that does not exist
    #[error("Game \"{game}\" references unknown {kind} \"{name}\"")]
    UnknownReference {
        game: String,
        kind: &'static str,
        name: String,
    },

    /// The game has no dictionary to solve with
    #[error("Game \"{0}\" has no dictionary configured")]
    MissingDictionary(String),

    /// Error parsing an adjacency tag from the configuration
    #[error("Invalid grid adjacency: \"{0}\"")]
    AdjacencyParseError(String),

    /// Targeted board generation needs a dice or propensity distribution
    #[error("Board generation is not supported for this letter distribution")]
    UnsupportedGeneration,
}
