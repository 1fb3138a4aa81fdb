use thiserror::Error;

/// Everything that can go wrong while building a game from configuration.
///
/// Gameplay itself has no failure modes: refused transitions and short
/// energy are reported through `bool` results instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("formation entry at row {row}, col {col} is {value}; expected 0 or 1")]
    MalformedFormation { row: usize, col: usize, value: u8 },

    #[error("formation has no cells")]
    EmptyFormation,

    #[error("formation row {row} has {found} columns, expected {expected}")]
    RaggedFormation {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("formation anchor ({row}, {col}) lies outside the {rows}x{cols} grid")]
    AnchorOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
