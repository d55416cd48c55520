use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CompareError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (threshold out of range, etc.).
    ConfigValidation(String),
    /// Catalog records could not be deserialized.
    CatalogParse(String),
    /// Fewer than two matched pairs; no variance, no test.
    InsufficientSample { count: usize },
}

impl fmt::Display for CompareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::CatalogParse(msg) => write!(f, "catalog parse error: {msg}"),
            Self::InsufficientSample { count } => {
                write!(f, "insufficient sample: need at least 2 matched pairs, found {count}")
            }
        }
    }
}

impl std::error::Error for CompareError {}

/// Why a raw unit-price string could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// Neither `" per "` nor `" / "` present.
    NoSeparator,
    /// Price segment does not start with `$`.
    MissingCurrency,
    InvalidPrice(String),
    InvalidQuantity(String),
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSeparator => write!(f, "no 'per' or '/' separator"),
            Self::MissingCurrency => write!(f, "price does not start with '$'"),
            Self::InvalidPrice(s) => write!(f, "invalid price '{s}'"),
            Self::InvalidQuantity(s) => write!(f, "invalid quantity '{s}'"),
        }
    }
}

impl std::error::Error for ParseFailure {}

/// Why two unit prices cannot be put on a common basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incomparable {
    UnitMismatch,
    UnknownUnit,
    /// Quantities are not exact integer multiples of each other.
    NotMultiple,
}

impl fmt::Display for Incomparable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnitMismatch => write!(f, "units differ"),
            Self::UnknownUnit => write!(f, "unit unknown"),
            Self::NotMultiple => write!(f, "quantities are not integer multiples"),
        }
    }
}

impl std::error::Error for Incomparable {}
