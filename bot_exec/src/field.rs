//! # Field configuration
//!
//! At the start of the match the driver station supplies a short code giving, from the robot's
//! perspective, which side of each field element belongs to the robot's alliance. Each character
//! is either `L` or `R`, the first character refers to the near element.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A parsed field configuration code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConfig {
    code: String,
    near: FieldSide,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Side of a field element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldSide {
    Left,
    Right,
}

/// Reasons a field configuration code can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldConfigError {
    #[error("No field configuration has been received")]
    Missing,

    #[error("The field configuration is empty")]
    Empty,

    #[error("The field configuration is too short ({len} characters, expected at least {min})")]
    TooShort { len: usize, min: usize },

    #[error("Unrecognised field element side '{0}' (expected 'L' or 'R')")]
    UnrecognisedSide(char),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FieldConfig {
    /// Parse a field configuration code received from the driver station.
    ///
    /// Only the near element is interpreted, the remaining characters just
    /// have to be present.
    pub fn parse(code: Option<&str>, min_len: usize) -> Result<Self, FieldConfigError> {
        let code = code.ok_or(FieldConfigError::Missing)?.trim();

        let first = code.chars().next().ok_or(FieldConfigError::Empty)?;

        let len = code.chars().count();
        if len < min_len {
            return Err(FieldConfigError::TooShort { len, min: min_len });
        }

        let near = FieldSide::from_char(first).ok_or(FieldConfigError::UnrecognisedSide(first))?;

        Ok(Self {
            code: code.to_string(),
            near,
        })
    }

    /// Side of the near element.
    pub fn near(&self) -> FieldSide {
        self.near
    }

    /// Side of the element at the given position in the code, if the character there is valid.
    pub fn element(&self, index: usize) -> Option<FieldSide> {
        self.code.chars().nth(index).and_then(FieldSide::from_char)
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl FieldSide {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'L' => Some(FieldSide::Left),
            'R' => Some(FieldSide::Right),
            _ => None,
        }
    }
}

impl Display for FieldSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSide::Left => write!(f, "L"),
            FieldSide::Right => write!(f, "R"),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
