//! Binary labels given by workers and carried as gold truth.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::PosteriorError;

/// A binary label `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// z = 0
    Negative,
    /// z = 1
    Positive,
}

impl Label {
    /// Both labels, negative first.
    pub const ALL: [Label; 2] = [Label::Negative, Label::Positive];

    /// Convert a raw integer label, rejecting anything but 0 and 1.
    pub fn from_raw(value: i64) -> Result<Self, PosteriorError> {
        match value {
            0 => Ok(Self::Negative),
            1 => Ok(Self::Positive),
            _ => Err(PosteriorError::InvalidLabel { value }),
        }
    }

    /// The label as 0 or 1.
    pub fn as_raw(self) -> u8 {
        match self {
            Self::Negative => 0,
            Self::Positive => 1,
        }
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Self::Positive)
    }
}

impl TryFrom<i64> for Label {
    type Error = PosteriorError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_raw(value)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_raw())
    }
}
