//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A berth reference did not have the `<coach>-<berth>` shape.
    #[error("invalid berth reference: {value} (expected e.g. S1-23)")]
    InvalidBerthId { value: String },

    /// Unknown berth type code.
    #[error("unknown berth type: {value}")]
    UnknownBerthType { value: String },

    /// Unknown coach class code.
    #[error("unknown coach class: {value}")]
    UnknownCoachClass { value: String },

    /// Unknown gender code.
    #[error("unknown gender: {value}")]
    UnknownGender { value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                let trimmed = id.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                if trimmed.len() == id.len() {
                    Ok(Self(id))
                } else {
                    Ok(Self(trimmed.to_string()))
                }
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A passenger name record number.
    ///
    /// PNRs identify a single passenger within one train manifest.
    Pnr, "PNR"
);

define_string_id!(
    /// A coach number such as `S1` or `B2`.
    CoachNo, "coach number"
);

/// A berth reference: coach number plus berth number, written `S1-23`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BerthId {
    pub coach: CoachNo,
    pub berth_no: u16,
}

impl BerthId {
    pub const fn new(coach: CoachNo, berth_no: u16) -> Self {
        Self { coach, berth_no }
    }
}

impl fmt::Display for BerthId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.coach, self.berth_no)
    }
}

impl FromStr for BerthId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidBerthId {
            value: s.to_string(),
        };
        let (coach, berth) = s.trim().rsplit_once('-').ok_or_else(invalid)?;
        let coach = CoachNo::new(coach).map_err(|_| invalid())?;
        let berth_no: u16 = berth.parse().map_err(|_| invalid())?;
        if berth_no == 0 {
            return Err(invalid());
        }
        Ok(Self { coach, berth_no })
    }
}

impl TryFrom<String> for BerthId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BerthId> for String {
    fn from(id: BerthId) -> Self {
        id.to_string()
    }
}

/// Sleeping configuration of a berth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BerthType {
    #[serde(rename = "LB")]
    Lower,
    #[serde(rename = "MB")]
    Middle,
    #[serde(rename = "UB")]
    Upper,
    #[serde(rename = "SL")]
    SideLower,
    #[serde(rename = "SU")]
    SideUpper,
}

/// Berth types of one eight-berth bay, in berth-number order.
const BAY_LAYOUT: [BerthType; 8] = [
    BerthType::Lower,
    BerthType::Middle,
    BerthType::Upper,
    BerthType::Lower,
    BerthType::Middle,
    BerthType::Upper,
    BerthType::SideLower,
    BerthType::SideUpper,
];

impl BerthType {
    /// Berth type for a 1-based berth number in a standard bay layout.
    pub const fn for_berth_no(berth_no: u16) -> Self {
        BAY_LAYOUT[(berth_no.saturating_sub(1) % 8) as usize]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Lower => "LB",
            Self::Middle => "MB",
            Self::Upper => "UB",
            Self::SideLower => "SL",
            Self::SideUpper => "SU",
        }
    }
}

impl fmt::Display for BerthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for BerthType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LB" | "LOWER" => Ok(Self::Lower),
            "MB" | "MIDDLE" => Ok(Self::Middle),
            "UB" | "UPPER" => Ok(Self::Upper),
            "SL" | "SIDE LOWER" => Ok(Self::SideLower),
            "SU" | "SIDE UPPER" => Ok(Self::SideUpper),
            _ => Err(ValidationError::UnknownBerthType {
                value: s.to_string(),
            }),
        }
    }
}

/// Travel class of a coach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoachClass {
    #[serde(rename = "SL")]
    Sleeper,
    #[serde(rename = "3A")]
    ThreeTierAc,
}

impl CoachClass {
    /// Number of berths in a coach of this class.
    pub const fn capacity(self) -> u16 {
        match self {
            Self::Sleeper => 72,
            Self::ThreeTierAc => 64,
        }
    }

    /// Prefix used for coach numbers (`S1`, `B1`).
    pub const fn coach_prefix(self) -> char {
        match self {
            Self::Sleeper => 'S',
            Self::ThreeTierAc => 'B',
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Sleeper => "SL",
            Self::ThreeTierAc => "3A",
        }
    }
}

impl fmt::Display for CoachClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for CoachClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SL" | "SLEEPER" => Ok(Self::Sleeper),
            "3A" | "AC_3_TIER" | "THREE_TIER_AC" => Ok(Self::ThreeTierAc),
            _ => Err(ValidationError::UnknownCoachClass {
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl Gender {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Other => "O",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "M" | "MALE" => Ok(Self::Male),
            "F" | "FEMALE" => Ok(Self::Female),
            "O" | "OTHER" => Ok(Self::Other),
            _ => Err(ValidationError::UnknownGender {
                value: s.to_string(),
            }),
        }
    }
}
