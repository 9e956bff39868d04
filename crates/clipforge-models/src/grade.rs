//! Virality letter grades.
//!
//! Grades are always derivable from the 0.0-1.0 virality score; a stored
//! grade that disagrees with the score-derived one is never authoritative.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter-grade bucket for a virality score.
///
/// Variants are declared worst-to-best so the derived ordering makes
/// `Grade::APlus` the maximum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Grade {
    #[serde(rename = "F")]
    F,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    /// Derive the grade from a 0.0-1.0 virality score.
    ///
    /// Thresholds are strict and applied top-down; the first match wins.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.97 {
            Grade::APlus
        } else if score >= 0.93 {
            Grade::A
        } else if score >= 0.90 {
            Grade::AMinus
        } else if score >= 0.87 {
            Grade::BPlus
        } else if score >= 0.83 {
            Grade::B
        } else if score >= 0.80 {
            Grade::BMinus
        } else if score >= 0.77 {
            Grade::CPlus
        } else if score >= 0.73 {
            Grade::C
        } else if score >= 0.70 {
            Grade::CMinus
        } else if score >= 0.65 {
            Grade::DPlus
        } else if score >= 0.60 {
            Grade::D
        } else {
            Grade::F
        }
    }

    /// Parse a letter grade as emitted by the model ("A+", "b-", ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A+" => Some(Grade::APlus),
            "A" => Some(Grade::A),
            "A-" => Some(Grade::AMinus),
            "B+" => Some(Grade::BPlus),
            "B" => Some(Grade::B),
            "B-" => Some(Grade::BMinus),
            "C+" => Some(Grade::CPlus),
            "C" => Some(Grade::C),
            "C-" => Some(Grade::CMinus),
            "D+" => Some(Grade::DPlus),
            "D" => Some(Grade::D),
            "F" => Some(Grade::F),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::DPlus => "D+",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
