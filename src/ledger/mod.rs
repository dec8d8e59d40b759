//! Ledger rows parsed out of OCR text

pub mod parser;
pub mod summary;

use serde::Serialize;
use std::fmt;

pub use parser::{parse_fragment, parse_fragments};

/// One row of the gift ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    /// Giver's name, 2 to 4 Hangul syllables, or empty
    pub name: String,
    /// Amount exactly as written (commas kept), or empty
    pub amount: String,
    /// Formatted guest-count notes, e.g. "대 2인, 소 1인"
    pub notes: String,
    /// Confidence of the OCR fragment the row came from
    pub confidence: f32,
}

/// Size class of accompanying guests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GuestCategory {
    /// Written 大
    Large,
    /// Written 소 or 小
    Small,
}

impl GuestCategory {
    /// Map a marker character to its category. Unknown markers yield `None`.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "大" => Some(Self::Large),
            "소" | "小" => Some(Self::Small),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Large => "대",
            Self::Small => "소",
        }
    }
}

/// A guest-count annotation such as 大2
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuestNote {
    pub category: GuestCategory,
    /// Digits as written
    pub count: String,
}

impl fmt::Display for GuestNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}인", self.category.label(), self.count)
    }
}
