//! Row identifiers for boards, pieces and projects
//!
//! Stock rows are keyed by SQLite integer ids. Each kind gets its own newtype so a
//! piece id can never be passed where a board id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Raw integer value as stored in the database
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim().trim_start_matches('#');
                trimmed
                    .parse::<i64>()
                    .ok()
                    .filter(|v| *v > 0)
                    .map($name)
                    .ok_or_else(|| format!("Invalid {} id: '{}'", $label, s))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                $name(value)
            }
        }
    };
}

row_id!(
    /// Identifier of a board type in the catalog
    BoardId,
    "board"
);
row_id!(
    /// Identifier of a stock piece row
    PieceId,
    "piece"
);
row_id!(
    /// Identifier of a project (weak reference, owned by the surrounding application)
    ProjectId,
    "project"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_hash_prefixed() {
        assert_eq!("42".parse::<PieceId>().unwrap(), PieceId(42));
        assert_eq!("#7".parse::<BoardId>().unwrap(), BoardId(7));
        assert_eq!(" 3 ".parse::<ProjectId>().unwrap(), ProjectId(3));
    }

    #[test]
    fn test_parse_rejects_non_positive() {
        assert!("0".parse::<PieceId>().is_err());
        assert!("-4".parse::<PieceId>().is_err());
        assert!("abc".parse::<BoardId>().is_err());
    }

    #[test]
    fn test_display_is_raw_integer() {
        assert_eq!(PieceId(12).to_string(), "12");
    }
}
