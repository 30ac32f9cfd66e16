use std::fmt;

use serde::{Serialize, Serializer};

/// Message shown when a training label is not a single digit.
pub const LABEL_HINT: &str = "Enter a single digit (0–9)";

/// A validated decimal digit, used both as a training label and as a prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DigitLabel(u8);

/// Raised when label text is not exactly one decimal digit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{LABEL_HINT}; got {input:?}")]
pub struct InvalidLabel {
    pub input: String,
}

impl DigitLabel {
    /// Parse user text; surrounding whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self, InvalidLabel> {
        let trimmed = text.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if ch.is_ascii_digit() => Ok(Self(ch as u8 - b'0')),
            _ => Err(InvalidLabel {
                input: text.to_string(),
            }),
        }
    }

    pub fn from_value(value: u8) -> Option<Self> {
        (value <= 9).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for DigitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for DigitLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_single_digit_with_whitespace() {
        assert_eq!(DigitLabel::parse("5").unwrap().value(), 5);
        assert_eq!(DigitLabel::parse(" 0\n").unwrap().value(), 0);
        assert_eq!(DigitLabel::parse("9").unwrap().to_string(), "9");
    }

    #[test]
    fn rejects_everything_else() {
        for input in ["", " ", "ab", "12", "-1", "٣", "5a", "x"] {
            let err = DigitLabel::parse(input).unwrap_err();
            assert_eq!(err.input, input);
            assert!(err.to_string().starts_with(LABEL_HINT));
        }
    }

    #[test]
    fn from_value_bounds_to_digits() {
        assert_eq!(DigitLabel::from_value(7).map(DigitLabel::value), Some(7));
        assert_eq!(DigitLabel::from_value(10), None);
    }

    #[test]
    fn serializes_as_number() {
        let label = DigitLabel::parse("3").unwrap();
        assert_eq!(serde_json::to_string(&label).unwrap(), "3");
    }
}
