use std::fmt;
use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Number of isolated namespaces exposed by the backend.
pub const SLOT_COUNT: usize = 16;

/// A validated backend namespace index in `[0, 16)`.
///
/// The only way to obtain a `Slot` is through [`Slot::new`] or
/// [`Slot::parse`], so holding one means the range check already happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Slot(u8);

impl Slot {
    /// Validate an integer slot.
    ///
    /// # Errors
    /// Returns [`CoreError::SlotOutOfRange`] if `value` is negative or `>= 16`.
    pub fn new(value: i64) -> Result<Self, CoreError> {
        match u8::try_from(value) {
            Ok(v) if usize::from(v) < SLOT_COUNT => Ok(Self(v)),
            _ => Err(CoreError::SlotOutOfRange { slot: value.to_string() }),
        }
    }

    /// Parse a slot from a request token.
    ///
    /// Surrounding whitespace and a leading `+` are accepted. Integers too
    /// large for `i64` are still integers, so they report as out of range
    /// rather than as unparseable. Underscore digit separators such as `1_5`
    /// are not integers here.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidSlot`] if the token is not an integer, or
    /// [`CoreError::SlotOutOfRange`] if it is one outside `[0, 16)`.
    pub fn parse(token: &str) -> Result<Self, CoreError> {
        let trimmed = token.trim();
        match trimmed.parse::<i64>() {
            Ok(value) => Self::new(value),
            Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                Err(CoreError::SlotOutOfRange { slot: trimmed.to_owned() })
            }
            Err(_) => Err(CoreError::InvalidSlot { token: token.to_owned() }),
        }
    }

    /// Index of this slot, usable for fixed-size per-slot tables.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Every slot, in ascending order.
    pub fn all() -> impl Iterator<Item = Slot> {
        (0..SLOT_COUNT).filter_map(|i| u8::try_from(i).ok()).map(Slot)
    }
}

impl TryFrom<i64> for Slot {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Slot> for i64 {
    fn from(slot: Slot) -> Self {
        i64::from(slot.0)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn slot_parse_accepts_whitespace_and_plus_sign() {
        assert_eq!(Slot::parse(" 3 ").map(Slot::index), Ok(3));
        assert_eq!(Slot::parse("+15").map(Slot::index), Ok(15));
        assert_eq!(Slot::parse("0").map(Slot::index), Ok(0));
    }

    #[test]
    fn slot_parse_non_integer_is_invalid_not_out_of_range() {
        assert!(matches!(Slot::parse("abc"), Err(CoreError::InvalidSlot { .. })));
        assert!(matches!(Slot::parse(""), Err(CoreError::InvalidSlot { .. })));
        assert!(matches!(Slot::parse("1.5"), Err(CoreError::InvalidSlot { .. })));
        assert!(matches!(Slot::parse("1_5"), Err(CoreError::InvalidSlot { .. })));
    }

    #[test]
    fn slot_parse_huge_integer_is_out_of_range() {
        let result = Slot::parse("99999999999999999999999");
        assert!(
            matches!(result, Err(CoreError::SlotOutOfRange { .. })),
            "overflowing integers must report out of range, got {result:?}"
        );
    }

    #[test]
    fn slot_all_yields_sixteen_distinct_slots() {
        let slots: Vec<Slot> = Slot::all().collect();
        assert_eq!(slots.len(), SLOT_COUNT);
        assert_eq!(slots.first().map(|s| s.index()), Some(0));
        assert_eq!(slots.last().map(|s| s.index()), Some(15));
    }

    #[test]
    fn slot_deserializes_from_integer_with_range_check() {
        let ok: Result<Slot, _> = serde_json::from_str("7");
        assert!(matches!(ok, Ok(s) if s.index() == 7));
        let bad: Result<Slot, _> = serde_json::from_str("16");
        assert!(bad.is_err(), "16 must be rejected on deserialize");
    }

    proptest! {
        #[test]
        fn slot_new_accepts_exactly_zero_to_fifteen(value in any::<i64>()) {
            let result = Slot::new(value);
            if (0..16).contains(&value) {
                prop_assert_eq!(result.map(i64::from), Ok(value));
            } else {
                let is_out_of_range = matches!(result, Err(CoreError::SlotOutOfRange { .. }));
                prop_assert!(is_out_of_range);
            }
        }

        #[test]
        fn slot_parse_agrees_with_new(value in -1000_i64..1000) {
            prop_assert_eq!(Slot::parse(&value.to_string()), Slot::new(value));
        }
    }
}
