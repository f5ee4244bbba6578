use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Integer amount in minor units. Balances may go negative, flows and capacities never do.
///
/// There are no operator impls: every sum or difference goes through a
/// checked method so an unrepresentable total surfaces as `None`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(pub i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn as_minor(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    pub fn checked_neg(self) -> Option<Money> {
        self.0.checked_neg().map(Money)
    }

    /// Sums in i128 and narrows once, so only the final total has to fit.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(iter: I) -> Option<Money> {
        let total: i128 = iter.into_iter().map(|m| i128::from(m.0)).sum();
        i64::try_from(total).ok().map(Money)
    }

    /// Clamps negative values to zero.
    pub fn non_negative(self) -> Money {
        Money(self.0.max(0))
    }
}

impl FromStr for Money {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Money)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Money;

    #[test]
    fn parses_signed_integers_with_whitespace() {
        assert_eq!(" 42 ".parse::<Money>().unwrap(), Money(42));
        assert_eq!("-7".parse::<Money>().unwrap(), Money(-7));
        assert!("1.5".parse::<Money>().is_err());
    }

    #[test]
    fn checked_arithmetic_detects_overflow() {
        assert_eq!(Money(i64::MAX).checked_add(Money(1)), None);
        assert_eq!(Money(i64::MIN).checked_sub(Money(1)), None);
        assert_eq!(Money(5).checked_sub(Money(7)), Some(Money(-2)));
    }

    #[test]
    fn sums_and_clamps() {
        let total = Money::checked_sum([Money(3), Money(-1), Money(10)]);
        assert_eq!(total, Some(Money(12)));
        assert_eq!(Money(-4).non_negative(), Money::ZERO);
    }

    #[test]
    fn sum_fails_only_when_the_total_does_not_fit() {
        assert_eq!(Money::checked_sum([Money(i64::MAX), Money(1)]), None);
        // intermediate exceeds i64 but the total fits
        assert_eq!(
            Money::checked_sum([Money(i64::MAX), Money(1), Money(-2)]),
            Some(Money(i64::MAX - 1))
        );
        assert_eq!(Money(i64::MIN).checked_neg(), None);
    }
}
