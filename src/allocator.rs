//! Integer proportional split.
//!
//! Each share starts as the floor of `limit_i * amount / Σ limits`; the
//! leftover units go one at a time to the shares with the largest fractional
//! remainder (lowest index first on ties). The result is the nearest-integer
//! rounding of the proportional shares, corrected so that it sums to `amount`
//! exactly. Since `amount <= Σ limits`, no share can exceed its limit.

use crate::domain::Money;

/// Splits `amount` across `limits`.
///
/// Returns `None` if `amount` is negative, any limit is negative, or the
/// limits cannot cover `amount`.
pub fn split_proportionally(amount: Money, limits: &[Money]) -> Option<Vec<Money>> {
    if amount.is_negative() || limits.iter().any(Money::is_negative) {
        return None;
    }

    let amount = i128::from(amount.as_minor());
    let total: i128 = limits.iter().map(|l| i128::from(l.as_minor())).sum();
    if amount > total {
        return None;
    }
    if amount == 0 {
        return Some(vec![Money::ZERO; limits.len()]);
    }

    let mut shares = Vec::with_capacity(limits.len());
    let mut remainders = Vec::with_capacity(limits.len());
    for (index, limit) in limits.iter().enumerate() {
        let scaled = i128::from(limit.as_minor()) * amount;
        shares.push(scaled / total);
        remainders.push((scaled % total, index));
    }

    let mut residual = amount - shares.iter().sum::<i128>();
    remainders.sort_by(|(a, ia), (b, ib)| b.cmp(a).then(ia.cmp(ib)));
    for (_, index) in remainders {
        if residual == 0 {
            break;
        }
        shares[index] += 1;
        residual -= 1;
    }

    // each share is bounded by its i64 limit
    Some(
        shares
            .into_iter()
            .map(|s| Money(i64::try_from(s).unwrap_or(i64::MAX)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(values: &[i64]) -> Vec<Money> {
        values.iter().copied().map(Money).collect()
    }

    #[test]
    fn exact_proportions_need_no_correction() {
        assert_eq!(
            split_proportionally(Money(30), &money(&[10, 20, 30])),
            Some(money(&[5, 10, 15]))
        );
    }

    #[test]
    fn residual_goes_to_largest_remainders() {
        // 10 * 1/3 each: rounding alone would give 3 + 3 + 3 = 9
        assert_eq!(
            split_proportionally(Money(10), &money(&[1, 1, 1])),
            Some(money(&[4, 3, 3]))
        );
        // 2/3, 2/3, 2/3 of one unit each: rounding alone would give 3
        assert_eq!(
            split_proportionally(Money(2), &money(&[5, 5, 5])),
            Some(money(&[1, 1, 0]))
        );
    }

    #[test]
    fn larger_fraction_wins_over_index() {
        // raw shares 1.4, 2.6
        assert_eq!(
            split_proportionally(Money(4), &money(&[7, 13])),
            Some(money(&[1, 3]))
        );
    }

    #[test]
    fn full_amount_saturates_every_limit() {
        assert_eq!(
            split_proportionally(Money(17), &money(&[3, 0, 9, 5])),
            Some(money(&[3, 0, 9, 5]))
        );
    }

    #[test]
    fn zero_amount_is_all_zero() {
        assert_eq!(
            split_proportionally(Money(0), &money(&[0, 0])),
            Some(money(&[0, 0]))
        );
        assert_eq!(split_proportionally(Money(0), &[]), Some(vec![]));
    }

    #[test]
    fn uncoverable_or_negative_inputs_are_rejected() {
        assert_eq!(split_proportionally(Money(5), &money(&[2, 2])), None);
        assert_eq!(split_proportionally(Money(1), &[]), None);
        assert_eq!(split_proportionally(Money(-1), &money(&[2])), None);
        assert_eq!(split_proportionally(Money(1), &money(&[2, -1])), None);
    }
}
