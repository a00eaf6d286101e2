//! Pure ledger rules: contribution validation, savings split, round progress and grantee rotation.

use super::{AMOUNT_SCALE, BASIS_POINTS, LedgerError};
use crate::api::models::organizations::GroupStatus;
use crate::types::{MemberId, Round};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashSet;

/// How a single contribution is divided between group savings and the round's payout pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContributionSplit {
    pub savings: Decimal,
    pub payout: Decimal,
}

/// Which members have and have not contributed in the current round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundProgress {
    pub contributed: Vec<MemberId>,
    pub outstanding: Vec<MemberId>,
}

impl RoundProgress {
    /// A round is complete once nobody is outstanding. A group without members never completes.
    pub fn is_complete(&self) -> bool {
        self.outstanding.is_empty() && !self.contributed.is_empty()
    }
}

/// Check that a contribution may be accepted for a group in `status` with an optional fixed amount.
pub fn validate_contribution(status: GroupStatus, fixed_amount: Option<Decimal>, amount: Decimal) -> Result<(), LedgerError> {
    if status == GroupStatus::Archived {
        return Err(LedgerError::GroupArchived);
    }
    if amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount);
    }
    if let Some(expected) = fixed_amount
        && expected != amount
    {
        return Err(LedgerError::AmountMismatch { expected, got: amount });
    }
    Ok(())
}

/// Split `amount` according to `savings_ratio_bps`. The payout portion absorbs any rounding so the two
/// portions always sum to the original amount.
pub fn split_contribution(amount: Decimal, savings_ratio_bps: i32) -> Result<ContributionSplit, LedgerError> {
    if !(0..=BASIS_POINTS).contains(&savings_ratio_bps) {
        return Err(LedgerError::InvalidSavingsRatio(savings_ratio_bps));
    }

    let savings = amount
        .checked_mul(Decimal::from(savings_ratio_bps))
        .ok_or(LedgerError::AmountOutOfRange)?
        / Decimal::from(BASIS_POINTS);
    let savings = savings.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);

    Ok(ContributionSplit {
        savings,
        payout: amount - savings,
    })
}

/// Compare the group's members (in join order) against those who already contributed this round.
pub fn round_progress(members: &[MemberId], contributed: &[MemberId]) -> RoundProgress {
    let paid: HashSet<MemberId> = contributed.iter().copied().collect();
    let (contributed, outstanding) = members.iter().copied().partition(|id| paid.contains(id));
    RoundProgress { contributed, outstanding }
}

/// Grantee of `round`: members rotate in join order, wrapping around once everyone has received.
pub fn grantee_for_round(members: &[MemberId], round: Round) -> Option<MemberId> {
    if members.is_empty() {
        return None;
    }
    let index = round.rem_euclid(members.len() as i64) as usize;
    members.get(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_validate_rejects_archived_group() {
        let result = validate_contribution(GroupStatus::Archived, None, dec("1"));
        assert_eq!(result, Err(LedgerError::GroupArchived));
    }

    #[test]
    fn test_validate_rejects_non_positive_amounts() {
        assert_eq!(
            validate_contribution(GroupStatus::Active, None, Decimal::ZERO),
            Err(LedgerError::NonPositiveAmount)
        );
        assert_eq!(
            validate_contribution(GroupStatus::Active, None, dec("-5")),
            Err(LedgerError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_validate_fixed_amount() {
        assert!(validate_contribution(GroupStatus::Active, Some(dec("10")), dec("10.000")).is_ok());

        let err = validate_contribution(GroupStatus::Active, Some(dec("10")), dec("9.5")).unwrap_err();
        assert_eq!(
            err,
            LedgerError::AmountMismatch {
                expected: dec("10"),
                got: dec("9.5")
            }
        );
    }

    #[test]
    fn test_validate_open_amount_accepts_any_positive() {
        assert!(validate_contribution(GroupStatus::Active, None, dec("0.000000000000000001")).is_ok());
    }

    #[test]
    fn test_split_half_savings() {
        let split = split_contribution(dec("10"), 5000).unwrap();
        assert_eq!(split.savings, dec("5"));
        assert_eq!(split.payout, dec("5"));
    }

    #[test]
    fn test_split_extremes() {
        let all_payout = split_contribution(dec("3"), 0).unwrap();
        assert_eq!(all_payout.savings, Decimal::ZERO);
        assert_eq!(all_payout.payout, dec("3"));

        let all_savings = split_contribution(dec("3"), BASIS_POINTS).unwrap();
        assert_eq!(all_savings.savings, dec("3"));
        assert_eq!(all_savings.payout, Decimal::ZERO);
    }

    #[test]
    fn test_split_portions_always_sum_to_amount() {
        let amount = dec("1");
        let split = split_contribution(amount, 3333).unwrap();
        assert_eq!(split.savings + split.payout, amount);
        assert_eq!(split.savings, dec("0.3333"));
    }

    #[test]
    fn test_split_rounds_midpoint_away_from_zero() {
        // 0.000000000000000001 * 50% = 0.0000000000000000005, beyond 18 dp
        let split = split_contribution(dec("0.000000000000000001"), 5000).unwrap();
        assert_eq!(split.savings, dec("0.000000000000000001"));
        assert_eq!(split.payout, Decimal::ZERO);
    }

    #[test]
    fn test_split_rejects_out_of_range_ratio() {
        assert_eq!(split_contribution(dec("1"), -1), Err(LedgerError::InvalidSavingsRatio(-1)));
        assert_eq!(split_contribution(dec("1"), 10_001), Err(LedgerError::InvalidSavingsRatio(10_001)));
    }

    #[test]
    fn test_split_rejects_overflowing_amount() {
        assert_eq!(split_contribution(Decimal::MAX, 5000), Err(LedgerError::AmountOutOfRange));
    }

    #[test]
    fn test_round_progress() {
        let progress = round_progress(&[1, 2, 3], &[3, 1]);
        assert_eq!(progress.contributed, vec![1, 3]);
        assert_eq!(progress.outstanding, vec![2]);
        assert!(!progress.is_complete());

        let complete = round_progress(&[1, 2], &[2, 1]);
        assert!(complete.is_complete());
    }

    #[test]
    fn test_round_progress_ignores_departed_contributors() {
        // Member 9 contributed and then left the group; they no longer count towards completion
        let progress = round_progress(&[1], &[9, 1]);
        assert_eq!(progress.contributed, vec![1]);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_empty_group_never_completes() {
        assert!(!round_progress(&[], &[]).is_complete());
    }

    #[test]
    fn test_grantee_rotation_wraps() {
        let members = [10, 20, 30];
        let grantees: Vec<_> = (0..7).map(|round| grantee_for_round(&members, round).unwrap()).collect();
        assert_eq!(grantees, vec![10, 20, 30, 10, 20, 30, 10]);
    }

    #[test]
    fn test_grantee_single_member_and_empty() {
        assert_eq!(grantee_for_round(&[42], 0), Some(42));
        assert_eq!(grantee_for_round(&[42], 5), Some(42));
        assert_eq!(grantee_for_round(&[], 0), None);
    }
}
