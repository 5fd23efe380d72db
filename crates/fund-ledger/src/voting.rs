//! Weighted quorum voting.
//!
//! A request is approved when `(yes_weight * 100) / total_stake >= quorum_percent`
//! (floor division). The total is the live stake at evaluation time, so the
//! result is recomputed after every vote and may go back to `false`.

use fund_types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::FundError;
use crate::proposal::SpendingRequest;

/// A stakeholder's answer to a spending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ballot {
    Yes,
    No,
}

impl Ballot {
    pub fn is_yes(&self) -> bool {
        matches!(self, Ballot::Yes)
    }
}

impl From<bool> for Ballot {
    fn from(approve: bool) -> Self {
        if approve {
            Ballot::Yes
        } else {
            Ballot::No
        }
    }
}

/// Quorum rule: `(yes_weight * 100) / total_stake >= quorum_percent`.
///
/// Zero total stake never approves.
pub fn meets_quorum(yes_weight: U256, total_stake: U256, quorum_percent: u8) -> bool {
    if total_stake.is_zero() {
        return false;
    }

    let hundred = U256::from(100u64);
    let quorum = U256::from(quorum_percent);

    if let Some(scaled) = yes_weight.checked_mul(&hundred) {
        return scaled
            .checked_div(&total_stake)
            .is_some_and(|percent| percent >= quorum);
    }

    // yes_weight * 100 does not fit. floor(100y / t) >= q holds exactly when
    // 100y >= q*t. With t = 100*tq + tr that becomes y >= q*tq + ceil(q*tr / 100),
    // where every term fits.
    let (tq, tr) = match total_stake.checked_div_rem(&hundred) {
        Some(parts) => parts,
        None => return false,
    };
    let tr = u128::try_from(tr).unwrap_or(0);
    let tail = (quorum_percent as u128 * tr).div_ceil(100);
    quorum
        .checked_mul(&tq)
        .and_then(|head| head.checked_add(&U256::from(tail)))
        .is_some_and(|needed| yes_weight >= needed)
}

impl SpendingRequest {
    /// Record `voter`'s ballot with the weight they hold right now, then
    /// re-evaluate approval against the live total.
    pub(crate) fn record_vote(
        &mut self,
        voter: Address,
        ballot: Ballot,
        weight: U256,
        total_stake: U256,
        quorum_percent: u8,
    ) -> Result<bool, FundError> {
        if self.has_voted(&voter) {
            return Err(FundError::DoubleVote {
                voter,
                index: self.index,
            });
        }

        // Tallies are bounded by the total stake, checked all the same.
        let (yes_weight, no_weight, yes_count) = match ballot {
            Ballot::Yes => (
                self.yes_weight
                    .checked_add(&weight)
                    .ok_or(FundError::ArithmeticOverflow("yes weight"))?,
                self.no_weight,
                self.yes_count + 1,
            ),
            Ballot::No => (
                self.yes_weight,
                self.no_weight
                    .checked_add(&weight)
                    .ok_or(FundError::ArithmeticOverflow("no weight"))?,
                self.yes_count,
            ),
        };

        self.voter_record.insert(voter);
        self.yes_weight = yes_weight;
        self.no_weight = no_weight;
        self.yes_count = yes_count;
        self.approved = meets_quorum(self.yes_weight, total_stake, quorum_percent);
        Ok(self.approved)
    }
}
