//! 案件狀態轉換規則

use serde::{Deserialize, Serialize};

use crate::status::CaseStatus;
use crate::{Result, RmaError};

/// 狀態轉換策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// 任意狀態之間皆可切換（現行作業方式）
    #[default]
    Permissive,
    /// 依流程表檢查
    Guarded,
}

impl TransitionPolicy {
    /// 檢查轉換是否允許
    pub fn check(&self, from: CaseStatus, to: CaseStatus) -> Result<()> {
        match self {
            TransitionPolicy::Permissive => Ok(()),
            TransitionPolicy::Guarded => {
                if from == to || allowed_next(from).contains(&to) {
                    Ok(())
                } else {
                    Err(RmaError::InvalidTransition { from, to })
                }
            }
        }
    }
}

/// 流程表：每個狀態可前往的下一個狀態
pub fn allowed_next(from: CaseStatus) -> &'static [CaseStatus] {
    use CaseStatus::*;

    match from {
        UnderReview => &[SentToCds, Rejected],
        SentToCds => &[CdsApproved, Rejected],
        CdsApproved => &[ReplacementShipped, Rejected],
        ReplacementShipped => &[ReplacementReceived],
        ReplacementReceived => &[InstallationComplete],
        InstallationComplete => &[FaultyPartReturned, Completed],
        FaultyPartReturned => &[CdsConfirmedReturn, Completed],
        CdsConfirmedReturn => &[Completed],
        Completed | Rejected => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissive_allows_anything() {
        for from in CaseStatus::ALL {
            for to in CaseStatus::ALL {
                assert!(TransitionPolicy::Permissive.check(from, to).is_ok());
            }
        }
    }

    #[test]
    fn test_guarded_happy_path() {
        let path = [
            CaseStatus::UnderReview,
            CaseStatus::SentToCds,
            CaseStatus::CdsApproved,
            CaseStatus::ReplacementShipped,
            CaseStatus::ReplacementReceived,
            CaseStatus::InstallationComplete,
            CaseStatus::FaultyPartReturned,
            CaseStatus::CdsConfirmedReturn,
            CaseStatus::Completed,
        ];

        for pair in path.windows(2) {
            assert!(TransitionPolicy::Guarded.check(pair[0], pair[1]).is_ok());
        }
    }

    #[test]
    fn test_guarded_rejects_skips_and_reopen() {
        let guarded = TransitionPolicy::Guarded;
        assert!(guarded
            .check(CaseStatus::UnderReview, CaseStatus::Completed)
            .is_err());
        assert!(guarded
            .check(CaseStatus::Completed, CaseStatus::UnderReview)
            .is_err());
        assert!(guarded
            .check(CaseStatus::Rejected, CaseStatus::Rejected)
            .is_ok());
    }
}
