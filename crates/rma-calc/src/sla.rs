//! SLA 違約計算

use chrono::{DateTime, Utc};
use rma_core::{CaseStatus, RmaCase, SlaTargets};
use serde::Serialize;

use crate::overdue::elapsed_days;
use crate::round_to;

/// SLA 摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaSummary {
    /// 可評估的案件數
    pub evaluated: usize,
    pub breached: usize,
    /// 違約率（百分比，一位小數）
    pub breach_rate: f64,
}

/// SLA 計算器
pub struct SlaCalculator;

impl SlaCalculator {
    /// 判斷單一案件是否違約
    ///
    /// 退件、無提報日期或已完成但無結案日期的案件不評估。
    pub fn is_breached(rma: &RmaCase, now: DateTime<Utc>, targets: &SlaTargets) -> Option<bool> {
        if rma.case_status == Some(CaseStatus::Rejected) {
            return None;
        }
        let raised = rma.raised_date()?;
        let end = if rma.is_pending() {
            now
        } else {
            rma.resolution_date()?
        };

        let elapsed = elapsed_days(raised, end, false);
        Some(elapsed > i64::from(targets.target_days(rma.priority)))
    }

    /// 彙總所有案件
    pub fn summarize(cases: &[RmaCase], now: DateTime<Utc>, targets: &SlaTargets) -> SlaSummary {
        let mut summary = SlaSummary::default();
        for rma in cases {
            if let Some(breached) = Self::is_breached(rma, now, targets) {
                summary.evaluated += 1;
                if breached {
                    summary.breached += 1;
                }
            }
        }

        if summary.evaluated > 0 {
            summary.breach_rate = round_to(
                summary.breached as f64 / summary.evaluated as f64 * 100.0,
                1,
            );
        }
        summary
    }
}
