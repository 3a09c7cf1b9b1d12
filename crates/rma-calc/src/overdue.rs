//! 逾期分類

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use rma_core::{DaysFilter, RmaCase, StatusFilter};
use serde::Serialize;

use crate::{round_to, AnalyticsWarning};

const SECONDS_PER_DAY: i64 = 86_400;

/// 經過天數 `floor((to - from) / 1 day)`
///
/// `include_future` 為 false 時，未來日期一律視為 0 天。
pub fn elapsed_days(from: DateTime<Utc>, to: DateTime<Utc>, include_future: bool) -> i64 {
    let days = (to - from).num_seconds().div_euclid(SECONDS_PER_DAY);
    if include_future {
        days
    } else {
        days.max(0)
    }
}

/// 逾期嚴重度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Normal,
    Overdue,
    Urgent,
    Critical,
}

impl Severity {
    pub const CRITICAL_DAYS: i64 = 60;
    pub const URGENT_DAYS: i64 = 45;
    pub const OVERDUE_DAYS: i64 = 30;

    /// 依逾期天數分級（下界皆為含）
    pub fn from_days(days: i64) -> Self {
        if days >= Self::CRITICAL_DAYS {
            Severity::Critical
        } else if days >= Self::URGENT_DAYS {
            Severity::Urgent
        } else if days >= Self::OVERDUE_DAYS {
            Severity::Overdue
        } else {
            Severity::Normal
        }
    }
}

/// 逾期查詢參數
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverdueQuery {
    pub days_filter: DaysFilter,
    pub status: StatusFilter,
    pub include_future: bool,
}

impl OverdueQuery {
    /// 由查詢字串參數建立（`days` 預設 30，`status` 預設 `all`）
    pub fn from_params(days: Option<u32>, status: Option<&str>) -> rma_core::Result<Self> {
        let days_filter = match days {
            Some(days) => DaysFilter::new(days)?,
            None => DaysFilter::default(),
        };
        let status = match status {
            Some(raw) => raw.parse()?,
            None => StatusFilter::All,
        };
        Ok(Self {
            days_filter,
            status,
            include_future: false,
        })
    }

    /// 建構器模式：設置是否包含未來日期
    pub fn with_include_future(mut self, include: bool) -> Self {
        self.include_future = include;
        self
    }
}

/// 逾期案件（原始記錄加上逾期資訊）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueRma {
    #[serde(flatten)]
    pub rma: RmaCase,
    pub days_overdue: i64,
    pub severity: Severity,
    pub is_critical: bool,
    pub is_urgent: bool,
}

impl OverdueRma {
    fn new(rma: RmaCase, days_overdue: i64) -> Self {
        let severity = Severity::from_days(days_overdue);
        Self {
            rma,
            days_overdue,
            severity,
            is_critical: severity == Severity::Critical,
            is_urgent: severity == Severity::Urgent,
        }
    }
}

/// 逾期摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueSummary {
    pub total_overdue: usize,
    pub critical_count: usize,
    pub urgent_count: usize,
    pub average_days_overdue: f64,
}

impl OverdueSummary {
    pub fn from_overdue(overdue: &[OverdueRma]) -> Self {
        let total_days: i64 = overdue.iter().map(|o| o.days_overdue).sum();
        let average = if overdue.is_empty() {
            0.0
        } else {
            round_to(total_days as f64 / overdue.len() as f64, 1)
        };

        Self {
            total_overdue: overdue.len(),
            critical_count: overdue.iter().filter(|o| o.is_critical).count(),
            urgent_count: overdue.iter().filter(|o| o.is_urgent).count(),
            average_days_overdue: average,
        }
    }
}

/// 分類結果
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// 逾期案件（依逾期天數由多到少）
    pub overdue: Vec<OverdueRma>,
    /// 無法判定提報日期而略過的案件
    pub skipped: Vec<AnalyticsWarning>,
}

enum Outcome {
    Excluded,
    Undetermined(String),
    Days(i64),
}

/// 逾期分類器
pub struct OverdueClassifier {
    query: OverdueQuery,
}

impl OverdueClassifier {
    pub fn new(query: OverdueQuery) -> Self {
        Self { query }
    }

    pub fn query(&self) -> &OverdueQuery {
        &self.query
    }

    /// 計算單一案件的逾期天數
    ///
    /// 終結狀態、不符狀態篩選或無法判定提報日期時回傳 `None`；不套用天數門檻。
    pub fn days_overdue(&self, rma: &RmaCase, now: DateTime<Utc>) -> Option<i64> {
        match self.evaluate(rma, now) {
            Outcome::Days(days) => Some(days),
            _ => None,
        }
    }

    fn evaluate(&self, rma: &RmaCase, now: DateTime<Utc>) -> Outcome {
        if !rma.is_pending() || !self.query.status.matches(rma.case_status) {
            return Outcome::Excluded;
        }
        match rma.raised_date() {
            Some(raised) => Outcome::Days(elapsed_days(raised, now, self.query.include_future)),
            None => Outcome::Undetermined(rma.rma_number.clone()),
        }
    }

    /// 分類所有案件，只保留逾期天數達門檻者
    pub fn classify(&self, cases: &[RmaCase], now: DateTime<Utc>) -> Classification {
        let threshold = self.query.days_filter.days();

        let outcomes: Vec<Outcome> = cases
            .par_iter()
            .map(|rma| self.evaluate(rma, now))
            .collect();

        let mut result = Classification::default();
        for (rma, outcome) in cases.iter().zip(outcomes) {
            match outcome {
                Outcome::Days(days) if days >= threshold => {
                    result.overdue.push(OverdueRma::new(rma.clone(), days));
                }
                Outcome::Undetermined(rma_number) => {
                    tracing::warn!("RMA {} 提報日期無法判定，略過逾期計算", rma_number);
                    result.skipped.push(AnalyticsWarning::new(
                        rma_number,
                        "提報日期缺漏或無法解析".to_string(),
                    ));
                }
                _ => {}
            }
        }

        result.overdue.sort_by(|a, b| b.days_overdue.cmp(&a.days_overdue));

        tracing::debug!(
            "逾期分類完成：{} 筆中 {} 筆逾期，{} 筆略過",
            cases.len(),
            result.overdue.len(),
            result.skipped.len()
        );

        result
    }
}
