//! # RMA Analytics Engine
//!
//! 逾期分類、分佈彙總、零件分析與建議產生

pub mod analyzer;
pub mod breakdown;
pub mod overdue;
pub mod parts;
pub mod priority;
pub mod recommendation;
pub mod sla;

// Re-export 主要類型
pub use analyzer::{OverdueReport, RmaAnalyzer};
pub use breakdown::Breakdown;
pub use overdue::{OverdueClassifier, OverdueQuery, OverdueRma, OverdueSummary, Severity};
pub use parts::{PartAggregate, PartAnalyzer, PartSortKey, PartsReport, PartsSummary, SiteBreakdown};
pub use recommendation::{Recommendation, RecommendationEngine, RecommendationType};
pub use sla::{SlaCalculator, SlaSummary};

/// 分析警告
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsWarning {
    pub rma_number: String,
    pub message: String,
}

impl AnalyticsWarning {
    pub fn new(rma_number: String, message: String) -> Self {
        Self {
            rma_number,
            message,
        }
    }
}

/// 四捨五入到指定小數位
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// 平均值（空集合為 0）
pub(crate) fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<i64>() as f64 / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(33.333, 1), 33.3);
        assert_eq!(round_to(2.25, 0), 2.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[40, 70]), 55.0);
    }
}
