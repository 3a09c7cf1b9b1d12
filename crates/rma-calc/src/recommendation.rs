//! 建議產生器
//!
//! 純規則：依逾期摘要、SLA 違約率、關鍵零件數與站點集中度產生建議，
//! 輸出順序為 critical → urgent → info，同類別保持規則順序。

use serde::Serialize;

use crate::breakdown::Breakdown;
use crate::overdue::OverdueSummary;

/// 建議類別（宣告順序即輸出順序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    Critical,
    Urgent,
    Info,
}

/// 單一建議
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub message: String,
    pub action: String,
}

impl Recommendation {
    fn new(kind: RecommendationType, message: String, action: &str) -> Self {
        Self {
            kind,
            message,
            action: action.to_string(),
        }
    }
}

/// 規則輸入
#[derive(Debug, Clone, Copy)]
pub struct RecommendationInput<'a> {
    pub summary: &'a OverdueSummary,
    /// 逾期集合的分佈（站點規則使用）
    pub breakdown: &'a Breakdown,
    pub breach_rate: f64,
    pub critical_parts: usize,
}

/// 建議規則引擎
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    breach_rate_threshold: f64,
    site_min_cases: usize,
    site_min_share: f64,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self {
            breach_rate_threshold: 20.0,
            site_min_cases: 3,
            site_min_share: 30.0,
        }
    }
}

impl RecommendationEngine {
    pub fn new(breach_rate_threshold: f64) -> Self {
        Self {
            breach_rate_threshold,
            ..Self::default()
        }
    }

    /// 建構器模式：設置站點集中度規則
    pub fn with_site_rule(mut self, min_cases: usize, min_share_percent: f64) -> Self {
        self.site_min_cases = min_cases;
        self.site_min_share = min_share_percent;
        self
    }

    /// 產生建議
    pub fn generate(&self, input: &RecommendationInput<'_>) -> Vec<Recommendation> {
        let summary = input.summary;
        let mut recommendations = Vec::new();

        if summary.critical_count > 0 {
            recommendations.push(Recommendation::new(
                RecommendationType::Critical,
                format!(
                    "{} RMA(s) have been pending for 60 days or more",
                    summary.critical_count
                ),
                "Escalate to management and contact CDS for immediate resolution",
            ));
        }

        if input.breach_rate > self.breach_rate_threshold {
            recommendations.push(Recommendation::new(
                RecommendationType::Urgent,
                format!(
                    "SLA breach rate is {:.1}%, above the {:.1}% threshold",
                    input.breach_rate, self.breach_rate_threshold
                ),
                "Review SLA targets and reallocate resources to aging cases",
            ));
        }

        if summary.urgent_count > 0 {
            recommendations.push(Recommendation::new(
                RecommendationType::Urgent,
                format!(
                    "{} RMA(s) have been pending between 45 and 59 days",
                    summary.urgent_count
                ),
                "Follow up with CDS and confirm replacement shipping dates",
            ));
        }

        if input.critical_parts > 0 {
            recommendations.push(Recommendation::new(
                RecommendationType::Urgent,
                format!(
                    "{} part(s) have a critical priority score",
                    input.critical_parts
                ),
                "Expedite replacement stock for the affected parts",
            ));
        }

        if let Some(site) = self.concentrated_site(summary, input.breakdown) {
            recommendations.push(site);
        }

        recommendations.sort_by_key(|r| r.kind);
        recommendations
    }

    fn concentrated_site(
        &self,
        summary: &OverdueSummary,
        breakdown: &Breakdown,
    ) -> Option<Recommendation> {
        if summary.total_overdue == 0 {
            return None;
        }
        let (site, count) = breakdown.top_site()?;
        let share = count as f64 / summary.total_overdue as f64 * 100.0;
        if count < self.site_min_cases || share < self.site_min_share {
            return None;
        }

        Some(Recommendation::new(
            RecommendationType::Info,
            format!(
                "{} holds {} of {} overdue RMA(s) ({:.0}%)",
                site, count, summary.total_overdue, share
            ),
            "Schedule a site visit and root-cause review",
        ))
    }
}
