//! RMA 分析主入口

use chrono::{DateTime, Utc};
use rma_core::{AnalyticsConfig, Comment, RmaCase};
use serde::Serialize;

use crate::breakdown::Breakdown;
use crate::overdue::{OverdueClassifier, OverdueQuery, OverdueRma, OverdueSummary};
use crate::parts::{PartAnalyzer, PartSortKey, PartsReport};
use crate::recommendation::{Recommendation, RecommendationEngine, RecommendationInput};
use crate::sla::{SlaCalculator, SlaSummary};
use crate::AnalyticsWarning;

/// 逾期分析報表
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueReport {
    pub summary: OverdueSummary,

    /// 逾期集合的分佈
    pub breakdown: Breakdown,

    #[serde(rename = "overdueRMAs")]
    pub overdue_rmas: Vec<OverdueRma>,

    pub recommendations: Vec<Recommendation>,

    pub sla: SlaSummary,

    pub skipped: Vec<AnalyticsWarning>,

    pub generated_at: DateTime<Utc>,

    pub days_filter: u32,
}

/// RMA 分析器
pub struct RmaAnalyzer {
    config: AnalyticsConfig,
}

impl RmaAnalyzer {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    fn part_analyzer(&self, include_future: bool) -> PartAnalyzer {
        PartAnalyzer::new(self.config.priority_weights.clone())
            .with_include_future(include_future)
            .with_critical_score(self.config.critical_part_score)
    }

    /// 逾期報表（本地計算分佈）
    pub fn overdue_report(
        &self,
        cases: &[RmaCase],
        query: OverdueQuery,
        now: DateTime<Utc>,
    ) -> OverdueReport {
        self.overdue_report_with_upstream(cases, query, now, None)
    }

    /// 逾期報表；上游已提供分佈時直接沿用
    pub fn overdue_report_with_upstream(
        &self,
        cases: &[RmaCase],
        query: OverdueQuery,
        now: DateTime<Utc>,
        upstream: Option<Breakdown>,
    ) -> OverdueReport {
        tracing::info!(
            "開始逾期分析：案件 {} 筆，門檻 {} 天",
            cases.len(),
            query.days_filter.days()
        );
        let start_time = std::time::Instant::now();

        // Step 1: 逾期分類
        tracing::debug!("Step 1: 逾期分類");
        let classification = OverdueClassifier::new(query).classify(cases, now);
        let summary = OverdueSummary::from_overdue(&classification.overdue);

        // Step 2: 分佈統計
        tracing::debug!("Step 2: 分佈統計");
        let breakdown = Breakdown::resolve(
            upstream,
            classification.overdue.iter().map(|o| &o.rma),
        );

        // Step 3: SLA 與關鍵零件
        tracing::debug!("Step 3: SLA 與關鍵零件");
        let sla = SlaCalculator::summarize(cases, now, &self.config.sla_targets);
        let part_analyzer = self.part_analyzer(query.include_future);
        let parts = part_analyzer.aggregate(cases, &[], now);
        let critical_parts = part_analyzer.count_critical(&parts);
        tracing::debug!(
            "SLA 違約率 {:.1}%，關鍵零件 {} 項",
            sla.breach_rate,
            critical_parts
        );

        // Step 4: 建議
        tracing::debug!("Step 4: 產生建議");
        let recommendations = RecommendationEngine::new(self.config.breach_rate_threshold)
            .generate(&RecommendationInput {
                summary: &summary,
                breakdown: &breakdown,
                breach_rate: sla.breach_rate,
                critical_parts,
            });

        let elapsed = start_time.elapsed();
        tracing::info!(
            "逾期分析完成：逾期 {} 筆（Critical {}，Urgent {}），略過 {} 筆，耗時 {:?}",
            summary.total_overdue,
            summary.critical_count,
            summary.urgent_count,
            classification.skipped.len(),
            elapsed
        );

        OverdueReport {
            summary,
            breakdown,
            overdue_rmas: classification.overdue,
            recommendations,
            sla,
            skipped: classification.skipped,
            generated_at: now,
            days_filter: query.days_filter.days() as u32,
        }
    }

    /// 零件分析報表
    pub fn parts_report(
        &self,
        cases: &[RmaCase],
        comments: &[Comment],
        sort: PartSortKey,
        now: DateTime<Utc>,
    ) -> PartsReport {
        tracing::info!(
            "開始零件分析：案件 {} 筆，留言 {} 筆",
            cases.len(),
            comments.len()
        );
        let start_time = std::time::Instant::now();

        let report = self
            .part_analyzer(self.config.include_future)
            .report(cases, comments, sort, now);

        tracing::info!(
            "零件分析完成：零件 {} 項，關鍵零件 {} 項，耗時 {:?}",
            report.summary.total_parts,
            report.summary.critical_parts,
            start_time.elapsed()
        );

        report
    }
}

impl Default for RmaAnalyzer {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overdue::Severity;
    use crate::recommendation::RecommendationType;
    use chrono::{Duration, TimeZone};
    use rma_core::{CaseStatus, DaysFilter, Priority};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 30, 12, 0, 0).unwrap()
    }

    fn lamp(number: &str, site: &str, status: CaseStatus, days_ago: i64) -> RmaCase {
        RmaCase::new(number.to_string(), site.to_string())
            .with_defective_part("Lamp Assembly", "DEFECT-001")
            .with_status(status)
            .with_priority(Priority::Medium)
            .with_raised_date(now() - Duration::days(days_ago))
    }

    fn scenario() -> Vec<RmaCase> {
        vec![
            lamp("RMA-1", "Site A", CaseStatus::Completed, 10),
            lamp("RMA-2", "Site A", CaseStatus::UnderReview, 40),
            lamp("RMA-3", "Site B", CaseStatus::UnderReview, 70),
        ]
    }

    fn default_overdue() -> OverdueReport {
        RmaAnalyzer::default().overdue_report(&scenario(), OverdueQuery::default(), now())
    }

    #[test]
    fn test_overdue_report_scenario() {
        let report = default_overdue();

        assert_eq!(report.summary.total_overdue, 2);
        assert_eq!(report.summary.critical_count, 1);
        assert_eq!(report.summary.urgent_count, 0);
        assert_eq!(report.summary.average_days_overdue, 55.0);
        assert_eq!(report.overdue_rmas[0].rma.rma_number, "RMA-3");
        assert_eq!(report.overdue_rmas[0].severity, Severity::Critical);
        assert_eq!(report.overdue_rmas[1].severity, Severity::Overdue);
        assert_eq!(report.breakdown.by_site.get("Site A"), Some(&1));
        assert_eq!(report.breakdown.totals(), (2, 2, 2));
        assert_eq!(report.days_filter, 30);
        assert!(report.skipped.is_empty());
        assert_eq!(report.recommendations[0].kind, RecommendationType::Critical);
    }

    #[test]
    fn test_breach_rate_feeds_recommendations() {
        // Medium 目標 30 天：40 與 70 天違約，已完成者無結案日期不評估
        let report = default_overdue();
        assert_eq!(report.sla.evaluated, 2);
        assert_eq!(report.sla.breach_rate, 100.0);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.kind == RecommendationType::Urgent && r.message.contains("SLA")));
    }

    #[test]
    fn test_upstream_breakdown_passthrough() {
        let cases = scenario();
        let analyzer = RmaAnalyzer::default();
        let local = analyzer.overdue_report(&cases, OverdueQuery::default(), now());
        let passthrough = analyzer.overdue_report_with_upstream(
            &cases,
            OverdueQuery::default(),
            now(),
            Some(local.breakdown.clone()),
        );
        assert_eq!(local, passthrough);
    }

    #[test]
    fn test_days_filter_applies() {
        let query = OverdueQuery {
            days_filter: DaysFilter::new(60).unwrap(),
            ..OverdueQuery::default()
        };
        let report = RmaAnalyzer::default().overdue_report(&scenario(), query, now());
        assert_eq!(report.summary.total_overdue, 1);
        assert_eq!(report.days_filter, 60);
    }

    #[test]
    fn test_report_json_keys() {
        let report = default_overdue();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["overdueRMAs"].is_array());
        assert_eq!(json["overdueRMAs"][0]["rmaNumber"], "RMA-3");
        assert_eq!(json["overdueRMAs"][0]["daysOverdue"], 70);
        assert_eq!(json["summary"]["totalOverdue"], 2);
        assert!(json["generatedAt"].is_string());
    }

    #[test]
    fn test_parts_report() {
        let report =
            RmaAnalyzer::default().parts_report(&scenario(), &[], PartSortKey::Priority, now());
        assert_eq!(report.parts.len(), 1);
        assert_eq!(report.parts[0].avg_pending_days, 55.0);
        assert_eq!(report.parts[0].completion_rate, 33);
        assert_eq!(report.summary.parts_with_pending, 1);
    }
}
