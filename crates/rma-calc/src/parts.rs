//! 零件分析彙總
//!
//! 以（零件名稱, 料號）分組，計算待處理/完成件數、待處理天數、費用與站點明細。
//! 分組順序依輸入中首次出現的順序，排序時同分者保持此順序。

use chrono::{DateTime, Utc};
use rma_core::{Comment, PartKey, Priority, PriorityWeights, RmaCase};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use crate::overdue::elapsed_days;
use crate::priority::{priority_score, PriorityInputs};
use crate::{mean, round_to};

/// 站點最新留言
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestComment {
    pub rma_number: String,
    pub author: String,
    pub body: String,
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Comment> for LatestComment {
    fn from(comment: &Comment) -> Self {
        Self {
            rma_number: comment.rma_number.clone(),
            author: comment.author.name.clone(),
            body: comment.body.clone(),
            is_internal: comment.is_internal,
            created_at: comment.created_at,
        }
    }
}

/// 單一零件在單一站點的明細
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteBreakdown {
    pub site_name: String,
    pub total_count: usize,
    pub pending_count: usize,
    pub completed_count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost: Decimal,
    pub avg_pending_days: f64,
    pub max_pending_days: i64,
    pub rma_numbers: Vec<String>,
    pub latest_comment: Option<LatestComment>,
}

/// 零件彙總
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartAggregate {
    pub part_name: String,
    pub part_number: String,
    pub total_count: usize,
    pub pending_count: usize,
    pub completed_count: usize,
    /// 完成率（整數百分比）
    pub completion_rate: u32,
    pub avg_pending_days: f64,
    pub max_pending_days: i64,
    pub avg_resolution_days: f64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_cost: Decimal,
    pub status_breakdown: BTreeMap<String, usize>,
    pub affected_sites: usize,
    pub active_sites_count: usize,
    /// 優先分數（0–10）
    pub priority: f64,
    pub sites: Vec<SiteBreakdown>,
}

/// 排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartSortKey {
    #[default]
    Priority,
    AvgPendingDays,
    PendingCount,
    ActiveSites,
    TotalCost,
    Name,
}

impl FromStr for PartSortKey {
    type Err = rma_core::RmaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "priority" => Ok(PartSortKey::Priority),
            "avgpendingdays" | "pendingdays" => Ok(PartSortKey::AvgPendingDays),
            "pendingcount" | "pending" => Ok(PartSortKey::PendingCount),
            "activesites" | "activesitescount" | "sites" => Ok(PartSortKey::ActiveSites),
            "totalcost" | "cost" => Ok(PartSortKey::TotalCost),
            "name" => Ok(PartSortKey::Name),
            _ => Err(rma_core::RmaError::InvalidEnum {
                field: "sortBy",
                value: s.to_string(),
            }),
        }
    }
}

/// 依指定方式排序（穩定排序）
pub fn sort_parts(parts: &mut [PartAggregate], key: PartSortKey) {
    match key {
        PartSortKey::Priority => parts.sort_by(|a, b| b.priority.total_cmp(&a.priority)),
        PartSortKey::AvgPendingDays => {
            parts.sort_by(|a, b| b.avg_pending_days.total_cmp(&a.avg_pending_days))
        }
        PartSortKey::PendingCount => parts.sort_by(|a, b| b.pending_count.cmp(&a.pending_count)),
        PartSortKey::ActiveSites => {
            parts.sort_by(|a, b| b.active_sites_count.cmp(&a.active_sites_count))
        }
        PartSortKey::TotalCost => parts.sort_by(|a, b| b.total_cost.cmp(&a.total_cost)),
        PartSortKey::Name => parts.sort_by(|a, b| {
            a.part_name
                .cmp(&b.part_name)
                .then_with(|| a.part_number.cmp(&b.part_number))
        }),
    }
}

/// 零件分析摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartsSummary {
    pub total_parts: usize,
    pub parts_with_pending: usize,
    /// 有待處理案件之零件的平均待處理天數
    pub avg_pending_days: f64,
    pub critical_parts: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_pending_cost: Decimal,
}

/// 零件分析報表
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartsReport {
    pub summary: PartsSummary,
    pub parts: Vec<PartAggregate>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Default)]
struct SiteAccumulator {
    name: String,
    total: usize,
    pending: usize,
    completed: usize,
    cost: Decimal,
    pending_days: Vec<i64>,
    rma_numbers: Vec<String>,
}

struct PartAccumulator {
    key: PartKey,
    total: usize,
    pending: usize,
    completed: usize,
    pending_days: Vec<i64>,
    resolution_days: Vec<i64>,
    cost: Decimal,
    pending_cost: Decimal,
    statuses: BTreeMap<String, usize>,
    has_critical: bool,
    has_high: bool,
    site_index: HashMap<String, usize>,
    sites: Vec<SiteAccumulator>,
}

impl PartAccumulator {
    fn new(key: PartKey) -> Self {
        Self {
            key,
            total: 0,
            pending: 0,
            completed: 0,
            pending_days: Vec::new(),
            resolution_days: Vec::new(),
            cost: Decimal::ZERO,
            pending_cost: Decimal::ZERO,
            statuses: BTreeMap::new(),
            has_critical: false,
            has_high: false,
            site_index: HashMap::new(),
            sites: Vec::new(),
        }
    }

    fn site_mut(&mut self, name: &str) -> &mut SiteAccumulator {
        let index = match self.site_index.get(name) {
            Some(&index) => index,
            None => {
                self.sites.push(SiteAccumulator {
                    name: name.to_string(),
                    ..Default::default()
                });
                let index = self.sites.len() - 1;
                self.site_index.insert(name.to_string(), index);
                index
            }
        };
        &mut self.sites[index]
    }
}

/// 零件分析器
pub struct PartAnalyzer {
    weights: PriorityWeights,
    include_future: bool,
    critical_score: f64,
}

impl PartAnalyzer {
    pub fn new(weights: PriorityWeights) -> Self {
        Self {
            weights,
            include_future: false,
            critical_score: 7.0,
        }
    }

    /// 建構器模式：設置是否包含未來日期
    pub fn with_include_future(mut self, include: bool) -> Self {
        self.include_future = include;
        self
    }

    /// 建構器模式：設置關鍵零件分數門檻
    pub fn with_critical_score(mut self, score: f64) -> Self {
        self.critical_score = score;
        self
    }

    /// 依零件分組彙總
    ///
    /// 輸出順序為各零件在輸入中首次出現的順序。
    pub fn aggregate(
        &self,
        cases: &[RmaCase],
        comments: &[Comment],
        now: DateTime<Utc>,
    ) -> Vec<PartAggregate> {
        let mut index: HashMap<PartKey, usize> = HashMap::new();
        let mut groups: Vec<PartAccumulator> = Vec::new();

        for rma in cases {
            let key = rma.part_key();
            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    groups.push(PartAccumulator::new(key.clone()));
                    index.insert(key, groups.len() - 1);
                    groups.len() - 1
                }
            };
            self.accumulate(&mut groups[slot], rma, now);
        }

        let comments_by_rma = index_comments(comments);

        groups
            .into_iter()
            .map(|group| self.finish(group, &comments_by_rma))
            .collect()
    }

    fn accumulate(&self, group: &mut PartAccumulator, rma: &RmaCase, now: DateTime<Utc>) {
        let pending = rma.is_pending();
        let completed = rma.is_completed();
        let cost = rma.cost();
        let pending_days = if pending {
            rma.raised_date()
                .map(|raised| elapsed_days(raised, now, self.include_future))
        } else {
            None
        };

        group.total += 1;
        group.cost += cost;
        *group
            .statuses
            .entry(rma.status_label().to_string())
            .or_insert(0) += 1;
        match rma.priority {
            Some(Priority::Critical) => group.has_critical = true,
            Some(Priority::High) => group.has_high = true,
            _ => {}
        }

        if pending {
            group.pending += 1;
            group.pending_cost += cost;
            if let Some(days) = pending_days {
                group.pending_days.push(days);
            }
        }

        if completed {
            group.completed += 1;
            if let (Some(raised), Some(resolved)) = (rma.raised_date(), rma.resolution_date()) {
                group
                    .resolution_days
                    .push(elapsed_days(raised, resolved, false));
            }
        }

        let site = group.site_mut(rma.site_label());
        site.total += 1;
        site.cost += cost;
        site.rma_numbers.push(rma.rma_number.clone());
        if pending {
            site.pending += 1;
            if let Some(days) = pending_days {
                site.pending_days.push(days);
            }
        }
        if completed {
            site.completed += 1;
        }
    }

    fn finish(
        &self,
        group: PartAccumulator,
        comments_by_rma: &HashMap<&str, &Comment>,
    ) -> PartAggregate {
        let avg_pending_days = round_to(mean(&group.pending_days), 1);
        let completion_rate = if group.total == 0 {
            0
        } else {
            (group.completed as f64 / group.total as f64 * 100.0).round() as u32
        };
        let avg_cost = if group.total == 0 {
            Decimal::ZERO
        } else {
            (group.cost / Decimal::from(group.total)).round_dp(2)
        };

        let priority = priority_score(
            &PriorityInputs {
                avg_pending_days,
                pending_count: group.pending,
                has_critical: group.has_critical,
                has_high: group.has_high,
            },
            &self.weights,
        );

        let affected_sites = group.sites.len();
        let active_sites_count = group.sites.iter().filter(|s| s.pending > 0).count();

        let sites = group
            .sites
            .into_iter()
            .map(|site| {
                let latest_comment = site
                    .rma_numbers
                    .iter()
                    .filter_map(|number| comments_by_rma.get(number.as_str()).copied())
                    .max_by_key(|c| c.created_at)
                    .map(LatestComment::from);

                SiteBreakdown {
                    avg_pending_days: round_to(mean(&site.pending_days), 1),
                    max_pending_days: site.pending_days.iter().copied().max().unwrap_or(0),
                    site_name: site.name,
                    total_count: site.total,
                    pending_count: site.pending,
                    completed_count: site.completed,
                    total_cost: site.cost,
                    rma_numbers: site.rma_numbers,
                    latest_comment,
                }
            })
            .collect();

        PartAggregate {
            part_name: group.key.part_name,
            part_number: group.key.part_number,
            total_count: group.total,
            pending_count: group.pending,
            completed_count: group.completed,
            completion_rate,
            avg_pending_days,
            max_pending_days: group.pending_days.iter().copied().max().unwrap_or(0),
            avg_resolution_days: round_to(mean(&group.resolution_days), 1),
            total_cost: group.cost,
            avg_cost,
            status_breakdown: group.statuses,
            affected_sites,
            active_sites_count,
            priority,
            sites,
        }
    }

    /// 摘要
    pub fn summarize(&self, parts: &[PartAggregate], cases: &[RmaCase]) -> PartsSummary {
        let with_pending: Vec<&PartAggregate> =
            parts.iter().filter(|p| p.pending_count > 0).collect();
        let avg_pending_days = if with_pending.is_empty() {
            0.0
        } else {
            round_to(
                with_pending.iter().map(|p| p.avg_pending_days).sum::<f64>()
                    / with_pending.len() as f64,
                1,
            )
        };

        PartsSummary {
            total_parts: parts.len(),
            parts_with_pending: with_pending.len(),
            avg_pending_days,
            critical_parts: self.count_critical(parts),
            total_pending_cost: cases
                .iter()
                .filter(|rma| rma.is_pending())
                .map(RmaCase::cost)
                .sum(),
        }
    }

    /// 分數達門檻的零件數
    pub fn count_critical(&self, parts: &[PartAggregate]) -> usize {
        parts
            .iter()
            .filter(|p| p.priority >= self.critical_score)
            .count()
    }

    /// 完整報表
    pub fn report(
        &self,
        cases: &[RmaCase],
        comments: &[Comment],
        sort: PartSortKey,
        now: DateTime<Utc>,
    ) -> PartsReport {
        let mut parts = self.aggregate(cases, comments, now);
        let summary = self.summarize(&parts, cases);
        sort_parts(&mut parts, sort);

        PartsReport {
            summary,
            parts,
            last_updated: now,
        }
    }
}

/// 每個 RMA 的最新留言
fn index_comments(comments: &[Comment]) -> HashMap<&str, &Comment> {
    let mut latest: HashMap<&str, &Comment> = HashMap::new();
    for comment in comments {
        latest
            .entry(comment.rma_number.as_str())
            .and_modify(|current| {
                if comment.created_at >= current.created_at {
                    *current = comment;
                }
            })
            .or_insert(comment);
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rma_core::{Author, CaseStatus, UserRole};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 30, 12, 0, 0).unwrap()
    }

    fn lamp(number: &str, site: &str, status: CaseStatus, days_ago: i64) -> RmaCase {
        RmaCase::new(number.to_string(), site.to_string())
            .with_defective_part("Lamp Assembly", "DEFECT-001")
            .with_status(status)
            .with_raised_date(now() - Duration::days(days_ago))
    }

    fn analyzer() -> PartAnalyzer {
        PartAnalyzer::new(PriorityWeights::default())
    }

    #[test]
    fn test_reference_scenario() {
        let cases = vec![
            lamp("RMA-1", "Site A", CaseStatus::Completed, 10),
            lamp("RMA-2", "Site A", CaseStatus::UnderReview, 40),
            lamp("RMA-3", "Site B", CaseStatus::UnderReview, 70),
        ];

        let parts = analyzer().aggregate(&cases, &[], now());
        assert_eq!(parts.len(), 1);

        let part = &parts[0];
        assert_eq!(part.part_name, "Lamp Assembly");
        assert_eq!(part.part_number, "DEFECT-001");
        assert_eq!(part.total_count, 3);
        assert_eq!(part.pending_count, 2);
        assert_eq!(part.completed_count, 1);
        assert_eq!(part.completion_rate, 33);
        assert_eq!(part.avg_pending_days, 55.0);
        assert_eq!(part.max_pending_days, 70);
        assert_eq!(part.affected_sites, 2);
        assert_eq!(part.active_sites_count, 2);
        assert_eq!(part.status_breakdown.get("Under Review"), Some(&2));
        assert_eq!(part.status_breakdown.get("Completed"), Some(&1));
    }

    #[test]
    fn test_rejected_is_neither_pending_nor_completed() {
        let cases = vec![
            lamp("RMA-1", "Site A", CaseStatus::Rejected, 10),
            lamp("RMA-2", "Site A", CaseStatus::Completed, 10),
        ];
        let part = &analyzer().aggregate(&cases, &[], now())[0];
        assert_eq!(part.pending_count, 0);
        assert_eq!(part.completed_count, 1);
        assert_eq!(part.completion_rate, 50);
        assert_eq!(part.active_sites_count, 0);
        assert_eq!(part.avg_pending_days, 0.0);
    }

    #[test]
    fn test_costs_and_resolution() {
        let raised = now() - Duration::days(30);
        let cases = vec![
            lamp("RMA-1", "Site A", CaseStatus::Completed, 30)
                .with_estimated_cost(Decimal::new(10000, 2))
                .with_completed_date(raised + Duration::days(12)),
            lamp("RMA-2", "Site A", CaseStatus::UnderReview, 5)
                .with_estimated_cost(Decimal::new(5050, 2)),
            lamp("RMA-3", "Site B", CaseStatus::UnderReview, 5),
        ];

        let part = &analyzer().aggregate(&cases, &[], now())[0];
        assert_eq!(part.total_cost, Decimal::new(15050, 2));
        assert_eq!(part.avg_cost, Decimal::new(5017, 2));
        assert_eq!(part.avg_resolution_days, 12.0);

        let summary = analyzer().summarize(&analyzer().aggregate(&cases, &[], now()), &cases);
        assert_eq!(summary.total_pending_cost, Decimal::new(5050, 2));
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let cases = vec![
            RmaCase::new("RMA-1".to_string(), "S".to_string()).with_product("Zoom Lens", "LENS-9"),
            lamp("RMA-2", "S", CaseStatus::UnderReview, 1),
            RmaCase::new("RMA-3".to_string(), "S".to_string()).with_product("Zoom Lens", "LENS-9"),
        ];
        let parts = analyzer().aggregate(&cases, &[], now());
        let names: Vec<_> = parts.iter().map(|p| p.part_name.as_str()).collect();
        assert_eq!(names, vec!["Zoom Lens", "Lamp Assembly"]);
        assert_eq!(parts[0].total_count, 2);
    }

    fn comment(rma_number: &str, author: &Author, body: &str, days_ago: i64) -> Comment {
        Comment::new(
            rma_number.to_string(),
            author.clone(),
            body.to_string(),
            now() - Duration::days(days_ago),
        )
    }

    #[test]
    fn test_site_breakdown_latest_comment() {
        let cases = vec![
            lamp("RMA-1", "Site A", CaseStatus::UnderReview, 20),
            lamp("RMA-2", "Site A", CaseStatus::UnderReview, 40),
            lamp("RMA-3", "Site B", CaseStatus::Completed, 40),
        ];
        let author = Author::new("u-1", "Engineer", UserRole::Engineer);
        let comments = vec![
            comment("RMA-1", &author, "older", 3),
            comment("RMA-2", &author, "newest", 1),
            comment("RMA-2", &author, "middle", 2),
        ];

        let part = &analyzer().aggregate(&cases, &comments, now())[0];
        let site_a = &part.sites[0];
        assert_eq!(site_a.site_name, "Site A");
        assert_eq!(site_a.pending_count, 2);
        assert_eq!(site_a.avg_pending_days, 30.0);
        assert_eq!(site_a.max_pending_days, 40);
        assert_eq!(
            site_a.latest_comment.as_ref().map(|c| c.body.as_str()),
            Some("newest")
        );

        let site_b = &part.sites[1];
        assert_eq!(site_b.completed_count, 1);
        assert!(site_b.latest_comment.is_none());
        assert_eq!(part.sites.len(), 2);
    }

    #[test]
    fn test_sorting_is_stable() {
        let cases = vec![
            RmaCase::new("RMA-1".to_string(), "S".to_string()).with_product("B part", "2"),
            RmaCase::new("RMA-2".to_string(), "S".to_string()).with_product("A part", "1"),
            RmaCase::new("RMA-3".to_string(), "S".to_string()).with_product("C part", "3"),
        ];
        let mut parts = analyzer().aggregate(&cases, &[], now());

        // 三者分數相同，保持輸入順序
        sort_parts(&mut parts, PartSortKey::Priority);
        let names: Vec<_> = parts.iter().map(|p| p.part_name.as_str()).collect();
        assert_eq!(names, vec!["B part", "A part", "C part"]);

        sort_parts(&mut parts, PartSortKey::Name);
        let names: Vec<_> = parts.iter().map(|p| p.part_name.as_str()).collect();
        assert_eq!(names, vec!["A part", "B part", "C part"]);
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("priority".parse::<PartSortKey>().unwrap(), PartSortKey::Priority);
        assert_eq!("avgPendingDays".parse::<PartSortKey>().unwrap(), PartSortKey::AvgPendingDays);
        assert_eq!("totalCost".parse::<PartSortKey>().unwrap(), PartSortKey::TotalCost);
        assert!("random".parse::<PartSortKey>().is_err());
    }

    #[test]
    fn test_report_summary() {
        let mut cases = vec![
            lamp("RMA-1", "Site A", CaseStatus::UnderReview, 90),
            lamp("RMA-2", "Site B", CaseStatus::UnderReview, 90),
            lamp("RMA-3", "Site C", CaseStatus::UnderReview, 90),
            lamp("RMA-4", "Site C", CaseStatus::UnderReview, 90),
        ];
        for rma in &mut cases {
            rma.priority = Some(Priority::Critical);
        }
        cases.push(
            RmaCase::new("RMA-5".to_string(), "S".to_string())
                .with_product("Zoom Lens", "LENS-9")
                .with_status(CaseStatus::Completed),
        );

        let report = analyzer().report(&cases, &[], PartSortKey::Priority, now());
        assert_eq!(report.summary.total_parts, 2);
        assert_eq!(report.summary.parts_with_pending, 1);
        assert_eq!(report.summary.avg_pending_days, 90.0);
        // 5.0 + 2.0 + 2.0 = 9.0
        assert_eq!(report.parts[0].priority, 9.0);
        assert_eq!(report.summary.critical_parts, 1);
        assert_eq!(report.last_updated, now());
    }
}
