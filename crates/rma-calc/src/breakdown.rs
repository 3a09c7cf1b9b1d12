//! 狀態/優先級/站點分佈

use rma_core::RmaCase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 分佈統計（未設置的值歸入 `Unknown`）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    #[serde(default)]
    pub by_status: BTreeMap<String, usize>,
    #[serde(default)]
    pub by_priority: BTreeMap<String, usize>,
    #[serde(default)]
    pub by_site: BTreeMap<String, usize>,
}

impl Breakdown {
    /// 由案件清單計算
    pub fn from_cases<'a, I>(cases: I) -> Self
    where
        I: IntoIterator<Item = &'a RmaCase>,
    {
        let mut breakdown = Self::default();
        for rma in cases {
            breakdown.add(rma);
        }
        breakdown
    }

    /// 上游已提供分佈時直接沿用，否則在本地計算
    pub fn resolve<'a, I>(upstream: Option<Breakdown>, cases: I) -> Self
    where
        I: IntoIterator<Item = &'a RmaCase>,
    {
        match upstream {
            Some(breakdown) => {
                tracing::debug!("使用上游提供的分佈統計");
                breakdown
            }
            None => Self::from_cases(cases),
        }
    }

    /// 計入單一案件
    pub fn add(&mut self, rma: &RmaCase) {
        *self
            .by_status
            .entry(rma.status_label().to_string())
            .or_insert(0) += 1;
        *self
            .by_priority
            .entry(rma.priority_label().to_string())
            .or_insert(0) += 1;
        *self
            .by_site
            .entry(rma.site_label().to_string())
            .or_insert(0) += 1;
    }

    /// 各維度總數（三者應相等）
    pub fn totals(&self) -> (usize, usize, usize) {
        (
            self.by_status.values().sum(),
            self.by_priority.values().sum(),
            self.by_site.values().sum(),
        )
    }

    /// 案件數最多的站點（同數時取名稱排序較前者）
    pub fn top_site(&self) -> Option<(&str, usize)> {
        self.by_site
            .iter()
            .fold(None, |best: Option<(&str, usize)>, (site, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((site.as_str(), count)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rma_core::{CaseStatus, Priority};

    fn cases() -> Vec<RmaCase> {
        let mut no_site = RmaCase::new("RMA-3".to_string(), String::new());
        no_site.case_status = None;
        vec![
            RmaCase::new("RMA-1".to_string(), "Site A".to_string())
                .with_priority(Priority::High),
            RmaCase::new("RMA-2".to_string(), "Site A".to_string())
                .with_status(CaseStatus::SentToCds)
                .with_priority(Priority::High),
            no_site,
        ]
    }

    #[test]
    fn test_breakdown_counts() {
        let breakdown = Breakdown::from_cases(&cases());

        assert_eq!(breakdown.by_status.get("Under Review"), Some(&1));
        assert_eq!(breakdown.by_status.get("Sent to CDS"), Some(&1));
        assert_eq!(breakdown.by_status.get("Unknown"), Some(&1));
        assert_eq!(breakdown.by_priority.get("High"), Some(&2));
        assert_eq!(breakdown.by_priority.get("Unknown"), Some(&1));
        assert_eq!(breakdown.by_site.get("Site A"), Some(&2));
        assert_eq!(breakdown.by_site.get("Unknown"), Some(&1));
        assert_eq!(breakdown.totals(), (3, 3, 3));
    }

    #[test]
    fn test_passthrough_matches_fallback() {
        let cases = cases();
        let upstream = Breakdown::from_cases(&cases);

        let passthrough = Breakdown::resolve(Some(upstream), &cases);
        let fallback = Breakdown::resolve(None, &cases);
        assert_eq!(passthrough, fallback);
    }

    #[test]
    fn test_top_site() {
        let breakdown = Breakdown::from_cases(&cases());
        assert_eq!(breakdown.top_site(), Some(("Site A", 2)));
        assert_eq!(Breakdown::default().top_site(), None);
    }

    #[test]
    fn test_serialized_keys() {
        let json = serde_json::to_value(Breakdown::from_cases(&cases())).unwrap();
        assert_eq!(json["byStatus"]["Under Review"], 1);
        assert_eq!(json["bySite"]["Site A"], 2);
    }
}
