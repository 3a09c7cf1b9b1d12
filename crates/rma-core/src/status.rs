//! 案件狀態、優先級與保固狀態

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::RmaError;

/// RMA 案件狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CaseStatus {
    #[serde(rename = "Under Review")]
    UnderReview,
    #[serde(rename = "Sent to CDS")]
    SentToCds,
    #[serde(rename = "CDS Approved")]
    CdsApproved,
    #[serde(rename = "Replacement Shipped")]
    ReplacementShipped,
    #[serde(rename = "Replacement Received")]
    ReplacementReceived,
    #[serde(rename = "Installation Complete")]
    InstallationComplete,
    #[serde(rename = "Faulty Part Returned")]
    FaultyPartReturned,
    #[serde(rename = "CDS Confirmed Return")]
    CdsConfirmedReturn,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Rejected")]
    Rejected,
}

impl CaseStatus {
    /// 依流程順序排列的所有狀態
    pub const ALL: [CaseStatus; 10] = [
        CaseStatus::UnderReview,
        CaseStatus::SentToCds,
        CaseStatus::CdsApproved,
        CaseStatus::ReplacementShipped,
        CaseStatus::ReplacementReceived,
        CaseStatus::InstallationComplete,
        CaseStatus::FaultyPartReturned,
        CaseStatus::CdsConfirmedReturn,
        CaseStatus::Completed,
        CaseStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::UnderReview => "Under Review",
            CaseStatus::SentToCds => "Sent to CDS",
            CaseStatus::CdsApproved => "CDS Approved",
            CaseStatus::ReplacementShipped => "Replacement Shipped",
            CaseStatus::ReplacementReceived => "Replacement Received",
            CaseStatus::InstallationComplete => "Installation Complete",
            CaseStatus::FaultyPartReturned => "Faulty Part Returned",
            CaseStatus::CdsConfirmedReturn => "CDS Confirmed Return",
            CaseStatus::Completed => "Completed",
            CaseStatus::Rejected => "Rejected",
        }
    }

    /// 終結狀態（不再計入逾期與待處理）
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseStatus::Completed | CaseStatus::Rejected)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = RmaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CaseStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RmaError::InvalidEnum {
                field: "caseStatus",
                value: s.to_string(),
            })
    }
}

/// 案件優先級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = RmaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RmaError::InvalidEnum {
                field: "priority",
                value: s.to_string(),
            })
    }
}

/// 保固狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarrantyStatus {
    #[serde(rename = "In Warranty")]
    InWarranty,
    #[serde(rename = "Extended Warranty")]
    ExtendedWarranty,
    #[serde(rename = "Out of Warranty")]
    OutOfWarranty,
    #[serde(rename = "Expired")]
    Expired,
}

impl WarrantyStatus {
    pub const ALL: [WarrantyStatus; 4] = [
        WarrantyStatus::InWarranty,
        WarrantyStatus::ExtendedWarranty,
        WarrantyStatus::OutOfWarranty,
        WarrantyStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WarrantyStatus::InWarranty => "In Warranty",
            WarrantyStatus::ExtendedWarranty => "Extended Warranty",
            WarrantyStatus::OutOfWarranty => "Out of Warranty",
            WarrantyStatus::Expired => "Expired",
        }
    }
}

impl fmt::Display for WarrantyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WarrantyStatus {
    type Err = RmaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        WarrantyStatus::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RmaError::InvalidEnum {
                field: "warrantyStatus",
                value: s.to_string(),
            })
    }
}

/// 查詢參數中的狀態篩選（`all` 或單一狀態）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(CaseStatus),
}

impl StatusFilter {
    /// 檢查案件狀態是否符合篩選
    pub fn matches(&self, status: Option<CaseStatus>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status == Some(*wanted),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => f.write_str(status.as_str()),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = RmaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        trimmed.parse().map(StatusFilter::Only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(
            "sent to cds".parse::<CaseStatus>().unwrap(),
            CaseStatus::SentToCds
        );
        assert_eq!(
            " Completed ".parse::<CaseStatus>().unwrap(),
            CaseStatus::Completed
        );
        assert!("Lost".parse::<CaseStatus>().is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        let terminal: Vec<_> = CaseStatus::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![CaseStatus::Completed, CaseStatus::Rejected]);
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&CaseStatus::CdsConfirmedReturn).unwrap();
        assert_eq!(json, "\"CDS Confirmed Return\"");

        let warranty: WarrantyStatus = serde_json::from_str("\"Out of Warranty\"").unwrap();
        assert_eq!(warranty, WarrantyStatus::OutOfWarranty);
        assert_eq!(warranty.to_string(), "Out of Warranty");

        assert!(serde_json::from_str::<Priority>("\"Urgent\"").is_err());
    }

    #[test]
    fn test_status_filter() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::All);

        let filter: StatusFilter = "Under Review".parse().unwrap();
        assert!(filter.matches(Some(CaseStatus::UnderReview)));
        assert!(!filter.matches(Some(CaseStatus::SentToCds)));
        assert!(!filter.matches(None));
        assert!(StatusFilter::All.matches(None));

        assert!("pending".parse::<StatusFilter>().is_err());
        assert_eq!(filter.to_string(), "Under Review");
        assert_eq!(StatusFilter::All.to_string(), "all");
    }
}
