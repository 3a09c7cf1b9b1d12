//! DTR（診斷工單）模型與轉 RMA

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::date::RecordDate;
use crate::rma::RmaCase;
use crate::status::{CaseStatus, Priority};
use crate::{Result, RmaError};

/// DTR 嚴重度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DtrSeverity {
    Low,
    #[default]
    Minor,
    Major,
    Critical,
    Information,
}

impl DtrSeverity {
    /// 對應的 RMA 優先級
    pub fn to_priority(self) -> Priority {
        match self {
            DtrSeverity::Critical => Priority::Critical,
            DtrSeverity::Major => Priority::High,
            DtrSeverity::Minor => Priority::Medium,
            DtrSeverity::Low | DtrSeverity::Information => Priority::Low,
        }
    }
}

/// DTR 處理狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CallStatus {
    #[default]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Closed,
    #[serde(rename = "Shifted to RMA")]
    ShiftedToRma,
}

/// DTR 工單
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DtrCase {
    pub case_number: String,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_part_number: Option<String>,
    #[serde(default)]
    pub problem_name: Option<String>,
    #[serde(default)]
    pub action_taken: Option<String>,
    #[serde(default)]
    pub error_date: RecordDate,
    #[serde(default)]
    pub case_severity: DtrSeverity,
    #[serde(default)]
    pub call_status: CallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shifted_to_rma_number: Option<String>,
}

impl DtrCase {
    pub fn new(case_number: String, site_name: String) -> Self {
        Self {
            case_number,
            site_name: Some(site_name),
            ..Default::default()
        }
    }

    /// 是否可轉為 RMA
    pub fn can_convert(&self) -> bool {
        matches!(self.call_status, CallStatus::Open | CallStatus::InProgress)
    }
}

/// DTR 轉 RMA
pub struct DtrConverter;

impl DtrConverter {
    /// 將 DTR 轉為新的 RMA，並把 DTR 標記為已轉單
    pub fn convert(dtr: &mut DtrCase, rma_number: &str, now: DateTime<Utc>) -> Result<RmaCase> {
        if rma_number.trim().is_empty() {
            return Err(RmaError::Validation("RMA 編號不可為空".to_string()));
        }
        if !dtr.can_convert() {
            return Err(RmaError::Validation(format!(
                "DTR {} 狀態為 {:?}，不能轉為 RMA",
                dtr.case_number, dtr.call_status
            )));
        }

        let notes = match (dtr.problem_name.as_deref(), dtr.action_taken.as_deref()) {
            (Some(problem), Some(action)) => Some(format!("{problem}\nAction taken: {action}")),
            (Some(problem), None) => Some(problem.to_string()),
            (None, Some(action)) => Some(format!("Action taken: {action}")),
            (None, None) => None,
        };

        let rma = RmaCase {
            rma_number: rma_number.trim().to_string(),
            call_log_number: Some(dtr.case_number.clone()),
            site_name: dtr.site_name.clone(),
            site_id: dtr.site_id.clone(),
            product_name: dtr.product_name.clone(),
            product_part_number: dtr.product_part_number.clone(),
            serial_number: dtr.serial_number.clone(),
            ascomp_raised_date: RecordDate::Valid(now),
            customer_error_date: dtr.error_date.clone(),
            created_at: RecordDate::Valid(now),
            case_status: Some(CaseStatus::UnderReview),
            priority: Some(dtr.case_severity.to_priority()),
            notes,
            ..Default::default()
        };

        dtr.call_status = CallStatus::ShiftedToRma;
        dtr.shifted_to_rma_number = Some(rma.rma_number.clone());

        Ok(rma)
    }
}
