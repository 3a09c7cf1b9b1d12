//! RMA 案件模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::date::RecordDate;
use crate::status::{CaseStatus, Priority, WarrantyStatus};
use crate::symptom::SymptomClassifier;
use crate::transition::TransitionPolicy;

/// 未填寫欄位在彙總時的顯示值
pub const UNKNOWN: &str = "Unknown";

/// RMA 案件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RmaCase {
    /// RMA 編號（唯一）
    pub rma_number: String,

    /// 來源通報單號（DTR 轉入時為 DTR 案號）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_log_number: Option<String>,

    /// 站點
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,

    /// 產品識別
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_part_number: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,

    /// 故障零件
    #[serde(default)]
    pub defective_part_number: Option<String>,
    #[serde(default)]
    pub defective_part_name: Option<String>,

    /// 更換零件
    #[serde(default)]
    pub replaced_part_number: Option<String>,
    #[serde(default)]
    pub replaced_part_name: Option<String>,

    /// 故障症狀描述
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,

    /// 生命週期日期
    #[serde(default)]
    pub ascomp_raised_date: RecordDate,
    #[serde(default)]
    pub customer_error_date: RecordDate,
    #[serde(default)]
    pub created_at: RecordDate,
    #[serde(default)]
    pub shipped_date: RecordDate,
    #[serde(default)]
    pub replacement_received_date: RecordDate,
    #[serde(default)]
    pub return_shipped_date: RecordDate,
    #[serde(default)]
    pub completed_date: RecordDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,

    #[serde(default)]
    pub case_status: Option<CaseStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub warranty_status: Option<WarrantyStatus>,

    /// 預估費用
    #[serde(default)]
    pub estimated_cost: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// 零件識別鍵（零件名稱, 零件料號）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartKey {
    pub part_name: String,
    pub part_number: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl RmaCase {
    /// 創建新的 RMA 案件（狀態為 Under Review）
    pub fn new(rma_number: String, site_name: String) -> Self {
        Self {
            rma_number,
            site_name: Some(site_name),
            case_status: Some(CaseStatus::UnderReview),
            ..Default::default()
        }
    }

    /// 建構器模式：設置狀態
    pub fn with_status(mut self, status: CaseStatus) -> Self {
        self.case_status = Some(status);
        self
    }

    /// 建構器模式：設置優先級
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// 建構器模式：設置提報日期
    pub fn with_raised_date(mut self, raised: DateTime<Utc>) -> Self {
        self.ascomp_raised_date = RecordDate::Valid(raised);
        self
    }

    /// 建構器模式：設置故障零件
    pub fn with_defective_part(mut self, name: &str, number: &str) -> Self {
        self.defective_part_name = Some(name.to_string());
        self.defective_part_number = Some(number.to_string());
        self
    }

    /// 建構器模式：設置產品
    pub fn with_product(mut self, name: &str, part_number: &str) -> Self {
        self.product_name = Some(name.to_string());
        self.product_part_number = Some(part_number.to_string());
        self
    }

    /// 建構器模式：設置預估費用
    pub fn with_estimated_cost(mut self, cost: Decimal) -> Self {
        self.estimated_cost = Some(cost);
        self
    }

    /// 建構器模式：設置完成日期
    pub fn with_completed_date(mut self, completed: DateTime<Utc>) -> Self {
        self.completed_date = RecordDate::Valid(completed);
        self
    }

    /// 提報日期
    ///
    /// 以 `ascompRaisedDate` 為準；未填寫時退回 `createdAt`。
    /// 已填寫但無法解析時回傳 `None`（無法判定），不會退回其他欄位。
    pub fn raised_date(&self) -> Option<DateTime<Utc>> {
        match &self.ascomp_raised_date {
            RecordDate::Valid(dt) => Some(*dt),
            RecordDate::Invalid(_) => None,
            RecordDate::Missing => self.created_at.value(),
        }
    }

    /// 結案日期（完成 → 退回寄出 → 替換件收貨）
    pub fn resolution_date(&self) -> Option<DateTime<Utc>> {
        self.completed_date
            .value()
            .or_else(|| self.return_shipped_date.value())
            .or_else(|| self.replacement_received_date.value())
    }

    /// 是否仍待處理（未設置狀態視為待處理）
    pub fn is_pending(&self) -> bool {
        !self.case_status.map(|s| s.is_terminal()).unwrap_or(false)
    }

    /// 是否已完成
    pub fn is_completed(&self) -> bool {
        self.case_status == Some(CaseStatus::Completed)
    }

    /// 零件識別鍵
    ///
    /// 任一故障零件欄位有值時使用故障零件組合，否則使用產品組合；缺少的一半以 `Unknown` 表示。
    pub fn part_key(&self) -> PartKey {
        let defective_name = non_empty(&self.defective_part_name);
        let defective_number = non_empty(&self.defective_part_number);

        let (name, number) = if defective_name.is_some() || defective_number.is_some() {
            (defective_name, defective_number)
        } else {
            (
                non_empty(&self.product_name),
                non_empty(&self.product_part_number),
            )
        };

        PartKey {
            part_name: name.unwrap_or(UNKNOWN).to_string(),
            part_number: number.unwrap_or(UNKNOWN).to_string(),
        }
    }

    /// 站點顯示名稱
    pub fn site_label(&self) -> &str {
        non_empty(&self.site_name).unwrap_or(UNKNOWN)
    }

    pub fn status_label(&self) -> &str {
        self.case_status.map(|s| s.as_str()).unwrap_or(UNKNOWN)
    }

    pub fn priority_label(&self) -> &str {
        self.priority.map(|p| p.as_str()).unwrap_or(UNKNOWN)
    }

    /// 費用（未填寫視為 0）
    pub fn cost(&self) -> Decimal {
        self.estimated_cost.unwrap_or(Decimal::ZERO)
    }

    /// 實際更換零件名稱
    ///
    /// 若欄位內容其實是故障症狀描述，回傳 `None`。
    pub fn replaced_part_label(&self, classifier: &SymptomClassifier) -> Option<&str> {
        non_empty(&self.replaced_part_name).filter(|name| !classifier.is_symptom(name))
    }

    /// 將誤填在更換零件欄位的症狀移到 `symptoms`
    ///
    /// 回傳是否有搬移。
    pub fn normalize_symptoms(&mut self, classifier: &SymptomClassifier) -> bool {
        let Some(text) = non_empty(&self.replaced_part_name).map(str::to_string) else {
            return false;
        };
        if !classifier.is_symptom(&text) {
            return false;
        }

        self.symptoms = Some(match non_empty(&self.symptoms) {
            Some(existing) => format!("{existing}; {text}"),
            None => text,
        });
        self.replaced_part_name = None;
        true
    }

    /// 更新案件狀態
    pub fn transition_to(
        &mut self,
        next: CaseStatus,
        policy: TransitionPolicy,
    ) -> crate::Result<()> {
        if let Some(current) = self.case_status {
            policy.check(current, next)?;
        }
        self.case_status = Some(next);
        Ok(())
    }
}
