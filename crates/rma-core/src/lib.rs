//! # RMA Core
//!
//! 核心資料模型與類型定義

pub mod comment;
pub mod config;
pub mod date;
pub mod dtr;
pub mod rma;
pub mod status;
pub mod symptom;
pub mod transition;
pub mod validation;

// Re-export 主要類型
pub use comment::{Author, Comment, CommentThread, CommentType, UserRole};
pub use config::{AnalyticsConfig, DaysFilter, PriorityWeights, SlaTargets};
pub use date::RecordDate;
pub use dtr::{CallStatus, DtrCase, DtrConverter, DtrSeverity};
pub use rma::{PartKey, RmaCase};
pub use status::{CaseStatus, Priority, StatusFilter, WarrantyStatus};
pub use symptom::SymptomClassifier;
pub use transition::TransitionPolicy;
pub use validation::validate_rma;

/// RMA 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum RmaError {
    #[error("驗證失敗: {0}")]
    Validation(String),

    #[error("無效的{field}值: {value}")]
    InvalidEnum { field: &'static str, value: String },

    #[error("無效的逾期天數篩選: {0}（允許 30/45/60/90）")]
    InvalidDaysFilter(u32),

    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("不允許的狀態轉換: {from} → {to}")]
    InvalidTransition { from: CaseStatus, to: CaseStatus },

    #[error("找不到記錄: {0}")]
    NotFound(String),

    #[error("無權限: {0}")]
    PermissionDenied(String),

    #[error("配置錯誤: {0}")]
    Config(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

impl RmaError {
    /// 是否屬於呼叫端輸入錯誤（對應 4xx 回應）
    pub fn is_client_error(&self) -> bool {
        !matches!(self, RmaError::Config(_) | RmaError::Other(_))
    }
}

pub type Result<T> = std::result::Result<T, RmaError>;
