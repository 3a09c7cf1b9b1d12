//! # RMA IO
//!
//! CSV / JSON 匯出與批次匯入

pub mod csv_export;
pub mod import;
pub mod json_export;

// Re-export 主要類型
pub use csv_export::{CsvExporter, QuotePolicy, RMA_COLUMNS};
pub use import::{ImportFormat, ImportReport, ImportRowError, Importer};
pub use json_export::{from_json, to_json};

/// 匯入匯出錯誤
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("CSV 錯誤: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON 錯誤: {0}")]
    Json(#[from] serde_json::Error),

    #[error("讀寫錯誤: {0}")]
    Io(#[from] std::io::Error),

    #[error("不支援的檔案格式: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, IoError>;
