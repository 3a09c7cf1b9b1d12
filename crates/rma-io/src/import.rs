//! 批次匯入
//!
//! 每列獨立解析與驗證，失敗的列記錄在報告中，不中斷整批匯入。
//! 列號自 1 起算，不含 CSV 標題列。

use rma_core::{
    validate_rma, CaseStatus, Priority, RecordDate, RmaCase, RmaError, SymptomClassifier,
    WarrantyStatus,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::{IoError, Result};

/// 檔案格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    /// 依副檔名判斷
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(ImportFormat::Csv),
            Some("json") => Ok(ImportFormat::Json),
            _ => Err(IoError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// 單列錯誤
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRowError {
    pub row: usize,
    pub rma_number: Option<String>,
    pub message: String,
}

/// 匯入結果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: Vec<RmaCase>,
    pub errors: Vec<ImportRowError>,
    /// 症狀欄位被搬移的筆數
    pub normalized: usize,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// CSV 列（欄位名稱同匯出）
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CsvRow {
    rma_number: Option<String>,
    call_log_number: Option<String>,
    site_name: Option<String>,
    site_id: Option<String>,
    product_name: Option<String>,
    product_part_number: Option<String>,
    serial_number: Option<String>,
    defective_part_name: Option<String>,
    defective_part_number: Option<String>,
    replaced_part_name: Option<String>,
    replaced_part_number: Option<String>,
    symptoms: Option<String>,
    case_status: Option<String>,
    priority: Option<String>,
    warranty_status: Option<String>,
    ascomp_raised_date: Option<String>,
    customer_error_date: Option<String>,
    created_at: Option<String>,
    shipped_date: Option<String>,
    replacement_received_date: Option<String>,
    return_shipped_date: Option<String>,
    completed_date: Option<String>,
    tracking_number: Option<String>,
    estimated_cost: Option<String>,
    created_by: Option<String>,
    notes: Option<String>,
    remarks: Option<String>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_enum<T: FromStr<Err = RmaError>>(value: Option<String>) -> rma_core::Result<Option<T>> {
    clean(value).map(|v| v.parse()).transpose()
}

fn date(value: Option<String>) -> RecordDate {
    value.as_deref().map(RecordDate::parse).unwrap_or_default()
}

impl CsvRow {
    fn into_rma(self) -> rma_core::Result<RmaCase> {
        let estimated_cost = match clean(self.estimated_cost) {
            Some(raw) => Some(Decimal::from_str(&raw).map_err(|_| {
                RmaError::Validation(format!("estimatedCost 無法解析: {}", raw))
            })?),
            None => None,
        };

        Ok(RmaCase {
            rma_number: clean(self.rma_number).unwrap_or_default(),
            call_log_number: clean(self.call_log_number),
            site_name: clean(self.site_name),
            site_id: clean(self.site_id),
            product_name: clean(self.product_name),
            product_part_number: clean(self.product_part_number),
            serial_number: clean(self.serial_number),
            defective_part_number: clean(self.defective_part_number),
            defective_part_name: clean(self.defective_part_name),
            replaced_part_number: clean(self.replaced_part_number),
            replaced_part_name: clean(self.replaced_part_name),
            symptoms: clean(self.symptoms),
            ascomp_raised_date: date(self.ascomp_raised_date),
            customer_error_date: date(self.customer_error_date),
            created_at: date(self.created_at),
            shipped_date: date(self.shipped_date),
            replacement_received_date: date(self.replacement_received_date),
            return_shipped_date: date(self.return_shipped_date),
            completed_date: date(self.completed_date),
            tracking_number: clean(self.tracking_number),
            case_status: parse_enum::<CaseStatus>(self.case_status)?,
            priority: parse_enum::<Priority>(self.priority)?,
            warranty_status: parse_enum::<WarrantyStatus>(self.warranty_status)?,
            estimated_cost,
            created_by: clean(self.created_by),
            notes: clean(self.notes),
            remarks: clean(self.remarks),
        })
    }
}

/// 批次匯入器
///
/// 預設執行表單驗證與重複檢查；[`Importer::parse_only`] 僅解析，
/// 供分析讀取使用，日期無效或缺少站點的案件交由分析器處理。
#[derive(Debug, Clone, Default)]
pub struct Importer {
    classifier: SymptomClassifier,
    existing: HashSet<String>,
    parse_only: bool,
}

impl Importer {
    pub fn new(classifier: SymptomClassifier) -> Self {
        Self {
            classifier,
            ..Self::default()
        }
    }

    /// 建構器模式：略過表單驗證與重複檢查
    pub fn parse_only(mut self) -> Self {
        self.parse_only = true;
        self
    }

    /// 建構器模式：已存在的 RMA 編號（重複者視為錯誤）
    pub fn with_existing<I, S>(mut self, rma_numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.existing = rma_numbers.into_iter().map(Into::into).collect();
        self
    }

    /// 依格式匯入
    pub fn import_reader<R: Read>(
        &self,
        format: ImportFormat,
        mut reader: R,
    ) -> Result<ImportReport> {
        match format {
            ImportFormat::Csv => self.import_csv(reader),
            ImportFormat::Json => {
                let mut json = String::new();
                reader.read_to_string(&mut json)?;
                self.import_json(&json)
            }
        }
    }

    /// 匯入 CSV（需含標題列）
    pub fn import_csv<R: Read>(&self, reader: R) -> Result<ImportReport> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(reader);

        // 標題列本身錯誤時整批失敗
        csv_reader.headers()?;

        let rows = csv_reader
            .deserialize::<CsvRow>()
            .map(|row| match row {
                Ok(row) => {
                    let number = clean(row.rma_number.clone());
                    row.into_rma().map_err(|e| (number, e.to_string()))
                }
                Err(e) => Err((None, e.to_string())),
            });

        Ok(self.collect(rows))
    }

    /// 匯入 JSON 陣列
    pub fn import_json(&self, json: &str) -> Result<ImportReport> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;

        let rows = values.into_iter().map(|value| {
            let number = value
                .get("rmaNumber")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            serde_json::from_value::<RmaCase>(value).map_err(|e| (number, e.to_string()))
        });

        Ok(self.collect(rows))
    }

    fn collect<I>(&self, rows: I) -> ImportReport
    where
        I: Iterator<Item = std::result::Result<RmaCase, (Option<String>, String)>>,
    {
        let mut report = ImportReport::default();
        let mut seen = self.existing.clone();

        for (index, parsed) in rows.enumerate() {
            let row = index + 1;
            match parsed.and_then(|rma| self.check(rma, &mut seen)) {
                Ok((rma, normalized)) => {
                    if normalized {
                        report.normalized += 1;
                    }
                    report.imported.push(rma);
                }
                Err((rma_number, message)) => {
                    tracing::warn!("匯入第 {} 列失敗: {}", row, message);
                    report.errors.push(ImportRowError {
                        row,
                        rma_number,
                        message,
                    });
                }
            }
        }

        tracing::info!(
            "匯入完成：成功 {} 筆，失敗 {} 筆，症狀搬移 {} 筆",
            report.imported.len(),
            report.errors.len(),
            report.normalized
        );
        report
    }

    fn check(
        &self,
        mut rma: RmaCase,
        seen: &mut HashSet<String>,
    ) -> std::result::Result<(RmaCase, bool), (Option<String>, String)> {
        if !self.parse_only {
            let number = Some(rma.rma_number.clone()).filter(|n| !n.is_empty());
            validate_rma(&rma).map_err(|e| (number.clone(), e.to_string()))?;

            if !seen.insert(rma.rma_number.clone()) {
                return Err((number, format!("RMA 編號重複: {}", rma.rma_number)));
            }
        }

        let normalized = rma.normalize_symptoms(&self.classifier);
        Ok((rma, normalized))
    }
}
