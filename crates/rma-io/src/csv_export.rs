//! CSV 匯出
//!
//! 預設為簡易引號規則：欄位含 `,` 或 `"` 時整欄加引號，`"` 重複一次。
//! 換行不加引號，含換行的欄位會破壞列結構；需要時改用 [`QuotePolicy::Rfc4180`]。

use rma_core::RmaCase;
use std::io::Write;

use crate::Result;

/// 匯出欄位（與匯入欄位名稱相同）
pub const RMA_COLUMNS: [&str; 27] = [
    "rmaNumber",
    "callLogNumber",
    "siteName",
    "siteId",
    "productName",
    "productPartNumber",
    "serialNumber",
    "defectivePartName",
    "defectivePartNumber",
    "replacedPartName",
    "replacedPartNumber",
    "symptoms",
    "caseStatus",
    "priority",
    "warrantyStatus",
    "ascompRaisedDate",
    "customerErrorDate",
    "createdAt",
    "shippedDate",
    "replacementReceivedDate",
    "returnShippedDate",
    "completedDate",
    "createdBy",
    "notes",
    "remarks",
    "trackingNumber",
    "estimatedCost",
];

/// 引號規則
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuotePolicy {
    /// 僅 `,` 與 `"` 觸發引號
    #[default]
    Naive,
    /// 另外對 CR/LF 加引號
    Rfc4180,
}

impl QuotePolicy {
    fn needs_quotes(self, field: &str) -> bool {
        match self {
            QuotePolicy::Naive => field.contains([',', '"']),
            QuotePolicy::Rfc4180 => field.contains([',', '"', '\r', '\n']),
        }
    }

    /// 依規則處理單一欄位
    pub fn quote(self, field: &str) -> String {
        if self.needs_quotes(field) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// 單筆案件的欄位值（順序同 [`RMA_COLUMNS`]）
pub fn rma_fields(rma: &RmaCase) -> Vec<String> {
    vec![
        rma.rma_number.clone(),
        text(&rma.call_log_number),
        text(&rma.site_name),
        text(&rma.site_id),
        text(&rma.product_name),
        text(&rma.product_part_number),
        text(&rma.serial_number),
        text(&rma.defective_part_name),
        text(&rma.defective_part_number),
        text(&rma.replaced_part_name),
        text(&rma.replaced_part_number),
        text(&rma.symptoms),
        rma.case_status.map(|s| s.to_string()).unwrap_or_default(),
        rma.priority.map(|p| p.to_string()).unwrap_or_default(),
        rma.warranty_status.map(|w| w.to_string()).unwrap_or_default(),
        rma.ascomp_raised_date.to_string(),
        rma.customer_error_date.to_string(),
        rma.created_at.to_string(),
        rma.shipped_date.to_string(),
        rma.replacement_received_date.to_string(),
        rma.return_shipped_date.to_string(),
        rma.completed_date.to_string(),
        text(&rma.created_by),
        text(&rma.notes),
        text(&rma.remarks),
        text(&rma.tracking_number),
        rma.estimated_cost.map(|c| c.to_string()).unwrap_or_default(),
    ]
}

/// CSV 匯出器
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter {
    policy: QuotePolicy,
}

impl CsvExporter {
    pub fn new(policy: QuotePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> QuotePolicy {
        self.policy
    }

    fn line<I, S>(&self, fields: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fields
            .into_iter()
            .map(|f| self.policy.quote(f.as_ref()))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// 匯出為字串（含標題列，以 `\n` 分隔）
    pub fn export(&self, cases: &[RmaCase]) -> String {
        let mut lines = Vec::with_capacity(cases.len() + 1);
        lines.push(self.line(RMA_COLUMNS));
        lines.extend(cases.iter().map(|rma| self.line(rma_fields(rma))));
        lines.join("\n")
    }

    /// 匯出任意表格
    pub fn export_table<S: AsRef<str>>(&self, header: &[S], rows: &[Vec<String>]) -> String {
        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(self.line(header));
        lines.extend(rows.iter().map(|row| self.line(row)));
        lines.join("\n")
    }

    /// 寫入輸出
    pub fn write_to<W: Write>(&self, cases: &[RmaCase], mut writer: W) -> Result<()> {
        writer.write_all(self.export(cases).as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        tracing::debug!("CSV 匯出 {} 筆", cases.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rma_core::{CaseStatus, Priority};
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case(QuotePolicy::Naive, "plain", "plain")]
    #[case(QuotePolicy::Naive, "Site, A", "\"Site, A\"")]
    #[case(QuotePolicy::Naive, "say \"hi\"", "\"say \"\"hi\"\"\"")]
    #[case(QuotePolicy::Naive, "two\nlines", "two\nlines")]
    #[case(QuotePolicy::Rfc4180, "two\nlines", "\"two\nlines\"")]
    #[case(QuotePolicy::Rfc4180, "cr\rhere", "\"cr\rhere\"")]
    fn test_quote(#[case] policy: QuotePolicy, #[case] raw: &str, #[case] expected: &str) {
        assert_eq!(policy.quote(raw), expected);
    }

    fn sample() -> RmaCase {
        RmaCase::new("RMA-1".to_string(), "Site, A".to_string())
            .with_defective_part("Lamp Assembly", "DEFECT-001")
            .with_status(CaseStatus::SentToCds)
            .with_priority(Priority::High)
            .with_raised_date(Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap())
            .with_estimated_cost(Decimal::new(12550, 2))
    }

    #[test]
    fn test_export_layout() {
        let csv = CsvExporter::default().export(&[sample()]);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("rmaNumber,callLogNumber,siteName,"));
        assert!(lines[1].starts_with("RMA-1,,\"Site, A\","));
        assert!(lines[1].contains(",Sent to CDS,High,"));
        assert!(lines[1].contains("2025-10-01T00:00:00+00:00"));
        assert!(lines[1].ends_with(",125.50"));
    }

    #[test]
    fn test_comma_field_round_trips_through_csv_reader() {
        let csv = CsvExporter::default().export(&[sample()]);
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        let site_index = headers.iter().position(|h| h == "siteName").unwrap();

        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[site_index], "Site, A");
        assert_eq!(record.len(), RMA_COLUMNS.len());
        assert_eq!(rma_fields(&sample()).len(), RMA_COLUMNS.len());
    }

    #[test]
    fn test_export_table() {
        let csv = CsvExporter::new(QuotePolicy::Rfc4180).export_table(
            &["part", "note"],
            &[vec!["Lamp".to_string(), "line1\nline2".to_string()]],
        );
        assert_eq!(csv, "part,note\nLamp,\"line1\nline2\"");
    }

    #[test]
    fn test_write_to_appends_newline() {
        let mut out = Vec::new();
        CsvExporter::default().write_to(&[], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);
    }
}
