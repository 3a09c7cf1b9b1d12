//! 表單層級的 RMA 驗證

use rust_decimal::Decimal;

use crate::date::RecordDate;
use crate::rma::RmaCase;
use crate::{Result, RmaError};

/// 驗證 RMA 案件
///
/// 回傳第一個錯誤。提報日早於客戶報修日屬於表單層級限制，資料模型本身不強制。
pub fn validate_rma(rma: &RmaCase) -> Result<()> {
    if rma.rma_number.trim().is_empty() {
        return Err(RmaError::Validation("RMA 編號為必填".to_string()));
    }

    if rma
        .site_name
        .as_deref()
        .map(|s| s.trim().is_empty())
        .unwrap_or(true)
    {
        return Err(RmaError::Validation(format!(
            "{}: 站點名稱為必填",
            rma.rma_number
        )));
    }

    let dates = [
        ("ascompRaisedDate", &rma.ascomp_raised_date),
        ("customerErrorDate", &rma.customer_error_date),
        ("createdAt", &rma.created_at),
        ("shippedDate", &rma.shipped_date),
        ("replacementReceivedDate", &rma.replacement_received_date),
        ("returnShippedDate", &rma.return_shipped_date),
        ("completedDate", &rma.completed_date),
    ];
    for (field, date) in dates {
        if let RecordDate::Invalid(raw) = date {
            return Err(RmaError::InvalidDate(format!(
                "{}: {} = {}",
                rma.rma_number, field, raw
            )));
        }
    }

    if let (Some(raised), Some(error)) = (
        rma.ascomp_raised_date.value(),
        rma.customer_error_date.value(),
    ) {
        if raised < error {
            return Err(RmaError::Validation(format!(
                "{}: 提報日期 {} 早於客戶報修日期 {}",
                rma.rma_number,
                raised.date_naive(),
                error.date_naive()
            )));
        }
    }

    if let Some(cost) = rma.estimated_cost {
        if cost < Decimal::ZERO {
            return Err(RmaError::Validation(format!(
                "{}: 預估費用不可為負數 ({})",
                rma.rma_number, cost
            )));
        }
    }

    Ok(())
}
