//! JSON 匯出

use rma_core::RmaCase;

use crate::Result;

/// 匯出為 JSON 陣列（縮排格式）
pub fn to_json(cases: &[RmaCase]) -> Result<String> {
    Ok(serde_json::to_string_pretty(cases)?)
}

/// 讀回整批 JSON；任一筆格式錯誤即失敗（逐筆容錯請用匯入器）
pub fn from_json(json: &str) -> Result<Vec<RmaCase>> {
    Ok(serde_json::from_str(json)?)
}
