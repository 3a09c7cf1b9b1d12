//! 記錄日期欄位
//!
//! 上游資料的日期欄位格式不一，可能缺漏或無法解析。
//! 三種狀態分開保存，讓彙總邏輯可以排除「無法判定」的記錄，而不是當成 0。

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 日期欄位
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordDate {
    /// 未填寫
    #[default]
    Missing,
    /// 已解析的時間（UTC）
    Valid(DateTime<Utc>),
    /// 無法解析，保留原始字串
    Invalid(String),
}

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

impl RecordDate {
    /// 解析原始字串
    ///
    /// 支援 RFC 3339、無時區的日期時間（視為 UTC）與純日期（當日 00:00 UTC）。
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return RecordDate::Missing;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return RecordDate::Valid(dt.with_timezone(&Utc));
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return RecordDate::Valid(Utc.from_utc_datetime(&naive));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return RecordDate::Valid(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
        }

        RecordDate::Invalid(trimmed.to_string())
    }

    /// 由日期建立（當日 00:00 UTC）
    pub fn from_date(date: NaiveDate) -> Self {
        RecordDate::Valid(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
    }

    /// 取得有效時間
    pub fn value(&self) -> Option<DateTime<Utc>> {
        match self {
            RecordDate::Valid(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RecordDate::Missing)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, RecordDate::Invalid(_))
    }
}

impl From<DateTime<Utc>> for RecordDate {
    fn from(value: DateTime<Utc>) -> Self {
        RecordDate::Valid(value)
    }
}

/// 匯出用字串：缺漏為空字串，無效值保留原文
impl fmt::Display for RecordDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordDate::Missing => Ok(()),
            RecordDate::Valid(dt) => f.write_str(&dt.to_rfc3339()),
            RecordDate::Invalid(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for RecordDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RecordDate::Missing => serializer.serialize_none(),
            RecordDate::Valid(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            RecordDate::Invalid(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for RecordDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| RecordDate::parse(&s)).unwrap_or_default())
    }
}
