//! 分析配置模型

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::status::Priority;
use crate::symptom::{SymptomClassifier, DEFAULT_SYMPTOM_PATTERNS};
use crate::transition::TransitionPolicy;
use crate::{Result, RmaError};

/// 逾期天數門檻（僅允許 30/45/60/90）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DaysFilter(u32);

impl DaysFilter {
    pub const ALLOWED: [u32; 4] = [30, 45, 60, 90];

    pub fn new(days: u32) -> Result<Self> {
        if Self::ALLOWED.contains(&days) {
            Ok(Self(days))
        } else {
            Err(RmaError::InvalidDaysFilter(days))
        }
    }

    pub fn days(&self) -> i64 {
        i64::from(self.0)
    }
}

impl Default for DaysFilter {
    fn default() -> Self {
        Self(30)
    }
}

impl TryFrom<u32> for DaysFilter {
    type Error = RmaError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DaysFilter> for u32 {
    fn from(value: DaysFilter) -> Self {
        value.0
    }
}

/// 零件優先分數權重
///
/// ```text
/// days  = min(avgPendingDays / days_divisor, days_cap)
/// count = min(pendingCount * per_pending, count_cap)
/// sev   = critical_bonus（有 Critical 案件）或 high_bonus（有 High 案件）
/// score = clamp(days + count + sev, 0, 10)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PriorityWeights {
    pub days_divisor: f64,
    pub days_cap: f64,
    pub per_pending: f64,
    pub count_cap: f64,
    pub critical_bonus: f64,
    pub high_bonus: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            days_divisor: 15.0,
            days_cap: 5.0,
            per_pending: 0.5,
            count_cap: 3.0,
            critical_bonus: 2.0,
            high_bonus: 1.0,
        }
    }
}

impl PriorityWeights {
    /// 權重不得為負或 NaN，且 Critical 加分不低於 High
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("daysDivisor", self.days_divisor),
            ("daysCap", self.days_cap),
            ("perPending", self.per_pending),
            ("countCap", self.count_cap),
            ("criticalBonus", self.critical_bonus),
            ("highBonus", self.high_bonus),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(RmaError::Config(format!(
                    "priorityWeights.{} 必須為非負數: {}",
                    name, value
                )));
            }
        }
        if self.days_divisor == 0.0 {
            return Err(RmaError::Config("daysDivisor 必須大於 0".to_string()));
        }
        if self.critical_bonus < self.high_bonus {
            return Err(RmaError::Config(format!(
                "criticalBonus ({}) 不得小於 highBonus ({})",
                self.critical_bonus, self.high_bonus
            )));
        }
        Ok(())
    }
}

/// 各優先級的 SLA 目標天數
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SlaTargets {
    pub critical_days: u32,
    pub high_days: u32,
    pub medium_days: u32,
    pub low_days: u32,
    /// 未設置優先級時
    pub default_days: u32,
}

impl SlaTargets {
    pub fn target_days(&self, priority: Option<Priority>) -> u32 {
        match priority {
            Some(Priority::Critical) => self.critical_days,
            Some(Priority::High) => self.high_days,
            Some(Priority::Medium) => self.medium_days,
            Some(Priority::Low) => self.low_days,
            None => self.default_days,
        }
    }
}

impl Default for SlaTargets {
    fn default() -> Self {
        Self {
            critical_days: 7,
            high_days: 14,
            medium_days: 30,
            low_days: 45,
            default_days: 30,
        }
    }
}

/// 分析參數配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyticsConfig {
    /// 預設逾期天數門檻
    pub days_filter: DaysFilter,

    /// 是否允許未來日期產生負的逾期天數
    pub include_future: bool,

    /// SLA 目標
    pub sla_targets: SlaTargets,

    /// SLA 違約率警戒值（百分比）
    pub breach_rate_threshold: f64,

    /// 零件優先分數權重
    pub priority_weights: PriorityWeights,

    /// 分數達此值的零件列為關鍵零件
    pub critical_part_score: f64,

    /// 症狀關鍵字
    pub symptom_patterns: Vec<String>,

    /// 讀取快取存活時間（秒）
    pub cache_ttl_secs: u64,

    /// 狀態轉換策略
    pub transition_policy: TransitionPolicy,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            days_filter: DaysFilter::default(),
            include_future: false,
            sla_targets: SlaTargets::default(),
            breach_rate_threshold: 20.0,
            priority_weights: PriorityWeights::default(),
            critical_part_score: 7.0,
            symptom_patterns: DEFAULT_SYMPTOM_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            cache_ttl_secs: 30,
            transition_policy: TransitionPolicy::Permissive,
        }
    }
}

impl AnalyticsConfig {
    /// 從 JSON 字串載入（缺少的欄位使用預設值）
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RmaError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 從檔案載入
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RmaError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }

    /// 檢查配置值
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.breach_rate_threshold) {
            return Err(RmaError::Config(format!(
                "breachRateThreshold 必須介於 0 到 100: {}",
                self.breach_rate_threshold
            )));
        }
        if !(0.0..=10.0).contains(&self.critical_part_score) {
            return Err(RmaError::Config(format!(
                "criticalPartScore 必須介於 0 到 10: {}",
                self.critical_part_score
            )));
        }
        self.priority_weights.validate()
    }

    /// 建構器模式：設置逾期天數門檻
    pub fn with_days_filter(mut self, days_filter: DaysFilter) -> Self {
        self.days_filter = days_filter;
        self
    }

    /// 建構器模式：設置是否包含未來日期
    pub fn with_include_future(mut self, include: bool) -> Self {
        self.include_future = include;
        self
    }

    /// 建構器模式：設置 SLA 目標
    pub fn with_sla_targets(mut self, targets: SlaTargets) -> Self {
        self.sla_targets = targets;
        self
    }

    /// 建構器模式：設置違約率警戒值
    pub fn with_breach_rate_threshold(mut self, threshold: f64) -> Self {
        self.breach_rate_threshold = threshold;
        self
    }

    /// 建構器模式：設置優先分數權重
    pub fn with_priority_weights(mut self, weights: PriorityWeights) -> Self {
        self.priority_weights = weights;
        self
    }

    /// 建構器模式：設置症狀關鍵字
    pub fn with_symptom_patterns(mut self, patterns: Vec<String>) -> Self {
        self.symptom_patterns = patterns;
        self
    }

    /// 建構器模式：設置狀態轉換策略
    pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.transition_policy = policy;
        self
    }

    /// 建立症狀分類器
    pub fn symptom_classifier(&self) -> SymptomClassifier {
        SymptomClassifier::new(&self.symptom_patterns)
    }
}
