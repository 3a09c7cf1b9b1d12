//! 零件優先分數

use rma_core::PriorityWeights;

use crate::round_to;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// 分數輸入
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriorityInputs {
    pub avg_pending_days: f64,
    pub pending_count: usize,
    pub has_critical: bool,
    pub has_high: bool,
}

/// 計算 0–10 的零件優先分數
///
/// 對平均待處理天數、待處理件數與是否有 Critical/High 案件皆為單調不減。
pub fn priority_score(inputs: &PriorityInputs, weights: &PriorityWeights) -> f64 {
    let days = (inputs.avg_pending_days.max(0.0) / weights.days_divisor).min(weights.days_cap);
    let count = (inputs.pending_count as f64 * weights.per_pending).min(weights.count_cap);
    let severity = if inputs.has_critical {
        weights.critical_bonus
    } else if inputs.has_high {
        weights.high_bonus
    } else {
        0.0
    };

    round_to((days + count + severity).clamp(MIN_SCORE, MAX_SCORE), 1)
}
