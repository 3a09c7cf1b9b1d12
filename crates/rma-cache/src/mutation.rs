//! 變更操作與其失效範圍
//!
//! 每個會寫入資料的操作都列於 [`Mutation`]，呼叫端在寫入後以
//! [`QueryCache::apply_mutation`](crate::QueryCache::apply_mutation) 使相關快取失效。

use crate::CacheKey;

/// 快取端點
pub mod endpoints {
    pub const RMAS: &str = "/rmas";
    pub const ANALYTICS: &str = "/analytics";
    pub const OVERDUE: &str = "/analytics/overdue";
    pub const PARTS: &str = "/analytics/parts";
    pub const COMMENTS: &str = "/comments";
    pub const DTRS: &str = "/dtrs";
}

/// 失效範圍
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// 端點本身及其子路徑（`/analytics` 涵蓋 `/analytics/parts`）
    Endpoint(&'static str),
    /// 端點下某參數等於指定值的條目
    Record {
        endpoint: &'static str,
        option: &'static str,
        value: String,
    },
}

impl Scope {
    pub fn matches(&self, key: &CacheKey) -> bool {
        match self {
            Scope::Endpoint(prefix) => key
                .endpoint()
                .strip_prefix(*prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
            Scope::Record {
                endpoint,
                option,
                value,
            } => key.endpoint() == *endpoint && key.options().get(*option) == Some(value),
        }
    }
}

/// 寫入操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateRma,
    UpdateRma { rma_number: String },
    ChangeStatus { rma_number: String },
    AddComment { rma_number: String },
    EditComment { rma_number: String },
    DeleteComment { rma_number: String },
    ConvertDtr { case_number: String },
    ImportRmas,
}

impl Mutation {
    /// 需失效的範圍
    pub fn scopes(&self) -> Vec<Scope> {
        use endpoints::*;

        match self {
            Mutation::CreateRma
            | Mutation::ImportRmas
            | Mutation::UpdateRma { .. }
            | Mutation::ChangeStatus { .. } => {
                vec![Scope::Endpoint(RMAS), Scope::Endpoint(ANALYTICS)]
            }
            // 零件分析含各站點最新留言
            Mutation::AddComment { rma_number }
            | Mutation::EditComment { rma_number }
            | Mutation::DeleteComment { rma_number } => vec![
                Scope::Record {
                    endpoint: COMMENTS,
                    option: "rmaNumber",
                    value: rma_number.clone(),
                },
                Scope::Endpoint(PARTS),
            ],
            Mutation::ConvertDtr { .. } => vec![
                Scope::Endpoint(DTRS),
                Scope::Endpoint(RMAS),
                Scope::Endpoint(ANALYTICS),
            ],
        }
    }

    /// 此操作是否使 `key` 失效
    pub fn invalidates(&self, key: &CacheKey) -> bool {
        self.scopes().iter().any(|scope| scope.matches(key))
    }
}
