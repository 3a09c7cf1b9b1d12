//! 案件留言模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, RmaError};

/// 使用者角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    #[serde(rename = "RMA Manager")]
    RmaManager,
    Support,
    Engineer,
    Viewer,
}

/// 留言者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub user_id: String,
    pub name: String,
    pub role: UserRole,
}

impl Author {
    pub fn new(user_id: &str, name: &str, role: UserRole) -> Self {
        Self {
            user_id: user_id.to_string(),
            name: name.to_string(),
            role,
        }
    }

    /// 是否可修改/刪除該留言（本人或管理員）
    pub fn can_modify(&self, comment: &Comment) -> bool {
        self.role == UserRole::Admin || self.user_id == comment.author.user_id
    }
}

/// 留言類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CommentType {
    #[default]
    General,
    #[serde(rename = "Status Update")]
    StatusUpdate,
    Technical,
    #[serde(rename = "Customer Communication")]
    CustomerCommunication,
    #[serde(rename = "Internal Note")]
    InternalNote,
}

/// 留言
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,

    /// 所屬 RMA 編號
    pub rma_number: String,

    pub author: Author,

    #[serde(default)]
    pub comment_type: CommentType,

    #[serde(default)]
    pub is_internal: bool,

    pub body: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub edited: bool,
}

impl Comment {
    /// 創建新留言
    pub fn new(rma_number: String, author: Author, body: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            rma_number,
            author,
            comment_type: CommentType::General,
            is_internal: false,
            body,
            created_at: now,
            updated_at: now,
            edited: false,
        }
    }

    /// 建構器模式：設置留言類型（Internal Note 一律為內部留言）
    pub fn with_type(mut self, comment_type: CommentType) -> Self {
        self.comment_type = comment_type;
        if comment_type == CommentType::InternalNote {
            self.is_internal = true;
        }
        self
    }

    /// 建構器模式：設置內部留言
    pub fn as_internal(mut self) -> Self {
        self.is_internal = true;
        self
    }
}

fn check_body(body: &str) -> Result<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(RmaError::Validation("留言內容不可為空".to_string()));
    }
    Ok(trimmed.to_string())
}

/// 單一 RMA 的留言串
///
/// 只能追加；編輯與刪除限本人或管理員，後寫入者覆蓋先前內容。
#[derive(Debug, Clone, Default)]
pub struct CommentThread {
    rma_number: String,
    comments: Vec<Comment>,
}

impl CommentThread {
    pub fn new(rma_number: String) -> Self {
        Self {
            rma_number,
            comments: Vec::new(),
        }
    }

    /// 由既有留言建立（忽略其他 RMA 的留言）
    pub fn from_comments(rma_number: String, comments: Vec<Comment>) -> Self {
        let mut comments: Vec<Comment> = comments
            .into_iter()
            .filter(|c| c.rma_number == rma_number)
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Self {
            rma_number,
            comments,
        }
    }

    /// 新增留言
    pub fn add(
        &mut self,
        author: Author,
        body: &str,
        comment_type: CommentType,
        now: DateTime<Utc>,
    ) -> Result<&Comment> {
        let body = check_body(body)?;
        let comment =
            Comment::new(self.rma_number.clone(), author, body, now).with_type(comment_type);
        self.comments.push(comment);
        Ok(&self.comments[self.comments.len() - 1])
    }

    /// 編輯留言
    pub fn edit(
        &mut self,
        comment_id: Uuid,
        actor: &Author,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<&Comment> {
        let body = check_body(body)?;
        let comment = self
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| RmaError::NotFound(format!("留言 {}", comment_id)))?;

        if !actor.can_modify(comment) {
            return Err(RmaError::PermissionDenied(format!(
                "{} 不能編輯他人的留言",
                actor.name
            )));
        }

        comment.body = body;
        comment.updated_at = now;
        comment.edited = true;
        Ok(&*comment)
    }

    /// 刪除留言
    pub fn delete(&mut self, comment_id: Uuid, actor: &Author) -> Result<Comment> {
        let index = self
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| RmaError::NotFound(format!("留言 {}", comment_id)))?;

        if !actor.can_modify(&self.comments[index]) {
            return Err(RmaError::PermissionDenied(format!(
                "{} 不能刪除他人的留言",
                actor.name
            )));
        }

        Ok(self.comments.remove(index))
    }

    /// 依時間排序的留言
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// 對外可見的留言（排除內部留言）
    pub fn public_comments(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(|c| !c.is_internal)
    }

    /// 最新留言
    pub fn latest(&self) -> Option<&Comment> {
        self.comments.iter().max_by_key(|c| c.created_at)
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}
