//! # RMA Analytics
//!
//! 保固 RMA 案件分析：逾期分類、零件分析、SLA 與建議，附帶查詢快取與匯入匯出。
//!
//! [`AnalyticsService`] 將分析器與快取串在一起：讀取走快取，
//! 每個寫入操作完成後依 [`Mutation`] 使相關快取失效。

pub mod cli;

use chrono::{DateTime, Utc};
use std::io::Read;
use std::time::Duration;
use uuid::Uuid;

pub use rma_cache::{CacheKey, Clock, ManualClock, Mutation, QueryCache, SystemClock};
pub use rma_calc::{
    Breakdown, OverdueQuery, OverdueReport, PartSortKey, PartsReport, Recommendation,
    RecommendationType, RmaAnalyzer, Severity,
};
pub use rma_core::{
    AnalyticsConfig, Author, CaseStatus, Comment, CommentThread, CommentType, DtrCase,
    DtrConverter, Priority, RecordDate, RmaCase, RmaError, StatusFilter, UserRole,
};
pub use rma_io::{CsvExporter, ImportFormat, ImportReport, Importer, QuotePolicy};

use rma_cache::endpoints;

/// 帶快取的分析服務
pub struct AnalyticsService<C: Clock + Clone = SystemClock> {
    analyzer: RmaAnalyzer,
    overdue_cache: QueryCache<OverdueReport, C>,
    parts_cache: QueryCache<PartsReport, C>,
}

impl AnalyticsService<SystemClock> {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock + Clone> AnalyticsService<C> {
    /// 以自訂時鐘建立（測試用）
    pub fn with_clock(config: AnalyticsConfig, clock: C) -> Self {
        let ttl = Duration::from_secs(config.cache_ttl_secs);
        Self {
            analyzer: RmaAnalyzer::new(config),
            overdue_cache: QueryCache::with_clock(ttl, clock.clone()),
            parts_cache: QueryCache::with_clock(ttl, clock),
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        self.analyzer.config()
    }

    /// 以配置預設值建立逾期查詢，可覆寫天數與狀態
    pub fn query(
        &self,
        days: Option<u32>,
        status: Option<&str>,
    ) -> rma_core::Result<OverdueQuery> {
        let config = self.config();
        let mut query = OverdueQuery::from_params(days, status)?
            .with_include_future(config.include_future);
        if days.is_none() {
            query.days_filter = config.days_filter;
        }
        Ok(query)
    }

    /// 逾期報表（快取）
    pub fn overdue(
        &self,
        cases: &[RmaCase],
        query: OverdueQuery,
        now: DateTime<Utc>,
    ) -> OverdueReport {
        let key = CacheKey::new(endpoints::OVERDUE)
            .with_option("days", query.days_filter.days())
            .with_option("status", query.status)
            .with_option("includeFuture", query.include_future);

        self.overdue_cache
            .get_or_insert_with(key, || self.analyzer.overdue_report(cases, query, now))
    }

    /// 零件分析報表（快取）
    pub fn parts(
        &self,
        cases: &[RmaCase],
        comments: &[Comment],
        sort: PartSortKey,
        now: DateTime<Utc>,
    ) -> PartsReport {
        let key = CacheKey::new(endpoints::PARTS).with_option("sortBy", format!("{:?}", sort));

        self.parts_cache
            .get_or_insert_with(key, || self.analyzer.parts_report(cases, comments, sort, now))
    }

    /// 寫入後使快取失效，回傳移除的條目數
    pub fn record(&self, mutation: &Mutation) -> usize {
        self.overdue_cache.apply_mutation(mutation) + self.parts_cache.apply_mutation(mutation)
    }

    /// 更新案件狀態（依配置的轉換策略）
    pub fn change_status(&self, rma: &mut RmaCase, next: CaseStatus) -> rma_core::Result<()> {
        rma.transition_to(next, self.config().transition_policy)?;
        tracing::info!("RMA {} 狀態更新為 {}", rma.rma_number, next);
        self.record(&Mutation::ChangeStatus {
            rma_number: rma.rma_number.clone(),
        });
        Ok(())
    }

    /// 新增留言
    pub fn add_comment<'t>(
        &self,
        thread: &'t mut CommentThread,
        author: Author,
        body: &str,
        comment_type: CommentType,
        now: DateTime<Utc>,
    ) -> rma_core::Result<&'t Comment> {
        let comment = thread.add(author, body, comment_type, now)?;
        self.record(&Mutation::AddComment {
            rma_number: comment.rma_number.clone(),
        });
        Ok(comment)
    }

    /// 編輯留言（限本人或管理員）
    pub fn edit_comment<'t>(
        &self,
        thread: &'t mut CommentThread,
        comment_id: Uuid,
        actor: &Author,
        body: &str,
        now: DateTime<Utc>,
    ) -> rma_core::Result<&'t Comment> {
        let comment = thread.edit(comment_id, actor, body, now)?;
        self.record(&Mutation::EditComment {
            rma_number: comment.rma_number.clone(),
        });
        Ok(comment)
    }

    /// 刪除留言（限本人或管理員），回傳被刪除的留言
    pub fn delete_comment(
        &self,
        thread: &mut CommentThread,
        comment_id: Uuid,
        actor: &Author,
    ) -> rma_core::Result<Comment> {
        let comment = thread.delete(comment_id, actor)?;
        self.record(&Mutation::DeleteComment {
            rma_number: comment.rma_number.clone(),
        });
        Ok(comment)
    }

    /// DTR 轉 RMA
    pub fn convert_dtr(
        &self,
        dtr: &mut DtrCase,
        rma_number: &str,
        now: DateTime<Utc>,
    ) -> rma_core::Result<RmaCase> {
        let rma = DtrConverter::convert(dtr, rma_number, now)?;
        self.record(&Mutation::ConvertDtr {
            case_number: dtr.case_number.clone(),
        });
        Ok(rma)
    }

    /// 讀取分析用案件：只解析不驗證，不視為寫入
    ///
    /// 缺少站點或日期無效的案件保留給分析器，分別歸入 `Unknown` 或 `skipped`。
    pub fn load<R: Read>(&self, format: ImportFormat, reader: R) -> rma_io::Result<ImportReport> {
        Importer::new(self.config().symptom_classifier())
            .parse_only()
            .import_reader(format, reader)
    }

    /// 批次匯入（驗證並檢查重複）
    pub fn import<R: Read>(
        &self,
        format: ImportFormat,
        reader: R,
        existing: &[RmaCase],
    ) -> rma_io::Result<ImportReport> {
        let report = Importer::new(self.config().symptom_classifier())
            .with_existing(existing.iter().map(|rma| rma.rma_number.clone()))
            .import_reader(format, reader)?;
        if !report.imported.is_empty() {
            self.record(&Mutation::ImportRmas);
        }
        Ok(report)
    }
}
