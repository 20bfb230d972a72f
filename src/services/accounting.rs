use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::info;

use super::context::RequestContext;
use super::crud::{set_if, CrudService, MemoryCrud, Resource};
use super::error::{Entity, ServiceError};
use crate::api::pagination::{Page, PageQuery};
use crate::database::models::{Account, AccountType, EntryStatus, JournalEntry, JournalLine, RecordStatus};

#[derive(Debug)]
pub struct AccountDraft {
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub parent_id: Option<u64>,
    pub description: Option<String>,
}

#[derive(Debug, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
    pub parent_id: Option<u64>,
    pub description: Option<String>,
    pub status: Option<RecordStatus>,
}

#[derive(Default)]
pub struct AccountCriteria {
    pub account_type: Option<AccountType>,
}

impl Resource for Account {
    const ENTITY: Entity = Entity::Account;

    type Draft = AccountDraft;
    type Patch = AccountPatch;
    type Criteria = AccountCriteria;

    fn from_draft(draft: AccountDraft, _ctx: &RequestContext, now: DateTime<Utc>) -> Self {
        Account {
            id: 0,
            code: draft.code,
            name: draft.name,
            account_type: draft.account_type,
            parent_id: draft.parent_id,
            description: draft.description,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: AccountPatch, now: DateTime<Utc>) {
        set_if(&mut self.name, patch.name);
        set_if(&mut self.account_type, patch.account_type);
        set_if(&mut self.status, patch.status);
        if patch.parent_id.is_some() {
            self.parent_id = patch.parent_id;
        }
        if patch.description.is_some() {
            self.description = patch.description;
        }
        self.updated_at = now;
    }

    fn matches(&self, criteria: &AccountCriteria, query: &PageQuery) -> bool {
        criteria.account_type.map_or(true, |t| t == self.account_type)
            && query.matches_status(self.status.as_str())
            && query.matches_keyword(&[self.code.as_str(), self.name.as_str()])
    }

    fn conflicts_with(&self, other: &Self) -> Option<&'static str> {
        (self.code == other.code).then_some("科目编码已存在")
    }

    fn check(&self) -> Result<(), ServiceError> {
        if self.parent_id == Some(self.id) && self.id != 0 {
            return Err(ServiceError::business("上级科目不能是自身"));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct JournalLineDraft {
    pub account_id: u64,
    pub debit: Decimal,
    pub credit: Decimal,
    pub summary: Option<String>,
}

#[derive(Debug)]
pub struct JournalEntryDraft {
    pub entry_date: NaiveDate,
    pub description: Option<String>,
    pub lines: Vec<JournalLineDraft>,
}

#[derive(Debug, Default)]
pub struct JournalEntryPatch {
    pub entry_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub lines: Option<Vec<JournalLineDraft>>,
}

#[derive(Default)]
pub struct JournalEntryCriteria {
    pub status: Option<EntryStatus>,
}

fn lines_from(drafts: Vec<JournalLineDraft>) -> Vec<JournalLine> {
    drafts
        .into_iter()
        .map(|l| JournalLine {
            account_id: l.account_id,
            debit: l.debit,
            credit: l.credit,
            summary: l.summary,
        })
        .collect()
}

impl Resource for JournalEntry {
    const ENTITY: Entity = Entity::JournalEntry;

    type Draft = JournalEntryDraft;
    type Patch = JournalEntryPatch;
    type Criteria = JournalEntryCriteria;

    fn from_draft(draft: JournalEntryDraft, ctx: &RequestContext, now: DateTime<Utc>) -> Self {
        let mut entry = JournalEntry {
            id: 0,
            entry_no: String::new(),
            entry_date: draft.entry_date,
            description: draft.description,
            lines: lines_from(draft.lines),
            total_debit: Decimal::ZERO,
            total_credit: Decimal::ZERO,
            status: EntryStatus::Draft,
            created_by: ctx.user_id(),
            posted_at: None,
            created_at: now,
            updated_at: now,
        };
        entry.recompute_totals();
        entry
    }

    fn apply(&mut self, patch: JournalEntryPatch, now: DateTime<Utc>) {
        set_if(&mut self.entry_date, patch.entry_date);
        if patch.description.is_some() {
            self.description = patch.description;
        }
        if let Some(lines) = patch.lines {
            self.lines = lines_from(lines);
            self.recompute_totals();
        }
        self.updated_at = now;
    }

    fn matches(&self, criteria: &JournalEntryCriteria, query: &PageQuery) -> bool {
        let status_ok = match criteria.status {
            Some(status) => status == self.status,
            None => query.matches_status(self.status.as_str()),
        };
        let day = self.entry_date;
        status_ok
            && query.start_date.map_or(true, |start| day >= start)
            && query.end_date.map_or(true, |end| day <= end)
            && query.matches_keyword(&[self.entry_no.as_str(), self.description.as_deref().unwrap_or_default()])
    }

    fn check(&self) -> Result<(), ServiceError> {
        if self.lines.len() < 2 {
            return Err(ServiceError::business("凭证至少需要两条分录"));
        }
        if self.total_debit != self.total_credit {
            return Err(ServiceError::business("借贷金额不平衡"));
        }
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<(), ServiceError> {
        match self.status {
            EntryStatus::Draft => Ok(()),
            EntryStatus::Posted => Err(ServiceError::business("凭证已过账，不能修改")),
            EntryStatus::Voided => Err(ServiceError::business("凭证已作废，不能修改")),
        }
    }
}

/// Journal entries plus the posting workflow.
///
/// Lines must reference existing accounts; entries move
/// `draft → posted → voided` and are frozen once they leave `draft`.
pub struct JournalService {
    entries: MemoryCrud<JournalEntry>,
    accounts: Arc<dyn CrudService<Account>>,
}

impl JournalService {
    pub fn new(accounts: Arc<dyn CrudService<Account>>) -> Self {
        Self {
            entries: MemoryCrud::new("journal_entries"),
            accounts,
        }
    }

    async fn ensure_accounts_exist(&self, ctx: &RequestContext, lines: &[JournalLineDraft]) -> Result<(), ServiceError> {
        let ids: BTreeSet<u64> = lines.iter().map(|l| l.account_id).collect();
        for id in ids {
            match self.accounts.get(ctx, id).await {
                Ok(account) if account.status == RecordStatus::Inactive => {
                    return Err(ServiceError::business(format!("科目 {} 已停用", account.code)));
                }
                Ok(_) => {}
                Err(ServiceError::NotFound { .. }) => {
                    return Err(ServiceError::business(format!("分录引用的科目不存在: {}", id)));
                }
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    /// Post a draft entry to the ledger
    pub async fn post(&self, ctx: &RequestContext, id: u64) -> Result<JournalEntry, ServiceError> {
        let entry = self
            .transition(id, |entry| match entry.status {
                EntryStatus::Draft => {
                    let now = Utc::now();
                    entry.status = EntryStatus::Posted;
                    entry.posted_at = Some(now);
                    entry.updated_at = now;
                    Ok(())
                }
                EntryStatus::Posted => Err(ServiceError::business("凭证已过账")),
                EntryStatus::Voided => Err(ServiceError::business("凭证已作废，不能过账")),
            })
            .await?;

        info!(request_id = ctx.request_id(), entry_no = %entry.entry_no, user_id = ctx.user_id(), "journal entry posted");
        Ok(entry)
    }

    /// Void a posted entry
    pub async fn void(&self, ctx: &RequestContext, id: u64) -> Result<JournalEntry, ServiceError> {
        let entry = self
            .transition(id, |entry| match entry.status {
                EntryStatus::Posted => {
                    entry.status = EntryStatus::Voided;
                    entry.updated_at = Utc::now();
                    Ok(())
                }
                EntryStatus::Draft => Err(ServiceError::business("草稿凭证不能作废，请直接删除")),
                EntryStatus::Voided => Err(ServiceError::business("凭证已作废")),
            })
            .await?;

        info!(request_id = ctx.request_id(), entry_no = %entry.entry_no, user_id = ctx.user_id(), "journal entry voided");
        Ok(entry)
    }

    async fn transition(
        &self,
        id: u64,
        step: impl FnOnce(&mut JournalEntry) -> Result<(), ServiceError>,
    ) -> Result<JournalEntry, ServiceError> {
        self.entries
            .table()
            .write(|rows| {
                let entry = rows
                    .get_mut(id)
                    .map_err(|_| ServiceError::not_found(Entity::JournalEntry, id))?;
                step(&mut *entry)?;
                Ok(entry.clone())
            })
            .await
    }
}

#[async_trait]
impl CrudService<JournalEntry> for JournalService {
    async fn create(&self, ctx: &RequestContext, draft: JournalEntryDraft) -> Result<JournalEntry, ServiceError> {
        self.ensure_accounts_exist(ctx, &draft.lines).await?;
        self.entries.create(ctx, draft).await
    }

    async fn get(&self, ctx: &RequestContext, id: u64) -> Result<JournalEntry, ServiceError> {
        self.entries.get(ctx, id).await
    }

    async fn list(
        &self,
        ctx: &RequestContext,
        criteria: JournalEntryCriteria,
        query: &PageQuery,
    ) -> Result<Page<JournalEntry>, ServiceError> {
        self.entries.list(ctx, criteria, query).await
    }

    async fn update(&self, ctx: &RequestContext, id: u64, patch: JournalEntryPatch) -> Result<JournalEntry, ServiceError> {
        if let Some(lines) = &patch.lines {
            self.ensure_accounts_exist(ctx, lines).await?;
        }
        self.entries.update(ctx, id, patch).await
    }

    async fn delete(&self, ctx: &RequestContext, id: u64) -> Result<(), ServiceError> {
        self.entries.delete(ctx, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RequestContext {
        RequestContext::system()
    }

    fn line(account_id: u64, debit: i64, credit: i64) -> JournalLineDraft {
        JournalLineDraft {
            account_id,
            debit: Decimal::new(debit, 0),
            credit: Decimal::new(credit, 0),
            summary: None,
        }
    }

    async fn setup() -> (Arc<MemoryCrud<Account>>, JournalService) {
        let accounts = Arc::new(MemoryCrud::<Account>::new("accounts"));
        for (code, name, account_type) in [("1001", "库存现金", AccountType::Asset), ("6001", "主营业务收入", AccountType::Revenue)] {
            accounts
                .create(
                    &ctx(),
                    AccountDraft {
                        code: code.into(),
                        name: name.into(),
                        account_type,
                        parent_id: None,
                        description: None,
                    },
                )
                .await
                .unwrap();
        }
        let journal = JournalService::new(accounts.clone());
        (accounts, journal)
    }

    fn draft(lines: Vec<JournalLineDraft>) -> JournalEntryDraft {
        JournalEntryDraft {
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            description: Some("销售收款".into()),
            lines,
        }
    }

    #[tokio::test]
    async fn duplicate_account_code_conflicts() {
        let (accounts, _) = setup().await;
        let err = accounts
            .create(
                &ctx(),
                AccountDraft {
                    code: "1001".into(),
                    name: "重复".into(),
                    account_type: AccountType::Asset,
                    parent_id: None,
                    description: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == "科目编码已存在"));
    }

    #[tokio::test]
    async fn balanced_entry_gets_number_and_totals() {
        let (_, journal) = setup().await;
        let entry = journal.create(&ctx(), draft(vec![line(1, 100, 0), line(2, 0, 100)])).await.unwrap();
        assert_eq!(entry.entry_no, "JE20240131000001");
        assert_eq!(entry.total_debit, Decimal::new(100, 0));
        assert_eq!(entry.status, EntryStatus::Draft);
    }

    #[tokio::test]
    async fn unknown_account_is_rejected() {
        let (_, journal) = setup().await;
        let err = journal
            .create(&ctx(), draft(vec![line(1, 50, 0), line(99, 0, 50)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Business(ref m) if m.contains("99")));
    }

    #[tokio::test]
    async fn unbalanced_entry_is_rejected() {
        let (_, journal) = setup().await;
        let err = journal
            .create(&ctx(), draft(vec![line(1, 100, 0), line(2, 0, 80)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Business(ref m) if m == "借贷金额不平衡"));
    }

    #[tokio::test]
    async fn posting_workflow() {
        let (_, journal) = setup().await;
        let entry = journal.create(&ctx(), draft(vec![line(1, 10, 0), line(2, 0, 10)])).await.unwrap();

        assert!(matches!(journal.void(&ctx(), entry.id).await, Err(ServiceError::Business(_))));

        let posted = journal.post(&ctx(), entry.id).await.unwrap();
        assert_eq!(posted.status, EntryStatus::Posted);
        assert!(posted.posted_at.is_some());

        // Frozen once posted
        assert!(matches!(journal.delete(&ctx(), entry.id).await, Err(ServiceError::Business(_))));
        assert!(matches!(
            journal.update(&ctx(), entry.id, JournalEntryPatch::default()).await,
            Err(ServiceError::Business(_))
        ));

        let voided = journal.void(&ctx(), entry.id).await.unwrap();
        assert_eq!(voided.status, EntryStatus::Voided);
        assert!(matches!(journal.post(&ctx(), entry.id).await, Err(ServiceError::Business(_))));
        assert!(matches!(
            journal.post(&ctx(), 404).await,
            Err(ServiceError::NotFound { entity: Entity::JournalEntry, id: 404 })
        ));
    }

    #[tokio::test]
    async fn accounts_filter_by_type() {
        let (accounts, _) = setup().await;
        let criteria = AccountCriteria {
            account_type: Some(AccountType::Asset),
        };
        let page = accounts.list(&ctx(), criteria, &PageQuery::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].code, "1001");
    }
}
