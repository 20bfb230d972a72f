use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::context::RequestContext;
use super::error::{Entity, ServiceError};
use crate::api::pagination::{Page, PageQuery};
use crate::database::{Filter, Record, Rows, StoreError, Table};

/// A record type managed through [`CrudService`].
///
/// `Draft` and `Patch` are the already-validated inputs for create and
/// update; `Criteria` holds the resource-specific list filters that sit next
/// to the common [`PageQuery`] ones.
pub trait Resource: Record {
    const ENTITY: Entity;

    type Draft: Send + 'static;
    type Patch: Send + 'static;
    type Criteria: Send + Sync + 'static;

    fn from_draft(draft: Self::Draft, ctx: &RequestContext, now: DateTime<Utc>) -> Self;

    fn apply(&mut self, patch: Self::Patch, now: DateTime<Utc>);

    fn matches(&self, criteria: &Self::Criteria, query: &PageQuery) -> bool;

    /// Message for a unique-key collision between `self` and `other`
    fn conflicts_with(&self, _other: &Self) -> Option<&'static str> {
        None
    }

    /// Row-level invariant checked after create/update
    fn check(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Whether the stored row may still be changed or removed
    fn ensure_mutable(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// Collaborator contract for create/read/list/update/delete
#[async_trait]
pub trait CrudService<M: Resource>: Send + Sync {
    async fn create(&self, ctx: &RequestContext, draft: M::Draft) -> Result<M, ServiceError>;

    async fn get(&self, ctx: &RequestContext, id: u64) -> Result<M, ServiceError>;

    async fn list(&self, ctx: &RequestContext, criteria: M::Criteria, query: &PageQuery) -> Result<Page<M>, ServiceError>;

    async fn update(&self, ctx: &RequestContext, id: u64, patch: M::Patch) -> Result<M, ServiceError>;

    async fn delete(&self, ctx: &RequestContext, id: u64) -> Result<(), ServiceError>;
}

/// [`CrudService`] over an in-memory [`Table`]
pub struct MemoryCrud<M> {
    table: Table<M>,
}

impl<M: Resource> MemoryCrud<M> {
    pub fn new(name: &'static str) -> Self {
        Self { table: Table::new(name) }
    }

    pub fn table(&self) -> &Table<M> {
        &self.table
    }

    fn not_found(id: u64) -> impl FnOnce(StoreError) -> ServiceError {
        move |err| match err {
            StoreError::RecordNotFound => ServiceError::not_found(M::ENTITY, id),
            other => ServiceError::Store(other),
        }
    }
}

#[async_trait]
impl<M: Resource> CrudService<M> for MemoryCrud<M> {
    async fn create(&self, ctx: &RequestContext, draft: M::Draft) -> Result<M, ServiceError> {
        let candidate = M::from_draft(draft, ctx, Utc::now());
        candidate.check()?;

        let created = self
            .table
            .write(|rows| {
                let clash = rows_conflict(rows, &candidate);
                match clash {
                    Some(message) => Err(ServiceError::conflict(message)),
                    None => Ok(rows.insert(candidate)),
                }
            })
            .await?;

        debug!(
            request_id = ctx.request_id(),
            table = self.table.name(),
            id = created.id(),
            "record created"
        );
        Ok(created)
    }

    async fn get(&self, _ctx: &RequestContext, id: u64) -> Result<M, ServiceError> {
        self.table.get(id).await.map_err(Self::not_found(id))
    }

    async fn list(&self, _ctx: &RequestContext, criteria: M::Criteria, query: &PageQuery) -> Result<Page<M>, ServiceError> {
        let filter = Filter::new().and(|row: &M| row.matches(&criteria, query));
        Ok(self.table.list(&filter, query).await)
    }

    async fn update(&self, ctx: &RequestContext, id: u64, patch: M::Patch) -> Result<M, ServiceError> {
        let updated = self
            .table
            .write(|rows| {
                let current = rows.get(id).ok_or_else(|| ServiceError::not_found(M::ENTITY, id))?;
                current.ensure_mutable()?;

                let mut candidate = current.clone();
                candidate.apply(patch, Utc::now());
                candidate.check()?;
                if let Some(message) = rows_conflict(rows, &candidate) {
                    return Err(ServiceError::conflict(message));
                }

                let row = rows.get_mut(id)?;
                *row = candidate.clone();
                Ok(candidate)
            })
            .await?;

        debug!(request_id = ctx.request_id(), table = self.table.name(), id, "record updated");
        Ok(updated)
    }

    async fn delete(&self, ctx: &RequestContext, id: u64) -> Result<(), ServiceError> {
        self.table
            .write(|rows| {
                let current = rows.get(id).ok_or_else(|| ServiceError::not_found(M::ENTITY, id))?;
                current.ensure_mutable()?;
                rows.remove(id)?;
                Ok::<_, ServiceError>(())
            })
            .await?;

        debug!(request_id = ctx.request_id(), table = self.table.name(), id, "record deleted");
        Ok(())
    }
}

/// First unique-key collision between `candidate` and any other row
fn rows_conflict<M: Resource>(rows: &Rows<'_, M>, candidate: &M) -> Option<&'static str> {
    rows.find(|other| other.id() != candidate.id() && candidate.conflicts_with(other).is_some())
        .and_then(|other| candidate.conflicts_with(other))
}

/// Keep `current` unless `value` is present
pub(crate) fn set_if<T>(current: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *current = value;
    }
}
