use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use super::error::StoreError;
use crate::api::pagination::{Page, PageQuery};

/// Comparable column value used for `sort_by`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Int(i64),
    Text(String),
    Decimal(Decimal),
    Date(NaiveDate),
    Time(DateTime<Utc>),
}

/// A row that can live in a [`Table`]
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> u64;

    fn set_id(&mut self, id: u64);

    /// Value of `field` for ordering; `None` when the field is not sortable
    fn sort_key(&self, _field: &str) -> Option<SortKey> {
        None
    }
}

type Predicate<'a, R> = Box<dyn Fn(&R) -> bool + Send + Sync + 'a>;

/// Conjunction of row predicates
pub struct Filter<'a, R> {
    predicates: Vec<Predicate<'a, R>>,
}

impl<'a, R> Default for Filter<'a, R> {
    fn default() -> Self {
        Self { predicates: Vec::new() }
    }
}

impl<'a, R> Filter<'a, R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, predicate: impl Fn(&R) -> bool + Send + Sync + 'a) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, row: &R) -> bool {
        self.predicates.iter().all(|p| p(row))
    }
}

/// Mutable view of a table's rows while its write lock is held
pub struct Rows<'t, R> {
    rows: &'t mut BTreeMap<u64, R>,
    next_id: &'t AtomicU64,
}

impl<'t, R: Record> Rows<'t, R> {
    /// Assign the next id and store the row
    pub fn insert(&mut self, mut row: R) -> R {
        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);
        row.set_id(id);
        self.rows.insert(id, row.clone());
        row
    }

    pub fn get(&self, id: u64) -> Option<&R> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: u64) -> Result<&mut R, StoreError> {
        self.rows.get_mut(&id).ok_or(StoreError::RecordNotFound)
    }

    pub fn remove(&mut self, id: u64) -> Result<R, StoreError> {
        self.rows.remove(&id).ok_or(StoreError::RecordNotFound)
    }

    pub fn any(&self, predicate: impl FnMut(&R) -> bool) -> bool {
        self.rows.values().any(predicate)
    }

    pub fn find(&self, mut predicate: impl FnMut(&R) -> bool) -> Option<&R> {
        self.rows.values().find(|row| predicate(row))
    }
}

/// In-memory table with id allocation.
///
/// Multi-step operations (uniqueness check then insert, read-modify-write) go
/// through [`Table::write`] so they run under one lock acquisition.
pub struct Table<R> {
    name: &'static str,
    rows: RwLock<BTreeMap<u64, R>>,
    next_id: AtomicU64,
}

impl<R: Record> Table<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run `f` with exclusive access to the rows
    pub async fn write<T>(&self, f: impl FnOnce(&mut Rows<'_, R>) -> T) -> T {
        let mut guard = self.rows.write().await;
        let mut rows = Rows {
            rows: &mut *guard,
            next_id: &self.next_id,
        };
        f(&mut rows)
    }

    pub async fn get(&self, id: u64) -> Result<R, StoreError> {
        self.rows.read().await.get(&id).cloned().ok_or(StoreError::RecordNotFound)
    }

    /// Apply `change` to the row with `id` and return the updated row
    pub async fn update(&self, id: u64, change: impl FnOnce(&mut R)) -> Result<R, StoreError> {
        self.write(|rows| {
            let row = rows.get_mut(id)?;
            change(row);
            Ok(row.clone())
        })
        .await
    }

    /// Apply `change` to every matching row and return how many were touched.
    ///
    /// An empty filter is refused rather than rewriting the whole table.
    pub async fn update_where(&self, filter: &Filter<'_, R>, mut change: impl FnMut(&mut R)) -> Result<u64, StoreError> {
        if filter.is_empty() {
            return Err(StoreError::MissingWhereClause);
        }
        let mut rows = self.rows.write().await;
        let mut touched = 0;
        for row in rows.values_mut() {
            if filter.matches(row) {
                change(row);
                touched += 1;
            }
        }
        Ok(touched)
    }

    /// Filtered, sorted page of rows.
    ///
    /// Rows are ordered by `query.sort_by` when the record knows that field,
    /// otherwise by id; `sort_desc` reverses either order.
    pub async fn list(&self, filter: &Filter<'_, R>, query: &PageQuery) -> Page<R> {
        let rows = self.rows.read().await;
        let mut matched: Vec<&R> = rows.values().filter(|row| filter.matches(row)).collect();

        if let Some(field) = query.sort_by.as_deref() {
            matched.sort_by(|a, b| compare_by(*a, *b, field));
        }
        if query.sort_desc {
            matched.reverse();
        }

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(query.offset())
            .take(query.limit())
            .cloned()
            .collect();

        Page { items, total }
    }
}

fn compare_by<R: Record>(a: &R, b: &R, field: &str) -> Ordering {
    match (a.sort_key(field), b.sort_key(field)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.id().cmp(&b.id())),
        _ => a.id().cmp(&b.id()),
    }
}
