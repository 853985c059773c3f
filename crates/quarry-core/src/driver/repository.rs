use super::RawRow;
use crate::stmt::{Record, Value};
use crate::{async_trait, Result};

/// Plain row-level operations for one entity, used by the entity service.
#[async_trait]
pub trait Repository: Send {
    /// Inserts a new row, assigning the primary key when absent. Returns
    /// the stored record.
    async fn insert(&self, values: RawRow) -> Result<Record>;

    /// Applies a direct column update to one row, without loading it.
    async fn update_columns(&self, id: &Value, values: RawRow) -> Result<()>;

    /// Loads one row by primary key. `None` when missing or soft-deleted.
    async fn load(&self, id: &Value) -> Result<Option<Record>>;

    /// Saves a full record, including assigned relations. This is the path
    /// relation-bearing updates must take; the store owns relation
    /// assignment semantics.
    async fn save(&self, record: Record) -> Result<Record>;

    async fn soft_delete(&self, id: &Value) -> Result<()>;

    async fn restore(&self, id: &Value) -> Result<()>;

    /// Number of live (not soft-deleted) rows.
    async fn count(&self) -> Result<u64>;
}
