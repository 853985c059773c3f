use crate::stmt::Value;
use crate::{async_trait, Result};

/// The relation-operation capability, scoped to one relation of one parent
/// record.
///
/// Every operation targets the relation alone, with no full parent load
/// or save, so concurrent mutations of *different* relations on
/// the same parent compose without clobbering each other.
#[async_trait]
pub trait RelationOps: Send {
    /// Current foreign key of a to-one relation.
    async fn load_one(&self) -> Result<Option<Value>>;

    /// Current related identifiers of a to-many relation.
    async fn load_many(&self) -> Result<Vec<Value>>;

    /// Attaches the given identifiers (to-many).
    async fn add(&self, ids: &[Value]) -> Result<()>;

    /// Detaches the given identifiers (to-many). Never deletes the related
    /// records.
    async fn remove(&self, ids: &[Value]) -> Result<()>;

    /// Replaces the relation's value: a scalar or `Null` for to-one, a
    /// `List` for a full-set to-many replace.
    async fn set(&self, target: Value) -> Result<()>;
}
