use super::{Column, ColumnType, Relation, RelationKind, SchemaDescriptor};
use crate::{bail, Result};

use indexmap::IndexMap;

/// Builds a [`SchemaDescriptor`].
///
/// Collects columns and relations, then validates the descriptor's internal
/// consistency at [`Builder::build`]. Cross-entity consistency (relation
/// targets, join-key columns on the far side) is checked when the descriptor
/// set is registered with a `Db`.
#[derive(Debug)]
pub struct Builder {
    name: String,
    primary_key: Option<String>,
    columns: IndexMap<String, Column>,
    relations: IndexMap<String, Relation>,
}

impl Builder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: None,
            columns: IndexMap::new(),
            relations: IndexMap::new(),
        }
    }

    /// Declares the primary key column. Always `Integer` typed.
    pub fn id(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.primary_key = Some(name.clone());
        self.columns.insert(
            name.clone(),
            Column {
                name,
                ty: ColumnType::Integer,
                nullable: false,
            },
        );
        self
    }

    pub fn column(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
        let name = name.into();
        self.columns.insert(
            name.clone(),
            Column {
                name,
                ty,
                nullable: false,
            },
        );
        self
    }

    pub fn nullable_column(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
        let name = name.into();
        self.columns.insert(
            name.clone(),
            Column {
                name,
                ty,
                nullable: true,
            },
        );
        self
    }

    /// Declares a to-one relation; `join_key` is a column of this entity
    /// holding the target's primary key.
    pub fn belongs_to(
        self,
        name: impl Into<String>,
        target: impl Into<String>,
        join_key: impl Into<String>,
    ) -> Self {
        self.relation(name, RelationKind::BelongsTo, target, join_key)
    }

    /// Declares a to-many relation; `join_key` is a column of the target
    /// entity holding this entity's primary key.
    pub fn has_many(
        self,
        name: impl Into<String>,
        target: impl Into<String>,
        join_key: impl Into<String>,
    ) -> Self {
        self.relation(name, RelationKind::HasMany, target, join_key)
    }

    /// Declares a to-many relation through link storage.
    pub fn many_to_many(
        self,
        name: impl Into<String>,
        target: impl Into<String>,
        join_key: impl Into<String>,
    ) -> Self {
        self.relation(name, RelationKind::ManyToMany, target, join_key)
    }

    fn relation(
        mut self,
        name: impl Into<String>,
        kind: RelationKind,
        target: impl Into<String>,
        join_key: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.relations.insert(
            name.clone(),
            Relation {
                name,
                kind,
                target: target.into(),
                join_key: join_key.into(),
                inverse: None,
            },
        );
        self
    }

    /// Records the inverse property name on the most recently declared
    /// relation.
    pub fn inverse(mut self, name: impl Into<String>) -> Self {
        if let Some((_, relation)) = self.relations.last_mut() {
            relation.inverse = Some(name.into());
        }
        self
    }

    pub fn build(self) -> Result<SchemaDescriptor> {
        let Some(primary_key) = self.primary_key else {
            bail!("schema `{}` declares no primary key", self.name);
        };

        for relation in self.relations.values() {
            if self.columns.contains_key(&relation.name) {
                bail!(
                    "schema `{}`: relation `{}` collides with a column of the same name",
                    self.name,
                    relation.name
                );
            }
            if relation.kind == RelationKind::BelongsTo
                && !self.columns.contains_key(&relation.join_key)
            {
                bail!(
                    "schema `{}`: relation `{}` joins on unknown column `{}`",
                    self.name,
                    relation.name,
                    relation.join_key
                );
            }
        }

        Ok(SchemaDescriptor {
            name: self.name,
            primary_key,
            columns: self.columns,
            relations: self.relations,
        })
    }
}
