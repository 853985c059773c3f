/// An association between two entity types.
#[derive(Debug, Clone)]
pub struct Relation {
    /// Property name under which the association is exposed
    pub name: String,

    /// Cardinality and join-key ownership
    pub kind: RelationKind,

    /// Name of the target entity
    pub target: String,

    /// The foreign-key column joining the two sides. For [`RelationKind::BelongsTo`]
    /// this is a column of the owning entity; for [`RelationKind::HasMany`] a column
    /// of the target entity; for [`RelationKind::ManyToMany`] the target's primary
    /// key as recorded in link storage.
    pub join_key: String,

    /// Property name of the inverse relation on the target, when declared
    pub inverse: Option<String>,
}

/// The shape of a relation, as seen from the entity declaring it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// To-one; the declaring entity holds the foreign key.
    BelongsTo,

    /// To-many; each target record holds a foreign key back to the
    /// declaring entity.
    HasMany,

    /// To-many through link storage; neither row holds the key.
    ManyToMany,
}

impl Relation {
    /// True for to-many cardinality.
    pub fn is_many(&self) -> bool {
        matches!(self.kind, RelationKind::HasMany | RelationKind::ManyToMany)
    }

    /// The alias under which this relation is joined into a query result.
    pub fn join_alias(&self) -> String {
        format!("populate_{}", self.name)
    }
}
