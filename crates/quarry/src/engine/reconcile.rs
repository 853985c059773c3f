use quarry_core::driver::Executed;
use quarry_core::schema::{RelationKind, SchemaDescriptor};
use quarry_core::stmt::Record;

/// Repairs foreign-key scalars after a partial projection.
///
/// When a to-one relation was populated but `select`/`omit` excluded the
/// raw foreign-key column from the base projection, the hydrated record
/// carries the relation object yet loses the scalar that says which parent
/// it points at. The raw row still has the value (the join needed it), so
/// copy it back onto the record. Runs as an explicit post-processing step
/// over index-aligned `(raw row, record)` pairs.
pub(crate) fn foreign_keys(
    schema: &SchemaDescriptor,
    populated: &[String],
    executed: Executed,
) -> Vec<Record> {
    let Executed { raw, mut records } = executed;

    let join_keys: Vec<&str> = populated
        .iter()
        .filter_map(|name| schema.relation(name))
        .filter(|relation| relation.kind == RelationKind::BelongsTo)
        .map(|relation| relation.join_key.as_str())
        .collect();

    if join_keys.is_empty() {
        return records;
    }

    for (record, raw_row) in records.iter_mut().zip(&raw) {
        for join_key in &join_keys {
            if record.contains(join_key) {
                continue;
            }
            if let Some(value) = raw_row.get(*join_key) {
                record.set(*join_key, value.clone());
            }
        }
    }

    records
}
