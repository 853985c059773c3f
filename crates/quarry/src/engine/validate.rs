use crate::Result;

use quarry_core::criteria::{Condition, Operator};
use quarry_core::schema::{Column, ColumnType, SchemaDescriptor};
use quarry_core::stmt::Value;
use quarry_core::{Criteria, Error, FieldCategory};

/// Validates every name a criteria references against the schema before
/// anything is compiled or executed. Violations are client errors carrying
/// the offending key and the clause it came from.
pub(crate) fn criteria(schema: &SchemaDescriptor, criteria: &Criteria) -> Result<()> {
    if let Some(filter) = &criteria.filter {
        condition(schema, filter)?;
    }

    for key in &criteria.sort {
        if !schema.has_column(&key.field) {
            return Err(Error::invalid_field_reference(FieldCategory::Sort, &key.field));
        }
    }

    if let Some(select) = &criteria.select {
        for name in select {
            if !schema.has_column(name) {
                return Err(Error::invalid_field_reference(FieldCategory::Select, name));
            }
        }
    }

    if let Some(omit) = &criteria.omit {
        for name in omit {
            if !schema.has_column(name) {
                return Err(Error::invalid_field_reference(FieldCategory::Omit, name));
            }
        }
    }

    for name in &criteria.populate {
        schema.expect_relation(name)?;
    }

    Ok(())
}

fn condition(schema: &SchemaDescriptor, node: &Condition) -> Result<()> {
    match node {
        Condition::And(children) | Condition::Or(children) => {
            for child in children {
                condition(schema, child)?;
            }
            Ok(())
        }
        Condition::Eq { field, value } => {
            let column = resolve(schema, field)?;
            if !column.ty.accepts(value) {
                return Err(Error::type_mismatch(field, column.ty.to_string()));
            }
            Ok(())
        }
        Condition::Compare { field, op, operand } => {
            let column = resolve(schema, field)?;
            operand_matches(field, column, *op, operand)
        }
    }
}

fn resolve<'a>(schema: &'a SchemaDescriptor, field: &str) -> Result<&'a Column> {
    schema
        .column(field)
        .ok_or_else(|| Error::invalid_field_reference(FieldCategory::Where, field))
}

/// Checks operand/column compatibility per operator family. A mismatch is
/// a hard validation error, never a silently-wrong comparison.
fn operand_matches(field: &str, column: &Column, op: Operator, operand: &Value) -> Result<()> {
    if op.is_ordering() {
        if !column.ty.is_numeric() {
            return Err(Error::type_mismatch(field, column.ty.to_string()));
        }
        if operand.as_f64().is_none() {
            return Err(Error::type_mismatch(field, column.ty.to_string()));
        }
        return Ok(());
    }

    if op.is_text() {
        if column.ty != ColumnType::Text || operand.as_str().is_none() {
            return Err(Error::type_mismatch(field, column.ty.to_string()));
        }
        return Ok(());
    }

    if op.is_membership() {
        let Some(items) = operand.as_list() else {
            return Err(Error::type_mismatch(field, column.ty.to_string()));
        };
        for item in items {
            if !column.ty.accepts(item) {
                return Err(Error::type_mismatch(field, column.ty.to_string()));
            }
        }
        return Ok(());
    }

    // Operator::Ne
    if !column.ty.accepts(operand) {
        return Err(Error::type_mismatch(field, column.ty.to_string()));
    }
    Ok(())
}
