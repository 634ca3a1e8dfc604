//! Schema-validated records
//!
//! A `Record` is bound to one shared `SchemaTable` for its whole lifetime.
//! Every write passes through the validator, so stored values always
//! satisfy their descriptor. The only exception is the missing value
//! (`None`), which is accepted for any field.
//!
//! Fixed fields move through `Unset -> Set | Cleared`, then freely between
//! `Set` and `Cleared`. An `Unset` field reports its descriptor default; a
//! `Cleared` field reports nothing.
//!
//! Records hold no locks. Share tables across threads, not records.

mod json;

use std::sync::Arc;

use crate::schema::{
    check_value, FieldDescriptor, RecordError, RecordResult, SchemaTable, Value,
};

/// One extensible group, positionally matching the template
pub type ExtensibleGroup = Vec<Option<Value>>;

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    /// Never written
    Unset,
    /// Explicitly set to the missing value
    Cleared,
    Set(Value),
}

/// A mutable instance of one schema table
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<SchemaTable>,
    values: Vec<Slot>,
    extensible_groups: Vec<ExtensibleGroup>,
}

impl Record {
    /// Creates a record with every fixed field unset and no groups.
    pub fn new(schema: Arc<SchemaTable>) -> Self {
        let values = vec![Slot::Unset; schema.fixed_fields().len()];
        Self {
            schema,
            values,
            extensible_groups: Vec::new(),
        }
    }

    /// The bound schema table
    pub fn schema(&self) -> &SchemaTable {
        &self.schema
    }

    /// Shared handle to the bound schema table
    pub fn schema_arc(&self) -> &Arc<SchemaTable> {
        &self.schema
    }

    fn index_of(&self, field: &str) -> RecordResult<usize> {
        self.schema
            .field_index(field)
            .ok_or_else(|| RecordError::unknown_field(self.schema.name(), field))
    }

    /// Returns the stored value, the default if the field was never
    /// written, or `None`. A default that fails validation is not reported.
    pub fn get(&self, field: &str) -> RecordResult<Option<Value>> {
        let index = self.index_of(field)?;
        Ok(self.resolve(index))
    }

    fn resolve(&self, index: usize) -> Option<Value> {
        match &self.values[index] {
            Slot::Set(value) => Some(value.clone()),
            Slot::Cleared => None,
            Slot::Unset => {
                let desc = &self.schema.fixed_fields()[index];
                // A default that fails its own field's rules reads as missing
                desc.default
                    .as_ref()
                    .and_then(|d| check_value(desc, d.clone()).ok())
            }
        }
    }

    /// True if the field has been written, including with `None`.
    pub fn is_explicit(&self, field: &str) -> RecordResult<bool> {
        let index = self.index_of(field)?;
        Ok(self.values[index] != Slot::Unset)
    }

    /// Validates and stores a value. `None` clears the field.
    ///
    /// On error the record is unchanged.
    pub fn set(&mut self, field: &str, value: Option<Value>) -> RecordResult<()> {
        let index = self.index_of(field)?;
        let slot = match value {
            None => Slot::Cleared,
            Some(value) => Slot::Set(validate(&self.schema.fixed_fields()[index], value)?),
        };
        self.values[index] = slot;
        Ok(())
    }

    /// Same as `set(field, None)`.
    pub fn unset(&mut self, field: &str) -> RecordResult<()> {
        self.set(field, None)
    }

    /// All extensible groups in append order
    pub fn extensible_groups(&self) -> &[ExtensibleGroup] {
        &self.extensible_groups
    }

    /// Reads one value of one extensible group by template field name.
    ///
    /// Returns `None` if the group does not exist or the value is missing.
    pub fn extensible_value(&self, group: usize, field: &str) -> RecordResult<Option<&Value>> {
        let position = self
            .schema
            .extensible_index(field)
            .ok_or_else(|| RecordError::unknown_field(self.schema.name(), field))?;
        Ok(self
            .extensible_groups
            .get(group)
            .and_then(|g| g[position].as_ref()))
    }

    /// Validates one group against the template and appends it.
    ///
    /// Nothing is appended unless every value validates.
    pub fn append_extensible<I>(&mut self, values: I) -> RecordResult<()>
    where
        I: IntoIterator<Item = Option<Value>>,
    {
        let group = self.validate_group(values.into_iter().collect())?;
        self.extensible_groups.push(group);
        Ok(())
    }

    /// Replaces all extensible groups.
    ///
    /// Every group is validated before any is stored; the first failure is
    /// returned and the existing groups are kept.
    pub fn replace_extensible_groups<G, I>(&mut self, groups: G) -> RecordResult<()>
    where
        G: IntoIterator<Item = I>,
        I: IntoIterator<Item = Option<Value>>,
    {
        let staged = groups
            .into_iter()
            .map(|g| self.validate_group(g.into_iter().collect()))
            .collect::<RecordResult<Vec<_>>>()?;
        self.extensible_groups = staged;
        Ok(())
    }

    pub fn clear_extensible_groups(&mut self) {
        self.extensible_groups.clear();
    }

    fn validate_group(&self, values: Vec<Option<Value>>) -> RecordResult<ExtensibleGroup> {
        let template = self.schema.extensible_template();
        if template.is_empty() || values.len() != template.len() {
            return Err(RecordError::ArityMismatch {
                object: self.schema.name().to_string(),
                expected: template.len(),
                actual: values.len(),
            });
        }

        template
            .iter()
            .zip(values)
            .map(|(desc, value)| value.map(|v| validate(desc, v)).transpose())
            .collect()
    }

    /// True when every field below the table's `min-fields` resolves to a
    /// value.
    pub fn is_complete(&self) -> bool {
        (0..self.schema.min_fields()).all(|i| self.resolve(i).is_some())
    }

    /// Names of required fixed fields that resolve to nothing.
    pub fn missing_required(&self) -> Vec<&str> {
        self.schema
            .fixed_fields()
            .iter()
            .enumerate()
            .filter(|(i, desc)| desc.required && self.resolve(*i).is_none())
            .map(|(_, desc)| desc.name.as_str())
            .collect()
    }

    /// Fixed fields with their resolved values, in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldDescriptor, Option<Value>)> + '_ {
        self.schema
            .fixed_fields()
            .iter()
            .enumerate()
            .map(move |(i, desc)| (desc, self.resolve(i)))
    }
}

fn validate(desc: &FieldDescriptor, value: Value) -> RecordResult<Value> {
    let shown = value.to_string();
    check_value(desc, value).map_err(|rule| RecordError::invalid_value(&desc.name, shown, rule))
}
