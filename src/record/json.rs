//! JSON bridge for records
//!
//! Input: a map of field name to scalar plus a list of extensible groups.
//! JSON `null` is the missing value. Output keys use display names.

use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use super::Record;
use crate::schema::{
    json_type_name, FieldKind, RecordError, RecordResult, SchemaTable, Value, Violation,
};

impl Record {
    /// Builds a record from JSON field values and extensible groups.
    ///
    /// Undeclared keys fail with `UnknownField`, two keys for one field
    /// with `DuplicateField`, and non-scalar values with `InvalidValue`.
    pub fn from_json_fields(
        schema: Arc<SchemaTable>,
        fields: &Map<String, JsonValue>,
        groups: &[Vec<JsonValue>],
    ) -> RecordResult<Record> {
        let mut record = Record::new(schema);

        let mut given: Vec<Option<&str>> = vec![None; record.schema().fixed_fields().len()];
        for (name, json) in fields {
            let index = record
                .schema()
                .field_index(name)
                .ok_or_else(|| RecordError::unknown_field(record.schema().name(), name))?;
            if let Some(previous) = given[index] {
                return Err(RecordError::DuplicateField {
                    object: record.schema().name().to_string(),
                    field: name.clone(),
                    previous: previous.to_string(),
                });
            }
            given[index] = Some(name.as_str());

            let desc = &record.schema().fixed_fields()[index];
            let value = scalar(&desc.name, desc.kind, json)?;
            record.set(name, value)?;
        }

        for group in groups {
            let template = record.schema().extensible_template();
            let mut values = Vec::with_capacity(group.len());
            for (i, json) in group.iter().enumerate() {
                let value = match template.get(i) {
                    Some(desc) => scalar(&desc.name, desc.kind, json)?,
                    // Arity is reported by append_extensible
                    None => None,
                };
                values.push(value);
            }
            record.append_extensible(values)?;
        }

        Ok(record)
    }

    /// Serializes resolved fixed values and extensible groups.
    pub fn to_json(&self) -> JsonValue {
        let mut fields = Map::new();
        for (desc, value) in self.iter() {
            fields.insert(desc.name.clone(), option_to_json(value));
        }

        let groups: Vec<JsonValue> = self
            .extensible_groups()
            .iter()
            .map(|g| JsonValue::Array(g.iter().cloned().map(option_to_json).collect()))
            .collect();

        serde_json::json!({
            "object": self.schema().name(),
            "fields": fields,
            "extensibles": groups,
        })
    }
}

fn scalar(field: &str, kind: FieldKind, json: &JsonValue) -> RecordResult<Option<Value>> {
    if json.is_null() {
        return Ok(None);
    }

    Value::try_from(json).map(Some).map_err(|_| {
        RecordError::invalid_value(
            field,
            json,
            Violation::TypeMismatch {
                expected: kind,
                actual: json_type_name(json),
            },
        )
    })
}

fn option_to_json(value: Option<Value>) -> JsonValue {
    value.map(JsonValue::from).unwrap_or(JsonValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDescriptor;
    use serde_json::json;

    fn pump() -> Arc<SchemaTable> {
        Arc::new(
            SchemaTable::new(
                "Pump:ConstantSpeed",
                vec![
                    FieldDescriptor::alpha("Name").required(),
                    FieldDescriptor::real("Rated Flow Rate").minimum(0.0).autosizable(),
                    FieldDescriptor::alpha("Pump Control Type")
                        .choices(["Continuous", "Intermittent"])
                        .with_default("Continuous"),
                ],
                vec![FieldDescriptor::node("Node 1 Name")],
            )
            .with_min_fields(1),
        )
    }

    #[test]
    fn test_from_json_fields() {
        let fields = json!({"Name": "Pump 1", "rated_flow_rate": "autosize"});
        let record = Record::from_json_fields(
            pump(),
            fields.as_object().unwrap(),
            &[vec![json!("Node A")], vec![json!(null)]],
        )
        .unwrap();

        assert_eq!(record.get("Rated Flow Rate").unwrap(), Some(Value::Autosize));
        assert_eq!(record.extensible_groups().len(), 2);
        assert!(record.is_complete());
    }

    #[test]
    fn test_from_json_unknown_key() {
        let fields = json!({"Name": "Pump 1", "Head": 3});
        let err = Record::from_json_fields(pump(), fields.as_object().unwrap(), &[]).unwrap_err();
        assert_eq!(err.code(), "IDF_UNKNOWN_FIELD");
    }

    #[test]
    fn test_from_json_same_field_twice() {
        let fields = json!({"Name": "A", "name": "B"});
        let err = Record::from_json_fields(pump(), fields.as_object().unwrap(), &[]).unwrap_err();
        assert_eq!(
            err,
            RecordError::DuplicateField {
                object: "Pump:ConstantSpeed".into(),
                field: "name".into(),
                previous: "Name".into(),
            }
        );
        assert_eq!(err.code(), "IDF_DUPLICATE_FIELD");

        let fields = json!({"Rated Flow Rate": 1.0, "rated_flow_rate": 2.0});
        let err = Record::from_json_fields(pump(), fields.as_object().unwrap(), &[]).unwrap_err();
        assert_eq!(err.field(), Some("rated_flow_rate"));
    }

    #[test]
    fn test_from_json_non_scalar() {
        let fields = json!({"Name": ["Pump 1"]});
        let err = Record::from_json_fields(pump(), fields.as_object().unwrap(), &[]).unwrap_err();
        assert_eq!(err.code(), "IDF_INVALID_VALUE");
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_from_json_group_arity() {
        let fields = json!({"Name": "Pump 1"});
        let err = Record::from_json_fields(
            pump(),
            fields.as_object().unwrap(),
            &[vec![json!("A"), json!("B")]],
        )
        .unwrap_err();
        assert_eq!(err.code(), "IDF_ARITY_MISMATCH");
    }

    #[test]
    fn test_to_json() {
        let mut record = Record::new(pump());
        record.set("Name", Some("Pump 1".into())).unwrap();
        record.set("Rated Flow Rate", Some(0.25.into())).unwrap();
        record.append_extensible(vec![Some("Node A".into())]).unwrap();

        assert_eq!(
            record.to_json(),
            json!({
                "object": "Pump:ConstantSpeed",
                "fields": {
                    "Name": "Pump 1",
                    "Rated Flow Rate": 0.25,
                    "Pump Control Type": "Continuous"
                },
                "extensibles": [["Node A"]]
            })
        );
    }
}
