//! Schema type definitions
//!
//! A `SchemaTable` describes one object type: an ordered list of fixed
//! fields followed by an optional repeating group of extensible fields.
//! Tables are plain data, usually loaded from JSON using the key names of
//! the source data dictionary (`required-field`, `minimum>`,
//! `accepted-values`, `extensible-fields`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{RecordError, RecordResult};
use super::validator;
use super::value::Value;

/// Semantic type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Free text
    #[serde(rename = "alpha")]
    Alpha,
    /// 64-bit floating point
    #[serde(rename = "real")]
    Real,
    /// 64-bit signed integer
    #[serde(rename = "integer")]
    Integer,
    /// Name of a node
    #[serde(rename = "node")]
    Node,
    /// Name of another object
    #[serde(rename = "object-list", alias = "external-list")]
    ObjectList,
}

impl FieldKind {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Alpha => "alpha",
            FieldKind::Real => "real",
            FieldKind::Integer => "integer",
            FieldKind::Node => "node",
            FieldKind::ObjectList => "object-list",
        }
    }

    /// Real and integer fields
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Real | FieldKind::Integer)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Metadata for one named field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Display name, unique within its list
    pub name: String,
    /// Semantic type
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Must be non-missing when the record is finalized
    #[serde(rename = "required-field", default)]
    pub required: bool,
    /// Value reported by an untouched field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Inclusive lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Exclusive lower bound
    #[serde(rename = "minimum>", default, skip_serializing_if = "Option::is_none")]
    pub minimum_exclusive: Option<f64>,
    /// Inclusive upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Exclusive upper bound
    #[serde(rename = "maximum<", default, skip_serializing_if = "Option::is_none")]
    pub maximum_exclusive: Option<f64>,
    /// Permitted values (case-sensitive); empty means unrestricted
    #[serde(rename = "accepted-values", default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    /// Display-only unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Accepts the `autosize` sentinel
    #[serde(default)]
    pub autosizable: bool,
    /// Accepts the `autocalculate` sentinel
    #[serde(default)]
    pub autocalculatable: bool,
    /// Free-text documentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Explicit accessor name; derived from `name` when absent
    #[serde(rename = "pyname", default, skip_serializing_if = "Option::is_none")]
    pub accessor: Option<String>,
    /// Member of the repeating template. Set by `SchemaTable`.
    #[serde(skip)]
    pub extensible: bool,
}

impl FieldDescriptor {
    /// Create an optional field of the given kind
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            minimum: None,
            minimum_exclusive: None,
            maximum: None,
            maximum_exclusive: None,
            choices: Vec::new(),
            unit: None,
            autosizable: false,
            autocalculatable: false,
            note: None,
            accessor: None,
            extensible: false,
        }
    }

    /// Create an optional alpha field
    pub fn alpha(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Alpha)
    }

    /// Create an optional real field
    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Real)
    }

    /// Create an optional integer field
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    /// Create an optional node-reference field
    pub fn node(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Node)
    }

    /// Create an optional object-reference field
    pub fn object_list(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::ObjectList)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn minimum(mut self, bound: f64) -> Self {
        self.minimum = Some(bound);
        self
    }

    pub fn minimum_exclusive(mut self, bound: f64) -> Self {
        self.minimum_exclusive = Some(bound);
        self
    }

    pub fn maximum(mut self, bound: f64) -> Self {
        self.maximum = Some(bound);
        self
    }

    pub fn maximum_exclusive(mut self, bound: f64) -> Self {
        self.maximum_exclusive = Some(bound);
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn autosizable(mut self) -> Self {
        self.autosizable = true;
        self
    }

    pub fn autocalculatable(mut self) -> Self {
        self.autocalculatable = true;
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn accessor(mut self, accessor: impl Into<String>) -> Self {
        self.accessor = Some(accessor.into());
        self
    }

    /// Accessor name: the explicit one if set, else derived from the
    /// display name.
    ///
    /// Words are lowercased and joined by `_`, `/` reads as `or`, and other
    /// punctuation is dropped without splitting. `"Minimum Part-Load Ratio"`
    /// becomes `minimum_partload_ratio`.
    pub fn accessor_name(&self) -> String {
        match &self.accessor {
            Some(accessor) => accessor.clone(),
            None => derive_accessor(&self.name),
        }
    }

    /// Returns true if `name` refers to this field, by display name
    /// (ASCII case-insensitive) or accessor name.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.accessor_name() == name
    }

    /// True if `other` could be reached through one of this field's names.
    fn collides_with(&self, other: &FieldDescriptor) -> bool {
        self.answers_to(&other.name)
            || self.answers_to(&other.accessor_name())
            || other.answers_to(&self.name)
    }

    /// Checks the descriptor's own metadata.
    fn validate_structure(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Field name must not be empty".into());
        }

        if !self.kind.is_numeric() && (self.autosizable || self.autocalculatable) {
            return Err(format!(
                "Field '{}': sentinels are only allowed on numeric fields",
                self.name
            ));
        }

        let lower = self.minimum.into_iter().chain(self.minimum_exclusive).reduce(f64::max);
        let upper = self.maximum.into_iter().chain(self.maximum_exclusive).reduce(f64::min);
        if let (Some(lo), Some(hi)) = (lower, upper) {
            if lo > hi {
                return Err(format!(
                    "Field '{}': lower bound {} exceeds upper bound {}",
                    self.name, lo, hi
                ));
            }
        }

        if let Some(default) = &self.default {
            validator::check_value(self, default.clone()).map_err(|rule| {
                format!("Field '{}': default {} is invalid: {}", self.name, default, rule)
            })?;
        }

        Ok(())
    }
}

/// Physical layout hint for the external writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    SingleLine,
    Vertices,
    CompactSchedule,
    FluidProperty,
    ViewFactor,
    Spectral,
}

/// Serialized shape of a schema table.
///
/// Deserialization goes through this so that the extensible flag on each
/// descriptor is derived from the list it appears in.
#[derive(Deserialize)]
struct SchemaTableRepr {
    name: String,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    memo: Option<String>,
    #[serde(default)]
    format: Option<RecordFormat>,
    #[serde(rename = "min-fields", default)]
    min_fields: usize,
    #[serde(rename = "unique-object", default)]
    unique_object: bool,
    #[serde(rename = "required-object", default)]
    required_object: bool,
    #[serde(default)]
    fields: Vec<FieldDescriptor>,
    #[serde(rename = "extensible-fields", default)]
    extensible_fields: Vec<FieldDescriptor>,
}

impl From<SchemaTableRepr> for SchemaTable {
    fn from(repr: SchemaTableRepr) -> Self {
        let mut table = SchemaTable::new(repr.name, repr.fields, repr.extensible_fields)
            .with_min_fields(repr.min_fields);
        table.group = repr.group;
        table.memo = repr.memo;
        table.format = repr.format;
        table.unique_object = repr.unique_object;
        table.required_object = repr.required_object;
        table
    }
}

/// Complete description of one object type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SchemaTableRepr")]
pub struct SchemaTable {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<RecordFormat>,
    #[serde(rename = "min-fields")]
    min_fields: usize,
    #[serde(rename = "unique-object")]
    unique_object: bool,
    #[serde(rename = "required-object")]
    required_object: bool,
    fields: Vec<FieldDescriptor>,
    #[serde(rename = "extensible-fields")]
    extensible_fields: Vec<FieldDescriptor>,
}

impl SchemaTable {
    /// Create a schema table from fixed and extensible descriptors
    pub fn new(
        name: impl Into<String>,
        fields: Vec<FieldDescriptor>,
        extensible_fields: Vec<FieldDescriptor>,
    ) -> Self {
        let fields = fields
            .into_iter()
            .map(|mut f| {
                f.extensible = false;
                f
            })
            .collect();
        let extensible_fields = extensible_fields
            .into_iter()
            .map(|mut f| {
                f.extensible = true;
                f
            })
            .collect();

        Self {
            name: name.into(),
            group: None,
            memo: None,
            format: None,
            min_fields: 0,
            unique_object: false,
            required_object: false,
            fields,
            extensible_fields,
        }
    }

    /// Number of leading fixed fields that must be populated
    pub fn with_min_fields(mut self, min_fields: usize) -> Self {
        self.min_fields = min_fields;
        self
    }

    /// At most one record of this type per collection
    pub fn singleton(mut self) -> Self {
        self.unique_object = true;
        self
    }

    /// A collection must contain one record of this type
    pub fn required_object(mut self) -> Self {
        self.required_object = true;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Object type name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }

    pub fn format(&self) -> Option<RecordFormat> {
        self.format
    }

    /// Minimum number of populated leading fixed fields
    pub fn min_fields(&self) -> usize {
        self.min_fields
    }

    pub fn is_singleton(&self) -> bool {
        self.unique_object
    }

    pub fn is_required_object(&self) -> bool {
        self.required_object
    }

    /// Fixed fields in declaration order
    pub fn fixed_fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// The repeating-group shape; empty if the object has none
    pub fn extensible_template(&self) -> &[FieldDescriptor] {
        &self.extensible_fields
    }

    /// Position of a fixed field
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.answers_to(name))
    }

    /// Looks up a fixed field by display name or accessor name.
    pub fn describe(&self, name: &str) -> RecordResult<&FieldDescriptor> {
        self.field_index(name)
            .map(|i| &self.fields[i])
            .ok_or_else(|| RecordError::unknown_field(&self.name, name))
    }

    /// Position of a field in the extensible template
    pub fn extensible_index(&self, name: &str) -> Option<usize> {
        self.extensible_fields.iter().position(|f| f.answers_to(name))
    }

    /// Validates the table itself (not a record)
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Schema table must have a name".into());
        }

        check_unique(&self.name, &self.fields, "field")?;
        check_unique(&self.name, &self.extensible_fields, "extensible field")?;

        if self.min_fields > self.fields.len() {
            return Err(format!(
                "'{}': min-fields {} exceeds {} declared fields",
                self.name,
                self.min_fields,
                self.fields.len()
            ));
        }

        for field in self.fields.iter().chain(&self.extensible_fields) {
            field.validate_structure()?;
        }

        Ok(())
    }
}

fn derive_accessor(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;

    for c in name.chars() {
        if c == '/' {
            if !out.is_empty() {
                out.push('_');
            }
            out.push_str("or");
            pending_sep = true;
        } else if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '_' {
            pending_sep = true;
        }
    }

    out
}

fn check_unique(object: &str, fields: &[FieldDescriptor], what: &str) -> Result<(), String> {
    for (i, field) in fields.iter().enumerate() {
        if fields[..i].iter().any(|f| f.collides_with(field)) {
            return Err(format!("'{}': duplicate {} '{}'", object, what, field.name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn branch() -> SchemaTable {
        SchemaTable::new(
            "Branch",
            vec![
                FieldDescriptor::alpha("Name").required(),
                FieldDescriptor::real("Maximum Flow Rate")
                    .with_default(0.0)
                    .minimum(0.0)
                    .autosizable()
                    .unit("m3/s"),
                FieldDescriptor::object_list("Pressure Drop Curve Name"),
            ],
            vec![
                FieldDescriptor::alpha("Component 1 Object Type").required(),
                FieldDescriptor::alpha("Component 1 Name").required(),
                FieldDescriptor::node("Component 1 Inlet Node Name").required(),
                FieldDescriptor::node("Component 1 Outlet Node Name").required(),
            ],
        )
        .with_group("Node")
    }

    #[test]
    fn test_schema_structure_valid() {
        assert!(branch().validate_structure().is_ok());
    }

    #[test]
    fn test_extensible_flag_follows_list() {
        let table = branch();
        assert!(table.fixed_fields().iter().all(|f| !f.extensible));
        assert_eq!(table.extensible_template().len(), 4);
        assert!(table.extensible_template().iter().all(|f| f.extensible));
    }

    #[test]
    fn test_describe_by_name_and_accessor() {
        let table = branch();
        assert_eq!(table.describe("Maximum Flow Rate").unwrap().kind, FieldKind::Real);
        assert_eq!(table.describe("maximum flow rate").unwrap().kind, FieldKind::Real);
        assert_eq!(table.describe("maximum_flow_rate").unwrap().name, "Maximum Flow Rate");
        assert_eq!(table.field_index("Pressure Drop Curve Name"), Some(2));
    }

    #[test]
    fn test_describe_unknown_field() {
        let err = branch().describe("Minimum Flow Rate").unwrap_err();
        assert_eq!(err.code(), "IDF_UNKNOWN_FIELD");
        assert!(err.to_string().contains("Minimum Flow Rate"));
    }

    #[test]
    fn test_describe_ignores_extensible_fields() {
        assert!(branch().describe("Component 1 Name").is_err());
        assert_eq!(branch().extensible_index("component_1_name"), Some(1));
    }

    #[test]
    fn test_accessor_name() {
        let field = FieldDescriptor::alpha("Node or NodeList Name 1");
        assert_eq!(field.accessor_name(), "node_or_nodelist_name_1");
        let field = FieldDescriptor::real("Coefficient of Induction Kin");
        assert_eq!(field.accessor_name(), "coefficient_of_induction_kin");
        let field = FieldDescriptor::real("Minimum Heat Pump Part-Load Ratio");
        assert_eq!(field.accessor_name(), "minimum_heat_pump_partload_ratio");
        let field = FieldDescriptor::alpha("Surface Name/Angle Factor List Name");
        assert_eq!(field.accessor_name(), "surface_name_or_angle_factor_list_name");
        let field = FieldDescriptor::real("  X-Direction Mesh Density Parameter ");
        assert_eq!(field.accessor_name(), "xdirection_mesh_density_parameter");
    }

    #[test]
    fn test_explicit_accessor_preferred() {
        let table = SchemaTable::new(
            "Coil:Cooling:DX",
            vec![FieldDescriptor::real("Minimum Heat Pump Part-Load Ratio").accessor("min_plr")],
            vec![],
        );
        assert_eq!(table.field_index("min_plr"), Some(0));
        assert_eq!(table.field_index("minimum heat pump part-load ratio"), Some(0));
        assert!(table.describe("minimum_heat_pump_partload_ratio").is_err());
    }

    #[test]
    fn test_pyname_read_from_schema_json() {
        let desc: FieldDescriptor = serde_json::from_value(json!({
            "name": "End-Use Subcategory",
            "pyname": "enduse_subcategory",
            "type": "alpha"
        }))
        .unwrap();
        assert_eq!(desc.accessor.as_deref(), Some("enduse_subcategory"));
        assert!(desc.answers_to("enduse_subcategory"));
    }

    #[test]
    fn test_colliding_accessor_names_rejected() {
        let table = SchemaTable::new(
            "Zone",
            vec![
                FieldDescriptor::alpha("Outlet Node"),
                FieldDescriptor::real("Outlet_Node"),
            ],
            vec![],
        );
        let err = table.validate_structure().unwrap_err();
        assert!(err.contains("Outlet_Node"));

        let table = SchemaTable::new(
            "Zone",
            vec![
                FieldDescriptor::alpha("Name"),
                FieldDescriptor::alpha("Zone Name").accessor("name"),
            ],
            vec![],
        );
        assert!(table.validate_structure().is_err());

        let table = SchemaTable::new(
            "Branch",
            vec![FieldDescriptor::alpha("Name")],
            vec![
                FieldDescriptor::alpha("Inlet/Outlet"),
                FieldDescriptor::alpha("Inlet or Outlet"),
            ],
        );
        let err = table.validate_structure().unwrap_err();
        assert!(err.contains("extensible field"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let table = SchemaTable::new(
            "Zone",
            vec![FieldDescriptor::alpha("Name"), FieldDescriptor::alpha("NAME")],
            vec![],
        );
        let err = table.validate_structure().unwrap_err();
        assert!(err.contains("duplicate"));
    }

    #[test]
    fn test_min_fields_bounded_by_field_count() {
        let table = SchemaTable::new("Zone", vec![FieldDescriptor::alpha("Name")], vec![])
            .with_min_fields(2);
        assert!(table.validate_structure().is_err());
    }

    #[test]
    fn test_sentinel_on_alpha_rejected() {
        let table = SchemaTable::new(
            "Zone",
            vec![FieldDescriptor::alpha("Name").autosizable()],
            vec![],
        );
        assert!(table.validate_structure().unwrap_err().contains("numeric"));
    }

    #[test]
    fn test_inconsistent_bounds_rejected() {
        let table = SchemaTable::new(
            "Pump",
            vec![FieldDescriptor::real("Fraction").minimum(1.0).maximum_exclusive(0.5)],
            vec![],
        );
        assert!(table.validate_structure().unwrap_err().contains("exceeds"));
    }

    #[test]
    fn test_invalid_default_rejected() {
        let table = SchemaTable::new(
            "SimulationControl",
            vec![FieldDescriptor::alpha("Do Zone Sizing Calculation")
                .choices(["Yes", "No"])
                .with_default("Maybe")],
            vec![],
        );
        assert!(table.validate_structure().unwrap_err().contains("default"));
    }

    #[test]
    fn test_deserialize_source_layout() {
        let table: SchemaTable = serde_json::from_value(json!({
            "name": "OutdoorAir:NodeList",
            "group": "Node",
            "min-fields": 1,
            "fields": [],
            "extensible-fields": [
                {"name": "Node or NodeList Name 1", "type": "node"}
            ]
        }))
        .unwrap();

        assert_eq!(table.name(), "OutdoorAir:NodeList");
        assert_eq!(table.group(), Some("Node"));
        assert_eq!(table.min_fields(), 1);
        assert!(table.extensible_template()[0].extensible);
        assert_eq!(table.extensible_template()[0].kind, FieldKind::Node);
    }

    #[test]
    fn test_deserialize_bounds_and_sentinels() {
        let table: SchemaTable = serde_json::from_value(json!({
            "name": "AirTerminal:SingleDuct:ConstantVolume:FourPipeBeam",
            "unique-object": false,
            "fields": [
                {"name": "Name", "type": "alpha", "required-field": true},
                {"name": "Coefficient of Induction Kin", "type": "real",
                 "default": "Autocalculate", "autocalculatable": true,
                 "minimum": 0.0, "maximum": 4.0},
                {"name": "Beam Length", "type": "real", "minimum>": 0.0, "unit": "m"},
                {"name": "Curve", "type": "external-list"}
            ]
        }))
        .unwrap();

        let kin = table.describe("Coefficient of Induction Kin").unwrap();
        assert_eq!(kin.default, Some(Value::Text("Autocalculate".into())));
        assert!(kin.autocalculatable);
        assert_eq!(kin.maximum, Some(4.0));
        assert_eq!(table.describe("Beam Length").unwrap().minimum_exclusive, Some(0.0));
        assert_eq!(table.describe("Curve").unwrap().kind, FieldKind::ObjectList);
        assert!(table.validate_structure().is_ok());
    }

    #[test]
    fn test_serialize_uses_source_keys() {
        let out = serde_json::to_value(branch().singleton()).unwrap();
        assert_eq!(out["unique-object"], true);
        assert_eq!(out["fields"][0]["required-field"], true);
        assert_eq!(out["fields"][1]["unit"], "m3/s");
        assert!(out["fields"][1].get("extensible").is_none());
        assert_eq!(out["extensible-fields"].as_array().unwrap().len(), 4);

        let back: SchemaTable = serde_json::from_value(out).unwrap();
        assert_eq!(back, branch().singleton());
    }
}
