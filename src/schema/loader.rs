//! Schema loader for reading schema tables from disk at startup
//!
//! - Every `*.json` file in the schema directory holds one table or an
//!   array of tables
//! - Object names are matched case-insensitively
//! - Malformed files abort loading (FATAL)

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use super::errors::{SchemaError, SchemaResult};
use super::types::SchemaTable;
use crate::observability::{Event, Logger};
use crate::record::Record;

/// Contents of one schema file
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaFile {
    One(SchemaTable),
    Many(Vec<SchemaTable>),
}

/// Registry of schema tables, optionally backed by a directory.
#[derive(Debug)]
pub struct SchemaLoader {
    /// Directory containing schema files
    schema_dir: PathBuf,
    /// Tables indexed by lowercased object name
    schemas: BTreeMap<String, Arc<SchemaTable>>,
}

impl SchemaLoader {
    /// Creates a loader for the given schema directory.
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: BTreeMap::new(),
        }
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads all schema files from the schema directory.
    ///
    /// A missing directory is created and yields no tables. Files are read
    /// in name order so duplicate detection is deterministic.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        let dir = self.schema_dir.clone();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(fs_failure(&dir, "create schema directory"))?;
            return Ok(());
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir).map_err(fs_failure(&dir, "read schema directory"))? {
            let path = entry.map_err(fs_failure(&dir, "read directory entry"))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            self.load_schema_file(path)?;
        }

        let count = self.schemas.len().to_string();
        let files = paths.len().to_string();
        let shown = dir.display().to_string();
        Logger::info(
            Event::SchemasLoaded.as_str(),
            &[("count", &count), ("dir", &shown), ("files", &files)],
        );

        Ok(())
    }

    /// Loads a single schema file.
    fn load_schema_file(&mut self, path: &Path) -> SchemaResult<()> {
        for table in Self::read_schema_file(path)? {
            self.insert(table)?;
        }
        Ok(())
    }

    /// Reads and structurally validates the tables in one file without
    /// registering them.
    pub fn read_schema_file(path: &Path) -> SchemaResult<Vec<SchemaTable>> {
        let content = fs::read_to_string(path).map_err(fs_failure(path, "read file"))?;

        let tables = match serde_json::from_str(&content) {
            Ok(SchemaFile::One(table)) => vec![table],
            Ok(SchemaFile::Many(tables)) => tables,
            Err(e) => {
                return Err(SchemaError::malformed_schema(
                    path.display().to_string(),
                    format!("Invalid schema JSON: {}", e),
                ))
            }
        };

        for table in &tables {
            table
                .validate_structure()
                .map_err(|e| SchemaError::malformed_schema(path.display().to_string(), e))?;
        }

        Ok(tables)
    }

    /// Registers a schema table directly.
    pub fn register(&mut self, table: SchemaTable) -> SchemaResult<Arc<SchemaTable>> {
        table
            .validate_structure()
            .map_err(|e| SchemaError::malformed_schema("<in-memory>", e))?;
        self.insert(table)
    }

    fn insert(&mut self, table: SchemaTable) -> SchemaResult<Arc<SchemaTable>> {
        let key = table.name().to_ascii_lowercase();
        if self.schemas.contains_key(&key) {
            return Err(SchemaError::duplicate_object(table.name()));
        }

        let table = Arc::new(table);
        self.schemas.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Gets a table by object name.
    pub fn get(&self, object: &str) -> Option<Arc<SchemaTable>> {
        self.schemas.get(&object.to_ascii_lowercase()).cloned()
    }

    /// Gets a table by object name, failing if absent.
    pub fn require(&self, object: &str) -> SchemaResult<Arc<SchemaTable>> {
        self.get(object)
            .ok_or_else(|| SchemaError::unknown_object(object))
    }

    pub fn exists(&self, object: &str) -> bool {
        self.schemas.contains_key(&object.to_ascii_lowercase())
    }

    /// Registered object names in sorted order.
    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.values().map(|t| t.name())
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Creates an empty record bound to the named table.
    pub fn new_record(&self, object: &str) -> SchemaResult<Record> {
        self.require(object).map(Record::new)
    }

    /// File a table named `object` is saved to.
    ///
    /// Characters outside `[A-Za-z0-9_-]` in the object name become `_`.
    pub fn schema_file_path(&self, object: &str) -> PathBuf {
        let stem: String = object
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.schema_dir.join(format!("{}.json", stem))
    }

    /// Writes a table to `<schema_dir>/<object>.json`.
    pub fn save_schema(&self, table: &SchemaTable) -> SchemaResult<PathBuf> {
        let path = self.schema_file_path(table.name());

        if path.exists() {
            return Err(SchemaError::duplicate_object(table.name()));
        }

        fs::create_dir_all(&self.schema_dir)
            .map_err(fs_failure(&self.schema_dir, "create schema directory"))?;

        let content = serde_json::to_string_pretty(table).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to serialize schema: {}", e),
            )
        })?;
        fs::write(&path, content).map_err(fs_failure(&path, "write file"))?;

        Ok(path)
    }
}

/// Maps an I/O failure on `path` to a malformed-schema error.
fn fs_failure<'a>(
    path: &'a Path,
    action: &'a str,
) -> impl FnOnce(io::Error) -> SchemaError + 'a {
    move |e| {
        SchemaError::malformed_schema(
            path.display().to_string(),
            format!("Failed to {}: {}", action, e),
        )
    }
}
