use crate::error::{FlattenError, FlattenResult};
use crate::progress::{NoProgress, ProgressObserver};
use crate::schema_flattener::constraints::KeyIndex;
use crate::schema_flattener::fields::{flag, integer, present, text};
use crate::types::{ColumnRecord, SchemaTable};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Top-level keys holding document metadata rather than objects
pub const RESERVED_KEYS: [&str; 2] = ["_metadata_info", "fk_reference_counts"];

/// Configuration for the flattening pass
#[derive(Debug, Clone)]
pub struct FlattenOptions {
    /// Top-level keys skipped during iteration
    pub reserved_keys: Vec<String>,
    /// Object type used when `object_type` is absent
    pub default_object_type: String,
    /// Placeholder for a missing referenced table or column
    pub missing_reference: String,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            reserved_keys: RESERVED_KEYS.iter().map(|key| key.to_string()).collect(),
            default_object_type: "Unknown".to_string(),
            missing_reference: "?".to_string(),
        }
    }
}

/// Turns a nested schema-description document into one row per column
#[derive(Debug, Clone, Default)]
pub struct SchemaFlattener {
    options: FlattenOptions,
}

/// Object-level fields shared by every row of one object
struct ObjectContext<'a> {
    name: &'a str,
    object_type: String,
    description: Option<String>,
    keys: KeyIndex,
}

impl SchemaFlattener {
    /// Create a flattener with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a flattener with custom options
    pub fn with_options(options: FlattenOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FlattenOptions {
        &self.options
    }

    /// Flatten `document` into a table, without progress reporting
    pub fn flatten(&self, document: Option<&Value>) -> FlattenResult<SchemaTable> {
        self.flatten_with_progress(document, &NoProgress)
    }

    /// Flatten `document`, notifying `progress` after every object.
    ///
    /// Malformed objects and columns are skipped with a warning. A
    /// `constraints` or `columns` field of the wrong shape fails the call
    /// with [`FlattenError::Structure`].
    pub fn flatten_with_progress(
        &self,
        document: Option<&Value>,
        progress: &dyn ProgressObserver,
    ) -> FlattenResult<SchemaTable> {
        let objects = match document {
            Some(Value::Object(objects)) if !objects.is_empty() => objects,
            Some(Value::Object(_)) => {
                warn!("Schema document is empty, nothing to flatten");
                return Ok(SchemaTable::new());
            }
            Some(Value::Null) | None => {
                warn!("No schema document provided, nothing to flatten");
                return Ok(SchemaTable::new());
            }
            Some(other) => {
                warn!(
                    kind = json_kind(other),
                    "Schema document is not an object, nothing to flatten"
                );
                return Ok(SchemaTable::new());
            }
        };

        let total = objects.keys().filter(|key| !self.is_reserved(key)).count();
        info!("Flattening {} schema objects", total);

        let mut rows = Vec::new();
        let mut processed = 0;

        for (object_name, object_value) in objects {
            if self.is_reserved(object_name) {
                continue;
            }

            self.flatten_object(object_name, object_value, &mut rows)?;

            processed += 1;
            progress.on_progress(processed, total);
        }

        if rows.is_empty() {
            warn!("No column rows were produced from {} objects", total);
            return Ok(SchemaTable::new());
        }

        info!("Flattened schema into {} column rows", rows.len());
        Ok(SchemaTable::from_rows(rows))
    }

    fn is_reserved(&self, key: &str) -> bool {
        self.options.reserved_keys.iter().any(|reserved| reserved == key)
    }

    /// Append the rows of one object to `rows`
    fn flatten_object(
        &self,
        object_name: &str,
        object_value: &Value,
        rows: &mut Vec<ColumnRecord>,
    ) -> FlattenResult<()> {
        let Some(object) = object_value.as_object() else {
            warn!(
                object = object_name,
                kind = json_kind(object_value),
                "Skipping object that is not a JSON object"
            );
            return Ok(());
        };

        let context = ObjectContext {
            name: object_name,
            object_type: present(object, "object_type")
                .and_then(text)
                .unwrap_or_else(|| self.options.default_object_type.clone()),
            description: present(object, "business_description").and_then(text),
            keys: KeyIndex::from_object(object_name, object, &self.options.missing_reference)?,
        };

        let columns = match present(object, "columns") {
            None => &[] as &[Value],
            Some(Value::Array(columns)) => columns.as_slice(),
            Some(_) => {
                return Err(FlattenError::structure(object_name, "'columns' must be an array"))
            }
        };

        if columns.is_empty() {
            debug!(object = object_name, "Object has no columns, skipping");
            return Ok(());
        }

        for (position, column_value) in columns.iter().enumerate() {
            let Some(column) = column_value.as_object() else {
                warn!(
                    object = object_name,
                    position = position,
                    "Skipping column that is not a JSON object"
                );
                continue;
            };

            match column_name(column) {
                Some(name) => rows.push(self.build_record(&context, name, column)),
                None => warn!(
                    object = object_name,
                    position = position,
                    "Skipping column without a name"
                ),
            }
        }

        Ok(())
    }

    fn build_record(
        &self,
        context: &ObjectContext<'_>,
        name: String,
        column: &Map<String, Value>,
    ) -> ColumnRecord {
        let foreign_key_reference = context.keys.foreign_key_reference(&name).map(str::to_string);

        ColumnRecord {
            object_name: context.name.to_string(),
            object_type: context.object_type.clone(),
            is_primary_key: context.keys.is_primary_key(&name),
            is_foreign_key: foreign_key_reference.is_some(),
            foreign_key_reference,
            column_type: present(column, "type").and_then(text),
            length: present(column, "length").and_then(|v| integer("length", v)),
            precision: present(column, "precision").and_then(|v| integer("precision", v)),
            scale: present(column, "scale").and_then(|v| integer("scale", v)),
            nullable: present(column, "nullable").and_then(|v| flag("nullable", v)),
            object_description: context.description.clone(),
            column_description: present(column, "business_description").and_then(text),
            mapping_notes: present(column, "value_mapping_notes").and_then(text),
            column_name: name,
        }
    }
}

/// Column name, or `None` when missing or empty
fn column_name(column: &Map<String, Value>) -> Option<String> {
    present(column, "name")
        .and_then(text)
        .filter(|name| !name.is_empty())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
