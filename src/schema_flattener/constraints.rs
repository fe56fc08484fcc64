use crate::error::{FlattenError, FlattenResult};
use crate::schema_flattener::fields::present;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Key membership derived from an object's `constraints` block
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    /// Union of every primary key group's columns
    primary_keys: HashSet<String>,
    /// Local column name to `table.column` reference
    foreign_keys: HashMap<String, String>,
}

impl KeyIndex {
    /// Build the key index for one object.
    ///
    /// A missing or null `constraints` block yields an empty index. A block
    /// that is present but not shaped as expected is a structural error.
    pub fn from_object(
        object_name: &str,
        object: &Map<String, Value>,
        missing_reference: &str,
    ) -> FlattenResult<Self> {
        let mut index = KeyIndex::default();

        let constraints = match present(object, "constraints") {
            None => return Ok(index),
            Some(Value::Object(constraints)) => constraints,
            Some(_) => {
                return Err(FlattenError::structure(
                    object_name,
                    "'constraints' must be an object",
                ))
            }
        };

        for group in array_field(object_name, constraints, "primary_key", "constraints")? {
            let group = group.as_object().ok_or_else(|| {
                FlattenError::structure(object_name, "primary key groups must be objects")
            })?;
            for column in string_list(object_name, group, "columns", "primary key group")? {
                index.primary_keys.insert(column.to_string());
            }
        }

        for fk in array_field(object_name, constraints, "foreign_keys", "constraints")? {
            let fk = fk.as_object().ok_or_else(|| {
                FlattenError::structure(object_name, "foreign key entries must be objects")
            })?;

            let local_columns = string_list(object_name, fk, "columns", "foreign key")?;
            let referenced_columns =
                string_list(object_name, fk, "references_columns", "foreign key")?;
            let referenced_table = match present(fk, "references_table") {
                Some(Value::String(table)) => table.as_str(),
                Some(_) => {
                    return Err(FlattenError::structure(
                        object_name,
                        "foreign key 'references_table' must be a string",
                    ))
                }
                None => missing_reference,
            };

            for (position, local) in local_columns.iter().enumerate() {
                let referenced = referenced_columns
                    .get(position)
                    .copied()
                    .unwrap_or(missing_reference);
                // A column in several foreign keys keeps the last reference
                index
                    .foreign_keys
                    .insert(local.to_string(), format!("{}.{}", referenced_table, referenced));
            }
        }

        debug!(
            object = object_name,
            primary_keys = index.primary_keys.len(),
            foreign_keys = index.foreign_keys.len(),
            "Resolved key membership"
        );

        Ok(index)
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_keys.contains(column)
    }

    pub fn foreign_key_reference(&self, column: &str) -> Option<&str> {
        self.foreign_keys.get(column).map(String::as_str)
    }
}

/// Array under `key`, empty when absent, error when not an array
fn array_field<'a>(
    object_name: &str,
    map: &'a Map<String, Value>,
    key: &str,
    owner: &str,
) -> FlattenResult<&'a [Value]> {
    match present(map, key) {
        None => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(FlattenError::structure(
            object_name,
            format!("{} '{}' must be an array", owner, key),
        )),
    }
}

/// List of strings under `key`, empty when absent
fn string_list<'a>(
    object_name: &str,
    map: &'a Map<String, Value>,
    key: &str,
    owner: &str,
) -> FlattenResult<Vec<&'a str>> {
    array_field(object_name, map, key, owner)?
        .iter()
        .map(|item| {
            item.as_str().ok_or_else(|| {
                FlattenError::structure(
                    object_name,
                    format!("{} '{}' must contain only strings", owner, key),
                )
            })
        })
        .collect()
}
