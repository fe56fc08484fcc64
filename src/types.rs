use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One flattened row: a single column of a table or view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColumnRecord {
    /// Name of the owning table or view
    pub object_name: String,
    /// Object kind, e.g. TABLE or VIEW
    pub object_type: String,
    /// Column name
    pub column_name: String,
    /// Declared database type
    pub column_type: Option<String>,
    /// Character or byte length
    pub length: Option<i64>,
    /// Numeric precision
    pub precision: Option<i64>,
    /// Numeric scale
    pub scale: Option<i64>,
    /// Whether the column accepts NULL
    pub nullable: Option<bool>,
    /// Column is a member of any primary key group
    pub is_primary_key: bool,
    /// Column is a local column of a foreign key
    pub is_foreign_key: bool,
    /// Referenced `table.column` for foreign key columns
    pub foreign_key_reference: Option<String>,
    /// Business description of the owning object
    pub object_description: Option<String>,
    /// Business description of the column
    pub column_description: Option<String>,
    /// Notes about coded values held by the column
    pub mapping_notes: Option<String>,
}

/// Flat table of column records, in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaTable {
    rows: Vec<ColumnRecord>,
}

impl SchemaTable {
    /// Output field names, in row order
    pub const HEADERS: [&'static str; 14] = [
        "ObjectName",
        "ObjectType",
        "ColumnName",
        "ColumnType",
        "Length",
        "Precision",
        "Scale",
        "Nullable",
        "IsPrimaryKey",
        "IsForeignKey",
        "ForeignKeyReference",
        "ObjectDescription",
        "ColumnDescription",
        "MappingNotes",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<ColumnRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ColumnRecord] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnRecord> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<ColumnRecord> {
        self.rows
    }

    /// Rows whose object type matches `object_type`, ignoring case
    pub fn filter_object_type(&self, object_type: &str) -> SchemaTable {
        self.filtered(|row| row.object_type.eq_ignore_ascii_case(object_type))
    }

    /// Rows belonging to the object named exactly `object_name`
    pub fn filter_object(&self, object_name: &str) -> SchemaTable {
        self.filtered(|row| row.object_name == object_name)
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnRecord> {
        self.rows.iter().filter(|row| row.is_primary_key)
    }

    pub fn foreign_key_columns(&self) -> impl Iterator<Item = &ColumnRecord> {
        self.rows.iter().filter(|row| row.is_foreign_key)
    }

    /// Aggregate counts over the table
    pub fn summary(&self) -> TableSummary {
        let mut seen_objects = HashSet::new();
        let mut object_types: BTreeMap<String, usize> = BTreeMap::new();

        for row in &self.rows {
            if seen_objects.insert(row.object_name.as_str()) {
                *object_types.entry(row.object_type.clone()).or_insert(0) += 1;
            }
        }

        TableSummary {
            row_count: self.rows.len(),
            object_count: seen_objects.len(),
            object_types,
            primary_key_columns: self.primary_key_columns().count(),
            foreign_key_columns: self.foreign_key_columns().count(),
            nullable_columns: self.rows.iter().filter(|row| row.nullable == Some(true)).count(),
        }
    }

    fn filtered<F>(&self, predicate: F) -> SchemaTable
    where
        F: Fn(&ColumnRecord) -> bool,
    {
        SchemaTable {
            rows: self.rows.iter().filter(|&row| predicate(row)).cloned().collect(),
        }
    }
}

impl IntoIterator for SchemaTable {
    type Item = ColumnRecord;
    type IntoIter = std::vec::IntoIter<ColumnRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a SchemaTable {
    type Item = &'a ColumnRecord;
    type IntoIter = std::slice::Iter<'a, ColumnRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Aggregate statistics over a flattened table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    /// Total flattened rows
    pub row_count: usize,
    /// Distinct objects contributing rows
    pub object_count: usize,
    /// Object count per object type
    pub object_types: BTreeMap<String, usize>,
    /// Rows flagged as primary key members
    pub primary_key_columns: usize,
    /// Rows flagged as foreign key columns
    pub foreign_key_columns: usize,
    /// Rows explicitly marked nullable
    pub nullable_columns: usize,
}

impl TableSummary {
    /// Human readable multi-line report
    pub fn to_report(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Objects: {}\n", self.object_count));
        for (object_type, count) in &self.object_types {
            output.push_str(&format!("  {}: {}\n", object_type, count));
        }
        output.push_str(&format!("Columns: {}\n", self.row_count));
        output.push_str(&format!("  Primary key columns: {}\n", self.primary_key_columns));
        output.push_str(&format!("  Foreign key columns: {}\n", self.foreign_key_columns));
        output.push_str(&format!("  Nullable columns: {}\n", self.nullable_columns));
        output
    }
}
