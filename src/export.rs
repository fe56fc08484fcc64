// Rendering of flattened tables for display and export
use crate::error::{FlattenError, FlattenResult};
use crate::types::{ColumnRecord, SchemaTable};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Column-aligned plain text
    Text,
    /// Comma separated values with a header row
    Csv,
    /// Pretty printed JSON array
    Json,
}

impl FromStr for ExportFormat {
    type Err = FlattenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(FlattenError::export(format!("unknown export format '{}'", other))),
        }
    }
}

impl ExportFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

/// Render `table` in the given format
pub fn render(table: &SchemaTable, format: ExportFormat) -> FlattenResult<String> {
    match format {
        ExportFormat::Text => Ok(render_text(table)),
        ExportFormat::Csv => Ok(render_csv(table)),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(table)?),
    }
}

/// Render `table` and write it to `path`
pub fn write_table(table: &SchemaTable, format: ExportFormat, path: &Path) -> FlattenResult<()> {
    let output = render(table, format)?;
    std::fs::write(path, output)?;
    info!("Wrote {} rows as {:?} to {:?}", table.len(), format, path);
    Ok(())
}

/// Cell values of one row, in header order
fn cells(row: &ColumnRecord) -> [String; 14] {
    fn opt<T: ToString>(value: &Option<T>) -> String {
        value.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    [
        row.object_name.clone(),
        row.object_type.clone(),
        row.column_name.clone(),
        opt(&row.column_type),
        opt(&row.length),
        opt(&row.precision),
        opt(&row.scale),
        opt(&row.nullable),
        row.is_primary_key.to_string(),
        row.is_foreign_key.to_string(),
        opt(&row.foreign_key_reference),
        opt(&row.object_description),
        opt(&row.column_description),
        opt(&row.mapping_notes),
    ]
}

fn render_text(table: &SchemaTable) -> String {
    let rows: Vec<Vec<String>> = table
        .iter()
        .map(|row| cells(row).iter().map(|cell| escape_line_breaks(cell)).collect())
        .collect();

    let mut widths: Vec<usize> = SchemaTable::HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    push_text_line(&mut output, SchemaTable::HEADERS.iter().copied(), &widths);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_text_line(&mut output, separator.iter().map(String::as_str), &widths);
    for row in &rows {
        push_text_line(&mut output, row.iter().map(String::as_str), &widths);
    }
    output
}

/// Keep one physical line per row
fn escape_line_breaks(cell: &str) -> String {
    cell.replace('\r', "\\r").replace('\n', "\\n")
}

fn push_text_line<'a>(output: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let last = widths.len().saturating_sub(1);
    let line: Vec<String> = cells
        .zip(widths)
        .enumerate()
        .map(|(position, (cell, width))| {
            // The last column is not padded so cell text is kept as-is
            if position == last {
                cell.to_string()
            } else {
                format!("{:<width$}", cell, width = *width)
            }
        })
        .collect();
    output.push_str(&line.join(" | "));
    output.push('\n');
}

fn render_csv(table: &SchemaTable) -> String {
    let mut output = String::new();
    let header: Vec<String> = SchemaTable::HEADERS.iter().map(|h| csv_field(h)).collect();
    output.push_str(&header.join(","));
    output.push('\n');

    for row in table {
        let fields: Vec<String> = cells(row).iter().map(|cell| csv_field(cell)).collect();
        output.push_str(&fields.join(","));
        output.push('\n');
    }
    output
}

/// Quote a CSV field when it holds a delimiter, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn create_test_table() -> SchemaTable {
        SchemaTable::from_rows(vec![
            ColumnRecord {
                object_name: "ORDERS".to_string(),
                object_type: "TABLE".to_string(),
                column_name: "ID".to_string(),
                column_type: Some("NUMBER".to_string()),
                length: None,
                precision: Some(10),
                scale: Some(0),
                nullable: Some(false),
                is_primary_key: true,
                is_foreign_key: false,
                foreign_key_reference: None,
                object_description: Some("Customer orders".to_string()),
                column_description: None,
                mapping_notes: None,
            },
            ColumnRecord {
                object_name: "ORDERS".to_string(),
                object_type: "TABLE".to_string(),
                column_name: "STATUS".to_string(),
                column_type: Some("CHAR".to_string()),
                length: Some(1),
                precision: None,
                scale: None,
                nullable: Some(true),
                is_primary_key: false,
                is_foreign_key: false,
                foreign_key_reference: None,
                object_description: Some("Customer orders".to_string()),
                column_description: Some("Order \"state\"".to_string()),
                mapping_notes: Some("O=open, C=closed".to_string()),
            },
        ])
    }

    #[test]
    fn test_csv_header_and_quoting() {
        let csv = render(&create_test_table(), ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], SchemaTable::HEADERS.join(","));
        assert_eq!(
            lines[1],
            "ORDERS,TABLE,ID,NUMBER,,10,0,false,true,false,,Customer orders,,"
        );
        assert_eq!(
            lines[2],
            "ORDERS,TABLE,STATUS,CHAR,1,,,true,false,false,,Customer orders,\"Order \"\"state\"\"\",\"O=open, C=closed\""
        );
    }

    #[test]
    fn test_csv_field_line_breaks() {
        assert_eq!(csv_field("a\nb"), "\"a\nb\"");
        assert_eq!(csv_field("plain"), "plain");
    }

    #[test]
    fn test_text_columns_are_aligned() {
        let text = render(&create_test_table(), ExportFormat::Text).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ObjectName | ObjectType | ColumnName | ColumnType"));
        assert!(lines[1].starts_with("---------- | ----------"));
        // Cells share the header's column offsets
        let offset = lines[0].find("ColumnName").unwrap();
        assert_eq!(&lines[2][offset..offset + 2], "ID");
        assert_eq!(&lines[3][offset..offset + 6], "STATUS");
    }

    #[test]
    fn test_text_keeps_multi_line_cells_on_one_row() {
        let mut table = create_test_table().into_rows();
        table[0].mapping_notes = Some("1=yes\r\n2=no".to_string());
        table[1].mapping_notes = Some("trailing  ".to_string());
        let table = SchemaTable::from_rows(table);

        let text = render(&table, ExportFormat::Text).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2 + table.len());
        assert!(lines[2].ends_with("1=yes\\r\\n2=no"));
        assert!(lines[3].ends_with("trailing  "));
        assert!(!text.contains("\n2=no"));
    }

    #[test]
    fn test_json_uses_pascal_case_keys() {
        let json = render(&create_test_table(), ExportFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let rows = value.as_array().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["ObjectName"], "ORDERS");
        assert_eq!(rows[0]["IsPrimaryKey"], true);
        assert_eq!(rows[0]["Length"], Value::Null);
        assert_eq!(rows[1]["MappingNotes"], "O=open, C=closed");
    }

    #[test]
    fn test_empty_table_rendering() {
        let table = SchemaTable::new();
        assert_eq!(render(&table, ExportFormat::Json).unwrap(), "[]");
        assert_eq!(render(&table, ExportFormat::Csv).unwrap().lines().count(), 1);
        assert_eq!(render(&table, ExportFormat::Text).unwrap().lines().count(), 2);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert!("xlsx".parse::<ExportFormat>().is_err());
        assert_eq!(
            ExportFormat::from_path(Path::new("out/schema.json")),
            Some(ExportFormat::Json)
        );
        assert_eq!(ExportFormat::from_path(Path::new("schema")), None);
    }

    #[test]
    fn test_write_table_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.csv");

        write_table(&create_test_table(), ExportFormat::Csv, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("ObjectName,ObjectType"));
        assert_eq!(written.lines().count(), 3);
    }

    #[test]
    fn test_write_table_to_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("schema.csv");

        let err = write_table(&create_test_table(), ExportFormat::Csv, &path).unwrap_err();
        assert!(matches!(err, FlattenError::Io(_)));
    }
}
