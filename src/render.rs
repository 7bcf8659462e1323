use crate::model::{ObjectList, OutputFormat, PageBody, ServerTable};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

const COLUMN_GAP: &str = "   ";
const NONE_CELL: &str = "<none>";

/// Writes one page in the requested format. Server-printed tables and plain
/// object lists each get their own printer; the caller never branches on
/// which one the server answered with.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    format: OutputFormat,
    show_namespace: bool,
}

impl Renderer {
    pub fn new(format: OutputFormat, show_namespace: bool) -> Self {
        Self {
            format,
            show_namespace,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn render(&self, body: &PageBody, out: &mut dyn Write) -> io::Result<()> {
        match body {
            PageBody::Table(table) => self.render_server_table(table, out),
            PageBody::Objects(list) => self.render_objects(list, out),
        }
    }

    fn render_server_table(&self, table: &ServerTable, out: &mut dyn Write) -> io::Result<()> {
        if !self.format.is_tabular() {
            let document = serde_json::to_value(table).map_err(io::Error::other)?;
            return self.write_document(&document, out);
        }

        let visible = table
            .column_definitions
            .iter()
            .enumerate()
            .filter(|(_, column)| self.format == OutputFormat::Wide || column.priority == 0)
            .map(|(index, column)| (index, column.name.to_ascii_uppercase()))
            .collect::<Vec<_>>();

        let mut headers = Vec::with_capacity(visible.len() + 1);
        if self.show_namespace {
            headers.push("NAMESPACE".to_string());
        }
        headers.extend(visible.iter().map(|(_, name)| name.clone()));

        let rows = table
            .rows
            .iter()
            .map(|row| {
                let mut cells = Vec::with_capacity(headers.len());
                if self.show_namespace {
                    cells.push(row.namespace().unwrap_or("").to_string());
                }
                cells.extend(
                    visible
                        .iter()
                        .map(|(index, _)| cell_text(row.cells.get(*index))),
                );
                cells
            })
            .collect::<Vec<_>>();

        write_columns(&headers, &rows, out)
    }

    fn render_objects(&self, list: &ObjectList, out: &mut dyn Write) -> io::Result<()> {
        match self.format {
            OutputFormat::Table | OutputFormat::Wide => {
                let now = Utc::now();
                let mut headers = Vec::new();
                if self.show_namespace {
                    headers.push("NAMESPACE".to_string());
                }
                headers.push("NAME".to_string());
                headers.push("AGE".to_string());
                let wide = self.format == OutputFormat::Wide;
                if wide {
                    headers.push("LABELS".to_string());
                }

                let rows = list
                    .items
                    .iter()
                    .map(|item| {
                        let mut cells = Vec::with_capacity(headers.len());
                        if self.show_namespace {
                            cells.push(metadata_str(item, "namespace").to_string());
                        }
                        cells.push(metadata_str(item, "name").to_string());
                        cells.push(object_age(item, now));
                        if wide {
                            cells.push(object_labels(item));
                        }
                        cells
                    })
                    .collect::<Vec<_>>();
                write_columns(&headers, &rows, out)
            }
            OutputFormat::Json | OutputFormat::Yaml => {
                let document = json!({
                    "apiVersion": "v1",
                    "kind": "List",
                    "items": list.items,
                });
                self.write_document(&document, out)
            }
            OutputFormat::Name => {
                for item in &list.items {
                    writeln!(out, "{}", object_reference(item))?;
                }
                Ok(())
            }
        }
    }

    fn write_document(&self, document: &Value, out: &mut dyn Write) -> io::Result<()> {
        match self.format {
            OutputFormat::Yaml => {
                let text = serde_yaml::to_string(document).map_err(io::Error::other)?;
                out.write_all(text.as_bytes())
            }
            _ => {
                serde_json::to_writer_pretty(&mut *out, document).map_err(io::Error::other)?;
                writeln!(out)
            }
        }
    }
}

fn write_columns(headers: &[String], rows: &[Vec<String>], out: &mut dyn Write) -> io::Result<()> {
    let mut widths = headers.iter().map(|header| header.width()).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    for line in std::iter::once(headers).chain(rows.iter().map(Vec::as_slice)) {
        let mut text = String::new();
        for (index, (cell, width)) in line.iter().zip(&widths).enumerate() {
            if index > 0 {
                text.push_str(COLUMN_GAP);
            }
            text.push_str(cell);
            text.push_str(&" ".repeat(width.saturating_sub(cell.width())));
        }
        writeln!(out, "{}", text.trim_end())?;
    }
    Ok(())
}

fn cell_text(cell: Option<&Value>) -> String {
    match cell {
        None | Some(Value::Null) => NONE_CELL.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(other) => other.to_string(),
    }
}

fn metadata_str<'a>(item: &'a Value, field: &str) -> &'a str {
    item.get("metadata")
        .and_then(|metadata| metadata.get(field))
        .and_then(Value::as_str)
        .unwrap_or("")
}

/// `kind[.group]/name`, the way `-o name` prints references.
fn object_reference(item: &Value) -> String {
    let kind = item
        .get("kind")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_ascii_lowercase();
    let group = item
        .get("apiVersion")
        .and_then(Value::as_str)
        .and_then(|api_version| api_version.split_once('/'))
        .map(|(group, _)| group)
        .unwrap_or("");
    let name = metadata_str(item, "name");

    if group.is_empty() {
        format!("{kind}/{name}")
    } else {
        format!("{kind}.{group}/{name}")
    }
}

/// `key=value` pairs sorted by key, as `--show-labels` prints them.
fn object_labels(item: &Value) -> String {
    let Some(labels) = item
        .get("metadata")
        .and_then(|metadata| metadata.get("labels"))
        .and_then(Value::as_object)
        .filter(|labels| !labels.is_empty())
    else {
        return NONE_CELL.to_string();
    };

    let mut pairs = labels
        .iter()
        .map(|(key, value)| format!("{key}={}", value.as_str().unwrap_or_default()))
        .collect::<Vec<_>>();
    pairs.sort();
    pairs.join(",")
}

fn object_age(item: &Value, now: DateTime<Utc>) -> String {
    let created = metadata_str(item, "creationTimestamp");
    match DateTime::parse_from_rfc3339(created) {
        Ok(created) => {
            format_elapsed_seconds((now - created.with_timezone(&Utc)).num_seconds().max(0))
        }
        Err(_) => "<unknown>".to_string(),
    }
}

fn format_elapsed_seconds(seconds: i64) -> String {
    if seconds >= 86_400 {
        return format!("{}d", seconds / 86_400);
    }

    if seconds >= 3_600 {
        return format!("{}h", seconds / 3_600);
    }

    if seconds >= 60 {
        return format!("{}m", seconds / 60);
    }

    format!("{seconds}s")
}
