use super::LayoutError;
use crate::catalog::{CatalogError, Column, ForeignKeyRelation, Schema, Table, TableKind};

const CREATE_TABLE: &str = "CREATE TABLE";
const CREATE_SCHEMA: &str = "CREATE SCHEMA";

/// One table as read from layout text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub name: String,
    pub pk_name: Option<String>,
    /// Columns in textual order, with key flags applied.
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKeyRelation>,
}

/// One schema as read from layout text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedSchema {
    pub name: String,
    pub tables: Vec<ParsedTable>,
}

impl ParsedSchema {
    pub fn table(&self, name: &str) -> Option<&ParsedTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Schema -> table -> definition, in textual order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedLayout {
    pub schemas: Vec<ParsedSchema>,
}

impl ParsedLayout {
    pub fn schema(&self, name: &str) -> Option<&ParsedSchema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    /// Build catalog entities. Every parsed table is a base table.
    pub fn into_schemas(self) -> Result<Vec<Schema>, CatalogError> {
        self.schemas
            .into_iter()
            .map(|schema| {
                let tables = schema
                    .tables
                    .into_iter()
                    .map(|t| Table::new(t.name, TableKind::Table, t.pk_name, t.columns, t.foreign_keys))
                    .collect::<Result<Vec<_>, _>>()?;
                Schema::new(schema.name, tables)
            })
            .collect()
    }
}

/// Parse layout text.
///
/// `default_schema` is used for foreign key references and table headers
/// that carry no schema qualifier.
pub fn parse_layout(text: &str, default_schema: Option<&str>) -> Result<ParsedLayout, LayoutError> {
    let starts: Vec<usize> = text.match_indices(CREATE_TABLE).map(|(i, _)| i).collect();
    let preamble_end = starts.first().copied().unwrap_or(text.len());

    let mut layout = ParsedLayout::default();
    parse_schema_declarations(&text[..preamble_end], &mut layout)?;

    for (n, &start) in starts.iter().enumerate() {
        let end = starts.get(n + 1).copied().unwrap_or(text.len());
        let chunk = &text[start + CREATE_TABLE.len()..end];
        parse_table(chunk, line_at(text, start), default_schema, &mut layout)?;
    }

    tracing::debug!(
        schemas = layout.schemas.len(),
        tables = layout.schemas.iter().map(|s| s.tables.len()).sum::<usize>(),
        "Parsed layout"
    );
    Ok(layout)
}

fn line_at(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

fn parse_schema_declarations(preamble: &str, layout: &mut ParsedLayout) -> Result<(), LayoutError> {
    let starts: Vec<usize> = preamble.match_indices(CREATE_SCHEMA).map(|(i, _)| i).collect();
    for (n, &start) in starts.iter().enumerate() {
        let end = starts.get(n + 1).copied().unwrap_or(preamble.len());
        let chunk = &preamble[start + CREATE_SCHEMA.len()..end];
        let line = line_at(preamble, start);

        let terminator = chunk
            .find(';')
            .ok_or(LayoutError::MissingSchemaTerminator { line })?;
        let name = chunk[..terminator].trim();
        if name.is_empty() {
            return Err(LayoutError::EmptySchemaName { line });
        }
        layout.schemas.push(ParsedSchema {
            name: name.to_string(),
            tables: Vec::new(),
        });
    }
    Ok(())
}

fn parse_table(
    chunk: &str,
    first_line: usize,
    default_schema: Option<&str>,
    layout: &mut ParsedLayout,
) -> Result<(), LayoutError> {
    let mut lines = chunk.lines();
    let header = lines.next().unwrap_or_default().trim();
    let malformed_header = || LayoutError::MalformedTableHeader {
        line: first_line,
        header: format!("{CREATE_TABLE} {header}"),
    };

    let qualified = header.strip_suffix('(').ok_or_else(malformed_header)?;
    let (schema_name, table_name, implicit) = match qualified.split_once('.') {
        Some((schema, table)) => (schema, table, false),
        None => (default_schema.ok_or_else(malformed_header)?, qualified, true),
    };
    if schema_name.is_empty() || table_name.is_empty() {
        return Err(malformed_header());
    }

    let mut table = ParsedTable {
        name: table_name.to_string(),
        pk_name: None,
        columns: Vec::new(),
        foreign_keys: Vec::new(),
    };

    for (offset, raw) in lines.enumerate() {
        let line = first_line + 1 + offset;
        let text = raw.trim_end_matches('\r');
        if text.trim().is_empty() || text.trim() == ")" {
            continue;
        }
        let text = text.strip_suffix(',').unwrap_or(text);

        if let Some(rest) = text.strip_prefix("PRIMARY KEY ") {
            for name in key_list(rest, line)? {
                mark_column(&mut table, name, line, Column::mark_pk)?;
            }
        } else if let Some(rest) = text.strip_prefix("CONSTRAINT ") {
            let (pk_name, keys) = rest.split_once(" PRIMARY KEY ").ok_or_else(|| {
                LayoutError::MalformedKey {
                    line,
                    reason: "expected 'CONSTRAINT <name> PRIMARY KEY (<columns>)'".to_string(),
                }
            })?;
            if pk_name.trim().is_empty() {
                return Err(LayoutError::MalformedKey {
                    line,
                    reason: "constraint name is empty".to_string(),
                });
            }
            table.pk_name = Some(pk_name.trim().to_string());
            for name in key_list(keys, line)? {
                mark_column(&mut table, name, line, Column::mark_pk)?;
            }
        } else if text.starts_with("FOREIGN KEY ") {
            let fk = parse_foreign_key(text, line, default_schema)?;
            for name in fk.constrained_columns() {
                mark_column(&mut table, name, line, Column::mark_fk)?;
            }
            table.foreign_keys.push(fk);
        } else {
            table.columns.push(parse_column(text, line)?);
        }
    }

    let schema = match layout.schemas.iter_mut().position(|s| s.name == schema_name) {
        Some(index) => &mut layout.schemas[index],
        None if implicit => {
            layout.schemas.push(ParsedSchema {
                name: schema_name.to_string(),
                tables: Vec::new(),
            });
            layout
                .schemas
                .last_mut()
                .ok_or_else(malformed_header)?
        }
        None => {
            return Err(LayoutError::UndeclaredSchema {
                line: first_line,
                schema: schema_name.to_string(),
                table: table_name.to_string(),
            });
        }
    };
    schema.tables.push(table);
    Ok(())
}

/// `(a,b)` -> `["a", "b"]`.
fn key_list(text: &str, line: usize) -> Result<Vec<&str>, LayoutError> {
    text.trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .map(|inner| inner.split(',').collect())
        .ok_or_else(|| LayoutError::MalformedKey {
            line,
            reason: format!("expected a parenthesized column list, found '{text}'"),
        })
}

fn mark_column(
    table: &mut ParsedTable,
    name: &str,
    line: usize,
    mark: fn(&mut Column),
) -> Result<(), LayoutError> {
    let column = table
        .columns
        .iter_mut()
        .find(|c| c.name() == name)
        .ok_or_else(|| LayoutError::UnknownColumn {
            line,
            table: table.name.clone(),
            column: name.to_string(),
        })?;
    mark(column);
    Ok(())
}

fn parse_foreign_key(
    text: &str,
    line: usize,
    default_schema: Option<&str>,
) -> Result<ForeignKeyRelation, LayoutError> {
    let malformed = |reason: &str| LayoutError::MalformedForeignKey {
        line,
        reason: reason.to_string(),
    };

    let (local, referred) = text
        .split_once(" REFERENCES ")
        .ok_or_else(|| malformed("missing REFERENCES"))?;
    let local = local
        .strip_prefix("FOREIGN KEY (")
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| malformed("expected 'FOREIGN KEY (<columns>)'"))?;
    let (target, referred_columns) = referred
        .split_once('(')
        .ok_or_else(|| malformed("missing referred column list"))?;
    let referred_columns = referred_columns
        .strip_suffix(')')
        .ok_or_else(|| malformed("unterminated referred column list"))?;

    let (schema, table) = match target.split_once('.') {
        Some(parts) => parts,
        None => (
            default_schema.ok_or_else(|| {
                malformed("referred table has no schema and no default schema was given")
            })?,
            target,
        ),
    };

    ForeignKeyRelation::new(
        local.split(','),
        schema,
        table,
        referred_columns.split(','),
    )
    .map_err(|e| LayoutError::MalformedForeignKey {
        line,
        reason: e.to_string(),
    })
}

fn parse_column(text: &str, line: usize) -> Result<Column, LayoutError> {
    let (name, tail) = text
        .split_once(' ')
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| LayoutError::MalformedColumn {
            line,
            definition: text.to_string(),
        })?;

    let values = tail
        .strip_prefix("ENUM(")
        .and_then(|s| s.strip_suffix(')'))
        .and_then(enum_values);

    Ok(match values {
        Some(values) => Column::new(name, "").with_enum_values(values),
        None => Column::new(name, tail),
    })
}

/// `"a","b"` -> `["a", "b"]`. Anything else, such as a reflected
/// `ENUM('a','b')` type string, is not an enum literal list.
fn enum_values(inner: &str) -> Option<Vec<String>> {
    if inner.is_empty() {
        return Some(Vec::new());
    }
    let inner = inner.strip_prefix('"')?.strip_suffix('"')?;
    let values: Vec<String> = inner.split("\",\"").map(str::to_string).collect();
    if values.iter().any(|value| value.contains('"')) {
        return None;
    }
    Some(values)
}
