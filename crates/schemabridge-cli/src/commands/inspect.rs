//! `schemabridge inspect` command implementation.
//!
//! With no entity, lists every schema and table (hidden ones marked). With
//! `--entity`, describes one table. With `--map`, prints the translation map.

use anyhow::Result;
use schemabridge_core::{Database, Schema, Table, TableKind};
use std::path::Path;

pub fn run(config_path: &Path, entity: Option<&str>, map: bool) -> Result<()> {
    let session = super::open_session(config_path)?;
    let database = session.database();

    if map {
        let map = database.translation_map();
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    match entity {
        Some(entity) => {
            let (schema, table) = find_table(database, entity)?;
            print_table(schema, table);
        }
        None => print_catalog(database),
    }
    Ok(())
}

/// Resolve `table` or `schema.table` by original name.
///
/// A dotted entity is first tried as `schema.table`, then as a table name
/// containing a dot.
fn find_table<'a>(database: &'a Database, entity: &str) -> Result<(&'a Schema, &'a Table)> {
    if let Some((schema_name, table_name)) = entity.split_once('.') {
        let qualified = database
            .schema(schema_name)
            .and_then(|schema| schema.table(table_name).map(|table| (schema, table)));
        if let Some(found) = qualified {
            return Ok(found);
        }
    }

    let matches: Vec<(&Schema, &Table)> = database
        .all_schemas()
        .iter()
        .filter_map(|schema| schema.table(entity).map(|table| (schema, table)))
        .collect();

    match matches.as_slice() {
        [found] => Ok(*found),
        [] => anyhow::bail!("No table named '{entity}'"),
        _ => {
            let schemas: Vec<&str> = matches.iter().map(|(s, _)| s.name()).collect();
            anyhow::bail!(
                "Table '{entity}' exists in several schemas ({}); use schema.table",
                schemas.join(", ")
            )
        }
    }
}

fn print_catalog(database: &Database) {
    println!("Database: {} ({})", database.name(), database.proper_name());

    let hidden_schemas = database.excluded_schema_names();
    for schema in database.all_schemas() {
        let marker = if hidden_schemas.iter().any(|n| n == schema.name()) {
            " [hidden]"
        } else {
            ""
        };
        println!("\n{} -> {}{marker}", schema.name(), schema.proper_name());

        let hidden_tables = schema.excluded_table_names();
        for table in schema.all_tables() {
            let hidden = hidden_tables.iter().any(|n| n == table.name());
            println!(
                "  {} {} -> {} ({} columns){}",
                kind_label(table.kind()),
                table.name(),
                table.proper_name(),
                table.all_columns().len(),
                if hidden { " [hidden]" } else { "" }
            );
        }
    }
}

fn print_table(schema: &Schema, table: &Table) {
    println!(
        "{} {}.{} -> {}.{}",
        kind_label(table.kind()),
        schema.name(),
        table.name(),
        schema.proper_name(),
        table.proper_name()
    );
    if let Some(pk_name) = table.pk_name() {
        println!("Primary key: {pk_name}");
    }

    let hidden = table.excluded_column_names();
    println!("\nColumns:");
    for column in table.all_columns() {
        let mut flags = Vec::new();
        if column.is_pk() {
            flags.push("pk");
        }
        if column.is_fk() {
            flags.push("fk");
        }
        if hidden.iter().any(|n| n == column.name()) {
            flags.push("hidden");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!(
            "  {} -> {} {}{flags}",
            column.name(),
            column.proper_name(),
            column.data_type()
        );
        if let Some(values) = column.enum_values() {
            println!("    values: {}", values.join(", "));
        }
    }

    if !table.foreign_keys().is_empty() {
        println!("\nForeign keys:");
        for fk in table.foreign_keys() {
            println!(
                "  ({}) -> {}.{}({})",
                fk.constrained_columns().join(", "),
                fk.referred_schema(),
                fk.referred_table(),
                fk.referred_columns().join(", ")
            );
        }
    }
}

fn kind_label(kind: TableKind) -> &'static str {
    match kind {
        TableKind::Table => "TABLE",
        TableKind::View => "VIEW",
    }
}
