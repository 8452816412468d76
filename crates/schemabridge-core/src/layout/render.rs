use super::{LayoutError, LayoutOptions, Naming};
use crate::catalog::{Column, Database, ForeignKeyRelation, Schema, Table};
use crate::naming::normalize_name;

fn pick<'a>(naming: Naming, raw: &'a str, proper: &'a str) -> &'a str {
    match naming {
        Naming::Raw => raw,
        Naming::Normalized => proper,
    }
}

/// Foreign key references carry only original names, so they are normalized
/// on the fly.
fn reference(naming: Naming, raw: &str) -> String {
    match naming {
        Naming::Raw => raw.to_string(),
        Naming::Normalized => normalize_name(raw),
    }
}

/// Check that every name in `schemas` reads back unchanged from raw layout
/// text.
///
/// Column names end at the first space and key lists split on commas; schema
/// names end at the first dot and referred tables at the first parenthesis.
pub fn check_cacheable(schemas: &[Schema]) -> Result<(), LayoutError> {
    for schema in schemas {
        check_name("schema", schema.name(), &['.', ';'])?;
        for table in schema.all_tables() {
            check_name("table", table.name(), &['('])?;
            if let Some(pk_name) = table.pk_name() {
                check_name("primary key", pk_name, &[])?;
                if pk_name.contains(" PRIMARY KEY ") {
                    return Err(unrepresentable(
                        "primary key",
                        pk_name,
                        "contains ' PRIMARY KEY '",
                    ));
                }
            }
            for column in table.all_columns() {
                check_column(column)?;
            }
            for fk in table.foreign_keys() {
                check_name("schema", fk.referred_schema(), &['.', ';'])?;
                check_name("table", fk.referred_table(), &['('])?;
                for name in fk.constrained_columns().iter().chain(fk.referred_columns()) {
                    check_name("column", name, &[' ', ','])?;
                }
            }
        }
    }
    Ok(())
}

fn check_column(column: &Column) -> Result<(), LayoutError> {
    check_name("column", column.name(), &[' ', ','])?;
    let data_type = column.data_type();
    if data_type.contains(['\n', '\r']) || data_type.ends_with(',') {
        return Err(LayoutError::Unrepresentable {
            entity: "type of column",
            name: column.name().to_string(),
            reason: format!("type '{data_type}' spans lines or ends with ','"),
        });
    }
    let quoted = column
        .enum_values()
        .unwrap_or_default()
        .iter()
        .find(|value| value.contains('"'));
    if let Some(value) = quoted {
        return Err(unrepresentable("enum value", value, "contains '\"'"));
    }
    Ok(())
}

fn check_name(entity: &'static str, name: &str, delimiters: &[char]) -> Result<(), LayoutError> {
    if name.is_empty() {
        return Err(unrepresentable(entity, name, "name is empty"));
    }
    if name.trim() != name {
        return Err(unrepresentable(entity, name, "leading or trailing whitespace"));
    }
    if name.contains(['\n', '\r']) {
        return Err(unrepresentable(entity, name, "contains a line break"));
    }
    match name.chars().find(|c| delimiters.contains(c)) {
        Some(c) => Err(unrepresentable(entity, name, &format!("contains {c:?}"))),
        None => Ok(()),
    }
}

fn unrepresentable(entity: &'static str, name: &str, reason: &str) -> LayoutError {
    LayoutError::Unrepresentable {
        entity,
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Render the visible schemas and tables of a database.
///
/// `CREATE SCHEMA` lines come first, then a blank line, then one block per
/// table separated by blank lines.
pub fn render_database(database: &Database, options: &LayoutOptions) -> String {
    let schemas = database.schemas();
    let blocks: Vec<String> = schemas
        .iter()
        .flat_map(|schema| render_schema(schema, options))
        .collect();

    if !options.include_schema {
        return blocks.join("\n\n");
    }

    let create_schemas: Vec<String> = schemas
        .iter()
        .map(|schema| {
            format!(
                "CREATE SCHEMA {};",
                pick(options.naming, schema.name(), schema.proper_name())
            )
        })
        .collect();

    format!("{}\n\n{}", create_schemas.join("\n"), blocks.join("\n\n"))
}

/// Render the visible tables of one schema, one block per table.
pub fn render_schema(schema: &Schema, options: &LayoutOptions) -> Vec<String> {
    let qualifier = options
        .include_schema
        .then(|| pick(options.naming, schema.name(), schema.proper_name()));

    schema
        .tables()
        .into_iter()
        .filter(|table| !(options.exclude_views && table.is_view()))
        .map(|table| render_table(table, qualifier, options.naming))
        .collect()
}

/// Render a single `CREATE TABLE` block with its visible columns and every
/// key clause.
pub fn render_table(table: &Table, schema: Option<&str>, naming: Naming) -> String {
    let table_name = pick(naming, table.name(), table.proper_name());
    let header = match schema {
        Some(schema) => format!("CREATE TABLE {schema}.{table_name}("),
        None => format!("CREATE TABLE {table_name}("),
    };

    let mut lines: Vec<String> = table
        .columns()
        .into_iter()
        .map(|column| render_column(column, naming))
        .collect();

    let pk = table.pk();
    if !pk.is_empty() {
        let key_columns = pk
            .iter()
            .map(|c| pick(naming, c.name(), c.proper_name()))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(match table.pk_name() {
            Some(pk_name) => format!(
                "CONSTRAINT {} PRIMARY KEY ({key_columns})",
                reference(naming, pk_name)
            ),
            None => format!("PRIMARY KEY ({key_columns})"),
        });
    }

    lines.extend(
        table
            .foreign_keys()
            .iter()
            .map(|fk| render_foreign_key(fk, naming)),
    );

    format!("{header}\n{}\n)", lines.join(",\n"))
}

fn render_column(column: &Column, naming: Naming) -> String {
    let name = pick(naming, column.name(), column.proper_name());
    match column.enum_values() {
        Some(values) => {
            let literals = values
                .iter()
                .map(|v| format!("\"{v}\""))
                .collect::<Vec<_>>()
                .join(",");
            format!("{name} ENUM({literals})")
        }
        None => format!("{name} {}", column.data_type()),
    }
}

fn render_foreign_key(fk: &ForeignKeyRelation, naming: Naming) -> String {
    let list = |names: &[String]| {
        names
            .iter()
            .map(|n| reference(naming, n))
            .collect::<Vec<_>>()
            .join(",")
    };
    format!(
        "FOREIGN KEY ({}) REFERENCES {}.{}({})",
        list(fk.constrained_columns()),
        reference(naming, fk.referred_schema()),
        reference(naming, fk.referred_table()),
        list(fk.referred_columns()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TableKind;
    use pretty_assertions::assert_eq;

    fn orders() -> Table {
        Table::new(
            "Order Lines",
            TableKind::Table,
            Some("PK_Lines".to_string()),
            vec![
                Column::new("Order Id", "INTEGER").primary_key().foreign_key(),
                Column::new("Line.No", "INTEGER").primary_key(),
                Column::new("Status", "VARCHAR(8)").with_enum_values(["open", "closed"]),
            ],
            vec![ForeignKeyRelation::new(["Order Id"], "Sales", "Orders", ["Id"]).unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn test_check_cacheable() {
        let sales = Schema::new("Sales", vec![orders()]).unwrap();
        assert_eq!(
            check_cacheable(std::slice::from_ref(&sales)).unwrap_err(),
            LayoutError::Unrepresentable {
                entity: "column",
                name: "Order Id".to_string(),
                reason: "contains ' '".to_string(),
            }
        );

        let plain = Table::new(
            "Order Lines",
            TableKind::Table,
            None,
            vec![
                Column::new("OrderId", "NUMERIC(10, 2)").primary_key(),
                Column::new("Status", "TEXT").with_enum_values(["open", "on hold"]),
            ],
            vec![],
        )
        .unwrap();
        assert!(check_cacheable(&[Schema::new("Sales", vec![plain.clone()]).unwrap()]).is_ok());

        let dotted = Schema::new("v1.sales", vec![plain]).unwrap();
        assert!(matches!(
            check_cacheable(&[dotted]),
            Err(LayoutError::Unrepresentable { entity: "schema", .. })
        ));

        let quoted = Table::new(
            "t",
            TableKind::Table,
            None,
            vec![Column::new("size", "TEXT").with_enum_values(["6\""])],
            vec![],
        )
        .unwrap();
        assert!(matches!(
            check_cacheable(&[Schema::new("s", vec![quoted]).unwrap()]),
            Err(LayoutError::Unrepresentable { entity: "enum value", .. })
        ));
    }

    #[test]
    fn test_raw_table_block() {
        assert_eq!(
            render_table(&orders(), Some("Sales"), Naming::Raw),
            "CREATE TABLE Sales.Order Lines(\n\
             Order Id INTEGER,\n\
             Line.No INTEGER,\n\
             Status ENUM(\"open\",\"closed\"),\n\
             CONSTRAINT PK_Lines PRIMARY KEY (Order Id,Line.No),\n\
             FOREIGN KEY (Order Id) REFERENCES Sales.Orders(Id)\n\
             )"
        );
    }

    #[test]
    fn test_normalized_table_block() {
        assert_eq!(
            render_table(&orders(), Some("sales"), Naming::Normalized),
            "CREATE TABLE sales.order_lines(\n\
             order_id INTEGER,\n\
             line_no INTEGER,\n\
             status ENUM(\"open\",\"closed\"),\n\
             CONSTRAINT pk_lines PRIMARY KEY (order_id,line_no),\n\
             FOREIGN KEY (order_id) REFERENCES sales.orders(id)\n\
             )"
        );
    }

    #[test]
    fn test_hidden_columns_keep_key_clauses() {
        let mut table = orders();
        table.apply_column_name_filter(["Status", "Order Id"]).unwrap();
        assert_eq!(
            render_table(&table, None, Naming::Raw),
            "CREATE TABLE Order Lines(\n\
             Order Id INTEGER,\n\
             Line.No INTEGER,\n\
             CONSTRAINT PK_Lines PRIMARY KEY (Order Id,Line.No),\n\
             FOREIGN KEY (Order Id) REFERENCES Sales.Orders(Id)\n\
             )"
        );
    }

    #[test]
    fn test_views_excluded() {
        let view = Table::new("v_orders", TableKind::View, None, vec![Column::new("id", "INT")], vec![])
            .unwrap();
        let table = Table::new("orders", TableKind::Table, None, vec![Column::new("id", "INT")], vec![])
            .unwrap();
        let db = Database::with_schemas("db", vec![Schema::new("s", vec![view, table]).unwrap()])
            .unwrap();

        assert_eq!(
            render_database(&db, &LayoutOptions::raw().excluding_views()),
            "CREATE SCHEMA s;\n\nCREATE TABLE s.orders(\nid INT\n)"
        );
        assert_eq!(
            render_database(&db, &LayoutOptions::raw().without_schema()),
            "CREATE TABLE v_orders(\nid INT\n)\n\nCREATE TABLE orders(\nid INT\n)"
        );
    }
}
