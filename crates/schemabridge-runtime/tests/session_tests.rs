//! Integration tests for snapshot scanning and translation sessions.
//!
//! Run with: cargo test --package schemabridge-runtime --test session_tests

use schemabridge_core::{BridgeConfig, LayoutError, TableKind};
use schemabridge_runtime::{Session, SessionError, SnapshotScanner, scan_database};
use serde_json::{Value as JsonValue, json};
use std::collections::BTreeMap;
use std::path::Path;

fn orders_rows() -> Vec<JsonValue> {
    (0..100)
        .map(|i| {
            let status = if i % 3 == 0 { "closed" } else { "open" };
            json!([i.to_string(), format!("Customer {i}"), status])
        })
        .collect()
}

fn snapshot(extra_tables: Vec<JsonValue>) -> JsonValue {
    let mut tables = vec![
        json!({
            "name": "Orders",
            "columns": [
                {"name": "ID", "type": "INTEGER", "is_pk": true},
                {"name": "Customer Name", "type": "TEXT"},
                {"name": "Status", "type": "VARCHAR(10)"}
            ],
            "sample_rows": orders_rows()
        }),
        json!({
            "name": "Order Items",
            "columns": [
                {"name": "Order ID", "type": "INTEGER", "is_fk": true},
                {"name": "qty", "type": "INTEGER"}
            ],
            "foreign_keys": [{
                "constrained_columns": ["Order ID"],
                "referred_table": "Orders",
                "referred_columns": ["ID"]
            }]
        }),
        json!({
            "name": "Big Orders",
            "kind": "VIEW",
            "columns": [{"name": "ID", "type": "INTEGER"}]
        }),
    ];
    tables.extend(extra_tables);
    json!({
        "database": "shop",
        "schemas": [
            {"name": "public", "tables": tables},
            {"name": "empty", "tables": []}
        ]
    })
}

fn write(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
}

fn config(kind: &str, path: &str) -> BridgeConfig {
    BridgeConfig::from_yaml(&format!(
        r#"
source:
  kind: {kind}
  path: {path}
dialect: PostgreSQL
filters:
  columns:
    public:
      Orders:
        exclude: ["Customer Name"]
scan_enums: true
"#
    ))
    .unwrap()
}

/// Scanning a snapshot keeps schema order, puts views after tables, infers
/// enums and skips empty schemas.
#[test]
fn test_scan_snapshot() {
    let snapshot = serde_json::from_value(snapshot(vec![])).unwrap();
    let scanner = SnapshotScanner::new(snapshot);
    let db = scan_database(&scanner, true).unwrap();

    assert_eq!(db.name(), "shop");
    let schemas: Vec<&str> = db.all_schemas().iter().map(|s| s.name()).collect();
    assert_eq!(schemas, vec!["public"]);

    let public = db.schema("public").unwrap();
    let tables: Vec<(&str, TableKind)> = public
        .all_tables()
        .iter()
        .map(|t| (t.name(), t.kind()))
        .collect();
    assert_eq!(
        tables,
        vec![
            ("Orders", TableKind::Table),
            ("Order Items", TableKind::Table),
            ("Big Orders", TableKind::View),
        ]
    );

    let orders = public.table("Orders").unwrap();
    assert_eq!(
        orders.column("Status").unwrap().enum_values(),
        Some(&["closed".to_string(), "open".to_string()][..])
    );
    assert_eq!(orders.column("Customer Name").unwrap().enum_values(), None);
    assert_eq!(orders.column("ID").unwrap().enum_values(), None);
}

#[test]
fn test_scan_without_enums() {
    let snapshot = serde_json::from_value(snapshot(vec![])).unwrap();
    let db = scan_database(&SnapshotScanner::new(snapshot), false).unwrap();
    let status = db
        .schema("public")
        .unwrap()
        .table("Orders")
        .unwrap()
        .column("Status")
        .unwrap();
    assert_eq!(status.data_type(), "VARCHAR(10)");
}

/// The prompt layout honours configured filters; translation does not.
#[test]
fn test_session_prompt_and_translate() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot_path = dir.path().join("shop.json");
    write(&snapshot_path, &snapshot(vec![]).to_string());

    let session = Session::open(config("snapshot", snapshot_path.to_str().unwrap())).unwrap();
    let layout = session.prompt_layout();

    assert!(layout.starts_with("CREATE SCHEMA public;\n\n"));
    assert!(layout.contains("CREATE TABLE public.orders(\nid INTEGER,\nstatus ENUM(\"closed\",\"open\"),\nPRIMARY KEY (id)\n)"));
    assert!(layout.contains("FOREIGN KEY (order_id) REFERENCES public.orders(id)"));
    assert!(!layout.contains("customer_name"));
    assert!(!layout.contains("empty"));

    let result = session
        .translate("SELECT customer_name FROM orders WHERE status = 'open'")
        .unwrap();
    assert_eq!(
        result.translated_sql,
        "SELECT \"Customer Name\" FROM \"Orders\" WHERE \"Status\" = 'open'"
    );
}

/// Reloading picks up structural changes and keeps every active filter.
#[test]
fn test_reload_keeps_filters() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot_path = dir.path().join("shop.json");
    write(&snapshot_path, &snapshot(vec![]).to_string());

    let mut session = Session::open(config("snapshot", snapshot_path.to_str().unwrap())).unwrap();
    let excluded = session
        .apply_table_name_filter(&BTreeMap::from([(
            "public".to_string(),
            vec!["Big Orders".to_string()],
        )]))
        .unwrap();
    assert_eq!(excluded["public"], vec!["Big Orders"]);

    let refunds = json!({
        "name": "Refunds",
        "columns": [{"name": "Refund ID", "type": "INTEGER", "is_pk": true}]
    });
    write(&snapshot_path, &snapshot(vec![refunds]).to_string());
    session.reload().unwrap();

    assert_eq!(session.excluded_tables()["public"], vec!["Big Orders"]);
    assert_eq!(session.excluded_columns()["public"]["Orders"], vec!["Customer Name"]);
    assert!(session.prompt_layout().contains("CREATE TABLE public.refunds(\nrefund_id INTEGER,"));
    assert_eq!(
        session.translate("SELECT refund_id FROM refunds").unwrap().translated_sql,
        "SELECT \"Refund ID\" FROM \"Refunds\""
    );
}

/// A session's cached layout reopens as a `layout` source with the same
/// prompt and translations.
#[test]
fn test_layout_source_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot_path = dir.path().join("shop.json");
    let snapshot = json!({
        "database": "shop",
        "schemas": [{"name": "Sales", "tables": [
            {"name": "Orders", "columns": [
                {"name": "OrderID", "type": "INTEGER", "is_pk": true},
                {"name": "Customer.Name", "type": "VARCHAR(40)"},
                {"name": "Total", "type": "NUMERIC(10, 2)"}
            ]},
            {"name": "OrderLines", "columns": [
                {"name": "OrderID", "type": "INTEGER", "is_fk": true},
                {"name": "Qty", "type": "INTEGER"}
            ], "foreign_keys": [{
                "constrained_columns": ["OrderID"],
                "referred_table": "Orders",
                "referred_columns": ["OrderID"]
            }]}
        ]}]
    });
    write(&snapshot_path, &snapshot.to_string());
    let scanned = Session::open(config("snapshot", snapshot_path.to_str().unwrap())).unwrap();

    let layout_path = dir.path().join("shop.sql");
    let cached_layout = scanned.cached_layout().unwrap();
    write(&layout_path, &cached_layout);
    assert!(cached_layout.contains("CREATE TABLE Sales.Orders(\nOrderID INTEGER,"));

    let cached = Session::open(config("layout", layout_path.to_str().unwrap())).unwrap();
    assert_eq!(cached.database().name(), "shop");
    assert_eq!(cached.prompt_layout(), scanned.prompt_layout());

    let sql = "SELECT o.customer_name, l.qty FROM sales.orders o \
               JOIN sales.orderlines l ON l.orderid = o.orderid";
    let translated = cached.translate(sql).unwrap().translated_sql;
    assert_eq!(translated, scanned.translate(sql).unwrap().translated_sql);
    assert_eq!(
        translated,
        "SELECT o.\"Customer.Name\", l.\"Qty\" FROM \"Sales\".\"Orders\" o \
         JOIN \"Sales\".\"OrderLines\" l ON l.\"OrderID\" = o.\"OrderID\""
    );
}

/// A column name the layout text cannot carry fails the cache instead of
/// reloading as a different column.
#[test]
fn test_cached_layout_rejects_spaced_column_names() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot_path = dir.path().join("shop.json");
    write(&snapshot_path, &snapshot(vec![]).to_string());
    let session = Session::open(config("snapshot", snapshot_path.to_str().unwrap())).unwrap();

    let err = session.cached_layout().unwrap_err();
    assert!(matches!(
        err,
        SessionError::Layout(LayoutError::Unrepresentable { entity: "column", ref name, .. })
            if name == "Customer Name"
    ));
}

#[test]
fn test_from_config_file_resolves_relative_source() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("shop.json"), &snapshot(vec![]).to_string());
    let config_path = dir.path().join("schemabridge.yaml");
    write(&config_path, "source:\n  kind: snapshot\n  path: shop.json\n");

    let session = Session::from_config_file(&config_path).unwrap();
    assert_eq!(session.database().name(), "shop");
    assert_eq!(session.translator().default_schema(), Some("public"));
}

#[test]
fn test_unknown_connection_type() {
    let err = Session::open(config("oracle-live", "db.json")).unwrap_err();
    assert!(matches!(err, SessionError::UnknownConnectionType(kind) if kind == "oracle-live"));
}

#[test]
fn test_invalid_snapshot_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot_path = dir.path().join("bad.json");
    write(&snapshot_path, r#"{"database": "shop"}"#);

    let err = Session::open(config("snapshot", snapshot_path.to_str().unwrap())).unwrap_err();
    assert!(matches!(err, SessionError::Snapshot(_)));
}

#[test]
fn test_missing_layout_file() {
    let err = Session::open(config("layout", "/nonexistent/shop.sql")).unwrap_err();
    assert!(matches!(err, SessionError::Io { .. }));
}
