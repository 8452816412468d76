//! Integration tests for the layout codec: rendering, parsing and exact
//! reload of cached layouts.
//!
//! Run with: cargo test --package schemabridge-core --test layout_tests

use pretty_assertions::assert_eq;
use schemabridge_core::{
    Column, Database, ForeignKeyRelation, LayoutOptions, Schema, Table, TableKind, parse_layout,
};

fn two_schema_db(columns: Vec<Column>, t2_extra: Column, fk: ForeignKeyRelation) -> Database {
    let mut t2_columns = columns.clone();
    t2_columns.push(t2_extra);
    let tables = || {
        vec![
            Table::new("T1", TableKind::Table, None, columns.clone(), vec![]).unwrap(),
            Table::new("T2", TableKind::Table, None, t2_columns.clone(), vec![fk.clone()]).unwrap(),
        ]
    };
    Database::with_schemas(
        "test",
        vec![
            Schema::new("pub", tables()).unwrap(),
            Schema::new("pubmore", tables()).unwrap(),
        ],
    )
    .unwrap()
}

/// A catalog built from entities survives render -> parse -> render unchanged.
#[test]
fn test_cached_layout_round_trip() {
    let columns = vec![
        Column::new("Col1", "INTEGER").primary_key().foreign_key(),
        Column::new("Col2", "INTEGER"),
        Column::new("Col3", "VARCHAR(10)"),
        Column::new("Kind", "TEXT").with_enum_values(["a", "b c", "Research & Development"]),
        Column::new("Test1", "NUMERIC(10, 2)"),
        Column::new("Col4", "INTEGER"),
    ];
    let fk = ForeignKeyRelation::new(["Col1", "Col2"], "pub", "T1", ["Col1", "Col2"]).unwrap();
    let mut scanned = two_schema_db(
        columns,
        Column::new("Test2", "INTEGER").primary_key().foreign_key(),
        fk,
    );
    let named = Table::new(
        "PlaylistTrack",
        TableKind::View,
        Some("PK_PlaylistTrack".to_string()),
        vec![
            Column::new("PlaylistId", "INTEGER").primary_key(),
            Column::new("TrackId", "INTEGER").primary_key(),
        ],
        vec![],
    )
    .unwrap();
    scanned
        .register_schema(Schema::new("music", vec![named]).unwrap())
        .unwrap();

    let options = LayoutOptions::raw();
    let cached_layout = scanned.render_layout(&options);

    let mut reloaded = Database::new("test2");
    reloaded.reload_from_cache(&cached_layout, None).unwrap();

    assert_eq!(reloaded.render_layout(&options), cached_layout);
    assert!(cached_layout.contains("CONSTRAINT PK_PlaylistTrack PRIMARY KEY (PlaylistId,TrackId)"));
    assert!(cached_layout.contains("Kind ENUM(\"a\",\"b c\",\"Research & Development\")"));
}

/// A reflected `ENUM(...)` type string without scanned values stays a type.
#[test]
fn test_enum_type_string_round_trip() {
    let table = Table::new(
        "shirts",
        TableKind::Table,
        None,
        vec![
            Column::new("id", "INTEGER").primary_key(),
            Column::new("size", "ENUM('s','m')"),
            Column::new("fit", "TEXT").with_enum_values(["slim", "regular"]),
        ],
        vec![],
    )
    .unwrap();
    let scanned =
        Database::with_schemas("shop", vec![Schema::new("shop", vec![table]).unwrap()]).unwrap();

    let options = LayoutOptions::raw();
    let cached_layout = scanned.render_layout(&options);
    assert!(cached_layout.contains("size ENUM('s','m'),"));

    let mut reloaded = Database::new("shop");
    reloaded.reload_from_cache(&cached_layout, None).unwrap();
    assert_eq!(reloaded.render_layout(&options), cached_layout);

    let table = reloaded.schema("shop").unwrap().table("shirts").unwrap();
    let size = table.all_columns().iter().find(|c| c.name() == "size").unwrap();
    assert_eq!(size.enum_values(), None);
    assert_eq!(size.data_type(), "ENUM('s','m')");
}

/// Normalized rendering uses proper names everywhere; raw rendering keeps
/// the originals.
#[test]
fn test_proper_naming_layout() {
    let columns = vec![
        Column::new("Col1 SPACE", "INTEGER").primary_key().foreign_key(),
        Column::new("Col2_UNDERSCORE", "INTEGER"),
        Column::new("Col3.DOT", "INTEGER"),
        Column::new("Test1", "INTEGER"),
        Column::new("Col4", "INTEGER"),
    ];
    let fk = ForeignKeyRelation::new(
        ["Col1 SPACE", "Col2_UNDERSCORE"],
        "pub",
        "T1",
        ["Col1", "Col2_UNDERSCORE"],
    )
    .unwrap();
    let db = two_schema_db(
        columns,
        Column::new("Test2", "INTEGER").primary_key().foreign_key(),
        fk,
    );

    let normalized_layout = "CREATE SCHEMA pub;
CREATE SCHEMA pubmore;

CREATE TABLE pub.t1(
col1_space INTEGER,
col2_underscore INTEGER,
col3_dot INTEGER,
test1 INTEGER,
col4 INTEGER,
PRIMARY KEY (col1_space)
)

CREATE TABLE pub.t2(
col1_space INTEGER,
col2_underscore INTEGER,
col3_dot INTEGER,
test1 INTEGER,
col4 INTEGER,
test2 INTEGER,
PRIMARY KEY (col1_space,test2),
FOREIGN KEY (col1_space,col2_underscore) REFERENCES pub.t1(col1,col2_underscore)
)

CREATE TABLE pubmore.t1(
col1_space INTEGER,
col2_underscore INTEGER,
col3_dot INTEGER,
test1 INTEGER,
col4 INTEGER,
PRIMARY KEY (col1_space)
)

CREATE TABLE pubmore.t2(
col1_space INTEGER,
col2_underscore INTEGER,
col3_dot INTEGER,
test1 INTEGER,
col4 INTEGER,
test2 INTEGER,
PRIMARY KEY (col1_space,test2),
FOREIGN KEY (col1_space,col2_underscore) REFERENCES pub.t1(col1,col2_underscore)
)";

    let rendered = db.render_layout(&LayoutOptions::normalized());
    assert_eq!(rendered, normalized_layout);

    // Normalized text is itself a stable cache.
    let mut reloaded = Database::new("test");
    reloaded.reload_from_cache(&rendered, None).unwrap();
    assert_eq!(reloaded.render_layout(&LayoutOptions::raw()), normalized_layout);

    let raw = db.render_layout(&LayoutOptions::raw());
    assert!(raw.contains("\nCol1 SPACE INTEGER,\n"));
    assert!(raw.contains("\nCol3.DOT INTEGER,\n"));
    assert!(raw.contains("FOREIGN KEY (Col1 SPACE,Col2_UNDERSCORE) REFERENCES pub.T1(Col1,Col2_UNDERSCORE)"));
}

/// Hand-written layouts in the emitted grammar reload byte for byte.
#[test]
fn test_cached_layout_string() {
    let layout = r#"CREATE SCHEMA public;

CREATE TABLE public.albums(
id INTEGER,
title VARCHAR(160),
artist_id INTEGER,
PRIMARY KEY (id),
FOREIGN KEY (artist_id) REFERENCES public.artists(id)
)

CREATE TABLE public.artists(
id INTEGER,
name VARCHAR(120),
PRIMARY KEY (id)
)

CREATE TABLE public.invoice_lines(
id INTEGER,
invoice_id INTEGER,
track_id ENUM("Manufacturing","Speciality Products","Corporate","Research & Development"),
unit_price NUMERIC(10, 2),
quantity INTEGER,
PRIMARY KEY (id),
FOREIGN KEY (invoice_id) REFERENCES public.invoices(id),
FOREIGN KEY (track_id) REFERENCES public.tracks(id)
)

CREATE TABLE public.playlist_tracks(
playlist_id INTEGER,
track_id INTEGER,
CONSTRAINT PK_PlaylistTrack PRIMARY KEY (playlist_id,track_id),
FOREIGN KEY (playlist_id) REFERENCES public.playlists(id),
FOREIGN KEY (track_id) REFERENCES public.tracks(id)
)

CREATE TABLE public.tracks(
id INTEGER,
name VARCHAR(200),
album_id INTEGER,
media_type_id INTEGER,
genre_id INTEGER,
PRIMARY KEY (id),
FOREIGN KEY (album_id) REFERENCES public.albums(id),
FOREIGN KEY (genre_id,album_id) REFERENCES public.genres(id,album_id),
FOREIGN KEY (media_type_id) REFERENCES public.media_types(id)
)"#;

    let mut db = Database::new("chinook");
    db.reload_from_cache(layout, None).unwrap();
    assert_eq!(db.render_layout(&LayoutOptions::raw()), layout);

    let tracks = db.schema("public").unwrap().table("tracks").unwrap();
    let keys: Vec<&str> = tracks
        .all_columns()
        .iter()
        .filter(|c| c.is_key())
        .map(|c| c.name())
        .collect();
    assert_eq!(keys, vec!["id", "album_id", "media_type_id", "genre_id"]);
}

/// A foreign key without a schema qualifier takes the default schema.
#[test]
fn test_foreign_key_default_schema() {
    let layout = "CREATE SCHEMA pub;\n\n\
                  CREATE TABLE pub.orders(\n\
                  id INTEGER,\n\
                  customer_id INTEGER,\n\
                  PRIMARY KEY (id),\n\
                  FOREIGN KEY (customer_id) REFERENCES customers(id)\n\
                  )";

    let parsed = parse_layout(layout, Some("pub")).unwrap();
    let fk = &parsed.schema("pub").unwrap().table("orders").unwrap().foreign_keys[0];
    assert_eq!(fk.referred_schema(), "pub");
    assert_eq!(fk.referred_table(), "customers");
    assert_eq!(fk.referred_columns(), ["id"]);

    let mut db = Database::new("shop");
    db.reload_from_cache(layout, Some("pub")).unwrap();
    assert!(
        db.render_layout(&LayoutOptions::raw())
            .ends_with("FOREIGN KEY (customer_id) REFERENCES pub.customers(id)\n)")
    );
}

/// Filters hide columns and tables from the rendered text but never key clauses.
#[test]
fn test_filtered_rendering() {
    let columns = vec![
        Column::new("id", "INTEGER").primary_key(),
        Column::new("secret", "TEXT"),
        Column::new("owner_id", "INTEGER").foreign_key(),
    ];
    let fk = ForeignKeyRelation::new(["owner_id"], "pub", "T1", ["id"]).unwrap();
    let mut db = two_schema_db(columns, Column::new("extra", "TEXT"), fk);
    db.apply_schema_name_filter(["pubmore"]).unwrap();
    db.schema_mut("pub")
        .unwrap()
        .apply_table_name_filter(["T1"])
        .unwrap();
    db.schema_mut("pub")
        .unwrap()
        .table_mut("T2")
        .unwrap()
        .apply_column_regex_filter("secret|owner|id")
        .unwrap();

    assert_eq!(
        db.render_layout(&LayoutOptions::raw()),
        "CREATE SCHEMA pub;\n\n\
         CREATE TABLE pub.T2(\n\
         id INTEGER,\n\
         owner_id INTEGER,\n\
         extra TEXT,\n\
         PRIMARY KEY (id),\n\
         FOREIGN KEY (owner_id) REFERENCES pub.T1(id)\n\
         )"
    );
}

/// A foreign key column built without its flag is still pinned, so the
/// filtered layout names only visible columns and parses back.
#[test]
fn test_filtered_foreign_key_column_stays_visible() {
    let users = Table::new(
        "u",
        TableKind::Table,
        None,
        vec![Column::new("id", "INTEGER").primary_key()],
        vec![],
    )
    .unwrap();
    let items = Table::new(
        "t",
        TableKind::Table,
        None,
        vec![
            Column::new("id", "INTEGER").primary_key(),
            Column::new("owner", "INTEGER"),
        ],
        vec![ForeignKeyRelation::new(["owner"], "s", "u", ["id"]).unwrap()],
    )
    .unwrap();
    let mut db =
        Database::with_schemas("db", vec![Schema::new("s", vec![items, users]).unwrap()]).unwrap();
    db.schema_mut("s")
        .unwrap()
        .table_mut("t")
        .unwrap()
        .apply_column_name_filter(["owner"])
        .unwrap();

    let layout = db.render_layout(&LayoutOptions::raw());
    assert!(layout.contains("owner INTEGER,"));
    assert!(parse_layout(&layout, None).is_ok());
}
