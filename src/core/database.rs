//! Filepath: src/core/database.rs
//! SQLite schema discovery and its three renderings.
//!
//! Files are recognised by the 16-byte header magic, never by extension.
//! Connections are opened read-only; the scanned database is not touched.

use std::collections::BTreeSet;
use std::path::Path;

use itertools::Itertools;
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, instrument};

use crate::core::budgeter::{group_thousands, human_kib};
use crate::infra::io::read_prefix;

/// Leading bytes of every SQLite 3 database file
pub const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// True when the file starts with the SQLite header; false on any read error.
pub fn has_sqlite_signature(path: &Path) -> bool {
    read_prefix(path, SQLITE_MAGIC.len())
        .map(|head| head.as_slice() == SQLITE_MAGIC)
        .unwrap_or(false)
}

#[derive(Debug, thiserror::Error)]
pub enum IntrospectError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type as written in the DDL (may be empty)
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub from_column: String,
    pub to_table: String,
    /// None when the reference targets the parent's primary key implicitly
    pub to_column: Option<String>,
    pub on_update: String,
    pub on_delete: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    pub unique: bool,
    /// Participating columns in key order; expression keys show as `<expr>`
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<IndexInfo>,
    pub row_count: u64,
}

/// Schema of one database file. Totals are derived from `tables` at
/// construction, so they always equal the per-table sums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationalSchema {
    name: String,
    tables: Vec<TableInfo>,
    table_count: usize,
    total_rows: u64,
    size_bytes: u64,
}

/// How much of a schema to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaView {
    Full,
    Compact,
    /// Compact, except these tables (lowercase names) at full detail
    Hybrid(BTreeSet<String>),
}

impl RelationalSchema {
    pub fn new(name: impl Into<String>, tables: Vec<TableInfo>, size_bytes: u64) -> Self {
        let table_count = tables.len();
        let total_rows = tables.iter().map(|t| t.row_count).sum();

        Self {
            name: name.into(),
            tables,
            table_count,
            total_rows,
            size_bytes,
        }
    }

    /// Read the schema of the database at `path` (read-only connection).
    #[instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn introspect(path: &Path) -> Result<Self, IntrospectError> {
        let size_bytes = std::fs::metadata(path)?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let mut tables = Vec::new();
        for table in table_names(&conn)? {
            tables.push(read_table(&conn, table)?);
        }

        debug!(tables = tables.len(), "schema read");
        Ok(Self::new(name, tables, size_bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tables(&self) -> &[TableInfo] {
        &self.tables
    }

    pub fn table_count(&self) -> usize {
        self.table_count
    }

    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn render(&self, view: &SchemaView) -> String {
        match view {
            SchemaView::Full => self.render_full(),
            SchemaView::Compact => self.render_compact(),
            SchemaView::Hybrid(focused) => self.render_hybrid(focused),
        }
    }

    fn render_full(&self) -> String {
        let mut lines = vec![
            format!("# Database: {}", self.name),
            "## Overview".to_string(),
            format!("- Total Tables: {}", self.table_count),
            format!("- Total Rows: {}", group_thousands(self.total_rows)),
            format!(
                "- File Size: {} bytes ({})",
                group_thousands(self.size_bytes),
                human_kib(self.size_bytes)
            ),
            String::new(),
            "## Schema Details".to_string(),
            String::new(),
        ];

        for table in &self.tables {
            push_table_detail(&mut lines, table, false);
        }

        trimmed(lines)
    }

    fn render_compact(&self) -> String {
        let mut lines = vec![
            format!("DB: {}", self.name),
            format!(
                "Tables: {} | Rows: {}",
                self.table_count,
                group_thousands(self.total_rows)
            ),
            String::new(),
        ];

        lines.extend(self.tables.iter().map(compact_line));

        trimmed(lines)
    }

    fn render_hybrid(&self, focused: &BTreeSet<String>) -> String {
        let mut lines = vec![
            format!("# Database: {}", self.name),
            "## Overview".to_string(),
            format!("- Total Tables: {}", self.table_count),
            format!("- Total Rows: {}", group_thousands(self.total_rows)),
            String::new(),
            "## Schema (Compact + Focus)".to_string(),
            String::new(),
        ];

        for table in &self.tables {
            if focused.contains(&table.name.to_lowercase()) {
                push_table_detail(&mut lines, table, true);
            } else {
                lines.push(compact_line(table));
            }
        }

        trimmed(lines)
    }
}

/// Quote an identifier for direct interpolation into SQL
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn table_names(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}

fn read_table(conn: &Connection, name: String) -> rusqlite::Result<TableInfo> {
    let row_count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", quote_ident(&name)),
        [],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid",
    )?;
    let columns = stmt
        .query_map([&name], |row| {
            Ok(ColumnInfo {
                name: row.get(0)?,
                data_type: row.get(1)?,
                nullable: row.get::<_, i64>(2)? == 0,
                default: row.get(3)?,
                primary_key: row.get::<_, i64>(4)? > 0,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT \"from\", \"table\", \"to\", on_update, on_delete \
         FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
    )?;
    let foreign_keys = stmt
        .query_map([&name], |row| {
            Ok(ForeignKey {
                from_column: row.get(0)?,
                to_table: row.get(1)?,
                to_column: row.get(2)?,
                on_update: row.get(3)?,
                on_delete: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare("SELECT name, \"unique\" FROM pragma_index_list(?1) ORDER BY seq")?;
    let index_heads = stmt
        .query_map([&name], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? != 0))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")?;
    let mut indexes = Vec::with_capacity(index_heads.len());
    for (index_name, unique) in index_heads {
        let columns = stmt
            .query_map([&index_name], |row| row.get::<_, Option<String>>(0))?
            .map(|col| col.map(|c| c.unwrap_or_else(|| "<expr>".to_string())))
            .collect::<rusqlite::Result<Vec<_>>>()?;

        indexes.push(IndexInfo {
            name: index_name,
            unique,
            columns,
        });
    }

    Ok(TableInfo {
        name,
        columns,
        foreign_keys,
        indexes,
        row_count: u64::try_from(row_count).unwrap_or(0),
    })
}

/// `T: name(col:TYPE[PK,NN], ...) | FK: from→table.to, ...`
fn compact_line(table: &TableInfo) -> String {
    let cols = table
        .columns
        .iter()
        .map(|c| {
            let mut flags = Vec::new();
            if c.primary_key {
                flags.push("PK");
            }
            if !c.nullable {
                flags.push("NN");
            }

            if flags.is_empty() {
                format!("{}:{}", c.name, c.data_type)
            } else {
                format!("{}:{}[{}]", c.name, c.data_type, flags.join(","))
            }
        })
        .join(", ");

    let fks = table
        .foreign_keys
        .iter()
        .map(|fk| {
            format!(
                "{}→{}.{}",
                fk.from_column,
                fk.to_table,
                fk.to_column.as_deref().unwrap_or("<pk>")
            )
        })
        .collect::<Vec<_>>();

    if fks.is_empty() {
        format!("T: {}({cols})", table.name)
    } else {
        format!("T: {}({cols}) | FK: {}", table.name, fks.join(", "))
    }
}

fn push_table_detail(lines: &mut Vec<String>, table: &TableInfo, focused: bool) {
    let marker = if focused { "[FOCUSED] " } else { "" };
    lines.push(format!("### {marker}Table: `{}`", table.name));
    lines.push(format!("- Rows: {}", group_thousands(table.row_count)));
    lines.push(String::new());

    lines.push("#### Columns:".to_string());
    lines.push("| Column | Type | Nullable | Default | PK |".to_string());
    lines.push("|--------|------|----------|---------|-----|".to_string());
    for col in &table.columns {
        lines.push(format!(
            "| `{}` | {} | {} | {} | {} |",
            col.name,
            col.data_type,
            if col.nullable { "✓" } else { "NOT NULL" },
            col.default.as_deref().unwrap_or("-"),
            if col.primary_key { "✓" } else { "" },
        ));
    }
    lines.push(String::new());

    if !table.foreign_keys.is_empty() {
        lines.push("#### Foreign Keys:".to_string());
        for fk in &table.foreign_keys {
            lines.push(format!(
                "- `{}` → `{}`.`{}` (ON UPDATE: {}, ON DELETE: {})",
                fk.from_column,
                fk.to_table,
                fk.to_column.as_deref().unwrap_or("<pk>"),
                fk.on_update,
                fk.on_delete
            ));
        }
        lines.push(String::new());
    }

    if !table.indexes.is_empty() {
        lines.push("#### Indexes:".to_string());
        for idx in &table.indexes {
            let cols = idx
                .columns
                .iter()
                .map(|c| format!("`{c}`"))
                .join(", ");
            let unique = if idx.unique { "UNIQUE " } else { "" };
            lines.push(format!("- {unique}`{}` on ({cols})", idx.name));
        }
        lines.push(String::new());
    }

    lines.push("---".to_string());
    lines.push(String::new());
}

fn trimmed(lines: Vec<String>) -> String {
    lines.join("\n").trim_end().to_string()
}
