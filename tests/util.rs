//! Shared test utilities for integration tests
//!
//! Fixture builders for small project trees and SQLite files used
//! across the integration suites.

#![allow(dead_code)]

use std::path::Path;

use assert_fs::prelude::*;

/// Python module with a header, a class, a decorated method and a
/// top-level async function.
pub const PY_SAMPLE: &str = "\"\"\"Inventory helpers.\"\"\"\n\
import os\n\
\n\
class Store(Base):\n    \
    \"\"\"Keeps items.\n\n    Long description.\n    \"\"\"\n\n    \
    @property\n    \
    def size(self) -> int:\n        \
        return len(self.items)\n\n    \
    def add(self, item, qty=1):\n        \
        self.items.append(item)\n\n\
async def fetch(url: str) -> bytes:\n    \
    secret = 42\n    \
    return b''\n";

/// Small project: Python, markdown, a JS file, an ignored dependency dir
/// and a non-significant binary.
pub fn make_project() -> assert_fs::TempDir
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    tmp.child("app/store.py")
        .write_str(PY_SAMPLE)
        .expect("write store.py");

    tmp.child("README.md")
        .write_str("# Demo\n\nIntro text.\n\n## Usage\nRun it.\n")
        .expect("write README.md");

    tmp.child("web/index.js")
        .write_str("export function render(el) {\n  el.innerHTML = 'x';\n}\n")
        .expect("write index.js");

    tmp.child("node_modules/lib/index.js")
        .write_str("module.exports = 1;\n")
        .expect("write node_modules");

    tmp.child("logo.png")
        .write_binary(b"\x89PNG\r\n\x1a\n")
        .expect("write logo");

    tmp
}

/// Create a SQLite database with a `users` table (and an index) plus an
/// `orders` table referencing it.
pub fn make_database(path: &Path)
{
    if let Some(parent) = path.parent()
    {
        std::fs::create_dir_all(parent).expect("mkdir");
    }

    let conn = rusqlite::Connection::open(path).expect("open db");
    conn.execute_batch(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL UNIQUE);
         CREATE INDEX idx_users_email ON users(email);
         CREATE TABLE orders (
             id INTEGER PRIMARY KEY,
             user_id INTEGER REFERENCES users(id),
             total REAL DEFAULT 0
         );
         INSERT INTO users (email) VALUES ('a@x.io'), ('b@x.io');
         INSERT INTO orders (user_id, total) VALUES (1, 9.5);",
    )
    .expect("create schema");
}

/// A file carrying the SQLite signature followed by garbage.
pub fn make_corrupt_database(path: &Path)
{
    let mut bytes = b"SQLite format 3\0".to_vec();
    bytes.extend(std::iter::repeat_n(0xAB_u8, 200));
    std::fs::write(path, bytes).expect("write corrupt db");
}

/// Read the generated document.
pub fn read_doc(path: &Path) -> String
{
    std::fs::read_to_string(path).expect("read output")
}
