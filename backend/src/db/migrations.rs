//! Ordered schema migrations.
//!
//! The applied version lives in `PRAGMA user_version`. At startup every step
//! with a higher version runs in its own transaction, which also records the
//! new version, so re-running is a no-op.
//!
//! Schema growth is additive only: new columns are nullable and existing rows
//! are never backfilled. Stores created by older revisions of the application
//! (which patched columns in at runtime and never set `user_version`) are
//! adopted in place: the base table is created only if missing and an
//! already-present column counts as added.

use log::info;
use rusqlite::Connection;

pub struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub up: fn(&Connection) -> rusqlite::Result<()>,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create back_checks table",
        up: create_back_checks,
    },
    Migration {
        version: 2,
        description: "socket totals for guava, gesho and grevillea",
        up: add_species_totals,
    },
    Migration {
        version: 3,
        description: "auto and general remarks",
        up: add_remarks,
    },
    Migration {
        version: 4,
        description: "nursery photo",
        up: add_photo,
    },
    Migration {
        version: 5,
        description: "accounting code",
        up: add_accounting_code,
    },
];

/// Latest schema version known to this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

pub fn current_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

pub fn apply(conn: &mut Connection) -> rusqlite::Result<u32> {
    let start = current_version(conn)?;
    let mut version = start;

    for migration in MIGRATIONS.iter().filter(|m| m.version > start) {
        let tx = conn.transaction()?;
        (migration.up)(&tx)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        tx.commit()?;
        info!(
            "Applied schema migration v{}: {}",
            migration.version, migration.description
        );
        version = migration.version;
    }

    Ok(version)
}

fn create_back_checks(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS back_checks (
            id INTEGER PRIMARY KEY,
            woreda VARCHAR,
            kebele VARCHAR,
            checker_fa_name VARCHAR,
            checker_cbe_name VARCHAR,
            checker_phone VARCHAR,
            fenced VARCHAR,
            guava_beds INTEGER,
            guava_length FLOAT,
            guava_sockets INTEGER,
            lemon_beds INTEGER,
            lemon_length FLOAT,
            lemon_sockets INTEGER,
            total_lemon_sockets INTEGER,
            gesho_beds INTEGER,
            gesho_length FLOAT,
            gesho_sockets INTEGER,
            grevillea_beds INTEGER,
            grevillea_length FLOAT,
            grevillea_sockets INTEGER,
            timestamp DATETIME
        );
        "#,
    )
}

fn add_species_totals(conn: &Connection) -> rusqlite::Result<()> {
    add_column_if_missing(conn, "back_checks", "total_guava_sockets", "INTEGER")?;
    add_column_if_missing(conn, "back_checks", "total_gesho_sockets", "INTEGER")?;
    add_column_if_missing(conn, "back_checks", "total_grevillea_sockets", "INTEGER")
}

fn add_remarks(conn: &Connection) -> rusqlite::Result<()> {
    add_column_if_missing(conn, "back_checks", "auto_remark", "TEXT")?;
    add_column_if_missing(conn, "back_checks", "general_remark", "TEXT")
}

fn add_photo(conn: &Connection) -> rusqlite::Result<()> {
    add_column_if_missing(conn, "back_checks", "photo", "TEXT")
}

fn add_accounting_code(conn: &Connection) -> rusqlite::Result<()> {
    add_column_if_missing(conn, "back_checks", "accounting_code", "VARCHAR")
}

fn add_column_if_missing(
    conn: &Connection,
    table: &str,
    column: &str,
    decl: &str,
) -> rusqlite::Result<()> {
    let sql = format!("ALTER TABLE {table} ADD COLUMN {column} {decl}");
    match conn.execute(&sql, []) {
        Ok(_) => Ok(()),
        Err(err) if is_duplicate_column(&err) => Ok(()),
        Err(err) => Err(err),
    }
}

fn is_duplicate_column(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            message.contains("duplicate column name")
        }
        _ => false,
    }
}
