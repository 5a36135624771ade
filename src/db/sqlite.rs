use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use super::DatabaseError;
use crate::config::TABLE_NAME;

/// Columns every catalog must carry, whatever produced it.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "id",
    "name",
    "price",
    "is_discontinued",
    "manufacturer_name",
    "type",
    "pack_size_label",
    "short_composition1",
    "short_composition2",
    "name_lower",
];

/// Open an existing catalog for reading and verify its shape.
///
/// The service never writes to the catalog, so the connection is opened
/// read-only and a missing file is an error rather than a new empty database.
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_URI,
    )?;
    verify_schema(&conn)?;
    Ok(conn)
}

/// Open (or create) a writable catalog and run migrations. Used by the import.
pub fn create_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch("PRAGMA journal_mode=DELETE;")?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(
        1,
        include_str!("../../resources/migrations/001_medicines.sql"),
    )];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, Option<i64>>(0),
    )
    .ok()
    .flatten()
    .unwrap_or(0)
}

/// Check that the catalog table and all required columns exist.
pub fn verify_schema(conn: &Connection) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({TABLE_NAME})"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(DatabaseError::MissingTable(TABLE_NAME.to_string()));
    }

    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|c| c == required) {
            return Err(DatabaseError::MissingColumn {
                table: TABLE_NAME.to_string(),
                column: required.to_string(),
            });
        }
    }
    Ok(())
}
