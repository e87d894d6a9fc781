//! Table definitions derived from the collection catalog.

use rusqlite::Connection;

use roster_core::Collection;

pub(crate) fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
    ",
    )?;

    for collection in Collection::ALL {
        conn.execute_batch(&table_definition(collection))?;
    }

    Ok(())
}

/// `CREATE TABLE IF NOT EXISTS` statement for a collection.
pub fn table_definition(collection: Collection) -> String {
    let columns = collection
        .columns()
        .iter()
        .map(|c| {
            if c.is_key() {
                format!("\"{}\" {} PRIMARY KEY", c.name(), c.kind().sql_type())
            } else {
                format!("\"{}\" {}", c.name(), c.kind().sql_type())
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        collection.as_str(),
        columns
    )
}
