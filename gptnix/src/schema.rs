use rusqlite::Connection;

pub(crate) fn setup_schema_v1(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS conversations (
                  id                    INTEGER PRIMARY KEY AUTOINCREMENT,
                  user_id               TEXT,
                  query                 TEXT NOT NULL,
                  response              TEXT NOT NULL,
                  timestamp             INTEGER NOT NULL
                  )",
        (),
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS by_user on conversations (user_id, timestamp);",
        (),
    )?;

    // Records are append-only.
    conn.execute_batch(
        "CREATE TRIGGER IF NOT EXISTS conversations_no_update
             BEFORE UPDATE ON conversations
             BEGIN SELECT RAISE(ABORT, 'conversations are append-only'); END;
         CREATE TRIGGER IF NOT EXISTS conversations_no_delete
             BEFORE DELETE ON conversations
             BEGIN SELECT RAISE(ABORT, 'conversations are append-only'); END;",
    )?;

    Ok(())
}
