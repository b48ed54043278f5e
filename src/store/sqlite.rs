use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{KindlingError, Result};
use crate::domain::{Bookmark, Item, DEADLINE_OFFSET_MS};
use crate::store::BookmarkStore;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store and bring the schema to the latest
    /// version. Once this returns, the store is ready; a failure here
    /// leaves bookmarks unavailable for the whole session.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| KindlingError::StoreUnavailable(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| KindlingError::StoreUnavailable(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| KindlingError::StoreUnavailable(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| KindlingError::StoreUnavailable(e.to_string()))
    }

    fn row_to_bookmark(row: &Row<'_>) -> rusqlite::Result<Bookmark> {
        let kids: String = row.get(9)?;
        Ok(Bookmark {
            id: row.get(0)?,
            kind: row.get(1)?,
            by: row.get(2)?,
            time: row.get(3)?,
            title: row.get(4)?,
            text: row.get(5)?,
            url: row.get(6)?,
            score: row.get(7)?,
            descendants: row.get(8)?,
            kids: serde_json::from_str(&kids).unwrap_or_default(),
            saved_at: row.get(10)?,
            deadline: row.get(11)?,
            read: row.get::<_, i64>(12)? != 0,
        })
    }

    fn write_record(conn: &Connection, record: &Bookmark) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO bookmarks
                 (id, kind, author, time, title, text, url, score, descendants,
                  kids, saved_at, deadline, read)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                record.id,
                record.kind,
                record.by,
                record.time,
                record.title,
                record.text,
                record.url,
                record.score,
                record.descendants,
                serde_json::to_string(&record.kids)
                    .map_err(|e| KindlingError::Other(e.to_string()))?,
                record.saved_at,
                record.deadline,
                record.read as i64,
            ],
        )?;
        Ok(())
    }
}

const SELECT_COLUMNS: &str = "id, kind, author, time, title, text, url, score, descendants, \
                              kids, saved_at, deadline, read";

impl BookmarkStore for SqliteStore {
    fn add(&self, item: &Item, now_ms: i64) -> Result<Bookmark> {
        let record = Bookmark::new(item, now_ms);
        debug_assert_eq!(record.deadline - record.saved_at, DEADLINE_OFFSET_MS);

        let conn = self.lock()?;
        Self::write_record(&conn, &record)?;
        Ok(record)
    }

    fn remove(&self, id: i64) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM bookmarks WHERE id = ?1", params![id])?;
        Ok(id)
    }

    fn toggle_read(&self, id: i64, read: bool) -> Result<Option<Bookmark>> {
        // One lock hold covers the read-modify-write, so two toggles
        // cannot interleave mid-update.
        let conn = self.lock()?;

        let existing = conn
            .query_row(
                &format!("SELECT {} FROM bookmarks WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::row_to_bookmark,
            )
            .optional()?;

        let mut record = match existing {
            Some(record) => record,
            None => return Ok(None),
        };

        record.read = read;
        Self::write_record(&conn, &record)?;
        Ok(Some(record))
    }

    fn get(&self, id: i64) -> Result<Option<Bookmark>> {
        let conn = self.lock()?;
        let result = conn
            .query_row(
                &format!("SELECT {} FROM bookmarks WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::row_to_bookmark,
            )
            .optional()?;
        Ok(result)
    }

    fn get_all(&self) -> Result<Vec<Bookmark>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM bookmarks", SELECT_COLUMNS))?;
        let bookmarks = stmt
            .query_map([], Self::row_to_bookmark)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(bookmarks)
    }
}
