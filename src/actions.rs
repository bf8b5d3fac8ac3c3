use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel::sql_types::{Binary, Text};

use crate::config::StoreConfig;
use crate::errors::Result;
use crate::models::{NewRecord, Record, RowCount, RowId};

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

/// How long a connection waits on another writer's lock before giving up.
pub const BUSY_TIMEOUT_MS: u32 = 5000;

#[derive(Debug, Clone, Copy)]
struct BusyTimeout(u32);

impl CustomizeConnection<SqliteConnection, r2d2::Error> for BusyTimeout {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), r2d2::Error> {
        conn.batch_execute(&format!("PRAGMA busy_timeout = {};", self.0))
            .map_err(r2d2::Error::QueryError)
    }
}

/// Validates the config and builds a pool over the database file.
pub fn build_pool(cfg: &StoreConfig) -> Result<DbPool> {
    cfg.validate()?;
    let manager = ConnectionManager::<SqliteConnection>::new(cfg.database_url());
    let pool = r2d2::Pool::builder()
        .connection_customizer(Box::new(BusyTimeout(BUSY_TIMEOUT_MS)))
        .build(manager)?;
    Ok(pool)
}

/// Creates the record table if it is missing. Safe to run again on a populated store.
pub fn init_schema(conn: &mut SqliteConnection, table: &str) -> Result<()> {
    diesel::sql_query(format!(
        "CREATE TABLE IF NOT EXISTS {} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            image BLOB NOT NULL,
            name TEXT NOT NULL,
            timestamp TIMESTAMP NOT NULL
        )",
        table
    ))
    .execute(conn)?;
    Ok(())
}

pub fn insert_record(conn: &mut SqliteConnection, table: &str, record: NewRecord) -> Result<i64> {
    let row = conn.immediate_transaction(|conn| {
        diesel::sql_query(format!(
            "INSERT INTO {} (image, name, timestamp) VALUES (?, ?, ?)",
            table
        ))
        .bind::<Binary, _>(record.image)
        .bind::<Text, _>(record.name)
        .bind::<Text, _>(record.timestamp)
        .execute(conn)?;

        diesel::sql_query("SELECT last_insert_rowid() AS id").get_result::<RowId>(conn)
    })?;
    Ok(row.id)
}

/// Every record, oldest first.
pub fn list_records(conn: &mut SqliteConnection, table: &str) -> Result<Vec<Record>> {
    let records = diesel::sql_query(format!(
        "SELECT id, image, name, timestamp FROM {} ORDER BY id",
        table
    ))
    .load::<Record>(conn)?;
    Ok(records)
}

pub fn count_records(conn: &mut SqliteConnection, table: &str) -> Result<i64> {
    let row = diesel::sql_query(format!("SELECT COUNT(*) AS count FROM {}", table))
        .get_result::<RowCount>(conn)?;
    Ok(row.count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_conn() -> SqliteConnection {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        init_schema(&mut conn, "face_data").unwrap();
        conn
    }

    fn new_record(name: &str) -> NewRecord {
        NewRecord {
            image: vec![0xff, 0xd8, 0xff, 0xe0, 1, 2, 3],
            name: name.to_string(),
            timestamp: "2024-03-10T16:44:11.123456".to_string(),
        }
    }

    #[test]
    fn empty_table_lists_nothing() {
        let mut conn = memory_conn();
        assert!(list_records(&mut conn, "face_data").unwrap().is_empty());
        assert_eq!(count_records(&mut conn, "face_data").unwrap(), 0);
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let mut conn = memory_conn();
        let a = insert_record(&mut conn, "face_data", new_record("a")).unwrap();
        let b = insert_record(&mut conn, "face_data", new_record("b")).unwrap();
        assert!(b > a);
    }

    #[test]
    fn list_preserves_insertion_order() {
        let mut conn = memory_conn();
        insert_record(&mut conn, "face_data", new_record("A")).unwrap();
        insert_record(&mut conn, "face_data", new_record("B")).unwrap();
        let names: Vec<_> = list_records(&mut conn, "face_data")
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn stored_fields_round_trip() {
        let mut conn = memory_conn();
        let sent = new_record("Jackson");
        let id = insert_record(&mut conn, "face_data", sent.clone()).unwrap();
        let records = list_records(&mut conn, "face_data").unwrap();
        assert_eq!(
            records,
            vec![Record {
                id,
                image: sent.image,
                name: sent.name,
                timestamp: sent.timestamp,
            }]
        );
    }

    #[test]
    fn init_schema_twice_keeps_rows() {
        let mut conn = memory_conn();
        insert_record(&mut conn, "face_data", new_record("kept")).unwrap();
        init_schema(&mut conn, "face_data").unwrap();
        assert_eq!(count_records(&mut conn, "face_data").unwrap(), 1);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut conn = memory_conn();
        let first = insert_record(&mut conn, "face_data", new_record("a")).unwrap();
        diesel::sql_query("DELETE FROM face_data")
            .execute(&mut conn)
            .unwrap();
        let second = insert_record(&mut conn, "face_data", new_record("b")).unwrap();
        assert!(second > first);
    }

    #[test]
    fn ids_past_i32_range_are_kept() {
        let mut conn = memory_conn();
        diesel::sql_query(
            "INSERT INTO face_data (id, image, name, timestamp) VALUES (4294967296, x'00', 'a', 't')",
        )
        .execute(&mut conn)
        .unwrap();
        let id = insert_record(&mut conn, "face_data", new_record("b")).unwrap();
        assert_eq!(id, 4294967297);
        let ids: Vec<_> = list_records(&mut conn, "face_data")
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![4294967296, 4294967297]);
    }

    #[test]
    fn missing_table_is_a_storage_error() {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        let err = list_records(&mut conn, "face_data").unwrap_err();
        assert_eq!(err.kind(), "storage");
    }

    #[test]
    fn insert_waits_for_another_writer() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = StoreConfig::new(dir.path().join("database.sqlite3"), "face_data");
        let pool = build_pool(&cfg).unwrap();

        let mut holder = pool.get().unwrap();
        init_schema(&mut holder, "face_data").unwrap();
        holder.batch_execute("BEGIN IMMEDIATE").unwrap();

        let writer_pool = pool.clone();
        let writer = std::thread::spawn(move || {
            let mut conn = writer_pool.get().unwrap();
            insert_record(&mut conn, "face_data", new_record("waited"))
        });

        std::thread::sleep(std::time::Duration::from_millis(300));
        holder.batch_execute("COMMIT").unwrap();

        let id = writer.join().unwrap().unwrap();
        assert!(id > 0);
        assert_eq!(count_records(&mut holder, "face_data").unwrap(), 1);
    }

    #[test]
    fn build_pool_rejects_bad_table_name() {
        let cfg = StoreConfig::new(":memory:", "bad name");
        assert!(build_pool(&cfg).is_err());
    }
}
