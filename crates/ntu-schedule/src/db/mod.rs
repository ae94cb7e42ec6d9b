//! Database module for reading course schedule data

mod error;
mod types;

pub use error::StoreError;
pub use types::DbCourse;

use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, InterruptHandle, OptionalExtension};
use std::ops::Deref;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

use crate::schedule::{Course, Cursor, Direction, PageRequest, SearchFilter};

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_courses.sql");

/// Upper bound on pooled connections.
pub const MAX_POOL_SIZE: usize = 10;

/// Metadata key under which the ingestion job records its last run.
const UPDATE_TIME_KEY: &str = "data_update_time";

const COURSE_COLUMNS: &str = "object_id, id, name, instructor, room, time";

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Lets another thread abandon a store call.
///
/// While a call holds a connection, the connection's interrupt handle is
/// registered here and [`Cancellation::cancel`] aborts the running statement.
/// A call that is still waiting for a connection gives up once it gets one.
#[derive(Clone, Default)]
pub struct Cancellation {
    inner: Arc<CancelState>,
}

#[derive(Default)]
struct CancelState {
    cancelled: AtomicBool,
    handle: Mutex<Option<InterruptHandle>>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);

        let slot = self.inner.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.as_ref() {
            debug!("Interrupting store query");
            handle.interrupt();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    fn set_handle(&self, handle: Option<InterruptHandle>) {
        *self.inner.handle.lock().unwrap_or_else(PoisonError::into_inner) = handle;
    }
}

/// A pooled connection checked out on behalf of one cancellable call.
struct Checkout<'a> {
    conn: MutexGuard<'a, Connection>,
    cancel: &'a Cancellation,
}

impl Deref for Checkout<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for Checkout<'_> {
    fn drop(&mut self) {
        // Cleared while the connection is still locked
        self.cancel.set_handle(None);
    }
}

/// Read handle over the course store.
///
/// Holds a fixed set of connections; callers borrow whichever is idle. The
/// handle is built once at startup and shared by reference.
pub struct ScheduleDb {
    pool: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ScheduleDb {
    /// Opens `pool_size` connections to the database file and initializes the schema.
    pub fn open(path: &Path, pool_size: usize) -> Result<Self, StoreError> {
        let pool_size = pool_size.clamp(1, MAX_POOL_SIZE);

        let mut pool = Vec::with_capacity(pool_size);
        for i in 0..pool_size {
            let conn = Connection::open(path)?;
            conn.busy_timeout(Duration::from_secs(5))?;
            if i == 0 {
                conn.execute_batch(SCHEMA_SQL)?;
            }
            register_regexp(&conn)?;
            pool.push(Mutex::new(conn));
        }

        info!(path = %path.display(), pool_size, "Opened course store");

        Ok(Self {
            pool,
            next: AtomicUsize::new(0),
        })
    }

    /// Opens a private in-memory store with a single connection.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        register_regexp(&conn)?;

        Ok(Self {
            pool: vec![Mutex::new(conn)],
            next: AtomicUsize::new(0),
        })
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        for conn in &self.pool {
            if let Ok(guard) = conn.try_lock() {
                return Ok(guard);
            }
        }

        // Every connection is busy, queue on one of them
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.pool.len();
        self.pool[idx].lock().map_err(|_| StoreError::Transport {
            message: "connection lock poisoned".to_string(),
        })
    }

    fn checkout<'a>(&'a self, cancel: &'a Cancellation) -> Result<Checkout<'a>, StoreError> {
        let conn = self.connection()?;
        cancel.set_handle(Some(conn.get_interrupt_handle()));
        let checkout = Checkout { conn, cancel };

        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        Ok(checkout)
    }

    /// Fetches one batch of courses in store order.
    ///
    /// Backward requests come back in descending identifier order; the caller
    /// is responsible for putting them into display order.
    pub fn find_courses(
        &self,
        request: &PageRequest,
        cancel: &Cancellation,
    ) -> Result<Vec<Course>, StoreError> {
        let (mut sql, mut params) = filtered_select(COURSE_COLUMNS, &request.filter);

        match &request.cursor {
            Some(Cursor::After(id)) => {
                sql.push_str(" AND object_id > ?");
                params.push(Value::Text(id.clone()));
            }
            Some(Cursor::Before(id)) => {
                sql.push_str(" AND object_id < ?");
                params.push(Value::Text(id.clone()));
            }
            None => {}
        }

        let order = match request.direction() {
            Direction::Forward => "ASC",
            Direction::Backward => "DESC",
        };
        sql.push_str(&format!(" ORDER BY object_id {order} LIMIT ? OFFSET ?"));
        // A negative limit means no limit
        params.push(Value::Integer(request.max_num.map_or(-1, i64::from)));
        params.push(Value::Integer(i64::try_from(request.skip).unwrap_or(i64::MAX)));

        debug!(sql = %sql, "Finding courses");

        let db = self.checkout(cancel)?;
        let mut stmt = db.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), |row| {
                Ok(DbCourse {
                    object_id: row.get(0)?,
                    id: row.get(1)?,
                    name: row.get(2)?,
                    instructor: row.get(3)?,
                    room: row.get(4)?,
                    time: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|row| Course::try_from(row).map_err(StoreError::from))
            .collect()
    }

    /// Counts every course matching the filter.
    pub fn count_courses(
        &self,
        filter: &SearchFilter,
        cancel: &Cancellation,
    ) -> Result<u64, StoreError> {
        let (sql, params) = filtered_select("COUNT(*)", filter);

        let db = self.checkout(cancel)?;
        let count: i64 = db.query_row(&sql, params_from_iter(params), |row| row.get(0))?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Time of the last ingestion run, as recorded by the ingestion job.
    pub fn data_update_time(&self, cancel: &Cancellation) -> Result<Option<String>, StoreError> {
        let db = self.checkout(cancel)?;
        let value = db
            .query_row(
                "SELECT value FROM metadata WHERE type = ?",
                [UPDATE_TIME_KEY],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }
}

fn filtered_select(columns: &str, filter: &SearchFilter) -> (String, Vec<Value>) {
    let sql = format!(
        "SELECT {columns} FROM courses \
         WHERE id REGEXP ? AND name REGEXP ? AND instructor REGEXP ?"
    );
    let params = vec![
        Value::Text(filter.id_pattern()),
        Value::Text(filter.name_pattern()),
        Value::Text(filter.instructor_pattern()),
    ];

    (sql, params)
}

/// Backs SQLite's `X REGEXP Y` operator, which calls `regexp(Y, X)`.
fn register_regexp(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let regex: Arc<Regex> = ctx.get_or_create_aux(0, |vr| -> Result<_, BoxError> {
                Ok(Regex::new(vr.as_str()?)?)
            })?;
            let text = ctx
                .get_raw(1)
                .as_str()
                .map_err(|e| rusqlite::Error::UserFunctionError(e.into()))?;

            Ok(regex.is_match(text))
        },
    )
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    fn request(
        filter: SearchFilter,
        max_num: Option<u32>,
        skip: u64,
        cursor: Option<Cursor>,
    ) -> PageRequest {
        PageRequest {
            filter,
            max_num,
            skip,
            cursor,
        }
    }

    fn find(db: &ScheduleDb, request: &PageRequest) -> Result<Vec<Course>, StoreError> {
        db.find_courses(request, &Cancellation::new())
    }

    fn count(db: &ScheduleDb, filter: &SearchFilter) -> u64 {
        db.count_courses(filter, &Cancellation::new()).unwrap()
    }

    fn ids(courses: &[Course]) -> Vec<String> {
        courses.iter().map(|c| c.object_id.clone()).collect()
    }

    #[test]
    fn test_count_applies_dept_prefix() {
        let db = seeded_db();

        assert_eq!(count(&db, &SearchFilter::default()), 55);
        assert_eq!(count(&db, &SearchFilter::new("9020", "", "")), 45);
        assert_eq!(count(&db, &SearchFilter::new("901", "", "")), 10);
    }

    #[test]
    fn test_dept_filter_returns_only_prefix_matches() {
        let db = seeded_db();
        let filter = SearchFilter::new("9020", "", "");
        let courses = find(&db, &request(filter, None, 0, None)).unwrap();

        assert_eq!(courses.len(), 45);
        assert!(courses.iter().all(|c| c.id.starts_with("902")));
    }

    #[test]
    fn test_substring_filters() {
        let db = seeded_db();
        let filter = SearchFilter::new("", "課程 1", "王");
        let courses = find(&db, &request(filter.clone(), None, 0, None)).unwrap();

        // 課程 1, 10..19 with an even number
        assert!(!courses.is_empty());
        assert!(courses
            .iter()
            .all(|c| c.name.contains("課程 1") && c.instructor.contains('王')));
        assert_eq!(count(&db, &filter) as usize, courses.len());
    }

    #[test]
    fn test_forward_cursor_with_skip() {
        let db = seeded_db();
        let after = format!("{:024x}", 10);
        let cursor = Some(Cursor::After(after));
        let courses = find(&db, &request(SearchFilter::default(), Some(5), 5, cursor)).unwrap();

        let expected: Vec<String> = (16..=20).map(|n| format!("{n:024x}")).collect();
        assert_eq!(ids(&courses), expected);
    }

    #[test]
    fn test_backward_cursor_is_descending() {
        let db = seeded_db();
        let before = format!("{:024x}", 10);
        let cursor = Some(Cursor::Before(before));
        let courses = find(&db, &request(SearchFilter::default(), Some(3), 0, cursor)).unwrap();

        let expected: Vec<String> = [9, 8, 7].iter().map(|n| format!("{n:024x}")).collect();
        assert_eq!(ids(&courses), expected);
    }

    #[test]
    fn test_malformed_time_fails_validation() {
        let db = ScheduleDb::open_in_memory().unwrap();
        db.insert_course(&course(1, "902"));
        db.insert_raw(
            &format!("{:024x}", 2),
            "902 U0002 01",
            r#"[{"weeks": [], "day": 1, "start_time": "2", "end_time": "3"}]"#,
        );

        let err = find(&db, &request(SearchFilter::default(), None, 0, None)).unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[test]
    fn test_wrong_shape_fails_validation() {
        let db = ScheduleDb::open_in_memory().unwrap();
        db.insert_raw("a", "902 U0001 01", r#"{"weeks": 0}"#);

        let err = find(&db, &request(SearchFilter::default(), None, 0, None)).unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[test]
    fn test_update_time() {
        let db = ScheduleDb::open_in_memory().unwrap();
        let cancel = Cancellation::new();
        assert_eq!(db.data_update_time(&cancel).unwrap(), None);

        db.set_update_time("2024-09-01 12:30");
        assert_eq!(
            db.data_update_time(&cancel).unwrap().as_deref(),
            Some("2024-09-01 12:30")
        );
    }

    #[test]
    fn test_file_backed_pool_shares_data() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(ScheduleDb::open(&dir.path().join("courses.db"), 3).unwrap());
        assert_eq!(db.pool_size(), 3);

        for n in 1..=30 {
            db.insert_course(&course(n, "902"));
        }

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let db = Arc::clone(&db);
                std::thread::spawn(move || count(&db, &SearchFilter::new("902", "", "")))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 30);
        }
    }

    #[test]
    fn test_pool_size_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let db = ScheduleDb::open(&dir.path().join("courses.db"), 64).unwrap();
        assert_eq!(db.pool_size(), MAX_POOL_SIZE);
    }

    #[test]
    fn test_cancelled_call_skips_query() {
        let db = seeded_db();
        let cancel = Cancellation::new();
        cancel.cancel();

        let err = db.count_courses(&SearchFilter::default(), &cancel).unwrap_err();
        assert!(matches!(err, StoreError::Cancelled));

        // The connection went back to the pool untouched
        assert_eq!(count(&db, &SearchFilter::default()), 55);
    }

    #[test]
    fn test_cancel_interrupts_running_query() {
        let db = Arc::new(seeded_db());
        let cancel = Cancellation::new();

        let worker = {
            let db = Arc::clone(&db);
            let cancel = cancel.clone();
            std::thread::spawn(move || -> Result<i64, StoreError> {
                let conn = db.checkout(&cancel)?;
                let endless = "WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n) \
                               SELECT COUNT(*) FROM n";
                Ok(conn.query_row(endless, [], |row| row.get(0))?)
            })
        };

        // An interrupt sent before the statement starts is lost, so keep trying
        while !worker.is_finished() {
            cancel.cancel();
            std::thread::sleep(Duration::from_millis(10));
        }

        let result = worker.join().unwrap();
        assert!(result.is_err());
        assert_eq!(count(&db, &SearchFilter::default()), 55);
    }
}
