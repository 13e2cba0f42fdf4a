//! Local holiday dataset on SQLite.
//!
//! Rows live in a single `holidays` table keyed by `(date, name, state)`.
//! National holidays use an empty `state` column so the key stays NOT NULL.
//!
//! ```no_run
//! use holiday_assistant::holidays::{HolidayProvider, SqliteHolidayStore};
//!
//! # fn demo() -> color_eyre::Result<()> {
//! let store = SqliteHolidayStore::open_or_create("holidays.sqlite")?;
//! store.seed_national(2024)?;
//! for h in store.get_holidays("SP", 2024, 12)? {
//!     println!("{h}");
//! }
//! # Ok(()) }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Duration, NaiveDate};
use color_eyre::eyre::{eyre, Result, WrapErr};
use rusqlite::{params, Connection};
use tracing::{debug, info, instrument};

use super::{Holiday, HolidayProvider};

/// Fixed-date national holidays in Brazil as `(month, day, name)`.
const FIXED_NATIONAL: &[(u32, u32, &str)] = &[
    (1, 1, "Confraternização Universal"),
    (4, 21, "Tiradentes"),
    (5, 1, "Dia do Trabalho"),
    (9, 7, "Independência do Brasil"),
    (10, 12, "Nossa Senhora Aparecida"),
    (11, 2, "Finados"),
    (11, 15, "Proclamação da República"),
    (11, 20, "Dia Nacional de Zumbi e da Consciência Negra"),
    (12, 25, "Natal"),
];

/// Gregorian Easter Sunday (anonymous Meeus/Jones/Butcher computation).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

pub struct SqliteHolidayStore {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteHolidayStore {
    /// Open the dataset, creating the file and schema if needed.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref().to_path_buf();
        let conn = Connection::open(&p).wrap_err_with(|| format!("opening holiday db {p:?}"))?;
        let store = Self { conn: Mutex::new(conn), path: p };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Non-persistent store, mostly for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn: Mutex::new(conn), path: PathBuf::from(":memory:") };
        store.ensure_schema()?;
        Ok(store)
    }

    fn ensure_schema(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS holidays (
                    date TEXT NOT NULL,
                    name TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    state TEXT NOT NULL DEFAULT '',
                    PRIMARY KEY (date, name, state)
                );
                CREATE INDEX IF NOT EXISTS idx_holidays_date ON holidays(date);
                "#,
            )?;
            Ok(())
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn.lock().map_err(|_| eyre!("holiday db lock poisoned"))?;
        f(&conn)
    }

    /// Insert or update one holiday.
    pub fn upsert(&self, holiday: &Holiday) -> Result<()> {
        let state = holiday.state.as_deref().map(str::to_uppercase).unwrap_or_default();
        let date = holiday.date.format("%Y-%m-%d").to_string();
        self.with_conn(|conn| {
            conn.execute(
                r#"INSERT INTO holidays(date, name, kind, state)
                   VALUES (?1, ?2, ?3, ?4)
                   ON CONFLICT(date, name, state) DO UPDATE SET kind = excluded.kind"#,
                params![date, holiday.name, holiday.kind, state],
            )?;
            Ok(())
        })?;
        debug!(target: "holidays", date = %holiday.date, name = %holiday.name, "upsert");
        Ok(())
    }

    /// Load a JSON array of holidays (`[{"date","name","type","state"?}]`). Returns the row count.
    pub fn import_json_file<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let text = fs::read_to_string(&path)
            .wrap_err_with(|| format!("reading holiday dataset {:?}", path.as_ref()))?;
        let rows: Vec<Holiday> = serde_json::from_str(&text)
            .wrap_err_with(|| format!("parsing holiday dataset {:?}", path.as_ref()))?;
        for row in &rows {
            self.upsert(row)?;
        }
        info!(target: "holidays", "imported {:?} ({} rows)", path.as_ref(), rows.len());
        Ok(rows.len())
    }

    /// Insert the national holidays of `year`: the fixed dates plus Sexta-feira Santa.
    /// Returns the row count.
    pub fn seed_national(&self, year: i32) -> Result<usize> {
        let mut count = 0;
        for (month, day, name) in FIXED_NATIONAL {
            let date = NaiveDate::from_ymd_opt(year, *month, *day)
                .ok_or_else(|| eyre!("invalid date {year}-{month}-{day}"))?;
            self.upsert(&Holiday::national(date, *name))?;
            count += 1;
        }
        let good_friday = easter_sunday(year)
            .ok_or_else(|| eyre!("no Easter date for {year}"))?
            - Duration::days(2);
        self.upsert(&Holiday::national(good_friday, "Sexta-feira Santa"))?;
        count += 1;
        info!(target: "holidays", year, count, "seeded national holidays");
        Ok(count)
    }

    /// Total number of rows.
    pub fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM holidays", [], |row| row.get(0))?;
            Ok(n as usize)
        })
    }

    pub fn db_file_path(&self) -> &Path {
        &self.path
    }

    fn query(&self, year: i32, month: u32, state: &str) -> Result<Vec<Holiday>> {
        let year_key = format!("{year:04}");
        let month_key = format!("{month:02}");
        let state_key = state.trim().to_uppercase();

        let raw: Vec<(String, String, String, String)> = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"SELECT date, name, kind, state FROM holidays
                   WHERE substr(date, 1, 4) = ?1 AND substr(date, 6, 2) = ?2
                     AND (state = '' OR state = ?3)
                   ORDER BY date ASC, name ASC"#,
            )?;
            let iter = stmt.query_map(params![year_key, month_key, state_key], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;
            let mut out = Vec::new();
            for r in iter {
                out.push(r?);
            }
            Ok(out)
        })?;

        raw.into_iter()
            .map(|(date, name, kind, state)| -> Result<Holiday> {
                let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                    .wrap_err_with(|| format!("corrupt date column {date:?}"))?;
                let state = if state.is_empty() { None } else { Some(state) };
                Ok(Holiday { date, name, kind, state })
            })
            .collect()
    }
}

impl HolidayProvider for SqliteHolidayStore {
    #[instrument(name = "local_get_holidays", skip(self))]
    fn get_holidays(&self, state: &str, year: i32, month: u32) -> Result<Vec<Holiday>> {
        if !(1..=12).contains(&month) {
            return Ok(Vec::new());
        }
        let rows = self.query(year, month, state)?;
        debug!(target: "holidays", found = rows.len(), "local lookup");
        Ok(rows)
    }
}
