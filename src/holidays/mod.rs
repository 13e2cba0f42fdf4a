//! Holiday data sources behind the `get_holidays` tool.
//!
//! Two interchangeable providers implement [`HolidayProvider`]:
//! - [`SqliteHolidayStore`]: local dataset stored with `rusqlite`
//! - [`RemoteHolidayService`]: BrasilAPI-compatible HTTP service

mod local;
mod remote;

use std::fmt::{self, Display};

use chrono::NaiveDate;
use color_eyre::Result;
use serde::{Deserialize, Serialize};

pub use local::SqliteHolidayStore;
pub use remote::RemoteHolidayService;

/// One holiday entry. `state` is `None` for national holidays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub state: Option<String>,
}

fn default_kind() -> String {
    "national".to_string()
}

impl Holiday {
    pub fn national(date: NaiveDate, name: impl Into<String>) -> Self {
        Self { date, name: name.into(), kind: default_kind(), state: None }
    }

    pub fn regional(date: NaiveDate, name: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
            kind: "state".to_string(),
            state: Some(state.into().to_uppercase()),
        }
    }
}

impl Display for Holiday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.date.format("%d/%m/%Y"), self.name)?;
        if let Some(state) = &self.state {
            write!(f, " ({state})")?;
        }
        Ok(())
    }
}

/// Lookup contract for the holiday tool.
///
/// Implementations return an empty list when nothing matches (including
/// months outside 1..=12); `Err` is reserved for I/O and transport failures.
pub trait HolidayProvider: Send + Sync {
    fn get_holidays(&self, state: &str, year: i32, month: u32) -> Result<Vec<Holiday>>;
}
