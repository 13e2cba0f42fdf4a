//! Remote holiday lookup against a BrasilAPI-compatible service.
//!
//! `GET {base}/api/feriados/v1/{year}` returns the national holidays of a year.
//! Responses are cached per year for the lifetime of the service.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Datelike;
use color_eyre::eyre::{eyre, Result, WrapErr};
use reqwest::blocking::Client;
use tracing::{debug, instrument};

use super::{Holiday, HolidayProvider};
use crate::blocking::outside_runtime;

pub struct RemoteHolidayService {
    client: Client,
    base_url: String,
    cache: Mutex<HashMap<i32, Vec<Holiday>>>,
}

impl RemoteHolidayService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = outside_runtime(|| {
            Client::builder()
                .user_agent(concat!("holiday_assistant/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()
                .wrap_err("building reqwest client for holiday service")
        })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn fetch_year(&self, year: i32) -> Result<Vec<Holiday>> {
        if let Some(hit) = self.cache.lock().map_err(|_| eyre!("holiday cache lock poisoned"))?.get(&year) {
            return Ok(hit.clone());
        }

        let url = format!("{}/api/feriados/v1/{year}", self.base_url);
        let (status, text) = outside_runtime(|| {
            let resp = self
                .client
                .get(&url)
                .send()
                .wrap_err_with(|| format!("requesting {url}"))?;
            let status = resp.status();
            Ok((status, resp.text().unwrap_or_default()))
        })?;
        debug!(target: "holidays", status = %status, len = text.len(), "holiday_service_response_raw");

        if !status.is_success() {
            return Err(eyre!("status {}: {}", status.as_u16(), text));
        }

        let rows: Vec<Holiday> =
            serde_json::from_str(&text).wrap_err("decoding holiday service response")?;
        self.cache
            .lock()
            .map_err(|_| eyre!("holiday cache lock poisoned"))?
            .insert(year, rows.clone());
        Ok(rows)
    }
}

impl HolidayProvider for RemoteHolidayService {
    /// The service only publishes national holidays, so `state` does not narrow the result.
    #[instrument(name = "remote_get_holidays", skip(self))]
    fn get_holidays(&self, state: &str, year: i32, month: u32) -> Result<Vec<Holiday>> {
        if !(1..=12).contains(&month) {
            return Ok(Vec::new());
        }
        let rows: Vec<Holiday> = self
            .fetch_year(year)?
            .into_iter()
            .filter(|h| h.date.month() == month)
            .collect();
        debug!(target: "holidays", found = rows.len(), "remote lookup");
        Ok(rows)
    }
}
