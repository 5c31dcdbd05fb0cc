use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate};
use futures_util::future::join;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::logging::logger;

#[derive(Debug, Error)]
pub enum PrayerError {
    #[error("prayer api request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("prayer api returned {0}")]
    Status(StatusCode),
    #[error("invalid prayer api url: {0}")]
    BadUrl(#[from] url::ParseError),
}

#[derive(Debug, Clone)]
pub struct PrayerApiConfig {
    pub timings_base_url: String,
    pub geocode_base_url: String,
    /// Calculation method id passed straight to the timings API.
    pub method: u8,
    pub timeout: Duration,
}

impl Default for PrayerApiConfig {
    fn default() -> Self {
        Self {
            timings_base_url: "https://api.aladhan.com".to_string(),
            geocode_base_url: "https://api.bigdatacloud.net".to_string(),
            method: 2,
            timeout: Duration::from_secs(8),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrayerTimings {
    #[serde(rename = "Fajr")]
    pub fajr: String,
    #[serde(rename = "Sunrise")]
    pub sunrise: String,
    #[serde(rename = "Dhuhr")]
    pub dhuhr: String,
    #[serde(rename = "Asr")]
    pub asr: String,
    #[serde(rename = "Sunset")]
    pub sunset: String,
    #[serde(rename = "Maghrib")]
    pub maghrib: String,
    #[serde(rename = "Isha")]
    pub isha: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HijriMonth {
    pub en: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HijriWeekday {
    pub en: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HijriDate {
    pub date: String,
    pub month: HijriMonth,
    pub weekday: HijriWeekday,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrayerDate {
    pub readable: String,
    pub hijri: HijriDate,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrayerMeta {
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrayerData {
    pub timings: PrayerTimings,
    pub date: PrayerDate,
    pub meta: PrayerMeta,
}

#[derive(Debug, Deserialize)]
struct TimingsEnvelope {
    data: PrayerData,
}

#[derive(Debug, Deserialize)]
struct ReverseGeocodeResponse {
    city: Option<String>,
    locality: Option<String>,
    #[serde(rename = "countryName")]
    country_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locality {
    pub city: String,
    pub country: String,
}

/// Client for the two geolocation-keyed lookups the prayer screen needs.
/// Every failure is non-fatal; the shell surfaces a retry prompt.
#[derive(Clone)]
pub struct PrayerClient {
    config: PrayerApiConfig,
    client: Client,
}

impl PrayerClient {
    pub fn new(config: PrayerApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub async fn fetch_timings(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> Result<PrayerData, PrayerError> {
        let url = build_timings_url(
            &self.config.timings_base_url,
            latitude,
            longitude,
            date,
            self.config.method,
        )?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(PrayerError::Status(response.status()));
        }
        let envelope: TimingsEnvelope = response.json().await?;
        Ok(envelope.data)
    }

    pub async fn fetch_locality(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Locality, PrayerError> {
        let url = build_geocode_url(&self.config.geocode_base_url, latitude, longitude)?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(PrayerError::Status(response.status()));
        }
        let raw: ReverseGeocodeResponse = response.json().await?;
        Ok(locality_from(raw))
    }

    /// Both lookups at once, the way the screen loads. The locality is
    /// cosmetic, so its failure does not fail the pair.
    pub async fn fetch_day(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> Result<(PrayerData, Option<Locality>), PrayerError> {
        let (timings, locality) = join(
            self.fetch_timings(latitude, longitude, date),
            self.fetch_locality(latitude, longitude),
        )
        .await;
        let locality = match locality {
            Ok(value) => Some(value),
            Err(err) => {
                logger().warn(
                    "prayer.locality_failed",
                    json!({ "error": format!("{err}") }),
                );
                None
            }
        };
        Ok((timings?, locality))
    }
}

/// The local calendar date the timings are requested for.
pub fn current_date() -> NaiveDate {
    Local::now().date_naive()
}

fn build_timings_url(
    base_url: &str,
    latitude: f64,
    longitude: f64,
    date: NaiveDate,
    method: u8,
) -> Result<Url, PrayerError> {
    let mut url = Url::parse(base_url)?;
    // The API accepts unpadded day and month segments.
    url.set_path(&format!(
        "v1/timings/{}-{}-{}",
        date.day(),
        date.month(),
        date.year()
    ));
    url.query_pairs_mut()
        .append_pair("latitude", &latitude.to_string())
        .append_pair("longitude", &longitude.to_string())
        .append_pair("method", &method.to_string());
    Ok(url)
}

fn build_geocode_url(base_url: &str, latitude: f64, longitude: f64) -> Result<Url, PrayerError> {
    let mut url = Url::parse(base_url)?;
    url.set_path("data/reverse-geocode-client");
    url.query_pairs_mut()
        .append_pair("latitude", &latitude.to_string())
        .append_pair("longitude", &longitude.to_string())
        .append_pair("localityLanguage", "en");
    Ok(url)
}

fn locality_from(raw: ReverseGeocodeResponse) -> Locality {
    Locality {
        city: raw
            .city
            .filter(|value| !value.trim().is_empty())
            .or(raw.locality)
            .unwrap_or_else(|| "Unknown City".to_string()),
        country: raw
            .country_name
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "Unknown Country".to_string()),
    }
}
