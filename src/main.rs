use std::env;
use std::sync::Arc;

use anyhow::Context;
use serde_json::json;

use radio_player_rs::config::ConfigStore;
use radio_player_rs::logging::init_logger;
use radio_player_rs::prayer::{current_date, PrayerApiConfig, PrayerClient};
use radio_player_rs::storage::FileStorage;
use radio_player_rs::streams::playable_candidates;
use radio_player_rs::transport::{select_transport, PlatformCapabilities};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = init_logger("radio-player-rs");

    let data_dir = env::var("RADIO_PLAYER_DATA_DIR").unwrap_or_else(|_| "./data".to_string());
    let store = ConfigStore::new(Arc::new(FileStorage::new(&data_dir)));
    let config = store.load();
    let candidates = playable_candidates(&config);

    match env::args().nth(1).as_deref() {
        Some("check-config") => {
            logger.info(
                "config.check_passed",
                serde_json::to_value(&config).unwrap_or_else(|_| json!({ "status": "ok" })),
            );
            let capabilities = PlatformCapabilities {
                adaptive_client: true,
                native_adaptive: false,
            };
            for candidate in &candidates {
                logger.info(
                    "config.candidate",
                    json!({
                        "id": candidate.id,
                        "title": candidate.title,
                        "transport": select_transport(&candidate.url, capabilities),
                    }),
                );
            }
            Ok(())
        }
        Some("prayer-times") => {
            let latitude: f64 = env::args()
                .nth(2)
                .context("usage: prayer-times <latitude> <longitude>")?
                .parse()
                .context("latitude must be a number")?;
            let longitude: f64 = env::args()
                .nth(3)
                .context("usage: prayer-times <latitude> <longitude>")?
                .parse()
                .context("longitude must be a number")?;

            let client = PrayerClient::new(PrayerApiConfig::default())
                .context("failed to build prayer client")?;
            let (data, locality) = client
                .fetch_day(latitude, longitude, current_date())
                .await
                .context("failed to fetch prayer times")?;
            logger.info(
                "prayer.timings",
                json!({
                    "readableDate": data.date.readable,
                    "hijriDate": data.date.hijri.date,
                    "timezone": data.meta.timezone,
                    "fajr": data.timings.fajr,
                    "dhuhr": data.timings.dhuhr,
                    "asr": data.timings.asr,
                    "maghrib": data.timings.maghrib,
                    "isha": data.timings.isha,
                    "locality": locality.map(|l| format!("{}, {}", l.city, l.country)),
                }),
            );
            Ok(())
        }
        _ => {
            logger.info(
                "player.configured",
                json!({
                    "radioName": config.radio_name,
                    "dataDir": data_dir,
                    "candidateCount": candidates.len(),
                }),
            );
            Ok(())
        }
    }
}
