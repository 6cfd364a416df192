use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    fetch::{Fetcher, FetchError, build_url},
    model::{BikeTotals, GroupTotals},
};

const ACCEPT_JSON: (&str, &str) = ("Accept", "application/json");

/// Primary dock IDs on campus.
pub const CAMPUS_PRIMARY_IDS: [&str; 10] = [
    "14743", "5770", "5769", "3151", "4223", "3150", "16774", "5778", "5776", "6832",
];

/// Primary dock IDs around the nearest train station.
pub const STATION_PRIMARY_IDS: [&str; 5] = ["6504", "6503", "7060", "6502", "23069"];

/// Source of aggregate bike-share availability.
#[async_trait]
pub trait BikeGateway: Send + Sync {
    async fn bike_totals(&self) -> Result<BikeTotals>;
}

/// GBFS client for the Hello Cycling feeds.
#[derive(Debug, Clone)]
pub struct GbfsClient {
    fetcher: Fetcher,
    information_url: String,
    status_url: String,
}

impl GbfsClient {
    pub fn new(fetcher: Fetcher, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');

        Self {
            fetcher,
            information_url: format!("{base}/station_information.json"),
            status_url: format!("{base}/station_status.json"),
        }
    }

    async fn fetch_information(&self) -> Result<StationInformation, FetchError> {
        let url = build_url(&self.information_url, &[])?;
        self.fetcher.get_json(url, &[ACCEPT_JSON]).await
    }

    async fn fetch_status(&self) -> Result<StationStatus, FetchError> {
        let url = build_url(&self.status_url, &[])?;
        self.fetcher.get_json(url, &[ACCEPT_JSON]).await
    }
}

#[async_trait]
impl BikeGateway for GbfsClient {
    async fn bike_totals(&self) -> Result<BikeTotals> {
        let (information, status) =
            tokio::try_join!(self.fetch_information(), self.fetch_status())?;

        Ok(compute_totals(&information, &status))
    }
}

#[derive(Debug, Deserialize)]
struct StationInformation {
    data: InformationData,
}

#[derive(Debug, Deserialize)]
struct InformationData {
    stations: Vec<InformationStation>,
}

#[derive(Debug, Deserialize)]
struct InformationStation {
    station_id: String,
    #[serde(default)]
    capacity: i64,
}

#[derive(Debug, Deserialize)]
struct StationStatus {
    data: StatusData,
}

#[derive(Debug, Deserialize)]
struct StatusData {
    stations: Vec<StatusStation>,
}

#[derive(Debug, Deserialize)]
struct StatusStation {
    station_id: String,
    #[serde(default)]
    num_bikes_available: i64,
    num_docks_available: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
struct StationRecord {
    bikes: i64,
    docks: Option<i64>,
}

/// Aggregate feed data into per-group totals over the primary dock IDs.
fn compute_totals(information: &StationInformation, status: &StationStatus) -> BikeTotals {
    let capacity_by_id: HashMap<&str, i64> = information
        .data
        .stations
        .iter()
        .map(|station| (station.station_id.as_str(), station.capacity))
        .collect();

    let record_by_id: HashMap<&str, StationRecord> = status
        .data
        .stations
        .iter()
        .map(|station| {
            let record = StationRecord {
                bikes: station.num_bikes_available,
                docks: station.num_docks_available,
            };
            (station.station_id.as_str(), record)
        })
        .collect();

    BikeTotals {
        station: group_totals(&STATION_PRIMARY_IDS, &capacity_by_id, &record_by_id),
        campus: group_totals(&CAMPUS_PRIMARY_IDS, &capacity_by_id, &record_by_id),
    }
}

fn group_totals(
    ids: &[&str],
    capacity_by_id: &HashMap<&str, i64>,
    record_by_id: &HashMap<&str, StationRecord>,
) -> GroupTotals {
    let mut totals = GroupTotals::default();

    for id in ids {
        let Some(record) = record_by_id.get(id) else {
            tracing::debug!(station_id = %id, "dock absent from status feed");
            continue;
        };
        let capacity = capacity_by_id.get(id).copied().unwrap_or(0);

        totals.rentable += rentable_count(record);
        totals.returnable += returnable_count(record, capacity);
    }

    totals
}

fn rentable_count(record: &StationRecord) -> u32 {
    record.bikes.max(0) as u32
}

fn returnable_count(record: &StationRecord, capacity: i64) -> u32 {
    match record.docks {
        Some(docks) => docks.max(0) as u32,
        // Older feeds omit dock counts; free slots derive from capacity.
        None => (capacity - record.bikes).max(0) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn information(entries: &[(&str, i64)]) -> StationInformation {
        StationInformation {
            data: InformationData {
                stations: entries
                    .iter()
                    .map(|&(id, capacity)| InformationStation {
                        station_id: id.to_string(),
                        capacity,
                    })
                    .collect(),
            },
        }
    }

    fn status(entries: &[(&str, i64, Option<i64>)]) -> StationStatus {
        StationStatus {
            data: StatusData {
                stations: entries
                    .iter()
                    .map(|&(id, bikes, docks)| StatusStation {
                        station_id: id.to_string(),
                        num_bikes_available: bikes,
                        num_docks_available: docks,
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn negative_bike_counts_clamp_to_zero() {
        let record = StationRecord { bikes: -3, docks: Some(4) };

        assert_eq!(rentable_count(&record), 0);
        assert_eq!(returnable_count(&record, 10), 4);
    }

    #[test]
    fn negative_dock_counts_clamp_to_zero() {
        let record = StationRecord { bikes: 2, docks: Some(-1) };

        assert_eq!(returnable_count(&record, 10), 0);
    }

    #[test]
    fn missing_docks_fall_back_to_capacity() {
        let record = StationRecord { bikes: 5, docks: None };

        assert_eq!(returnable_count(&record, 20), 15);
    }

    #[test]
    fn capacity_fallback_floors_at_zero() {
        let record = StationRecord { bikes: 8, docks: None };

        assert_eq!(returnable_count(&record, 5), 0);
    }

    #[test]
    fn totals_sum_only_group_members() {
        let info = information(&[("6504", 10), ("14743", 12), ("99999", 50)]);
        let stat = status(&[
            ("6504", 3, Some(7)),
            ("14743", 5, None),
            ("99999", 40, Some(10)),
        ]);

        let totals = compute_totals(&info, &stat);

        assert_eq!(totals.station, GroupTotals { rentable: 3, returnable: 7 });
        assert_eq!(totals.campus, GroupTotals { rentable: 5, returnable: 7 });
    }

    #[test]
    fn docks_missing_from_status_count_as_zero() {
        let info = information(&[("6504", 10)]);
        let stat = status(&[("6504", 3, Some(7))]);

        let totals = compute_totals(&info, &stat);

        // Only one of the five station-group docks reported in.
        assert_eq!(totals.station, GroupTotals { rentable: 3, returnable: 7 });
        assert_eq!(totals.campus, GroupTotals::default());
    }

    #[test]
    fn feed_payloads_parse_with_partial_fields() {
        let info_body = r#"{
            "last_updated": 1700000000,
            "ttl": 60,
            "data": {"stations": [
                {"station_id": "6504", "name": "North Exit", "capacity": 12},
                {"station_id": "6503", "name": "South Exit"}
            ]}
        }"#;
        let status_body = r#"{
            "data": {"stations": [
                {"station_id": "6504", "num_bikes_available": 4, "num_docks_available": 8},
                {"station_id": "6503", "num_bikes_available": 2}
            ]}
        }"#;

        let info: StationInformation = serde_json::from_str(info_body).expect("info must parse");
        let stat: StationStatus = serde_json::from_str(status_body).expect("status must parse");

        let totals = compute_totals(&info, &stat);

        // 6503 has no capacity record, so its free-slot estimate bottoms out.
        assert_eq!(totals.station, GroupTotals { rentable: 6, returnable: 8 });
    }

    #[test]
    fn totals_are_stable_across_repeated_computation() {
        let info = information(&[("6504", 10), ("14743", 12)]);
        let stat = status(&[("6504", 3, Some(7)), ("14743", 5, None)]);

        assert_eq!(compute_totals(&info, &stat), compute_totals(&info, &stat));
    }

    #[test]
    fn primary_id_registries_are_sane() {
        let mut all: Vec<&str> = CAMPUS_PRIMARY_IDS
            .iter()
            .chain(STATION_PRIMARY_IDS.iter())
            .copied()
            .collect();

        assert!(!CAMPUS_PRIMARY_IDS.is_empty());
        assert!(!STATION_PRIMARY_IDS.is_empty());
        for id in &all {
            assert!(id.chars().all(|c| c.is_ascii_digit()), "non-numeric id {id}");
        }

        all.sort_unstable();
        all.dedup();
        assert_eq!(
            all.len(),
            CAMPUS_PRIMARY_IDS.len() + STATION_PRIMARY_IDS.len(),
            "groups must not share ids"
        );
    }

    #[test]
    fn client_builds_feed_urls_from_base() {
        let fetcher = Fetcher::new(std::time::Duration::from_secs(1)).expect("client must build");
        let client = GbfsClient::new(fetcher, "https://gbfs.test/hellocycling/");

        assert_eq!(
            client.information_url,
            "https://gbfs.test/hellocycling/station_information.json"
        );
        assert_eq!(
            client.status_url,
            "https://gbfs.test/hellocycling/station_status.json"
        );
    }
}
