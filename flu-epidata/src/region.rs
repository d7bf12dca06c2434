use crate::error::Result;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

/// Embedded CSV data for the national aggregate and the ten HHS regions.
pub static CSV_OBJECT: &str = include_str!("../../fixtures/regions.csv");

/// Region identifier of the national aggregate.
pub const NATIONAL_ID: &str = "nat";

/// A surveillance region with the identifiers used by the API and the dashboard.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// Epidata API region name, e.g. "hhs1"
    pub id: String,
    /// Concise identifier used in submissions, e.g. "HHS Region 1"
    pub sub_id: String,
    /// Display name
    pub region: String,
    /// Postal codes of the member states
    pub states: Vec<String>,
}

impl Region {
    pub fn is_national(&self) -> bool {
        self.id == NATIONAL_ID
    }

    /// Get region vector from the embedded CSV.
    pub fn get_region_vector() -> Result<Vec<Region>> {
        Region::parse_region_csv(CSV_OBJECT)
    }

    /// API identifiers of the given regions, in order.
    pub fn identifiers(regions: &[Region]) -> Vec<String> {
        regions.iter().map(|r| r.id.clone()).collect()
    }

    /// Parse a CSV string of region data into a vector of Regions.
    ///
    /// Expected CSV columns: id, sub_id, region, states (space separated)
    pub fn parse_region_csv(csv_object: &str) -> Result<Vec<Region>> {
        let mut region_list: Vec<Region> = Vec::new();
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_object.as_bytes());
        for row in rdr.records() {
            let record = row?;
            let field = |idx: usize| record.get(idx).unwrap_or_default().trim().to_string();
            let states = record
                .get(3)
                .unwrap_or_default()
                .split_whitespace()
                .map(String::from)
                .collect();
            region_list.push(Region {
                id: field(0),
                sub_id: field(1),
                region: field(2),
                states,
            });
        }
        Ok(region_list)
    }
}
