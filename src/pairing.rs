//! Pairs a freshly profiled table with a standard profile, producing the
//! per-column payloads a judgment service compares.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::profile::{Info, ProfileReport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentPayload {
    pub name: String,
    pub distribution: Info,
    pub sd_distribution: Info,
    /// Metric name carried by the standard profile, when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub payloads: Vec<JudgmentPayload>,
    /// Profiled columns with no counterpart in the standard profile.
    pub unmatched: Vec<String>,
}

pub fn pair_reports(profiled: &ProfileReport, standard: &ProfileReport) -> Pairing {
    let mut pairing = Pairing::default();
    for row in &profiled.rows {
        match standard.get(&row.column_name) {
            Some(expected) => pairing.payloads.push(JudgmentPayload {
                name: row.column_name.clone(),
                distribution: row.info.clone(),
                sd_distribution: expected.clone(),
                real_name: expected.real_name.clone(),
            }),
            None => {
                warn!(
                    "Column '{}' has no entry in the standard profile",
                    row.column_name
                );
                pairing.unmatched.push(row.column_name.clone());
            }
        }
    }
    info!(
        "Paired {} column(s); {} without a standard",
        pairing.payloads.len(),
        pairing.unmatched.len()
    );
    pairing
}
