// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::events::PatientAddedEvent;
use pmd_config::StatsConfig;
use std::collections::BTreeMap;

/// One row of the statistics table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegularStat {
    /// Percentage of patients flagged deceased
    pub death_rate: Option<f64>,
    /// District with the most patients
    pub district: Option<String>,
}

impl RegularStat {
    /// Aggregate over the events carrying the configured fields. A column stays empty when no
    /// event carries its field.
    pub fn from_events(events: &[PatientAddedEvent], config: &StatsConfig) -> Self {
        let mut districts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut flagged = 0usize;
        let mut deceased = 0usize;

        for event in events {
            if let Some(district) = event.return_values.get(&config.district_field) {
                *districts.entry(district).or_default() += 1;
            }
            if let Some(is_dead) = event.return_values.get(&config.deceased_field) {
                flagged += 1;
                if is_dead.eq_ignore_ascii_case("true") {
                    deceased += 1;
                }
            }
        }

        let death_rate = (flagged > 0).then(|| deceased as f64 * 100.0 / flagged as f64);

        // BTreeMap iterates in key order so ties go to the lexicographically first district
        let district = districts
            .into_iter()
            .fold(None, |best: Option<(&str, usize)>, (name, count)| match best {
                Some((_, top)) if top >= count => best,
                _ => Some((name, count)),
            })
            .map(|(name, _)| name.to_string());

        Self {
            death_rate,
            district,
        }
    }
}
