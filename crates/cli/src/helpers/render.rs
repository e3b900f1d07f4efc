// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use chrono::{DateTime, Utc};
use pmd_evm::{to_datetime, EventSummary, PatientAddedEvent, RegularStat, SubmitOutcome};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

fn date(timestamp: u64) -> String {
    to_datetime(timestamp)
        .map(|at: DateTime<Utc>| at.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

pub fn event_line(event: &PatientAddedEvent) -> String {
    let values: Vec<String> = event
        .return_values
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    format!(
        "#{:<8} {}  {}",
        event.block_number,
        date(event.timestamp),
        values.join(" ")
    )
}

/// Event count and the date range they cover
pub fn summary(summary: &EventSummary) -> String {
    let mut lines = vec![format!("Patients added: {}", summary.count())];
    if let (Some(first), Some(latest)) = (summary.first_timestamp(), summary.latest_timestamp) {
        lines.push(format!("From: {}", date(first)));
        lines.push(format!("To:   {}", date(latest)));
    }
    if let Some(days) = summary.elapsed_days {
        lines.push(format!("Days: {days:.2}"));
    }
    lines.join("\n")
}

pub fn events(summary: &EventSummary) -> String {
    summary
        .events
        .iter()
        .map(event_line)
        .chain(std::iter::once(self::summary(summary)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn submission(outcome: &SubmitOutcome) -> String {
    match outcome {
        SubmitOutcome::Submitted(tx_hash) => format!("Submitted {}", tx_hash),
        SubmitOutcome::Skipped => "No account connected, nothing was submitted".to_string(),
    }
}

pub fn stats(stat: &RegularStat) -> String {
    let death_rate = stat
        .death_rate
        .map(|rate| format!("{rate:.2}%"))
        .unwrap_or_default();
    let district = stat.district.clone().unwrap_or_default();
    format!(
        "{:<12} | {}\n{:<12} | {}",
        "Death rate", "District with highest patients", death_rate, district
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmd_evm::ReturnValues;

    fn event(block_number: u64, timestamp: u64) -> PatientAddedEvent {
        PatientAddedEvent {
            block_number,
            transaction_hash: None,
            return_values: ReturnValues::new(vec![
                ("age".to_string(), "45".to_string()),
                ("district".to_string(), "Dhaka".to_string()),
            ]),
            timestamp,
        }
    }

    #[test]
    fn test_event_line() {
        assert_eq!(
            event_line(&event(7, 86_400)),
            "#7        1970-01-02 00:00:00 UTC  age=45 district=Dhaka"
        );
    }

    #[test]
    fn test_submission() {
        let outcome = SubmitOutcome::Submitted(format!("0x{}", "ab".repeat(32)).parse().unwrap());
        assert_eq!(
            submission(&outcome),
            format!("Submitted 0x{}", "ab".repeat(32))
        );
        assert_eq!(
            submission(&SubmitOutcome::Skipped),
            "No account connected, nothing was submitted"
        );
    }

    #[test]
    fn test_empty_summary_has_no_range() {
        assert_eq!(summary(&EventSummary::default()), "Patients added: 0");
    }

    #[test]
    fn test_summary_range() {
        let summary = EventSummary {
            events: vec![event(1, 0), event(2, 43_200)],
            latest_timestamp: Some(129_600),
            elapsed_days: Some(1.5),
        };
        assert_eq!(
            self::summary(&summary),
            "Patients added: 2\n\
             From: 1970-01-01 00:00:00 UTC\n\
             To:   1970-01-02 12:00:00 UTC\n\
             Days: 1.50"
        );
    }

    #[test]
    fn test_stats_columns_may_be_empty() {
        let rendered = stats(&RegularStat {
            death_rate: Some(25.0),
            district: None,
        });
        assert_eq!(
            rendered,
            "Death rate   | District with highest patients\n25.00%       | "
        );
    }
}
