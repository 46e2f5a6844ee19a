//! Time rounding and the export payload sent to the issue tracker.
//!
//! Everything here is pure: no I/O, no clock reads.

use crate::core::{Result, WorklogError};
use crate::model::WorklogRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::Serialize;
use std::fmt::Display;

/// Reporting increment accepted by the tracker, in minutes.
pub const DEFAULT_INCREMENT: u32 = 30;

/// Timestamp grammar of the tracker's worklog API, e.g. `2026-03-02T09:00:00.000+0100`.
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000%z";

/// Ceiling of `minutes` to the next multiple of 30. Never rounds down.
pub fn round_up_to_increment(minutes: u32) -> u32 {
    round_up_with(minutes, DEFAULT_INCREMENT)
}

/// Ceiling of `minutes` to the next multiple of `increment`.
///
/// Zero stays zero; an increment of zero leaves the value as is.
pub fn round_up_with(minutes: u32, increment: u32) -> u32 {
    if minutes == 0 || increment == 0 {
        return minutes;
    }
    minutes.div_ceil(increment).saturating_mul(increment)
}

pub fn format_export_timestamp<Tz>(instant: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    instant.format(EXPORT_TIMESTAMP_FORMAT).to_string()
}

/// Combines a record's `YYYY-MM-DD` date and `HH:MM[:SS]` start time into an
/// instant in `tz`. The offset is resolved for that date, so daylight saving
/// applies per record; a repeated wall-clock time takes the earlier instant.
pub fn started_at<Tz: TimeZone>(date: &str, start_time: &str, tz: &Tz) -> Result<DateTime<Tz>> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| WorklogError::InvalidInput(format!("date '{}': {}", date, e)))?;
    let time = NaiveTime::parse_from_str(start_time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(start_time, "%H:%M"))
        .map_err(|e| WorklogError::InvalidInput(format!("start time '{}': {}", start_time, e)))?;

    tz.from_local_datetime(&NaiveDateTime::new(day, time))
        .earliest()
        .ok_or_else(|| WorklogError::InvalidInput(format!("no instant for {} {}", date, start_time)))
}

/// Comment sent with the worklog: the description, or a generated line when blank.
pub fn export_comment(record: &WorklogRecord) -> String {
    let description = record.description.trim();
    if !description.is_empty() {
        return description.to_string();
    }

    let hours = f64::from(record.duration_minutes) / 60.0;
    match record.external_key.as_deref() {
        Some(key) => format!("Work on {} ({:.1}h)", key, hours),
        None => format!("Work ({:.1}h)", hours),
    }
}

/// Arguments of one export call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub external_key: String,
    pub started: String,
    pub time_spent_seconds: u64,
    pub comment: String,
}

impl ExportRequest {
    /// Builds the request for `record`, refusing records that cannot be exported.
    pub fn for_record<Tz>(record: &WorklogRecord, tz: &Tz) -> Result<Self>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let external_key = match record.external_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => {
                return Err(WorklogError::InvalidInput(format!(
                    "worklog '{}' has no external key",
                    record.id
                )));
            }
        };
        if record.duration_minutes == 0 {
            return Err(WorklogError::InvalidInput(format!(
                "worklog '{}' has no tracked time",
                record.id
            )));
        }

        let started = started_at(&record.date, &record.start_time, tz)?;
        Ok(Self {
            external_key,
            started: format_export_timestamp(&started),
            time_spent_seconds: u64::from(round_up_to_increment(record.duration_minutes)) * 60,
            comment: export_comment(record),
        })
    }
}
