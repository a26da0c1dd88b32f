//! Feed records and time-window filtering
//!
//! The remote API returns `{ "data": [ { "created_time": ..., ... }, ... ] }`
//! with records ordered newest-first. Records are kept as the JSON the API sent
//! so they can be handed back to callers unchanged.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A single media record from the feed
///
/// Only `created_time` is interpreted; every other field is carried verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRecord {
    /// Unix timestamp the record was created at, if it could be parsed
    created_time: Option<i64>,
    /// The record exactly as received
    raw: Value,
}

impl FeedRecord {
    /// Wraps a raw JSON record, extracting its creation time
    ///
    /// `created_time` may be an integer or a numeric string; anything else
    /// leaves the creation time unknown.
    pub fn from_value(raw: Value) -> Self {
        let created_time = raw.get("created_time").and_then(parse_timestamp);
        Self { created_time, raw }
    }

    pub fn created_time(&self) -> Option<i64> {
        self.created_time
    }

    /// Returns the record as received from the API
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// True if the record was created strictly after `threshold`
    ///
    /// A record without a usable creation time is never newer.
    pub fn is_newer_than(&self, threshold: i64) -> bool {
        self.created_time.is_some_and(|t| t > threshold)
    }
}

impl Serialize for FeedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FeedRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(FeedRecord::from_value)
    }
}

/// Parses a timestamp given either as a JSON number or a numeric string
///
/// Fractional seconds are rounded up, so `t > threshold` for an integer
/// threshold gives the same answer as comparing the exact value.
fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_seconds)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_seconds))
        }
        _ => None,
    }
}

fn whole_seconds(secs: f64) -> Option<i64> {
    secs.is_finite().then(|| secs.ceil() as i64)
}

/// Top-level shape of the API response
#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    data: Option<Vec<FeedRecord>>,
}

/// Outcome of filtering the cached feed
#[derive(Debug, Clone, PartialEq)]
pub enum FilterResult {
    /// Records newer than the threshold, newest-first
    Records(Vec<FeedRecord>),
    /// The feed parsed but no record is newer than the threshold
    NoResults,
    /// Nothing usable is cached: the blob is missing, not JSON, or lacks `data`
    NoData,
}

impl FilterResult {
    /// True for both `NoResults` and `NoData`
    pub fn is_empty(&self) -> bool {
        !matches!(self, FilterResult::Records(_))
    }

    pub fn records(&self) -> &[FeedRecord] {
        match self {
            FilterResult::Records(records) => records,
            _ => &[],
        }
    }
}

/// Parses a raw API response into its records
///
/// Returns `None` if the payload is not JSON or has no `data` array.
pub fn parse_feed(payload: &[u8]) -> Option<Vec<FeedRecord>> {
    serde_json::from_slice::<FeedEnvelope>(payload)
        .ok()
        .and_then(|envelope| envelope.data)
}

/// Returns true if the payload looks like a feed response
///
/// Used as the validation hook before a fetched payload replaces the cache.
pub fn has_feed_shape(payload: &[u8]) -> bool {
    parse_feed(payload).is_some()
}

/// Keeps the leading records created strictly after `threshold`
///
/// Records are assumed newest-first: iteration stops at the first record that
/// is not newer, and anything after it is dropped even if it would match.
pub fn filter_by_time<I>(records: I, threshold: i64) -> FilterResult
where
    I: IntoIterator<Item = FeedRecord>,
{
    let kept: Vec<FeedRecord> = records
        .into_iter()
        .take_while(|record| record.is_newer_than(threshold))
        .collect();

    if kept.is_empty() {
        FilterResult::NoResults
    } else {
        FilterResult::Records(kept)
    }
}

/// Parses a raw payload and filters its records by `threshold`
pub fn filter_payload(payload: &[u8], threshold: i64) -> FilterResult {
    match parse_feed(payload) {
        Some(records) => filter_by_time(records, threshold),
        None => FilterResult::NoData,
    }
}
