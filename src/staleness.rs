//! Modification-time bookkeeping.
//!
//! File timestamps are the only state that persists between runs. A missing
//! file has [`Timestamp::MISSING`], which sorts before every real time, so
//! "artifact older than its inputs" also covers "artifact never built".

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Option<SystemTime>);

impl Timestamp {
    pub const MISSING: Timestamp = Timestamp(None);

    pub fn at(time: SystemTime) -> Self {
        Timestamp(Some(time))
    }

    /// Modification time of `path`, or [`Timestamp::MISSING`]
    pub fn of(path: &Path) -> Self {
        fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map(Timestamp::at)
            .unwrap_or(Timestamp::MISSING)
    }

    pub fn is_missing(&self) -> bool {
        self.0.is_none()
    }

    /// Local wall-clock rendering for reports
    pub fn display(&self) -> String {
        match self.0 {
            Some(time) => {
                let local: DateTime<Local> = time.into();
                local.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
            }
            None => "never".to_string(),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(time) => {
                let utc: DateTime<chrono::Utc> = time.into();
                serializer.serialize_some(&utc.to_rfc3339())
            }
            None => serializer.serialize_none(),
        }
    }
}

/// Timestamp of the build engine itself.
///
/// Rebuilding the tool or editing its config invalidates every object, since
/// either can change how objects are produced.
pub fn engine_timestamp(config_path: Option<&Path>) -> Timestamp {
    let exe = std::env::current_exe()
        .map(|p| Timestamp::of(&p))
        .unwrap_or(Timestamp::MISSING);
    let config = config_path.map(Timestamp::of).unwrap_or(Timestamp::MISSING);
    exe.max(config)
}

/// Modification time of every header, keyed by unit path.
pub fn header_timestamps<'a>(
    root: &Path,
    headers: impl IntoIterator<Item = &'a String>,
) -> BTreeMap<String, Timestamp> {
    headers
        .into_iter()
        .map(|h| (h.clone(), Timestamp::of(&root.join(h))))
        .collect()
}

/// max(engine, the source itself, its local headers).
///
/// Only the headers reported for this unit count; headers of other units
/// are not followed.
pub fn source_timestamp(
    root: &Path,
    source: &str,
    local_includes: &[String],
    headers: &BTreeMap<String, Timestamp>,
    engine: Timestamp,
) -> Timestamp {
    local_includes
        .iter()
        .map(|h| headers.get(h).copied().unwrap_or(Timestamp::MISSING))
        .fold(engine.max(Timestamp::of(&root.join(source))), Timestamp::max)
}
