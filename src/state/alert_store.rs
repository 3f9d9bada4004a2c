use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::AlertState;

/// What was found in the backing file.
#[derive(Debug)]
enum Snapshot {
    /// One raw record per asset name.
    Records(Map<String, Value>),
    /// No file yet: first run.
    Missing,
    /// File exists but is not a JSON object.
    Corrupt(String),
}

/// Per-asset alert latches in a single JSON file:
///
/// ```json
/// { "ETH": { "last_high_alert": false, "last_low_alert": true, "last_price": 0.17 } }
/// ```
///
/// Every save is a read-modify-write of the whole collection so one asset's
/// save never drops another asset's record. Not safe for overlapping
/// processes; runs are expected to be sequential.
pub struct AlertStore {
    path: PathBuf,
}

impl AlertStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// State for `asset`, or the all-clear default when there is no usable
    /// record. A missing or corrupt file is not an error; failing to read an
    /// existing file is.
    pub fn load(&self, asset: &str) -> Result<AlertState> {
        let records = match self.read_snapshot()? {
            Snapshot::Records(records) => records,
            Snapshot::Missing => return Ok(AlertState::default()),
            Snapshot::Corrupt(reason) => {
                warn!(path = %self.path.display(), "State file is corrupt, using defaults: {reason}");
                return Ok(AlertState::default());
            }
        };

        let Some(raw) = records.get(asset) else {
            return Ok(AlertState::default());
        };
        match serde_json::from_value::<AlertState>(raw.clone()) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(asset, "State record is malformed, using defaults: {e}");
                Ok(AlertState::default())
            }
        }
    }

    /// Replace `asset`'s record, leaving every other record as it was.
    pub fn save(&self, asset: &str, state: AlertState) -> Result<()> {
        let mut records = match self.read_snapshot()? {
            Snapshot::Records(records) => records,
            Snapshot::Missing => Map::new(),
            Snapshot::Corrupt(reason) => {
                warn!(path = %self.path.display(), "Overwriting corrupt state file: {reason}");
                Map::new()
            }
        };

        records.insert(asset.to_string(), serde_json::to_value(state)?);
        let body = serde_json::to_vec_pretty(&Value::Object(records))?;

        // Write beside the target then rename, so readers never see a torn file.
        let tmp = self.tmp_path();
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;

        debug!(asset, path = %self.path.display(), "Saved alert state");
        Ok(())
    }

    fn read_snapshot(&self) -> Result<Snapshot> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Snapshot::Missing),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(records)) => Ok(Snapshot::Records(records)),
            Ok(other) => Ok(Snapshot::Corrupt(format!(
                "expected an object keyed by asset, found {}",
                json_kind(&other)
            ))),
            Err(e) => Ok(Snapshot::Corrupt(e.to_string())),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "alert_state".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
