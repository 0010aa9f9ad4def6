//! Batch fingerprinting and change detection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::BatchItem;

const DELIMITER: &str = ",";

/// Opaque digest of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Returns the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which parts of a batch contribute to its fingerprint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintMode {
    /// Only the set of item identifiers. Metadata-only changes go unnoticed.
    #[default]
    Identifiers,
    /// Identifiers plus each item's metadata.
    Content,
}

/// Outcome of comparing a batch with the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDetection {
    /// True if the batch differs from the previous one (or there was none).
    pub changed: bool,
    /// The fingerprint of the batch.
    pub fingerprint: Fingerprint,
}

/// Computes batch fingerprints and compares them with the last seen one.
///
/// The detector holds no state. Storing the new fingerprint is left to the
/// caller, which does it once per changed batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeDetector {
    mode: FingerprintMode,
}

impl ChangeDetector {
    /// Creates a detector using the given fingerprint mode.
    pub fn new(mode: FingerprintMode) -> Self {
        Self { mode }
    }

    /// Computes the fingerprint of a batch.
    pub fn fingerprint(&self, items: &[BatchItem]) -> Fingerprint {
        let mut keys: Vec<String> = items
            .iter()
            .filter_map(|item| {
                let id = item.id()?;
                Some(match self.mode {
                    FingerprintMode::Identifiers => id.to_string(),
                    FingerprintMode::Content => content_key(id, item),
                })
            })
            .collect();
        keys.sort_unstable();
        keys.dedup();

        Fingerprint(format!("{:x}", md5::compute(keys.join(DELIMITER))))
    }

    /// Compares a batch against the previous fingerprint of its region.
    pub fn detect_change(
        &self,
        previous: Option<&Fingerprint>,
        items: &[BatchItem],
    ) -> ChangeDetection {
        let fingerprint = self.fingerprint(items);
        let changed = previous != Some(&fingerprint);
        ChangeDetection { changed, fingerprint }
    }
}

fn content_key(id: &str, item: &BatchItem) -> String {
    // serde_json maps are ordered by key, so this rendering is canonical.
    let metadata = serde_json::json!({
        "name": item.display_name,
        "icon": item.display_icon,
        "extra": item.metadata,
    });
    format!("{id}|{metadata}")
}
