//! Immutable, content-addressed parameter sets.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

/// A candidate point in parameter space.
///
/// Values are sorted by name so serialization and the content fingerprint
/// are deterministic. Parameter sets are immutable once built: any
/// historical result is reproducible from
/// `(code_version, parameter_hash, data_range)`.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct ParameterSet {
    /// Parameter values by name
    pub values: BTreeMap<String, f64>,
}

impl ParameterSet {
    /// Creates a parameter set from name/value pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, f64)]) -> Self {
        Self {
            values: pairs
                .iter()
                .map(|(name, value)| ((*name).to_string(), *value))
                .collect(),
        }
    }

    /// Returns the value for a parameter, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// SHA-256 of the canonical JSON serialization, hex-encoded.
    ///
    /// `BTreeMap` ordering makes the JSON canonical, so equal contents hash
    /// equal regardless of insertion order.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(&self.values).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_order_independent() {
        let mut a = ParameterSet::default();
        a.values.insert("alpha".to_string(), 0.5);
        a.values.insert("beta".to_string(), 2.0);

        let mut b = ParameterSet::default();
        b.values.insert("beta".to_string(), 2.0);
        b.values.insert("alpha".to_string(), 0.5);

        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let a = ParameterSet::from_pairs(&[("lookback", 20.0)]);
        let b = ParameterSet::from_pairs(&[("lookback", 21.0)]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_parameter_set_serde_roundtrip() {
        let params = ParameterSet::from_pairs(&[("lookback", 20.0), ("threshold", 0.02)]);
        let json = serde_json::to_string(&params).unwrap();
        let deserialized: ParameterSet = serde_json::from_str(&json).unwrap();
        assert_eq!(params, deserialized);
    }
}
