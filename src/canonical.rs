//! Order-independent representation of a request and its content identity.
//!
//! The canonical form holds every non-empty request field under a sorted key
//! with list values sorted, so the same logical request serializes to the same
//! bytes in every run. The fingerprint is the SHA-256 of those bytes. The
//! output target never enters the canonical form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::domain::{FORMAT, Fingerprint, PRODUCT_TYPE};
use crate::error::Era5Error;
use crate::request::RequestSpec;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalForm(BTreeMap<String, Value>);

impl CanonicalForm {
    pub fn from_spec(spec: &RequestSpec) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("format".to_string(), Value::from(FORMAT));
        fields.insert("product_type".to_string(), Value::from(PRODUCT_TYPE));
        // Bounds are positional (N, W, S, E) and stay unsorted.
        fields.insert(
            "area".to_string(),
            Value::from(spec.area().as_array().to_vec()),
        );
        insert_sorted(&mut fields, "variable", Some(spec.variable()));
        insert_sorted(&mut fields, "year", Some(spec.year()));
        insert_sorted(&mut fields, "month", Some(spec.month()));
        insert_sorted(&mut fields, "day", spec.day());
        insert_sorted(&mut fields, "time", Some(spec.time()));
        insert_sorted(&mut fields, "pressure_level", spec.pressure_level());
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Deterministic serialization: compact JSON with keys in sorted order.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Era5Error> {
        Ok(serde_json::to_vec(&self.0)?)
    }

    pub fn fingerprint(&self) -> Result<Fingerprint, Era5Error> {
        let bytes = self.to_bytes()?;
        let digest = Sha256::digest(&bytes);
        Ok(Fingerprint::from_digest(digest.as_slice()))
    }
}

fn insert_sorted(fields: &mut BTreeMap<String, Value>, key: &str, values: Option<&[String]>) {
    let Some(values) = values else {
        return;
    };
    if values.is_empty() {
        return;
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    sorted.dedup();
    fields.insert(key.to_string(), Value::from(sorted));
}
