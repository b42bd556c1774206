// src/snapshot.rs
//! # Snapshot
//! One decoded `aircraft.json` document.
//!
//! Only `now` is interpreted; the rest of the document is carried through
//! untouched. Each snapshot keeps its canonical bytes (compact JSON with
//! ordered keys) which are used both for dedup and for the archived file.

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    now: f64,
    doc: Value,
    bytes: Vec<u8>,
}

impl Snapshot {
    /// Decode a raw response body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let doc: Value = serde_json::from_slice(body).context("decoding feed json")?;
        Self::from_value(doc)
    }

    /// Wrap an already parsed document. Fails if `now` is missing or not a finite number.
    pub fn from_value(doc: Value) -> Result<Self> {
        let obj = doc
            .as_object()
            .ok_or_else(|| anyhow!("feed document is not a json object"))?;
        let now = match obj.get("now") {
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| anyhow!("`now` is not representable as f64"))?,
            // Some upstreams quote the timestamp.
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .with_context(|| format!("`now` is not numeric: {s:?}"))?,
            Some(other) => bail!("`now` has unexpected type: {other}"),
            None => bail!("feed document has no `now` field"),
        };
        if !now.is_finite() {
            bail!("`now` is not finite: {now}");
        }
        let bytes = serde_json::to_vec(&doc).context("encoding canonical snapshot")?;
        Ok(Self { now, doc, bytes })
    }

    /// Upstream production time, unix seconds (fractional).
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn doc(&self) -> &Value {
        &self.doc
    }

    /// Canonical byte form; two snapshots are duplicates iff these are equal.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn same_content(&self, other: &Snapshot) -> bool {
        self.bytes == other.bytes
    }
}
