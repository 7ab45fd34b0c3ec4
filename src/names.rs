//! Sample naming and artifact path scheme
//!
//! Every sample is addressed by one name, derived from its pool key. The
//! sample's own artifacts and every reference to it from a soundfont are
//! built from that same name, so files emitted independently still line up.

use crate::model::SampleKey;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Directory under the root that holds sample artifacts
pub const SAMPLES_DIR: &str = "samples";

/// Suffix of metadata artifacts
pub const META_SUFFIX: &str = "_META";

/// Suffix of raw payload artifacts
pub const RAW_SUFFIX: &str = "_RAW";

/// Symbolic sample names, `names[bank_id][offset]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleNames {
    banks: BTreeMap<u32, BTreeMap<u32, String>>,
}

impl SampleNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: SampleKey, name: impl Into<String>) {
        self.banks
            .entry(key.bank_id)
            .or_default()
            .insert(key.offset, name.into());
    }

    /// Symbolic name for `key`; an empty name counts as none
    pub fn get(&self, key: SampleKey) -> Option<&str> {
        self.banks
            .get(&key.bank_id)
            .and_then(|bank| bank.get(&key.offset))
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }
}

/// Name used when a sample has no symbolic name
pub fn synthetic_name(key: SampleKey) -> String {
    format!("sample_{}_{:08X}", key.bank_id, key.offset)
}

/// Resolves pool keys to names and artifact paths under one root
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'a> {
    names: &'a SampleNames,
    root: &'a str,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(names: &'a SampleNames, root: &'a str) -> Self {
        Self { names, root }
    }

    /// Stable name for the sample at `key`
    pub fn resolve(&self, key: SampleKey) -> Cow<'a, str> {
        match self.names.get(key) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(synthetic_name(key)),
        }
    }

    /// Path other resources use to point at the sample's metadata
    pub fn meta_reference(&self, key: SampleKey) -> String {
        format!("{}{}", self.artifact_path(&self.sample_stem(key)), META_SUFFIX)
    }

    /// Reference string for an optional slot, empty when nothing is bound
    pub fn slot_reference(&self, key: Option<SampleKey>) -> String {
        key.map(|k| self.meta_reference(k)).unwrap_or_default()
    }

    /// Stem of the sample's metadata artifact, relative to the root
    pub fn sample_stem(&self, key: SampleKey) -> String {
        format!("{}/{}", SAMPLES_DIR, self.resolve(key))
    }

    /// Raw payload artifact path, relative to the root
    pub fn raw_data(&self, key: SampleKey) -> String {
        format!("{}{}", self.sample_stem(key), RAW_SUFFIX)
    }

    /// Join a root-relative path onto the root
    pub fn artifact_path(&self, relative: &str) -> String {
        join_path(self.root, relative)
    }
}

/// Join two slash-separated path segments
pub fn join_path(root: &str, relative: &str) -> String {
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        relative.to_string()
    } else {
        format!("{}/{}", root, relative)
    }
}
