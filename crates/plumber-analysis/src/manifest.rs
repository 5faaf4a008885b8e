//! Bookkeeping of which (site, source) pairs an analysis holds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The pairs an analysis holds: sites sorted by name, sources in arrival
/// order within each site. Persisted beside the data units and used to
/// drive restoration, so it must always be a superset of the in-memory
/// tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    sites: BTreeMap<String, Vec<String>>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pair; returns whether it was new.
    pub fn record(&mut self, site: &str, source: &str) -> bool {
        let sources = self.sites.entry(site.to_string()).or_default();
        if sources.iter().any(|existing| existing == source) {
            false
        } else {
            sources.push(source.to_string());
            true
        }
    }

    pub fn contains(&self, site: &str, source: &str) -> bool {
        self.sites
            .get(site)
            .is_some_and(|sources| sources.iter().any(|existing| existing == source))
    }

    pub fn sites(&self) -> impl Iterator<Item = &String> {
        self.sites.keys()
    }

    pub fn sources(&self, site: &str) -> &[String] {
        self.sites.get(site).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every pair, sites in name order, sources in arrival order.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.sites
            .iter()
            .flat_map(|(site, sources)| {
                sources.iter().map(move |source| (site.clone(), source.clone()))
            })
            .collect()
    }

    pub fn pair_count(&self) -> usize {
        self.sites.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
