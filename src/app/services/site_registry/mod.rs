//! Site registry service for O(1) site metadata lookups
//!
//! This module loads site definitions (id, latitude, longitude) from a
//! delimited registry file and indexes them by site id. Sites are always
//! iterated in ascending-id order so processing runs are deterministic.

use crate::app::models::Site;
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;

pub mod loader;
pub mod parser;

#[cfg(test)]
pub mod tests;

/// Site registry providing O(1) site metadata lookups
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    /// Site metadata indexed by site_id for O(1) lookups
    pub(crate) sites: HashMap<u32, Site>,

    /// Path the registry was loaded from
    pub(crate) registry_path: PathBuf,
}

impl SiteRegistry {
    /// Create a new empty site registry
    pub fn new(registry_path: PathBuf) -> Self {
        Self {
            sites: HashMap::new(),
            registry_path,
        }
    }

    /// Add a site to the registry, replacing any existing entry with the
    /// same id
    pub fn add_site(&mut self, site: Site) {
        self.sites.insert(site.site_id, site);
    }

    /// Get site metadata by site id (O(1) lookup)
    pub fn get_site(&self, site_id: u32) -> Option<&Site> {
        self.sites.get(&site_id)
    }

    /// Check if a site exists in the registry
    pub fn contains_site(&self, site_id: u32) -> bool {
        self.sites.contains_key(&site_id)
    }

    /// Get the total number of sites in the registry
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Path the registry was loaded from
    pub fn registry_path(&self) -> &PathBuf {
        &self.registry_path
    }

    /// All sites in ascending site-id order
    pub fn sites_sorted(&self) -> Vec<&Site> {
        let mut sites: Vec<&Site> = self.sites.values().collect();
        sites.sort_by_key(|site| site.site_id);
        sites
    }

    /// Sites matching an optional selector, in ascending-id order
    ///
    /// With no selector every site is returned; with a selector the single
    /// matching site is returned or `SiteNotFound` if the id is unknown.
    pub fn select(&self, site_id: Option<u32>) -> Result<Vec<&Site>> {
        match site_id {
            None => Ok(self.sites_sorted()),
            Some(id) => {
                let site = self.get_site(id).ok_or_else(|| Error::site_not_found(id))?;
                Ok(vec![site])
            }
        }
    }
}
