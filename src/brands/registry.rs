use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use super::builder::build;
use super::models::{BrandCatalog, TrustPolicy};
use crate::core::{Result, SearchError};


struct Current {
    generation: u64,
    catalog: Arc<BrandCatalog>,
}

/// Shared handle to the current catalog snapshot.
///
/// Readers clone the `Arc` and keep working on that snapshot even if a
/// rebuild swaps in a new one meanwhile. Every swap bumps the generation.
pub struct CatalogRegistry {
    current: RwLock<Current>,
}

impl CatalogRegistry {
    pub fn new(catalog: BrandCatalog) -> Self {
        Self {
            current: RwLock::new(Current {
                generation: 0,
                catalog: Arc::new(catalog),
            }),
        }
    }

    pub fn empty() -> Self {
        Self::new(BrandCatalog::empty())
    }

    pub fn snapshot(&self) -> Arc<BrandCatalog> {
        self.current.read().catalog.clone()
    }

    /// Generation and catalog read under one lock.
    pub fn versioned_snapshot(&self) -> (u64, Arc<BrandCatalog>) {
        let current = self.current.read();
        (current.generation, current.catalog.clone())
    }

    pub fn generation(&self) -> u64 {
        self.current.read().generation
    }

    pub fn replace(&self, catalog: BrandCatalog) -> Arc<BrandCatalog> {
        let next = Arc::new(catalog);
        let mut current = self.current.write();
        let previous = std::mem::replace(&mut current.catalog, Arc::clone(&next));
        current.generation += 1;
        info!(
            "Brand catalog replaced (generation {}): {} -> {} brands",
            current.generation,
            previous.len(),
            next.len()
        );
        next
    }

    pub fn rebuild_from_lines<S: AsRef<str>>(&self, lines: &[S], policy: &TrustPolicy) -> Arc<BrandCatalog> {
        self.replace(build(lines, policy))
    }
}

impl Default for CatalogRegistry {
    fn default() -> Self {
        Self::empty()
    }
}


pub async fn load_catalog_lines(path: impl AsRef<Path>, source_url: Option<&str>) -> Result<Vec<String>> {
    let path = path.as_ref();

    if !tokio::fs::try_exists(path).await? {
        let Some(url) = source_url else {
            return Err(SearchError::catalog(format!(
                "catalog file {} not found and no source URL configured",
                path.display()
            )));
        };
        download_catalog(url, path).await?;
    }

    let bytes = tokio::fs::read(path).await?;
    let lines: Vec<String> = String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    info!("Loaded {} catalog lines from {}", lines.len(), path.display());
    Ok(lines)
}

async fn download_catalog(url: &str, path: &Path) -> Result<()> {
    info!("Downloading brand catalog from {}", url);

    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        warn!("Catalog download failed with status {}", response.status());
        return Err(SearchError::catalog(format!(
            "catalog download from {url} returned {}",
            response.status()
        )));
    }
    let body = response.bytes().await?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &body).await?;
    Ok(())
}
