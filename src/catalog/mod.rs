use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{ResolveError, Result};
use crate::handle::Handle;

/// Placeholder substituted with the handle in every URL template
pub const HANDLE_PLACEHOLDER: &str = "{handle}";

const BUILTIN_GENERAL: &str = include_str!("../../catalogs/general.toml");
const BUILTIN_RESTRICTED: &str = include_str!("../../catalogs/restricted.toml");

/// The two logical catalogs a run can probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    General,
    Restricted,
}

impl CatalogKind {
    pub fn label(&self) -> &'static str {
        match self {
            CatalogKind::General => "general",
            CatalogKind::Restricted => "restricted",
        }
    }

    fn builtin(&self) -> &'static str {
        match self {
            CatalogKind::General => BUILTIN_GENERAL,
            CatalogKind::Restricted => BUILTIN_RESTRICTED,
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a catalog document is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// The document compiled into the binary
    Builtin,
    /// A TOML document on disk
    File(PathBuf),
}

impl CatalogSource {
    pub fn from_option(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => CatalogSource::File(path),
            None => CatalogSource::Builtin,
        }
    }
}

/// One probe target: the site name and the template with the handle substituted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteTarget {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    sites: Vec<SiteEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct SiteEntry {
    site: String,
    url: String,
}

/// A parsed, validated site catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    kind: CatalogKind,
    entries: Vec<SiteEntry>,
}

impl Catalog {
    /// Reads and validates a catalog document.
    ///
    /// The whole document is rejected when any entry is malformed; a partial
    /// catalog is never returned.
    pub fn load(kind: CatalogKind, source: &CatalogSource) -> Result<Self> {
        let content = match source {
            CatalogSource::Builtin => kind.builtin().to_string(),
            CatalogSource::File(path) => read_document(kind, path)?,
        };

        Self::parse(kind, &content)
    }

    fn parse(kind: CatalogKind, content: &str) -> Result<Self> {
        let document: CatalogDocument = toml::from_str(content)
            .map_err(|e| ResolveError::catalog(kind, format!("malformed document: {}", e)))?;

        if document.sites.is_empty() {
            return Err(ResolveError::catalog(kind, "the site list is empty"));
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(document.sites.len());

        for entry in document.sites {
            let placeholders = entry.url.matches(HANDLE_PLACEHOLDER).count();
            if placeholders != 1 {
                return Err(ResolveError::catalog(
                    kind,
                    format!(
                        "template for '{}' must contain exactly one {} placeholder, found {}",
                        entry.site, HANDLE_PLACEHOLDER, placeholders
                    ),
                ));
            }

            if !seen.insert((entry.site.clone(), entry.url.clone())) {
                warn!(catalog = %kind, site = %entry.site, "skipping duplicate catalog entry");
                continue;
            }

            entries.push(entry);
        }

        debug!(catalog = %kind, sites = entries.len(), "catalog loaded");
        Ok(Catalog { kind, entries })
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Substitutes the handle into every template, preserving catalog order
    pub fn targets(&self, handle: &Handle) -> Vec<SiteTarget> {
        self.entries
            .iter()
            .map(|entry| SiteTarget {
                name: entry.site.clone(),
                url: entry.url.replace(HANDLE_PLACEHOLDER, handle.as_str()),
            })
            .collect()
    }
}

fn read_document(kind: CatalogKind, path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        ResolveError::catalog(kind, format!("failed to read {}: {}", path.display(), e))
    })
}
