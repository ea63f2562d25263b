//! Catalog export
//!
//! Serializes a built [`TypeCatalog`] to the JSON document consumed by
//! offline tooling. Field names are a stable contract.

mod document;

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::catalog::{category_matches, TypeCatalog};
use document::Document;

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Writing the output failed
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding failed
    #[error("Failed to encode export: {0}")]
    Json(#[from] serde_json::Error),
}

/// What to include in an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Indented output
    pub pretty: bool,
    /// Include deprecated classes, methods and properties
    pub include_deprecated: bool,
    /// Emit `type_id` fields
    pub include_type_ids: bool,
    /// Emit `marshal_type` on parameters
    pub include_marshal_types: bool,
    /// Only these categories (and their sub-categories); empty means all
    pub include_categories: Vec<String>,
    /// Drop these categories (and their sub-categories)
    pub exclude_categories: Vec<String>,
    /// Drop these classes by name
    pub exclude_classes: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            pretty: true,
            include_deprecated: true,
            include_type_ids: true,
            include_marshal_types: true,
            include_categories: Vec::new(),
            exclude_categories: Vec::new(),
            exclude_classes: Vec::new(),
        }
    }
}

impl ExportConfig {
    /// Whether a class with this name and category passes the filters
    pub fn admits_class(&self, name: &str, category: &str, deprecated: bool) -> bool {
        if deprecated && !self.include_deprecated {
            return false;
        }
        if self.exclude_classes.iter().any(|c| c == name) {
            return false;
        }
        self.admits_category(category)
    }

    /// Whether a category passes the include/exclude filters
    pub fn admits_category(&self, category: &str) -> bool {
        if self.exclude_categories.iter().any(|c| category_matches(category, c)) {
            return false;
        }
        self.include_categories.is_empty()
            || self.include_categories.iter().any(|c| category_matches(category, c))
    }
}

/// Counts of what an export emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// Classes written
    pub classes: usize,
    /// Methods written, constructors included
    pub methods: usize,
    /// Properties written
    pub properties: usize,
    /// Channels written
    pub channels: usize,
    /// Events written
    pub events: usize,
    /// Free functions written
    pub global_methods: usize,
    /// Free properties written
    pub global_properties: usize,
}

/// Serializes catalogs according to an [`ExportConfig`]
#[derive(Debug, Clone, Default)]
pub struct CatalogExporter {
    config: ExportConfig,
}

impl CatalogExporter {
    /// Create with `config`
    pub fn new(config: ExportConfig) -> Self {
        CatalogExporter { config }
    }

    /// Configuration in effect
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export to a JSON string
    pub fn export(&self, catalog: &TypeCatalog) -> Result<String, ExportError> {
        self.export_with_summary(catalog).map(|(json, _)| json)
    }

    /// Export to a JSON string and report counts
    pub fn export_with_summary(&self, catalog: &TypeCatalog) -> Result<(String, ExportSummary), ExportError> {
        let document = Document::build(catalog, &self.config);
        let summary = document.summary();
        let json = if self.config.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok((json, summary))
    }

    /// Export to `path`, creating missing parent directories
    pub fn export_to_file(&self, catalog: &TypeCatalog, path: &Path) -> Result<ExportSummary, ExportError> {
        let (json, summary) = self.export_with_summary(catalog)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        info!(
            "Exported {} classes and {} channels to {}",
            summary.classes,
            summary.channels,
            path.display()
        );
        Ok(summary)
    }
}
