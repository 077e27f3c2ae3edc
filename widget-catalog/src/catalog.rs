//! Widget catalog model and loaders.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{CatalogError, CatalogResult};

/// A single widget the dashboard knows how to place.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetCatalogEntry {
    widget_name: String,
}

impl WidgetCatalogEntry {
    /// Returns the widget identifier.
    #[must_use]
    pub fn widget_name(&self) -> &str {
        &self.widget_name
    }
}

/// Accepted shapes for a catalog element: a bare name or a record with a name.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Name(String),
    Record {
        #[serde(alias = "widget_name")]
        name: String,
    },
}

impl RawEntry {
    fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Record { name } => name,
        }
    }
}

/// Ordered, read-only list of valid widget names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetCatalog {
    entries: Vec<WidgetCatalogEntry>,
}

impl WidgetCatalog {
    /// Loads the catalog from a JSON file.
    ///
    /// The file is read in full and closed before parsing begins.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] when the file cannot be read and any of the
    /// parsing errors documented on [`WidgetCatalog::from_json_str`].
    pub async fn load(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let catalog = Self::from_json_str(&text)?;
        info!(
            path = %path.display(),
            widgets = catalog.len(),
            "widget catalog loaded"
        );
        Ok(catalog)
    }

    /// Parses a catalog from JSON text.
    ///
    /// The document must be an array whose elements are either strings or
    /// objects carrying a `name` (or `widget_name`) string. Other object
    /// fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Malformed`] for invalid JSON or a non-array
    /// document, [`CatalogError::InvalidEntry`] for elements that cannot be
    /// reduced to a name, and the errors of [`WidgetCatalog::from_names`].
    pub fn from_json_str(text: &str) -> CatalogResult<Self> {
        let raw: Vec<Value> = serde_json::from_str(text)?;
        let names = raw
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<RawEntry>(value)
                    .map(RawEntry::into_name)
                    .map_err(|_| CatalogError::InvalidEntry {
                        index,
                        reason: "expected a string or an object with a `name` string".into(),
                    })
            })
            .collect::<CatalogResult<Vec<_>>>()?;

        Self::from_names(names)
    }

    /// Builds a catalog from widget names, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidEntry`] for blank names,
    /// [`CatalogError::DuplicateWidget`] for repeated names, and
    /// [`CatalogError::Empty`] when no names are supplied.
    pub fn from_names<I, S>(names: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for (index, name) in names.into_iter().enumerate() {
            let name = name.into().trim().to_owned();
            if name.is_empty() {
                return Err(CatalogError::InvalidEntry {
                    index,
                    reason: "widget name cannot be empty".into(),
                });
            }
            if !seen.insert(name.clone()) {
                return Err(CatalogError::DuplicateWidget { name });
            }
            entries.push(WidgetCatalogEntry { widget_name: name });
        }

        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { entries })
    }

    /// Returns the entries in catalog order.
    #[must_use]
    pub fn entries(&self) -> &[WidgetCatalogEntry] {
        &self.entries
    }

    /// Iterates over the widget names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(WidgetCatalogEntry::widget_name)
    }

    /// Returns `true` when `name` is a known widget.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names().any(|candidate| candidate == name)
    }

    /// Returns the number of widgets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the catalog has no widgets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the widget names as a comma-separated list in catalog order.
    #[must_use]
    pub fn render(&self) -> String {
        self.names().collect::<Vec<_>>().join(", ")
    }
}
