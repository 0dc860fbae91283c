//! Chart scripts.
//!
//! A chart script declares the queries a chart needs and turns their results
//! into a Vega-Lite specification. Scripts are either registered in a
//! [`ScriptRegistry`] under an image name, or read from a TOML file that sits
//! next to the document as `<image>.toml`.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::{ReportError, Result};
use crate::esql::{QueryResults, QuerySet};

/// Appended to an image reference to find its script file.
pub const SCRIPT_SUFFIX: &str = ".toml";

/// Trait implemented by every chart script.
#[async_trait]
pub trait ChartScript: Send + Sync {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Returns the named queries whose results the chart needs.
    async fn queries(&self) -> Result<QuerySet>;

    /// Builds a Vega-Lite specification from the query results.
    async fn chart_spec(&self, data: &QueryResults) -> Result<Value>;
}

/// Outcome of loading a script file.
pub enum ScriptLoad {
    /// The script provides both capabilities.
    Loaded(Arc<dyn ChartScript>),
    /// The script lacks a capability and is skipped.
    Unsupported {
        /// Why the script cannot be used.
        reason: String,
    },
}

impl fmt::Debug for ScriptLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded(script) => f.debug_tuple("Loaded").field(&script.name()).finish(),
            Self::Unsupported { reason } => f
                .debug_struct("Unsupported")
                .field("reason", reason)
                .finish(),
        }
    }
}

/// On-disk layout of a TOML chart script.
#[derive(Debug, Deserialize)]
struct ScriptFile {
    queries: Option<QuerySet>,
    chart: Option<Value>,
}

/// A chart script read from a TOML file.
///
/// `[queries]` maps names to ES|QL text; `[chart]` is a Vega-Lite spec. Query
/// results are injected as top-level `datasets`, so the chart refers to them
/// with `data = { name = "<query name>" }`.
#[derive(Debug, Clone)]
pub struct TomlChartScript {
    name: String,
    queries: QuerySet,
    chart: Map<String, Value>,
}

impl TomlChartScript {
    /// Loads a script file.
    ///
    /// A file missing `[queries]` or `[chart]` is [`ScriptLoad::Unsupported`];
    /// an unreadable or invalid file is an error.
    pub fn load(path: &Path) -> Result<ScriptLoad> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReportError::script(format!("Failed to read {}: {e}", path.display()))
        })?;

        Self::parse(&path.display().to_string(), &content)
    }

    /// Parses script source; `name` is used in messages.
    pub fn parse(name: &str, content: &str) -> Result<ScriptLoad> {
        let file: ScriptFile = toml::from_str(content).map_err(|e| {
            ReportError::script(format!("Script error in {name}:\n  {e}"))
        })?;

        let Some(queries) = file.queries else {
            return Ok(ScriptLoad::Unsupported {
                reason: "does not define a [queries] table".to_string(),
            });
        };

        let chart = match file.chart {
            None => {
                return Ok(ScriptLoad::Unsupported {
                    reason: "does not define a [chart] table".to_string(),
                });
            }
            Some(Value::Object(chart)) => chart,
            Some(_) => {
                return Err(ReportError::script(format!(
                    "Script error in {name}: chart must be a table"
                )));
            }
        };

        Ok(ScriptLoad::Loaded(Arc::new(Self {
            name: name.to_string(),
            queries,
            chart,
        })))
    }
}

#[async_trait]
impl ChartScript for TomlChartScript {
    fn name(&self) -> &str {
        &self.name
    }

    async fn queries(&self) -> Result<QuerySet> {
        Ok(self.queries.clone())
    }

    async fn chart_spec(&self, data: &QueryResults) -> Result<Value> {
        let mut spec = self.chart.clone();

        let mut datasets = match spec.remove("datasets") {
            Some(Value::Object(existing)) => existing,
            _ => Map::new(),
        };
        for (name, records) in data {
            let values = serde_json::to_value(records).map_err(|e| {
                ReportError::script(format!("Failed to serialize results of '{name}': {e}"))
            })?;
            datasets.insert(name.clone(), values);
        }
        spec.insert("datasets".to_string(), Value::Object(datasets));

        if !spec.contains_key("data") && self.queries.len() == 1 {
            if let Some(name) = self.queries.keys().next() {
                spec.insert("data".to_string(), json!({ "name": name }));
            }
        }

        Ok(Value::Object(spec))
    }
}

/// Built-in scripts keyed by the image reference they draw.
#[derive(Default, Clone)]
pub struct ScriptRegistry {
    scripts: HashMap<String, Arc<dyn ChartScript>>,
}

impl ScriptRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a script for an image reference, replacing any previous one.
    pub fn register(&mut self, image: impl Into<String>, script: Arc<dyn ChartScript>) {
        self.scripts.insert(image.into(), script);
    }

    /// Returns the built-in script for an image reference.
    pub fn get(&self, image: &str) -> Option<Arc<dyn ChartScript>> {
        self.scripts.get(image).cloned()
    }

    /// Number of registered scripts.
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Returns true if no scripts are registered.
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut images: Vec<&String> = self.scripts.keys().collect();
        images.sort();
        f.debug_struct("ScriptRegistry")
            .field("images", &images)
            .finish()
    }
}

/// Directory of a document, usable with `join` even for bare file names.
pub fn document_dir(document: &Path) -> &Path {
    document.parent().unwrap_or_else(|| Path::new(""))
}

/// Script file for an image referenced by `document`.
pub fn script_path_for(document: &Path, image: &str) -> PathBuf {
    document_dir(document).join(format!("{image}{SCRIPT_SUFFIX}"))
}

/// Where the rendered image for `image` is written.
pub fn image_path_for(document: &Path, image: &str) -> PathBuf {
    document_dir(document).join(image)
}

/// Returns true if `path` is a file that can be opened for reading.
pub fn is_readable(path: &Path) -> bool {
    path.is_file() && std::fs::File::open(path).is_ok()
}
