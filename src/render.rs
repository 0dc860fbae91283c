//! Vega-Lite to SVG rendering.
//!
//! Rendering is delegated to an external command (by default `vl2svg` from
//! vega-cli) that reads the spec on stdin and writes SVG to stdout.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{ReportError, Result};

/// Default renderer command.
pub const DEFAULT_RENDERER: &str = "vl2svg";

/// Trait for anything that turns a Vega-Lite spec into an SVG document.
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    /// Renders `spec` and returns the SVG text.
    async fn render(&self, spec: &Value) -> Result<String>;
}

/// Renderer backed by an external process.
#[derive(Debug, Clone)]
pub struct ProcessRenderer {
    command: PathBuf,
    args: Vec<String>,
}

impl ProcessRenderer {
    /// Creates a renderer invoking `command [args...]`.
    pub fn new(command: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

impl Default for ProcessRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_RENDERER, Vec::new())
    }
}

#[async_trait]
impl ChartRenderer for ProcessRenderer {
    async fn render(&self, spec: &Value) -> Result<String> {
        let input = serde_json::to_vec(spec)
            .map_err(|e| ReportError::render(format!("Failed to serialize chart spec: {e}")))?;

        debug!("rendering chart with {}", self.command.display());

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ReportError::render(format!("failed to run {}: {e}", self.command.display()))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&input).await.map_err(|e| {
                ReportError::render(format!(
                    "failed to write chart spec to {}: {e}",
                    self.command.display()
                ))
            })?;
            // Dropping stdin closes the pipe so the renderer sees EOF.
        }

        let output = child.wait_with_output().await.map_err(|e| {
            ReportError::render(format!("failed to wait for {}: {e}", self.command.display()))
        })?;

        if !output.status.success() {
            return Err(ReportError::render(format!(
                "{} failed ({}): {}",
                self.command.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        String::from_utf8(output.stdout).map_err(|e| {
            ReportError::render(format!(
                "{} produced invalid UTF-8: {e}",
                self.command.display()
            ))
        })
    }
}

/// Font and label defaults sized for charts scaled down into a printed page.
fn default_config() -> Value {
    json!({
        "legend": {
            "labelLimit": 0,
            "labelFontSize": 32,
            "titleFontSize": 36
        },
        "title": {
            "fontSize": 40
        },
        "axis": {
            "labelFontSize": 32,
            "titleFontSize": 36
        }
    })
}

/// Merges the default `config` into a spec without overriding values it sets.
pub fn apply_default_config(spec: &mut Value) {
    let Some(spec) = spec.as_object_mut() else {
        return;
    };
    let Value::Object(defaults) = default_config() else {
        return;
    };

    match spec.get_mut("config") {
        Some(Value::Object(config)) => merge_missing(config, &defaults),
        Some(_) => {}
        None => {
            spec.insert("config".to_string(), Value::Object(defaults));
        }
    }
}

fn merge_missing(target: &mut Map<String, Value>, defaults: &Map<String, Value>) {
    for (key, default) in defaults {
        if let Some(existing) = target.get_mut(key) {
            if let (Value::Object(existing), Value::Object(nested)) = (existing, default) {
                merge_missing(existing, nested);
            }
        } else {
            target.insert(key.clone(), default.clone());
        }
    }
}
