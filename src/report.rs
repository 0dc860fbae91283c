//! Report processing.
//!
//! Drives one pass over a set of Typst documents: find figure placeholders,
//! run each chart script's queries, render the chart, write the image, then
//! compile the document.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{ReportError, Result};
use crate::esql::{run_queries, QueryBackend};
use crate::render::{apply_default_config, ChartRenderer};
use crate::script::{
    image_path_for, is_readable, script_path_for, ChartScript, ScriptLoad, ScriptRegistry,
    TomlChartScript,
};
use crate::typst::{self, Compiler};

/// Where a chart's script comes from.
#[derive(Clone)]
pub enum ScriptSource {
    /// A script registered in the [`ScriptRegistry`].
    Builtin(Arc<dyn ChartScript>),
    /// A TOML script file next to the document.
    File(PathBuf),
}

impl std::fmt::Debug for ScriptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin(script) => f.debug_tuple("Builtin").field(&script.name()).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

/// One chart to produce for a document.
#[derive(Debug, Clone)]
pub struct ChartJob {
    /// Image reference as written in the document.
    pub image: String,
    /// File the rendered SVG is written to.
    pub image_path: PathBuf,
    /// Script that defines the chart.
    pub source: ScriptSource,
}

/// Processes report documents against one query backend.
pub struct ReportRunner {
    backend: Box<dyn QueryBackend>,
    renderer: Box<dyn ChartRenderer>,
    compiler: Option<Compiler>,
    registry: ScriptRegistry,
    url: String,
}

impl ReportRunner {
    /// Creates a runner that queries `url` through `backend`.
    ///
    /// Documents are compiled with the default Typst compiler unless
    /// [`ReportRunner::with_compiler`] says otherwise.
    pub fn new(
        backend: Box<dyn QueryBackend>,
        renderer: Box<dyn ChartRenderer>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            renderer,
            compiler: Some(Compiler::default()),
            registry: ScriptRegistry::new(),
            url: url.into(),
        }
    }

    /// Sets the document compiler; `None` skips compilation.
    pub fn with_compiler(mut self, compiler: Option<Compiler>) -> Self {
        self.compiler = compiler;
        self
    }

    /// Sets the registry of built-in scripts.
    pub fn with_registry(mut self, registry: ScriptRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Processes every document in order, stopping at the first failure.
    pub async fn run(&self, files: &[PathBuf]) -> Result<()> {
        for file in files {
            self.process_file(file).await?;
        }
        Ok(())
    }

    /// Produces every chart of one document, then compiles it.
    pub async fn process_file(&self, file: &Path) -> Result<()> {
        let images = typst::find_images_in_file(file)?;
        debug!("processing images in {}: {:?}", file.display(), images);

        for job in self.find_scripts(file, &images) {
            debug!("processing script from {}: {:?}", file.display(), job.source);
            self.process_script(&job).await?;
        }

        if let Some(compiler) = &self.compiler {
            compiler.compile(file).await?;
        }

        info!("processed file {}", file.display());
        Ok(())
    }

    /// Pairs each image reference with its script.
    ///
    /// Registered scripts take precedence over files; images with neither are
    /// left alone.
    pub fn find_scripts(&self, file: &Path, images: &[String]) -> Vec<ChartJob> {
        images
            .iter()
            .filter_map(|image| {
                let source = match self.registry.get(image) {
                    Some(script) => ScriptSource::Builtin(script),
                    None => {
                        let path = script_path_for(file, image);
                        if !is_readable(&path) {
                            debug!("no script for image {} (looked for {})", image, path.display());
                            return None;
                        }
                        ScriptSource::File(path)
                    }
                };

                Some(ChartJob {
                    image: image.clone(),
                    image_path: image_path_for(file, image),
                    source,
                })
            })
            .collect()
    }

    /// Runs one chart script and writes its rendered image.
    ///
    /// A script file lacking a capability is logged and skipped.
    pub async fn process_script(&self, job: &ChartJob) -> Result<()> {
        let script = match &job.source {
            ScriptSource::Builtin(script) => Arc::clone(script),
            ScriptSource::File(path) => match TomlChartScript::load(path)? {
                ScriptLoad::Loaded(script) => script,
                ScriptLoad::Unsupported { reason } => {
                    info!("script {} {}, ignored", path.display(), reason);
                    return Ok(());
                }
            },
        };

        let queries = script.queries().await?;
        let data = run_queries(self.backend.as_ref(), &self.url, &queries).await?;

        let mut spec = script.chart_spec(&data).await?;
        apply_default_config(&mut spec);

        let svg = self.renderer.render(&spec).await?;
        tokio::fs::write(&job.image_path, svg).await.map_err(|e| {
            ReportError::io(format!("Failed to write {}: {e}", job.image_path.display()))
        })?;

        info!("wrote {} using {}", job.image_path.display(), script.name());
        Ok(())
    }
}
