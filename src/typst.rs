//! Typst document scanning and compilation.
//!
//! Finds `#figure(image("..."))` placeholders in a document and runs the
//! external `typst` compiler once the images exist.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tokio::process::Command;
use tracing::{debug, error};

use crate::error::{ReportError, Result};

/// Default compiler binary.
pub const DEFAULT_COMPILER: &str = "typst";

fn figure_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"#figure\(image\("(.*)"\)\)"#).expect("figure pattern is a valid regex")
    })
}

/// Returns the image references of a document, in order of appearance.
///
/// Only single-line `#figure(image("NAME"))` calls are recognized; leading and
/// trailing whitespace on the line is ignored.
pub fn find_images(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter_map(|line| figure_pattern().captures(line))
        .filter_map(|captures| captures.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Reads a document and returns its image references.
pub fn find_images_in_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ReportError::io(format!("Failed to read {}: {e}", path.display())))?;
    Ok(find_images(&contents))
}

/// Runs the external document compiler.
#[derive(Debug, Clone)]
pub struct Compiler {
    command: PathBuf,
    args: Vec<String>,
}

impl Compiler {
    /// Creates a compiler invoking `command compile <file> [args...]`.
    pub fn new(command: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// Compiles `file`, logging the compiler's output if it fails.
    pub async fn compile(&self, file: &Path) -> Result<()> {
        debug!("running {} compile {}", self.command.display(), file.display());

        let output = Command::new(&self.command)
            .arg("compile")
            .arg(file)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| {
                ReportError::compile(format!(
                    "failed to run {}: {e}",
                    self.command.display()
                ))
            })?;

        if output.status.success() {
            return Ok(());
        }

        let cause = exit_cause(&output.status);
        error!("typst error: {}", cause);
        error!("stdout:\n{}", String::from_utf8_lossy(&output.stdout));
        error!("stderr:\n{}", String::from_utf8_lossy(&output.stderr));

        Err(ReportError::compile(format!(
            "{} compile {:?} {cause}",
            self.command.display(),
            file.display().to_string()
        )))
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(DEFAULT_COMPILER, Vec::new())
    }
}

fn exit_cause(status: &std::process::ExitStatus) -> String {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("killed by signal {signal}");
        }
    }

    match status.code() {
        Some(code) => format!("exited with status {code}"),
        None => "exited abnormally".to_string(),
    }
}
