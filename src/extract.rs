use std::path::{Path, PathBuf};
use std::process::Command;

use finals_matrix_to_schedule::{RawTable, raw_tables_from_json};

use crate::error::ReviseError;

pub const TABULA_JAR_ENV: &str = "TABULA_JAR";

/// The external PDF-table-extraction engine, invoked as a subprocess. The
/// core never sees PDFs; it only consumes the raw tables produced here.
#[derive(Debug, Clone)]
pub struct TabulaEngine {
    java: PathBuf,
    jar: PathBuf,
}

impl TabulaEngine {
    #[must_use]
    pub fn new(jar: PathBuf) -> Self {
        Self {
            java: PathBuf::from("java"),
            jar,
        }
    }

    /// Resolves the jar path from an explicit argument or the `TABULA_JAR`
    /// environment variable.
    pub fn from_env_or(jar: Option<PathBuf>) -> Result<Self, ReviseError> {
        let jar = jar
            .or_else(|| std::env::var_os(TABULA_JAR_ENV).map(PathBuf::from))
            .ok_or_else(|| {
                ReviseError::Extraction(format!(
                    "no tabula jar configured; pass --tabula-jar or set {TABULA_JAR_ENV}"
                ))
            })?;
        Ok(Self::new(jar))
    }

    pub fn extract_tables(&self, pdf: &Path, page: u32) -> Result<Vec<RawTable>, ReviseError> {
        let output = Command::new(&self.java)
            .arg("-jar")
            .arg(&self.jar)
            .arg("--pages")
            .arg(page.to_string())
            .arg("--format")
            .arg("JSON")
            .arg("--guess")
            .arg(pdf)
            .output()
            .map_err(|error| {
                ReviseError::Extraction(format!("failed to launch extraction engine: {error}"))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReviseError::Extraction(format!(
                "extraction engine exited with {}: {}",
                output.status,
                stderr.trim(),
            )));
        }

        Ok(raw_tables_from_json(&output.stdout)?)
    }
}
