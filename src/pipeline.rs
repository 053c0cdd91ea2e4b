use std::fs;
use std::path::{Path, PathBuf};

use finals_matrix_to_schedule::{
    CommonExamTable, DocumentContext, LayoutVersion, ParseWarning, RawTable, ScheduleTable,
    assemble_schedule, build_common_exams, write_common_csv, write_schedule_csv,
};

use crate::catalog;
use crate::crop;
use crate::error::ReviseError;
use crate::extract::TabulaEngine;
use crate::fetch;
use crate::matrix::{self, MatrixCatalog};

/// Per-document orchestration: download, layout fallback, reconstruction,
/// export, catalog projection. One document failing never halts the batch.
#[derive(Debug)]
pub struct Pipeline {
    engine: TabulaEngine,
    data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermOutcome {
    pub term: String,
    pub layout: LayoutVersion,
    pub schedule_rows: usize,
    pub common_rows: usize,
    pub sections_updated: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermFailure {
    pub term: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: Vec<TermOutcome>,
    pub failed: Vec<TermFailure>,
}

impl Pipeline {
    #[must_use]
    pub fn new(engine: TabulaEngine, data_dir: PathBuf) -> Self {
        Self { engine, data_dir }
    }

    pub fn process_terms(&self, catalog: &MatrixCatalog, terms: &[String]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for term in terms {
            match self.process_term(catalog, term) {
                Ok(outcome) => {
                    tracing::info!(
                        term = %term,
                        layout = %outcome.layout,
                        rows = outcome.schedule_rows,
                        "term processed"
                    );
                    summary.processed.push(outcome);
                }
                Err(error) => {
                    tracing::error!(term = %term, %error, "term failed");
                    summary.failed.push(TermFailure {
                        term: term.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }
        summary
    }

    fn process_term(&self, catalog: &MatrixCatalog, term: &str) -> Result<TermOutcome, ReviseError> {
        let url = matrix::lookup_document(catalog, term)?;
        let year = matrix::term_year(term)?;
        let pdf = fetch::fetch_pdf_bytes(url)?;

        for version in LayoutVersion::FALLBACK_ORDER {
            let context = DocumentContext { version, year };
            match self.attempt_layout(&pdf, &context) {
                Ok((schedule, common, warnings)) => {
                    return self.publish(term, version, &schedule, &common, &warnings);
                }
                Err(error) if error.is_layout_mismatch() => {
                    tracing::warn!(term = %term, layout = %version, %error, "layout rejected");
                }
                Err(error) => return Err(error),
            }
        }

        Err(ReviseError::AllLayoutsFailed(term.to_string()))
    }

    /// Runs one layout variant end to end. Intermediate PDFs live in a
    /// temporary directory that is removed on success and failure alike.
    fn attempt_layout(
        &self,
        pdf: &[u8],
        context: &DocumentContext,
    ) -> Result<(ScheduleTable, CommonExamTable, Vec<ParseWarning>), ReviseError> {
        let workdir = tempfile::tempdir()?;
        let blocks = self.extract_blocks(pdf, context.version, workdir.path())?;

        let (schedule, mut warnings) = assemble_schedule(&blocks, context)?;
        let (common, common_warnings) = build_common_exams(&blocks, context)?;
        warnings.extend(common_warnings);
        Ok((schedule, common, warnings))
    }

    fn extract_blocks(
        &self,
        pdf: &[u8],
        version: LayoutVersion,
        workdir: &Path,
    ) -> Result<Vec<RawTable>, ReviseError> {
        match version {
            LayoutVersion::V1 => {
                let path = workdir.join("source.pdf");
                fs::write(&path, pdf)?;
                self.engine.extract_tables(&path, 1)
            }
            LayoutVersion::V2 => {
                let cropped = crop::crop_to_box(pdf, &crop::HEADER_FOOTER_CROP)?;
                let path = workdir.join("cropped.pdf");
                fs::write(&path, &cropped)?;
                self.engine.extract_tables(&path, 1)
            }
            LayoutVersion::V3 => {
                let (left, right) = crop::split_vertical(pdf)?;
                let left_path = workdir.join("left.pdf");
                let right_path = workdir.join("right.pdf");
                fs::write(&left_path, &left)?;
                fs::write(&right_path, &right)?;

                let mut blocks = self.engine.extract_tables(&left_path, 1)?;
                blocks.extend(self.engine.extract_tables(&right_path, 1)?);
                Ok(blocks)
            }
        }
    }

    fn publish(
        &self,
        term: &str,
        layout: LayoutVersion,
        schedule: &ScheduleTable,
        common: &CommonExamTable,
        warnings: &[ParseWarning],
    ) -> Result<TermOutcome, ReviseError> {
        for warning in warnings {
            tracing::warn!(term = %term, code = ?warning.code, "{}", warning.message);
        }

        write_schedule_csv(&self.data_dir.join(format!("{term}_Finals.csv")), schedule)?;
        write_common_csv(&self.data_dir.join(format!("{term}_Common.csv")), common)?;

        let catalog_path = self.data_dir.join(format!("{term}.json"));
        let report = catalog::project_catalog_file(&catalog_path, schedule, common)?;

        Ok(TermOutcome {
            term: term.to_string(),
            layout,
            schedule_rows: schedule.len(),
            common_rows: common.len(),
            sections_updated: report.sections_updated,
        })
    }
}
