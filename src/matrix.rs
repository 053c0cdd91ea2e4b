use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ReviseError;

/// The known-document catalog: term code ("202408") to matrix PDF URL.
pub type MatrixCatalog = BTreeMap<String, String>;

static TERM_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.json$").expect("hardcoded term file regex is valid"));

pub fn load_matrix(path: &Path) -> Result<MatrixCatalog, ReviseError> {
    let payload = fs::read(path)?;
    Ok(serde_json::from_slice(&payload)?)
}

pub fn lookup_document<'a>(catalog: &'a MatrixCatalog, term: &str) -> Result<&'a str, ReviseError> {
    catalog
        .get(term)
        .map(String::as_str)
        .ok_or_else(|| ReviseError::UnknownTerm(term.to_string()))
}

/// The 4-digit year every parsed exam date gets stamped with; the source
/// documents never spell it out themselves.
pub fn term_year(term: &str) -> Result<i32, ReviseError> {
    term.get(..4)
        .and_then(|year| year.parse().ok())
        .ok_or_else(|| ReviseError::InvalidTerm(term.to_string()))
}

/// Terms with a catalog document in the data directory, i.e. files named
/// like "202408.json", sorted ascending.
pub fn terms_in_data_dir(dir: &Path) -> Result<Vec<String>, ReviseError> {
    let mut terms = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if TERM_FILE.is_match(name) {
            terms.push(name.trim_end_matches(".json").to_string());
        }
    }
    terms.sort();
    Ok(terms)
}
