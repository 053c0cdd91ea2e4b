use url::Url;

use crate::error::ReviseError;

/// Downloads one matrix PDF. Blocking on purpose: document processing is
/// purely sequential, and retry policy lives with the caller, not here.
pub fn fetch_pdf_bytes(pdf_url: &str) -> Result<Vec<u8>, ReviseError> {
    let parsed = Url::parse(pdf_url)?;
    let response = reqwest::blocking::get(parsed)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ReviseError::Upstream(format!(
            "failed to fetch PDF source: status {status}"
        )));
    }

    let bytes = response.bytes()?.to_vec();
    if bytes.is_empty() {
        return Err(ReviseError::Upstream("fetched PDF is empty".to_string()));
    }
    Ok(bytes)
}
