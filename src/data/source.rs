use std::fs;
use std::time::Duration;

use tracing::debug;

use crate::config::Source;
use crate::error::{DashboardError, Result};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

impl Source {
    /// Fetch the raw bytes of the dataset. No retries.
    pub fn fetch(&self) -> Result<Vec<u8>> {
        match self {
            Source::Url(url) => fetch_url(url),
            Source::Path(path) => {
                debug!(path = %path.display(), "reading local source");
                fs::read(path).map_err(|e| DashboardError::unavailable(self.to_string(), e))
            }
        }
    }
}

fn fetch_url(url: &str) -> Result<Vec<u8>> {
    debug!(%url, "fetching remote source");
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| DashboardError::unavailable(url, e))?;

    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| DashboardError::unavailable(url, e))?;

    let bytes = response
        .bytes()
        .map_err(|e| DashboardError::unavailable(url, e))?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a,b\n1,2\n").unwrap();
        let source = Source::Path(file.path().to_path_buf());
        assert_eq!(source.fetch().unwrap(), b"a,b\n1,2\n");
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = Source::Path(dir.path().join("nope.csv"));
        match source.fetch() {
            Err(DashboardError::DataUnavailable { origin, .. }) => {
                assert!(origin.ends_with("nope.csv"));
            }
            other => panic!("expected DataUnavailable, got {:?}", other),
        }
    }
}
