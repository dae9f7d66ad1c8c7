//! Request and result files
//!
//! One JSON document per line, camelCase fields.

use crate::core::batch::{BatchRequest, BatchResult};
use crate::utils::error::{Result, RunnerError};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Parse request lines; blank lines are skipped, a malformed line is an error
pub fn parse_requests(text: &str) -> Result<Vec<BatchRequest>> {
    let mut requests = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let request = serde_json::from_str(line).map_err(|e| RunnerError::InvalidInput {
            line: index + 1,
            message: e.to_string(),
        })?;
        requests.push(request);
    }
    Ok(requests)
}

pub async fn read_requests(path: impl AsRef<Path>) -> Result<Vec<BatchRequest>> {
    let text = tokio::fs::read_to_string(path).await?;
    parse_requests(&text)
}

/// Render results as JSONL
pub fn render_results(results: &[BatchResult]) -> Result<String> {
    let mut out = String::new();
    for result in results {
        out.push_str(&serde_json::to_string(result)?);
        out.push('\n');
    }
    Ok(out)
}

pub async fn write_results(path: impl AsRef<Path>, results: &[BatchResult]) -> Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(render_results(results)?.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
