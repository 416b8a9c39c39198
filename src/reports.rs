//! Reporting: aggregated report queries and file export.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::header::CONTENT_DISPOSITION;
use reqwest::Method;
use tracing::{info, instrument};

use crate::auth::session::{expect_json, expect_success, SessionClient};
use crate::errors::ClientError;
use crate::models::reports::{ReportBundle, ReportFormat, ReportQuery};

#[derive(Clone)]
pub struct ReportsClient {
    client: SessionClient,
}

impl ReportsClient {
    pub fn new(client: SessionClient) -> Self {
        Self { client }
    }

    /// Fetches `{data, stats}` for the given filters.
    #[instrument(skip(self), fields(report_type = query.report_type.as_str()))]
    pub async fn fetch(&self, query: &ReportQuery) -> Result<ReportBundle, ClientError> {
        let url = self.client.url_with("reports/", &query.query_pairs())?;
        let response = self.client.send_url(Method::GET, url, None).await?;
        expect_json(response).await
    }

    /// Downloads the report as a file into `dest_dir`, named from the
    /// `Content-Disposition` header when present, otherwise
    /// `{type}_report.{ext}`. Returns the written path.
    #[instrument(skip(self), fields(report_type = query.report_type.as_str(), format = format.as_str()))]
    pub async fn export(
        &self,
        query: &ReportQuery,
        format: ReportFormat,
        dest_dir: &Path,
    ) -> Result<PathBuf, ClientError> {
        let mut pairs = vec![("format", format.as_str().to_string())];
        pairs.extend(query.query_pairs());
        let url = self.client.url_with("reports/export/", &pairs)?;
        let response = self.client.send_url(Method::GET, url, None).await?;
        let response = expect_success(response).await?;

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| {
                format!("{}_report.{}", query.report_type.as_str(), format.extension())
            });

        let bytes = response.bytes().await?;
        fs::create_dir_all(dest_dir).map_err(|e| {
            ClientError::Session(format!("failed creating {}: {e}", dest_dir.display()))
        })?;
        let path = dest_dir.join(&filename);
        fs::write(&path, &bytes)
            .map_err(|e| ClientError::Session(format!("failed writing {}: {e}", path.display())))?;
        info!(path = %path.display(), bytes = bytes.len(), "report exported");
        Ok(path)
    }
}

/// Extracts the filename from a `Content-Disposition` header value,
/// tolerating both quoted and bare forms. Path separators are rejected so a
/// hostile header cannot steer the write outside `dest_dir`.
fn filename_from_disposition(value: &str) -> Option<String> {
    let (_, rest) = value.split_once("filename=")?;
    let name = rest.split(';').next().unwrap_or(rest).trim();
    let name = name.trim_matches('"').trim();
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return None;
    }
    Some(name.to_string())
}
