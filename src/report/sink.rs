use std::fs;
use std::path::PathBuf;

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;

use super::{Report, ReportError};

/// Where a finished report ends up.
pub trait ReportSink {
    type Output;

    fn deliver(self, report: Report) -> Result<Self::Output, ReportError>;
}

/// Streams the report back as an HTTP download.
#[derive(Debug, Default, Clone, Copy)]
pub struct AttachmentSink;

impl ReportSink for AttachmentSink {
    type Output = Response;

    fn deliver(self, report: Report) -> Result<Response, ReportError> {
        let disposition = format!("attachment; filename={}", report.file_name);
        let mut response = Response::new(Body::from(report.bytes.clone()));
        *response.status_mut() = StatusCode::OK;

        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(report.bytes.len()));
        headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&disposition)
                .map_err(|e| ReportError::Pdf(format!("bad file name: {e}")))?,
        );
        Ok(response)
    }
}

/// Saves the report under a local directory, like a browser download.
#[derive(Debug, Clone)]
pub struct FileSink {
    pub dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ReportSink for FileSink {
    type Output = PathBuf;

    fn deliver(self, report: Report) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(report.file_name);
        fs::write(&path, &report.bytes)?;
        tracing::info!(path = %path.display(), bytes = report.bytes.len(), "report saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::DESIGN_REQUESTS;
    use crate::report::ReportStyle;

    fn empty_report() -> Report {
        Report::generate(&DESIGN_REQUESTS, &[], ReportStyle::Labeled).unwrap()
    }

    #[test]
    fn attachment_sets_download_headers() {
        let report = empty_report();
        let len = report.bytes.len();
        let response = report.deliver(AttachmentSink).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(headers[header::CONTENT_DISPOSITION], "attachment; filename=DesignRequests.pdf");
        assert_eq!(headers[header::CONTENT_LENGTH], len.to_string().as_str());
    }

    #[test]
    fn file_sink_writes_under_resource_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = empty_report().deliver(FileSink::new(dir.path().join("out"))).unwrap();

        assert_eq!(path, dir.path().join("out").join("DesignRequests.pdf"));
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    }
}
