//! Report generation: one layout engine, two styles, pluggable output sinks.

use bytes::Bytes;
use thiserror::Error;

use crate::db::models::record::Record;
use crate::db::schema::ResourceSchema;

pub mod layout;
pub mod pdf;
pub mod sink;

pub use layout::{ReportLayout, ReportLine, ReportStyle};
pub use sink::{AttachmentSink, FileSink, ReportSink};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("pdf rendering failed: {0}")]
    Pdf(String),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// A rendered report, ready to hand to a sink.
#[derive(Debug, Clone)]
pub struct Report {
    pub file_name: &'static str,
    pub layout: ReportLayout,
    pub bytes: Bytes,
}

impl Report {
    pub fn generate(
        schema: &'static ResourceSchema,
        records: &[Record],
        style: ReportStyle,
    ) -> Result<Self, ReportError> {
        let layout = ReportLayout::build(schema, records, style);
        let bytes = pdf::render(&layout)?;
        Ok(Self {
            file_name: schema.file_name,
            layout,
            bytes: Bytes::from(bytes),
        })
    }

    pub fn deliver<S: ReportSink>(self, sink: S) -> Result<S::Output, ReportError> {
        sink.deliver(self)
    }
}
