//! Staging of uploaded documents for parsing.

use crate::{DocumentParser, IngestError};

/// An uploaded file with its data and metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Build an upload after checking that it is a PDF.
    pub fn pdf(filename: String, data: Vec<u8>) -> Result<Self, IngestError> {
        check_pdf(&filename, &data)?;
        Ok(Self { filename, data })
    }
}

/// Accept `.pdf` files and anything carrying PDF magic bytes.
pub fn check_pdf(filename: &str, data: &[u8]) -> Result<(), IngestError> {
    let is_pdf_data = data.starts_with(b"%PDF-");

    if filename.to_lowercase().ends_with(".pdf") {
        if !is_pdf_data {
            return Err(IngestError::Unsupported(
                "File has .pdf extension but doesn't appear to be a valid PDF".to_string(),
            ));
        }
        return Ok(());
    }
    if is_pdf_data {
        return Ok(());
    }

    Err(IngestError::Unsupported(
        "Unsupported file type. Please upload a PDF.".to_string(),
    ))
}

/// Write the upload to a scoped temp dir, parse it, and remove the dir.
///
/// The directory is dropped before this returns on every path, so the
/// upload never outlives the parse call.
pub async fn stage_and_parse(
    parser: &dyn DocumentParser,
    upload: &UploadedFile,
) -> Result<String, IngestError> {
    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("upload.pdf");
    std::fs::write(&path, &upload.data)?;

    tracing::info!(
        filename = %upload.filename,
        bytes = upload.data.len(),
        backend = parser.name(),
        "parsing upload"
    );
    let result = parser.parse(&path).await;

    drop(temp_dir);
    result
}
