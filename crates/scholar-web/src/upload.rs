use axum::extract::Multipart;
use scholar_ingest::UploadedFile;

/// Pull the `pdf` field out of a multipart upload.
///
/// Other fields are drained and ignored.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadedFile, String> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to read form field: {}", e))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "pdf" => {
                let filename = field.file_name().unwrap_or("upload.pdf").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Failed to read file data: {}", e))?
                    .to_vec();

                file = Some(UploadedFile::pdf(filename, data).map_err(|e| e.to_string())?);
            }
            _ => {
                let _ = field.bytes().await;
            }
        }
    }

    file.ok_or_else(|| "No file uploaded".to_string())
}
