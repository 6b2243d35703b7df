//! Dependency bundling
//!
//! Engines expect imported WDL documents as a single ZIP archive. WES
//! carries the archive base64-encoded in JSON; Cromwell takes the raw bytes
//! as a multipart file.

use std::io::Write;

use base64::Engine;
use zip::write::SimpleFileOptions;

use crate::WorkflowAttachment;

/// Pack attachments into an in-memory ZIP archive.
///
/// Returns `None` when there is nothing to bundle.
pub fn zip_dependencies(dependencies: &[WorkflowAttachment]) -> Result<Option<Vec<u8>>, String> {
    if dependencies.is_empty() {
        return Ok(None);
    }

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for dependency in dependencies {
        writer
            .start_file(dependency.name.as_str(), options)
            .map_err(|e| format!("Failed to bundle '{}': {}", dependency.name, e))?;
        writer
            .write_all(dependency.code.as_bytes())
            .map_err(|e| format!("Failed to bundle '{}': {}", dependency.name, e))?;
    }
    let cursor = writer
        .finish()
        .map_err(|e| format!("Failed to finish dependency archive: {}", e))?;
    Ok(Some(cursor.into_inner()))
}

/// Base64-encoded ZIP archive, as WES expects in `workflow_dependencies`
pub fn encoded_dependencies(
    dependencies: &[WorkflowAttachment],
) -> Result<Option<String>, String> {
    Ok(zip_dependencies(dependencies)?
        .map(|bytes| base64::engine::general_purpose::STANDARD.encode(bytes)))
}
