//! Bundles stored photos into a ZIP archive, one entry per record that has a
//! photo, named `<id>_<woreda>.<ext>`.

use crate::error::BackCheckError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::model::back_check::BackCheckRecord;
use log::warn;
use regex::Regex;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Keeps letters, digits, `-` and `_`; runs of anything else become `_`.
fn sanitize_label(label: &str, unsafe_chars: &Regex) -> String {
    let cleaned = unsafe_chars.replace_all(label.trim(), "_");
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned.to_string()
    }
}

fn extension_for(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("bin")
}

pub fn entry_name(record: &BackCheckRecord, bytes: &[u8], unsafe_chars: &Regex) -> String {
    format!(
        "{}_{}.{}",
        record.id,
        sanitize_label(&record.metadata.woreda, unsafe_chars),
        extension_for(bytes)
    )
}

/// Writes the archive and returns the number of photos it contains.
///
/// A stored photo that is not valid base64 is skipped with a warning rather
/// than failing the whole bundle.
pub fn write_photo_bundle<W: Write + Seek>(
    records: &[BackCheckRecord],
    writer: W,
) -> Result<usize, BackCheckError> {
    let unsafe_chars = Regex::new(r"[^\p{L}\p{N}_\-]+")
        .map_err(|e| BackCheckError::Io(std::io::Error::other(e)))?;
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut zip = ZipWriter::new(writer);
    let mut count = 0;

    for record in records {
        let Some(encoded) = record.photo.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };
        let bytes = match BASE64.decode(encoded) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Back check {}: stored photo is not valid base64: {}", record.id, e);
                continue;
            }
        };

        zip.start_file(entry_name(record, &bytes, &unsafe_chars), options)?;
        zip.write_all(&bytes)?;
        count += 1;
    }

    zip.finish()?;
    Ok(count)
}
