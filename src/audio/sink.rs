//! Decoding helpers for the rodio-backed device.
//!
//! Sources are plain filesystem paths, optionally written as `file://` URLs.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use rodio::{Decoder, Source};

use crate::error::DeviceError;

pub(super) type FileDecoder = Decoder<BufReader<File>>;

/// Map a source locator to a local path. Remote schemes are not supported.
pub(super) fn source_path(source: &str) -> Result<PathBuf, DeviceError> {
    if let Some(rest) = source.strip_prefix("file://") {
        return Ok(PathBuf::from(rest));
    }
    if source.contains("://") {
        return Err(DeviceError::LoadFailure(format!(
            "unsupported source scheme: {source}"
        )));
    }
    Ok(PathBuf::from(source))
}

/// Open and decode `source`, returning the decoder and its duration in
/// seconds (0 when the container does not say).
pub(super) fn open_source(source: &str) -> Result<(FileDecoder, f64), DeviceError> {
    let path = source_path(source)?;
    let file = File::open(&path)
        .map_err(|e| DeviceError::LoadFailure(format!("{}: {e}", path.display())))?;
    let decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| DeviceError::LoadFailure(format!("{}: {e}", path.display())))?;
    let duration = decoder
        .total_duration()
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    Ok((decoder, duration))
}
