//! Upload validation for audio and image files.
//!
//! Voice samples are probed by reading container headers with `symphonia`;
//! no audio is decoded. Content types are sniffed from magic bytes with
//! `infer` so the declared multipart content type is never trusted alone.

use std::io::Cursor;

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::CoreError;

/// Extensions accepted for voice samples (lower-case, with leading dot).
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".wav", ".mp3", ".flac", ".ogg", ".m4a"];

pub const MIN_DURATION_SECS: f64 = 0.5;
pub const MAX_DURATION_SECS: f64 = 300.0;

/// Header-level facts about an audio file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioInfo {
    pub duration_secs: f64,
    pub sample_rate: u32,
}

/// Lower-cased extension of `filename` including the dot, e.g. `".wav"`.
pub fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() || ext.contains('/') {
        return None;
    }
    Some(format!(".{}", ext.to_ascii_lowercase()))
}

/// Check the filename's extension against [`SUPPORTED_EXTENSIONS`] and
/// return it normalised.
pub fn validate_extension(filename: &str) -> Result<String, CoreError> {
    match extension_of(filename) {
        Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) => Ok(ext),
        _ => Err(CoreError::Validation(format!(
            "Unsupported file format. Supported formats: {}",
            SUPPORTED_EXTENSIONS.join(", ")
        ))),
    }
}

/// Read duration and sample rate from the container headers.
///
/// When the container does not record a frame count (common for MP3 and
/// Ogg), packet durations are summed instead.
pub fn probe(bytes: Vec<u8>, extension: &str) -> Result<AudioInfo, CoreError> {
    let mss = MediaSourceStream::new(
        Box::new(Cursor::new(bytes)),
        MediaSourceStreamOptions::default(),
    );

    let mut hint = Hint::new();
    hint.with_extension(extension.trim_start_matches('.'));

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| CoreError::Validation(format!("Invalid audio file: {e}")))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| CoreError::Validation("Invalid audio file: no audio track".into()))?;

    let track_id = track.id;
    let params = track.codec_params.clone();
    let sample_rate = params.sample_rate.ok_or_else(|| {
        CoreError::Validation("Invalid audio file: sample rate not found".into())
    })?;

    #[allow(clippy::cast_precision_loss)]
    let duration_secs = match params.n_frames {
        Some(n_frames) => n_frames as f64 / f64::from(sample_rate),
        None => {
            let mut total: u64 = 0;
            while let Ok(packet) = format.next_packet() {
                if packet.track_id() == track_id {
                    total += packet.dur;
                }
            }
            match params.time_base {
                Some(tb) => {
                    let time = tb.calc_time(total);
                    time.seconds as f64 + time.frac
                }
                None => total as f64 / f64::from(sample_rate),
            }
        }
    };

    Ok(AudioInfo {
        duration_secs,
        sample_rate,
    })
}

/// Voice samples must be between [`MIN_DURATION_SECS`] and [`MAX_DURATION_SECS`].
pub fn validate_duration(duration_secs: f64) -> Result<(), CoreError> {
    if duration_secs < MIN_DURATION_SECS {
        return Err(CoreError::Validation(format!(
            "Audio too short ({duration_secs:.1}s). Minimum is {MIN_DURATION_SECS}s"
        )));
    }
    if duration_secs > MAX_DURATION_SECS {
        return Err(CoreError::Validation(format!(
            "Audio too long ({duration_secs:.1}s). Maximum is {MAX_DURATION_SECS}s"
        )));
    }
    Ok(())
}

/// MIME type detected from the file's magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.mime_type())
}

/// Accept an image upload when either the sniffed or the declared content
/// type is `image/*`. Sniffing wins when it recognises the bytes.
pub fn ensure_image(bytes: &[u8], declared: Option<&str>) -> Result<(), CoreError> {
    ensure_kind(bytes, declared, "image/", "File must be an image")
}

/// Same as [`ensure_image`] for audio uploads.
pub fn ensure_audio(bytes: &[u8], declared: Option<&str>) -> Result<(), CoreError> {
    ensure_kind(bytes, declared, "audio/", "File must be an audio file")
}

fn ensure_kind(
    bytes: &[u8],
    declared: Option<&str>,
    prefix: &str,
    message: &str,
) -> Result<(), CoreError> {
    let ok = match sniff_mime(bytes) {
        Some(mime) => mime.starts_with(prefix),
        None => declared.is_some_and(|d| d.starts_with(prefix)),
    };
    if ok {
        Ok(())
    } else {
        Err(CoreError::Validation(message.to_string()))
    }
}
