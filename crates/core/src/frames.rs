//! Frame planning for the talking-head pipeline.
//!
//! The video model consumes audio embeddings at 25 frames per second and
//! needs frame counts of the form `4n + 1`. Short clips are rendered in a
//! single pass; anything longer than one 81-frame chunk is streamed.

use serde::Serialize;

use crate::generation::AudioOrder;

/// Audio embedding rate of the video model.
pub const FRAMES_PER_SECOND: f64 = 25.0;

/// Frames rendered per pass in streaming mode.
pub const CHUNK_FRAMES: i64 = 81;

/// Smallest frame count the model accepts.
const MIN_FRAMES: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Clip,
    Streaming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FramePlan {
    pub audio_embedding_frames: i64,
    pub frame_num: i64,
    pub chunk_frame_num: i64,
    pub max_frame_num: i64,
    pub mode: RenderMode,
}

/// Combined speaking time of one or two speakers.
pub fn total_audio_duration(first: f64, second: Option<f64>, order: AudioOrder) -> f64 {
    match second {
        None => first,
        Some(second) if order.is_sequential() => first + second,
        Some(second) => first.max(second),
    }
}

/// Compute the frame plan for `total_secs` of audio.
///
/// `frame_override` replaces the computed frame count but does not change
/// the render mode, which always follows the audio length.
pub fn plan_frames(total_secs: f64, frame_override: Option<i64>) -> FramePlan {
    let audio_embedding_frames = (total_secs * FRAMES_PER_SECOND) as i64;
    let calculated = (audio_embedding_frames - 5).max(MIN_FRAMES);
    let mut frame_num = align_4n1(calculated);

    if frame_num >= audio_embedding_frames {
        let safe = audio_embedding_frames - 10;
        frame_num = 4 * (safe - 1).div_euclid(4).max(1) + 1;
    }

    if let Some(forced) = frame_override.filter(|n| *n > 0) {
        frame_num = forced;
    }

    let (mode, chunk_frame_num) = if calculated > CHUNK_FRAMES {
        (RenderMode::Streaming, CHUNK_FRAMES)
    } else {
        (RenderMode::Clip, frame_num)
    };

    FramePlan {
        audio_embedding_frames,
        frame_num,
        chunk_frame_num,
        max_frame_num: frame_num,
        mode,
    }
}

fn align_4n1(frames: i64) -> i64 {
    4 * (frames - 1).div_euclid(4) + 1
}
