//! Talking-head generation parameters.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sampler and post-processing knobs forwarded to the video pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GenerationParams {
    #[validate(range(min = 1, max = 50))]
    pub sample_steps: i32,
    pub sample_shift: f64,
    pub sample_text_guide_scale: f64,
    pub sample_audio_guide_scale: f64,
    pub lora_scale: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub color_correction_strength: f64,
    pub seed: Option<i64>,
    /// Force a specific frame count (advanced).
    #[validate(range(min = 5))]
    pub frame_num: Option<i64>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            sample_steps: 8,
            sample_shift: 3.0,
            sample_text_guide_scale: 1.0,
            sample_audio_guide_scale: 6.0,
            lora_scale: 1.0,
            color_correction_strength: 0.2,
            seed: None,
            frame_num: None,
        }
    }
}

/// How two speakers' audio tracks are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioOrder {
    #[default]
    LeftRight,
    RightLeft,
    /// Both speakers talk at the same time.
    Meanwhile,
}

impl AudioOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            AudioOrder::LeftRight => "left_right",
            AudioOrder::RightLeft => "right_left",
            AudioOrder::Meanwhile => "meanwhile",
        }
    }

    /// Audio combination mode understood by the pipeline for two speakers.
    pub fn audio_type(self) -> &'static str {
        match self {
            AudioOrder::Meanwhile => "para",
            AudioOrder::RightLeft => "reverse_add",
            AudioOrder::LeftRight => "add",
        }
    }

    /// Whether the tracks play one after the other.
    pub fn is_sequential(self) -> bool {
        !matches!(self, AudioOrder::Meanwhile)
    }
}

/// Number of speakers in a talking-head project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoProjectType {
    SinglePerson,
    MultiPerson,
}

impl VideoProjectType {
    pub fn for_second_audio(audio_url_2: Option<&str>) -> Self {
        match audio_url_2 {
            Some(url) if !url.trim().is_empty() => VideoProjectType::MultiPerson,
            _ => VideoProjectType::SinglePerson,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VideoProjectType::SinglePerson => "single_person",
            VideoProjectType::MultiPerson => "multi_person",
        }
    }
}

/// Prompt used when the request does not carry one.
pub const DEFAULT_PROMPT: &str = "a person is talking";
