//! Row models and insert DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the table and a `Create*` DTO for inserts. Status columns are stored as
//! text and parsed into [`creatorify_core::status::JobStatus`] on demand.

pub mod avatar;
pub mod job_state;
pub mod speech_project;
pub mod tts_project;
pub mod video_project;
pub mod voice_sample;
