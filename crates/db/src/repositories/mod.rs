//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod avatar_repo;
pub mod job_state_repo;
pub mod speech_project_repo;
pub mod tts_project_repo;
pub mod video_project_repo;
pub mod voice_sample_repo;

pub use avatar_repo::AvatarRepo;
pub use job_state_repo::JobStateRepo;
pub use speech_project_repo::SpeechProjectRepo;
pub use tts_project_repo::TtsProjectRepo;
pub use video_project_repo::VideoProjectRepo;
pub use voice_sample_repo::VoiceSampleRepo;
