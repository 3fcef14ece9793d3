pub mod avatars;
pub mod chatterbox;
pub mod form;
pub mod projects;
pub mod tts;
pub mod voice_conversion;
pub mod voices;
