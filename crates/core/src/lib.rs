//! Domain types and pure logic shared by the Creatorify crates.
//!
//! Nothing in here touches the network or the database: the job lifecycle
//! state machine, frame planning for the talking-head pipeline, the TTS
//! catalogs, text chunking and audio probing all live here so they can be
//! tested in isolation.

pub mod audio;
pub mod chatterbox;
pub mod error;
pub mod frames;
pub mod generation;
pub mod kokoro;
pub mod lifecycle;
pub mod paging;
pub mod status;
pub mod text_chunker;
pub mod types;
