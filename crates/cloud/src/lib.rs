//! Clients for the external services Creatorify orchestrates.
//!
//! - [`platform`]: the serverless GPU platform that runs the generation
//!   functions and holds their output volume.
//! - [`media`]: the media store finished artifacts and uploads are pushed to.
//!
//! Both are exposed as traits so the API can be driven by in-memory fakes.

pub mod media;
pub mod platform;
