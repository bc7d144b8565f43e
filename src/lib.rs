//! Witching Hour: a prompt form, a pluggable image-generation adapter and a
//! newest-first gallery.

pub mod adapter;
pub mod card;
pub mod config;
pub mod error;
pub mod gallery;
pub mod logger;
pub mod models;
pub mod page;
#[cfg(feature = "server")]
pub mod server;
pub mod studio;

pub use adapter::{GenerationAdapter, ImageBackend};
pub use config::{BackendConfig, BackendKind, Config};
pub use error::{Error, ErrorKind, GenerationError, Result};
pub use gallery::Gallery;
pub use models::{Archetype, AspectRatio, GenerationRequest, GenerationResult, ImageReference};
pub use studio::{Studio, SubmitOutcome};
