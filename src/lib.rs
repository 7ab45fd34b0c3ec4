pub mod archive;
pub mod codec;
pub mod error;
pub mod export;
pub mod input;
pub mod model;
pub mod names;
pub mod resource;

pub use error::{Error, Result};
pub use export::{ExportConfig, ExportFormat, Exporter};
pub use model::AudioAsset;
