pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlConfig;

pub use adapters::dblp::DblpClient;
pub use core::{etl::EtlEngine, pipeline::CoauthorPipeline};
pub use domain::model::{CollaborationGraph, OutputFormat, Seed};
pub use utils::error::{CoauthorError, Result};
