pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use app::{CommandOutput, CommandRunner, GeocodeRequest, Request};
pub use config::{cli::LocalStorage, settings::Settings, toml_config::TomlConfig};
pub use core::sgis::Sgis;
pub use utils::error::{Result, SgisError};
