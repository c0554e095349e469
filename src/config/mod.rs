pub mod cli;
pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::app::{GeocodeRequest, Request};
#[cfg(feature = "cli")]
use crate::core::export::OutputFormat;
#[cfg(feature = "cli")]
use crate::core::{BoundaryQuery, Crs, LowSearch};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "datakart")]
#[command(about = "Query the SGIS statistical geographic information API")]
pub struct CliConfig {
    /// Path to a TOML config file with [sgis] and [output] tables
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(long, env = "SGIS_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "SGIS_API_SEC", hide_env_values = true, global = true)]
    pub api_sec: Option<String>,

    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Directory that --output paths are relative to
    #[arg(long, global = true)]
    pub output_dir: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Request an access token and print it with its expiry
    Auth,

    /// Look up coordinates for an address
    Geocode {
        address: String,

        /// wgs84 (EPSG:4326) or utmk (EPSG:5179)
        #[arg(long, default_value = "wgs84")]
        crs: Crs,

        #[arg(long, default_value_t = 0)]
        page: u32,

        #[arg(long, default_value_t = 5)]
        limit: u32,

        /// json or csv
        #[arg(long, default_value = "json")]
        format: OutputFormat,

        #[arg(short, long)]
        output: Option<String>,
    },

    /// Fetch administrative boundaries as WGS84 GeoJSON
    Boundary {
        /// Administrative area code; all provinces when omitted
        #[arg(long)]
        adm_cd: Option<String>,

        /// Sub-area depth: 0, 1 or 2
        #[arg(long, default_value = "1")]
        low_search: LowSearch,

        #[arg(long, default_value = "2023")]
        year: String,

        #[arg(short, long)]
        output: Option<String>,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn overrides(&self) -> settings::Overrides {
        settings::Overrides {
            api_key: self.api_key.clone(),
            api_sec: self.api_sec.clone(),
            base_url: self.base_url.clone(),
            timeout_seconds: self.timeout,
            output_dir: self.output_dir.clone(),
        }
    }
}

#[cfg(feature = "cli")]
impl Command {
    /// Splits the subcommand into the request and its optional output path.
    pub fn into_request(self) -> (Request, Option<String>) {
        match self {
            Command::Auth => (Request::Auth, None),
            Command::Geocode {
                address,
                crs,
                page,
                limit,
                format,
                output,
            } => (
                Request::Geocode(GeocodeRequest {
                    address,
                    crs,
                    page,
                    limit,
                    format,
                }),
                output,
            ),
            Command::Boundary {
                adm_cd,
                low_search,
                year,
                output,
            } => (
                Request::Boundary(BoundaryQuery {
                    adm_cd,
                    low_search,
                    year,
                }),
                output,
            ),
        }
    }
}
