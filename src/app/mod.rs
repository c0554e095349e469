pub mod commands;

pub use commands::{CommandOutput, CommandRunner, GeocodeRequest, Request};
