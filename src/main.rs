use clap::Parser;
use datakart::core::ConfigProvider;
use datakart::utils::error::ErrorSeverity;
use datakart::utils::logger;
use datakart::{
    CliConfig, CommandOutput, CommandRunner, LocalStorage, Settings, Sgis, SgisError, TomlConfig,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("Starting datakart CLI");

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: CliConfig) -> Result<(), SgisError> {
    let file = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let config = TomlConfig::from_file(path)?;
            datakart::utils::validation::Validate::validate(&config)?;
            Some(config)
        }
        None => None,
    };

    let settings = Settings::resolve(cli.overrides(), file)?;
    tracing::debug!(
        "Using {} (timeout {}s, output dir {})",
        settings.base_url(),
        settings.timeout_seconds(),
        settings.output_dir()
    );

    let api = Sgis::from_config(&settings)?;
    let storage = LocalStorage::from_config(&settings);
    let runner = CommandRunner::new(api, storage);

    let (request, output) = cli.command.into_request();
    match runner.execute(request, output.as_deref()).await? {
        CommandOutput::Stdout(text) => println!("{}", text),
        CommandOutput::Saved(path) => println!("📁 Output saved to: {}", path),
    }
    Ok(())
}
