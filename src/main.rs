use std::process::ExitCode;

use gh_harvest::{Config, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // A missing .env is fine; real environment variables take precedence.
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Printed directly so it shows up even with RUST_LOG=off.
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("harvesting organization: {}", config.organization);

    match run(&config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
