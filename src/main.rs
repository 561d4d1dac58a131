use std::env;
use std::error::Error;

use clap::Parser;
use fspd::cli::{main_cli, Args};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let log_level = match env::var("LOG_LEVEL") {
        Ok(value) => value,
        Err(_) => "info".to_string(),
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::info!("Starting fspd v{}", VERSION);

    let args = Args::parse();
    if args.cmd.is_none() {
        log::info!("Nothing to do, see --help for the available commands");
    }
    main_cli(args).await?;

    log::info!("fspd stopped");

    Ok(())
}
