use anyhow::Context;
use clap::Parser;
use rollcall_logging::SubscriberBuilder;
use rollcall_server::{Cli, Command, ServerConfig, check, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ServerConfig::resolve(cli.command.args()).context("loading configuration")?;

    let _guard = SubscriberBuilder::new()
        .with_config(config.logging.clone())
        .init()
        .context("initializing logging")?;

    match cli.command {
        Command::Serve(_) => run(config).await.context("serving check-in board")?,
        Command::Check(_) => {
            let report = check(&config).await.context("checking configuration")?;
            println!(
                "{}: {} check-ins across {} activities, directory: {}",
                config.data_file.display(),
                report.entries,
                report.activities,
                report.directory
            );
        }
    }

    Ok(())
}
