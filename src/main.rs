use anyhow::Result;
use clap::Parser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;
use nds_rom_tool::commands::ntr::NtrCommands;
use nds_rom_tool::commands::{Cli, Commands};
use nds_rom_tool::nintendo::ntr::export::{export, list_files, show_info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let logger = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .build();

    let level = logger.filter();
    let pb = MultiProgress::new();

    LogWrapper::new(pb.clone(), logger).try_init()?;
    log::set_max_level(level);

    let cli = Cli::parse();

    match cli.command {
        Commands::Ntr(inner) => match inner {
            NtrCommands::Info(cmd) => show_info(cmd).await?,
            NtrCommands::Files(cmd) => list_files(cmd).await?,
            NtrCommands::Export(cmd) => export(cmd, pb.clone()).await?,
        },
    }

    Ok(())
}
