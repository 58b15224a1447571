//! Command implementations

mod config;
mod dashboard;
mod decide;
mod delete;
mod export;
mod generate;
mod list;
mod locate;
mod review;
mod whoami;

use crate::backend::{Backend, Board};
use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::errors;
use crate::output::OutputWriter;
use crate::progress::with_spinner;
use anyhow::Result;
use ifn_core::config::LayeredConfig;
use ifn_core::models::{StatusFilter, UnitRecord};

/// Everything a signed-in command needs
pub struct CommandContext {
    pub config: LayeredConfig,
    pub backend: Backend,
    pub output: OutputWriter,
    pub dry_run: bool,
}

impl CommandContext {
    /// Board loaded with `filter` applied
    pub async fn load_board(&self, filter: StatusFilter) -> Result<Board> {
        let mut board = self.backend.board(&self.config);
        with_spinner(
            self.output.is_json(),
            "Loading conglomerados...",
            "Conglomerados loaded",
            board.apply_filter(filter),
        )
        .await?;
        Ok(board)
    }

    /// Loaded unit with this code, or a not-found error
    pub fn find_unit(&self, board: &Board, code: &str) -> Result<UnitRecord> {
        board.find_by_code(code).cloned().ok_or_else(|| errors::unit_not_found(code).into())
    }
}

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(&cli)?;

    if let Commands::Config = cli.command {
        return config::execute(&config, &output);
    }

    let backend = Backend::new(cli.backend, &config)?;
    backend.sign_in(&config, output.is_json()).await?;
    let ctx = CommandContext { config, backend, output, dry_run: cli.dry_run };

    match cli.command {
        Commands::Config => Ok(()),
        Commands::Whoami => whoami::execute(&ctx),
        Commands::Dashboard => dashboard::execute(&ctx).await,
        Commands::List(args) => list::execute(args, &ctx).await,
        Commands::Regions => list::regions(&ctx).await,
        Commands::Show(args) => list::show(args, &ctx).await,
        Commands::Locate(args) => locate::execute(args, &ctx).await,
        Commands::Approve(args) => decide::approve(args, &ctx).await,
        Commands::Reject(args) => decide::reject(args, &ctx).await,
        Commands::Review(args) => review::execute(args, &ctx).await,
        Commands::Generate(args) => generate::execute(args, &ctx).await,
        Commands::Delete(args) => delete::execute(args, &ctx).await,
        Commands::Export(args) => export::execute(args, &ctx).await,
    }
}
