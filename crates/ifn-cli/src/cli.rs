use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// IFN - Conglomerado review console
#[derive(Parser, Debug)]
#[command(name = "ifn")]
#[command(about = "Review console for Inventario Forestal Nacional conglomerados", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Show planned actions without executing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Configuration file (defaults to ./ifn.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Conglomerado service URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// User directory service URL
    #[arg(long, global = true, value_name = "URL")]
    pub auth_url: Option<String>,

    /// Access token issued by the identity provider
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Email of the signed-in reviewer
    #[arg(long, global = true)]
    pub email: Option<String>,

    /// Service backend to use (http or memory)
    #[arg(long, global = true, default_value = "http")]
    pub backend: ServiceBackend,

    #[command(subcommand)]
    pub command: Commands,
}

/// Service backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ServiceBackend {
    /// REST services (default)
    Http,
    /// In-memory service with demo data, for trying the console offline
    Memory,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the effective configuration and where each value comes from
    Config,

    /// Show the signed-in reviewer
    Whoami,

    /// Show counts per status and the latest conglomerados
    Dashboard,

    /// List conglomerados
    List(ListArgs),

    /// List departamentos available for approval
    Regions,

    /// Show one conglomerado
    Show(CodeArgs),

    /// Focus the map on a conglomerado and show its overlay
    Locate(CodeArgs),

    /// Approve a pending conglomerado into a departamento
    Approve(ApproveArgs),

    /// Reject a pending conglomerado
    Reject(RejectArgs),

    /// Review pending conglomerados interactively
    Review(ReviewArgs),

    /// Generate new conglomerados at random locations
    Generate(GenerateArgs),

    /// Delete a conglomerado
    Delete(DeleteArgs),

    /// Export conglomerados as GeoJSON
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Status filter (todos, pendiente, aprobado, rechazado)
    #[arg(long, short = 's', default_value = "todos")]
    pub status: String,

    /// Case-insensitive search on the conglomerado code
    #[arg(long, short = 'q')]
    pub search: Option<String>,
}

#[derive(Parser, Debug)]
pub struct CodeArgs {
    /// Conglomerado code
    pub code: String,
}

#[derive(Parser, Debug)]
pub struct ApproveArgs {
    /// Conglomerado code
    pub code: String,

    /// Departamento id to assign
    #[arg(long, short = 'r')]
    pub region: String,
}

#[derive(Parser, Debug)]
pub struct RejectArgs {
    /// Conglomerado code
    pub code: String,

    /// Reason for the rejection
    #[arg(long, short = 'r')]
    pub reason: String,
}

#[derive(Parser, Debug)]
pub struct ReviewArgs {
    /// Start with this status filter
    #[arg(long, short = 's', default_value = "pendiente")]
    pub status: String,

    /// Start with this code search
    #[arg(long, short = 'q')]
    pub search: Option<String>,
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Number of conglomerados (1-100)
    pub count: u32,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Conglomerado code
    pub code: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Output file
    #[arg(long, short = 'o', default_value = "conglomerados.geojson")]
    pub output: PathBuf,

    /// Status filter (todos, pendiente, aprobado, rechazado)
    #[arg(long, short = 's', default_value = "todos")]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_approve_requires_region() {
        assert!(Cli::try_parse_from(["ifn", "approve", "C-001"]).is_err());

        let cli = Cli::try_parse_from(["ifn", "approve", "C-001", "--region", "R7"]).unwrap();
        match cli.command {
            Commands::Approve(args) => {
                assert_eq!(args.code, "C-001");
                assert_eq!(args.region, "R7");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ifn", "list", "--json", "--backend", "memory"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.backend, ServiceBackend::Memory);
    }
}
