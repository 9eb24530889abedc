use clap::Args;
use nodesmith::config::InstallConfig;

pub type CmdResult<T> = nodesmith::Result<(T, i32)>;

pub mod info;
pub mod install;
pub mod metadata;
pub mod plan;

/// Connection flags shared by the subcommands that reach the target host.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Target host IP or DNS name
    #[arg(long)]
    pub host: String,

    /// SSH port
    #[arg(long, default_value_t = 22)]
    pub port: u16,

    /// SSH user (defaults to the provider image's stock user)
    #[arg(long)]
    pub user: Option<String>,

    /// Path to an SSH private key (mutually exclusive with --password)
    #[arg(long)]
    pub key: Option<String>,

    /// SSH password (mutually exclusive with --key)
    #[arg(long)]
    pub password: Option<String>,

    /// Cloud provider: aws, gcp, azure, or oracle
    #[arg(long)]
    pub provider: String,

    /// Linux distribution (defaults to the provider's stock image)
    #[arg(long)]
    pub distro: Option<String>,
}

impl TargetArgs {
    pub fn to_config(&self) -> nodesmith::Result<InstallConfig> {
        InstallConfig::new(
            &self.host,
            self.port,
            self.user.as_deref(),
            self.key.as_deref(),
            self.password.as_deref(),
            &self.provider,
            self.distro.as_deref(),
        )
    }
}

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (nodesmith::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Install(args) => dispatch!(args, install),
        crate::Commands::Plan(args) => dispatch!(args, plan),
        crate::Commands::Metadata(args) => dispatch!(args, metadata),
        crate::Commands::Info(args) => dispatch!(args, info),
    }
}
