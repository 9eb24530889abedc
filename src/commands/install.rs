use clap::Args;
use nodesmith::install::{self, InstallReport};
use nodesmith::log_status;

use super::{CmdResult, TargetArgs};

#[derive(Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

pub fn run(args: InstallArgs) -> CmdResult<InstallReport> {
    let config = args.target.to_config()?;

    log_status!(
        "install",
        "Provisioning {} ({} on {}) as {}",
        config.target.host,
        config.profile.distribution.name,
        config.profile.provider.as_str(),
        config.target.user
    );

    let report = install::run(&config)?;

    if let Some(join) = &report.join_command {
        log_status!("install", "Join worker nodes with: {}", join);
    }

    Ok((report, 0))
}
