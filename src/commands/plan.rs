use clap::Args;
use nodesmith::config::TargetProfile;
use nodesmith::install::{self, StagePlan};
use serde::Serialize;

use super::CmdResult;

#[derive(Args)]
pub struct PlanArgs {
    /// Cloud provider: aws, gcp, azure, or oracle
    #[arg(long)]
    pub provider: String,

    /// Linux distribution (defaults to the provider's stock image)
    #[arg(long)]
    pub distro: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutput {
    pub profile: TargetProfile,
    pub stages: Vec<StagePlan>,
}

/// Preview the stage batches for a profile without connecting anywhere.
pub fn run(args: PlanArgs) -> CmdResult<PlanOutput> {
    let profile = TargetProfile::resolve(&args.provider, args.distro.as_deref())?;
    let stages = install::plan(&profile);

    Ok((PlanOutput { profile, stages }, 0))
}
