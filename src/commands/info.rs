use clap::Args;
use nodesmith::config::ProviderKind;
use nodesmith::provider::strategy;
use serde::Serialize;

use super::CmdResult;

#[derive(Args)]
pub struct InfoArgs {
    /// Cloud provider: aws, gcp, azure, or oracle
    #[arg(long)]
    pub provider: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoOutput {
    pub provider: &'static str,
    pub kubeadm_options: &'static str,
    pub integration: String,
}

/// Print the provider's integration notes; no connection involved.
pub fn run(args: InfoArgs) -> CmdResult<InfoOutput> {
    let kind = ProviderKind::parse(&args.provider)?;
    let provider = strategy(kind);

    Ok((
        InfoOutput {
            provider: kind.as_str(),
            kubeadm_options: provider.kubeadm_options(),
            integration: provider.describe(),
        },
        0,
    ))
}
