use clap::Args;
use nodesmith::provider::{strategy, MetadataMap};
use nodesmith::ssh::{RemoteSession, SshSession};
use serde::Serialize;

use super::{CmdResult, TargetArgs};

#[derive(Args)]
pub struct MetadataArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataOutput {
    pub host: String,
    pub provider: &'static str,
    pub metadata: MetadataMap,
}

/// Connect and run the provider's metadata probes only.
pub fn run(args: MetadataArgs) -> CmdResult<MetadataOutput> {
    let config = args.target.to_config()?;
    let provider = strategy(config.profile.provider);

    let session = SshSession::open(&config.target)?;
    let metadata = provider.collect_metadata(&session);
    session.close();

    Ok((
        MetadataOutput {
            host: config.target.host.clone(),
            provider: config.profile.provider.as_str(),
            metadata,
        },
        0,
    ))
}
