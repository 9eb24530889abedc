use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{info, install, metadata, plan};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "nodesmith")]
#[command(version = VERSION)]
#[command(about = "Provision Kubernetes nodes on cloud VMs over SSH")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full provisioning pipeline against a target host
    Install(install::InstallArgs),
    /// Preview the per-stage command batches without connecting
    Plan(plan::PlanArgs),
    /// Collect provider and system metadata from a target host
    Metadata(metadata::MetadataArgs),
    /// Show a provider's cloud integration notes
    Info(info::InfoArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let (json_result, exit_code) = commands::run_json(cli.command);
    if output::print_json_result(json_result).is_err() {
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
