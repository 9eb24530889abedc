//! The provisioning pipeline: five ordered stages, fail-fast, with the
//! stage name attached to any failure.

use serde::Serialize;

use crate::batch;
use crate::catalog;
use crate::config::{InstallConfig, PackageManager, TargetProfile};
use crate::error::{Error, Result};
use crate::provider::{strategy, MetadataMap, ProviderStrategy};
use crate::ssh::{RemoteSession, SshSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prerequisites,
    ContainerRuntime,
    KubernetesComponents,
    ClusterInit,
    CloudIntegration,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Prerequisites,
        Stage::ContainerRuntime,
        Stage::KubernetesComponents,
        Stage::ClusterInit,
        Stage::CloudIntegration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Prerequisites => "prerequisites",
            Stage::ContainerRuntime => "container-runtime",
            Stage::KubernetesComponents => "kubernetes-components",
            Stage::ClusterInit => "cluster-init",
            Stage::CloudIntegration => "cloud-integration",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageResult {
    pub stage: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallReport {
    pub host: String,
    pub provider: &'static str,
    pub distribution: String,
    pub metadata: MetadataMap,
    pub stages: Vec<StageResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_command: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagePlan {
    pub stage: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
    /// Set when the batch is assembled at run time from probed instance
    /// metadata and cannot be previewed.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dynamic: bool,
}

/// Full provisioning run: open the session, execute the stages, and close
/// the session on every path before returning.
pub fn run(config: &InstallConfig) -> Result<InstallReport> {
    let session = SshSession::open(&config.target)?;
    run_and_close(&session, config)
}

fn run_and_close(session: &dyn RemoteSession, config: &InstallConfig) -> Result<InstallReport> {
    let outcome = run_stages(session, config);
    session.close();
    outcome
}

/// Execute the five stages in order against an established session,
/// stopping at the first failure and naming the failed stage.
pub fn run_stages(session: &dyn RemoteSession, config: &InstallConfig) -> Result<InstallReport> {
    let provider = strategy(config.profile.provider);
    let pm = PackageManager::for_family(config.profile.distribution.family);

    log_status!(
        "install",
        "Collecting {} instance metadata",
        config.profile.provider.as_str()
    );
    let metadata = provider.collect_metadata(session);
    for (key, value) in &metadata {
        log_status!("install", "  {}: {}", key, value);
    }

    let mut report = InstallReport {
        host: config.target.host.clone(),
        provider: config.profile.provider.as_str(),
        distribution: config.profile.distribution.name.clone(),
        metadata,
        stages: Vec::new(),
        join_command: None,
    };

    for stage in Stage::ALL {
        log_status!("install", "Stage: {}", stage.as_str());
        let result = run_stage(session, config, provider, &pm, stage, &mut report)
            .map_err(|cause| Error::install_stage_failed(stage.as_str(), &cause))?;
        report.stages.push(result);
    }

    log_status!("install", "All stages completed on {}", report.host);
    Ok(report)
}

fn run_stage(
    session: &dyn RemoteSession,
    config: &InstallConfig,
    provider: &'static dyn ProviderStrategy,
    pm: &PackageManager,
    stage: Stage,
    report: &mut InstallReport,
) -> Result<StageResult> {
    let mut warnings = Vec::new();

    match stage {
        Stage::Prerequisites => {
            batch::run_all(session, &catalog::prerequisites(&config.profile, pm))?;
        }
        Stage::ContainerRuntime => {
            batch::run_all(session, &catalog::container_runtime(&config.profile, pm))?;
        }
        Stage::KubernetesComponents => {
            batch::run_all(session, &catalog::kubernetes_components(&config.profile, pm))?;
        }
        Stage::ClusterInit => {
            let init = catalog::kubeadm_init(provider.kubeadm_options());
            session.run(&init)?;
            batch::run_all(session, &catalog::cluster_access())?;

            // Join-token creation is informational; its failure must not
            // undo an otherwise initialized control plane.
            let join = session.execute("sudo kubeadm token create --print-join-command");
            if join.success {
                report.join_command = Some(join.stdout.trim().to_string());
            } else {
                let message = "could not create a join command for worker nodes".to_string();
                log_status!("install", "Warning: {}", message);
                warnings.push(message);
            }
        }
        Stage::CloudIntegration => {
            let outcome = provider.setup_integration(session)?;
            warnings.extend(outcome.warnings);
        }
    }

    Ok(StageResult {
        stage: stage.as_str(),
        warnings,
    })
}

/// Preview the per-stage batches for a resolved profile without connecting.
/// The cloud integration batch depends on probed instance values, so it is
/// marked dynamic instead of listed.
pub fn plan(profile: &TargetProfile) -> Vec<StagePlan> {
    let provider = strategy(profile.provider);
    let pm = PackageManager::for_family(profile.distribution.family);

    Stage::ALL
        .iter()
        .map(|stage| {
            let (commands, dynamic) = match stage {
                Stage::Prerequisites => (catalog::prerequisites(profile, &pm), false),
                Stage::ContainerRuntime => (catalog::container_runtime(profile, &pm), false),
                Stage::KubernetesComponents => (catalog::kubernetes_components(profile, &pm), false),
                Stage::ClusterInit => {
                    let mut commands = vec![catalog::kubeadm_init(provider.kubeadm_options())];
                    commands.extend(catalog::cluster_access());
                    commands.push("sudo kubeadm token create --print-join-command".to_string());
                    (commands, false)
                }
                Stage::CloudIntegration => (Vec::new(), true),
            };
            StagePlan {
                stage: stage.as_str(),
                commands,
                dynamic,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssh::testing::ScriptedSession;

    fn config(provider: &str, distro: &str) -> InstallConfig {
        InstallConfig::new(
            "10.0.0.5",
            22,
            Some("admin"),
            Some("~/.ssh/id_rsa"),
            None,
            provider,
            Some(distro),
        )
        .unwrap()
    }

    #[test]
    fn all_stages_run_in_order_on_success() {
        let session = ScriptedSession::succeeding().with_stdout(|_| "ok".to_string());
        let report = run_stages(&session, &config("aws", "ubuntu")).unwrap();

        assert_eq!(report.stages.len(), 5);
        let names: Vec<_> = report.stages.iter().map(|s| s.stage).collect();
        assert_eq!(
            names,
            vec![
                "prerequisites",
                "container-runtime",
                "kubernetes-components",
                "cluster-init",
                "cloud-integration",
            ]
        );
    }

    #[test]
    fn failure_aborts_before_the_next_stage_sends_anything() {
        // Container runtime fails on containerd install; no Kubernetes
        // component command may reach the session afterwards.
        let session = ScriptedSession::failing_when(|c| c.contains("containerd.io"));
        let err = run_stages(&session, &config("gcp", "debian")).unwrap_err();

        assert_eq!(err.code.as_str(), "install.stage_failed");
        assert!(err.message.contains("container-runtime"));
        assert!(!session.sent("kubelet"));
        assert!(!session.sent("kubeadm init"));
    }

    #[test]
    fn stage_failure_names_the_stage_and_keeps_the_cause() {
        let session = ScriptedSession::failing_when(|c| c.starts_with("sudo kubeadm init"));
        let err = run_stages(&session, &config("azure", "ubuntu")).unwrap_err();

        assert_eq!(err.code.as_str(), "install.stage_failed");
        let details = err.details.as_object().unwrap();
        assert_eq!(details["stage"], "cluster-init");
        assert_eq!(details["causeCode"], "remote.command_failed");
    }

    #[test]
    fn join_token_failure_is_downgraded_to_a_stage_warning() {
        let session = ScriptedSession::failing_when(|c| c.contains("token create"))
            .with_stdout(|_| "ok".to_string());
        let report = run_stages(&session, &config("oracle", "oracle")).unwrap();

        assert!(report.join_command.is_none());
        let cluster_init = report
            .stages
            .iter()
            .find(|s| s.stage == "cluster-init")
            .unwrap();
        assert_eq!(cluster_init.warnings.len(), 1);
    }

    #[test]
    fn join_command_is_captured_on_success() {
        let session = ScriptedSession::succeeding().with_stdout(|c| {
            if c.contains("token create") {
                "kubeadm join 10.0.0.5:6443 --token abc.def\n".to_string()
            } else {
                "ok".to_string()
            }
        });
        let report = run_stages(&session, &config("aws", "ubuntu")).unwrap();
        assert_eq!(
            report.join_command.as_deref(),
            Some("kubeadm join 10.0.0.5:6443 --token abc.def")
        );
    }

    #[test]
    fn session_is_closed_exactly_once_on_success() {
        let session = ScriptedSession::succeeding();
        run_and_close(&session, &config("aws", "amazon")).unwrap();
        assert_eq!(session.close_calls.get(), 1);
    }

    #[test]
    fn session_is_closed_exactly_once_on_stage_abort() {
        let session = ScriptedSession::failing_when(|c| c.contains("swapoff"));
        run_and_close(&session, &config("azure", "centos")).unwrap_err();
        assert_eq!(session.close_calls.get(), 1);
    }

    #[test]
    fn cluster_init_appends_provider_options() {
        let session = ScriptedSession::succeeding();
        run_stages(&session, &config("aws", "ubuntu")).unwrap();
        assert!(session.sent("--cloud-provider=aws --cloud-config=/etc/kubernetes/cloud.conf"));

        let session = ScriptedSession::succeeding();
        run_stages(&session, &config("oracle", "oracle")).unwrap();
        let init = session
            .executed_commands()
            .into_iter()
            .find(|c| c.starts_with("sudo kubeadm init"))
            .unwrap();
        assert_eq!(init, "sudo kubeadm init --pod-network-cidr=10.244.0.0/16");
    }

    #[test]
    fn plan_previews_static_stages_and_marks_integration_dynamic() {
        let profile = config("gcp", "debian").profile;
        let plans = plan(&profile);

        assert_eq!(plans.len(), 5);
        for stage_plan in &plans[..4] {
            assert!(!stage_plan.commands.is_empty(), "{}", stage_plan.stage);
            assert!(!stage_plan.dynamic);
        }
        assert!(plans[4].dynamic);
        assert!(plans[3]
            .commands
            .iter()
            .any(|c| c.contains("--cloud-provider=gce")));
    }

    #[test]
    fn integration_warnings_land_on_the_stage_result() {
        // AWS IAM probe returns empty, which the strategy records as a
        // warning without failing the stage.
        let session = ScriptedSession::succeeding().with_stdout(|c| {
            if c.contains("security-credentials") {
                String::new()
            } else {
                "ok".to_string()
            }
        });
        let report = run_stages(&session, &config("aws", "ubuntu")).unwrap();
        let integration = report
            .stages
            .iter()
            .find(|s| s.stage == "cloud-integration")
            .unwrap();
        assert_eq!(integration.warnings.len(), 1);
    }
}
