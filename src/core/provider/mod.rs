//! Cloud-provider strategies.
//!
//! Each provider supplies four capabilities: best-effort metadata probes,
//! cloud integration setup, the kubeadm flag fragment, and a human-facing
//! integration summary. Metadata collection never fails — a probe that
//! errors is logged and its key omitted. Integration setup is fail-fast on
//! its commands but downgrades unmet preconditions (missing IAM role,
//! incomplete IMDS data, absent OAuth scope) to warnings.

mod aws;
mod azure;
mod gcp;
mod oracle;

pub use aws::AwsStrategy;
pub use azure::AzureStrategy;
pub use gcp::GcpStrategy;
pub use oracle::OracleStrategy;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::ProviderKind;
use crate::error::Result;
use crate::ssh::RemoteSession;

/// Metadata gathered from the target, keyed by probe name. Missing keys mean
/// the probe failed or returned nothing.
pub type MetadataMap = BTreeMap<String, String>;

/// Result of integration setup: the commands succeeded, possibly with
/// precondition warnings the operator should read.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationOutcome {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl IntegrationOutcome {
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log_status!("provider", "Warning: {}", message);
        self.warnings.push(message);
    }
}

pub trait ProviderStrategy {
    fn kind(&self) -> ProviderKind;

    /// Run the provider's probe commands plus the common set. Individual
    /// probe failures are recorded as absence, never as an error.
    fn collect_metadata(&self, session: &dyn RemoteSession) -> MetadataMap;

    /// Write the provider's cloud config artifact, restrict its permissions,
    /// and register it as a cluster secret.
    fn setup_integration(&self, session: &dyn RemoteSession) -> Result<IntegrationOutcome>;

    /// Flag fragment appended to `kubeadm init`. Empty for providers with no
    /// native integration.
    fn kubeadm_options(&self) -> &'static str;

    /// Informational text about the provider's integration requirements.
    fn describe(&self) -> String;
}

/// Select the strategy for a validated provider kind. Unknown kinds were
/// rejected at configuration time, so the selection is total.
pub fn strategy(kind: ProviderKind) -> &'static dyn ProviderStrategy {
    match kind {
        ProviderKind::Aws => &AwsStrategy,
        ProviderKind::Gcp => &GcpStrategy,
        ProviderKind::Azure => &AzureStrategy,
        ProviderKind::Oracle => &OracleStrategy,
    }
}

/// System probes shared by every provider.
const COMMON_PROBES: &[(&str, &str)] = &[
    ("hostname", "hostname"),
    ("kernel", "uname -a"),
    ("cpus", "lscpu | grep '^CPU(s):'"),
    ("memory", "free -m | grep '^Mem:'"),
];

/// Run a probe list, inserting trimmed stdout under each key. Failures are
/// logged and omitted.
pub(crate) fn probe_into(
    metadata: &mut MetadataMap,
    session: &dyn RemoteSession,
    probes: &[(&str, &str)],
) {
    for (key, command) in probes {
        let output = session.execute(command);
        if output.success {
            metadata.insert(key.to_string(), output.stdout.trim().to_string());
        } else {
            log_status!("provider", "Warning: metadata probe '{}' failed", key);
        }
    }
}

pub(crate) fn collect_with_common(
    session: &dyn RemoteSession,
    probes: &[(&str, &str)],
) -> MetadataMap {
    let mut metadata = MetadataMap::new();
    probe_into(&mut metadata, session, probes);
    probe_into(&mut metadata, session, COMMON_PROBES);
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssh::testing::ScriptedSession;

    #[test]
    fn kubeadm_options_empty_exactly_for_oracle() {
        for kind in ProviderKind::ALL {
            let options = strategy(kind).kubeadm_options();
            if kind == ProviderKind::Oracle {
                assert!(options.is_empty());
            } else {
                assert!(!options.is_empty(), "{:?}", kind);
            }
        }
    }

    #[test]
    fn strategy_selection_matches_kind() {
        for kind in ProviderKind::ALL {
            assert_eq!(strategy(kind).kind(), kind);
        }
    }

    #[test]
    fn descriptions_are_nonempty_and_provider_specific() {
        let mut seen = Vec::new();
        for kind in ProviderKind::ALL {
            let text = strategy(kind).describe();
            assert!(!text.trim().is_empty());
            assert!(!seen.contains(&text));
            seen.push(text);
        }
    }

    #[test]
    fn metadata_collection_never_fails() {
        // Every probe failing yields an empty map, not an error.
        let session = ScriptedSession::failing_when(|_| true);
        for kind in ProviderKind::ALL {
            let metadata = strategy(kind).collect_metadata(&session);
            assert!(metadata.is_empty(), "{:?}", kind);
        }
    }

    #[test]
    fn partial_probe_failure_omits_only_the_failed_keys() {
        let session = ScriptedSession::failing_when(|c| c != "hostname" && c != "uname -a")
            .with_stdout(|c| format!("{}-value\n", c));
        let metadata = strategy(ProviderKind::Aws).collect_metadata(&session);

        assert_eq!(metadata.get("hostname").unwrap(), "hostname-value");
        assert_eq!(metadata.get("kernel").unwrap(), "uname -a-value");
        assert!(!metadata.contains_key("instance-id"));
    }

    #[test]
    fn metadata_values_are_trimmed() {
        let session = ScriptedSession::succeeding().with_stdout(|_| "  node-1\n".to_string());
        let metadata = strategy(ProviderKind::Oracle).collect_metadata(&session);
        assert_eq!(metadata.get("hostname").unwrap(), "node-1");
    }

    #[test]
    fn every_integration_restricts_config_permissions() {
        for kind in ProviderKind::ALL {
            let session = ScriptedSession::succeeding().with_stdout(|_| "value".to_string());
            strategy(kind).setup_integration(&session).unwrap();
            assert!(session.sent("chmod 600"), "{:?}", kind);
        }
    }

    #[test]
    fn secret_registration_is_tolerated_when_control_plane_is_not_ready() {
        // The kubectl secret command carries `|| true` so a not-yet-ready
        // control plane cannot fail the stage.
        for kind in [ProviderKind::Aws, ProviderKind::Gcp, ProviderKind::Azure] {
            let session = ScriptedSession::succeeding().with_stdout(|_| "value".to_string());
            strategy(kind).setup_integration(&session).unwrap();
            let secret_cmd = session
                .executed_commands()
                .into_iter()
                .find(|c| c.contains("create secret generic"))
                .unwrap();
            assert!(secret_cmd.ends_with("|| true"), "{:?}", kind);
        }
    }
}
