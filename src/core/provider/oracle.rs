use crate::batch;
use crate::config::ProviderKind;
use crate::error::Result;
use crate::provider::{collect_with_common, IntegrationOutcome, MetadataMap, ProviderStrategy};
use crate::ssh::RemoteSession;

const PROBES: &[(&str, &str)] = &[
    (
        "instance-id",
        "curl -s -H 'Authorization: Bearer Oracle' http://169.254.169.254/opc/v2/instance/id",
    ),
    (
        "shape",
        "curl -s -H 'Authorization: Bearer Oracle' http://169.254.169.254/opc/v2/instance/shape",
    ),
    (
        "availability-domain",
        "curl -s -H 'Authorization: Bearer Oracle' http://169.254.169.254/opc/v2/instance/availabilityDomain",
    ),
    (
        "compartment-id",
        "curl -s -H 'Authorization: Bearer Oracle' http://169.254.169.254/opc/v2/instance/compartmentId",
    ),
];

/// OCI has no in-tree Kubernetes cloud provider, so there is no kubeadm flag
/// fragment and integration only leaves a placeholder config for the
/// out-of-tree cloud controller manager.
pub struct OracleStrategy;

impl ProviderStrategy for OracleStrategy {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Oracle
    }

    fn collect_metadata(&self, session: &dyn RemoteSession) -> MetadataMap {
        collect_with_common(session, PROBES)
    }

    fn setup_integration(&self, session: &dyn RemoteSession) -> Result<IntegrationOutcome> {
        log_status!(
            "provider",
            "OCI has no in-tree cloud provider; writing placeholder config only"
        );

        let commands = vec![
            "cat <<EOF | sudo tee /etc/kubernetes/oci.conf\n# Placeholder for the OCI cloud controller manager configuration.\n# See https://github.com/oracle/oci-cloud-controller-manager\nEOF"
                .to_string(),
            "sudo chmod 600 /etc/kubernetes/oci.conf".to_string(),
        ];
        batch::run_all(session, &commands)?;

        Ok(IntegrationOutcome::default())
    }

    fn kubeadm_options(&self) -> &'static str {
        ""
    }

    fn describe(&self) -> String {
        [
            "====== Oracle Cloud Provider Information ======",
            "For Oracle Cloud Infrastructure integration:",
            "1. Kubernetes has no in-tree OCI cloud provider; install the",
            "   out-of-tree OCI cloud controller manager after cluster init:",
            "   https://github.com/oracle/oci-cloud-controller-manager",
            "2. Ensure your instance is in a dynamic group with a policy",
            "   allowing it to manage load balancers and block volumes",
            "3. A placeholder /etc/kubernetes/oci.conf is written for the",
            "   controller manager to complete",
            "================================================",
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssh::testing::ScriptedSession;

    #[test]
    fn integration_writes_placeholder_without_secret_registration() {
        let session = ScriptedSession::succeeding();
        let outcome = OracleStrategy.setup_integration(&session).unwrap();
        assert!(outcome.warnings.is_empty());
        assert!(session.sent("/etc/kubernetes/oci.conf"));
        assert!(!session.sent("create secret"));
    }
}
