use crate::batch;
use crate::config::ProviderKind;
use crate::error::Result;
use crate::provider::{collect_with_common, IntegrationOutcome, MetadataMap, ProviderStrategy};
use crate::ssh::RemoteSession;

const PROBES: &[(&str, &str)] = &[
    (
        "instance-id",
        "curl -s -H 'Metadata-Flavor: Google' http://metadata.google.internal/computeMetadata/v1/instance/id",
    ),
    (
        "machine-type",
        "curl -s -H 'Metadata-Flavor: Google' http://metadata.google.internal/computeMetadata/v1/instance/machine-type",
    ),
    (
        "zone",
        "curl -s -H 'Metadata-Flavor: Google' http://metadata.google.internal/computeMetadata/v1/instance/zone",
    ),
    (
        "project-id",
        "curl -s -H 'Metadata-Flavor: Google' http://metadata.google.internal/computeMetadata/v1/project/project-id",
    ),
    (
        "external-ip",
        "curl -s -H 'Metadata-Flavor: Google' http://metadata.google.internal/computeMetadata/v1/instance/network-interfaces/0/access-configs/0/external-ip",
    ),
];

pub struct GcpStrategy;

impl ProviderStrategy for GcpStrategy {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gcp
    }

    fn collect_metadata(&self, session: &dyn RemoteSession) -> MetadataMap {
        collect_with_common(session, PROBES)
    }

    fn setup_integration(&self, session: &dyn RemoteSession) -> Result<IntegrationOutcome> {
        let mut outcome = IntegrationOutcome::default();

        // Service account scope check is advisory only.
        let scopes = session.execute(
            "curl -s -H 'Metadata-Flavor: Google' http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/scopes",
        );
        if !scopes.success || !scopes.stdout.contains("compute") {
            outcome.warn(
                "instance service account lacks a compute scope; cloud provider integration \
                 may not work correctly",
            );
        }

        // The config file needs the project id, so its probe failing fails
        // the integration rather than producing an unusable artifact.
        let project_id = session
            .run("curl -s -H 'Metadata-Flavor: Google' http://metadata.google.internal/computeMetadata/v1/project/project-id")?
            .trim()
            .to_string();

        let commands = vec![
            format!(
                "cat <<EOF | sudo tee /etc/kubernetes/gce.conf\n[global]\nproject-id = {}\nnode-tags = k8s-node\nnode-instance-prefix = k8s\nEOF",
                project_id
            ),
            "sudo chmod 600 /etc/kubernetes/gce.conf".to_string(),
            "kubectl -n kube-system create secret generic gcp-cloud-provider --from-file=/etc/kubernetes/gce.conf || true"
                .to_string(),
        ];
        batch::run_all(session, &commands)?;

        Ok(outcome)
    }

    fn kubeadm_options(&self) -> &'static str {
        "--cloud-provider=gce --cloud-config=/etc/kubernetes/gce.conf"
    }

    fn describe(&self) -> String {
        [
            "====== GCP Cloud Provider Information ======",
            "For GCP cloud provider integration:",
            "1. Ensure your instance's service account has the following roles:",
            "   - Compute Admin",
            "   - Service Account User",
            "2. The instance must be created with the compute-rw access scope",
            "3. For load balancers, firewall rules must allow health check ranges:",
            "   - 35.191.0.0/16 and 130.211.0.0/22",
            "4. For more information, visit:",
            "   https://kubernetes.io/docs/concepts/cluster-administration/cloud-providers/#gce",
            "================================================",
        ]
        .join("\n")
    }
}
