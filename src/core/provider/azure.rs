use crate::batch;
use crate::config::ProviderKind;
use crate::error::Result;
use crate::provider::{collect_with_common, IntegrationOutcome, MetadataMap, ProviderStrategy};
use crate::ssh::RemoteSession;

const IMDS_SUBSCRIPTION: &str = "curl -s -H Metadata:true 'http://169.254.169.254/metadata/instance/compute/subscriptionId?api-version=2019-06-01&format=text'";
const IMDS_RESOURCE_GROUP: &str = "curl -s -H Metadata:true 'http://169.254.169.254/metadata/instance/compute/resourceGroupName?api-version=2019-06-01&format=text'";
const IMDS_LOCATION: &str = "curl -s -H Metadata:true 'http://169.254.169.254/metadata/instance/compute/location?api-version=2019-06-01&format=text'";

const PROBES: &[(&str, &str)] = &[
    (
        "vm-name",
        "curl -s -H Metadata:true 'http://169.254.169.254/metadata/instance/compute/name?api-version=2019-06-01&format=text'",
    ),
    ("resource-group", IMDS_RESOURCE_GROUP),
    ("subscription-id", IMDS_SUBSCRIPTION),
    ("location", IMDS_LOCATION),
    (
        "vm-size",
        "curl -s -H Metadata:true 'http://169.254.169.254/metadata/instance/compute/vmSize?api-version=2019-06-01&format=text'",
    ),
    (
        "public-ipv4",
        "curl -s -H Metadata:true 'http://169.254.169.254/metadata/instance/network/interface/0/ipv4/ipAddress/0/publicIpAddress?api-version=2019-06-01&format=text'",
    ),
];

pub struct AzureStrategy;

impl AzureStrategy {
    /// Best-effort IMDS lookup; empty string when the probe fails.
    fn imds_value(session: &dyn RemoteSession, command: &str) -> String {
        let output = session.execute(command);
        if output.success {
            output.stdout.trim().to_string()
        } else {
            String::new()
        }
    }
}

impl ProviderStrategy for AzureStrategy {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Azure
    }

    fn collect_metadata(&self, session: &dyn RemoteSession) -> MetadataMap {
        collect_with_common(session, PROBES)
    }

    fn setup_integration(&self, session: &dyn RemoteSession) -> Result<IntegrationOutcome> {
        let mut outcome = IntegrationOutcome::default();

        let subscription_id = Self::imds_value(session, IMDS_SUBSCRIPTION);
        let resource_group = Self::imds_value(session, IMDS_RESOURCE_GROUP);
        let location = Self::imds_value(session, IMDS_LOCATION);
        if subscription_id.is_empty() || resource_group.is_empty() || location.is_empty() {
            outcome.warn(
                "Azure instance metadata incomplete; cloud provider integration may not work correctly",
            );
        }

        let commands = vec![
            format!(
                "cat <<EOF | sudo tee /etc/kubernetes/azure.json\n{{\n  \"cloud\": \"AzurePublicCloud\",\n  \"tenantId\": \"\",\n  \"subscriptionId\": \"{}\",\n  \"resourceGroup\": \"{}\",\n  \"location\": \"{}\",\n  \"useManagedIdentityExtension\": true,\n  \"useInstanceMetadata\": true\n}}\nEOF",
                subscription_id, resource_group, location
            ),
            "sudo chmod 600 /etc/kubernetes/azure.json".to_string(),
            "kubectl -n kube-system create secret generic azure-cloud-provider --from-file=/etc/kubernetes/azure.json || true"
                .to_string(),
        ];
        batch::run_all(session, &commands)?;

        Ok(outcome)
    }

    fn kubeadm_options(&self) -> &'static str {
        "--cloud-provider=azure --cloud-config=/etc/kubernetes/azure.json"
    }

    fn describe(&self) -> String {
        [
            "====== Azure Cloud Provider Information ======",
            "For Azure cloud provider integration:",
            "1. Ensure your VM has a Managed Identity with:",
            "   - Contributor role on the resource group",
            "   - Network Contributor role (for load balancer configuration)",
            "2. For load balancers, ensure your network is properly configured with:",
            "   - Network security group allowing health probe traffic",
            "   - Firewall rules allowing port 10256 for health checks",
            "3. For multi-node clusters, all VMs should be in the same resource group",
            "4. For more information, visit:",
            "   https://kubernetes.io/docs/concepts/cluster-administration/cloud-providers/#azure",
            "================================================",
        ]
        .join("\n")
    }
}
