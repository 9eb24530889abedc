use crate::batch;
use crate::config::ProviderKind;
use crate::error::Result;
use crate::provider::{collect_with_common, IntegrationOutcome, MetadataMap, ProviderStrategy};
use crate::ssh::RemoteSession;

const PROBES: &[(&str, &str)] = &[
    (
        "instance-id",
        "curl -s http://169.254.169.254/latest/meta-data/instance-id",
    ),
    (
        "instance-type",
        "curl -s http://169.254.169.254/latest/meta-data/instance-type",
    ),
    (
        "availability-zone",
        "curl -s http://169.254.169.254/latest/meta-data/placement/availability-zone",
    ),
    (
        "region",
        "curl -s http://169.254.169.254/latest/meta-data/placement/availability-zone | sed 's/[a-z]$//'",
    ),
    (
        "local-hostname",
        "curl -s http://169.254.169.254/latest/meta-data/local-hostname",
    ),
    (
        "public-ipv4",
        "curl -s http://169.254.169.254/latest/meta-data/public-ipv4",
    ),
];

pub struct AwsStrategy;

impl ProviderStrategy for AwsStrategy {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Aws
    }

    fn collect_metadata(&self, session: &dyn RemoteSession) -> MetadataMap {
        collect_with_common(session, PROBES)
    }

    fn setup_integration(&self, session: &dyn RemoteSession) -> Result<IntegrationOutcome> {
        let mut outcome = IntegrationOutcome::default();

        // Instance role check is advisory only.
        let iam = session
            .execute("curl -s http://169.254.169.254/latest/meta-data/iam/security-credentials/");
        if !iam.success || iam.stdout.trim().is_empty() {
            outcome.warn(
                "no IAM role found for this instance; attach a role with EC2 permissions \
                 or the cloud provider integration will not work",
            );
        }

        let commands = vec![
            "cat <<EOF | sudo tee /etc/kubernetes/cloud.conf\n[global]\nKubernetesClusterID=kubernetes\nEOF"
                .to_string(),
            "sudo chmod 600 /etc/kubernetes/cloud.conf".to_string(),
            "kubectl -n kube-system create secret generic aws-cloud-provider --from-file=/etc/kubernetes/cloud.conf || true"
                .to_string(),
        ];
        batch::run_all(session, &commands)?;

        Ok(outcome)
    }

    fn kubeadm_options(&self) -> &'static str {
        "--cloud-provider=aws --cloud-config=/etc/kubernetes/cloud.conf"
    }

    fn describe(&self) -> String {
        [
            "====== AWS Cloud Provider Information ======",
            "For AWS cloud provider integration:",
            "1. Ensure your EC2 instance has an IAM role with the following permissions:",
            "   - AmazonEC2FullAccess",
            "   - AmazonRoute53FullAccess (if using Route53 for DNS)",
            "2. Tag your AWS resources with the following tags:",
            "   - KubernetesCluster=<your-cluster-name>",
            "3. For load balancers, add the following tags to your subnets:",
            "   - kubernetes.io/cluster/<your-cluster-name>=shared",
            "4. For more information, visit:",
            "   https://kubernetes.io/docs/concepts/cluster-administration/cloud-providers/#aws",
            "================================================",
        ]
        .join("\n")
    }
}
