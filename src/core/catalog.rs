//! Per-stage command catalogs.
//!
//! Each builder returns the ordered shell commands for one installation
//! stage, selected by the target profile and the explicit package-manager
//! verb table. The batches are data: the pipeline feeds them through the
//! fail-fast batch runner without inspecting them.
//!
//! Commands that tolerate already-applied state carry `|| true`; order
//! within a batch is load-bearing (repository setup precedes the index
//! update that reads it).

use crate::config::{DistroFamily, PackageManager, ProviderKind, TargetProfile};

/// Stage 1: swap, kernel modules, sysctl, base packages, provider hostname.
pub fn prerequisites(profile: &TargetProfile, pm: &PackageManager) -> Vec<String> {
    let mut commands: Vec<String> = [
        "sudo swapoff -a",
        "sudo sed -i '/swap/d' /etc/fstab",
        "sudo modprobe overlay",
        "sudo modprobe br_netfilter",
        "echo '1' | sudo tee /proc/sys/net/ipv4/ip_forward",
        "echo '1' | sudo tee /proc/sys/net/bridge/bridge-nf-call-iptables",
        "echo '1' | sudo tee /proc/sys/net/bridge/bridge-nf-call-ip6tables",
        "cat <<EOF | sudo tee /etc/modules-load.d/k8s.conf\noverlay\nbr_netfilter\nEOF",
        "cat <<EOF | sudo tee /etc/sysctl.d/k8s.conf\nnet.bridge.bridge-nf-call-iptables = 1\nnet.bridge.bridge-nf-call-ip6tables = 1\nnet.ipv4.ip_forward = 1\nEOF",
        "sudo sysctl --system",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    match profile.distribution.family {
        DistroFamily::Debian => {
            commands.push(pm.update.to_string());
            commands.push(format!(
                "{} apt-transport-https ca-certificates curl software-properties-common gnupg lsb-release",
                pm.install
            ));
        }
        DistroFamily::Rhel => {
            commands.push("sudo setenforce 0 || true".to_string());
            commands.push(
                "sudo sed -i 's/^SELINUX=enforcing$/SELINUX=permissive/' /etc/selinux/config || true"
                    .to_string(),
            );
            commands.push(pm.update.to_string());
            commands.push(format!(
                "{} curl wget socat conntrack ebtables ipset",
                pm.install
            ));
        }
    }

    commands.push(hostname_command(profile.provider).to_string());

    commands
}

/// Provider-appropriate hostname setup, best-effort.
fn hostname_command(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Aws => {
            "sudo hostnamectl set-hostname $(curl -s http://169.254.169.254/latest/meta-data/local-hostname) || true"
        }
        ProviderKind::Gcp => {
            "sudo hostnamectl set-hostname $(curl -s -H 'Metadata-Flavor: Google' http://metadata.google.internal/computeMetadata/v1/instance/hostname | cut -d. -f1) || true"
        }
        ProviderKind::Azure => {
            "sudo hostnamectl set-hostname $(curl -s -H Metadata:true 'http://169.254.169.254/metadata/instance/compute/name?api-version=2019-06-01&format=text') || true"
        }
        // Oracle Cloud has no standard metadata service; reassert the
        // current hostname.
        ProviderKind::Oracle => "sudo hostnamectl set-hostname $(hostname) || true",
    }
}

/// Stage 2: containerd with systemd cgroup integration.
pub fn container_runtime(profile: &TargetProfile, pm: &PackageManager) -> Vec<String> {
    let mut commands = match profile.distribution.family {
        DistroFamily::Debian => vec![
            "sudo mkdir -p /etc/apt/keyrings".to_string(),
            format!(
                "curl -fsSL https://download.docker.com/linux/{}/gpg | sudo gpg --dearmor -o /etc/apt/keyrings/docker.gpg",
                profile.distribution.name
            ),
            format!(
                "echo \"deb [arch=$(dpkg --print-architecture) signed-by=/etc/apt/keyrings/docker.gpg] https://download.docker.com/linux/{} $(lsb_release -cs) stable\" | sudo tee /etc/apt/sources.list.d/docker.list > /dev/null",
                profile.distribution.name
            ),
            pm.update.to_string(),
            format!("{} containerd.io", pm.install),
        ],
        DistroFamily::Rhel => vec![
            format!("{} yum-utils device-mapper-persistent-data lvm2", pm.install),
            format!(
                "{} https://download.docker.com/linux/centos/docker-ce.repo",
                pm.add_repository
            ),
            format!("{} containerd.io", pm.install),
        ],
    };

    commands.extend(
        [
            "sudo mkdir -p /etc/containerd",
            "sudo containerd config default | sudo tee /etc/containerd/config.toml",
            "sudo sed -i 's/SystemdCgroup = false/SystemdCgroup = true/g' /etc/containerd/config.toml",
            "sudo systemctl restart containerd",
            "sudo systemctl enable containerd",
        ]
        .into_iter()
        .map(String::from),
    );

    commands
}

/// Stage 3: kubelet, kubeadm and kubectl, pinned against upgrades.
pub fn kubernetes_components(profile: &TargetProfile, pm: &PackageManager) -> Vec<String> {
    let mut commands = match profile.distribution.family {
        DistroFamily::Debian => vec![
            "sudo curl -fsSLo /etc/apt/keyrings/kubernetes-archive-keyring.gpg https://packages.cloud.google.com/apt/doc/apt-key.gpg".to_string(),
            "echo \"deb [signed-by=/etc/apt/keyrings/kubernetes-archive-keyring.gpg] https://apt.kubernetes.io/ kubernetes-xenial main\" | sudo tee /etc/apt/sources.list.d/kubernetes.list".to_string(),
            pm.update.to_string(),
            format!("{} kubelet kubeadm kubectl", pm.install),
            "sudo apt-mark hold kubelet kubeadm kubectl".to_string(),
        ],
        DistroFamily::Rhel => vec![
            "cat <<EOF | sudo tee /etc/yum.repos.d/kubernetes.repo\n[kubernetes]\nname=Kubernetes\nbaseurl=https://packages.cloud.google.com/yum/repos/kubernetes-el7-\\$basearch\nenabled=1\ngpgcheck=1\nrepo_gpgcheck=1\ngpgkey=https://packages.cloud.google.com/yum/doc/yum-key.gpg https://packages.cloud.google.com/yum/doc/rpm-package-key.gpg\nEOF".to_string(),
            format!("{} kubelet kubeadm kubectl --disableexcludes=kubernetes", pm.install),
        ],
    };

    commands.push("sudo systemctl enable --now kubelet".to_string());

    commands
}

/// Stage 4 follow-up: kubeconfig for the login user, pod network overlay,
/// and single-node scheduling.
pub fn cluster_access() -> Vec<String> {
    [
        "mkdir -p $HOME/.kube",
        "sudo cp -i /etc/kubernetes/admin.conf $HOME/.kube/config",
        "sudo chown $(id -u):$(id -g) $HOME/.kube/config",
        "kubectl apply -f https://raw.githubusercontent.com/flannel-io/flannel/master/Documentation/kube-flannel.yml",
        // Allow pods on the control-plane node; a single-node install has
        // nowhere else to schedule them.
        "kubectl taint nodes --all node-role.kubernetes.io/control-plane-",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// The cluster-bootstrap command, with the provider's flag fragment appended
/// when it has one.
pub fn kubeadm_init(provider_options: &str) -> String {
    let base = "sudo kubeadm init --pod-network-cidr=10.244.0.0/16";
    if provider_options.is_empty() {
        base.to_string()
    } else {
        format!("{} {}", base, provider_options)
    }
}
