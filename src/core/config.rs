//! Validated connection + target configuration.
//!
//! The CLI layer parses flags and funnels them through [`InstallConfig::new`];
//! everything downstream (session, catalogs, providers, pipeline) consumes
//! the validated config and never re-checks provider or distribution names.

use serde::Serialize;

use crate::error::{Error, Result};

/// Cloud provider hosting the target machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Aws,
    Gcp,
    Azure,
    Oracle,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Aws,
        ProviderKind::Gcp,
        ProviderKind::Azure,
        ProviderKind::Oracle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Aws => "aws",
            ProviderKind::Gcp => "gcp",
            ProviderKind::Azure => "azure",
            ProviderKind::Oracle => "oracle",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "aws" => Ok(ProviderKind::Aws),
            "gcp" => Ok(ProviderKind::Gcp),
            "azure" => Ok(ProviderKind::Azure),
            "oracle" => Ok(ProviderKind::Oracle),
            _ => Err(Error::validation_invalid_argument(
                "provider",
                "Unknown cloud provider",
                Some(value.to_string()),
                Some(vec![
                    "aws".to_string(),
                    "gcp".to_string(),
                    "azure".to_string(),
                    "oracle".to_string(),
                ]),
            )),
        }
    }
}

/// Package-manager lineage of the distribution. Drives which command
/// catalog variant and which verb table a stage uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistroFamily {
    Debian,
    Rhel,
}

impl DistroFamily {
    pub const ALL: [DistroFamily; 2] = [DistroFamily::Debian, DistroFamily::Rhel];

    pub fn as_str(&self) -> &'static str {
        match self {
            DistroFamily::Debian => "debian",
            DistroFamily::Rhel => "rhel",
        }
    }
}

const KNOWN_DISTRIBUTIONS: &[(&str, DistroFamily)] = &[
    ("ubuntu", DistroFamily::Debian),
    ("debian", DistroFamily::Debian),
    ("centos", DistroFamily::Rhel),
    ("rhel", DistroFamily::Rhel),
    ("amazon", DistroFamily::Rhel),
    ("oracle", DistroFamily::Rhel),
];

/// Validated distribution name plus its derived family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub name: String,
    pub family: DistroFamily,
}

impl Distribution {
    pub fn parse(value: &str) -> Result<Self> {
        let name = value.to_lowercase();
        let family = KNOWN_DISTRIBUTIONS
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, family)| *family)
            .ok_or_else(|| {
                Error::validation_invalid_argument(
                    "distro",
                    "Unknown Linux distribution",
                    Some(value.to_string()),
                    Some(
                        KNOWN_DISTRIBUTIONS
                            .iter()
                            .map(|(known, _)| known.to_string())
                            .collect(),
                    ),
                )
            })?;

        Ok(Self { name, family })
    }
}

/// How the session authenticates. Exactly one form is ever present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Path to a private key file (tilde-expanded, must exist).
    KeyFile(String),
    Password(String),
}

/// One authenticated endpoint: where to connect and as whom.
#[derive(Debug, Clone)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub credential: Credential,
}

/// What kind of machine is being provisioned.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetProfile {
    pub provider: ProviderKind,
    pub distribution: Distribution,
}

impl TargetProfile {
    /// Resolve a profile from raw flag values, falling back to the
    /// provider's default distribution when none is given.
    pub fn resolve(provider: &str, distribution: Option<&str>) -> Result<Self> {
        let provider = ProviderKind::parse(provider)?;
        let distribution = match distribution.filter(|d| !d.is_empty()) {
            Some(d) => Distribution::parse(d)?,
            None => Distribution::parse(default_distribution(provider))?,
        };
        Ok(Self {
            provider,
            distribution,
        })
    }
}

/// The full validated configuration the pipeline runs from.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    pub target: ConnectionTarget,
    pub profile: TargetProfile,
}

impl InstallConfig {
    /// Build a validated config from raw flag values, applying the
    /// per-provider defaults for user and distribution.
    pub fn new(
        host: &str,
        port: u16,
        user: Option<&str>,
        key_path: Option<&str>,
        password: Option<&str>,
        provider: &str,
        distribution: Option<&str>,
    ) -> Result<Self> {
        if host.is_empty() {
            return Err(Error::validation_missing_argument(vec!["host".to_string()]));
        }

        let profile = TargetProfile::resolve(provider, distribution)?;

        let credential = match (
            key_path.filter(|k| !k.is_empty()),
            password.filter(|p| !p.is_empty()),
        ) {
            (Some(key), None) => Credential::KeyFile(key.to_string()),
            (None, Some(password)) => Credential::Password(password.to_string()),
            (Some(_), Some(_)) => {
                return Err(Error::validation_invalid_argument(
                    "credential",
                    "Provide either a private key or a password, not both",
                    None,
                    None,
                ))
            }
            (None, None) => {
                return Err(Error::ssh_target_invalid(
                    host.to_string(),
                    vec!["key".to_string(), "password".to_string()],
                )
                .with_hint("Pass --key <path> for key auth or --password for password auth"))
            }
        };

        let user = match user.filter(|u| !u.is_empty()) {
            Some(u) => u.to_string(),
            None => default_user(profile.provider, &profile.distribution.name).to_string(),
        };

        Ok(Self {
            target: ConnectionTarget {
                host: host.to_string(),
                port,
                user,
                credential,
            },
            profile,
        })
    }
}

/// Default SSH user for a provider's stock images.
fn default_user(provider: ProviderKind, distribution: &str) -> &'static str {
    match provider {
        ProviderKind::Aws => {
            if distribution == "ubuntu" {
                "ubuntu"
            } else {
                "ec2-user"
            }
        }
        ProviderKind::Gcp => {
            if distribution == "ubuntu" {
                "ubuntu"
            } else {
                "google_user"
            }
        }
        ProviderKind::Azure => {
            if distribution == "ubuntu" {
                "azureuser"
            } else {
                "adminuser"
            }
        }
        ProviderKind::Oracle => {
            if distribution == "ubuntu" {
                "ubuntu"
            } else {
                "opc"
            }
        }
    }
}

/// Default distribution for a provider's stock images.
fn default_distribution(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Aws => "amazon",
        ProviderKind::Gcp => "debian",
        ProviderKind::Azure => "ubuntu",
        ProviderKind::Oracle => "oracle",
    }
}

/// Explicit package-manager verb table for a distribution family.
///
/// Passed into catalog builders so stage command content never depends on
/// ambient state.
#[derive(Debug, Clone, Copy)]
pub struct PackageManager {
    pub update: &'static str,
    pub install: &'static str,
    pub add_repository: &'static str,
}

impl PackageManager {
    pub fn for_family(family: DistroFamily) -> Self {
        match family {
            DistroFamily::Debian => Self {
                update: "sudo apt-get update",
                install: "sudo apt-get install -y",
                add_repository: "sudo apt-add-repository",
            },
            DistroFamily::Rhel => Self {
                update: "sudo yum update -y",
                install: "sudo yum install -y",
                add_repository: "sudo yum-config-manager --add-repo",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn rejects_missing_host() {
        let err = InstallConfig::new("", 22, None, Some("/k"), None, "aws", None).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationMissingArgument);
    }

    #[test]
    fn rejects_unknown_provider() {
        let err =
            InstallConfig::new("10.0.0.1", 22, None, Some("/k"), None, "digitalocean", None)
                .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationInvalidArgument);
    }

    #[test]
    fn rejects_unknown_distribution() {
        let err = InstallConfig::new(
            "10.0.0.1",
            22,
            None,
            Some("/k"),
            None,
            "aws",
            Some("arch"),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationInvalidArgument);
    }

    #[test]
    fn rejects_missing_credential_before_any_connection() {
        let err = InstallConfig::new("10.0.0.1", 22, None, None, None, "aws", None).unwrap_err();
        assert_eq!(err.code, ErrorCode::SshTargetInvalid);
    }

    #[test]
    fn rejects_both_credential_forms() {
        let err = InstallConfig::new(
            "10.0.0.1",
            22,
            None,
            Some("/k"),
            Some("hunter2"),
            "aws",
            None,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationInvalidArgument);
    }

    #[test]
    fn key_credential_selected_when_present() {
        let cfg =
            InstallConfig::new("10.0.0.1", 22, None, Some("/k"), None, "aws", None).unwrap();
        assert_eq!(cfg.target.credential, Credential::KeyFile("/k".to_string()));
    }

    #[test]
    fn applies_provider_defaults() {
        let cfg =
            InstallConfig::new("10.0.0.1", 22, None, Some("/k"), None, "azure", None).unwrap();
        assert_eq!(cfg.profile.distribution.name, "ubuntu");
        assert_eq!(cfg.target.user, "azureuser");

        let cfg = InstallConfig::new("10.0.0.1", 22, None, Some("/k"), None, "aws", None).unwrap();
        assert_eq!(cfg.profile.distribution.name, "amazon");
        assert_eq!(cfg.target.user, "ec2-user");
    }

    #[test]
    fn explicit_user_wins_over_default() {
        let cfg = InstallConfig::new(
            "10.0.0.1",
            22,
            Some("admin"),
            Some("/k"),
            None,
            "gcp",
            Some("ubuntu"),
        )
        .unwrap();
        assert_eq!(cfg.target.user, "admin");
    }

    #[test]
    fn distribution_families() {
        assert_eq!(
            Distribution::parse("ubuntu").unwrap().family,
            DistroFamily::Debian
        );
        assert_eq!(
            Distribution::parse("debian").unwrap().family,
            DistroFamily::Debian
        );
        assert_eq!(
            Distribution::parse("centos").unwrap().family,
            DistroFamily::Rhel
        );
        assert_eq!(
            Distribution::parse("amazon").unwrap().family,
            DistroFamily::Rhel
        );
        assert_eq!(
            Distribution::parse("oracle").unwrap().family,
            DistroFamily::Rhel
        );
    }

    #[test]
    fn verb_table_matches_family() {
        let apt = PackageManager::for_family(DistroFamily::Debian);
        assert!(apt.update.contains("apt-get"));
        assert!(apt.install.ends_with("-y"));

        let yum = PackageManager::for_family(DistroFamily::Rhel);
        assert!(yum.update.contains("yum"));
        assert!(yum.add_repository.contains("yum-config-manager"));
    }
}
