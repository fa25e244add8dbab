//! Package selection
//!
//! Decides which packages the install collaborator must provide. Assumes
//! the configuration has already passed validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attributes::ResolvedConfig;
use crate::platform::TlsFlavor;

/// Why a package is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageReason {
    Base,
    RelpTransport,
    TlsGnutls,
    TlsOpenssl,
}

impl From<TlsFlavor> for PackageReason {
    fn from(flavor: TlsFlavor) -> Self {
        match flavor {
            TlsFlavor::Openssl => PackageReason::TlsOpenssl,
            TlsFlavor::Gnutls => PackageReason::TlsGnutls,
        }
    }
}

impl fmt::Display for PackageReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageReason::Base => write!(f, "base"),
            PackageReason::RelpTransport => write!(f, "relp-transport"),
            PackageReason::TlsGnutls => write!(f, "tls-gnutls"),
            PackageReason::TlsOpenssl => write!(f, "tls-openssl"),
        }
    }
}

/// A package the host needs, with the reason it was selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRequirement {
    pub name: String,
    pub reason: PackageReason,
}

impl PackageRequirement {
    fn new(name: &str, reason: PackageReason) -> Self {
        Self {
            name: name.to_string(),
            reason,
        }
    }
}

/// Derives package requirements from a resolved configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageSelector;

impl PackageSelector {
    pub fn new() -> Self {
        Self
    }

    /// Ordered requirements: base, then RELP, then TLS.
    pub fn select(&self, config: &ResolvedConfig) -> Vec<PackageRequirement> {
        let profile = config.platform.family.profile();
        let mut packages = vec![PackageRequirement::new(
            profile.base_package,
            PackageReason::Base,
        )];

        if config.use_relp {
            packages.push(PackageRequirement::new(
                profile.relp_package,
                PackageReason::RelpTransport,
            ));
        }

        // TLS enabled without a CA file installs nothing extra
        if config.tls_with_ca() {
            packages.push(PackageRequirement::new(
                profile.tls.package(),
                profile.tls.into(),
            ));
        }

        tracing::debug!(
            packages = ?packages.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            "Selected packages"
        );
        packages
    }
}
