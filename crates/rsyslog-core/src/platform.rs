//! Platform family and style enumerations
//!
//! Both enums are closed sets consumed through the lookup tables in this
//! module. Adding a platform variant means adding a table entry here; the
//! renderer and package selector never compare platform names themselves.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// OS family of the target host.
///
/// Controls package naming and the TLS library flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    /// Debian, Ubuntu and derivatives
    Debian,
    /// RHEL, CentOS, Fedora, Amazon Linux and derivatives
    Rhel,
}

impl PlatformFamily {
    /// Lookup table entry for this family.
    pub fn profile(self) -> &'static FamilyProfile {
        match self {
            PlatformFamily::Debian => &DEBIAN,
            PlatformFamily::Rhel => &RHEL,
        }
    }
}

impl FromStr for PlatformFamily {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debian" | "ubuntu" => Ok(PlatformFamily::Debian),
            "rhel" | "redhat" | "centos" | "fedora" | "amazon" => Ok(PlatformFamily::Rhel),
            _ => Err(Error::UnknownFamily {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformFamily::Debian => write!(f, "debian"),
            PlatformFamily::Rhel => write!(f, "rhel"),
        }
    }
}

/// Config syntax dialect rendered for the target host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformStyle {
    /// `$Directive value` syntax
    Legacy,
    /// `module(...)` / `input(...)` syntax
    #[default]
    Module,
}

impl FromStr for PlatformStyle {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(PlatformStyle::Legacy),
            "module" | "modern" | "rainerscript" => Ok(PlatformStyle::Module),
            _ => Err(Error::UnknownStyle {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PlatformStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformStyle::Legacy => write!(f, "legacy"),
            PlatformStyle::Module => write!(f, "module"),
        }
    }
}

/// Resolved platform identity supplied by the detection collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    pub family: PlatformFamily,
    pub style: PlatformStyle,
}

impl Platform {
    pub fn new(family: PlatformFamily, style: PlatformStyle) -> Self {
        Self { family, style }
    }
}

/// TLS library flavour shipped by a platform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsFlavor {
    Openssl,
    Gnutls,
}

impl TlsFlavor {
    pub fn package(self) -> &'static str {
        match self {
            TlsFlavor::Openssl => "rsyslog-openssl",
            TlsFlavor::Gnutls => "rsyslog-gnutls",
        }
    }

    /// Value of `$DefaultNetstreamDriver` for this flavour.
    pub fn netstream_driver(self) -> &'static str {
        match self {
            TlsFlavor::Openssl => "ossl",
            TlsFlavor::Gnutls => "gtls",
        }
    }
}

/// One line of the static default rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultRule {
    /// Comment rendered above the rule
    pub comment: Option<&'static str>,
    pub selector: &'static str,
    pub action: &'static str,
}

/// Per-family lookup table.
#[derive(Debug)]
pub struct FamilyProfile {
    pub base_package: &'static str,
    pub relp_package: &'static str,
    pub tls: TlsFlavor,
    pub service_name: &'static str,
    /// Default owner of log files and the spool directory
    pub log_user: &'static str,
    pub log_group: &'static str,
    pub priv_seperation: bool,
    pub default_rules: &'static [DefaultRule],
}

const fn rule(selector: &'static str, action: &'static str) -> DefaultRule {
    DefaultRule {
        comment: None,
        selector,
        action,
    }
}

const EMERGENCY_RULE: DefaultRule = DefaultRule {
    comment: Some("Emergencies are sent to everybody logged in."),
    selector: "*.emerg",
    action: ":omusrmsg:*",
};

static DEBIAN: FamilyProfile = FamilyProfile {
    base_package: "rsyslog",
    relp_package: "rsyslog-relp",
    tls: TlsFlavor::Openssl,
    service_name: "rsyslog",
    log_user: "syslog",
    log_group: "adm",
    priv_seperation: true,
    default_rules: &[
        DefaultRule {
            comment: Some("First some standard log files.  Log by facility."),
            selector: "auth,authpriv.*",
            action: "/var/log/auth.log",
        },
        rule("*.*;auth,authpriv.none", "-/var/log/syslog"),
        rule("kern.*", "-/var/log/kern.log"),
        rule("mail.*", "-/var/log/mail.log"),
        rule("mail.err", "/var/log/mail.err"),
        EMERGENCY_RULE,
    ],
};

static RHEL: FamilyProfile = FamilyProfile {
    base_package: "rsyslog",
    relp_package: "rsyslog-relp",
    tls: TlsFlavor::Gnutls,
    service_name: "rsyslog",
    log_user: "root",
    log_group: "root",
    priv_seperation: false,
    default_rules: &[
        DefaultRule {
            comment: Some("Log anything of level info or higher, except mail and private auth."),
            selector: "*.info;mail.none;authpriv.none;cron.none",
            action: "/var/log/messages",
        },
        rule("authpriv.*", "/var/log/secure"),
        DefaultRule {
            comment: Some("Mail gets its own log."),
            selector: "mail.*",
            action: "-/var/log/maillog",
        },
        rule("cron.*", "/var/log/cron"),
        EMERGENCY_RULE,
        rule("uucp,news.crit", "/var/log/spooler"),
        rule("local7.*", "/var/log/boot.log"),
    ],
};
