//! Resolved, platform-scoped configuration

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

use crate::platform::Platform;

static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?\d+)\s*([kKmMgG]?)\s*$").expect("size pattern is valid")
});

/// Unit suffix of a message size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    Bytes,
    Kilo,
    Mega,
    Giga,
}

impl SizeUnit {
    fn suffix(self) -> &'static str {
        match self {
            SizeUnit::Bytes => "",
            SizeUnit::Kilo => "k",
            SizeUnit::Mega => "m",
            SizeUnit::Giga => "g",
        }
    }
}

/// Value of `$MaxMessageSize`, either bytes or a suffixed amount such as `2k`.
///
/// Negative amounts parse so the validator can report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSize {
    pub amount: i64,
    pub unit: SizeUnit,
}

impl MessageSize {
    pub fn bytes(amount: i64) -> Self {
        Self {
            amount,
            unit: SizeUnit::Bytes,
        }
    }

    /// Parse `"2k"`, `"64K"`, `"1m"`, `"8192"`.
    pub fn parse(input: &str) -> Option<Self> {
        let captures = SIZE_PATTERN.captures(input)?;
        let amount = captures.get(1)?.as_str().parse::<i64>().ok()?;
        let unit = match captures.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
            Some(s) if s == "k" => SizeUnit::Kilo,
            Some(s) if s == "m" => SizeUnit::Mega,
            Some(s) if s == "g" => SizeUnit::Giga,
            _ => SizeUnit::Bytes,
        };
        Some(Self { amount, unit })
    }

    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }
}

impl fmt::Display for MessageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl Serialize for MessageSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A file watched by the imfile module.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileInput {
    /// Path of the watched file
    pub file: String,
    pub tag: Option<String>,
    pub severity: Option<String>,
    pub facility: Option<String>,
    pub state_file: Option<String>,
}

/// imfile module parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ImfileConfig {
    /// `PollingInterval`, kept apart because its syntax differs by style
    pub polling_interval: Option<i64>,
    /// Remaining module parameters, stringified
    pub parameters: BTreeMap<String, String>,
}

impl ImfileConfig {
    pub fn is_empty(&self) -> bool {
        self.polling_interval.is_none() && self.parameters.is_empty()
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Caller omitted the key; built-in default applied
    Default,
    /// Caller supplied a value
    Explicit,
    /// Caller set the key to null; no default applied
    ExplicitNull,
    /// Derived from another attribute
    Implied,
}

/// An attribute whose value could not be coerced to the expected type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMismatch {
    pub attribute: String,
    pub expected: &'static str,
    pub found: String,
}

/// Validated, defaulted, platform-scoped view of the attribute tree.
///
/// Built once per convergence run by the resolver and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    /// Platform family and effective config style
    pub platform: Platform,

    pub protocol: String,
    pub use_relp: bool,
    pub relp_port: i64,
    pub server: bool,
    pub port: i64,
    pub bind: String,
    pub server_ips: Vec<String>,
    pub remote_logs: bool,
    pub logs_to_forward: String,

    pub enable_tls: bool,
    pub tls_ca_file: Option<String>,
    pub tls_certificate_file: Option<String>,
    pub tls_key_file: Option<String>,
    pub tls_auth_mode: String,

    pub max_message_size: Option<MessageSize>,
    pub preserve_fqdn: Option<String>,
    pub repeated_msg_reduction: Option<String>,
    pub high_precision_timestamps: bool,
    pub rate_limit_interval: Option<i64>,
    pub rate_limit_burst: Option<i64>,
    pub action_queue_max_disk_space: Option<String>,
    pub modules: Vec<String>,
    pub additional_directives: BTreeMap<String, String>,

    pub config_prefix: String,
    pub working_dir: String,
    pub user: String,
    pub group: String,
    pub priv_seperation: bool,
    pub priv_user: Option<String>,
    pub priv_group: Option<String>,

    pub imfile: ImfileConfig,
    pub file_inputs: Vec<FileInput>,

    pub(crate) provenance: BTreeMap<String, Provenance>,
    pub(crate) mismatches: Vec<TypeMismatch>,
}

impl ResolvedConfig {
    /// True when the imfile-watch file has anything to say.
    pub fn has_file_watch(&self) -> bool {
        !self.imfile.is_empty() || !self.file_inputs.is_empty()
    }

    /// TLS with a CA file is the only combination that pulls in a TLS package.
    pub fn tls_with_ca(&self) -> bool {
        self.enable_tls && self.tls_ca_file.is_some()
    }

    /// Forwarding applies to clients with at least one remote target.
    pub fn forwards_remotely(&self) -> bool {
        !self.server && self.remote_logs && !self.server_ips.is_empty()
    }

    pub fn provenance(&self, attribute: &str) -> Option<Provenance> {
        self.provenance.get(attribute).copied()
    }

    pub fn type_mismatches(&self) -> &[TypeMismatch] {
        &self.mismatches
    }
}
