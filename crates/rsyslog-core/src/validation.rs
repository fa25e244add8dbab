//! Cross-field constraint validation
//!
//! Runs on the resolved configuration before anything is rendered. Checks
//! run in a fixed order and stop at the first violation; every violation is
//! fatal for the run.

use crate::attributes::ResolvedConfig;
use crate::error::ConfigurationError;

type Verdict = std::result::Result<(), ConfigurationError>;

const SUPPORTED_PROTOCOLS: &[&str] = &["tcp", "udp"];

/// Pure predicate over a [`ResolvedConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintValidator;

impl ConstraintValidator {
    pub fn new() -> Self {
        Self
    }

    /// Check every invariant, returning the first violation.
    pub fn validate(&self, config: &ResolvedConfig) -> Verdict {
        check_tls_protocol(config)?;
        check_file_watches(config)?;
        check_non_negative(config)?;
        check_single_line(config)?;
        check_types(config)?;
        check_ports(config)?;
        Ok(())
    }
}

/// TLS with a CA file only works over a stream transport.
fn check_tls_protocol(config: &ResolvedConfig) -> Verdict {
    if config.tls_with_ca() && config.protocol != "tcp" {
        return Err(ConfigurationError::new(
            "protocol",
            format!(
                "TLS with a CA file requires protocol 'tcp', got '{}'",
                config.protocol
            ),
        ));
    }
    Ok(())
}

fn check_file_watches(config: &ResolvedConfig) -> Verdict {
    for (index, input) in config.file_inputs.iter().enumerate() {
        if input.file.trim().is_empty() {
            return Err(ConfigurationError::new(
                format!("file_inputs[{index}].file"),
                "file-watch entry has an empty path",
            ));
        }
    }
    Ok(())
}

fn check_non_negative(config: &ResolvedConfig) -> Verdict {
    if let Some(size) = config.max_message_size
        && size.is_negative()
    {
        return Err(ConfigurationError::new(
            "max_message_size",
            format!("must be non-negative, got {size}"),
        ));
    }

    let numbers = [
        ("imfile.PollingInterval", config.imfile.polling_interval),
        ("rate_limit_interval", config.rate_limit_interval),
        ("rate_limit_burst", config.rate_limit_burst),
        ("port", Some(config.port)),
        ("relp_port", Some(config.relp_port)),
    ];

    for (attribute, value) in numbers {
        if let Some(value) = value
            && value < 0
        {
            return Err(ConfigurationError::new(
                attribute,
                format!("must be non-negative, got {value}"),
            ));
        }
    }
    Ok(())
}

/// Every string lands on a single rendered line, so line breaks would
/// smuggle extra directives into the output.
fn check_single_line(config: &ResolvedConfig) -> Verdict {
    let scalars = [
        ("protocol", &config.protocol),
        ("bind", &config.bind),
        ("logs_to_forward", &config.logs_to_forward),
        ("tls_auth_mode", &config.tls_auth_mode),
        ("config_prefix", &config.config_prefix),
        ("working_dir", &config.working_dir),
        ("user", &config.user),
        ("group", &config.group),
    ];
    let mut fields: Vec<(String, &str)> = scalars
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.as_str()))
        .collect();

    let optional = [
        ("tls_ca_file", &config.tls_ca_file),
        ("tls_certificate_file", &config.tls_certificate_file),
        ("tls_key_file", &config.tls_key_file),
        ("preserve_fqdn", &config.preserve_fqdn),
        ("repeated_msg_reduction", &config.repeated_msg_reduction),
        (
            "action_queue_max_disk_space",
            &config.action_queue_max_disk_space,
        ),
        ("priv_user", &config.priv_user),
        ("priv_group", &config.priv_group),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            fields.push((name.to_string(), value.as_str()));
        }
    }

    for (index, ip) in config.server_ips.iter().enumerate() {
        fields.push((format!("server_ip[{index}]"), ip.as_str()));
    }
    for (index, module) in config.modules.iter().enumerate() {
        fields.push((format!("modules[{index}]"), module.as_str()));
    }
    for (key, value) in &config.additional_directives {
        fields.push((format!("additional_directives.{key}"), key.as_str()));
        fields.push((format!("additional_directives.{key}"), value.as_str()));
    }
    for (key, value) in &config.imfile.parameters {
        fields.push((format!("imfile.{key}"), key.as_str()));
        fields.push((format!("imfile.{key}"), value.as_str()));
    }
    for (index, input) in config.file_inputs.iter().enumerate() {
        fields.push((format!("file_inputs[{index}].file"), input.file.as_str()));
        let optional = [
            ("tag", &input.tag),
            ("severity", &input.severity),
            ("facility", &input.facility),
            ("state_file", &input.state_file),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                fields.push((format!("file_inputs[{index}].{name}"), value.as_str()));
            }
        }
    }

    match fields
        .into_iter()
        .find(|(_, value)| value.contains(['\n', '\r']))
    {
        Some((attribute, _)) => Err(ConfigurationError::new(
            attribute,
            "value must not contain line breaks",
        )),
        None => Ok(()),
    }
}

fn check_types(config: &ResolvedConfig) -> Verdict {
    if let Some(mismatch) = config.type_mismatches().first() {
        return Err(ConfigurationError::new(
            mismatch.attribute.clone(),
            format!("expected {}, found {}", mismatch.expected, mismatch.found),
        ));
    }

    if !SUPPORTED_PROTOCOLS.contains(&config.protocol.as_str()) {
        return Err(ConfigurationError::new(
            "protocol",
            format!(
                "unsupported protocol '{}', expected one of: {}",
                config.protocol,
                SUPPORTED_PROTOCOLS.join(", ")
            ),
        ));
    }
    Ok(())
}

fn check_ports(config: &ResolvedConfig) -> Verdict {
    for (attribute, port) in [("port", config.port), ("relp_port", config.relp_port)] {
        if !(1..=65535).contains(&port) {
            return Err(ConfigurationError::new(
                attribute,
                format!("port {port} is outside 1-65535"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{AttributeResolver, AttributeTree};
    use crate::platform::{Platform, PlatformFamily, PlatformStyle};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn resolve(value: Value) -> ResolvedConfig {
        let tree = AttributeTree::from_value(value).unwrap();
        AttributeResolver::new(Platform::new(PlatformFamily::Debian, PlatformStyle::Module))
            .resolve(&tree)
    }

    fn attribute_of(value: Value) -> Option<String> {
        ConstraintValidator::new()
            .validate(&resolve(value))
            .err()
            .map(|e| e.attribute)
    }

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(attribute_of(json!({})), None);
    }

    #[test]
    fn test_tls_with_ca_over_udp_is_rejected() {
        let err = ConstraintValidator::new()
            .validate(&resolve(json!({
                "enable_tls": true,
                "tls_ca_file": "/etc/path/to/ssl-ca.crt",
                "protocol": "udp"
            })))
            .unwrap_err();

        assert_eq!(err.attribute, "protocol");
        assert!(err.message.contains("'udp'"));
    }

    #[test]
    fn test_tls_without_ca_over_udp_is_allowed() {
        assert_eq!(
            attribute_of(json!({ "enable_tls": true, "protocol": "udp" })),
            None
        );
    }

    #[rstest]
    #[case(json!({ "file_inputs": [{ "file": "  " }] }), "file_inputs[0].file")]
    #[case(json!({ "file_inputs": [{ "tag": "app:" }] }), "file_inputs[0].file")]
    #[case(json!({ "imfile": { "PollingInterval": -1 } }), "imfile.PollingInterval")]
    #[case(json!({ "max_message_size": "-2k" }), "max_message_size")]
    #[case(json!({ "rate_limit_burst": -10 }), "rate_limit_burst")]
    #[case(json!({ "port": "many" }), "port")]
    #[case(json!({ "protocol": "relp" }), "protocol")]
    #[case(json!({ "port": 70000 }), "port")]
    #[case(json!({ "relp_port": 0 }), "relp_port")]
    fn test_violations_name_the_attribute(#[case] attributes: Value, #[case] expected: &str) {
        assert_eq!(attribute_of(attributes).as_deref(), Some(expected));
    }

    #[rstest]
    #[case(json!({ "tls_ca_file": "/etc/ca.crt\n$ModLoad imtcp\n$InputTCPServerRun 10514" }), "tls_ca_file")]
    #[case(json!({ "enable_tls": true, "tls_key_file": "/etc/key.pem\r\n$ModLoad omprog" }), "tls_key_file")]
    #[case(json!({ "file_inputs": [{ "file": "/var/log/app.log\")\nmodule(load=\"omprog\"" }] }), "file_inputs[0].file")]
    #[case(json!({ "file_inputs": [{ "file": "/var/log/app.log", "tag": "app:\n*.* /tmp/all" }] }), "file_inputs[0].tag")]
    #[case(json!({ "imfile": { "ReadMode": "2\n$ModLoad imtcp" } }), "imfile.ReadMode")]
    #[case(json!({ "additional_directives": { "EscapeControlCharactersOnReceive": "off\n$ModLoad imtcp" } }), "additional_directives.EscapeControlCharactersOnReceive")]
    #[case(json!({ "server_ip": ["10.0.0.1", "10.0.0.2\n*.* /tmp/all"] }), "server_ip[1]")]
    #[case(json!({ "modules": ["imuxsock", "imklog\n$ModLoad imtcp"] }), "modules[1]")]
    #[case(json!({ "working_dir": "/var/spool/rsyslog\n$ModLoad imtcp" }), "working_dir")]
    #[case(json!({ "user": "syslog\n$ModLoad imtcp" }), "user")]
    #[case(json!({ "group": "adm\r" }), "group")]
    fn test_line_breaks_are_rejected(#[case] attributes: Value, #[case] expected: &str) {
        let err = ConstraintValidator::new()
            .validate(&resolve(attributes))
            .unwrap_err();

        assert_eq!(err.attribute, expected);
        assert!(err.message.contains("line breaks"));
    }

    #[test]
    fn test_line_breaks_are_checked_after_non_negative() {
        let attributes = json!({
            "max_message_size": "-1k",
            "user": "syslog\n$ModLoad imtcp",
            "protocol": "relp"
        });
        assert_eq!(attribute_of(attributes).as_deref(), Some("max_message_size"));

        let attributes = json!({ "user": "syslog\n$ModLoad imtcp", "protocol": "relp" });
        assert_eq!(attribute_of(attributes).as_deref(), Some("user"));
    }

    #[test]
    fn test_checks_run_in_order() {
        // TLS/protocol is reported before the empty watch path and the negative size
        let attributes = json!({
            "tls_ca_file": "/etc/ca.crt",
            "protocol": "udp",
            "file_inputs": [{ "file": "" }],
            "max_message_size": -1
        });
        assert_eq!(attribute_of(attributes).as_deref(), Some("protocol"));

        let attributes = json!({
            "file_inputs": [{ "file": "" }],
            "max_message_size": -1
        });
        assert_eq!(
            attribute_of(attributes).as_deref(),
            Some("file_inputs[0].file")
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let config = resolve(json!({ "tls_ca_file": "/etc/ca.crt", "protocol": "udp" }));
        let validator = ConstraintValidator::new();
        assert_eq!(validator.validate(&config), validator.validate(&config));
    }
}
