//! End-to-end scenarios over the public engine API

use pretty_assertions::assert_eq;
use rsyslog_core::render::PROVENANCE_HEADER;
use rsyslog_core::{
    AttributeResolver, AttributeTree, ConfigRenderer, ConstraintValidator, ConvergenceRun, Error,
    LogicalFile, MemoryFilesystem, PackageSelector, Platform, PlatformFamily, PlatformStyle,
    ResolvedConfig,
};
use rstest::rstest;
use serde_json::{Value, json};

fn resolve(family: PlatformFamily, style: PlatformStyle, attributes: Value) -> ResolvedConfig {
    let tree = AttributeTree::from_value(attributes).unwrap();
    AttributeResolver::new(Platform::new(family, style)).resolve(&tree)
}

fn rendered(config: &ResolvedConfig, id: LogicalFile) -> Option<String> {
    ConfigRenderer::new()
        .render(config)
        .into_iter()
        .find(|file| file.id == id)
        .map(|file| file.content)
}

#[rstest]
#[case(PlatformFamily::Debian)]
#[case(PlatformFamily::Rhel)]
fn scenario_all_defaults(#[case] family: PlatformFamily) {
    let config = resolve(family, PlatformStyle::Module, json!({}));
    ConstraintValidator::new().validate(&config).unwrap();

    let main = rendered(&config, LogicalFile::Main).unwrap();
    assert!(main.contains("$ModLoad imuxsock"));
    assert!(main.contains("$ModLoad imklog"));
    assert!(main.contains(PROVENANCE_HEADER));
    assert!(!main.contains("MaxMessageSize"));

    let rules = rendered(&config, LogicalFile::DefaultRules).unwrap();
    assert!(rules.contains("*.emerg    :omusrmsg:*"));

    assert_eq!(rendered(&config, LogicalFile::ImfileWatch), None);
    assert_eq!(rendered(&config, LogicalFile::Remote), None);
}

#[test]
fn scenario_tls_over_udp_is_rejected() {
    let config = resolve(
        PlatformFamily::Debian,
        PlatformStyle::Module,
        json!({ "enable_tls": true, "tls_ca_file": "/etc/path/to/ssl-ca.crt", "protocol": "udp" }),
    );

    let err = ConstraintValidator::new().validate(&config).unwrap_err();
    assert_eq!(err.attribute, "protocol");
}

#[test]
fn scenario_tls_over_udp_never_reaches_the_sink() {
    let tree = AttributeTree::from_value(json!({
        "enable_tls": true,
        "tls_ca_file": "/etc/path/to/ssl-ca.crt",
        "protocol": "udp"
    }))
    .unwrap();
    let fs = MemoryFilesystem::new();

    let err = ConvergenceRun::new(Platform::new(PlatformFamily::Rhel, PlatformStyle::Legacy))
        .converge(&tree, &fs)
        .unwrap_err();

    assert!(matches!(err, Error::Configuration(_)));
    assert!(fs.journal().is_empty());
}

#[rstest]
#[case(json!({ "tls_ca_file": "/etc/ca.crt\n$ModLoad imtcp\n$InputTCPServerRun 10514" }))]
#[case(json!({ "file_inputs": [{ "file": "/var/log/app.log\")\nmodule(load=\"omprog\"" }] }))]
fn scenario_embedded_directives_never_reach_the_sink(#[case] attributes: Value) {
    let tree = AttributeTree::from_value(attributes).unwrap();
    let fs = MemoryFilesystem::new();

    let err = ConvergenceRun::new(Platform::new(PlatformFamily::Debian, PlatformStyle::Module))
        .converge(&tree, &fs)
        .unwrap_err();

    assert!(matches!(err, Error::Configuration(ref e) if e.message.contains("line breaks")));
    assert!(fs.journal().is_empty());
}

#[rstest]
#[case(PlatformFamily::Debian, "rsyslog-openssl", "rsyslog-gnutls")]
#[case(PlatformFamily::Rhel, "rsyslog-gnutls", "rsyslog-openssl")]
fn scenario_tls_package_follows_family(
    #[case] family: PlatformFamily,
    #[case] expected: &str,
    #[case] excluded: &str,
) {
    let config = resolve(
        family,
        PlatformStyle::Module,
        json!({ "enable_tls": true, "tls_ca_file": "/etc/path/to/ssl-ca.crt", "protocol": "tcp" }),
    );
    ConstraintValidator::new().validate(&config).unwrap();

    let names: Vec<String> = PackageSelector::new()
        .select(&config)
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert!(names.iter().any(|n| n == expected));
    assert!(!names.iter().any(|n| n == excluded));
}

#[test]
fn scenario_module_style_polling_interval() {
    let config = resolve(
        PlatformFamily::Debian,
        PlatformStyle::Module,
        json!({ "imfile": { "PollingInterval": 10 } }),
    );
    let watch = rendered(&config, LogicalFile::ImfileWatch).unwrap();

    assert!(watch.contains("module(load=\"imfile\""));
    assert!(watch.contains("PollingInterval=\"10\""));
    assert!(!watch.contains("$ModLoad imfile"));
}

#[test]
fn scenario_legacy_style_polling_interval() {
    let config = resolve(
        PlatformFamily::Rhel,
        PlatformStyle::Legacy,
        json!({ "imfile": { "PollingInterval": 10 } }),
    );
    let watch = rendered(&config, LogicalFile::ImfileWatch).unwrap();

    assert!(watch.contains("PollingInterval 10"));
    assert!(!watch.contains("$ModLoad imfile"));
    assert!(!watch.contains("module(load="));
}

#[test]
fn scenario_tls_without_ca_file() {
    let config = resolve(
        PlatformFamily::Debian,
        PlatformStyle::Module,
        json!({ "enable_tls": true, "tls_certificate_file": "/etc/ssl/host.crt" }),
    );
    ConstraintValidator::new().validate(&config).unwrap();

    let names: Vec<String> = PackageSelector::new()
        .select(&config)
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["rsyslog"]);

    let main = rendered(&config, LogicalFile::Main).unwrap();
    assert!(main.contains("$DefaultNetstreamDriver ossl"));
    assert!(main.contains("$DefaultNetstreamDriverCertFile /etc/ssl/host.crt"));
    assert!(!main.contains("DefaultNetstreamDriverCAFile"));
}

#[test]
fn scenario_relp_client_forwarding() {
    let config = resolve(
        PlatformFamily::Debian,
        PlatformStyle::Module,
        json!({ "use_relp": true, "server_ip": ["10.0.0.1", "10.0.0.2"] }),
    );
    ConstraintValidator::new().validate(&config).unwrap();

    let names: Vec<String> = PackageSelector::new()
        .select(&config)
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["rsyslog", "rsyslog-relp"]);

    let remote = rendered(&config, LogicalFile::Remote).unwrap();
    assert!(remote.contains("*.* :omrelp:10.0.0.1:20514\n*.* :omrelp:10.0.0.2:20514"));
}

#[test]
fn scenario_server_does_not_forward() {
    let config = resolve(
        PlatformFamily::Debian,
        PlatformStyle::Module,
        json!({ "server": true, "server_ip": "10.0.0.1" }),
    );

    assert_eq!(rendered(&config, LogicalFile::Remote), None);
    let main = rendered(&config, LogicalFile::Main).unwrap();
    assert!(main.contains("$InputTCPServerRun 514"));
}

#[test]
fn scenario_wrapped_rsyslog_document() {
    let config = resolve(
        PlatformFamily::Debian,
        PlatformStyle::Module,
        json!({ "rsyslog": { "max_message_size": "64k" } }),
    );
    let main = rendered(&config, LogicalFile::Main).unwrap();
    assert!(main.contains("$MaxMessageSize 64k"));
}
