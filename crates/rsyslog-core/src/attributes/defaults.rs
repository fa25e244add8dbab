//! Built-in default attribute table

use serde_json::{Map, Value, json};

use crate::platform::PlatformFamily;

/// Default attributes for a platform family.
///
/// Keys set to null here have no default and are omitted from rendered
/// output unless the caller supplies them.
pub fn default_attributes(family: PlatformFamily) -> Map<String, Value> {
    let profile = family.profile();

    let defaults = json!({
        "protocol": "tcp",
        "use_relp": false,
        "relp_port": 20514,
        "server": false,
        "port": 514,
        "bind": "*",
        "server_ip": null,
        "remote_logs": true,
        "logs_to_forward": "*.*",
        "enable_tls": false,
        "tls_ca_file": null,
        "tls_certificate_file": null,
        "tls_key_file": null,
        "tls_auth_mode": "anon",
        "max_message_size": null,
        "preserve_fqdn": "off",
        "repeated_msg_reduction": "on",
        "high_precision_timestamps": false,
        "rate_limit_interval": null,
        "rate_limit_burst": null,
        "action_queue_max_disk_space": "1G",
        "modules": ["imuxsock", "imklog"],
        "additional_directives": {},
        "config_prefix": "/etc",
        "working_dir": "/var/spool/rsyslog",
        "user": profile.log_user,
        "group": profile.log_group,
        "priv_seperation": profile.priv_seperation,
        "priv_user": null,
        "priv_group": null,
        "imfile": {},
        "file_inputs": [],
        "config_style": null,
    });

    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
