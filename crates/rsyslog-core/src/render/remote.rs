//! `49-remote.conf`

use super::Conf;
use crate::attributes::ResolvedConfig;

pub(super) fn render(config: &ResolvedConfig) -> String {
    let mut conf = Conf::new();
    conf.comment("Forward logs to the remote collector(s)");
    conf.blank();

    if config.use_relp {
        conf.directive("ModLoad", "omrelp");
        conf.blank();
    } else if config.enable_tls && config.protocol == "tcp" {
        conf.directive("ActionSendStreamDriverMode", 1)
            .directive("ActionSendStreamDriverAuthMode", &config.tls_auth_mode);
        conf.blank();
    }

    conf.comment("Buffer to disk while the collector is unreachable");
    conf.directive("ActionQueueType", "LinkedList")
        .directive("ActionQueueFileName", "remote-buffer");
    if let Some(space) = &config.action_queue_max_disk_space {
        conf.directive("ActionQueueMaxDiskSpace", space);
    }
    conf.directive("ActionQueueSaveOnShutdown", "on")
        .directive("ActionResumeRetryCount", -1);
    conf.blank();

    for target in &config.server_ips {
        conf.line(forward_line(config, target.trim()));
    }

    conf.finish()
}

fn forward_line(config: &ResolvedConfig, target: &str) -> String {
    let selector = &config.logs_to_forward;
    if config.use_relp {
        return format!("{selector} :omrelp:{}", with_port(target, config.relp_port));
    }

    let endpoint = with_port(target, config.port);
    match config.protocol.as_str() {
        "udp" => format!("{selector} @{endpoint}"),
        _ => format!("{selector} @@{endpoint}"),
    }
}

/// Appends the port unless the target already names one. IPv6 literals
/// must be bracketed to carry a port.
fn with_port(target: &str, port: i64) -> String {
    let has_port = match target.rsplit_once(':') {
        Some((host, tail)) => {
            tail.chars().all(|c| c.is_ascii_digit())
                && !tail.is_empty()
                && (!host.contains(':') || host.ends_with(']'))
        }
        None => false,
    };

    if has_port {
        target.to_string()
    } else {
        format!("{target}:{port}")
    }
}
