//! `rsyslog.conf`

use super::{Conf, Layout};
use crate::attributes::ResolvedConfig;
use crate::platform::PlatformStyle;

pub(super) fn render(config: &ResolvedConfig, layout: &Layout) -> String {
    let mut conf = Conf::new();
    conf.line("#")
        .comment(&format!(
            "{}\tConfiguration file for rsyslog.",
            layout.main_config().display()
        ))
        .line("#")
        .comment("For more information see rsyslog.conf(5)");
    conf.blank();

    // Must precede module loads to take effect for their inputs
    if let Some(size) = config.max_message_size {
        conf.directive("MaxMessageSize", size);
    }
    if let Some(fqdn) = &config.preserve_fqdn {
        conf.directive("PreserveFQDN", fqdn);
    }

    render_modules(&mut conf, config);

    if config.enable_tls {
        render_tls(&mut conf, config);
    }

    if config.server {
        render_listeners(&mut conf, config);
    }

    render_globals(&mut conf, config, layout);
    conf.finish()
}

fn render_modules(conf: &mut Conf, config: &ResolvedConfig) {
    conf.banner("MODULES");
    // Module style loads imfile from the watch file
    let watch_loads_imfile =
        config.platform.style == PlatformStyle::Module && config.has_file_watch();
    for module in &config.modules {
        if watch_loads_imfile && module == "imfile" {
            continue;
        }
        conf.directive("ModLoad", module);
    }

    // The legacy watch file does not load imfile itself
    let needs_imfile = config.platform.style == PlatformStyle::Legacy
        && config.has_file_watch()
        && !config.modules.iter().any(|m| m == "imfile");
    if needs_imfile {
        conf.directive("ModLoad", "imfile");
    }

    if let Some(interval) = config.rate_limit_interval {
        conf.directive("SystemLogRateLimitInterval", interval);
    }
    if let Some(burst) = config.rate_limit_burst {
        conf.directive("SystemLogRateLimitBurst", burst);
    }
}

fn render_tls(conf: &mut Conf, config: &ResolvedConfig) {
    let flavor = config.platform.family.profile().tls;

    conf.banner("TLS");
    conf.directive("DefaultNetstreamDriver", flavor.netstream_driver());
    if let Some(ca) = &config.tls_ca_file {
        conf.directive("DefaultNetstreamDriverCAFile", ca);
    }
    if let Some(cert) = &config.tls_certificate_file {
        conf.directive("DefaultNetstreamDriverCertFile", cert);
    }
    if let Some(key) = &config.tls_key_file {
        conf.directive("DefaultNetstreamDriverKeyFile", key);
    }
}

fn render_listeners(conf: &mut Conf, config: &ResolvedConfig) {
    conf.banner("INPUTS");

    match config.protocol.as_str() {
        "udp" => {
            conf.comment("Provide UDP log reception");
            conf.directive("ModLoad", "imudp")
                .directive("UDPServerAddress", &config.bind)
                .directive("UDPServerRun", config.port);
        }
        _ => {
            conf.comment("Provide TCP log reception");
            conf.directive("ModLoad", "imtcp");
            if config.enable_tls {
                conf.directive("InputTCPServerStreamDriverMode", 1)
                    .directive("InputTCPServerStreamDriverAuthMode", &config.tls_auth_mode);
            }
            conf.directive("InputTCPServerRun", config.port);
        }
    }

    if config.use_relp {
        conf.blank();
        conf.comment("Provide RELP log reception");
        conf.directive("ModLoad", "imrelp")
            .directive("InputRELPServerRun", config.relp_port);
    }
}

fn render_globals(conf: &mut Conf, config: &ResolvedConfig, layout: &Layout) {
    conf.banner("GLOBAL DIRECTIVES");

    if !config.high_precision_timestamps {
        conf.comment("Use traditional timestamp format.");
        conf.directive("ActionFileDefaultTemplate", "RSYSLOG_TraditionalFileFormat");
        conf.blank();
    }

    if let Some(reduction) = &config.repeated_msg_reduction {
        conf.comment("Filter duplicated messages");
        conf.directive("RepeatedMsgReduction", reduction);
        conf.blank();
    }

    conf.comment("Set the default permissions for all log files.");
    conf.directive("FileOwner", &config.user)
        .directive("FileGroup", &config.group)
        .directive("FileCreateMode", "0640")
        .directive("DirCreateMode", "0755")
        .directive("Umask", "0022");
    if config.priv_seperation {
        let user = config.priv_user.as_ref().unwrap_or(&config.user);
        let group = config.priv_group.as_ref().unwrap_or(&config.group);
        conf.directive("PrivDropToUser", user)
            .directive("PrivDropToGroup", group);
    }
    conf.blank();

    conf.comment("Where to place spool and state files");
    conf.directive("WorkDirectory", &config.working_dir);
    conf.blank();

    if !config.additional_directives.is_empty() {
        for (name, value) in &config.additional_directives {
            conf.directive(name.trim_start_matches('$'), value);
        }
        conf.blank();
    }

    conf.comment(&format!(
        "Include all config files in {}/",
        layout.include_dir().display()
    ));
    conf.directive(
        "IncludeConfig",
        format!("{}/*.conf", layout.include_dir().display()),
    );
}
