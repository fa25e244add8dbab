//! `35-imfile.conf`
//!
//! Legacy style relies on `rsyslog.conf` loading the module and writes
//! module parameters as bare directives under the caller's key names.
//! Module style loads the module here with quoted parameters.

use super::{Conf, quoted};
use crate::attributes::{FileInput, ResolvedConfig};
use crate::platform::PlatformStyle;

const POLLING_INTERVAL: &str = "PollingInterval";

pub(super) fn render(config: &ResolvedConfig) -> String {
    let mut conf = Conf::new();
    match config.platform.style {
        PlatformStyle::Legacy => render_legacy(&mut conf, config),
        PlatformStyle::Module => render_module(&mut conf, config),
    }
    conf.finish()
}

fn render_legacy(conf: &mut Conf, config: &ResolvedConfig) {
    if let Some(interval) = config.imfile.polling_interval {
        conf.directive(POLLING_INTERVAL, interval);
    }
    for (name, value) in &config.imfile.parameters {
        conf.directive(name, value);
    }

    for input in &config.file_inputs {
        conf.blank();
        conf.directive("InputFileName", &input.file);
        let optional = [
            ("InputFileTag", &input.tag),
            ("InputFileStateFile", &input.state_file),
            ("InputFileSeverity", &input.severity),
            ("InputFileFacility", &input.facility),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                conf.directive(name, value);
            }
        }
        conf.line("$InputRunFileMonitor");
    }
}

fn render_module(conf: &mut Conf, config: &ResolvedConfig) {
    let mut stanza = String::from("module(load=\"imfile\"");
    if let Some(interval) = config.imfile.polling_interval {
        push_param(&mut stanza, POLLING_INTERVAL, &interval.to_string());
    }
    for (name, value) in &config.imfile.parameters {
        push_param(&mut stanza, name, value);
    }
    stanza.push(')');
    conf.line(stanza);

    for input in &config.file_inputs {
        conf.blank();
        conf.line(input_stanza(input));
    }
}

fn input_stanza(input: &FileInput) -> String {
    let mut stanza = String::from("input(type=\"imfile\"");
    push_param(&mut stanza, "File", &input.file);
    let optional = [
        ("Tag", &input.tag),
        ("StateFile", &input.state_file),
        ("Severity", &input.severity),
        ("Facility", &input.facility),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            push_param(&mut stanza, name, value);
        }
    }
    stanza.push(')');
    stanza
}

fn push_param(stanza: &mut String, name: &str, value: &str) {
    stanza.push(' ');
    stanza.push_str(name);
    stanza.push('=');
    stanza.push_str(&quoted(value));
}
