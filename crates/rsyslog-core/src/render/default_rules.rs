//! `50-default.conf`

use super::{Conf, Layout};
use crate::attributes::ResolvedConfig;

pub(super) fn render(config: &ResolvedConfig, layout: &Layout) -> String {
    let mut conf = Conf::new();
    conf.comment("Default rules for rsyslog.")
        .line("#")
        .comment(&format!(
            "For more information see {} and rsyslog.conf(5)",
            layout.main_config().display()
        ));

    for rule in config.platform.family.profile().default_rules {
        conf.blank();
        if let Some(comment) = rule.comment {
            conf.comment(comment);
        }
        conf.line(format!("{}    {}", rule.selector, rule.action));
    }

    conf.finish()
}
