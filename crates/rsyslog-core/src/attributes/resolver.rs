//! Attribute resolution over built-in defaults
//!
//! The caller's tree is deep-merged over the family default table: unset
//! keys take the default, explicit values win, and an explicit null replaces
//! the default with null. Typed fields are then read out of the merged
//! mapping. Resolution never fails; values that cannot be coerced are
//! recorded as type mismatches for the validator to report.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::defaults::default_attributes;
use super::resolved::{
    FileInput, ImfileConfig, MessageSize, Provenance, ResolvedConfig, TypeMismatch,
};
use super::tree::{Attr, AttributeTree, type_name};
use crate::platform::{Platform, PlatformStyle};

/// Merges caller attributes over platform-scoped defaults.
#[derive(Debug, Clone)]
pub struct AttributeResolver {
    platform: Platform,
    defaults: Map<String, Value>,
}

impl AttributeResolver {
    /// Resolver using the built-in default table for the platform family.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            defaults: default_attributes(platform.family),
        }
    }

    /// Resolver with a custom default table.
    pub fn with_defaults(platform: Platform, defaults: Map<String, Value>) -> Self {
        Self { platform, defaults }
    }

    /// Resolve a tree into the configuration used by every later stage.
    pub fn resolve(&self, tree: &AttributeTree) -> ResolvedConfig {
        let mut merged = Value::Object(self.defaults.clone());
        deep_merge_value(&mut merged, &Value::Object(tree.as_map().clone()));
        let merged = match merged {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let mut reader = FieldReader {
            merged: &merged,
            defaults: &self.defaults,
            tree,
            provenance: BTreeMap::new(),
            mismatches: Vec::new(),
        };

        let config_style = reader.style("config_style");
        let tls_ca_file = reader.string("tls_ca_file");
        let explicit_tls = reader.flag("enable_tls");
        let enable_tls = explicit_tls || tls_ca_file.is_some();
        if enable_tls && !explicit_tls {
            reader
                .provenance
                .insert("enable_tls".to_string(), Provenance::Implied);
        }

        let platform = Platform {
            family: self.platform.family,
            style: config_style.unwrap_or(self.platform.style),
        };

        let config = ResolvedConfig {
            platform,
            protocol: reader.required_string("protocol"),
            use_relp: reader.flag("use_relp"),
            relp_port: reader.required_integer("relp_port"),
            server: reader.flag("server"),
            port: reader.required_integer("port"),
            bind: reader.required_string("bind"),
            server_ips: reader.strings("server_ip"),
            remote_logs: reader.flag("remote_logs"),
            logs_to_forward: reader.required_string("logs_to_forward"),
            enable_tls,
            tls_ca_file,
            tls_certificate_file: reader.string("tls_certificate_file"),
            tls_key_file: reader.string("tls_key_file"),
            tls_auth_mode: reader.required_string("tls_auth_mode"),
            max_message_size: reader.size("max_message_size"),
            preserve_fqdn: reader.string("preserve_fqdn"),
            repeated_msg_reduction: reader.string("repeated_msg_reduction"),
            high_precision_timestamps: reader.flag("high_precision_timestamps"),
            rate_limit_interval: reader.integer("rate_limit_interval"),
            rate_limit_burst: reader.integer("rate_limit_burst"),
            action_queue_max_disk_space: reader.string("action_queue_max_disk_space"),
            modules: reader.strings("modules"),
            additional_directives: reader.string_map("additional_directives"),
            config_prefix: reader.required_string("config_prefix"),
            working_dir: reader.required_string("working_dir"),
            user: reader.required_string("user"),
            group: reader.required_string("group"),
            priv_seperation: reader.flag("priv_seperation"),
            priv_user: reader.string("priv_user"),
            priv_group: reader.string("priv_group"),
            imfile: reader.imfile("imfile"),
            file_inputs: reader.file_inputs("file_inputs"),
            provenance: BTreeMap::new(),
            mismatches: Vec::new(),
        };

        let FieldReader {
            provenance,
            mismatches,
            ..
        } = reader;

        tracing::debug!(
            family = %platform.family,
            style = %platform.style,
            explicit = provenance.values().filter(|p| **p == Provenance::Explicit).count(),
            mismatches = mismatches.len(),
            "Resolved attributes"
        );

        ResolvedConfig {
            provenance,
            mismatches,
            ..config
        }
    }
}

/// Deep merge two JSON values
///
/// If both values are objects, merge them recursively with `other` taking precedence.
/// Otherwise, `other` replaces `base`, including when `other` is null.
fn deep_merge_value(base: &mut Value, other: &Value) {
    match (base, other) {
        (Value::Object(base_map), Value::Object(other_map)) => {
            for (key, other_val) in other_map {
                if let Some(base_val) = base_map.get_mut(key) {
                    deep_merge_value(base_val, other_val);
                } else {
                    base_map.insert(key.clone(), other_val.clone());
                }
            }
        }
        (base, other) => {
            *base = other.clone();
        }
    }
}

/// Reads typed fields out of the merged mapping, recording provenance and
/// coercion failures as it goes.
struct FieldReader<'a> {
    merged: &'a Map<String, Value>,
    defaults: &'a Map<String, Value>,
    tree: &'a AttributeTree,
    provenance: BTreeMap<String, Provenance>,
    mismatches: Vec<TypeMismatch>,
}

impl<'a> FieldReader<'a> {
    /// Non-null merged value for `key`.
    fn raw(&mut self, key: &str) -> Option<&'a Value> {
        self.record_provenance(key);
        self.merged.get(key).filter(|v| !v.is_null())
    }

    fn record_provenance(&mut self, key: &str) {
        let provenance = match self.tree.get(key) {
            Attr::Unset => Provenance::Default,
            Attr::Null => Provenance::ExplicitNull,
            Attr::Set(_) => Provenance::Explicit,
        };
        self.provenance.insert(key.to_string(), provenance);
    }

    fn mismatch(&mut self, key: &str, expected: &'static str, found: &Value) {
        self.mismatches.push(TypeMismatch {
            attribute: key.to_string(),
            expected,
            found: type_name(found).to_string(),
        });
    }

    fn string(&mut self, key: &str) -> Option<String> {
        let value = self.raw(key)?;
        match coerce_string(value) {
            Some(s) => Some(s),
            None => {
                self.mismatch(key, "string", value);
                None
            }
        }
    }

    /// Strings that have no meaningful "absent" form; null is a mismatch.
    fn required_string(&mut self, key: &str) -> String {
        if let Some(value) = self.string(key) {
            return value;
        }
        if self.merged.get(key).is_none_or(Value::is_null) {
            self.mismatch(key, "string", &Value::Null);
        }
        self.defaults
            .get(key)
            .and_then(coerce_string)
            .unwrap_or_default()
    }

    /// Booleans accept `true/false`, `on/off`, `yes/no` and `0/1`; null is false.
    fn flag(&mut self, key: &str) -> bool {
        let Some(value) = self.raw(key) else {
            return false;
        };
        let parsed = match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().and_then(|n| match n {
                0 => Some(false),
                1 => Some(true),
                _ => None,
            }),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "on" | "yes" => Some(true),
                "false" | "off" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        };
        parsed.unwrap_or_else(|| {
            self.mismatch(key, "boolean", value);
            false
        })
    }

    fn integer(&mut self, key: &str) -> Option<i64> {
        let value = self.raw(key)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.mismatch(key, "integer", value);
        }
        parsed
    }

    fn required_integer(&mut self, key: &str) -> i64 {
        if let Some(value) = self.integer(key) {
            return value;
        }
        if self.merged.get(key).is_none_or(Value::is_null) {
            self.mismatch(key, "integer", &Value::Null);
        }
        self.defaults.get(key).and_then(Value::as_i64).unwrap_or_default()
    }

    fn size(&mut self, key: &str) -> Option<MessageSize> {
        let value = self.raw(key)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64().map(MessageSize::bytes),
            Value::String(s) => MessageSize::parse(s),
            _ => None,
        };
        if parsed.is_none() {
            self.mismatch(key, "size", value);
        }
        parsed
    }

    fn style(&mut self, key: &str) -> Option<PlatformStyle> {
        let value = self.raw(key)?;
        let parsed = value.as_str().and_then(|s| s.parse::<PlatformStyle>().ok());
        if parsed.is_none() {
            self.mismatch(key, "legacy or module", value);
        }
        parsed
    }

    /// A single string or a sequence of strings.
    fn strings(&mut self, key: &str) -> Vec<String> {
        let Some(value) = self.raw(key) else {
            return Vec::new();
        };
        let parsed = match value {
            Value::Array(items) => items.iter().map(coerce_string).collect::<Option<Vec<_>>>(),
            other => coerce_string(other).map(|s| vec![s]),
        };
        parsed.unwrap_or_else(|| {
            self.mismatch(key, "string or sequence of strings", value);
            Vec::new()
        })
    }

    fn string_map(&mut self, key: &str) -> BTreeMap<String, String> {
        let Some(value) = self.raw(key) else {
            return BTreeMap::new();
        };
        let Value::Object(map) = value else {
            self.mismatch(key, "mapping", value);
            return BTreeMap::new();
        };

        let mut result = BTreeMap::new();
        for (name, item) in map {
            if item.is_null() {
                continue;
            }
            match coerce_string(item) {
                Some(s) => {
                    result.insert(name.clone(), s);
                }
                None => self.mismatch(&format!("{key}.{name}"), "scalar", item),
            }
        }
        result
    }

    fn imfile(&mut self, key: &str) -> ImfileConfig {
        let polling_key = format!("{key}.PollingInterval");
        let mut parameters = self.string_map(key);
        let mut polling_interval = None;

        if let Some(raw) = parameters.remove("PollingInterval") {
            match raw.trim().parse::<i64>() {
                Ok(n) => polling_interval = Some(n),
                Err(_) => self.mismatch(&polling_key, "integer", &Value::String(raw)),
            }
            self.record_provenance(&polling_key);
        }

        ImfileConfig {
            polling_interval,
            parameters,
        }
    }

    fn file_inputs(&mut self, key: &str) -> Vec<FileInput> {
        let Some(value) = self.raw(key) else {
            return Vec::new();
        };
        let Value::Array(items) = value else {
            self.mismatch(key, "sequence of file inputs", value);
            return Vec::new();
        };

        let mut inputs = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match serde_json::from_value::<FileInput>(item.clone()) {
                Ok(input) => inputs.push(input),
                Err(e) => {
                    tracing::debug!(index, error = %e, "Unreadable file input");
                    self.mismatch(&format!("{key}[{index}]"), "file input", item);
                }
            }
        }
        inputs
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
