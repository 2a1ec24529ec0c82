//! Environment Lookup

use std::env;
use std::sync::Arc;

use crate::config::FuncConfig;
use crate::registry::FuncMap;
use crate::value::Value;

/// Value of `name`, or "" when unset, not unicode, or not allow-listed.
pub fn lookup(config: &FuncConfig, name: &str) -> String {
    if !config.env_visible(name) {
        return String::new();
    }
    env::var(name).unwrap_or_default()
}

/// Replace `$NAME` and `${NAME}` with their values. A `$` that does not
/// start a name is kept as is.
pub fn expand(s: &str, resolve: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(close) = braced.find('}') {
                out.push_str(&resolve(&braced[..close]));
                rest = &braced[close + 1..];
                continue;
            }
        }

        let name_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if name_len == 0 {
            out.push('$');
        } else {
            out.push_str(&resolve(&after[..name_len]));
        }
        rest = &after[name_len..];
    }
    out.push_str(rest);
    out
}

pub(crate) fn register(funcs: &mut FuncMap, config: &FuncConfig) {
    if config.hermetic {
        return;
    }
    let config = Arc::new(config.clone());

    let cfg = Arc::clone(&config);
    funcs.define("env", move |a| {
        a.exactly(1)?;
        Ok(Value::from(lookup(&cfg, &a.string(0))))
    });
    let cfg = config;
    funcs.define("expandenv", move |a| {
        a.exactly(1)?;
        Ok(Value::from(expand(&a.string(0), |name| lookup(&cfg, name))))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake(name: &str) -> String {
        match name {
            "USER" => "ada".to_string(),
            "HOME" => "/home/ada".to_string(),
            _ => String::new(),
        }
    }

    #[test]
    fn test_expand_forms() {
        assert_eq!(expand("hi $USER", fake), "hi ada");
        assert_eq!(expand("${HOME}/bin", fake), "/home/ada/bin");
        assert_eq!(expand("$USER:$HOME", fake), "ada:/home/ada");
        assert_eq!(expand("cost: $5", fake), "cost: ");
        assert_eq!(expand("a $ b", fake), "a $ b");
        assert_eq!(expand("trailing $", fake), "trailing $");
        assert_eq!(expand("${unclosed", fake), "${unclosed");
        assert_eq!(expand("$MISSING!", fake), "!");
    }

    #[test]
    fn test_lookup_respects_allowlist() {
        let name = "TPLFUNCS_TEST_ALLOWLIST";
        env::set_var(name, "visible");
        let open = FuncConfig::default();
        assert_eq!(lookup(&open, name), "visible");

        let closed = FuncConfig {
            env_allowlist: Some(vec!["OTHER".into()]),
            ..FuncConfig::default()
        };
        assert_eq!(lookup(&closed, name), "");
    }

    #[test]
    fn test_registered_env_functions() {
        let name = "TPLFUNCS_TEST_REGISTERED";
        env::set_var(name, "42");
        let map = FuncMap::with_config(&FuncConfig::default());
        assert_eq!(map.call("env", &[Value::from(name)]), Ok(Value::from("42")));
        assert_eq!(
            map.call("expandenv", &[Value::from(format!("n=${}", name))]),
            Ok(Value::from("n=42"))
        );
        assert_eq!(
            map.call("env", &[Value::from("TPLFUNCS_TEST_SURELY_UNSET")]),
            Ok(Value::from(""))
        );
    }
}
