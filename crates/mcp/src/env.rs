//! `${VAR}` expansion for server environment values.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use regex_lite::{Captures, Regex};

static VAR_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("literal pattern compiles"));

/// Replace `${VAR}` references using `lookup`. Unknown variables stay verbatim.
pub fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    VAR_REF.replace_all(input, |caps: &Captures<'_>| {
        lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

/// Expand every value of a server's `env` table from the process environment.
pub fn expand_env(env: &BTreeMap<String, String>) -> Vec<(String, String)> {
    env.iter()
        .map(|(key, value)| (key.clone(), expand_with(value, |name| std::env::var(name).ok())))
        .collect()
}
