//! User-Agent selection and request header construction.
//!
//! The registry rejects requests without a browser-like User-Agent, so every
//! request carries one. The header map is built once per run and passed
//! explicitly to the lister, the normalizer and the pipeline.

use rand::seq::SliceRandom;
use std::collections::HashMap;

use crate::config::EngdirConfig;

/// Built-in pool of desktop browser User-Agent strings.
pub const BUILTIN_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

/// Pick the User-Agent for this run: the configured fixed one, otherwise a
/// random entry of the configured pool (or the built-in pool if that is empty).
pub fn choose(cfg: &EngdirConfig) -> String {
    if let Some(ua) = cfg.user_agent.as_deref().map(str::trim) {
        if !ua.is_empty() {
            return ua.to_string();
        }
    }
    let mut rng = rand::thread_rng();
    if let Some(pool) = cfg.user_agents.as_ref() {
        let pool: Vec<&String> = pool.iter().filter(|s| !s.trim().is_empty()).collect();
        if let Some(ua) = pool.choose(&mut rng) {
            return ua.trim().to_string();
        }
    }
    BUILTIN_USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(BUILTIN_USER_AGENTS[0])
        .to_string()
}

/// Headers sent with every request: configured extras plus `User-Agent`.
/// A `User-Agent` in `extra_headers` is replaced by `user_agent`.
pub fn request_headers(cfg: &EngdirConfig, user_agent: &str) -> HashMap<String, String> {
    let mut headers: HashMap<String, String> = cfg
        .extra_headers
        .iter()
        .filter(|(k, _)| !k.eq_ignore_ascii_case("user-agent"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    headers.insert("User-Agent".to_string(), user_agent.to_string());
    headers
}
