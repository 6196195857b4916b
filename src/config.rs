//! Runtime settings.
//!
//! Read from `RICE_PEST_*` environment variables, then overridden by
//! command-line flags.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `RICE_PEST_ADDR` | `0.0.0.0:3000` |
//! | `RICE_PEST_DEFAULT_CF` | `0.8` |
//! | `RICE_PEST_KB_PATH` | unset (built-in base) |

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub addr: SocketAddr,
    /// Confidence for observations that omit one.
    pub default_confidence: f64,
    /// JSON knowledge base replacing the built-in one.
    pub kb_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup. `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup("RICE_PEST_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse()
            .with_context(|| format!("RICE_PEST_ADDR is not a socket address: {addr}"))?;

        let default_confidence = match lookup("RICE_PEST_DEFAULT_CF") {
            Some(raw) => parse_confidence(&raw).context("invalid RICE_PEST_DEFAULT_CF")?,
            None => DEFAULT_CONFIDENCE,
        };

        let kb_path = lookup("RICE_PEST_KB_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            addr,
            default_confidence,
            kb_path,
        })
    }

    /// Applies command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        addr: Option<SocketAddr>,
        default_confidence: Option<f64>,
        kb_path: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(addr) = addr {
            self.addr = addr;
        }
        if let Some(cf) = default_confidence {
            self.default_confidence = check_unit(cf)?;
        }
        if kb_path.is_some() {
            self.kb_path = kb_path;
        }
        Ok(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            default_confidence: DEFAULT_CONFIDENCE,
            kb_path: None,
        }
    }
}

fn parse_confidence(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("not a number: {raw}"))?;
    check_unit(value)
}

fn check_unit(value: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&value) {
        bail!("confidence must be within [0, 1], got {value}");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let s = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.addr.port(), 3000);
    }

    #[test]
    fn reads_every_variable() {
        let s = Settings::from_lookup(lookup(&[
            ("RICE_PEST_ADDR", "127.0.0.1:8080"),
            ("RICE_PEST_DEFAULT_CF", "0.65"),
            ("RICE_PEST_KB_PATH", "/tmp/kb.json"),
        ]))
        .unwrap();
        assert_eq!(s.addr.to_string(), "127.0.0.1:8080");
        assert!((s.default_confidence - 0.65).abs() < 1e-12);
        assert_eq!(s.kb_path, Some(PathBuf::from("/tmp/kb.json")));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(Settings::from_lookup(lookup(&[("RICE_PEST_ADDR", "nowhere")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("RICE_PEST_DEFAULT_CF", "1.5")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("RICE_PEST_DEFAULT_CF", "high")])).is_err());
    }

    #[test]
    fn empty_kb_path_means_builtin() {
        let s = Settings::from_lookup(lookup(&[("RICE_PEST_KB_PATH", "  ")])).unwrap();
        assert_eq!(s.kb_path, None);
    }

    #[test]
    fn flags_override_environment() {
        let s = Settings::from_lookup(lookup(&[("RICE_PEST_DEFAULT_CF", "0.5")]))
            .unwrap()
            .with_overrides(Some("127.0.0.1:9000".parse().unwrap()), Some(0.9), None)
            .unwrap();
        assert_eq!(s.addr.port(), 9000);
        assert!((s.default_confidence - 0.9).abs() < 1e-12);
        assert!(Settings::default().with_overrides(None, Some(-0.1), None).is_err());
    }
}
