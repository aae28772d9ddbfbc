//! Unified environment variable loading.
//!
//! Keeps the fallback chains in one place so build code never repeats
//! `or_else` lookups.

use std::env;
use std::path::Path;

/// Load `.env` from the current directory into the process environment.
///
/// Runs once per process. Variables that are already set are never overridden.
/// Must be called before any threads are spawned.
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let dir = env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
        load_dotenv_from_dir(&dir);
    });
}

/// Load `<dir>/.env` into the process environment without overriding
/// existing variables. A missing or unreadable file is ignored.
pub fn load_dotenv_from_dir(dir: &Path) {
    let path = dir.join(".env");
    let Ok(content) = std::fs::read_to_string(&path) else {
        return;
    };
    let mut loaded = 0usize;
    for (key, value) in parse_dotenv(&content) {
        if env::var(&key).is_err() {
            env::set_var(&key, &value);
            loaded += 1;
        }
    }
    tracing::debug!(path = %path.display(), loaded, "Loaded .env");
}

/// Parse `.env` content into key/value pairs.
///
/// Blank lines and `#` comments are skipped; matching single or double quotes
/// around a value are stripped; an inline `#` comment is dropped when the
/// value is unquoted.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().trim_start_matches("export ").trim();
        let mut value = value.trim();
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// Read the primary variable or the first set alias; fall back to `default`.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

/// Read the primary variable or an alias, returning `None` for unset or
/// blank values.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .and_then(|s| {
            let s = s.trim().to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        })
}

/// Parse a boolean variable: 0/false/no/off are false, anything else true.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    let v = env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()));
    match v.as_deref() {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotenv_skips_comments_and_strips_quotes() {
        let content = "\n# comment\nVENVR_R=/opt/R/bin/R\nVENVR_LOG_LEVEL=\"venvr=debug\"\nexport VENVR_QUIET='1'\nVENVR_PYTHON=python3.12 # pinned\nnot a pair\n";
        let pairs = parse_dotenv(content);
        assert_eq!(
            pairs,
            vec![
                ("VENVR_R".to_string(), "/opt/R/bin/R".to_string()),
                ("VENVR_LOG_LEVEL".to_string(), "venvr=debug".to_string()),
                ("VENVR_QUIET".to_string(), "1".to_string()),
                ("VENVR_PYTHON".to_string(), "python3.12".to_string()),
            ]
        );
    }

    #[test]
    fn test_env_optional_treats_blank_as_unset() {
        env::set_var("VENVR_TEST_BLANK_OPTIONAL", "   ");
        assert_eq!(env_optional("VENVR_TEST_BLANK_OPTIONAL", &[]), None);
        env::remove_var("VENVR_TEST_BLANK_OPTIONAL");
    }

    #[test]
    fn test_env_or_uses_alias_then_default() {
        env::set_var("VENVR_TEST_ALIAS_B", "from-alias");
        let v = env_or("VENVR_TEST_PRIMARY_A", &["VENVR_TEST_ALIAS_B"], || {
            "default".to_string()
        });
        assert_eq!(v, "from-alias");
        env::remove_var("VENVR_TEST_ALIAS_B");
        let v = env_or("VENVR_TEST_PRIMARY_A", &["VENVR_TEST_ALIAS_B"], || {
            "default".to_string()
        });
        assert_eq!(v, "default");
    }

    #[test]
    fn test_env_bool_values() {
        env::set_var("VENVR_TEST_BOOL_OFF", "off");
        env::set_var("VENVR_TEST_BOOL_ON", "yes");
        assert!(!env_bool("VENVR_TEST_BOOL_OFF", &[], true));
        assert!(env_bool("VENVR_TEST_BOOL_ON", &[], false));
        assert!(env_bool("VENVR_TEST_BOOL_UNSET", &[], true));
        env::remove_var("VENVR_TEST_BOOL_OFF");
        env::remove_var("VENVR_TEST_BOOL_ON");
    }

    #[test]
    fn test_load_dotenv_from_dir_does_not_override() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(".env"),
            "VENVR_TEST_DOTENV_NEW=loaded\nVENVR_TEST_DOTENV_KEEP=overridden\n",
        )
        .unwrap();
        env::set_var("VENVR_TEST_DOTENV_KEEP", "original");
        load_dotenv_from_dir(tmp.path());
        assert_eq!(env::var("VENVR_TEST_DOTENV_NEW").unwrap(), "loaded");
        assert_eq!(env::var("VENVR_TEST_DOTENV_KEEP").unwrap(), "original");
        env::remove_var("VENVR_TEST_DOTENV_NEW");
        env::remove_var("VENVR_TEST_DOTENV_KEEP");
    }
}
