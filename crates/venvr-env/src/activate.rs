//! Activation script composer.
//!
//! Merges the R activation block into the Python `activate` script:
//!
//! 1. whole-word `deactivate` in the Python script becomes `deactivate_py`;
//! 2. the R template's placeholders are resolved from a fixed, versioned set;
//! 3. Python text first, R block appended, so the R `deactivate` wraps
//!    `deactivate_py` instead of replacing it.
//!
//! The R block is delimited by marker lines. Composing onto a script that
//! already carries the block replaces the old block.

use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::context::EnvContext;
use crate::error::{BuildError, Result};

/// R block appended to the Python activate script.
pub const R_ACTIVATE_TEMPLATE: &str = include_str!("../scripts/activate");

/// First line of the R block.
pub const BLOCK_MARKER: &str = "# >>> venvr: R activation >>>";

pub const PRIMARY_DEACTIVATE: &str = "deactivate";
pub const RENAMED_DEACTIVATE: &str = "deactivate_py";

/// Bump when a placeholder is added to or removed from [`Placeholder::ALL`].
pub const PLACEHOLDER_SET_VERSION: u32 = 1;

static DEACTIVATE_RE: OnceLock<Regex> = OnceLock::new();
static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

/// The placeholders the template may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    SystemPackages,
    RHome,
    PyExec,
    LibName,
}

impl Placeholder {
    pub const ALL: [Placeholder; 4] = [
        Placeholder::SystemPackages,
        Placeholder::RHome,
        Placeholder::PyExec,
        Placeholder::LibName,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Self::SystemPackages => "__VENVR_SYSTEM_PACKAGES__",
            Self::RHome => "__VENVR_R_HOME__",
            Self::PyExec => "__VENVR_PY_EXEC__",
            Self::LibName => "__VENVR_LIB_NAME__",
        }
    }
}

/// Resolved values for every [`Placeholder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitutions {
    pub system_packages: bool,
    pub r_home: String,
    pub py_exec: String,
    pub lib_name: String,
}

impl Substitutions {
    /// `None` until the locator has filled in `ctx.r`.
    pub fn from_context(ctx: &EnvContext) -> Option<Self> {
        let r = ctx.r.as_ref()?;
        Some(Self {
            system_packages: ctx.r_system_site_packages,
            r_home: r.home.to_string_lossy().to_string(),
            py_exec: ctx.python_exe.to_string_lossy().to_string(),
            lib_name: ctx.lib_name.clone(),
        })
    }

    pub fn value(&self, placeholder: Placeholder) -> &str {
        match placeholder {
            Placeholder::SystemPackages => {
                if self.system_packages {
                    "true"
                } else {
                    "false"
                }
            }
            Placeholder::RHome => &self.r_home,
            Placeholder::PyExec => &self.py_exec,
            Placeholder::LibName => &self.lib_name,
        }
    }
}

/// Rename whole-word `deactivate` to `deactivate_py`.
/// `deactivate_custom` and `my_deactivate` are left alone.
pub fn rename_primary_deactivate(text: &str) -> Cow<'_, str> {
    let re = DEACTIVATE_RE.get_or_init(|| {
        Regex::new(&format!(r"\b{}\b", PRIMARY_DEACTIVATE)).expect("deactivate regex")
    });
    re.replace_all(text, RENAMED_DEACTIVATE)
}

/// Replace every known placeholder. Unknown `__VENVR_*__` tokens stay as-is.
pub fn resolve_placeholders(template: &str, subs: &Substitutions) -> String {
    if !template.contains("__VENVR_") {
        return template.to_string();
    }
    let mut text = template.to_string();
    for placeholder in Placeholder::ALL {
        text = text.replace(placeholder.token(), subs.value(placeholder));
    }
    text
}

/// `__VENVR_*__` tokens still present in `text`, in order of appearance.
pub fn unresolved_placeholders(text: &str) -> Vec<String> {
    let re = TOKEN_RE.get_or_init(|| Regex::new(r"__VENVR_[A-Z0-9_]+?__").expect("token regex"));
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Drop an R block left by an earlier composition.
fn strip_previous_block(existing: &str) -> &str {
    match existing.find(BLOCK_MARKER) {
        Some(idx) => {
            let head = &existing[..idx];
            head.strip_suffix('\n').unwrap_or(head)
        }
        None => existing,
    }
}

/// Merge `template` into `existing`. Pure text transformation.
pub fn compose(existing: &str, template: &str, subs: &Substitutions) -> String {
    let py_script = rename_primary_deactivate(strip_previous_block(existing));
    let r_script = resolve_placeholders(template, subs);
    let leftovers = unresolved_placeholders(&r_script);
    if !leftovers.is_empty() {
        tracing::warn!(
            tokens = %leftovers.join(", "),
            set_version = PLACEHOLDER_SET_VERSION,
            "Activation template has unresolved placeholders"
        );
    }
    let mut script = String::with_capacity(py_script.len() + r_script.len());
    script.push_str(&py_script);
    script.push_str(&r_script);
    script
}

/// Rewrite the activation script at `path` in place. No backup is kept.
pub fn compose_activate_script(path: &Path, template: &str, subs: &Substitutions) -> Result<()> {
    let existing =
        fs::read_to_string(path).map_err(|e| BuildError::io("Read activate script", path, e))?;
    let script = compose(&existing, template, subs);
    fs::write(path, script).map_err(|e| BuildError::io("Write activate script", path, e))?;
    tracing::debug!(path = %path.display(), "Composed activate script");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PY_ACTIVATE: &str = "\
deactivate () {
    unset VIRTUAL_ENV
    if [ ! \"${1:-}\" = \"nondestructive\" ] ; then
        unset -f deactivate
    fi
}

deactivate_custom () { :; }

# unset irrelevant variables
deactivate nondestructive
VIRTUAL_ENV=/envs/proj
export VIRTUAL_ENV
";

    fn subs() -> Substitutions {
        Substitutions {
            system_packages: false,
            r_home: "/opt/R/lib/R".to_string(),
            py_exec: "/envs/proj/bin/python".to_string(),
            lib_name: "lib".to_string(),
        }
    }

    #[test]
    fn test_rename_whole_word_only() {
        let renamed = rename_primary_deactivate(PY_ACTIVATE);
        assert!(renamed.contains("deactivate_py () {"));
        assert!(renamed.contains("unset -f deactivate_py\n"));
        assert!(renamed.contains("deactivate_py nondestructive"));
        assert!(renamed.contains("deactivate_custom () { :; }"));
        assert!(!renamed.contains("deactivate_py_custom"));
        assert!(!renamed.contains("deactivate ("));
    }

    #[test]
    fn test_rename_is_stable_on_renamed_text() {
        let once = rename_primary_deactivate(PY_ACTIVATE).into_owned();
        let twice = rename_primary_deactivate(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_resolve_all_placeholders() {
        let template: String = Placeholder::ALL
            .iter()
            .map(|p| format!("{}\n", p.token()))
            .collect();
        let resolved = resolve_placeholders(&template, &subs());
        assert_eq!(resolved, "false\n/opt/R/lib/R\n/envs/proj/bin/python\nlib\n");
        assert!(unresolved_placeholders(&resolved).is_empty());
    }

    #[test]
    fn test_shipped_template_fully_resolves() {
        let resolved = resolve_placeholders(R_ACTIVATE_TEMPLATE, &subs());
        assert!(unresolved_placeholders(&resolved).is_empty());
        for p in Placeholder::ALL {
            assert!(R_ACTIVATE_TEMPLATE.contains(p.token()), "template lacks {}", p.token());
            assert!(!resolved.contains(p.token()));
        }
        assert!(resolved.contains("R_HOME=\"/opt/R/lib/R\""));
        assert!(resolved.contains("RETICULATE_PYTHON=\"/envs/proj/bin/python\""));
        assert!(resolved.contains("\"$VIRTUAL_ENV/lib\"/R[0-9]*"));
        assert!(resolved.contains("if [ \"false\" = \"false\" ]"));
    }

    #[test]
    fn test_unknown_token_left_unresolved() {
        let resolved = resolve_placeholders("__VENVR_R_HOME__ __VENVR_FUTURE__", &subs());
        assert_eq!(resolved, "/opt/R/lib/R __VENVR_FUTURE__");
        assert_eq!(unresolved_placeholders(&resolved), vec!["__VENVR_FUTURE__"]);
    }

    #[test]
    fn test_compose_orders_python_then_r() {
        let merged = compose(PY_ACTIVATE, R_ACTIVATE_TEMPLATE, &subs());
        let py_end = merged.find("export VIRTUAL_ENV").unwrap();
        let r_start = merged.find(BLOCK_MARKER).unwrap();
        assert!(py_end < r_start);
        // Two independently callable routines.
        assert!(merged.contains("deactivate_py () {"));
        assert!(merged.contains("\ndeactivate () {\n    deactivate_py \"$@\""));
        assert!(unresolved_placeholders(&merged).is_empty());
    }

    #[test]
    fn test_compose_replaces_previous_block() {
        let first = compose(PY_ACTIVATE, R_ACTIVATE_TEMPLATE, &subs());
        let mut newer = subs();
        newer.r_home = "/opt/R-4.4/lib/R".to_string();
        let second = compose(&first, R_ACTIVATE_TEMPLATE, &newer);

        assert_eq!(second.matches(BLOCK_MARKER).count(), 1);
        assert!(second.contains("/opt/R-4.4/lib/R"));
        assert!(!second.contains("\"/opt/R/lib/R\""));
        assert_eq!(second, compose(PY_ACTIVATE, R_ACTIVATE_TEMPLATE, &newer));
    }

    #[test]
    fn test_compose_activate_script_in_place() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("activate");
        fs::write(&path, PY_ACTIVATE).unwrap();
        compose_activate_script(&path, R_ACTIVATE_TEMPLATE, &subs()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("deactivate_py () {"));
        assert!(content.contains(BLOCK_MARKER));
    }

    #[test]
    fn test_compose_activate_script_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = compose_activate_script(&tmp.path().join("activate"), R_ACTIVATE_TEMPLATE, &subs())
            .unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }
}
