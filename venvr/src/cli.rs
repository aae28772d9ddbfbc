use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use venvr_env::{BuildOptions, LinkStrategy, SiteScope};

/// Creates integrated virtual environments for Python and R in one or more
/// target directories.
#[derive(Parser, Debug)]
#[command(name = "venvr")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Once an environment has been created, you may wish to activate it, \
e.g. by sourcing an activate script in its bin directory.")]
pub struct Cli {
    /// Directories to create (or convert) environments in
    #[arg(value_name = "ENV_DIR", required = true, num_args = 1..)]
    pub dirs: Vec<PathBuf>,

    /// Add R to existing Python virtual environments
    #[arg(short = 'R', long = "convert-to-venvr")]
    pub convert: bool,

    /// Give the environment access to system site packages: python, r, both
    /// or none (default none; the bare flag means both)
    #[arg(
        long = "system-site-packages",
        value_enum,
        value_name = "SCOPE",
        num_args = 0..=1,
        default_missing_value = "both",
        ignore_case = true
    )]
    pub system_site_packages: Option<SiteScopeArg>,

    /// Try to use symlinks rather than copies (default except on Windows)
    #[arg(long, conflicts_with = "copies")]
    pub symlinks: bool,

    /// Try to use copies rather than symlinks
    #[arg(long)]
    pub copies: bool,

    /// Delete the contents of the environment directory if it already exists
    #[arg(long)]
    pub clear: bool,

    /// Upgrade the environment directory to use this version of Python
    #[arg(long)]
    pub upgrade: bool,

    /// Skip installing or upgrading pip in the environment
    #[arg(long)]
    pub without_pip: bool,

    /// Alternative prompt prefix for this environment
    #[arg(long, value_name = "PROMPT")]
    pub prompt: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteScopeArg {
    Python,
    R,
    Both,
    None,
}

impl From<SiteScopeArg> for SiteScope {
    fn from(arg: SiteScopeArg) -> Self {
        match arg {
            SiteScopeArg::Python => SiteScope::Python,
            SiteScopeArg::R => SiteScope::R,
            SiteScopeArg::Both => SiteScope::Both,
            SiteScopeArg::None => SiteScope::None,
        }
    }
}

impl Cli {
    fn link_strategy(&self) -> LinkStrategy {
        if self.symlinks {
            LinkStrategy::Symlink
        } else if self.copies {
            LinkStrategy::Copy
        } else {
            LinkStrategy::platform_default()
        }
    }

    /// Options for every directory of this invocation. Not yet validated.
    pub fn build_options(&self, tool_version: &str) -> BuildOptions {
        let scope = self.system_site_packages.map(SiteScope::from).unwrap_or_default();
        let mut options = BuildOptions::new(scope, tool_version);
        options.convert = self.convert;
        options.host.clear = self.clear;
        options.host.upgrade = self.upgrade;
        options.host.with_pip = !self.without_pip;
        options.host.link = self.link_strategy();
        options.host.prompt = self.prompt.clone();
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("venvr").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_requires_a_directory() {
        assert!(Cli::try_parse_from(["venvr"]).is_err());
        assert!(Cli::try_parse_from(["venvr", "--clear"]).is_err());
    }

    #[test]
    fn test_multiple_directories_keep_order() {
        let cli = parse(&["b", "a", "c"]);
        assert_eq!(cli.dirs, [PathBuf::from("b"), PathBuf::from("a"), PathBuf::from("c")]);
    }

    #[test]
    fn test_system_site_packages_default_is_none() {
        let opts = parse(&["env"]).build_options("0.1.0");
        assert!(!opts.host.system_site_packages);
        assert!(!opts.r_system_site_packages);
    }

    #[test]
    fn test_system_site_packages_bare_flag_means_both() {
        let opts = parse(&["env", "--system-site-packages"]).build_options("0.1.0");
        assert!(opts.host.system_site_packages);
        assert!(opts.r_system_site_packages);
    }

    #[test]
    fn test_system_site_packages_scope_case_insensitive() {
        let cli = parse(&["--system-site-packages", "R", "env"]);
        assert_eq!(cli.system_site_packages, Some(SiteScopeArg::R));
        let opts = cli.build_options("0.1.0");
        assert!(!opts.host.system_site_packages);
        assert!(opts.r_system_site_packages);

        let opts = parse(&["--system-site-packages=Python", "env"]).build_options("0.1.0");
        assert!(opts.host.system_site_packages);
        assert!(!opts.r_system_site_packages);
    }

    #[test]
    fn test_system_site_packages_rejects_unknown_scope() {
        assert!(Cli::try_parse_from(["venvr", "--system-site-packages=julia", "env"]).is_err());
    }

    #[test]
    fn test_symlinks_and_copies_conflict() {
        assert!(Cli::try_parse_from(["venvr", "--symlinks", "--copies", "env"]).is_err());
        assert_eq!(parse(&["--copies", "env"]).build_options("0.1.0").host.link, LinkStrategy::Copy);
        assert_eq!(
            parse(&["--symlinks", "env"]).build_options("0.1.0").host.link,
            LinkStrategy::Symlink
        );
        assert_eq!(
            parse(&["env"]).build_options("0.1.0").host.link,
            LinkStrategy::platform_default()
        );
    }

    #[test]
    fn test_flags_map_to_options() {
        let opts = parse(&["-R", "--without-pip", "--prompt", "stats", "env"]).build_options("9.9.9");
        assert!(opts.convert);
        assert!(!opts.host.with_pip);
        assert_eq!(opts.host.prompt.as_deref(), Some("stats"));
        assert_eq!(opts.tool_version, "9.9.9");
    }

    #[test]
    fn test_conflicting_flags_parse_but_fail_validation() {
        let opts = parse(&["--convert-to-venvr", "--clear", "env"]).build_options("0.1.0");
        let err = opts.validate().unwrap_err();
        assert_eq!(err.to_string(), "you cannot supply --convert-to-venvr and --clear together.");
    }
}
