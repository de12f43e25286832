use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use hiro_system_kit::{self, Logger};
use robocop_core::config::{ManagerOptions, RawCommon, RawConfig, RawFormat, RawLint};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

mod check;
mod docs;
mod errors;
mod format;
mod init;
mod list;

pub use errors::{CliError, CliResult};

/// Exit status for configuration, IO and argument problems
pub const EXIT_ABNORMAL: i32 = 2;

#[derive(Clone)]
pub struct Context {
    pub logger: Option<Logger>,
    pub verbose: bool,
}

#[allow(dead_code)]
impl Context {
    pub fn empty() -> Context {
        Context { logger: None, verbose: false }
    }

    pub fn try_log<F>(&self, closure: F)
    where
        F: FnOnce(&Logger),
    {
        if let Some(ref logger) = self.logger {
            closure(logger)
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "robocop",
    author,
    version,
    about = "Static code analysis tool (linter) and code formatter for Robot Framework",
    long_about = None
)]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Command {
    /// Lint files
    #[clap(name = "check", bin_name = "check")]
    Check(CheckFiles),
    /// Format files
    #[clap(name = "format", bin_name = "format")]
    Format(FormatFiles),
    /// List available rules, reports or formatters
    #[clap(subcommand, name = "list", bin_name = "list")]
    List(ListCommand),
    /// Print documentation of a rule, report or formatter
    #[clap(name = "docs", bin_name = "docs")]
    Docs(GetDocumentation),
    /// Create a default configuration file
    #[clap(name = "init", bin_name = "init")]
    Init(InitConfig),
}

/// Options shared by `check` and `format`
#[derive(Args, PartialEq, Clone, Debug, Default)]
pub struct CommonArgs {
    /// Path to configuration file. Disables configuration discovery
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Project root directory, found from the sources when omitted
    #[arg(long = "root")]
    pub root: Option<PathBuf>,
    /// Do not stop configuration discovery at the .git directory
    #[arg(long = "ignore-git-dir")]
    pub ignore_git_dir: bool,
    /// Do not skip files listed in .gitignore
    #[arg(long = "skip-gitignore")]
    pub skip_gitignore: bool,
    /// Ignore configuration files found in the project
    #[arg(long = "ignore-file-config")]
    pub ignore_file_config: bool,
    /// Path patterns to exclude, replacing configured ones
    #[arg(long = "exclude", short = 'e', value_delimiter = ',')]
    pub exclude: Vec<String>,
    /// Path patterns to exclude in addition to configured ones
    #[arg(long = "extend-exclude", value_delimiter = ',')]
    pub extend_exclude: Vec<String>,
    /// Display extra information about the run
    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,
    /// Do not print issues or diffs
    #[arg(long = "silent", conflicts_with = "verbose")]
    pub silent: bool,
}

impl CommonArgs {
    fn raw(&self) -> RawCommon {
        RawCommon {
            exclude: self.exclude.clone(),
            extend_exclude: self.extend_exclude.clone(),
            verbose: self.verbose.then_some(true),
            silent: self.silent.then_some(true),
            ..RawCommon::default()
        }
    }

    pub fn manager_options(&self, sources: &[PathBuf], overrides: RawConfig) -> ManagerOptions {
        ManagerOptions {
            sources: sources.to_vec(),
            config: self.config.clone(),
            root: self.root.clone(),
            ignore_git_dir: self.ignore_git_dir,
            skip_gitignore: self.skip_gitignore,
            ignore_file_config: self.ignore_file_config,
            overrides,
        }
    }
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct CheckFiles {
    /// Files or directories to lint, the current directory by default
    pub sources: Vec<PathBuf>,
    /// Run only the listed rules (names, ids or glob patterns)
    #[arg(long = "select", short = 's', value_delimiter = ',')]
    pub select: Vec<String>,
    /// Enable rules in addition to the selected ones
    #[arg(long = "extend-select", short = 'S', value_delimiter = ',')]
    pub extend_select: Vec<String>,
    /// Rules to skip
    #[arg(long = "ignore", short = 'i', value_delimiter = ',')]
    pub ignore: Vec<String>,
    /// Lowest severity to report: I, W or E
    #[arg(long = "threshold", short = 't')]
    pub threshold: Option<String>,
    /// Configure a rule or report with name.param=value
    #[arg(long = "configure", short = 'c')]
    pub configure: Vec<String>,
    /// Reports to generate, `all` for every default report
    #[arg(long = "reports", short = 'r', value_delimiter = ',')]
    pub reports: Vec<String>,
    /// Template of a printed issue
    #[arg(long = "issue-format")]
    pub issue_format: Option<String>,
    /// Always exit with status 0 when the run completes
    #[arg(long = "exit-zero")]
    pub exit_zero: bool,
    /// Store report results to compare with the next run
    #[arg(long = "persistent")]
    pub persistent: bool,
    /// Show differences against the previous persistent run
    #[arg(long = "compare-runs")]
    pub compare_runs: bool,
    #[command(flatten)]
    pub common: CommonArgs,
}

impl CheckFiles {
    pub fn overrides(&self) -> RawConfig {
        RawConfig {
            common: self.common.raw(),
            lint: RawLint {
                select: self.select.clone(),
                extend_select: self.extend_select.clone(),
                ignore: self.ignore.clone(),
                configure: self.configure.clone(),
                reports: self.reports.clone(),
                threshold: self.threshold.clone(),
                issue_format: self.issue_format.clone(),
                exit_zero: self.exit_zero.then_some(true),
                persistent: self.persistent.then_some(true),
                compare_runs: self.compare_runs.then_some(true),
            },
            format: RawFormat::default(),
        }
    }
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct FormatFiles {
    /// Files or directories to format, the current directory by default
    pub sources: Vec<PathBuf>,
    /// Run only the listed formatters
    #[arg(long = "select", short = 's', value_delimiter = ',')]
    pub select: Vec<String>,
    /// Enable formatters in addition to the default ones
    #[arg(long = "extend-select", short = 'S', value_delimiter = ',')]
    pub extend_select: Vec<String>,
    /// Configure a formatter with Name.param=value
    #[arg(long = "configure", short = 'c')]
    pub configure: Vec<String>,
    /// Write formatted files, the default unless --check is used
    #[arg(long = "overwrite", conflicts_with = "no_overwrite")]
    pub overwrite: bool,
    /// Never write formatted files
    #[arg(long = "no-overwrite")]
    pub no_overwrite: bool,
    /// Print a unified diff of the changes
    #[arg(long = "diff")]
    pub diff: bool,
    /// Exit with status 1 when any file would be reformatted
    #[arg(long = "check")]
    pub check: bool,
    /// Number of spaces in a separator
    #[arg(long = "space-count")]
    pub space_count: Option<usize>,
    /// Number of spaces in a body indentation
    #[arg(long = "indent")]
    pub indent: Option<usize>,
    /// Number of spaces after `...` continuation markers
    #[arg(long = "continuation-indent")]
    pub continuation_indent: Option<usize>,
    /// Maximum line length
    #[arg(long = "line-length")]
    pub line_length: Option<usize>,
    /// Separator between cells: space or tab
    #[arg(long = "separator")]
    pub separator: Option<String>,
    /// Line ending: native, windows, unix or auto
    #[arg(long = "line-ending")]
    pub line_ending: Option<String>,
    /// Extra passes over a file while formatting keeps changing it
    #[arg(long = "reruns")]
    pub reruns: Option<usize>,
    #[command(flatten)]
    pub common: CommonArgs,
}

impl FormatFiles {
    pub fn overrides(&self) -> RawConfig {
        let overwrite = match (self.overwrite, self.no_overwrite) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        RawConfig {
            common: self.common.raw(),
            lint: RawLint::default(),
            format: RawFormat {
                select: self.select.clone(),
                extend_select: self.extend_select.clone(),
                configure: self.configure.clone(),
                space_count: self.space_count,
                indent: self.indent,
                continuation_indent: self.continuation_indent,
                line_length: self.line_length,
                separator: self.separator.clone(),
                line_ending: self.line_ending.clone(),
                overwrite,
                diff: self.diff.then_some(true),
                check: self.check.then_some(true),
                reruns: self.reruns,
            },
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum, AsRefStr, Display, EnumString, IntoStaticStr, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum ListFilter {
    Enabled,
    Disabled,
    Deprecated,
    /// Everything except deprecated entries
    #[default]
    All,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
pub enum ListCommand {
    /// List rules with their severity and status
    #[clap(name = "rules", bin_name = "rules")]
    Rules(ListRules),
    /// List reports
    #[clap(name = "reports", bin_name = "reports")]
    Reports(ListReports),
    /// List formatters
    #[clap(name = "formatters", bin_name = "formatters")]
    Formatters(ListFormatters),
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct ListRules {
    #[arg(long = "filter", value_enum, default_value_t = ListFilter::All)]
    pub filter: ListFilter,
    /// Only rules whose name or id matches the glob pattern
    #[arg(long = "pattern")]
    pub pattern: Option<String>,
    /// Configuration used to tell enabled rules from disabled ones
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct ListReports {
    /// Only reports enabled by the configuration
    #[arg(long = "enabled", conflicts_with = "disabled")]
    pub enabled: bool,
    /// Only reports disabled by the configuration
    #[arg(long = "disabled")]
    pub disabled: bool,
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct ListFormatters {
    #[arg(long = "filter", value_enum, default_value_t = ListFilter::All)]
    pub filter: ListFilter,
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct GetDocumentation {
    /// Rule name or id, report name or formatter name
    pub name: String,
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct InitConfig {
    /// Where to write the configuration file
    #[arg(long = "path", default_value = "robocop.toml")]
    pub path: PathBuf,
}

pub fn main() {
    let logger = hiro_system_kit::log::setup_logger();
    let _guard = hiro_system_kit::log::setup_global_logger(logger.clone());

    // usage errors exit with status 2, --help and --version with 0
    let opts: Opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => e.exit(),
    };
    let verbose = match &opts.command {
        Command::Check(cmd) => cmd.common.verbose,
        Command::Format(cmd) => cmd.common.verbose,
        _ => false,
    };
    let ctx = Context { logger: Some(logger), verbose };

    let code = match handle_command(opts, &ctx) {
        Ok(code) => code,
        Err(e) => {
            ctx.try_log(|logger| error!(logger, "{e}"));
            std::thread::sleep(std::time::Duration::from_millis(500));
            EXIT_ABNORMAL
        }
    };
    process::exit(code);
}

fn handle_command(opts: Opts, ctx: &Context) -> CliResult<i32> {
    match opts.command {
        Command::Check(cmd) => check::handle_check_command(&cmd, ctx),
        Command::Format(cmd) => format::handle_format_command(&cmd, ctx),
        Command::List(ListCommand::Rules(cmd)) => list::handle_list_rules(&cmd, ctx),
        Command::List(ListCommand::Reports(cmd)) => list::handle_list_reports(&cmd, ctx),
        Command::List(ListCommand::Formatters(cmd)) => list::handle_list_formatters(&cmd, ctx),
        Command::Docs(cmd) => docs::handle_docs_command(&cmd, ctx),
        Command::Init(cmd) => init::handle_init_command(&cmd, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn parse(args: &[&str]) -> Command {
        let argv = std::iter::once("robocop").chain(args.iter().copied());
        Opts::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn check_collects_lint_overrides() {
        // Arrange
        let args = ["check", "tests", "--select", "DOC01,LEN08", "-i", "SPC01", "-t", "W", "--exit-zero"];

        // Act
        let Command::Check(cmd) = parse(&args) else { panic!("expected check") };
        let overrides = cmd.overrides();

        // Assert
        assert_eq!(cmd.sources, vec![PathBuf::from("tests")]);
        assert_eq!(overrides.lint.select, vec!["DOC01", "LEN08"]);
        assert_eq!(overrides.lint.ignore, vec!["SPC01"]);
        assert_eq!(overrides.lint.threshold.as_deref(), Some("W"));
        assert_eq!(overrides.lint.exit_zero, Some(true));
        assert_eq!(overrides.common.verbose, None);
    }

    #[test]
    fn check_collects_run_comparison_flags() {
        let Command::Check(cmd) = parse(&["check", "--persistent", "--compare-runs"]) else { panic!("expected check") };
        let lint = cmd.overrides().lint;
        assert_eq!(lint.persistent, Some(true));
        assert_eq!(lint.compare_runs, Some(true));
    }

    #[test]
    fn configure_values_keep_commas() {
        let Command::Check(cmd) = parse(&["check", "-c", "line-too-long.line_length=140", "-c", "DOC02.severity=E"])
        else {
            panic!("expected check")
        };
        assert_eq!(cmd.overrides().lint.configure, vec!["line-too-long.line_length=140", "DOC02.severity=E"]);
    }

    #[test_case(&["format"], None ; "default")]
    #[test_case(&["format", "--overwrite"], Some(true) ; "overwrite")]
    #[test_case(&["format", "--no-overwrite"], Some(false) ; "no overwrite")]
    fn format_overwrite_flag(args: &[&str], expected: Option<bool>) {
        let Command::Format(cmd) = parse(args) else { panic!("expected format") };
        assert_eq!(cmd.overrides().format.overwrite, expected);
    }

    #[test]
    fn format_collects_layout_options() {
        let args = ["format", "--check", "--diff", "--space-count", "2", "--separator", "tab", "--reruns", "3"];
        let Command::Format(cmd) = parse(&args) else { panic!("expected format") };
        let format = cmd.overrides().format;
        assert_eq!(format.check, Some(true));
        assert_eq!(format.diff, Some(true));
        assert_eq!(format.space_count, Some(2));
        assert_eq!(format.separator.as_deref(), Some("tab"));
        assert_eq!(format.reruns, Some(3));
    }

    #[test]
    fn common_options_reach_manager() {
        let args = ["check", "--config", "custom.toml", "--ignore-git-dir", "--exclude", "a,b", "-v"];
        let Command::Check(cmd) = parse(&args) else { panic!("expected check") };
        let options = cmd.common.manager_options(&cmd.sources, cmd.overrides());
        assert_eq!(options.config, Some(PathBuf::from("custom.toml")));
        assert!(options.ignore_git_dir);
        assert_eq!(options.overrides.common.exclude, vec!["a", "b"]);
        assert_eq!(options.overrides.common.verbose, Some(true));
    }

    #[test_case(&["list", "rules", "--filter", "deprecated"], ListFilter::Deprecated)]
    #[test_case(&["list", "rules"], ListFilter::All)]
    fn list_rules_filter(args: &[&str], expected: ListFilter) {
        let Command::List(ListCommand::Rules(cmd)) = parse(args) else { panic!("expected list rules") };
        assert_eq!(cmd.filter, expected);
    }

    #[test_case(&["format", "--overwrite", "--no-overwrite"] ; "conflicting overwrite flags")]
    #[test_case(&["check", "--verbose", "--silent"] ; "verbose and silent")]
    #[test_case(&["list", "reports", "--enabled", "--disabled"] ; "enabled and disabled reports")]
    #[test_case(&["list"] ; "missing list resource")]
    fn rejects_invalid_arguments(args: &[&str]) {
        let argv = std::iter::once("robocop").chain(args.iter().copied());
        assert!(Opts::try_parse_from(argv).is_err());
    }

    #[test]
    fn init_defaults_to_robocop_toml() {
        let Command::Init(cmd) = parse(&["init"]) else { panic!("expected init") };
        assert_eq!(cmd.path, PathBuf::from("robocop.toml"));
    }
}
