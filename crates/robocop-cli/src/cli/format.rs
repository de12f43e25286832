use robocop_core::config::ConfigManager;
use robocop_core::formatter::SourceFormatter;

use super::{CliResult, Context, FormatFiles};

pub fn handle_format_command(cmd: &FormatFiles, ctx: &Context) -> CliResult<i32> {
    let options = cmd.common.manager_options(&cmd.sources, cmd.overrides());
    let manager = ConfigManager::new(options)?;
    let config = manager.default_config();
    let verbose = ctx.verbose || config.common.verbose;

    let mut formatter = SourceFormatter::new(manager);
    let outcome = formatter.run()?;

    if verbose {
        for path in formatter.manager().loaded_files() {
            ctx.try_log(|logger| info!(logger, "Loaded configuration from {}", path.display()));
        }
    }
    for notice in &outcome.notices {
        ctx.try_log(|logger| info!(logger, "{}", notice));
    }
    if config.common.silent {
        return Ok(outcome.exit_code);
    }
    for diff in &outcome.diffs {
        print!("{}", diff);
    }
    let unchanged = outcome.files - outcome.changed.len();
    let verb = if config.format.overwrite() { "reformatted" } else { "would be reformatted" };
    let changed = pluralize!(outcome.changed.len(), "file");
    let changed = if outcome.changed.is_empty() { green!("{} {}", changed, verb) } else { yellow!("{} {}", changed, verb) };
    println!("\n{}, {} left unchanged.", changed, pluralize!(unchanged, "file"));
    Ok(outcome.exit_code)
}
