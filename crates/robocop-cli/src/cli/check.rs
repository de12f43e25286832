use robocop_core::config::ConfigManager;
use robocop_core::linter::Linter;

use super::{CheckFiles, CliResult, Context};

pub fn handle_check_command(cmd: &CheckFiles, ctx: &Context) -> CliResult<i32> {
    let options = cmd.common.manager_options(&cmd.sources, cmd.overrides());
    let manager = ConfigManager::new(options)?;
    let config = manager.default_config();
    let verbose = ctx.verbose || config.common.verbose;

    let mut linter = Linter::new(manager);
    let outcome = linter.run()?;

    if verbose {
        for path in linter.manager().loaded_files() {
            ctx.try_log(|logger| info!(logger, "Loaded configuration from {}", path.display()));
        }
        ctx.try_log(|logger| info!(logger, "Linted {}", pluralize!(outcome.files, "file")));
    }
    for notice in &outcome.notices {
        ctx.try_log(|logger| info!(logger, "{}", notice));
    }
    if !config.common.silent {
        for block in outcome.output.iter().filter(|block| !block.is_empty()) {
            println!("{}", block);
        }
    }
    Ok(outcome.exit_code)
}
