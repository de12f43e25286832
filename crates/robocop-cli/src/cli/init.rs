use std::fs;
use std::path::Path;

use robocop_core::config::default_config_toml;
use robocop_core::RobocopError;

use super::{CliError, CliResult, Context, InitConfig};

/// Writes the default configuration, refusing to replace an existing file
pub fn write_default_config(path: &Path) -> CliResult<()> {
    if path.exists() {
        return Err(RobocopError::ConfigExists(path.to_path_buf()).into());
    }
    fs::write(path, default_config_toml()).map_err(|source| CliError::Write { path: path.to_path_buf(), source })
}

pub fn handle_init_command(cmd: &InitConfig, ctx: &Context) -> CliResult<i32> {
    write_default_config(&cmd.path)?;
    ctx.try_log(|logger| info!(logger, "Created {}", cmd.path.display()));
    println!("{} {}", green!("Created"), cmd.path.display());
    Ok(0)
}
