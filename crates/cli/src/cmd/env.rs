//! Implementation of the `stagepack env` command.
//!
//! Prints the environment table that installer hooks and the packaging tool
//! receive, without running anything.

use anyhow::Result;

use stagepack_lib::context::{BuildContext, keys};
use stagepack_lib::pipeline::common_env_vars;

use crate::cmd::GlobalOpts;
use crate::output::print_json;

pub fn cmd_env(opts: &GlobalOpts) -> Result<()> {
  let settings = opts.settings()?;

  let mut ctx = BuildContext::new();
  ctx.set(keys::BUILD_VERSION, settings.config.version.clone());
  ctx.set(keys::CONFIGURATION, settings.config.configuration.clone());

  let vars = common_env_vars(&ctx, &settings)?;

  if opts.output.is_json() {
    return print_json(&vars);
  }

  for (key, value) in &vars {
    println!("{key}={value}");
  }
  Ok(())
}
