//! Implementation of the `stagepack plan` command.

use anyhow::{Context, Result};

use stagepack_lib::context::BuildContext;
use stagepack_lib::execute::SystemRunner;
use stagepack_lib::pipeline::Pipeline;

use crate::cmd::GlobalOpts;
use crate::output::{print_json, print_stat, print_success, symbols};

/// Validate the target order and print what each target reads and writes.
pub fn cmd_plan(opts: &GlobalOpts) -> Result<()> {
  let settings = opts.settings()?;
  let pipeline = Pipeline::new(settings, SystemRunner);
  pipeline
    .validate(&BuildContext::new())
    .context("Target order is invalid")?;

  let settings = pipeline.settings();

  if opts.output.is_json() {
    return print_json(&serde_json::json!({
      "rid": settings.platform.rid(),
      "archive_extension": pipeline.archiver().extension(),
      "projects": settings.config.packaging.projects,
      "targets": pipeline.targets(),
    }));
  }

  for (idx, target) in pipeline.targets().iter().enumerate() {
    println!("{idx}. {}", target.id);
    for key in target.consumes {
      println!("     {} {key}", symbols::MINUS);
    }
    for key in target.produces {
      println!("     {} {key}", symbols::PLUS);
    }
  }
  println!();
  print_stat("Runtime identifier", &settings.platform.rid());
  print_stat("Archive format", pipeline.archiver().extension());
  print_stat("Projects", &settings.config.packaging.projects.len().to_string());
  print_success(&format!("{} targets in valid order", pipeline.targets().len()));

  Ok(())
}
