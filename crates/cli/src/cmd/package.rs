//! Implementation of the `stagepack package` command.
//!
//! Runs every packaging target against the staged output of the current
//! repository and reports which targets completed.

use std::time::Instant;

use anyhow::{Context, Result, anyhow};

use stagepack_lib::context::BuildContext;
use stagepack_lib::execute::SystemRunner;
use stagepack_lib::pipeline::Pipeline;

use crate::cmd::GlobalOpts;
use crate::output::{format_duration, print_json, print_stat, print_success, print_warning, symbols};

pub fn cmd_package(opts: &GlobalOpts) -> Result<()> {
  let settings = opts.settings()?;
  let pipeline = Pipeline::new(settings, SystemRunner);

  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;

  let start = Instant::now();
  let mut ctx = BuildContext::new();
  let result = rt.block_on(pipeline.run(&mut ctx)).context("Invalid target order")?;
  let elapsed = start.elapsed();

  if opts.output.is_json() {
    let failed = result
      .failed
      .as_ref()
      .map(|(id, err)| serde_json::json!({ "target": id, "error": err.to_string() }));
    print_json(&serde_json::json!({
      "success": result.is_success(),
      "skipped_by_request": result.skipped_by_request,
      "completed": result.completed,
      "failed": failed,
      "not_run": result.not_run,
      "total": result.total(),
      "elapsed_ms": elapsed.as_millis() as u64,
    }))?;
  } else if result.skipped_by_request {
    print_warning("Packaging skipped by request");
  } else {
    for id in &result.completed {
      println!("  {} {}", symbols::SUCCESS, id);
    }
    if let Some((id, _)) = &result.failed {
      println!("  {} {}", symbols::ERROR, id);
    }
    for id in &result.not_run {
      println!("  {} {}", symbols::SKIPPED, id);
    }
    println!();

    if result.is_success() {
      print_success(&format!("Packaging complete in {}", format_duration(elapsed)));
      print_stat("Targets", &format!("{}/{}", result.completed.len(), result.total()));
      print_stat("Packages", &pipeline.settings().dirs.packages.display().to_string());
    }
  }

  match result.failed {
    Some((id, err)) => Err(anyhow!(err).context(format!("Target {id} failed"))),
    None => Ok(()),
  }
}
