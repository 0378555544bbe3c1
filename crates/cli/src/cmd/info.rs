use anyhow::Result;

use stagepack_lib::execute::SystemRunner;
use stagepack_lib::pipeline::Pipeline;

use crate::cmd::GlobalOpts;
use crate::output::{print_info, print_json, print_stat};

pub fn cmd_info(opts: &GlobalOpts) -> Result<()> {
  let settings = opts.settings()?;
  let pipeline = Pipeline::new(settings, SystemRunner);
  let settings = pipeline.settings();
  let dirs = &settings.dirs;
  let version = &settings.config.version;

  if opts.output.is_json() {
    return print_json(&serde_json::json!({
      "rid": settings.platform.rid(),
      "os": settings.platform.os.as_str(),
      "arch": settings.platform.arch.as_str(),
      "archive_extension": pipeline.archiver().extension(),
      "configuration": settings.config.configuration,
      "version": version.nuget_version(),
      "repo_root": dirs.repo_root,
      "output": dirs.output,
      "stage2": dirs.stage2,
      "packages": dirs.packages,
      "packaging_tool": settings.packaging_tool(),
      "skip_packaging": settings.skip_packaging,
    }));
  }

  print_info(&format!("stagepack v{}", env!("CARGO_PKG_VERSION")));
  println!();
  print_stat("Platform", &settings.platform.rid());
  print_stat("OS", settings.platform.os.as_str());
  print_stat("Arch", settings.platform.arch.as_str());
  print_stat("Archive format", pipeline.archiver().extension());
  print_stat("Configuration", &settings.config.configuration);
  print_stat("Version", &version.nuget_version());
  print_stat("Repo root", &dirs.repo_root.display().to_string());
  print_stat("Output", &dirs.output.display().to_string());
  print_stat("Stage2", &dirs.stage2.display().to_string());
  print_stat("Packaging tool", &settings.packaging_tool().display().to_string());
  if settings.skip_packaging {
    print_stat("Packaging", "skipped by request");
  }

  Ok(())
}
