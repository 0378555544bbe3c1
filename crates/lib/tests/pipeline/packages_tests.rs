use stagepack_lib::pipeline::{PipelineError, TargetId};
use stagepack_lib::platform::os::Os;

use crate::common::{FakeRunner, Fixture, PROJECTS, run};

#[tokio::test]
async fn packs_every_project_in_order() {
  let fixture = Fixture::new(Os::Linux);
  let pipeline = fixture.pipeline(FakeRunner::default());

  let (result, _) = run(&pipeline).await;
  assert!(result.is_success(), "{:?}", result.failed);

  let dirs = &fixture.settings.dirs;
  let packs = pipeline.runner().calls_to("dotnet");
  assert_eq!(packs.len(), PROJECTS.len());

  for (call, project) in packs.iter().zip(PROJECTS) {
    assert_eq!(call.program, dirs.stage2.join("dotnet"));
    let expected: Vec<String> = vec![
      "pack".to_string(),
      dirs.project_file(project).to_string_lossy().to_string(),
      "--no-build".to_string(),
      "--serviceable".to_string(),
      "--build-base-path".to_string(),
      dirs.packaging_build_base().to_string_lossy().to_string(),
      "--output".to_string(),
      dirs.packages.to_string_lossy().to_string(),
      "--configuration".to_string(),
      "Release".to_string(),
      "--version-suffix".to_string(),
      "000042".to_string(),
    ];
    assert_eq!(call.args, expected);
    assert_eq!(call.env["VersionSuffix"], "preview-000042");
    assert_eq!(call.env["CONFIGURATION"], "Release");
  }
}

#[tokio::test]
async fn failed_pack_stops_remaining_projects() {
  let fixture = Fixture::new(Os::Linux);
  let pipeline = fixture.pipeline(FakeRunner::failing_on("Beta.Library"));

  let (result, _) = run(&pipeline).await;

  let (failed, err) = result.failed.as_ref().unwrap();
  assert_eq!(*failed, TargetId::GenerateNugetPackages);
  match err {
    PipelineError::PackFailed { project, .. } => assert_eq!(project, "Beta.Library"),
    other => panic!("expected PackFailed, got {other:?}"),
  }
  assert_eq!(result.not_run, vec![TargetId::TestInstaller]);

  let packed: Vec<String> = pipeline
    .runner()
    .calls_to("dotnet")
    .iter()
    .map(|c| c.args[1].clone())
    .collect();
  assert_eq!(packed.len(), 2);
  assert!(packed[0].contains("Alpha.Library"));
  assert!(packed[1].contains("Beta.Library"));
}

#[tokio::test]
async fn configured_tool_replaces_stage2_host() {
  let mut fixture = Fixture::new(Os::Linux);
  fixture.settings.config.packaging.tool = Some("/opt/sdk/dotnet".into());
  let pipeline = fixture.pipeline(FakeRunner::default());

  let (result, _) = run(&pipeline).await;
  assert!(result.is_success(), "{:?}", result.failed);

  let packs = pipeline.runner().calls_to("dotnet");
  assert_eq!(packs.len(), PROJECTS.len());
  assert!(packs.iter().all(|c| c.program == std::path::Path::new("/opt/sdk/dotnet")));
}
