use stagepack_lib::layout::LayoutError;
use stagepack_lib::pipeline::{PipelineError, TargetId};
use stagepack_lib::platform::os::Os;

use crate::common::{FakeRunner, Fixture, run, snapshot, top_level_snapshot, union, write_file};

#[tokio::test]
async fn primary_layouts_match_their_sources() {
  let fixture = Fixture::new(Os::Linux);
  let stage2 = fixture.settings.dirs.stage2.clone();
  let pipeline = fixture.pipeline(FakeRunner::default());

  let (result, _) = run(&pipeline).await;
  assert!(result.is_success(), "{:?}", result.failed);

  assert_eq!(snapshot(&fixture.obj("clisdk")), snapshot(&stage2.join("sdk")));
  assert_eq!(snapshot(&fixture.obj("sharedHost")), top_level_snapshot(&stage2));
  assert_eq!(snapshot(&fixture.obj("hostFxr")), snapshot(&stage2.join("host")));
  assert_eq!(snapshot(&fixture.obj("sharedFx")), snapshot(&stage2.join("shared")));
}

#[tokio::test]
async fn shared_host_takes_only_top_level_files() {
  let fixture = Fixture::new(Os::Linux);
  let pipeline = fixture.pipeline(FakeRunner::default());

  run(&pipeline).await;

  let shared_host = snapshot(&fixture.obj("sharedHost"));
  let names: Vec<&str> = shared_host.keys().map(String::as_str).collect();
  assert_eq!(names, vec!["LICENSE.txt", "dotnet"]);
}

#[tokio::test]
async fn combined_layouts_merge_with_later_roots_winning() {
  let fixture = Fixture::new(Os::Linux);
  let stage2 = fixture.settings.dirs.stage2.clone();
  // Same relative path in sdk and shared framework
  write_file(&stage2, "shared/1.0.0/dotnet.dll", b"framework copy");
  // Same relative path in shared host and host resolver
  write_file(&stage2, "host/LICENSE.txt", b"host license");
  let pipeline = fixture.pipeline(FakeRunner::default());

  let (result, _) = run(&pipeline).await;
  assert!(result.is_success(), "{:?}", result.failed);

  let sdk = snapshot(&stage2.join("sdk"));
  let shared = snapshot(&stage2.join("shared"));
  let shared_host = top_level_snapshot(&stage2);
  let host = snapshot(&stage2.join("host"));

  let with_host = snapshot(&fixture.obj("combined-framework-sdk-host"));
  assert_eq!(with_host, union(&[sdk.clone(), shared.clone(), shared_host, host]));
  assert_eq!(with_host["1.0.0/dotnet.dll"], b"framework copy");
  assert_eq!(with_host["LICENSE.txt"], b"host license");

  let without_host = snapshot(&fixture.obj("combined-framework-sdk"));
  assert_eq!(without_host, union(&[sdk, shared]));
  assert!(!without_host.contains_key("dotnet"));
}

#[tokio::test]
async fn rerun_rebuilds_layouts_from_scratch() {
  let fixture = Fixture::new(Os::Linux);
  let pipeline = fixture.pipeline(FakeRunner::default());

  run(&pipeline).await;
  let first = snapshot(&fixture.settings.dirs.intermediate);

  write_file(&fixture.obj("clisdk"), "stale.txt", b"left over");
  write_file(&fixture.obj("combined-framework-sdk"), "stale.txt", b"left over");

  let (result, _) = run(&pipeline).await;
  assert!(result.is_success(), "{:?}", result.failed);
  assert_eq!(snapshot(&fixture.settings.dirs.intermediate), first);
}

#[tokio::test]
async fn layout_roots_are_published() {
  let fixture = Fixture::new(Os::Linux);
  let pipeline = fixture.pipeline(FakeRunner::default());

  let (_, ctx) = run(&pipeline).await;

  for (key, dir) in [
    (stagepack_lib::context::keys::SDK_ROOT, "clisdk"),
    (stagepack_lib::context::keys::SHARED_HOST_ROOT, "sharedHost"),
    (stagepack_lib::context::keys::HOST_FXR_ROOT, "hostFxr"),
    (stagepack_lib::context::keys::SHARED_FRAMEWORK_ROOT, "sharedFx"),
    (stagepack_lib::context::keys::COMBINED_HOST_ROOT, "combined-framework-sdk-host"),
    (stagepack_lib::context::keys::COMBINED_NO_HOST_ROOT, "combined-framework-sdk"),
  ] {
    let path: &std::path::PathBuf = ctx.get(key).unwrap();
    assert_eq!(path, &fixture.obj(dir), "{key}");
  }
  assert!(fixture.settings.dirs.packages.is_dir());
}

#[tokio::test]
async fn missing_source_fails_init_package() {
  let fixture = Fixture::new(Os::Linux);
  std::fs::remove_dir_all(fixture.settings.dirs.stage2.join("shared")).unwrap();
  let runner = FakeRunner::default();
  let pipeline = fixture.pipeline(runner);

  let (result, _) = run(&pipeline).await;

  assert!(!result.is_success());
  assert_eq!(result.completed, vec![TargetId::Prepare]);
  let (failed, err) = result.failed.as_ref().unwrap();
  assert_eq!(*failed, TargetId::InitPackage);
  assert!(matches!(err, PipelineError::Layout(LayoutError::MissingSource(_))));
  assert_eq!(result.not_run.len(), 5);
  assert!(pipeline.runner().calls().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn unix_layouts_get_normalized_permissions() {
  use std::os::unix::fs::PermissionsExt;

  let fixture = Fixture::new(Os::Linux);
  let stage2 = fixture.settings.dirs.stage2.clone();
  write_file(&stage2, "sdk/1.0.0/run.sh", b"#!/bin/sh\necho hi\n");
  write_file(&stage2, "sdk/1.0.0/notes.txt", b"plain text");
  std::fs::set_permissions(stage2.join("sdk/1.0.0/notes.txt"), std::fs::Permissions::from_mode(0o777)).unwrap();
  let pipeline = fixture.pipeline(FakeRunner::default());

  let (result, _) = run(&pipeline).await;
  assert!(result.is_success(), "{:?}", result.failed);

  let mode = |p: std::path::PathBuf| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;

  assert_eq!(mode(fixture.obj("clisdk/1.0.0/dotnet.dll")), 0o644);
  assert_eq!(mode(fixture.obj("clisdk/1.0.0/notes.txt")), 0o644);
  assert_eq!(mode(fixture.obj("clisdk/1.0.0/run.sh")), 0o755);
  assert_eq!(mode(fixture.obj("clisdk/1.0.0")), 0o755);
  assert_eq!(mode(fixture.obj("sharedHost/dotnet")), 0o755);
  assert_eq!(mode(fixture.obj("sharedHost/LICENSE.txt")), 0o644);
  assert_eq!(mode(fixture.obj("hostFxr/fxr/1.0.0/libhostfxr.so")), 0o755);
  assert_eq!(mode(fixture.obj("sharedFx/Microsoft.NETCore.App/1.0.0/libcoreclr.so")), 0o755);
  assert_eq!(
    mode(fixture.obj("sharedFx/Microsoft.NETCore.App/1.0.0/System.Runtime.dll")),
    0o644
  );
}
