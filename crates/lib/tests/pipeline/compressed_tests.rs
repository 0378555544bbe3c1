use std::fs::File;
use std::path::PathBuf;

use stagepack_lib::context::keys;
use stagepack_lib::pipeline::{PipelineError, TargetId};
use stagepack_lib::platform::os::Os;

use crate::common::{BADGE_TEMPLATE, FakeRunner, Fixture, run};

fn zip_entries(path: &std::path::Path) -> Vec<String> {
  let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
  let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
  names.sort();
  names
}

#[tokio::test]
async fn badge_replaces_every_token() {
  let fixture = Fixture::new(Os::Linux);
  let pipeline = fixture.pipeline(FakeRunner::default());

  let (result, ctx) = run(&pipeline).await;
  assert!(result.is_success(), "{:?}", result.failed);

  let badge: &PathBuf = ctx.get(keys::VERSION_BADGE).unwrap();
  assert_eq!(
    badge,
    &fixture.settings.dirs.output.join("sdk_1.0.0-preview-000042_linux_x64.svg")
  );

  let content = std::fs::read_to_string(badge).unwrap();
  assert_eq!(content, BADGE_TEMPLATE.replace("ver_number", "1.0.0-preview-000042"));
  assert!(!content.contains("ver_number"));
}

#[tokio::test]
async fn missing_badge_template_stops_before_any_process() {
  let fixture = Fixture::new(Os::Linux);
  std::fs::remove_file(fixture.settings.dirs.version_badge_template()).unwrap();
  let pipeline = fixture.pipeline(FakeRunner::default());

  let (result, _) = run(&pipeline).await;

  let (failed, err) = result.failed.as_ref().unwrap();
  assert_eq!(*failed, TargetId::GenerateVersionBadge);
  assert!(matches!(err, PipelineError::MissingInput { .. }));
  assert_eq!(result.completed, vec![TargetId::Prepare, TargetId::InitPackage]);
  assert!(pipeline.runner().calls().is_empty());
}

#[tokio::test]
async fn windows_writes_three_zips_in_process() {
  let fixture = Fixture::new(Os::Windows);
  let pipeline = fixture.pipeline(FakeRunner::default());

  let (result, ctx) = run(&pipeline).await;
  assert!(result.is_success(), "{:?}", result.failed);
  assert!(pipeline.runner().calls_to("tar").is_empty());

  let host: &PathBuf = ctx.get(keys::COMBINED_HOST_ARCHIVE).unwrap();
  let no_host: &PathBuf = ctx.get(keys::COMBINED_NO_HOST_ARCHIVE).unwrap();
  let symbols: &PathBuf = ctx.get(keys::SDK_SYMBOLS_ARCHIVE).unwrap();

  let packages = &fixture.settings.dirs.packages;
  assert_eq!(host, &packages.join("dotnet-dev-win-x64.1.0.0-preview-000042.zip"));
  assert_eq!(no_host, &packages.join("dotnet-dev-nohost-win-x64.1.0.0-preview-000042.zip"));
  assert_eq!(symbols, &packages.join("dotnet-dev-debug-win-x64.1.0.0-preview-000042.zip"));

  let host_entries = zip_entries(host);
  assert!(host_entries.contains(&"dotnet".to_string()));
  assert!(host_entries.contains(&"1.0.0/dotnet.dll".to_string()));
  assert!(host_entries.contains(&"fxr/1.0.0/libhostfxr.so".to_string()));
  assert!(host_entries.iter().all(|e| !e.starts_with("combined")));

  let no_host_entries = zip_entries(no_host);
  assert!(!no_host_entries.contains(&"dotnet".to_string()));
  assert!(no_host_entries.contains(&"Microsoft.NETCore.App/1.0.0/System.Runtime.dll".to_string()));

  assert_eq!(zip_entries(symbols), vec!["1.0.0/", "1.0.0/dotnet.pdb"]);
}

#[tokio::test]
async fn unix_delegates_two_tarballs_to_tar() {
  let fixture = Fixture::new(Os::Linux);
  let pipeline = fixture.pipeline(FakeRunner::default());

  let (result, ctx) = run(&pipeline).await;
  assert!(result.is_success(), "{:?}", result.failed);

  let host: &PathBuf = ctx.get(keys::COMBINED_HOST_ARCHIVE).unwrap();
  let symbols: &PathBuf = ctx.get(keys::SDK_SYMBOLS_ARCHIVE).unwrap();
  let no_host: &PathBuf = ctx.get(keys::COMBINED_NO_HOST_ARCHIVE).unwrap();

  let tar_calls = pipeline.runner().calls_to("tar");
  assert_eq!(tar_calls.len(), 2);
  assert_eq!(
    tar_calls[0].args,
    vec![
      "-czf".to_string(),
      host.to_string_lossy().to_string(),
      "-C".to_string(),
      fixture.obj("combined-framework-sdk-host").to_string_lossy().to_string(),
      ".".to_string(),
    ]
  );
  assert_eq!(tar_calls[1].args[1], symbols.to_string_lossy());
  assert_eq!(
    tar_calls[1].args[3],
    fixture.settings.dirs.stage2_symbols.join("sdk").to_string_lossy()
  );

  assert!(host.to_string_lossy().ends_with("dotnet-dev-linux-x64.1.0.0-preview-000042.tar.gz"));
  assert!(host.is_file());
  assert!(!no_host.exists());

  let zips = std::fs::read_dir(&fixture.settings.dirs.packages)
    .unwrap()
    .filter_map(Result::ok)
    .filter(|e| e.path().extension().is_some_and(|x| x == "zip"))
    .count();
  assert_eq!(zips, 0);
}

#[tokio::test]
async fn tar_failure_fails_compressed_file() {
  let fixture = Fixture::new(Os::Linux);
  let pipeline = fixture.pipeline(FakeRunner::failing_on("-czf"));

  let (result, _) = run(&pipeline).await;

  let (failed, err) = result.failed.as_ref().unwrap();
  assert_eq!(*failed, TargetId::GenerateCompressedFile);
  assert!(matches!(err, PipelineError::Archive(_)));
  assert_eq!(pipeline.runner().calls().len(), 1);
  assert_eq!(
    result.not_run,
    vec![
      TargetId::GenerateInstaller,
      TargetId::GenerateNugetPackages,
      TargetId::TestInstaller
    ]
  );
}
