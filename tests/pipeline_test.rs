//! End-to-end pipeline runs against in-memory stage doubles.

mod common;

use common::{FakeSigner, HostCall, RecordingHost, context, pipeline, pipeline_with, settings};
use picologs_release::pipeline::{
    ArtifactNaming, Error, EventKind, Outcome, REPORT_FILE, RunReport, Stage,
};
use std::path::Path;

fn read_report(run_dir: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(run_dir.join(REPORT_FILE)).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn stage_names(report: &RunReport) -> Vec<Stage> {
    report.stages.iter().map(|s| s.stage).collect()
}

#[tokio::test]
async fn manual_dispatch_on_main_uploads_without_release() {
    let root = tempfile::tempdir().unwrap();
    let settings = settings(root.path(), ArtifactNaming::Fixed);
    let host = RecordingHost::default();
    let signer = FakeSigner::new(false);
    let pipeline = pipeline(&settings, root.path(), signer.clone(), Some(host.clone()));

    let ctx = context(&settings, EventKind::ManualDispatch, "refs/heads/main", None);
    let report = pipeline.run(&ctx).await.unwrap();

    assert!(report.succeeded());
    assert_eq!(
        stage_names(&report),
        vec![Stage::Provision, Stage::Build, Stage::Sign, Stage::Publish]
    );
    assert_eq!(signer.calls(), 1);

    let upload = report.publication.upload.as_ref().unwrap();
    assert_eq!(upload.name, "picologs.exe");
    let stored = root
        .path()
        .join("artifacts")
        .join(ctx.id.to_string())
        .join("picologs.exe");
    assert!(stored.is_file());
    assert!(std::fs::read_to_string(&stored).unwrap().ends_with("--signed--"));

    assert!(report.publication.release.is_none());
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn tag_push_releases_the_single_signed_artifact() {
    let root = tempfile::tempdir().unwrap();
    let settings = settings(root.path(), ArtifactNaming::Versioned);
    let host = RecordingHost::default();
    let pipeline = pipeline(&settings, root.path(), FakeSigner::new(false), Some(host.clone()));

    let ctx = context(&settings, EventKind::Push, "refs/tags/v1.2.3", Some("1.2.3"));
    let report = pipeline.run(&ctx).await.unwrap();

    let artifact = report.artifact.as_ref().unwrap();
    assert_eq!(artifact.name(), "picologs-1.2.3.exe");
    assert_eq!(artifact.run_id(), ctx.id);

    assert_eq!(
        host.calls(),
        vec![
            HostCall::Tag {
                tag: "v1.2.3".to_string(),
                sha: "0123456789abcdef".to_string(),
            },
            HostCall::Release {
                tag: "v1.2.3".to_string(),
                title: "picologs v1.2.3".to_string(),
                notes: true,
                draft: false,
                prerelease: false,
            },
            HostCall::Asset {
                release_id: 1,
                name: "picologs-1.2.3.exe".to_string(),
                sha256: artifact.sha256().to_string(),
                path: artifact.path().to_path_buf(),
            },
        ]
    );

    let release = report.publication.release.as_ref().unwrap();
    assert_eq!(release.tag, "v1.2.3");
    assert_eq!(release.asset_name, "picologs-1.2.3.exe");
    assert_eq!(release.run_id, ctx.id);
}

#[tokio::test]
async fn existing_tag_is_not_recreated() {
    let root = tempfile::tempdir().unwrap();
    let settings = settings(root.path(), ArtifactNaming::Versioned);
    let host = RecordingHost::with_existing_tag();
    let pipeline = pipeline(&settings, root.path(), FakeSigner::new(false), Some(host.clone()));

    let ctx = context(&settings, EventKind::Push, "refs/tags/v1.2.4", None);
    pipeline.run(&ctx).await.unwrap();

    assert!(!host.calls().iter().any(|c| matches!(c, HostCall::Tag { .. })));
    assert_eq!(host.releases().len(), 1);
}

#[tokio::test]
async fn signing_failure_halts_before_publishing() {
    let root = tempfile::tempdir().unwrap();
    let settings = settings(root.path(), ArtifactNaming::Versioned);
    let host = RecordingHost::default();
    let signer = FakeSigner::new(true);
    let pipeline = pipeline(&settings, root.path(), signer.clone(), Some(host.clone()));

    let ctx = context(&settings, EventKind::Push, "refs/tags/v1.2.3", None);
    let err = pipeline.run(&ctx).await.unwrap_err();

    assert!(matches!(err, Error::Signing(_)));
    assert_eq!(signer.calls(), 1);
    assert!(!root.path().join("artifacts").join(ctx.id.to_string()).exists());
    assert!(host.calls().is_empty());

    let report = read_report(&ctx.work_dir);
    assert_eq!(report["outcome"]["status"], "failed");
    assert_eq!(report["outcome"]["stage"], "sign");
    assert!(report["artifact"].is_null());
    assert_eq!(report["stages"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn concurrent_tag_runs_stay_isolated() {
    let root = tempfile::tempdir().unwrap();
    let settings = settings(root.path(), ArtifactNaming::Versioned);
    let host = RecordingHost::default();
    let first = pipeline(&settings, root.path(), FakeSigner::new(false), Some(host.clone()));
    let second = pipeline(&settings, root.path(), FakeSigner::new(false), Some(host.clone()));

    let ctx_a = context(&settings, EventKind::Push, "refs/tags/v1.0.0", None);
    let ctx_b = context(&settings, EventKind::Push, "refs/tags/v1.0.1", None);
    let (a, b) = tokio::join!(first.run(&ctx_a), second.run(&ctx_b));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.run_id, b.run_id);
    assert_eq!(a.artifact.as_ref().unwrap().name(), "picologs-1.0.0.exe");
    assert_eq!(b.artifact.as_ref().unwrap().name(), "picologs-1.0.1.exe");
    assert_eq!(host.releases().len(), 2);

    // Every asset comes from the run that owns the release
    for report in [&a, &b] {
        let release = report.publication.release.as_ref().unwrap();
        let artifact = report.artifact.as_ref().unwrap();
        assert_eq!(release.run_id, report.run_id);
        assert!(host.assets().iter().any(|call| matches!(
            call,
            HostCall::Asset { release_id, sha256, .. }
                if *release_id == release.id && sha256 == artifact.sha256()
        )));

        let stored = root
            .path()
            .join("artifacts")
            .join(report.run_id.to_string())
            .join(artifact.name());
        let contents = std::fs::read_to_string(stored).unwrap();
        assert!(contents.contains(&report.run_id.to_string()));
    }
}

#[tokio::test]
async fn build_failure_never_reaches_the_signer() {
    let root = tempfile::tempdir().unwrap();
    let settings = settings(root.path(), ArtifactNaming::Fixed);
    let signer = FakeSigner::new(false);
    let pipeline = pipeline_with(&settings, root.path(), false, true, signer.clone(), None);

    let ctx = context(&settings, EventKind::ManualDispatch, "refs/heads/main", None);
    let err = pipeline.run(&ctx).await.unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Build));
    assert_eq!(signer.calls(), 0);
    assert_eq!(read_report(&ctx.work_dir)["outcome"]["stage"], "build");
}

#[tokio::test]
async fn provisioning_failure_stops_the_run() {
    let root = tempfile::tempdir().unwrap();
    let settings = settings(root.path(), ArtifactNaming::Fixed);
    let signer = FakeSigner::new(false);
    let pipeline = pipeline_with(&settings, root.path(), true, false, signer.clone(), None);

    let ctx = context(&settings, EventKind::ManualDispatch, "refs/heads/main", None);
    let err = pipeline.run(&ctx).await.unwrap_err();

    assert!(matches!(err, Error::EnvironmentSetup(_)));
    assert_eq!(signer.calls(), 0);
    assert!(!ctx.dist_dir().exists());
}

#[tokio::test]
async fn versioned_naming_without_version_is_a_build_error() {
    let root = tempfile::tempdir().unwrap();
    let settings = settings(root.path(), ArtifactNaming::Versioned);
    let signer = FakeSigner::new(false);
    let pipeline = pipeline(&settings, root.path(), signer.clone(), None);

    let ctx = context(&settings, EventKind::ManualDispatch, "refs/heads/main", None);
    let err = pipeline.run(&ctx).await.unwrap_err();

    assert!(matches!(err, Error::Build(_)));
    assert_eq!(signer.calls(), 0);
}

#[tokio::test]
async fn tag_version_defaults_from_the_tag() {
    let root = tempfile::tempdir().unwrap();
    let settings = settings(root.path(), ArtifactNaming::Versioned);
    let pipeline = pipeline(
        &settings,
        root.path(),
        FakeSigner::new(false),
        Some(RecordingHost::default()),
    );

    let ctx = context(&settings, EventKind::Push, "refs/tags/v3.1.0", None);
    assert_eq!(ctx.params.version.as_deref(), Some("3.1.0"));

    let report = pipeline.run(&ctx).await.unwrap();
    assert_eq!(report.artifact.unwrap().name(), "picologs-3.1.0.exe");
}

#[tokio::test]
async fn tag_run_without_release_host_fails_up_front() {
    let root = tempfile::tempdir().unwrap();
    let settings = settings(root.path(), ArtifactNaming::Versioned);
    let signer = FakeSigner::new(false);
    let pipeline = pipeline(&settings, root.path(), signer.clone(), None);

    let ctx = context(&settings, EventKind::Push, "refs/tags/v1.2.3", None);
    let err = pipeline.run(&ctx).await.unwrap_err();

    assert!(matches!(err, Error::Publish { .. }));
    assert_eq!(signer.calls(), 0);
    assert!(read_report(&ctx.work_dir)["stages"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn failed_asset_upload_reports_partial_state() {
    let root = tempfile::tempdir().unwrap();
    let settings = settings(root.path(), ArtifactNaming::Versioned);
    let host = RecordingHost::failing_asset();
    let pipeline = pipeline(&settings, root.path(), FakeSigner::new(false), Some(host.clone()));

    let ctx = context(&settings, EventKind::Push, "refs/tags/v2.0.0", None);
    let err = pipeline.run(&ctx).await.unwrap_err();

    let partial = err.partial_state();
    assert!(partial.iter().any(|p| p.starts_with("uploaded artifact")));
    assert!(partial.contains(&"tag v2.0.0".to_string()));
    assert!(partial.contains(&"release 1 (v2.0.0)".to_string()));
    // Nothing is rolled back
    assert_eq!(host.releases().len(), 1);

    let report = read_report(&ctx.work_dir);
    assert_eq!(report["outcome"]["stage"], "publish");
    assert_eq!(report["outcome"]["partial"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn rejected_release_keeps_the_created_tag_listed() {
    let root = tempfile::tempdir().unwrap();
    let settings = settings(root.path(), ArtifactNaming::Versioned);
    let host = RecordingHost::failing_release();
    let pipeline = pipeline(&settings, root.path(), FakeSigner::new(false), Some(host.clone()));

    let ctx = context(&settings, EventKind::Push, "refs/tags/v2.0.1", None);
    let err = pipeline.run(&ctx).await.unwrap_err();

    assert!(err.to_string().contains("already_exists"));
    assert!(err.partial_state().contains(&"tag v2.0.1".to_string()));
    assert!(host.assets().is_empty());
}

#[tokio::test]
async fn equal_parameters_give_equal_names_in_separate_runs() {
    let root = tempfile::tempdir().unwrap();
    let settings = settings(root.path(), ArtifactNaming::Versioned);

    let mut names = Vec::new();
    let mut run_dirs = Vec::new();
    for _ in 0..2 {
        let pipeline = pipeline(&settings, root.path(), FakeSigner::new(false), None);
        let ctx = context(&settings, EventKind::ManualDispatch, "refs/heads/main", Some("0.0.17"));
        let report = pipeline.run(&ctx).await.unwrap();
        let artifact = report.artifact.unwrap();
        names.push(artifact.name().to_string());
        run_dirs.push(artifact.path().parent().unwrap().to_path_buf());
    }

    assert_eq!(names[0], names[1]);
    assert_ne!(run_dirs[0], run_dirs[1]);
}

#[tokio::test]
async fn successful_report_is_written() {
    let root = tempfile::tempdir().unwrap();
    let settings = settings(root.path(), ArtifactNaming::Fixed);
    let pipeline = pipeline(&settings, root.path(), FakeSigner::new(false), None);

    let ctx = context(&settings, EventKind::ManualDispatch, "refs/heads/main", None);
    let report = pipeline.run(&ctx).await.unwrap();
    assert_eq!(report.outcome, Outcome::Succeeded);

    let json = read_report(&ctx.work_dir);
    assert_eq!(json["run_id"], ctx.id.to_string());
    assert_eq!(json["outcome"]["status"], "succeeded");
    assert_eq!(json["git_ref"]["kind"], "branch");
    assert_eq!(json["git_ref"]["name"], "main");
    assert_eq!(json["stages"].as_array().unwrap().len(), 4);
    assert_eq!(json["publication"]["upload"]["name"], "picologs.exe");
}
