use super::*;
use crate::extract::StaticExtractor;
use crate::surface::{RouteSurface, SurfaceCollection};
use crate::writer::{DocumentWriter, WrittenArtifact};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_root(name: &str) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time")
        .as_nanos();
    let root = std::env::temp_dir().join(format!("{name}-{}-{now}", std::process::id()));
    fs::create_dir_all(&root).expect("create temp root");
    root
}

#[test]
fn status_of_an_untouched_root_suggests_a_first_run() {
    let root = temp_root("beanpack-status-empty");
    let summary = build_status_summary(&root).expect("status");
    assert!(summary.completed.is_empty());
    assert_eq!(summary.pending, Stage::ALL.to_vec());
    assert_eq!(summary.coverage_passed, None);
    assert!(summary.next_action.starts_with("beanpack run"));
    assert!(!summary.next_action.contains("--resume"));
    let _ = fs::remove_dir_all(root);
}

#[test]
fn status_summarizes_a_finished_run() {
    let root = temp_root("beanpack-status-run");
    let source = root.join("source");
    fs::create_dir_all(&source).expect("create source");
    fs::write(source.join("app.py"), "print('hi')\n").expect("write source");
    let surfaces = SurfaceCollection {
        routes: vec![RouteSurface {
            name: "/home".to_string(),
            ..RouteSurface::default()
        }],
        ..SurfaceCollection::default()
    };
    let extractor = StaticExtractor::new(surfaces);
    let writer = MarkdownBeanWriter;
    let out = root.join("run");
    let result = Orchestrator::new(
        PipelineOptions {
            source_root: source,
            out_root: out.clone(),
            resume: false,
            config: RunConfig::default(),
        },
        &extractor,
        &writer,
    )
    .run();
    assert!(result.success);

    let summary = build_status_summary(&out).expect("status");
    assert!(summary.pending.is_empty());
    assert_eq!(summary.coverage_passed, Some(true));
    assert_eq!(summary.gaps_found, Some(0));
    assert_eq!(summary.next_action, "none; run complete");
    let _ = fs::remove_dir_all(root);
}

struct FailingWriter;

impl DocumentWriter for FailingWriter {
    fn write_beans(&self, _: &SurfaceCollection, _: &RunPaths) -> Result<Vec<WrittenArtifact>> {
        Err(anyhow!("disk full"))
    }
}

#[test]
fn status_ignores_reports_left_by_an_earlier_run() {
    let root = temp_root("beanpack-status-stale");
    let source = root.join("source");
    fs::create_dir_all(&source).expect("create source");
    fs::write(source.join("app.py"), "print('hi')\n").expect("write source");
    let extractor = StaticExtractor::new(SurfaceCollection {
        routes: vec![RouteSurface {
            name: "/home".to_string(),
            ..RouteSurface::default()
        }],
        ..SurfaceCollection::default()
    });
    let out = root.join("run");
    let options = PipelineOptions {
        source_root: source,
        out_root: out.clone(),
        resume: false,
        config: RunConfig::default(),
    };
    let passed = Orchestrator::new(options.clone(), &extractor, &MarkdownBeanWriter).run();
    assert!(passed.success);
    assert!(RunPaths::new(out.clone()).coverage_json_path().is_file());

    let failed = Orchestrator::new(options, &extractor, &FailingWriter).run();
    assert_eq!(failed.failed_stage, Some(Stage::Document));

    let summary = build_status_summary(&out).expect("status");
    assert_eq!(summary.pending, vec![Stage::Document, Stage::Gate]);
    assert_eq!(summary.coverage_passed, None);
    assert_eq!(summary.gaps_found, None);
    assert!(summary.failed_gates.is_empty());
    assert!(summary.next_action.ends_with("--resume (next: document)"));
    let _ = fs::remove_dir_all(root);
}

#[test]
fn explicit_run_root_wins() {
    let root = resolve_run_root(Some(Path::new("/tmp/explicit")), Path::new("."))
        .expect("resolve run root");
    assert_eq!(root, PathBuf::from("/tmp/explicit"));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let root = temp_root("beanpack-init");
    run_init(InitArgs {
        out: root.clone(),
        force: false,
    })
    .expect("first init");
    let err = run_init(InitArgs {
        out: root.clone(),
        force: false,
    })
    .expect_err("second init should fail");
    assert!(err.to_string().contains("--force"));
    run_init(InitArgs {
        out: root.clone(),
        force: true,
    })
    .expect("forced init");
    assert_eq!(load_config(&root).expect("load config"), RunConfig::default());
    let _ = fs::remove_dir_all(root);
}
