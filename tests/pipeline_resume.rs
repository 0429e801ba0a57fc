//! Library-level checks of checkpoint and resume behavior.
use anyhow::{anyhow, Result};
use beanpack::checkpoint::{read_checkpoint, CheckpointStore};
use beanpack::config::RunConfig;
use beanpack::extract::{StaticExtractor, SurfaceExtractor};
use beanpack::inventory::FileInventory;
use beanpack::paths::RunPaths;
use beanpack::pipeline::{EventKind, Orchestrator, PipelineEvent, PipelineOptions};
use beanpack::stage::Stage;
use beanpack::surface::{JobSurface, SurfaceCollection};
use beanpack::writer::MarkdownBeanWriter;
use std::cell::RefCell;
use std::path::Path;

struct BrokenExtractor;

impl SurfaceExtractor for BrokenExtractor {
    fn extract(
        &self,
        _source_root: &Path,
        _inventory: &FileInventory,
    ) -> Result<SurfaceCollection> {
        Err(anyhow!("matcher crashed"))
    }
}

fn jobs() -> SurfaceCollection {
    SurfaceCollection {
        jobs: vec![JobSurface {
            name: "nightly-report".to_string(),
            schedule: Some("0 2 * * *".to_string()),
            ..JobSurface::default()
        }],
        ..SurfaceCollection::default()
    }
}

#[test]
fn checkpoint_survives_a_process_restart() {
    let temp = tempfile::tempdir().expect("temp dir");
    let paths = RunPaths::new(temp.path().to_path_buf());
    let mut store = CheckpointStore::new(&paths);
    store.initialize(&Stage::ALL).expect("initialize");
    for stage in Stage::ALL {
        store.complete_stage(stage).expect("complete stage");
    }
    assert!(Stage::ALL.iter().all(|stage| store.is_stage_done(*stage)));

    let mut restarted = CheckpointStore::new(&paths);
    restarted.initialize(&Stage::ALL).expect("initialize");
    assert!(restarted.load().expect("load"));
    assert_eq!(restarted.completed(), store.completed());
}

#[test]
fn extractor_failure_is_resumable() {
    let temp = tempfile::tempdir().expect("temp dir");
    let source = temp.path().join("svc");
    std::fs::create_dir_all(&source).expect("create source");
    std::fs::write(source.join("Cargo.toml"), "[package]\nname = \"svc\"\n").expect("write");
    let options = |resume: bool| PipelineOptions {
        source_root: source.clone(),
        out_root: temp.path().join("run"),
        resume,
        config: RunConfig::default(),
    };
    let writer = MarkdownBeanWriter;

    let failed = Orchestrator::new(options(false), &BrokenExtractor, &writer).run();
    assert!(!failed.success);
    assert_eq!(failed.failed_stage, Some(Stage::Extract));
    assert!(failed.error.as_deref().is_some_and(|err| err.contains("matcher crashed")));

    let checkpoint = read_checkpoint(&temp.path().join("run"))
        .expect("read checkpoint")
        .expect("checkpoint present");
    assert_eq!(checkpoint.completed, vec![Stage::Clone, Stage::Inventory]);

    let events = RefCell::new(Vec::new());
    let observer = |event: &PipelineEvent| events.borrow_mut().push(event.clone());
    let extractor = StaticExtractor::new(jobs());
    let resumed = Orchestrator::new(options(true), &extractor, &writer)
        .with_observer(&observer)
        .run();
    assert!(resumed.success, "{:?}", resumed.error);
    assert_eq!(resumed.beans_generated, 1);

    let completed: Vec<Stage> = events
        .borrow()
        .iter()
        .filter(|event| event.kind == EventKind::StageComplete)
        .map(|event| event.stage)
        .collect();
    assert_eq!(completed, Stage::ALL[2..].to_vec());
}

#[test]
fn fresh_run_discards_a_previous_checkpoint() {
    let temp = tempfile::tempdir().expect("temp dir");
    let source = temp.path().join("svc");
    std::fs::create_dir_all(&source).expect("create source");
    let options = PipelineOptions {
        source_root: source,
        out_root: temp.path().join("run"),
        resume: false,
        config: RunConfig::default(),
    };
    let extractor = StaticExtractor::new(jobs());
    let writer = MarkdownBeanWriter;
    assert!(Orchestrator::new(options.clone(), &extractor, &writer).run().success);

    let events = RefCell::new(Vec::new());
    let observer = |event: &PipelineEvent| events.borrow_mut().push(event.kind);
    assert!(Orchestrator::new(options, &extractor, &writer)
        .with_observer(&observer)
        .run()
        .success);
    let started = events
        .borrow()
        .iter()
        .filter(|kind| **kind == EventKind::StageStarted)
        .count();
    assert_eq!(started, Stage::ALL.len());
}
