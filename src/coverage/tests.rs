use super::*;
use crate::surface::{ComponentSurface, ConfigSurface, RouteSurface};

fn artifact(
    sequence: u32,
    category: SurfaceCategory,
    title: &str,
    skipped: bool,
) -> WrittenArtifact {
    WrittenArtifact {
        sequence,
        category,
        title: title.to_string(),
        path: format!("beans/{sequence:04}.md"),
        skipped,
    }
}

fn components(count: usize) -> Vec<ComponentSurface> {
    (0..count)
        .map(|idx| ComponentSurface {
            name: format!("Component{idx}"),
            ..ComponentSurface::default()
        })
        .collect()
}

fn gate(evaluation: &Evaluation, id: GateId) -> &CoverageGate {
    evaluation
        .gates
        .iter()
        .find(|gate| gate.name == id)
        .expect("gate present")
}

#[test]
fn metric_pair_percentages() {
    assert_eq!(MetricPair::new(0, 0).percentage(), 100.0);
    assert_eq!(MetricPair::new(10, 10).percentage(), 100.0);
    assert!((MetricPair::new(3, 2).percentage() - 66.667).abs() < 0.001);
    assert!(MetricPair::new(2, 3).percentage() > 100.0);
}

#[test]
fn empty_world_passes_every_gate() {
    let metrics = compute_metrics(
        &SurfaceCollection::default(),
        &[],
        &FileInventory::default(),
    );
    let evaluation = evaluate_thresholds(&metrics);
    assert!(evaluation.all_passed);
    assert_eq!(evaluation.gates.len(), GateId::ALL.len());
    assert!(evaluation.gates.iter().all(|gate| gate.percentage == 100.0));
}

#[test]
fn gate_at_exact_threshold_passes_and_one_below_fails() {
    let surfaces = SurfaceCollection {
        components: components(20),
        ..SurfaceCollection::default()
    };
    let documented = |count: usize| -> Vec<WrittenArtifact> {
        (0..count)
            .map(|idx| {
                artifact(
                    idx as u32 + 1,
                    SurfaceCategory::Component,
                    &format!("Component{idx}"),
                    false,
                )
            })
            .collect()
    };

    let at_threshold = evaluate_thresholds(&compute_metrics(
        &surfaces,
        &documented(19),
        &FileInventory::default(),
    ));
    let components_gate = gate(&at_threshold, GateId::Components);
    assert_eq!(components_gate.percentage, 95.0);
    assert!(components_gate.passed);

    let below = evaluate_thresholds(&compute_metrics(
        &surfaces,
        &documented(18),
        &FileInventory::default(),
    ));
    assert!(!gate(&below, GateId::Components).passed);
    assert!(!below.all_passed);
    assert_eq!(below.failed_count(), 1);
}

#[test]
fn skipped_and_mismatched_artifacts_do_not_cover() {
    let surfaces = SurfaceCollection {
        routes: vec![
            RouteSurface {
                name: "/home".to_string(),
                ..RouteSurface::default()
            },
            RouteSurface {
                name: "/about".to_string(),
                ..RouteSurface::default()
            },
            RouteSurface {
                name: "/pricing".to_string(),
                ..RouteSurface::default()
            },
        ],
        ..SurfaceCollection::default()
    };
    let artifacts = vec![
        artifact(1, SurfaceCategory::Route, "/home", false),
        artifact(2, SurfaceCategory::Route, "/about", true),
        artifact(3, SurfaceCategory::Component, "/pricing", false),
    ];
    let metrics = compute_metrics(&surfaces, &artifacts, &FileInventory::default());
    assert_eq!(metrics.routes, MetricPair::new(3, 1));
}

#[test]
fn config_is_split_by_required_flag() {
    let surfaces = SurfaceCollection {
        config: vec![
            ConfigSurface {
                name: "DATABASE_URL".to_string(),
                required: true,
                ..ConfigSurface::default()
            },
            ConfigSurface {
                name: "LOG_LEVEL".to_string(),
                default_value: Some("info".to_string()),
                ..ConfigSurface::default()
            },
        ],
        ..SurfaceCollection::default()
    };
    let artifacts = vec![artifact(1, SurfaceCategory::Config, "LOG_LEVEL", false)];
    let metrics = compute_metrics(&surfaces, &artifacts, &FileInventory::default());
    assert_eq!(metrics.config_required, MetricPair::new(1, 0));
    assert_eq!(metrics.config_optional, MetricPair::new(1, 1));

    let evaluation = evaluate_thresholds(&metrics);
    assert!(!gate(&evaluation, GateId::ConfigRequired).passed);
    assert!(gate(&evaluation, GateId::ConfigOptional).passed);
}

#[test]
fn file_metrics_come_from_the_inventory() {
    let inventory = FileInventory {
        scanned: 9,
        skipped: 1,
        ..FileInventory::default()
    };
    let metrics = compute_metrics(&SurfaceCollection::default(), &[], &inventory);
    assert_eq!(metrics.files, MetricPair::new(10, 9));
    assert!(gate(&evaluate_thresholds(&metrics), GateId::Files).passed);
}

#[test]
fn markdown_report_is_deterministic_and_bannered() {
    let surfaces = SurfaceCollection {
        routes: vec![RouteSurface {
            name: "/home".to_string(),
            ..RouteSurface::default()
        }],
        ..SurfaceCollection::default()
    };
    let evaluation = evaluate_thresholds(&compute_metrics(
        &surfaces,
        &[],
        &FileInventory::default(),
    ));
    let first = render_coverage_markdown(&evaluation);
    let second = render_coverage_markdown(&evaluation);
    assert_eq!(first, second);
    assert!(first.contains("**1 GATES FAILED**"));
    assert!(first.contains("| Routes | 0 | 1 | 0.0000% | 100.00% | FAIL |"));
    assert!(first.contains("| APIs | 0 | 0 | 100.0000% | 100.00% | PASS |"));

    let passing = evaluate_thresholds(&Metrics::default());
    assert!(render_coverage_markdown(&passing).contains("**ALL GATES PASSED**"));
}

#[test]
fn markdown_shows_the_compared_percentage() {
    let metrics = Metrics {
        routes: MetricPair::new(40_000, 39_999),
        ..Metrics::default()
    };
    let evaluation = evaluate_thresholds(&metrics);
    assert!(!gate(&evaluation, GateId::Routes).passed);
    let rendered = render_coverage_markdown(&evaluation);
    assert!(rendered.contains("| Routes | 39999 | 40000 | 99.9975% | 100.00% | FAIL |"));
}

#[test]
fn json_report_lists_every_category() {
    let evaluation = evaluate_thresholds(&Metrics::default());
    let report = coverage_report(&evaluation);
    assert!(report.all_passed);
    assert_eq!(report.categories.len(), GateId::ALL.len());
    let routes = &report.categories["routes"];
    assert_eq!((routes.total, routes.covered), (0, 0));
    assert_eq!(routes.percentage, 100.0);
}
