//! Surface model: the typed bag of facts extracted from a repository.
//!
//! Categories are a closed enum so every engine that walks surfaces must
//! handle all of them; adding a category is a compile-time change.
mod refs;
mod types;

use crate::util::{read_json, write_json};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

pub use refs::{ref_target_name, schema_refs};
pub use types::*;

/// Borrowed view of one surface of any category.
#[derive(Debug, Clone, Copy)]
pub enum SurfaceRef<'a> {
    Route(&'a RouteSurface),
    Api(&'a ApiSurface),
    Model(&'a ModelSurface),
    Component(&'a ComponentSurface),
    Config(&'a ConfigSurface),
    Auth(&'a AuthSurface),
    Middleware(&'a MiddlewareSurface),
    Integration(&'a IntegrationSurface),
    Job(&'a JobSurface),
    UiFlow(&'a UiFlowSurface),
}

impl<'a> SurfaceRef<'a> {
    pub fn category(&self) -> SurfaceCategory {
        match self {
            SurfaceRef::Route(_) => SurfaceCategory::Route,
            SurfaceRef::Api(_) => SurfaceCategory::Api,
            SurfaceRef::Model(_) => SurfaceCategory::Model,
            SurfaceRef::Component(_) => SurfaceCategory::Component,
            SurfaceRef::Config(_) => SurfaceCategory::Config,
            SurfaceRef::Auth(_) => SurfaceCategory::Auth,
            SurfaceRef::Middleware(_) => SurfaceCategory::Middleware,
            SurfaceRef::Integration(_) => SurfaceCategory::Integration,
            SurfaceRef::Job(_) => SurfaceCategory::Job,
            SurfaceRef::UiFlow(_) => SurfaceCategory::UiFlow,
        }
    }

    fn record(&self) -> &'a dyn SurfaceRecord {
        match *self {
            SurfaceRef::Route(surface) => surface,
            SurfaceRef::Api(surface) => surface,
            SurfaceRef::Model(surface) => surface,
            SurfaceRef::Component(surface) => surface,
            SurfaceRef::Config(surface) => surface,
            SurfaceRef::Auth(surface) => surface,
            SurfaceRef::Middleware(surface) => surface,
            SurfaceRef::Integration(surface) => surface,
            SurfaceRef::Job(surface) => surface,
            SurfaceRef::UiFlow(surface) => surface,
        }
    }

    pub fn name(&self) -> &'a str {
        self.record().name()
    }

    pub fn sources(&self) -> &'a [SourceRef] {
        self.record().sources()
    }

    /// First source file, or `unknown` when the surface has no provenance.
    pub fn primary_file(&self) -> &'a str {
        self.sources()
            .first()
            .map(|source| source.file.as_str())
            .unwrap_or(UNKNOWN_FILE)
    }
}

/// Aggregate of every extracted surface, one list per category.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct SurfaceCollection {
    #[serde(default)]
    pub routes: Vec<RouteSurface>,
    #[serde(default)]
    pub apis: Vec<ApiSurface>,
    #[serde(default)]
    pub models: Vec<ModelSurface>,
    #[serde(default)]
    pub components: Vec<ComponentSurface>,
    #[serde(default)]
    pub config: Vec<ConfigSurface>,
    #[serde(default)]
    pub auth: Vec<AuthSurface>,
    #[serde(default)]
    pub middleware: Vec<MiddlewareSurface>,
    #[serde(default)]
    pub integrations: Vec<IntegrationSurface>,
    #[serde(default)]
    pub jobs: Vec<JobSurface>,
    #[serde(default)]
    pub ui_flows: Vec<UiFlowSurface>,
}

impl SurfaceCollection {
    /// Surfaces of one category, in extraction order.
    pub fn in_category(&self, category: SurfaceCategory) -> Vec<SurfaceRef<'_>> {
        match category {
            SurfaceCategory::Route => self.routes.iter().map(SurfaceRef::Route).collect(),
            SurfaceCategory::Api => self.apis.iter().map(SurfaceRef::Api).collect(),
            SurfaceCategory::Model => self.models.iter().map(SurfaceRef::Model).collect(),
            SurfaceCategory::Component => {
                self.components.iter().map(SurfaceRef::Component).collect()
            }
            SurfaceCategory::Config => self.config.iter().map(SurfaceRef::Config).collect(),
            SurfaceCategory::Auth => self.auth.iter().map(SurfaceRef::Auth).collect(),
            SurfaceCategory::Middleware => {
                self.middleware.iter().map(SurfaceRef::Middleware).collect()
            }
            SurfaceCategory::Integration => self
                .integrations
                .iter()
                .map(SurfaceRef::Integration)
                .collect(),
            SurfaceCategory::Job => self.jobs.iter().map(SurfaceRef::Job).collect(),
            SurfaceCategory::UiFlow => self.ui_flows.iter().map(SurfaceRef::UiFlow).collect(),
        }
    }

    pub fn count(&self, category: SurfaceCategory) -> usize {
        match category {
            SurfaceCategory::Route => self.routes.len(),
            SurfaceCategory::Api => self.apis.len(),
            SurfaceCategory::Model => self.models.len(),
            SurfaceCategory::Component => self.components.len(),
            SurfaceCategory::Config => self.config.len(),
            SurfaceCategory::Auth => self.auth.len(),
            SurfaceCategory::Middleware => self.middleware.len(),
            SurfaceCategory::Integration => self.integrations.len(),
            SurfaceCategory::Job => self.jobs.len(),
            SurfaceCategory::UiFlow => self.ui_flows.len(),
        }
    }

    /// Every surface, category by category in `SurfaceCategory::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = SurfaceRef<'_>> {
        SurfaceCategory::ALL
            .into_iter()
            .flat_map(move |category| self.in_category(category))
    }

    pub fn len(&self) -> usize {
        SurfaceCategory::ALL
            .iter()
            .map(|category| self.count(*category))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, category: SurfaceCategory, name: &str) -> bool {
        self.in_category(category)
            .iter()
            .any(|surface| surface.name() == name)
    }

    /// Names appearing more than once within a category.
    ///
    /// Extractors own deduplication; this only exists so the pipeline can
    /// warn about a broken handoff.
    pub fn duplicate_names(&self) -> Vec<(SurfaceCategory, String)> {
        let mut duplicates = Vec::new();
        for category in SurfaceCategory::ALL {
            let mut seen = BTreeSet::new();
            for surface in self.in_category(category) {
                if !seen.insert(surface.name()) {
                    duplicates.push((category, surface.name().to_string()));
                }
            }
        }
        duplicates
    }
}

/// Load a surface snapshot written by an extractor or a previous run.
pub fn load_surfaces(path: &Path) -> Result<SurfaceCollection> {
    read_json(path)
}

/// Persist a surface snapshot in a stable JSON format.
pub fn write_surfaces(path: &Path, surfaces: &SurfaceCollection) -> Result<()> {
    write_json(path, surfaces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(name: &str, file: Option<&str>) -> RouteSurface {
        RouteSurface {
            name: name.to_string(),
            sources: file.map(SourceRef::new).into_iter().collect(),
            ..RouteSurface::default()
        }
    }

    #[test]
    fn primary_file_falls_back_to_unknown() {
        let with_source = route("/home", Some("src/routes.ts"));
        let without_source = route("/about", None);
        assert_eq!(SurfaceRef::Route(&with_source).primary_file(), "src/routes.ts");
        assert_eq!(SurfaceRef::Route(&without_source).primary_file(), UNKNOWN_FILE);
    }

    #[test]
    fn iteration_follows_category_order() {
        let surfaces = SurfaceCollection {
            routes: vec![route("/home", None)],
            config: vec![ConfigSurface {
                name: "DATABASE_URL".to_string(),
                required: true,
                ..ConfigSurface::default()
            }],
            ..SurfaceCollection::default()
        };
        let categories: Vec<_> = surfaces.iter().map(|s| s.category()).collect();
        assert_eq!(
            categories,
            vec![SurfaceCategory::Route, SurfaceCategory::Config]
        );
        assert_eq!(surfaces.len(), 2);
        assert!(surfaces.contains(SurfaceCategory::Config, "DATABASE_URL"));
        assert!(!surfaces.contains(SurfaceCategory::Route, "DATABASE_URL"));
    }

    #[test]
    fn duplicate_names_are_reported_per_category() {
        let surfaces = SurfaceCollection {
            routes: vec![route("/home", None), route("/home", None)],
            components: vec![ComponentSurface {
                name: "/home".to_string(),
                ..ComponentSurface::default()
            }],
            ..SurfaceCollection::default()
        };
        assert_eq!(
            surfaces.duplicate_names(),
            vec![(SurfaceCategory::Route, "/home".to_string())]
        );
    }

    #[test]
    fn partial_snapshots_deserialize_with_empty_lists() {
        let surfaces: SurfaceCollection =
            serde_json::from_str(r#"{"routes": [{"name": "/home"}]}"#).expect("parse");
        assert_eq!(surfaces.routes.len(), 1);
        assert!(surfaces.apis.is_empty());
        assert!(!surfaces.is_empty());
    }
}
