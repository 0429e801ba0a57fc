//! Cross-links between extracted surfaces.
//!
//! Links only connect surfaces that both exist in the collection; dangling
//! names are the gap analyzer's business, not this module's.
use crate::surface::{schema_refs, SurfaceCategory, SurfaceCollection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Current schema version for `traceability.json`.
pub const TRACEABILITY_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceKey {
    pub category: SurfaceCategory,
    pub name: String,
}

impl SurfaceKey {
    fn new(category: SurfaceCategory, name: &str) -> Self {
        Self {
            category,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TraceRelation {
    /// Route rendered or handled by a component.
    HandledBy,
    /// Route served by an API with the same path.
    Serves,
    /// API schema referencing a model.
    References,
    /// Auth guard protecting a route or API.
    Protects,
    /// Middleware applied to a route or API.
    Wraps,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TraceLink {
    pub from: SurfaceKey,
    pub relation: TraceRelation,
    pub to: SurfaceKey,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct TraceabilityMatrix {
    pub schema_version: u32,
    pub links: Vec<TraceLink>,
    /// Routes, APIs, models, and components that no link touches.
    pub unlinked: Vec<SurfaceKey>,
}

/// Build the link matrix for one collection.
pub fn build_traceability(surfaces: &SurfaceCollection) -> TraceabilityMatrix {
    let mut links = BTreeSet::new();

    for route in &surfaces.routes {
        let from = SurfaceKey::new(SurfaceCategory::Route, &route.name);
        if let Some(handler) = route.handler.as_deref() {
            if surfaces.contains(SurfaceCategory::Component, handler) {
                links.insert(TraceLink {
                    from: from.clone(),
                    relation: TraceRelation::HandledBy,
                    to: SurfaceKey::new(SurfaceCategory::Component, handler),
                });
            }
        }
        for api in surfaces.apis.iter().filter(|api| api.path == route.name) {
            links.insert(TraceLink {
                from: from.clone(),
                relation: TraceRelation::Serves,
                to: SurfaceKey::new(SurfaceCategory::Api, &api.name),
            });
        }
    }

    for api in &surfaces.apis {
        let from = SurfaceKey::new(SurfaceCategory::Api, &api.name);
        let mut models = BTreeSet::new();
        for schema in [api.request_schema.as_ref(), api.response_schema.as_ref()]
            .into_iter()
            .flatten()
        {
            models.extend(schema_refs(schema));
        }
        for model in models {
            if surfaces.contains(SurfaceCategory::Model, &model) {
                links.insert(TraceLink {
                    from: from.clone(),
                    relation: TraceRelation::References,
                    to: SurfaceKey::new(SurfaceCategory::Model, &model),
                });
            }
        }
    }

    for auth in &surfaces.auth {
        let from = SurfaceKey::new(SurfaceCategory::Auth, &auth.name);
        for target in &auth.protects {
            if let Some(to) = route_or_api(surfaces, target) {
                links.insert(TraceLink {
                    from: from.clone(),
                    relation: TraceRelation::Protects,
                    to,
                });
            }
        }
    }

    for middleware in &surfaces.middleware {
        let from = SurfaceKey::new(SurfaceCategory::Middleware, &middleware.name);
        for target in &middleware.applies_to {
            if let Some(to) = route_or_api(surfaces, target) {
                links.insert(TraceLink {
                    from: from.clone(),
                    relation: TraceRelation::Wraps,
                    to,
                });
            }
        }
    }

    let touched: BTreeSet<&SurfaceKey> = links
        .iter()
        .flat_map(|link| [&link.from, &link.to])
        .collect();
    let unlinked = [
        SurfaceCategory::Route,
        SurfaceCategory::Api,
        SurfaceCategory::Model,
        SurfaceCategory::Component,
    ]
    .into_iter()
    .flat_map(|category| {
        surfaces
            .in_category(category)
            .into_iter()
            .map(move |surface| SurfaceKey::new(category, surface.name()))
    })
    .filter(|key| !touched.contains(key))
    .collect();

    TraceabilityMatrix {
        schema_version: TRACEABILITY_SCHEMA_VERSION,
        links: links.into_iter().collect(),
        unlinked,
    }
}

fn route_or_api(surfaces: &SurfaceCollection, name: &str) -> Option<SurfaceKey> {
    if surfaces.contains(SurfaceCategory::Route, name) {
        return Some(SurfaceKey::new(SurfaceCategory::Route, name));
    }
    if surfaces.contains(SurfaceCategory::Api, name) {
        return Some(SurfaceKey::new(SurfaceCategory::Api, name));
    }
    None
}
