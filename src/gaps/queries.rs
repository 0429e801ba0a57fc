use super::GapEntry;
use crate::paths::RunPaths;
use crate::surface::{schema_refs, SurfaceCategory, SurfaceCollection, SurfaceRef};
use crate::writer::{WrittenArtifact, REQUIRED_BEAN_SECTIONS};
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;

/// Surfaces of one category with no non-skipped bean.
pub fn find_surfaces_without_bean(
    surfaces: &SurfaceCollection,
    artifacts: &[WrittenArtifact],
    category: SurfaceCategory,
) -> Vec<GapEntry> {
    let mut seen = BTreeSet::new();
    surfaces
        .in_category(category)
        .into_iter()
        .filter(|surface| {
            !artifacts
                .iter()
                .any(|artifact| artifact.documents(category, surface.name()))
        })
        .filter(|surface| seen.insert(surface.name()))
        .map(|surface| undocumented_entry(&surface))
        .collect()
}

pub fn find_routes_without_bean(
    surfaces: &SurfaceCollection,
    artifacts: &[WrittenArtifact],
) -> Vec<GapEntry> {
    find_surfaces_without_bean(surfaces, artifacts, SurfaceCategory::Route)
}

pub fn find_config_without_bean(
    surfaces: &SurfaceCollection,
    artifacts: &[WrittenArtifact],
) -> Vec<GapEntry> {
    find_surfaces_without_bean(surfaces, artifacts, SurfaceCategory::Config)
}

fn undocumented_entry(surface: &SurfaceRef<'_>) -> GapEntry {
    let noun = match surface {
        SurfaceRef::Route(_) => "Route",
        SurfaceRef::Api(_) => "API",
        SurfaceRef::Model(_) => "Model",
        SurfaceRef::Component(_) => "Component",
        SurfaceRef::Config(config) if config.required => "Required config",
        SurfaceRef::Config(_) => "Optional config",
        SurfaceRef::Auth(_) => "Auth mechanism",
        SurfaceRef::Middleware(_) => "Middleware",
        SurfaceRef::Integration(_) => "Integration",
        SurfaceRef::Job(_) => "Job",
        SurfaceRef::UiFlow(_) => "UI flow",
    };
    GapEntry {
        category: surface.category().label().to_string(),
        description: format!("{noun} `{}` has no bean", surface.name()),
        file: surface.primary_file().to_string(),
        recommendation: format!(
            "Generate a bean for `{}` or drop it from the extractor output",
            surface.name()
        ),
    }
}

/// Materialized beans lacking a required section header.
///
/// Reads each bean from disk; an unreadable bean fails the whole query.
pub fn find_beans_missing_sections(
    artifacts: &[WrittenArtifact],
    paths: &RunPaths,
) -> Result<Vec<GapEntry>> {
    let mut entries = Vec::new();
    for artifact in artifacts.iter().filter(|artifact| !artifact.skipped) {
        let path = paths.resolve(&artifact.path);
        let content =
            fs::read_to_string(&path).with_context(|| format!("read bean {}", path.display()))?;
        let missing: Vec<&str> = REQUIRED_BEAN_SECTIONS
            .iter()
            .copied()
            .filter(|section| !content.contains(section))
            .collect();
        if missing.is_empty() {
            continue;
        }
        entries.push(GapEntry {
            category: "Bean Structure".to_string(),
            description: format!(
                "Bean `{}` is missing section(s): {}",
                artifact.title,
                missing.join(", ")
            ),
            file: artifact.path.clone(),
            recommendation: "Regenerate the bean so it carries every required section"
                .to_string(),
        });
    }
    Ok(entries)
}

/// APIs that carry neither a request nor a response schema.
pub fn find_apis_without_schema(surfaces: &SurfaceCollection) -> Vec<GapEntry> {
    surfaces
        .apis
        .iter()
        .filter(|api| {
            !has_schema(api.request_schema.as_ref()) && !has_schema(api.response_schema.as_ref())
        })
        .map(|api| GapEntry {
            category: "API Schemas".to_string(),
            description: format!("API `{}` has no request or response schema", api.name),
            file: SurfaceRef::Api(api).primary_file().to_string(),
            recommendation: "Attach request/response schemas to the endpoint".to_string(),
        })
        .collect()
}

fn has_schema(schema: Option<&Value>) -> bool {
    schema.is_some_and(|value| !value.is_null())
}

/// Model names referenced through `$ref` that no model bean documents.
///
/// Each missing name is reported once, attributed to the first API that
/// references it.
pub fn find_unresolved_schema_refs(
    surfaces: &SurfaceCollection,
    artifacts: &[WrittenArtifact],
) -> Vec<GapEntry> {
    let documented: BTreeSet<&str> = artifacts
        .iter()
        .filter(|artifact| !artifact.skipped && artifact.category == SurfaceCategory::Model)
        .map(|artifact| artifact.title.as_str())
        .collect();
    let mut reported = BTreeSet::new();
    let mut entries = Vec::new();
    for api in &surfaces.apis {
        let mut refs = BTreeSet::new();
        for schema in [api.request_schema.as_ref(), api.response_schema.as_ref()]
            .into_iter()
            .flatten()
        {
            refs.extend(schema_refs(schema));
        }
        for model in refs {
            if documented.contains(model.as_str()) || reported.contains(&model) {
                continue;
            }
            entries.push(GapEntry {
                category: "Model References".to_string(),
                description: format!(
                    "Model `{model}` is referenced by API `{}` but has no bean",
                    api.name
                ),
                file: SurfaceRef::Api(api).primary_file().to_string(),
                recommendation: format!("Extract and document model `{model}`"),
            });
            reported.insert(model);
        }
    }
    entries
}

/// Auth guards naming routes or APIs that were never extracted.
pub fn find_dangling_auth_targets(surfaces: &SurfaceCollection) -> Vec<GapEntry> {
    let mut entries = Vec::new();
    for auth in &surfaces.auth {
        for target in &auth.protects {
            if surfaces.contains(SurfaceCategory::Route, target)
                || surfaces.contains(SurfaceCategory::Api, target)
            {
                continue;
            }
            entries.push(GapEntry {
                category: "Auth Targets".to_string(),
                description: format!(
                    "Auth `{}` protects `{target}`, which is not an extracted route or API",
                    auth.name
                ),
                file: SurfaceRef::Auth(auth).primary_file().to_string(),
                recommendation: "Fix the guard target or extend route/API extraction"
                    .to_string(),
            });
        }
    }
    entries
}
