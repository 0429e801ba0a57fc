//! Plain markdown bean writer.
use super::{DocumentWriter, WrittenArtifact};
use crate::paths::RunPaths;
use crate::surface::{SurfaceCollection, SurfaceRef};
use crate::util::{truncate_string, write_text};
use anyhow::{Context, Result};
use regex::Regex;
use std::sync::OnceLock;

const MAX_SLUG_BYTES: usize = 48;

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownBeanWriter;

impl DocumentWriter for MarkdownBeanWriter {
    fn write_beans(
        &self,
        surfaces: &SurfaceCollection,
        paths: &RunPaths,
    ) -> Result<Vec<WrittenArtifact>> {
        let mut artifacts = Vec::with_capacity(surfaces.len());
        for (idx, surface) in surfaces.iter().enumerate() {
            let sequence = u32::try_from(idx + 1).context("bean sequence overflow")?;
            let rel = format!(
                "beans/{sequence:04}-{}-{}.md",
                surface.category(),
                slug(surface.name())
            );
            let skipped = is_low_value(&surface);
            if !skipped {
                let content = render_bean(sequence, &surface);
                write_text(&paths.resolve(&rel), &content)?;
            }
            artifacts.push(WrittenArtifact {
                sequence,
                category: surface.category(),
                title: surface.name().to_string(),
                path: rel,
                skipped,
            });
        }
        Ok(artifacts)
    }
}

/// Facts with nothing worth writing down beyond their name.
fn is_low_value(surface: &SurfaceRef<'_>) -> bool {
    match surface {
        SurfaceRef::Component(component) => {
            component.props.is_empty() && component.sources.is_empty()
        }
        SurfaceRef::UiFlow(flow) => flow.steps.is_empty(),
        SurfaceRef::Route(_)
        | SurfaceRef::Api(_)
        | SurfaceRef::Model(_)
        | SurfaceRef::Config(_)
        | SurfaceRef::Auth(_)
        | SurfaceRef::Middleware(_)
        | SurfaceRef::Integration(_)
        | SurfaceRef::Job(_) => false,
    }
}

fn slug(name: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let pattern =
        NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("regex for slug separators"));
    let lowered = name.to_ascii_lowercase();
    let replaced = pattern.replace_all(&lowered, "-");
    let trimmed = truncate_string(replaced.trim_matches('-'), MAX_SLUG_BYTES);
    let trimmed = trimmed.trim_end_matches('-');
    if trimmed.is_empty() {
        "surface".to_string()
    } else {
        trimmed.to_string()
    }
}

fn render_bean(sequence: u32, surface: &SurfaceRef<'_>) -> String {
    let mut out = String::new();
    push_line(&mut out, &format!("# {}", surface.name()));
    push_line(&mut out, "");
    push_line(
        &mut out,
        &format!("_{}_ · bean {sequence:04}", surface.category().label()),
    );
    push_line(&mut out, "");
    push_line(&mut out, "## Overview");
    push_line(&mut out, "");
    push_line(&mut out, &overview(surface));
    let details = details(surface);
    if !details.is_empty() {
        push_line(&mut out, "");
        push_line(&mut out, "## Details");
        push_line(&mut out, "");
        for detail in details {
            push_line(&mut out, &format!("- {detail}"));
        }
    }
    push_line(&mut out, "");
    push_line(&mut out, "## Source References");
    push_line(&mut out, "");
    if surface.sources().is_empty() {
        push_line(&mut out, "- none recorded");
    }
    for source in surface.sources() {
        push_line(&mut out, &format!("- `{source}`"));
    }
    out
}

fn overview(surface: &SurfaceRef<'_>) -> String {
    match surface {
        SurfaceRef::Route(route) => {
            let methods = if route.methods.is_empty() {
                "any method".to_string()
            } else {
                route.methods.join(", ")
            };
            format!("Route `{}` accepting {methods}.", route.name)
        }
        SurfaceRef::Api(api) => format!("`{} {}` endpoint.", api.method, api.path),
        SurfaceRef::Model(model) => format!(
            "Data model `{}` with {} field(s).",
            model.name,
            model.fields.len()
        ),
        SurfaceRef::Component(component) => format!("Component `{}`.", component.name),
        SurfaceRef::Config(config) => {
            let requirement = if config.required { "Required" } else { "Optional" };
            format!("{requirement} configuration value `{}`.", config.name)
        }
        SurfaceRef::Auth(auth) => {
            format!("`{}` authentication via {}.", auth.name, auth.mechanism)
        }
        SurfaceRef::Middleware(middleware) => format!("Middleware `{}`.", middleware.name),
        SurfaceRef::Integration(integration) => format!(
            "Integration `{}` with {}.",
            integration.name, integration.service
        ),
        SurfaceRef::Job(job) => format!("Background job `{}`.", job.name),
        SurfaceRef::UiFlow(flow) => {
            format!("UI flow `{}` with {} step(s).", flow.name, flow.steps.len())
        }
    }
}

fn details(surface: &SurfaceRef<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    match surface {
        SurfaceRef::Route(route) => {
            if let Some(handler) = &route.handler {
                lines.push(format!("Handler: `{handler}`"));
            }
        }
        SurfaceRef::Api(api) => {
            lines.push(format!(
                "Authentication required: {}",
                if api.auth_required { "yes" } else { "no" }
            ));
            if let Some(schema) = &api.request_schema {
                lines.push(format!("Request schema: `{schema}`"));
            }
            if let Some(schema) = &api.response_schema {
                lines.push(format!("Response schema: `{schema}`"));
            }
        }
        SurfaceRef::Model(model) => {
            if let Some(table) = &model.table {
                lines.push(format!("Table: `{table}`"));
            }
            for field in &model.fields {
                let optional = if field.optional { " (optional)" } else { "" };
                lines.push(format!("Field `{}`: `{}`{optional}", field.name, field.ty));
            }
        }
        SurfaceRef::Component(component) => {
            if let Some(kind) = &component.kind {
                lines.push(format!("Kind: {kind}"));
            }
            if !component.props.is_empty() {
                lines.push(format!("Props: {}", component.props.join(", ")));
            }
        }
        SurfaceRef::Config(config) => {
            if let Some(default) = &config.default_value {
                lines.push(format!("Default: `{default}`"));
            }
            if let Some(description) = &config.description {
                lines.push(description.clone());
            }
        }
        SurfaceRef::Auth(auth) => {
            for target in &auth.protects {
                lines.push(format!("Protects `{target}`"));
            }
        }
        SurfaceRef::Middleware(middleware) => {
            for target in &middleware.applies_to {
                lines.push(format!("Applies to `{target}`"));
            }
        }
        SurfaceRef::Integration(integration) => {
            if let Some(kind) = &integration.kind {
                lines.push(format!("Kind: {kind}"));
            }
        }
        SurfaceRef::Job(job) => {
            if let Some(schedule) = &job.schedule {
                lines.push(format!("Schedule: `{schedule}`"));
            }
        }
        SurfaceRef::UiFlow(flow) => {
            for (idx, step) in flow.steps.iter().enumerate() {
                lines.push(format!("Step {}: {step}", idx + 1));
            }
        }
    }
    lines
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{ComponentSurface, RouteSurface, SourceRef, UiFlowSurface};
    use crate::writer::REQUIRED_BEAN_SECTIONS;

    #[test]
    fn slugs_are_lowercase_and_dash_separated() {
        assert_eq!(slug("/users/:id"), "users-id");
        assert_eq!(slug("GET /api/v1/Orders"), "get-api-v1-orders");
        assert_eq!(slug("///"), "surface");
    }

    #[test]
    fn beans_are_numbered_and_low_value_facts_skipped() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let paths = RunPaths::new(temp.path().to_path_buf());
        let surfaces = SurfaceCollection {
            routes: vec![RouteSurface {
                name: "/home".to_string(),
                methods: vec!["GET".to_string()],
                sources: vec![SourceRef::with_lines("src/app.ts", 12, Some(18))],
                ..RouteSurface::default()
            }],
            components: vec![ComponentSurface {
                name: "Spacer".to_string(),
                ..ComponentSurface::default()
            }],
            ui_flows: vec![UiFlowSurface {
                name: "checkout".to_string(),
                steps: vec!["cart".to_string(), "pay".to_string()],
                ..UiFlowSurface::default()
            }],
            ..SurfaceCollection::default()
        };

        let artifacts = MarkdownBeanWriter
            .write_beans(&surfaces, &paths)
            .expect("write beans");
        let sequences: Vec<_> = artifacts.iter().map(|a| a.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert_eq!(artifacts[0].path, "beans/0001-route-home.md");
        assert!(!artifacts[0].skipped);
        assert!(artifacts[1].skipped);
        assert!(!paths.resolve(&artifacts[1].path).exists());

        let content =
            std::fs::read_to_string(paths.resolve(&artifacts[0].path)).expect("read bean");
        for section in REQUIRED_BEAN_SECTIONS {
            assert!(content.contains(section), "missing {section}");
        }
        assert!(content.contains("`src/app.ts:12-18`"));
    }

    #[test]
    fn rewriting_the_same_collection_is_stable() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let paths = RunPaths::new(temp.path().to_path_buf());
        let surfaces = SurfaceCollection {
            routes: vec![RouteSurface {
                name: "/home".to_string(),
                ..RouteSurface::default()
            }],
            ..SurfaceCollection::default()
        };
        let first = MarkdownBeanWriter.write_beans(&surfaces, &paths).expect("first");
        let before = std::fs::read(paths.resolve(&first[0].path)).expect("read");
        let second = MarkdownBeanWriter.write_beans(&surfaces, &paths).expect("second");
        let after = std::fs::read(paths.resolve(&second[0].path)).expect("read");
        assert_eq!(first, second);
        assert_eq!(before, after);
    }
}
