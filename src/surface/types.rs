//! Typed surface records, one per category.
//!
//! Records are produced by extractors and only read by the pipeline.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// File path used when a surface carries no source reference.
pub const UNKNOWN_FILE: &str = "unknown";

/// Closed set of surface categories.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceCategory {
    Route,
    Api,
    Model,
    Component,
    Config,
    Auth,
    Middleware,
    Integration,
    Job,
    UiFlow,
}

impl SurfaceCategory {
    pub const ALL: [SurfaceCategory; 10] = [
        SurfaceCategory::Route,
        SurfaceCategory::Api,
        SurfaceCategory::Model,
        SurfaceCategory::Component,
        SurfaceCategory::Config,
        SurfaceCategory::Auth,
        SurfaceCategory::Middleware,
        SurfaceCategory::Integration,
        SurfaceCategory::Job,
        SurfaceCategory::UiFlow,
    ];

    /// Return the stable string identifier used in JSON artifacts.
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceCategory::Route => "route",
            SurfaceCategory::Api => "api",
            SurfaceCategory::Model => "model",
            SurfaceCategory::Component => "component",
            SurfaceCategory::Config => "config",
            SurfaceCategory::Auth => "auth",
            SurfaceCategory::Middleware => "middleware",
            SurfaceCategory::Integration => "integration",
            SurfaceCategory::Job => "job",
            SurfaceCategory::UiFlow => "ui_flow",
        }
    }

    /// Human-readable plural label used in report headers.
    pub fn label(&self) -> &'static str {
        match self {
            SurfaceCategory::Route => "Routes",
            SurfaceCategory::Api => "APIs",
            SurfaceCategory::Model => "Models",
            SurfaceCategory::Component => "Components",
            SurfaceCategory::Config => "Config",
            SurfaceCategory::Auth => "Auth",
            SurfaceCategory::Middleware => "Middleware",
            SurfaceCategory::Integration => "Integrations",
            SurfaceCategory::Job => "Jobs",
            SurfaceCategory::UiFlow => "UI Flows",
        }
    }
}

impl fmt::Display for SurfaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of a surface: a file relative to the source root plus lines.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
}

impl SourceRef {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            start_line: None,
            end_line: None,
        }
    }

    pub fn with_lines(file: impl Into<String>, start: u32, end: Option<u32>) -> Self {
        Self {
            file: file.into(),
            start_line: Some(start),
            end_line: end,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start_line, self.end_line) {
            (Some(start), Some(end)) if end > start => write!(f, "{}:{}-{}", self.file, start, end),
            (Some(start), _) => write!(f, "{}:{}", self.file, start),
            (None, _) => f.write_str(&self.file),
        }
    }
}

/// Fields shared by every surface record.
pub trait SurfaceRecord {
    fn name(&self) -> &str;
    fn sources(&self) -> &[SourceRef];
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct RouteSurface {
    /// Route path, e.g. `/users/:id`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ApiSurface {
    /// Stable id, conventionally `METHOD path`.
    pub name: String,
    pub method: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    #[serde(default)]
    pub auth_required: bool,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct ModelField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ModelSurface {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ModelField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ComponentSurface {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ConfigSurface {
    /// Environment variable or config key.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct AuthSurface {
    pub name: String,
    pub mechanism: String,
    /// Names of routes or APIs this guard protects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protects: Vec<String>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct MiddlewareSurface {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applies_to: Vec<String>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct IntegrationSurface {
    pub name: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct JobSurface {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct UiFlowSurface {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

macro_rules! surface_record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl SurfaceRecord for $ty {
                fn name(&self) -> &str {
                    &self.name
                }

                fn sources(&self) -> &[SourceRef] {
                    &self.sources
                }
            }
        )+
    };
}

surface_record!(
    RouteSurface,
    ApiSurface,
    ModelSurface,
    ComponentSurface,
    ConfigSurface,
    AuthSurface,
    MiddlewareSurface,
    IntegrationSurface,
    JobSurface,
    UiFlowSurface,
);
