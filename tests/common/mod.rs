//! Shared fixtures for integration tests.
#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A temp workspace with a tiny source tree and a surface snapshot.
pub struct RunFixture {
    pub temp: TempDir,
}

impl RunFixture {
    pub fn new(surfaces: &Value) -> anyhow::Result<Self> {
        let temp = TempDir::new()?;
        let source = temp.path().join("shop");
        fs::create_dir_all(source.join("src/api"))?;
        fs::write(source.join("package.json"), "{\"name\": \"shop\"}")?;
        fs::write(source.join("src/api/orders.ts"), "export function list() {}\n")?;
        fs::write(source.join("src/models.ts"), "export interface Order {}\n")?;
        fs::write(
            temp.path().join("surfaces.json"),
            serde_json::to_vec_pretty(surfaces)?,
        )?;
        Ok(Self { temp })
    }

    pub fn source(&self) -> PathBuf {
        self.temp.path().join("shop")
    }

    pub fn surfaces(&self) -> PathBuf {
        self.temp.path().join("surfaces.json")
    }

    pub fn out(&self) -> PathBuf {
        self.temp.path().join("run")
    }

    /// Run `beanpack run` against this fixture with extra args.
    pub fn run(&self, extra: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_beanpack"))
            .arg("run")
            .arg("--source")
            .arg(self.source())
            .arg("--surfaces")
            .arg(self.surfaces())
            .arg("--out")
            .arg(self.out())
            .args(extra)
            .env_remove("BEANPACK_LOG")
            .output()
            .expect("run beanpack")
    }

    pub fn status_json(&self) -> Value {
        let output = Command::new(env!("CARGO_BIN_EXE_beanpack"))
            .args(["status", "--json", "--out"])
            .arg(self.out())
            .output()
            .expect("run beanpack status");
        assert!(output.status.success(), "{}", stderr(&output));
        serde_json::from_slice(&output.stdout).expect("status json")
    }
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn read_text(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}

/// Surfaces that the bundled writer documents completely.
pub fn covered_surfaces() -> Value {
    json!({
        "routes": [
            {
                "name": "/orders",
                "methods": ["GET"],
                "sources": [{"file": "src/api/orders.ts", "start_line": 1}]
            }
        ],
        "apis": [
            {
                "name": "GET /orders",
                "method": "GET",
                "path": "/orders",
                "response_schema": {
                    "type": "array",
                    "items": {"$ref": "#/components/schemas/Order"}
                },
                "sources": [{"file": "src/api/orders.ts"}]
            }
        ],
        "models": [
            {
                "name": "Order",
                "fields": [{"name": "id", "type": "string"}],
                "sources": [{"file": "src/models.ts"}]
            }
        ],
        "config": [
            {"name": "DATABASE_URL", "required": true, "sources": [{"file": ".env.example"}]}
        ]
    })
}
