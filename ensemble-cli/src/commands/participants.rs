//! `ensemble participants` — list the declared participant builds.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use ensemble_core::manifest;

/// Arguments for `ensemble participants`.
#[derive(Args, Debug)]
pub struct ParticipantsArgs {
    /// Path to the composite manifest.
    #[arg(long, default_value = "ensemble.yaml")]
    pub manifest: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ParticipantRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "root")]
    root: String,
    #[tabled(rename = "tasks")]
    tasks: usize,
    #[tabled(rename = "target")]
    target: String,
}

#[derive(Serialize)]
struct ParticipantJson {
    id: String,
    root: String,
    tasks: Vec<String>,
    target: bool,
}

impl ParticipantsArgs {
    pub fn run(self) -> Result<()> {
        let manifest = manifest::load_manifest(&self.manifest).with_context(|| {
            format!("failed to load composite manifest {}", self.manifest.display())
        })?;

        if self.json {
            let payload: Vec<ParticipantJson> = manifest
                .builds
                .iter()
                .map(|p| ParticipantJson {
                    id: p.id.to_string(),
                    root: p.dir.display().to_string(),
                    tasks: p.tasks.keys().map(|t| t.to_string()).collect(),
                    target: manifest.target.as_ref() == Some(&p.id),
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&payload)
                    .context("failed to serialize participants JSON")?
            );
            return Ok(());
        }

        let rows: Vec<ParticipantRow> = manifest
            .builds
            .iter()
            .map(|p| ParticipantRow {
                id: p.id.to_string(),
                root: p.dir.display().to_string(),
                tasks: p.tasks.len(),
                target: if manifest.target.as_ref() == Some(&p.id) {
                    "*".to_string()
                } else {
                    String::new()
                },
            })
            .collect();

        println!(
            "{} participant build(s) in {}",
            manifest.builds.len(),
            self.manifest.display().to_string().bold(),
        );
        let mut table = Table::new(rows);
        table.with(Style::sharp());
        println!("{table}");
        Ok(())
    }
}
