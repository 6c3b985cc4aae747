//! # helix-build
//!
//! Build-time metadata generator: scans entity sources for
//! `#[derive(Entity)]` / `#[derive(Embeddable)]` structs, assembles the
//! entity graph, and emits one descriptor container per entity
//! (`{Entity}Fields`, plus nested relation accessor containers).
//!
//! In a `build.rs`:
//!
//! ```ignore
//! fn main() {
//!     helix_build::generate_fields()
//!         .scan_path("src/")
//!         .output_file("src/generated/fields.rs")
//!         .run()
//!         .expect("field generation failed");
//!
//!     println!("cargo:rerun-if-changed=src/");
//! }
//! ```
//!
//! The emitted file expects to live next to the entity definitions
//! (it opens with `use super::*;`).

mod classify;
mod emit;
mod model;
mod options;
mod scan;

pub use emit::{emit_entity_fields, emit_graph};
pub use model::{AttributeDef, EntityDef, EntityGraph, FieldCategory, StructKind};
pub use options::GeneratorOptions;
pub use scan::scan_directory;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Create a generator with default settings.
#[must_use]
pub fn generate_fields() -> Generator {
    Generator::new()
}

///
/// Generator
///
/// Builder for configuring and running the field-descriptor generator.
/// Run once per build; the outputs are source-level artifacts consumed
/// by the same build.
///

pub struct Generator {
    scan_paths: Vec<PathBuf>,
    output_file: PathBuf,
    options: GeneratorOptions,
}

impl Generator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scan_paths: Vec::new(),
            output_file: PathBuf::from("src/generated/fields.rs"),
            options: GeneratorOptions::default(),
        }
    }

    /// Add a directory to scan for entity definitions.
    #[must_use]
    pub fn scan_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scan_paths.push(path.into());
        self
    }

    /// Set the output file for the generated containers.
    #[must_use]
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = path.into();
        self
    }

    #[must_use]
    pub fn options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Scan, assemble the graph, emit, and write the output file.
    pub fn run(self) -> Result<()> {
        let scan_paths = if self.scan_paths.is_empty() {
            vec![PathBuf::from("src/")]
        } else {
            self.scan_paths
        };

        let mut graph = EntityGraph::new();
        for path in &scan_paths {
            let defs = scan_directory(path)
                .with_context(|| format!("failed to scan {}", path.display()))?;
            graph.extend(defs);
        }

        let code = emit_graph(&graph, &self.options)?;

        if let Some(parent) = self.output_file.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&self.output_file, code)
            .with_context(|| format!("failed to write {}", self.output_file.display()))?;
        Ok(())
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}
