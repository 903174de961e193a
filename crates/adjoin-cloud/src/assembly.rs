//! Cloud assembly output
//!
//! Manages the output directory (`cdk.out` by default) which holds one
//! `<stack>.template.json` per stack plus a `manifest.json` describing
//! them for the deployment tooling.

use crate::error::{CloudError, Result};
use crate::stack::check_stack_name;
use crate::template::Template;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const MANIFEST_VERSION: u32 = 1;
const MANIFEST_FILE: &str = "manifest.json";
const TEMPLATE_SUFFIX: &str = ".template.json";
const BACKUP_SUFFIX: &str = ".backup";
const STACK_ARTIFACT_TYPE: &str = "aws:cloudformation:stack";

/// Templates of every stack produced by one synthesis run
#[derive(Debug, Clone, Default)]
pub struct CloudAssembly {
    templates: IndexMap<String, Template>,
}

impl CloudAssembly {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, stack_name: impl Into<String>, template: Template) {
        self.templates.insert(stack_name.into(), template);
    }

    pub fn template(&self, stack_name: &str) -> Result<&Template> {
        self.templates
            .get(stack_name)
            .ok_or_else(|| CloudError::StackNotFound(stack_name.to_string()))
    }

    pub fn stack_names(&self) -> Vec<&str> {
        self.templates.keys().map(|s| s.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Template)> {
        self.templates.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Manifest describing the artifacts of an assembly directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest format version
    pub version: u32,

    /// Artifacts indexed by stack name
    pub artifacts: IndexMap<String, Artifact>,
}

/// A single stack artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(rename = "type")]
    pub artifact_type: String,

    pub template_file: String,
}

/// Reads and writes assembly directories
pub struct AssemblyWriter {
    /// Output directory
    out_dir: PathBuf,
}

impl AssemblyWriter {
    pub fn new(out_dir: impl AsRef<Path>) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn template_file_name(stack_name: &str) -> String {
        format!("{}{}", stack_name, TEMPLATE_SUFFIX)
    }

    /// Get the template path of a stack
    pub fn template_path(&self, stack_name: &str) -> PathBuf {
        self.out_dir.join(Self::template_file_name(stack_name))
    }

    fn backup_path(&self, stack_name: &str) -> PathBuf {
        self.out_dir
            .join(format!("{}{}", Self::template_file_name(stack_name), BACKUP_SUFFIX))
    }

    fn manifest_path(&self) -> PathBuf {
        self.out_dir.join(MANIFEST_FILE)
    }

    /// Ensure the output directory exists
    fn ensure_out_dir(&self) -> Result<()> {
        if !self.out_dir.exists() {
            fs::create_dir_all(&self.out_dir)?;
            tracing::debug!("Created assembly directory: {}", self.out_dir.display());
        }
        Ok(())
    }

    /// Writes every template and the manifest.
    ///
    /// Existing templates are kept as `.backup` next to the new ones. Stacks
    /// written by earlier runs stay in the manifest while their template
    /// file exists.
    pub fn write(&self, assembly: &CloudAssembly) -> Result<Manifest> {
        for stack_name in assembly.stack_names() {
            check_stack_name(stack_name)?;
        }
        self.ensure_out_dir()?;

        let mut artifacts = match self.load_manifest()? {
            Some(previous) => previous.artifacts,
            None => IndexMap::new(),
        };
        artifacts.retain(|_, artifact| self.out_dir.join(&artifact.template_file).is_file());

        for (stack_name, template) in assembly.iter() {
            let path = self.template_path(stack_name);
            if path.exists() {
                let backup = self.backup_path(stack_name);
                if backup.exists() {
                    fs::remove_file(&backup)?;
                }
                fs::rename(&path, &backup)?;
                tracing::debug!("Created template backup for {}", stack_name);
            }

            fs::write(&path, template.to_json_pretty()?)?;
            tracing::debug!("Wrote {}", path.display());

            artifacts.insert(
                stack_name.clone(),
                Artifact {
                    artifact_type: STACK_ARTIFACT_TYPE.to_string(),
                    template_file: Self::template_file_name(stack_name),
                },
            );
        }

        let manifest = Manifest {
            version: MANIFEST_VERSION,
            artifacts,
        };
        fs::write(self.manifest_path(), serde_json::to_string_pretty(&manifest)?)?;

        tracing::info!(
            "Wrote {} stack(s) to {}",
            manifest.artifacts.len(),
            self.out_dir.display()
        );
        Ok(manifest)
    }

    /// Load the manifest, if the directory has one
    pub fn load_manifest(&self) -> Result<Option<Manifest>> {
        let path = self.manifest_path();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let manifest: Manifest = serde_json::from_str(&content)?;

        // Version check
        if manifest.version > MANIFEST_VERSION {
            return Err(CloudError::AssemblyError(format!(
                "Manifest version {} is newer than supported version {}",
                manifest.version, MANIFEST_VERSION
            )));
        }

        Ok(Some(manifest))
    }

    /// Load a previously written template
    pub fn load_template(&self, stack_name: &str) -> Result<Option<Template>> {
        check_stack_name(stack_name)?;
        let path = self.template_path(stack_name);
        if !path.exists() {
            tracing::debug!("No previous template for {}", stack_name);
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        Ok(Some(Template::from_json(&content)?))
    }
}
