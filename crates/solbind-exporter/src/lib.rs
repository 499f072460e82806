//! solbind Manifest Exporter
//!
//! Serializes resolved [`ContractModel`]s into JSON manifests that code
//! emitters consume. Each contract is written to its own package directory:
//!
//! ```text
//! <out>/
//!   index.json
//!   <package>/manifest.json
//! ```
//!
//! Output is deterministic: the same models always produce byte-identical
//! files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use solbind_compiler::schema::LinkReference;
use solbind_compiler::{CallableSignature, ContractModel, EventSignature, Parameter};
use solbind_runtime::RecordRef;

/// Bumped whenever the manifest layout changes
pub const MANIFEST_VERSION: u32 = 1;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const INDEX_FILE: &str = "index.json";

/// Exporter settings
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub out_dir: PathBuf,
    /// Indent the JSON output
    pub pretty: bool,
    /// Emit creation and runtime bytecode
    pub include_bytecode: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { out_dir: PathBuf::from("bindings"), pretty: true, include_bytecode: true }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractManifest<'m> {
    pub manifest_version: u32,
    pub contract: &'m str,
    pub source: &'m str,
    pub package: &'m str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_version: Option<&'m str>,
    pub functions: Vec<CallableView<'m>>,
    pub events: Vec<EventView<'m>>,
    pub errors: Vec<CallableView<'m>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constructor: Option<ConstructorView<'m>>,
    pub records: Vec<RecordView<'m>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytecode: Option<&'m str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployed_bytecode: Option<&'m str>,
    #[serde(skip_serializing_if = "no_links")]
    pub link_references: &'m [LinkReference],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamView<'m> {
    pub name: &'m str,
    /// Canonical ABI type, as used in signatures
    #[serde(rename = "type")]
    pub abi_type: String,
    /// Type with record names in place of tuple expansions, e.g. `User[]`
    pub display_type: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub indexed: bool,
}

impl<'m> From<&'m Parameter> for ParamView<'m> {
    fn from(param: &'m Parameter) -> Self {
        Self {
            name: &param.name,
            abi_type: param.ty.canonical(),
            display_type: param.ty.display_name(),
            indexed: param.indexed,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallableView<'m> {
    pub name: &'m str,
    pub base_name: &'m str,
    pub signature: &'m str,
    pub selector: String,
    pub inputs: Vec<ParamView<'m>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<ParamView<'m>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<&'m str>,
}

impl<'m> From<&'m CallableSignature> for CallableView<'m> {
    fn from(callable: &'m CallableSignature) -> Self {
        Self {
            name: &callable.name,
            base_name: &callable.base_name,
            signature: &callable.signature,
            selector: callable.selector.to_string(),
            inputs: params(&callable.inputs),
            outputs: params(&callable.outputs),
            state_mutability: callable.state_mutability.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView<'m> {
    pub name: &'m str,
    pub base_name: &'m str,
    pub signature: &'m str,
    pub topic: String,
    pub anonymous: bool,
    pub inputs: Vec<ParamView<'m>>,
}

impl<'m> From<&'m EventSignature> for EventView<'m> {
    fn from(event: &'m EventSignature) -> Self {
        Self {
            name: &event.name,
            base_name: &event.base_name,
            signature: &event.signature,
            topic: event.topic.to_string(),
            anonymous: event.anonymous,
            inputs: params(&event.inputs),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorView<'m> {
    pub signature: &'m str,
    pub inputs: Vec<ParamView<'m>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<&'m str>,
}

#[derive(Debug, Serialize)]
pub struct RecordView<'m> {
    pub name: &'m str,
    pub fields: Vec<FieldView<'m>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView<'m> {
    pub name: &'m str,
    #[serde(rename = "type")]
    pub abi_type: String,
    pub display_type: String,
}

impl<'m> From<&'m RecordRef> for RecordView<'m> {
    fn from(record: &'m RecordRef) -> Self {
        Self {
            name: record.name(),
            fields: record
                .fields()
                .iter()
                .map(|f| FieldView {
                    name: &f.name,
                    abi_type: f.ty.canonical(),
                    display_type: f.ty.display_name(),
                })
                .collect(),
        }
    }
}

fn no_links(refs: &&[LinkReference]) -> bool {
    refs.is_empty()
}

fn params(list: &[Parameter]) -> Vec<ParamView<'_>> {
    list.iter().map(ParamView::from).collect()
}

/// One row of `index.json`
#[derive(Debug, Serialize)]
struct IndexEntry<'m> {
    contract: String,
    package: &'m str,
    manifest: String,
}

/// Writes manifests for resolved contract models
#[derive(Debug, Clone, Default)]
pub struct ManifestExporter {
    config: ExportConfig,
}

impl ManifestExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Build the manifest view of one model
    pub fn manifest<'m>(
        &self,
        model: &'m ContractModel,
        compiler_version: Option<&'m str>,
    ) -> ContractManifest<'m> {
        let code = |hex: &'m str| (self.config.include_bytecode && !hex.is_empty()).then_some(hex);

        ContractManifest {
            manifest_version: MANIFEST_VERSION,
            contract: &model.name,
            source: &model.source_id,
            package: &model.package_name,
            compiler_version,
            functions: model.functions.iter().map(CallableView::from).collect(),
            events: model.events.iter().map(EventView::from).collect(),
            errors: model.errors.iter().map(CallableView::from).collect(),
            constructor: model.constructor.as_ref().map(|c| ConstructorView {
                signature: &c.signature,
                inputs: params(&c.inputs),
                state_mutability: c.state_mutability.as_deref(),
            }),
            records: model.records.iter().map(RecordView::from).collect(),
            bytecode: code(model.bytecode.as_str()),
            deployed_bytecode: code(model.deployed_bytecode.as_str()),
            link_references: &model.link_references,
        }
    }

    /// Render one model's manifest as JSON text
    pub fn render(&self, model: &ContractModel, compiler_version: Option<&str>) -> Result<String> {
        self.to_json(&self.manifest(model, compiler_version))
            .with_context(|| format!("Failed to serialize manifest for {}", model.key()))
    }

    /// Where a model's manifest lands
    pub fn manifest_path(&self, model: &ContractModel) -> PathBuf {
        self.config.out_dir.join(&model.package_name).join(MANIFEST_FILE)
    }

    /// Write one model's manifest, returning its path
    pub fn export(&self, model: &ContractModel, compiler_version: Option<&str>) -> Result<PathBuf> {
        let path = self.manifest_path(model);
        let rendered = self.render(model, compiler_version)?;
        write_file(&path, &rendered)?;

        tracing::info!(
            target: "solbind::exporter",
            contract = %model.key(),
            path = %path.display(),
            "wrote manifest"
        );
        Ok(path)
    }

    /// Write every manifest plus an `index.json` listing them
    pub fn export_all(
        &self,
        models: &[ContractModel],
        compiler_version: Option<&str>,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(models.len() + 1);
        let mut index = Vec::with_capacity(models.len());

        for model in models {
            let path = self.export(model, compiler_version)?;
            index.push(IndexEntry {
                contract: model.key(),
                package: &model.package_name,
                manifest: format!("{}/{}", model.package_name, MANIFEST_FILE),
            });
            written.push(path);
        }

        let index_path = self.config.out_dir.join(INDEX_FILE);
        write_file(&index_path, &self.to_json(&index)?)?;
        written.push(index_path);
        Ok(written)
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let mut text = if self.config.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        text.push('\n');
        Ok(text)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write file: {:?}", path))
}
