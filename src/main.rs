use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use itertools::Itertools;
use log::{error, info};

use scene_compiler::compiler::SceneCompiler;
use scene_compiler::compiler::asset_writer::ChunkFileAssetWriter;
use scene_compiler::compiler::import_request::{AssetImportRequest, ManifestAction};
use scene_compiler::compiler::meta_info::{DefaultManifestMetaInfo, ManifestMetaInfoProvider};
use scene_compiler::events::result::ProcessingResult;
use scene_compiler::scene::Scene;
use scene_compiler::scene::graph::SceneGraph;
use scene_compiler::scene::views::Traversal;

use crate::settings::{CliArgs, OperationMode};

mod settings;

fn main() {
    env_logger::init();

    let args = CliArgs::parse();
    log::trace!("Starting with args: {:?}", args);

    let success = match &args.operation_mode {
        OperationMode::Compile { sources, output_dir } => compile(sources, Path::new(output_dir)),
        OperationMode::DumpGraph { source } => dump_graph(source),
        OperationMode::DefaultManifest { source, force } => default_manifest(source, *force),
    };

    if !success {
        std::process::exit(1);
    }
}

fn compile(sources: &[PathBuf], output_dir: &Path) -> bool {
    let compiler = SceneCompiler::new(
        Rc::new(ChunkFileAssetWriter::new()),
        Box::new(DefaultManifestMetaInfo::new()),
    );

    let failed = sources
        .iter()
        .filter(|source| {
            info!("Compiling {}", source.display());
            !compiler.compile(source, output_dir)
        })
        .collect_vec();

    if !failed.is_empty() {
        error!(
            "{} of {} sources failed: {}",
            failed.len(),
            sources.len(),
            failed.iter().map(|source| source.display()).join(", ")
        );
    }
    failed.is_empty()
}

fn load(source: &Path, meta_info: &dyn ManifestMetaInfoProvider) -> Option<Scene> {
    let scene = AssetImportRequest::load_scene(source, meta_info);
    if scene.is_none() {
        error!("Failed to load asset {}", source.display());
    }
    scene
}

fn dump_graph(source: &Path) -> bool {
    let Some(scene) = load(source, &DefaultManifestMetaInfo::new()) else {
        return false;
    };

    let graph = scene.graph();
    for index in graph.downwards(graph.get_root(), Traversal::DepthFirst).skip(1) {
        let depth = graph.upwards(index).count() - 2;
        let name = graph.get_node_name(index).map(SceneGraph::get_short_name).unwrap_or_default();
        let kind = graph
            .get_node_content(index)
            .map(|content| format!(" [{:?}]", content.kind()))
            .unwrap_or_default();
        let end_point = if graph.is_node_end_point(index) { " (end point)" } else { "" };
        println!("{}{}{}{}", "  ".repeat(depth), name, kind, end_point);
    }

    for (name, object) in scene.manifest().iter() {
        println!("group '{}': {:?}", name, object.object_type());
    }
    true
}

fn default_manifest(source: &Path, force: bool) -> bool {
    match write_default_manifest(source, force) {
        Ok(manifest_filename) => {
            info!("Wrote {}", manifest_filename.display());
            true
        }
        Err(err) => {
            error!("{:#}", err);
            false
        }
    }
}

fn write_default_manifest(source: &Path, force: bool) -> Result<PathBuf, anyhow::Error> {
    let meta_info = DefaultManifestMetaInfo::new();
    let mut scene = load(source, &meta_info).ok_or_else(|| anyhow!("No scene loaded from {}", source.display()))?;

    let manifest_filename = scene.manifest_filename();
    if manifest_filename.exists() && !force {
        bail!("{} already exists, pass --force to replace it", manifest_filename.display());
    }

    scene.manifest_mut().clear();
    if AssetImportRequest::update_manifest(&mut scene, ManifestAction::ConstructDefault, &meta_info)
        == ProcessingResult::Failure
    {
        bail!("{} holds no meshes to build a default manifest from", source.display());
    }

    scene
        .manifest()
        .save_to_file(&manifest_filename)
        .with_context(|| format!("Unable to write {}", manifest_filename.display()))?;
    Ok(manifest_filename)
}
