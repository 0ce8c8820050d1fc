use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "scene-compiler")]
#[command(version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_BRANCH"),
    "/",
    env!("VERGEN_GIT_SHA"),
    ")"
))]
#[command(about = "Compiles scene descriptions into CGF, CHR and SKIN assets")]
pub struct CliArgs {
    #[command(subcommand)]
    pub operation_mode: OperationMode,
}

pub fn default_output_dir() -> String {
    std::env::current_dir()
        .unwrap_or_default()
        .join("_out")
        .to_string_lossy()
        .to_string()
}

#[derive(Subcommand, Debug)]
pub enum OperationMode {
    /// Exports every group of the sources' manifests.
    Compile {
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        #[arg(long, env = "SCENE_COMPILER_OUTPUT_DIR", default_value_t = default_output_dir())]
        output_dir: String,
    },
    /// Prints the imported scene graph.
    DumpGraph { source: PathBuf },
    /// Writes the default manifest next to the source.
    DefaultManifest {
        source: PathBuf,
        #[arg(long, help = "Replace an existing manifest")]
        force: bool,
    },
}
