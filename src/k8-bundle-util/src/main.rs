use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use serde_yaml::Value;
use tracing::info;

use k8_csv_sync::locate_manifest;
use k8_csv_sync::sync_files;
use k8_csv_sync::SyncConfig;
use k8_manifest_edit::add_labels;
use k8_manifest_edit::read_documents;
use k8_manifest_edit::retarget_images;
use k8_manifest_edit::strip_finalizers;
use k8_manifest_edit::write_documents;
use k8_manifest_edit::write_split;
use k8_manifest_edit::ImageRetarget;

/// Maintain the manifests of an operator bundle
#[derive(Parser, Debug)]
#[command(name = "bundle-util")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Regenerate CSV spec and status descriptors from a CRD schema
    SyncDescriptors {
        /// CustomResourceDefinition file
        #[arg(long)]
        crd: PathBuf,

        /// ClusterServiceVersion file, rewritten in place
        #[arg(long, conflicts_with = "bundle_dir", required_unless_present = "bundle_dir")]
        csv: Option<PathBuf>,

        /// bundle directory holding one sub directory per version
        #[arg(long, requires = "bundle_version")]
        bundle_dir: Option<PathBuf>,

        /// version whose ClusterServiceVersion is synchronized
        #[arg(long, requires = "bundle_dir")]
        bundle_version: Option<String>,

        /// defaults for values missing from the schema
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Add labels to every object of a manifest file
    AddLabels {
        #[arg(long)]
        file: PathBuf,

        /// label as key=value, may be repeated
        #[arg(long = "label", value_parser = parse_label, required = true)]
        labels: Vec<(String, String)>,
    },

    /// Remove finalizers from every object of a manifest file
    StripFinalizers {
        #[arg(long)]
        file: PathBuf,
    },

    /// Move image references to another registry
    RetargetImages {
        #[arg(long)]
        file: PathBuf,

        /// registry to move images from, such as quay.io/org
        #[arg(long)]
        from: String,

        /// registry to move images to
        #[arg(long)]
        to: String,

        /// replace tag or digest of moved images
        #[arg(long)]
        tag: Option<String>,
    },

    /// Write each document of a multi document file into its own file
    Split {
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        output: PathBuf,
    },
}

fn parse_label(label: &str) -> Result<(String, String), String> {
    match label.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("label must be key=value: {}", label)),
    }
}

/// apply edit to every document of the file, write back only if something changed
fn edit_file<F>(path: &Path, mut edit: F) -> Result<usize>
where
    F: FnMut(&mut Value) -> usize,
{
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut documents = read_documents(&text)?;

    let changed: usize = documents.iter_mut().map(&mut edit).sum();
    if changed > 0 {
        fs::write(path, write_documents(&documents)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    info!(file = %path.display(), changed, "edited");
    Ok(changed)
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::SyncDescriptors {
            crd,
            csv,
            bundle_dir,
            bundle_version,
            config,
        } => {
            let config = match config {
                Some(path) => SyncConfig::from_file(path)?,
                None => SyncConfig::default(),
            };
            let csv = match (csv, bundle_dir, bundle_version) {
                (Some(csv), _, _) => csv,
                (None, Some(dir), Some(version)) => locate_manifest(dir, &version)?,
                _ => anyhow::bail!("either --csv or --bundle-dir with --bundle-version is required"),
            };
            if sync_files(&crd, &csv, &config)? {
                println!("updated {}", csv.display());
            } else {
                println!("{} unchanged", csv.display());
            }
        }
        Command::AddLabels { file, labels } => {
            let changed = edit_file(&file, |document| usize::from(add_labels(document, &labels)))?;
            println!("labeled {} document(s)", changed);
        }
        Command::StripFinalizers { file } => {
            let changed = edit_file(&file, |document| usize::from(strip_finalizers(document)))?;
            println!("stripped finalizers from {} document(s)", changed);
        }
        Command::RetargetImages {
            file,
            from,
            to,
            tag,
        } => {
            let retarget = ImageRetarget::new(from, to, tag);
            let changed = edit_file(&file, |document| retarget_images(document, &retarget))?;
            println!("retargeted {} image reference(s)", changed);
        }
        Command::Split { file, output } => {
            let text =
                fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            for path in write_split(&text, &output)? {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

fn main() {
    fluvio_future::subscriber::init_tracer(None);

    if let Err(e) = run(Cli::parse()) {
        eprintln!("{:#}", e);
        process::exit(1);
    }
}
