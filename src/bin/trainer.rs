use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use predictd::log_sink::init_tracing;
use predictd::model_artifact::ModelArtifact;
use predictd::reference_dataset::ReferenceDataset;
use predictd::training::{fit_reference_classifier, fit_regressor, read_xy_csv, DEFAULT_TREES};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Fit a random forest and write a predictd model artifact")]
struct Args {
    /// `regress` (x,y CSV) or `classify` (bundled reference dataset)
    #[clap(short, long, default_value = "regress")]
    mode: String,

    /// Training data for `regress` mode; needs `x` and `y` columns
    #[clap(short, long)]
    csv: Option<PathBuf>,

    #[clap(short, long, default_value = "models/random_forest_model")]
    output: PathBuf,

    #[clap(long, default_value_t = DEFAULT_TREES)]
    trees: u16,
}

// Deployment record written next to the artifact
#[derive(Serialize, Debug)]
struct ModelManifest {
    model_file: String,
    sha256: String,
    mode: String,
    kind: String,
    n_features: usize,
    feature_names: Vec<String>,
    n_trees: u16,
    timestamp: DateTime<Utc>,
}

fn hash_file(path: &Path) -> Result<String> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(format!("{:x}", Sha256::digest(&data)))
}

const MANIFEST_FILE: &str = "model_manifest.json";

/// Manifest sits next to the artifact; refuses an artifact that would be overwritten by it.
fn manifest_path_for(output: &Path) -> Result<PathBuf> {
    if output.file_name().is_some_and(|name| name == MANIFEST_FILE) {
        bail!("--output may not be named {MANIFEST_FILE}; the manifest would overwrite the artifact");
    }
    Ok(output.with_file_name(MANIFEST_FILE))
}

fn write_manifest(args: &Args, artifact: &ModelArtifact, sha: &str) -> Result<PathBuf> {
    let manifest = ModelManifest {
        model_file: args
            .output
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string(),
        sha256: sha.to_string(),
        mode: args.mode.clone(),
        kind: artifact.estimator.kind().to_string(),
        n_features: artifact.n_features,
        feature_names: artifact.feature_names.clone(),
        n_trees: args.trees,
        timestamp: Utc::now(),
    };

    let manifest_path = manifest_path_for(&args.output)?;
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("writing {}", manifest_path.display()))?;
    Ok(manifest_path)
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    // Checked before fitting so a bad name costs nothing.
    manifest_path_for(&args.output)?;

    let artifact = match args.mode.as_str() {
        "regress" => {
            let csv = args
                .csv
                .as_ref()
                .context("--csv is required in regress mode")?;
            let (table, ys) = read_xy_csv(csv)?;
            info!(path = %csv.display(), rows = table.rows(), "training data loaded");
            fit_regressor(&table, &ys, vec!["x".to_string()], args.trees)?
        }
        "classify" => {
            let dataset = ReferenceDataset::iris()?;
            info!(rows = dataset.len(), "reference dataset loaded");
            fit_reference_classifier(&dataset, args.trees)?
        }
        other => bail!("unknown mode '{other}' (expected regress or classify)"),
    };

    artifact.save(&args.output)?;
    let sha = hash_file(&args.output)?;
    let manifest_path = write_manifest(&args, &artifact, &sha)?;

    info!(
        artifact = %args.output.display(),
        manifest = %manifest_path.display(),
        sha256 = %sha,
        "model exported"
    );
    Ok(())
}
