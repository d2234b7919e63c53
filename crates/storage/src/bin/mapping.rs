use std::fmt;
use std::path::PathBuf;

use chrono::Utc;
use storage::JsonFileCatalog;
use storage::mapping::{ImageInventory, ImageKind, backup_and_rename};

#[derive(Debug, Clone)]
struct Args {
    images_dir: PathBuf,
    out: PathBuf,
    prefix: String,
    obfuscate: bool,
    backup_dir: PathBuf,
    yes: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    EmptyValue { flag: &'static str },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::EmptyValue { flag } => write!(f, "{flag} cannot be empty"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug)]
enum MappingError {
    NoPairs { dir: PathBuf },
    RenameNotConfirmed,
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingError::NoPairs { dir } => {
                write!(f, "no real_<n>/fake_<n> pairs found in {}", dir.display())
            }
            MappingError::RenameNotConfirmed => {
                write!(f, "--obfuscate renames files in place; pass --yes to confirm")
            }
        }
    }
}

impl std::error::Error for MappingError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    let value = args.next().ok_or(ArgsError::MissingValue { flag })?;
    if value.trim().is_empty() {
        return Err(ArgsError::EmptyValue { flag });
    }
    Ok(value)
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut images_dir: PathBuf = std::env::var("FAKEFINDER_IMAGES")
            .unwrap_or_else(|_| "images".into())
            .into();
        let mut out: PathBuf = std::env::var("FAKEFINDER_CATALOG")
            .unwrap_or_else(|_| "image_mapping.json".into())
            .into();
        let mut prefix: Option<String> = None;
        let mut obfuscate = false;
        let mut backup_dir = PathBuf::from("images_backup");
        let mut yes = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--images" => images_dir = require_value(&mut args, "--images")?.into(),
                "--out" => out = require_value(&mut args, "--out")?.into(),
                "--prefix" => prefix = Some(require_value(&mut args, "--prefix")?),
                "--backup" => backup_dir = require_value(&mut args, "--backup")?.into(),
                "--obfuscate" => obfuscate = true,
                "--yes" | "-y" => yes = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        // Paths in the document are relative to wherever the quiz serves images from;
        // default to the directory name as given.
        let prefix = prefix.unwrap_or_else(|| images_dir.to_string_lossy().into_owned());

        Ok(Self {
            images_dir,
            out,
            prefix,
            obfuscate,
            backup_dir,
            yes,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin mapping -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --images <dir>       Directory with real_<n>/fake_<n> images (default: images)");
    eprintln!("  --out <file>         Catalog file to write (default: image_mapping.json)");
    eprintln!("  --prefix <path>      Path prefix used in the catalog (default: --images value)");
    eprintln!("  --obfuscate          Rename images to random names (catalog written first)");
    eprintln!("  --backup <dir>       Where originals are copied first (default: images_backup)");
    eprintln!("  -y, --yes            Confirm --obfuscate");
    eprintln!("  -h, --help           Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  FAKEFINDER_IMAGES, FAKEFINDER_CATALOG");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    if args.obfuscate && !args.yes {
        return Err(MappingError::RenameNotConfirmed.into());
    }

    let mut inventory = ImageInventory::scan(&args.images_dir).await?;
    if inventory.paired_indices().is_empty() {
        return Err(MappingError::NoPairs {
            dir: args.images_dir.clone(),
        }
        .into());
    }

    for (kind, index) in inventory.unmatched_indices() {
        let (have, missing) = match kind {
            ImageKind::Real => ("real", "fake"),
            ImageKind::Fake => ("fake", "real"),
        };
        eprintln!("warning: {have}_{index} has no matching {missing}_{index}; skipped");
    }

    // Plan renames up front; the catalog is written before any file is touched.
    let renames = if args.obfuscate {
        inventory.obfuscate(&mut rand::rng())
    } else {
        Vec::new()
    };

    let generated_at = Utc::now().format("%Y-%m-%d").to_string();
    let document = inventory.to_document(&args.prefix, Some(generated_at));
    let pair_count = document.pairs.len();
    JsonFileCatalog::new(&args.out).save(&document).await?;

    if !renames.is_empty() {
        backup_and_rename(&args.images_dir, &args.backup_dir, &renames).await?;
        println!(
            "{} image(s) renamed; originals backed up in {}",
            renames.len(),
            args.backup_dir.display()
        );
    }

    println!(
        "Wrote {} pair(s) from {} real / {} fake image(s) to {}",
        pair_count,
        inventory.real.len(),
        inventory.fake.len(),
        args.out.display()
    );

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
