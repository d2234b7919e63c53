//! Builds catalog documents from a directory of `real_<n>` / `fake_<n>` images.
//!
//! Used by the `mapping` binary. Index `n` pairs a real image with a fake one.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use rand::Rng;

use crate::json::{CatalogDocument, CatalogMetadata, PairRecord};
use crate::repository::StorageError;

const NAME_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const NAME_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Real,
    Fake,
}

impl ImageKind {
    fn key(self, index: u32) -> String {
        match self {
            ImageKind::Real => format!("real_{index}"),
            ImageKind::Fake => format!("fake_{index}"),
        }
    }
}

/// Split `real_12.jpg` into `(Real, 12)`. Anything else yields `None`.
#[must_use]
pub fn parse_image_name(file_name: &str) -> Option<(ImageKind, u32)> {
    let stem = Path::new(file_name).file_stem()?.to_str()?;
    let (kind, number) = if let Some(rest) = stem.strip_prefix("real_") {
        (ImageKind::Real, rest)
    } else if let Some(rest) = stem.strip_prefix("fake_") {
        (ImageKind::Fake, rest)
    } else {
        return None;
    };
    number.parse().ok().map(|index| (kind, index))
}

/// A single file rename performed during obfuscation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

/// Image files found in a directory, keyed by pair index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageInventory {
    pub real: BTreeMap<u32, String>,
    pub fake: BTreeMap<u32, String>,
    pub ignored: Vec<String>,
}

impl ImageInventory {
    /// Classify file names; names that do not match the pattern land in `ignored`.
    #[must_use]
    pub fn from_file_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut inventory = Self::default();
        for name in names {
            let name = name.into();
            match parse_image_name(&name) {
                Some((ImageKind::Real, index)) => {
                    inventory.real.insert(index, name);
                }
                Some((ImageKind::Fake, index)) => {
                    inventory.fake.insert(index, name);
                }
                None => inventory.ignored.push(name),
            }
        }
        inventory
    }

    /// List `dir` and classify every regular file in it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the directory cannot be read.
    pub async fn scan(dir: &Path) -> Result<Self, StorageError> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_owned());
            }
        }
        names.sort();
        Ok(Self::from_file_names(names))
    }

    /// Indices that have both a real and a fake image.
    #[must_use]
    pub fn paired_indices(&self) -> Vec<u32> {
        self.real
            .keys()
            .filter(|index| self.fake.contains_key(index))
            .copied()
            .collect()
    }

    /// Indices present on only one side.
    #[must_use]
    pub fn unmatched_indices(&self) -> Vec<(ImageKind, u32)> {
        let real = self
            .real
            .keys()
            .filter(|index| !self.fake.contains_key(index))
            .map(|index| (ImageKind::Real, *index));
        let fake = self
            .fake
            .keys()
            .filter(|index| !self.real.contains_key(index))
            .map(|index| (ImageKind::Fake, *index));
        real.chain(fake).collect()
    }

    /// Give every image a random 12-character name, keeping its extension.
    ///
    /// Updates the inventory in place and returns the renames to apply on disk.
    pub fn obfuscate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Rename> {
        let mut taken: HashSet<String> = HashSet::new();
        let mut renames = Vec::new();

        for names in [&mut self.real, &mut self.fake] {
            for name in names.values_mut() {
                let extension = Path::new(name.as_str())
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| format!(".{ext}"))
                    .unwrap_or_default();
                let new_name = loop {
                    let candidate = format!("{}{extension}", random_name(rng));
                    if taken.insert(candidate.clone()) {
                        break candidate;
                    }
                };
                renames.push(Rename {
                    from: std::mem::replace(name, new_name.clone()),
                    to: new_name,
                });
            }
        }

        renames
    }

    /// Build the catalog document, joining file names onto `prefix`.
    #[must_use]
    pub fn to_document(&self, prefix: &str, generated_at: Option<String>) -> CatalogDocument {
        let join = |name: &str| {
            let prefix = prefix.trim_end_matches('/');
            if prefix.is_empty() {
                name.to_owned()
            } else {
                format!("{prefix}/{name}")
            }
        };

        let mut images = BTreeMap::new();
        for (kind, names) in [(ImageKind::Real, &self.real), (ImageKind::Fake, &self.fake)] {
            for (index, name) in names {
                images.insert(kind.key(*index), join(name));
            }
        }

        let pairs = self
            .paired_indices()
            .into_iter()
            .filter_map(|index| {
                let real = self.real.get(&index)?;
                let fake = self.fake.get(&index)?;
                Some(PairRecord {
                    id: format!("pair_{index}"),
                    real: Some(join(real)),
                    fake: Some(join(fake)),
                    real_key: Some(ImageKind::Real.key(index)),
                    fake_key: Some(ImageKind::Fake.key(index)),
                })
            })
            .collect();

        let real_count = u32::try_from(self.real.len()).unwrap_or(u32::MAX);
        let fake_count = u32::try_from(self.fake.len()).unwrap_or(u32::MAX);
        CatalogDocument {
            metadata: Some(CatalogMetadata {
                total_images: Some(real_count.saturating_add(fake_count)),
                real_count: Some(real_count),
                fake_count: Some(fake_count),
                generated_at,
            }),
            images,
            pairs,
        }
    }
}

/// Copy every file named in `renames` into `backup_dir`, then rename it in `images_dir`.
///
/// All copies finish before the first rename, so a failed backup leaves the image
/// directory untouched. Callers write the catalog for the new names first.
///
/// # Errors
///
/// Returns `StorageError::Io` if a copy or rename fails.
pub async fn backup_and_rename(
    images_dir: &Path,
    backup_dir: &Path,
    renames: &[Rename],
) -> Result<(), StorageError> {
    tokio::fs::create_dir_all(backup_dir).await?;
    for rename in renames {
        tokio::fs::copy(images_dir.join(&rename.from), backup_dir.join(&rename.from)).await?;
    }
    for rename in renames {
        tokio::fs::rename(images_dir.join(&rename.from), images_dir.join(&rename.to)).await?;
        tracing::debug!(from = %rename.from, to = %rename.to, "renamed image");
    }
    Ok(())
}

fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..NAME_LEN)
        .map(|_| char::from(NAME_CHARSET[rng.random_range(0..NAME_CHARSET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn inventory() -> ImageInventory {
        ImageInventory::from_file_names([
            "real_0.jpg",
            "fake_0.jpg",
            "real_1.png",
            "fake_1.png",
            "real_2.jpg",
            "notes.txt",
        ])
    }

    #[test]
    fn parses_image_names() {
        assert_eq!(parse_image_name("real_12.jpg"), Some((ImageKind::Real, 12)));
        assert_eq!(parse_image_name("fake_0.png"), Some((ImageKind::Fake, 0)));
        assert_eq!(parse_image_name("fake_x.png"), None);
        assert_eq!(parse_image_name("portrait.jpg"), None);
    }

    #[test]
    fn pairs_by_index_and_reports_leftovers() {
        let inv = inventory();
        assert_eq!(inv.paired_indices(), vec![0, 1]);
        assert_eq!(inv.unmatched_indices(), vec![(ImageKind::Real, 2)]);
        assert_eq!(inv.ignored, vec!["notes.txt".to_string()]);
    }

    #[test]
    fn document_lists_pairs_and_images() {
        let doc = inventory().to_document("images/", Some("2024-01-01".into()));
        assert_eq!(doc.pairs.len(), 2);
        assert_eq!(doc.pairs[0].id, "pair_0");
        assert_eq!(doc.pairs[0].real.as_deref(), Some("images/real_0.jpg"));
        assert_eq!(doc.pairs[1].fake_key.as_deref(), Some("fake_1"));
        assert_eq!(doc.images.len(), 5);
        assert_eq!(doc.metadata.unwrap().total_images, Some(5));
    }

    #[test]
    fn obfuscate_renames_every_image_uniquely() {
        let mut inv = inventory();
        let mut rng = StdRng::seed_from_u64(7);
        let renames = inv.obfuscate(&mut rng);

        assert_eq!(renames.len(), 5);
        let targets: HashSet<_> = renames.iter().map(|r| r.to.clone()).collect();
        assert_eq!(targets.len(), 5);
        for rename in &renames {
            let ext = Path::new(&rename.from).extension().unwrap();
            assert_eq!(Path::new(&rename.to).extension().unwrap(), ext);
            assert_eq!(rename.to.len(), NAME_LEN + 1 + ext.len());
            assert!(parse_image_name(&rename.to).is_none());
        }
        assert_eq!(inv.paired_indices(), vec![0, 1]);
        assert!(!inv.real[&0].starts_with("real_"));
    }
}
