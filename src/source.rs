use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse records in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no image files found in directory {0:?}")]
    NoImages(PathBuf),
    #[error("no records in {0:?}")]
    Empty(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// One row of the photos table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhotoRecord {
    pub id: RecordId,
    pub image_url: String,
    pub music_url: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub card_image: Option<String>,
    #[serde(default)]
    pub image_label_claude: Option<String>,
}

// --- Load records from a JSON manifest (an array of rows) ---
pub fn load_records(manifest: &Path) -> Result<Vec<PhotoRecord>, SourceError> {
    let text = fs::read_to_string(manifest).map_err(|source| SourceError::Io {
        path: manifest.to_path_buf(),
        source,
    })?;
    let mut records: Vec<PhotoRecord> = serde_json::from_str(&text).map_err(|source| SourceError::Parse {
        path: manifest.to_path_buf(),
        source,
    })?;
    if records.is_empty() {
        return Err(SourceError::Empty(manifest.to_path_buf()));
    }

    // Media paths in the manifest are relative to the manifest itself
    if let Some(base) = manifest.parent() {
        for record in records.iter_mut() {
            record.image_url = resolve_media(base, &record.image_url);
            record.music_url = resolve_media(base, &record.music_url);
            if let Some(card) = record.card_image.as_mut() {
                *card = resolve_media(base, card);
            }
        }
    }
    info!("Loaded {} records from {:?}", records.len(), manifest);
    Ok(records)
}

fn resolve_media(base: &Path, url: &str) -> String {
    let path = Path::new(url);
    if url.is_empty() || url.contains("://") || path.is_absolute() {
        url.to_string()
    } else {
        base.join(path).to_string_lossy().into_owned()
    }
}

// --- Helper: Load and Sort Image Paths ---
pub fn load_sorted_image_paths(dir_path: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let io_error = |source| SourceError::Io { path: dir_path.to_path_buf(), source };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir_path).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() {
            if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
                match ext.to_lowercase().as_str() {
                    "png" | "jpg" | "jpeg" | "bmp" | "gif" => paths.push(path),
                    _ => {}
                }
            }
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    if paths.is_empty() {
        Err(SourceError::NoImages(dir_path.to_path_buf()))
    } else {
        Ok(paths)
    }
}

/// Every image in `dir`, in file name order, all sharing one track.
pub fn records_from_dir(dir: &Path, music: &Path) -> Result<Vec<PhotoRecord>, SourceError> {
    let paths = load_sorted_image_paths(dir)?;
    info!("Found {} images in {:?}", paths.len(), dir);
    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(i, path)| PhotoRecord {
            id: RecordId::Number(i as i64 + 1),
            image_url: path.to_string_lossy().into_owned(),
            music_url: music.to_string_lossy().into_owned(),
            created_at: None,
            card_image: None,
            image_label_claude: None,
        })
        .collect())
}

pub fn fallback_records() -> Vec<PhotoRecord> {
    FALLBACK_IMAGES
        .iter()
        .enumerate()
        .map(|(i, image)| PhotoRecord {
            id: RecordId::Number(i as i64 + 1),
            image_url: image.to_string(),
            music_url: FALLBACK_MUSIC.to_string(),
            created_at: None,
            card_image: None,
            image_label_claude: None,
        })
        .collect()
}

/// Substitutes the fallback list when loading failed or found nothing.
pub fn records_or_fallback(loaded: Result<Vec<PhotoRecord>, SourceError>) -> Vec<PhotoRecord> {
    match loaded {
        Ok(records) if !records.is_empty() => records,
        Ok(_) => {
            warn!("No records available, using fallback data");
            fallback_records()
        }
        Err(e) => {
            warn!("Failed to load records, using fallback data: {}", e);
            fallback_records()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn manifest_rows_resolve_relative_media() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("days.json");
        fs::write(
            &manifest,
            r#"[
                {"id": 1, "image_url": "photos/a.jpg", "music_url": "https://cdn.example/a.mp3",
                 "created_at": "2025-06-01T10:00:00Z", "image_label_claude": "Morning run"},
                {"id": "b2", "image_url": "/abs/b.jpg", "music_url": "b.mp3", "card_image": "cards/pink.png"}
            ]"#,
        )
        .unwrap();

        let records = load_records(&manifest).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, RecordId::Number(1));
        assert_eq!(Path::new(&records[0].image_url), dir.path().join("photos/a.jpg"));
        assert_eq!(records[0].music_url, "https://cdn.example/a.mp3");
        assert_eq!(records[0].image_label_claude.as_deref(), Some("Morning run"));
        assert_eq!(records[1].id.to_string(), "b2");
        assert_eq!(records[1].image_url, "/abs/b.jpg");
        assert_eq!(Path::new(records[1].card_image.as_deref().unwrap()), dir.path().join("cards/pink.png"));
    }

    #[test]
    fn bad_or_empty_manifests_fall_back() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.json");
        fs::write(&empty, "[]").unwrap();
        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{").unwrap();

        assert!(matches!(load_records(&empty), Err(SourceError::Empty(_))));
        assert!(matches!(load_records(&broken), Err(SourceError::Parse { .. })));
        assert!(matches!(load_records(&dir.path().join("missing.json")), Err(SourceError::Io { .. })));

        let records = records_or_fallback(load_records(&broken));
        assert_eq!(records, fallback_records());
        assert_eq!(records.len(), FALLBACK_IMAGES.len());
    }

    #[test]
    fn directory_images_are_sorted_and_share_the_track() {
        let dir = tempdir().unwrap();
        for name in ["b.JPG", "a.png", "notes.txt", "c.gif"] {
            File::create(dir.path().join(name)).unwrap();
        }
        fs::create_dir(dir.path().join("sub.jpg")).unwrap();

        let records = records_from_dir(dir.path(), Path::new("song.mp3")).unwrap();

        let names: Vec<_> = records
            .iter()
            .map(|r| Path::new(&r.image_url).file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.png", "b.JPG", "c.gif"]);
        assert!(records.iter().all(|r| r.music_url == "song.mp3"));

        let empty = tempdir().unwrap();
        assert!(matches!(load_sorted_image_paths(empty.path()), Err(SourceError::NoImages(_))));
    }
}
