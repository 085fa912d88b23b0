use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use exif::{In, Reader, Tag, Value};
use log::{debug, warn};
use raylib::prelude::*;
use thiserror::Error;

use crate::item::Item;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("failed to create texture for {path}: {reason}")]
    Upload { path: String, reason: String },
}

/// Size of the generated stand-in for images that fail to load.
const PLACEHOLDER_SIZE: i32 = 64;

// --- Load Image, Apply EXIF Rotation, Create Texture ---
pub fn load_texture_with_exif_rotation(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    image_path: &Path,
) -> Result<Texture2D, MediaError> {
    let path = image_path.display().to_string();
    let file_bytes = fs::read(image_path).map_err(|source| MediaError::Read { path: path.clone(), source })?;

    let mut orientation = 1; // Default: no rotation

    // EXIF only works reliably for JPEG
    let extension = image_path.extension().and_then(|s| s.to_str()).unwrap_or("").to_lowercase();
    if extension == "jpg" || extension == "jpeg" {
        match Reader::new().read_from_container(&mut Cursor::new(&file_bytes)) {
            Ok(exif) => {
                if let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) {
                    if let Value::Short(values) = &field.value {
                        if let Some(value) = values.first() {
                            orientation = *value;
                        }
                    }
                }
            }
            Err(e) => debug!("No EXIF data for {}: {}", path, e),
        }
    }

    let mut image = Image::load_image_from_mem(&(".".to_string() + &extension), &file_bytes)
        .map_err(|e| MediaError::Decode { path: path.clone(), reason: e.to_string() })?;

    // 3 = 180 deg, 6 = 90 deg CW, 8 = 90 deg CCW. Flipped variants are ignored.
    match orientation {
        3 => {
            image.rotate_cw();
            image.rotate_cw();
        }
        6 => image.rotate_cw(),
        8 => image.rotate_ccw(),
        _ => {}
    }

    rl.load_texture_from_image(thread, &image)
        .map_err(|e| MediaError::Upload { path, reason: e.to_string() })
}

/// Flat stand-in colour. Cards get a tint matching their name.
pub fn placeholder_color(url: &str) -> Color {
    let name = url.to_lowercase();
    if name.contains("pink") {
        Color::new(236, 72, 153, 255)
    } else if name.contains("red") {
        Color::new(220, 38, 38, 255)
    } else if name.contains("gray") || name.contains("grey") {
        Color::new(107, 114, 128, 255)
    } else {
        Color::new(30, 41, 59, 255)
    }
}

/// Textures for every media URL in a story, uploaded once up front.
pub struct TextureCache {
    textures: HashMap<String, Texture2D>,
}

impl TextureCache {
    pub fn load(rl: &mut RaylibHandle, thread: &RaylibThread, items: &[Item]) -> Self {
        let mut textures = HashMap::new();
        for item in items {
            if textures.contains_key(&item.media_url) {
                continue;
            }
            let texture = match load_texture_with_exif_rotation(rl, thread, Path::new(&item.media_url)) {
                Ok(texture) => Some(texture),
                Err(e) => {
                    warn!("Using placeholder for {}: {}", item.media_url, e);
                    let image = Image::gen_image_color(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, placeholder_color(&item.media_url));
                    match rl.load_texture_from_image(thread, &image) {
                        Ok(texture) => Some(texture),
                        Err(e) => {
                            warn!("Placeholder texture failed too: {}", e);
                            None
                        }
                    }
                }
            };
            if let Some(texture) = texture {
                textures.insert(item.media_url.clone(), texture);
            }
        }
        debug!("Uploaded {} textures", textures.len());
        Self { textures }
    }

    pub fn get(&self, url: &str) -> Option<&Texture2D> {
        self.textures.get(url)
    }
}
