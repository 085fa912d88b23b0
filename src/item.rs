use std::time::Duration;

use log::debug;
use rand::Rng;
use serde::Deserialize;

use crate::constants::*;
use crate::source::PhotoRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// A photo.
    Content,
    /// A card shown before the photo it describes.
    Interstitial { caption: Option<String> },
}

/// One unit of playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub media_url: String,
    pub audio_url: String,
    pub kind: ItemKind,
}

impl Item {
    pub fn content(id: impl Into<String>, media_url: impl Into<String>, audio_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            media_url: media_url.into(),
            audio_url: audio_url.into(),
            kind: ItemKind::Content,
        }
    }

    pub fn interstitial(
        id: impl Into<String>,
        background: impl Into<String>,
        audio_url: impl Into<String>,
        caption: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            media_url: background.into(),
            audio_url: audio_url.into(),
            kind: ItemKind::Interstitial { caption },
        }
    }

    pub fn is_interstitial(&self) -> bool {
        matches!(self.kind, ItemKind::Interstitial { .. })
    }

    pub fn caption(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Interstitial { caption } => caption.as_deref(),
            ItemKind::Content => None,
        }
    }

    /// The part of the caption visible after `elapsed` of item time, one
    /// character per [`CAPTION_CHAR_INTERVAL`].
    pub fn revealed_caption(&self, elapsed: Duration) -> &str {
        let Some(caption) = self.caption() else {
            return "";
        };
        let shown = (elapsed.as_millis() / CAPTION_CHAR_INTERVAL.as_millis()) as usize;
        match caption.char_indices().nth(shown) {
            Some((end, _)) => &caption[..end],
            None => caption,
        }
    }
}

/// Structured description returned by the image-analysis service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageDescription {
    pub description: String,
    pub objects: Vec<String>,
    pub colors: Vec<String>,
    pub mood: String,
    pub activities: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Turns a stored image label into caption text. Labels holding an
/// analysis JSON object contribute its description; anything else is
/// taken as written.
pub fn caption_from_label(label: Option<&str>) -> Option<String> {
    let label = label?.trim();
    if label.is_empty() {
        return None;
    }
    if label.starts_with('{') {
        match serde_json::from_str::<ImageDescription>(label) {
            Ok(analysis) if !analysis.description.trim().is_empty() => {
                debug!(
                    "Analysis: mood {:?}, objects {:?}, colors {:?}, activities {:?}, music {:?}",
                    analysis.mood, analysis.objects, analysis.colors, analysis.activities, analysis.suggestions
                );
                return Some(analysis.description.trim().to_string());
            }
            Ok(_) => return None,
            Err(e) => debug!("Label is not an analysis object, using it verbatim: {}", e),
        }
    }
    Some(label.to_string())
}

/// Expands photo records into the played sequence: each photo is preceded
/// by a card that shares its music, so the track starts on the card.
/// Item ids carry the record's position, so repeated record ids stay unique.
pub fn expand_records<R: Rng>(records: &[PhotoRecord], rng: &mut R) -> Vec<Item> {
    let mut items = Vec::with_capacity(records.len() * 2);
    for (position, record) in records.iter().enumerate() {
        let background = match &record.card_image {
            Some(card) if !card.trim().is_empty() => card.clone(),
            _ => CARD_BACKGROUNDS[rng.random_range(0..CARD_BACKGROUNDS.len())].to_string(),
        };
        items.push(Item::interstitial(
            format!("card-{}-{}", position, record.id),
            background,
            record.music_url.clone(),
            caption_from_label(record.image_label_claude.as_deref()),
        ));
        items.push(Item::content(
            format!("photo-{}-{}", position, record.id),
            record.image_url.clone(),
            record.music_url.clone(),
        ));
    }
    items
}
