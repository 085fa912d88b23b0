use std::time::Duration;

pub const RENDER_WIDTH: i32 = 540;            // Default window width (portrait story frame)
pub const RENDER_HEIGHT: i32 = 960;           // Default window height
pub const FPS: u32 = 60;                      // Frames per second

pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(50);          // Progress sampling period
pub const SETTLE_DELAY: Duration = Duration::from_millis(150);            // Crossfade window between slides
pub const INTERSTITIAL_DURATION: Duration = Duration::from_millis(5000);  // Cards always run this long
pub const DEFAULT_AUTO_ADVANCE_MS: u64 = 5000;                           // Photo duration unless configured
pub const CAPTION_CHAR_INTERVAL: Duration = Duration::from_millis(35);    // Caption reveal speed

pub const PREVIOUS_ZONE: f32 = 0.3;           // Taps left of this fraction go back
pub const NEXT_ZONE: f32 = 0.7;               // Taps right of this fraction go forward

pub const MUSIC_VOLUME: f32 = 0.6;

pub const CARD_BACKGROUNDS: [&str; 3] = ["grayCard.png", "pinkCard.png", "redCard.jpg"];

pub const FALLBACK_IMAGES: [&str; 5] = [
    "fallback/mountains.jpg",
    "fallback/valley.jpg",
    "fallback/forest.jpg",
    "fallback/lake.jpg",
    "fallback/meadow.jpg",
];
pub const FALLBACK_MUSIC: &str = "fallback/bell-ringing.mp3";
