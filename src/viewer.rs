use raylib::prelude::*;

use crate::audio::AudioSink;
use crate::controller::PlaybackController;
use crate::state::PlaybackState;
use crate::texture_loader::{TextureCache, placeholder_color};

const STORY_ASPECT: f32 = 9.0 / 16.0;  // Width over height of the windowed story frame
const BAR_HEIGHT: f32 = 4.0;
const BAR_GAP: f32 = 4.0;
const EDGE: f32 = 16.0;                // Inset of bars and buttons from the frame edge
const BUTTON_SIZE: f32 = 40.0;
const FADE_SECONDS: f32 = 0.15;        // Opacity ramp while crossfading
const CAPTION_FONT: i32 = 28;

/// Where a pointer press landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    ProgressBar(usize),
    Mute,
    Fullscreen,
    /// Inside the story, at this fraction of its width.
    Story(f32),
    Outside,
}

fn contains(rect: &Rectangle, x: f32, y: f32) -> bool {
    x >= rect.x && x <= rect.x + rect.width && y >= rect.y && y <= rect.y + rect.height
}

/// Screen geometry of the story for one frame.
#[derive(Debug, Clone)]
pub struct Layout {
    pub frame: Rectangle,
    pub bars: Vec<Rectangle>,
    pub mute_button: Rectangle,
    pub fullscreen_button: Rectangle,
}

impl Layout {
    /// Fullscreen fills the whole window; otherwise the story keeps a
    /// portrait frame centered in it.
    pub fn new(screen_width: i32, screen_height: i32, fill: bool, items: usize) -> Self {
        let (sw, sh) = (screen_width as f32, screen_height as f32);
        let frame = if fill {
            Rectangle::new(0.0, 0.0, sw, sh)
        } else {
            let width = sw.min(sh * STORY_ASPECT);
            let height = width / STORY_ASPECT;
            Rectangle::new((sw - width) * 0.5, (sh - height) * 0.5, width, height)
        };

        let usable = frame.width - 2.0 * EDGE - BAR_GAP * items.saturating_sub(1) as f32;
        let bar_width = (usable / items.max(1) as f32).max(1.0);
        let bars = (0..items)
            .map(|i| {
                Rectangle::new(
                    frame.x + EDGE + i as f32 * (bar_width + BAR_GAP),
                    frame.y + EDGE,
                    bar_width,
                    BAR_HEIGHT,
                )
            })
            .collect();

        let mute_button = Rectangle::new(
            frame.x + frame.width - EDGE - BUTTON_SIZE,
            frame.y + EDGE + BAR_HEIGHT + 12.0,
            BUTTON_SIZE,
            BUTTON_SIZE,
        );
        let fullscreen_button = Rectangle::new(
            frame.x + frame.width - EDGE - BUTTON_SIZE,
            frame.y + frame.height - EDGE - BUTTON_SIZE,
            BUTTON_SIZE,
            BUTTON_SIZE,
        );

        Self { frame, bars, mute_button, fullscreen_button }
    }

    pub fn hit(&self, x: f32, y: f32) -> Hit {
        if !contains(&self.frame, x, y) {
            return Hit::Outside;
        }
        if contains(&self.mute_button, x, y) {
            return Hit::Mute;
        }
        if contains(&self.fullscreen_button, x, y) {
            return Hit::Fullscreen;
        }
        // Bars are thin; accept presses a little around them
        for (i, bar) in self.bars.iter().enumerate() {
            let target = Rectangle::new(bar.x, bar.y - 8.0, bar.width + BAR_GAP, bar.height + 16.0);
            if contains(&target, x, y) {
                return Hit::ProgressBar(i);
            }
        }
        Hit::Story((x - self.frame.x) / self.frame.width)
    }
}

/// Greedy word wrap on character counts.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn with_alpha(color: Color, alpha: f32) -> Color {
    Color::new(color.r, color.g, color.b, (color.a as f32 * alpha.clamp(0.0, 1.0)) as u8)
}

/// Draws a session and keeps the crossfade state between frames.
pub struct Viewer {
    textures: TextureCache,
    opacity: f32,
}

impl Viewer {
    pub fn new(textures: TextureCache) -> Self {
        Self { textures, opacity: 1.0 }
    }

    pub fn update<A: AudioSink, W>(&mut self, dt: f32, session: &PlaybackController<A, W>) {
        let step = dt / FADE_SECONDS;
        if session.is_transitioning() {
            self.opacity = (self.opacity - step).max(0.0);
        } else {
            self.opacity = (self.opacity + step).min(1.0);
        }
    }

    pub fn draw<A: AudioSink, W>(&self, d: &mut RaylibDrawHandle, layout: &Layout, session: &PlaybackController<A, W>) {
        d.clear_background(Color::BLACK);
        let frame = layout.frame;
        let item = session.current_item();

        // --- Media ---
        match self.textures.get(&item.media_url) {
            Some(texture) => {
                // Cover the frame, cropping the overflow
                let (tw, th) = (texture.width() as f32, texture.height() as f32);
                let scale = (frame.width / tw).max(frame.height / th);
                let (cw, ch) = (frame.width / scale, frame.height / scale);
                d.draw_texture_pro(
                    texture,
                    Rectangle::new((tw - cw) * 0.5, (th - ch) * 0.5, cw, ch),
                    frame,
                    Vector2::new(0.0, 0.0),
                    0.0,
                    with_alpha(Color::WHITE, self.opacity),
                );
            }
            None => d.draw_rectangle_rec(frame, with_alpha(placeholder_color(&item.media_url), self.opacity)),
        }
        d.draw_rectangle_gradient_v(
            frame.x as i32,
            frame.y as i32,
            frame.width as i32,
            frame.height as i32,
            Color::new(0, 0, 0, 51),
            Color::new(0, 0, 0, 128),
        );

        // --- Caption on cards ---
        let caption = item.revealed_caption(session.item_elapsed());
        if !caption.is_empty() {
            let max_chars = ((frame.width - 4.0 * EDGE) / (CAPTION_FONT as f32 * 0.55)).max(8.0) as usize;
            let lines = wrap(caption, max_chars);
            let line_height = CAPTION_FONT + 8;
            let mut y = (frame.y + frame.height * 0.5) as i32 - (lines.len() as i32 * line_height) / 2;
            for line in lines {
                d.draw_text(&line, (frame.x + 2.0 * EDGE) as i32, y, CAPTION_FONT, with_alpha(Color::WHITE, self.opacity));
                y += line_height;
            }
        }

        // --- Progress bars ---
        for (i, bar) in layout.bars.iter().enumerate() {
            d.draw_rectangle_rec(*bar, Color::new(255, 255, 255, 77));
            let fill = session.bar_fill(i) / 100.0;
            if fill > 0.0 {
                d.draw_rectangle_rec(Rectangle::new(bar.x, bar.y, bar.width * fill, bar.height), Color::WHITE);
            }
        }

        // --- State overlays ---
        let (cx, cy) = (frame.x + frame.width * 0.5, frame.y + frame.height * 0.5);
        match session.state() {
            PlaybackState::Paused => {
                d.draw_rectangle_rec(frame, Color::new(0, 0, 0, 51));
                d.draw_circle(cx as i32, cy as i32, 36.0, Color::new(0, 0, 0, 153));
                d.draw_triangle(
                    Vector2::new(cx - 10.0, cy - 16.0),
                    Vector2::new(cx - 10.0, cy + 16.0),
                    Vector2::new(cx + 18.0, cy),
                    Color::WHITE,
                );
            }
            PlaybackState::Finished => {
                d.draw_rectangle_rec(frame, Color::new(0, 0, 0, 128));
                d.draw_text("Tap or press R to replay", (frame.x + 2.0 * EDGE) as i32, cy as i32, 24, Color::WHITE);
            }
            PlaybackState::Playing | PlaybackState::Transitioning => {}
        }

        // --- Controls ---
        let button_bg = Color::new(0, 0, 0, 102);
        let mute = layout.mute_button;
        d.draw_rectangle_rec(mute, button_bg);
        let label = if session.is_muted() { "OFF" } else { "ON" };
        d.draw_text(label, mute.x as i32 + 6, mute.y as i32 + 12, 16, Color::WHITE);

        let fs = layout.fullscreen_button;
        d.draw_rectangle_rec(fs, button_bg);
        let inset = if session.is_fullscreen() { 14.0 } else { 8.0 };
        d.draw_rectangle_lines(
            (fs.x + inset) as i32,
            (fs.y + inset) as i32,
            (fs.width - 2.0 * inset) as i32,
            (fs.height - 2.0 * inset) as i32,
            Color::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windowed_story_is_a_centered_portrait_frame() {
        let layout = Layout::new(1920, 1080, false, 4);
        assert_eq!(layout.frame.height, 1080.0);
        assert!((layout.frame.width - 607.5).abs() < 0.01);
        assert!((layout.frame.x - (1920.0 - 607.5) / 2.0).abs() < 0.01);

        let full = Layout::new(1920, 1080, true, 4);
        assert_eq!(full.frame.width, 1920.0);
        assert_eq!(full.frame.x, 0.0);
    }

    #[test]
    fn presses_resolve_to_controls_bars_or_zones() {
        let layout = Layout::new(540, 960, false, 3);
        let bar = layout.bars[1];
        assert_eq!(layout.hit(bar.x + 2.0, bar.y + 1.0), Hit::ProgressBar(1));

        let mute = layout.mute_button;
        assert_eq!(layout.hit(mute.x + 5.0, mute.y + 5.0), Hit::Mute);
        let fs = layout.fullscreen_button;
        assert_eq!(layout.hit(fs.x + 5.0, fs.y + 5.0), Hit::Fullscreen);

        match layout.hit(54.0, 480.0) {
            Hit::Story(x) => assert!((x - 0.1).abs() < 1e-4),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(layout.hit(-1.0, 480.0), Hit::Outside);
    }

    #[test]
    fn bars_fit_inside_the_frame() {
        let layout = Layout::new(540, 960, false, 10);
        let last = layout.bars[9];
        assert!(last.x + last.width <= layout.frame.x + layout.frame.width - EDGE + 0.01);
    }

    #[test]
    fn captions_wrap_on_words() {
        assert_eq!(wrap("a quiet morning by the lake", 12), ["a quiet", "morning by", "the lake"]);
        assert!(wrap("", 10).is_empty());
    }
}
