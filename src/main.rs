use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use raylib::prelude::*;

mod audio;
mod config;
mod constants;
mod controller;
mod fullscreen;
mod item;
mod platform;
mod progress_clock;
mod source;
mod state;
mod texture_loader;
mod timer;
mod viewer;

#[cfg(test)]
mod test_utils;

use crate::config::Args;
use crate::constants::*;
use crate::controller::PlaybackController;
use crate::fullscreen::FullscreenAdapter;
use crate::item::expand_records;
use crate::platform::{RaylibMusicSink, fullscreen_candidates};
use crate::source::{load_records, records_from_dir, records_or_fallback};
use crate::texture_loader::TextureCache;
use crate::timer::MonotonicClock;
use crate::viewer::{Hit, Layout, Viewer};

type Session<'aud> = PlaybackController<RaylibMusicSink<'aud>, RaylibHandle>;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.session_config().context("invalid arguments")?;

    // --- Load Story ---
    let loaded = match (&args.records, &args.dir, &args.music) {
        (Some(manifest), _, _) => load_records(manifest),
        (None, Some(dir), Some(music)) => records_from_dir(dir, music),
        _ => Ok(Vec::new()),
    };
    let records = records_or_fallback(loaded);
    let items = match args.seed {
        Some(seed) => expand_records(&records, &mut StdRng::seed_from_u64(seed)),
        None => expand_records(&records, &mut rand::rng()),
    };

    let (mut rl, thread) = raylib::init()
        .size(args.width, args.height)
        .title("Momentra")
        .vsync()
        .resizable()
        .build();
    rl.set_target_fps(FPS);
    rl.set_trace_log(TraceLogLevel::LOG_ERROR);
    // Escape leaves fullscreen instead of closing the window
    rl.set_exit_key(None);

    let audio_device = match RaylibAudio::init_audio_device() {
        Ok(device) => Some(device),
        Err(e) => {
            warn!("Audio device unavailable, playing without sound: {:?}", e);
            None
        }
    };

    let mut viewer = Viewer::new(TextureCache::load(&mut rl, &thread, &items));
    let mut session: Session<'_> = PlaybackController::new(
        items,
        config,
        Box::new(MonotonicClock),
        RaylibMusicSink::new(audio_device.as_ref()),
        FullscreenAdapter::new(fullscreen_candidates()),
    )
    .context("cannot start the story")?;

    if args.fullscreen {
        session.toggle_fullscreen(&mut rl);
    }

    // --- Main Loop ---
    while !rl.window_should_close() {
        let dt = rl.get_frame_time();
        let layout = Layout::new(
            rl.get_screen_width(),
            rl.get_screen_height(),
            session.is_fullscreen(),
            session.sequence().len(),
        );

        handle_input(&mut rl, &mut session, &layout);

        session.update();
        if let Some(fullscreen) = session.observe_fullscreen(&rl) {
            info!("Fullscreen: {} ({:?})", fullscreen, session.fullscreen_mode());
        }
        viewer.update(dt, &session);

        let mut d = rl.begin_drawing(&thread);
        viewer.draw(&mut d, &layout, &session);
    }

    session.teardown();
    Ok(())
}

fn handle_input(rl: &mut RaylibHandle, session: &mut Session<'_>, layout: &Layout) {
    if rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT) {
        let position = rl.get_mouse_position();
        match layout.hit(position.x, position.y) {
            Hit::ProgressBar(index) => session.go_to(index),
            Hit::Mute => {
                session.toggle_mute();
            }
            Hit::Fullscreen => session.toggle_fullscreen(rl),
            Hit::Story(_) if session.is_finished() => session.replay(),
            Hit::Story(x) => session.tap(x),
            Hit::Outside => {}
        }
    }

    if rl.is_key_pressed(KeyboardKey::KEY_SPACE) {
        session.toggle_pause();
    }
    if rl.is_key_pressed(KeyboardKey::KEY_RIGHT) {
        session.next();
    }
    if rl.is_key_pressed(KeyboardKey::KEY_LEFT) {
        session.previous();
    }
    if rl.is_key_pressed(KeyboardKey::KEY_M) {
        session.toggle_mute();
    }
    if rl.is_key_pressed(KeyboardKey::KEY_F) {
        session.toggle_fullscreen(rl);
    }
    if rl.is_key_pressed(KeyboardKey::KEY_ESCAPE) && session.is_fullscreen() {
        session.toggle_fullscreen(rl);
    }
    if rl.is_key_pressed(KeyboardKey::KEY_R) {
        session.replay();
    }
}
