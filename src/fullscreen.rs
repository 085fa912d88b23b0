use log::{debug, info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FullscreenError {
    #[error("{api} refused to {action} fullscreen: {reason}")]
    Refused {
        api: &'static str,
        action: &'static str,
        reason: String,
    },
}

/// One platform way of making the story fill the screen.
///
/// `W` is whatever handle the platform needs (the raylib window in the
/// app, a fake in tests).
pub trait FullscreenApi<W> {
    fn name(&self) -> &'static str;
    fn is_available(&self, window: &W) -> bool;
    fn request(&self, window: &mut W) -> Result<(), FullscreenError>;
    fn exit(&self, window: &mut W) -> Result<(), FullscreenError>;
    /// What the platform currently reports, independent of what we asked for.
    fn is_engaged(&self, window: &W) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenMode {
    /// Observed from the platform.
    Platform,
    /// Full-viewport layout only, state tracked by hand.
    Visual,
}

/// Tries candidate APIs in preference order and keeps one boolean in sync
/// with whatever ends up engaged.
pub struct FullscreenAdapter<W> {
    candidates: Vec<Box<dyn FullscreenApi<W>>>,
    mode: FullscreenMode,
    is_fullscreen: bool,
    observed: bool,
}

impl<W> FullscreenAdapter<W> {
    pub fn new(candidates: Vec<Box<dyn FullscreenApi<W>>>) -> Self {
        Self {
            candidates,
            mode: FullscreenMode::Platform,
            is_fullscreen: false,
            observed: false,
        }
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    pub fn mode(&self) -> FullscreenMode {
        self.mode
    }

    /// True when the layout itself has to fill the viewport.
    #[cfg(test)]
    pub fn is_visual(&self) -> bool {
        self.mode == FullscreenMode::Visual && self.is_fullscreen
    }

    fn first_available(&self, window: &W) -> Option<&dyn FullscreenApi<W>> {
        self.candidates
            .iter()
            .map(|api| api.as_ref())
            .find(|api| api.is_available(window))
    }

    pub fn enter(&mut self, window: &mut W) {
        let Some(api) = self.first_available(window) else {
            info!("No fullscreen API available, using full-viewport layout");
            self.mode = FullscreenMode::Visual;
            self.is_fullscreen = true;
            return;
        };
        debug!("Entering fullscreen through {}", api.name());
        match api.request(window) {
            // The state change arrives through observe(), measured from the
            // tracked state so an already engaged window still registers
            Ok(()) => {
                self.mode = FullscreenMode::Platform;
                self.observed = self.is_fullscreen;
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn exit(&mut self, window: &mut W) {
        if self.mode == FullscreenMode::Visual {
            self.is_fullscreen = false;
            return;
        }
        let engaged = self
            .candidates
            .iter()
            .map(|api| api.as_ref())
            .find(|api| api.is_engaged(window));
        let Some(api) = engaged.or_else(|| self.first_available(window)) else {
            self.is_fullscreen = false;
            return;
        };
        debug!("Leaving fullscreen through {}", api.name());
        if let Err(e) = api.exit(window) {
            self.fail(e);
        }
    }

    pub fn toggle(&mut self, window: &mut W) {
        if self.is_fullscreen {
            self.exit(window);
        } else {
            self.enter(window);
        }
    }

    /// The change observer: picks up platform transitions, including exits
    /// the user made outside the app. Returns the new state on a change.
    pub fn observe(&mut self, window: &W) -> Option<bool> {
        if self.mode == FullscreenMode::Visual {
            return None;
        }
        let engaged = self.candidates.iter().any(|api| api.is_engaged(window));
        if engaged == self.observed {
            return None;
        }
        self.observed = engaged;
        self.is_fullscreen = engaged;
        Some(engaged)
    }

    fn fail(&mut self, e: FullscreenError) {
        warn!("Fullscreen toggle failed: {}", e);
        self.mode = FullscreenMode::Visual;
        self.is_fullscreen = !self.is_fullscreen;
        self.observed = self.is_fullscreen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeFullscreen, FakeWindow};

    fn adapter(apis: &[&'static str]) -> FullscreenAdapter<FakeWindow> {
        FullscreenAdapter::new(
            apis.iter()
                .map(|name| Box::new(FakeFullscreen(*name)) as Box<dyn FullscreenApi<FakeWindow>>)
                .collect(),
        )
    }

    #[test]
    fn first_available_api_wins_and_state_follows_observation() {
        let mut window = FakeWindow::supporting(&["borderless"]);
        let mut fs = adapter(&["exclusive", "borderless"]);

        fs.enter(&mut window);
        assert_eq!(window.engaged.as_deref(), Some("borderless"));
        assert!(!fs.is_fullscreen());
        assert_eq!(fs.observe(&window), Some(true));
        assert!(fs.is_fullscreen());
        assert_eq!(fs.observe(&window), None);

        fs.toggle(&mut window);
        assert_eq!(window.engaged, None);
        assert_eq!(fs.observe(&window), Some(false));
        assert!(!fs.is_fullscreen());
    }

    #[test]
    fn external_exit_is_reflected() {
        let mut window = FakeWindow::supporting(&["exclusive"]);
        let mut fs = adapter(&["exclusive"]);
        fs.toggle(&mut window);
        fs.observe(&window);

        // User pressed Escape / the window manager dropped us
        window.engaged = None;
        assert_eq!(fs.observe(&window), Some(false));
        assert!(!fs.is_fullscreen());
    }

    #[test]
    fn no_api_falls_back_to_visual_fullscreen() {
        let mut window = FakeWindow::supporting(&[]);
        let mut fs = adapter(&["exclusive", "borderless"]);

        fs.toggle(&mut window);
        assert!(fs.is_fullscreen());
        assert!(fs.is_visual());
        assert_eq!(fs.observe(&window), None);

        fs.toggle(&mut window);
        assert!(!fs.is_fullscreen());
        assert_eq!(window.engaged, None);
    }

    #[test]
    fn failing_api_flips_state_directly() {
        let mut window = FakeWindow::supporting(&["exclusive"]);
        window.failing = true;
        let mut fs = adapter(&["exclusive"]);

        fs.toggle(&mut window);
        assert!(fs.is_fullscreen());
        assert_eq!(fs.mode(), FullscreenMode::Visual);
        assert_eq!(fs.observe(&window), None);

        fs.toggle(&mut window);
        assert!(!fs.is_fullscreen());
    }

    #[test]
    fn failed_exit_recovers_on_the_next_toggles() {
        let mut window = FakeWindow::supporting(&["exclusive"]);
        let mut fs = adapter(&["exclusive"]);
        fs.toggle(&mut window);
        assert_eq!(fs.observe(&window), Some(true));

        window.failing = true;
        fs.toggle(&mut window);
        assert!(!fs.is_fullscreen());
        assert_eq!(window.engaged.as_deref(), Some("exclusive"));
        window.failing = false;

        // Still engaged: the next press goes back through the platform
        fs.toggle(&mut window);
        assert_eq!(fs.mode(), FullscreenMode::Platform);
        assert_eq!(fs.observe(&window), Some(true));
        assert!(fs.is_fullscreen());

        fs.toggle(&mut window);
        assert_eq!(window.engaged, None);
        assert_eq!(fs.observe(&window), Some(false));
        assert!(!fs.is_fullscreen());
    }

    #[test]
    fn failed_enter_recovers_once_the_platform_accepts() {
        let mut window = FakeWindow::supporting(&["exclusive"]);
        window.failing = true;
        let mut fs = adapter(&["exclusive"]);

        fs.toggle(&mut window);
        fs.toggle(&mut window);
        assert!(!fs.is_fullscreen());

        window.failing = false;
        fs.toggle(&mut window);
        assert_eq!(fs.observe(&window), Some(true));
        assert!(fs.is_fullscreen());
        assert_eq!(window.engaged.as_deref(), Some("exclusive"));
    }
}
