/// Observable state of a playback session, derived from its flags.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PlaybackState {
    Playing,       // Clock running on the current item
    Paused,        // Clock stopped, progress preserved
    Transitioning, // Index change decided, waiting out the settle delay
    Finished,      // Ran past the last item, waits for replay
}
