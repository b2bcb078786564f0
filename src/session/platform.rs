//! Host platform capabilities (notifications, window control).
//!
//! The platform is chosen once at startup. When no host platform is
//! present the session talks to `NoopPlatform` and never checks again.

use tracing::info;

/// What the embedding platform can do for a session.
pub trait Platform: Send {
    /// Show a short message to the user.
    fn notify(&mut self, message: &str);

    /// Ask the host to give the session its full viewport.
    fn expand(&mut self);

    /// Ask the host to close the session view.
    fn close_session(&mut self);

    fn name(&self) -> &str;
}

/// Stand-in used when no host platform is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPlatform;

impl Platform for NoopPlatform {
    fn notify(&mut self, _message: &str) {}

    fn expand(&mut self) {}

    fn close_session(&mut self) {}

    fn name(&self) -> &str {
        "none"
    }
}

/// Terminal host: notifications go to stderr and the log.
#[derive(Debug, Default)]
pub struct ConsolePlatform {
    notified: usize,
}

impl ConsolePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of notifications shown so far.
    pub fn notified(&self) -> usize {
        self.notified
    }
}

impl Platform for ConsolePlatform {
    fn notify(&mut self, message: &str) {
        self.notified += 1;
        info!(message, "platform notification");
        eprintln!("** {message}");
    }

    fn expand(&mut self) {
        info!("platform expand requested");
    }

    fn close_session(&mut self) {
        info!("platform close requested");
    }

    fn name(&self) -> &str {
        "console"
    }
}

/// Pick the platform implementation once, from configuration.
pub fn detect(enabled: bool) -> Box<dyn Platform> {
    if enabled {
        Box::new(ConsolePlatform::new())
    } else {
        Box::new(NoopPlatform)
    }
}
