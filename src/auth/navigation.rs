//! Navigation capability
//!
//! In the browser this is a full-page redirect. Outside a browser it is
//! whatever the host application decides "go to the login page" means.

use tracing::warn;

/// Requests a full navigation to an application path
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, target: &str) {
        self(target);
    }
}

/// Navigator that only logs the request
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, target: &str) {
        warn!(path = target, "Session expired, sign in again");
    }
}
