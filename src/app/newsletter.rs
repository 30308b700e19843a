use crate::domain::ports::SessionStore;
use std::time::Duration;

pub const SEEN_NEWSLETTER_KEY: &str = "hasSeenNewsletter";

/// How long the home page waits before opening the prompt.
pub const PROMPT_DELAY: Duration = Duration::from_millis(1500);

/// One-time newsletter prompt. The "already seen" flag lives in the session
/// store handed in by the caller.
pub struct NewsletterPrompt<'a> {
    session: &'a dyn SessionStore,
}

impl<'a> NewsletterPrompt<'a> {
    pub fn new(session: &'a dyn SessionStore) -> Self {
        Self { session }
    }

    pub fn should_show(&self) -> bool {
        self.session.get(SEEN_NEWSLETTER_KEY).is_none()
    }

    pub fn dismiss(&self) {
        tracing::debug!("newsletter prompt dismissed");
        self.session.set(SEEN_NEWSLETTER_KEY, "true");
    }

    pub fn mark_subscribed(&self) {
        tracing::debug!("newsletter subscription recorded for this session");
        self.session.set(SEEN_NEWSLETTER_KEY, "true");
    }
}
