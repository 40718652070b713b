//! Identity change feeds.
//!
//! Anything that renders the current user (a navbar, the sidebar header)
//! follows an [`IdentityFeed`]. [`PushFeed`] reacts to session events from
//! this process; [`PollingFeed`] re-reads the store on an interval and so
//! also sees writes made by another process sharing the session file.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::warn;

pub use super::context::IdentitySnapshot;
use super::context::{SessionContext, SessionEvent};

#[async_trait]
pub trait IdentityFeed: Send {
    /// The current snapshot on the first call, then each time it changes.
    /// `None` once the feed can no longer produce updates.
    async fn next(&mut self) -> Option<IdentitySnapshot>;
}

pub struct PushFeed {
    ctx: SessionContext,
    rx: broadcast::Receiver<SessionEvent>,
    primed: bool,
}

impl PushFeed {
    pub fn new(ctx: SessionContext) -> Self {
        let rx = ctx.subscribe();
        Self { ctx, rx, primed: false }
    }

    async fn current(&self) -> Option<IdentitySnapshot> {
        match self.ctx.snapshot().await {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(error = %e, "identity snapshot failed");
                None
            }
        }
    }
}

#[async_trait]
impl IdentityFeed for PushFeed {
    async fn next(&mut self) -> Option<IdentitySnapshot> {
        if !self.primed {
            self.primed = true;
            return self.current().await;
        }
        loop {
            match self.rx.recv().await {
                Ok(SessionEvent::OpenSidebar) => continue,
                Ok(_) | Err(RecvError::Lagged(_)) => return self.current().await,
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

pub struct PollingFeed {
    ctx: SessionContext,
    ticker: Interval,
    last: Option<IdentitySnapshot>,
}

impl PollingFeed {
    pub fn new(ctx: SessionContext, every: Duration) -> Self {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { ctx, ticker, last: None }
    }
}

#[async_trait]
impl IdentityFeed for PollingFeed {
    async fn next(&mut self) -> Option<IdentitySnapshot> {
        loop {
            self.ticker.tick().await;
            if let Err(e) = self.ctx.refresh().await {
                warn!(error = %e, "session refresh failed");
            }
            let snap = match self.ctx.snapshot().await {
                Ok(s) => s,
                Err(e) => {
                    warn!(error = %e, "identity snapshot failed");
                    continue;
                }
            };
            if self.last.as_ref() != Some(&snap) {
                self.last = Some(snap.clone());
                return Some(snap);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::Profile;
    use tokio::time::timeout;

    fn named(name: &str) -> Profile { Profile { name: name.into(), ..Profile::default() } }

    #[tokio::test]
    async fn push_feed_follows_profile_saves() {
        let ctx = SessionContext::in_memory();
        let mut feed = PushFeed::new(ctx.clone());
        assert_eq!(feed.next().await, Some(IdentitySnapshot::default()));

        ctx.publish(SessionEvent::OpenSidebar);
        ctx.store_profile(&named("Ann")).await.unwrap();
        let snap = timeout(Duration::from_secs(1), feed.next()).await.unwrap().unwrap();
        assert_eq!(snap.profile.unwrap().name, "Ann");
    }

    #[tokio::test]
    async fn polling_feed_reports_only_changes() {
        let ctx = SessionContext::in_memory();
        let mut feed = PollingFeed::new(ctx.clone(), Duration::from_millis(10));
        assert_eq!(feed.next().await, Some(IdentitySnapshot::default()));

        ctx.set_json(crate::session::keys::USER_PROFILE, &named("Bo")).await.unwrap();
        let snap = timeout(Duration::from_secs(1), feed.next()).await.unwrap().unwrap();
        assert_eq!(snap.profile.unwrap().name, "Bo");

        assert!(timeout(Duration::from_millis(50), feed.next()).await.is_err());
    }
}
