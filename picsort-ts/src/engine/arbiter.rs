//! Session arbitration
//!
//! The filesystem and the classifier are mutated in place with no
//! per-user isolation, so at most one client may hold the working token
//! at any instant. A crashed or closed client is reclaimed through the
//! heartbeat timeout rather than an explicit release call; rejected
//! acquirers simply try again later, nothing is queued.

use crate::error::{Error, Result};
use std::time::{Duration, Instant};
use tracing::info;
use uuid::Uuid;

/// The single editing session slot
#[derive(Debug, Clone)]
struct Session {
    token: Uuid,
    last_heartbeat: Instant,
}

/// Grants and validates the exclusive working token
pub struct SessionArbiter {
    timeout: Duration,
    active: Option<Session>,
}

impl SessionArbiter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            active: None,
        }
    }

    fn is_expired(&self, session: &Session) -> bool {
        session.last_heartbeat.elapsed() > self.timeout
    }

    /// Grant a new token if no live session exists
    ///
    /// A session whose heartbeat lapsed is reclaimed here; a live one
    /// causes `SessionBusy`.
    pub fn acquire(&mut self) -> Result<Uuid> {
        if let Some(active) = &self.active {
            if !self.is_expired(active) {
                return Err(Error::SessionBusy);
            }
            info!("Reclaiming expired session {}", active.token);
        }

        let token = Uuid::new_v4();
        self.active = Some(Session {
            token,
            last_heartbeat: Instant::now(),
        });
        info!("Session granted: {}", token);
        Ok(token)
    }

    /// Refresh the active session's heartbeat
    ///
    /// Fails with `SessionExpired` when the token does not match the
    /// active session or the session already timed out; the client must
    /// re-acquire.
    pub fn heartbeat(&mut self, token: Uuid) -> Result<Uuid> {
        match &mut self.active {
            Some(active) if active.token == token => {
                if active.last_heartbeat.elapsed() > self.timeout {
                    return Err(Error::SessionExpired);
                }
                active.last_heartbeat = Instant::now();
                Ok(token)
            }
            _ => Err(Error::SessionExpired),
        }
    }

    /// Precondition check for every other engine operation
    pub fn authorize(&self, token: Uuid) -> Result<()> {
        match &self.active {
            Some(active) if active.token == token && !self.is_expired(active) => Ok(()),
            _ => Err(Error::Unauthorized),
        }
    }
}
