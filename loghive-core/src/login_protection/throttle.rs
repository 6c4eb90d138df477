use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::*;

use super::guard::InjectionGuard;
use crate::auth::{CredentialError, CredentialProvider, UserRecord};
use crate::entries::EntryStore;

#[derive(Debug, Clone, Copy)]
struct AttemptRecord {
    tries: u32,
    locked: bool,
    lock_until: DateTime<Utc>,
}

impl AttemptRecord {
    fn clean() -> Self {
        Self {
            tries: 0,
            locked: false,
            lock_until: DateTime::<Utc>::MIN_UTC,
        }
    }
}

/// Result of one login attempt, mapped to a response by the caller.
#[derive(Debug)]
pub enum LoginOutcome {
    Success(UserRecord),
    /// Credentials rejected, address not (yet) locked.
    Failed,
    /// Address is locked out, or this failure crossed the threshold.
    Locked,
    /// The attempt could not be evaluated at all.
    BadRequest,
}

/// Per-address failed login accounting in front of a credential provider.
///
/// Lockouts expire lazily: an address stays marked until its next attempt
/// after the deadline, which wipes the record. All state for one attempt is
/// read and written while the caller holds the throttle, so two concurrent
/// attempts from one address cannot both slip under the threshold.
pub struct LoginThrottle {
    attempts: HashMap<IpAddr, AttemptRecord>,
    guard: InjectionGuard,
    max_tries: u32,
    lockout: chrono::Duration,
    store: Arc<Mutex<EntryStore>>,
}

impl LoginThrottle {
    pub fn new(
        guard: InjectionGuard,
        max_tries: u32,
        lockout: Duration,
        store: Arc<Mutex<EntryStore>>,
    ) -> Self {
        Self {
            attempts: HashMap::new(),
            guard,
            max_tries,
            lockout: chrono::Duration::seconds(lockout.as_secs() as i64),
            store,
        }
    }

    /// Evaluates one login attempt from `addr`. A locked address is turned
    /// away before the credentials are looked at.
    pub async fn attempt(
        &mut self,
        addr: IpAddr,
        identifier: &str,
        secret: &str,
        provider: &dyn CredentialProvider,
    ) -> LoginOutcome {
        let now = Utc::now();
        if let Some(record) = self.attempts.get(&addr).copied() {
            if record.locked {
                if record.lock_until > now {
                    debug!(%addr, "Rejecting login attempt from locked address");
                    return LoginOutcome::Locked;
                }
                self.attempts.remove(&addr);
            }
        }

        let sanitized = match self.guard.sanitize(&[identifier, secret]) {
            Ok(sanitized) => sanitized,
            Err(_) => {
                warn!(%addr, identifier, "Injection attempt in login credentials");
                self.store.lock().await.add_internal(
                    "Critical",
                    &format!("Login injection attempt from {addr} as '{identifier}'"),
                    None,
                );
                return if self.register_failure(addr, now).await {
                    LoginOutcome::Locked
                } else {
                    LoginOutcome::Failed
                };
            }
        };

        match provider.authenticate(&sanitized[0], &sanitized[1]).await {
            Ok(user) => {
                self.attempts.remove(&addr);
                LoginOutcome::Success(user)
            }
            Err(error @ (CredentialError::NoSuchRecord | CredentialError::MalformedQuery(_))) => {
                if matches!(error, CredentialError::MalformedQuery(_)) {
                    warn!(%addr, ?error, "Credential query rejected");
                }
                if self.register_failure(addr, now).await {
                    LoginOutcome::Locked
                } else {
                    LoginOutcome::Failed
                }
            }
            Err(error) => {
                warn!(%addr, ?error, "Login attempt could not be evaluated");
                self.store.lock().await.add_internal(
                    "Error",
                    &format!("Login check for '{identifier}' failed: '{error}'"),
                    None,
                );
                self.register_failure(addr, now).await;
                LoginOutcome::BadRequest
            }
        }
    }

    /// Records one failure and returns true when this failure crossed the
    /// lockout threshold.
    async fn register_failure(&mut self, addr: IpAddr, now: DateTime<Utc>) -> bool {
        let record = self.attempts.entry(addr).or_insert_with(AttemptRecord::clean);
        record.tries += 1;
        if record.tries < self.max_tries {
            return false;
        }
        record.locked = true;
        record.lock_until = now + self.lockout;
        let tries = record.tries;
        info!(%addr, tries, "Address locked out after failed login attempts");
        self.store.lock().await.add_internal(
            "Warning",
            &format!("Client {addr} locked out after {tries} failed login attempts"),
            None,
        );
        true
    }
}
