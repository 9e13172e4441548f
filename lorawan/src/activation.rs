//! Network activation
//!
//! OTAA activation is a two-phase protocol: [`Activation::join`] queues a
//! join request and the outcome arrives later as an MLME join confirm,
//! forwarded to [`Activation::on_join_outcome`]. ABP activation installs
//! the pre-provisioned session and completes synchronously.
//!
//! Failed join attempts are retried a bounded number of times. The retry is
//! never issued from inside the confirm handler: the outcome returns
//! [`JoinProgress::RetryScheduled`] and the owner arms a timer that calls
//! [`Activation::retry`] once the interval has elapsed.

use core::time::Duration;

use log::{debug, info, warn};

use crate::app::Application;
use crate::config::device::{AbpSession, ActivationMode, DeviceIdentity, JoinRequest};
use crate::config::params::JoinRetryPolicy;
use crate::error::DeviceError;
use crate::mac::MacEngine;

/// Network session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// No session, no join in progress
    NotJoined,
    /// Join request queued or retry pending
    Joining,
    /// Session established
    Joined,
}

/// What happened as a result of an activation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinProgress {
    /// A join request was queued, the outcome arrives later
    Submitted,
    /// The session is established
    Joined,
    /// The attempt failed, retry after the given delay
    RetryScheduled(Duration),
    /// The retry budget is exhausted
    GaveUp,
    /// Nothing to do in the current state
    Ignored,
}

/// Activation controller
#[derive(Debug, Clone)]
pub struct Activation {
    state: SessionState,
    policy: JoinRetryPolicy,
    join_trials: u8,
    failures: u8,
    retry_pending: bool,
    last_request: Option<JoinRequest>,
}

impl Activation {
    /// Create a new activation controller
    pub fn new(policy: JoinRetryPolicy, join_trials: u8) -> Self {
        Self {
            state: SessionState::NotJoined,
            policy,
            join_trials,
            failures: 0,
            retry_pending: false,
            last_request: None,
        }
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check if the session is established
    pub fn is_joined(&self) -> bool {
        self.state == SessionState::Joined
    }

    /// Check if a retry is waiting for its timer
    pub fn retry_pending(&self) -> bool {
        self.retry_pending
    }

    /// Failed join attempts since the last application-initiated join
    pub fn failures(&self) -> u8 {
        self.failures
    }

    /// Retry policy in use
    pub fn policy(&self) -> JoinRetryPolicy {
        self.policy
    }

    /// Last join request handed to the MAC engine
    pub fn last_request(&self) -> Option<&JoinRequest> {
        self.last_request.as_ref()
    }

    /// Start activation on behalf of the application
    ///
    /// Resets the retry budget. Does nothing once joined.
    pub fn join<M: MacEngine, A: Application>(
        &mut self,
        identity: &DeviceIdentity,
        mac: &mut M,
        app: &mut A,
    ) -> Result<JoinProgress, DeviceError<M::Error>> {
        if self.is_joined() {
            debug!("join requested while already joined");
            return Ok(JoinProgress::Ignored);
        }

        let progress = self.activate(identity, mac, app)?;
        self.failures = 0;
        self.retry_pending = false;
        Ok(progress)
    }

    /// Issue the pending retry
    ///
    /// A retry the engine rejects counts as a failed attempt.
    pub fn retry<M: MacEngine, A: Application>(
        &mut self,
        identity: &DeviceIdentity,
        mac: &mut M,
        app: &mut A,
    ) -> JoinProgress {
        if !self.retry_pending {
            return JoinProgress::Ignored;
        }
        self.retry_pending = false;

        info!("join retry {} of {}", self.failures, self.policy.max_retries);
        match self.activate(identity, mac, app) {
            Ok(progress) => progress,
            Err(_) => {
                warn!("join retry rejected by MAC engine");
                self.on_join_outcome(false, app)
            }
        }
    }

    /// Handle the outcome of a join request
    pub fn on_join_outcome<A: Application>(&mut self, success: bool, app: &mut A) -> JoinProgress {
        if self.is_joined() {
            debug!("join outcome ignored, already joined");
            return JoinProgress::Ignored;
        }

        if success {
            info!("network joined");
            self.state = SessionState::Joined;
            self.failures = 0;
            self.retry_pending = false;
            app.on_joined();
            return JoinProgress::Joined;
        }

        if self.state != SessionState::Joining {
            debug!("join failure ignored, no join in progress");
            return JoinProgress::Ignored;
        }

        self.failures = self.failures.saturating_add(1);
        if self.failures <= self.policy.max_retries {
            warn!(
                "join attempt {} failed, retrying in {:?}",
                self.failures, self.policy.interval
            );
            self.retry_pending = true;
            JoinProgress::RetryScheduled(self.policy.interval)
        } else {
            warn!("join failed after {} attempts", self.failures);
            self.state = SessionState::NotJoined;
            self.retry_pending = false;
            app.on_join_failed();
            JoinProgress::GaveUp
        }
    }

    fn activate<M: MacEngine, A: Application>(
        &mut self,
        identity: &DeviceIdentity,
        mac: &mut M,
        app: &mut A,
    ) -> Result<JoinProgress, M::Error> {
        match identity.mode {
            ActivationMode::Otaa => {
                let request = JoinRequest::from_identity(identity, self.join_trials);
                mac.submit_join(&request)?;
                debug!("join request queued");
                self.last_request = Some(request);
                self.state = SessionState::Joining;
                Ok(JoinProgress::Submitted)
            }
            ActivationMode::Abp => {
                mac.install_session(&AbpSession::from(identity))?;
                info!("ABP session installed, device address {:08X}", identity.dev_addr);
                self.state = SessionState::Joined;
                app.on_joined();
                Ok(JoinProgress::Joined)
            }
        }
    }
}
