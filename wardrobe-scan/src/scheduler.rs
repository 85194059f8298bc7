//! Fixed-cadence driver for a scan session.
//!
//! One timer task per session. Each tick opens at most one capture-submit
//! attempt; ticks that land while an attempt is outstanding are dropped, not
//! queued. Stopping is cooperative: an attempt already on the wire finishes,
//! but its result is thrown away.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::capture::CaptureSource;
use crate::client::ScanClient;
use crate::error::ScanError;
use crate::session::{ScanEvent, ScanSession, ScanSnapshot, ScanState};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

pub type SharedSession = Arc<Mutex<ScanSession>>;

pub struct CaptureScheduler {
    client: Arc<dyn ScanClient>,
    capture: Arc<dyn CaptureSource>,
    period: Duration,
}

struct Driver {
    session: SharedSession,
    client: Arc<dyn ScanClient>,
    capture: Arc<dyn CaptureSource>,
    stop_tx: watch::Sender<bool>,
    status_tx: watch::Sender<ScanSnapshot>,
}

impl CaptureScheduler {
    pub fn new(client: Arc<dyn ScanClient>, capture: Arc<dyn CaptureSource>) -> Self {
        Self {
            client,
            capture,
            period: DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Starts `session` at `height_cm` and begins cycling. The first attempt
    /// fires immediately. Fails without capturing anything when the height is
    /// not a positive number or the interval is zero.
    pub async fn start(&self, mut session: ScanSession, height_cm: f64) -> Result<ScanHandle, ScanError> {
        if self.period.is_zero() {
            return Err(ScanError::InvalidInterval);
        }
        session.apply(ScanEvent::Start { height_cm })?;

        let (stop_tx, stop_rx) = watch::channel(false);
        let (status_tx, status_rx) = watch::channel(session.snapshot());
        let session_id = session.id();
        let session = Arc::new(Mutex::new(session));

        let driver = Arc::new(Driver {
            session: session.clone(),
            client: self.client.clone(),
            capture: self.capture.clone(),
            stop_tx,
            status_tx,
        });

        let span = info_span!("scan_session", session = %session_id);
        let task = tokio::spawn(driver.clone().run(self.period, stop_rx).instrument(span));

        Ok(ScanHandle {
            session,
            driver,
            status_rx,
            task,
        })
    }
}

impl Driver {
    fn stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }

    fn publish(&self, session: &ScanSession) {
        self.status_tx.send_replace(session.snapshot());
    }

    async fn run(self: Arc<Self>, period: Duration, mut stop_rx: watch::Receiver<bool>) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            if self.stopped() {
                break;
            }

            let mut session = self.session.lock().await;
            if session.state().is_terminal() {
                break;
            }

            match session.apply(ScanEvent::Tick) {
                Ok(_) => {}
                Err(ScanError::AttemptInFlight) => {
                    debug!("attempt still in flight, dropping tick");
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "tick rejected");
                    continue;
                }
            }
            self.publish(&session);
            let attempt = session.snapshot().attempts;
            drop(session);

            let span = info_span!("scan_cycle", attempt);
            tokio::spawn(self.clone().cycle().instrument(span));
        }

        debug!("scheduler stopped");
    }

    async fn cycle(self: Arc<Self>) {
        let event = match self.capture.capture().await {
            Err(cause) => ScanEvent::CaptureFailed(cause),
            Ok(image) => {
                let height_cm = {
                    let mut session = self.session.lock().await;
                    if self.stopped() {
                        debug!("discarding frame captured after stop");
                        return;
                    }
                    if let Err(e) = session.apply(ScanEvent::FrameCaptured) {
                        debug!(error = %e, "frame not accepted");
                        return;
                    }
                    self.publish(&session);
                    session.height_cm()
                };

                let outcome = self.client.submit(&image, height_cm).await;
                debug!(outcome = outcome.kind(), "scan attempt finished");
                ScanEvent::Outcome(outcome)
            }
        };

        let mut session = self.session.lock().await;
        if self.stopped() {
            debug!("discarding scan result after stop");
            return;
        }

        match session.apply(event) {
            Ok(ScanState::Success) => {
                self.publish(&session);
                self.stop_tx.send_replace(true);
            }
            Ok(_) => self.publish(&session),
            Err(e) => debug!(error = %e, "scan result not applied"),
        }
    }
}

/// Owner-side handle to a running session. Dropping it stops the scheduler.
pub struct ScanHandle {
    session: SharedSession,
    driver: Arc<Driver>,
    status_rx: watch::Receiver<ScanSnapshot>,
    task: JoinHandle<()>,
}

impl ScanHandle {
    /// Receiver that observes every status change of the session.
    pub fn status(&self) -> watch::Receiver<ScanSnapshot> {
        self.status_rx.clone()
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        self.status_rx.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.status_rx.borrow().state.is_active()
    }

    pub fn session(&self) -> SharedSession {
        self.session.clone()
    }

    /// Cancels the session and stops the timer. A request already in flight
    /// completes, but its result is discarded.
    pub async fn stop(&self) {
        let mut session = self.session.lock().await;
        self.driver.stop_tx.send_replace(true);
        match session.apply(ScanEvent::Cancel) {
            Ok(ScanState::Cancelled) => self.driver.publish(&session),
            Ok(_) => {}
            Err(e) => debug!(error = %e, "cancel ignored"),
        }
        info!(session = %session.id(), state = ?session.state(), "scan stopped");
    }

    /// Waits until the session reaches `Success` or `Cancelled`.
    pub async fn finished(&self) -> ScanSnapshot {
        let mut rx = self.status_rx.clone();
        if let Ok(snapshot) = rx.wait_for(|snapshot| snapshot.state.is_terminal()).await {
            return snapshot.clone();
        }
        self.session.lock().await.snapshot()
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        self.driver.stop_tx.send_replace(true);
        self.task.abort();
    }
}
