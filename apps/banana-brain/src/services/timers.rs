//! Countdown and one-shot delay owned by a runner loop.
//!
//! Both are plain values held by the loop, so they are dropped with it on
//! every exit path. A disarmed timer never completes, which keeps its
//! `select!` branch idle.

use std::future::pending;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior, Sleep};

/// One countdown step.
pub const TICK: Duration = Duration::from_secs(1);

#[derive(Default)]
pub struct Countdown {
    interval: Option<Interval>,
}

impl Countdown {
    /// First tick lands one full period from now.
    pub fn start(&mut self) {
        let mut interval = interval_at(Instant::now() + TICK, TICK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    pub fn stop(&mut self) {
        self.interval = None;
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Cancel-safe.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => pending::<()>().await,
        }
    }
}

#[derive(Default)]
pub struct Delay {
    sleep: Option<Pin<Box<Sleep>>>,
}

impl Delay {
    pub fn schedule(&mut self, after: Duration) {
        self.sleep = Some(Box::pin(sleep(after)));
    }

    pub fn cancel(&mut self) {
        self.sleep = None;
    }

    pub fn is_pending(&self) -> bool {
        self.sleep.is_some()
    }

    /// Completes once per `schedule`, then disarms. Cancel-safe.
    pub async fn elapsed(&mut self) {
        match self.sleep.as_mut() {
            Some(sleep) => {
                sleep.as_mut().await;
                self.sleep = None;
            }
            None => pending::<()>().await,
        }
    }
}
