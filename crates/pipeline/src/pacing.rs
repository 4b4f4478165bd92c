use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Gate awaited before every outbound NLU request.
#[async_trait]
pub trait Pacer: Send {
    async fn ready(&mut self);
}

/// Sleeps a fixed delay before every request, regardless of how long the previous
/// request took.
#[derive(Clone, Debug)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn ready(&mut self) {
        if self.delay.is_zero() {
            return;
        }
        log::debug!("Sleep: {}ms", self.delay.as_millis());
        tokio::time::sleep(self.delay).await;
    }
}

/// Lets a request through once at least `interval` has passed since the previous one.
#[derive(Clone, Debug)]
pub struct IntervalGate {
    interval: Duration,
    last: Option<Instant>,
}

impl IntervalGate {
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }
}

#[async_trait]
impl Pacer for IntervalGate {
    async fn ready(&mut self) {
        if let Some(last) = self.last {
            tokio::time::sleep_until(last + self.interval).await;
        }
        self.last = Some(Instant::now());
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Unpaced;

#[async_trait]
impl Pacer for Unpaced {
    async fn ready(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PacingKind {
    #[default]
    Fixed,
    Interval,
    Off,
}

pub fn pacer(kind: PacingKind, delay: Duration) -> Box<dyn Pacer> {
    match kind {
        PacingKind::Fixed => Box::new(FixedDelay::new(delay)),
        PacingKind::Interval => Box::new(IntervalGate::new(delay)),
        PacingKind::Off => Box::new(Unpaced),
    }
}
