//! Wait strategies between retries.

use std::time::Duration;

/// Computes the wait before a retry.
///
/// `attempt` counts retries already made, so the wait before the first
/// retry is `next_interval(0)`.
pub trait IntervalFunction: Send + Sync {
    fn next_interval(&self, attempt: usize) -> Duration;
}

fn capped(interval: Duration, max: Option<Duration>) -> Duration {
    max.map_or(interval, |max| interval.min(max))
}

/// Same wait before every retry.
#[derive(Debug, Clone, Copy)]
pub struct FixedInterval(Duration);

impl FixedInterval {
    pub fn new(wait: Duration) -> Self {
        Self(wait)
    }
}

impl IntervalFunction for FixedInterval {
    fn next_interval(&self, _attempt: usize) -> Duration {
        self.0
    }
}

/// Wait grows by one base step per retry: `base * (attempt + 1)`.
///
/// This is the default strategy.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    step: Duration,
    cap: Option<Duration>,
}

impl LinearBackoff {
    pub fn new(step: Duration) -> Self {
        Self { step, cap: None }
    }

    /// Caps the wait.
    pub fn max_interval(mut self, cap: Duration) -> Self {
        self.cap = Some(cap);
        self
    }
}

impl IntervalFunction for LinearBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        let steps = u32::try_from(attempt.saturating_add(1)).unwrap_or(u32::MAX);
        capped(self.step.saturating_mul(steps), self.cap)
    }
}

/// Wait multiplies by `multiplier` (default 2.0) per retry, starting at `first`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    first: Duration,
    multiplier: f64,
    cap: Option<Duration>,
}

impl ExponentialBackoff {
    pub fn new(first: Duration) -> Self {
        Self {
            first,
            multiplier: 2.0,
            cap: None,
        }
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Caps the wait.
    pub fn max_interval(mut self, cap: Duration) -> Self {
        self.cap = Some(cap);
        self
    }
}

impl IntervalFunction for ExponentialBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.first.as_secs_f64() * self.multiplier.powi(exponent);
        // Overflow and NaN both saturate.
        let wait = Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX);
        capped(wait, self.cap)
    }
}

/// [`ExponentialBackoff`] with jitter, so clients that failed together do
/// not retry together.
///
/// With `jitter` 0.5 each wait is drawn uniformly from 50% to 150% of the
/// exponential value. `jitter` is clamped to `[0.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct ExponentialRandomBackoff {
    base: ExponentialBackoff,
    jitter: f64,
}

impl ExponentialRandomBackoff {
    pub fn new(first: Duration, jitter: f64) -> Self {
        Self {
            base: ExponentialBackoff::new(first),
            jitter: jitter.clamp(0.0, 1.0),
        }
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.base = self.base.multiplier(multiplier);
        self
    }

    /// Caps the wait before jitter is applied.
    pub fn max_interval(mut self, cap: Duration) -> Self {
        self.base = self.base.max_interval(cap);
        self
    }
}

impl IntervalFunction for ExponentialRandomBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        use rand::Rng;

        let wait = self.base.next_interval(attempt);
        let secs = wait.as_secs_f64();
        let spread = secs * self.jitter;
        if !(spread > 0.0 && spread.is_finite()) {
            return wait;
        }
        let drawn = rand::rng().random_range((secs - spread)..=(secs + spread));
        Duration::try_from_secs_f64(drawn.max(0.0)).unwrap_or(wait)
    }
}

/// Wait computed by a closure of the retry count.
pub struct FnInterval<F>(F);

impl<F> FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> IntervalFunction for FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    fn next_interval(&self, attempt: usize) -> Duration {
        (self.0)(attempt)
    }
}
