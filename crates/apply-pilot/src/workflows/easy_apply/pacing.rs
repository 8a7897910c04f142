use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

/// Courtesy delay between interactions with the site.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Sleeps for a uniformly random duration within `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomPacer {
    min: Duration,
    max: Duration,
}

impl RandomPacer {
    /// Bounds are swapped if given in the wrong order.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn from_secs(min: f64, max: f64) -> Self {
        Self::new(
            Duration::from_secs_f64(min.max(0.0)),
            Duration::from_secs_f64(max.max(0.0)),
        )
    }

    pub fn next_delay(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

#[async_trait]
impl Pacer for RandomPacer {
    async fn pause(&self) {
        let delay = self.next_delay();
        debug!(?delay, "pacing");
        tokio::time::sleep(delay).await;
    }
}

/// Pacer that never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn pause(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_stay_within_bounds() {
        let pacer = RandomPacer::from_secs(0.5, 1.5);
        for _ in 0..200 {
            let delay = pacer.next_delay();
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1500));
        }
    }

    #[test]
    fn reversed_bounds_are_normalized() {
        let pacer = RandomPacer::from_secs(3.0, 1.0);
        let delay = pacer.next_delay();
        assert!(delay >= Duration::from_secs(1) && delay <= Duration::from_secs(3));
    }

    #[test]
    fn equal_bounds_are_fixed() {
        let pacer = RandomPacer::from_secs(2.0, 2.0);
        assert_eq!(pacer.next_delay(), Duration::from_secs(2));
    }
}
