//! Politeness delay between page requests
//!
//! Each pause is drawn uniformly from a closed interval so that requests do
//! not arrive at a fixed rhythm.

use crate::config::CrawlerConfig;
use rand::Rng;
use std::time::Duration;

/// Random pause applied before every page after the first
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolitenessDelay {
    min_secs: f64,
    max_secs: f64,
}

impl PolitenessDelay {
    /// Creates a delay drawn from `[min_secs, max_secs]`
    ///
    /// Negative bounds are clamped to zero and swapped bounds are reordered.
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        let min_secs = min_secs.max(0.0);
        let max_secs = max_secs.max(0.0);

        if min_secs <= max_secs {
            Self { min_secs, max_secs }
        } else {
            Self {
                min_secs: max_secs,
                max_secs: min_secs,
            }
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.min_delay_secs, config.max_delay_secs)
    }

    pub fn min(&self) -> Duration {
        Duration::from_secs_f64(self.min_secs)
    }

    pub fn max(&self) -> Duration {
        Duration::from_secs_f64(self.max_secs)
    }

    /// Draws one delay
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min_secs == self.max_secs {
            return self.min();
        }
        Duration::from_secs_f64(rng.gen_range(self.min_secs..=self.max_secs))
    }

    /// Sleeps for a freshly drawn delay and returns it
    pub async fn pause(&self) -> Duration {
        let delay = self.sample(&mut rand::thread_rng());
        tokio::time::sleep(delay).await;
        delay
    }
}

impl Default for PolitenessDelay {
    fn default() -> Self {
        Self::new(1.0, 2.0)
    }
}
