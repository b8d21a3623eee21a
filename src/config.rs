//! Runtime configuration parsed from environment variables.
//!
//! Every value has a default; unparseable values fall back to it. Canvas
//! dimensions are compile-time constants in `canvas`.

use std::path::PathBuf;
use std::time::Duration;

use crate::services::ingress::MAX_CLICK_QUEUE_CAPACITY;
use crate::services::scheduler::Schedule;

pub const DEFAULT_PORT: u16 = 8801;
pub const DEFAULT_REFRESH_SECS: u64 = 6;
pub const DEFAULT_AUTO_RANDOMIZE_TICKS: u32 = 100;
pub const DEFAULT_CLICK_QUEUE_CAPACITY: usize = 64;
pub const DEFAULT_DATA_PATH: &str = "data/data.json";
pub const DEFAULT_PIC_PATH: &str = "res/pic.png";
pub const DEFAULT_INDEX_PATH: &str = "res/index.html";

pub const MAX_REFRESH_SECS: u64 = 86_400;
pub const MAX_AUTO_RANDOMIZE_TICKS: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// Period of the refresh tick (step + save).
    pub refresh: Duration,
    /// Auto-randomize period as a multiple of `refresh`.
    pub auto_randomize_ticks: u32,
    pub click_queue_capacity: usize,
    /// Metadata record (position, direction, color).
    pub data_path: PathBuf,
    /// Bitmap artifact, also served to viewers.
    pub pic_path: PathBuf,
    pub index_path: PathBuf,
}

impl Config {
    /// Load from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 8801
    /// - `REFRESH_SECS`: default 6, clamped to 1..=86400
    /// - `AUTO_RANDOMIZE_TICKS`: default 100, clamped to 1..=10000
    /// - `CLICK_QUEUE_CAPACITY`: default 64, clamped to 1..=65536
    /// - `DATA_PATH`: default `data/data.json`
    /// - `PIC_PATH`: default `res/pic.png`
    /// - `INDEX_PATH`: default `res/index.html`
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            refresh: Duration::from_secs(env_parse("REFRESH_SECS", DEFAULT_REFRESH_SECS).clamp(1, MAX_REFRESH_SECS)),
            auto_randomize_ticks: env_parse("AUTO_RANDOMIZE_TICKS", DEFAULT_AUTO_RANDOMIZE_TICKS)
                .clamp(1, MAX_AUTO_RANDOMIZE_TICKS),
            click_queue_capacity: env_parse("CLICK_QUEUE_CAPACITY", DEFAULT_CLICK_QUEUE_CAPACITY)
                .clamp(1, MAX_CLICK_QUEUE_CAPACITY),
            data_path: env_path("DATA_PATH", DEFAULT_DATA_PATH),
            pic_path: env_path("PIC_PATH", DEFAULT_PIC_PATH),
            index_path: env_path("INDEX_PATH", DEFAULT_INDEX_PATH),
        }
    }

    /// `refresh * auto_randomize_ticks`, or the default period when that
    /// product overflows.
    #[must_use]
    pub fn auto_randomize(&self) -> Duration {
        self.refresh
            .checked_mul(self.auto_randomize_ticks)
            .unwrap_or(Duration::from_secs(DEFAULT_REFRESH_SECS * u64::from(DEFAULT_AUTO_RANDOMIZE_TICKS)))
    }

    #[must_use]
    pub fn schedule(&self) -> Schedule {
        Schedule { refresh: self.refresh, auto_randomize: self.auto_randomize() }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => PathBuf::from(raw.trim()),
        _ => PathBuf::from(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
