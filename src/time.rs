//! Clock-time primitives: "HH:MM" parsing, minute arithmetic, windows.
//!
//! All times are minutes since midnight. Fractional minutes appear only in
//! simulated timestamps (`f64`); parsed wall-clock values are whole minutes.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Parses an "HH:MM" string into minutes since midnight.
///
/// Fails with [`Error::InvalidInput`] on anything that is not a valid
/// 24-hour clock time.
///
/// # Examples
///
/// ```
/// use lastmile::time::hhmm_to_minutes;
///
/// assert_eq!(hhmm_to_minutes("08:30").unwrap(), 510);
/// assert!(hhmm_to_minutes("24:00").is_err());
/// assert!(hhmm_to_minutes("8h30").is_err());
/// ```
pub fn hhmm_to_minutes(s: &str) -> Result<u32> {
    let invalid = || Error::InvalidInput(format!("invalid time {s:?}, expected \"HH:MM\""));

    let (h, m) = s.split_once(':').ok_or_else(|| invalid())?;
    let hours: u32 = h.trim().parse().map_err(|_| invalid())?;
    let minutes: u32 = m.trim().parse().map_err(|_| invalid())?;

    if hours >= 24 || minutes >= 60 {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

/// Formats minutes since midnight as "HH:MM", wrapping past midnight.
pub fn minutes_to_hhmm(minutes: u32) -> String {
    let m = minutes % (24 * 60);
    format!("{:02}:{:02}", m / 60, m % 60)
}

/// Returns `true` if `t` lies in the closed interval `[start, end]`.
pub fn time_in_window(t: u32, start: u32, end: u32) -> bool {
    t >= start && t <= end
}

/// A delivery or work window in minutes since midnight, closed on both ends.
///
/// # Examples
///
/// ```
/// use lastmile::time::TimeWindow;
///
/// let w = TimeWindow::from_hhmm("09:00", "12:00").unwrap();
/// assert!(w.contains(540.0));
/// assert_eq!(w.lateness(780.0), 60.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: u32,
    end: u32,
}

impl TimeWindow {
    /// Creates a window from minute bounds. Fails if `start > end`.
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidInput(format!(
                "window start {} after end {}",
                minutes_to_hhmm(start),
                minutes_to_hhmm(end)
            )));
        }
        Ok(Self { start, end })
    }

    /// Creates a window from two "HH:MM" strings.
    pub fn from_hhmm(start: &str, end: &str) -> Result<Self> {
        Self::new(hhmm_to_minutes(start)?, hhmm_to_minutes(end)?)
    }

    /// Window opening, minutes since midnight.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Window closing, minutes since midnight.
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Returns `true` if the timestamp falls within the window.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start as f64 && t <= self.end as f64
    }

    /// Minutes to wait when arriving before the window opens, else zero.
    pub fn waiting_time(&self, arrival: f64) -> f64 {
        (self.start as f64 - arrival).max(0.0)
    }

    /// Minutes past the window close, or zero when on time.
    pub fn lateness(&self, arrival: f64) -> f64 {
        (arrival - self.end as f64).max(0.0)
    }
}
