//! Upload and download progress callbacks.
//!
//! A transport wraps request and response bodies in a `ProgressReader`, which
//! reports `round(loaded * 100 / total)` after every read. Callbacks only
//! observe the transfer; they never change the result of a call.

use std::io::{self, Read};

/// Percentage of `total` covered by `loaded`, rounded to the nearest integer.
///
/// Returns `None` when the total is zero, since no meaningful percentage
/// exists. Values are capped at 100.
pub fn percent_completed(loaded: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let percent = (loaded as f64 * 100.0 / total as f64).round();
    Some(percent.min(100.0) as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Upload,
    Download,
}

/// Optional per-call callbacks for upload and download progress.
#[derive(Default)]
pub struct Progress<'a> {
    upload: Option<&'a mut dyn FnMut(u8)>,
    download: Option<&'a mut dyn FnMut(u8)>,
}

impl<'a> Progress<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn on_upload(mut self, callback: &'a mut dyn FnMut(u8)) -> Self {
        self.upload = Some(callback);
        self
    }

    pub fn on_download(mut self, callback: &'a mut dyn FnMut(u8)) -> Self {
        self.download = Some(callback);
        self
    }

    /// Report a progress event. No-op if no callback is registered for
    /// `direction` or the total is unknown.
    pub fn report(&mut self, direction: Direction, loaded: u64, total: Option<u64>) {
        let callback = match direction {
            Direction::Upload => self.upload.as_deref_mut(),
            Direction::Download => self.download.as_deref_mut(),
        };
        let (Some(callback), Some(total)) = (callback, total) else {
            return;
        };
        if let Some(percent) = percent_completed(loaded, total) {
            callback(percent);
        }
    }
}

/// A `Read` adapter that counts bytes and reports progress after each read.
pub struct ProgressReader<'p, 'c, R> {
    inner: R,
    loaded: u64,
    total: Option<u64>,
    direction: Direction,
    progress: &'p mut Progress<'c>,
}

impl<'p, 'c, R: Read> ProgressReader<'p, 'c, R> {
    pub fn new(inner: R, total: Option<u64>, direction: Direction, progress: &'p mut Progress<'c>) -> Self {
        Self {
            inner,
            loaded: 0,
            total,
            direction,
            progress,
        }
    }

    pub fn loaded(&self) -> u64 {
        self.loaded
    }
}

impl<R: Read> Read for ProgressReader<'_, '_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.loaded += n as u64;
            self.progress.report(self.direction, self.loaded, self.total);
        }
        Ok(n)
    }
}
