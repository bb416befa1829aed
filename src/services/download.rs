use crate::error::Result;
use crate::services::atomic::write_atomic;
use crate::services::download_types::{
    DownloadCache, DownloadItem, DownloadOutcome, DownloadReport, FailureReason,
};
use crate::services::http::{user_agent_header, HttpRequest, Pause, Transport};
use crate::services::media::derive_filename;

use reqwest::StatusCode;
use tracing::{debug, info, warn};

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub struct DownloadConfig {
    pub audio_dir: PathBuf,
    pub user_agent: String,
    pub max_attempts: u32,
    /// Politeness pause after every Nth item that hit the network (0 = never).
    pub batch_pause_every: usize,
    pub batch_pause: Duration,
}

/// Wait before retrying after the given (0-based) attempt: 2s, 3s, 5s, 9s, ...
pub fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(2_u64.saturating_pow(attempt).saturating_add(1))
}

fn should_retry_http(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

pub struct Downloader<'a> {
    transport: &'a dyn Transport,
    pause: &'a dyn Pause,
    cfg: DownloadConfig,
    dir_ready: bool,
}

impl<'a> Downloader<'a> {
    pub fn new(transport: &'a dyn Transport, pause: &'a dyn Pause, cfg: DownloadConfig) -> Self {
        Self {
            transport,
            pause,
            cfg,
            dir_ready: false,
        }
    }

    fn ensure_dir(&mut self) -> Result<()> {
        if !self.dir_ready {
            fs::create_dir_all(&self.cfg.audio_dir)?;
            self.dir_ready = true;
        }
        Ok(())
    }

    /// Make one URL available locally, downloading it only when its derived
    /// filename is not already present.
    pub fn download(&mut self, url: &str) -> Result<DownloadItem> {
        self.ensure_dir()?;

        let url = url.trim();
        let filename = derive_filename(url);
        let path = self.cfg.audio_dir.join(&filename);

        let outcome = if filename.is_empty() {
            DownloadOutcome::Failed {
                reason: FailureReason::InvalidUrl {
                    url: url.to_string(),
                },
            }
        } else if path.exists() {
            debug!("{} already exists, skipping", filename);
            DownloadOutcome::AlreadyCached
        } else {
            info!("Downloading {}", filename);
            self.fetch_to(url, &path)
        };

        match &outcome {
            DownloadOutcome::Downloaded { attempts } => {
                info!(attempts = *attempts, "Downloaded {}", filename)
            }
            DownloadOutcome::Failed { reason } => warn!("Failed to download {}: {}", filename, reason),
            DownloadOutcome::AlreadyCached => {}
        }

        Ok(DownloadItem {
            url: url.to_string(),
            filename,
            outcome,
        })
    }

    /// Download every URL in order. Per-item failures are counted, never
    /// raised; only a failure to create the audio directory aborts.
    pub fn download_all<'u, I>(&mut self, urls: I) -> Result<(DownloadCache, DownloadReport)>
    where
        I: IntoIterator<Item = &'u str>,
    {
        let mut cache = DownloadCache::new();
        let mut report = DownloadReport::default();
        let mut network_hits = 0usize;

        for url in urls {
            let item = self.download(url)?;

            if item.outcome.is_available() {
                cache.insert(item.url.clone(), item.filename.clone());
            }

            if item.outcome != DownloadOutcome::AlreadyCached {
                network_hits += 1;
                if self.cfg.batch_pause_every > 0 && network_hits % self.cfg.batch_pause_every == 0
                {
                    self.pause.pause(self.cfg.batch_pause);
                }
            }

            report.record(item);
        }

        info!(
            downloaded = report.downloaded,
            skipped = report.skipped,
            failed = report.failed,
            "Audio download finished"
        );

        Ok((cache, report))
    }

    fn fetch_to(&self, url: &str, path: &Path) -> DownloadOutcome {
        let (ua_name, ua_value) = user_agent_header(&self.cfg.user_agent);
        let request = HttpRequest::get(url).with_header(ua_name, ua_value);

        let max_attempts = self.cfg.max_attempts.max(1);
        let mut last_err = String::new();

        for attempt in 0..max_attempts {
            match self.transport.send(&request) {
                Ok(resp) if resp.status.is_success() => {
                    return match write_atomic(path, &resp.body) {
                        Ok(()) => DownloadOutcome::Downloaded {
                            attempts: attempt + 1,
                        },
                        Err(e) => DownloadOutcome::Failed {
                            reason: FailureReason::Write {
                                message: e.to_string(),
                            },
                        },
                    };
                }
                Ok(resp) if should_retry_http(resp.status) => {
                    last_err = format!("HTTP {}", resp.status.as_u16());
                    if resp.status == StatusCode::TOO_MANY_REQUESTS {
                        warn!("Rate limited (429) on attempt {}/{}", attempt + 1, max_attempts);
                    } else {
                        warn!(
                            "Server error ({}) on attempt {}/{}",
                            resp.status.as_u16(),
                            attempt + 1,
                            max_attempts
                        );
                    }
                }
                Ok(resp) => {
                    return DownloadOutcome::Failed {
                        reason: FailureReason::Http {
                            status: resp.status.as_u16(),
                            reason: resp.reason().to_string(),
                        },
                    };
                }
                Err(err) if !err.retryable => {
                    warn!("Request for {} cannot be sent: {}", url, err);
                    return DownloadOutcome::Failed {
                        reason: FailureReason::InvalidUrl {
                            url: url.to_string(),
                        },
                    };
                }
                Err(err) => {
                    warn!(
                        "Network error: {} on attempt {}/{}",
                        err,
                        attempt + 1,
                        max_attempts
                    );
                    last_err = err.to_string();
                }
            }

            if attempt + 1 < max_attempts {
                let wait = backoff(attempt);
                info!("Waiting {} seconds before retrying", wait.as_secs());
                self.pause.pause(wait);
            }
        }

        DownloadOutcome::Failed {
            reason: FailureReason::RetriesExhausted {
                attempts: max_attempts,
                last_error: last_err,
            },
        }
    }
}
