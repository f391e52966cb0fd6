//! Background image downloading
//!
//! Best-effort population of the background directory from the RedCaps
//! dataset (the `earthporn` subset) via the Hugging Face datasets-server API.
//! Individual candidates may fail; they are retried a fixed number of times
//! and then skipped, so a run may end with fewer images than requested.

use crate::error::{Result, SynthError};
use crate::tracing_config::spans;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use tracing::Instrument;

/// Attempts per image URL before the candidate is skipped
pub const DEFAULT_RETRIES: usize = 3;

/// Payloads of this size or smaller are treated as broken images
pub const MIN_IMAGE_BYTES: usize = 2048;

/// Default datasets-server endpoint
pub const DATASETS_SERVER_URL: &str = "https://datasets-server.huggingface.co";

/// One downloadable background
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackgroundCandidate {
    pub image_id: String,
    pub image_url: String,
}

/// Indexed collection of background candidates
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Total number of candidates
    async fn len(&self) -> Result<usize>;

    /// Candidate at `index` (`0..len`)
    async fn candidate(&self, index: usize) -> Result<BackgroundCandidate>;
}

/// Fetches raw image bytes
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Counts reported by [`BackgroundDownloader::download_background_images`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Images asked for
    pub requested: usize,
    /// Images present afterwards (downloaded + already on disk)
    pub obtained: usize,
    /// Newly written files
    pub downloaded: usize,
    /// Files that already existed
    pub existing: usize,
    /// Candidates given up on (lookup failure, exhausted retries, too small)
    pub skipped: usize,
}

/// `rows` endpoint response of the datasets-server
#[derive(Debug, Deserialize)]
struct RowsResponse {
    rows: Vec<RowEntry>,
    num_rows_total: usize,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
    row: BackgroundCandidate,
}

/// RedCaps rows served by the Hugging Face datasets-server
#[derive(Debug, Clone)]
pub struct RedCapsSource {
    client: Client,
    endpoint: String,
    dataset: String,
    subset: String,
    split: String,
}

impl RedCapsSource {
    /// RedCaps `earthporn` train split
    ///
    /// # Errors
    /// Failed to create HTTP client
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(http_client()?, DATASETS_SERVER_URL))
    }

    #[must_use]
    pub fn with_client<S: Into<String>>(client: Client, endpoint: S) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            dataset: "red_caps".to_string(),
            subset: "earthporn".to_string(),
            split: "train".to_string(),
        }
    }

    fn rows_url(&self, offset: usize, length: usize) -> String {
        format!(
            "{}/rows?dataset={}&config={}&split={}&offset={}&length={}",
            self.endpoint.trim_end_matches('/'),
            self.dataset,
            self.subset,
            self.split,
            offset,
            length
        )
    }

    async fn rows(&self, offset: usize, length: usize) -> Result<RowsResponse> {
        let url = self.rows_url(offset, length);
        log::debug!("Querying rows: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SynthError::network_error(format!("Failed to query {}", url), e))?;

        if !response.status().is_success() {
            return Err(SynthError::network_error(
                format!("HTTP error for {}", url),
                response.status(),
            ));
        }

        response
            .json::<RowsResponse>()
            .await
            .map_err(|e| SynthError::network_error(format!("Invalid rows response from {}", url), e))
    }
}

#[async_trait]
impl CandidateSource for RedCapsSource {
    async fn len(&self) -> Result<usize> {
        Ok(self.rows(0, 1).await?.num_rows_total)
    }

    async fn candidate(&self, index: usize) -> Result<BackgroundCandidate> {
        self.rows(index, 1)
            .await?
            .rows
            .into_iter()
            .next()
            .map(|entry| entry.row)
            .ok_or_else(|| SynthError::network_error("Empty rows response", index))
    }
}

/// Plain HTTP GET fetcher
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    /// # Errors
    /// Failed to create HTTP client
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: http_client()?,
        })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response =
            self.client.get(url).send().await.map_err(|e| {
                SynthError::network_error(format!("Failed to download {}", url), e)
            })?;

        if !response.status().is_success() {
            return Err(SynthError::network_error(
                format!("HTTP error for {}", url),
                response.status(),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthError::network_error(format!("Failed to read {}", url), e))?;
        Ok(bytes.to_vec())
    }
}

fn http_client() -> Result<Client> {
    Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SynthError::network_error("Failed to create HTTP client", e))
}

/// Downloads a seeded random sample of candidates into a directory
#[derive(Debug)]
pub struct BackgroundDownloader<S, F> {
    source: S,
    fetcher: F,
    seed: u64,
    retries: usize,
    min_bytes: usize,
}

impl BackgroundDownloader<RedCapsSource, HttpImageFetcher> {
    /// Downloader over RedCaps using plain HTTP
    ///
    /// # Errors
    /// Failed to create HTTP client
    pub fn red_caps(seed: u64) -> Result<Self> {
        Ok(Self::new(RedCapsSource::new()?, HttpImageFetcher::new()?, seed))
    }
}

impl<S: CandidateSource, F: ImageFetcher> BackgroundDownloader<S, F> {
    pub fn new(source: S, fetcher: F, seed: u64) -> Self {
        Self {
            source,
            fetcher,
            seed,
            retries: DEFAULT_RETRIES,
            min_bytes: MIN_IMAGE_BYTES,
        }
    }

    /// Attempts per URL (at least one)
    #[must_use]
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries.max(1);
        self
    }

    /// Minimum payload size accepted as a valid image
    #[must_use]
    pub fn with_min_bytes(mut self, min_bytes: usize) -> Self {
        self.min_bytes = min_bytes;
        self
    }

    /// Fetch `url`, retrying up to the configured bound
    ///
    /// Returns `None` once every attempt failed; failures are logged.
    pub async fn download_image(&self, url: &str) -> Option<Vec<u8>> {
        for attempt in 1..=self.retries {
            match self.fetcher.fetch(url).await {
                Ok(bytes) => return Some(bytes),
                Err(e) => {
                    log::error!(
                        "Failed to download {} (attempt {}/{}): {}",
                        url,
                        attempt,
                        self.retries,
                        e
                    );
                },
            }
        }
        None
    }

    /// Make sure at least `n` background images exist in `target_dir`
    ///
    /// Candidates are visited in a permutation determined by the seed. Files
    /// that already exist count without a request. The call succeeds even if
    /// fewer than `n` images could be obtained.
    ///
    /// # Errors
    /// - the candidate count cannot be determined
    /// - a downloaded image cannot be written
    pub async fn download_background_images(
        &self,
        target_dir: &Path,
        n: usize,
    ) -> Result<DownloadSummary> {
        self.fill_directory(target_dir, n)
            .instrument(spans::download(target_dir, n))
            .await
    }

    async fn fill_directory(&self, target_dir: &Path, n: usize) -> Result<DownloadSummary> {
        log::info!("Downloading {} images to {}...", n, target_dir.display());

        let mut summary = DownloadSummary {
            requested: n,
            ..DownloadSummary::default()
        };
        if n == 0 {
            return Ok(summary);
        }

        let dataset_length = self.source.len().await?;
        let mut order: Vec<usize> = (0..dataset_length).collect();
        order.shuffle(&mut ChaCha8Rng::seed_from_u64(self.seed));

        for index in order {
            if summary.obtained >= n {
                break;
            }

            let candidate = match self.source.candidate(index).await {
                Ok(candidate) => candidate,
                Err(e) => {
                    log::warn!("Skipping candidate {}: {}", index, e);
                    summary.skipped += 1;
                    continue;
                },
            };

            let image_path = target_dir.join(format!("{}.jpg", candidate.image_id));
            if image_path.exists() {
                summary.existing += 1;
                summary.obtained += 1;
            } else {
                match self.download_image(&candidate.image_url).await {
                    Some(bytes) if bytes.len() > self.min_bytes => {
                        tokio::fs::write(&image_path, &bytes).await.map_err(|e| {
                            SynthError::file_io_error("write background", &image_path, &e)
                        })?;
                        summary.downloaded += 1;
                        summary.obtained += 1;
                    },
                    Some(bytes) => {
                        log::warn!(
                            "Skipping {}: {} bytes is too small to be an image",
                            candidate.image_url,
                            bytes.len()
                        );
                        summary.skipped += 1;
                    },
                    None => summary.skipped += 1,
                }
            }

            log::info!("Downloaded {} / {} images", summary.obtained, n);
        }

        if summary.obtained < n {
            log::warn!(
                "Only {} of {} requested backgrounds are available",
                summary.obtained,
                n
            );
        }
        log::info!("Done!");
        Ok(summary)
    }
}
