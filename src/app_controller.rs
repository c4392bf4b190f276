use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::language_utils::{self, TargetLanguage};
use crate::providers::Provider;
use crate::translation::{TranslationCache, TranslationService};
use crate::xliff::{
    CancellationFlag, FileStats, FileTranslationLogger, ProcessingOptions, XliffProcessor,
};

// @module: Application controller for XLIFF folder translation

/// Name of the audit log written into the output folder
pub const TRANSLATION_LOG_FILE: &str = "translation.log";

/// Outcome of a folder run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Files found
    pub files: usize,
    /// Files that could not be processed
    pub failed_files: usize,
    /// Unit counters over every processed file
    pub stats: FileStats,
    /// Whether the run was stopped early
    pub cancelled: bool,
    /// Wall time
    pub elapsed: Duration,
}

impl RunSummary {
    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} file(s), {} failed; {}; elapsed {}",
            self.files,
            self.failed_files,
            self.stats.summary(),
            Controller::format_duration(self.elapsed)
        )
    }
}

/// Main application controller for XLIFF translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Normalized target language
    target_language: TargetLanguage,
    // @field: Translation service shared by every file
    translator: TranslationService,
    // @field: Set to stop at the next unit
    cancel: CancellationFlag,
    // @field: Draw progress bars on stderr
    show_progress: bool,
}

impl Controller {
    // @method: Create a controller talking to the configured endpoint
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let translator = TranslationService::new(&config);
        Ok(Self::build(config, translator))
    }

    // @method: Create a controller around an existing provider
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let translator = TranslationService::with_provider(provider, &config);
        Ok(Self::build(config, translator))
    }

    fn build(config: Config, translator: TranslationService) -> Self {
        let target_language = language_utils::normalize_language(&config.target_language);
        Self {
            config,
            target_language,
            translator,
            cancel: Arc::new(AtomicBool::new(false)),
            show_progress: true,
        }
    }

    /// Do not draw progress bars
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Normalized target language
    pub fn target_language(&self) -> &TargetLanguage {
        &self.target_language
    }

    /// Flag that stops the run at the next unit when set
    pub fn cancellation_flag(&self) -> CancellationFlag {
        Arc::clone(&self.cancel)
    }

    /// Set the cancellation flag when Ctrl-C is pressed
    pub fn install_ctrl_c_handler(&self) {
        let cancel = self.cancellation_flag();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping after the current unit");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    /// Translate every XLIFF file under `input_dir` into the same relative
    /// location under `output_dir`
    pub async fn run_folder(&self, input_dir: &Path, output_dir: &Path) -> Result<RunSummary> {
        // Start timing the process
        let start_time = Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input folder not found: {}", input_dir.display()));
        }

        let files = FileManager::find_xliff_files(input_dir)?;
        let mut summary = RunSummary {
            files: files.len(),
            ..RunSummary::default()
        };
        if files.is_empty() {
            return Ok(summary);
        }

        FileManager::ensure_dir(output_dir)?;

        info!(
            "Translating {} file(s) into {} ({}) with {}",
            files.len(),
            self.target_language.name,
            self.target_language.code,
            self.config.translation.model
        );

        let processor = self.processor(output_dir);

        let total_units = if self.config.processing.precount_units {
            info!("Scanning {} files to count trans-units...", files.len());
            let total = Self::count_units(&files);
            info!("Total trans-units: {}", total);
            Some(total)
        } else {
            None
        };

        // Create multi-progress instance for multiple file processing
        let multi_progress = if self.show_progress {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let overall_pb = multi_progress.add(ProgressBar::new(
            total_units.unwrap_or(files.len()) as u64,
        ));
        overall_pb.set_style(Self::bar_style(if total_units.is_some() {
            "units"
        } else {
            "files"
        }));
        overall_pb.set_message("Overall");

        for (index, input_file) in files.iter().enumerate() {
            let relative = input_file
                .strip_prefix(input_dir)
                .unwrap_or(input_file.as_path())
                .to_path_buf();
            let output_file = FileManager::mirrored_output_path(input_file, input_dir, output_dir)?;

            let file_pb = multi_progress.add(ProgressBar::new(0));
            file_pb.set_style(Self::bar_style("units"));
            file_pb.set_message(format!("[{}/{}] {}", index + 1, files.len(), relative.display()));

            let result = processor
                .translate_file(input_file, &output_file, |done, total| {
                    file_pb.set_length(total as u64);
                    file_pb.set_position(done as u64);
                    if total_units.is_some() {
                        overall_pb.inc(1);
                    }
                })
                .await;

            file_pb.finish_and_clear();
            multi_progress.remove(&file_pb);

            match result {
                Ok(stats) => {
                    info!("[{}/{}] {}: {}", index + 1, files.len(), relative.display(), stats.summary());
                    summary.stats += stats;
                }
                Err(e) if e.is_cancelled() => {
                    warn!("Run cancelled while processing {}", relative.display());
                    summary.cancelled = true;
                    break;
                }
                Err(e) => {
                    error!("Error processing file {}: {}", relative.display(), e);
                    summary.failed_files += 1;
                }
            }

            if total_units.is_none() {
                overall_pb.inc(1);
            }
        }

        overall_pb.finish_and_clear();

        summary.elapsed = start_time.elapsed();
        info!("Run completed: {}", summary.summary());

        let usage = self.translator.usage();
        let cache = processor.cache();
        let cache_summary = if cache.is_enabled() {
            let (hits, misses, rate) = cache.stats();
            format!("{} hits / {} misses ({:.1}%)", hits, misses, rate * 100.0)
        } else {
            "disabled".to_string()
        };
        info!(
            "Requests: {}, tokens: {}, API time: {}, cache: {}",
            usage.requests,
            usage.total_tokens(),
            Self::format_duration(usage.api_duration),
            cache_summary
        );

        Ok(summary)
    }

    fn processor(&self, output_dir: &Path) -> XliffProcessor {
        let logger = FileTranslationLogger::new(output_dir.join(TRANSLATION_LOG_FILE));
        let options = ProcessingOptions {
            target_language: self.target_language.clone(),
            translate_if_target_same_as_source: self
                .config
                .processing
                .translate_if_target_same_as_source,
        };

        XliffProcessor::new(
            self.translator.clone(),
            TranslationCache::new(self.config.processing.use_cache),
            Arc::new(logger),
            options,
        )
        .with_cancellation(self.cancellation_flag())
    }

    fn count_units(files: &[PathBuf]) -> usize {
        files
            .iter()
            .map(|file| match XliffProcessor::count_trans_units(file) {
                Ok(count) => count,
                Err(e) => {
                    warn!("Could not count units in {}: {}", file.display(), e);
                    0
                }
            })
            .sum()
    }

    fn bar_style(unit: &str) -> ProgressStyle {
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
            unit
        );
        ProgressStyle::default_bar()
            .template(&template)
            .or_else(|_| {
                ProgressStyle::default_bar()
                    .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}")
            })
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    // Format duration in a human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
