/*!
 * Document translation for XLIFF 1.2 files.
 *
 * Every `trans-unit` is handled on its own: inline markup and placeholders
 * are swapped for tokens, the protected text is translated (or taken from the
 * run cache), tokens are swapped back and the result replaces the unit's
 * `<target>` children. Per-unit problems never abort the document; the file
 * is written only once every unit has been handled.
 */

use log::{debug, warn};
use std::fs;
use std::ops::AddAssign;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::{AppError, TranslationError};
use crate::file_utils::FileManager;
use crate::language_utils::TargetLanguage;
use crate::translation::cache::{CachedTranslation, TranslationCache};
use crate::translation::core::TranslationService;
use crate::translation::placeholders::{protect, restore};

use super::dom::{NamespaceScope, XmlDocument, XmlElement};
use super::logger::TranslationLogger;
use super::tokenizer::{extract_text_with_tokens, rehydrate_nodes_from_tokens};

/// XLIFF 1.2 namespace
pub const XLIFF_NS: &str = "urn:oasis:names:tc:xliff:document:1.2";

/// Shared flag that stops processing at the next unit when set
pub type CancellationFlag = Arc<AtomicBool>;

/// Unit counters for one file or a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStats {
    /// Number of trans-units seen
    pub total_units: usize,
    /// Units written with an accepted translation
    pub translated: usize,
    /// Units left alone
    pub skipped: usize,
    /// Units whose translation came from the cache
    pub cache_hits: usize,
    /// Units written with the untranslated source
    pub failures: usize,
}

impl AddAssign for FileStats {
    fn add_assign(&mut self, other: Self) {
        self.total_units += other.total_units;
        self.translated += other.translated;
        self.skipped += other.skipped;
        self.cache_hits += other.cache_hits;
        self.failures += other.failures;
    }
}

impl FileStats {
    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "units: {}, translated: {}, skipped: {}, cached: {}, failures: {}",
            self.total_units, self.translated, self.skipped, self.cache_hits, self.failures
        )
    }
}

/// Options controlling which units are translated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingOptions {
    /// Target language for prompts and the `target-language` attribute
    pub target_language: TargetLanguage,
    /// Retranslate units whose target merely repeats the source
    pub translate_if_target_same_as_source: bool,
}

impl ProcessingOptions {
    /// Options for `target_language` with the default policy
    pub fn new(target_language: TargetLanguage) -> Self {
        Self {
            target_language,
            translate_if_target_same_as_source: true,
        }
    }
}

/// What happened to one unit
#[derive(Debug, Clone, PartialEq, Eq)]
enum UnitOutcome {
    Skipped,
    Translated,
    CachedTranslation,
    CachedPassthrough,
    Failed,
}

/// Translates XLIFF documents unit by unit
pub struct XliffProcessor {
    translator: TranslationService,
    cache: TranslationCache,
    logger: Arc<dyn TranslationLogger>,
    options: ProcessingOptions,
    cancel: CancellationFlag,
}

impl XliffProcessor {
    /// Create a processor. The cache is shared by every file it handles.
    pub fn new(
        translator: TranslationService,
        cache: TranslationCache,
        logger: Arc<dyn TranslationLogger>,
        options: ProcessingOptions,
    ) -> Self {
        Self {
            translator,
            cache,
            logger,
            options,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Use an externally owned cancellation flag
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// The run cache
    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Number of trans-units in a file, without translating anything
    pub fn count_trans_units(path: &Path) -> Result<usize, AppError> {
        let content = fs::read_to_string(path)?;
        let document = XmlDocument::parse(&content)?;
        Ok(document.find_elements(XLIFF_NS, "trans-unit").len())
    }

    /// Translate one file and write the result to `output_path`.
    ///
    /// Nothing is written when translation is cancelled.
    pub async fn translate_file<F>(
        &self,
        input_path: &Path,
        output_path: &Path,
        progress: F,
    ) -> Result<FileStats, AppError>
    where
        F: FnMut(usize, usize),
    {
        let content = fs::read_to_string(input_path)?;
        let mut document = XmlDocument::parse(&content)?;

        let label = input_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| input_path.display().to_string());

        let stats = self
            .translate_document(&mut document, &label, progress)
            .await?;

        let serialized = document.to_xml_string()?;
        FileManager::write_atomic(output_path, &serialized)
            .map_err(|e| AppError::File(e.to_string()))?;

        debug!("{}: {}", label, stats.summary());
        Ok(stats)
    }

    /// Translate every unit of a parsed document in place
    pub async fn translate_document<F>(
        &self,
        document: &mut XmlDocument,
        file_label: &str,
        mut progress: F,
    ) -> Result<FileStats, TranslationError>
    where
        F: FnMut(usize, usize),
    {
        self.stamp_target_language(document);

        let units = document.find_elements(XLIFF_NS, "trans-unit");
        let mut stats = FileStats {
            total_units: units.len(),
            ..FileStats::default()
        };

        for (index, unit) in units.iter().enumerate() {
            if self.cancel.load(Ordering::SeqCst) {
                warn!("{}: cancelled after {} of {} units", file_label, index, units.len());
                return Err(TranslationError::Cancelled);
            }

            let Some(element) = document.element_at_mut(&unit.path) else {
                continue;
            };

            match self.translate_unit(element, &unit.scope, file_label).await {
                UnitOutcome::Skipped => stats.skipped += 1,
                UnitOutcome::Translated => stats.translated += 1,
                UnitOutcome::CachedTranslation => {
                    stats.cache_hits += 1;
                    stats.translated += 1;
                }
                UnitOutcome::CachedPassthrough => {
                    stats.cache_hits += 1;
                    stats.failures += 1;
                }
                UnitOutcome::Failed => stats.failures += 1,
            }

            progress(index + 1, units.len());
        }

        Ok(stats)
    }

    fn stamp_target_language(&self, document: &mut XmlDocument) {
        let Some(file) = document.find_elements(XLIFF_NS, "file").into_iter().next() else {
            return;
        };
        if let Some(element) = document.element_at_mut(&file.path) {
            element.set_attribute("target-language", &self.options.target_language.code);
        }
    }

    async fn translate_unit(
        &self,
        unit: &mut XmlElement,
        scope: &NamespaceScope,
        file_label: &str,
    ) -> UnitOutcome {
        let unit_id = unit.attribute("id").map(str::to_string);
        let unit_id = unit_id.as_deref();

        let Some(source_index) = unit.find_child(scope, XLIFF_NS, "source") else {
            self.logger.skipped(file_label, unit_id, "missing source", "");
            return UnitOutcome::Skipped;
        };
        let Some(source) = unit.child_element(source_index).cloned() else {
            return UnitOutcome::Skipped;
        };

        let source_text = source.text();
        if source_text.trim().is_empty() {
            self.logger.skipped(file_label, unit_id, "empty source", &source_text);
            return UnitOutcome::Skipped;
        }

        let target_index = unit.find_child(scope, XLIFF_NS, "target");
        let target_text = target_index
            .and_then(|index| unit.child_element(index))
            .map(XmlElement::text)
            .unwrap_or_default();

        if !self.should_translate(&source_text, &target_text) {
            debug!("{}: unit {:?} already translated", file_label, unit_id);
            self.logger
                .skipped(file_label, unit_id, "target already translated", &source_text);
            return UnitOutcome::Skipped;
        }

        let tokenized = extract_text_with_tokens(&source);
        let protected = protect(&tokenized.text);
        let language = &self.options.target_language;

        let (translated, outcome) = match self.cache.get(&protected.text, &language.code) {
            Some(cached) => {
                self.logger.cached(file_label, unit_id, &source_text);
                let outcome = if cached.is_passthrough() {
                    UnitOutcome::CachedPassthrough
                } else {
                    UnitOutcome::CachedTranslation
                };
                (cached.text().to_string(), outcome)
            }
            None => match self
                .translator
                .translate_with_validation_detailed(
                    &protected.text,
                    &language.name,
                    protected.token_count(),
                    tokenized.nodes.len(),
                )
                .await
            {
                Ok(translation) => {
                    self.cache.store(
                        &protected.text,
                        &language.code,
                        CachedTranslation::Accepted(translation.clone()),
                    );
                    (translation, UnitOutcome::Translated)
                }
                Err(e) => {
                    warn!("{}: unit {:?} left untranslated: {}", file_label, unit_id, e);
                    self.logger
                        .failed(file_label, unit_id, &e.to_string(), &source_text);
                    self.cache.store(
                        &protected.text,
                        &language.code,
                        CachedTranslation::Passthrough(protected.text.clone()),
                    );
                    (protected.text.clone(), UnitOutcome::Failed)
                }
            },
        };

        let restored = restore(&translated, &protected.originals);
        let nodes = rehydrate_nodes_from_tokens(&restored, &tokenized.nodes);

        let target_index = match target_index {
            Some(index) => index,
            None => {
                let name = match source.prefix() {
                    Some(prefix) => format!("{}:target", prefix),
                    None => "target".to_string(),
                };
                unit.children
                    .insert(source_index + 1, XmlElement::new(name).into());
                source_index + 1
            }
        };
        if let Some(target) = unit.child_element_mut(target_index) {
            target.children = nodes;
        }

        outcome
    }

    fn should_translate(&self, source_text: &str, target_text: &str) -> bool {
        if target_text.trim().is_empty() {
            return true;
        }
        self.options.translate_if_target_same_as_source
            && normalize_whitespace(target_text) == normalize_whitespace(source_text)
    }
}

/// Collapse whitespace runs to single spaces and trim
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
