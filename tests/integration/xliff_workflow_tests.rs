/*!
 * Integration tests for whole-document translation
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use xliffwai::errors::ProviderError;
use xliffwai::providers::mock::MockProvider;
use xliffwai::language_utils::normalize_language;
use xliffwai::translation::{TranslationCache, TranslationService};
use xliffwai::xliff::{
    FileStats, NullTranslationLogger, ProcessingOptions, XLIFF_NS, XliffProcessor, XmlDocument,
};

use crate::common::{self, RecordingLogger};

async fn translate(processor: &XliffProcessor, xml: &str) -> (FileStats, String) {
    let mut document = XmlDocument::parse(xml).unwrap();
    let stats = processor
        .translate_document(&mut document, "app.xlf", |_, _| {})
        .await
        .unwrap();
    (stats, document.to_xml_string().unwrap())
}

fn assert_counts_add_up(stats: &FileStats) {
    assert_eq!(
        stats.translated + stats.skipped + stats.failures,
        stats.total_units,
        "{:?}",
        stats
    );
}

#[tokio::test]
async fn test_translateDocument_withPlaceholder_shouldRestoreItInTarget() {
    common::init_logging();
    let provider = MockProvider::working().with_translation("Delete __XLF_PH_0__", "Supprimer __XLF_PH_0__");
    let logger = RecordingLogger::new();
    let processor = common::mock_processor(provider.clone(), "French", logger.clone());

    let xml = common::xliff_document(&common::trans_unit("1", "Delete {0}", None));
    let (stats, output) = translate(&processor, &xml).await;

    assert_eq!(stats.translated, 1);
    assert_eq!(stats.failures, 0);
    assert!(output.contains("<source>Delete {0}</source><target>Supprimer {0}</target>"));
    assert!(output.contains(r#"target-language="fr""#));
    assert_eq!(provider.request_count(), 1);
    assert!(provider.requests()[0].user_prompt().contains("into French."));
    assert!(logger.events().is_empty());
}

#[tokio::test]
async fn test_translateDocument_withDroppedMarkupToken_shouldWriteSourceMarkup() {
    let provider = MockProvider::working().with_translation("Click __XLF_TAG_0__", "Cliquez ici");
    let logger = RecordingLogger::new();
    let processor = common::mock_processor(provider.clone(), "fr", logger.clone());

    let xml = common::xliff_document(&common::trans_unit("7", r#"Click <g id="1">here</g>"#, None));
    let (stats, output) = translate(&processor, &xml).await;

    assert_eq!(stats.failures, 1);
    assert_eq!(stats.translated, 0);
    assert!(output.contains(r#"<target>Click <g id="1">here</g></target>"#));
    assert_eq!(provider.request_count(), 2);

    let failed = logger.events_at("FAILED");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].unit_id.as_deref(), Some("7"));
    assert_eq!(failed[0].file, "app.xlf");
    assert!(failed[0].reason.contains("missing markup tokens"));
    assert_eq!(failed[0].source, "Click here");
}

#[tokio::test]
async fn test_translateDocument_withKeptMarkupToken_shouldRehydrateElement() {
    let provider = MockProvider::working()
        .with_translation("Click __XLF_TAG_0__ now", "Cliquez __XLF_TAG_0__ maintenant");
    let processor = common::mock_processor(provider, "fr", RecordingLogger::new());

    let xml = common::xliff_document(&common::trans_unit("1", r#"Click <b>here</b> now"#, None));
    let (stats, output) = translate(&processor, &xml).await;

    assert_eq!(stats.translated, 1);
    assert!(output.contains("<target>Cliquez <b>here</b> maintenant</target>"));
}

#[tokio::test]
async fn test_translateDocument_withCdataCommentAndPi_shouldRehydrateTarget() {
    let provider = MockProvider::working().with_translation(
        "A __XLF_TAG_0__ __XLF_TAG_1__ __XLF_TAG_2__ B",
        "Z __XLF_TAG_0__ __XLF_TAG_1__ __XLF_TAG_2__ Y",
    );
    let processor = common::mock_processor(provider, "fr", RecordingLogger::new());

    let xml = common::xliff_document(&common::trans_unit(
        "1",
        "A <![CDATA[x]]> <!--c--> <?pi d?> B",
        None,
    ));
    let (stats, output) = translate(&processor, &xml).await;

    assert_eq!(stats.translated, 1);
    assert_eq!(stats.failures, 0);
    assert!(output.contains("<source>A <![CDATA[x]]> <!--c--> <?pi d?> B</source>"));
    assert!(output.contains("<target>Z <![CDATA[x]]> <!--c--> <?pi d?> Y</target>"));
}

#[tokio::test]
async fn test_translateDocument_withRepeatedSource_shouldTranslateOnce() {
    let provider = MockProvider::working();
    let logger = RecordingLogger::new();
    let processor = common::mock_processor(provider.clone(), "fr", logger.clone());

    let units = [
        common::trans_unit("1", "Save", None),
        common::trans_unit("2", "Save", None),
    ]
    .join("\n");
    let (stats, output) = translate(&processor, &common::xliff_document(&units)).await;

    assert_eq!(provider.request_count(), 1);
    assert_eq!(stats.translated, 2);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(output.matches("<target>[TRANSLATED] Save</target>").count(), 2);

    let cached = logger.events_at("CACHED");
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].unit_id.as_deref(), Some("2"));
    assert_counts_add_up(&stats);
}

#[tokio::test]
async fn test_translateDocument_withCacheDisabled_shouldCallEveryTime() {
    let provider = MockProvider::working();
    let mut config = common::test_config();
    config.processing.use_cache = false;
    let processor = common::processor_with_config(provider.clone(), &config, RecordingLogger::new());

    let units = [
        common::trans_unit("1", "Save", None),
        common::trans_unit("2", "Save", None),
    ]
    .join("\n");
    let (stats, _) = translate(&processor, &common::xliff_document(&units)).await;

    assert_eq!(provider.request_count(), 2);
    assert_eq!(stats.cache_hits, 0);
    assert_eq!(stats.translated, 2);
}

#[tokio::test]
async fn test_translateDocument_withRepeatedFailure_shouldReusePassthrough() {
    let provider = MockProvider::failing();
    let logger = RecordingLogger::new();
    let processor = common::mock_processor(provider.clone(), "fr", logger.clone());

    let units = [
        common::trans_unit("1", "Save", None),
        common::trans_unit("2", "Save", None),
    ]
    .join("\n");
    let (stats, output) = translate(&processor, &common::xliff_document(&units)).await;

    assert_eq!(provider.request_count(), 2);
    assert_eq!(stats.failures, 2);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.translated, 0);
    assert_eq!(output.matches("<target>Save</target>").count(), 2);
    assert_eq!(logger.events_at("FAILED").len(), 1);
    assert_eq!(logger.events_at("CACHED").len(), 1);
}

#[tokio::test]
async fn test_translateDocument_skipPolicy_shouldFollowConfiguration() {
    let units = [
        common::trans_unit("same", "Save", Some("Save")),
        common::trans_unit("done", "Open", Some("Ouvrir")),
        common::trans_unit("spaced", "Close  file", Some(" Close file ")),
    ]
    .join("\n");
    let xml = common::xliff_document(&units);

    let retranslate = common::mock_processor(MockProvider::working(), "fr", RecordingLogger::new());
    let (stats, output) = translate(&retranslate, &xml).await;
    assert_eq!(stats.translated, 2);
    assert_eq!(stats.skipped, 1);
    assert!(output.contains("<target>[TRANSLATED] Save</target>"));
    assert!(output.contains("<target>Ouvrir</target>"));
    assert!(output.contains("<target>[TRANSLATED] Close  file</target>"));

    let mut config = common::test_config();
    config.processing.translate_if_target_same_as_source = false;
    let logger = RecordingLogger::new();
    let only_missing = common::processor_with_config(MockProvider::working(), &config, logger.clone());
    let (stats, output) = translate(&only_missing, &xml).await;
    assert_eq!(stats.translated, 0);
    assert_eq!(stats.skipped, 3);
    assert!(output.contains("<target>Save</target>"));
    assert!(
        logger
            .events_at("SKIPPED")
            .iter()
            .all(|event| event.reason == "target already translated")
    );
}

#[tokio::test]
async fn test_translateDocument_withoutUsableSource_shouldSkipAndLog() {
    let provider = MockProvider::working();
    let logger = RecordingLogger::new();
    let processor = common::mock_processor(provider.clone(), "fr", logger.clone());

    let units = [
        r#"      <trans-unit id="nosource"><note>orphan</note></trans-unit>"#.to_string(),
        common::trans_unit("blank", "   ", None),
        r#"      <trans-unit id="selfclosing"><source/></trans-unit>"#.to_string(),
    ]
    .join("\n");
    let (stats, output) = translate(&processor, &common::xliff_document(&units)).await;

    assert_eq!(stats.total_units, 3);
    assert_eq!(stats.skipped, 3);
    assert_eq!(provider.request_count(), 0);
    assert!(!output.contains("<target"));

    let reasons: Vec<(Option<String>, String)> = logger
        .events_at("SKIPPED")
        .into_iter()
        .map(|event| (event.unit_id, event.reason))
        .collect();
    assert_eq!(
        reasons,
        vec![
            (Some("nosource".to_string()), "missing source".to_string()),
            (Some("blank".to_string()), "empty source".to_string()),
            (Some("selfclosing".to_string()), "empty source".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_translateDocument_shouldInsertTargetAfterSource() {
    let processor = common::mock_processor(MockProvider::working(), "de", RecordingLogger::new());
    let xml = common::xliff_document(
        r#"      <trans-unit id="1"><note>first</note><source>Save</source><note>last</note></trans-unit>"#,
    );

    let (_, output) = translate(&processor, &xml).await;

    assert!(output.contains(
        "<note>first</note><source>Save</source><target>[TRANSLATED] Save</target><note>last</note>"
    ));
    assert!(output.contains(r#"target-language="de""#));
}

#[tokio::test]
async fn test_translateDocument_withPrefixedNamespace_shouldTranslateUnits() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<x:xliff version="1.2" xmlns:x="urn:oasis:names:tc:xliff:document:1.2">
  <x:file original="app" source-language="en" datatype="plaintext">
    <x:body>
      <x:trans-unit id="1"><x:source>Save</x:source></x:trans-unit>
    </x:body>
  </x:file>
</x:xliff>"#;
    let processor = common::mock_processor(MockProvider::working(), "fr", RecordingLogger::new());

    let (stats, output) = translate(&processor, xml).await;

    assert_eq!(stats.translated, 1);
    assert!(output.contains("<x:source>Save</x:source><x:target>[TRANSLATED] Save</x:target>"));
}

#[tokio::test]
async fn test_translateDocument_withForeignNamespace_shouldIgnoreUnits() {
    let xml = r#"<root xmlns="urn:example:other"><trans-unit id="1"><source>Save</source></trans-unit></root>"#;
    let provider = MockProvider::working();
    let config = common::test_config();
    let processor = XliffProcessor::new(
        TranslationService::with_provider(Arc::new(provider.clone()), &config),
        TranslationCache::new(true),
        Arc::new(NullTranslationLogger),
        ProcessingOptions::new(normalize_language("fr")),
    );

    let (stats, output) = translate(&processor, xml).await;

    assert_eq!(stats.total_units, 0);
    assert!(!output.contains("target-language"));
    assert_eq!(provider.request_count(), 0);
    let document = XmlDocument::parse(xml).unwrap();
    assert!(document.find_elements(XLIFF_NS, "trans-unit").is_empty());
}

#[tokio::test]
async fn test_translateDocument_withMixedUnits_shouldKeepCountsConsistent() {
    let provider = MockProvider::working()
        .with_script(vec![
            Ok("Enregistrer".to_string()),
            Err(ProviderError::ConnectionError("refused".to_string())),
            Ok("Translate ONLY this: Ouvrir".to_string()),
        ]);
    let processor = common::mock_processor(provider, "fr", RecordingLogger::new());

    let units = [
        common::trans_unit("1", "Save", None),
        common::trans_unit("2", "Open", None),
        common::trans_unit("3", "Save", None),
        common::trans_unit("4", "", None),
        common::trans_unit("5", "Close", Some("Fermer")),
    ]
    .join("\n");
    let (stats, output) = translate(&processor, &common::xliff_document(&units)).await;

    assert_eq!(stats.total_units, 5);
    assert_eq!(stats.translated, 2);
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.cache_hits, 1);
    assert!(output.contains("<source>Open</source><target>Open</target>"));
    assert_counts_add_up(&stats);
}

#[tokio::test]
async fn test_translateDocument_shouldReportProgressPerUnit() {
    let processor = common::mock_processor(MockProvider::working(), "fr", RecordingLogger::new());
    let units = [
        common::trans_unit("1", "A", None),
        common::trans_unit("2", "", None),
        common::trans_unit("3", "C", None),
    ]
    .join("\n");
    let mut document = XmlDocument::parse(&common::xliff_document(&units)).unwrap();

    let mut updates = Vec::new();
    processor
        .translate_document(&mut document, "app.xlf", |done, total| updates.push((done, total)))
        .await
        .unwrap();

    assert_eq!(updates, vec![(1, 3), (2, 3), (3, 3)]);
}

#[tokio::test]
async fn test_translateFile_withCancellation_shouldWriteNothing() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        dir.path(),
        "in/app.xlf",
        &common::xliff_document(&common::trans_unit("1", "Save", None)),
    )?;
    let output = dir.path().join("out").join("app.xlf");

    let cancel = Arc::new(AtomicBool::new(false));
    let provider = MockProvider::working();
    let processor = common::mock_processor(provider.clone(), "fr", RecordingLogger::new())
        .with_cancellation(Arc::clone(&cancel));
    cancel.store(true, Ordering::SeqCst);

    let error = processor.translate_file(&input, &output, |_, _| {}).await.unwrap_err();

    assert!(error.is_cancelled());
    assert!(!output.exists());
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_translateFile_shouldWriteOutputAndCountUnits() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let units = [
        common::trans_unit("1", "Save &amp; close", None),
        common::trans_unit("2", "Open", None),
    ]
    .join("\n");
    let input = common::create_test_file(dir.path(), "app.xlf", &common::xliff_document(&units))?;
    let output = dir.path().join("out").join("app.xlf");

    assert_eq!(XliffProcessor::count_trans_units(&input)?, 2);

    let processor = common::mock_processor(MockProvider::working(), "fr", RecordingLogger::new());
    let stats = processor.translate_file(&input, &output, |_, _| {}).await?;

    assert_eq!(stats.translated, 2);
    let written = fs::read_to_string(&output)?;
    assert!(written.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(written.contains("<target>[TRANSLATED] Save &amp; close</target>"));
    assert_eq!(XliffProcessor::count_trans_units(&output)?, 2);
    Ok(())
}

#[tokio::test]
async fn test_translateFile_withMalformedXml_shouldFailWithoutOutput() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_file(dir.path(), "broken.xlf", "<xliff><file></xliff>")?;
    let output = dir.path().join("out").join("broken.xlf");

    let processor = common::mock_processor(MockProvider::working(), "fr", RecordingLogger::new());
    let result = processor.translate_file(&input, &output, |_, _| {}).await;

    assert!(result.is_err());
    assert!(!output.exists());
    Ok(())
}
