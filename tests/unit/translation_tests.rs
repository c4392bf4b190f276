/*!
 * Tests for placeholder protection, candidate validation and the attempt ladder
 */

use std::sync::Arc;
use xliffwai::app_config::AttemptPolicy;
use xliffwai::errors::{ProviderError, TranslationError};
use xliffwai::providers::mock::MockProvider;
use xliffwai::translation::{TranslationService, protect, restore};
use xliffwai::validation::{ValidationIssue, ValidationService};

use crate::common;

#[test]
fn test_protect_withMixedPlaceholders_shouldNumberInPatternOrder() {
    let protected = protect("Hi {0}, you have %d items in #[cart] for ${user}");

    assert_eq!(protected.token_count(), 4);
    assert_eq!(
        protected.text,
        "Hi __XLF_PH_1__, you have __XLF_PH_3__ items in __XLF_PH_0__ for $__XLF_PH_2__"
    );
    assert_eq!(restore(&protected.text, &protected.originals), "Hi {0}, you have %d items in #[cart] for ${user}");
}

#[test]
fn test_restore_withReorderedTokens_shouldFollowTranslation() {
    let protected = protect("{0} of {1}");
    let translated = "__XLF_PH_1__ sur __XLF_PH_0__";
    assert_eq!(protected.text, "__XLF_PH_0__ of __XLF_PH_1__");
    assert_eq!(restore(translated, &protected.originals), "{1} sur {0}");
}

#[test]
fn test_check_shouldApplyRulesInOrder() {
    let validator = ValidationService::new();

    assert_eq!(
        validator.check("Save", None, 0, 0),
        Err(ValidationIssue::EmptyCandidate)
    );
    assert_eq!(
        validator.check("Delete __XLF_PH_0__", Some("Supprimer"), 1, 0),
        Err(ValidationIssue::MissingPlaceholderTokens(vec![0]))
    );
    assert_eq!(
        validator.check("Click __XLF_TAG_0__", Some("Cliquez ici"), 0, 1),
        Err(ValidationIssue::MissingMarkupTokens(vec![0]))
    );
    assert_eq!(
        validator.check(
            "__XLF_TAG_0__ and __XLF_TAG_1__",
            Some("__XLF_TAG_1__ et __XLF_TAG_0__"),
            0,
            2
        ),
        Err(ValidationIssue::MarkupTokensOutOfOrder)
    );
    assert!(matches!(
        validator.check("Save", Some("Translate ONLY the text: Enregistrer"), 0, 0),
        Err(ValidationIssue::PromptLeakage(_))
    ));
    assert!(matches!(
        validator.check("Save", Some("Enregistrer ".repeat(10).as_str()), 0, 0),
        Err(ValidationIssue::RunawayOutput { .. })
    ));
    assert_eq!(validator.check("Save", Some("  Enregistrer "), 0, 0), Ok(()));
}

#[tokio::test]
async fn test_ladder_withFirstCandidateRejected_shouldUseSecondAttempt() {
    let provider = MockProvider::working().with_script(vec![
        Ok("Supprimer".to_string()),
        Ok("Supprimer __XLF_PH_0__".to_string()),
    ]);
    let service = TranslationService::with_provider(Arc::new(provider.clone()), &common::test_config());

    let result = service
        .translate_with_validation("Delete __XLF_PH_0__", "French", 1, 0)
        .await;

    assert_eq!(result.as_deref(), Some("Supprimer __XLF_PH_0__"));
    let budgets: Vec<u32> = provider
        .requests()
        .iter()
        .map(|request| request.max_tokens)
        .collect();
    assert_eq!(budgets, vec![256, 64]);
}

#[tokio::test]
async fn test_ladder_withProviderErrors_shouldRejectAfterEveryAttempt() {
    let provider = MockProvider::failing();
    let mut config = common::test_config();
    config.translation.attempts = vec![AttemptPolicy::new(100), AttemptPolicy::new(50), AttemptPolicy::new(25)];
    let service = TranslationService::with_provider(Arc::new(provider.clone()), &config);

    let result = service
        .translate_with_validation_detailed("Save", "French", 0, 0)
        .await;

    match result {
        Err(TranslationError::Rejected { attempts, reason }) => {
            assert_eq!(attempts, 3);
            assert_eq!(reason, "empty candidate");
        }
        other => panic!("expected a rejection, got {:?}", other),
    }
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_translate_withWhitespaceOnly_shouldNotCallProvider() {
    let provider = MockProvider::working();
    let service = TranslationService::with_provider(Arc::new(provider.clone()), &common::test_config());

    assert_eq!(service.translate("   ", "French", 64).await.unwrap(), "   ");
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_translate_shouldSurfaceProviderErrors() {
    let provider = MockProvider::working().with_script(vec![Err(ProviderError::EmptyResponse)]);
    let service = TranslationService::with_provider(Arc::new(provider), &common::test_config());

    let result = service.translate("Save", "French", 64).await;
    assert!(matches!(result, Err(ProviderError::EmptyResponse)));
    assert_eq!(service.usage().requests, 1);
}
