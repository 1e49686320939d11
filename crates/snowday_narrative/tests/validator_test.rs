mod common;

use common::*;
use snowday_core::{GenerationTask, strip_markup};
use snowday_error::{GenerationError, GenerationErrorKind, SnowdayErrorKind};
use snowday_narrative::ConstraintValidator;
use std::sync::Arc;

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn validator(generator: Arc<MockGenerator>, max_attempts: i32) -> ConstraintValidator {
    ConstraintValidator::new(routed(generator), max_attempts, 0)
}

#[tokio::test]
async fn test_no_required_words_returns_text_untouched() {
    let generator = Arc::new(MockGenerator::new("unused"));
    let text = strip_markup("Anything at all.");

    let result = validator(generator.clone(), 3).validate(text.clone(), &[]).await.unwrap();
    assert_eq!(result, text);
    assert_eq!(generator.total_calls(), 0);
}

#[tokio::test]
async fn test_one_missing_word_converges_in_one_rewrite() {
    let generator = Arc::new(MockGenerator::new("unused"));
    let required = words(&["whale", "brave"]);

    let result = validator(generator.clone(), 3)
        .validate(strip_markup("The whale swam."), &required)
        .await
        .unwrap();

    assert_eq!(result.as_str(), "The whale swam. Then came brave.");
    assert_eq!(generator.calls(GenerationTask::Rewrite), 1);
    let prompt = &generator.prompts(GenerationTask::Rewrite)[0];
    assert!(prompt.contains("include the words: brave."));
}

#[tokio::test]
async fn test_rewrite_output_is_stripped() {
    let generator = Arc::new(
        MockGenerator::new("unused")
            .with(GenerationTask::Rewrite, |_| Ok("The *whale* was **brave**.\n\nThe end.".to_string())),
    );
    let result = validator(generator, 3)
        .validate(strip_markup("The whale swam."), &words(&["whale", "brave"]))
        .await
        .unwrap();
    assert_eq!(result.as_str(), "The whale was brave. The end.");
}

#[tokio::test]
async fn test_exhausted_after_max_rounds() {
    let generator = Arc::new(
        MockGenerator::new("unused").with(GenerationTask::Rewrite, |_| Ok("The whale swam again.".to_string())),
    );

    let err = validator(generator.clone(), 3)
        .validate(strip_markup("The whale swam."), &words(&["whale", "brave"]))
        .await
        .unwrap_err();

    match err.kind() {
        SnowdayErrorKind::Generation(GenerationError {
            kind: GenerationErrorKind::ValidationExhausted { missing },
            ..
        }) => assert_eq!(missing, &words(&["brave"])),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(generator.calls(GenerationTask::Rewrite), 3);
}

#[tokio::test]
async fn test_zero_attempts_fails_without_calls() {
    let generator = Arc::new(MockGenerator::new("unused"));
    let err = validator(generator.clone(), 0)
        .validate(strip_markup("The whale swam."), &words(&["whale", "brave"]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("brave"));
    assert_eq!(generator.total_calls(), 0);
}

#[tokio::test]
async fn test_empty_rewrite_fails() {
    let generator = Arc::new(MockGenerator::new("unused").with(GenerationTask::Rewrite, |_| Ok("   ".to_string())));
    let err = validator(generator, 3)
        .validate(strip_markup("The whale swam."), &words(&["whale", "brave"]))
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        SnowdayErrorKind::Generation(GenerationError { kind: GenerationErrorKind::Empty(_), .. })
    ));
}

#[tokio::test]
async fn test_all_words_missing_is_accepted_as_is() {
    // Missing count already at the allowed ceiling: accepted without rewrite.
    let generator = Arc::new(MockGenerator::new("unused"));
    let text = strip_markup("A quiet day by the sea.");

    let result = validator(generator.clone(), 3)
        .validate(text.clone(), &words(&["whale", "brave"]))
        .await
        .unwrap();
    assert_eq!(result, text);
    assert_eq!(generator.total_calls(), 0);
}

#[tokio::test]
async fn test_tolerance_covering_all_words_accepts() {
    let generator = Arc::new(MockGenerator::new("unused"));
    let validator = ConstraintValidator::new(routed(generator.clone()), 3, 2);
    let text = strip_markup("The whale swam.");

    let result = validator.validate(text.clone(), &words(&["whale", "brave"])).await.unwrap();
    assert_eq!(result, text);
    assert_eq!(generator.total_calls(), 0);
}
