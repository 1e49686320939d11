mod common;

use common::*;
use snowday_core::{GenerationTask, QuestionKind, strip_markup};
use snowday_error::{GenerationError, GenerationErrorKind, SnowdayErrorKind};
use snowday_narrative::{QuestionSynthesizer, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;

fn synthesizer(generator: Arc<MockGenerator>) -> QuestionSynthesizer {
    QuestionSynthesizer::new(routed(generator), RetryPolicy::linear(3, Duration::from_millis(500)), 3, 2..=5)
}

#[tokio::test]
async fn test_select_question_answer_set() {
    let generator = Arc::new(MockGenerator::new("unused"));
    let question = synthesizer(generator).select_question("whale").await.unwrap();

    assert_eq!(*question.kind(), QuestionKind::Select);
    assert_eq!(question.prompt(), "Pick the correct spelling.");
    assert_eq!(question.correct(), "whale");
    assert_eq!(question.answers().iter().filter(|a| *a == "whale").count(), 1);
    assert!(question.answers().len() <= 4);
    assert!(question.answers().iter().all(|a| !a.contains(',')));
    let mut sorted = question.answers().clone();
    sorted.sort();
    assert_eq!(sorted, vec!["whale", "whalewhale", "whalex", "xwhale"]);
}

#[tokio::test(start_paused = true)]
async fn test_select_question_retries_malformed() {
    let attempts = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let seen = attempts.clone();
    let generator = Arc::new(MockGenerator::new("unused").with(GenerationTask::Misspellings, move |_| {
        let n = seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(if n == 0 { "[1, 2, 3]".to_string() } else { r#"["brav"]"#.to_string() })
    }));

    let question = synthesizer(generator.clone()).select_question("brave").await.unwrap();
    assert_eq!(question.answers().len(), 2);
    assert_eq!(generator.calls(GenerationTask::Misspellings), 2);
}

#[tokio::test(start_paused = true)]
async fn test_comprehension_answers_out_of_bounds_exhaust_budget() {
    let generator = Arc::new(
        MockGenerator::new("unused").with(GenerationTask::ComprehensionAnswers, |_| Ok("Only one answer".to_string())),
    );
    let start = tokio::time::Instant::now();

    let err = synthesizer(generator.clone())
        .comprehension_question(&strip_markup("The brave whale sang."))
        .await
        .unwrap_err();

    match err.kind() {
        SnowdayErrorKind::Generation(GenerationError {
            kind: GenerationErrorKind::RetryBudgetExhausted { operation, attempts, .. },
            ..
        }) => {
            assert_eq!(operation, "comprehension answers");
            assert_eq!(*attempts, 3);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(generator.calls(GenerationTask::ComprehensionQuestion), 1);
    assert_eq!(generator.calls(GenerationTask::ComprehensionAnswers), 3);
    assert_eq!(start.elapsed(), Duration::from_millis(1500));
}

#[tokio::test]
async fn test_comprehension_first_answer_is_correct() {
    let generator = Arc::new(MockGenerator::new("unused"));
    let question = synthesizer(generator)
        .comprehension_question(&strip_markup("The brave whale sang."))
        .await
        .unwrap();

    assert_eq!(*question.kind(), QuestionKind::Comprehension);
    assert_eq!(question.prompt(), "Who was the hero?");
    assert_eq!(question.correct(), "The whale");
    assert_eq!(question.answers().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_empty_question_is_retried() {
    let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let seen = calls.clone();
    let generator = Arc::new(MockGenerator::new("unused").with(GenerationTask::ComprehensionQuestion, move |_| {
        let n = seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(if n < 2 { String::new() } else { "Where did the whale go?".to_string() })
    }));

    let question = synthesizer(generator)
        .comprehension_question(&strip_markup("The brave whale sang."))
        .await
        .unwrap();
    assert_eq!(question.prompt(), "Where did the whale go?");
}
