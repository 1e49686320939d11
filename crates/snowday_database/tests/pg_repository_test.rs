//! Tests for the PostgreSQL storyline repository.
//!
//! Tests marked `#[ignore]` need a running PostgreSQL instance reachable
//! through `DATABASE_URL`. Run them with `cargo test -- --ignored`.

use diesel::prelude::*;
use snowday_core::{
    AlignmentMap, Narration, ProcessedParagraph, QuestionKind, QuizQuestion, StorylineRequest,
    StorylineStatus, WordAlignment, strip_markup,
};
use snowday_database::{
    NewQuestion, NewStory, NewStorylineProgressBuilder, NewVocabBuilder, PgStorylineRepository,
    create_pool, run_migrations, schema,
};
use snowday_interface::{PersistPlan, StorylineRepository, TransactionLimits};

fn paragraph(index: usize, text: &str) -> ProcessedParagraph {
    let content = strip_markup(text);
    let first = text.split_whitespace().next().unwrap_or_default().to_string();
    let alignment = AlignmentMap::new(vec![WordAlignment {
        end_offset_utf32: first.chars().count(),
        text: first,
        start_time: 0.0,
        end_time: 0.4,
        start_offset_utf32: 0,
    }]);
    let questions = vec![
        QuizQuestion::new(
            QuestionKind::Select,
            "Pick the correct spelling.",
            "whale",
            vec!["wale".into(), "whale".into(), "whail".into()],
        )
        .unwrap(),
        QuizQuestion::new(
            QuestionKind::Comprehension,
            "Who swam?",
            "The whale",
            vec!["A crab".into(), "The whale".into()],
        )
        .unwrap(),
    ];
    ProcessedParagraph::new(
        index,
        content,
        Narration::new(format!("https://storage.test/para_{}.mp3", index), alignment),
        questions,
    )
}

fn request(vocab_id: i32, student_id: i32) -> StorylineRequest {
    StorylineRequest::builder()
        .words(vec!["whale".to_string(), "brave".to_string()])
        .genre("adventure")
        .location("the sea")
        .style("playful")
        .selected_interests(vec!["boats".to_string()])
        .friend("Otto")
        .vocab_id(vocab_id)
        .student_id(student_id)
        .build()
        .unwrap()
}

fn repository() -> PgStorylineRepository {
    dotenvy::dotenv().ok();
    let pool = create_pool().expect("DATABASE_URL must point at PostgreSQL");
    let mut conn = pool.get().expect("connection");
    run_migrations(&mut conn).expect("migrations");
    PgStorylineRepository::new(pool)
}

#[test]
fn test_question_row_carries_vocab_tags() {
    let p = paragraph(0, "Whale songs filled the bay.");
    let row = NewQuestion::from_question(&p.questions()[0], 42);
    assert_eq!(row.type_, "select");
    assert_eq!(row.key, "vocab_42_whale");
    assert_eq!(row.classroom, "vocab_42");
    assert_eq!(row.answers.as_deref(), Some("wale,whale,whail"));
}

#[test]
fn test_story_row_serializes_alignment() {
    let story = NewStory::from_paragraph(&paragraph(0, "Whale songs filled the bay.")).unwrap();
    assert_eq!(story.content, "Whale songs filled the bay.");
    assert_eq!(story.audio.as_deref(), Some("https://storage.test/para_0.mp3"));
    let map = story.map.unwrap();
    assert!(map.contains("\"startOffsetUtf32\":0"));
    assert!(map.contains("\"endOffsetUtf32\":5"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_commit_writes_everything_and_completes() {
    let repo = repository();
    let record = repo.create_storyline(&request(1, 1)).await.unwrap();
    assert_eq!(*record.status(), StorylineStatus::Pending);

    let plan = PersistPlan::new(
        *record.id(),
        7,
        vec![paragraph(1, "A brave crab waved."), paragraph(0, "Whale songs filled the bay.")],
    );
    let summary = repo
        .commit_storyline(&plan, &TransactionLimits::default())
        .await
        .unwrap();
    assert_eq!(summary.story_ids.len(), 2);
    assert_eq!(summary.step_ids.len(), 2);
    assert_eq!(summary.question_ids.len(), 4);

    let loaded = repo.load_storyline(*record.id()).await.unwrap().unwrap();
    assert_eq!(*loaded.status(), StorylineStatus::Completed);

    let mut conn = repo.pool().get().unwrap();
    let steps: Vec<(i32, i32)> = schema::storyline_step::table
        .filter(schema::storyline_step::storyline_id.eq(*record.id()))
        .select((schema::storyline_step::step, schema::storyline_step::story_id))
        .order(schema::storyline_step::step)
        .load(&mut conn)
        .unwrap();
    assert_eq!(steps, vec![(1, summary.story_ids[0]), (2, summary.story_ids[1])]);
    let first: String = schema::story::table
        .find(summary.story_ids[0])
        .select(schema::story::content)
        .first(&mut conn)
        .unwrap();
    assert_eq!(first, "Whale songs filled the bay.");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_commit_for_missing_storyline_writes_nothing() {
    let repo = repository();
    let mut conn = repo.pool().get().unwrap();
    let before: i64 = schema::story::table.count().get_result(&mut conn).unwrap();

    let plan = PersistPlan::new(i32::MAX, 7, vec![paragraph(0, "Whale songs filled the bay.")]);
    let err = repo
        .commit_storyline(&plan, &TransactionLimits::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));

    let after: i64 = schema::story::table.count().get_result(&mut conn).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_failed_storyline_rejects_commit() {
    let repo = repository();
    let record = repo.create_storyline(&request(1, 1)).await.unwrap();
    repo.mark_failed(*record.id()).await.unwrap();

    let plan = PersistPlan::new(*record.id(), 7, vec![paragraph(0, "Whale songs filled the bay.")]);
    let err = repo
        .commit_storyline(&plan, &TransactionLimits::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid storyline status transition"));

    let mut conn = repo.pool().get().unwrap();
    let steps: i64 = schema::storyline_step::table
        .filter(schema::storyline_step::storyline_id.eq(*record.id()))
        .count()
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(steps, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_reset_clears_content() {
    let repo = repository();
    let record = repo.create_storyline(&request(1, 1)).await.unwrap();
    let plan = PersistPlan::new(*record.id(), 7, vec![paragraph(0, "Whale songs filled the bay.")]);
    let summary = repo
        .commit_storyline(&plan, &TransactionLimits::default())
        .await
        .unwrap();

    assert!(repo.reset_storyline(*record.id()).await.unwrap());
    let loaded = repo.load_storyline(*record.id()).await.unwrap().unwrap();
    assert_eq!(*loaded.status(), StorylineStatus::Pending);

    let mut conn = repo.pool().get().unwrap();
    let stories: i64 = schema::story::table
        .filter(schema::story::id.eq_any(&summary.story_ids))
        .count()
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(stories, 0);
    let questions: i64 = schema::question::table
        .filter(schema::question::id.eq_any(&summary.question_ids))
        .count()
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(questions, 0);

    assert!(!repo.reset_storyline(i32::MAX).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_progress_joins_select_questions_for_student() {
    let repo = repository();
    let mut conn = repo.pool().get().unwrap();
    let vocab_id: i32 = diesel::insert_into(schema::vocab::table)
        .values(&NewVocabBuilder::default().title("Ocean").list("whale, brave").build().unwrap())
        .returning(schema::vocab::id)
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(
        repo.vocab_words(vocab_id).await.unwrap().as_deref(),
        Some("whale, brave")
    );
    assert_eq!(repo.vocab_words(i32::MAX).await.unwrap(), None);

    let record = repo.create_storyline(&request(vocab_id, 9001)).await.unwrap();
    let plan = PersistPlan::new(*record.id(), vocab_id, vec![paragraph(0, "Whale songs filled the bay.")]);
    let summary = repo
        .commit_storyline(&plan, &TransactionLimits::default())
        .await
        .unwrap();

    let links: Vec<i32> = schema::story_question::table
        .filter(schema::story_question::story_id.eq(summary.story_ids[0]))
        .select(schema::story_question::id)
        .order(schema::story_question::id)
        .load(&mut conn)
        .unwrap();
    for link in links {
        diesel::insert_into(schema::storyline_progress::table)
            .values(
                &NewStorylineProgressBuilder::default()
                    .storyline_id(*record.id())
                    .storyline_step_id(summary.step_ids[0])
                    .story_question_id(link)
                    .student_id(9001)
                    .attempts(Some(3_i32))
                    .duration(Some(50_i32))
                    .build()
                    .unwrap(),
            )
            .execute(&mut conn)
            .unwrap();
    }

    let progress = repo.student_progress(9001).await.unwrap();
    assert!(!progress.is_empty());
    assert!(progress.iter().all(|p| p.word == "whale"));
    assert!(progress.iter().all(|p| p.attempts == Some(3)));
}
