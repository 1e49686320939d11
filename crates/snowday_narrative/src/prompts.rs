//! Prompt construction for every generation task.

use crate::NarrativeFramework;
use snowday_core::{GenerateRequest, GenerationTask, Message, StorylineRequest};

const CHAPTER_INSTRUCTIONS: &str = "You are an expert fiction writer for elementary students. \
You write one chapter at a time, each about 150 words. Your output is always in markdown format.";

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

fn student_line(request: &StorylineRequest) -> String {
    match (request.student_name(), request.student_age()) {
        (Some(name), Some(age)) => format!("The reader is {}, who is {} years old.", name, age),
        (Some(name), None) => format!("The reader is {}.", name),
        (None, Some(age)) => format!("The reader is {} years old.", age),
        (None, None) => String::new(),
    }
}

fn interests(request: &StorylineRequest) -> String {
    if request.selected_interests().is_empty() {
        "nothing in particular".to_string()
    } else {
        request.selected_interests().join(", ")
    }
}

/// Single-shot prompt for a whole story.
pub(crate) fn draft(request: &StorylineRequest, paragraphs: usize) -> GenerateRequest {
    let prompt = format!(
        "Write a {genre} story set in {location} in the style of {style}.\n\
         The main character's friend is {friend}. The reader is interested in {interests}.\n\
         {student}\n\
         The story must include the following words: {words}.\n\
         Separate paragraphs with a blank line. Make the story about {paragraphs} paragraphs long.",
        genre = or_default(request.genre(), "adventure"),
        location = or_default(request.location(), "a place of your choosing"),
        style = or_default(request.style(), "a classic children's book"),
        friend = or_default(request.friend(), "a loyal companion"),
        interests = interests(request),
        student = student_line(request),
        words = request.required_words().join(", "),
        paragraphs = paragraphs,
    );
    GenerateRequest::prompt(GenerationTask::Draft, prompt)
}

/// Prompt for one framework chapter.
pub(crate) fn chapter(
    request: &StorylineRequest,
    framework: &NarrativeFramework,
    index: usize,
    goal: &str,
    words: &[String],
    previous: Option<&str>,
) -> GenerateRequest {
    let system = format!(
        "{} Stories have {} chapters, each corresponding to a step in the {}.",
        CHAPTER_INSTRUCTIONS,
        framework.len(),
        framework.display_name()
    );
    let prompt = format!(
        "Write the {ordinal} chapter that should {goal}\n\n\
         Story Description:\n\
         Write a {genre} story located in {location} in the style of {style}. It should be very silly.\n\
         {student}\n\
         The chapter must include the following words: {words}.\n\n\
         Previous Chapter:\n{previous}",
        ordinal = NarrativeFramework::ordinal(index),
        goal = goal,
        genre = or_default(request.genre(), "adventure"),
        location = or_default(request.location(), "a place of your choosing"),
        style = or_default(request.style(), "a classic children's book"),
        student = student_line(request),
        words = words.join(", "),
        previous = previous.unwrap_or("(this is the first chapter)"),
    );
    GenerateRequest::new(
        GenerationTask::Chapter,
        vec![Message::system(system), Message::user(prompt)],
    )
}

/// Rewrite a paragraph so it contains the missing words.
pub(crate) fn rewrite(paragraph: &str, missing: &[String]) -> GenerateRequest {
    let prompt = format!(
        "Rewrite the following paragraph to include the words: {}.\n\
         Keep the meaning and tone of the original paragraph as much as possible.\n\n\
         Original paragraph:\n\"{}\"\n\n\
         Rewritten paragraph:",
        missing.join(", "),
        paragraph
    );
    GenerateRequest::prompt(GenerationTask::Rewrite, prompt)
}

/// Ask for plausible misspellings of a word as JSON.
pub(crate) fn misspellings(word: &str, count: usize) -> GenerateRequest {
    let prompt = format!(
        "Generate {} incorrect spellings of the word \"{}\". \
         Respond with only a JSON object of the form {{\"answers\": [\"...\"]}}.",
        count, word
    );
    GenerateRequest::prompt(GenerationTask::Misspellings, prompt)
}

/// Ask for one comprehension question about a paragraph.
pub(crate) fn comprehension_question(paragraph: &str) -> GenerateRequest {
    let prompt = format!(
        "Write one short reading comprehension question for a young reader about this paragraph. \
         Respond with only the question.\n\nParagraph:\n{}",
        paragraph
    );
    GenerateRequest::prompt(GenerationTask::ComprehensionQuestion, prompt)
}

/// Ask for candidate answers, correct answer first.
pub(crate) fn comprehension_answers(paragraph: &str, question: &str) -> GenerateRequest {
    let prompt = format!(
        "Paragraph:\n{}\n\nQuestion: {}\n\n\
         Give 3 or 4 short answers to the question as a single comma-separated line. \
         The first answer must be the correct one; the others must be plausible but wrong. \
         Do not use commas inside an answer.",
        paragraph, question
    );
    GenerateRequest::prompt(GenerationTask::ComprehensionAnswers, prompt)
}
