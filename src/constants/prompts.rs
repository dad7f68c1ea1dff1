use rand::rng;
use rand::seq::IndexedRandom;

use crate::models::domain::session::Difficulty;

pub const SYSTEM_PROMPT: &str = "You are an expert test creator for English proficiency and aptitude exams. You respond with a single JSON document and nothing else: no markdown fences, no commentary.";

pub const ACADEMIC_TOPICS: &[&str] = &[
    "environmental conservation",
    "digital technology",
    "global education",
    "public health",
    "cultural diversity",
    "urban development",
    "scientific research",
    "economic growth",
    "social media impact",
    "renewable energy",
    "artificial intelligence",
    "climate change",
    "online learning",
    "transportation systems",
    "workplace communication",
    "international trade",
    "mental wellbeing",
    "sustainable living",
    "innovation trends",
    "community development",
    "space exploration",
    "cultural heritage",
    "scientific discoveries",
    "global economics",
];

pub fn random_topic() -> &'static str {
    ACADEMIC_TOPICS
        .choose(&mut rng())
        .copied()
        .unwrap_or("global education")
}

fn difficulty_guidance(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "basic arithmetic, simple patterns, straightforward logic",
        Difficulty::Medium => "multi-step problems, moderate reasoning, percentages",
        Difficulty::Hard => "complex calculations, advanced logic, data interpretation",
    }
}

pub fn aptitude_prompt(difficulty: Difficulty, count: usize, schema: &str) -> String {
    format!(
        "Generate EXACTLY {count} aptitude questions for {difficulty} level.

REQUIREMENTS:
1. Question types: math, logic, reasoning, patterns, word problems.
2. At {difficulty} level focus on {guidance}.
3. Every question has type \"multiple_choice\", EXACTLY 4 options and exactly one correct option.
4. The \"correct\" field repeats the correct option text verbatim.
5. Include a brief explanation (1-2 sentences).

Return a JSON object matching this schema:
{schema}

Count your questions: the \"questions\" array must contain exactly {count} items.",
        count = count,
        difficulty = difficulty,
        guidance = difficulty_guidance(difficulty),
        schema = schema,
    )
}

pub struct PassagePrompt<'a> {
    pub difficulty: Difficulty,
    pub topic: &'a str,
    pub fill_blank: usize,
    pub true_false_not_given: usize,
    pub min_words: usize,
    pub max_words: usize,
    pub spoken: bool,
}

pub fn passage_prompt(prompt: &PassagePrompt<'_>, schema: &str) -> String {
    let (kind, style, marker) = if prompt.spoken {
        (
            "listening comprehension",
            "Write in a natural speaking style suitable for audio narration.",
            "The speaker mentions that something is __________.",
        )
    } else {
        (
            "reading comprehension",
            "Use 3-4 well-structured paragraphs with enough detail to support every question.",
            "The passage mentions that something is __________.",
        )
    };

    format!(
        "Generate a {kind} passage for a {difficulty} level English test.

REQUIREMENTS:
1. Topic: {topic}.
2. The passage MUST be {min}-{max} words. Short passages are rejected.
3. {style}
4. EXACTLY 5 questions:
   - {fill} questions of type \"fill_blank\": one blank written as __________ and a single-word \"correct_answer\", e.g. \"{marker}\"
   - {tfng} questions of type \"true_false_not_given\" with options [\"True\", \"False\", \"Not Given\"] and \"correct_answer\" set to one of them.
5. Give the passage an engaging \"title\".

Return a JSON object matching this schema:
{schema}",
        kind = kind,
        difficulty = prompt.difficulty,
        topic = prompt.topic,
        min = prompt.min_words,
        max = prompt.max_words,
        style = style,
        fill = prompt.fill_blank,
        tfng = prompt.true_false_not_given,
        marker = marker,
        schema = schema,
    )
}
