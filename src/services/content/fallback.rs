//! Static content used when generation fails or is disabled.

use rand::rng;
use rand::seq::SliceRandom;

use crate::models::domain::question::{
    FillBlankQuestion, MultipleChoiceQuestion, Question, TfngAnswer, TrueFalseNotGivenQuestion,
};
use crate::models::domain::round::RoundKind;
use crate::services::content::{ContentBundle, ContentRequest, QuestionDistribution};

const APTITUDE_TITLE: &str = "Aptitude Assessment";

const APTITUDE_BANK: &[(&str, [&str; 4], &str, &str)] = &[
    ("What is 15 + 27?", ["42", "41", "43", "40"], "42", "Basic addition: 15 + 27 = 42."),
    (
        "If a car travels 60 km in 2 hours, what is its speed?",
        ["30 km/h", "120 km/h", "60 km/h", "20 km/h"],
        "30 km/h",
        "Speed = distance / time = 60 / 2 = 30 km/h.",
    ),
    ("Complete the sequence: 2, 4, 6, ?", ["7", "8", "9", "10"], "8", "Even numbers: +2 each time."),
    ("What is 10% of 200?", ["10", "20", "30", "40"], "20", "10% = 0.1; 0.1 * 200 = 20."),
    (
        "If Tom is older than Sam and Sam is older than Lee, who is the youngest?",
        ["Tom", "Sam", "Lee", "Cannot be determined"],
        "Lee",
        "Tom > Sam > Lee, so Lee is the youngest.",
    ),
    ("What is 5 * 8?", ["40", "35", "45", "30"], "40", "Multiplication table: 5 * 8 = 40."),
    ("Next in series: 1, 3, 5, 7, ?", ["8", "9", "10", "11"], "9", "Odd numbers: +2 each."),
    (
        "If 2 apples cost $4, how much do 5 apples cost?",
        ["$8", "$10", "$12", "$6"],
        "$10",
        "Cost per apple = $2; 5 * $2 = $10.",
    ),
    ("What is the square root of 16?", ["2", "3", "4", "5"], "4", "4 * 4 = 16."),
    ("Logical pair: Pen : Write :: Knife : ?", ["Cut", "Eat", "Read", "Draw"], "Cut", "Function analogy."),
    ("What is 100 - 45?", ["55", "50", "60", "45"], "55", "Subtraction: 100 - 45 = 55."),
    ("Sequence: 10, 20, 30, ?", ["35", "40", "45", "50"], "40", "Multiples of 10: +10 each."),
    (
        "If today is Monday, what day is 3 days later?",
        ["Tuesday", "Wednesday", "Thursday", "Friday"],
        "Thursday",
        "Monday + 3 days = Thursday.",
    ),
    ("What is 25 / 5?", ["4", "5", "6", "3"], "5", "Division: 25 / 5 = 5."),
    (
        "Odd one out: Apple, Banana, Carrot, Grape",
        ["Apple", "Banana", "Carrot", "Grape"],
        "Carrot",
        "Carrot is a vegetable; the others are fruits.",
    ),
    ("What is 3 squared?", ["6", "9", "12", "15"], "9", "3 * 3 = 9."),
    ("If X > Y and Y > Z, then?", ["X < Z", "X = Z", "X > Z", "X = Y"], "X > Z", "Transitive property."),
    ("What is 50% of 80?", ["30", "40", "50", "60"], "40", "50% = 0.5; 0.5 * 80 = 40."),
    (
        "A shop sells 12 pens per box. How many pens are in 4 boxes?",
        ["36", "44", "48", "52"],
        "48",
        "12 * 4 = 48.",
    ),
    ("What is 12 * 3?", ["36", "32", "40", "24"], "36", "Multiplication: 12 * 3 = 36."),
];

struct PassageBank {
    title: &'static str,
    passage: &'static str,
    fill_blank: &'static [(&'static str, &'static str)],
    true_false_not_given: &'static [(&'static str, TfngAnswer)],
}

static LISTENING_BANK: PassageBank = PassageBank {
    title: "Benefits of Reading Books",
    passage: "Reading books is one of the most beneficial habits a person can develop. Not only does reading improve vocabulary and language skills, but it also enhances critical thinking and concentration. When we read, our brains are actively engaged in processing information, which strengthens neural connections.

Studies have shown that regular readers tend to have better memory retention and are more empathetic towards others. Reading fiction, in particular, allows us to experience different perspectives and understand complex emotions. Additionally, reading before bed can help reduce stress and improve sleep quality.

In today's digital age, many people prefer scrolling through social media instead of reading books. However, researchers suggest that dedicating just 20-30 minutes a day to reading can significantly improve mental health and cognitive abilities. Whether it's fiction, non-fiction, or poetry, the act of reading offers countless benefits for people of all ages.",
    fill_blank: &[
        ("Reading books improves vocabulary and __________ skills.", "language"),
        ("Regular readers tend to have better memory __________.", "retention"),
        ("Researchers suggest dedicating __________ minutes a day to reading.", "20-30"),
        ("Reading fiction helps us understand complex __________.", "emotions"),
    ],
    true_false_not_given: &[
        (
            "The passage states that reading before bed can help improve sleep quality.",
            TfngAnswer::True,
        ),
        (
            "The passage mentions that reading is more beneficial than watching educational videos.",
            TfngAnswer::NotGiven,
        ),
        (
            "According to the passage, most people prefer reading books to using social media.",
            TfngAnswer::False,
        ),
    ],
};

static READING_BANK: PassageBank = PassageBank {
    title: "The Importance of Sleep",
    passage: "Sleep is essential for maintaining good health and well-being. During sleep, our bodies repair tissues, consolidate memories, and regulate hormones. Most adults need between 7 to 9 hours of sleep each night to function optimally.

Lack of sleep can lead to various health problems. People who don't get enough sleep often experience mood swings, difficulty concentrating, and weakened immune systems. Chronic sleep deprivation has been linked to serious conditions such as obesity, diabetes, and heart disease.

Creating a good sleep routine can significantly improve sleep quality. Experts recommend going to bed and waking up at the same time every day, even on weekends. It's also helpful to avoid screens before bedtime, as the blue light emitted by phones and computers can interfere with the body's natural sleep cycle. Additionally, keeping the bedroom cool, dark, and quiet creates an ideal environment for restful sleep.

In today's fast-paced world, many people sacrifice sleep to meet work or social demands. However, prioritizing sleep is crucial for long-term health and productivity. Getting adequate rest allows us to think clearly, make better decisions, and maintain emotional balance.",
    fill_blank: &[
        (
            "During sleep, our bodies repair tissues, consolidate memories, and regulate __________.",
            "hormones",
        ),
        (
            "Chronic sleep deprivation has been linked to serious conditions such as obesity, diabetes, and __________ disease.",
            "heart",
        ),
        (
            "Blue light emitted by screens can interfere with the body's natural __________ cycle.",
            "sleep",
        ),
        (
            "Most adults need between 7 to 9 hours of __________ each night to function optimally.",
            "sleep",
        ),
    ],
    true_false_not_given: &[
        (
            "The passage states that experts recommend going to bed at the same time every day.",
            TfngAnswer::True,
        ),
        (
            "According to the passage, napping during the day improves overall sleep quality.",
            TfngAnswer::NotGiven,
        ),
        (
            "The passage suggests that most people get enough sleep in today's world.",
            TfngAnswer::False,
        ),
    ],
};

fn aptitude_question(entry: &(&str, [&str; 4], &str, &str)) -> Question {
    let (question, options, correct, explanation) = entry;
    Question::MultipleChoice(MultipleChoiceQuestion {
        question: question.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct: correct.to_string(),
        explanation: Some(explanation.to_string()),
    })
}

/// The static aptitude bank in a fresh random order.
pub fn aptitude_questions() -> Vec<Question> {
    let mut questions: Vec<Question> = APTITUDE_BANK.iter().map(aptitude_question).collect();
    questions.shuffle(&mut rng());
    questions
}

/// Tops `questions` up to `count` with bank questions whose prompt is not
/// already present, then truncates to `count`.
pub fn pad_aptitude(mut questions: Vec<Question>, count: usize) -> Vec<Question> {
    if questions.len() < count {
        let needed = count - questions.len();
        log::warn!(
            "Got {}/{} aptitude questions, padding with {} fallback questions",
            questions.len(),
            count,
            needed
        );
        let extra: Vec<Question> = aptitude_questions()
            .into_iter()
            .filter(|candidate| !questions.iter().any(|q| q.prompt() == candidate.prompt()))
            .take(needed)
            .collect();
        questions.extend(extra);
    }
    questions.truncate(count);
    questions
}

fn passage_questions(bank: &PassageBank, distribution: QuestionDistribution) -> Vec<Question> {
    let mut rng = rng();

    let mut fill: Vec<Question> = bank
        .fill_blank
        .iter()
        .map(|(question, answer)| {
            Question::FillBlank(FillBlankQuestion {
                question: question.to_string(),
                correct_answer: answer.to_string(),
                skill: Some("detail".to_string()),
            })
        })
        .collect();
    let mut tfng: Vec<Question> = bank
        .true_false_not_given
        .iter()
        .map(|(question, answer)| {
            Question::TrueFalseNotGiven(TrueFalseNotGivenQuestion {
                question: question.to_string(),
                correct_answer: *answer,
                skill: Some("inference".to_string()),
            })
        })
        .collect();

    fill.shuffle(&mut rng);
    tfng.shuffle(&mut rng);

    let mut selected: Vec<Question> = fill
        .into_iter()
        .take(distribution.fill_blank)
        .chain(tfng.into_iter().take(distribution.true_false_not_given))
        .collect();
    selected.shuffle(&mut rng);
    selected
}

/// Fallback content with the same count and type mix the request asks for.
pub fn fallback_bundle(request: &ContentRequest) -> ContentBundle {
    match request.round {
        RoundKind::Aptitude => {
            let count = request.question_count;
            let questions: Vec<Question> = if count <= APTITUDE_BANK.len() {
                aptitude_questions().into_iter().take(count).collect()
            } else {
                aptitude_questions().into_iter().cycle().take(count).collect()
            };
            ContentBundle {
                title: APTITUDE_TITLE.to_string(),
                passage: None,
                questions,
                used_fallback: true,
            }
        }
        RoundKind::Listening | RoundKind::Reading => {
            let bank = if request.round == RoundKind::Listening {
                &LISTENING_BANK
            } else {
                &READING_BANK
            };
            ContentBundle {
                title: bank.title.to_string(),
                passage: Some(bank.passage.to_string()),
                questions: passage_questions(bank, request.distribution()),
                used_fallback: true,
            }
        }
    }
}
