//! Heuristic text-to-question parser.
//!
//! Turns pasted or extracted document text into [`Question`] records. The
//! parser never fails: text it cannot make sense of yields fewer (or zero)
//! questions.

mod rules;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::models::{MIN_ANSWERS, Question};

pub use rules::{ParserRules, RulesError};

lazy_static! {
    static ref DEFAULT_PARSER: Parser =
        Parser::new(ParserRules::default()).expect("default parser rules are valid");
}

/// Parse text with the default Vietnamese/English rules.
pub fn parse(text: &str) -> Vec<Question> {
    DEFAULT_PARSER.parse(text)
}

/// Rule-based question segmenter compiled from [`ParserRules`].
#[derive(Debug, Clone)]
pub struct Parser {
    /// An option label following other text on the same line.
    inline_option: Regex,
    /// A line that opens a new question block.
    block_start: Regex,
    /// Label, number and terminator at the start of a prompt.
    prompt_label: Regex,
    /// Bullet and option label at the start of an answer line.
    answer_label: Regex,
    correct_marker: Option<Regex>,
}

impl Parser {
    pub fn new(rules: ParserRules) -> Result<Self, RulesError> {
        let letters = rules.letter_class()?;
        let prefixes = rules.prefix_alternation();

        let inline_option = Regex::new(&format!(r"([^\n])\s+([{letters}][.)])"))?;

        let (block_start, prompt_label) = match &prefixes {
            Some(prefixes) => (
                Regex::new(&format!(r"^(?:(?i:{prefixes})\s*\d+[:.]|\d+[.)])"))?,
                Regex::new(&format!(r"(?i)^(?:{prefixes})?\s*\d+[:.)]\s*"))?,
            ),
            None => (
                Regex::new(r"^\d+[:.)]")?,
                Regex::new(r"^\s*\d+[:.)]\s*")?,
            ),
        };

        let answer_label = Regex::new(&format!(r"(?i)^[*\-+]?\s*(?:[{letters}][.)])?\s*"))?;

        let correct_marker = rules
            .marker_alternation()
            .map(|markers| Regex::new(&format!("(?i){markers}")))
            .transpose()?;

        Ok(Self {
            inline_option,
            block_start,
            prompt_label,
            answer_label,
            correct_marker,
        })
    }

    /// Parse `text` into questions, numbered by their position in the result.
    pub fn parse(&self, text: &str) -> Vec<Question> {
        let normalized = self.inline_option.replace_all(text, "${1}\n${2}");

        self.split_blocks(&normalized)
            .into_iter()
            .filter_map(|block| self.parse_block(&block))
            .enumerate()
            .map(|(id, mut question)| {
                question.id = id;
                question
            })
            .collect()
    }

    fn split_blocks<'a>(&self, text: &'a str) -> Vec<Vec<&'a str>> {
        let mut blocks: Vec<Vec<&str>> = Vec::new();

        for line in text.split('\n') {
            match blocks.last_mut() {
                Some(block) if !self.block_start.is_match(line) => block.push(line),
                _ => blocks.push(vec![line]),
            }
        }

        blocks.retain(|block| block.iter().any(|line| !line.trim().is_empty()));
        blocks
    }

    fn parse_block(&self, block: &[&str]) -> Option<Question> {
        let lines: Vec<&str> = block
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect();

        if lines.len() < 2 {
            return None;
        }

        let prompt = self.prompt_label.replace(lines[0], "").trim().to_string();

        let mut answers = Vec::with_capacity(lines.len() - 1);
        let mut correct = None;

        for line in &lines[1..] {
            let (text, is_correct) = self.parse_answer(line);
            if text.is_empty() {
                continue;
            }
            answers.push(text);
            if is_correct {
                correct = Some(answers.len() - 1);
            }
        }

        if answers.len() < MIN_ANSWERS {
            return None;
        }

        let correct = correct.unwrap_or_else(|| {
            debug!(prompt = %prompt, "no answer marked correct, defaulting to the first");
            0
        });

        Some(Question::new(0, prompt, answers, correct))
    }

    /// Cleaned answer text and whether the line was marked correct.
    fn parse_answer(&self, line: &str) -> (String, bool) {
        let mut is_correct = line.starts_with('*');

        let without_marker = match &self.correct_marker {
            Some(marker) if marker.is_match(line) => {
                is_correct = true;
                marker.replace_all(line, "").into_owned()
            }
            _ => line.to_string(),
        };

        let text = self
            .answer_label
            .replace(without_marker.trim(), "")
            .trim()
            .to_string();

        (text, is_correct)
    }
}

impl Default for Parser {
    fn default() -> Self {
        DEFAULT_PARSER.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(question: &Question) -> Vec<&str> {
        question.answers.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_labelled_question_without_marker_defaults_to_first() {
        let questions = parse("Câu 1: 2+2=?\nA. 3\nB. 4\nC. 5\nD. 6");

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "2+2=?");
        assert_eq!(answers(&questions[0]), vec!["3", "4", "5", "6"]);
        assert_eq!(questions[0].correct, 0);
    }

    #[test]
    fn test_numbered_question_with_asterisk() {
        let questions = parse("1. Thủ đô Việt Nam?\n*A. Hà Nội\nB. Hải Phòng");

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Thủ đô Việt Nam?");
        assert_eq!(answers(&questions[0]), vec!["Hà Nội", "Hải Phòng"]);
        assert_eq!(questions[0].correct, 0);
    }

    #[test]
    fn test_empty_and_unmarked_input() {
        assert!(parse("").is_empty());
        assert!(parse("   \n\n  ").is_empty());
        assert!(parse("just a sentence with nothing to see").is_empty());
    }

    #[test]
    fn test_multiple_blocks_with_asterisks() {
        let text = "\
Câu 1: First?
A. one
*B. two
C. three
Câu 2. Second?
*A. alpha
B. beta
Question 3: Third?
A) x
B) y
*C) z
4) Fourth?
- yes
*no";
        let questions = parse(text);

        assert_eq!(questions.len(), 4);
        assert_eq!(questions[0].correct, 1);
        assert_eq!(questions[1].correct, 0);
        assert_eq!(questions[2].question, "Third?");
        assert_eq!(answers(&questions[2]), vec!["x", "y", "z"]);
        assert_eq!(questions[2].correct, 2);
        assert_eq!(questions[3].question, "Fourth?");
        assert_eq!(answers(&questions[3]), vec!["yes", "no"]);
        assert_eq!(questions[3].correct, 1);
        let ids: Vec<usize> = questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_inline_options_are_split() {
        let questions = parse("Câu 1: Pick one A. red B. green C. blue (correct) D. black");

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Pick one");
        assert_eq!(answers(&questions[0]), vec!["red", "green", "blue", "black"]);
        assert_eq!(questions[0].correct, 2);
    }

    #[test]
    fn test_last_marked_answer_wins() {
        let questions = parse("1. Which?\n*A. a\n*B. b\nC. c");
        assert_eq!(questions[0].correct, 1);
    }

    #[test]
    fn test_parenthesized_marker() {
        let questions = parse("Câu 1: Thủ đô?\nA. Huế\nB. Hà Nội (đúng)\nC. Đà Nẵng");

        assert_eq!(answers(&questions[0]), vec!["Huế", "Hà Nội", "Đà Nẵng"]);
        assert_eq!(questions[0].correct, 1);

        let questions = parse("1. Capital?\nA. Paris (Correct)\nB. Rome");
        assert_eq!(answers(&questions[0]), vec!["Paris", "Rome"]);
        assert_eq!(questions[0].correct, 0);
    }

    #[test]
    fn test_ids_count_only_retained_blocks() {
        let text = "1. Too short\nA. only one\n2. Kept?\nA. yes\nB. no";
        let questions = parse(text);

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, 0);
        assert_eq!(questions[0].question, "Kept?");
    }

    #[test]
    fn test_prefix_is_case_insensitive() {
        let questions = parse("CÂU 1: Upper?\nA. a\nB. b\nquestion 2: lower?\nA. c\nB. d");
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question, "Upper?");
        assert_eq!(questions[1].question, "lower?");
    }

    #[test]
    fn test_blank_option_lines_are_skipped() {
        let questions = parse("1. Q?\nA.\nB. real\nC) also real");
        assert_eq!(answers(&questions[0]), vec!["real", "also real"]);
    }

    #[test]
    fn test_crlf_input() {
        let questions = parse("Câu 1: Q?\r\nA. a\r\n*B. b\r\nCâu 2: R?\r\nA. c\r\nB. d\r\n");
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].correct, 1);
        assert_eq!(answers(&questions[1]), vec!["c", "d"]);
    }

    #[test]
    fn test_custom_rules() {
        let parser = Parser::new(ParserRules {
            question_prefixes: vec!["Frage".into()],
            option_letters: "ABCDE".into(),
            correct_markers: vec!["[richtig]".into()],
        })
        .unwrap();

        let questions = parser.parse("Frage 1: Welche?\nA. eins\nE. fünf [richtig]");
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Welche?");
        assert_eq!(answers(&questions[0]), vec!["eins", "fünf"]);
        assert_eq!(questions[0].correct, 1);
    }
}
