//! Question normalization and template classification.
//!
//! Classification is pure: it looks only at the token sequence and never
//! touches the catalog or the index.

use crate::error::{QaError, Result};

/// Which anchors survive the person check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonFilter {
    Any,
    PersonsOnly,
    NonPersonsOnly,
}

impl PersonFilter {
    pub fn accepts(self, is_person: bool) -> bool {
        match self {
            PersonFilter::Any => true,
            PersonFilter::PersonsOnly => is_person,
            PersonFilter::NonPersonsOnly => !is_person,
        }
    }

    /// Detail carried by `WrongInputType` when every anchor was rejected.
    pub fn rejection(self) -> &'static str {
        match self {
            PersonFilter::Any => "no anchor accepted",
            PersonFilter::PersonsOnly => "expected a person",
            PersonFilter::NonPersonsOnly => "did not expect a person",
        }
    }
}

/// A classified question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    /// "What is X", "Who is X": the types of X.
    TypeOf { anchor: String, filter: PersonFilter },
    /// "Where was X born": birthplace of a person.
    Birthplace { anchor: String },
    /// "Who has directed X": a catalog predicate of X.
    Property { term: String, anchor: String },
    /// "Tell me the actors of X": a catalog predicate, possibly through collection nodes.
    Starring { term: String, anchor: String },
    /// "Tell me 3 movies": the first N topics of a type.
    Quantity { count: usize, term: String },
}

/// Split a question into tokens.
///
/// Whitespace-separated; a token consisting only of `?` is dropped and a
/// trailing `?` glued to the last word is stripped.
pub fn normalize(question: &str) -> Vec<String> {
    let mut tokens: Vec<String> = question
        .split_whitespace()
        .filter(|token| !token.chars().all(|c| c == '?'))
        .map(str::to_string)
        .collect();
    if let Some(last) = tokens.last_mut() {
        let trimmed = last.trim_end_matches('?').len();
        last.truncate(trimmed);
    }
    tokens
}

/// Match a token sequence against the supported templates, in order.
pub fn classify(tokens: &[String]) -> Result<Template> {
    if tokens.is_empty() {
        return Err(QaError::MalformedQuestion);
    }
    let word = |i: usize, expected: &str| tokens.get(i).map_or(false, |t| t.eq_ignore_ascii_case(expected));

    if word(0, "what") || word(0, "is") || word(1, "is") {
        require(tokens, 3)?;
        let filter = if word(0, "who") {
            PersonFilter::PersonsOnly
        } else {
            PersonFilter::NonPersonsOnly
        };
        return Ok(Template::TypeOf {
            anchor: join(&tokens[2..]),
            filter,
        });
    }

    if word(0, "where") {
        require(tokens, 4)?;
        return Ok(Template::Birthplace {
            anchor: join(&tokens[2..tokens.len() - 1]),
        });
    }

    if word(1, "has") {
        require(tokens, 4)?;
        return Ok(Template::Property {
            term: tokens[2].clone(),
            anchor: join(&tokens[3..]),
        });
    }

    if word(0, "tell") {
        return classify_tell(tokens);
    }

    Err(QaError::UnrecognizedQuestionForm)
}

fn classify_tell(tokens: &[String]) -> Result<Template> {
    // First "of" anywhere, as long as an anchor follows it.
    let of = tokens
        .iter()
        .position(|t| t == "of")
        .filter(|&i| i + 1 < tokens.len());
    if tokens.get(2).map_or(false, |t| t.eq_ignore_ascii_case("the")) {
        if let Some(of) = of {
            require(tokens, 6)?;
            return Ok(Template::Starring {
                // empty when "of" comes before the term slot
                term: tokens.get(3..of).map(join).unwrap_or_default(),
                anchor: join(&tokens[of + 1..]),
            });
        }
    }

    // "Tell 3 movies" puts the count right after the verb, "Tell me 3 movies" one later.
    let (count_at, minimum) = match tokens.get(1) {
        Some(t) if t.parse::<usize>().is_ok() => (1, 3),
        _ => (2, 4),
    };
    require(tokens, minimum)?;
    let raw = &tokens[count_at];
    let count = match raw.parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => return Err(QaError::NonNumericQuantity(raw.clone())),
    };
    let term = tokens[count_at + 1].clone();
    check_grammar(&term, count)?;
    Ok(Template::Quantity { count, term })
}

/// Reject a singular-looking term with N > 1 and a plural-looking one with N == 1.
pub fn check_grammar(term: &str, count: usize) -> Result<()> {
    if count > 1 && term.ends_with('y') {
        Err(QaError::GrammarMismatch("Type plural form!".to_string()))
    } else if count == 1 && term.ends_with('s') {
        Err(QaError::GrammarMismatch("Type singular form!".to_string()))
    } else {
        Ok(())
    }
}

fn require(tokens: &[String], minimum: usize) -> Result<()> {
    if tokens.len() < minimum {
        Err(QaError::MalformedQuestion)
    } else {
        Ok(())
    }
}

fn join(tokens: &[String]) -> String {
    tokens.join(" ")
}
