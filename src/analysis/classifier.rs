//! Company response classification.

use crate::models::ResponseClass;
use std::collections::BTreeSet;

/// Responses counted as positive unless configured otherwise.
pub const DEFAULT_POSITIVE_RESPONSES: [&str; 3] = [
    "Closed with explanation",
    "Closed with monetary relief",
    "Closed with non-monetary relief",
];

/// Two-way classifier over `Company response to consumer`.
///
/// A response is positive iff it exactly equals one of the configured
/// strings. Nulls and every other value are negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseClassifier {
    positive: BTreeSet<String>,
}

impl Default for ResponseClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_POSITIVE_RESPONSES)
    }
}

impl ResponseClassifier {
    /// Build a classifier from an explicit positive set.
    pub fn new<I, S>(positive: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            positive: positive.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_positive(&self, response: Option<&str>) -> bool {
        response.is_some_and(|r| self.positive.contains(r))
    }

    pub fn classify(&self, response: Option<&str>) -> ResponseClass {
        if self.is_positive(response) {
            ResponseClass::Positive
        } else {
            ResponseClass::Negative
        }
    }

    /// The positive set, sorted.
    pub fn positive_responses(&self) -> impl Iterator<Item = &str> {
        self.positive.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_positive_set() {
        let classifier = ResponseClassifier::default();
        for response in DEFAULT_POSITIVE_RESPONSES {
            assert_eq!(classifier.classify(Some(response)), ResponseClass::Positive);
        }
    }

    #[test]
    fn test_everything_else_is_negative() {
        let classifier = ResponseClassifier::default();
        for response in ["In progress", "Closed", "Untimely response", "closed with explanation", ""] {
            assert_eq!(classifier.classify(Some(response)), ResponseClass::Negative);
        }
        assert_eq!(classifier.classify(None), ResponseClass::Negative);
    }

    #[test]
    fn test_custom_positive_set() {
        let classifier = ResponseClassifier::new(["Closed"]);
        assert!(classifier.is_positive(Some("Closed")));
        assert!(!classifier.is_positive(Some("Closed with explanation")));
        assert_eq!(classifier.positive_responses().collect::<Vec<_>>(), vec!["Closed"]);
    }
}
