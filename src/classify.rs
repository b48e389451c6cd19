//! Text heuristics: search-phrase counting and money detection.
//!
//! Both checks are plain substring/regex matching over an article's title and
//! description. The currency list is a floor, not a complete catalogue.

use crate::error::{Error, Result};
use crate::models::{Article, ClassificationResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Digits with optional thousands separators and an optional decimal fraction.
const NUMBER: &str = r"(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?";

static MONEY: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)[$€£¥]{NUMBER}|\b{NUMBER}\s?(?:dollars?|usd|euros?|eur|pounds?|gbp)\b"
    );
    Regex::new(&pattern).expect("money pattern is valid")
});

/// Case-insensitive count of non-overlapping occurrences of `phrase` in `text`.
pub fn count_phrase(text: &str, phrase: &str) -> Result<usize> {
    if phrase.trim().is_empty() {
        return Err(Error::InvalidParameter(
            "search phrase must not be empty".to_string(),
        ));
    }
    let haystack = text.to_lowercase();
    let needle = phrase.to_lowercase();
    Ok(haystack.matches(needle.as_str()).count())
}

pub fn has_monetary_value(text: &str) -> bool {
    MONEY.is_match(text)
}

/// Classify an article against the run's search phrase.
pub fn classify(article: &Article, phrase: &str) -> Result<ClassificationResult> {
    let text = article.searchable_text();
    Ok(ClassificationResult {
        phrase_count: count_phrase(&text, phrase)?,
        has_monetary_value: has_monetary_value(&text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_count_phrase_is_case_insensitive() {
        assert_eq!(count_phrase("Stocks surge as stocks rally", "stocks").unwrap(), 2);
        assert_eq!(count_phrase("STOCKS", "Stocks").unwrap(), 1);
        assert_eq!(count_phrase("nothing here", "stocks").unwrap(), 0);
    }

    #[test]
    fn test_count_phrase_non_overlapping() {
        assert_eq!(count_phrase("aaaa", "aa").unwrap(), 2);
        assert_eq!(count_phrase("interest rates and rates", "rates").unwrap(), 2);
    }

    #[test]
    fn test_count_phrase_multi_word() {
        let text = "The Federal Reserve said the federal reserve would wait";
        assert_eq!(count_phrase(text, "federal reserve").unwrap(), 2);
    }

    #[test]
    fn test_empty_phrase_rejected() {
        assert!(matches!(count_phrase("text", ""), Err(Error::InvalidParameter(_))));
        assert!(matches!(count_phrase("text", "   "), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_money_symbol_forms() {
        assert!(has_monetary_value("Price rose to $1,200.50"));
        assert!(has_monetary_value("$11.1 per share"));
        assert!(has_monetary_value("a $5 million deal"));
        assert!(has_monetary_value("costs €300"));
        assert!(has_monetary_value("sold for £2,000,000"));
    }

    #[test]
    fn test_money_word_forms() {
        assert!(has_monetary_value("paid 11 dollars"));
        assert!(has_monetary_value("worth 1 dollar"));
        assert!(has_monetary_value("raised 250,000 USD"));
        assert!(has_monetary_value("a 40usd fee"));
        assert!(has_monetary_value("fined 3.5 euros"));
    }

    #[test]
    fn test_money_requires_digits() {
        assert!(!has_monetary_value("It rose significantly"));
        assert!(!has_monetary_value("the dollar weakened"));
        assert!(!has_monetary_value("pay in USD soon"));
        assert!(!has_monetary_value("$ signs everywhere"));
        assert!(!has_monetary_value("12 dollarstore locations"));
    }

    #[test]
    fn test_classify_uses_title_and_description() {
        let article = Article {
            title: "Stocks surge".to_string(),
            publication_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            description: "as stocks rally past $40,000".to_string(),
            image_reference: None,
            source_order: 0,
        };
        let result = classify(&article, "stocks").unwrap();
        assert_eq!(result.phrase_count, 2);
        assert!(result.has_monetary_value);
    }
}
