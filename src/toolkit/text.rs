//! Text, list and string utilities.

use serde::Serialize;
use std::collections::HashSet;

/// Statistics about a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextAnalysis {
    pub character_count: usize,
    pub word_count: usize,
    pub sentence_count: usize,
    pub paragraph_count: usize,
    pub average_word_length: f64,
    pub unique_words: usize,
}

/// Count characters, words, sentences and paragraphs in `text`.
///
/// Sentences are counted by terminal punctuation (`.`, `!`, `?`) and
/// paragraphs by blank-line separators.
pub fn analyze_text(text: &str) -> TextAnalysis {
    let words: Vec<&str> = text.split_whitespace().collect();

    let average_word_length = if words.is_empty() {
        0.0
    } else {
        let total: usize = words.iter().map(|w| w.chars().count()).sum();
        total as f64 / words.len() as f64
    };

    let unique_words = words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<HashSet<_>>()
        .len();

    TextAnalysis {
        character_count: text.chars().count(),
        word_count: words.len(),
        sentence_count: text.chars().filter(|c| matches!(c, '.' | '!' | '?')).count(),
        paragraph_count: text.matches("\n\n").count() + 1,
        average_word_length,
        unique_words,
    }
}

/// Apply a list operation: `sort`, `reverse`, `unique` or `filter`.
///
/// Unknown operations return the items unchanged.
pub fn list_operation(operation: &str, items: &[String], filter_keyword: &str) -> Vec<String> {
    match operation {
        "sort" => {
            let mut sorted = items.to_vec();
            sorted.sort();
            sorted
        }
        "reverse" => items.iter().rev().cloned().collect(),
        "unique" => {
            let mut seen = HashSet::new();
            items
                .iter()
                .filter(|item| seen.insert(item.as_str()))
                .cloned()
                .collect()
        }
        "filter" => {
            let keyword = filter_keyword.to_lowercase();
            items
                .iter()
                .filter(|item| item.to_lowercase().contains(&keyword))
                .cloned()
                .collect()
        }
        _ => items.to_vec(),
    }
}

/// Apply a string operation: `upper`, `lower`, `title`, `reverse` or `replace`.
///
/// Unknown operations return the text unchanged.
pub fn string_operation(operation: &str, text: &str, old_text: &str, new_text: &str) -> String {
    match operation {
        "upper" => text.to_uppercase(),
        "lower" => text.to_lowercase(),
        "title" => title_case(text),
        "reverse" => text.chars().rev().collect(),
        "replace" => text.replace(old_text, new_text),
        _ => text.to_string(),
    }
}

/// Uppercase the first letter of every run of letters, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(c);
            in_word = false;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_analyze_text() {
        let analysis = analyze_text("Hello world. Hello again!\n\nNew paragraph?");
        assert_eq!(analysis.word_count, 6);
        assert_eq!(analysis.sentence_count, 3);
        assert_eq!(analysis.paragraph_count, 2);
        assert_eq!(analysis.unique_words, 5);
        assert_eq!(analysis.character_count, 41);
    }

    #[test]
    fn test_analyze_empty_text() {
        let analysis = analyze_text("");
        assert_eq!(analysis.word_count, 0);
        assert_eq!(analysis.average_word_length, 0.0);
        assert_eq!(analysis.paragraph_count, 1);
    }

    #[test]
    fn test_list_operations() {
        let items = strings(&["pear", "Apple", "banana", "pear"]);
        assert_eq!(
            list_operation("sort", &items, ""),
            strings(&["Apple", "banana", "pear", "pear"])
        );
        assert_eq!(
            list_operation("reverse", &items, ""),
            strings(&["pear", "banana", "Apple", "pear"])
        );
        assert_eq!(
            list_operation("unique", &items, ""),
            strings(&["pear", "Apple", "banana"])
        );
        assert_eq!(list_operation("filter", &items, "APP"), strings(&["Apple"]));
        assert_eq!(list_operation("filter", &items, ""), items);
        assert_eq!(list_operation("shuffle", &items, ""), items);
    }

    #[test]
    fn test_string_operations() {
        assert_eq!(string_operation("upper", "abc", "", ""), "ABC");
        assert_eq!(string_operation("lower", "ABC", "", ""), "abc");
        assert_eq!(string_operation("title", "hello wORLD's", "", ""), "Hello World'S");
        assert_eq!(string_operation("reverse", "héllo", "", ""), "olléh");
        assert_eq!(string_operation("replace", "a-b-c", "-", "+"), "a+b+c");
        assert_eq!(string_operation("rot13", "abc", "", ""), "abc");
    }
}
