//! Splitting documents into overlapping chunks for embedding.
//!
//! Chunks prefer paragraph and sentence boundaries; a sentence longer than
//! the chunk size is cut on character boundaries.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A piece of a source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Text content of this chunk.
    pub content: String,
    /// Position of this chunk in the document.
    pub order: i32,
}

/// A sentence (or sentence fragment) with its separator from the previous unit.
struct Unit {
    text: String,
    len: usize,
    starts_paragraph: bool,
}

impl Unit {
    fn separator(&self) -> &'static str {
        if self.starts_paragraph {
            "\n\n"
        } else {
            " "
        }
    }
}

/// Sentence-aware chunker with a character budget.
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    sentence_end: Regex,
    paragraph_break: Regex,
}

impl TextChunker {
    /// Create a chunker. The overlap is capped at half the chunk size.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size / 2),
            sentence_end: Regex::new(r#"[.!?]+["')\]]*\s+"#).expect("Invalid regex"),
            paragraph_break: Regex::new(r"\n[ \t]*\n").expect("Invalid regex"),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into chunks of at most `chunk_size` characters.
    pub fn split(&self, text: &str) -> Vec<TextChunk> {
        let units = self.units(text);
        let mut chunks = Vec::new();
        let mut current: Vec<usize> = Vec::new();

        for (i, unit) in units.iter().enumerate() {
            let projected = joined_len(&units, &current) + unit.separator().len() + unit.len;
            if !current.is_empty() && projected > self.chunk_size {
                chunks.push(render(&units, &current));
                current = self.carry_over(&units, &current, unit.len);
            }
            current.push(i);
        }

        if !current.is_empty() {
            chunks.push(render(&units, &current));
        }

        chunks
            .into_iter()
            .enumerate()
            .map(|(order, content)| TextChunk {
                content,
                order: order as i32,
            })
            .collect()
    }

    /// Trailing units of the finished chunk that fit in the overlap budget
    /// and still leave room for the next unit.
    fn carry_over(&self, units: &[Unit], finished: &[usize], next_len: usize) -> Vec<usize> {
        let mut carry: Vec<usize> = Vec::new();
        for &j in finished.iter().rev() {
            let mut candidate = vec![j];
            candidate.extend_from_slice(&carry);
            if joined_len(units, &candidate) > self.chunk_overlap {
                break;
            }
            carry = candidate;
        }

        while !carry.is_empty() && joined_len(units, &carry) + 2 + next_len > self.chunk_size {
            carry.remove(0);
        }
        carry
    }

    fn units(&self, text: &str) -> Vec<Unit> {
        let mut units = Vec::new();

        for paragraph in self.paragraph_break.split(text) {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }

            let mut starts_paragraph = true;
            for sentence in self.sentences(paragraph) {
                for piece in hard_split(&sentence, self.chunk_size) {
                    units.push(Unit {
                        len: piece.chars().count(),
                        text: piece,
                        starts_paragraph,
                    });
                    starts_paragraph = false;
                }
            }
        }

        units
    }

    fn sentences(&self, paragraph: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for boundary in self.sentence_end.find_iter(paragraph) {
            let sentence = paragraph[start..boundary.end()].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = boundary.end();
        }

        let rest = paragraph[start..].trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }
        sentences
    }
}

/// Cut `text` into pieces of at most `max_chars` characters.
fn hard_split(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|piece| piece.iter().collect::<String>().trim().to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}

fn joined_len(units: &[Unit], indices: &[usize]) -> usize {
    indices
        .iter()
        .enumerate()
        .map(|(k, &i)| {
            let sep = if k == 0 { 0 } else { units[i].separator().len() };
            sep + units[i].len
        })
        .sum()
}

fn render(units: &[Unit], indices: &[usize]) -> String {
    let mut out = String::new();
    for (k, &i) in indices.iter().enumerate() {
        if k > 0 {
            out.push_str(units[i].separator());
        }
        out.push_str(&units[i].text);
    }
    out
}
