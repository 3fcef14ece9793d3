//! Splits long text into TTS-sized chunks at natural boundaries.
//!
//! Paragraphs (blank-line separated) are packed greedily; a paragraph that
//! is itself too long is broken into sentences, and a sentence that is too
//! long is broken at word boundaries. A single word longer than the limit
//! (typical for unspaced CJK text) is cut at character boundaries. Lengths
//! are counted in characters.

use std::sync::LazyLock;

use regex::Regex;

/// Default chunk size, leaving headroom under the model's input limit.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 800;

/// Preview length reported by [`TextChunker::chunk_info`].
const PREVIEW_CHARS: usize = 50;

/// Sentence terminator with the whitespace after it. CJK terminators need
/// no trailing whitespace.
static SENTENCE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+|[。！？]\s*").expect("valid regex"));

#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_chunk_chars: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHUNK_CHARS)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl TextChunker {
    pub fn new(max_chunk_chars: usize) -> Self {
        Self {
            max_chunk_chars: max_chunk_chars.max(1),
        }
    }

    /// Split `text` into trimmed chunks of at most the configured number of
    /// characters. Words longer than the limit are cut at character
    /// boundaries.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        if char_len(text) <= self.max_chunk_chars {
            return vec![text.to_string()];
        }

        let mut packer = Packer::new(self.max_chunk_chars);

        for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            if char_len(paragraph) <= self.max_chunk_chars {
                packer.push(paragraph, "\n\n");
                continue;
            }
            for sentence in split_sentences(paragraph) {
                if char_len(sentence.trim_end()) <= self.max_chunk_chars {
                    packer.push(sentence, "");
                    continue;
                }
                for word in sentence.split_whitespace() {
                    if char_len(word) <= self.max_chunk_chars {
                        packer.push(word, " ");
                    } else {
                        for piece in hard_split(word, self.max_chunk_chars) {
                            packer.push(&piece, " ");
                        }
                    }
                }
            }
        }

        packer.finish()
    }

    /// Number of chunks plus `(length, preview)` for each.
    pub fn chunk_info(&self, text: &str) -> (usize, Vec<(usize, String)>) {
        let chunks = self.split_text(text);
        let info = chunks
            .iter()
            .map(|chunk| {
                let len = char_len(chunk);
                let preview = if len > PREVIEW_CHARS {
                    let head: String = chunk.chars().take(PREVIEW_CHARS).collect();
                    format!("{head}...")
                } else {
                    chunk.clone()
                };
                (len, preview)
            })
            .collect();
        (chunks.len(), info)
    }
}

/// Greedy accumulator. Every piece handed to [`Packer::push`] fits the
/// limit once its trailing whitespace is dropped, so every emitted chunk
/// does too.
struct Packer {
    max: usize,
    chunks: Vec<String>,
    current: String,
}

impl Packer {
    fn new(max: usize) -> Self {
        Self {
            max,
            chunks: Vec::new(),
            current: String::new(),
        }
    }

    /// Append `piece` to the open chunk, joined by `sep`, or start a new
    /// chunk when the result would exceed the limit.
    fn push(&mut self, piece: &str, sep: &str) {
        if self.current.trim().is_empty() {
            self.current.clear();
            self.current.push_str(piece.trim_start());
            return;
        }
        let joined = char_len(&self.current) + char_len(sep) + char_len(piece.trim_end());
        if joined <= self.max {
            self.current.push_str(sep);
            self.current.push_str(piece);
        } else {
            self.flush();
            self.current.push_str(piece.trim_start());
        }
    }

    fn flush(&mut self) {
        let trimmed = self.current.trim();
        if !trimmed.is_empty() {
            self.chunks.push(trimmed.to_string());
        }
        self.current.clear();
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

/// Sentences of `text`, each keeping the whitespace that followed it.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END_RE.find_iter(text) {
        sentences.push(&text[start..m.end()]);
        start = m.end();
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Cut `word` into pieces of at most `max` characters.
fn hard_split(word: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars.chunks(max).map(|c| c.iter().collect()).collect()
}
