use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CHUNK_SIZE: usize = 800;
pub const CHUNK_OVERLAP: usize = 100;

/// Lines with more tokens than this are always body text.
const MAX_HEADER_TOKENS: usize = 10;
const BULLET_MARKERS: [char; 2] = ['-', '*'];

/// A titled block of a knowledge source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub content: String,
}

impl Section {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// `title\ncontent`, or only the non-empty half.
    pub fn render(&self) -> String {
        match (self.title.is_empty(), self.content.is_empty()) {
            (false, false) => format!("{}\n{}", self.title, self.content),
            (false, true) => self.title.clone(),
            _ => self.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub text: String,
    pub title: String,
    pub source_collection: String,
    pub chunk_index: usize,
}

impl DocumentChunk {
    /// The id is derived from collection, position and text so that reloading
    /// identical content yields identical chunks.
    pub fn new(
        source_collection: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        chunk_index: usize,
    ) -> Self {
        let source_collection = source_collection.into();
        let text = text.into();
        let key = format!("{source_collection}:{chunk_index}:{text}");
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()),
            text,
            title: title.into(),
            source_collection,
            chunk_index,
        }
    }
}

/// One hit of a similarity search. Lower distance means a closer match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: DocumentChunk,
    pub distance: f32,
}

/// The chunks one collection returned for a query, scored by mean distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceSet {
    pub chunks: Vec<DocumentChunk>,
    pub source_collection: String,
    pub score: f32,
}

impl EvidenceSet {
    pub fn from_results(source_collection: impl Into<String>, results: Vec<SearchResult>) -> Option<Self> {
        if results.is_empty() {
            return None;
        }

        let score = results.iter().map(|r| r.distance).sum::<f32>() / results.len() as f32;
        Some(Self {
            chunks: results.into_iter().map(|r| r.chunk).collect(),
            source_collection: source_collection.into(),
            score,
        })
    }
}

fn is_header(line: &str, stripped: &str) -> bool {
    !line.starts_with(char::is_whitespace)
        && !stripped.starts_with(BULLET_MARKERS)
        && stripped.split_whitespace().count() <= MAX_HEADER_TOKENS
}

/// Splits raw knowledge text into sections.
///
/// A non-empty, unindented, non-bulleted line of at most ten tokens opens a
/// new section; every other non-empty line is body text of the current one.
/// Body text seen before the first header becomes an untitled section, and a
/// header directly followed by another header is kept as a title-only
/// section, so no non-blank line is lost.
pub fn parse_sections(raw_text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut title: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in raw_text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }

        if is_header(line, stripped) {
            if title.is_some() || !body.is_empty() {
                sections.push(Section::new(title.take().unwrap_or_default(), body.join("\n")));
                body.clear();
            }
            title = Some(stripped.to_string());
        } else {
            body.push(stripped);
        }
    }

    if title.is_some() || !body.is_empty() {
        sections.push(Section::new(title.unwrap_or_default(), body.join("\n")));
    }

    sections
}

/// Fixed-size sliding window over characters.
pub fn split_window(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || size == 0 {
        return Vec::new();
    }

    let step = size.saturating_sub(overlap).max(1);
    let mut windows = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + size).min(chars.len());
        windows.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    windows
}

/// Renders each section and cuts it into overlapping chunks. Sections are
/// windowed independently; chunk indices run across the whole source.
pub fn chunk_sections(sections: &[Section], source_collection: &str) -> Vec<DocumentChunk> {
    sections
        .iter()
        .flat_map(|section| {
            split_window(&section.render(), CHUNK_SIZE, CHUNK_OVERLAP)
                .into_iter()
                .map(move |text| (section.title.as_str(), text))
        })
        .enumerate()
        .map(|(index, (title, text))| DocumentChunk::new(source_collection, title, text, index))
        .collect()
}
