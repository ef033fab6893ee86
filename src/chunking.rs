/*!
 * Size-bounded chunk splitting for provider requests.
 *
 * Splits anchored text into segments that fit a provider's per-request
 * size limit, preferring natural break points and never cutting through
 * a sentinel token, HTML comment, or HTML tag.
 */

use log::debug;

use crate::errors::TranslationError;

/// A contiguous, size-bounded slice of anchored text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The slice text
    pub text: String,
    /// Zero-based position within the split
    pub ordinal: usize,
    /// Total number of chunks in the split
    pub total: usize,
}

// Soft-break candidate classes, best first. Within a window the latest
// occurrence of the highest-ranked class wins.
const BREAK_CLASSES: &[&[&str]] = &[
    &["\n\n"],
    &["\n"],
    &[". ", "! ", "? "],
    &[", ", "; ", ": "],
    &[" "],
    &[">"],
];

// Backup iterations when a cut lands inside a token/comment/tag. If no safe
// point is found within this bound, progress is forced at the original cut.
const MAX_BACKUP_STEPS: usize = 8;

/// Split `text` into chunks of at most `max_chars` bytes each, cutting at
/// soft break points where possible. Concatenating the chunks in ordinal
/// order reproduces `text` exactly.
pub fn split(text: &str, max_chars: usize) -> Vec<Chunk> {
    if text.len() <= max_chars {
        return vec![Chunk {
            text: text.to_string(),
            ordinal: 0,
            total: 1,
        }];
    }

    let max_chars = max_chars.max(64);
    let mut chunks: Vec<String> = Vec::new();
    let mut start = 0usize;

    while start < text.len() {
        let remaining = text.len() - start;
        if remaining <= max_chars {
            chunks.push(text[start..].to_string());
            break;
        }

        let window_end = snap_to_char_boundary(text, start + max_chars);
        let midpoint = start + max_chars / 2;

        let mut cut = find_soft_break(text, midpoint, window_end).unwrap_or(window_end);
        cut = avoid_open_constructs(text, start, cut);
        cut = snap_to_char_boundary(text, cut);

        chunks.push(text[start..cut].to_string());
        start = cut;
    }

    let total = chunks.len();
    debug!("split {} bytes into {} chunks", text.len(), total);
    chunks
        .into_iter()
        .enumerate()
        .map(|(ordinal, text)| Chunk {
            text,
            ordinal,
            total,
        })
        .collect()
}

/// Split with a chunk-count budget. Exceeding the budget is a hard error
/// raised before any chunk is dispatched.
pub fn split_bounded(
    text: &str,
    max_chars: usize,
    max_chunks: usize,
) -> Result<Vec<Chunk>, TranslationError> {
    let chunks = split(text, max_chars);
    if chunks.len() > max_chunks {
        return Err(TranslationError::ChunkLimitExceeded {
            required: chunks.len(),
            limit: max_chunks,
        });
    }
    Ok(chunks)
}

/// Latest candidate of the highest-ranked break class within [from, to].
/// Returns the cut position (just after the matched delimiter).
fn find_soft_break(text: &str, from: usize, to: usize) -> Option<usize> {
    let from = snap_to_char_boundary(text, from.min(to));
    let region = &text[from..to];

    for class in BREAK_CLASSES {
        let mut best: Option<usize> = None;
        for pattern in *class {
            if let Some(pos) = region.rfind(pattern) {
                let cut = from + pos + pattern.len();
                if cut <= to {
                    best = Some(best.map_or(cut, |b: usize| b.max(cut)));
                }
            }
        }
        if best.is_some() {
            return best;
        }
    }
    None
}

/// Move a cut out of any open sentinel token, HTML comment, or HTML tag by
/// backing up to the construct's opening delimiter, a bounded number of
/// times. Forces progress at the original cut if no safe point exists.
fn avoid_open_constructs(text: &str, start: usize, cut: usize) -> usize {
    let original = cut;
    let mut cut = cut;

    for _ in 0..MAX_BACKUP_STEPS {
        let Some(opener) = open_construct_at(text, cut) else {
            return cut;
        };
        if opener <= start {
            break;
        }
        cut = opener;
    }

    if open_construct_at(text, cut).is_none() && cut > start {
        cut
    } else {
        // No safe cut in this window; force progress to guarantee
        // termination. The integrity check downstream catches any damage.
        debug!("no safe cut point found near byte {}, forcing progress", original);
        original
    }
}

/// If `pos` lies inside an unterminated construct, the byte offset of that
/// construct's opening delimiter; None when the position is safe.
fn open_construct_at(text: &str, pos: usize) -> Option<usize> {
    let pos = snap_to_char_boundary(text, pos);
    let before = &text[..pos];

    // Sentinel token: [[COF_…]]
    if let Some(p) = before.rfind("[[COF_") {
        if !before[p..].contains("]]") {
            return Some(p);
        }
    }
    // HTML comment — checked before bare tags since it also opens with '<'
    if let Some(p) = before.rfind("<!--") {
        if !before[p..].contains("-->") {
            return Some(p);
        }
    }
    // HTML tag
    if let Some(p) = before.rfind('<') {
        if !before[p..].contains('>') {
            return Some(p);
        }
    }
    None
}

fn snap_to_char_boundary(text: &str, mut pos: usize) -> usize {
    pos = pos.min(text.len());
    while pos > 0 && !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}
