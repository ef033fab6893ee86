/*!
 * Anchoring engine for protected regions.
 *
 * Detects formulas and code blocks in a text/HTML blob and replaces each
 * with a unique sentinel token before translation, then restores them
 * afterwards. Detection is sequential pattern matching in priority order,
 * each pattern consuming its matches so later patterns cannot re-match
 * inside already-anchored content.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Kind of protected region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// Mathematical formula (math markup, TeX placeholder, equation comment)
    Formula,
    /// Preformatted block or inline code span
    Code,
}

/// One protected region, immutable once created
#[derive(Debug, Clone)]
pub struct ProtectedRegion {
    /// What was protected
    pub kind: RegionKind,
    /// The exact text that was replaced
    pub original: String,
    /// The sentinel token substituted into the anchored text
    pub token: String,
    /// Shared counter value at detection time (first-seen order)
    pub ordinal: usize,
}

/// Bidirectional mapping between sentinel tokens and protected regions
#[derive(Debug, Default)]
pub struct AnchorTable {
    /// Formula regions in detection order
    pub formulas: Vec<ProtectedRegion>,
    /// Code regions in detection order
    pub codes: Vec<ProtectedRegion>,
    formula_index: HashMap<String, usize>,
    code_index: HashMap<String, usize>,
}

impl AnchorTable {
    /// Total number of anchored regions
    pub fn len(&self) -> usize {
        self.formulas.len() + self.codes.len()
    }

    /// Whether no regions were anchored
    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty() && self.codes.is_empty()
    }

    /// Every sentinel token in detection order (formulas then codes)
    pub fn tokens(&self) -> Vec<&str> {
        self.formulas
            .iter()
            .chain(self.codes.iter())
            .map(|r| r.token.as_str())
            .collect()
    }

    /// Look up a formula region by its exact token string
    pub fn formula_by_token(&self, token: &str) -> Option<(usize, &ProtectedRegion)> {
        self.formula_index
            .get(token)
            .map(|&i| (i, &self.formulas[i]))
    }

    /// Look up a code region by its exact token string
    pub fn code_by_token(&self, token: &str) -> Option<&ProtectedRegion> {
        self.code_index.get(token).map(|&i| &self.codes[i])
    }

    fn push(&mut self, kind: RegionKind, original: String, token: String, ordinal: usize) {
        let region = ProtectedRegion {
            kind,
            original,
            token: token.clone(),
            ordinal,
        };
        match kind {
            RegionKind::Formula => {
                self.formula_index.insert(token, self.formulas.len());
                self.formulas.push(region);
            }
            RegionKind::Code => {
                self.code_index.insert(token, self.codes.len());
                self.codes.push(region);
            }
        }
    }
}

// Detection patterns, in consumption priority order. Region detection is
// pattern matching over the raw markup, not DOM parsing.
static MATH_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<math\b[^>]*>.*?</math>").unwrap());

// Placeholders the upstream TeX conversion step leaves behind, with or
// without their inline <span> wrapper.
static TEX_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)(?:<span\s+class="cof-math-(?:block|inline)">\s*)?<!--COF_TEX_\d+-->(?:\s*</span>)?"#,
    )
    .unwrap()
});

// The regex crate has no backreferences, so only the opening tag is matched
// here; the matching close tag is located by name in `consume_data_math`.
static DATA_MATH_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<([a-z][a-z0-9]*)\b[^>]*\bdata-math\s*=\s*"[^"]*"[^>]*>"#).unwrap()
});

// Office equation conditional comments carrying OMML.
static EQUATION_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<!--\[if\s+(?:gte\s+msEquation[^\]]*|mso)\]>.*?<!\[endif\]-->").unwrap()
});

static PRE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<pre\b[^>]*>.*?</pre>").unwrap());

static CODE_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<code\b[^>]*>.*?</code>").unwrap());

// Sentinel wire format (write side), plus the legacy HTML-comment syntax
// accepted on restore only.
static SENTINEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[COF_(FORMULA|CODE)_(\d+)\]\]|<!--(FORMULA|CODE)_ANCHOR_(\d+)-->").unwrap()
});

fn formula_token(n: usize) -> String {
    format!("[[COF_FORMULA_{}]]", n)
}

fn code_token(n: usize) -> String {
    format!("[[COF_CODE_{}]]", n)
}

/// Replace every protected region with a sentinel token.
///
/// Formula and code anchors share one monotonically increasing counter, so
/// a number is never reused across kinds. Passes run in priority order
/// (formulas before code), so numbering follows pass order, not document
/// order.
pub fn anchor(html: &str) -> (String, AnchorTable) {
    let mut table = AnchorTable::default();
    let mut counter = 0usize;
    let mut text = html.to_string();

    for pattern in [&MATH_ELEMENT, &TEX_PLACEHOLDER] {
        text = consume(pattern, &text, |m| {
            let token = formula_token(counter);
            table.push(RegionKind::Formula, m.to_string(), token.clone(), counter);
            counter += 1;
            token
        });
    }

    text = consume_data_math(&text, &mut table, &mut counter);

    text = consume(&EQUATION_COMMENT, &text, |m| {
        let token = formula_token(counter);
        table.push(RegionKind::Formula, m.to_string(), token.clone(), counter);
        counter += 1;
        token
    });

    text = consume(&PRE_BLOCK, &text, |m| {
        let token = code_token(counter);
        table.push(RegionKind::Code, m.to_string(), token.clone(), counter);
        counter += 1;
        token
    });

    // Inline code spans, skipping candidates inside a still-open <pre>
    // (well-formed pre blocks were consumed by the previous pass).
    let mut out = String::with_capacity(text.len());
    let mut last = 0usize;
    for m in CODE_SPAN.find_iter(&text) {
        if inside_open_pre(&text, m.start()) {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        let token = code_token(counter);
        table.push(
            RegionKind::Code,
            m.as_str().to_string(),
            token.clone(),
            counter,
        );
        counter += 1;
        out.push_str(&token);
        last = m.end();
    }
    out.push_str(&text[last..]);

    debug!(
        "anchored {} formulas and {} code regions",
        table.formulas.len(),
        table.codes.len()
    );
    (out, table)
}

fn consume<F>(pattern: &Regex, text: &str, mut replace: F) -> String
where
    F: FnMut(&str) -> String,
{
    pattern
        .replace_all(text, |caps: &Captures<'_>| replace(&caps[0]))
        .into_owned()
}

/// Elements carrying a formula-data attribute: the open tag is matched by
/// regex, the close tag located by name (first occurrence; nested identical
/// tags are out of scope for pattern matching).
fn consume_data_math(text: &str, table: &mut AnchorTable, counter: &mut usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0usize;
    for caps in DATA_MATH_OPEN.captures_iter(text) {
        let open = caps.get(0).unwrap();
        if open.start() < last {
            continue;
        }
        let tag = caps[1].to_ascii_lowercase();
        let close = format!("</{}>", tag);
        let rest = text[open.end()..].to_ascii_lowercase();
        let Some(close_at) = rest.find(&close) else {
            continue;
        };
        let end = open.end() + close_at + close.len();

        out.push_str(&text[last..open.start()]);
        let token = formula_token(*counter);
        table.push(
            RegionKind::Formula,
            text[open.start()..end].to_string(),
            token.clone(),
            *counter,
        );
        *counter += 1;
        out.push_str(&token);
        last = end;
    }
    out.push_str(&text[last..]);
    out
}

/// Whether the nearest preceding `<pre` open before `pos` is still unclosed
fn inside_open_pre(text: &str, pos: usize) -> bool {
    let before = text[..pos].to_ascii_lowercase();
    let Some(open) = before.rfind("<pre") else {
        return false;
    };
    !before[open..].contains("</pre")
}

/// Substitute sentinel tokens back with their recorded content.
///
/// Tokens are looked up by exact token string rather than scan order, so a
/// translator relocating tokens within the text cannot misplace regions.
/// When `translate_formulas` is set and a translated variant exists for a
/// formula's position, the variant is substituted instead of the original.
/// Unknown tokens are left untouched.
pub fn restore(
    text: &str,
    table: &AnchorTable,
    translate_formulas: bool,
    translated_formulas: &[Option<String>],
) -> String {
    SENTINEL
        .replace_all(text, |caps: &Captures<'_>| {
            let token = &caps[0];
            // Legacy comment tokens are normalized to the bracket form
            // before table lookup; the table only records bracket tokens.
            let lookup = if let (Some(kind), Some(n)) = (caps.get(3), caps.get(4)) {
                format!("[[COF_{}_{}]]", kind.as_str(), n.as_str())
            } else {
                token.to_string()
            };

            if let Some((index, region)) = table.formula_by_token(&lookup) {
                if translate_formulas {
                    if let Some(Some(variant)) = translated_formulas.get(index) {
                        return variant.clone();
                    }
                }
                region.original.clone()
            } else if let Some(region) = table.code_by_token(&lookup) {
                region.original.clone()
            } else {
                token.to_string()
            }
        })
        .into_owned()
}
