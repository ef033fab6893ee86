/*!
 * Prompt construction and response validation for LLM-backed adapters.
 *
 * Chunks are wrapped between explicit delimiters and the model is told to
 * emit only the delimited translation, preserving sentinel tokens verbatim.
 * Responses that miss the output wrapper, leak instruction text, or are
 * implausibly short are rejected so the adapter can retry or raise.
 *
 * The escalation path is an ordered list of prompt variants rather than
 * hardcoded retry text: the first variant is used on the first attempt, the
 * next stricter one on retry.
 */

const INPUT_OPEN: &str = "<<<INPUT>>>";
const INPUT_CLOSE: &str = "<<<END_INPUT>>>";
const OUTPUT_OPEN: &str = "<<<OUTPUT>>>";
const OUTPUT_CLOSE: &str = "<<<END_OUTPUT>>>";

// Outputs shorter than input length / RATIO for inputs above the threshold
// are treated as truncation. Translations legitimately compress, but not
// by this much.
const LENGTH_RATIO_FLOOR: usize = 4;
const LENGTH_CHECK_THRESHOLD: usize = 80;

/// One prompt configuration in the escalation list
#[derive(Debug, Clone, Copy)]
pub struct PromptVariant {
    /// Instruction text placed before the delimited input; `{target}` is
    /// substituted with the target language
    pub instruction: &'static str,
}

/// Escalation list, mildest first
pub const PROMPT_VARIANTS: &[PromptVariant] = &[
    PromptVariant {
        instruction: "You are a translation engine. Translate the text between \
                      <<<INPUT>>> and <<<END_INPUT>>> into {target}. Keep every \
                      [[COF_FORMULA_n]] and [[COF_CODE_n]] token exactly as written \
                      and do not alter any markup. Reply with only the translation, \
                      wrapped between <<<OUTPUT>>> and <<<END_OUTPUT>>>.",
    },
    PromptVariant {
        instruction: "STRICT MODE. Output format: <<<OUTPUT>>>translation<<<END_OUTPUT>>> \
                      and nothing else. No commentary, no restating of these \
                      instructions, no partial output. Translate into {target}. Every \
                      token of the form [[COF_FORMULA_n]] or [[COF_CODE_n]] must appear \
                      in your output exactly once, unchanged. Markup must not be altered.",
    },
];

/// Build the full prompt for one chunk
pub fn build_prompt(variant: &PromptVariant, chunk: &str, target_lang: &str) -> String {
    format!(
        "{}\n\n{}\n{}\n{}",
        variant.instruction.replace("{target}", target_lang),
        INPUT_OPEN,
        chunk,
        INPUT_CLOSE
    )
}

/// Why a model response was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseDefect {
    /// Output delimiters absent
    MissingWrapper,
    /// Instruction or input text echoed into the output
    LeakedInstructions,
    /// Output implausibly shorter than the input
    ImplausiblyShort,
}

impl std::fmt::Display for ResponseDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::MissingWrapper => "response is missing the output wrapper",
            Self::LeakedInstructions => "response leaked instruction or input text",
            Self::ImplausiblyShort => "response is implausibly shorter than the input",
        };
        write!(f, "{}", reason)
    }
}

/// Extract and vet the delimited translation from a raw model response
pub fn extract_translation(chunk: &str, response: &str) -> Result<String, ResponseDefect> {
    let start = response
        .find(OUTPUT_OPEN)
        .ok_or(ResponseDefect::MissingWrapper)?
        + OUTPUT_OPEN.len();
    let end = response[start..]
        .find(OUTPUT_CLOSE)
        .map(|p| p + start)
        .ok_or(ResponseDefect::MissingWrapper)?;
    let translation = response[start..end].trim().to_string();

    if translation.contains(INPUT_OPEN)
        || translation.contains(INPUT_CLOSE)
        || translation.contains(OUTPUT_OPEN)
        || translation.contains("You are a translation engine")
        || translation.contains("STRICT MODE")
    {
        return Err(ResponseDefect::LeakedInstructions);
    }

    if chunk.len() > LENGTH_CHECK_THRESHOLD
        && translation.len() < chunk.len() / LENGTH_RATIO_FLOOR
    {
        return Err(ResponseDefect::ImplausiblyShort);
    }

    Ok(translation)
}
