/*!
 * Common test utilities for the anchorlate test suite
 */

use anchorlate::app_config::{Config, ServiceKind};

/// Initialize logging for tests; honors RUST_LOG and is safe to call from
/// every test (only the first call wins)
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a config for the given service with French as the target language
pub fn config_for(service: ServiceKind) -> Config {
    Config {
        service,
        target_languages: vec!["fr".to_string()],
        ..Config::default()
    }
}

/// Generate plain prose of at least `total_chars` characters, organized in
/// sentences and paragraphs so the splitter has soft breaks to work with
pub fn long_paragraphs(total_chars: usize) -> String {
    let sentence = "The committee reviewed the proposal in detail before voting. ";
    let mut text = String::with_capacity(total_chars + 128);
    let mut sentences = 0;
    while text.len() < total_chars {
        text.push_str(sentence);
        sentences += 1;
        if sentences % 8 == 0 {
            text.push_str("\n\n");
        }
    }
    text
}

/// An HTML fragment exercising every protected-region pattern
pub fn rich_document() -> String {
    concat!(
        "<p>Einstein showed that <math><mi>E</mi><mo>=</mo><mi>m</mi><msup><mi>c</mi>",
        "<mn>2</mn></msup></math> holds.</p>",
        "<p>Earlier conversion left <span class=\"cof-math-inline\"><!--COF_TEX_0--></span> in place.</p>",
        "<p>Some editors tag formulas as <span data-math=\"\\frac{a}{b}\">a/b</span> instead.</p>",
        "<p><!--[if gte msEquation 12]><m:oMath>x</m:oMath><![endif]--></p>",
        "<pre><code>fn main() {\n    println!(\"hello\");\n}</code></pre>",
        "<p>Call <code>parse()</code> before <code>render()</code>.</p>",
    )
    .to_string()
}
