//! Cost calculation and token estimation
//!
//! One pure cost function shared by every adapter, plus a pre-flight
//! token estimate used by `estimate_cost`. Estimates are never billed.

use crate::core::types::ModelDescriptor;

/// Cost in USD for a completed request, from the model's static rates
pub fn calculate_cost(model: &ModelDescriptor, prompt_tokens: u32, completion_tokens: u32) -> f64 {
    let input = (prompt_tokens as f64 / 1000.0) * model.input_cost_per_1k;
    let output = (completion_tokens as f64 / 1000.0) * model.output_cost_per_1k;
    input + output
}

/// Character-based token estimate
///
/// Latin/ASCII text runs about 4 characters per token; dense scripts
/// (Arabic, CJK) tokenize closer to 2 characters per token.
pub fn estimate_tokens(text: &str) -> u32 {
    if text.is_empty() {
        return 0;
    }

    let mut ascii_chars = 0u32;
    let mut dense_chars = 0u32;
    for c in text.chars() {
        if c.is_ascii() {
            ascii_chars += 1;
        } else {
            dense_chars += 1;
        }
    }

    let estimate = ascii_chars.div_ceil(4) + dense_chars.div_ceil(2);
    estimate.max(1)
}

/// Token estimate over a whole conversation
pub fn estimate_message_tokens<'a>(contents: impl IntoIterator<Item = &'a str>) -> u32 {
    contents.into_iter().map(estimate_tokens).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::static_descriptor;

    #[test]
    fn cost_is_proportional_to_rates() {
        let model = static_descriptor("gpt-4o").unwrap();
        let cost = calculate_cost(model, 1000, 1000);
        assert!((cost - (0.0025 + 0.01)).abs() < 1e-9);
    }

    #[test]
    fn zero_tokens_cost_nothing() {
        let model = static_descriptor("claude-3-haiku-20240307").unwrap();
        assert_eq!(calculate_cost(model, 0, 0), 0.0);
    }

    #[test]
    fn ascii_text_estimates_four_chars_per_token() {
        // 40 ASCII chars -> 10 tokens
        assert_eq!(estimate_tokens(&"a".repeat(40)), 10);
    }

    #[test]
    fn arabic_text_estimates_two_chars_per_token() {
        let text: String = std::iter::repeat('\u{0634}').take(40).collect();
        assert_eq!(estimate_tokens(&text), 20);
    }

    #[test]
    fn empty_text_is_zero_tokens() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn short_text_is_at_least_one_token() {
        assert_eq!(estimate_tokens("a"), 1);
    }

    #[test]
    fn message_tokens_sum_over_turns() {
        let total = estimate_message_tokens(["aaaa", "bbbb"]);
        assert_eq!(total, 2);
    }
}
