// Answer post-processing: numeric spacing cleanup and bullet summaries
use regex::Regex;
use std::sync::OnceLock;

use crate::rag::prompt::escape;

/// Patterns for numbers the model split with stray whitespace
struct NumericPatterns {
    thousands: Regex,
    decimal: Regex,
    currency: Regex,
    percent: Regex,
}

fn patterns() -> &'static NumericPatterns {
    static PATTERNS: OnceLock<NumericPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| NumericPatterns {
        // "1 , 234" -> "1,234"; "2023, 250" is a list and stays
        thousands: Regex::new(r"(\d)[ \t]+,[ \t]*(\d{3})\b").expect("valid regex"),
        // "2 . 7" -> "2.7"; "2. 7" is left alone since it may end a sentence
        decimal: Regex::new(r"(\d)[ \t]+\.[ \t]*(\d)").expect("valid regex"),
        // "$ 2.7" -> "$2.7"
        currency: Regex::new(r"\$[ \t]+(\d)").expect("valid regex"),
        // "4 %" -> "4%"
        percent: Regex::new(r"(\d)[ \t]+%").expect("valid regex"),
    })
}

/// Remove whitespace the model inserted inside numbers, amounts and percentages
pub fn clean_numeric_spacing(text: &str) -> String {
    let p = patterns();
    let text = p.thousands.replace_all(text, "$1,$2");
    let text = p.decimal.replace_all(&text, "$1.$2");
    let text = p.currency.replace_all(&text, "$$$1");
    let text = p.percent.replace_all(&text, "$1%");
    text.into_owned()
}

/// Prompt asking the model for a short bullet-point summary of an answer
pub fn summary_prompt(answer: &str) -> String {
    format!(
        "Summarize the answer below in three to five short bullet points. \
Keep every figure exactly as written. Reply with the bullet points only.\n<answer>\n{}\n</answer>",
        escape(answer)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separator() {
        assert_eq!(clean_numeric_spacing("sales of 1 , 234 units"), "sales of 1,234 units");
        assert_eq!(clean_numeric_spacing("sales of 1 ,234 units"), "sales of 1,234 units");
        // list commas stay untouched
        assert_eq!(clean_numeric_spacing("years 1, 2, and 3"), "years 1, 2, and 3");
    }

    #[test]
    fn test_number_lists_are_not_merged() {
        let text = "In 2023, 250 new stores opened.";
        assert_eq!(clean_numeric_spacing(text), text);
        let text = "Segments: 10, 200 and 300 units.";
        assert_eq!(clean_numeric_spacing(text), text);
    }

    #[test]
    fn test_decimal_point() {
        assert_eq!(clean_numeric_spacing("grew 2 . 7 points"), "grew 2.7 points");
        assert_eq!(clean_numeric_spacing("grew 2 .7 points"), "grew 2.7 points");
        assert_eq!(clean_numeric_spacing("End of 2023. 5 risks remain"), "End of 2023. 5 risks remain");
    }

    #[test]
    fn test_currency_and_percent() {
        assert_eq!(
            clean_numeric_spacing("revenue of $ 2.7 billion, up 4 %"),
            "revenue of $2.7 billion, up 4%"
        );
    }

    #[test]
    fn test_clean_text_is_unchanged() {
        let text = "Net sales were $2,700.5 million (up 3.1%).";
        assert_eq!(clean_numeric_spacing(text), text);
    }

    #[test]
    fn test_summary_prompt_wraps_answer() {
        let prompt = summary_prompt("Revenue <grew>.");
        assert!(prompt.contains("<answer>\nRevenue &lt;grew&gt;.\n</answer>"));
    }
}
