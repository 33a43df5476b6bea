//! Route table and language detection

/// One (task type, language) keyed preference list
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub task_type: String,
    pub language: String,
    /// Candidate model ids in preference order
    pub models: Vec<String>,
}

impl RouteEntry {
    pub fn new<S: Into<String>>(task_type: S, language: S, models: Vec<&str>) -> Self {
        Self {
            task_type: task_type.into(),
            language: language.into(),
            models: models.into_iter().map(String::from).collect(),
        }
    }
}

/// Domain preference table used when the caller gives no explicit table
pub fn default_routes() -> Vec<RouteEntry> {
    vec![
        RouteEntry::new(
            "complaints",
            "arabic",
            vec!["claude-3-5-sonnet-20241022", "gpt-4o", "claude-3-haiku-20240307"],
        ),
        RouteEntry::new(
            "complaints",
            "english",
            vec!["gpt-4o", "claude-3-5-sonnet-20241022", "gpt-4o-mini"],
        ),
        RouteEntry::new(
            "report",
            "arabic",
            vec!["claude-3-5-sonnet-20241022", "gpt-4o"],
        ),
        RouteEntry::new(
            "report",
            "english",
            vec!["gpt-4o", "claude-3-5-sonnet-20241022"],
        ),
        RouteEntry::new(
            "chat",
            "arabic",
            vec!["claude-3-haiku-20240307", "gpt-4o-mini", "llama-3.3-70b-versatile"],
        ),
        RouteEntry::new(
            "chat",
            "english",
            vec!["gpt-4o-mini", "llama-3.3-70b-versatile", "claude-3-haiku-20240307"],
        ),
    ]
}

/// Fallback preference order when no route key matches
pub fn default_priority() -> Vec<String> {
    [
        "gpt-4o",
        "claude-3-5-sonnet-20241022",
        "gpt-4o-mini",
        "claude-3-haiku-20240307",
        "llama-3.3-70b-versatile",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Fraction of alphabetic characters that must be Arabic script before
/// a turn is routed as Arabic
const ARABIC_RATIO_THRESHOLD: f64 = 0.3;

fn is_arabic_char(c: char) -> bool {
    matches!(c,
        '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{08A0}'..='\u{08FF}'
    )
}

/// Detect the routing language of a text from its script mix
pub fn detect_language(text: &str) -> &'static str {
    let mut alphabetic = 0usize;
    let mut arabic = 0usize;
    for c in text.chars() {
        if c.is_alphabetic() {
            alphabetic += 1;
            if is_arabic_char(c) {
                arabic += 1;
            }
        }
    }

    if alphabetic > 0 && arabic as f64 / alphabetic as f64 > ARABIC_RATIO_THRESHOLD {
        "arabic"
    } else {
        "english"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arabic_text_is_detected() {
        assert_eq!(detect_language("أريد تقديم شكوى بخصوص الخدمة"), "arabic");
    }

    #[test]
    fn english_text_is_detected() {
        assert_eq!(detect_language("I want to file a complaint"), "english");
    }

    #[test]
    fn mixed_text_uses_ratio_threshold() {
        // Mostly English with one Arabic word stays below the threshold
        assert_eq!(
            detect_language("please translate the word كتاب for me in this long sentence"),
            "english"
        );
    }

    #[test]
    fn empty_text_defaults_to_english() {
        assert_eq!(detect_language(""), "english");
        assert_eq!(detect_language("1234 !!"), "english");
    }
}
