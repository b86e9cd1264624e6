/// Options for word wrapping.
#[derive(Debug, Clone)]
pub struct WrapOptions {
    /// Maximum width of each line. Default is 50.
    pub width: usize,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self { width: 50 }
    }
}

/// Wrap text to a specified width.
///
/// Splits the input string into lines, respecting word boundaries where possible.
///
/// # Examples
///
/// ```
/// use json_joy_util::strings::{word_wrap, WrapOptions};
///
/// let text = "This is a long line of text that should be wrapped.";
/// let lines = word_wrap(text, Some(WrapOptions { width: 20 }));
///
/// assert!(!lines.is_empty());
/// for line in &lines {
///     assert!(line.len() <= 20 || !line.contains(' '));
/// }
/// ```
pub fn word_wrap(s: &str, options: Option<WrapOptions>) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }

    let opts = options.unwrap_or_default();
    let width = opts.width;

    let mut lines = Vec::new();

    // Split by existing newlines first
    for paragraph in s.split('\n') {
        let paragraph = paragraph.trim_end();
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }

        // Split paragraph into words
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        let mut current_line = String::new();

        for word in words {
            if current_line.is_empty() {
                current_line.push_str(word);
            } else if current_line.len() + 1 + word.len() <= width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current_line));
                current_line.push_str(word);
            }
        }

        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    lines
}
