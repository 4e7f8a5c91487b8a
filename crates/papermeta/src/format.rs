//! Title normalization for download file names.
//!
//! Scraped titles contain punctuation, LaTeX remnants and arbitrary whitespace. This module turns
//! them into a single filesystem-friendly token: punctuation is dropped, whitespace runs become
//! one underscore, and overly long titles are cut at a word boundary.
//!
//! # Examples
//!
//! ```
//! use papermeta::format;
//!
//! let title = "Attention Is All You Need: Revisited";
//! assert_eq!(format::normalize_title(title, None), "Attention_Is_All_You_Need_Revisited");
//!
//! // Custom length limit
//! assert_eq!(format::normalize_title(title, Some(20)), "Attention_Is_All_You");
//! ```

use lazy_static::lazy_static;
use regex::Regex;

/// Length limit applied when the caller does not provide one.
pub const DEFAULT_MAX_LENGTH: usize = 100;

/// Normalizes a paper title for use inside a file name.
///
/// This function performs several transformations:
/// - Removes every character that is not a letter, digit, whitespace, `-` or `_`
/// - Replaces whitespace (including multiple spaces and newlines) with single underscores
/// - Truncates to a maximum byte length while preserving word boundaries
///
/// Case is preserved so that acronyms in titles remain readable.
///
/// # Arguments
///
/// * `title` - The scraped title
/// * `max_length` - Optional maximum length. If `None`, defaults to [`DEFAULT_MAX_LENGTH`].
///
/// # Examples
///
/// ```
/// use papermeta::format;
///
/// assert_eq!(format::normalize_title("Hello,   World!", None), "Hello_World");
/// assert_eq!(format::normalize_title("Self-Supervised ViTs", None), "Self-Supervised_ViTs");
/// ```
pub fn normalize_title(title: &str, max_length: Option<usize>) -> String {
  lazy_static! {
      static ref UNSAFE: Regex = Regex::new(r"[^\w\s-]").unwrap();
  }

  let cleaned = UNSAFE.replace_all(title, "");
  let words: Vec<&str> = cleaned.split_whitespace().collect();
  let max_length = max_length.unwrap_or(DEFAULT_MAX_LENGTH);

  let mut result = String::new();
  for word in words {
    let separator = usize::from(!result.is_empty());
    if result.len() + separator + word.len() > max_length {
      break;
    }
    if separator == 1 {
      result.push('_');
    }
    result.push_str(word);
  }

  result
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_normalize_title() {
    assert_eq!(normalize_title("Hello World", None), "Hello_World");
    assert_eq!(normalize_title("No    Extra    Spaces", None), "No_Extra_Spaces");
    assert_eq!(normalize_title("Line\nBreaks\tand tabs", None), "Line_Breaks_and_tabs");
    assert_eq!(normalize_title("What's in a Name? A Study", None), "Whats_in_a_Name_A_Study");
    assert_eq!(normalize_title("  short  ", None), "short");
    assert_eq!(normalize_title("", None), "");
  }

  #[test]
  fn test_normalize_title_truncates_on_word_boundary() {
    let title = "This Is A Very Long Title Indeed";
    assert_eq!(normalize_title(title, Some(20)), "This_Is_A_Very_Long");
    assert_eq!(normalize_title(title, Some(25)), "This_Is_A_Very_Long_Title");
    assert_eq!(normalize_title(title, Some(3)), "");
  }

  #[test]
  fn test_normalize_title_default_limit() {
    let title = "word ".repeat(40);
    let normalized = normalize_title(&title, None);
    assert!(normalized.len() <= DEFAULT_MAX_LENGTH);
    assert!(normalized.starts_with("word_word"));
    assert!(!normalized.ends_with('_'));
  }
}
