//! Reading-time estimate

use super::post::ContentSection;
use super::rich_text;

/// Default reading rate in words per minute
pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

/// Count the words of a section's body text.
///
/// Words are whatever lies between single spaces, so an empty body still
/// counts as one word and double spaces add an empty word.
pub fn section_word_count(section: &ContentSection) -> usize {
    rich_text::as_text(&section.body).split(' ').count()
}

/// Estimate reading minutes for a list of sections.
///
/// Every section is rounded up to a whole minute on its own before summing,
/// so `[199, 1]` words take two minutes, not one.
pub fn estimate_minutes(sections: &[ContentSection], words_per_minute: usize) -> usize {
    let rate = words_per_minute.max(1);
    sections
        .iter()
        .map(|section| section_word_count(section).div_ceil(rate))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RichTextBlock;

    fn section_with_words(count: usize) -> ContentSection {
        let text = vec!["palavra"; count].join(" ");
        ContentSection {
            heading: format!("{} words", count),
            body: vec![RichTextBlock::new("paragraph", &text)],
        }
    }

    #[test]
    fn test_no_sections() {
        assert_eq!(estimate_minutes(&[], DEFAULT_WORDS_PER_MINUTE), 0);
    }

    #[test]
    fn test_rounding_is_per_section() {
        let sections = vec![section_with_words(199), section_with_words(1)];
        assert_eq!(section_word_count(&sections[0]), 199);
        assert_eq!(estimate_minutes(&sections, DEFAULT_WORDS_PER_MINUTE), 2);
    }

    #[test]
    fn test_exact_multiple() {
        let sections = vec![section_with_words(400)];
        assert_eq!(estimate_minutes(&sections, DEFAULT_WORDS_PER_MINUTE), 2);
        let sections = vec![section_with_words(401)];
        assert_eq!(estimate_minutes(&sections, DEFAULT_WORDS_PER_MINUTE), 3);
    }

    #[test]
    fn test_blocks_are_joined_with_a_space() {
        let section = ContentSection {
            heading: String::new(),
            body: vec![
                RichTextBlock::new("paragraph", "one two"),
                RichTextBlock::new("list-item", "three"),
            ],
        };
        assert_eq!(section_word_count(&section), 3);
    }

    #[test]
    fn test_empty_body_counts_one_word() {
        let section = ContentSection::default();
        assert_eq!(section_word_count(&section), 1);
        assert_eq!(estimate_minutes(&[section], DEFAULT_WORDS_PER_MINUTE), 1);
    }

    #[test]
    fn test_custom_rate() {
        let sections = vec![section_with_words(250)];
        assert_eq!(estimate_minutes(&sections, 100), 3);
    }
}
