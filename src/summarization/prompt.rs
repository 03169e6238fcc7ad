//! Prompt construction and summary granularity.

use std::convert::Infallible;
use std::str::FromStr;

/// Requested summary length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryType {
    /// A single short line.
    OneLine,
    /// Three concise lines.
    ThreeLine,
    /// Five short lines.
    FiveLine,
    /// A concise paragraph.
    #[default]
    Paragraph,
}

impl SummaryType {
    /// Wire value accepted by the form field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneLine => "1-line",
            Self::ThreeLine => "3-line",
            Self::FiveLine => "5-line",
            Self::Paragraph => "paragraph",
        }
    }

    /// Natural-language length instruction embedded in the prompt.
    pub fn length_instruction(self) -> &'static str {
        match self {
            Self::OneLine => "in one short line",
            Self::ThreeLine => "in three concise lines",
            Self::FiveLine => "in five short lines",
            Self::Paragraph => "as a concise paragraph",
        }
    }

    /// Parse a selector, falling back to [`SummaryType::Paragraph`] for anything unrecognized.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim() {
            "1-line" => Self::OneLine,
            "3-line" => Self::ThreeLine,
            "5-line" => Self::FiveLine,
            _ => Self::Paragraph,
        }
    }
}

impl FromStr for SummaryType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

/// Assemble the single-turn prompt sent to the model.
pub fn build_prompt(text: &str, summary_type: SummaryType) -> String {
    format!(
        "Summarize the following text {}. \
         Do NOT start with phrases like 'This document is about', \
         'This text contains', or similar. \
         Provide only the summary without introduction phrases.\n\n{text}",
        summary_type.length_instruction()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_selectors_fall_back_to_paragraph() {
        assert_eq!(SummaryType::parse_lenient("1-line"), SummaryType::OneLine);
        assert_eq!(SummaryType::parse_lenient(" 5-line "), SummaryType::FiveLine);
        assert_eq!(SummaryType::parse_lenient("bullet"), SummaryType::Paragraph);
        assert_eq!(SummaryType::parse_lenient(""), SummaryType::Paragraph);
        assert_eq!("3-line".parse::<SummaryType>(), Ok(SummaryType::ThreeLine));
    }

    #[test]
    fn prompt_embeds_instruction_and_text() {
        let prompt = build_prompt("The source body.", SummaryType::OneLine);
        assert!(prompt.starts_with("Summarize the following text in one short line. Do NOT start"));
        assert!(prompt.contains("'This text contains'"));
        assert!(prompt.ends_with("introduction phrases.\n\nThe source body."));
    }
}
