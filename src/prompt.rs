//! Generation prompts for each campaign mode.

use crate::variants::CampaignMode;

/// Builds the completion prompt asking for `count` variants of `brief`.
pub fn build_prompt(brief: &str, mode: CampaignMode, count: usize) -> String {
    let brief = brief.trim();
    match mode {
        CampaignMode::SingleField => format!(
            "Generate {count} different catchy title variants for {brief}. \
             Make them short, punchy, and effective for marketing. \
             Return only the titles, one per line, numbered 1-{count}."
        ),
        CampaignMode::MultiField => format!(
            "Generate {count} different header and call-to-action couples for {brief}. \
             Headers must be short and attention grabbing, calls to action must be a few words \
             that tell the reader what to do. Number the couples 1-{count} and write each one \
             as two lines:\nHeader: <header>\nCTA: <call to action>\n\
             Return nothing else."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_prompt_asks_for_numbered_lines() {
        let prompt = build_prompt("  marketing for black friday ", CampaignMode::SingleField, 10);
        assert!(prompt.contains("10 different catchy title variants for marketing for black friday."));
        assert!(prompt.contains("numbered 1-10"));
    }

    #[test]
    fn couple_prompt_names_both_markers() {
        let prompt = build_prompt("spring launch", CampaignMode::MultiField, 4);
        assert!(prompt.contains("Header: <header>"));
        assert!(prompt.contains("CTA: <call to action>"));
        assert!(prompt.contains("1-4"));
    }
}
