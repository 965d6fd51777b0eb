//! The final synthesis prompt.
//!
//! The six-section outline lives only here. The model's reply is not checked
//! against it.

use crate::metadata::PaperMetadata;
use crate::queries::SearchTopic;
use crate::text_utils::{REPORT_EXCERPT_CHARS, truncate_chars};

/// Outcome of one search as fed to the prompt.
#[derive(Debug, Clone)]
pub struct TopicDigest {
    pub topic: SearchTopic,
    /// `None` when the search failed.
    pub digest: Option<String>,
}

fn intelligence_section(digests: &[TopicDigest]) -> String {
    digests
        .iter()
        .map(|d| match &d.digest {
            Some(text) => format!("### {}\n{}\n\n", d.topic.label(), text),
            None => format!(
                "### {}\n(No external information available for this topic; rely on the paper and general knowledge, and say so.)\n\n",
                d.topic.label()
            ),
        })
        .collect()
}

/// Build the report prompt from metadata, search digests and the paper.
pub fn report_prompt(
    meta: &PaperMetadata,
    digests: &[TopicDigest],
    paper_text: &str,
    language: &str,
) -> String {
    let title = &meta.title;
    let baselines = meta.baselines_joined();

    format!(
        r#"You are a doctoral advisor in computer science with deep insight into academic lineages and a gift for teaching.
Using the [Paper text] and the [External intelligence] below, write an all-round close-reading report for your graduate students.

Goal: explain the technical principle clearly (Feynman technique) and place the paper in its academic history, what came before and what came after.

[Paper metadata]
Title: {title}
Domain: {domain}
Keywords: {keywords}
Baselines mentioned in the paper: {baselines}

[External intelligence (trends / reception / citation lineage)]
{intel}
[Paper text excerpt]
{excerpt}

---
Write the report in {language}, strictly following this Markdown structure:

# {title} - Close-Reading Report

## 1. The Big Picture: What problem does this paper solve? (The "Why")
* **Background and pain point**: In plain words, what was the field struggling with before this paper?
* **Core insight**: What blind spot did the authors notice that others missed?

## 2. The Core Trick: How does it work? (The "How")
* **Everyday analogy (essential)**: Explain the core algorithm or architecture with an analogy from daily life.
* **Technical roadmap**: Walk through its steps (Step 1, Step 2, ...).

## 3. Academic Lineage: Ancestors and Descendants (The Lineage)
*(This is the focus, analyse it in detail)*
* **Its ancestors (Foundations)**: Which classic works (such as {baselines}) does the core idea grow from? Is it a refinement or an overthrow of them? List concrete paper names.
* **Its descendants (Future Works)**: Using the external intelligence, which later papers cite it or improve on it? If none can be found, predict likely directions from the technical trends.

## 4. Academic Niche and Assessment
* **Side-by-side comparison**: Strengths and weaknesses against the state of the art.
* **Impact check**: Open-source availability and community feedback.

## 5. Feynman Rehearsal: How to explain it to someone else
* **One-sentence elevator pitch**: "If you could only say one sentence about this paper, say: ..."
* **30-second logic chain**: "It started because... since old methods had the problem of..., the authors proposed... and found..."
* **Likely tough questions**: What tricky questions might a listener ask? Anticipate them and sketch answers.

## 6. Advisor's Verdict
* **Recommendation**: (1-5 stars)
* **One-line summary**: Is it worth a close read?
"#,
        domain = meta.domain,
        keywords = meta.keywords.join(", "),
        intel = intelligence_section(digests),
        excerpt = truncate_chars(paper_text, REPORT_EXCERPT_CHARS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> PaperMetadata {
        PaperMetadata {
            title: "LoRA".into(),
            domain: "NLP".into(),
            keywords: vec!["low-rank".into(), "adapters".into(), "fine-tuning".into()],
            baselines: vec!["Adapters".into(), "Prefix Tuning".into()],
        }
    }

    fn digests() -> Vec<TopicDigest> {
        vec![
            TopicDigest {
                topic: SearchTopic::Trends,
                digest: Some("Source: trend".into()),
            },
            TopicDigest {
                topic: SearchTopic::Impact,
                digest: None,
            },
        ]
    }

    #[test]
    fn contains_six_sections() {
        let prompt = report_prompt(&meta(), &digests(), "paper", "English");
        for n in 1..=6 {
            assert!(prompt.contains(&format!("\n## {n}. ")), "missing section {n}");
        }
        assert!(prompt.contains("# LoRA - Close-Reading Report"));
        assert!(prompt.contains("Write the report in English"));
    }

    #[test]
    fn failed_digest_is_marked_not_inlined() {
        let prompt = report_prompt(&meta(), &digests(), "paper", "English");
        assert!(prompt.contains("### domain trends\nSource: trend"));
        assert!(prompt.contains("### paper impact\n(No external information available"));
    }

    #[test]
    fn digest_blocks_separated_by_blank_lines() {
        let section = intelligence_section(&digests());
        assert!(section.starts_with("### domain trends\nSource: trend\n\n### paper impact\n"));
        assert!(section.ends_with("say so.)\n\n"));
        assert_eq!(intelligence_section(&[]), "");
    }

    #[test]
    fn excerpt_truncated_to_20000_chars() {
        let text = format!("{}{}", "α".repeat(REPORT_EXCERPT_CHARS), "☃");
        let prompt = report_prompt(&meta(), &[], &text, "English");
        assert!(prompt.contains(&"α".repeat(REPORT_EXCERPT_CHARS)));
        assert!(!prompt.contains('☃'));
    }
}
