use crate::metadata::PaperMetadata;

/// What each of the four searches is meant to uncover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTopic {
    /// Macro trends in the paper's field.
    Trends,
    /// Reception, reviews and code of the paper itself.
    Impact,
    /// Prior work the paper builds on.
    Ancestors,
    /// Later work that cites or extends the paper.
    Descendants,
}

impl SearchTopic {
    pub fn label(self) -> &'static str {
        match self {
            SearchTopic::Trends => "domain trends",
            SearchTopic::Impact => "paper impact",
            SearchTopic::Ancestors => "upstream lineage",
            SearchTopic::Descendants => "downstream lineage",
        }
    }
}

/// The four search queries of one report, built from the same metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchQueries {
    pub trends: String,
    pub impact: String,
    pub ancestors: String,
    pub descendants: String,
}

impl ResearchQueries {
    pub fn from_metadata(meta: &PaperMetadata) -> Self {
        let title = &meta.title;
        Self {
            trends: format!("{} research trends 2024 2025 state of the art", meta.domain),
            impact: format!("{title} paper reviews impact github code implementation"),
            ancestors: format!(
                "What papers inspired {title}? foundations based on {}",
                meta.baselines_joined()
            ),
            descendants: format!("papers citing {title} improvements extensions 2024 2025"),
        }
    }

    /// Queries in issue order: trends, impact, then lineage.
    pub fn in_order(&self) -> [(SearchTopic, &str); 4] {
        [
            (SearchTopic::Trends, self.trends.as_str()),
            (SearchTopic::Impact, self.impact.as_str()),
            (SearchTopic::Ancestors, self.ancestors.as_str()),
            (SearchTopic::Descendants, self.descendants.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> PaperMetadata {
        PaperMetadata {
            title: "Deep Residual Learning".into(),
            domain: "Computer Vision".into(),
            keywords: vec!["residual".into()],
            baselines: vec!["VGG".into(), "Highway Networks".into()],
        }
    }

    #[test]
    fn templates_filled_from_metadata() {
        let q = ResearchQueries::from_metadata(&meta());
        assert_eq!(q.trends, "Computer Vision research trends 2024 2025 state of the art");
        assert_eq!(
            q.impact,
            "Deep Residual Learning paper reviews impact github code implementation"
        );
        assert_eq!(
            q.ancestors,
            "What papers inspired Deep Residual Learning? foundations based on VGG, Highway Networks"
        );
        assert_eq!(
            q.descendants,
            "papers citing Deep Residual Learning improvements extensions 2024 2025"
        );
    }

    #[test]
    fn deterministic() {
        assert_eq!(
            ResearchQueries::from_metadata(&meta()),
            ResearchQueries::from_metadata(&meta())
        );
    }

    #[test]
    fn keywords_do_not_affect_queries() {
        let mut other = meta();
        other.keywords = vec!["something else".into()];
        assert_eq!(
            ResearchQueries::from_metadata(&meta()),
            ResearchQueries::from_metadata(&other)
        );
    }

    #[test]
    fn fixed_order() {
        let q = ResearchQueries::from_metadata(&meta());
        let topics: Vec<SearchTopic> = q.in_order().iter().map(|(t, _)| *t).collect();
        assert_eq!(
            topics,
            vec![
                SearchTopic::Trends,
                SearchTopic::Impact,
                SearchTopic::Ancestors,
                SearchTopic::Descendants
            ]
        );
    }
}
