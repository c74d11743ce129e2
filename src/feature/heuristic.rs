use regex::RegexSet;
use serde::{Deserialize, Serialize};

use crate::{
    document::Document,
    error::FeatureError,
    feature::{Category, FeatureId},
};

pub(crate) const KIND: &str = "heuristic";

/// One pattern → score rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub pattern: String,
    pub score: f64,
}

impl Rule {
    pub fn new(pattern: impl Into<String>, score: f64) -> Self {
        Self {
            pattern: pattern.into(),
            score,
        }
    }
}

/// Uncompiled rule definition of a heuristic feature
/// Patterns run against lower-cased text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicRules {
    pub title: Vec<Rule>,
    pub body: Vec<Rule>,
    pub title_blacklist: Vec<String>,
    pub body_blacklist: Vec<String>,
}

impl HeuristicRules {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.body.is_empty()
    }
}

/// compiled rules of one side, every pattern tested in a single pass
#[derive(Debug, Clone)]
struct RuleSet {
    patterns: RegexSet,
    scores: Vec<f64>,
}

impl RuleSet {
    fn compile(id: FeatureId, rules: &[Rule]) -> Result<Self, FeatureError> {
        if let Some(rule) = rules.iter().find(|r| !(0.0..=1.0).contains(&r.score)) {
            return Err(FeatureError::ScoreOutOfRange { id, score: rule.score });
        }
        let patterns = compile_set(id, rules.iter().map(|r| r.pattern.as_str()))?;
        Ok(Self {
            patterns,
            scores: rules.iter().map(|r| r.score).collect(),
        })
    }

    /// highest score among matching rules, 0 when none match
    fn best_match(&self, text: &str) -> f64 {
        self.patterns
            .matches(text)
            .iter()
            .map(|idx| self.scores[idx])
            .fold(0.0, f64::max)
    }
}

fn compile_set<'a, I>(id: FeatureId, patterns: I) -> Result<RegexSet, FeatureError>
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    let patterns = patterns.into_iter();
    RegexSet::new(patterns.clone()).map_err(|source| {
        // point at the offending pattern rather than the whole set
        let pattern = patterns
            .into_iter()
            .find(|p| regex::Regex::new(p).is_err())
            .unwrap_or_default()
            .to_string();
        FeatureError::InvalidPattern { id, pattern, source }
    })
}

/// HeuristicFeature
/// Scores a document from hand written regex rules over its lower-cased
/// title and first paragraph.
///
/// score = max(best title rule, best body rule), unless a title blacklist
/// pattern hits the title or a body blacklist pattern hits the first
/// paragraph, in which case the score is 0.
#[derive(Debug, Clone)]
pub struct HeuristicFeature {
    id: FeatureId,
    title: String,
    title_rules: RuleSet,
    body_rules: RuleSet,
    title_blacklist: RegexSet,
    body_blacklist: RegexSet,
}

impl HeuristicFeature {
    /// Compile a heuristic feature
    ///
    /// # Errors
    /// * `CategoryMismatch` - `category` is not `ManualHeuristic`
    /// * `MissingRules` - neither side has a rule
    /// * `ScoreOutOfRange` - a rule score is outside [0, 1]
    /// * `InvalidPattern` - a pattern does not compile
    pub fn new(
        id: FeatureId,
        category: Category,
        title: impl Into<String>,
        rules: &HeuristicRules,
    ) -> Result<Self, FeatureError> {
        if category != Category::ManualHeuristic {
            return Err(FeatureError::CategoryMismatch { id, category, kind: KIND });
        }
        if rules.is_empty() {
            return Err(FeatureError::MissingRules(id));
        }
        Ok(Self {
            id,
            title: title.into(),
            title_rules: RuleSet::compile(id, &rules.title)?,
            body_rules: RuleSet::compile(id, &rules.body)?,
            title_blacklist: compile_set(id, rules.title_blacklist.iter().map(String::as_str))?,
            body_blacklist: compile_set(id, rules.body_blacklist.iter().map(String::as_str))?,
        })
    }

    #[inline]
    pub fn id(&self) -> FeatureId {
        self.id
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Score a document, always in [0, 1]
    pub fn score<D>(&self, document: &D) -> f64
    where
        D: Document + ?Sized,
    {
        let title = document.title().to_lowercase();
        let body = document.first_paragraph().to_lowercase();
        self.score_text(&title, &body)
    }

    /// Score already lower-cased title and body text
    pub fn score_text(&self, title: &str, body: &str) -> f64 {
        if self.title_blacklist.is_match(title) || self.body_blacklist.is_match(body) {
            return 0.0;
        }
        self.title_rules
            .best_match(title)
            .max(self.body_rules.best_match(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ParsedDocument;

    fn rules(title: &[(&str, f64)], title_blacklist: &[&str]) -> HeuristicRules {
        HeuristicRules {
            title: title.iter().map(|(p, s)| Rule::new(*p, *s)).collect(),
            title_blacklist: title_blacklist.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    fn feature(rules: &HeuristicRules) -> HeuristicFeature {
        HeuristicFeature::new(FeatureId(30_999), Category::ManualHeuristic, "test", rules).unwrap()
    }

    #[test]
    fn best_rule_wins() {
        let f = feature(&rules(&[("hello", 1.0), ("drool", 0.5)], &[]));
        assert_eq!(f.score_text("moose drool 500", ""), 0.5);
        assert_eq!(f.score_text("moose drool hello 500", ""), 1.0);
        assert_eq!(f.score_text("jorge pasilda", ""), 0.0);
    }

    #[test]
    fn blacklist_vetoes() {
        let f = feature(&rules(&[("launch", 0.8)], &["rumor"]));
        let doc = ParsedDocument::new("a", "Company X launches product amid rumor of delay");
        assert_eq!(f.score(&doc), 0.0);
        let doc = ParsedDocument::new("b", "Launch day");
        assert_eq!(f.score(&doc), 0.8);
    }

    #[test]
    fn body_reads_first_paragraph_only() {
        let rules = HeuristicRules {
            body: vec![Rule::new("acquires", 0.8)],
            body_blacklist: vec!["federal reserve".into()],
            ..Default::default()
        };
        let f = feature(&rules);
        let doc = ParsedDocument::new("a", "Quiet day")
            .with_paragraph("Initech acquires Initrode.")
            .with_paragraph("The Federal Reserve did nothing.");
        assert_eq!(f.score(&doc), 0.8);
        let doc = ParsedDocument::new("b", "Quiet day")
            .with_paragraph("The Federal Reserve watched as Initech acquires Initrode.");
        assert_eq!(f.score(&doc), 0.0);
        let doc = ParsedDocument::new("c", "Quiet day");
        assert_eq!(f.score(&doc), 0.0);
    }

    #[test]
    fn title_and_body_take_the_max() {
        let rules = HeuristicRules {
            title: vec![Rule::new("buys", 0.9)],
            body: vec![Rule::new("acquires", 0.8)],
            ..Default::default()
        };
        let f = feature(&rules);
        let doc = ParsedDocument::new("a", "Initech buys Initrode").with_paragraph("Initech acquires it.");
        assert_eq!(f.score(&doc), 0.9);
    }

    #[test]
    fn construction_errors() {
        let good = rules(&[("x", 0.5)], &[]);
        assert!(matches!(
            HeuristicFeature::new(FeatureId(1), Category::Industry, "t", &good),
            Err(FeatureError::CategoryMismatch { .. })
        ));
        assert!(matches!(
            HeuristicFeature::new(FeatureId(1), Category::ManualHeuristic, "t", &HeuristicRules::default()),
            Err(FeatureError::MissingRules(FeatureId(1)))
        ));
        assert!(matches!(
            HeuristicFeature::new(FeatureId(1), Category::ManualHeuristic, "t", &rules(&[("x", 1.5)], &[])),
            Err(FeatureError::ScoreOutOfRange { score, .. }) if score == 1.5
        ));
        match HeuristicFeature::new(FeatureId(1), Category::ManualHeuristic, "t", &rules(&[("ok", 0.1), ("(", 0.5)], &[])) {
            Err(FeatureError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "("),
            other => panic!("unexpected {other:?}"),
        }
    }
}
