//! # Recommendation Lookup: IPM Advice per Pest
//!
//! Given a pest name, filter the control catalog, group by IPM category and
//! sort each group by ascending priority. The sort is stable, so
//! recommendations sharing a priority keep their catalog order.
//!
//! ```text
//! catalog (chemical, Brown Planthopper): [p2 "Buprofezin", p1 "Imidacloprid", p1 "Pymetrozine"]
//! plan.chemical:                          [p1 "Imidacloprid", p1 "Pymetrozine", p2 "Buprofezin"]
//! ```
//!
//! An unknown pest yields a plan with four empty groups: callers may probe
//! speculatively without handling an error.

use serde::Serialize;

use crate::core::{ControlCategory, KnowledgeBase};

/// One recommendation inside a category group.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecommendationItem {
    pub recommendation: String,
    pub priority: u32,
}

/// Recommendations for one pest, grouped by IPM category.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RecommendationPlan {
    pub cultural: Vec<RecommendationItem>,
    pub mechanical: Vec<RecommendationItem>,
    pub biological: Vec<RecommendationItem>,
    pub chemical: Vec<RecommendationItem>,
}

impl RecommendationPlan {
    pub fn group(&self, category: ControlCategory) -> &[RecommendationItem] {
        match category {
            ControlCategory::Cultural => &self.cultural,
            ControlCategory::Mechanical => &self.mechanical,
            ControlCategory::Biological => &self.biological,
            ControlCategory::Chemical => &self.chemical,
        }
    }

    fn group_mut(&mut self, category: ControlCategory) -> &mut Vec<RecommendationItem> {
        match category {
            ControlCategory::Cultural => &mut self.cultural,
            ControlCategory::Mechanical => &mut self.mechanical,
            ControlCategory::Biological => &mut self.biological,
            ControlCategory::Chemical => &mut self.chemical,
        }
    }

    /// Non-empty groups in IPM presentation order.
    pub fn groups(&self) -> impl Iterator<Item = (ControlCategory, &[RecommendationItem])> {
        ControlCategory::IPM_ORDER
            .into_iter()
            .map(|c| (c, self.group(c)))
            .filter(|(_, items)| !items.is_empty())
    }

    /// Total number of recommendations across all groups.
    pub fn total(&self) -> usize {
        ControlCategory::IPM_ORDER
            .iter()
            .map(|&c| self.group(c).len())
            .sum()
    }

    /// Number of IPM categories with at least one recommendation.
    pub fn categories_covered(&self) -> usize {
        self.groups().count()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Builds the grouped, priority-sorted plan for `pest_name`.
pub fn recommendations_for(kb: &KnowledgeBase, pest_name: &str) -> RecommendationPlan {
    let mut plan = RecommendationPlan::default();
    for rec in kb
        .recommendations()
        .iter()
        .filter(|r| r.pest_name == pest_name)
    {
        plan.group_mut(rec.category).push(RecommendationItem {
            recommendation: rec.recommendation.clone(),
            priority: rec.priority,
        });
    }
    for category in ControlCategory::IPM_ORDER {
        // `sort_by_key` is stable.
        plan.group_mut(category).sort_by_key(|item| item.priority);
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{BROWN_PLANTHOPPER, RICE_BUG};
    use crate::core::ControlRecommendation;

    fn rec(pest: &str, category: ControlCategory, text: &str, priority: u32) -> ControlRecommendation {
        ControlRecommendation {
            pest_name: pest.to_string(),
            category,
            recommendation: text.to_string(),
            priority,
        }
    }

    #[test]
    fn priorities_sort_stably() {
        let kb = KnowledgeBase::new(
            vec![],
            vec![],
            vec![],
            vec![
                rec("Pest", ControlCategory::Chemical, "second", 2),
                rec("Pest", ControlCategory::Chemical, "first-a", 1),
                rec("Other", ControlCategory::Chemical, "ignored", 1),
                rec("Pest", ControlCategory::Chemical, "first-b", 1),
            ],
        );
        let plan = recommendations_for(&kb, "Pest");
        let texts: Vec<&str> = plan.chemical.iter().map(|r| r.recommendation.as_str()).collect();
        assert_eq!(texts, vec!["first-a", "first-b", "second"]);
        let priorities: Vec<u32> = plan.chemical.iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![1, 1, 2]);
        assert!(plan.cultural.is_empty());
    }

    #[test]
    fn unknown_pest_gives_empty_groups() {
        let kb = KnowledgeBase::malaysian_rice();
        let plan = recommendations_for(&kb, "Golden Apple Snail");
        assert!(plan.is_empty());
        assert_eq!(plan.categories_covered(), 0);
    }

    #[test]
    fn builtin_brown_planthopper_plan() {
        let kb = KnowledgeBase::malaysian_rice();
        let plan = recommendations_for(&kb, BROWN_PLANTHOPPER);
        assert_eq!(plan.total(), 5);
        assert_eq!(plan.categories_covered(), 4);
        assert_eq!(plan.chemical.len(), 2);
        assert_eq!(plan.chemical[0].priority, 1);
        assert!(plan.chemical[0].recommendation.contains("Imidacloprid"));
    }

    #[test]
    fn groups_follow_ipm_order() {
        let kb = KnowledgeBase::malaysian_rice();
        let plan = recommendations_for(&kb, RICE_BUG);
        let order: Vec<ControlCategory> = plan.groups().map(|(c, _)| c).collect();
        assert_eq!(order, ControlCategory::IPM_ORDER.to_vec());
    }

    #[test]
    fn plan_serializes_with_category_keys() {
        let kb = KnowledgeBase::malaysian_rice();
        let json = serde_json::to_value(recommendations_for(&kb, RICE_BUG)).unwrap();
        for key in ["cultural", "mechanical", "biological", "chemical"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
