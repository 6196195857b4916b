//! # Built-in Catalog: Malaysian Rice Pests
//!
//! Reference tables for the five major insect pests of Malaysian rice
//! cultivation. These are plain data, assembled into a
//! [`KnowledgeBase`](super::KnowledgeBase) by
//! [`KnowledgeBase::malaysian_rice()`](super::KnowledgeBase::malaysian_rice).
//!
//! | Pest | Symptoms | Rules | Recommendations |
//! |------|----------|-------|-----------------|
//! | Brown Planthopper | 5 | R1-R3 | 5 |
//! | Yellow Stem Borer | 7 | R4-R7 | 6 |
//! | Rice Leaf Folder | 5 | R8-R10 | 5 |
//! | Rice Gall Midge | 5 | R11-R13 | 5 |
//! | Rice Bug | 3 | R14-R15 | 4 |

use super::pest::{ControlCategory, ControlRecommendation, Pest};
use super::rule::Rule;
use super::symptom::Symptom;

pub const BROWN_PLANTHOPPER: &str = "Brown Planthopper";
pub const YELLOW_STEM_BORER: &str = "Yellow Stem Borer";
pub const RICE_LEAF_FOLDER: &str = "Rice Leaf Folder";
pub const RICE_GALL_MIDGE: &str = "Rice Gall Midge";
pub const RICE_BUG: &str = "Rice Bug";

pub(super) fn symptoms() -> Vec<Symptom> {
    [
        ("hopper_burn", "Plants appear burnt/scorched in circular patches (hopper burn)", BROWN_PLANTHOPPER),
        ("yellowing_drying", "Yellowing and drying of plants from bottom upwards", BROWN_PLANTHOPPER),
        ("circular_patches", "Circular patches of dead/dying plants in the field", BROWN_PLANTHOPPER),
        ("honeydew_sooty_mold", "Honeydew secretion with black sooty mold on plants", BROWN_PLANTHOPPER),
        ("plant_base_insects", "Small brown insects visible at the base of plants", BROWN_PLANTHOPPER),
        ("dead_heart", "Central shoot/tiller dies and turns brown (dead heart) - vegetative stage", YELLOW_STEM_BORER),
        ("central_shoot_withered", "Central leaf whorl unfolds incompletely and withers", YELLOW_STEM_BORER),
        ("stem_bore_holes", "Visible bore holes at the stem base with frass", YELLOW_STEM_BORER),
        ("white_head", "White/empty panicles that can be easily pulled out (white head) - reproductive stage", YELLOW_STEM_BORER),
        ("empty_panicles", "Panicles are chaffy/empty with no grain filling", YELLOW_STEM_BORER),
        ("egg_mass_on_leaves", "Yellowish-brown hairy egg masses on leaf blades", YELLOW_STEM_BORER),
        ("larval_feeding_marks", "Larvae feeding marks on leaf sheath before boring", YELLOW_STEM_BORER),
        ("folded_leaves", "Leaves are folded longitudinally with silk threads", RICE_LEAF_FOLDER),
        ("leaf_scraping", "Scraping damage on leaf surface (green tissue removed)", RICE_LEAF_FOLDER),
        ("whitish_streaks", "Whitish/transparent streaks on damaged leaves", RICE_LEAF_FOLDER),
        ("tubular_folded_leaf", "Leaf rolled into a tubular structure", RICE_LEAF_FOLDER),
        ("larvae_inside_leaf", "Green caterpillar/larvae found inside folded leaves", RICE_LEAF_FOLDER),
        ("silver_shoot", "Silver-white hollow tillers (silver shoot/onion shoot)", RICE_GALL_MIDGE),
        ("onion_leaf_gall", "Gall formation with onion leaf-like appearance", RICE_GALL_MIDGE),
        ("stunted_tillers", "Stunted growth of affected tillers", RICE_GALL_MIDGE),
        ("no_panicle_emergence", "Affected tillers fail to produce panicles", RICE_GALL_MIDGE),
        ("elongated_leaf_sheath", "Elongated and pale green leaf sheath", RICE_GALL_MIDGE),
        ("foul_smell", "Strong foul/unpleasant smell in the field", RICE_BUG),
        ("empty_grains", "Empty or partially filled grains at maturity", RICE_BUG),
        ("discolored_grains", "Discolored spots on grains (feeding marks)", RICE_BUG),
    ]
    .into_iter()
    .map(|(name, description, hint)| Symptom::new(name, description, hint))
    .collect()
}

pub(super) fn pests() -> Vec<Pest> {
    [
        (
            BROWN_PLANTHOPPER,
            "Nilaparvata lugens",
            "Small brown sucking insect that feeds on plant sap at the base of rice plants",
            "Causes hopper burn - plants dry up and appear scorched",
            "High humidity, excessive nitrogen use, continuous flooding",
            "All growth stages, especially tillering to heading",
        ),
        (
            YELLOW_STEM_BORER,
            "Scirpophaga incertulas",
            "Larvae bore into rice stems causing dead hearts and white heads",
            "Dead heart in vegetative stage, White head in reproductive stage",
            "Staggered planting, presence of stubbles, high nitrogen",
            "Tillering (dead heart) and heading (white head) stages",
        ),
        (
            RICE_LEAF_FOLDER,
            "Cnaphalocrocis medinalis",
            "Caterpillar folds leaves and feeds on green tissue inside",
            "Reduces photosynthetic area, whitish streaks on leaves",
            "High humidity, shaded/dense canopy, excessive nitrogen",
            "Vegetative to reproductive stages",
        ),
        (
            RICE_GALL_MIDGE,
            "Orseolia oryzae",
            "Maggot causes gall formation producing silver shoots",
            "Silver shoot/onion leaf - tillers become tubular and fail to produce panicles",
            "Cloudy weather, high humidity, late planting",
            "Seedling to tillering stages",
        ),
        (
            RICE_BUG,
            "Leptocorisa oratorius",
            "Slender green/brown bug that sucks sap from developing grains",
            "Empty/partially filled grains, reduced grain quality",
            "Weedy fields, staggered harvesting, presence of wild grasses",
            "Flowering to grain filling stages",
        ),
    ]
    .into_iter()
    .map(|(name, sci, description, damage, conditions, stage)| Pest {
        name: name.to_string(),
        scientific_name: sci.to_string(),
        description: description.to_string(),
        damage_type: damage.to_string(),
        favorable_conditions: conditions.to_string(),
        affected_stage: stage.to_string(),
    })
    .collect()
}

pub(super) fn rules() -> Vec<Rule> {
    vec![
        Rule::new("R1", BROWN_PLANTHOPPER, &["hopper_burn", "yellowing_drying", "circular_patches"], 0.95),
        Rule::new("R2", BROWN_PLANTHOPPER, &["honeydew_sooty_mold", "plant_base_insects"], 0.75),
        Rule::new("R3", BROWN_PLANTHOPPER, &["hopper_burn", "plant_base_insects"], 0.85),
        Rule::new("R4", YELLOW_STEM_BORER, &["dead_heart", "central_shoot_withered", "stem_bore_holes"], 0.92),
        Rule::new("R5", YELLOW_STEM_BORER, &["white_head", "empty_panicles"], 0.88),
        Rule::new("R6", YELLOW_STEM_BORER, &["egg_mass_on_leaves", "larval_feeding_marks"], 0.70),
        Rule::new("R7", YELLOW_STEM_BORER, &["dead_heart", "stem_bore_holes"], 0.85),
        Rule::new("R8", RICE_LEAF_FOLDER, &["folded_leaves", "leaf_scraping", "whitish_streaks"], 0.93),
        Rule::new("R9", RICE_LEAF_FOLDER, &["tubular_folded_leaf", "larvae_inside_leaf"], 0.85),
        Rule::new("R10", RICE_LEAF_FOLDER, &["folded_leaves", "larvae_inside_leaf"], 0.90),
        Rule::new("R11", RICE_GALL_MIDGE, &["silver_shoot", "onion_leaf_gall"], 0.95),
        Rule::new("R12", RICE_GALL_MIDGE, &["stunted_tillers", "no_panicle_emergence", "elongated_leaf_sheath"], 0.78),
        Rule::new("R13", RICE_GALL_MIDGE, &["silver_shoot", "no_panicle_emergence"], 0.88),
        Rule::new("R14", RICE_BUG, &["foul_smell", "empty_grains", "discolored_grains"], 0.85),
        Rule::new("R15", RICE_BUG, &["foul_smell", "empty_grains"], 0.75),
    ]
}

pub(super) fn recommendations() -> Vec<ControlRecommendation> {
    use ControlCategory::*;

    [
        (BROWN_PLANTHOPPER, Chemical, "Apply Imidacloprid 17.8 SL at 100-125 ml/ha or Thiamethoxam 25 WG at 100g/ha", 1),
        (BROWN_PLANTHOPPER, Chemical, "Apply Buprofezin 25 SC at 1.5-2.0 ml/L for nymph control", 2),
        (BROWN_PLANTHOPPER, Biological, "Conserve natural enemies: Cyrtorhinus lividipennis (mirid bug), Lycosa pseudoannulata (wolf spider)", 1),
        (BROWN_PLANTHOPPER, Cultural, "Avoid excessive nitrogen application; Use resistant varieties like MR219, MR220", 1),
        (BROWN_PLANTHOPPER, Mechanical, "Use light traps (15W bulb) to monitor and reduce adult population", 2),
        (YELLOW_STEM_BORER, Chemical, "Apply Cartap hydrochloride 4G at 25 kg/ha or Chlorantraniliprole 18.5 SC at 150 ml/ha", 1),
        (YELLOW_STEM_BORER, Chemical, "Spray Fipronil 5 SC at 1.5-2.0 ml/L at tillering stage", 2),
        (YELLOW_STEM_BORER, Biological, "Release Trichogramma japonicum egg parasitoid at 100,000/ha at weekly intervals", 1),
        (YELLOW_STEM_BORER, Biological, "Conserve predators: Conocephalus longipennis, Anaxipha longipennis", 2),
        (YELLOW_STEM_BORER, Cultural, "Remove and destroy stubbles after harvest; Synchronize planting in the area", 1),
        (YELLOW_STEM_BORER, Mechanical, "Use pheromone traps (5/ha) for monitoring; Collect and destroy egg masses", 1),
        (RICE_LEAF_FOLDER, Chemical, "Apply Chlorantraniliprole 18.5 SC at 150 ml/ha or Flubendiamide 39.35 SC at 50 ml/ha", 1),
        (RICE_LEAF_FOLDER, Chemical, "Spray Quinalphos 25 EC at 2 ml/L when damage exceeds economic threshold", 2),
        (RICE_LEAF_FOLDER, Biological, "Release Trichogramma chilonis at 50,000/ha; Conserve Apanteles spp. parasitoids", 1),
        (RICE_LEAF_FOLDER, Cultural, "Avoid excessive nitrogen; Maintain field sanitation; Remove grassy weeds", 1),
        (RICE_LEAF_FOLDER, Mechanical, "Use light traps to attract and kill adult moths", 2),
        (RICE_GALL_MIDGE, Chemical, "Apply Carbofuran 3G at 25-30 kg/ha in nursery or Fipronil 0.3G at 25 kg/ha", 1),
        (RICE_GALL_MIDGE, Chemical, "Seed treatment with Thiamethoxam 70 WS at 3g/kg seed", 2),
        (RICE_GALL_MIDGE, Biological, "Conserve Platygaster oryzae parasitoid; Maintain spider population in fields", 1),
        (RICE_GALL_MIDGE, Cultural, "Use resistant varieties; Early and synchronous planting; Destroy ratoon and volunteer plants", 1),
        (RICE_GALL_MIDGE, Mechanical, "Pull out and destroy affected tillers (silver shoots)", 1),
        (RICE_BUG, Chemical, "Apply Carbaryl 85 WP at 1.5 kg/ha or Lambda-cyhalothrin 5 EC at 300 ml/ha", 1),
        (RICE_BUG, Biological, "Conserve egg parasitoids Gryon nixoni and Ooencyrtus spp.", 1),
        (RICE_BUG, Cultural, "Remove weeds around bunds; Synchronize planting to avoid staggered harvesting", 1),
        (RICE_BUG, Mechanical, "Collect bugs using sweep nets during early morning when less active", 2),
    ]
    .into_iter()
    .map(|(pest, category, text, priority)| ControlRecommendation {
        pest_name: pest.to_string(),
        category,
        recommendation: text.to_string(),
        priority,
    })
    .collect()
}
