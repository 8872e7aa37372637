//! Calorie target and macro split for a diet type and health focus.

use std::str::FromStr;

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use super::energy::calculate_tdee;
use crate::profile::model::{DietType, UnknownVariant, UserProfile};

pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARBS: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

const PROTEIN_RANGE: (f64, f64) = (0.10, 0.40);
const CARBS_RANGE: (f64, f64) = (0.05, 0.60);
const FATS_RANGE: (f64, f64) = (0.15, 0.70);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthFocus {
    WeightLoss,
    MuscleGain,
    Maintenance,
    HeartHealth,
    Diabetes,
    Energy,
    #[default]
    General,
}

impl HealthFocus {
    pub const ALL: [HealthFocus; 7] = [
        Self::WeightLoss,
        Self::MuscleGain,
        Self::Maintenance,
        Self::HeartHealth,
        Self::Diabetes,
        Self::Energy,
        Self::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WeightLoss => "weight_loss",
            Self::MuscleGain => "muscle_gain",
            Self::Maintenance => "maintenance",
            Self::HeartHealth => "heart_health",
            Self::Diabetes => "diabetes",
            Self::Energy => "energy",
            Self::General => "general",
        }
    }

    pub fn calorie_delta(self) -> f64 {
        match self {
            Self::WeightLoss => -300.0,
            Self::MuscleGain => 300.0,
            Self::HeartHealth => -100.0,
            Self::Diabetes => -200.0,
            Self::Maintenance | Self::Energy | Self::General => 0.0,
        }
    }

    /// Per-macro fraction adjustments.
    pub fn macro_delta(self) -> MacroRatios {
        let (protein, carbs, fats) = match self {
            Self::WeightLoss => (0.05, -0.05, 0.0),
            Self::MuscleGain => (0.10, 0.0, -0.10),
            Self::HeartHealth => (0.0, 0.05, -0.05),
            Self::Diabetes => (0.05, -0.10, 0.05),
            Self::Energy => (0.0, 0.10, -0.10),
            Self::Maintenance | Self::General => (0.0, 0.0, 0.0),
        };
        MacroRatios {
            protein,
            carbs,
            fats,
        }
    }

    pub fn notes(self) -> &'static str {
        match self {
            Self::WeightLoss => {
                "Focus on high-protein, high-fiber foods to help with satiety. Stay hydrated and consider eating smaller, more frequent meals."
            }
            Self::MuscleGain => {
                "Prioritize protein intake and ensure you're eating enough calories. Consider timing protein intake around workouts."
            }
            Self::HeartHealth => {
                "Include plenty of omega-3 fatty acids, fiber, and antioxidant-rich foods. Limit sodium and saturated fats."
            }
            Self::Diabetes => {
                "Focus on low glycemic index foods and distribute carbohydrates evenly throughout the day. Monitor blood sugar regularly."
            }
            Self::Energy => {
                "Include complex carbohydrates for sustained energy and ensure adequate hydration. Consider smaller, frequent meals."
            }
            Self::Maintenance | Self::General => "",
        }
    }
}

impl FromStr for HealthFocus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Fractions of total calories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroRatios {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MacroRatios {
    pub fn sum(&self) -> f64 {
        self.protein + self.carbs + self.fats
    }
}

pub fn diet_macros(diet: DietType) -> MacroRatios {
    let (protein, carbs, fats) = match diet {
        DietType::Omnivore => (0.30, 0.45, 0.25),
        DietType::Vegetarian => (0.25, 0.50, 0.25),
        DietType::Vegan => (0.20, 0.55, 0.25),
        DietType::Pescatarian => (0.30, 0.40, 0.30),
        DietType::Keto => (0.25, 0.05, 0.70),
        DietType::Paleo => (0.30, 0.35, 0.35),
        DietType::GlutenFree => (0.25, 0.50, 0.25),
        DietType::Mediterranean => (0.20, 0.50, 0.30),
    };
    MacroRatios {
        protein,
        carbs,
        fats,
    }
}

/// Diet template plus focus deltas, clamped per macro and renormalized to 1.0.
pub fn blend_macros(diet: DietType, focus: HealthFocus) -> MacroRatios {
    let base = diet_macros(diet);
    let delta = focus.macro_delta();
    let clamped = MacroRatios {
        protein: (base.protein + delta.protein).clamp(PROTEIN_RANGE.0, PROTEIN_RANGE.1),
        carbs: (base.carbs + delta.carbs).clamp(CARBS_RANGE.0, CARBS_RANGE.1),
        fats: (base.fats + delta.fats).clamp(FATS_RANGE.0, FATS_RANGE.1),
    };
    // Lower bounds keep the sum at >= 0.30, so the division is safe.
    let total = clamped.sum();
    MacroRatios {
        protein: clamped.protein / total,
        carbs: clamped.carbs / total,
        fats: clamped.fats / total,
    }
}

struct Suggestions {
    breakfast: &'static [&'static str],
    lunch: &'static [&'static str],
    dinner: &'static [&'static str],
    snacks: &'static [&'static str],
}

fn suggestions(diet: DietType) -> &'static Suggestions {
    match diet {
        DietType::Omnivore => &Suggestions {
            breakfast: &[
                "Greek yogurt with berries and nuts",
                "Scrambled eggs with vegetables and whole grain toast",
                "Oatmeal with fruit and peanut butter",
            ],
            lunch: &[
                "Grilled chicken salad with mixed greens",
                "Turkey sandwich on whole grain bread with avocado",
                "Quinoa bowl with roasted vegetables and lean protein",
            ],
            dinner: &[
                "Baked salmon with roasted vegetables",
                "Lean steak with sweet potato and green beans",
                "Stir-fry with chicken, vegetables, and brown rice",
            ],
            snacks: &[
                "Apple with almond butter",
                "Hard-boiled eggs",
                "Greek yogurt",
                "Mixed nuts",
                "Protein shake",
            ],
        },
        DietType::Vegetarian => &Suggestions {
            breakfast: &[
                "Greek yogurt with berries and nuts",
                "Veggie egg scramble with whole grain toast",
                "Overnight oats with fruit and seeds",
            ],
            lunch: &[
                "Mediterranean salad with feta and chickpeas",
                "Vegetable soup with whole grain bread",
                "Hummus and veggie wrap",
            ],
            dinner: &[
                "Bean and vegetable stir-fry with brown rice",
                "Stuffed bell peppers with quinoa and cheese",
                "Lentil curry with brown rice",
            ],
            snacks: &[
                "Cottage cheese with fruit",
                "Yogurt parfait",
                "Trail mix",
                "Hummus with vegetables",
                "Cheese and whole grain crackers",
            ],
        },
        DietType::Vegan => &Suggestions {
            breakfast: &[
                "Almond milk smoothie with plant protein",
                "Tofu scramble with vegetables",
                "Overnight oats with plant milk and chia seeds",
            ],
            lunch: &[
                "Quinoa salad with mixed vegetables and tofu",
                "Lentil soup with whole grain bread",
                "Chickpea and avocado wrap",
            ],
            dinner: &[
                "Sweet potato and black bean bowl",
                "Tempeh stir-fry with vegetables and brown rice",
                "Mushroom and vegetable risotto",
            ],
            snacks: &[
                "Edamame",
                "Fruit with almond butter",
                "Roasted chickpeas",
                "Trail mix",
                "Energy balls made with dates and nuts",
            ],
        },
        DietType::Pescatarian => &Suggestions {
            breakfast: &[
                "Greek yogurt with berries and granola",
                "Smoked salmon with avocado toast",
                "Chia seed pudding with fruit",
            ],
            lunch: &[
                "Tuna salad with mixed greens",
                "Salmon sushi bowl",
                "Mediterranean quinoa salad with sardines",
            ],
            dinner: &[
                "Grilled shrimp with roasted vegetables",
                "Baked cod with sweet potato",
                "Fish curry with brown rice",
            ],
            snacks: &[
                "Hard-boiled eggs",
                "Greek yogurt",
                "Seaweed snacks",
                "Fruit with nut butter",
                "Mixed nuts",
            ],
        },
        DietType::Keto => &Suggestions {
            breakfast: &[
                "Avocado and bacon omelet",
                "Keto pancakes with sugar-free syrup",
                "Chia seed pudding with heavy cream",
            ],
            lunch: &[
                "Cobb salad with ranch dressing",
                "Lettuce wraps with deli meat and cheese",
                "Tuna salad stuffed avocados",
            ],
            dinner: &[
                "Baked salmon with asparagus",
                "Zucchini noodles with meatballs",
                "Cauliflower rice stir-fry with beef",
            ],
            snacks: &[
                "Cheese cubes",
                "Pepperoni slices",
                "Boiled eggs",
                "Avocado slices",
                "Macadamia nuts",
            ],
        },
        DietType::Paleo => &Suggestions {
            breakfast: &[
                "Sweet potato hash with eggs",
                "Banana pancakes with almond flour",
                "Fruit and nut bowl",
            ],
            lunch: &[
                "Grilled chicken with mixed vegetables",
                "Tuna avocado lettuce wraps",
                "Turkey and vegetable soup",
            ],
            dinner: &[
                "Grilled steak with roasted vegetables",
                "Baked salmon with asparagus",
                "Stuffed bell peppers with ground turkey",
            ],
            snacks: &[
                "Apple slices with almond butter",
                "Beef jerky",
                "Mixed nuts",
                "Hard-boiled eggs",
                "Sliced vegetables",
            ],
        },
        DietType::GlutenFree => &Suggestions {
            breakfast: &[
                "Gluten-free oatmeal with berries",
                "Veggie and cheese omelet",
                "Smoothie bowl with fruit and nuts",
            ],
            lunch: &[
                "Quinoa salad with vegetables and chicken",
                "Rice noodle soup with vegetables",
                "Corn tortilla tacos",
            ],
            dinner: &[
                "Grilled salmon with roasted vegetables",
                "Gluten-free pasta with marinara sauce",
                "Rice bowl with vegetables and protein",
            ],
            snacks: &[
                "Rice cakes with nut butter",
                "Yogurt with fruit",
                "Gluten-free crackers with cheese",
                "Mixed nuts",
                "Fruit",
            ],
        },
        DietType::Mediterranean => &Suggestions {
            breakfast: &[
                "Greek yogurt with honey and walnuts",
                "Whole grain toast with olive oil and tomatoes",
                "Vegetable frittata",
            ],
            lunch: &[
                "Greek salad with chickpeas",
                "Tuna and white bean salad",
                "Vegetable soup with whole grain bread",
            ],
            dinner: &[
                "Grilled fish with roasted vegetables",
                "Lentil and vegetable stew",
                "Chicken souvlaki with tzatziki",
            ],
            snacks: &[
                "Hummus with vegetables",
                "Olives",
                "A small handful of nuts",
                "Fresh fruit",
                "Greek yogurt",
            ],
        },
    }
}

/// Output of the generator, not yet tied to a user or persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationDraft {
    pub diet_type: DietType,
    pub health_focus: HealthFocus,
    pub daily_calories: i32,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fats_g: f64,
    pub breakfast_suggestion: String,
    pub lunch_suggestion: String,
    pub dinner_suggestion: String,
    pub snacks_suggestion: String,
    pub additional_notes: String,
}

pub fn generate<R: Rng + ?Sized>(
    profile: &UserProfile,
    diet: DietType,
    focus: HealthFocus,
    rng: &mut R,
) -> RecommendationDraft {
    let calories = calculate_tdee(profile) + focus.calorie_delta();
    let ratios = blend_macros(diet, focus);

    let meals = suggestions(diet);
    let breakfast = pick(meals.breakfast, rng);
    let lunch = pick(meals.lunch, rng);
    let dinner = pick(meals.dinner, rng);
    let snacks = meals
        .snacks
        .choose_multiple(rng, 2)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");

    let mut notes = focus.notes().to_string();
    if let Some(allergies) = profile.allergies() {
        notes.push_str(&format!(
            "\n\nNote: Please avoid {allergies} as per your allergy information."
        ));
    }

    RecommendationDraft {
        diet_type: diet,
        health_focus: focus,
        daily_calories: calories.trunc() as i32,
        protein_g: round1(ratios.protein * calories / KCAL_PER_G_PROTEIN),
        carbs_g: round1(ratios.carbs * calories / KCAL_PER_G_CARBS),
        fats_g: round1(ratios.fats * calories / KCAL_PER_G_FAT),
        breakfast_suggestion: breakfast,
        lunch_suggestion: lunch,
        dinner_suggestion: dinner,
        snacks_suggestion: snacks,
        additional_notes: notes,
    }
}

fn pick<R: Rng + ?Sized>(list: &[&str], rng: &mut R) -> String {
    list.choose(rng).map(|s| (*s).to_string()).unwrap_or_default()
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::model::{ActivityLevel, Gender};
    use rand::{rngs::StdRng, SeedableRng};

    fn athlete() -> UserProfile {
        UserProfile {
            age: Some(30),
            gender: Some(Gender::Male),
            weight_kg: Some(70.0),
            height_cm: Some(175.0),
            activity_level: Some(ActivityLevel::Moderate),
            ..Default::default()
        }
    }

    #[test]
    fn blended_ratios_always_sum_to_one_and_respect_order_of_clamps() {
        for diet in DietType::ALL {
            for focus in HealthFocus::ALL {
                let r = blend_macros(diet, focus);
                assert!((r.sum() - 1.0).abs() < 1e-12, "{diet} {focus:?}");
                assert!(r.protein > 0.0 && r.carbs > 0.0 && r.fats > 0.0);
            }
        }
    }

    #[test]
    fn keto_muscle_gain_clamps_then_renormalizes() {
        // 0.35 / 0.05 / 0.60 -> already sums to 1.0
        let r = blend_macros(DietType::Keto, HealthFocus::MuscleGain);
        assert!((r.protein - 0.35).abs() < 1e-12);
        assert!((r.carbs - 0.05).abs() < 1e-12);
        assert!((r.fats - 0.60).abs() < 1e-12);

        // carbs 0.05 - 0.10 clamps up to 0.05; fats 0.75 clamps to 0.70
        let r = blend_macros(DietType::Keto, HealthFocus::Diabetes);
        let total = 0.30 + 0.05 + 0.70;
        assert!((r.protein - 0.30 / total).abs() < 1e-12);
        assert!((r.fats - 0.70 / total).abs() < 1e-12);
    }

    #[test]
    fn omnivore_maintenance_matches_hand_computation() {
        let mut rng = StdRng::seed_from_u64(7);
        let draft = generate(&athlete(), DietType::Omnivore, HealthFocus::Maintenance, &mut rng);
        let cal = 1648.75 * 1.55;
        assert_eq!(draft.daily_calories, 2555);
        assert_eq!(draft.protein_g, round1(0.30 * cal / 4.0));
        assert_eq!(draft.carbs_g, round1(0.45 * cal / 4.0));
        assert_eq!(draft.fats_g, round1(0.25 * cal / 9.0));
        assert_eq!(draft.additional_notes, "");
    }

    #[test]
    fn calorie_delta_applies_to_target() {
        let mut rng = StdRng::seed_from_u64(1);
        let p = UserProfile::default();
        let loss = generate(&p, DietType::Vegan, HealthFocus::WeightLoss, &mut rng);
        let gain = generate(&p, DietType::Vegan, HealthFocus::MuscleGain, &mut rng);
        // default BMR 1800 * 1.375 = 2475
        assert_eq!(loss.daily_calories, 2175);
        assert_eq!(gain.daily_calories, 2775);
    }

    #[test]
    fn suggestions_come_from_diet_lists_and_snacks_are_distinct() {
        let mut rng = StdRng::seed_from_u64(42);
        for diet in DietType::ALL {
            let lists = suggestions(diet);
            for _ in 0..20 {
                let d = generate(&UserProfile::default(), diet, HealthFocus::General, &mut rng);
                assert!(lists.breakfast.contains(&d.breakfast_suggestion.as_str()));
                assert!(lists.lunch.contains(&d.lunch_suggestion.as_str()));
                assert!(lists.dinner.contains(&d.dinner_suggestion.as_str()));
                let snacks: Vec<&str> = d.snacks_suggestion.split(", ").collect();
                assert_eq!(snacks.len(), 2);
                assert_ne!(snacks[0], snacks[1]);
                assert!(snacks.iter().all(|s| lists.snacks.contains(s)));
            }
        }
    }

    #[test]
    fn notes_include_focus_template_and_allergies() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut p = athlete();
        p.allergies = Some("peanuts, shellfish".into());
        let d = generate(&p, DietType::Paleo, HealthFocus::HeartHealth, &mut rng);
        assert!(d.additional_notes.starts_with("Include plenty of omega-3"));
        assert!(d.additional_notes.ends_with(
            "\n\nNote: Please avoid peanuts, shellfish as per your allergy information."
        ));
    }

    #[test]
    fn unknown_focus_parses_to_error_and_defaults_to_general() {
        assert!("couch_potato".parse::<HealthFocus>().is_err());
        assert_eq!(HealthFocus::default(), HealthFocus::General);
        assert_eq!(HealthFocus::General.calorie_delta(), 0.0);
    }
}
