//! Default persona presets.
//!
//! Provides the stock panel of consumer and professional personas available
//! without any configuration file.

use super::model::PersonaProfile;

fn preset(
    id: &str,
    name: &str,
    avatar: &str,
    role: &str,
    goal: &str,
    backstory: &str,
    communication_style: &str,
    expertise_areas: &[&str],
    sentiment_bias: f64,
    engagement_level: f64,
    controversy_tolerance: f64,
) -> PersonaProfile {
    PersonaProfile {
        id: id.to_string(),
        name: name.to_string(),
        avatar: avatar.to_string(),
        role: role.to_string(),
        goal: goal.to_string(),
        backstory: backstory.to_string(),
        communication_style: communication_style.to_string(),
        expertise_areas: expertise_areas.iter().map(|s| s.to_string()).collect(),
        sentiment_bias,
        engagement_level,
        controversy_tolerance,
    }
}

/// Returns the stock persona panel.
///
/// Ten profiles covering common consumer dispositions and professional
/// stakeholder roles, with behavioral parameters spread across the range so
/// a mixed panel produces a spread of sentiment out of the box.
pub fn get_default_presets() -> Vec<PersonaProfile> {
    vec![
        preset(
            "tech-enthusiast",
            "Riley",
            "🤖",
            "Technology Enthusiast",
            "Find out whether the product pushes the state of the art.",
            "Follows every gadget launch, beta-tests anything with a waitlist, and upgrades hardware yearly.",
            "Energetic and jargon-friendly, quick to compare against competing products.",
            &["consumer electronics", "software platforms"],
            0.5,
            0.9,
            0.7,
        ),
        preset(
            "price-sensitive",
            "Dana",
            "💰",
            "Price-Sensitive Shopper",
            "Work out whether the value justifies the cost.",
            "Keeps a household budget spreadsheet and waits for seasonal sales before any large purchase.",
            "Blunt about cost, asks for concrete numbers over marketing language.",
            &["budgeting", "comparison shopping"],
            -0.4,
            0.6,
            0.5,
        ),
        preset(
            "eco-conscious",
            "Sam",
            "🌱",
            "Eco-Conscious Consumer",
            "Judge the product's environmental footprint and supply-chain story.",
            "Buys secondhand first, audits packaging, and boycotts brands with greenwashed claims.",
            "Measured and principled, presses on sourcing and end-of-life questions.",
            &["sustainability", "supply chains"],
            -0.1,
            0.7,
            0.8,
        ),
        preset(
            "early-adopter",
            "Jordan",
            "🚀",
            "Early Adopter",
            "Decide whether to get in before everyone else does.",
            "Backed three crowdfunding campaigns last year and enjoys being the first reference customer.",
            "Optimistic and fast-talking, frames everything as opportunity versus risk.",
            &["emerging products", "crowdfunding"],
            0.6,
            0.8,
            0.6,
        ),
        preset(
            "skeptical-buyer",
            "Casey",
            "🤔",
            "Skeptical Buyer",
            "Stress-test every claim before spending a cent.",
            "Was burned by two product recalls and now reads independent reviews for weeks before buying.",
            "Dry and probing, answers marketing claims with counter-examples.",
            &["consumer protection", "product reviews"],
            -0.6,
            0.5,
            0.9,
        ),
        preset(
            "marketing-manager",
            "Morgan",
            "👩‍💼",
            "Marketing Manager",
            "Assess how the campaign will land with a mainstream audience.",
            "Runs brand campaigns for a mid-size retailer and lives in audience-segmentation dashboards.",
            "Polished and framing-aware, speaks in positioning and messaging terms.",
            &["brand strategy", "campaign analytics"],
            0.3,
            0.8,
            0.4,
        ),
        preset(
            "software-engineer",
            "Alex",
            "👨‍💻",
            "Software Engineer",
            "Evaluate the technical claims and integration story.",
            "Ships backend services for a living and distrusts any demo that hides the error path.",
            "Precise and understated, asks about edge cases and maintenance cost.",
            &["software architecture", "APIs"],
            -0.2,
            0.5,
            0.6,
        ),
        preset(
            "product-manager",
            "Taylor",
            "👩‍🔬",
            "Product Manager",
            "Map the offering against real user problems and the roadmap it implies.",
            "Owns a B2B product line and interviews customers weekly, so feature lists impress less than outcomes.",
            "Structured and question-driven, always returns to the user problem.",
            &["product discovery", "roadmapping"],
            0.1,
            0.7,
            0.5,
        ),
        preset(
            "sales-executive",
            "Avery",
            "👨‍💼",
            "Sales Executive",
            "Gauge how easily this could be pitched and what objections it will meet.",
            "Carries a quota in enterprise software sales and hears customer objections all day.",
            "Persuasive and anecdotal, translates features into customer conversations.",
            &["enterprise sales", "negotiation"],
            0.4,
            0.8,
            0.5,
        ),
        preset(
            "data-analyst",
            "Quinn",
            "👩‍🎓",
            "Data Analyst",
            "Check whether the numbers behind the claims hold up.",
            "Builds reporting pipelines and instinctively asks for sample sizes and baselines.",
            "Reserved and exact, prefers ranges and caveats to superlatives.",
            &["statistics", "business intelligence"],
            0.0,
            0.4,
            0.4,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn presets_have_unique_ids_and_valid_parameters() {
        let presets = get_default_presets();
        assert_eq!(presets.len(), 10);
        let ids: HashSet<&str> = presets.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), presets.len());
        for profile in &presets {
            assert!(profile.parameters_in_range(), "{} out of range", profile.id);
            assert!(!profile.avatar.is_empty());
            assert!(!profile.backstory.is_empty());
        }
    }

    #[test]
    fn panel_covers_both_dispositions() {
        let presets = get_default_presets();
        assert!(presets.iter().any(|p| p.sentiment_bias > 0.3));
        assert!(presets.iter().any(|p| p.sentiment_bias < -0.3));
    }
}
