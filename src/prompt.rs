//! Prompt builders for the three generation stages.
//!
//! Pure string templates: the same [`PromptContext`] always yields the same
//! prompt text. Constraints the model is asked to honor ("only use these
//! ingredients") are best-effort instructions; the only enforced invariant
//! is the schema check in the structured client.

use crate::types::{Constraints, Domain};

/// Everything the builders need, assembled by the orchestrator from the
/// request and the caller's stores.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub domain: Domain,
    /// The caller's shelf for this domain, in stored order.
    pub ingredients: Vec<String>,
    /// Tools the caller marked available. The body prompt always lists
    /// them; the title prompt uses them for food only.
    pub tools: Vec<String>,
    pub constraints: Constraints,
    /// Free-text instructions from the request. May be empty.
    pub instructions: String,
}

fn bulleted(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn subject(domain: Domain) -> &'static str {
    match domain {
        Domain::Food => "recipe",
        Domain::Drink => "cocktail",
    }
}

/// Prompt for the title stage.
///
/// Uses the shelf, the free-text instructions, and (for food only) the
/// available tools. The title seeds the body and image prompts, so this
/// stage runs before everything else.
pub fn title_prompt(ctx: &PromptContext) -> String {
    let mut out = format!(
        "Invent an appealing title for a {} that can be made using only \
         these ingredients:\n{}\n",
        subject(ctx.domain),
        bulleted(&ctx.ingredients)
    );
    if ctx.domain == Domain::Food && !ctx.tools.is_empty() {
        out.push_str(&format!(
            "\nAvailable kitchen equipment:\n{}\n",
            bulleted(&ctx.tools)
        ));
    }
    if !ctx.instructions.trim().is_empty() {
        out.push_str(&format!("\nAdditional wishes: {}\n", ctx.instructions.trim()));
    }
    out.push_str("\nDo not invent ingredients outside the list.");
    out
}

/// Prompt for the body stage, seeded by the generated title.
///
/// Carries the full context: shelf, tools, serving count, optional meal
/// type and time limit, and the free-text instructions.
pub fn body_prompt(ctx: &PromptContext, title: &str) -> String {
    let mut out = format!(
        "Write the complete {} for \"{}\".\n\nUse only these ingredients:\n{}\n",
        subject(ctx.domain),
        title,
        bulleted(&ctx.ingredients)
    );
    if !ctx.tools.is_empty() {
        out.push_str(&format!(
            "\nAvailable kitchen equipment:\n{}\n",
            bulleted(&ctx.tools)
        ));
    }
    out.push_str(&format!(
        "\nIt must serve {} people.\n",
        ctx.constraints.people_count
    ));
    if ctx.domain == Domain::Food {
        if let Some(ref meal) = ctx.constraints.meal_type {
            out.push_str(&format!("It is intended as {}.\n", meal));
        }
    }
    if let Some(minutes) = ctx.constraints.max_minutes {
        out.push_str(&format!(
            "Total preparation time must not exceed {} minutes.\n",
            minutes
        ));
    }
    if !ctx.instructions.trim().is_empty() {
        out.push_str(&format!("\nAdditional wishes: {}\n", ctx.instructions.trim()));
    }
    out.push_str(
        "\nList every ingredient with its quantity, and number the \
         preparation steps with a duration for each.",
    );
    out
}

/// Prompt for the image stage. Depends on the title only.
pub fn image_prompt(title: &str, domain: Domain) -> String {
    match domain {
        Domain::Food => format!(
            "A professional food photograph of \"{}\", plated and ready to \
             serve, natural lighting, shallow depth of field. No text or \
             watermarks.",
            title
        ),
        Domain::Drink => format!(
            "A professional photograph of the cocktail \"{}\" in a fitting \
             glass on a bar counter, moody lighting. No text or watermarks.",
            title
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food_ctx() -> PromptContext {
        PromptContext {
            domain: Domain::Food,
            ingredients: vec!["egg".into(), "flour".into(), "milk".into(), "butter".into()],
            tools: vec!["Oven".into()],
            constraints: Constraints {
                meal_type: Some("breakfast".into()),
                max_minutes: Some(30),
                people_count: 2,
            },
            instructions: "not too sweet".into(),
        }
    }

    fn drink_ctx() -> PromptContext {
        PromptContext {
            domain: Domain::Drink,
            ingredients: vec!["rum".into(), "mint".into(), "lime".into(), "soda".into()],
            tools: Vec::new(),
            constraints: Constraints::default(),
            instructions: String::new(),
        }
    }

    #[test]
    fn test_title_prompt_lists_ingredients_and_tools() {
        let prompt = title_prompt(&food_ctx());
        assert!(prompt.contains("- egg"));
        assert!(prompt.contains("- Oven"));
        assert!(prompt.contains("not too sweet"));
    }

    #[test]
    fn test_title_prompt_omits_tools_for_drinks() {
        let mut ctx = drink_ctx();
        ctx.tools = vec!["Oven".into()]; // cocktails never mention equipment
        let prompt = title_prompt(&ctx);
        assert!(!prompt.contains("Oven"));
        assert!(prompt.contains("cocktail"));
    }

    #[test]
    fn test_body_prompt_carries_title_and_constraints() {
        let prompt = body_prompt(&food_ctx(), "Simple Pancakes");
        assert!(prompt.contains("\"Simple Pancakes\""));
        assert!(prompt.contains("serve 2 people"));
        assert!(prompt.contains("breakfast"));
        assert!(prompt.contains("30 minutes"));
    }

    #[test]
    fn test_body_prompt_lists_tools_for_drinks() {
        let mut ctx = drink_ctx();
        ctx.tools = vec!["Shaker".into()];
        let prompt = body_prompt(&ctx, "Mojito");
        assert!(prompt.contains("- Shaker"));
    }

    #[test]
    fn test_body_prompt_skips_absent_constraints() {
        let prompt = body_prompt(&drink_ctx(), "Mojito");
        assert!(!prompt.contains("minutes"));
        assert!(!prompt.contains("intended as"));
    }

    #[test]
    fn test_image_prompt_uses_title_only() {
        let prompt = image_prompt("Mojito", Domain::Drink);
        assert!(prompt.contains("Mojito"));
        assert!(!prompt.contains("rum"));
    }

    #[test]
    fn test_builders_are_deterministic() {
        let ctx = food_ctx();
        assert_eq!(title_prompt(&ctx), title_prompt(&ctx));
        assert_eq!(body_prompt(&ctx, "T"), body_prompt(&ctx, "T"));
    }
}
