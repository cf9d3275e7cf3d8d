use crate::schema::{AppConfig, APP_CONFIG};
use crate::wire::{GenerationRequest, ModificationRequest, StoreContext};

/// How much real store data is shown to the model.
#[derive(Debug, Clone, Copy)]
pub struct PromptLimits {
    pub max_products: usize,
    pub max_collections: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self { max_products: 10, max_collections: 10 }
    }
}

fn design_principles() -> &'static str {
r##"DESIGN PRINCIPLES:
- Prioritize user experience and conversion optimization
- Use modern mobile design patterns
- Ensure accessibility and intuitive navigation
- Match the app design to the store's business type and customer needs
- Create engaging product discovery experiences"##
}

fn guidelines() -> &'static str {
r##"IMPORTANT GUIDELINES:
- Use realistic product names and categories that match the business type
- Set appropriate grid columns based on store size (1-2 for small stores, 2-3 for larger ones)
- Enable features that make sense for the business (e.g., reviews for retail, filters for large catalogs)
- Create hero section content that reflects the brand and value proposition
- Choose appropriate navigation tabs based on store complexity
- Use color schemes that work well on mobile devices; colors are hex strings like "#4F46E5"
- Generate 4-6 realistic featured products with proper pricing formats
- When real store products or collections are listed, prefer them over invented ones"##
}

fn schema_block() -> String {
    format!(
        "Respond with a JSON object that matches this structure exactly:\n{}",
        APP_CONFIG.template()
    )
}

/// Store facts for the prompt, with samples capped by `limits`.
pub fn store_context_block(ctx: Option<&StoreContext>, limits: &PromptLimits) -> String {
    let Some(ctx) = ctx else {
        return "No store connected yet.".to_string();
    };

    let mut out = format!(
        "Store: {} with {} products, {} collections, and {} orders.",
        ctx.shop_name, ctx.product_count, ctx.collection_count, ctx.order_count
    );

    let products: Vec<_> = ctx.sample_products.iter().take(limits.max_products).collect();
    if !products.is_empty() {
        out.push_str("\nReal products from this store:");
        for p in products {
            out.push_str(&format!("\n - {}", p.title));
            if !p.price.is_empty() {
                out.push_str(&format!(" | price: {}", p.price));
            }
            if !p.vendor.is_empty() {
                out.push_str(&format!(" | vendor: {}", p.vendor));
            }
            if !p.product_type.is_empty() {
                out.push_str(&format!(" | type: {}", p.product_type));
            }
        }
    }

    let collections: Vec<_> = ctx.sample_collections.iter().take(limits.max_collections).collect();
    if !collections.is_empty() {
        out.push_str("\nReal collections from this store:");
        for c in collections {
            out.push_str(&format!("\n - {} ({} products)", c.title, c.products_count));
        }
    }
    out
}

/// Single prompt for a fresh app configuration.
pub fn generation_prompt(req: &GenerationRequest, limits: &PromptLimits) -> String {
    let store = store_context_block(req.store_context.as_ref(), limits);
    format!(
"You are an expert mobile app designer for e-commerce. Create modern, user-friendly mobile app configurations for Shopify stores.

CONTEXT: {store}

{principles}

ANALYSIS REQUIREMENTS:
1. Analyze the user's prompt to understand their business type, target audience, and goals
2. Consider store size and product volume when designing layouts
3. Select appropriate features based on business needs
4. Create realistic sample data that matches the business type
5. Choose colors and styling that align with modern mobile design trends

{schema}

{guidelines}

BUSINESS ANALYSIS:
App Name: \"{app_name}\"
User Description: \"{description}\"
Primary Color: {color}
{store}

Based on this information, create a mobile app that:
1. Reflects the business type and target audience
2. Optimizes for the store's product volume and complexity
3. Uses modern mobile UX patterns
4. Includes relevant e-commerce features
5. Has appropriate navigation structure
6. Contains realistic sample content

Respond only with valid JSON matching the structure above. No additional text or explanations.",
        store = store,
        principles = design_principles(),
        schema = schema_block(),
        guidelines = guidelines(),
        app_name = req.app_name,
        description = req.prompt,
        color = req.primary_color,
    )
}

/// Prompt asking the model to apply a targeted change to `current`.
pub fn modification_prompt(req: &ModificationRequest, current: &AppConfig, limits: &PromptLimits) -> String {
    let current_json = serde_json::to_string_pretty(current)
        .unwrap_or_else(|_| "<current-config-unavailable>".to_string());
    let store = store_context_block(req.store_context.as_ref(), limits);
    format!(
"You are an expert mobile app designer for e-commerce. You are editing an existing mobile app configuration for a Shopify store.

CONTEXT: {store}

{principles}

CURRENT CONFIGURATION:
{current_json}

MODIFICATION REQUEST:
\"{instruction}\"

RULES:
1. Change only what the modification request asks for
2. Preserve every other field exactly as it is in the current configuration
3. Keep the result consistent (e.g. if a feature is disabled, related display toggles should agree)
4. Return the COMPLETE configuration, not only the changed fields

{schema}

{guidelines}

Respond only with valid JSON matching the structure above. No additional text or explanations.",
        store = store,
        principles = design_principles(),
        current_json = current_json,
        instruction = req.modification_prompt.trim(),
        schema = schema_block(),
        guidelines = guidelines(),
    )
}
