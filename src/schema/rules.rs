//! Declarative description of every leaf in [`super::AppConfig`].
//!
//! The same table drives reconciliation of model output, the JSON template
//! embedded in prompts, and the response schema sent to models that support
//! constrained decoding.

use serde_json::{json, Map, Value};

use super::{BackgroundType, DisplayStyle};

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Non-blank string.
    Text,
    /// String that may be absent or null.
    OptionalText,
    /// Hex color: #RGB, #RRGGBB or #RRGGBBAA.
    Color,
    Flag,
    Count { min: u64, max: u64 },
    OneOf(&'static [&'static str]),
    Group(&'static [Field]),
    /// Replaced wholesale, never merged element by element.
    List { item: &'static [Field], non_empty: bool },
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub key: &'static str,
    pub rule: Rule,
}

const fn field(key: &'static str, rule: Rule) -> Field {
    Field { key, rule }
}

pub static APP_CONFIG: Rule = Rule::Group(&[
    field("appName", Rule::Text),
    field("primaryColor", Rule::Color),
    field(
        "theme",
        Rule::Group(&[
            field("primaryColor", Rule::Color),
            field("fontFamily", Rule::Text),
            field("borderRadius", Rule::Text),
        ]),
    ),
    field(
        "navigation",
        Rule::Group(&[
            field("showBottomNav", Rule::Flag),
            field("showSearch", Rule::Flag),
            field("showCart", Rule::Flag),
            field(
                "tabs",
                Rule::List {
                    item: &[
                        field("name", Rule::Text),
                        field("icon", Rule::Text),
                        field("route", Rule::Text),
                    ],
                    non_empty: false,
                },
            ),
        ]),
    ),
    field(
        "layout",
        Rule::Group(&[
            field(
                "heroSection",
                Rule::Group(&[
                    field("title", Rule::Text),
                    field("subtitle", Rule::Text),
                    field("showHero", Rule::Flag),
                    field("backgroundType", Rule::OneOf(BackgroundType::NAMES)),
                ]),
            ),
            field(
                "productDisplay",
                Rule::Group(&[
                    field("gridColumns", Rule::Count { min: 1, max: u32::MAX as u64 }),
                    field("showPrices", Rule::Flag),
                    field("showRatings", Rule::Flag),
                    field("showWishlist", Rule::Flag),
                ]),
            ),
            field(
                "categories",
                Rule::Group(&[
                    field("showCategories", Rule::Flag),
                    field("displayStyle", Rule::OneOf(DisplayStyle::NAMES)),
                ]),
            ),
        ]),
    ),
    field(
        "features",
        Rule::Group(&[
            field("wishlist", Rule::Flag),
            field("reviews", Rule::Flag),
            field("filters", Rule::Flag),
            field("notifications", Rule::Flag),
            field("userAccount", Rule::Flag),
            field("socialSharing", Rule::Flag),
        ]),
    ),
    field(
        "previewData",
        Rule::Group(&[
            field(
                "featuredProducts",
                Rule::List {
                    item: &[
                        field("name", Rule::Text),
                        field("price", Rule::Text),
                        field("image", Rule::OptionalText),
                    ],
                    non_empty: true,
                },
            ),
            field(
                "categories",
                Rule::List {
                    item: &[
                        field("name", Rule::Text),
                        field("count", Rule::Count { min: 0, max: u64::MAX }),
                    ],
                    non_empty: true,
                },
            ),
        ]),
    ),
]);

impl Rule {
    /// Human-readable JSON skeleton, as shown to the model in prompts.
    pub fn template(&self) -> String {
        let mut out = String::new();
        write_template(self, 0, &mut out);
        out
    }

    /// Response schema in the OpenAPI subset accepted by Gemini's
    /// `generationConfig.responseSchema`.
    pub fn response_schema(&self) -> Value {
        match self {
            Rule::Text | Rule::Color => json!({ "type": "STRING" }),
            Rule::OptionalText => json!({ "type": "STRING", "nullable": true }),
            Rule::Flag => json!({ "type": "BOOLEAN" }),
            Rule::Count { min, .. } => json!({ "type": "INTEGER", "minimum": min }),
            Rule::OneOf(names) => json!({ "type": "STRING", "enum": names }),
            Rule::Group(fields) => object_schema(fields),
            Rule::List { item, non_empty } => {
                let mut schema = json!({ "type": "ARRAY", "items": object_schema(item) });
                if *non_empty {
                    schema["minItems"] = json!(1);
                }
                schema
            }
        }
    }
}

fn object_schema(fields: &[Field]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    let mut ordering = Vec::new();
    for f in fields {
        properties.insert(f.key.to_string(), f.rule.response_schema());
        ordering.push(f.key);
        if !matches!(f.rule, Rule::OptionalText) {
            required.push(f.key);
        }
    }
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
        "propertyOrdering": ordering,
    })
}

fn write_template(rule: &Rule, depth: usize, out: &mut String) {
    match rule {
        Rule::Text => out.push_str("\"string\""),
        Rule::OptionalText => out.push_str("\"string (optional)\""),
        Rule::Color => out.push_str("\"string (hex color)\""),
        Rule::Flag => out.push_str("boolean"),
        Rule::Count { .. } => out.push_str("number"),
        Rule::OneOf(names) => {
            out.push('"');
            out.push_str(&names.join(" or "));
            out.push('"');
        }
        Rule::Group(fields) => write_object(fields, depth, out),
        Rule::List { item, .. } => {
            let pad = "  ".repeat(depth + 1);
            out.push_str("[\n");
            out.push_str(&pad);
            write_object(item, depth + 1, out);
            out.push('\n');
            out.push_str(&"  ".repeat(depth));
            out.push(']');
        }
    }
}

fn write_object(fields: &[Field], depth: usize, out: &mut String) {
    let pad = "  ".repeat(depth + 1);
    out.push_str("{\n");
    for (i, f) in fields.iter().enumerate() {
        out.push_str(&pad);
        out.push('"');
        out.push_str(f.key);
        out.push_str("\": ");
        write_template(&f.rule, depth + 1, out);
        if i + 1 < fields.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str(&"  ".repeat(depth));
    out.push('}');
}
