use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub mod rules;

pub use rules::{Field, Rule, APP_CONFIG};

pub const DEFAULT_APP_NAME: &str = "My App";
pub const DEFAULT_PRIMARY_COLOR: &str = "#4F46E5";

fn hex_color() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").expect("valid regex")
    })
}

pub fn is_hex_color(s: &str) -> bool {
    hex_color().is_match(s.trim())
}

/// ========================================
/// Generated mobile app configuration
/// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub app_name: String,
    pub primary_color: String,
    pub theme: Theme,
    pub navigation: Navigation,
    pub layout: Layout,
    pub features: Features,
    pub preview_data: PreviewData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub primary_color: String,
    pub font_family: String,
    pub border_radius: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub show_bottom_nav: bool,
    pub show_search: bool,
    pub show_cart: bool,
    pub tabs: Vec<Tab>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub name: String,
    pub icon: String,
    pub route: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub hero_section: HeroSection,
    pub product_display: ProductDisplay,
    pub categories: CategoryLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSection {
    pub title: String,
    pub subtitle: String,
    pub show_hero: bool,
    pub background_type: BackgroundType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    Color,
    Gradient,
}

impl BackgroundType {
    pub const NAMES: &'static [&'static str] = &["color", "gradient"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDisplay {
    pub grid_columns: u32,
    pub show_prices: bool,
    pub show_ratings: bool,
    pub show_wishlist: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLayout {
    pub show_categories: bool,
    pub display_style: DisplayStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStyle {
    Grid,
    List,
    Carousel,
}

impl DisplayStyle {
    pub const NAMES: &'static [&'static str] = &["grid", "list", "carousel"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    pub wishlist: bool,
    pub reviews: bool,
    pub filters: bool,
    pub notifications: bool,
    pub user_account: bool,
    pub social_sharing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewData {
    pub featured_products: Vec<FeaturedProduct>,
    pub categories: Vec<PreviewCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedProduct {
    pub name: String,
    /// Already formatted for display, e.g. "$29.99".
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewCategory {
    pub name: String,
    pub count: u64,
}

/// The subset of a config stored alongside a generated app for list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSummary {
    pub app_name: String,
    pub primary_color: String,
    pub featured_products: Vec<FeaturedProduct>,
    pub hero_section: HeroSection,
    pub categories: Vec<PreviewCategory>,
}

fn tab(name: &str, icon: &str, route: &str) -> Tab {
    Tab { name: name.into(), icon: icon.into(), route: route.into() }
}

fn product(name: &str, price: &str) -> FeaturedProduct {
    FeaturedProduct { name: name.into(), price: price.into(), image: None }
}

fn category(name: &str, count: u64) -> PreviewCategory {
    PreviewCategory { name: name.into(), count }
}

impl AppConfig {
    /// Hard defaults for a fresh app. This is both the reconciliation
    /// baseline for new generations and the fallback config. A blank name or
    /// a color that is not hex is replaced so the result stays valid.
    pub fn defaults(app_name: &str, primary_color: &str) -> Self {
        let app_name = match app_name.trim() {
            "" => DEFAULT_APP_NAME,
            name => name,
        };
        let primary_color = if is_hex_color(primary_color) {
            primary_color.trim()
        } else {
            DEFAULT_PRIMARY_COLOR
        };
        Self {
            app_name: app_name.to_string(),
            primary_color: primary_color.to_string(),
            theme: Theme {
                primary_color: primary_color.to_string(),
                font_family: "Inter, sans-serif".into(),
                border_radius: "8px".into(),
            },
            navigation: Navigation {
                show_bottom_nav: true,
                show_search: true,
                show_cart: true,
                tabs: vec![
                    tab("Home", "home", "/"),
                    tab("Shop", "grid", "/shop"),
                    tab("Cart", "shopping-bag", "/cart"),
                    tab("Profile", "user", "/profile"),
                ],
            },
            layout: Layout {
                hero_section: HeroSection {
                    title: format!("Welcome to {app_name}"),
                    subtitle: "Discover amazing products".into(),
                    show_hero: true,
                    background_type: BackgroundType::Gradient,
                },
                product_display: ProductDisplay {
                    grid_columns: 2,
                    show_prices: true,
                    show_ratings: true,
                    show_wishlist: true,
                },
                categories: CategoryLayout {
                    show_categories: true,
                    display_style: DisplayStyle::Grid,
                },
            },
            features: Features {
                wishlist: true,
                reviews: true,
                filters: true,
                notifications: true,
                user_account: true,
                social_sharing: false,
            },
            preview_data: PreviewData {
                featured_products: vec![
                    product("Featured Product 1", "$29.99"),
                    product("Featured Product 2", "$39.99"),
                    product("Featured Product 3", "$19.99"),
                    product("Featured Product 4", "$49.99"),
                ],
                categories: vec![
                    category("All Products", 10),
                    category("New Arrivals", 5),
                    category("Best Sellers", 8),
                ],
            },
        }
    }

    pub fn preview_summary(&self) -> PreviewSummary {
        PreviewSummary {
            app_name: self.app_name.clone(),
            primary_color: self.primary_color.clone(),
            featured_products: self.preview_data.featured_products.clone(),
            hero_section: self.layout.hero_section.clone(),
            categories: self.preview_data.categories.clone(),
        }
    }
}
