//! Configuration types for fetching, crawling and serving.
//!
//! Every struct deserializes with serde defaults so partial configuration is
//! valid, and carries `with_*` builder methods for programmatic setup.
//! [`AppConfig::from_env`] assembles the process configuration from
//! environment variables (and a `.env` file when present).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Configuration for HTTP page fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Additional headers to include.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_timeout() -> f64 {
    30.0
}

fn default_user_agent() -> String {
    concat!("catalog-crawler/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_redirects() -> usize {
    10
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
            headers: HashMap::new(),
        }
    }
}

impl FetchConfig {
    /// Creates a new fetch configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds.max(0.0)).unwrap_or(Duration::MAX)
    }
}

/// How the crawler decides whether another listing page follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NextPageCheck {
    /// Decide with the "next" control captured before the detail pages were
    /// visited.
    #[default]
    Captured,
    /// Return to the listing page after the detail pages and query the
    /// "next" control again; the fresh result decides.
    Requery,
}

impl fmt::Display for NextPageCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Captured => write!(f, "captured"),
            Self::Requery => write!(f, "requery"),
        }
    }
}

impl FromStr for NextPageCheck {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "captured" => Ok(Self::Captured),
            "requery" => Ok(Self::Requery),
            other => Err(format!(
                "unknown next page check '{other}', expected 'captured' or 'requery'"
            )),
        }
    }
}

/// Selectors used on listing pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// The "next page" control.
    #[serde(default = "default_next_page")]
    pub next_page: String,
    /// Links to product detail pages.
    #[serde(default = "default_product_link")]
    pub product_link: String,
    /// Region that becomes present once a listing page has rendered.
    #[serde(default = "default_content_ready")]
    pub content_ready: String,
}

fn default_next_page() -> String {
    r#"ul#pages.pagination a[rel~="next"]"#.to_string()
}

fn default_product_link() -> String {
    ".list_product_a".to_string()
}

fn default_content_ready() -> String {
    ".tabs.content.active".to_string()
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            next_page: default_next_page(),
            product_link: default_product_link(),
            content_ready: default_content_ready(),
        }
    }
}

/// Selectors used on product detail pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductSelectors {
    /// Product name heading.
    pub product_name: String,
    /// Barcode element.
    pub product_id: String,
    /// Nutri-Score heading ("Nutri-Score B").
    pub nutrition_score: String,
    /// Nutri-Score description.
    pub nutrition_title: String,
    /// NOVA heading ("NOVA 4").
    pub nova_score: String,
    /// NOVA description.
    pub nova_title: String,
    /// Quantity label.
    pub quantity: String,
    /// Palm oil analysis heading.
    pub palm_oil: String,
    /// Vegetarian analysis heading.
    pub vegetarian: String,
    /// Vegan analysis heading.
    pub vegan: String,
    /// One list per nutrient level entry.
    pub nutrient_levels: String,
    /// Level icon inside a nutrient level entry.
    pub nutrient_level_icon: String,
    /// Level title inside a nutrient level entry.
    pub nutrient_level_title: String,
    /// Rows of the nutrition facts table.
    pub nutrition_fact_rows: String,
}

impl Default for ProductSelectors {
    fn default() -> Self {
        const ATTRIBUTES: &str = "#attributes_grid > li";
        const ATTR_TEXT: &str = "a > div > div > div.attr_text";
        Self {
            product_name: r#"h2.title-1[property="food:name"][itemprop="name"]"#.to_string(),
            product_id: r#"span#barcode[property="food:code"][itemprop="gtin13"]"#.to_string(),
            nutrition_score: format!("{ATTRIBUTES}:nth-child(1) > {ATTR_TEXT} > h4"),
            nutrition_title: format!("{ATTRIBUTES}:nth-child(1) > {ATTR_TEXT} > span"),
            nova_score: format!("{ATTRIBUTES}:nth-child(2) > {ATTR_TEXT} > h4"),
            nova_title: format!("{ATTRIBUTES}:nth-child(2) > {ATTR_TEXT} > span"),
            quantity: "span#field_quantity_value".to_string(),
            palm_oil: "#panel_ingredients_analysis_en-palm-oil-content-unknown > li > a > h4"
                .to_string(),
            vegetarian: "#panel_ingredients_analysis_en-vegetarian-status-unknown > li > a > h4"
                .to_string(),
            vegan: "#panel_ingredients_analysis_en-vegan-status-unknown > li > a > h4".to_string(),
            nutrient_levels: "#panel_nutrient_levels_content > div > ul".to_string(),
            nutrient_level_icon: "li > a > img".to_string(),
            nutrient_level_title: "li > a > h4".to_string(),
            nutrition_fact_rows:
                "#panel_nutrition_facts_table_content > div > table > tbody > tr".to_string(),
        }
    }
}

/// Configuration for a crawl run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// First listing page.
    #[serde(default = "default_start_url")]
    pub start_url: String,
    /// Pagination termination rule.
    #[serde(default)]
    pub next_page_check: NextPageCheck,
    /// Upper bound for `wait_for_selector`, in seconds.
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_seconds: f64,
    /// Delay between `wait_for_selector` polls, in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Listing page selectors.
    #[serde(default)]
    pub listing: ListingSelectors,
    /// Detail page selectors.
    #[serde(default)]
    pub product: ProductSelectors,
}

fn default_start_url() -> String {
    "https://br.openfoodfacts.org".to_string()
}

fn default_wait_timeout() -> f64 {
    30.0
}

fn default_poll_interval() -> u64 {
    250
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_url: default_start_url(),
            next_page_check: NextPageCheck::default(),
            wait_timeout_seconds: default_wait_timeout(),
            poll_interval_ms: default_poll_interval(),
            listing: ListingSelectors::default(),
            product: ProductSelectors::default(),
        }
    }
}

impl CrawlerConfig {
    /// Creates a crawler configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the start URL.
    #[must_use]
    pub fn with_start_url(mut self, url: impl Into<String>) -> Self {
        self.start_url = url.into();
        self
    }

    /// Sets the pagination termination rule.
    #[must_use]
    pub fn with_next_page_check(mut self, check: NextPageCheck) -> Self {
        self.next_page_check = check;
        self
    }

    /// Sets the wait timeout.
    #[must_use]
    pub fn with_wait_timeout(mut self, seconds: f64) -> Self {
        self.wait_timeout_seconds = seconds;
        self
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval_ms(mut self, millis: u64) -> Self {
        self.poll_interval_ms = millis;
        self
    }

    /// Replaces the listing selectors.
    #[must_use]
    pub fn with_listing_selectors(mut self, selectors: ListingSelectors) -> Self {
        self.listing = selectors;
        self
    }

    /// Replaces the product selectors.
    #[must_use]
    pub fn with_product_selectors(mut self, selectors: ProductSelectors) -> Self {
        self.product = selectors;
        self
    }

    /// Gets the wait timeout as Duration.
    ///
    /// Negative or NaN values wait not at all; overflowing values wait forever.
    #[must_use]
    pub fn wait_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.wait_timeout_seconds.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Gets the poll interval as Duration.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Process configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Fetch settings for the page source.
    pub fetch: FetchConfig,
    /// Crawl settings.
    pub crawler: CrawlerConfig,
}

impl AppConfig {
    /// Default listening port.
    pub const DEFAULT_PORT: u16 = 8080;

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        let port = env::var("PORT")
            .unwrap_or_else(|_| Self::DEFAULT_PORT.to_string())
            .parse()
            .context("PORT must be a valid number")?;

        let mut fetch = FetchConfig::default();
        if let Ok(timeout) = env::var("FETCH_TIMEOUT_SECONDS") {
            fetch.timeout_seconds = timeout
                .parse()
                .context("FETCH_TIMEOUT_SECONDS must be a number")?;
        }
        if let Ok(user_agent) = env::var("FETCH_USER_AGENT") {
            fetch.user_agent = user_agent;
        }

        let mut crawler = CrawlerConfig::default();
        if let Ok(start_url) = env::var("CATALOG_START_URL") {
            crawler.start_url = start_url;
        }
        if let Ok(check) = env::var("NEXT_PAGE_CHECK") {
            crawler.next_page_check = check
                .parse()
                .map_err(anyhow::Error::msg)
                .context("NEXT_PAGE_CHECK is invalid")?;
        }
        if let Ok(wait) = env::var("CRAWL_WAIT_TIMEOUT_SECONDS") {
            crawler.wait_timeout_seconds = wait
                .parse()
                .context("CRAWL_WAIT_TIMEOUT_SECONDS must be a number")?;
        }

        Ok(Self {
            port,
            fetch,
            crawler,
        })
    }
}
