//! CLI configuration.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use medcart_core::ledger::SurchargePolicy;
use medcart_core::{Currency, Money, TaxRate};
use medcart_session::ApiClientConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Backend connection.
    #[serde(default)]
    pub api: ApiConfig,

    /// Where the cart is kept between runs.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Currency and surcharges.
    #[serde(default)]
    pub pricing: PricingConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn currency(&self) -> Result<Currency> {
        Currency::from_code(&self.pricing.currency)
            .ok_or_else(|| anyhow!("Unknown currency: {}", self.pricing.currency))
    }

    /// Surcharge for the customer cart.
    pub fn delivery_policy(&self) -> Result<SurchargePolicy> {
        Ok(SurchargePolicy::FlatDelivery {
            fee: Money::new(self.pricing.delivery_fee_cents, self.currency()?),
        })
    }

    /// Surcharge for counter bills.
    pub fn tax_policy(&self) -> SurchargePolicy {
        SurchargePolicy::ProportionalTax {
            rate: TaxRate::from_bps(self.pricing.tax_rate_bps),
        }
    }

    /// Connection settings, with `token` taking precedence over the file.
    pub fn api_client_config(&self, token: Option<&str>) -> ApiClientConfig {
        ApiClientConfig {
            base_url: self.api.base_url.clone(),
            token: token.map(str::to_string).or_else(|| self.api.token.clone()),
            timeout: Duration::from_secs(self.api.timeout_secs),
        }
    }

    /// A copy fit for printing, with the token replaced by a marker.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.api.token = self.api.token.as_ref().map(|_| TOKEN_SET.to_string());
        config
    }

    /// Check the config. Returns `(errors, warnings)`.
    pub fn check(&self) -> (Vec<String>, Vec<String>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let url = self.api.base_url.trim();
        if url.is_empty() {
            errors.push("api.base_url is required".to_string());
        } else if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.push(format!("api.base_url '{}' must start with http:// or https://", url));
        } else if url.starts_with("http://")
            && !url.contains("localhost")
            && !url.contains("127.0.0.1")
        {
            warnings.push("api.base_url uses plain http for a remote host".to_string());
        }

        if self.api.timeout_secs == 0 {
            errors.push("api.timeout_secs must be at least 1".to_string());
        }
        if self.api.token.is_none() {
            warnings.push("api.token is not set; set MEDCART_TOKEN or pass --token".to_string());
        }

        if self.storage.cart_key.trim().is_empty() {
            errors.push("storage.cart_key is required".to_string());
        }

        if Currency::from_code(&self.pricing.currency).is_none() {
            errors.push(format!("pricing.currency '{}' is not supported", self.pricing.currency));
        }
        if self.pricing.delivery_fee_cents < 0 {
            errors.push("pricing.delivery_fee_cents must not be negative".to_string());
        }
        if self.pricing.tax_rate_bps > 10_000 {
            warnings.push(format!(
                "pricing.tax_rate_bps {} is above 100%",
                self.pricing.tax_rate_bps
            ));
        }

        (errors, warnings)
    }
}

/// Printed in place of a configured token.
pub const TOKEN_SET: &str = "<set>";

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

/// Backend connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token from the login flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Cart storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the cart file, relative to the config file.
    #[serde(default = "default_storage_dir")]
    pub dir: String,

    #[serde(default = "default_cart_key")]
    pub cart_key: String,
}

fn default_storage_dir() -> String {
    ".medcart".to_string()
}

fn default_cart_key() -> String {
    medcart_store::DEFAULT_CART_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            cart_key: default_cart_key(),
        }
    }
}

/// Pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Flat delivery fee on customer orders, in minor units.
    #[serde(default = "default_delivery_fee_cents")]
    pub delivery_fee_cents: i64,

    /// Tax on counter bills, in basis points.
    #[serde(default = "default_tax_rate_bps")]
    pub tax_rate_bps: u32,
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_delivery_fee_cents() -> i64 {
    medcart_core::ledger::DEFAULT_DELIVERY_FEE_CENTS
}

fn default_tax_rate_bps() -> u32 {
    TaxRate::STANDARD.bps()
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            delivery_fee_cents: default_delivery_fee_cents(),
            tax_rate_bps: default_tax_rate_bps(),
        }
    }
}

/// Generate a default medcart.toml config file.
pub fn generate_default_config() -> String {
    r#"# MedCart client configuration

[api]
base_url = "http://localhost:8000"
# token = "..."   # or set MEDCART_TOKEN
timeout_secs = 10

[storage]
dir = ".medcart"
cart_key = "cart"

[pricing]
currency = "INR"
delivery_fee_cents = 5000
tax_rate_bps = 500
"#
    .to_string()
}
