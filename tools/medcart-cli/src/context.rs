//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use medcart_session::{ApiClient, BillingSession, CartSession, CatalogScope, OrderHistory};
use medcart_store::{FileStore, LedgerRepository};

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names, searched in order in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["medcart.toml", ".medcart.toml", "medcart.json"];

pub type Cart = CartSession<FileStore, ApiClient, ApiClient>;
pub type Bill = BillingSession<ApiClient, ApiClient>;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where the config was read from, if anywhere.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    token: Option<String>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&Path>, token: Option<String>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => (CliConfig::load(path)?, Some(path.to_path_buf())),
            None => match find_config(&cwd) {
                Some(path) => (CliConfig::load(&path)?, Some(path)),
                None => (CliConfig::default(), None),
            },
        };
        tracing::debug!(config = ?config_path, "configuration loaded");

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
            token,
        })
    }

    /// Directory relative paths in the config are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone())
    }

    pub fn storage_dir(&self) -> PathBuf {
        let dir = PathBuf::from(&self.config.storage.dir);
        if dir.is_absolute() {
            dir
        } else {
            self.base_dir().join(dir)
        }
    }

    pub fn api_client(&self, scope: CatalogScope) -> Result<ApiClient> {
        let client = ApiClient::new(self.config.api_client_config(self.token.as_deref()))
            .context("Failed to create API client")?;
        Ok(client.with_scope(scope))
    }

    /// Open the persisted customer cart.
    pub fn cart(&self) -> Result<Cart> {
        let store = FileStore::open(self.storage_dir()).with_context(|| {
            format!("Failed to open cart storage: {}", self.storage_dir().display())
        })?;
        let repository = LedgerRepository::with_key(
            store,
            self.config.storage.cart_key.clone(),
            self.config.currency()?,
        );
        let client = self.api_client(CatalogScope::User)?;
        let policy = self.config.delivery_policy()?;
        Ok(CartSession::open(repository, policy, client.clone(), client)?)
    }

    /// The signed-in customer's orders.
    pub fn orders(&self) -> Result<OrderHistory<ApiClient>> {
        Ok(OrderHistory::new(self.api_client(CatalogScope::User)?))
    }

    /// Start an empty counter bill.
    pub fn bill(&self) -> Result<Bill> {
        let client = self.api_client(CatalogScope::Admin)?;
        Ok(BillingSession::new(
            self.config.currency()?,
            self.config.tax_policy(),
            client.clone(),
            client,
        ))
    }
}

/// Find config file in directory tree.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join("medcart.toml"), "").unwrap();

        assert_eq!(find_config(&nested), Some(root.path().join("medcart.toml")));
    }

    #[test]
    fn test_storage_dir_relative_to_config() {
        let root = tempfile::tempdir().unwrap();
        let ctx = Context {
            config: CliConfig::default(),
            config_path: Some(root.path().join("medcart.toml")),
            output: Output::new(true),
            cwd: PathBuf::from("/somewhere/else"),
            token: None,
        };
        assert_eq!(ctx.storage_dir(), root.path().join(".medcart"));
    }
}
