use std::env;

use anyhow::{Context, Result, anyhow, bail};
use secrecy::SecretString;
use table::PaginationMode;
use types::{Access, UserSession, session};
use url::Url;

use crate::auth::StaticToken;

#[derive(Clone)]
pub struct Config {
    pub api_url: Url,
    pub api_token: Option<SecretString>,
    pub admin_group: String,
    pub page_size: usize,
    pub pagination: PaginationMode,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = required(&lookup, "DASHBOARD_API_URL")?;
        let api_url = Url::parse(&api_url)
            .with_context(|| format!("DASHBOARD_API_URL is not a valid URL: {api_url}"))?;

        let page_size = match lookup("DASHBOARD_PAGE_SIZE") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| anyhow!("DASHBOARD_PAGE_SIZE must be a positive integer, got '{raw}'"))?,
            None => table::TableConfig::DEFAULT_PAGE_SIZE,
        };

        let pagination = match lookup("DASHBOARD_PAGINATION").as_deref() {
            None | Some("client") => PaginationMode::Client,
            Some("server") => PaginationMode::Server,
            Some(other) => bail!("DASHBOARD_PAGINATION must be 'client' or 'server', got '{other}'"),
        };

        Ok(Self {
            api_url,
            api_token: lookup("DASHBOARD_API_TOKEN").map(Into::into),
            admin_group: lookup("DASHBOARD_ADMIN_GROUP").unwrap_or_else(|| "dashboard_admin".into()),
            page_size,
            pagination,
        })
    }

    /// A fixed service token, when one is configured instead of per-operator
    /// sessions.
    pub fn static_token(&self) -> Option<StaticToken> {
        self.api_token.clone().map(StaticToken::new)
    }

    /// Gate the admin screens on membership of the configured group.
    pub fn guard(&self, session: Option<&UserSession>) -> Access {
        session::guard(session, &self.admin_group)
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    lookup(name).ok_or_else(|| anyhow!("missing environment variable: {}", name))
}
