use chrono::{DateTime, Utc};
use clap::Args;

use common::access::{AccessGrant, AccessLevel};
use common::object::ContentHash;
use pinshare::DashboardError;

use super::render;
use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Grant {
    /// Content hash of the object
    pub hash: ContentHash,

    /// Email of the grantee
    pub email: String,

    /// Access level: read or write
    #[arg(long, default_value = "read")]
    pub level: AccessLevel,

    /// Days until the grant expires (defaults to the configured grant period)
    #[arg(long, conflicts_with = "expires")]
    pub days: Option<u32>,

    /// Exact expiry as an RFC 3339 timestamp
    #[arg(long)]
    pub expires: Option<DateTime<Utc>>,
}

#[derive(Debug, thiserror::Error)]
pub enum GrantError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("grant failed: {0}")]
    Dashboard(#[from] DashboardError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Grant {
    type Error = GrantError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (mut dashboard, state) = ctx.dashboard()?;
        let now = Utc::now();

        let grant = match self.expires {
            Some(expires_at) => AccessGrant::new(&self.email, self.level, expires_at),
            None => AccessGrant::expiring_in(
                &self.email,
                self.level,
                now,
                self.days.unwrap_or(state.config.default_grant_days),
            ),
        };

        let access_list = dashboard.grant(&self.hash, grant).await?;

        Ok(format!(
            "Granted {} access to {}\n\n{}",
            self.level,
            self.email,
            render::access_list(&access_list, now)
        ))
    }
}
