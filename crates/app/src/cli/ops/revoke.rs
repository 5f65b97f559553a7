use chrono::Utc;
use clap::Args;

use common::object::ContentHash;
use pinshare::DashboardError;

use super::render;
use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Revoke {
    /// Content hash of the object
    pub hash: ContentHash,

    /// Email whose grants are all removed
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RevokeError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("revoke failed: {0}")]
    Dashboard(#[from] DashboardError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Revoke {
    type Error = RevokeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (mut dashboard, _state) = ctx.dashboard()?;
        let access_list = dashboard.revoke(&self.hash, &self.email).await?;

        Ok(format!(
            "Revoked access for {}\n\n{}",
            self.email,
            render::access_list(&access_list, Utc::now())
        ))
    }
}
