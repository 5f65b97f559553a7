use chrono::Utc;
use clap::Args;

use common::object::ContentHash;
use pinshare::DashboardError;

use super::render;
use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Access {
    /// Content hash of the object
    pub hash: ContentHash,
}

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("access lookup failed: {0}")]
    Dashboard(#[from] DashboardError),

    #[error("{0} is not shared with {1}")]
    NotShared(ContentHash, String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Access {
    type Error = AccessError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (mut dashboard, state) = ctx.dashboard()?;
        dashboard.refresh().await?;

        let object = dashboard
            .select(Some(self.hash.clone()))
            .ok_or_else(|| AccessError::NotShared(self.hash.clone(), state.config.user.email))?;

        Ok(format!(
            "{}\n\nCurrent Access List\n{}",
            render::object_line(object),
            render::access_list(&object.access_list, Utc::now())
        ))
    }
}
