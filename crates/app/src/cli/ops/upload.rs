use std::path::PathBuf;

use chrono::Utc;
use clap::Args;

use pinshare::DashboardError;

use super::render;
use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// Files to upload (PDF, PNG or JPEG)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("upload failed: {0}")]
    Dashboard(#[from] DashboardError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Upload {
    type Error = UploadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (mut dashboard, _state) = ctx.dashboard()?;
        let objects = dashboard.upload_files(self.paths.as_slice()).await?;
        let now = Utc::now();

        Ok(objects
            .iter()
            .map(|object| {
                format!(
                    "Uploaded {}\n\n{}",
                    render::object_line(object),
                    render::access_list(&object.access_list, now)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}
