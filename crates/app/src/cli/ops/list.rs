use std::cmp::Reverse;

use clap::{Args, ValueEnum};

use common::object::Object;
use pinshare::DashboardError;

use super::render;
use crate::cli::op::ContextError;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Kind {
    #[default]
    All,
    Pdf,
    Images,
}

impl Kind {
    fn matches(&self, object: &Object) -> bool {
        match self {
            Kind::All => true,
            Kind::Pdf => object.mime_type == "application/pdf",
            Kind::Images => object.mime_type.starts_with("image/"),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sort {
    /// Newest first
    #[default]
    Recent,
    /// Oldest first
    Oldest,
    /// By file name
    Name,
}

impl Sort {
    /// Objects without an upload time sort last either way.
    fn apply(&self, objects: &mut [Object]) {
        match self {
            Sort::Recent => objects.sort_by_key(|o| (o.uploaded_at.is_none(), Reverse(o.uploaded_at))),
            Sort::Oldest => objects.sort_by_key(|o| (o.uploaded_at.is_none(), o.uploaded_at)),
            Sort::Name => objects.sort_by_key(|o| o.display_name.to_lowercase()),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct List {
    /// Only show files of this kind
    #[arg(long, value_enum, default_value_t = Kind::All)]
    pub kind: Kind,

    /// Sort order
    #[arg(long, value_enum, default_value_t = Sort::Recent)]
    pub sort: Sort,

    /// Print objects as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("list failed: {0}")]
    Dashboard(#[from] DashboardError),

    #[error("failed to encode listing: {0}")]
    Json(#[from] serde_json::Error),
}

/// Filter and order a listing for display.
pub fn select(mut objects: Vec<Object>, kind: Kind, sort: Sort) -> Vec<Object> {
    objects.retain(|object| kind.matches(object));
    sort.apply(&mut objects);
    objects
}

#[async_trait::async_trait]
impl crate::cli::op::Op for List {
    type Error = ListError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (mut dashboard, state) = ctx.dashboard()?;
        let objects = select(dashboard.refresh().await?.to_vec(), self.kind, self.sort);

        if self.json {
            return Ok(serde_json::to_string_pretty(&objects)?);
        }

        if objects.is_empty() {
            return Ok(format!("No files shared with {}", state.config.user.email));
        }

        Ok(objects
            .iter()
            .map(render::object_line)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
