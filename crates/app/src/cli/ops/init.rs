use clap::Args;

use common::mirror::User;
use pinshare::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Email the session runs as; grants and listings key on it
    #[arg(long)]
    pub email: Option<String>,

    /// Display name for the session user
    #[arg(long)]
    pub name: Option<String>,

    /// Role shown for the session user
    #[arg(long)]
    pub role: Option<String>,

    /// Days until a grant expires when none is given
    #[arg(long)]
    pub default_grant_days: Option<u32>,

    /// Save the api key and secret from flags/environment into config.toml
    #[arg(long)]
    pub save_credentials: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] pinshare::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let defaults = AppConfig::default();
        let user = User {
            email: self.email.clone().unwrap_or(defaults.user.email),
            name: self.name.clone().unwrap_or(defaults.user.name),
            role: self.role.clone().unwrap_or(defaults.user.role),
        };

        let (api_key, api_secret) = if self.save_credentials {
            (ctx.api_key.clone(), ctx.api_secret.clone())
        } else {
            (None, None)
        };

        let config = AppConfig {
            gateway_url: ctx.gateway_url.clone().unwrap_or(defaults.gateway_url),
            api_key,
            api_secret,
            default_grant_days: self
                .default_grant_days
                .unwrap_or(defaults.default_grant_days),
            user,
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let credentials = match (&state.config.api_key, &state.config.api_secret) {
            (Some(_), Some(_)) => "saved",
            _ => "from PINATA_API_KEY / PINATA_API_SECRET",
        };

        let output = format!(
            "Initialized pinshare directory at: {}\n\
             - Config: {}\n\
             - Gateway: {}\n\
             - Credentials: {}\n\
             - User: {} <{}> ({})\n\
             - Default grant: {} days",
            state.pinshare_dir.display(),
            state.config_path.display(),
            state.config.gateway_url,
            credentials,
            state.config.user.name,
            state.config.user.email,
            state.config.user.role,
            state.config.default_grant_days,
        );

        Ok(output)
    }
}
