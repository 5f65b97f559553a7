use std::error::Error;
use std::path::PathBuf;

use url::Url;

use common::gateway::{ConfigurationError, PinataClient, PinataConfig};
use common::prelude::{AccessManager, Session};
use pinshare::{AppState, Dashboard, StateError};

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error("gateway configuration: {0}")]
    Configuration(#[from] ConfigurationError),
}

#[derive(Debug, Clone)]
pub struct OpContext {
    /// Optional custom config path (defaults to ~/.pinshare)
    pub config_path: Option<PathBuf>,
    /// Gateway overrides from flags or the environment
    pub gateway_url: Option<Url>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

impl OpContext {
    /// Saved state, or defaults if `init` was never run.
    pub fn state(&self) -> Result<AppState, StateError> {
        AppState::load_or_default(self.config_path.clone())
    }

    /// Gateway client from flags/environment first, then the config file.
    pub fn client(&self, state: &AppState) -> Result<PinataClient, ConfigurationError> {
        let config = PinataConfig::new(
            self.gateway_url
                .clone()
                .unwrap_or_else(|| state.config.gateway_url.clone()),
            self.api_key.clone().or_else(|| state.config.api_key.clone()),
            self.api_secret
                .clone()
                .or_else(|| state.config.api_secret.clone()),
        )?;
        PinataClient::new(config)
    }

    /// A dashboard for a fresh session as the configured user.
    pub fn dashboard(&self) -> Result<(Dashboard<PinataClient>, AppState), ContextError> {
        let state = self.state()?;
        let client = self.client(&state)?;
        let session = Session::start(state.config.user.clone());
        Ok((Dashboard::new(AccessManager::new(client), session), state))
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
