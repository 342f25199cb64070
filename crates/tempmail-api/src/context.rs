/// API Context - shared state for all API handlers
use std::sync::Arc;
use tempmail_core::{
    AddressLifecycle, AdminConfig, AdminError, ConfiguredNamer, Database, ImpersonationIssuer,
    InternalMailNotifier, Notifier, SqliteDatabase,
};
use tracing::info;

/// API Context contains shared resources for API handlers
#[derive(Clone)]
pub struct ApiContext {
    /// Configuration loaded at start-up
    pub config: AdminConfig,

    /// Relational store
    pub db: Arc<dyn Database>,

    /// Delivers notifications to addresses
    pub notifier: Arc<dyn Notifier>,

    /// Signs impersonation tokens
    pub issuer: ImpersonationIssuer,

    /// Builds new address names
    pub namer: ConfiguredNamer,
}

impl ApiContext {
    /// Create a new API context from environment variables
    pub async fn new() -> Result<Arc<Self>, AdminError> {
        let config = AdminConfig::from_env()?;
        let db: Arc<dyn Database> = Arc::new(SqliteDatabase::connect(&config.database_url).await?);
        Self::with_database(config, db)
    }

    /// Create a context around an already opened store
    pub fn with_database(config: AdminConfig, db: Arc<dyn Database>) -> Result<Arc<Self>, AdminError> {
        let notifier: Arc<dyn Notifier> = Arc::new(InternalMailNotifier::new(
            Arc::clone(&db),
            &config.admin_mail_sender,
        )?);
        let issuer = ImpersonationIssuer::new(&config.jwt_secret)?;
        let namer = ConfiguredNamer::new(config.prefix.clone(), config.domains.clone());

        info!(domains = ?config.domains, "API context initialized");

        Ok(Arc::new(Self {
            config,
            db,
            notifier,
            issuer,
            namer,
        }))
    }

    pub fn lifecycle(&self) -> AddressLifecycle<'_> {
        AddressLifecycle::new(self.db.as_ref(), &self.namer, self.config.mail_cascade)
    }
}
