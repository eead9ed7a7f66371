// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! Turns a loaded [`ContentFlowConfig`] into a store, an API server and a
//! shutdown coordinator, then runs until a signal arrives.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use contentflow_api::auth::JwtConfig;
use contentflow_api::{ApiConfig, ApiServer, ApiServerBuilder, CorsConfig};
use contentflow_config::{ContentFlowConfig, StoreBackend, StoreConfig, load_config};
use contentflow_core::{MemoryStore, RestStore, RestStoreConfig, Store};
use tracing::{info, warn};

use crate::error::{BinError, BinResult};
use crate::shutdown::{ShutdownCoordinator, ShutdownGuard};

// =============================================================================
// ServiceRuntime
// =============================================================================

/// Owns the service for the lifetime of the process.
pub struct ServiceRuntime {
    config: Arc<ContentFlowConfig>,
    shutdown: ShutdownCoordinator,
}

impl ServiceRuntime {
    /// Creates a new runtime.
    pub fn new(config: ContentFlowConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ContentFlowConfig {
        &self.config
    }

    /// Builds the API server without starting it.
    pub fn build_server(&self) -> BinResult<ApiServer> {
        let store = build_store(&self.config.store)?;
        let server = ApiServerBuilder::new()
            .config(api_config(&self.config)?)
            .store(store)
            .build()?;
        Ok(server)
    }

    /// Runs the service until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!(version = crate::VERSION, "Starting ContentFlow access-control service");

        let server = self.build_server()?;
        let store = server.state().store().clone();
        if let Err(e) = store.ping().await {
            warn!(store = store.name(), error = %e, "Store is not reachable yet");
        }

        let drain_timeout = server.state().config.shutdown_timeout;

        tokio::spawn({
            let coordinator = self.shutdown.clone();
            async move { coordinator.listen_for_signals().await }
        });

        let signal = self.shutdown.shutdown_signal();
        let guard = ShutdownGuard::new(self.shutdown.clone());
        let mut server_task = tokio::spawn(async move {
            // Dropped on exit, so a failed bind also stops the process.
            let _guard = guard;
            server.run_with_shutdown(signal).await
        });

        tokio::select! {
            joined = &mut server_task => return flatten(joined),
            _ = self.shutdown.shutdown_signal() => {}
        }

        info!(timeout_secs = drain_timeout.as_secs(), "Draining in-flight requests");
        match tokio::time::timeout(drain_timeout, &mut server_task).await {
            Ok(joined) => flatten(joined)?,
            Err(_) => {
                warn!("Graceful shutdown timed out, aborting");
                server_task.abort();
            }
        }

        info!("ContentFlow shutdown complete");
        Ok(())
    }
}

fn flatten(
    joined: Result<contentflow_api::ApiResult<()>, tokio::task::JoinError>,
) -> BinResult<()> {
    match joined {
        Ok(result) => result.map_err(BinError::from),
        Err(e) => Err(BinError::runtime(format!("Server task failed: {}", e))),
    }
}

// =============================================================================
// Config Mapping
// =============================================================================

/// Maps the file configuration onto the API crate's configuration.
pub fn api_config(config: &ContentFlowConfig) -> BinResult<ApiConfig> {
    let secret = config
        .jwt
        .secret
        .as_ref()
        .ok_or_else(|| BinError::config("jwt.secret is not set"))?;

    let mut jwt = JwtConfig::new(secret.raw())
        .with_issuer(&config.jwt.issuer)
        .with_leeway(config.jwt.leeway_secs);
    jwt.expiration_secs = i64::try_from(config.jwt.expiration_secs)
        .map_err(|_| BinError::config("jwt.expiration_secs is too large"))?;
    if let Some(audience) = &config.jwt.audience {
        jwt = jwt.with_audience(audience);
    }

    let cors = &config.api.cors;
    let cors = CorsConfig {
        origins: cors.allowed_origins.clone(),
        methods: cors.allowed_methods.clone(),
        headers: cors.allowed_headers.clone(),
        credentials: cors.allow_credentials,
        max_age: Duration::from_secs(cors.max_age_secs),
    };

    Ok(ApiConfig::default()
        .with_listen(config.api.socket_addr())
        .with_cors(cors)
        .with_jwt(jwt)
        .with_request_timeout(config.api.request_timeout())
        .with_public_paths(config.jwt.public_paths.clone())
        .with_max_body_size(config.api.max_body_size))
}

/// Builds the persistence collaborator.
pub fn build_store(config: &StoreConfig) -> BinResult<Arc<dyn Store>> {
    match config.backend {
        StoreBackend::Memory => {
            let store = match &config.seed_path {
                Some(path) => {
                    let store = MemoryStore::from_seed_file(path).map_err(|e| {
                        BinError::from(e).with_context(format!("Loading seed {}", path.display()))
                    })?;
                    info!(path = %path.display(), rows = store.len(), "Memory store seeded");
                    store
                }
                None => {
                    warn!("Memory store has no seed; no token will resolve to a user");
                    MemoryStore::new()
                }
            };
            Ok(Arc::new(store))
        }
        StoreBackend::Rest => {
            let url = config
                .url
                .as_deref()
                .ok_or_else(|| BinError::config("store.url is not set"))?;
            let key = config
                .service_key
                .as_ref()
                .ok_or_else(|| BinError::config("store.service_key is not set"))?;

            let rest = RestStoreConfig::new(url, key.raw())
                .with_schema(&config.schema)
                .with_timeout(config.timeout());
            info!(url, schema = %config.schema, "Using REST store");
            Ok(Arc::new(RestStore::new(rest)?))
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the service runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<ContentFlowConfig>,
    port: Option<u16>,
    seed: Option<PathBuf>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: ContentFlowConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the listen port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Overrides the memory store seed file.
    pub fn seed(mut self, seed: Option<PathBuf>) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<ServiceRuntime> {
        let mut config = match self.config {
            Some(config) => config,
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::config("No configuration provided"))?;
                load_config(&path).map_err(|e| {
                    BinError::from(e).with_context(format!("Loading {}", path.display()))
                })?
            }
        };

        if let Some(port) = self.port {
            config.api.port = port;
        }
        if let Some(seed) = self.seed {
            config.store.backend = StoreBackend::Memory;
            config.store.seed_path = Some(seed);
        }
        config.validate()?;

        Ok(ServiceRuntime::new(config))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use contentflow_config::SecretValue;
    use std::io::Write;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn test_config() -> ContentFlowConfig {
        let mut config = ContentFlowConfig::default();
        config.jwt.secret = Some(SecretValue::new(SECRET));
        config
    }

    #[test]
    fn test_runtime_builder() {
        let runtime = RuntimeBuilder::new()
            .config(test_config())
            .port(Some(9123))
            .build()
            .unwrap();
        assert_eq!(runtime.config().api.port, 9123);
    }

    #[test]
    fn test_runtime_builder_requires_config() {
        assert!(RuntimeBuilder::new().build().is_err());
    }

    #[test]
    fn test_runtime_builder_rejects_missing_secret() {
        let err = RuntimeBuilder::new()
            .config(ContentFlowConfig::default())
            .build()
            .err()
            .unwrap();
        assert_eq!(err.exit_code(), crate::error::exit::CONFIG);
    }

    #[test]
    fn test_api_config_mapping() {
        let mut config = test_config();
        config.jwt.audience = Some("dashboard".into());
        config.jwt.public_paths = vec!["/health".into(), "/docs/*".into()];
        config.api.cors.max_age_secs = 600;

        let api = api_config(&config).unwrap();
        assert_eq!(api.jwt.secret, SECRET);
        assert_eq!(api.jwt.audience.as_deref(), Some("dashboard"));
        assert_eq!(api.public_paths, vec!["/health", "/docs/*"]);
        assert_eq!(api.cors.max_age, Duration::from_secs(600));
        assert_eq!(api.listen, config.api.socket_addr());
    }

    #[test]
    fn test_memory_store_from_seed() {
        let mut seed = tempfile::NamedTempFile::new().unwrap();
        write!(
            seed,
            r#"{{"users": [{{"id": "11111111-1111-4111-8111-111111111111", "email": "a@example.com", "role": "admin", "status": "active"}}]}}"#
        )
        .unwrap();

        let runtime = RuntimeBuilder::new()
            .config(test_config())
            .seed(Some(seed.path().to_path_buf()))
            .build()
            .unwrap();
        let server = runtime.build_server().unwrap();
        assert_eq!(server.state().store().name(), "memory");
    }

    #[test]
    fn test_missing_seed_file() {
        let mut config = test_config();
        config.store.seed_path = Some(PathBuf::from("/definitely/not/here.json"));
        assert!(build_store(&config.store).is_err());
    }
}
