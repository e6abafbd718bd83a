//! Session-keyed manager registry.
//!
//! Assembling a [`SourceManager`] can involve backend logins, so managers are
//! built once per session token and reused for the token's lifetime. One
//! session-independent fallback manager serves contexts without an
//! authenticated session (a bare playback-proxy request, for instance).
//! Invalidation is coarse by design: when the backend configuration changes,
//! everything is dropped and rebuilt lazily — rebuilding is cheap relative to
//! request volume.

use crate::{Result, SourceManager};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// A stable per-user token. Authentication itself happens outside this core;
/// the registry only needs a key that is stable for the session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Builds a [`SourceManager`] for a session, or the session-independent
/// fallback when no session is given (only backends that need no per-user
/// authentication may be included in the fallback).
#[async_trait]
pub trait ManagerFactory: Send + Sync {
    async fn build(&self, session: Option<&Session>) -> Result<SourceManager>;
}

/// Caches assembled managers per session token, plus one fallback
pub struct ManagerRegistry {
    factory: Arc<dyn ManagerFactory>,
    managers: RwLock<HashMap<String, Arc<SourceManager>>>,
    fallback: RwLock<Option<Arc<SourceManager>>>,
}

impl ManagerRegistry {
    pub fn new(factory: Arc<dyn ManagerFactory>) -> Self {
        Self {
            factory,
            managers: RwLock::new(HashMap::new()),
            fallback: RwLock::new(None),
        }
    }

    /// Returns the manager for a session, building it on first use.
    ///
    /// Once built for a token, the same instance is returned for the token's
    /// lifetime (until [`invalidate_all`](Self::invalidate_all)).
    pub async fn manager_for(&self, session: &Session) -> Result<Arc<SourceManager>> {
        {
            let managers = self.managers.read().await;
            if let Some(manager) = managers.get(session.token()) {
                return Ok(Arc::clone(manager));
            }
        }

        let mut managers = self.managers.write().await;
        // A concurrent builder may have won the race while we upgraded
        if let Some(manager) = managers.get(session.token()) {
            return Ok(Arc::clone(manager));
        }

        debug!("Building source manager for session");
        let manager = Arc::new(self.factory.build(Some(session)).await?);
        managers.insert(session.token().to_string(), Arc::clone(&manager));
        Ok(manager)
    }

    /// Returns the session-independent fallback manager, building it lazily
    pub async fn ensure_fallback(&self) -> Result<Arc<SourceManager>> {
        {
            let fallback = self.fallback.read().await;
            if let Some(manager) = fallback.as_ref() {
                return Ok(Arc::clone(manager));
            }
        }

        let mut fallback = self.fallback.write().await;
        if let Some(manager) = fallback.as_ref() {
            return Ok(Arc::clone(manager));
        }

        debug!("Building fallback source manager");
        let manager = Arc::new(self.factory.build(None).await?);
        *fallback = Some(Arc::clone(&manager));
        Ok(manager)
    }

    /// Drops every cached manager, including the fallback.
    ///
    /// Used when the underlying catalog configuration changes. There is no
    /// per-entry invalidation on purpose.
    pub async fn invalidate_all(&self) {
        let mut managers = self.managers.write().await;
        let mut fallback = self.fallback.write().await;
        let dropped = managers.len() + usize::from(fallback.is_some());
        managers.clear();
        *fallback = None;
        info!(dropped, "Invalidated all cached source managers");
    }
}
