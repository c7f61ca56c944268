use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;

/// Shared handle passed to every handler; cloning is an `Arc` bump.
#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<Shared>,
}

struct Shared {
    settings: Settings,
    db: PgPool,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool) -> Self {
        Self { inner: Arc::new(Shared { settings, db }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Whether locked lessons and quizzes are rejected on write.
    pub(crate) fn enforce_locks(&self) -> bool {
        self.inner.settings.learning().enforce_lock_state
    }

    pub(crate) fn allowed_extensions(&self) -> &[String] {
        &self.inner.settings.attachments().allowed_extensions
    }
}
