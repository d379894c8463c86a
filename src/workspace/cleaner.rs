use std::sync::Arc;

use super::WorkspaceProvider;

/// Deletes the ephemeral workspaces a job created. Never fails the job.
pub struct WorkspaceCleaner {
    providers: Vec<Arc<WorkspaceProvider>>,
}

impl WorkspaceCleaner {
    pub fn new(providers: impl IntoIterator<Item = Arc<WorkspaceProvider>>) -> Self {
        let mut unique: Vec<Arc<WorkspaceProvider>> = Vec::new();
        for provider in providers {
            if !unique.iter().any(|seen| Arc::ptr_eq(seen, &provider)) {
                unique.push(provider);
            }
        }
        Self { providers: unique }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub async fn clean_workspaces(&self) {
        for provider in &self.providers {
            let WorkspaceProvider::New(new) = provider.as_ref() else {
                continue;
            };

            match new.cleanup().await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    tracing::debug!(backend = %new.request().backend, "Workspace already deleted");
                }
                Err(e) => {
                    tracing::error!(
                        backend = %new.request().backend,
                        error = %e,
                        "Failed to cleanup workspace"
                    );
                }
            }
        }
    }
}
