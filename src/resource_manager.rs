//! Resource management

use crate::error::PanelError;

use tokio::sync::{Semaphore, SemaphorePermit};

/// [crate::resource_manager::ResourceManager] bounds the number of charts
/// rasterized concurrently. Rendering holds a full pixel buffer and a
/// blocking thread, so permits are acquired for the duration of a draw and
/// released when the permit is dropped.
#[derive(Debug)]
pub struct ResourceManager {
    /// Optional semaphore for rendering tasks.
    render_tasks: Option<Semaphore>,
}

impl ResourceManager {
    /// Returns a new ResourceManager object.
    pub fn new(render_task_limit: Option<usize>) -> Self {
        Self {
            render_tasks: render_task_limit.map(Semaphore::new),
        }
    }

    /// Acquire a rendering task resource.
    pub async fn render_task(&self) -> Result<Option<SemaphorePermit>, PanelError> {
        optional_acquire(&self.render_tasks, 1).await
    }
}

/// Acquire permits on an optional Semaphore, if present.
async fn optional_acquire(
    sem: &Option<Semaphore>,
    n: u32,
) -> Result<Option<SemaphorePermit>, PanelError> {
    if let Some(sem) = sem {
        sem.acquire_many(n)
            .await
            .map(Some)
            .map_err(|err| err.into())
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::sync::TryAcquireError;

    #[tokio::test]
    async fn no_resource_management() {
        let rm = ResourceManager::new(None);
        assert!(rm.render_tasks.is_none());
        let permit = rm.render_task().await.unwrap();
        assert!(permit.is_none());
    }

    #[tokio::test]
    async fn full_resource_management() {
        let rm = ResourceManager::new(Some(1));
        assert!(rm.render_tasks.is_some());
        let permit = rm.render_task().await.unwrap();
        assert!(permit.is_some());
        // Check that there are no more resources (without blocking).
        assert_eq!(
            rm.render_tasks.as_ref().unwrap().try_acquire().err(),
            Some(TryAcquireError::NoPermits)
        );
        // Dropping the permit frees the resource.
        drop(permit);
        assert!(rm.render_tasks.as_ref().unwrap().try_acquire().is_ok());
    }
}
