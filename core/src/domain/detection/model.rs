use std::sync::{Arc, OnceLock};

use tracing::{error, info};

use crate::domain::{common::entities::app_errors::CoreError, detection::ports::ObjectDetector};

type Loader<D> = Box<dyn Fn() -> Result<D, CoreError> + Send + Sync>;

/// Owned, lazily-initialised model. The loader runs at most once; its
/// outcome, success or failure, is kept for the lifetime of the handle.
pub struct ModelHandle<D> {
    loader: Option<Loader<D>>,
    model: OnceLock<Result<Arc<D>, CoreError>>,
}

/// Observation of a [`ModelHandle`] that never triggers a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelState {
    NotLoaded,
    Loaded,
    Failed(String),
}

impl<D> ModelHandle<D>
where
    D: ObjectDetector,
{
    pub fn lazy<F>(loader: F) -> Self
    where
        F: Fn() -> Result<D, CoreError> + Send + Sync + 'static,
    {
        Self {
            loader: Some(Box::new(loader)),
            model: OnceLock::new(),
        }
    }

    pub fn ready(model: D) -> Self {
        Self {
            loader: None,
            model: OnceLock::from(Ok(Arc::new(model))),
        }
    }

    pub fn get(&self) -> Result<Arc<D>, CoreError> {
        self.model
            .get_or_init(|| {
                let Some(loader) = &self.loader else {
                    return Err(CoreError::ModelUnavailable("no model loader".to_string()));
                };

                info!("Loading detection model");
                match loader() {
                    Ok(model) => {
                        info!("Detection model loaded");
                        Ok(Arc::new(model))
                    }
                    Err(e) => {
                        error!(error = %e, "Detection model failed to load");
                        Err(e)
                    }
                }
            })
            .clone()
    }

    pub fn state(&self) -> ModelState {
        match self.model.get() {
            None => ModelState::NotLoaded,
            Some(Ok(_)) => ModelState::Loaded,
            Some(Err(e)) => ModelState::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::detection::ports::MockObjectDetector;

    #[test]
    fn loader_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handle = ModelHandle::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(MockObjectDetector::new())
        });

        assert_eq!(handle.state(), ModelState::NotLoaded);
        assert!(handle.get().is_ok());
        assert!(handle.get().is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(handle.state(), ModelState::Loaded);
    }

    #[test]
    fn load_failure_is_remembered() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handle: ModelHandle<MockObjectDetector> = ModelHandle::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(CoreError::ModelUnavailable("weights missing".to_string()))
        });

        assert!(matches!(handle.get(), Err(CoreError::ModelUnavailable(_))));
        assert!(matches!(handle.get(), Err(CoreError::ModelUnavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            handle.state(),
            ModelState::Failed("Detection model unavailable: weights missing".to_string())
        );
    }

    #[test]
    fn ready_handle_is_loaded() {
        let handle = ModelHandle::ready(MockObjectDetector::new());
        assert_eq!(handle.state(), ModelState::Loaded);
    }
}
