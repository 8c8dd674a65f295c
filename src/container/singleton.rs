use std::sync::{Arc, OnceLock};

/// A singleton constructed on first access. Concurrent first accesses block
/// until the single winning construction finishes.
pub struct Lazy<T> {
    cell: OnceLock<Arc<T>>,
    init: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T> Lazy<T> {
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self { cell: OnceLock::new(), init: Box::new(init) }
    }

    pub fn get(&self) -> Arc<T> {
        self.cell.get_or_init(|| Arc::new((self.init)())).clone()
    }

    pub fn is_constructed(&self) -> bool {
        self.cell.get().is_some()
    }
}
