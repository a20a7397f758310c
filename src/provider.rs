use std::{fmt::Debug, sync::Arc};

/// A lazily computed value. Every [`Provider::get`] re-runs the computation.
///
/// Clones share the same source. Nothing is evaluated until `get` is called,
/// in particular not when deriving a provider with [`Provider::map`].
pub struct Provider<T> {
    compute: Arc<dyn Fn() -> anyhow::Result<T> + Send + Sync>,
}

impl<T: 'static> Provider<T> {
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Provider {
            compute: Arc::new(compute),
        }
    }

    /// A provider yielding a fresh clone of `value` on each evaluation.
    pub fn of(value: T) -> Self
    where
        T: Clone + Send + Sync,
    {
        Provider::new(move || Ok(value.clone()))
    }

    pub fn get(&self) -> anyhow::Result<T> {
        (self.compute)()
    }

    pub fn map<U, F>(&self, transform: F) -> Provider<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let source = self.clone();
        Provider::new(move || source.get().map(&transform))
    }

    pub fn try_map<U, F>(&self, transform: F) -> Provider<U>
    where
        U: 'static,
        F: Fn(T) -> anyhow::Result<U> + Send + Sync + 'static,
    {
        let source = self.clone();
        Provider::new(move || source.get().and_then(&transform))
    }
}

impl<T> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Provider {
            compute: Arc::clone(&self.compute),
        }
    }
}

impl<T> Debug for Provider<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider").finish_non_exhaustive()
    }
}

/// Anything that can present its value lazily, such as a version catalog accessor.
pub trait ProviderConvertible<T> {
    fn as_provider(&self) -> Provider<T>;
}

impl<T> ProviderConvertible<T> for Provider<T> {
    fn as_provider(&self) -> Provider<T> {
        self.clone()
    }
}
