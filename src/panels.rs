use crate::errors::ApiError;

/// One independently loading region of a section: data, loading flag, error text.
#[derive(Debug, Clone)]
pub struct Panel<T> {
    data: Option<T>,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl<T> Default for Panel<T> {
    fn default() -> Self {
        Panel {
            data: None,
            loading: false,
            error: None,
            generation: 0,
        }
    }
}

impl<T> Panel<T> {
    /// Marks a load for `generation` as started. Cached data stays visible meanwhile.
    pub fn begin(&mut self, generation: u64) {
        self.generation = generation;
        self.loading = true;
        self.error = None;
    }

    /// Applies a finished load unless a newer one was started since. Returns whether it
    /// was applied.
    pub fn finish(&mut self, generation: u64, result: Result<T, ApiError>, fallback: &str) -> bool {
        if generation != self.generation {
            log::debug!(
                "dropping stale panel result (gen {} != {})",
                generation,
                self.generation
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(err) => {
                log::warn!("{}: {}", fallback, err);
                self.error = Some(err.user_message(fallback));
            }
        }
        true
    }

    pub fn set(&mut self, data: T) {
        self.data = Some(data);
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.data.as_mut()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

/// Single-record edits on a cached list, keyed by record id.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl<T: Keyed> Panel<Vec<T>> {
    /// Appends to a loaded list; false when nothing is cached yet, since a list holding
    /// only the new record would pass for the whole collection.
    pub fn insert(&mut self, record: T) -> bool {
        let Some(items) = self.data.as_mut() else {
            return false;
        };
        items.push(record);
        true
    }

    /// Replaces the record with the same id; false when it is not cached.
    pub fn replace(&mut self, record: T) -> bool {
        let Some(slot) = self
            .data
            .as_mut()
            .and_then(|items| items.iter_mut().find(|item| item.key() == record.key()))
        else {
            return false;
        };
        *slot = record;
        true
    }

    /// Removes the record with `id`; false when it is not cached.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(items) = self.data.as_mut() else {
            return false;
        };
        let before = items.len();
        items.retain(|item| item.key() != id);
        items.len() != before
    }

    pub fn items(&self) -> &[T] {
        self.data.as_deref().unwrap_or_default()
    }
}
