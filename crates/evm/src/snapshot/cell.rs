/// A single overlay value.
///
/// `Loaded` values were read from the accessor and are never journaled.
/// `Written` values came from a setter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Cell<T> {
    Unloaded,
    Loaded(T),
    Written(T),
}

impl<T> Default for Cell<T> {
    fn default() -> Self {
        Self::Unloaded
    }
}

impl<T> Cell<T> {
    pub(crate) const fn get(&self) -> Option<&T> {
        match self {
            Self::Unloaded => None,
            Self::Loaded(value) | Self::Written(value) => Some(value),
        }
    }

    pub(crate) const fn written(&self) -> Option<&T> {
        match self {
            Self::Written(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) const fn is_unloaded(&self) -> bool {
        matches!(self, Self::Unloaded)
    }

    /// Fill an unloaded cell. Loaded and written cells are left alone.
    pub(crate) fn load(&mut self, value: T) {
        if self.is_unloaded() {
            *self = Self::Loaded(value);
        }
    }
}
