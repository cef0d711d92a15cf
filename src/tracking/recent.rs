/// The two most recent values of a tracked quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecentPair<T> {
    pub previous: Option<T>,
    pub current: Option<T>,
}

impl<T: Copy> RecentPair<T> {
    pub const fn empty() -> Self {
        Self {
            previous: None,
            current: None,
        }
    }

    /// Moves `current` into `previous` and stores `value` as the new current.
    pub fn shift(&mut self, value: Option<T>) {
        self.previous = self.current;
        self.current = value;
    }

    #[allow(dead_code)]
    pub fn has_none(&self) -> bool {
        self.previous.is_none() || self.current.is_none()
    }

    pub fn both(&self) -> Option<(T, T)> {
        Some((self.previous?, self.current?))
    }
}

impl<T: Copy> Default for RecentPair<T> {
    fn default() -> Self {
        Self::empty()
    }
}
