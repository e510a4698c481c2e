use arrayvec::ArrayVec;

/// The `N` largest values pushed so far, always sorted descending.
/// Equal values are kept side by side, so duplicates count with multiplicity.
#[derive(Debug, Clone)]
pub struct TopN<T, const N: usize> {
    values: ArrayVec<T, N>,
}

impl<T: Ord, const N: usize> TopN<T, N> {
    pub fn new() -> Self {
        Self {
            values: ArrayVec::new(),
        }
    }

    pub fn push(&mut self, value: T) {
        let pos = self
            .values
            .iter()
            .position(|v| *v < value)
            .unwrap_or(self.values.len());

        if pos == N {
            return;
        }

        if self.values.is_full() {
            self.values.pop();
        }
        self.values.insert(pos, value);
    }

    /// Largest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }
}
