use shared::{Classification, Coordinate, LocationResult};

/// The two result collections of the last successful search.
///
/// `replace` is the only writer and bumps `version` on every call. A version
/// of zero means no search has completed yet, which the results panel shows
/// as its waiting state.
#[derive(Default)]
pub struct ResultStore {
    best: Vec<LocationResult>,
    danger: Vec<LocationResult>,
    version: u64,
}

impl ResultStore {
    pub fn replace(&mut self, best: Vec<LocationResult>, danger: Vec<LocationResult>) {
        self.best = best;
        self.danger = danger;
        self.version += 1;
    }

    pub fn best(&self) -> &[LocationResult] {
        &self.best
    }

    pub fn danger(&self) -> &[LocationResult] {
        &self.danger
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty() && self.danger.is_empty()
    }

    pub fn entries(&self, kind: Classification) -> &[LocationResult] {
        match kind {
            Classification::Good => &self.best,
            Classification::Danger => &self.danger,
        }
    }

    pub fn entry(&self, kind: Classification, index: usize) -> Option<&LocationResult> {
        self.entries(kind).get(index)
    }

    pub fn center(&self) -> Coordinate {
        shared::map_center(&self.best, &self.danger)
    }
}
