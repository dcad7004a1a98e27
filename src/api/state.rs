use crate::store::SnapshotStore;

#[derive(Clone)]
pub struct AppState {
    pub store: SnapshotStore,
}

impl AppState {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }
}
