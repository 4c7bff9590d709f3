use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use actions::Actions;
use assist::MockAssistant;
use storage::MemoryStore;

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

pub fn unique_id(prefix: &str) -> String {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}", prefix, id)
}

/// A fresh endpoint set over its own in-memory store and mock assistant.
pub fn actions_fixture() -> (Actions, MemoryStore, MockAssistant) {
    let store = MemoryStore::new();
    let assistant = MockAssistant::new();
    let actions = Actions::new(Arc::new(store.clone()), Arc::new(assistant.clone()));
    (actions, store, assistant)
}

/// An endpoint set with `lanes` timelines already created; returns the lane
/// ids in numbering order.
pub async fn seeded_board(lanes: usize) -> (Actions, MemoryStore, Vec<String>) {
    let (actions, store, _) = actions_fixture();
    let mut lane_ids = Vec::with_capacity(lanes);
    for _ in 0..lanes {
        let lane = actions
            .add_timeline()
            .await
            .expect("seeding timeline on a fresh in-memory store");
        lane_ids.push(lane.id);
    }
    (actions, store, lane_ids)
}
