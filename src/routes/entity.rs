//! Entity routes built from the resolved model.
//! Each path segment gets only the methods its operations allow; the entity travels to the handler as an extension.

use crate::config::Operation;
use crate::handlers::entity::{create, list, read};
use crate::state::AppState;
use axum::{routing::get, routing::MethodRouter, Extension, Router};

pub fn entity_routes(state: AppState) -> Router {
    let mut router = Router::new();
    for entity in &state.model.entities {
        let mut collection: MethodRouter<AppState> = MethodRouter::new();
        let mut has_collection = false;
        if entity.allows(Operation::List) {
            collection = collection.get(list);
            has_collection = true;
        }
        if entity.allows(Operation::Create) {
            collection = collection.post(create);
            has_collection = true;
        }
        if has_collection {
            router = router.route(
                &format!("/{}", entity.path_segment),
                collection.layer(Extension(entity.clone())),
            );
        }
        if entity.allows(Operation::Read) {
            router = router.route(
                &format!("/{}/:id", entity.path_segment),
                get(read).layer(Extension(entity.clone())),
            );
        }
        tracing::debug!(path = %entity.path_segment, table = %entity.table_name, ops = ?entity.operations, "mounted entity");
    }
    router.with_state(state)
}
