//! Architectural Contract Test: Tag Resolution
//!
//! This test verifies the tag resolver's remote-call discipline.
//!
//! Constraints verified:
//! - A name already present in the service resolves by lookup, with no
//!   create attempt
//! - A duplicate-create rejection is treated as "already exists" and
//!   resolved by re-querying the listing
//! - Resolutions are memoized per run: a repeated name costs no further
//!   remote calls
//!
//! If this test fails, tag handling is either racing the service or
//! hammering it with redundant listings.

mod common;

use common::*;
use kuma_core::{Session, TagResolver};

async fn connect(service: &MockMonitorService) -> Session<MockMonitorService> {
    Session::connect(
        MockMonitorService::sharing_state_with(service),
        "admin",
        "secret",
    )
    .await
    .expect("login succeeds")
}

#[tokio::test]
async fn existing_tag_resolves_without_a_create() {
    let service = MockMonitorService::new();
    let seeded = service.seed_tag("traefik");
    let session = connect(&service).await;

    let mut resolver = TagResolver::new();
    let id = resolver
        .get_or_create(&session, "traefik")
        .await
        .expect("resolution succeeds");

    assert_eq!(id, seeded);
    assert_eq!(service.write_count(), 0, "lookup must not create anything");
}

#[tokio::test]
async fn duplicate_create_is_resolved_by_requery() {
    let service = MockMonitorService::new();
    // The tag exists, but the first listing misses it, as when another
    // writer creates it between the listing and the create attempt.
    let seeded = service.seed_tag("edge");
    service.hide_tags_once();
    let session = connect(&service).await;

    let mut resolver = TagResolver::new();
    let id = resolver
        .get_or_create(&session, "edge")
        .await
        .expect("duplicate create must resolve, not fail");

    assert_eq!(id, seeded, "the re-query must yield the existing id");
    assert_eq!(
        service.tags_count(),
        2,
        "one missed listing plus one re-query after the rejected create"
    );
    assert_eq!(
        service.tag_id("edge"),
        Some(seeded),
        "no second tag row may exist for the name"
    );
}

#[tokio::test]
async fn repeated_resolution_is_served_from_cache() {
    let service = MockMonitorService::new();
    let session = connect(&service).await;

    let mut resolver = TagResolver::new();
    let first = resolver.get_or_create(&session, "lab").await.unwrap();
    let listings = service.tags_count();
    let writes = service.write_count();

    let second = resolver.get_or_create(&session, "lab").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        service.tags_count(),
        listings,
        "a cached name must not hit the listing again"
    );
    assert_eq!(service.write_count(), writes, "and must not create again");
}
