//! BDD step definitions for page extraction feature

use cucumber::{given, then, when};

use xp_sentinel::engine::read_snapshot;
use xp_sentinel::fields::normalize_int;

use crate::world::{profile_page, XpSentinelWorld};

#[given(expr = "a profile page with bootstrap XP {int} and displayed XP {string}")]
fn page_with_bootstrap_and_counter(world: &mut XpSentinelWorld, xp: i64, displayed: String) {
    let script = format!(
        r#"options.bootstrap = {{"object": {{"xp": {}, "level": 9, "leaderboard_rank": 120, "last_ping": "2024-01-02T03:04:05"}}}};"#,
        xp
    );
    world.document = Some(profile_page(Some(&script), Some(&displayed), None));
}

#[given(expr = "a profile page without a bootstrap object and displayed XP {string}")]
fn page_without_bootstrap(world: &mut XpSentinelWorld, displayed: String) {
    world.document = Some(profile_page(None, Some(&displayed), None));
}

#[given(expr = "a profile page with a malformed bootstrap object and displayed XP {string}")]
fn page_with_malformed_bootstrap(world: &mut XpSentinelWorld, displayed: String) {
    let script = r#"options.bootstrap = {"object": {"xp": 5, }"#;
    world.document = Some(profile_page(Some(script), Some(&displayed), None));
}

#[given("a profile page without a bootstrap object or displayed XP")]
fn page_without_xp(world: &mut XpSentinelWorld) {
    world.document = Some(profile_page(None, None, None));
}

#[given("a profile page whose bootstrap object contains undefined values")]
fn page_with_undefined(world: &mut XpSentinelWorld) {
    let script = r#"options.bootstrap = {"object": {"xp": 900, "leaderboard_rank": undefined, "bio": "{ undefined }"}};"#;
    world.document = Some(profile_page(Some(script), None, None));
}

#[given(expr = "a profile page with thumbnail {string}")]
fn page_with_thumbnail(world: &mut XpSentinelWorld, src: String) {
    world.document = Some(profile_page(None, Some("1"), Some(&src)));
}

#[when("the page is read")]
fn page_is_read(world: &mut XpSentinelWorld) {
    let document = world.document.as_ref().expect("document not set");
    world.snapshot = Some(read_snapshot(document));
}

#[when(expr = "the displayed value {string} is normalized")]
fn value_is_normalized(world: &mut XpSentinelWorld, text: String) {
    world.normalized = Some(normalize_int(&text));
}

#[then(expr = "the snapshot XP should be {int}")]
fn snapshot_xp_should_be(world: &mut XpSentinelWorld, expected: i64) {
    let snapshot = world.snapshot.as_ref().expect("no snapshot");
    assert_eq!(snapshot.xp, Some(expected));
}

#[then("the snapshot should have no XP")]
fn snapshot_has_no_xp(world: &mut XpSentinelWorld) {
    let snapshot = world.snapshot.as_ref().expect("no snapshot");
    assert_eq!(snapshot.xp, None);
}

#[then("the snapshot should have no rank")]
fn snapshot_has_no_rank(world: &mut XpSentinelWorld) {
    let snapshot = world.snapshot.as_ref().expect("no snapshot");
    assert_eq!(snapshot.rank, None);
}

#[then(expr = "the snapshot level should be {int} and rank {int}")]
fn snapshot_level_and_rank(world: &mut XpSentinelWorld, level: i64, rank: i64) {
    let snapshot = world.snapshot.as_ref().expect("no snapshot");
    assert_eq!(snapshot.level, Some(level));
    assert_eq!(snapshot.rank, Some(rank));
}

#[then(expr = "the snapshot last ping should be epoch {int}")]
fn snapshot_last_ping(world: &mut XpSentinelWorld, epoch: i64) {
    let snapshot = world.snapshot.as_ref().expect("no snapshot");
    assert_eq!(snapshot.last_ping_epoch, Some(epoch));
}

#[then(expr = "the snapshot title should be {string}")]
fn snapshot_title(world: &mut XpSentinelWorld, title: String) {
    let snapshot = world.snapshot.as_ref().expect("no snapshot");
    assert_eq!(snapshot.title.as_deref(), Some(title.as_str()));
}

#[then(expr = "the thumbnail should be {string}")]
fn thumbnail_should_be(world: &mut XpSentinelWorld, expected: String) {
    let snapshot = world.snapshot.as_ref().expect("no snapshot");
    assert_eq!(snapshot.thumbnail_url.as_deref(), Some(expected.as_str()));
}

#[then(expr = "the normalized value should be {string}")]
fn normalized_value_should_be(world: &mut XpSentinelWorld, expected: String) {
    let value = world.normalized.expect("nothing normalized");
    match expected.as_str() {
        "absent" => assert_eq!(value, None),
        number => assert_eq!(value, Some(number.parse::<i64>().unwrap())),
    }
}
