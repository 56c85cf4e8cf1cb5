//! BDD step definitions for notification feature

use std::sync::Arc;

use chrono::Utc;
use cucumber::{given, then, when};

use xp_sentinel::config::WebhookConfig;
use xp_sentinel::embed::build_embed;
use xp_sentinel::engine::{dispatch_notification, WatchSettings};
use xp_sentinel::io::HttpClient;
use xp_sentinel::notifier::{Notifier, WebhookPayload};
use xp_sentinel::snapshot::ProfileSnapshot;
use xp_sentinel::state::{MonitorState, XpChange};
use xp_sentinel::webhook::WebhookNotifier;

use crate::world::{RecordingHttpClient, XpSentinelWorld};

const HOOK_URL: &str = "https://discord.example/api/webhooks/1/token";

#[given(expr = "a snapshot titled {string} with level {int} and rank {int}")]
fn titled_snapshot(world: &mut XpSentinelWorld, title: String, level: i64, rank: i64) {
    world.snapshot = Some(ProfileSnapshot {
        title: Some(title),
        level: Some(level),
        rank: Some(rank),
        ..ProfileSnapshot::default()
    });
}

#[given("an empty snapshot")]
fn empty_snapshot(world: &mut XpSentinelWorld) {
    world.snapshot = Some(ProfileSnapshot::default());
}

#[given(expr = "the snapshot was last pinged at epoch {int}")]
fn snapshot_pinged(world: &mut XpSentinelWorld, epoch: i64) {
    world
        .snapshot
        .get_or_insert_with(ProfileSnapshot::default)
        .last_ping_epoch = Some(epoch);
}

#[given(expr = "the mention id {string}")]
fn mention_id(world: &mut XpSentinelWorld, id: String) {
    world.mention_id = Some(id);
}

#[given(expr = "a webhook that responds with status {int}")]
fn webhook_with_status(world: &mut XpSentinelWorld, status: u16) {
    world.http = Some(Arc::new(RecordingHttpClient::new(status)));
}

#[when(expr = "a change from {int} to {int} is rendered for profile {string}")]
fn change_rendered(world: &mut XpSentinelWorld, before: i64, after: i64, profile_id: String) {
    let snapshot = world.snapshot.clone().unwrap_or_default();
    let url = format!("https://www.kogama.com/profile/{}/", profile_id);
    world.embed = Some(build_embed(
        &snapshot,
        &profile_id,
        &url,
        XpChange { before, after },
        0x5865F2,
        Utc::now(),
    ));
}

#[when(expr = "a change with delta {int} is dispatched")]
async fn change_dispatched(world: &mut XpSentinelWorld, delta: i64) {
    let settings = WatchSettings {
        mention_id: world.mention_id.clone(),
        ..WatchSettings::default()
    };
    let notifier = world.notifier();
    let state = MonitorState::new("668461", 0x5865F2);
    let change = XpChange {
        before: 10_000,
        after: 10_000 + delta,
    };

    world.delivery_result = Some(
        dispatch_notification(
            &state,
            &ProfileSnapshot::default(),
            change,
            "https://www.kogama.com/profile/668461/",
            notifier.as_ref(),
            &settings,
        )
        .await,
    );
}

#[when("a payload is delivered")]
async fn payload_delivered(world: &mut XpSentinelWorld) {
    let http = world.http.clone().expect("webhook not set");
    let config = WebhookConfig {
        url: HOOK_URL.to_string(),
        ..WebhookConfig::default()
    };
    let notifier = WebhookNotifier::new(&config, http as Arc<dyn HttpClient>);

    let embed = build_embed(
        &ProfileSnapshot::default(),
        "668461",
        "https://www.kogama.com/profile/668461/",
        XpChange {
            before: 1,
            after: 2,
        },
        1,
        Utc::now(),
    );
    world.delivery_result = Some(notifier.notify(&WebhookPayload::new(embed, None)).await);
}

#[then(expr = "the embed title should be {string}")]
fn embed_title(world: &mut XpSentinelWorld, expected: String) {
    let embed = world.embed.as_ref().expect("no embed rendered");
    assert_eq!(embed.title, expected);
}

#[then(expr = "the embed field {string} should be {string}")]
fn embed_field(world: &mut XpSentinelWorld, name: String, expected: String) {
    let embed = world.embed.as_ref().expect("no embed rendered");
    let field = embed
        .fields
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("no field named {}", name));
    assert_eq!(field.value, expected);
}

#[then(expr = "the embed should have no field {string}")]
fn embed_missing_field(world: &mut XpSentinelWorld, name: String) {
    let embed = world.embed.as_ref().expect("no embed rendered");
    assert!(embed.fields.iter().all(|f| f.name != name));
}

#[then("the embed should have no thumbnail")]
fn embed_without_thumbnail(world: &mut XpSentinelWorld) {
    let embed = world.embed.as_ref().expect("no embed rendered");
    assert!(embed.thumbnail.is_none());
}

#[then(regex = r"^the payload (should|should not) mention the user$")]
async fn payload_mention(world: &mut XpSentinelWorld, outcome: String) {
    let notifier = world.notifier();
    let payloads = notifier.payloads.read().await;
    let payload = payloads.last().expect("nothing dispatched");
    let expected = world.mention_id.as_ref().map(|id| format!("<@{}>", id));

    match outcome.as_str() {
        "should" => assert_eq!(payload.content, expected),
        _ => assert_eq!(payload.content, None),
    }
}

#[then("the delivery should succeed")]
fn delivery_succeeds(world: &mut XpSentinelWorld) {
    let result = world.delivery_result.as_ref().expect("nothing delivered");
    result.as_ref().unwrap();
}

#[then(expr = "the delivery should fail with {string}")]
fn delivery_fails(world: &mut XpSentinelWorld, expected: String) {
    let result = world.delivery_result.as_ref().expect("nothing delivered");
    let err = result.as_ref().unwrap_err();
    assert!(
        err.to_string().contains(&expected),
        "expected '{}' in '{}'",
        expected,
        err
    );
}

#[then(expr = "the webhook should have received {int} JSON request(s)")]
async fn webhook_requests(world: &mut XpSentinelWorld, expected: usize) {
    let http = world.http.clone().expect("webhook not set");
    let requests = http.requests.read().await;
    assert_eq!(requests.len(), expected);
    for request in requests.iter() {
        assert_eq!(request.method, "POST");
        assert_eq!(request.url, HOOK_URL);
        let body = request.body.as_ref().expect("POST without body");
        assert!(body["embeds"].is_array());
    }
}
