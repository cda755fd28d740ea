//! Integration tests for the tag/undo protocol.
//!
//! Tests cover:
//! - Merge of one key per VM with before/after snapshots
//! - Skipping VMs that already carry the key
//! - Per-VM failures not aborting the batch
//! - Simulate mode
//! - Undo by full replace, including via the CSV artifact

mod common;

use azfleet::core::exporter::{read_tag_csv, write_tag_csv};
use azfleet::core::tagger::{apply_tag, TagRequest};
use azfleet::core::undo::replay_undo;
use azfleet::services::provider::Mutation;
use common::{tags, temp_log, vm, FakeProvider};
use tempfile::TempDir;

fn owner_alice() -> TagRequest {
    TagRequest {
        key: "owner".to_string(),
        value: "alice".to_string(),
    }
}

#[tokio::test]
async fn test_tag_two_vms_and_undo() {
    let provider = FakeProvider::new()
        .with_vm(vm("a", &[]), tags(&[]))
        .with_vm(vm("b", &[]), tags(&[("env", "prod")]));
    let (_dir, _path, mut log) = temp_log();

    let outcome = apply_tag(&provider, &provider.vms(), &owner_alice(), false, &mut log).await;

    assert_eq!(outcome.changes.len(), 2);
    assert!(outcome.skipped.is_empty());
    assert!(outcome.failed.is_empty());

    assert_eq!(outcome.changes[0].resource_id, "/vm/a");
    assert_eq!(outcome.changes[0].old_tags, tags(&[]));
    assert_eq!(outcome.changes[0].new_tags, tags(&[("owner", "alice")]));
    assert_eq!(outcome.changes[1].old_tags, tags(&[("env", "prod")]));
    assert_eq!(
        outcome.changes[1].new_tags,
        tags(&[("env", "prod"), ("owner", "alice")])
    );

    // CSV has one row per change
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("TaggedVMs_test.csv");
    write_tag_csv(&csv_path, &outcome.changes).unwrap();
    let content = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(content.lines().count(), 3);

    // Undo replaces with the literal pre-change maps
    let changes = read_tag_csv(&csv_path).unwrap();
    let result = replay_undo(&provider, &changes, false, &mut log).await;
    assert!(result.is_success());
    assert_eq!(result.success_count, 2);

    let applied = provider.applied();
    assert_eq!(
        &applied[2..],
        &[
            Mutation::ReplaceTags {
                resource_id: "/vm/a".to_string(),
                tags: tags(&[]),
            },
            Mutation::ReplaceTags {
                resource_id: "/vm/b".to_string(),
                tags: tags(&[("env", "prod")]),
            },
        ]
    );
    assert_eq!(provider.tags_of("/vm/a"), tags(&[]));
    assert_eq!(provider.tags_of("/vm/b"), tags(&[("env", "prod")]));
}

#[tokio::test]
async fn test_undo_is_idempotent_and_keeps_all_original_tags() {
    let original = tags(&[("env", "prod"), ("cost-center", "42"), ("team", "infra")]);
    let provider = FakeProvider::new().with_vm(vm("a", &[]), original.clone());
    let (_dir, _path, mut log) = temp_log();

    let outcome = apply_tag(&provider, &provider.vms(), &owner_alice(), false, &mut log).await;
    assert_eq!(provider.tags_of("/vm/a").len(), 4);

    replay_undo(&provider, &outcome.changes, false, &mut log).await;
    assert_eq!(provider.tags_of("/vm/a"), original);

    replay_undo(&provider, &outcome.changes, false, &mut log).await;
    assert_eq!(provider.tags_of("/vm/a"), original);
}

#[tokio::test]
async fn test_vm_with_key_is_skipped_without_mutation() {
    let provider = FakeProvider::new()
        .with_vm(vm("a", &[]), tags(&[("owner", "bob")]))
        .with_vm(vm("b", &[]), tags(&[]));
    let (_dir, _path, mut log) = temp_log();

    let outcome = apply_tag(&provider, &provider.vms(), &owner_alice(), false, &mut log).await;

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].name, "a");
    assert_eq!(outcome.changes.len(), 1);
    assert_eq!(outcome.changes[0].vm_name, "b");

    // Only b was touched, and a keeps its value
    assert_eq!(provider.applied().len(), 1);
    assert_eq!(provider.tags_of("/vm/a").get("owner"), Some("bob"));
}

#[tokio::test]
async fn test_failures_do_not_abort_batch() {
    let provider = FakeProvider::new()
        .with_vm(vm("a", &[]), tags(&[]))
        .with_vm(vm("b", &[]), tags(&[]))
        .with_vm(vm("c", &[]), tags(&[]))
        .fail_get_tags("/vm/a")
        .fail_apply("/vm/b");
    let (_dir, path, mut log) = temp_log();

    let outcome = apply_tag(&provider, &provider.vms(), &owner_alice(), false, &mut log).await;

    assert_eq!(outcome.failed.len(), 2);
    assert_eq!(outcome.failed[0].0.name, "a");
    assert_eq!(outcome.failed[1].0.name, "b");
    assert_eq!(outcome.changes.len(), 1);
    assert_eq!(outcome.changes[0].vm_name, "c");

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("Failed to read tags for a"));
    assert!(content.contains(
        "Command failed: az tag update --resource-id /vm/b --operation Merge --tags owner=alice"
    ));
}

#[tokio::test]
async fn test_selection_order_is_preserved() {
    let provider = FakeProvider::new()
        .with_vm(vm("a", &[]), tags(&[]))
        .with_vm(vm("b", &[]), tags(&[]));
    let (_dir, _path, mut log) = temp_log();

    let mut selected = provider.vms();
    selected.reverse();
    let outcome = apply_tag(&provider, &selected, &owner_alice(), false, &mut log).await;

    let names: Vec<_> = outcome.changes.iter().map(|c| c.vm_name.as_str()).collect();
    assert_eq!(names, vec!["b", "a"]);
}

#[tokio::test]
async fn test_dry_run_issues_no_mutation() {
    let provider = FakeProvider::new()
        .with_vm(vm("a", &[]), tags(&[]))
        .with_vm(vm("b", &[]), tags(&[("env", "prod")]));
    let (_dir, path, mut log) = temp_log();

    let outcome = apply_tag(&provider, &provider.vms(), &owner_alice(), true, &mut log).await;

    assert!(provider.applied().is_empty());
    assert_eq!(provider.tags_of("/vm/a"), tags(&[]));

    // Same records a real run would produce
    assert_eq!(outcome.changes.len(), 2);
    assert_eq!(
        outcome.changes[1].new_tags,
        tags(&[("env", "prod"), ("owner", "alice")])
    );

    let result = replay_undo(&provider, &outcome.changes, true, &mut log).await;
    assert_eq!(result.success_count, 2);
    assert!(provider.applied().is_empty());

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.matches("WhatIf: would run: az tag update").count(), 3);
    assert!(content.contains("WhatIf: would run: az tag delete --resource-id /vm/a --yes"));
}

#[tokio::test]
async fn test_undo_failure_continues() {
    let provider = FakeProvider::new()
        .with_vm(vm("a", &[]), tags(&[("env", "dev")]))
        .with_vm(vm("b", &[]), tags(&[("env", "prod")]));
    let (_dir, path, mut log) = temp_log();

    let outcome = apply_tag(&provider, &provider.vms(), &owner_alice(), false, &mut log).await;

    let provider = FakeProvider::new()
        .with_vm(vm("a", &[]), outcome.changes[0].new_tags.clone())
        .with_vm(vm("b", &[]), outcome.changes[1].new_tags.clone())
        .fail_apply("/vm/a");

    let result = replay_undo(&provider, &outcome.changes, false, &mut log).await;

    assert!(!result.is_success());
    assert_eq!(result.error_count, 1);
    assert_eq!(result.success_count, 1);
    assert!(result.errors[0].starts_with("a:"));
    assert_eq!(provider.tags_of("/vm/b"), tags(&[("env", "prod")]));

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("Command failed: az tag update --resource-id /vm/a --operation Replace --tags env=dev"));
}
