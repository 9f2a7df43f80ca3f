//! Integration tests for materialization against real git repositories.
//!
//! Each test builds `file://` remotes with the `git` binary, writes a triage
//! file, reads it back and pulls through the library exactly as the `pull`
//! command does.

mod common;

use common::prelude::*;

use codetriage::git;
use codetriage::intent::RepositoryIntent;
use codetriage::materialize::{Checkout, Materializer, Outcome, Report, SkipReason};
use codetriage::record::Record;
use codetriage::schema::Schema;
use codetriage::tabular::TabularStore;

fn pull(fixture: &TestFixture, records: &[Record]) -> Vec<Report> {
    let path = fixture.triage_file("triage.csv", records);
    let intents: Vec<RepositoryIntent> = TabularStore::new(Schema::triage())
        .read(&path)
        .unwrap()
        .records()
        .unwrap()
        .iter()
        .map(|record| RepositoryIntent::from_record(record).unwrap())
        .collect();

    Materializer::new(fixture.destination()).materialize_all(intents)
}

#[test]
fn test_branch_and_tag_rows() {
    require_git!();
    let fixture = TestFixture::new();
    let r1 = fixture
        .remote("r1", "main")
        .commit("first")
        .branch("main2");
    let r2 = fixture
        .remote("r2", "main")
        .commit("first")
        .annotated_tag("0.0.1")
        .commit("second");

    let reports = pull(
        &fixture,
        &[
            triage_row("r1", "Y", "main2", "main", &r1.url()),
            triage_row("r2", "Y", "0.0.1", "main", &r2.url()),
        ],
    );

    let r1_dir = fixture.destination().join("r1");
    assert_eq!(
        reports[0].outcome,
        Outcome::Materialized(Checkout::Branch("main2".to_string()))
    );
    assert_eq!(git::current_branch(&r1_dir).unwrap().as_deref(), Some("main2"));
    assert_eq!(git::head_commit(&r1_dir).unwrap(), r1.commit_of("main2"));

    let r2_dir = fixture.destination().join("r2");
    let tag_commit = r2.commit_of("refs/tags/0.0.1");
    assert_eq!(
        reports[1].outcome,
        Outcome::Materialized(Checkout::DetachedTag {
            tag: "0.0.1".to_string(),
            commit: tag_commit.clone(),
        })
    );
    assert_eq!(git::current_branch(&r2_dir).unwrap(), None);
    assert_eq!(git::head_commit(&r2_dir).unwrap(), tag_commit);
    assert_ne!(tag_commit, r2.commit_of("main"));
}

#[test]
fn test_lightweight_tag() {
    require_git!();
    let fixture = TestFixture::new();
    let remote = fixture
        .remote("light", "main")
        .commit("first")
        .lightweight_tag("v1")
        .commit("second");

    let reports = pull(&fixture, &[triage_row("light", "yes", "v1", "main", &remote.url())]);

    assert!(reports[0].is_materialized());
    let dir = fixture.destination().join("light");
    assert_eq!(git::head_commit(&dir).unwrap(), remote.commit_of("v1"));
}

#[test]
fn test_tag_pointing_at_tag_resolves_to_commit() {
    require_git!();
    let fixture = TestFixture::new();
    let remote = fixture
        .remote("nested", "main")
        .commit("first")
        .annotated_tag("inner")
        .tag_of_tag("outer", "inner")
        .commit("second");

    let reports = pull(&fixture, &[triage_row("nested", "Y", "outer", "main", &remote.url())]);

    assert!(reports[0].is_materialized(), "{:?}", reports[0]);
    let dir = fixture.destination().join("nested");
    assert_eq!(git::head_commit(&dir).unwrap(), remote.commit_of("inner"));
}

#[test]
fn test_wildcard_creates_every_branch() {
    require_git!();
    let fixture = TestFixture::new();
    let remote = fixture
        .remote("r5", "a")
        .commit("first")
        .branch("b")
        .branch("c");

    let reports = pull(&fixture, &[triage_row("r5", "Y", "*", "a", &remote.url())]);

    assert_eq!(
        reports[0].outcome,
        Outcome::Materialized(Checkout::AllBranches {
            created: 2,
            total: 3
        })
    );
    let dir = fixture.destination().join("r5");
    let mut branches = git::local_branches(&dir).unwrap();
    branches.sort();
    assert_eq!(branches, vec!["a", "b", "c"]);

    for branch in ["a", "b", "c"] {
        assert_eq!(
            common::git(&dir, &["rev-parse", &format!("refs/heads/{}", branch)]),
            remote.commit_of(branch),
            "branch {}",
            branch
        );
    }
    assert_ne!(remote.commit_of("b"), remote.commit_of("c"));
}

#[test]
fn test_branch_wins_over_tag_with_same_name() {
    require_git!();
    let fixture = TestFixture::new();
    let remote = fixture
        .remote("both", "main")
        .commit("first")
        .branch("x")
        .lightweight_tag("x");
    let branch_commit = remote.commit_of("refs/heads/x");
    assert_ne!(branch_commit, remote.commit_of("refs/tags/x"));

    let reports = pull(&fixture, &[triage_row("both", "Y", "x", "main", &remote.url())]);

    assert_eq!(
        reports[0].outcome,
        Outcome::Materialized(Checkout::Branch("x".to_string()))
    );
    let dir = fixture.destination().join("both");
    assert_eq!(git::current_branch(&dir).unwrap().as_deref(), Some("x"));
    assert_eq!(git::head_commit(&dir).unwrap(), branch_commit);
}

#[test]
fn test_revision_suffix_is_not_a_tag() {
    require_git!();
    let fixture = TestFixture::new();
    let remote = fixture
        .remote("rx", "main")
        .commit("first")
        .commit("second")
        .lightweight_tag("v2");

    let reports = pull(
        &fixture,
        &[
            triage_row("rx", "Y", "v2~1", "main", &remote.url()),
            triage_row("ry", "Y", "v2^", "main", &remote.url()),
        ],
    );

    assert_eq!(
        reports[0].outcome,
        Outcome::Skipped(SkipReason::NoSuchRef("v2~1".to_string()))
    );
    assert_eq!(
        reports[1].outcome,
        Outcome::Skipped(SkipReason::NoSuchRef("v2^".to_string()))
    );
    assert!(!fixture.destination().join("rx").exists());
    assert!(!fixture.destination().join("ry").exists());
}

#[test]
fn test_remote_head_is_not_a_branch() {
    require_git!();
    let fixture = TestFixture::new();
    let remote = fixture.remote("rh", "main").commit("first");

    let reports = pull(&fixture, &[triage_row("rh", "Y", "HEAD", "main", &remote.url())]);

    assert_eq!(
        reports[0].outcome,
        Outcome::Skipped(SkipReason::NoSuchRef("HEAD".to_string()))
    );
    assert!(!fixture.destination().join("rh").exists());
}

#[test]
fn test_unresolvable_token_cleans_up_and_continues() {
    require_git!();
    let fixture = TestFixture::new();
    let r3 = fixture.remote("r3", "main").commit("first");
    let r4 = fixture.remote("r4", "main").commit("first");

    let reports = pull(
        &fixture,
        &[
            triage_row("r3", "Y", "does-not-exist", "main", &r3.url()),
            triage_row("r4", "Y", "", "main", &r4.url()),
        ],
    );

    assert_eq!(
        reports[0].outcome,
        Outcome::Skipped(SkipReason::NoSuchRef("does-not-exist".to_string()))
    );
    assert!(!fixture.destination().join("r3").exists());

    assert_eq!(
        reports[1].outcome,
        Outcome::Materialized(Checkout::Branch("main".to_string()))
    );
    assert_eq!(
        git::current_branch(&fixture.destination().join("r4"))
            .unwrap()
            .as_deref(),
        Some("main")
    );
}

#[test]
fn test_unreachable_remote_cleans_up() {
    require_git!();
    let fixture = TestFixture::new();
    let missing = format!("file://{}", fixture.path().join("nowhere").display());

    let reports = pull(&fixture, &[triage_row("gone", "Y", "", "main", &missing)]);

    assert!(matches!(
        reports[0].outcome,
        Outcome::Skipped(SkipReason::Failed(_))
    ));
    assert!(!fixture.destination().join("gone").exists());
}

#[test]
fn test_pull_flag_gating() {
    require_git!();
    let fixture = TestFixture::new();
    let remote = fixture.remote("gated", "main").commit("first");

    let reports = pull(
        &fixture,
        &[
            triage_row("gated", "", "", "main", &remote.url()),
            triage_row("gated", "n", "", "main", &remote.url()),
            triage_row("gated", "No", "main", "main", &remote.url()),
        ],
    );

    for report in &reports {
        assert_eq!(report.outcome, Outcome::Skipped(SkipReason::NotRequested));
    }
    assert!(!fixture.destination().exists());
}

#[test]
fn test_empty_repository_is_pulled() {
    require_git!();
    let fixture = TestFixture::new();
    let remote = fixture.remote("codetriage_empty", "main");

    let reports = pull(
        &fixture,
        &[triage_row("codetriage_empty", "Y", "", "", &remote.url())],
    );

    assert_eq!(reports[0].outcome, Outcome::Materialized(Checkout::Default));
    assert!(fixture.destination().join("codetriage_empty").is_dir());
}

#[test]
fn test_existing_destination_is_not_touched() {
    require_git!();
    let fixture = TestFixture::new();
    let remote = fixture.remote("kept", "main").commit("first");
    let existing = fixture.destination().join("kept");
    std::fs::create_dir_all(&existing).unwrap();
    std::fs::write(existing.join("local-notes.md"), "mine").unwrap();

    let reports = pull(&fixture, &[triage_row("kept", "Y", "", "main", &remote.url())]);

    assert_eq!(
        reports[0].outcome,
        Outcome::Skipped(SkipReason::DestinationExists)
    );
    assert_eq!(
        std::fs::read_to_string(existing.join("local-notes.md")).unwrap(),
        "mine"
    );
    assert!(!existing.join(".git").exists());
}
