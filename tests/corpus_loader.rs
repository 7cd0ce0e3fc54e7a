//! CSV corpus loading through the filesystem
//!
//! Run: cargo test --test corpus_loader

mod helpers;

use std::fs;
use std::sync::Arc;

use helpers::{FailingSearch, Role, RoutingLlm};
use scribe_semantic::HashingEmbedder;
use sprint_scribe::corpus::{load_initiatives, load_work_items, EpicColumns, TicketColumns};
use sprint_scribe::{Corpus, CorpusError, ScribeContext, WorkflowController};
use tempfile::TempDir;

const TASKS: &str = "\
Issue Type,Issue key,Summary,Status,Parent key,Parent summary
Task,TF-11,Add login,Done,TF-1,Auth Epic
Task,TF-12,Add logout,In Progress,TF-1,Auth Epic
Task,TF-21,Provision staging cluster,To Do,TF-2,Platform Epic
";

const EPICS: &str = "\
Issue Type,Issue key,Summary,Status
Epic,TF-1,Auth Epic,In Progress
Epic,TF-2,Platform Epic,To Do
";

fn write_backlog() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("TF-Task.csv"), TASKS).unwrap();
    fs::write(dir.path().join("TF-EPIC.csv"), EPICS).unwrap();
    dir
}

#[test]
fn test_load_exported_backlog() {
    let dir = write_backlog();
    let items = load_work_items(&dir.path().join("TF-Task.csv"), &TicketColumns::default()).unwrap();
    let epics = load_initiatives(&dir.path().join("TF-EPIC.csv"), &EpicColumns::default()).unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(epics.len(), 2);
    assert_eq!(items[2].parent_key, "TF-2");
    assert!(items[0].body.contains("Status: Done"));
    assert!(items[0].body.starts_with("Issue Type: Task\nIssue key: TF-11"));

    let corpus = Corpus::new(items, epics);
    assert_eq!(corpus.initiative("TF-2").unwrap().summary, "Platform Epic");
}

#[test]
fn test_epics_file_used_as_tickets_reports_column() {
    let dir = write_backlog();
    let err = load_work_items(&dir.path().join("TF-EPIC.csv"), &TicketColumns::default())
        .unwrap_err();
    match err {
        CorpusError::MissingColumn { column, source_name } => {
            assert_eq!(column, "Parent key");
            assert!(source_name.ends_with("TF-EPIC.csv"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_loaded_backlog_drives_workflow() {
    let dir = write_backlog();
    let items = load_work_items(&dir.path().join("TF-Task.csv"), &TicketColumns::default()).unwrap();
    let epics = load_initiatives(&dir.path().join("TF-EPIC.csv"), &EpicColumns::default()).unwrap();

    let llm = Arc::new(RoutingLlm::new().paraphrases("staging environment").judgment("yes"));
    let ctx = ScribeContext::builder()
        .corpus(Corpus::new(items, epics))
        .llm(llm.clone())
        .embedder(Arc::new(HashingEmbedder::new(4096)))
        .web_search(Arc::new(FailingSearch))
        .build()
        .await
        .unwrap();

    let state = WorkflowController::new(&ctx)
        .run("provision a staging cluster")
        .await
        .unwrap();

    assert_eq!(state.resolved_initiative_key.as_deref(), Some("TF-2"));
    assert_eq!(state.resolved_initiative_summary.as_deref(), Some("Platform Epic"));
    let doc = state.extracted_items.unwrap().document().unwrap();
    assert_eq!(doc.entries()[0].items[0].name, "Provision staging cluster");
    assert_eq!(llm.count(Role::Judge), 1);
}
