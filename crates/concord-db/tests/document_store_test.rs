//! Repository tests against a live PostgreSQL database.
//!
//! Run with `cargo test -p concord-db -- --ignored` after pointing
//! `DATABASE_URL` at a disposable database.

use concord_db::test_fixtures::connect_test_database;
use concord_db::{
    CreateDocumentRequest, Database, DocumentStatus, DocumentStore, Error, ExtractedParagraph,
    InconsistencyType, NewInconsistency, Severity,
};
use uuid::Uuid;

async fn setup() -> Database {
    dotenvy::dotenv().ok();
    connect_test_database()
        .await
        .expect("Failed to connect to test database")
}

fn paragraphs(texts: &[&str]) -> Vec<ExtractedParagraph> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| ExtractedParagraph::new(i, t.to_string(), format!("<b>{}</b>", t)))
        .collect()
}

async fn ready_document(db: &Database, project_id: Uuid, title: &str) -> Uuid {
    let doc = db
        .create_document(CreateDocumentRequest {
            project_id,
            title: title.to_string(),
            original_filename: format!("{}.docx", title),
        })
        .await
        .unwrap();
    db.insert_paragraphs(doc.id, &paragraphs(&["alpha", "beta"]))
        .await
        .unwrap();
    db.update_document_status(doc.id, DocumentStatus::Ready)
        .await
        .unwrap();
    doc.id
}

fn finding(
    project_id: Uuid,
    source: Uuid,
    target: Uuid,
    severity: Severity,
    description: &str,
) -> NewInconsistency {
    NewInconsistency {
        project_id,
        source_document_id: source,
        target_document_id: target,
        inconsistency_type: InconsistencyType::Contradiction,
        severity,
        description: description.to_string(),
        explanation: String::new(),
        recommendation: String::new(),
        source_excerpt: "alpha".to_string(),
        target_excerpt: "beta".to_string(),
        source_paragraph_index: 0,
        source_start_offset: 0,
        source_end_offset: 5,
        target_paragraph_index: 1,
        target_start_offset: 0,
        target_end_offset: 4,
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_project_round_trip_and_counts() {
    let db = setup().await;
    let project = db.create_project("Vendor contracts").await.unwrap();

    let fetched = db.fetch_project(project.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Vendor contracts");

    ready_document(&db, project.id, "msa").await;

    let summary = db
        .list_projects()
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.id == project.id)
        .unwrap();
    assert_eq!(summary.documents_count, 1);
    assert_eq!(summary.inconsistencies_count, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_missing_project_is_none() {
    let db = setup().await;
    assert!(db.fetch_project(Uuid::now_v7()).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_paragraphs_listed_by_index() {
    let db = setup().await;
    let project = db.create_project("Paragraph order").await.unwrap();
    let doc_id = ready_document(&db, project.id, "order").await;

    let listed = db.list_paragraphs(doc_id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].index, 0);
    assert_eq!(listed[0].paragraph_id, "p-0");
    assert_eq!(listed[1].text, "beta");

    let found = db.find_paragraph(doc_id, "p-1").await.unwrap().unwrap();
    assert_eq!(found.index, 1);
    assert!(db.find_paragraph(doc_id, "p-9").await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_status_machine_is_forward_only() {
    let db = setup().await;
    let project = db.create_project("Status machine").await.unwrap();
    let doc = db
        .create_document(CreateDocumentRequest {
            project_id: project.id,
            title: "draft".to_string(),
            original_filename: "draft.docx".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(doc.status, DocumentStatus::Uploaded);

    db.update_document_status(doc.id, DocumentStatus::Error)
        .await
        .unwrap();

    let err = db
        .update_document_status(doc.id, DocumentStatus::Ready)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidStateTransition {
            from: DocumentStatus::Error,
            to: DocumentStatus::Ready,
            ..
        }
    ));

    let err = db
        .update_document_status(Uuid::now_v7(), DocumentStatus::Ready)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DocumentNotFound(_)));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_ready_documents_exclude_other_states() {
    let db = setup().await;
    let project = db.create_project("Ready filter").await.unwrap();
    let first = ready_document(&db, project.id, "first").await;
    let second = ready_document(&db, project.id, "second").await;
    db.create_document(CreateDocumentRequest {
        project_id: project.id,
        title: "pending".to_string(),
        original_filename: "pending.docx".to_string(),
    })
    .await
    .unwrap();

    let ready: Vec<Uuid> = db
        .list_ready_documents(project.id)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ready, vec![first, second]);

    let all = db.list_documents(project.id).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].title, "pending");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_inconsistencies_ordered_and_filtered() {
    let db = setup().await;
    let project = db.create_project("Ordering").await.unwrap();
    let a = ready_document(&db, project.id, "a").await;
    let b = ready_document(&db, project.id, "b").await;
    let c = ready_document(&db, project.id, "c").await;

    db.insert_inconsistency(finding(project.id, a, b, Severity::Low, "low"))
        .await
        .unwrap();
    db.insert_inconsistency(finding(project.id, a, c, Severity::Critical, "critical"))
        .await
        .unwrap();
    db.insert_inconsistency(finding(project.id, b, c, Severity::Low, "newer low"))
        .await
        .unwrap();

    let listed = db.list_inconsistencies(project.id, None).await.unwrap();
    let descriptions: Vec<&str> = listed.iter().map(|i| i.description.as_str()).collect();
    assert_eq!(descriptions, vec!["critical", "newer low", "low"]);
    assert_eq!(listed[0].source_document.as_ref().unwrap().title, "a");
    assert_eq!(listed[0].target_document.as_ref().unwrap().title, "c");

    let for_a = db.list_inconsistencies(project.id, Some(a)).await.unwrap();
    assert_eq!(for_a.len(), 2);
    assert!(for_a
        .iter()
        .all(|i| i.source_document_id == a || i.target_document_id == a));
}
