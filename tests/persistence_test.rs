#[cfg(test)]
mod persistence_integration_tests {
    use chrono::Utc;
    use diesel::PgConnection;
    use docserver::analysis::storage::{insert_analysis, list_analyses, AnalysisRecord};
    use docserver::analysis::FileKind;
    use docserver::charts::{insert_chart, list_charts, Chart};
    use docserver::core::config::DatabaseConfig;
    use docserver::core::shared::utils::{create_conn, run_migrations, DbPool};
    use docserver::documents::storage::{
        delete_document, get_document_info, insert_document, load_source, set_suggestions,
        NewDocument,
    };
    use docserver::qa::{insert_entry, list_history, DbQaEntry};
    use docserver::workspaces::storage::{delete_workspace, insert_workspace, list_workspaces};
    use docserver::workspaces::Workspace;
    use serde_json::json;
    use std::sync::Mutex;
    use uuid::Uuid;

    static MIGRATED: Mutex<Option<bool>> = Mutex::new(None);

    /// `None` when no reachable database is configured.
    fn test_pool() -> Option<DbPool> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => {
                println!("Skipping test - DATABASE_URL not set");
                return None;
            }
        };
        let pool = create_conn(&DatabaseConfig {
            url,
            pool_size: 2,
            connect_timeout_secs: 2,
        });
        let mut migrated = MIGRATED.lock().unwrap_or_else(|e| e.into_inner());
        let ready = *migrated.get_or_insert_with(|| match run_migrations(&pool) {
            Ok(()) => true,
            Err(e) => {
                println!("Skipping test - cannot prepare database: {e}");
                false
            }
        });
        ready.then_some(pool)
    }

    fn new_workspace(conn: &mut PgConnection) -> Workspace {
        let now = Utc::now();
        let workspace = Workspace {
            id: Uuid::new_v4(),
            name: "Persistence test".to_string(),
            description: None,
            created_at: now,
            updated_at: now,
        };
        insert_workspace(conn, &workspace).unwrap();
        workspace
    }

    fn new_document(conn: &mut PgConnection, workspace_id: Option<Uuid>) -> Uuid {
        let data = b"quarterly numbers".to_vec();
        let doc = NewDocument {
            id: Uuid::new_v4(),
            workspace_id,
            filename: "notes.txt".to_string(),
            file_type: FileKind::Txt.as_str().to_string(),
            file_size: data.len() as i64,
            file_data: data,
            created_at: Utc::now(),
        };
        insert_document(conn, &doc).unwrap();
        doc.id
    }

    #[test]
    fn test_document_round_trip() {
        let Some(pool) = test_pool() else { return };
        let mut conn = pool.get().unwrap();

        let id = new_document(&mut conn, None);
        let source = load_source(&mut conn, id).unwrap().unwrap();
        assert_eq!(source.filename, "notes.txt");
        assert_eq!(source.kind, FileKind::Txt);
        assert_eq!(source.data, b"quarterly numbers");

        let suggestions = json!({"suggested_analyses": [{"type": "summarize", "priority": 1}]});
        set_suggestions(&mut conn, id, &suggestions).unwrap();
        let info = get_document_info(&mut conn, id).unwrap().unwrap();
        assert_eq!(info.suggestions, Some(suggestions));
        assert_eq!(info.file_size, 17);

        delete_document(&mut conn, id).unwrap();
    }

    #[test]
    fn test_document_delete_cascades() {
        let Some(pool) = test_pool() else { return };
        let mut conn = pool.get().unwrap();

        let id = new_document(&mut conn, None);
        insert_analysis(
            &mut conn,
            &AnalysisRecord::new(id, "summarize", json!({"summary": "ok"})),
        )
        .unwrap();
        insert_chart(
            &mut conn,
            &Chart::from_result(id, json!({"chart_type": "pie", "data": []})),
        )
        .unwrap();
        assert_eq!(list_analyses(&mut conn, id).unwrap().len(), 1);
        assert_eq!(list_charts(&mut conn, id).unwrap().len(), 1);

        assert_eq!(delete_document(&mut conn, id).unwrap(), 1);
        assert!(list_analyses(&mut conn, id).unwrap().is_empty());
        assert!(list_charts(&mut conn, id).unwrap().is_empty());
        assert!(get_document_info(&mut conn, id).unwrap().is_none());
    }

    #[test]
    fn test_workspace_delete_keeps_members() {
        let Some(pool) = test_pool() else { return };
        let mut conn = pool.get().unwrap();

        let workspace = new_workspace(&mut conn);
        let doc = new_document(&mut conn, Some(workspace.id));
        let entry = DbQaEntry {
            id: Uuid::new_v4(),
            workspace_id: Some(workspace.id),
            document_ids: json!([doc]),
            question: "What changed?".to_string(),
            answer_json: json!({"answer": "Numbers went up"}),
            created_at: Utc::now(),
        };
        insert_entry(&mut conn, &entry).unwrap();

        let summary = list_workspaces(&mut conn)
            .unwrap()
            .into_iter()
            .find(|w| w.workspace.id == workspace.id)
            .unwrap();
        assert_eq!(summary.document_count, 1);

        assert_eq!(delete_workspace(&mut conn, workspace.id).unwrap(), 1);
        let info = get_document_info(&mut conn, doc).unwrap().unwrap();
        assert_eq!(info.workspace_id, None);

        let history = list_history(&mut conn, None, 500).unwrap();
        let kept = history.iter().find(|e| e.id == entry.id).unwrap();
        assert_eq!(kept.workspace_id, None);
        assert_eq!(kept.document_ids, vec![doc]);

        delete_document(&mut conn, doc).unwrap();
    }

    #[test]
    fn test_model_output_with_nul_is_stored() {
        let Some(pool) = test_pool() else { return };
        let mut conn = pool.get().unwrap();

        let id = new_document(&mut conn, None);
        let record = AnalysisRecord::new(id, "summarize", json!({"summary": "a\u{0}b"}));
        insert_analysis(&mut conn, &record).unwrap();
        let stored = list_analyses(&mut conn, id).unwrap();
        assert_eq!(stored[0].result_json, json!({"summary": "ab"}));

        let chart = Chart::from_result(
            id,
            json!({"chart_type": "line\u{0}", "title": "t".repeat(400), "data": []}),
        );
        insert_chart(&mut conn, &chart).unwrap();
        let stored = list_charts(&mut conn, id).unwrap();
        assert_eq!(stored[0].chart_type, "line");
        assert_eq!(stored[0].title.as_deref().map(|t| t.chars().count()), Some(255));

        delete_document(&mut conn, id).unwrap();
    }
}
