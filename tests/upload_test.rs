#[cfg(test)]
mod upload_integration_tests {
    use async_trait::async_trait;
    use docserver::analysis::AnalysisService;
    use docserver::core::config::{AppConfig, DatabaseConfig};
    use docserver::core::shared::utils::{create_conn, run_migrations, DbPool};
    use docserver::core::shared::{AppState, DatabaseStatus};
    use docserver::documents::handlers::store_upload;
    use docserver::documents::storage::{delete_document, get_document_info};
    use docserver::documents::UploadedFile;
    use docserver::llm::{ContentPart, LLMProvider, LlmError};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    static MIGRATED: Mutex<Option<bool>> = Mutex::new(None);

    /// Answers every call with a fixed value, or fails like an exhausted retry loop.
    struct FixedProvider {
        reply: Option<Value>,
    }

    #[async_trait]
    impl LLMProvider for FixedProvider {
        async fn generate_json(
            &self,
            _system_prompt: &str,
            _content: &[ContentPart],
            _model: &str,
        ) -> Result<Value, LlmError> {
            self.reply.clone().ok_or_else(|| LlmError::Exhausted {
                attempts: 3,
                last: Box::new(LlmError::Http {
                    status: 503,
                    body: "upstream unavailable".to_string(),
                }),
            })
        }
    }

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

    fn state_with(pool: DbPool, reply: Option<Value>) -> AppState {
        let config = AppConfig::default();
        AppState {
            conn: pool,
            analysis: AnalysisService::new(Arc::new(FixedProvider { reply }), &config),
            config,
            db_status: DatabaseStatus::ready(),
        }
    }

    fn ten_byte_file() -> UploadedFile {
        UploadedFile {
            filename: "a.txt".to_string(),
            data: b"0123456789".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_upload_without_auto_analyze() {
        let Some(pool) = test_pool() else { return };
        let state = state_with(pool.clone(), None);

        let uploaded = store_upload(&state, ten_byte_file(), None, false)
            .await
            .unwrap();
        let body = serde_json::to_value(&uploaded).unwrap();
        assert_eq!(body["filename"], json!("a.txt"));
        assert_eq!(body["file_type"], json!("txt"));
        assert_eq!(body["file_size"], json!(10));
        assert_eq!(body["suggestions"], Value::Null);

        let mut conn = pool.get().unwrap();
        let info = get_document_info(&mut conn, uploaded.id).unwrap().unwrap();
        assert_eq!(info.filename, "a.txt");
        assert_eq!(info.file_size, 10);
        assert_eq!(info.suggestions, None);

        delete_document(&mut conn, uploaded.id).unwrap();
    }

    #[tokio::test]
    async fn test_upload_survives_failed_auto_analyze() {
        let Some(pool) = test_pool() else { return };
        let state = state_with(pool.clone(), None);

        let uploaded = store_upload(&state, ten_byte_file(), None, true)
            .await
            .unwrap();
        assert_eq!(uploaded.suggestions, None);

        let mut conn = pool.get().unwrap();
        let info = get_document_info(&mut conn, uploaded.id).unwrap().unwrap();
        assert_eq!(info.file_type, "txt");
        assert_eq!(info.suggestions, None);

        delete_document(&mut conn, uploaded.id).unwrap();
    }

    #[tokio::test]
    async fn test_auto_analyze_caches_suggestions() {
        let Some(pool) = test_pool() else { return };
        let suggestions = json!({
            "document_type": "notes",
            "suggested_analyses": [{"type": "summarize", "reason": "short text", "priority": 1}]
        });
        let state = state_with(pool.clone(), Some(suggestions.clone()));

        let uploaded = store_upload(&state, ten_byte_file(), None, true)
            .await
            .unwrap();
        assert_eq!(uploaded.suggestions, Some(suggestions.clone()));

        let mut conn = pool.get().unwrap();
        let info = get_document_info(&mut conn, uploaded.id).unwrap().unwrap();
        assert_eq!(info.suggestions, Some(suggestions));

        delete_document(&mut conn, uploaded.id).unwrap();
    }
}
