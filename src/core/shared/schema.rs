diesel::table! {
    workspaces (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    documents (id) {
        id -> Uuid,
        workspace_id -> Nullable<Uuid>,
        filename -> Varchar,
        file_type -> Varchar,
        file_size -> Int8,
        file_data -> Bytea,
        suggestions -> Nullable<Jsonb>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    analysis_results (id) {
        id -> Uuid,
        document_id -> Uuid,
        analysis_type -> Varchar,
        result_json -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    comparisons (id) {
        id -> Uuid,
        workspace_id -> Nullable<Uuid>,
        document_ids -> Jsonb,
        result_json -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    decision_matrices (id) {
        id -> Uuid,
        workspace_id -> Nullable<Uuid>,
        name -> Varchar,
        criteria -> Jsonb,
        options -> Jsonb,
        result_json -> Nullable<Jsonb>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    charts (id) {
        id -> Uuid,
        document_id -> Uuid,
        chart_type -> Varchar,
        title -> Nullable<Varchar>,
        chart_data -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    qa_history (id) {
        id -> Uuid,
        workspace_id -> Nullable<Uuid>,
        document_ids -> Jsonb,
        question -> Text,
        answer_json -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(documents -> workspaces (workspace_id));
diesel::joinable!(analysis_results -> documents (document_id));
diesel::joinable!(charts -> documents (document_id));
diesel::joinable!(comparisons -> workspaces (workspace_id));
diesel::joinable!(decision_matrices -> workspaces (workspace_id));
diesel::joinable!(qa_history -> workspaces (workspace_id));

diesel::allow_tables_to_appear_in_same_query!(
    workspaces,
    documents,
    analysis_results,
    comparisons,
    decision_matrices,
    charts,
    qa_history,
);
