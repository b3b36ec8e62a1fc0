//! Table definitions, applied in order at startup.

pub const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS kpi_documents (
        company_id            TEXT        NOT NULL,
        department            TEXT        NOT NULL,
        selected_kpis         TEXT[]      NOT NULL DEFAULT '{}',
        data                  JSONB       NOT NULL DEFAULT '[]'::jsonb,
        dashboard_layout      JSONB,
        chart_configurations  JSONB       NOT NULL DEFAULT '[]'::jsonb,
        last_updated          TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (company_id, department)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS revoked_tokens (
        jti         UUID        PRIMARY KEY,
        company_id  TEXT        NOT NULL,
        expires_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS revoked_tokens_expires_at_idx ON revoked_tokens (expires_at)",
    r#"
    CREATE TABLE IF NOT EXISTS insights (
        company_id  TEXT        PRIMARY KEY,
        body        JSONB       NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        company_id   TEXT        PRIMARY KEY,
        profile      JSONB       NOT NULL,
        is_active    BOOLEAN     NOT NULL DEFAULT FALSE,
        last_login   TIMESTAMPTZ,
        last_logout  TIMESTAMPTZ,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at   TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
];
