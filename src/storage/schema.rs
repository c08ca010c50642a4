//! Database schema definitions

/// SQL to create the apps table
pub const CREATE_APPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS ace_apps (
    app_id TEXT NOT NULL,
    target_id TEXT NOT NULL,
    platform TEXT NOT NULL,
    access_token TEXT,
    scope TEXT,
    user_id TEXT,
    data TEXT,
    status TEXT NOT NULL DEFAULT 'installed',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (app_id, target_id)
)
"#;

/// SQL to create the app configs table
pub const CREATE_APP_CONFIGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS ace_app_configs (
    platform TEXT NOT NULL,
    app_id TEXT NOT NULL,
    configuration TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (platform, app_id)
)
"#;

/// SQL to create the threads table
pub const CREATE_THREADS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS ace_threads (
    platform TEXT NOT NULL,
    thread_uuid TEXT NOT NULL,
    app_id TEXT,
    user_id TEXT,
    created_at TEXT NOT NULL,
    PRIMARY KEY (platform, thread_uuid)
)
"#;

/// Table name paired with its creation statement
pub const TABLES: &[(&str, &str)] = &[
    ("ace_apps", CREATE_APPS_TABLE),
    ("ace_app_configs", CREATE_APP_CONFIGS_TABLE),
    ("ace_threads", CREATE_THREADS_TABLE),
];

/// SQL to create the secondary indexes
pub const CREATE_INDEXES: &[&str] = &[
    r#"CREATE INDEX IF NOT EXISTS "target_id-index" ON ace_apps(app_id, target_id)"#,
    r#"CREATE INDEX IF NOT EXISTS "app_id-index" ON ace_app_configs(platform, app_id)"#,
    r#"CREATE INDEX IF NOT EXISTS "user_id-index" ON ace_threads(platform, user_id)"#,
    "CREATE INDEX IF NOT EXISTS idx_apps_status ON ace_apps(status)",
    "CREATE INDEX IF NOT EXISTS idx_threads_app ON ace_threads(app_id)",
];
