//! App lifecycle: read with embedded config, upsert with uninstall cascade,
//! delete gated on threads

use chrono::{DateTime, Utc};

use super::{creatable, Engine};
use crate::app::{App, AppStatus};
use crate::app_config::AppConfig;
use crate::query::router::{app_list_plan, app_threads_plan, AppFilter};
use crate::query::{paginate, Page, PageRequest};
use crate::storage::{ChangeSet, Condition, Item, ItemKey, ItemStore, NULL_SENTINEL};
use crate::thread::Thread;
use crate::Result;

/// An app together with a fresh snapshot of its platform configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppView {
    pub app: App,
    pub app_config: Option<serde_json::Value>,
}

/// Arguments of `insertUpdateApp`. `None` means "not supplied".
#[derive(Debug, Clone, Default)]
pub struct AppUpsert {
    pub app_id: String,
    pub target_id: String,
    pub platform: String,
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub scope: Option<String>,
    pub data: Option<serde_json::Value>,
    pub status: Option<AppStatus>,
}

impl<S: ItemStore> Engine<S> {
    pub async fn app(&self, app_id: &str, target_id: &str) -> Result<Option<AppView>> {
        match self.find::<App>(&ItemKey::new(app_id, target_id)).await? {
            Some(app) => Ok(Some(self.app_view(app).await?)),
            None => Ok(None),
        }
    }

    pub async fn app_list(&self, filter: &AppFilter, request: PageRequest) -> Result<Page<AppView>> {
        let plan = app_list_plan(filter);
        let mut page = paginate::<App, S>(self.store(), &plan, request)?;

        let mut views = Vec::with_capacity(page.items.len());
        for app in std::mem::take(&mut page.items) {
            views.push(self.app_view(app).await?);
        }
        Ok(page.with_items(views))
    }

    pub async fn insert_update_app(&self, input: AppUpsert) -> Result<AppView> {
        let key = ItemKey::new(&input.app_id, &input.target_id);
        let now = Utc::now();

        match self.find::<App>(&key).await? {
            None => {
                let app = App::new(&input.app_id, &input.target_id, &input.platform, now)
                    .with_access_token(creatable(input.access_token))
                    .with_user_id(creatable(input.user_id))
                    .with_scope(creatable(input.scope))
                    .with_data(match input.data {
                        Some(serde_json::Value::String(s)) if s == NULL_SENTINEL => serde_json::Value::Null,
                        Some(data) => data,
                        None => serde_json::json!({}),
                    })
                    .with_status(input.status.unwrap_or_default());
                self.store().save(&app)?;
                tracing::info!("App {} created", key);
            }
            Some(existing) => {
                if let Some(next) = input.status {
                    existing.status.transition(next)?;
                    if existing.is_installed() && next == AppStatus::Uninstalled {
                        self.uninstall_siblings(&existing, now)?;
                    }
                }

                let changes = ChangeSet::touched(now)
                    .text("access_token", input.access_token.as_deref())
                    .text("user_id", input.user_id.as_deref())
                    .text("scope", input.scope.as_deref())
                    .json("data", input.data.as_ref())?
                    .text("status", input.status.map(|s| s.as_str()));
                self.store().update::<App>(&key, &changes)?;
                tracing::debug!("App {} updated ({} fields)", key, changes.changes().len());
            }
        }

        let app = self.fetch::<App>(&key).await?;
        self.app_view(app).await
    }

    /// Hard delete, refused (`false`) while threads still reference the app.
    pub async fn delete_app(&self, app_id: &str, target_id: &str) -> Result<bool> {
        let app = self.fetch::<App>(&ItemKey::new(app_id, target_id)).await?;

        let plan = app_threads_plan(&app);
        let threads = self.store().count::<Thread>(&plan.access, plan.filter.as_ref())?;
        if threads > 0 {
            tracing::info!(
                "Refusing to delete app {}: {} thread(s) still reference it",
                app.key(),
                threads
            );
            return Ok(false);
        }

        self.store().delete::<App>(&app.key())?;
        Ok(true)
    }

    /// Flip every installed row under the app's target to uninstalled.
    ///
    /// Not transactional: a failure part way leaves earlier rows flipped.
    fn uninstall_siblings(&self, app: &App, now: DateTime<Utc>) -> Result<usize> {
        let installed = Condition::eq("status", AppStatus::Installed.as_str());
        let siblings: Vec<App> =
            self.store()
                .index_query(&app.app_id, Some(&app.target_id), Some(&installed), None)?;

        for (done, sibling) in siblings.iter().enumerate() {
            let changes =
                ChangeSet::touched(now).text("status", Some(AppStatus::Uninstalled.as_str()));
            if let Err(err) = self.store().update::<App>(&sibling.key(), &changes) {
                tracing::error!(
                    "Uninstall of {} stopped after {} of {} sibling(s): {:?}",
                    app.key(),
                    done,
                    siblings.len(),
                    err
                );
                return Err(err);
            }
        }

        tracing::info!("Uninstalled {} sibling(s) of {}", siblings.len(), app.key());
        Ok(siblings.len())
    }

    async fn app_view(&self, app: App) -> Result<AppView> {
        let config_key = ItemKey::new(&app.platform, &app.app_id);
        let app_config = self
            .find::<AppConfig>(&config_key)
            .await?
            .map(|config| config.snapshot());
        Ok(AppView { app, app_config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::engine;
    use crate::service::ThreadInsert;
    use crate::storage::encode_timestamp;
    use crate::Error;

    fn upsert(app_id: &str, target_id: &str) -> AppUpsert {
        AppUpsert {
            app_id: app_id.to_string(),
            target_id: target_id.to_string(),
            platform: "slack".to_string(),
            access_token: Some("xoxb-1".to_string()),
            user_id: Some("u-1".to_string()),
            scope: Some("chat:write".to_string()),
            data: Some(serde_json::json!({"team": "core"})),
            status: None,
        }
    }

    #[tokio::test]
    async fn test_insert_then_read_back() {
        let engine = engine();
        engine.insert_update_app(upsert("app-1", "t-1")).await.unwrap();

        let view = engine.app("app-1", "t-1").await.unwrap().unwrap();
        let app = view.app;
        assert_eq!(app.platform, "slack");
        assert_eq!(app.access_token.as_deref(), Some("xoxb-1"));
        assert_eq!(app.user_id.as_deref(), Some("u-1"));
        assert_eq!(app.scope.as_deref(), Some("chat:write"));
        assert_eq!(app.data, serde_json::json!({"team": "core"}));
        assert_eq!(app.status, AppStatus::Installed);
        assert_eq!(app.created_at, app.updated_at);
        assert!(view.app_config.is_none());
    }

    #[tokio::test]
    async fn test_missing_app_is_none() {
        let engine = engine();
        assert!(engine.app("ghost", "t-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_touches_only_supplied_fields() {
        let engine = engine();
        let created = engine.insert_update_app(upsert("app-1", "t-1")).await.unwrap();

        let view = engine
            .insert_update_app(AppUpsert {
                scope: Some("admin".to_string()),
                access_token: None,
                user_id: None,
                data: None,
                ..upsert("app-1", "t-1")
            })
            .await
            .unwrap();

        assert_eq!(view.app.scope.as_deref(), Some("admin"));
        assert_eq!(view.app.access_token.as_deref(), Some("xoxb-1"));
        assert_eq!(view.app.data, serde_json::json!({"team": "core"}));
        assert_eq!(
            encode_timestamp(&view.app.created_at),
            encode_timestamp(&created.app.created_at)
        );
        assert!(view.app.updated_at >= created.app.updated_at);
    }

    #[tokio::test]
    async fn test_null_sentinel_clears_fields() {
        let engine = engine();
        engine.insert_update_app(upsert("app-1", "t-1")).await.unwrap();

        let view = engine
            .insert_update_app(AppUpsert {
                access_token: Some("null".to_string()),
                scope: Some("null".to_string()),
                data: Some(serde_json::json!("null")),
                ..upsert("app-1", "t-1")
            })
            .await
            .unwrap();

        assert!(view.app.access_token.is_none());
        assert!(view.app.scope.is_none());
        assert!(view.app.data.is_null());
        assert_eq!(view.app.user_id.as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn test_null_sentinel_clears_user_id() {
        let engine = engine();
        engine.insert_update_app(upsert("app-1", "t-1")).await.unwrap();

        let view = engine
            .insert_update_app(AppUpsert {
                user_id: Some("null".to_string()),
                access_token: None,
                scope: None,
                data: None,
                ..upsert("app-1", "t-1")
            })
            .await
            .unwrap();

        assert!(view.app.user_id.is_none());
        assert_eq!(view.app.access_token.as_deref(), Some("xoxb-1"));
        let read = engine.app("app-1", "t-1").await.unwrap().unwrap();
        assert!(read.app.user_id.is_none());
    }

    #[tokio::test]
    async fn test_uninstall_flips_installed_rows() {
        let engine = engine();
        engine.insert_update_app(upsert("app-1", "t-1")).await.unwrap();
        engine.insert_update_app(upsert("app-1", "t-2")).await.unwrap();

        let view = engine
            .insert_update_app(AppUpsert {
                status: Some(AppStatus::Uninstalled),
                access_token: None,
                user_id: None,
                scope: None,
                data: None,
                ..upsert("app-1", "t-1")
            })
            .await
            .unwrap();
        assert_eq!(view.app.status, AppStatus::Uninstalled);

        let untouched = engine.app("app-1", "t-2").await.unwrap().unwrap();
        assert_eq!(untouched.app.status, AppStatus::Installed);

        let filter = AppFilter {
            app_id: Some("app-1".to_string()),
            target_id: Some("t-1".to_string()),
            statuses: vec![AppStatus::Installed],
            ..Default::default()
        };
        let installed = engine.app_list(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(installed.total, 0);
    }

    #[tokio::test]
    async fn test_reinstall_is_rejected() {
        let engine = engine();
        engine
            .insert_update_app(AppUpsert {
                status: Some(AppStatus::Uninstalled),
                ..upsert("app-1", "t-1")
            })
            .await
            .unwrap();

        let err = engine
            .insert_update_app(AppUpsert {
                status: Some(AppStatus::Installed),
                ..upsert("app-1", "t-1")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_view_embeds_app_config() {
        let engine = engine();
        engine
            .insert_update_app_config("slack", "app-1", serde_json::json!({"scopes": ["chat"]}))
            .await
            .unwrap();
        let view = engine.insert_update_app(upsert("app-1", "t-1")).await.unwrap();

        assert_eq!(
            view.app_config,
            Some(serde_json::json!({
                "platform": "slack",
                "app_id": "app-1",
                "configuration": {"scopes": ["chat"]},
            }))
        );
    }

    #[tokio::test]
    async fn test_delete_blocked_by_threads() {
        let engine = engine();
        engine.insert_update_app(upsert("app-1", "t-1")).await.unwrap();
        engine
            .insert_thread(ThreadInsert {
                platform: "slack".to_string(),
                thread_uuid: "th-1".to_string(),
                app_id: "app-1".to_string(),
                user_id: "u-1".to_string(),
            })
            .await
            .unwrap();

        assert!(!engine.delete_app("app-1", "t-1").await.unwrap());
        assert!(engine.app("app-1", "t-1").await.unwrap().is_some());

        assert!(engine.delete_thread("slack", "th-1").await.unwrap());
        assert!(engine.delete_app("app-1", "t-1").await.unwrap());
        assert!(engine.app("app-1", "t-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_app_is_not_found() {
        let engine = engine();
        let err = engine.delete_app("ghost", "t-1").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_app_list_routes_by_arguments() {
        use crate::retry::RetryPolicy;
        use crate::storage::recording::RecordingStore;
        use std::sync::Arc;

        let engine = Engine::new(Arc::new(RecordingStore::new())).with_retry(RetryPolicy::immediate(1));
        engine.insert_update_app(upsert("app-1", "t-1")).await.unwrap();
        engine.insert_update_app(upsert("app-1", "t-2")).await.unwrap();
        engine.insert_update_app(upsert("app-2", "t-1")).await.unwrap();
        engine.store().reset();

        let all = engine.app_list(&AppFilter::default(), PageRequest::default()).await.unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(engine.store().count_of("scan:ace_apps"), 1);
        assert_eq!(engine.store().count_of("count_scan:ace_apps"), 1);

        let by_app = AppFilter { app_id: Some("app-1".to_string()), ..Default::default() };
        let page = engine.app_list(&by_app, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(engine.store().count_of("query:ace_apps"), 1);

        let by_target = AppFilter {
            app_id: Some("app-1".to_string()),
            target_id: Some("t-2".to_string()),
            ..Default::default()
        };
        let page = engine.app_list(&by_target, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].app.target_id, "t-2");
        assert_eq!(engine.store().count_of("index_query:ace_apps"), 1);
        assert_eq!(engine.store().count_of("scan:ace_apps"), 1);
    }

    #[tokio::test]
    async fn test_uninstall_cascade_uses_target_index() {
        use crate::retry::RetryPolicy;
        use crate::storage::recording::RecordingStore;
        use std::sync::Arc;

        let engine = Engine::new(Arc::new(RecordingStore::new())).with_retry(RetryPolicy::immediate(1));
        engine.insert_update_app(upsert("app-1", "t-1")).await.unwrap();
        engine.store().reset();

        engine
            .insert_update_app(AppUpsert {
                status: Some(AppStatus::Uninstalled),
                ..upsert("app-1", "t-1")
            })
            .await
            .unwrap();

        let calls = engine.store().calls();
        let cascade = calls.iter().position(|c| c == "index_query:ace_apps").unwrap();
        let updates: Vec<usize> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| *c == "update:ace_apps")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(updates.len(), 2);
        assert!(cascade < updates[0]);
    }
}
