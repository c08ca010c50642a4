use async_graphql::{Context, Json, Object, Result};

use super::types::{DeleteResult, InsertThread, InsertUpdateApp, InsertUpdateAppConfig};
use super::SharedEngine;
use crate::app::AppStatus;
use crate::monitor::audited;
use crate::service::{AppUpsert, ThreadInsert};
use crate::storage::ItemKey;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn insert_update_app(
        &self,
        ctx: &Context<'_>,
        app_id: String,
        target_id: String,
        platform: String,
        access_token: String,
        user_id: Option<String>,
        scope: Option<String>,
        data: Json<serde_json::Value>,
        status: Option<String>,
    ) -> Result<InsertUpdateApp> {
        let engine = ctx.data::<SharedEngine>()?;
        let key = ItemKey::new(&app_id, &target_id).to_string();

        let view = audited("insertUpdateApp", &key, async {
            let status = status.map(|s| s.parse::<AppStatus>()).transpose()?;
            let input = AppUpsert {
                app_id,
                target_id,
                platform,
                access_token: Some(access_token),
                user_id,
                scope,
                data: Some(data.0),
                status,
            };
            engine.insert_update_app(input).await
        })
        .await?;
        Ok(InsertUpdateApp { app: view.into() })
    }

    async fn delete_app(
        &self,
        ctx: &Context<'_>,
        app_id: String,
        target_id: String,
    ) -> Result<DeleteResult> {
        let engine = ctx.data::<SharedEngine>()?;
        let key = ItemKey::new(&app_id, &target_id).to_string();
        let ok = audited("deleteApp", &key, engine.delete_app(&app_id, &target_id)).await?;
        Ok(DeleteResult { ok })
    }

    async fn insert_update_app_config(
        &self,
        ctx: &Context<'_>,
        platform: String,
        app_id: String,
        configuration: Json<serde_json::Value>,
    ) -> Result<InsertUpdateAppConfig> {
        let engine = ctx.data::<SharedEngine>()?;
        let key = ItemKey::new(&platform, &app_id).to_string();
        let config = audited(
            "insertUpdateAppConfig",
            &key,
            engine.insert_update_app_config(&platform, &app_id, configuration.0),
        )
        .await?;
        Ok(InsertUpdateAppConfig { app_config: config.into() })
    }

    async fn delete_app_config(
        &self,
        ctx: &Context<'_>,
        platform: String,
        app_id: String,
    ) -> Result<DeleteResult> {
        let engine = ctx.data::<SharedEngine>()?;
        let key = ItemKey::new(&platform, &app_id).to_string();
        let ok = audited("deleteAppConfig", &key, engine.delete_app_config(&platform, &app_id)).await?;
        Ok(DeleteResult { ok })
    }

    async fn insert_thread(
        &self,
        ctx: &Context<'_>,
        platform: String,
        thread_uuid: String,
        app_id: String,
        user_id: String,
    ) -> Result<InsertThread> {
        let engine = ctx.data::<SharedEngine>()?;
        let key = ItemKey::new(&platform, &thread_uuid).to_string();
        let input = ThreadInsert { platform, thread_uuid, app_id, user_id };
        let thread = audited("insertThread", &key, engine.insert_thread(input)).await?;
        Ok(InsertThread { thread: thread.into() })
    }

    async fn delete_thread(
        &self,
        ctx: &Context<'_>,
        platform: String,
        thread_uuid: String,
    ) -> Result<DeleteResult> {
        let engine = ctx.data::<SharedEngine>()?;
        let key = ItemKey::new(&platform, &thread_uuid).to_string();
        let ok = audited("deleteThread", &key, engine.delete_thread(&platform, &thread_uuid)).await?;
        Ok(DeleteResult { ok })
    }
}
