use chrono::Utc;

use super::Engine;
use crate::query::router::{thread_list_plan, ThreadFilter};
use crate::query::{paginate, Page, PageRequest};
use crate::storage::{ItemKey, ItemStore};
use crate::thread::Thread;
use crate::Result;

/// Arguments of `insertThread`.
#[derive(Debug, Clone, Default)]
pub struct ThreadInsert {
    pub platform: String,
    pub thread_uuid: String,
    pub app_id: String,
    pub user_id: String,
}

impl<S: ItemStore> Engine<S> {
    pub async fn thread(&self, platform: &str, thread_uuid: &str) -> Result<Option<Thread>> {
        self.find::<Thread>(&ItemKey::new(platform, thread_uuid)).await
    }

    pub async fn thread_list(&self, filter: &ThreadFilter, request: PageRequest) -> Result<Page<Thread>> {
        let plan = thread_list_plan(filter);
        paginate::<Thread, S>(self.store(), &plan, request)
    }

    /// Threads are create-only; inserting an existing key returns it untouched.
    pub async fn insert_thread(&self, input: ThreadInsert) -> Result<Thread> {
        let key = ItemKey::new(&input.platform, &input.thread_uuid);
        if let Some(existing) = self.find::<Thread>(&key).await? {
            tracing::debug!("Thread {} already exists", key);
            return Ok(existing);
        }

        let thread = Thread::new(&input.platform, &input.thread_uuid, Utc::now())
            .with_app_id(input.app_id)
            .with_user_id(input.user_id);
        self.store().save(&thread)?;
        tracing::info!("Thread {} created", key);

        self.fetch::<Thread>(&key).await
    }

    pub async fn delete_thread(&self, platform: &str, thread_uuid: &str) -> Result<bool> {
        self.store()
            .delete::<Thread>(&ItemKey::new(platform, thread_uuid))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::engine;
    use chrono::Duration;

    fn insert(uuid: &str, app_id: &str, user_id: &str) -> ThreadInsert {
        ThreadInsert {
            platform: "slack".to_string(),
            thread_uuid: uuid.to_string(),
            app_id: app_id.to_string(),
            user_id: user_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_is_create_only() {
        let engine = engine();
        let first = engine.insert_thread(insert("th-1", "app-1", "u-1")).await.unwrap();
        assert_eq!(first.app_id.as_deref(), Some("app-1"));

        let again = engine.insert_thread(insert("th-1", "app-2", "u-2")).await.unwrap();
        assert_eq!(again, first);

        let read = engine.thread("slack", "th-1").await.unwrap().unwrap();
        assert_eq!(read.user_id.as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn test_list_by_user_and_since() {
        let engine = engine();
        let before = Utc::now() - Duration::seconds(5);
        engine.insert_thread(insert("th-1", "app-1", "u-1")).await.unwrap();
        engine.insert_thread(insert("th-2", "app-2", "u-1")).await.unwrap();
        engine.insert_thread(insert("th-3", "app-1", "u-2")).await.unwrap();

        let by_user = ThreadFilter {
            platform: Some("slack".to_string()),
            user_id: Some("u-1".to_string()),
            ..Default::default()
        };
        let page = engine.thread_list(&by_user, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 2);

        let by_app = ThreadFilter {
            platform: Some("slack".to_string()),
            app_id: Some("app-1".to_string()),
            created_at: Some(before),
            ..Default::default()
        };
        let page = engine.thread_list(&by_app, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 2);

        let future = ThreadFilter {
            platform: Some("slack".to_string()),
            created_at: Some(Utc::now() + Duration::hours(1)),
            ..Default::default()
        };
        let page = engine.thread_list(&future, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_delete_thread() {
        let engine = engine();
        engine.insert_thread(insert("th-1", "app-1", "u-1")).await.unwrap();
        assert!(engine.delete_thread("slack", "th-1").await.unwrap());
        assert!(engine.thread("slack", "th-1").await.unwrap().is_none());

        let err = engine.delete_thread("slack", "th-1").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
