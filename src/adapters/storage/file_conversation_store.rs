//! File-based Conversation Store
//!
//! One YAML document per conversation at `<base>/<conversation_id>.yaml`.
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash mid-write never leaves a truncated conversation behind.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::{ConversationId, UserId};
use crate::ports::{ConversationStore, StoreError};

/// File-based storage for conversations
#[derive(Debug, Clone)]
pub struct FileConversationStore {
    base_path: PathBuf,
    /// Serializes create and directory scans. Appends are serialized per
    /// conversation by the session layer.
    dir_lock: Arc<Mutex<()>>,
}

impl FileConversationStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// The directory is created on first write.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            dir_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, id: &ConversationId) -> PathBuf {
        self.base_path.join(format!("{}.yaml", id))
    }

    async fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))
    }

    async fn write(&self, conversation: &Conversation) -> Result<(), StoreError> {
        self.ensure_dir().await?;

        let yaml = serde_yaml::to_string(conversation)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;

        let target = self.file_path(&conversation.id());
        let temp = target.with_extension(format!("yaml.{}.tmp", uuid::Uuid::new_v4()));

        fs::write(&temp, yaml)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        if let Err(e) = fs::rename(&temp, &target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StoreError::IoError(e.to_string()));
        }
        Ok(())
    }

    async fn read(&self, path: &Path) -> Result<Conversation, StoreError> {
        let yaml = fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        serde_yaml::from_str(&yaml).map_err(|e| StoreError::SerializationFailed(e.to_string()))
    }
}

#[async_trait]
impl ConversationStore for FileConversationStore {
    async fn create(
        &self,
        owner: &UserId,
        title: Option<String>,
    ) -> Result<Conversation, StoreError> {
        let conversation = Conversation::new(owner.clone(), title)
            .map_err(|e| StoreError::Invalid(e.to_string()))?;

        let _guard = self.dir_lock.lock().await;
        self.write(&conversation).await?;

        tracing::debug!(conversation_id = %conversation.id(), owner = %owner, "Conversation created");
        Ok(conversation)
    }

    async fn load(&self, id: &ConversationId) -> Result<Conversation, StoreError> {
        let path = self.file_path(id);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StoreError::NotFound(*id));
        }
        self.read(&path).await
    }

    async fn append(
        &self,
        id: &ConversationId,
        message: &Message,
    ) -> Result<Conversation, StoreError> {
        let mut conversation = self.load(id).await?;
        conversation
            .append(message.clone())
            .map_err(|_| StoreError::DuplicateMessage {
                conversation_id: *id,
                message_id: message.id().to_string(),
            })?;
        self.write(&conversation).await?;
        Ok(conversation)
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Conversation>, StoreError> {
        let _guard = self.dir_lock.lock().await;
        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::IoError(e.to_string())),
        };

        let mut owned = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("yaml") {
                continue;
            }
            match self.read(&path).await {
                Ok(conversation) if conversation.is_owned_by(owner) => owned.push(conversation),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable conversation file");
                }
            }
        }

        owned.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::{Confidence, MessageContent, Sentiment};
    use tempfile::TempDir;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn setup() -> (TempDir, FileConversationStore) {
        let dir = TempDir::new().unwrap();
        let store = FileConversationStore::new(dir.path().join("conversations"));
        (dir, store)
    }

    #[tokio::test]
    async fn create_writes_one_yaml_file() {
        let (_dir, store) = setup();
        let conversation = store.create(&user("a"), Some("Trip".to_string())).await.unwrap();

        let path = store.base_path().join(format!("{}.yaml", conversation.id()));
        assert!(path.exists());
        assert_eq!(store.load(&conversation.id()).await.unwrap(), conversation);
    }

    #[tokio::test]
    async fn load_missing_is_not_found() {
        let (_dir, store) = setup();
        let err = store.load(&ConversationId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn appended_messages_survive_a_new_store_instance() {
        let (dir, store) = setup();
        let id = store.create(&user("a"), None).await.unwrap().id();

        let question = Message::user(MessageContent::new("为什么？").unwrap());
        let reply = Message::ai(
            MessageContent::new("好问题").unwrap(),
            Sentiment::Question,
            Confidence::new(0.9).unwrap(),
        );
        store.append(&id, &question).await.unwrap();
        store.append(&id, &reply).await.unwrap();

        let reopened = FileConversationStore::new(dir.path().join("conversations"));
        let loaded = reopened.load(&id).await.unwrap();
        assert_eq!(loaded.messages(), &[question, reply]);
    }

    #[tokio::test]
    async fn no_temp_files_left_behind() {
        let (_dir, store) = setup();
        let id = store.create(&user("a"), None).await.unwrap().id();
        store
            .append(&id, &Message::user(MessageContent::new("x").unwrap()))
            .await
            .unwrap();

        let names: Vec<_> = std::fs::read_dir(store.base_path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![format!("{}.yaml", id)]);
    }

    #[tokio::test]
    async fn append_to_missing_conversation_is_not_found() {
        let (_dir, store) = setup();
        let err = store
            .append(
                &ConversationId::new(),
                &Message::user(MessageContent::new("x").unwrap()),
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn list_for_owner_on_empty_dir_is_empty() {
        let (_dir, store) = setup();
        assert!(store.list_for_owner(&user("a")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_for_owner_skips_other_owners_and_garbage() {
        let (_dir, store) = setup();
        let mine = store.create(&user("a"), None).await.unwrap();
        store.create(&user("b"), None).await.unwrap();
        std::fs::write(store.base_path().join("broken.yaml"), ": : :").unwrap();
        std::fs::write(store.base_path().join("notes.txt"), "ignore").unwrap();

        let listed = store.list_for_owner(&user("a")).await.unwrap();
        assert_eq!(listed, vec![mine]);
    }

    #[tokio::test]
    async fn corrupt_file_surfaces_serialization_error() {
        let (_dir, store) = setup();
        let id = ConversationId::new();
        std::fs::create_dir_all(store.base_path()).unwrap();
        std::fs::write(store.base_path().join(format!("{}.yaml", id)), "not: [valid").unwrap();

        let err = store.load(&id).await.unwrap_err();
        assert!(matches!(err, StoreError::SerializationFailed(_)));
    }
}
