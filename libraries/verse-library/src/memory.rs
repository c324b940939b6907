//! In-memory backend
//!
//! Implements all three backend services over a JSON tree, a blob map, and
//! an account table. Deterministic and offline; used by tests and demos.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};
use verse_core::{
    AuthBackend, AuthState, BlobStore, DocPath, DocumentStore, FederatedCredential, Result, User,
    UserId, VerseError,
};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    password: Option<String>,
    user: User,
}

#[derive(Debug, Clone)]
struct Blob {
    bytes: Vec<u8>,
    content_type: String,
}

/// Backend held entirely in process memory
#[derive(Debug)]
pub struct MemoryBackend {
    tree: RwLock<Value>,
    blobs: RwLock<BTreeMap<String, Blob>>,

    // Keyed by email, or `provider:token` for federated accounts
    accounts: RwLock<HashMap<String, Account>>,
    auth_tx: watch::Sender<AuthState>,

    push_seq: AtomicU64,
}

impl MemoryBackend {
    /// Empty backend with nobody signed in
    pub fn new() -> Self {
        let (auth_tx, _) = watch::channel(AuthState::SignedOut);
        Self {
            tree: RwLock::new(Value::Object(Map::new())),
            blobs: RwLock::new(BTreeMap::new()),
            accounts: RwLock::new(HashMap::new()),
            auth_tx,
            push_seq: AtomicU64::new(0),
        }
    }

    /// Backend whose document tree starts from `tree`
    pub fn with_tree(tree: Value) -> Self {
        Self {
            tree: RwLock::new(tree),
            ..Self::new()
        }
    }

    /// Size of a stored blob, if present
    pub async fn blob_len(&self, path: &DocPath) -> Option<usize> {
        self.blobs
            .read()
            .await
            .get(path.as_str())
            .map(|blob| blob.bytes.len())
    }

    /// Content type of a stored blob, if present
    pub async fn blob_content_type(&self, path: &DocPath) -> Option<String> {
        self.blobs
            .read()
            .await
            .get(path.as_str())
            .map(|blob| blob.content_type.clone())
    }

    /// Snapshot of the whole document tree
    pub async fn tree(&self) -> Value {
        self.tree.read().await.clone()
    }

    fn publish(&self, state: AuthState) {
        self.auth_tx.send_replace(state);
    }

    fn signed_in_user(&self) -> Option<User> {
        self.auth_tx.borrow().user().cloned()
    }

    /// Push keys sort chronologically, like the hosted backend's
    fn next_push_key(&self) -> String {
        let seq = self.push_seq.fetch_add(1, Ordering::Relaxed);
        let salt = uuid::Uuid::new_v4().simple().to_string();
        format!("-M{:012}{}", seq, &salt[..8])
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

// ===== Document tree =====

fn lookup<'a>(root: &'a Value, path: &DocPath) -> Option<&'a Value> {
    path.segments()
        .try_fold(root, |node, segment| node.as_object()?.get(segment))
}

/// Object at `path`, creating intermediate objects and replacing scalars
fn lookup_or_create<'a>(root: &'a mut Value, path: &DocPath) -> &'a mut Map<String, Value> {
    let mut node = root;
    for segment in path.segments() {
        node = ensure_object(node)
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(node)
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just made an object"),
    }
}

fn write(root: &mut Value, path: &DocPath, value: Value) {
    let (Some(parent), Some(key)) = (path.parent(), path.key()) else {
        *root = value;
        return;
    };
    let map = lookup_or_create(root, &parent);
    if value.is_null() {
        map.remove(key);
    } else {
        map.insert(key.to_string(), value);
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>> {
        let tree = self.tree.read().await;
        Ok(lookup(&tree, path).cloned())
    }

    async fn set(&self, path: &DocPath, value: Value) -> Result<()> {
        debug!(path = %path, "Memory set");
        write(&mut *self.tree.write().await, path, value);
        Ok(())
    }

    async fn update(&self, path: &DocPath, fields: Map<String, Value>) -> Result<()> {
        debug!(path = %path, fields = fields.len(), "Memory update");
        let mut tree = self.tree.write().await;
        let map = lookup_or_create(&mut tree, path);
        for (key, value) in fields {
            if value.is_null() {
                map.remove(&key);
            } else {
                map.insert(key, value);
            }
        }
        Ok(())
    }

    async fn push(&self, path: &DocPath, value: Value) -> Result<String> {
        let key = self.next_push_key();
        debug!(path = %path, key = %key, "Memory push");
        write(&mut *self.tree.write().await, &path.child(&key), value);
        Ok(key)
    }
}

// ===== Blobs =====

#[async_trait]
impl BlobStore for MemoryBackend {
    async fn upload(&self, path: &DocPath, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        debug!(path = %path, bytes = bytes.len(), content_type, "Memory upload");
        self.blobs.write().await.insert(
            path.to_string(),
            Blob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn download_url(&self, path: &DocPath) -> Result<String> {
        if self.blobs.read().await.contains_key(path.as_str()) {
            Ok(format!("memory://{path}"))
        } else {
            Err(VerseError::not_found("Blob", path.as_str()))
        }
    }
}

// ===== Auth =====

#[async_trait]
impl AuthBackend for MemoryBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<User> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(email)
            .filter(|account| account.password.as_deref() == Some(password))
            .ok_or_else(|| VerseError::Auth("Invalid email or password.".to_string()))?;

        let user = account.user.clone();
        info!(uid = %user.id, "Signed in");
        self.publish(AuthState::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_in_with_provider(&self, credential: &FederatedCredential) -> Result<User> {
        if credential.id_token.is_empty() {
            return Err(VerseError::Auth("Missing identity provider token.".to_string()));
        }

        let key = format!("{}:{}", credential.provider_id, credential.id_token);
        let mut accounts = self.accounts.write().await;
        let user = accounts
            .entry(key)
            .or_insert_with(|| Account {
                password: None,
                user: User::new(UserId::new(uuid::Uuid::new_v4().simple().to_string())),
            })
            .user
            .clone();

        info!(uid = %user.id, provider = %credential.provider_id, "Signed in with provider");
        self.publish(AuthState::SignedIn(user.clone()));
        Ok(user)
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<User> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(VerseError::Auth(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters."
            )));
        }

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(VerseError::Auth("Email is already in use.".to_string()));
        }

        let mut user = User::new(UserId::new(uuid::Uuid::new_v4().simple().to_string()));
        user.email = Some(email.to_string());
        accounts.insert(
            email.to_string(),
            Account {
                password: Some(password.to_string()),
                user: user.clone(),
            },
        );

        info!(uid = %user.id, "Account created");
        self.publish(AuthState::SignedIn(user.clone()));
        Ok(user)
    }

    async fn update_profile(
        &self,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<User> {
        let mut user = self.signed_in_user().ok_or(VerseError::SignInRequired)?;
        if let Some(name) = display_name {
            user.display_name = Some(name.to_string());
        }
        if let Some(url) = photo_url {
            user.photo_url = Some(url.to_string());
        }

        let mut accounts = self.accounts.write().await;
        if let Some(account) = accounts.values_mut().find(|a| a.user.id == user.id) {
            account.user = user.clone();
        }

        self.publish(AuthState::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        info!("Signed out");
        self.publish(AuthState::SignedOut);
        Ok(())
    }

    fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.auth_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use verse_core::paths;

    #[tokio::test]
    async fn set_get_and_remove() {
        let backend = MemoryBackend::new();
        let path = DocPath::root("music").child("1700000000000");

        backend.set(&path, json!({"musicName": "Intro"})).await.unwrap();
        assert_eq!(
            backend.get(&path).await.unwrap(),
            Some(json!({"musicName": "Intro"}))
        );

        backend.set(&path, Value::Null).await.unwrap();
        assert_eq!(backend.get(&path).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let backend = MemoryBackend::new();
        let path = DocPath::root("playlists").child("u1").child("p1");
        backend
            .set(&path, json!({"name": "Old", "songs": {"a": 1}}))
            .await
            .unwrap();

        let mut fields = Map::new();
        fields.insert("name".into(), json!("New"));
        backend.update(&path, fields).await.unwrap();

        assert_eq!(
            backend.get(&path).await.unwrap(),
            Some(json!({"name": "New", "songs": {"a": 1}}))
        );
    }

    #[tokio::test]
    async fn push_keys_sort_in_insertion_order() {
        let backend = MemoryBackend::new();
        let path = DocPath::root("list");

        let mut keys = Vec::new();
        for i in 0..12 {
            keys.push(backend.push(&path, json!(i)).await.unwrap());
        }

        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);

        let stored = backend.get(&path).await.unwrap().unwrap();
        let values: Vec<_> = stored.as_object().unwrap().values().cloned().collect();
        assert_eq!(values, (0..12).map(|i| json!(i)).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn accounts_and_auth_state() {
        let backend = MemoryBackend::new();
        let rx = backend.auth_state();
        assert_eq!(*rx.borrow(), AuthState::SignedOut);

        let user = backend.create_account("a@b.co", "secret1").await.unwrap();
        assert_eq!(rx.borrow().user(), Some(&user));

        backend.sign_out().await.unwrap();
        assert!(backend
            .sign_in_with_password("a@b.co", "wrong")
            .await
            .is_err());

        let again = backend.sign_in_with_password("a@b.co", "secret1").await.unwrap();
        assert_eq!(again.id, user.id);
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let backend = MemoryBackend::new();
        let err = backend.create_account("a@b.co", "123").await.unwrap_err();
        assert!(matches!(err, VerseError::Auth(_)));
    }

    #[tokio::test]
    async fn blobs_need_upload_before_url() {
        let backend = MemoryBackend::new();
        let path = paths::album_image_blob("cover.png");

        assert!(backend.download_url(&path).await.is_err());

        backend.upload(&path, vec![1, 2, 3], "image/png").await.unwrap();
        assert_eq!(
            backend.download_url(&path).await.unwrap(),
            "memory://albumImages/cover.png"
        );
        assert_eq!(backend.blob_len(&path).await, Some(3));
    }
}
