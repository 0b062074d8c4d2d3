use std::sync::Arc;

use chrono::{DateTime, Utc};
use faceid_kv::{KVError, KVStore};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::embedding::IdentityId;
use crate::error::FaceprintError;
use crate::keys::{account_key, account_prefix, username_key};

/// Attributes supplied when creating an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
}

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: IdentityId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Account storage the engine registers identities in.
///
/// The engine only creates identities and, when enrollment fails halfway,
/// deletes the one it just created. Implementations must be safe for
/// concurrent use.
pub trait IdentityStore: Send + Sync {
    /// Creates an identity. Fails with [`FaceprintError::AlreadyExists`] if
    /// the username is taken.
    fn create_identity(&self, attrs: &NewIdentity) -> Result<IdentityId, FaceprintError>;

    /// Deletes an identity. Fails with [`FaceprintError::NotFound`] if absent.
    fn delete_identity(&self, id: &IdentityId) -> Result<(), FaceprintError>;

    /// Looks up an identity.
    fn get_identity(&self, id: &IdentityId) -> Result<Option<Account>, FaceprintError>;

    /// Returns all accounts ordered by identity.
    fn list_identities(&self) -> Result<Vec<Account>, FaceprintError>;
}

/// [`IdentityStore`] on top of a [`KVStore`].
///
/// Layout:
/// - `{prefix}:acct:{id}` → JSON [`Account`]
/// - `{prefix}:user:{username}` → id, claimed with a conditional insert so
///   two concurrent creations of the same username cannot both succeed.
pub struct KvIdentityStore {
    kv: Arc<dyn KVStore>,
    prefix: String,
}

impl KvIdentityStore {
    pub fn new(kv: Arc<dyn KVStore>, key_prefix: &str) -> Self {
        Self {
            kv,
            prefix: key_prefix.to_string(),
        }
    }
}

impl IdentityStore for KvIdentityStore {
    fn create_identity(&self, attrs: &NewIdentity) -> Result<IdentityId, FaceprintError> {
        let account = Account {
            id: IdentityId::new(Uuid::new_v4().to_string()),
            username: attrs.username.clone(),
            email: attrs.email.clone(),
            created_at: Utc::now(),
        };
        let data = serde_json::to_vec(&account)?;

        let ukey = username_key(&self.prefix, &attrs.username);
        if !self.kv.insert_new(&ukey, account.id.as_str().as_bytes())? {
            return Err(FaceprintError::AlreadyExists(attrs.username.clone()));
        }
        if let Err(e) = self
            .kv
            .set(&account_key(&self.prefix, account.id.as_str()), &data)
        {
            // Release the username so a retry is possible.
            if let Err(release) = self.kv.delete(&ukey) {
                warn!(
                    username = %attrs.username,
                    error = %release,
                    "faceprint: could not release username after failed account write"
                );
            }
            return Err(e.into());
        }
        Ok(account.id)
    }

    fn delete_identity(&self, id: &IdentityId) -> Result<(), FaceprintError> {
        let account = self
            .get_identity(id)?
            .ok_or_else(|| FaceprintError::NotFound(id.clone()))?;
        match self.kv.delete(&account_key(&self.prefix, id.as_str())) {
            Ok(()) => {}
            Err(KVError::NotFound) => return Err(FaceprintError::NotFound(id.clone())),
            Err(e) => return Err(e.into()),
        }
        match self.kv.delete(&username_key(&self.prefix, &account.username)) {
            Ok(()) | Err(KVError::NotFound) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn get_identity(&self, id: &IdentityId) -> Result<Option<Account>, FaceprintError> {
        match self.kv.get(&account_key(&self.prefix, id.as_str()))? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    fn list_identities(&self) -> Result<Vec<Account>, FaceprintError> {
        const PAGE: usize = 256;
        let prefix = account_prefix(&self.prefix);
        let mut accounts: Vec<Account> = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.kv.scan_page(&prefix, cursor.as_deref(), PAGE)?;
            let n = page.len();
            for (key, data) in page {
                accounts.push(serde_json::from_slice(&data)?);
                cursor = Some(key);
            }
            if n < PAGE {
                return Ok(accounts);
            }
        }
    }
}
