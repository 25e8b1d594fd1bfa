//! Vault service: the store, retrieve and delete flows.
//!
//! A secret moves through `encode -> derive key -> encrypt -> put -> append`
//! on the way in and `list -> get -> decrypt -> decode` on the way out. The
//! identity is an explicit argument to every call; the service itself holds
//! no notion of a "current user".

use futures::future::join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::codec::{self, Secret};
use crate::config::VaultConfig;
use crate::signer::{LoginProof, Signer};
use chainvault_common::{
    ContentAddress, Error, Identity, Result, RetryConfig, RetryExecutor, SensitiveBytes,
};
use chainvault_crypto::{
    build_challenge, decrypt, derive_with_passphrase, encrypt, EncryptedBlob, KdfParams,
    KeyMaterial, LoginChallenge,
};
use chainvault_ledger::{LedgerRecord, NewRecord, RecordKind, ReferenceLedger};
use chainvault_storage::ContentStore;

/// Where the per-identity key comes from.
#[derive(Debug, Clone, Default)]
pub enum KeySource {
    /// Derived from the identity alone.
    #[default]
    Identity,
    /// Identity mixed with a passphrase.
    Passphrase {
        passphrase: SensitiveBytes,
        params: KdfParams,
    },
}

impl KeySource {
    /// Derive the key for `identity`. Recomputed on every call, never cached.
    pub fn key_for(&self, identity: &Identity) -> Result<KeyMaterial> {
        match self {
            KeySource::Identity => Ok(KeyMaterial::derive(identity)),
            KeySource::Passphrase { passphrase, params } => {
                derive_with_passphrase(identity, passphrase.as_bytes(), params)
            }
        }
    }
}

/// Outcome of a successful store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReceipt {
    pub content_address: ContentAddress,
    pub index: u64,
    pub kind: RecordKind,
}

/// One ledger record and what became of retrieving it.
#[derive(Debug)]
pub struct RetrievedItem {
    /// Position in the identity's ledger list at listing time.
    pub index: u64,
    pub record: LedgerRecord,
    pub result: Result<Secret>,
}

/// The outcome of a `retrieve_all` call.
#[derive(Debug)]
pub struct Listing {
    pub identity: Identity,
    pub items: Vec<RetrievedItem>,
}

impl Listing {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items whose retrieval failed.
    pub fn failures(&self) -> impl Iterator<Item = &RetrievedItem> {
        self.items.iter().filter(|item| item.result.is_err())
    }
}

/// Orchestrates the content store, the ledger and the cipher.
pub struct VaultService {
    store: Arc<dyn ContentStore>,
    ledger: Arc<dyn ReferenceLedger>,
    keys: KeySource,
    retry: RetryExecutor,
    /// Incremented by every `retrieve_all` and every mutation.
    generation: AtomicU64,
    published: RwLock<Option<Arc<Listing>>>,
}

impl VaultService {
    /// Create a service with identity-only keys and the default retry policy.
    pub fn new(store: Arc<dyn ContentStore>, ledger: Arc<dyn ReferenceLedger>) -> Self {
        Self {
            store,
            ledger,
            keys: KeySource::Identity,
            retry: RetryExecutor::default(),
            generation: AtomicU64::new(0),
            published: RwLock::new(None),
        }
    }

    /// Assemble a service from configuration using the built-in providers.
    ///
    /// `sender` binds the ledger connection to one identity.
    ///
    /// # Errors
    /// - Provider not registered
    /// - Provider configuration invalid
    /// - Key mode requires a passphrase but `keys` carries none
    pub fn from_config(
        config: &VaultConfig,
        keys: KeySource,
        sender: Option<Identity>,
    ) -> Result<Self> {
        if matches!(config.key_mode, crate::config::KeyMode::Passphrase { .. })
            && matches!(keys, KeySource::Identity)
        {
            return Err(Error::InvalidInput(
                "Passphrase key mode requires a passphrase".to_string(),
            ));
        }

        let store = chainvault_storage::create_default_registry().resolve(
            &config.content_store.provider,
            config.content_store.config.clone(),
        )?;
        let ledger = chainvault_ledger::create_default_registry().resolve(
            &config.ledger.provider,
            config.ledger.config.clone(),
            sender,
        )?;

        info!(
            store = store.name(),
            ledger = ledger.name(),
            "Vault service assembled"
        );

        Ok(Self::new(store, ledger)
            .with_key_source(keys)
            .with_retry(config.retry.clone()))
    }

    pub fn with_key_source(mut self, keys: KeySource) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_retry(mut self, config: RetryConfig) -> Self {
        self.retry = RetryExecutor::new(config);
        self
    }

    pub fn store_client(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    pub fn ledger_client(&self) -> &Arc<dyn ReferenceLedger> {
        &self.ledger
    }

    /// Encrypt a secret, upload it and anchor its address in the ledger.
    ///
    /// # Postconditions
    /// - On success the ledger holds one new record at `receipt.index`
    ///
    /// # Errors
    /// - `InvalidInput` before any I/O if the secret is incomplete
    /// - Store errors if the upload failed; nothing was written
    /// - `Orphaned` if the upload succeeded but the append failed; the blob
    ///   stays on the store unreferenced
    pub async fn store(&self, identity: &Identity, secret: &Secret) -> Result<StoreReceipt> {
        let plaintext = Zeroizing::new(codec::encode(secret)?);
        let key = self.keys.key_for(identity)?;
        let blob = encrypt(&key, &plaintext)?.into_bytes();
        let size = blob.len();

        let address = self
            .retry
            .execute("put", || self.store.put(blob.clone()))
            .await?;
        debug!(identity = %identity, address = %address, size, "Blob uploaded");

        let kind = secret.record_kind();
        let record = NewRecord {
            content_address: address.clone(),
            kind: kind.clone(),
        };

        // Not retried: a retry after an ambiguous failure could append twice.
        let index = match self.ledger.append(identity, record).await {
            Ok(index) => index,
            Err(err) => {
                warn!(identity = %identity, address = %address, error = %err, "Append failed, blob orphaned");
                return Err(Error::Orphaned {
                    address: address.clone(),
                    source: Box::new(err),
                });
            }
        };

        self.invalidate(identity).await;
        info!(identity = %identity, index, kind = kind.label(), "Secret stored");

        Ok(StoreReceipt {
            content_address: address,
            index,
            kind,
        })
    }

    /// Retrieve and decrypt every record of an identity.
    ///
    /// Records are fetched concurrently. A record that cannot be fetched,
    /// decrypted or decoded is reported in its item and never aborts the
    /// batch. On success the listing becomes [`Self::last_listing`].
    ///
    /// # Errors
    /// - Ledger errors from `list`
    /// - `Superseded` if a newer `retrieve_all` or a mutation started while
    ///   this call was in flight; the published listing is left untouched
    pub async fn retrieve_all(&self, identity: &Identity) -> Result<Arc<Listing>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let records = self
            .retry
            .execute("list", || self.ledger.list(identity))
            .await?;
        let key = self.keys.key_for(identity)?;

        let items = join_all(records.into_iter().enumerate().map(|(index, record)| {
            let key = &key;
            async move {
                let result = self.fetch(key, &record).await;
                if let Err(err) = &result {
                    warn!(
                        identity = %identity,
                        index,
                        address = %record.content_address,
                        error = %err,
                        "Record could not be retrieved"
                    );
                }
                RetrievedItem {
                    index: index as u64,
                    record,
                    result,
                }
            }
        }))
        .await;

        let listing = Arc::new(Listing {
            identity: identity.clone(),
            items,
        });

        let mut published = self.published.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(identity = %identity, generation, "Listing superseded, discarding");
            return Err(Error::Superseded);
        }
        *published = Some(listing.clone());

        info!(
            identity = %identity,
            records = listing.len(),
            failures = listing.failures().count(),
            "Listing retrieved"
        );
        Ok(listing)
    }

    /// Retrieve and decrypt a single record.
    pub async fn retrieve(&self, identity: &Identity, record: &LedgerRecord) -> Result<Secret> {
        let key = self.keys.key_for(identity)?;
        self.fetch(&key, record).await
    }

    /// Remove the record at `index` and return the remaining records.
    ///
    /// The blob is left on the content store.
    ///
    /// # Errors
    /// - `OutOfRange` if `index` is stale or never existed
    /// - `NotAuthorized` if the ledger connection belongs to another identity
    pub async fn delete_at(&self, identity: &Identity, index: u64) -> Result<Vec<LedgerRecord>> {
        // Not retried: a repeated remove would shift and delete a second record.
        let remaining = self.ledger.remove(identity, index).await?;
        self.invalidate(identity).await;

        info!(identity = %identity, index, remaining = remaining.len(), "Record deleted");
        Ok(remaining)
    }

    /// The login challenge for the identity's current nonce.
    pub async fn challenge(&self, identity: &Identity) -> Result<LoginChallenge> {
        let nonce = self
            .retry
            .execute("get_nonce", || self.ledger.get_nonce(identity))
            .await?;
        Ok(build_challenge(identity, nonce))
    }

    /// Have the signer sign the login challenge for its identity.
    pub async fn login(&self, signer: &dyn Signer) -> Result<LoginProof> {
        let identity = signer.identity().await?;
        let challenge = self.challenge(&identity).await?;
        let signature = signer.sign(&challenge.message).await?;

        debug!(identity = %identity, nonce = challenge.nonce, "Login challenge signed");
        Ok(LoginProof {
            challenge,
            signature,
        })
    }

    /// Advance the identity's login nonce. Call at most once per login attempt.
    pub async fn rotate_nonce(&self, identity: &Identity) -> Result<u64> {
        let nonce = self.ledger.generate_nonce(identity).await?;
        debug!(identity = %identity, nonce, "Nonce rotated");
        Ok(nonce)
    }

    /// The most recently published listing, if any.
    pub async fn last_listing(&self) -> Option<Arc<Listing>> {
        self.published.read().await.clone()
    }

    async fn fetch(&self, key: &KeyMaterial, record: &LedgerRecord) -> Result<Secret> {
        let data = self
            .retry
            .execute("get", || self.store.get(&record.content_address))
            .await?;
        let plaintext = Zeroizing::new(decrypt(key, &EncryptedBlob::from_bytes(data))?);
        codec::decode(&plaintext)
    }

    /// Supersede in-flight listings and drop a published one for `identity`.
    async fn invalidate(&self, identity: &Identity) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut published = self.published.write().await;
        if published
            .as_ref()
            .is_some_and(|listing| &listing.identity == identity)
        {
            *published = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chainvault_ledger::MemoryLedger;
    use chainvault_storage::MemoryContentStore;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    use crate::signer::Signature;

    fn identity(address: &str) -> Identity {
        Identity::new(address).unwrap()
    }

    fn service() -> (VaultService, MemoryContentStore, MemoryLedger) {
        let store = MemoryContentStore::new();
        let ledger = MemoryLedger::new();
        let service = VaultService::new(Arc::new(store.clone()), Arc::new(ledger.clone()))
            .with_retry(RetryConfig::none());
        (service, store, ledger)
    }

    fn secret_of(item: &RetrievedItem) -> &Secret {
        item.result.as_ref().unwrap()
    }

    #[tokio::test]
    async fn test_store_and_retrieve_credential() {
        let (service, _, _) = service();
        let alice = identity("0xAA");

        let receipt = service
            .store(&alice, &Secret::credential("email", "alice", "p@ss"))
            .await
            .unwrap();
        assert_eq!(receipt.index, 0);
        assert_eq!(receipt.kind, RecordKind::credential());

        let listing = service.retrieve_all(&alice).await.unwrap();
        assert_eq!(listing.len(), 1);
        match secret_of(&listing.items[0]) {
            Secret::Credential(cred) => assert_eq!(cred.password, "p@ss"),
            other => panic!("unexpected secret: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_document_roundtrip() {
        let (service, _, _) = service();
        let alice = identity("0xAA");

        service
            .store(&alice, &Secret::document("empty.txt", "text/plain", Vec::new()))
            .await
            .unwrap();

        let listing = service.retrieve_all(&alice).await.unwrap();
        match secret_of(&listing.items[0]) {
            Secret::Document(doc) => {
                assert_eq!(doc.file_name, "empty.txt");
                assert!(doc.bytes.is_empty());
            }
            other => panic!("unexpected secret: {:?}", other),
        }
        assert_eq!(listing.items[0].record.kind.file_name(), Some("empty.txt"));
    }

    #[tokio::test]
    async fn test_delete_then_stale_index() {
        let (service, store, ledger) = service();
        let alice = identity("0xAA");

        service
            .store(&alice, &Secret::document("a.txt", "text/plain", b"hello".to_vec()))
            .await
            .unwrap();

        let remaining = service.delete_at(&alice, 0).await.unwrap();
        assert!(remaining.is_empty());
        assert!(ledger.list(&alice).await.unwrap().is_empty());

        assert!(matches!(
            service.delete_at(&alice, 0).await,
            Err(Error::OutOfRange { index: 0, len: 0 })
        ));

        // The blob is not deleted from the store.
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_identities_isolated() {
        let (service, _, ledger) = service();
        let alice = identity("0xAA");
        let bob = identity("0xBB");

        service
            .store(&alice, &Secret::credential("email", "alice", "a"))
            .await
            .unwrap();
        service
            .store(&bob, &Secret::credential("bank", "bob", "b"))
            .await
            .unwrap();

        assert_eq!(ledger.list(&alice).await.unwrap().len(), 1);
        assert_eq!(ledger.list(&bob).await.unwrap().len(), 1);

        let listing = service.retrieve_all(&bob).await.unwrap();
        assert_eq!(listing.len(), 1);
        match secret_of(&listing.items[0]) {
            Secret::Credential(cred) => assert_eq!(cred.username, "bob"),
            other => panic!("unexpected secret: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_secret_does_no_io() {
        let (service, store, ledger) = service();
        let alice = identity("0xAA");

        let result = service
            .store(&alice, &Secret::credential("email", "", "pw"))
            .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(store.is_empty().await);
        assert!(ledger.list(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_upload_appends_nothing() {
        let store = MemoryContentStore::new().with_max_object_size(8);
        let ledger = MemoryLedger::new();
        let service = VaultService::new(Arc::new(store), Arc::new(ledger.clone()));
        let alice = identity("0xAA");

        let result = service
            .store(&alice, &Secret::credential("email", "alice", "pw"))
            .await;
        assert!(matches!(result, Err(Error::Rejected(_))));
        assert!(ledger.list(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_per_item_failures_do_not_abort() {
        let (service, store, _) = service();
        let alice = identity("0xAA");

        let gone = service
            .store(&alice, &Secret::credential("email", "alice", "a"))
            .await
            .unwrap();
        let tampered = service
            .store(&alice, &Secret::credential("bank", "alice", "b"))
            .await
            .unwrap();
        service
            .store(&alice, &Secret::credential("forum", "alice", "c"))
            .await
            .unwrap();

        assert!(store.evict(&gone.content_address).await);
        store
            .corrupt(&tampered.content_address, vec![1; 64])
            .await;

        let listing = service.retrieve_all(&alice).await.unwrap();
        assert_eq!(listing.len(), 3);
        assert!(matches!(listing.items[0].result, Err(Error::NotFound(_))));
        assert!(matches!(listing.items[1].result, Err(Error::Crypto(_))));
        assert!(listing.items[2].result.is_ok());
        assert_eq!(listing.failures().count(), 2);
    }

    #[tokio::test]
    async fn test_other_identity_cannot_decrypt() {
        let (service, _, _) = service();
        let alice = identity("0xAA");
        let bob = identity("0xBB");

        service
            .store(&alice, &Secret::credential("email", "alice", "a"))
            .await
            .unwrap();
        let record = service.ledger_client().list(&alice).await.unwrap().remove(0);

        assert!(service.retrieve(&alice, &record).await.is_ok());
        assert!(matches!(
            service.retrieve(&bob, &record).await,
            Err(Error::Crypto(_))
        ));
    }

    #[tokio::test]
    async fn test_passphrase_keys() {
        let store = MemoryContentStore::new();
        let ledger = MemoryLedger::new();
        let alice = identity("0xAA");
        let keys = |passphrase: &[u8]| KeySource::Passphrase {
            passphrase: SensitiveBytes::new(passphrase.to_vec()),
            params: KdfParams {
                memory_cost: 1024,
                time_cost: 1,
                parallelism: 1,
            },
        };

        let writer = VaultService::new(Arc::new(store.clone()), Arc::new(ledger.clone()))
            .with_key_source(keys(b"correct horse"));
        writer
            .store(&alice, &Secret::credential("email", "alice", "a"))
            .await
            .unwrap();

        let listing = writer.retrieve_all(&alice).await.unwrap();
        assert!(listing.items[0].result.is_ok());

        let wrong = VaultService::new(Arc::new(store.clone()), Arc::new(ledger.clone()))
            .with_key_source(keys(b"battery staple"));
        let listing = wrong.retrieve_all(&alice).await.unwrap();
        assert!(matches!(listing.items[0].result, Err(Error::Crypto(_))));

        let identity_only = VaultService::new(Arc::new(store), Arc::new(ledger));
        let listing = identity_only.retrieve_all(&alice).await.unwrap();
        assert!(matches!(listing.items[0].result, Err(Error::Crypto(_))));
    }

    /// Ledger whose first append fails.
    struct FailingAppendLedger {
        inner: MemoryLedger,
        failed: std::sync::atomic::AtomicBool,
    }

    impl FailingAppendLedger {
        fn new() -> Self {
            Self {
                inner: MemoryLedger::new(),
                failed: std::sync::atomic::AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl ReferenceLedger for FailingAppendLedger {
        fn name(&self) -> &str {
            "failing"
        }

        async fn append(&self, identity: &Identity, record: NewRecord) -> Result<u64> {
            if !self.failed.swap(true, Ordering::SeqCst) {
                return Err(Error::Network("transaction dropped".to_string()));
            }
            self.inner.append(identity, record).await
        }

        async fn list(&self, identity: &Identity) -> Result<Vec<LedgerRecord>> {
            self.inner.list(identity).await
        }

        async fn remove(&self, identity: &Identity, index: u64) -> Result<Vec<LedgerRecord>> {
            self.inner.remove(identity, index).await
        }

        async fn get_nonce(&self, identity: &Identity) -> Result<u64> {
            self.inner.get_nonce(identity).await
        }

        async fn generate_nonce(&self, identity: &Identity) -> Result<u64> {
            self.inner.generate_nonce(identity).await
        }
    }

    #[tokio::test]
    async fn test_orphaned_blob_reported() {
        let store = MemoryContentStore::new();
        let service = VaultService::new(
            Arc::new(store.clone()),
            Arc::new(FailingAppendLedger::new()),
        );
        let alice = identity("0xAA");

        let err = service
            .store(&alice, &Secret::credential("email", "alice", "a"))
            .await
            .unwrap_err();
        assert!(err.is_partial());
        let orphan = match err {
            Error::Orphaned { address, source } => {
                assert!(store.get(&address).await.is_ok());
                assert!(matches!(*source, Error::Network(_)));
                address
            }
            other => panic!("unexpected error: {:?}", other),
        };

        // Orphans never show up in listings.
        assert!(service.retrieve_all(&alice).await.unwrap().is_empty());

        // The next store is unaffected by the orphan.
        let receipt = service
            .store(&alice, &Secret::credential("bank", "alice", "b"))
            .await
            .unwrap();
        assert_eq!(receipt.index, 0);
        assert_ne!(receipt.content_address, orphan);

        let listing = service.retrieve_all(&alice).await.unwrap();
        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.items[0].record.content_address, receipt.content_address);
        match secret_of(&listing.items[0]) {
            Secret::Credential(cred) => assert_eq!(cred.account_type, "bank"),
            other => panic!("unexpected secret: {:?}", other),
        }
    }

    /// Ledger whose first `list` waits until released.
    struct GatedLedger {
        inner: MemoryLedger,
        gate: Mutex<Option<oneshot::Receiver<()>>>,
        waiting: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl ReferenceLedger for GatedLedger {
        fn name(&self) -> &str {
            "gated"
        }

        async fn append(&self, identity: &Identity, record: NewRecord) -> Result<u64> {
            self.inner.append(identity, record).await
        }

        async fn list(&self, identity: &Identity) -> Result<Vec<LedgerRecord>> {
            let gate = self.gate.lock().unwrap().take();
            if let Some(gate) = gate {
                self.waiting.store(true, Ordering::SeqCst);
                let _ = gate.await;
            }
            self.inner.list(identity).await
        }

        async fn remove(&self, identity: &Identity, index: u64) -> Result<Vec<LedgerRecord>> {
            self.inner.remove(identity, index).await
        }

        async fn get_nonce(&self, identity: &Identity) -> Result<u64> {
            self.inner.get_nonce(identity).await
        }

        async fn generate_nonce(&self, identity: &Identity) -> Result<u64> {
            self.inner.generate_nonce(identity).await
        }
    }

    #[tokio::test]
    async fn test_last_call_wins() {
        let (release, gate) = oneshot::channel();
        let ledger = Arc::new(GatedLedger {
            inner: MemoryLedger::new(),
            gate: Mutex::new(Some(gate)),
            waiting: std::sync::atomic::AtomicBool::new(false),
        });
        let service = Arc::new(VaultService::new(
            Arc::new(MemoryContentStore::new()),
            ledger.clone(),
        ));
        let alice = identity("0xAA");
        service
            .store(&alice, &Secret::credential("email", "alice", "a"))
            .await
            .unwrap();

        let older = {
            let service = service.clone();
            let alice = alice.clone();
            tokio::spawn(async move { service.retrieve_all(&alice).await })
        };
        while !ledger.waiting.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }

        let newer = service.retrieve_all(&alice).await.unwrap();
        release.send(()).unwrap();

        assert!(matches!(older.await.unwrap(), Err(Error::Superseded)));
        let published = service.last_listing().await.unwrap();
        assert!(Arc::ptr_eq(&published, &newer));
    }

    #[tokio::test]
    async fn test_delete_drops_published_listing() {
        let (service, _, _) = service();
        let alice = identity("0xAA");
        service
            .store(&alice, &Secret::credential("email", "alice", "a"))
            .await
            .unwrap();

        service.retrieve_all(&alice).await.unwrap();
        assert!(service.last_listing().await.is_some());

        service.delete_at(&alice, 0).await.unwrap();
        assert!(service.last_listing().await.is_none());
    }

    struct FixedSigner {
        identity: Identity,
    }

    #[async_trait]
    impl Signer for FixedSigner {
        async fn identity(&self) -> Result<Identity> {
            Ok(self.identity.clone())
        }

        async fn sign(&self, message: &str) -> Result<Signature> {
            Ok(Signature::new(message.as_bytes().iter().rev().copied().collect()))
        }
    }

    #[tokio::test]
    async fn test_login_and_rotate() {
        let (service, _, _) = service();
        let signer = FixedSigner {
            identity: identity("0xAA"),
        };

        let proof = service.login(&signer).await.unwrap();
        assert_eq!(proof.challenge.nonce, 0);
        assert_eq!(proof.challenge.message, "Sign this message to log in. Nonce: 0");
        assert!(!proof.signature.as_bytes().is_empty());

        assert_eq!(service.rotate_nonce(&signer.identity).await.unwrap(), 1);
        let proof = service.login(&signer).await.unwrap();
        assert_eq!(proof.challenge.nonce, 1);
        assert!(proof.challenge.message.ends_with("Nonce: 1"));
    }

    #[tokio::test]
    async fn test_from_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = VaultConfig::local(dir.path());
        let alice = identity("0xAA");

        {
            let service =
                VaultService::from_config(&config, KeySource::Identity, Some(alice.clone()))
                    .unwrap();
            service
                .store(&alice, &Secret::credential("email", "alice", "a"))
                .await
                .unwrap();
            assert!(matches!(
                service.retrieve_all(&identity("0xBB")).await,
                Err(Error::NotAuthorized(_))
            ));
        }

        let reopened = VaultService::from_config(&config, KeySource::Identity, None).unwrap();
        let listing = reopened.retrieve_all(&alice).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert!(listing.items[0].result.is_ok());
    }

    #[test]
    fn test_from_config_requires_passphrase() {
        let config = VaultConfig::local("/tmp/unused").with_key_mode(
            crate::config::KeyMode::Passphrase {
                kdf: KdfParams::interactive(),
            },
        );
        assert!(matches!(
            VaultService::from_config(&config, KeySource::Identity, None),
            Err(Error::InvalidInput(_))
        ));
    }
}
