//! Simple file-backed [`CounterStore`] for single-host deployments and bots.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	clock,
	store::{
		CompareAndSwapOutcome, CounterStore, CounterValue, StoreError, StoreFuture, StoreKey,
		StoredEntry,
	},
};

/// Persists counters to a JSON snapshot after each mutation.
///
/// Entries carry absolute expiry stamps, so TTLs keep their meaning across
/// process restarts; already-expired entries are dropped while loading.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<StoreKey, StoredEntry>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { HashMap::new() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<StoreKey, StoredEntry>, StoreError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;
		let mut deserializer = serde_json::Deserializer::from_slice(&bytes);
		let entries: Vec<(StoreKey, StoredEntry)> =
			serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
				StoreError::Serialization {
					message: format!(
						"Failed to parse {} at {}: {}",
						path.display(),
						e.path(),
						e.inner()
					),
				}
			})?;
		let now_ms = clock::unix_ms(OffsetDateTime::now_utc());

		Ok(entries.into_iter().filter(|(_, entry)| entry.expires_at_ms > now_ms).collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<StoreKey, StoredEntry>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot: Vec<_> = contents.iter().collect();
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CounterStore for FileStore {
	fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, Option<CounterValue>> {
		Box::pin(async move {
			let now_ms = clock::unix_ms(OffsetDateTime::now_utc());

			Ok(self.inner.read().get(key).and_then(|entry| entry.live(now_ms)).cloned())
		})
	}

	fn set(&self, key: StoreKey, value: CounterValue, ttl: Duration) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let now = OffsetDateTime::now_utc();
			let mut guard = self.inner.write();

			guard.retain(|_, entry| entry.expires_at_ms > clock::unix_ms(now));
			guard.insert(key, StoredEntry::new(value, ttl, now));
			self.persist_locked(&guard)?;

			Ok(())
		})
	}

	fn delete<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let now_ms = clock::unix_ms(OffsetDateTime::now_utc());
			let mut guard = self.inner.write();

			guard.retain(|_, entry| entry.expires_at_ms > now_ms);
			guard.remove(key);
			self.persist_locked(&guard)?;

			Ok(())
		})
	}

	fn compare_and_swap<'a>(
		&'a self,
		key: &'a StoreKey,
		expected: Option<&'a CounterValue>,
		replacement: CounterValue,
		ttl: Duration,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		Box::pin(async move {
			let now = OffsetDateTime::now_utc();
			let now_ms = clock::unix_ms(now);
			let mut guard = self.inner.write();

			guard.retain(|_, entry| entry.expires_at_ms > now_ms);

			let current = guard.get(key).and_then(|entry| entry.live(now_ms));
			let outcome = match (current, expected) {
				(None, None) => CompareAndSwapOutcome::Updated,
				(None, Some(_)) => CompareAndSwapOutcome::Missing,
				(Some(cur), Some(exp)) if cur == exp => CompareAndSwapOutcome::Updated,
				_ => CompareAndSwapOutcome::Mismatch,
			};

			if matches!(outcome, CompareAndSwapOutcome::Updated) {
				guard.insert(key.clone(), StoredEntry::new(replacement, ttl, now));
				self.persist_locked(&guard)?;
			}

			Ok(outcome)
		})
	}
}
