use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{Entity, Error, Result};

#[derive(Debug)]
struct Items<T> {
    list: Vec<T>,
    // Largest id ever held by this instance, so deleting the newest item
    // does not hand its id out again.
    high_water: u32,
}

// Repository provides CRUD access to every item of one Entity type.
// All items are kept in memory and mirrored to a single JSON file:
// - $data_dir/
//   - categories.json
//   - customers.json
//   - invoices.json
//   - products.json
// Each mutation rewrites the whole file. Writers hold an exclusive lock for
// the full modify-and-save cycle; readers get a cloned snapshot.
#[derive(Debug)]
pub struct Repository<T> {
    path: PathBuf,
    items: RwLock<Items<T>>,
}

impl<T: Entity> Repository<T> {
    // Open the repository for T inside the given data directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_path(dir.as_ref().join(T::path()))
    }

    // Open a repository backed by an explicit file.
    // A missing file yields an empty collection, as does an empty or
    // malformed one after logging a warning.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let list = load::<T>(&path)?;
        let high_water = list.iter().map(T::id).max().unwrap_or(0);
        log::debug!("Loaded {} {} from {path:?}", list.len(), T::COLLECTION);
        Ok(Self {
            path,
            items: RwLock::new(Items { list, high_water }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // State is only committed after a successful save, so a poisoned lock
    // still guards a consistent collection.
    fn read(&self) -> RwLockReadGuard<'_, Items<T>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Items<T>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_all(&self) -> Vec<T> {
        self.read().list.clone()
    }

    pub fn get_by_id(&self, id: u32) -> Option<T> {
        self.read().list.iter().find(|x| x.id() == id).cloned()
    }

    // Store a new item, returning it with its assigned id.
    // The id is one more than the largest id currently stored or previously
    // handed out by this instance; whatever id the caller set is ignored.
    pub fn add(&self, mut entity: T) -> Result<T> {
        let mut items = self.write();
        let max = items
            .list
            .iter()
            .map(T::id)
            .max()
            .unwrap_or(0)
            .max(items.high_water);
        let id = max
            .checked_add(1)
            .ok_or(Error::IdsExhausted(T::COLLECTION))?;
        entity.set_id(id);

        items.list.push(entity.clone());
        if let Err(e) = self.save(&items.list) {
            items.list.pop();
            return Err(e);
        }
        items.high_water = id;
        log::debug!("Added {} {id}", T::NAME);
        Ok(entity)
    }

    // Replace the item with the same id as `entity`, keeping its position.
    // Returns None, without touching the file, if there is no such item.
    pub fn update(&self, entity: T) -> Result<Option<T>> {
        let mut items = self.write();
        let id = entity.id();
        let Some(idx) = items.list.iter().position(|x| x.id() == id) else {
            log::debug!("No {} {id} to update", T::NAME);
            return Ok(None);
        };

        let previous = std::mem::replace(&mut items.list[idx], entity.clone());
        if let Err(e) = self.save(&items.list) {
            items.list[idx] = previous;
            return Err(e);
        }
        log::debug!("Updated {} {id}", T::NAME);
        Ok(Some(entity))
    }

    // Remove the item with the given id, returning it.
    // Returns None, without touching the file, if there is no such item.
    pub fn delete(&self, id: u32) -> Result<Option<T>> {
        let mut items = self.write();
        let Some(idx) = items.list.iter().position(|x| x.id() == id) else {
            log::debug!("No {} {id} to delete", T::NAME);
            return Ok(None);
        };

        let removed = items.list.remove(idx);
        if let Err(e) = self.save(&items.list) {
            items.list.insert(idx, removed);
            return Err(e);
        }
        log::debug!("Deleted {} {id}", T::NAME);
        Ok(Some(removed))
    }

    // Write the whole collection to a temp file next to the target, then
    // rename it over the target. A failed save leaves the old file intact.
    fn save(&self, items: &[T]) -> Result<()> {
        let path = &self.path;
        log::trace!("Saving {} {} to {path:?}", items.len(), T::COLLECTION);
        let json = serde_json::to_vec_pretty(items).map_err(|source| Error::Encode {
            path: path.clone(),
            source,
        })?;

        let write_failed = |source: std::io::Error| Error::WriteFailed {
            path: path.clone(),
            source,
        };
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_failed)?;

        // Temp files are private by default; the store keeps the mode of the
        // file it replaces, or the umask default when it is new.
        let existing = fs::metadata(path)
            .ok()
            .filter(|m| m.is_file())
            .map(|m| m.permissions());
        let mut builder = tempfile::Builder::new();
        if existing.is_none() {
            if let Some(perms) = new_file_permissions() {
                builder.permissions(perms);
            }
        }
        let mut tmp = builder.tempfile_in(dir).map_err(write_failed)?;
        if let Some(perms) = existing {
            tmp.as_file().set_permissions(perms).map_err(write_failed)?;
        }
        tmp.write_all(&json).map_err(write_failed)?;
        tmp.as_file().sync_all().map_err(write_failed)?;
        tmp.persist(path).map_err(|e| write_failed(e.error))?;
        Ok(())
    }
}

// rw for everyone, narrowed by the process umask on creation.
#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt as _;
    Some(fs::Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

fn load<T: Entity>(path: &Path) -> Result<Vec<T>> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No {} store at {path:?}, starting empty", T::COLLECTION);
            return Ok(vec![]);
        }
        Err(source) => {
            return Err(Error::StoreUnavailable {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(list) => Ok(list),
        Err(e) => {
            log::warn!("Ignoring malformed {} store {path:?}: {e}", T::COLLECTION);
            Ok(vec![])
        }
    }
}
