use std::sync::Arc;

use crate::{Category, Customer, Entity, Invoice, Product, Repository, Result};

pub type ProductService = Service<Product>;
pub type CategoryService = Service<Category>;
pub type CustomerService = Service<Customer>;
pub type InvoiceService = Service<Invoice>;

// Service is the entry point the HTTP layer uses for one entity type.
// It adds nothing to the repository beyond sharing it: `None` means the id
// does not exist, `Err` means the store failed.
#[derive(Debug)]
pub struct Service<T> {
    repo: Arc<Repository<T>>,
}

// Derived Clone would require T: Clone.
impl<T> Clone for Service<T> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<T: Entity> Service<T> {
    pub fn new(repo: Arc<Repository<T>>) -> Self {
        Self { repo }
    }

    pub fn get_all(&self) -> Vec<T> {
        self.repo.get_all()
    }

    pub fn get_by_id(&self, id: u32) -> Option<T> {
        self.repo.get_by_id(id)
    }

    pub fn add(&self, entity: T) -> Result<T> {
        self.repo.add(entity)
    }

    pub fn update(&self, entity: T) -> Result<Option<T>> {
        self.repo.update(entity)
    }

    pub fn delete(&self, id: u32) -> Result<Option<T>> {
        self.repo.delete(id)
    }
}

#[test]
fn test_service_shares_repository() {
    let tmp = tempfile::tempdir().unwrap();
    let repo = Arc::new(Repository::<Category>::open(tmp.path()).unwrap());
    let a = CategoryService::new(Arc::clone(&repo));
    let b = a.clone();

    let added = a
        .add(Category {
            name: "Tools".into(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(b.get_by_id(added.id), Some(added.clone()));
    assert_eq!(repo.get_all(), vec![added]);

    assert_eq!(b.get_by_id(5), None);
    assert_eq!(b.delete(5).unwrap(), None);
    assert!(a.delete(1).unwrap().is_some());
    assert!(b.get_all().is_empty());
}
