use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::query_in_chunks;
use crate::backend::storage::document::{DocumentQuery, FieldValue, DOCUMENT_ID_FIELD};
use crate::backend::storage::traits::{CatalogStorage, DocumentStore};

const CART: &str = "cart";
const SUBCATEGORIES: &str = "service_subcategories";

#[derive(Clone)]
pub struct CatalogRepository {
    store: Arc<dyn DocumentStore>,
}

impl CatalogRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CatalogStorage for CatalogRepository {
    async fn category_name_for_cart(&self, cart_path: &str) -> Result<Option<String>> {
        let cart = match self.store.get_document(cart_path).await? {
            Some(cart) => cart,
            None => return Ok(None),
        };
        let category_path = match cart.reference("service_subCategory") {
            Some(path) => path,
            None => return Ok(None),
        };
        Ok(self
            .store
            .get_document(&category_path)
            .await?
            .and_then(|category| category.text("name")))
    }

    async fn cart_service_names(&self, cart_path: &str) -> Result<Vec<String>> {
        let query = DocumentQuery::collection(CART).where_eq("subCategoryCartId", FieldValue::Reference(cart_path.to_string()));
        let documents = self.store.run_query(&query).await?;
        Ok(documents
            .iter()
            .map(|cart| {
                cart.text("service_name")
                    .or_else(|| cart.text("serviceName"))
                    .unwrap_or_else(|| "Unknown Service".to_string())
            })
            .collect())
    }

    async fn subcategory_names(&self, ids: &[String]) -> Result<HashMap<String, String>> {
        let refs = ids.iter().map(|id| FieldValue::reference(SUBCATEGORIES, id)).collect();
        let query = DocumentQuery::collection(SUBCATEGORIES);
        let documents = query_in_chunks(self.store.as_ref(), &query, DOCUMENT_ID_FIELD, refs).await?;
        Ok(documents
            .into_iter()
            .filter_map(|document| {
                let name = document.text("name")?;
                Some((document.id, name))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::document::Document;
    use crate::backend::storage::memory::MemoryDocumentStore;

    fn catalog() -> CatalogRepository {
        let store = MemoryDocumentStore::new()
            .with_documents(vec![
                Document::new("cart", "k1").with("service_subCategory", FieldValue::reference("Service_Categories", "cat1")),
                Document::new("Service_Categories", "cat1").with("name", "Home Cleaning"),
                Document::new("cart", "line1")
                    .with("subCategoryCartId", FieldValue::reference("cart", "k1"))
                    .with("service_name", "2 Bathroom Deep Clean"),
                Document::new("cart", "line2").with("subCategoryCartId", FieldValue::reference("cart", "k1")),
                Document::new("service_subcategories", "s1").with("name", "Electrician"),
            ])
            .unwrap();
        CatalogRepository::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_category_name_follows_cart_reference() {
        let catalog = catalog();
        assert_eq!(
            catalog.category_name_for_cart("cart/k1").await.unwrap().as_deref(),
            Some("Home Cleaning")
        );
        assert_eq!(catalog.category_name_for_cart("cart/missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cart_service_names_default_to_unknown() {
        let mut names = catalog().cart_service_names("cart/k1").await.unwrap();
        names.sort();
        assert_eq!(names, vec!["2 Bathroom Deep Clean", "Unknown Service"]);
    }

    #[tokio::test]
    async fn test_subcategory_names_by_id() {
        let names = catalog()
            .subcategory_names(&["s1".to_string(), "s2".to_string()])
            .await
            .unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names.get("s1").map(String::as_str), Some("Electrician"));
    }
}
