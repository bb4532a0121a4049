use anyhow::Result;
use async_trait::async_trait;
use futures::try_join;
use std::collections::HashSet;
use std::sync::Arc;

use super::{customer_ref, query_in_chunks, CUSTOMER_COLLECTION};
use crate::backend::domain::calendar::TimeWindow;
use crate::backend::domain::models::{Customer, UserRoles};
use crate::backend::storage::document::{Direction, Document, DocumentQuery, DOCUMENT_ID_FIELD};
use crate::backend::storage::repositories::sort_documents;
use crate::backend::storage::traits::{CustomerStorage, DocumentStore};

#[derive(Clone)]
pub struct CustomerRepository {
    store: Arc<dyn DocumentStore>,
}

impl CustomerRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

pub(crate) fn decode_customer(document: &Document) -> Customer {
    let mut customer = Customer::new(&document.id);
    customer.uid = document.text("uid");
    customer.display_name = document.text("display_name");
    customer.customer_name = document.text("customer_name");
    customer.name = document.text("name");
    customer.email = document.text("email");
    customer.phone_number = document.text("phone_number");
    customer.contact_no = document.text("contact_no");
    customer.created_time = document.timestamp("created_time");
    customer.referral_code = document.text("referralCode");
    customer.referral_by = document.text("referralBy");
    customer.roles = UserRoles {
        customer: document.flag("userType.customer"),
        provider: document.flag("userType.provider"),
        agency: document.flag("userType.AgencyPartner"),
    };
    customer.partner_status = document.text("partner_status");
    customer.partner_service_opt = document.reference_id("partner_serviceOpt");
    customer.rating = document.opt_number("rating");
    customer
}

#[async_trait]
impl CustomerStorage for CustomerRepository {
    async fn get_customer(&self, id: &str) -> Result<Option<Customer>> {
        let path = format!("{}/{}", CUSTOMER_COLLECTION, id);
        Ok(self.store.get_document(&path).await?.as_ref().map(decode_customer))
    }

    async fn get_customers(&self, ids: &[String]) -> Result<Vec<Customer>> {
        let mut unique: Vec<&String> = Vec::new();
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        let refs = unique.iter().map(|id| customer_ref(id)).collect();
        let query = DocumentQuery::collection(CUSTOMER_COLLECTION);
        let documents = query_in_chunks(self.store.as_ref(), &query, DOCUMENT_ID_FIELD, refs).await?;
        Ok(documents.iter().map(decode_customer).collect())
    }

    async fn list_customers_created_between(&self, window: &TimeWindow) -> Result<Vec<Customer>> {
        let query = DocumentQuery::collection(CUSTOMER_COLLECTION)
            .where_eq("userType.customer", true)
            .where_between("created_time", window.start, window.end);
        let mut documents = self.store.run_query(&query).await?;
        sort_documents(&mut documents, "created_time", Direction::Descending);
        Ok(documents.iter().map(decode_customer).collect())
    }

    async fn list_partners(&self) -> Result<Vec<Customer>> {
        let providers = DocumentQuery::collection(CUSTOMER_COLLECTION).where_eq("userType.provider", true);
        let agencies = DocumentQuery::collection(CUSTOMER_COLLECTION).where_eq("userType.AgencyPartner", true);
        let (providers, agencies) = try_join!(self.store.run_query(&providers), self.store.run_query(&agencies))?;

        let mut seen = HashSet::new();
        Ok(providers
            .iter()
            .chain(agencies.iter())
            .filter(|document| seen.insert(document.id.clone()))
            .map(decode_customer)
            .collect())
    }

    async fn list_referred_customers(&self, referral_code: &str) -> Result<Vec<Customer>> {
        let query = DocumentQuery::collection(CUSTOMER_COLLECTION).where_eq("referralBy", referral_code);
        let documents = self.store.run_query(&query).await?;
        Ok(documents.iter().map(decode_customer).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::document::FieldValue;
    use crate::backend::storage::memory::MemoryDocumentStore;
    use std::collections::BTreeMap;

    fn roles(pairs: &[(&str, bool)]) -> BTreeMap<String, FieldValue> {
        pairs.iter().map(|(k, v)| (k.to_string(), FieldValue::Bool(*v))).collect()
    }

    #[tokio::test]
    async fn test_partners_include_agencies_once() {
        let store = MemoryDocumentStore::new()
            .with_documents(vec![
                Document::new("customer", "p1").with("userType", roles(&[("provider", true)])),
                Document::new("customer", "a1").with("userType", roles(&[("AgencyPartner", true)])),
                Document::new("customer", "both")
                    .with("userType", roles(&[("provider", true), ("AgencyPartner", true)])),
                Document::new("customer", "c1").with("userType", roles(&[("customer", true)])),
            ])
            .unwrap();
        let repository = CustomerRepository::new(Arc::new(store));

        let mut ids: Vec<String> = repository
            .list_partners()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["a1", "both", "p1"]);
    }

    #[tokio::test]
    async fn test_get_customers_skips_unknown_ids() {
        let store = MemoryDocumentStore::new()
            .with_documents(vec![Document::new("customer", "c1").with("display_name", "Asha")])
            .unwrap();
        let repository = CustomerRepository::new(Arc::new(store));

        let found = repository
            .get_customers(&["c1".to_string(), "missing".to_string(), "c1".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].preferred_name(), Some("Asha"));
    }
}
