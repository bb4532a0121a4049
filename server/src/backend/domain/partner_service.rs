//! Partner directory and the top-partners leaderboard.

use chrono::{DateTime, Utc};
use csv::QuoteStyle;
use futures::future::try_join_all;
use futures::try_join;
use std::cmp::Reverse;
use tracing::{error, info};

use shared::{PartnerListResponse, PartnerRow, PartnerScope, PartnerType, PartnerTypeFilter, TopPartner};

use crate::backend::domain::calendar::BusinessCalendar;
use crate::backend::domain::commands::partners::PartnerListQuery;
use crate::backend::domain::error::{DashboardError, DashboardResult};
use crate::backend::domain::export_service::{ExportFile, ExportTable};
use crate::backend::domain::metrics::round_to;
use crate::backend::domain::models::{Customer, PartnerStatus, ProviderAllowlist};
use crate::backend::storage::{BookingStorage, CatalogStorage, Connection, CustomerStorage, WalletStorage};

const LIST_FAILED: &str = "Failed to load partners";

/// A partner document with its resolved service name
#[derive(Debug, Clone)]
struct PartnerEntry {
    customer: Customer,
    joined: DateTime<Utc>,
    partner_type: PartnerType,
    status: PartnerStatus,
    service_opt_name: Option<String>,
}

impl PartnerEntry {
    fn name(&self) -> &str {
        self.customer.display_name.as_deref().unwrap_or("Unknown")
    }

    fn phone(&self) -> &str {
        self.customer.phone_number.as_deref().unwrap_or("N/A")
    }

    fn matches(&self, query: &PartnerListQuery, allowlist: &ProviderAllowlist, calendar: &BusinessCalendar) -> bool {
        if let Some(range) = &query.joined {
            if !range.contains(calendar.local_date(self.joined)) {
                return false;
            }
        }

        if let Some(term) = query.search.as_deref().filter(|t| !t.is_empty()) {
            let lowered = term.to_lowercase();
            let found = self.name().to_lowercase().contains(&lowered)
                || self.phone().contains(term)
                || self
                    .service_opt_name
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(&lowered));
            if !found {
                return false;
            }
        }

        let type_matches = match query.partner_type {
            PartnerTypeFilter::All => true,
            PartnerTypeFilter::Provider => self.partner_type == PartnerType::Provider,
            PartnerTypeFilter::Agency => self.partner_type == PartnerType::Agency,
        };
        let scope_matches = match query.scope {
            PartnerScope::All => true,
            PartnerScope::Specific => allowlist.contains(&self.customer.id),
        };
        let status_matches = match query.status.as_deref() {
            None | Some("All") | Some("") => true,
            Some(status) => self.status.as_str() == status,
        };

        type_matches && scope_matches && status_matches
    }

    fn to_row(&self) -> PartnerRow {
        PartnerRow {
            id: self.customer.id.clone(),
            display_name: self.name().to_string(),
            phone_number: self.phone().to_string(),
            partner_type: self.partner_type,
            join_date: self.joined.to_rfc3339(),
            status: self.status.to_string(),
            service_opt_name: self.service_opt_name.clone(),
        }
    }
}

fn partner_type_label(partner_type: PartnerType) -> &'static str {
    match partner_type {
        PartnerType::Provider => "provider",
        PartnerType::Agency => "agency",
    }
}

#[derive(Clone)]
pub struct PartnerService<C: Connection> {
    customers: C::CustomerRepository,
    bookings: C::BookingRepository,
    catalog: C::CatalogRepository,
    wallets: C::WalletRepository,
    allowlist: ProviderAllowlist,
    calendar: BusinessCalendar,
}

impl<C: Connection> PartnerService<C> {
    pub fn new(connection: &C, allowlist: ProviderAllowlist, calendar: BusinessCalendar) -> Self {
        Self {
            customers: connection.create_customer_repository(),
            bookings: connection.create_booking_repository(),
            catalog: connection.create_catalog_repository(),
            wallets: connection.create_wallet_repository(),
            allowlist,
            calendar,
        }
    }

    /// Every provider and agency partner, newest first
    async fn entries(&self) -> DashboardResult<Vec<PartnerEntry>> {
        let partners = self.customers.list_partners().await.map_err(|e| {
            error!("Partner listing failed: {:#}", e);
            DashboardError::storage(LIST_FAILED, e)
        })?;

        let mut service_ids: Vec<String> = Vec::new();
        for id in partners.iter().filter_map(|p| p.partner_service_opt.as_ref()) {
            if !service_ids.contains(id) {
                service_ids.push(id.clone());
            }
        }
        let service_names = self.catalog.subcategory_names(&service_ids).await.map_err(|e| {
            error!("Service option lookup failed: {:#}", e);
            DashboardError::storage(LIST_FAILED, e)
        })?;

        let mut entries: Vec<PartnerEntry> = partners
            .into_iter()
            .map(|customer| PartnerEntry {
                joined: customer.created_time.unwrap_or_default(),
                partner_type: if customer.roles.agency {
                    PartnerType::Agency
                } else {
                    PartnerType::Provider
                },
                status: PartnerStatus::parse(customer.partner_status.as_deref()),
                service_opt_name: customer
                    .partner_service_opt
                    .as_ref()
                    .map(|id| service_names.get(id).cloned().unwrap_or_else(|| "Unknown".to_string())),
                customer,
            })
            .collect();
        entries.sort_by_key(|entry| Reverse(entry.joined));
        Ok(entries)
    }

    async fn filtered(&self, query: &PartnerListQuery) -> DashboardResult<Vec<PartnerEntry>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .filter(|entry| entry.matches(query, &self.allowlist, &self.calendar))
            .collect())
    }

    pub async fn list(&self, query: &PartnerListQuery) -> DashboardResult<PartnerListResponse> {
        let partners: Vec<PartnerRow> = self.filtered(query).await?.iter().map(PartnerEntry::to_row).collect();
        info!("Listing {} partners", partners.len());
        Ok(PartnerListResponse {
            total: partners.len(),
            partners,
        })
    }

    /// Filtered partners as a CSV with every cell quoted
    pub async fn export_csv(&self, query: &PartnerListQuery) -> DashboardResult<ExportFile> {
        let partners = self.filtered(query).await?;
        let mut table = ExportTable::new(
            "Partners",
            &["Partner ID", "Name", "Phone", "Type", "Service Opt", "Join Date", "Status"],
        );
        for entry in &partners {
            table.push_row(vec![
                entry.customer.id.as_str().into(),
                entry.name().into(),
                entry.phone().into(),
                partner_type_label(entry.partner_type).into(),
                entry.service_opt_name.as_deref().unwrap_or("N/A").into(),
                self.calendar
                    .short_date_label(self.calendar.local_date(entry.joined))
                    .into(),
                entry.status.to_string().into(),
            ]);
        }

        let filename = match &query.joined {
            Some(range) => format!("partners_{}_to_{}.csv", range.from, range.to),
            None => "partners.csv".to_string(),
        };
        let bytes = table
            .to_csv(QuoteStyle::Always)
            .map_err(|e| DashboardError::storage("Failed to export partners", e))?;
        Ok(ExportFile::csv(&filename, bytes))
    }

    async fn leaderboard_entry(&self, partner: &Customer) -> anyhow::Result<TopPartner> {
        let (bookings, wallet) = try_join!(
            self.bookings.list_partner_bookings(&partner.id, None),
            self.wallets.get_wallet_overview(&partner.id),
        )?;
        let wallet = wallet.unwrap_or_default();

        Ok(TopPartner {
            id: partner.id.clone(),
            name: partner.preferred_name().unwrap_or("Unknown Partner").to_string(),
            completed_bookings: bookings.iter().filter(|b| b.status.is_completed()).count(),
            total_bookings: bookings.len(),
            avg_rating: round_to(partner.rating.unwrap_or(0.0), 1),
            earnings: wallet.total_earned,
            pending_payouts: wallet.pending_amount,
        })
    }

    /// Allowlisted partners ranked by completed bookings, then total bookings
    pub async fn top(&self) -> DashboardResult<Vec<TopPartner>> {
        let load_failed = |e| {
            error!("Top partners query failed: {:#}", e);
            DashboardError::storage("Failed to load top partners", e)
        };

        let partners = self
            .customers
            .get_customers(self.allowlist.ids())
            .await
            .map_err(load_failed)?;
        let mut ranked = try_join_all(partners.iter().map(|p| self.leaderboard_entry(p)))
            .await
            .map_err(load_failed)?;
        ranked.sort_by_key(|p| Reverse((p.completed_bookings, p.total_bookings)));
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::calendar::DateRange;
    use crate::backend::storage::document::{Document, FieldValue};
    use crate::backend::storage::{DocumentConnection, MemoryDocumentStore};
    use chrono::{NaiveDate, TimeZone};
    use std::collections::BTreeMap;

    fn partner(id: &str, role: &str, name: &str, joined: (u32, u32)) -> Document {
        let mut roles = BTreeMap::new();
        roles.insert(role.to_string(), FieldValue::Bool(true));
        Document::new("customer", id)
            .with("userType", roles)
            .with("display_name", name)
            .with("created_time", Utc.with_ymd_and_hms(2025, joined.0, joined.1, 6, 0, 0).unwrap())
    }

    fn booking(id: &str, provider: &str, status: &str) -> Document {
        Document::new("bookings", id)
            .with("provider_id", FieldValue::reference("customer", provider))
            .with("status", status)
            .with("date", Utc.with_ymd_and_hms(2025, 5, 1, 6, 0, 0).unwrap())
    }

    fn service() -> PartnerService<DocumentConnection> {
        let store = MemoryDocumentStore::new()
            .with_documents(vec![
                partner("p1", "provider", "Ravi", (4, 2))
                    .with("phone_number", "98111")
                    .with("partner_status", "Onboarded")
                    .with("partner_serviceOpt", FieldValue::reference("service_subcategories", "s1"))
                    .with("rating", 4.46),
                partner("p2", "provider", "Kiran", (5, 10)).with("partner_serviceOpt", FieldValue::reference("service_subcategories", "gone")),
                partner("a1", "AgencyPartner", "CleanCo", (3, 15)).with("partner_status", "Id_Generated"),
                Document::new("service_subcategories", "s1").with("name", "Bathroom Cleaning"),
                booking("b1", "p1", "Service_Completed"),
                booking("b2", "p1", "Service_Completed"),
                booking("b3", "p1", "Pending"),
                booking("b4", "p2", "Service_Completed"),
                Document::new("Wallet_Overall", "w1")
                    .with("service_partner_id", FieldValue::reference("customer", "p1"))
                    .with("TotalAmountComeIn_Wallet", 12000i64)
                    .with("pending_amount", 500i64),
            ])
            .unwrap();
        PartnerService::new(
            &DocumentConnection::in_memory(store),
            ProviderAllowlist::new(vec!["p1".to_string(), "p2".to_string()]),
            BusinessCalendar::default(),
        )
    }

    fn ids(response: &PartnerListResponse) -> Vec<&str> {
        response.partners.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_resolves_service_names_newest_first() {
        let response = service().list(&PartnerListQuery::default()).await.unwrap();
        assert_eq!(ids(&response), vec!["p2", "p1", "a1"]);
        assert_eq!(response.total, 3);

        let kiran = &response.partners[0];
        assert_eq!(kiran.service_opt_name.as_deref(), Some("Unknown"));
        assert_eq!(kiran.phone_number, "N/A");
        assert_eq!(kiran.status, "Information_Unverified");

        let ravi = &response.partners[1];
        assert_eq!(ravi.service_opt_name.as_deref(), Some("Bathroom Cleaning"));
        assert_eq!(response.partners[2].partner_type, PartnerType::Agency);
        assert_eq!(response.partners[2].service_opt_name, None);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let service = service();

        let by_service = PartnerListQuery {
            search: Some("bathroom".to_string()),
            ..PartnerListQuery::default()
        };
        assert_eq!(ids(&service.list(&by_service).await.unwrap()), vec!["p1"]);

        let agencies = PartnerListQuery {
            partner_type: PartnerTypeFilter::Agency,
            ..PartnerListQuery::default()
        };
        assert_eq!(ids(&service.list(&agencies).await.unwrap()), vec!["a1"]);

        let allowlisted = PartnerListQuery {
            scope: PartnerScope::Specific,
            status: Some("Onboarded".to_string()),
            ..PartnerListQuery::default()
        };
        assert_eq!(ids(&service.list(&allowlisted).await.unwrap()), vec!["p1"]);

        let april = PartnerListQuery {
            joined: Some(
                DateRange::new(
                    NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                    NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
                )
                .unwrap(),
            ),
            ..PartnerListQuery::default()
        };
        assert_eq!(ids(&service.list(&april).await.unwrap()), vec!["p1"]);
    }

    #[tokio::test]
    async fn test_export_quotes_every_cell() {
        let file = service().export_csv(&PartnerListQuery::default()).await.unwrap();
        assert_eq!(file.filename, "partners.csv");
        let text = String::from_utf8(file.bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("\"Partner ID\",\"Name\",\"Phone\",\"Type\",\"Service Opt\",\"Join Date\",\"Status\"")
        );
        assert_eq!(
            lines.nth(1),
            Some("\"p1\",\"Ravi\",\"98111\",\"provider\",\"Bathroom Cleaning\",\"02/04/2025\",\"Onboarded\"")
        );
    }

    #[tokio::test]
    async fn test_top_partners_ranked_by_completed_bookings() {
        let top = service().top().await.unwrap();
        assert_eq!(top.len(), 2);

        assert_eq!(top[0].id, "p1");
        assert_eq!(top[0].completed_bookings, 2);
        assert_eq!(top[0].total_bookings, 3);
        assert_eq!(top[0].avg_rating, 4.5);
        assert_eq!(top[0].earnings, 12000.0);
        assert_eq!(top[0].pending_payouts, 500.0);

        assert_eq!(top[1].id, "p2");
        assert_eq!(top[1].earnings, 0.0);
    }
}
