use chrono::{DateTime, Utc};

/// Role flags stored under `userType` on a customer document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserRoles {
    pub customer: bool,
    pub provider: bool,
    pub agency: bool,
}

/// A document from the `customer` collection. Partners live in the same
/// collection and are distinguished by their role flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: String,
    pub uid: Option<String>,
    pub display_name: Option<String>,
    pub customer_name: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub contact_no: Option<String>,
    pub created_time: Option<DateTime<Utc>>,
    pub referral_code: Option<String>,
    pub referral_by: Option<String>,
    pub roles: UserRoles,
    pub partner_status: Option<String>,
    /// Id of the partner's `service_subcategories` document
    pub partner_service_opt: Option<String>,
    pub rating: Option<f64>,
}

impl Customer {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            uid: None,
            display_name: None,
            customer_name: None,
            name: None,
            email: None,
            phone_number: None,
            contact_no: None,
            created_time: None,
            referral_code: None,
            referral_by: None,
            roles: UserRoles::default(),
            partner_status: None,
            partner_service_opt: None,
            rating: None,
        }
    }

    /// First populated of display name, customer name and name
    pub fn preferred_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .or(self.customer_name.as_deref())
            .or(self.name.as_deref())
    }

    /// Phone number, falling back to the contact number
    pub fn preferred_phone(&self) -> Option<&str> {
        self.phone_number.as_deref().or(self.contact_no.as_deref())
    }
}
