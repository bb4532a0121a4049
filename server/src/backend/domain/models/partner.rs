use std::fmt;
use std::sync::Arc;

/// Onboarding status of a partner (`partner_status`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartnerStatus {
    DocumentsUploaded,
    Onboarded,
    InformationVerified,
    IdGenerated,
    RegistrationFormFilled,
    InformationUnverified,
    Other(String),
}

impl PartnerStatus {
    /// Missing status means the partner has not been verified yet
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => PartnerStatus::InformationUnverified,
            Some("DocumentsUploaded") => PartnerStatus::DocumentsUploaded,
            Some("Onboarded") => PartnerStatus::Onboarded,
            Some("Information_Verified") => PartnerStatus::InformationVerified,
            Some("Id_Generated") => PartnerStatus::IdGenerated,
            Some("RegistrationFormFilled") => PartnerStatus::RegistrationFormFilled,
            Some("Information_Unverified") => PartnerStatus::InformationUnverified,
            Some(other) => PartnerStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PartnerStatus::DocumentsUploaded => "DocumentsUploaded",
            PartnerStatus::Onboarded => "Onboarded",
            PartnerStatus::InformationVerified => "Information_Verified",
            PartnerStatus::IdGenerated => "Id_Generated",
            PartnerStatus::RegistrationFormFilled => "RegistrationFormFilled",
            PartnerStatus::InformationUnverified => "Information_Unverified",
            PartnerStatus::Other(raw) => raw.as_str(),
        }
    }
}

impl fmt::Display for PartnerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partners whose bookings count towards business metrics.
///
/// Cheap to clone; shared by every service through `AppState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAllowlist {
    ids: Arc<Vec<String>>,
}

impl ProviderAllowlist {
    pub fn new(ids: Vec<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.trim().to_string();
            if !id.is_empty() && !unique.contains(&id) {
                unique.push(id);
            }
        }
        Self { ids: Arc::new(unique) }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}
