//! Records of day-to-day operations: complaints, attendance marks and
//! payment settlements.

use chrono::{DateTime, Utc};

/// A `customer_complain` document
#[derive(Debug, Clone, PartialEq)]
pub struct Complaint {
    pub id: String,
    pub raised_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

impl Complaint {
    pub fn is_resolved(&self) -> bool {
        matches!(self.status.as_deref(), Some("resolved") | Some("Resolved"))
    }
}

/// A `partner_attendence` document written by the partner app
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceMark {
    pub id: String,
    pub partner_id: Option<String>,
    pub status: Option<String>,
    /// `startTime`, or `date` when the mark has no start time
    pub marked_at: Option<DateTime<Utc>>,
}

/// One day of attendance as reported by the external attendance service
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub employee_id: i64,
    pub employee_name: String,
    pub mobile_no: String,
    pub assigned_ward: String,
    pub attendance_date: String,
    pub in_time: String,
    pub out_time: Option<String>,
    pub in_address: String,
    pub out_address: String,
}

/// A payment-gateway settlement to the business bank account
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub id: String,
    /// Amount in paise
    pub amount_paise: i64,
    pub created_at: DateTime<Utc>,
}

impl Settlement {
    pub fn amount_rupees(&self) -> f64 {
        self.amount_paise as f64 / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complaint_resolution_accepts_both_casings() {
        let mut complaint = Complaint {
            id: "k1".to_string(),
            raised_at: None,
            status: Some("Resolved".to_string()),
        };
        assert!(complaint.is_resolved());

        complaint.status = Some("resolved".to_string());
        assert!(complaint.is_resolved());

        complaint.status = Some("pending".to_string());
        assert!(!complaint.is_resolved());
    }
}
