//! Conversions between stored rows and contract records. Decoding rejects
//! enumerated values outside their closed sets.

use sea_orm::ActiveValue::Set;

use crate::contract::model::{Appointment, Case, Client, UnknownVariant};
use crate::infra::storage::entity::{appointment, case, client};

pub fn client_from_row(m: client::Model) -> Client {
    Client {
        id: m.id,
        first_name: m.first_name,
        last_name: m.last_name,
        email: m.email,
        phone: m.phone,
        address: m.address,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

pub fn client_to_active(c: Client) -> client::ActiveModel {
    client::ActiveModel {
        id: Set(c.id),
        first_name: Set(c.first_name),
        last_name: Set(c.last_name),
        email: Set(c.email),
        phone: Set(c.phone),
        address: Set(c.address),
        created_at: Set(c.created_at),
        updated_at: Set(c.updated_at),
    }
}

pub fn case_from_row(m: case::Model) -> Result<Case, UnknownVariant> {
    Ok(Case {
        id: m.id,
        client_id: m.client_id,
        title: m.title,
        description: m.description,
        case_number: m.case_number,
        status: m.status.parse()?,
        priority: m.priority.parse()?,
        start_date: m.start_date,
        court_date: m.court_date,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub fn case_to_active(c: Case) -> case::ActiveModel {
    case::ActiveModel {
        id: Set(c.id),
        client_id: Set(c.client_id),
        title: Set(c.title),
        description: Set(c.description),
        case_number: Set(c.case_number),
        status: Set(c.status.as_str().to_string()),
        priority: Set(c.priority.as_str().to_string()),
        start_date: Set(c.start_date),
        court_date: Set(c.court_date),
        created_at: Set(c.created_at),
        updated_at: Set(c.updated_at),
    }
}

pub fn appointment_from_row(m: appointment::Model) -> Result<Appointment, UnknownVariant> {
    Ok(Appointment {
        id: m.id,
        client_id: m.client_id,
        case_id: m.case_id,
        title: m.title,
        description: m.description,
        appointment_date: m.appointment_date,
        duration: m.duration,
        status: m.status.parse()?,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub fn appointment_to_active(a: Appointment) -> appointment::ActiveModel {
    appointment::ActiveModel {
        id: Set(a.id),
        client_id: Set(a.client_id),
        case_id: Set(a.case_id),
        title: Set(a.title),
        description: Set(a.description),
        appointment_date: Set(a.appointment_date),
        duration: Set(a.duration),
        status: Set(a.status.as_str().to_string()),
        created_at: Set(a.created_at),
        updated_at: Set(a.updated_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{CasePriority, CaseStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn row(status: &str) -> case::Model {
        let now = Utc::now();
        case::Model {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            title: "Property Dispute".into(),
            description: None,
            case_number: Some("CASE-2024-001".into()),
            status: status.into(),
            priority: "high".into(),
            start_date: now,
            court_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn decodes_stored_enums() {
        let case = case_from_row(row("pending")).unwrap();
        assert_eq!(case.status, CaseStatus::Pending);
        assert_eq!(case.priority, CasePriority::High);
    }

    #[test]
    fn rejects_unknown_stored_enum() {
        let err = case_from_row(row("frozen")).unwrap_err();
        assert_eq!(err.kind, "case status");
    }
}
