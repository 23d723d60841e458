//! The in-process API published by the module after `init`.

mod common;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use law_office::contract::{
    EntityKind, LawOfficeApi, LawOfficeError, NewAppointment, NewCase, NewClient, Reference,
};
use law_office::search::client_matches;

fn john() -> NewClient {
    NewClient {
        first_name: "John".into(),
        last_name: "Doe".into(),
        email: "john@example.com".into(),
        phone: None,
        address: None,
    }
}

#[tokio::test]
async fn local_client_round_trip() {
    let app = common::test_app().await;
    let api = app.module.api().expect("api after init");

    let client = api.create_client(john()).await.unwrap();
    let case = api
        .create_case(NewCase {
            client_id: client.id,
            title: "Property Dispute".into(),
            description: Some("Boundary fence".into()),
            case_number: Some("PD-1".into()),
            status: None,
            priority: None,
            start_date: None,
            court_date: None,
        })
        .await
        .unwrap();

    let appointment = api
        .create_appointment(NewAppointment {
            client_id: client.id,
            case_id: Some(case.id),
            title: "Consultation".into(),
            description: None,
            appointment_date: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            duration: None,
            status: None,
        })
        .await
        .unwrap();

    let views = api.list_appointments().await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].appointment.id, appointment.id);
    assert_eq!(
        views[0].client.populated().map(|c| c.last_name.as_str()),
        Some("Doe")
    );
    let Some(Reference::Populated(summary)) = &views[0].case else {
        panic!("case should be populated");
    };
    assert_eq!(summary.case_number.as_deref(), Some("PD-1"));

    let cases = api.list_cases().await.unwrap();
    assert_eq!(cases[0].case.title, "Property Dispute");
}

#[tokio::test]
async fn local_client_maps_errors_to_contract() {
    let app = common::test_app().await;
    let api = app.module.api().unwrap();

    let id = Uuid::new_v4();
    assert_eq!(
        api.get_client(id).await.unwrap_err(),
        LawOfficeError::NotFound {
            entity: EntityKind::Client,
            id
        }
    );
    assert!(api.update_case(id, Default::default()).await.unwrap().is_none());
    assert!(api.delete_appointment(id).await.is_ok());

    api.create_client(john()).await.unwrap();
    let err = api.create_client(john()).await.unwrap_err();
    assert!(matches!(err, LawOfficeError::Validation { .. }));
}

#[tokio::test]
async fn listed_clients_can_be_searched() {
    let app = common::test_app().await;
    let api = app.module.api().unwrap();
    api.create_client(john()).await.unwrap();
    api.create_client(NewClient {
        first_name: "Jane".into(),
        last_name: "Roe".into(),
        email: "jroe@law.example".into(),
        phone: None,
        address: None,
    })
    .await
    .unwrap();

    let clients = api.list_clients().await.unwrap();
    let hits: Vec<&str> = clients
        .iter()
        .filter(|c| client_matches(&c.first_name, &c.last_name, &c.email, "hn d"))
        .map(|c| c.first_name.as_str())
        .collect();
    assert_eq!(hits, vec!["John"]);

    let by_email = clients
        .iter()
        .filter(|c| client_matches(&c.first_name, &c.last_name, &c.email, "LAW.EXAMPLE"))
        .count();
    assert_eq!(by_email, 1);
}
