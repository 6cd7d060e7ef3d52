mod common;

use anyhow::Result;
use appointment_api::auth::Role;
use common::{id_of, monday_morning, TestApp};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn count(body: &Value) -> usize {
    body["data"].as_array().map(Vec::len).unwrap_or(0)
}

#[tokio::test]
async fn provider_publishes_a_month_of_mondays() -> Result<()> {
    let app = TestApp::spawn().await?;
    let staff = app.company_with_staff().await?;

    let (status, body) = app
        .post("/api/provider/availability", Some(staff.provider.as_str()), monday_morning())
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["inserted"], 8);
    assert_eq!(body["data"]["first_date"], "2024-02-05");
    assert_eq!(body["data"]["last_date"], "2024-02-26");

    let (_, body) = app.get("/api/provider/slots", Some(staff.provider.as_str())).await?;
    assert_eq!(count(&body), 8);
    for slot in body["data"].as_array().into_iter().flatten() {
        assert_eq!(slot["active"], false);
        assert_eq!(slot["company_id"].as_str(), Some(staff.company_id.as_str()));
    }
    Ok(())
}

#[tokio::test]
async fn invalid_templates_are_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let staff = app.company_with_staff().await?;
    let token = Some(staff.provider.as_str());

    let cases = [
        json!({ "weekdays": ["Monday"], "shift_start": "09:00", "shift_end": "10:00", "period": 0 }),
        json!({ "weekdays": ["Monday"], "shift_start": "09:00", "shift_end": "10:00", "period": 1_000_000_000_000i64 }),
        json!({ "weekdays": ["Monday"], "shift_start": "09:00", "shift_end": "10:00", "period": i64::MAX }),
        json!({ "weekdays": ["Funday"], "shift_start": "09:00", "shift_end": "10:00", "period": 30 }),
        json!({ "weekdays": ["Monday"], "shift_start": "9am", "shift_end": "10:00", "period": 30 }),
        json!({ "weekdays": ["Monday"], "shift_start": "17:00", "shift_end": "09:00", "period": 30 }),
    ];
    for case in cases {
        let (status, body) = app.post("/api/provider/availability", token, case.clone()).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{case}: {body}");
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["field_errors"].is_object(), "{case}: {body}");
    }

    let (_, body) = app.get("/api/provider/slots", token).await?;
    assert_eq!(count(&body), 0);
    Ok(())
}

#[tokio::test]
async fn empty_weekdays_publish_nothing() -> Result<()> {
    let app = TestApp::spawn().await?;
    let staff = app.company_with_staff().await?;

    let (status, body) = app
        .post(
            "/api/provider/availability",
            Some(staff.provider.as_str()),
            json!({ "weekdays": [], "shift_start": "09:00", "shift_end": "10:00", "period": 30 }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["inserted"], 0);
    assert_eq!(body["data"]["first_date"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn manager_publishes_for_own_provider() -> Result<()> {
    let app = TestApp::spawn().await?;
    let staff = app.company_with_staff().await?;

    let path = format!("/api/manager/providers/{}/availability", staff.provider_id);
    let (status, body) = app.post(&path, Some(staff.manager.as_str()), monday_morning()).await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["provider_id"].as_str(), Some(staff.provider_id.as_str()));

    let stranger = format!("/api/manager/providers/{}/availability", uuid::Uuid::new_v4());
    let (status, _) = app.post(&stranger, Some(staff.manager.as_str()), monday_morning()).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn user_books_a_slot_once() -> Result<()> {
    let app = TestApp::spawn().await?;
    let staff = app.company_with_staff().await?;
    app.post("/api/provider/availability", Some(staff.provider.as_str()), monday_morning())
        .await?;

    app.register_user("Uma", "uma@example.com").await?;
    let user = app.login(Role::User, "uma@example.com").await?;

    let (status, body) = app
        .get(&format!("/api/user/slots?provider_id={}&date=2024-02-12", staff.provider_id), Some(user.as_str()))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count(&body), 2);
    let slot_id = id_of(&body["data"][0])?;

    let book = format!("/api/user/slots/{}/book", slot_id);
    let (status, body) = app
        .post(&book, Some(user.as_str()), json!({ "service": "haircut", "notes": "short please" }))
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["active"], true);
    assert_eq!(body["data"]["customer_email"], "uma@example.com");
    assert_eq!(body["data"]["service"], "haircut");

    let (status, body) = app.post(&book, Some(user.as_str()), json!({})).await?;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (_, body) = app
        .get(&format!("/api/user/slots?provider_id={}", staff.provider_id), Some(user.as_str()))
        .await?;
    assert_eq!(count(&body), 7);

    for (path, token) in [
        ("/api/user/appointments", user.as_str()),
        ("/api/provider/appointments", staff.provider.as_str()),
        ("/api/manager/appointments", staff.manager.as_str()),
        ("/api/admin/appointments", staff.admin.as_str()),
    ] {
        let (status, body) = app.get(path, Some(token)).await?;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(count(&body), 1, "{path}: {body}");
    }
    Ok(())
}

#[tokio::test]
async fn concurrent_bookings_have_one_winner() -> Result<()> {
    let app = TestApp::spawn().await?;
    let staff = app.company_with_staff().await?;
    app.post("/api/provider/availability", Some(staff.provider.as_str()), monday_morning())
        .await?;

    app.register_user("Uma", "uma@example.com").await?;
    app.register_user("Vic", "vic@example.com").await?;
    let uma = app.login(Role::User, "uma@example.com").await?;
    let vic = app.login(Role::User, "vic@example.com").await?;

    let (_, body) = app
        .get(&format!("/api/user/slots?provider_id={}", staff.provider_id), Some(uma.as_str()))
        .await?;
    let book = format!("/api/user/slots/{}/book", id_of(&body["data"][0])?);

    let (first, second) = tokio::join!(
        app.post(&book, Some(uma.as_str()), json!({})),
        app.post(&book, Some(vic.as_str()), json!({})),
    );
    let mut statuses = [first?.0, second?.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);
    Ok(())
}

#[tokio::test]
async fn booking_checks_the_service_list() -> Result<()> {
    let app = TestApp::spawn().await?;
    let staff = app.company_with_staff().await?;
    app.post("/api/provider/availability", Some(staff.provider.as_str()), monday_morning())
        .await?;
    app.register_user("Uma", "uma@example.com").await?;
    let user = app.login(Role::User, "uma@example.com").await?;

    let (_, body) = app
        .get(&format!("/api/user/slots?provider_id={}", staff.provider_id), Some(user.as_str()))
        .await?;
    let book = format!("/api/user/slots/{}/book", id_of(&body["data"][0])?);

    let (status, body) = app.post(&book, Some(user.as_str()), json!({ "service": "Massage" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"].get("service").is_some());

    let (status, _) = app
        .post(&format!("/api/user/slots/{}/book", uuid::Uuid::new_v4()), Some(user.as_str()), json!({}))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn provider_manages_service_list() -> Result<()> {
    let app = TestApp::spawn().await?;
    let staff = app.company_with_staff().await?;
    let token = Some(staff.provider.as_str());

    let (status, body) = app.post("/api/provider/services", token, json!({ "name": "Beard trim" })).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"], json!([{ "index": 0, "name": "Haircut" }, { "index": 1, "name": "Beard trim" }]));

    let (status, body) = app.post("/api/provider/services", token, json!({ "name": "HAIRCUT" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count(&body), 2);

    let (status, _) = app.delete("/api/provider/services/5", token).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.delete("/api/provider/services/0", token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([{ "index": 0, "name": "Beard trim" }]));

    app.register_user("Uma", "uma@example.com").await?;
    let user = app.login(Role::User, "uma@example.com").await?;
    let (_, body) = app
        .get(&format!("/api/user/providers/{}/services", staff.provider_id), Some(user.as_str()))
        .await?;
    assert_eq!(body["data"], json!([{ "index": 0, "name": "Beard trim" }]));
    Ok(())
}
