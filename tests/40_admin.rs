mod common;

use anyhow::Result;
use appointment_api::auth::Role;
use chrono::Duration;
use common::{id_of, TestApp, PASSWORD};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn admin_company_lifecycle() -> Result<()> {
    let app = TestApp::spawn().await?;
    let staff = app.company_with_staff().await?;
    let admin = Some(staff.admin.as_str());
    let path = format!("/api/admin/companies/{}", staff.company_id);

    let (status, body) = app.get(&path, admin).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Cut & Co");

    let (status, body) = app.get("/api/admin/companies/by-name/Cut%20%26%20Co", admin).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"].as_str(), Some(staff.company_id.as_str()));

    let (status, _) = app.post("/api/admin/companies", admin, json!({ "name": "Cut & Co" })).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.patch(&path, admin, json!({ "address": "1 High St" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["address"], "1 High St");

    let (status, _) = app.patch(&path, admin, json!({ "admin_id": uuid::Uuid::new_v4() })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete(&path, admin).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&path, admin).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&path, admin).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn admins_only_see_their_own_companies() -> Result<()> {
    let app = TestApp::spawn().await?;
    let staff = app.company_with_staff().await?;

    app.register_user("Bea Admin", "bea@example.com").await?;
    let (status, _) = app
        .post("/api/superuser/admins", Some(staff.superuser.as_str()), json!({ "email": "bea@example.com", "password": PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let bea = app.login(Role::Admin, "bea@example.com").await?;

    let (_, body) = app.get("/api/admin/companies", Some(bea.as_str())).await?;
    assert_eq!(body["data"], json!([]));

    let (status, _) = app
        .get(&format!("/api/admin/companies/{}", staff.company_id), Some(bea.as_str()))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            "/api/admin/managers",
            Some(bea.as_str()),
            json!({ "name": "Sly", "email": "sly@example.com", "password": PASSWORD, "company_id": staff.company_id }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/admin/managers", Some(staff.admin.as_str())).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert!(body["data"][0].get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn superuser_manages_admins_by_email() -> Result<()> {
    let app = TestApp::spawn().await?;
    let su = app.seed_superuser("root@example.com").await?;
    let su = Some(su.as_str());

    let (status, _) = app
        .post("/api/superuser/admins", su, json!({ "email": "ghost@example.com", "password": PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let user = app.register_user("Alice", "alice@example.com").await?;
    let (status, body) = app
        .post("/api/superuser/admins", su, json!({ "email": "alice@example.com", "password": PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user_id"], user["id"]);

    let (status, _) = app
        .post("/api/superuser/admins", su, json!({ "email": "alice@example.com", "password": PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .patch("/api/superuser/admins/by-email/Alice@example.com", su, json!({ "phone": "555-0199" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phone"], "555-0199");

    let (_, body) = app.get("/api/superuser/admins/by-email/alice@example.com", su).await?;
    assert_eq!(body["data"]["phone"], "555-0199");

    let admin = app.login(Role::Admin, "alice@example.com").await?;
    let (status, body) = app.patch("/api/admin/me", Some(admin.as_str()), json!({ "name": "Alice A." })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Alice A.");
    Ok(())
}

#[tokio::test]
async fn manager_lists_only_company_providers() -> Result<()> {
    let app = TestApp::spawn().await?;
    let staff = app.company_with_staff().await?;

    let (status, body) = app.get("/api/manager/providers", Some(staff.manager.as_str())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"][0]["id"].as_str(), Some(staff.provider_id.as_str()));

    let (status, _) = app
        .post(
            "/api/manager/providers",
            Some(staff.manager.as_str()),
            json!({ "name": "Pat Again", "email": "PAT@example.com", "password": PASSWORD }),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    app.register_user("Uma", "uma@example.com").await?;
    let user = app.login(Role::User, "uma@example.com").await?;
    let (_, body) = app
        .get(&format!("/api/user/companies/{}/providers", staff.company_id), Some(user.as_str()))
        .await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn email_verification_flow() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.register_user("Ada", "ada@example.com").await?;
    let token = app.login(Role::User, "ada@example.com").await?;

    let (status, _) = app.get("/api/user/verification", Some(token.as_str())).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.post("/verification/send", None, json!({ "email": "ada@example.com" })).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    let code = app.mail.last_code_for("ada@example.com").unwrap_or_default();
    assert_eq!(code.len(), 6);

    let wrong = if code == "000000" { "111111" } else { "000000" };
    let (status, body) = app
        .post("/verification/verify", None, json!({ "email": "ada@example.com", "code": wrong }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"].get("code").is_some());

    let (status, body) = app
        .post("/verification/verify", None, json!({ "email": "ada@example.com", "code": code }))
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["verified"], true);

    let (_, body) = app.get("/api/user/profile", Some(token.as_str())).await?;
    assert_eq!(body["data"]["email_verified"], true);
    let (_, body) = app.get("/api/user/verification", Some(token.as_str())).await?;
    assert_eq!(body["data"]["verified"], true);
    Ok(())
}

#[tokio::test]
async fn verification_codes_expire() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.register_user("Ada", "ada@example.com").await?;

    app.post("/verification/send", None, json!({ "email": "ada@example.com" })).await?;
    let code = app.mail.last_code_for("ada@example.com").unwrap_or_default();

    app.clock.advance(Duration::minutes(16));
    let (status, body) = app
        .post("/verification/verify", None, json!({ "email": "ada@example.com", "code": code }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app.post("/verification/send", None, json!({ "email": "nobody@example.com" })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn admin_lists_users_without_hashes() -> Result<()> {
    let app = TestApp::spawn().await?;
    let staff = app.company_with_staff().await?;

    let (status, body) = app.get("/api/admin/users", Some(staff.admin.as_str())).await?;
    assert_eq!(status, StatusCode::OK);
    let users = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
    let _ = id_of(&users[0])?;
    Ok(())
}
