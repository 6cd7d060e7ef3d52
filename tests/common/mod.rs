#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use appointment_api::auth::Role;
use appointment_api::clock::FixedClock;
use appointment_api::config::AppConfig;
use appointment_api::database::MemoryDocumentStore;
use appointment_api::mail::{MailError, MailMessage, Mailer};
use appointment_api::models::User;
use appointment_api::{app, AppState};

pub const PASSWORD: &str = "correct-horse-battery";

/// Keeps every message instead of delivering it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
}

impl RecordingMailer {
    /// Six-digit code from the most recent message to `to`.
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        let sent = self.sent.lock().ok()?;
        let message = sent.iter().rev().find(|m| m.to == to)?;
        let (_, rest) = message.text.split_once("code is: ")?;
        Some(rest.chars().take_while(|c| c.is_ascii_digit()).collect())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message);
        }
        Ok(())
    }
}

/// One in-process server per test, backed by the memory store and a clock
/// pinned to Thursday 2024-02-01 08:00 UTC.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub state: AppState,
    pub clock: Arc<FixedClock>,
    pub mail: Arc<RecordingMailer>,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.api.port = port;
        config.api.enable_request_logging = false;
        config.security.hashing.memory_kib = 1024;
        config.security.hashing.iterations = 1;

        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).single().context("bad start instant")?,
        ));
        let mail = Arc::new(RecordingMailer::default());
        let state = AppState::new(config, Arc::new(MemoryDocumentStore::new()), mail.clone(), clock.clone())?;

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        let router = app(state.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("test server stopped: {}", e);
            }
        });

        let test_app = Self {
            base_url,
            client: reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?,
            state,
            clock,
            mail,
        };
        test_app.wait_ready().await?;
        Ok(test_app)
    }

    async fn wait_ready(&self) -> Result<()> {
        for _ in 0..50 {
            if let Ok(resp) = self.client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        anyhow::bail!("server did not become ready on {}", self.base_url)
    }

    pub async fn request(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        let json = if text.is_empty() { Value::Null } else { serde_json::from_str(&text).with_context(|| format!("non-JSON body: {}", text))? };
        Ok((status, json))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PATCH, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, path, token, None).await
    }

    pub async fn register_user(&self, name: &str, email: &str) -> Result<Value> {
        let (status, body) = self
            .post("/auth/user/register", None, json!({ "name": name, "email": email, "password": PASSWORD }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register {} failed: {} {}", email, status, body);
        Ok(body["data"].clone())
    }

    pub async fn login(&self, role: Role, email: &str) -> Result<String> {
        let (status, body) = self
            .post(&format!("/auth/{}/login", role), None, json!({ "email": email, "password": PASSWORD }))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "{} login for {} failed: {} {}", role, email, status, body);
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }

    /// Superusers are bootstrapped out of band, so write one straight to the store.
    pub async fn seed_superuser(&self, email: &str) -> Result<String> {
        let now = self.state.now();
        let user = User {
            id: uuid::Uuid::new_v4(),
            name: "Root".to_string(),
            email: email.to_string(),
            phone: None,
            password_hash: self.state.hasher.hash(PASSWORD)?,
            role: Role::User,
            company_id: None,
            super_user: true,
            email_verified: true,
            created_at: now,
            updated_at: now,
        };
        self.state.collection::<User>().insert(&user).await?;
        self.login(Role::Superuser, email).await
    }

    /// Superuser, admin, one company, a manager and a provider offering
    /// "Haircut", all logged in.
    pub async fn company_with_staff(&self) -> Result<Staff> {
        let superuser = self.seed_superuser("root@example.com").await?;

        self.register_user("Alice Admin", "alice@example.com").await?;
        let (status, body) = self
            .post("/api/superuser/admins", Some(superuser.as_str()), json!({ "email": "alice@example.com", "password": PASSWORD }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "promote admin failed: {} {}", status, body);
        let admin = self.login(Role::Admin, "alice@example.com").await?;

        let (status, body) = self
            .post("/api/admin/companies", Some(admin.as_str()), json!({ "name": "Cut & Co", "services": ["Haircut"] }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create company failed: {} {}", status, body);
        let company_id = id_of(&body["data"])?;

        let (status, body) = self
            .post(
                "/api/admin/managers",
                Some(admin.as_str()),
                json!({ "name": "Mo Manager", "email": "mo@example.com", "password": PASSWORD, "company_id": company_id }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create manager failed: {} {}", status, body);
        let manager = self.login(Role::Manager, "mo@example.com").await?;

        let (status, body) = self
            .post(
                "/api/manager/providers",
                Some(manager.as_str()),
                json!({ "name": "Pat Provider", "email": "pat@example.com", "password": PASSWORD, "services": ["Haircut"] }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create provider failed: {} {}", status, body);
        let provider_id = id_of(&body["data"])?;
        let provider = self.login(Role::Provider, "pat@example.com").await?;

        Ok(Staff {
            superuser,
            admin,
            manager,
            provider,
            company_id,
            provider_id,
        })
    }
}

pub struct Staff {
    pub superuser: String,
    pub admin: String,
    pub manager: String,
    pub provider: String,
    pub company_id: String,
    pub provider_id: String,
}

pub fn id_of(value: &Value) -> Result<String> {
    value["id"].as_str().map(str::to_string).context("value has no id")
}

/// Monday 09:00-10:00 in 30 minute slots.
pub fn monday_morning() -> Value {
    json!({ "weekdays": ["Monday"], "shift_start": "09:00", "shift_end": "10:00", "period": 30 })
}
