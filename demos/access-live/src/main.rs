//! # Purpose
//! Demonstrate the full permission-resolution flow against a live fake
//! authority service over real HTTP, using only the public resolver
//! surface.
//!
//! # What this demo proves
//! - No-session and authority-failure paths both land on deny-all.
//! - Server-returned payloads map to exact, non-elevated predicates.
//! - A forged cached super-admin flag is sanitized and erased.
//! - A validated super-admin resolves grant-all with the authority
//!   completely unreachable.
//!
//! # High-level flow
//! 1. Start a fake authority HTTP service (axum) with per-token
//!    canned payloads.
//! 2. Resolve with no session token: deny-all, no error.
//! 3. Resolve a doctor token: module predicates and quota follow the
//!    payload exactly.
//! 4. Seed a tampered cached principal and resolve: flag cleared,
//!    snapshot erased, server outcome applied.
//! 5. Point a resolver at a dead port with a validated cached
//!    super-admin: instant grant-all, no network dependency.
//! 6. Point a doctor at the dead port: deny-all with a recorded,
//!    retriable error.
//!
//! # Notes on determinism
//! - The authority binds an ephemeral local port; no fixed ports.
//! - Explicit readiness polling prevents startup races.
use anyhow::{bail, Context, Result};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use vital_access::{ModuleRegistry, Principal, Role, SuperAdminAllowList};
use vital_resolver::{HttpAuthorityClient, InMemorySessionStore, PermissionResolver, SessionStore};

const DOCTOR_TOKEN: &str = "token-doctor";
const BROKEN_TOKEN: &str = "token-broken";
const ALLOW_LISTED_EMAIL: &str = "root@vital.example";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    run_demo().await
}

async fn run_demo() -> Result<()> {
    println!("== Vital Demo: Live Permission Resolution ==");

    let (authority_addr, authority_handle) = spawn_fake_authority().await?;
    let authority_base = format!("http://{authority_addr}");
    wait_for_authority(&authority_base).await?;
    println!("STEP 0 fake authority up: PASS (addr={authority_addr})");

    let registry = ModuleRegistry::platform_default().context("platform registry")?;
    let allow_list = SuperAdminAllowList::new([ALLOW_LISTED_EMAIL]);

    // STEP 1: no session token resolves deny-all without error.
    let session = Arc::new(InMemorySessionStore::new());
    let resolver = resolver_for(&authority_base, session, registry.clone(), &allow_list)?;
    let state = resolver.initialize().await;
    if state.last_error.is_some() || resolver.has_module("appointments_module") {
        bail!("expected clean deny-all without a session");
    }
    println!("STEP 1 no-session deny-all: PASS");

    // STEP 2: doctor token gets exactly the payload's modules.
    let session = Arc::new(InMemorySessionStore::with_token(DOCTOR_TOKEN));
    let resolver = resolver_for(&authority_base, session, registry.clone(), &allow_list)?;
    resolver.initialize().await;
    let predicates = resolver.predicates();
    if !predicates.allows("telemedicine") || predicates.allows("dna_sequencing") {
        bail!("doctor predicates do not match payload");
    }
    if resolver.quota_remaining(Role::Doctor, 3) != Some(2) {
        bail!("doctor quota mismatch");
    }
    println!("STEP 2 doctor payload resolution: PASS");

    // STEP 3: forged cached super-admin flag is sanitized and erased.
    let session = Arc::new(InMemorySessionStore::with_token(DOCTOR_TOKEN));
    let mut forged = Principal::new("u-doc", "doc@vital.example", Role::Admin);
    forged.is_super_admin = true;
    session.set_cached_principal(Some(forged));
    let resolver = resolver_for(&authority_base, session.clone(), registry.clone(), &allow_list)?;
    let state = resolver.initialize().await;
    if state.is_super_admin() || session.cached_principal().is_some() {
        bail!("tampered snapshot survived resolution");
    }
    println!("STEP 3 tamper sanitization: PASS");

    // STEP 4: validated super-admin works with the authority dead.
    let dead_base = "http://127.0.0.1:1";
    let session = Arc::new(InMemorySessionStore::with_token("token-root"));
    let mut root = Principal::new("u-root", ALLOW_LISTED_EMAIL, Role::SuperAdmin);
    root.is_super_admin = true;
    session.set_cached_principal(Some(root));
    let resolver = resolver_for(dead_base, session, registry.clone(), &allow_list)?;
    let state = resolver.initialize().await;
    if !state.is_super_admin() || !resolver.predicates().allows("dna_sequencing") {
        bail!("super-admin fast path failed");
    }
    println!("STEP 4 super-admin fast path without network: PASS");

    // STEP 5: unreachable authority resolves deny-all with an error.
    let session = Arc::new(InMemorySessionStore::with_token(DOCTOR_TOKEN));
    let resolver = resolver_for(dead_base, session, registry.clone(), &allow_list)?;
    let state = resolver.initialize().await;
    if state.last_error.is_none() || resolver.has_module("telemedicine_module") {
        bail!("expected deny-all with recorded error");
    }
    println!("STEP 5 authority failure deny-all: PASS");

    // STEP 6: a malformed payload is fail-safe, not fail-open.
    let session = Arc::new(InMemorySessionStore::with_token(BROKEN_TOKEN));
    let resolver = resolver_for(&authority_base, session, registry, &allow_list)?;
    let state = resolver.initialize().await;
    if state.last_error.is_none() || resolver.predicates().allows("telemedicine") {
        bail!("malformed payload must deny");
    }
    println!("STEP 6 malformed payload deny-all: PASS");

    authority_handle.abort();
    println!("== all steps passed ==");
    Ok(())
}

fn resolver_for(
    base_url: &str,
    session: Arc<InMemorySessionStore>,
    registry: ModuleRegistry,
    allow_list: &SuperAdminAllowList,
) -> Result<PermissionResolver> {
    let authority = Arc::new(
        HttpAuthorityClient::new(base_url, Duration::from_secs(2))
            .context("build authority client")?,
    );
    Ok(PermissionResolver::new(
        authority,
        session,
        registry,
        allow_list.clone(),
    ))
}

#[derive(Clone)]
struct AuthorityState;

async fn access_me(
    State(_state): State<AuthorityState>,
    headers: HeaderMap,
) -> (StatusCode, Json<serde_json::Value>) {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or_default();

    match token {
        DOCTOR_TOKEN => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "user": {"id": "u-doc", "email": "doc@vital.example", "role": "doctor"},
                "permissions": {"can_view_reports": true, "can_manage_appointments": true},
                "dashboard_features": {"telemedicine_module": true, "lab_results_module": true},
                "quota": {"enabled": true, "reset_period": "monthly", "per_role_max": {"doctor": 5}}
            })),
        ),
        // Parses as JSON but carries a role outside the closed enumeration.
        BROKEN_TOKEN => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "user": {"id": "u-x", "email": "x@vital.example", "role": "warlock"}
            })),
        ),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"success": false})),
        ),
    }
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn spawn_fake_authority() -> Result<(SocketAddr, JoinHandle<()>)> {
    let router = Router::new()
        .route("/v1/access/me", get(access_me))
        .route("/health", get(health))
        .with_state(AuthorityState);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind fake authority")?;
    let addr = listener.local_addr().context("authority local addr")?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok((addr, handle))
}

async fn wait_for_authority(base: &str) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .context("build http client")?;
    for _ in 0..50 {
        if let Ok(response) = client.get(format!("{base}/health")).send().await {
            if response.status().is_success() {
                return Ok(());
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    bail!("fake authority did not become ready")
}
