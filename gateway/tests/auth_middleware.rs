use std::sync::Arc;
use std::time::Duration;

use actix_web::{test, web, App, HttpMessage, HttpResponse};

use gateway::middleware::{AuthMiddleware, Identity};
use token_auth::TokenService;

async fn whoami(req: actix_web::HttpRequest) -> HttpResponse {
    match req.extensions().get::<Identity>() {
        Some(identity) => HttpResponse::Ok().body(identity.login.clone()),
        None => HttpResponse::Ok().body("anonymous"),
    }
}

fn tokens() -> Arc<TokenService> {
    Arc::new(TokenService::new("test-secret", Duration::from_secs(3600)))
}

#[actix_web::test]
async fn valid_bearer_token_injects_identity() {
    let tokens = tokens();
    let token = tokens
        .issue(uuid::Uuid::new_v4(), "Ivan", "Иван", "Грозный")
        .unwrap();

    let app = test::init_service(
        App::new()
            .wrap(AuthMiddleware::new(tokens))
            .route("/whoami", web::get().to(whoami)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = test::read_body(resp).await;
    assert_eq!(body, "Ivan");
}

#[actix_web::test]
async fn missing_token_reaches_handler_without_identity() {
    let app = test::init_service(
        App::new()
            .wrap(AuthMiddleware::new(tokens()))
            .route("/whoami", web::get().to(whoami)),
    )
    .await;

    let req = test::TestRequest::get().uri("/whoami").to_request();
    let resp = test::call_service(&app, req).await;
    let body = test::read_body(resp).await;
    assert_eq!(body, "anonymous");
}

#[actix_web::test]
async fn malformed_token_reaches_handler_without_identity() {
    let app = test::init_service(
        App::new()
            .wrap(AuthMiddleware::new(tokens()))
            .route("/whoami", web::get().to(whoami)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", "Bearer not-a-real-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body = test::read_body(resp).await;
    assert_eq!(body, "anonymous");
}

#[actix_web::test]
async fn wrong_secret_reaches_handler_without_identity() {
    let issuer = tokens();
    let token = issuer
        .issue(uuid::Uuid::new_v4(), "Ivan", "Иван", "Грозный")
        .unwrap();
    let verifier = Arc::new(TokenService::new("different-secret", Duration::from_secs(3600)));

    let app = test::init_service(
        App::new()
            .wrap(AuthMiddleware::new(verifier))
            .route("/whoami", web::get().to(whoami)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = test::read_body(resp).await;
    assert_eq!(body, "anonymous");
}
