use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse, GraphQLSubscription};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gateway::broker::CommentBroker;
use gateway::clients::ServiceClients;
use gateway::config::AppConfig;
use gateway::loaders;
use gateway::middleware::AuthMiddleware;
use gateway::schema::{build_schema, AppSchema};
use token_auth::TokenService;

async fn graphql_handler(
    schema: web::Data<AppSchema>,
    clients: web::Data<ServiceClients>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let loader = loaders::build(clients.users.clone());
    let request = req.into_inner().data(loader);
    schema.execute(request).await.into()
}

async fn graphql_subscription_handler(
    schema: web::Data<AppSchema>,
    req: actix_web::HttpRequest,
    payload: web::Payload,
) -> actix_web::Result<actix_web::HttpResponse> {
    GraphQLSubscription::new(schema.as_ref().clone()).start(&req, payload)
}

async fn health_handler() -> &'static str {
    "ok"
}

#[actix_web::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let tokens = Arc::new(TokenService::new(config.jwt.secret.clone(), Duration::ZERO));
    let clients = ServiceClients::connect(&config.backend.addr)
        .await
        .context("connecting to backend")?;
    let broker = Arc::new(CommentBroker::new());

    let schema = build_schema(clients.clone(), broker.clone());

    let port = config.http.port;
    info!(port, backend = %config.backend.addr, "gateway listening");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(schema.clone()))
            .app_data(web::Data::new(clients.clone()))
            .wrap(AuthMiddleware::new(tokens.clone()))
            .route("/health", web::get().to(health_handler))
            .route("/graphql", web::post().to(graphql_handler))
            .route("/graphql", web::get().to(graphql_subscription_handler))
    })
    .bind(("0.0.0.0", port))
    .with_context(|| format!("binding to port {port}"))?
    .run()
    .await
    .context("gateway server error")
}
