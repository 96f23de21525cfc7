use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tonic::transport::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

use backend::config::{AppConfig, StorageDriver};
use backend::grpc::RpcHandlers;
use backend::lifecycle::{drain_with_budget, shutdown_signal};
use backend::repository::memory::{MemoryCommentRepository, MemoryPostRepository, MemoryStore, MemoryUserRepository};
use backend::repository::postgres::{PgCommentRepository, PgPostRepository, PgUserRepository};
use backend::repository::{CommentRepository, PostRepository, UserRepository};
use backend::services::{AuthService, CommentsService, PostsService, UsersService};
use rpc_proto::social::auth_service_server::AuthServiceServer;
use rpc_proto::social::comment_service_server::CommentServiceServer;
use rpc_proto::social::post_service_server::PostServiceServer;
use rpc_proto::social::user_service_server::UserServiceServer;
use token_auth::TokenService;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let ttl = config.jwt.ttl().context("parsing jwt.ttl")?;
    let tokens = Arc::new(TokenService::new(config.jwt.secret.clone(), ttl));

    let (post_repo, comment_repo, user_repo): (
        Arc<dyn PostRepository>,
        Arc<dyn CommentRepository>,
        Arc<dyn UserRepository>,
    ) = match config.storage.driver {
        StorageDriver::Memory => {
            info!("using in-memory storage driver");
            let store = Arc::new(MemoryStore::seeded());
            (
                Arc::new(MemoryPostRepository::new(store.clone())),
                Arc::new(MemoryCommentRepository::new(store.clone())),
                Arc::new(MemoryUserRepository::new(store)),
            )
        }
        StorageDriver::Postgres => {
            info!("using postgres storage driver");
            let options = PgConnectOptions::from_str(&config.postgresql.dsn())
                .context("parsing postgres DSN")?
                .statement_cache_capacity(0);
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(Duration::from_secs(10))
                .connect_with(options)
                .await
                .context("connecting to postgres")?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("running migrations")?;
            (
                Arc::new(PgPostRepository::new(pool.clone())),
                Arc::new(PgCommentRepository::new(pool.clone())),
                Arc::new(PgUserRepository::new(pool)),
            )
        }
    };

    let posts = Arc::new(PostsService::new(post_repo.clone()));
    let comments = Arc::new(CommentsService::new(comment_repo, post_repo));
    let users = Arc::new(UsersService::new(user_repo.clone()));
    let auth = Arc::new(AuthService::new(user_repo, tokens));

    let handlers = RpcHandlers {
        auth,
        users,
        posts,
        comments,
    };

    let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<AuthServiceServer<RpcHandlers>>()
        .await;

    let addr: SocketAddr = format!("0.0.0.0:{}", config.grpc.port)
        .parse()
        .context("parsing grpc.port")?;
    info!(%addr, "backend listening");

    drain_with_budget(
        Server::builder()
            .add_service(health_service)
            .add_service(AuthServiceServer::new(handlers.clone()))
            .add_service(UserServiceServer::new(handlers.clone()))
            .add_service(PostServiceServer::new(handlers.clone()))
            .add_service(CommentServiceServer::new(handlers))
            .serve_with_shutdown(addr, shutdown_signal()),
    )
    .await;

    Ok(())
}
