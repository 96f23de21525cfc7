pub mod server;

pub use server::RpcHandlers;
