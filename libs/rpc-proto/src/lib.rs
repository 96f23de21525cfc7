//! Generated gRPC client and server code for the social-posts RPC contract.
//!
//! Shared by `backend` (implements the server traits) and `gateway`
//! (consumes the client stubs) so both processes are built from exactly one
//! `.proto` source.

pub mod social {
    tonic::include_proto!("social.posts.v1");
}
