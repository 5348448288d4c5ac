//! User Manager gRPC Service
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   ↓ (gRPC, users.v1.UsersService)
//! UsersServiceImpl (service.rs)
//!   ↓ (proto → domain conversion, validation)
//! UserService (domain layer)
//!   ├──► PgUserRepository ──► PostgreSQL
//!   └──► ChangePublisher  ──► NATS JetStream (user ids, after updates)
//! ```
//!
//! ## Modules
//!
//! - `server`: startup, health reporting and graceful shutdown
//! - `service`: gRPC handlers
//! - `conversions`: proto ↔ domain mapping and error codes

pub mod conversions;
pub mod server;
pub mod service;

pub use server::run;
pub use service::UsersServiceImpl;
