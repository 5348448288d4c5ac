//! Users Domain
//!
//! Account records and the rules around them: unique nicknames and emails,
//! hashed passwords, uppercase country codes, and a change notification
//! after every successful update.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Service   │  ← Entity construction, password hashing, notification
//! └──────┬──────┘
//!        │                    ┌────────────────┐
//!        ├───────────────────►│ ChangeNotifier │  ← fire-and-forget
//!        │                    └────────────────┘
//! ┌──────▼──────┐
//! │ Repository  │  ← trait + in-memory and PostgreSQL implementations
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← User, validated inputs, page filter
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{CreateUser, InMemoryUserRepository, UserService};
//! use messaging::ChangePublisher;
//!
//! # async fn example() -> domain_users::UserResult<()> {
//! let service = UserService::new(InMemoryUserRepository::new(), ChangePublisher::disconnected());
//! let id = service
//!     .create_user(CreateUser {
//!         first_name: "Ana".into(),
//!         last_name: "Ivanovic".into(),
//!         nickname: "ana".into(),
//!         password: "correct horse".into(),
//!         email: "ana@example.com".into(),
//!         country: "rs".into(),
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod models;
pub mod password;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{UniqueField, UserError, UserResult};
pub use models::{CreateUser, UpdateUser, User, UserFilter, UserPage, normalize_country};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
