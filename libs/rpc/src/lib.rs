//! Protobuf messages and tonic stubs for the user manager API.
//!
//! Generated from `proto/users/v1/users.proto` with buf and checked in.

mod generated;

pub use generated::users;
