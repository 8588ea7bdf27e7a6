//! Graph construction and representation.
//!
//! The [`ExecGraph`] is built from a set of planned resource changes by
//! [`build_graph`] and checked by [`validate_graph`] before any node runs. It
//! contains one [`ExecNode`] per resource plus a root sentinel, with edges
//! encoding `depends_on` ordering, and is traversed concurrently by the
//! [`walker`](crate::operation::walker).

pub mod builder;
pub mod types;
pub mod validator;

pub use builder::*;
pub use types::*;
pub use validator::*;
