//! JSON wire types shared by the TaskFlow server and client.
//!
//! Request bodies reject unknown fields and are turned into validated entity
//! values here, so handlers never see unchecked input. Every response is
//! wrapped in [`ApiResponse`]; failures carry an [`ErrorBody`].

mod error;
mod requests;
mod responses;

pub use error::*;
pub use requests::*;
pub use responses::*;
