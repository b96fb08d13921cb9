//! Request and Response models for the store API
//!
//! DTOs used for serializing and deserializing HTTP request and response
//! bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{CounterRequest, ExpireRequest, KeysQuery, MgetRequest, MsetRequest, SetRequest};
pub use responses::{
    ClearResponse, CounterResponse, DeleteResponse, ExistsResponse, ExpireResponse, GetResponse,
    HealthResponse, KeysResponse, MgetResponse, MsetResponse, SetResponse, StatsResponse,
    TtlResponse,
};
