//! Request-scoped access layer over the historian core.
//! External transports (HTTP, FFI, CLI) call these operations and own the
//! wire format themselves.

mod api;

pub use api::{
    configure_db_path, ingest_point, list_source_points, list_sources, register_source, ApiError,
    DataPointDto, DataSourceDto, RegisterSourceRequest,
};
