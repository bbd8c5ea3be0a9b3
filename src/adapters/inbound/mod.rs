mod api_server;
mod edge_server;
pub mod settings_page;

pub use api_server::{
    router as api_router, ApiServer, ApiState, HealthResponse, ACCOUNT_ID_HEADER, SITE_ID_HEADER,
};
pub use edge_server::{
    client_ip, router as edge_router, EdgeServer, EdgeState, FORWARDED_FOR_HEADER,
};
