mod browser_version;
mod config;
mod db;
mod error;
mod helpers;
mod literal;
mod os_version;
mod parser;
mod request;
mod types;
mod user_agent_parser;

pub use config::ParserConfig;
pub use error::{Error, Result};
pub use request::{
    resolve_client_ip, HeaderRequest, RequestInfo, DEFAULT_IP_HEADERS, DEFAULT_REFERRER_HEADER,
};
pub use types::*;
pub use user_agent_parser::UserAgentParser;
