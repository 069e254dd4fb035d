pub mod config;
pub mod cookie;
pub mod error;
pub mod language;
pub mod negotiation;
pub mod redirect;
pub mod referer;

pub use config::RedirectSettings;
pub use error::ConfigError;
pub use language::{Language, LanguageRegistry};
pub use redirect::{HomeRedirect, PassReason, RedirectChain, RedirectDecision, Redirector, RequestContext};
