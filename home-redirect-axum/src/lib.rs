pub mod middleware;
pub mod server;
pub mod settings;
pub mod site;
pub mod switcher;

pub use middleware::{CURRENT_LANGCODE, handle_home_redirect};
pub use server::WebServer;
pub use settings::AppSettings;
