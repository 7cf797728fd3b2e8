//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use tracker_backend::inbound::http::session_config::SessionSettings;
use tracker_backend::outbound::email::EmailApiSettings;
use tracker_backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) public_base_url: String,
    pub(crate) email: Option<EmailApiSettings>,
}

impl ServerConfig {
    /// Construct a server configuration around a ready database pool.
    #[must_use]
    pub fn new(
        session: SessionSettings,
        bind_addr: SocketAddr,
        db_pool: DbPool,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            session,
            bind_addr,
            db_pool,
            public_base_url: public_base_url.into(),
            email: None,
        }
    }

    /// Deliver customer notifications through the email API.
    ///
    /// Without this, notifications are written to the log only.
    #[must_use]
    pub fn with_email(mut self, email: Option<EmailApiSettings>) -> Self {
        self.email = email;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
