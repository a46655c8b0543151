/// Banner prepended to every relayed message, text or caption.
pub const ANONYMOUS_BANNER: &str = "✉️ You received a new anonymous message:\n\n";

/// Audit log content stored in place of non-text media.
pub const MEDIA_PLACEHOLDER: &str = "[media]";

/// Number of records shown by every formatted log view.
pub const LOG_WINDOW: usize = 10;

/// Default chat-platform host used when rendering personal links.
pub const LINK_HOST: &str = "https://t.me";

/// Default bound on a single outbound call to the transport, in seconds.
pub const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 10;

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;
