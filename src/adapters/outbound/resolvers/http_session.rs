use std::sync::Mutex;
use std::time::Duration;

/// Default per-request timeout for registry calls
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Lazily created HTTP client owned by one resolver.
///
/// The client is built on first use and reused by every later call. After
/// [`HttpSession::close`] the next call builds a fresh one.
pub struct HttpSession {
    client: Mutex<Option<reqwest::Client>>,
    timeout: Duration,
    user_agent: String,
}

impl HttpSession {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Mutex::new(None),
            timeout,
            user_agent: format!("license-tracker/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Returns the shared client, building it if the session is not open
    pub fn client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut guard = self.client.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()?;
        *guard = Some(client.clone());
        Ok(client)
    }

    pub fn is_open(&self) -> bool {
        self.client
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Drops the client and its connection pool.
    ///
    /// Returns true if a client was open. Safe to call repeatedly.
    pub fn close(&self) -> bool {
        self.client
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for HttpSession {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}
