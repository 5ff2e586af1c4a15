//! # Event Logging
//!
//! Forwarding of user-action events (view, attempt submitted, ...) to
//! the site's log store. Events are write-style web service calls
//! routed through the session registry, so any component can report
//! activity without holding its own session handle.

use std::sync::Arc;

use tracing::debug;

use crate::error::WsResult;
use crate::params::WsParams;
use crate::session::SessionRegistry;

/// One user-action event destined for the site log
#[derive(Debug, Clone)]
pub struct LoggedEvent {
    /// Web service function that stores the event
    pub function: String,

    /// Parameters of the logging call
    pub params: WsParams,

    /// Component the event belongs to, e.g. `mod_h5pactivity`
    pub component: String,

    /// Id of the object the event is about
    pub object_id: i64,

    /// Human-readable name of the object, used for local tracing only
    pub name: Option<String>,
}

/// Forwards events to the site that owns them.
#[derive(Clone)]
pub struct EventLogger {
    sessions: Arc<SessionRegistry>,
}

impl EventLogger {
    pub fn new(sessions: Arc<SessionRegistry>) -> Self {
        Self { sessions }
    }

    /// Send the event to its site.
    ///
    /// Success means the site accepted the logging call; the response
    /// payload is not interpreted.
    pub async fn log(&self, event: LoggedEvent, site_id: Option<&str>) -> WsResult<()> {
        let session = self.sessions.resolve(site_id)?;
        debug!(
            site = %session.id(),
            component = %event.component,
            object_id = event.object_id,
            function = %event.function,
            name = ?event.name,
            "recording event"
        );
        session.write(&event.function, event.params).await?;
        Ok(())
    }
}
