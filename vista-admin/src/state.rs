use std::sync::Arc;
use vista_core::{Confirmer, Notifier, RestTransport};

/// Collaborators every screen is built from.
#[derive(Clone)]
pub struct AdminState {
    pub transport: Arc<dyn RestTransport>,
    /// Vendor module endpoint, e.g. `http://localhost:5000/api/vendors`.
    pub vendor_base_url: String,
    pub notifier: Arc<dyn Notifier>,
    pub confirmer: Arc<dyn Confirmer>,
}
