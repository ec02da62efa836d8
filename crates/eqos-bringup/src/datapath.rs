//! Datapath attachment points.
//!
//! Transmit/receive queue creation belongs to the datapath layer that
//! attaches to a device this crate has already brought up. The entry points
//! exist so the host can wire its callbacks, but they are not implemented
//! here.

use crate::error::{EqosError, Result};
use crate::lifecycle::EqosAdapter;

impl EqosAdapter {
    /// Create a transmit queue. Not implemented in this layer.
    ///
    /// # Errors
    ///
    /// Always returns `Unimplemented`.
    pub fn create_tx_queue(&mut self) -> Result<()> {
        Err(EqosError::unimplemented("transmit queue creation"))
    }

    /// Create a receive queue. Not implemented in this layer.
    ///
    /// # Errors
    ///
    /// Always returns `Unimplemented`.
    pub fn create_rx_queue(&mut self) -> Result<()> {
        Err(EqosError::unimplemented("receive queue creation"))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BringupConfig;
    use crate::lifecycle::EqosAdapter;
    use crate::sim::SimPlatform;

    #[test]
    fn queue_creation_is_stubbed() {
        let platform = SimPlatform::new();
        let mut adapter = EqosAdapter::new(Box::new(platform), BringupConfig::default());
        assert_eq!(adapter.create_tx_queue().unwrap_err().kind(), "unimplemented");
        assert_eq!(adapter.create_rx_queue().unwrap_err().kind(), "unimplemented");
    }
}
