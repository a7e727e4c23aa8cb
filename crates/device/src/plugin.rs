//! Plugin entry points used by the proxy framework

use crate::config::ProxyConfig;
use crate::dot11::Dot11DeviceProxy;
use crate::proxy::DeviceProxy;
use common::{ControllerBackend, SimulatedBackend};
#[cfg(not(feature = "lorcon"))]
use common::ControllerError;
use tracing::debug;

/// Resolve a backend by name
pub fn create_backend(name: &str) -> common::Result<Box<dyn ControllerBackend>> {
    match name {
        "simulated" => Ok(Box::new(SimulatedBackend::new())),
        #[cfg(feature = "lorcon")]
        "lorcon" => Ok(Box::new(common::LorconBackend)),
        #[cfg(not(feature = "lorcon"))]
        "lorcon" => Err(ControllerError::Unavailable("lorcon".to_string()).into()),
        other => Err(common::Error::Config(format!("Unknown backend '{}'", other))),
    }
}

/// Create the 802.11 device proxy described by `config`
pub fn create_device_proxy(config: &ProxyConfig) -> common::Result<Box<dyn DeviceProxy>> {
    let backend = create_backend(&config.dot11.backend)?;
    debug!("Creating 802.11 proxy with {} backend", backend.name());
    Ok(Box::new(Dot11DeviceProxy::from_config(config, backend)))
}

/// Disconnect and release a proxy created by [`create_device_proxy`]
pub fn destroy_device_proxy(mut proxy: Box<dyn DeviceProxy>) {
    proxy.disconnect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_unknown_backend() {
        assert!(matches!(
            create_backend("pcap"),
            Err(common::Error::Config(_))
        ));
    }

    #[cfg(not(feature = "lorcon"))]
    #[test]
    fn test_lorcon_unavailable() {
        assert!(matches!(
            create_backend("lorcon"),
            Err(common::Error::Controller(ControllerError::Unavailable(_)))
        ));
    }

    #[test]
    fn test_create_and_destroy() {
        let mut config = ProxyConfig::default();
        config.dot11.backend = "simulated".to_string();
        config.dot11.interface = "wlan0".to_string();

        let mut proxy = create_device_proxy(&config).unwrap();
        proxy.connect(Duration::from_millis(100)).unwrap();
        assert!(proxy.is_connected());
        destroy_device_proxy(proxy);
    }
}
