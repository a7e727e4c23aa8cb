//! Controller backend integration tests
//!
//! Exercises the backends through the trait objects the device proxy holds:
//! - Attach failures
//! - Shared state between a backend and its controllers
//! - Status codes surfaced by failing controllers

use common::simulated::{DEFAULT_TIMEOUT_MS, EINVAL};
use common::test_utils::{FailingBackend, FailingControllerBackend, TEST_BSSID};
use common::{ControllerBackend, ControllerError, Error, InterfaceController, SimulatedBackend};
use protocol::{InjectionMode, MacAddress};
use proptest::prelude::*;

fn attach(backend: &dyn ControllerBackend) -> Box<dyn InterfaceController> {
    backend.attach("wlan0").unwrap()
}

mod attach_failures {
    use super::*;

    #[test]
    fn test_no_driver() {
        let err = FailingBackend::no_driver().attach("wlan0").err().unwrap();
        assert!(matches!(err, ControllerError::NoDriver(_)));
        assert_eq!(err.code(), -1);
    }

    #[test]
    fn test_no_context() {
        let err = FailingBackend::no_context().attach("wlan0").err().unwrap();
        assert!(matches!(err, ControllerError::ContextCreation(_)));
    }

    #[test]
    fn test_converts_into_common_error() {
        let err: Error = FailingBackend::no_driver()
            .attach("wlan0")
            .err()
            .unwrap()
            .into();
        assert!(matches!(err, Error::Controller(_)));
        assert!(err.to_string().contains("test"));
    }
}

mod simulated {
    use super::*;

    #[test]
    fn test_state_outlives_controller() {
        let backend = SimulatedBackend::new();
        {
            let mut controller = attach(&backend);
            controller.open(InjectionMode::Inject).unwrap();
            controller.set_timeout(500);
            controller.add_wep_key(TEST_BSSID, b"0123456789abc").unwrap();
        }

        let state = backend.snapshot();
        assert_eq!(state.interface, "wlan0");
        assert_eq!(state.mode, Some(InjectionMode::Inject));
        assert_eq!(state.timeout_ms, 500);
        assert_eq!(state.wep_keys.len(), 1);
    }

    #[test]
    fn test_reattach_keeps_settings() {
        let backend = SimulatedBackend::new();
        attach(&backend).set_channel(11).unwrap();
        assert_eq!(attach(&backend).channel(), 11);
    }

    #[test]
    fn test_defaults() {
        let mac = MacAddress([0x02, 0x11, 0x22, 0x33, 0x44, 0x55]);
        let backend = SimulatedBackend::with_mac(mac);
        let controller = attach(&backend);
        assert_eq!(controller.timeout(), DEFAULT_TIMEOUT_MS);
        assert_eq!(controller.hardware_mac().unwrap(), mac);
        assert_eq!(controller.driver_name(), "simulated");
        assert_eq!(backend.name(), "simulated");
    }
}

mod failing_controller {
    use super::*;

    #[test]
    fn test_every_status_call_fails_with_code() {
        let backend = FailingControllerBackend { code: -16 };
        let mut controller = attach(&backend);

        assert_eq!(controller.open(InjectionMode::Monitor).unwrap_err().code(), -16);
        assert_eq!(controller.set_channel(1).unwrap_err().code(), -16);
        assert_eq!(controller.set_datalink(127).unwrap_err().code(), -16);
        assert_eq!(controller.hardware_mac().unwrap_err().code(), -16);
        assert_eq!(
            controller
                .set_hardware_mac(MacAddress([2, 0, 0, 0, 0, 1]))
                .unwrap_err()
                .code(),
            -16
        );
        assert_eq!(
            controller.add_wep_key(TEST_BSSID, b"abcde").unwrap_err().code(),
            -16
        );
        assert_eq!(controller.channel(), -16);
    }
}

proptest! {
    /// Property: the simulated interface accepts exactly the 2.4 and 5 GHz channel ranges
    #[test]
    fn prop_channel_validation(channel in -10i32..200) {
        let backend = SimulatedBackend::new();
        let mut controller = attach(&backend);
        let valid = (1..=14).contains(&channel) || (36..=165).contains(&channel);

        match controller.set_channel(channel) {
            Ok(rc) => {
                prop_assert!(valid);
                prop_assert_eq!(rc, 0);
                prop_assert_eq!(controller.channel(), channel);
            }
            Err(e) => {
                prop_assert!(!valid);
                prop_assert_eq!(e.code(), EINVAL);
                prop_assert_eq!(controller.channel(), 1);
            }
        }
    }
}
