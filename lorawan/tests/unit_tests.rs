use lorawan_controller::{
    config::{
        device::{AbpSession, ActivationMode, DeviceIdentity, JoinRequest, DEFAULT_NET_ID},
        params::{DeviceParams, RadioPolicy, DEFAULT_JOIN_RETRIES, DEFAULT_JOIN_RETRY_INTERVAL},
    },
    mac::{
        primitives::MAX_MAC_PAYLOAD_SIZE, DataRate, McpsIndication, Region, UplinkRequest,
    },
    uplink::Confirmation,
    DeviceError,
};

use mock::*;

#[test]
fn test_otaa_identity() {
    let identity = DeviceIdentity::new_otaa(DEV_EUI, APP_EUI, APP_KEY);

    assert!(identity.is_otaa());
    assert_eq!(identity.mode, ActivationMode::Otaa);
    assert_eq!(identity.app_key, APP_KEY);
    assert_eq!(identity.nwk_skey, [0; 16]);
    assert_eq!(identity.net_id, DEFAULT_NET_ID);

    let request = JoinRequest::from_identity(&identity, 5);
    assert_eq!(request.dev_eui, DEV_EUI);
    assert_eq!(request.app_eui, APP_EUI);
    assert_eq!(request.nb_trials, 5);
}

#[test]
fn test_abp_identity() {
    let identity = DeviceIdentity::new_abp(DEV_EUI, APP_EUI, DEV_ADDR, NWK_SKEY, APP_SKEY);

    assert!(!identity.is_otaa());
    assert_eq!(identity.app_key, [0; 16]);

    let session = AbpSession::from(&identity.with_net_id(7));
    assert_eq!(session.net_id, 7);
    assert_eq!(session.dev_addr, DEV_ADDR);
    assert_eq!(session.nwk_skey, NWK_SKEY);
    assert_eq!(session.app_skey, APP_SKEY);
}

#[test]
fn test_default_params() {
    let params = DeviceParams::default();

    assert_eq!(params.region, Region::EU868);
    assert!(params.adr);
    assert!(params.public_network);
    assert_eq!(params.join_retry.max_retries, DEFAULT_JOIN_RETRIES);
    assert_eq!(params.join_retry.interval, DEFAULT_JOIN_RETRY_INTERVAL);
    assert_eq!(params.radio.tx_datarate, DataRate::DR0);
    assert_eq!(params.radio.ack_policy, Confirmation::Unconfirmed);
}

#[test]
fn test_duty_cycle_by_region() {
    assert!(RadioPolicy::for_region(Region::EU868).duty_cycle);
    for region in [Region::US915, Region::AU915, Region::AS923, Region::CN470] {
        assert!(!RadioPolicy::for_region(region).duty_cycle);
    }
}

#[test]
fn test_datarate_index() {
    assert_eq!(DataRate::from_index(3), Some(DataRate::DR3));
    assert_eq!(DataRate::from_index(15).map(|dr| dr.index()), Some(15));
    assert_eq!(DataRate::from_index(16), None);
    assert!(DataRate::DR0 < DataRate::DR5);
}

#[test]
fn test_flush_request() {
    let request = UplinkRequest::flush(DataRate::DR4);

    assert!(!request.is_confirmed());
    assert_eq!(request.port(), None);
    assert!(request.payload().is_empty());
    assert_eq!(request.datarate(), DataRate::DR4);
}

#[test]
fn test_indication_payload_limit() {
    let data = [0u8; MAX_MAC_PAYLOAD_SIZE + 1];

    assert!(McpsIndication::with_data(1, &data[..MAX_MAC_PAYLOAD_SIZE], 0, 0).is_some());
    assert!(McpsIndication::with_data(1, &data, 0, 0).is_none());
}

#[test]
fn test_error_display() {
    let blocked: DeviceError<MockError> = DeviceError::Blocked;
    let rejected: DeviceError<MockError> = MockError::Rejected.into();

    assert_eq!(blocked.to_string(), "blocked by certification session");
    assert_eq!(rejected.to_string(), "MAC engine rejected request: Rejected");
    assert_eq!(
        DeviceError::<MockError>::InvalidTransition.to_string(),
        "unsupported device class"
    );
}

#[test]
fn test_credential_accessors() {
    let mut h = otaa_harness();

    h.device.set_app_key([0x33; 16]);
    h.device.set_app_eui([0x44; 8]);
    assert_eq!(h.device.app_key(), &[0x33; 16]);
    assert_eq!(h.device.app_eui(), &[0x44; 8]);

    // The next join uses the updated credentials
    h.device.join().unwrap();
    let join = h.device.mac().joins()[0];
    assert_eq!(join.app_key, [0x33; 16]);
    assert_eq!(join.app_eui, [0x44; 8]);
}

#[test]
fn test_activation_mode_accessor() {
    let mut h = otaa_harness();
    h.device.set_dev_addr(DEV_ADDR);
    h.device.set_session_keys(NWK_SKEY, APP_SKEY);
    h.device.set_activation_mode(ActivationMode::Abp);
    assert_eq!(h.device.activation_mode(), ActivationMode::Abp);

    h.device.join().unwrap();

    assert!(h.device.is_joined());
    assert!(h.device.mac().joins().is_empty());
    assert_eq!(h.device.mac().sessions()[0].dev_addr, DEV_ADDR);
}

#[test]
fn test_tx_datarate_accessor() {
    let mut h = abp_harness();
    assert_eq!(h.device.tx_datarate(), DataRate::DR0);

    h.device.set_tx_datarate(DataRate::DR5);
    assert_eq!(h.device.tx_datarate(), DataRate::DR5);
}

#[test]
fn test_duty_cycle_accessor() {
    let mut h = abp_harness();
    assert!(h.device.duty_cycle());

    assert_eq!(h.device.set_duty_cycle(false), Ok(()));
    assert!(!h.device.duty_cycle());
    assert_eq!(h.device.mac().duty_cycle, Some(false));

    h.device.mac_mut().reject_duty_cycle = true;
    assert_eq!(
        h.device.set_duty_cycle(true),
        Err(DeviceError::SubmissionFailed(MockError::Rejected))
    );
    assert!(!h.device.duty_cycle());
}

#[test]
fn test_refresh_battery_level() {
    let mut h = abp_harness();
    h.device.app_mut().battery = 42;

    h.device.refresh_battery_level();

    assert_eq!(h.device.mac().battery_level, Some(42));
}

#[test]
fn test_init_failure_reported() {
    let mut mac = MockMac::new();
    mac.reject_duty_cycle = true;
    let timers = lorawan_controller::Timers {
        join_retry: MockTimer::new(TimerHandle::default()),
        certification: MockTimer::new(TimerHandle::default()),
    };

    let result = lorawan_controller::LoRaDevice::new(
        mac,
        MockApp::new(),
        MockCertification::new(),
        timers,
        otaa_identity(),
        DeviceParams::default(),
    );

    assert!(matches!(
        result,
        Err(DeviceError::SubmissionFailed(MockError::Rejected))
    ));
}
