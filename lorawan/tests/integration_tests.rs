use lorawan_controller::{
    app::AppData,
    certification::{CERTIF_DUMMY_PAYLOAD, CERTIF_PORT, CERTIF_TX_PERIOD},
    downlink::ReceptionMetrics,
    events::{EventQueue, MacEvent},
    mac::{DataRate, EventStatus, McpsConfirm, McpsIndication, McpsKind, MlmeConfirm, MlmeKind},
    uplink::{Confirmation, Transmission, CONFIRMED_NB_TRIALS},
    DeviceError,
};

use mock::*;

fn downlink(port: u8, data: &[u8], rssi: i16, snr: i8) -> MacEvent {
    MacEvent::DownlinkIndication(McpsIndication::with_data(port, data, rssi, snr).unwrap())
}

fn uplink_confirm(kind: McpsKind, status: EventStatus, ack_received: bool) -> MacEvent {
    MacEvent::UplinkConfirm(McpsConfirm {
        kind,
        status,
        datarate: DataRate::DR5,
        tx_power: 2,
        ack_received,
        nb_retries: 1,
        uplink_counter: 7,
    })
}

fn joined_harness() -> Harness {
    let mut h = abp_harness();
    h.device.join().unwrap();
    h
}

#[test]
fn test_unconfirmed_uplink() {
    let mut h = joined_harness();

    let result = h
        .device
        .send(&AppData::new(2, &[0x01, 0x02, 0x03]), Confirmation::Unconfirmed);

    assert_eq!(result, Ok(Transmission::Payload));
    assert_eq!(
        h.device.mac().uplinks(),
        vec![Submission::Uplink {
            confirmed: false,
            port: Some(2),
            payload: vec![0x01, 0x02, 0x03],
            nb_trials: None,
            datarate: DataRate::DR0,
        }]
    );
}

#[test]
fn test_confirmed_uplink_uses_eight_trials() {
    let mut h = joined_harness();
    h.device.set_tx_datarate(DataRate::DR3);

    let result = h
        .device
        .send(&AppData::new(10, b"temp"), Confirmation::Confirmed);

    assert_eq!(result, Ok(Transmission::Payload));
    assert_eq!(
        h.device.mac().uplinks(),
        vec![Submission::Uplink {
            confirmed: true,
            port: Some(10),
            payload: b"temp".to_vec(),
            nb_trials: Some(CONFIRMED_NB_TRIALS),
            datarate: DataRate::DR3,
        }]
    );
    assert_eq!(CONFIRMED_NB_TRIALS, 8);
}

#[test]
fn test_oversized_payload_flushes_mac_commands() {
    let mut h = joined_harness();
    h.device.set_tx_datarate(DataRate::DR2);
    let payload = [0x55u8; 100];

    for confirmation in [Confirmation::Unconfirmed, Confirmation::Confirmed] {
        h.device.mac_mut().clear_log();
        let result = h.device.send(&AppData::new(3, &payload), confirmation);

        assert_eq!(result, Ok(Transmission::MacFlush));
        assert_eq!(
            h.device.mac().uplinks(),
            vec![Submission::Uplink {
                confirmed: false,
                port: None,
                payload: Vec::new(),
                nb_trials: None,
                datarate: DataRate::DR2,
            }]
        );
    }
}

#[test]
fn test_payload_at_limit_is_sent() {
    let mut h = joined_harness();
    let payload = [0u8; 51];

    assert_eq!(
        h.device
            .send(&AppData::new(1, &payload), Confirmation::Unconfirmed),
        Ok(Transmission::Payload)
    );
}

#[test]
fn test_uplink_rejected_by_engine() {
    let mut h = joined_harness();
    h.device.mac_mut().reject_uplink = true;

    assert_eq!(
        h.device.send(&AppData::new(2, &[1]), Confirmation::Unconfirmed),
        Err(DeviceError::SubmissionFailed(MockError::Rejected))
    );
}

#[test]
fn test_uplink_blocked_during_certification() {
    let mut h = joined_harness();
    h.device.certification_mut().running = true;
    let large = [0u8; 200];

    for port in [1, 2, CERTIF_PORT] {
        for payload in [&[][..], &[1, 2, 3][..], &large[..]] {
            for confirmation in [Confirmation::Unconfirmed, Confirmation::Confirmed] {
                assert_eq!(
                    h.device.send(&AppData::new(port, payload), confirmation),
                    Err(DeviceError::Blocked)
                );
            }
        }
    }
    assert!(h.device.mac().uplinks().is_empty());
}

#[test]
fn test_send_data_follows_ack_policy() {
    let mut h = joined_harness();
    assert_eq!(h.device.ack_policy(), Confirmation::Unconfirmed);

    h.device.send_data(2, &[0xAB]).unwrap();
    h.device.set_ack_policy(Confirmation::Confirmed);
    h.device.send_data(2, &[0xCD]).unwrap();

    let confirmed: Vec<bool> = h
        .device
        .mac()
        .uplinks()
        .iter()
        .map(|s| matches!(s, Submission::Uplink { confirmed: true, .. }))
        .collect();
    assert_eq!(confirmed, vec![false, true]);
}

#[test]
fn test_application_downlink() {
    let mut h = joined_harness();

    h.device.handle_event(&downlink(5, &[0x09, 0x08], -80, 7));

    assert_eq!(h.device.app().received, vec![(5, vec![0x09, 0x08])]);
    assert_eq!(h.device.rssi(), -80);
    assert_eq!(h.device.snr(), 7);
    assert!(h.device.certification().downlinks.is_empty());
}

#[test]
fn test_certification_port_never_reaches_application() {
    for running in [false, true] {
        let mut h = joined_harness();
        h.device.certification_mut().running = running;

        h.device.handle_event(&downlink(CERTIF_PORT, &[0x01, 0x01], -100, -5));

        assert!(h.device.app().received.is_empty());
        assert_eq!(h.device.certification().downlinks.len(), 1);
        assert_eq!(h.device.certification().downlinks[0].0, CERTIF_PORT);
        assert_eq!(h.device.certification().downlinks[0].1, vec![0x01, 0x01]);
        // Certification frames leave the application metrics alone
        assert_eq!(h.device.reception_metrics(), ReceptionMetrics::default());
    }
}

#[test]
fn test_certification_downlink_carries_join_request() {
    let mut h = otaa_harness();
    h.device.join().unwrap();
    h.device
        .handle_event(&MacEvent::ManagementConfirm(MlmeConfirm::join(EventStatus::Ok)));

    h.device.handle_event(&downlink(CERTIF_PORT, &[0x06], -90, 3));

    let join = h.device.certification().downlinks[0].2.unwrap();
    assert_eq!(join.dev_eui, DEV_EUI);
    assert_eq!(join.app_key, APP_KEY);
}

#[test]
fn test_failed_downlink_dropped() {
    let mut h = joined_harness();
    h.device.certification_mut().running = true;

    for status in [EventStatus::Rx2Timeout, EventStatus::MicFail, EventStatus::Error] {
        let mut indication = McpsIndication::with_data(2, &[0x01], -60, 9).unwrap();
        indication.status = status;
        h.device.handle_event(&MacEvent::DownlinkIndication(indication));
    }

    assert!(h.device.app().received.is_empty());
    assert!(h.device.certification().downlinks.is_empty());
    assert_eq!(h.device.certification().downlink_count, 0);
    assert_eq!(h.device.reception_metrics(), ReceptionMetrics::default());
}

#[test]
fn test_downlink_without_data_not_delivered() {
    let mut h = joined_harness();
    let mut indication = McpsIndication::with_data(2, &[], -60, 9).unwrap();
    indication.rx_data = false;

    h.device.handle_event(&MacEvent::DownlinkIndication(indication));

    assert!(h.device.app().received.is_empty());
}

#[test]
fn test_downlink_counted_only_during_certification() {
    let mut h = joined_harness();

    h.device.handle_event(&downlink(2, &[0x01], -60, 9));
    assert_eq!(h.device.certification().downlink_count, 0);

    h.device.certification_mut().running = true;
    h.device.handle_event(&downlink(2, &[0x02], -60, 9));
    h.device.handle_event(&downlink(CERTIF_PORT, &[0x03], -60, 9));
    assert_eq!(h.device.certification().downlink_count, 2);
}

#[test]
fn test_link_check_forwarded_only_during_certification() {
    let mut h = joined_harness();
    let event = MacEvent::ManagementConfirm(MlmeConfirm::link_check(20, 3));

    h.device.handle_event(&event);
    assert!(h.device.certification().link_checks.is_empty());

    h.device.certification_mut().running = true;
    let mut failed = MlmeConfirm::link_check(0, 0);
    failed.status = EventStatus::TxTimeout;
    h.device.handle_event(&MacEvent::ManagementConfirm(failed));
    assert!(h.device.certification().link_checks.is_empty());

    h.device.handle_event(&event);
    assert_eq!(
        h.device.certification().link_checks,
        vec![MlmeConfirm::link_check(20, 3)]
    );
}

#[test]
fn test_tx_cw_confirm_ignored() {
    let mut h = otaa_harness();
    h.device.join().unwrap();
    let mut confirm = MlmeConfirm::join(EventStatus::Ok);
    confirm.kind = MlmeKind::TxCw;

    h.device.handle_event(&MacEvent::ManagementConfirm(confirm));

    assert!(!h.device.is_joined());
    assert!(h.device.certification().link_checks.is_empty());
}

#[test]
fn test_uplink_confirm_telemetry() {
    let mut h = joined_harness();
    assert!(!h.device.is_ack_received());
    assert_eq!(h.device.last_uplink(), None);

    h.device
        .handle_event(&uplink_confirm(McpsKind::Confirmed, EventStatus::Ok, true));
    assert!(h.device.is_ack_received());
    let status = h.device.last_uplink().unwrap();
    assert_eq!(status.datarate, DataRate::DR5);
    assert_eq!(status.tx_power, 2);
    assert_eq!(status.nb_retries, 1);

    h.device
        .handle_event(&uplink_confirm(McpsKind::Unconfirmed, EventStatus::Ok, false));
    assert!(!h.device.is_ack_received());

    h.device
        .handle_event(&uplink_confirm(McpsKind::Confirmed, EventStatus::TxTimeout, true));
    assert!(!h.device.is_ack_received());
    assert_eq!(
        h.device.last_uplink().unwrap().status,
        EventStatus::TxTimeout
    );
}

#[test]
fn test_dispatch_pending_events() {
    let mut h = otaa_harness();
    h.device.join().unwrap();

    let mut queue = EventQueue::<4>::new();
    let (mut producer, mut consumer) = queue.split();
    producer
        .enqueue(MacEvent::ManagementConfirm(MlmeConfirm::join(EventStatus::Ok)))
        .unwrap();
    producer.enqueue(downlink(8, &[0x42], -70, 4)).unwrap();

    assert_eq!(h.device.dispatch_pending(&mut consumer), 2);
    assert!(h.device.is_joined());
    assert_eq!(h.device.app().received, vec![(8, vec![0x42])]);
    assert_eq!(h.device.dispatch_pending(&mut consumer), 0);
}

#[test]
fn test_certification_dummy_uplink() {
    let mut h = abp_harness();

    h.device.start_certification().unwrap();
    assert!(h.device.is_joined());
    assert!(h.device.certification_scheduled());
    assert_eq!(h.certification_timer.starts(), vec![CERTIF_TX_PERIOD]);

    // Nothing before the period elapses
    h.device.process();
    assert!(h.device.mac().uplinks().is_empty());

    let dummy = Submission::Uplink {
        confirmed: false,
        port: Some(CERTIF_PORT),
        payload: CERTIF_DUMMY_PAYLOAD.to_vec(),
        nb_trials: None,
        datarate: DataRate::DR0,
    };
    h.certification_timer.fire();
    h.device.process();
    assert_eq!(h.device.mac().uplinks(), vec![dummy.clone()]);

    h.certification_timer.fire();
    h.device.process();
    assert_eq!(h.device.mac().uplinks(), vec![dummy.clone(), dummy]);
}

#[test]
fn test_certification_dummy_blocked_while_test_runs() {
    let mut h = abp_harness();
    h.device.start_certification().unwrap();
    h.device.certification_mut().running = true;

    h.certification_timer.fire();
    h.device.process();

    assert!(h.device.mac().uplinks().is_empty());
    assert!(h.device.certification_scheduled());
}

#[test]
fn test_certification_dummy_repeats_with_one_shot_timer() {
    let mut h = abp_harness();
    h.certification_timer.set_one_shot();
    h.device.start_certification().unwrap();

    for _ in 0..5 {
        h.certification_timer.fire();
        h.device.process();
    }

    assert_eq!(h.device.mac().uplinks().len(), 5);
    assert!(h.certification_timer.is_running());
    assert_eq!(h.certification_timer.starts(), vec![CERTIF_TX_PERIOD; 6]);
    assert!(h.device.certification_scheduled());
}

#[test]
fn test_stop_certification() {
    let mut h = abp_harness();
    h.device.start_certification().unwrap();

    h.device.stop_certification();
    h.certification_timer.fire();
    h.device.process();

    assert!(!h.device.certification_scheduled());
    assert!(!h.certification_timer.is_running());
    assert_eq!(h.certification_timer.cancels(), 1);
    assert!(h.device.mac().uplinks().is_empty());
}

#[test]
fn test_start_certification_joins_over_the_air() {
    let mut h = otaa_harness();

    h.device.start_certification().unwrap();

    assert_eq!(h.device.mac().joins().len(), 1);
    assert!(h.certification_timer.is_running());
}
