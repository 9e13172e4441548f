//! Simulated LoRaWAN node
//!
//! Runs the controller on the host against a simulated MAC engine:
//! - OTAA activation, the first join attempt is refused by the simulated
//!   network so the timed retry kicks in
//! - Periodic unconfirmed uplinks with a counter, every fourth one confirmed
//! - Downlinks on port 2 answered by the simulated network
//! - Class C for a few uplinks, then back to Class A
//!
//! The engine raises its events into a heapless SPSC queue, the way an
//! interrupt-driven engine would, and the main loop drains it.
//!
//! Usage:
//!   RUST_LOG=debug cargo run --example simulated_node --features std

use std::thread;
use std::time::{Duration, Instant};

use embedded_hal::timer::{Cancel, CountDown};
use heapless::spsc::Producer;
use log::{info, warn};
use lorawan_controller::{
    app::{AppData, Application},
    certification::NoCertification,
    class::DeviceClass,
    config::{
        device::{AbpSession, DeviceIdentity, JoinRequest, EUI64},
        params::{DeviceParams, JoinRetryPolicy},
    },
    events::{EventQueue, MacEvent},
    mac::{
        DataRate, EventStatus, MacEngine, McpsConfirm, McpsIndication, McpsKind, MlmeConfirm,
        Region, UplinkRequest,
    },
    uplink::Confirmation,
    LoRaDevice, Timers,
};
use void::Void;

const DEVEUI: EUI64 = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
const APPEUI: EUI64 = [0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01];
const APPKEY: [u8; 16] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x10,
];

const EVENT_QUEUE_LEN: usize = 8;
const UPLINK_PERIOD: Duration = Duration::from_secs(2);
const UPLINKS: u32 = 12;

/// MAC engine answering every request from a simulated network
struct SimulatedMac<'q> {
    events: Producer<'q, MacEvent, EVENT_QUEUE_LEN>,
    class: DeviceClass,
    datarate: DataRate,
    joins: u32,
    uplinks: u32,
}

#[derive(Debug)]
enum SimError {
    QueueFull,
}

impl<'q> SimulatedMac<'q> {
    fn new(events: Producer<'q, MacEvent, EVENT_QUEUE_LEN>) -> Self {
        Self {
            events,
            class: DeviceClass::A,
            datarate: DataRate::DR0,
            joins: 0,
            uplinks: 0,
        }
    }

    fn raise(&mut self, event: MacEvent) -> Result<(), SimError> {
        self.events.enqueue(event).map_err(|_| SimError::QueueFull)
    }

    fn max_payload(&self) -> usize {
        match self.datarate.index() {
            0..=2 => 51,
            3 => 115,
            _ => 222,
        }
    }
}

impl MacEngine for SimulatedMac<'_> {
    type Error = SimError;

    fn init(&mut self, region: Region) -> Result<(), Self::Error> {
        info!("simulated engine up for {:?}", region);
        Ok(())
    }

    fn set_battery_level(&mut self, _level: u8) {}

    fn set_adr(&mut self, _enabled: bool) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_public_network(&mut self, _enabled: bool) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_duty_cycle(&mut self, _enabled: bool) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_device_class(&mut self, class: DeviceClass) -> Result<(), Self::Error> {
        self.class = class;
        Ok(())
    }

    fn device_class(&mut self) -> Result<DeviceClass, Self::Error> {
        Ok(self.class)
    }

    fn submit_join(&mut self, _request: &JoinRequest) -> Result<(), Self::Error> {
        self.joins += 1;
        // Network ignores the first join request
        let status = if self.joins == 1 {
            EventStatus::JoinFail
        } else {
            EventStatus::Ok
        };
        self.raise(MacEvent::ManagementConfirm(MlmeConfirm::join(status)))
    }

    fn install_session(&mut self, _session: &AbpSession) -> Result<(), Self::Error> {
        Ok(())
    }

    fn query_tx_possible(&mut self, size: usize) -> bool {
        size <= self.max_payload()
    }

    fn submit_uplink(&mut self, request: &UplinkRequest<'_>) -> Result<(), Self::Error> {
        self.uplinks += 1;
        self.datarate = request.datarate();

        let kind = if request.is_confirmed() {
            McpsKind::Confirmed
        } else {
            McpsKind::Unconfirmed
        };
        self.raise(MacEvent::UplinkConfirm(McpsConfirm {
            kind,
            status: EventStatus::Ok,
            datarate: self.datarate,
            tx_power: 0,
            ack_received: request.is_confirmed(),
            nb_retries: 1,
            uplink_counter: self.uplinks,
        }))?;

        if self.uplinks % 3 == 0 {
            let reply = [0xCA, 0xFE, self.uplinks as u8];
            if let Some(indication) = McpsIndication::with_data(2, &reply, -87, 6) {
                self.raise(MacEvent::DownlinkIndication(indication))?;
            }
        }
        Ok(())
    }
}

/// Host timer backed by [`Instant`]
struct HostTimer {
    period: Duration,
    deadline: Option<Instant>,
}

impl HostTimer {
    fn new() -> Self {
        Self {
            period: Duration::ZERO,
            deadline: None,
        }
    }
}

impl CountDown for HostTimer {
    type Time = Duration;

    fn start<T>(&mut self, count: T)
    where
        T: Into<Self::Time>,
    {
        self.period = count.into();
        self.deadline = Some(Instant::now() + self.period);
    }

    fn wait(&mut self) -> nb::Result<(), Void> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = Some(deadline + self.period);
                Ok(())
            }
            _ => Err(nb::Error::WouldBlock),
        }
    }
}

impl Cancel for HostTimer {
    type Error = ();

    fn cancel(&mut self) -> Result<(), Self::Error> {
        self.deadline = None;
        Ok(())
    }
}

#[derive(Default)]
struct DemoApp {
    gave_up: bool,
}

impl Application for DemoApp {
    fn on_joined(&mut self) {
        info!("joined");
    }

    fn on_join_failed(&mut self) {
        warn!("join failed, giving up");
        self.gave_up = true;
    }

    fn on_class_confirmed(&mut self, class: DeviceClass) {
        info!("now in class {:?}", class);
    }

    fn on_receive(&mut self, data: &AppData<'_>) {
        info!("downlink on port {}: {:02X?}", data.port, data.buffer);
    }

    fn unique_id(&mut self) -> EUI64 {
        DEVEUI
    }

    fn random_seed(&mut self) -> u32 {
        0x5EED_1234
    }

    fn battery_level(&mut self) -> u8 {
        254
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut queue = EventQueue::<EVENT_QUEUE_LEN>::new();
    let (producer, mut consumer) = queue.split();

    let mut params = DeviceParams::for_region(Region::EU868);
    params.join_retry = JoinRetryPolicy {
        max_retries: 2,
        interval: Duration::from_secs(3),
    };

    let timers = Timers {
        join_retry: HostTimer::new(),
        certification: HostTimer::new(),
    };
    let mut device = match LoRaDevice::new(
        SimulatedMac::new(producer),
        DemoApp::default(),
        NoCertification,
        timers,
        DeviceIdentity::new_otaa(DEVEUI, APPEUI, APPKEY),
        params,
    ) {
        Ok(device) => device,
        Err(e) => {
            eprintln!("controller init failed: {}", e);
            return;
        }
    };

    if let Err(e) = device.join() {
        eprintln!("join rejected: {}", e);
        return;
    }

    let mut counter = 0u32;
    let mut next_uplink = Instant::now();
    while counter < UPLINKS && !device.app().gave_up {
        device.dispatch_pending(&mut consumer);
        device.process();

        if device.is_joined() && Instant::now() >= next_uplink {
            match counter {
                3 => device.request_class(DeviceClass::C).ok(),
                8 => device.request_class(DeviceClass::A).ok(),
                _ => None,
            };

            let message = format!("Hello, LoRaWAN! #{}", counter);
            let confirmation = if counter % 4 == 3 {
                Confirmation::Confirmed
            } else {
                Confirmation::Unconfirmed
            };
            match device.send(&AppData::new(1, message.as_bytes()), confirmation) {
                Ok(transmission) => info!("uplink #{} queued: {:?}", counter, transmission),
                Err(e) => warn!("uplink #{} failed: {}", counter, e),
            }
            if device.is_ack_received() {
                info!("previous confirmed uplink acknowledged");
            }

            counter += 1;
            next_uplink += UPLINK_PERIOD;
        }

        thread::sleep(Duration::from_millis(50));
    }

    device.dispatch_pending(&mut consumer);
    let metrics = device.reception_metrics();
    println!(
        "done: {} uplinks, last downlink rssi {} dBm snr {} dB",
        counter, metrics.rssi, metrics.snr
    );
}
