//! High-level LoRaWAN device interface
//!
//! [`LoRaDevice`] is the single owner of the controller state. The
//! application drives it through the public operations (join, send, class
//! requests, configuration accessors), the MAC engine feeds it events
//! through [`LoRaDevice::handle_event`], and the main loop calls
//! [`LoRaDevice::process`] to service the join-retry and certification
//! timers. All of these take `&mut self`, so every state change happens in
//! one execution context.

use core::time::Duration;

use embedded_hal::timer::{Cancel, CountDown};
use heapless::spsc::Consumer;
use log::{debug, info, trace, warn};
use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    activation::{Activation, JoinProgress, SessionState},
    app::{AppData, Application},
    certification::{Certification, CERTIF_DUMMY_PAYLOAD, CERTIF_PORT, CERTIF_TX_PERIOD},
    class::{self, DeviceClass},
    config::{
        device::{AESKey, ActivationMode, DevAddr, DeviceIdentity, EUI64},
        params::{DeviceParams, RadioPolicy},
    },
    downlink::{self, ReceptionMetrics},
    error::DeviceError,
    events::{MacEvent, UplinkStatus},
    mac::{DataRate, MacEngine, McpsConfirm, McpsIndication, MlmeConfirm, MlmeKind},
    uplink::{self, Confirmation, Transmission},
};

/// Upper bound of a randomly drawn device address
pub const MAX_RANDOM_DEV_ADDR: DevAddr = 0x01FF_FFFF;

/// Timers used by the controller
///
/// Both timers are started with a [`Duration`] and polled from
/// [`LoRaDevice::process`].
pub struct Timers<TIM> {
    /// Delay before the next join attempt
    pub join_retry: TIM,
    /// Period of the certification dummy uplink
    pub certification: TIM,
}

/// LoRaWAN device controller
pub struct LoRaDevice<M, A, C, TIM>
where
    M: MacEngine,
    A: Application,
    C: Certification,
    TIM: CountDown + Cancel,
    Duration: Into<TIM::Time>,
{
    /// MAC engine
    mac: M,
    /// Application callbacks
    app: A,
    /// Certification test agent
    certification: C,
    /// Timer service
    timers: Timers<TIM>,
    /// Device identity and keys
    identity: DeviceIdentity,
    /// Parameters applied at construction
    params: DeviceParams,
    /// Transmit policy
    policy: RadioPolicy,
    /// Activation state
    activation: Activation,
    /// Last application downlink quality
    metrics: ReceptionMetrics,
    /// Last uplink confirm
    last_uplink: Option<UplinkStatus>,
    /// Join retry timer running
    join_retry_armed: bool,
    /// Certification timer running
    certification_armed: bool,
}

impl<M, A, C, TIM> LoRaDevice<M, A, C, TIM>
where
    M: MacEngine,
    A: Application,
    C: Certification,
    TIM: CountDown + Cancel,
    Duration: Into<TIM::Time>,
{
    /// Create and initialize the controller
    ///
    /// Resolves the device identity (board DevEUI and random device address
    /// unless configured as static), initializes the MAC engine for the
    /// region and applies ADR, network type, Class A and the duty cycle
    /// policy.
    pub fn new(
        mut mac: M,
        mut app: A,
        certification: C,
        timers: Timers<TIM>,
        mut identity: DeviceIdentity,
        params: DeviceParams,
    ) -> Result<Self, DeviceError<M::Error>> {
        if !params.static_dev_eui {
            identity.dev_eui = app.unique_id();
        }
        if !params.static_dev_addr {
            let mut rng = SmallRng::seed_from_u64(u64::from(app.random_seed()));
            identity.dev_addr = rng.gen_range(0..=MAX_RANDOM_DEV_ADDR);
        }

        info!(
            "{:?} activation, DevEui {:02X?} AppEui {:02X?} DevAddr {:08X}",
            identity.mode, identity.dev_eui, identity.app_eui, identity.dev_addr
        );

        mac.init(params.region)?;
        mac.set_battery_level(app.battery_level());
        mac.set_adr(params.adr)?;
        mac.set_public_network(params.public_network)?;
        mac.set_device_class(DeviceClass::A)?;
        mac.set_duty_cycle(params.radio.duty_cycle)?;

        debug!(
            "MAC engine ready: region {:?}, adr {}, duty cycle {}, DR{}",
            params.region,
            params.adr,
            params.radio.duty_cycle,
            params.radio.tx_datarate.index()
        );

        Ok(Self {
            mac,
            app,
            certification,
            timers,
            identity,
            policy: params.radio,
            activation: Activation::new(params.join_retry, params.join_trials),
            params,
            metrics: ReceptionMetrics::default(),
            last_uplink: None,
            join_retry_armed: false,
            certification_armed: false,
        })
    }

    /// Join the network
    ///
    /// OTAA queues a join request; the result arrives as a join confirm.
    /// ABP installs the session and notifies the application before
    /// returning. Any pending retry is cancelled and the retry budget reset.
    pub fn join(&mut self) -> Result<JoinProgress, DeviceError<M::Error>> {
        let progress = self
            .activation
            .join(&self.identity, &mut self.mac, &mut self.app)?;
        self.cancel_join_retry();
        Ok(progress)
    }

    /// Check if the session is established
    pub fn is_joined(&self) -> bool {
        self.activation.is_joined()
    }

    /// Current session state
    pub fn session_state(&self) -> SessionState {
        self.activation.state()
    }

    /// Check if a join retry is waiting for its timer
    pub fn join_retry_pending(&self) -> bool {
        self.activation.retry_pending()
    }

    /// Queue an application payload
    pub fn send(
        &mut self,
        data: &AppData<'_>,
        confirmation: Confirmation,
    ) -> Result<Transmission, DeviceError<M::Error>> {
        let running = self.certification.is_running();
        uplink::send(&mut self.mac, &self.policy, running, data, confirmation)
    }

    /// Queue an application payload using the configured ack policy
    pub fn send_data(
        &mut self,
        port: u8,
        payload: &[u8],
    ) -> Result<Transmission, DeviceError<M::Error>> {
        let confirmation = self.policy.ack_policy;
        self.send(&AppData::new(port, payload), confirmation)
    }

    /// Switch the device class
    pub fn request_class(&mut self, requested: DeviceClass) -> Result<(), DeviceError<M::Error>> {
        class::request_class(&mut self.mac, &mut self.app, requested)
    }

    /// Get the class the MAC engine currently operates in
    pub fn current_class(&mut self) -> Result<DeviceClass, DeviceError<M::Error>> {
        class::current_class(&mut self.mac)
    }

    /// Handle an event reported by the MAC engine
    pub fn handle_event(&mut self, event: &MacEvent) {
        match event {
            MacEvent::UplinkConfirm(confirm) => self.on_uplink_confirm(confirm),
            MacEvent::DownlinkIndication(indication) => self.on_downlink(indication),
            MacEvent::ManagementConfirm(confirm) => self.on_management_confirm(confirm),
        }
    }

    /// Handle every event waiting in a queue, returns the number handled
    pub fn dispatch_pending<const N: usize>(
        &mut self,
        events: &mut Consumer<'_, MacEvent, N>,
    ) -> usize {
        let mut handled = 0;
        while let Some(event) = events.dequeue() {
            self.handle_event(&event);
            handled += 1;
        }
        handled
    }

    /// Service expired timers
    ///
    /// Never blocks. Call from the main loop.
    pub fn process(&mut self) {
        if self.join_retry_armed && self.timers.join_retry.wait().is_ok() {
            self.cancel_join_retry();
            let progress = self
                .activation
                .retry(&self.identity, &mut self.mac, &mut self.app);
            self.follow_up(progress);
        }

        if self.certification_armed && self.timers.certification.wait().is_ok() {
            // Restart explicitly, one-shot timers stop after expiring
            self.timers.certification.start(CERTIF_TX_PERIOD);
            self.send_certification_uplink();
        }
    }

    /// Join and start the periodic certification dummy uplink
    pub fn start_certification(&mut self) -> Result<JoinProgress, DeviceError<M::Error>> {
        let progress = self.join()?;
        self.timers.certification.start(CERTIF_TX_PERIOD);
        self.certification_armed = true;
        info!("certification uplink every {:?}", CERTIF_TX_PERIOD);
        Ok(progress)
    }

    /// Stop the certification dummy uplink
    pub fn stop_certification(&mut self) {
        if self.certification_armed {
            self.timers.certification.cancel().ok();
            self.certification_armed = false;
        }
    }

    /// Check if the certification dummy uplink is scheduled
    pub fn certification_scheduled(&self) -> bool {
        self.certification_armed
    }

    /// Push the current battery level into the MAC engine
    pub fn refresh_battery_level(&mut self) {
        let level = self.app.battery_level();
        self.mac.set_battery_level(level);
    }

    /// Get activation mode
    pub fn activation_mode(&self) -> ActivationMode {
        self.identity.mode
    }

    /// Set activation mode used by the next join
    pub fn set_activation_mode(&mut self, mode: ActivationMode) {
        self.identity.mode = mode;
    }

    /// Check if duty cycle enforcement is enabled
    pub fn duty_cycle(&self) -> bool {
        self.policy.duty_cycle
    }

    /// Enable or disable duty cycle enforcement
    pub fn set_duty_cycle(&mut self, enabled: bool) -> Result<(), DeviceError<M::Error>> {
        self.mac.set_duty_cycle(enabled)?;
        self.policy.duty_cycle = enabled;
        Ok(())
    }

    /// Get device EUI
    pub fn dev_eui(&self) -> &EUI64 {
        &self.identity.dev_eui
    }

    /// Get application EUI
    pub fn app_eui(&self) -> &EUI64 {
        &self.identity.app_eui
    }

    /// Set application EUI
    pub fn set_app_eui(&mut self, app_eui: EUI64) {
        self.identity.app_eui = app_eui;
    }

    /// Get application key
    pub fn app_key(&self) -> &AESKey {
        &self.identity.app_key
    }

    /// Set application key
    pub fn set_app_key(&mut self, app_key: AESKey) {
        self.identity.app_key = app_key;
    }

    /// Get device address
    pub fn dev_addr(&self) -> DevAddr {
        self.identity.dev_addr
    }

    /// Set device address used by ABP activation
    pub fn set_dev_addr(&mut self, dev_addr: DevAddr) {
        self.identity.dev_addr = dev_addr;
    }

    /// Set ABP session keys
    pub fn set_session_keys(&mut self, nwk_skey: AESKey, app_skey: AESKey) {
        self.identity.nwk_skey = nwk_skey;
        self.identity.app_skey = app_skey;
    }

    /// Get the ack policy used by [`LoRaDevice::send_data`]
    pub fn ack_policy(&self) -> Confirmation {
        self.policy.ack_policy
    }

    /// Set the ack policy used by [`LoRaDevice::send_data`]
    pub fn set_ack_policy(&mut self, confirmation: Confirmation) {
        self.policy.ack_policy = confirmation;
    }

    /// Get transmit data rate
    pub fn tx_datarate(&self) -> DataRate {
        self.policy.tx_datarate
    }

    /// Set transmit data rate
    pub fn set_tx_datarate(&mut self, datarate: DataRate) {
        self.policy.tx_datarate = datarate;
    }

    /// RSSI of the last application downlink
    pub fn rssi(&self) -> i16 {
        self.metrics.rssi
    }

    /// SNR of the last application downlink
    pub fn snr(&self) -> i8 {
        self.metrics.snr
    }

    /// Signal quality of the last application downlink
    pub fn reception_metrics(&self) -> ReceptionMetrics {
        self.metrics
    }

    /// Check if the last uplink was a confirmed uplink that got acknowledged
    pub fn is_ack_received(&self) -> bool {
        self.last_uplink.map_or(false, |status| status.ack_received)
    }

    /// Telemetry of the last uplink confirm
    pub fn last_uplink(&self) -> Option<UplinkStatus> {
        self.last_uplink
    }

    /// Get device identity
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Get parameters applied at construction
    pub fn params(&self) -> &DeviceParams {
        &self.params
    }

    /// Get MAC engine reference
    pub fn mac(&self) -> &M {
        &self.mac
    }

    /// Get mutable MAC engine reference
    pub fn mac_mut(&mut self) -> &mut M {
        &mut self.mac
    }

    /// Get application reference
    pub fn app(&self) -> &A {
        &self.app
    }

    /// Get mutable application reference
    pub fn app_mut(&mut self) -> &mut A {
        &mut self.app
    }

    /// Get certification agent reference
    pub fn certification(&self) -> &C {
        &self.certification
    }

    /// Get mutable certification agent reference
    pub fn certification_mut(&mut self) -> &mut C {
        &mut self.certification
    }

    fn on_uplink_confirm(&mut self, confirm: &McpsConfirm) {
        trace!(
            "{:?} uplink confirmed: {:?}, DR{}, ack {}",
            confirm.kind,
            confirm.status,
            confirm.datarate.index(),
            confirm.ack_received
        );
        self.last_uplink = Some(UplinkStatus::from(confirm));
    }

    fn on_downlink(&mut self, indication: &McpsIndication) {
        if !indication.status.is_ok() {
            debug!("downlink discarded: {:?}", indication.status);
            return;
        }

        if self.certification.is_running() {
            self.certification.downlink_increment();
        }

        downlink::route(
            indication,
            self.activation.last_request(),
            &mut self.metrics,
            &mut self.app,
            &mut self.certification,
        );
    }

    fn on_management_confirm(&mut self, confirm: &MlmeConfirm) {
        match confirm.kind {
            MlmeKind::Join => {
                let progress = self
                    .activation
                    .on_join_outcome(confirm.status.is_ok(), &mut self.app);
                self.follow_up(progress);
            }
            MlmeKind::LinkCheck => {
                if confirm.status.is_ok() && self.certification.is_running() {
                    self.certification.on_link_check(confirm);
                } else {
                    trace!(
                        "link check: margin {} dB, {} gateways",
                        confirm.demod_margin,
                        confirm.nb_gateways
                    );
                }
            }
            MlmeKind::TxCw => trace!("ignoring {:?} confirm", confirm.kind),
        }
    }

    fn follow_up(&mut self, progress: JoinProgress) {
        match progress {
            JoinProgress::RetryScheduled(delay) => {
                self.timers.join_retry.start(delay);
                self.join_retry_armed = true;
            }
            JoinProgress::Joined | JoinProgress::GaveUp => self.cancel_join_retry(),
            JoinProgress::Submitted | JoinProgress::Ignored => {}
        }
    }

    fn cancel_join_retry(&mut self) {
        if self.join_retry_armed {
            self.timers.join_retry.cancel().ok();
            self.join_retry_armed = false;
        }
    }

    fn send_certification_uplink(&mut self) {
        let data = AppData::new(CERTIF_PORT, &CERTIF_DUMMY_PAYLOAD);
        match self.send(&data, Confirmation::Unconfirmed) {
            Ok(transmission) => debug!("certification uplink queued: {:?}", transmission),
            Err(DeviceError::Blocked) => trace!("certification uplink blocked, test running"),
            Err(_) => warn!("certification uplink rejected by MAC engine"),
        }
    }
}
