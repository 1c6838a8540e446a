#![no_std]
#![no_main]

use core::cell::RefCell;
use defmt::{error, info};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::pwm::{Pwm, PwmOutput};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Duration;
use heapless::Vec;
use rc_tx::tx_config::DefaultConfig;
use rc_tx::tx_core::menu::screens::{aux_items, EndpointSetup, ModelSetup};
use rc_tx::tx_core::store::AUX_CHANNELS;
use rc_tx::tx_core::{with_store, ChannelStore, FrameTask, ListItem, Menu, MenuFlags, SharedStore};
use rc_tx::{
    servo_pwm_config, BuzzerDriver, BuzzerHandle, BuzzerShared, FrameTicker, KeyPins, KeyShared,
    RpAdcSource, RttDisplay, ServoOutput, SharedKeypad,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => embassy_rp::adc::InterruptHandler;
});

type Store = SharedStore<CriticalSectionRawMutex>;
type Frame = FrameTask<RpAdcSource<'static>, ServoOutput<PwmOutput<'static>>, FrameTicker>;

/// Channel store shared by the frame and menu tasks.
static STORE: StaticCell<Store> = StaticCell::new();

/// Key events from the keys task to the menu task.
static KEYS: StaticCell<KeyShared> = StaticCell::new();

/// Beep requests from the menu task to the buzzer task.
static BUZZER: StaticCell<BuzzerShared> = StaticCell::new();

/// Longest menu wait without a key, for refreshing the battery indicator.
const MENU_POLL: Duration = Duration::from_millis(100);

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("RC transmitter starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let store: &'static Store = STORE.init(Mutex::new(RefCell::new(ChannelStore::default())));
    let keys: &'static KeyShared = KEYS.init(KeyShared::new());
    let buzzer: &'static BuzzerShared = BUZZER.init(BuzzerShared::new());

    // --- ADC Setup ---
    let adc = Adc::new(p.ADC, Irqs, AdcConfig::default());
    let adc_source = RpAdcSource::new(
        adc,
        Channel::new_pin(p.PIN_26, Pull::None), // steering
        Channel::new_pin(p.PIN_27, Pull::None), // throttle
        Channel::new_pin(p.PIN_28, Pull::None), // battery
    );

    // --- Servo outputs ---
    let servos = ServoOutput::from_slices([
        Pwm::new_output_ab(p.PWM_SLICE0, p.PIN_0, p.PIN_1, servo_pwm_config()),
        Pwm::new_output_ab(p.PWM_SLICE1, p.PIN_2, p.PIN_3, servo_pwm_config()),
        Pwm::new_output_ab(p.PWM_SLICE2, p.PIN_4, p.PIN_5, servo_pwm_config()),
        Pwm::new_output_ab(p.PWM_SLICE3, p.PIN_6, p.PIN_7, servo_pwm_config()),
    ]);

    let frame = FrameTask::new(adc_source, servos, FrameTicker::new());

    // --- Keys and encoder ---
    let key_pins = KeyPins {
        buttons: [
            Input::new(p.PIN_8, Pull::Up),
            Input::new(p.PIN_9, Pull::Up),
            Input::new(p.PIN_10, Pull::Up),
            Input::new(p.PIN_11, Pull::Up),
            Input::new(p.PIN_12, Pull::Up),
            Input::new(p.PIN_13, Pull::Up),
            Input::new(p.PIN_14, Pull::Up),
            Input::new(p.PIN_15, Pull::Up),
            Input::new(p.PIN_16, Pull::Up),
            Input::new(p.PIN_17, Pull::Up),
            Input::new(p.PIN_18, Pull::Up),
            Input::new(p.PIN_19, Pull::Up),
        ],
        encoder_a: Input::new(p.PIN_20, Pull::Up),
        encoder_b: Input::new(p.PIN_21, Pull::Up),
    };

    let buzzer_driver = BuzzerDriver::new(Output::new(p.PIN_22, Level::Low));

    // On-board LED for ADC error indication
    let led = Output::new(p.PIN_25, Level::Low);

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(keys_task(key_pins, keys).unwrap());
    spawner.spawn(buzzer_task(buzzer_driver, buzzer).unwrap());
    spawner.spawn(frame_task(frame, store, led).unwrap());
    spawner.spawn(
        menu_task(
            SharedKeypad::new(keys, MENU_POLL),
            BuzzerHandle::new(buzzer),
            store,
        )
        .unwrap(),
    );

    info!("RC transmitter initialized");
}

/// Frame task - samples the sticks and emits one frame per tick.
#[embassy_executor::task]
async fn frame_task(mut frame: Frame, store: &'static Store, mut led: Output<'static>) {
    loop {
        match frame.process_one(store).await {
            Ok(()) => led.set_low(),
            Err(e) => {
                error!("Frame error: {:?}", e);
                // Light the LED while frames run on a stale sample
                led.set_high();
            }
        }
    }
}

/// Menu task - loads the configuration and runs the setup menus.
#[embassy_executor::task]
async fn menu_task(
    keypad: SharedKeypad<'static>,
    buzzer: BuzzerHandle<'static>,
    store: &'static Store,
) {
    let mut menu = Menu::new(keypad, RttDisplay::new(), buzzer, store);

    let mut config = DefaultConfig;
    menu.load_global(&mut config);
    menu.load_model(&mut config);

    loop {
        menu.common(&mut ModelSetup, MenuFlags::NONE).await;
        menu.common(&mut EndpointSetup, MenuFlags::NONE).await;

        let mut items = with_store(store, |s| aux_items(s));
        let mut refs: Vec<&mut dyn ListItem, AUX_CHANNELS> =
            items.iter_mut().map(|i| i as &mut dyn ListItem).collect();
        menu.list(&mut refs, false).await;
    }
}

/// Keys task - debounces the buttons and decodes the encoder.
#[embassy_executor::task]
async fn keys_task(pins: KeyPins<Input<'static>, Input<'static>>, shared: &'static KeyShared) {
    pins.run(shared).await
}

/// Buzzer task - plays beep patterns requested by the menu.
#[embassy_executor::task]
async fn buzzer_task(driver: BuzzerDriver<Output<'static>>, shared: &'static BuzzerShared) {
    driver.run(shared).await
}
