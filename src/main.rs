// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use core::cell::RefCell;

use cortex_m_rt::entry;
use critical_section::Mutex;
use defmt_rtt as _;
use panic_halt as _;

use hal::{
    gpio::{gpiob, Output, PushPull},
    pac::{self, interrupt, Interrupt, NVIC},
    prelude::*,
};
use stm32f7xx_hal as hal;

use spinlight::{
    calibration::{MAGNETS, WHEEL},
    frame::{self, FrameClock, FPS},
    hw::{ActiveLevel, BitstreamOutput, BoardPins, CaptureTimer, FrameTimer, Heartbeat},
    irq,
    shared::{ColorBuffer, HandlerCell, TachoCell},
    tacho::{EstimatorConfig, PhaseEstimator, Tachometer},
    ws2812::{
        ColorOrder, PulseTiming, TransferBuffer, Ws2812Config, Ws2812Stream, BANK_SYMBOLS,
        LED_COUNT,
    },
};

type Tacho = Tachometer<'static, MAGNETS>;
type Stream = Ws2812Stream<'static, LED_COUNT, BANK_SYMBOLS>;

struct FrameContext {
    timer: FrameTimer,
    clock: FrameClock,
    heartbeat: Heartbeat<gpiob::PB7<Output<PushPull>>>,
}

const ORDER: ColorOrder = ColorOrder::Gbr;

static COLORS: ColorBuffer<LED_COUNT> = ColorBuffer::new();
static TACHO_OUT: TachoCell = TachoCell::new();

static CAPTURE: HandlerCell<(CaptureTimer, Tacho)> = HandlerCell::new();
static BITSTREAM: Mutex<RefCell<Option<(BitstreamOutput, Stream)>>> =
    Mutex::new(RefCell::new(None));
static FRAME: Mutex<RefCell<Option<FrameContext>>> = Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let mut cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.sysclk(216.MHz()).freeze();
    defmt::info!(
        "sysclk {=u32} Hz, timclk1 {=u32} Hz, timclk2 {=u32} Hz",
        clocks.sysclk().raw(),
        clocks.timclk1().raw(),
        clocks.timclk2().raw()
    );

    // GPIO
    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB);
    let _tacho_pin = pins.tacho.tim1_ch1;
    let _data_pin = pins.strip.tim3_ch2;
    let heartbeat = Heartbeat::new(pins.heartbeat, ActiveLevel::High);

    // Colors first, so the primed banks carry a real frame
    frame::initial_pattern(&COLORS, ORDER);

    // WS2812 bitstream: arm DMA, prime both banks, then start the pulse timer
    let timing = PulseTiming::from_timer_clock(clocks.timclk1().raw());
    let mut output = BitstreamOutput::new(dp.TIM3, dp.DMA1, timing);
    let buffer = cortex_m::singleton!(: TransferBuffer<BANK_SYMBOLS> = TransferBuffer::new())
        .unwrap();
    let memory = buffer.as_ptr();
    let mut stream: Stream = Ws2812Stream::new(Ws2812Config::new(timing), buffer, &COLORS);
    // SAFETY: the buffer is 'static and never freed; its length is even and fits NDTR.
    unsafe { output.arm(memory, TransferBuffer::<BANK_SYMBOLS>::SYMBOLS) };
    stream.prime();
    output.start_pulses();

    // Tachometer
    let estimator = PhaseEstimator::new(WHEEL, EstimatorConfig::default());
    let tacho: Tacho = Tachometer::new(estimator, &TACHO_OUT);
    let capture = CaptureTimer::tim1(dp.TIM1, &clocks);

    // Frame clock
    let frame_timer = FrameTimer::tim2(dp.TIM2, &clocks, FPS);

    // SAFETY: TIM1_CC and TIM1_UP_TIM10 are still masked.
    unsafe { CAPTURE.install((capture, tacho)) };
    critical_section::with(|cs| {
        BITSTREAM.borrow(cs).replace(Some((output, stream)));
        FRAME.borrow(cs).replace(Some(FrameContext {
            timer: frame_timer,
            clock: FrameClock::new(),
            heartbeat,
        }));
    });

    // SAFETY: every handler's state is in place; priorities come from `irq`.
    unsafe {
        cp.NVIC.set_priority(Interrupt::DMA1_STREAM2, irq::TRANSFER.raw());
        cp.NVIC.set_priority(Interrupt::TIM1_CC, irq::TACHO.raw());
        cp.NVIC.set_priority(Interrupt::TIM1_UP_TIM10, irq::TACHO.raw());
        cp.NVIC.set_priority(Interrupt::TIM2, irq::FRAME.raw());

        NVIC::unmask(Interrupt::DMA1_STREAM2);
        NVIC::unmask(Interrupt::TIM1_CC);
        NVIC::unmask(Interrupt::TIM1_UP_TIM10);
        NVIC::unmask(Interrupt::TIM2);
    }

    defmt::info!("spinlight running, {=usize} LEDs", LED_COUNT);

    loop {
        cortex_m::asm::wfi();
    }
}

#[interrupt]
fn DMA1_STREAM2() {
    static mut STATE: Option<(BitstreamOutput, Stream)> = None;

    if STATE.is_none() {
        *STATE = critical_section::with(|cs| BITSTREAM.borrow(cs).take());
    }
    if let Some((output, stream)) = STATE {
        output.dispatch(stream);
    }
}

/// Both TIM1 vectors run at the same priority and share one capture state.
fn service_capture() {
    // SAFETY: only the two TIM1 vectors reach CAPTURE and both run at `irq::TACHO`, so neither
    // preempts the other. DMA1_STREAM2 stays free to preempt either.
    if let Some((timer, tacho)) = unsafe { CAPTURE.get_mut() } {
        timer.dispatch(tacho);
    }
}

#[interrupt]
fn TIM1_CC() {
    service_capture();
}

#[interrupt]
fn TIM1_UP_TIM10() {
    service_capture();
}

#[interrupt]
fn TIM2() {
    static mut STATE: Option<FrameContext> = None;

    if STATE.is_none() {
        *STATE = critical_section::with(|cs| FRAME.borrow(cs).take());
    }
    let Some(ctx) = STATE else {
        return;
    };

    ctx.timer.acknowledge();
    ctx.heartbeat.beat();

    let reading = TACHO_OUT.snapshot();
    let now = ctx.clock.tick(reading);
    if reading.is_overflow() {
        frame::initial_pattern(&COLORS, ORDER);
    } else {
        frame::three_color_bands(&COLORS, ORDER, now.position);
    }

    // Must stay last
    if ctx.timer.overran() {
        ctx.clock.overrun();
    }
}
