// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

use spinlight::irq::TransferHandler;
use spinlight::shared::ColorBuffer;
use spinlight::ws2812::{
    rgb, Bank, PulseTiming, Symbol, TransferEvent, Ws2812Config, Ws2812Stream, BITS_PER_LED,
    RESET_SYMBOL,
};

const TIMING: PulseTiming = PulseTiming::from_timer_clock(108_000_000);

/// Stand-in for the circular DMA stream: emits one symbol per call and raises the half/full
/// notifications where the hardware would, right after the last symbol of a bank.
struct SimulatedDma {
    position: usize,
}

impl SimulatedDma {
    fn new() -> Self {
        Self { position: 0 }
    }

    fn run<const LEDS: usize, const BANK: usize>(
        &mut self,
        stream: &mut Ws2812Stream<'_, LEDS, BANK>,
        symbols: usize,
    ) -> Vec<Symbol> {
        let mut out = Vec::with_capacity(symbols);
        for _ in 0..symbols {
            out.push(stream.buffer().symbol(self.position).unwrap());
            self.position += 1;

            let event = if self.position == BANK {
                Some(TransferEvent::HalfComplete)
            } else if self.position == 2 * BANK {
                self.position = 0;
                Some(TransferEvent::Complete)
            } else {
                None
            };

            if let Some(event) = event {
                let live = *stream.buffer().bank(event.live_bank());
                stream.on_transfer_event(event);
                assert_eq!(
                    *stream.buffer().bank(event.live_bank()),
                    live,
                    "live bank touched on {event:?}"
                );
            }
        }
        out
    }
}

/// One frame as it should appear on the wire.
fn expected_frame(colors: &[u32], reset_slots: usize) -> Vec<Symbol> {
    let mut frame = Vec::new();
    for &c in colors {
        for bit in (0..BITS_PER_LED).rev() {
            frame.push(TIMING.symbol(c >> bit & 1 != 0));
        }
    }
    frame.resize(frame.len() + reset_slots * BITS_PER_LED, RESET_SYMBOL);
    frame
}

const DISTINCT: [u32; 4] = [0x12_3456, 0xAB_CDEF, 0x00_FF00, 0x80_0001];

fn distinct_colors() -> ColorBuffer<4> {
    let colors = ColorBuffer::new();
    colors.write_frame(&DISTINCT);
    colors
}

fn assert_periodic<const BANK: usize>() {
    let colors = distinct_colors();
    let mut buffer = spinlight::ws2812::TransferBuffer::<BANK>::new();
    let mut stream = Ws2812Stream::new(Ws2812Config::new(TIMING), &mut buffer, &colors);
    stream.prime();

    let period = (4 + 3) * BITS_PER_LED;
    let emitted = SimulatedDma::new().run(&mut stream, 2 * period);

    let frame = expected_frame(&DISTINCT, 3);
    assert_eq!(frame.len(), period);
    assert_eq!(&emitted[..period], &frame[..], "bank {BANK}");
    assert_eq!(&emitted[period..], &frame[..], "bank {BANK}");
}

#[test]
fn periodic_with_frame_sized_buffer() {
    assert_periodic::<{ (4 + 3) * BITS_PER_LED / 2 }>();
}

#[test]
fn periodic_with_unaligned_banks() {
    assert_periodic::<40>();
    assert_periodic::<7>();
}

#[test]
fn single_blue_led_frame() {
    let colors = ColorBuffer::<1>::new();
    colors.set(0, rgb(0, 0, 255));
    let mut buffer = spinlight::ws2812::TransferBuffer::<48>::new();
    let mut stream = Ws2812Stream::new(Ws2812Config::new(TIMING), &mut buffer, &colors);
    stream.prime();

    let lower = stream.buffer().bank(Bank::Lower);
    for (i, &s) in lower[..BITS_PER_LED].iter().enumerate() {
        let bit = (8..16).contains(&i);
        assert_eq!(s, TIMING.symbol(bit), "symbol {i}");
    }
    assert!(lower[BITS_PER_LED..].iter().all(|&s| s == RESET_SYMBOL));
    assert!(stream
        .buffer()
        .bank(Bank::Upper)
        .iter()
        .all(|&s| s == RESET_SYMBOL));
}

#[test]
fn color_updates_show_up_on_the_next_refill() {
    let colors = ColorBuffer::<2>::new();
    let mut buffer = spinlight::ws2812::TransferBuffer::<{ (2 + 3) * BITS_PER_LED / 2 }>::new();
    let mut stream = Ws2812Stream::new(Ws2812Config::new(TIMING), &mut buffer, &colors);
    stream.prime();

    let mut dma = SimulatedDma::new();
    let period = 5 * BITS_PER_LED;
    let dark = dma.run(&mut stream, period);
    assert_eq!(dark, expected_frame(&[0, 0], 3));

    colors.fill(0xFF_FFFF);
    // Both banks were refilled from the old colors before the update; the new ones appear a
    // frame later.
    let stale = dma.run(&mut stream, period);
    assert_eq!(stale, expected_frame(&[0, 0], 3));
    let lit = dma.run(&mut stream, period);
    assert_eq!(lit, expected_frame(&[0xFF_FFFF, 0xFF_FFFF], 3));
}

#[test]
fn longer_reset_gap() {
    let colors = distinct_colors();
    let config = Ws2812Config::new(TIMING).with_reset_slots(5);
    let mut buffer = spinlight::ws2812::TransferBuffer::<{ 9 * BITS_PER_LED / 2 }>::new();
    let mut stream = Ws2812Stream::new(config, &mut buffer, &colors);
    stream.prime();

    let period = 9 * BITS_PER_LED;
    let emitted = SimulatedDma::new().run(&mut stream, 2 * period);
    let frame = expected_frame(&DISTINCT, 5);
    assert_eq!(&emitted[..period], &frame[..]);
    assert_eq!(&emitted[period..], &frame[..]);
}
