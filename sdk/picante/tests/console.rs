use picante::assets::{Chunk, PALETTE_LEN, decode_sprite_sheet, encode_font, encode_sprite_sheet};
use picante::audio::{AudioOutput, BUFFER_SAMPLES, Envelope, Modulation, ModulationKind, Waveform};
use picante::video::{NO_TRANSPARENCY, SCREEN_WIDTH, STRIPE_COUNT, STRIPE_HEIGHT};
use picante::{ControlBlock, Console, Display, Font, FontMetrics, Palette, Sprite};

#[derive(Default)]
struct Panel {
    stripes: Vec<(u16, Vec<u8>)>,
}

impl Display for Panel {
    type Error = core::convert::Infallible;

    fn transfer_stripe(&mut self, _x0: u16, y0: u16, _x1: u16, _y1: u16, pixels: &[u8]) -> Result<(), Self::Error> {
        self.stripes.push((y0, pixels.to_vec()));
        Ok(())
    }
}

impl Panel {
    fn pixel(&self, x: usize, y: usize) -> u16 {
        let frame = &self.stripes[self.stripes.len() - STRIPE_COUNT..];
        let (top, bytes) = &frame[y / STRIPE_HEIGHT];
        assert_eq!(*top as usize, y / STRIPE_HEIGHT * STRIPE_HEIGHT);
        let at = ((y % STRIPE_HEIGHT) * SCREEN_WIDTH + x) * 2;
        u16::from_be_bytes([bytes[at], bytes[at + 1]])
    }
}

#[derive(Default)]
struct Dac {
    written: Vec<Vec<i16>>,
}

impl AudioOutput for Dac {
    fn write(&mut self, samples: &[i16]) {
        self.written.push(samples.to_vec());
    }
}

const BLACK: u16 = 0x0000;
const NAVY: u16 = 0x000F;
const WHITE: u16 = 0xFFFF;

fn sheet_bytes() -> Vec<u8> {
    let mut colors = [0u16; PALETTE_LEN];
    colors[1] = 0xF800;
    colors[2] = 0x07E0;
    let palette = Palette::new(colors);
    // border of 1s around a field of 2s, with a transparent (0) centre
    let sprite = Sprite::from_fn(|x, y| match (x, y) {
        (0 | 31, _) | (_, 0 | 31) => 1,
        (12..=19, 12..=19) => 0,
        _ => 2,
    });
    encode_sprite_sheet(&[Chunk::Palette(&palette), Chunk::Sprite(&sprite)])
}

fn digits_font() -> Font {
    // 3×5 cells, '0' and '1'
    let glyphs = vec![
        0b111, 0b101, 0b101, 0b101, 0b111, //
        0b010, 0b011, 0b010, 0b010, 0b111,
    ];
    let metrics = FontMetrics { char_width: 3, char_height: 5, advance_x: 4, advance_y: 6 };
    Font::new(metrics, b'0', b'1', glyphs)
}

#[test]
fn frame_from_decoded_assets() {
    static CONTROL: ControlBlock = ControlBlock::new();

    let bytes = sheet_bytes();
    let sheet = decode_sprite_sheet(&mut bytes.as_slice());
    assert_eq!((sheet.palettes.len(), sheet.sprites.len()), (1, 1));

    let (mut console, _audio): (Console<Panel>, _) = Console::init(Panel::default(), Dac::default(), &CONTROL);
    let font = console.video.load_font(&mut encode_font(&digits_font()).as_slice());
    assert!(!font.is_none());

    console.video.clear(NAVY).unwrap();
    console.video.blit(&sheet.sprites[0], 100, 100, &sheet.palettes[0], 0).unwrap();
    console.video.blit(&sheet.sprites[0], 200, 100, &sheet.palettes[0], NO_TRANSPARENCY).unwrap();
    assert_eq!(console.video.draw_text("10", 4, 230, WHITE), Ok(2));
    console.video.draw().unwrap();

    let panel = console.video.display();
    assert_eq!(panel.stripes.len(), STRIPE_COUNT);
    assert_eq!(panel.pixel(100, 100), 0xF800);
    assert_eq!(panel.pixel(110, 110), 0x07E0);
    // transparent centre shows the clear colour, opaque one shows palette 0
    assert_eq!(panel.pixel(115, 115), NAVY);
    assert_eq!(panel.pixel(215, 115), BLACK);
    assert_eq!(panel.pixel(131, 131), 0xF800);
    assert_eq!(panel.pixel(132, 132), NAVY);
    // '1' then '0'; the '0' has a hollow middle
    assert_eq!(panel.pixel(5, 230), WHITE);
    assert_eq!(panel.pixel(4, 230), NAVY);
    assert_eq!(panel.pixel(9, 232), NAVY);
    assert_eq!(panel.pixel(8, 232), WHITE);
    assert!(console.video.queued().is_empty());
}

#[test]
fn sprite_sheet_with_junk_tail() {
    let mut bytes = sheet_bytes();
    bytes.extend_from_slice(b"fnt1");
    let sheet = decode_sprite_sheet(&mut bytes.as_slice());
    assert_eq!((sheet.palettes.len(), sheet.sprites.len()), (1, 1));
    assert!(sheet.error.is_some());
}

#[test]
fn fm_voice_through_the_scheduler() {
    static CONTROL: ControlBlock = ControlBlock::new();

    let (mut console, mut audio): (Console<Panel>, _) = Console::init(Panel::default(), Dac::default(), &CONTROL);
    let synth = &mut console.synth;
    synth.set_voice(0, Waveform::Sine, Envelope::new(4, 8, 192, 32));
    synth.set_voice(1, Waveform::Sine, Envelope::new(0, 0, 64, 0));
    synth.set_modulation(0, Modulation::new(ModulationKind::Exponential, 3 << 4, 64));
    synth.set_low_pass_filter_level(3);
    synth.play_note(0, "C4", 255).unwrap();
    assert!(synth.play_note(0, "C", 255).is_err());

    audio.start();
    for _ in 0..8 {
        audio.on_buffer_consumed();
    }

    let written = &audio.output().written;
    assert_eq!(written.len(), 9);
    assert!(written.iter().all(|b| b.len() == BUFFER_SAMPLES));
    assert!(written.iter().flatten().any(|&s| s != 0));
    assert!(audio.engine().voice(0).is_active());
    assert!(!audio.engine().voice(1).is_active());
    assert_eq!(audio.engine().voice(1).increment, audio.engine().voice(0).increment * 3);

    console.synth.release_note(0);
    // release is 32 ticks = 2048 samples = 4 buffers
    for _ in 0..6 {
        audio.on_buffer_consumed();
    }
    assert!(!audio.engine().voice(0).is_active());
    // whatever the filter carried over from the previous buffer has died out
    let last = audio.output().written.last().unwrap();
    assert!(last[64..].iter().all(|&s| s == 0));
}

#[cfg(feature = "std")]
#[test]
fn io_reader_source() {
    use picante::assets::{IoSource, decode_font};

    let bytes = encode_font(&digits_font());
    let font = decode_font(&mut IoSource(std::io::Cursor::new(bytes))).unwrap();
    assert_eq!(font, digits_font());
}
