use std::alloc::{GlobalAlloc, Layout, System};
use std::convert::Infallible;
use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use interlinear::{Chapter, PrintSettings, Token};
use interlinear_embedded_graphics::{
    with_embedded_text_measurer, EgRenderConfig, EgRenderer, PageFrame,
};
use interlinear_layout::{CachedMeasurer, HeuristicMeasurer, LayoutConfig, LayoutEngine};
use interlinear_print::{print_layout_engine, BookMeta, PrintComposeOptions, PrintComposer};
use std::sync::Arc;

/// (name, chapters, verses per chapter)
const BOOKS: &[(&str, u32, u32)] = &[
    ("ruth", 4, 22),
    ("mark", 16, 40),
    ("genesis", 50, 31),
];

struct TrackingAllocator;

static CURRENT_BYTES: AtomicUsize = AtomicUsize::new(0);
static PEAK_BYTES: AtomicUsize = AtomicUsize::new(0);

#[global_allocator]
static GLOBAL_ALLOCATOR: TrackingAllocator = TrackingAllocator;

fn note_alloc(size: usize) {
    let current = CURRENT_BYTES.fetch_add(size, Ordering::Relaxed) + size;
    PEAK_BYTES.fetch_max(current, Ordering::Relaxed);
}

fn note_dealloc(size: usize) {
    CURRENT_BYTES.fetch_sub(size, Ordering::Relaxed);
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            note_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        note_dealloc(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            note_dealloc(layout.size());
            note_alloc(new_size);
        }
        new_ptr
    }
}

struct NullDisplay;

impl OriginDimensions for NullDisplay {
    fn size(&self) -> Size {
        Size::new(1024, 1024)
    }
}

impl DrawTarget for NullDisplay {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for pixel in pixels {
            black_box(pixel);
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
struct CaseResult {
    book: &'static str,
    case: &'static str,
    iterations: usize,
    min_ns: u128,
    median_ns: u128,
    max_ns: u128,
    median_peak_heap_bytes: usize,
}

fn synthetic_book(chapters: u32, verses: u32) -> Vec<Chapter> {
    (1..=chapters)
        .map(|number| Chapter {
            number,
            paragraphs: (1..=verses)
                .map(|v| {
                    vec![
                        Token::verse(v.to_string()),
                        Token::word("Und", "AND"),
                        Token::word("der", "THE"),
                        Token::word("Herr", "LORD"),
                        Token::word("sprach", "SPOKE"),
                        Token::word("zu", "TO"),
                        Token::word("Mose", "MOSES"),
                        Token::punctuation(":"),
                        Token::compound([
                            ("Himmel", "HEAVEN"),
                            ("reich", "KINGDOM"),
                            ("s", "GEN"),
                            ("erbe", "INHERITANCE"),
                        ]),
                        Token::word("und", "AND"),
                        Token::compound([("Finster", "DARK"), ("nis", "NESS")]),
                        Token::punctuation("."),
                    ]
                })
                .collect(),
        })
        .collect()
}

fn run_case<F>(
    book: &'static str,
    case: &'static str,
    warmup_iters: usize,
    measure_iters: usize,
    mut op: F,
) -> CaseResult
where
    F: FnMut() -> usize,
{
    for _ in 0..warmup_iters {
        black_box(op());
    }
    let mut times = Vec::with_capacity(measure_iters);
    let mut peaks = Vec::with_capacity(measure_iters);
    for _ in 0..measure_iters {
        let baseline = CURRENT_BYTES.load(Ordering::Relaxed);
        PEAK_BYTES.store(baseline, Ordering::Relaxed);
        let start = Instant::now();
        black_box(op());
        times.push(start.elapsed().as_nanos());
        peaks.push(PEAK_BYTES.load(Ordering::Relaxed).saturating_sub(baseline));
    }
    times.sort_unstable();
    peaks.sort_unstable();
    CaseResult {
        book,
        case,
        iterations: measure_iters,
        min_ns: times[0],
        median_ns: times[times.len() / 2],
        max_ns: times[times.len() - 1],
        median_peak_heap_bytes: peaks[peaks.len() / 2],
    }
}

fn main() {
    let quick = std::env::args().any(|arg| arg == "--quick");
    let warmup_iters = if quick { 1 } else { 2 };
    let measure_iters = if quick { 3 } else { 10 };

    println!("# interlinear layout benchmark");
    println!(
        "# mode={} warmup_iters={} measure_iters={}",
        if quick { "quick" } else { "full" },
        warmup_iters,
        measure_iters
    );
    println!("book,case,iterations,min_ns,median_ns,max_ns,median_peak_heap_bytes");

    let settings = PrintSettings::default();
    let heuristic = LayoutEngine::default();
    let cached = LayoutEngine::new(LayoutConfig::default())
        .with_text_measurer(Arc::new(CachedMeasurer::new(HeuristicMeasurer)));
    let mono = with_embedded_text_measurer(LayoutEngine::default());
    let print = print_layout_engine(LayoutConfig::default());

    let mut results = Vec::new();
    for &(name, chapters, verses) in BOOKS {
        let book = synthetic_book(chapters, verses);
        let layout = |engine: &LayoutEngine| {
            engine
                .layout_book(&book, &settings)
                .unwrap_or_else(|e| panic!("layout failed: {}", e))
        };

        results.push(run_case(name, "layout_heuristic", warmup_iters, measure_iters, || {
            layout(&heuristic).len()
        }));
        results.push(run_case(name, "layout_cached", warmup_iters, measure_iters, || {
            layout(&cached).len()
        }));
        results.push(run_case(name, "layout_mono", warmup_iters, measure_iters, || {
            layout(&mono).len()
        }));

        let print_pages = layout(&print);
        let composer = PrintComposer::new(&print, &settings, PrintComposeOptions::default())
            .unwrap_or_else(|e| panic!("composer failed: {}", e));
        results.push(run_case(name, "compose_print", warmup_iters, measure_iters, || {
            composer
                .compose(&BookMeta::new(name), &print_pages)
                .pages
                .len()
        }));

        let mono_pages = layout(&mono);
        let frame = PageFrame::from_settings(&mono, &settings)
            .unwrap_or_else(|e| panic!("frame failed: {}", e));
        let renderer = EgRenderer::new(EgRenderConfig::default(), frame);
        results.push(run_case(name, "render_mono_pages", warmup_iters, measure_iters, || {
            let mut display = NullDisplay;
            for page in &mono_pages {
                let _ = renderer.render_page(page, &mut display);
            }
            mono_pages.len()
        }));
    }

    for r in &results {
        println!(
            "{},{},{},{},{},{},{}",
            r.book, r.case, r.iterations, r.min_ns, r.median_ns, r.max_ns, r.median_peak_heap_bytes
        );
    }
}
