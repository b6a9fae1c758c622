use interlinear::{Chapter, PrintSettings, Token};
use interlinear_layout::{LayoutConfig, PageSide};
use interlinear_print::{
    compose_book, print_layout_engine, BookMeta, PrintCommand, PrintComposeOptions, PrintComposer,
    PrintJob, TextAlign, MM_PER_PX,
};

fn genesis_chapters() -> Vec<Chapter> {
    let verse = |n: u32| -> Vec<Token> {
        vec![
            Token::verse(n.to_string()),
            Token::word("Und", "AND"),
            Token::word("Gott", "GOD"),
            Token::word("sprach", "SPOKE"),
            Token::punctuation(":"),
            Token::word("Es", "IT"),
            Token::word("werde", "BECOME"),
            Token::compound([("Licht", "LIGHT"), ("quelle", "SOURCE")]),
            Token::punctuation("!"),
        ]
    };
    (1..=2)
        .map(|number| Chapter {
            number,
            paragraphs: (1..=25).map(verse).collect(),
        })
        .collect()
}

fn full_job() -> (PrintJob, usize) {
    let settings = PrintSettings::default();
    let engine = print_layout_engine(LayoutConfig::default());
    let chapters = genesis_chapters();
    let content_pages = engine
        .layout_book(&chapters, &settings)
        .expect("layout succeeds")
        .len();
    let job = compose_book(
        &engine,
        &chapters,
        &BookMeta::new("Genesis").with_language("German"),
        &settings,
        PrintComposeOptions::default(),
    )
    .expect("composes");
    (job, content_pages)
}

#[test]
fn job_has_title_page_then_alternating_content_pages() {
    let (job, content_pages) = full_job();
    assert!(content_pages > 1);
    assert_eq!(job.pages.len(), content_pages + 1);
    assert!((job.width_mm - 152.4).abs() < 1e-3);
    assert!((job.height_mm - 228.6).abs() < 1e-3);
    for (i, page) in job.pages.iter().enumerate() {
        assert_eq!(page.number, i + 1);
        let expected = if page.number % 2 == 1 {
            PageSide::Recto
        } else {
            PageSide::Verso
        };
        assert_eq!(page.side, expected);
    }
    assert_eq!(job.file_name(), "Genesis-interlinear.pdf");
}

#[test]
fn centered_runs_stay_inside_the_text_block() {
    let (job, _) = full_job();
    let margin_inner = 0.875 * 25.4;
    let margin_outer = 0.5 * 25.4;
    for page in job.pages.iter().skip(1) {
        let (left, right) = match page.side {
            PageSide::Verso => (margin_outer, job.width_mm - margin_inner),
            PageSide::Recto => (margin_inner, job.width_mm - margin_outer),
        };
        for command in &page.commands {
            if let PrintCommand::Text {
                x,
                align: TextAlign::Center,
                ..
            } = command
            {
                assert!(*x > left && *x < right, "x={x} outside {left}..{right}");
            }
        }
    }
}

#[test]
fn every_word_part_prints_source_and_lowercase_gloss() {
    let (job, _) = full_job();
    let texts: Vec<&str> = job.pages.iter().flat_map(|p| p.texts()).collect();
    let gods = texts.iter().filter(|t| **t == "Gott").count();
    let glosses = texts.iter().filter(|t| **t == "god").count();
    assert_eq!(gods, 50);
    assert_eq!(glosses, 50);
    assert!(!texts.contains(&"GOD"));
}

#[test]
fn preview_emits_only_requested_pages() {
    let settings = PrintSettings::default();
    let engine = print_layout_engine(LayoutConfig::default());
    let pages = engine
        .layout_book(&genesis_chapters(), &settings)
        .expect("layout succeeds");
    let composer = PrintComposer::new(&engine, &settings, PrintComposeOptions::preview([1, 3]))
        .expect("valid settings");
    let job = composer.compose(&BookMeta::new("Genesis"), &pages);
    let numbers: Vec<usize> = job.pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![1, 3]);
}

#[test]
fn first_line_starts_at_the_outer_margin_of_a_verso() {
    let settings = PrintSettings::default();
    let engine = print_layout_engine(LayoutConfig::default());
    let pages = engine
        .layout_book(&genesis_chapters(), &settings)
        .expect("layout succeeds");
    let composer = PrintComposer::new(&engine, &settings, PrintComposeOptions::default())
        .expect("valid settings");
    let job = composer.compose(&BookMeta::new("Genesis"), &pages);
    let first = job.page(2).expect("first content page");
    // the chapter numeral opens the flow, flush with the outer margin
    match first.commands.first() {
        Some(PrintCommand::Text { x, text, .. }) => {
            assert_eq!(text, "1");
            assert!((x - 48.0 * MM_PER_PX).abs() < 1e-3);
        }
        other => panic!("unexpected first command {other:?}"),
    }
}

#[test]
fn data_url_round_trips() {
    let (job, _) = full_job();
    let url = job.to_data_url().expect("encodes");
    assert!(url.starts_with("data:application/json;base64,"));
    let json = job.to_json().expect("serializes");
    assert_eq!(PrintJob::from_json_str(&json).expect("parses"), job);
}
