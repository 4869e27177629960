//! Acceptance scenarios: scale resolution, expanded article layout, pool centering and a
//! full reader session driven through gestures.
//!
//! Each test verifies runtime behavior through the public API only.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures::FutureExt;
use smartflow::images::{ImageFuture, ImageLoader, ImageRequest, LoadedImage};
use smartflow::layout::{ArticleView, Column, LayoutState, Measure};
use smartflow::model::{
    ArticleContent, ArticleImage, Basis, Block, BlockKind, BlockType, Breakpoints, IssueInfo,
    IssuePage, LayoutError, Size,
};
use smartflow::parser::parse_issue;
use smartflow::state::{
    GestureEvent, GestureKind, GestureOutcome, IssueReader, ReaderEvent, ReaderSettings,
};
use smartflow::view_state::PagesPool;

// ===== Test Fixtures =====

const VIEWPORT: Size = Size::new(600.0, 800.0);

/// Measures titles and paragraphs from fixed heights keyed by paragraph index.
struct FixedHeights {
    title: f64,
    texts: Vec<f64>,
}

impl Measure for FixedHeights {
    fn measure(&self, block: &Block, basis: &Basis) -> Result<Size, LayoutError> {
        let height = match &block.kind {
            BlockKind::Title(_) => self.title,
            BlockKind::Text(text) => self.texts[text.original_index],
            BlockKind::Image(_) => {
                return Err(LayoutError::Measure("images are not measured".to_string()))
            }
        };
        Ok(Size::new(basis.line_width(), height))
    }
}

fn article(paragraphs: usize, image_height: f64) -> ArticleContent {
    ArticleContent {
        title: "Harbour reopens after storm".to_string(),
        subtitle: None,
        byline: None,
        issue: None,
        images: vec![ArticleImage {
            url: "https://img.example/harbour.jpg".to_string(),
            width: 300.0,
            height: image_height,
            text: None,
        }],
        blocks: (0..paragraphs).map(|i| format!("Paragraph {i}")).collect(),
        similars_count: 0,
        page_name: None,
    }
}

fn layout_basis() -> Basis {
    Basis::new(
        Size::new(300.0, 20.0),
        Size::new(320.0, 800.0),
        Size::new(300.0, 800.0),
    )
}

fn summaries(columns: &[Column]) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("column {i}: {}", column.summary()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn uniform_issue(pages: usize, page: Size) -> IssueInfo {
    let pages = (0..pages)
        .map(|i| IssuePage::new(i as u32 + 1, page, 0))
        .collect();
    IssueInfo::new(
        "acceptance",
        Breakpoints::new(vec![400, 600], vec![600, 800, 1000]),
        vec![Size::new(1500.0, 3000.0)],
        pages,
    )
    .expect("valid issue")
}

/// Loader that answers every request immediately, stamping responses in request order.
#[derive(Default)]
struct InstantLoader {
    clock: Cell<u64>,
    requests: RefCell<Vec<ImageRequest>>,
}

impl ImageLoader for InstantLoader {
    fn load(&self, request: ImageRequest) -> ImageFuture<'_> {
        let timestamp = self.clock.get() + 1;
        self.clock.set(timestamp);
        let url = format!(
            "https://img.example/{}/{}@{}",
            request.issue_id, request.page_index, request.scale
        );
        self.requests.borrow_mut().push(request);
        async move { Ok(LoadedImage { url, timestamp }) }.boxed_local()
    }
}

// ===== Scenario: getScale =====

#[test]
fn scenario_get_scale_takes_larger_of_both_searches() {
    // GIVEN: heights [600, 800, 1000], widths [400, 600], an unrestricted 1000x2000 page
    let breakpoints = Breakpoints::new(vec![400, 600], vec![600, 800, 1000]);
    let page = IssuePage::new(1, Size::new(1000.0, 2000.0), 0);

    // WHEN: the page is fitted into 600x800
    let scale = page.get_scale(&breakpoints, 600.0, 800.0, true);

    // THEN: height search finds 800 -> 40 (400 wide fits), width search rejects 600 -> 60
    // (1200 tall) and finds 400 -> 40; the larger is 40
    assert_eq!(scale.percent(), 40);
    assert_eq!(scale.apply(page.size), Size::new(400.0, 800.0));
}

// ===== Scenario: Expanded Layout =====

#[test]
fn scenario_expanded_layout_fills_columns() {
    // GIVEN: title 100, image 300, paragraphs 200/200/250, line height 20
    let measure = FixedHeights {
        title: 100.0,
        texts: vec![200.0, 200.0, 250.0],
    };
    let mut view = ArticleView::new(layout_basis(), &article(3, 300.0), measure);

    // WHEN: the article is expanded
    let columns = view.show(LayoutState::Expanded).expect("layout succeeds");

    // THEN: column 0 holds title, image and two paragraphs; the third overflows
    let types: Vec<Vec<BlockType>> = columns
        .iter()
        .map(|c| c.blocks.iter().map(Block::block_type).collect())
        .collect();
    assert_eq!(
        types,
        vec![
            vec![BlockType::Title, BlockType::Image, BlockType::Text, BlockType::Text],
            vec![BlockType::Text],
        ]
    );
    for column in columns {
        assert!(column.filled_height().unwrap() <= 800.0);
    }

    insta::assert_snapshot!(summaries(columns), @r"
    column 0: title 100 | image 300 | text 200 | text 200
    column 1: text 250
    ");
}

#[test]
fn scenario_expanded_layout_splits_overflowing_paragraph() {
    // GIVEN: an image leaving a partial line and a paragraph taller than the space left
    let measure = FixedHeights {
        title: 100.0,
        texts: vec![200.0, 450.0],
    };
    let mut view = ArticleView::new(layout_basis(), &article(2, 290.0), measure);

    // WHEN: the article is expanded
    let columns = view.show(LayoutState::Expanded).expect("layout succeeds");

    // THEN: the image is padded to 300 and the second paragraph split at 200
    insta::assert_snapshot!(summaries(columns), @r"
    column 0: title 100 | image 290+10 | text 200 | text 200
    column 1: text 250
    ");
    let continuation = columns[1].blocks[0].as_text().unwrap();
    assert_eq!(continuation.original_index, 1);
    assert_eq!(continuation.top_offset, -200.0);
}

#[test]
fn scenario_shrink_then_expand_restores_columns() {
    let measure = FixedHeights {
        title: 100.0,
        texts: vec![200.0, 200.0, 250.0],
    };
    let mut view = ArticleView::new(layout_basis(), &article(3, 300.0), measure);

    let expanded = view.show(LayoutState::Expanded).unwrap().to_vec();
    let shrinked = view.show(LayoutState::Shrinked).unwrap();
    assert_eq!(shrinked.len(), 1);
    assert!(view.layout().has_cached_expansion(view.model()));

    let restored = view.show(LayoutState::Expanded).unwrap();
    assert_eq!(restored, expanded.as_slice());
}

// ===== Scenario: Pool Centering =====

#[test]
fn scenario_pool_window_centers_on_visible_pages() {
    // GIVEN: 50 pages rendered 200px wide, capacity 10
    let mut issue = uniform_issue(50, Size::new(500.0, 2000.0));
    let zoom = issue.zoom_info(VIEWPORT).default_zoom().clone();
    let mut pool = PagesPool::new(&issue, &zoom, VIEWPORT, 10);
    assert_eq!(pool.page_width(0).unwrap(), 200.0);

    // WHEN: the strip is moved so pages 20..=22 fill the viewport
    let window = pool.set_offset(-4000.0).expect("pages visible");

    // THEN: center 21, window 16..=25
    assert_eq!(window.visible(), 20..=22);
    assert_eq!(window.center, 21);
    assert_eq!(window.range(), 16..=25);
    assert_eq!(pool.visible_indices(), (16..=25).collect::<Vec<_>>());
}

#[test]
fn scenario_pool_window_shifts_inward_at_the_end() {
    let mut issue = uniform_issue(50, Size::new(500.0, 2000.0));
    let zoom = issue.zoom_info(VIEWPORT).default_zoom().clone();
    let mut pool = PagesPool::new(&issue, &zoom, VIEWPORT, 10);

    let last = pool.clamp_offset(f64::MIN);
    let window = pool.set_offset(last).unwrap();

    assert_eq!(last, -9400.0);
    assert_eq!(window.visible(), 47..=49);
    assert_eq!(window.range(), 40..=49);
}

// ===== Scenario: Reader Session =====

const ISSUE_JSON: &str = r#"{
    "id": "daily-2024-03-01",
    "heights": [600, 800, 1000],
    "pageSizes": [{"w": 400, "h": 800}, {"w": 600, "h": 1200}],
    "magnifierPageSizes": [{"w": 1500, "h": 3000}],
    "pages": 8,
    "pageLayout": [
        {"Width": 1000, "Height": 2000, "maxUnrestrictedScale": 0},
        {"Width": 1000, "Height": 2000, "maxUnrestrictedScale": 0},
        {"Width": 1000, "Height": 2000, "maxUnrestrictedScale": 0},
        {"Width": 1000, "Height": 2000, "maxUnrestrictedScale": 0},
        {"Width": 1000, "Height": 2000, "maxUnrestrictedScale": 0},
        {"Width": 1000, "Height": 2000, "maxUnrestrictedScale": 0},
        {"Width": 1000, "Height": 2000, "maxUnrestrictedScale": 0},
        {"Width": 1000, "Height": 2000, "maxUnrestrictedScale": 0}
    ]
}"#;

fn record(reader: &mut IssueReader) -> Rc<RefCell<Vec<ReaderEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    reader
        .events_mut()
        .subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

#[test]
fn scenario_reader_session_loads_swipes_and_reloads() {
    // GIVEN: an issue opened on its first page with an event recorder
    let issue = parse_issue(ISSUE_JSON).expect("valid issue document");
    let mut reader =
        IssueReader::new(issue, VIEWPORT, ReaderSettings::default()).expect("issue opens");
    let events = record(&mut reader);
    let loader = InstantLoader::default();

    // WHEN: images for the window are loaded
    let summary = pollster::block_on(reader.load_window_images(&loader)).unwrap();

    // THEN: every window page got an image and observers heard about it
    assert_eq!(summary.requested, 5);
    assert_eq!(summary.accepted, 5);
    assert_eq!(events.borrow().as_slice(), &[ReaderEvent::AllImagesLoaded]);
    events.borrow_mut().clear();

    // WHEN: a quick swipe to the left is released
    reader
        .handle_gesture(&GestureEvent::new(GestureKind::PanStart, 0))
        .unwrap();
    let outcome = reader
        .handle_gesture(
            &GestureEvent::new(GestureKind::PanEnd, 0)
                .with_delta(-80.0, 0.0)
                .with_time(Duration::from_millis(120)),
        )
        .unwrap();

    // THEN: the reader animates to page 1 and settles with it centered
    assert_eq!(outcome, GestureOutcome::Animating { target: 1 });
    reader.complete_animation().unwrap();
    assert_eq!(reader.pool().offset(), -300.0);
    assert_eq!(
        events.borrow().as_slice(),
        &[
            ReaderEvent::BeginAnimation(Duration::from_millis(300)),
            ReaderEvent::EndAnimation,
            ReaderEvent::PageChanged(vec![0, 1, 2, 3, 4]),
        ]
    );

    // WHEN: the reader jumps further and reloads
    let window = reader.go_to_page(6).unwrap();
    assert_eq!(window.range(), 3..=7);
    let summary = pollster::block_on(reader.load_window_images(&loader)).unwrap();

    // THEN: only window pages were requested, each at the default scale
    assert_eq!(summary.requested, 5);
    let requests = loader.requests.borrow();
    let pages: Vec<usize> = requests[5..].iter().map(|r| r.page_index).collect();
    assert_eq!(pages, vec![3, 4, 5, 6, 7]);
    assert!(requests.iter().all(|r| r.scale.percent() == 40 && r.rect.is_none()));
}

#[test]
fn scenario_pinch_to_magnifier_requests_visible_rect() {
    // GIVEN: an issue opened on its first page
    let issue = parse_issue(ISSUE_JSON).unwrap();
    let mut reader = IssueReader::new(issue, VIEWPORT, ReaderSettings::default()).unwrap();
    let center = smartflow::model::Point::new(200.0, 400.0);

    // WHEN: page 0 is pinched far beyond the largest normal zoom
    reader
        .handle_gesture(&GestureEvent::new(GestureKind::PinchStart, 0).with_pinch(center, 1.0))
        .unwrap();
    let outcome = reader
        .handle_gesture(&GestureEvent::new(GestureKind::PinchEnd, 0).with_pinch(center, 4.0))
        .unwrap();

    // THEN: the magnifier zoom is applied and its image request carries the layer and rect
    assert_eq!(outcome, GestureOutcome::Committed);
    let page = reader.pool().page(0).unwrap();
    assert!(page.zoom.is_magnifier());
    assert_eq!(page.zoom.max_height, 3000);

    let loader = InstantLoader::default();
    pollster::block_on(reader.load_window_images(&loader)).unwrap();
    let requests = loader.requests.borrow();
    assert_eq!(requests[0].layer, Some(3000));
    assert!(requests[0].rect.is_some());
    assert!(requests[1..].iter().all(|r| r.layer.is_none()));
}
