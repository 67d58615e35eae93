use std::fmt;
use std::rc::Rc;

use strata_core::Size;
use strata_foundation::virtualized::{
    GridConfig, GridScroll, InfiniteLoader, MasonryConfig, PageRequest, PageSource,
    ScrollMetrics, SlidingWindowGrid, VirtualMasonry,
};

use crate::feed::{render_card, Card, CardFeed, CardView, FeedError, FEED_SIZE};

const PAGE_SIZE: usize = 100;
const VIEWPORT_HEIGHT: f32 = 900.0;
const SCROLL_STEP: f32 = 650.0;
const MAX_FRAMES: usize = 20_000;
const CARD_WIDTH: f32 = 240.0;

pub struct MasonryReport {
    frames: usize,
    pages: usize,
    loaded: usize,
    content_height: f32,
    max_rendered: usize,
}

impl fmt::Display for MasonryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "masonry: {} cards in {} pages over {} frames, content {:.0}px, at most {} cards rendered per frame",
            self.loaded, self.pages, self.frames, self.content_height, self.max_rendered
        )
    }
}

fn measure_card(view: &CardView) -> Option<Size> {
    Some(Size::new(CARD_WIDTH, view.height))
}

/// Scrolls a paginated masonry to the end of the feed.
pub fn run_masonry_scene() -> Result<MasonryReport, FeedError> {
    let mut feed = CardFeed::new(FEED_SIZE, 7);
    let mut request = PageRequest::new(0, PAGE_SIZE);
    let first = feed.fetch_next_page(request)?;
    let total = first.total;
    let mut loaded: Vec<Card> = first.items;
    let mut pages = 1;

    let mut masonry = VirtualMasonry::new(
        loaded.clone(),
        Card::key,
        render_card,
        MasonryConfig::default().with_gap(12.0),
    );
    masonry.set_offset_top(64.0);
    let mut host = measure_card;
    masonry.commit(&mut host, 0.0);

    let mut loader = InfiniteLoader::new();
    loader.mount(64.0);

    let mut scroll = 0.0;
    let mut frames = 0;
    let mut max_rendered = 0;
    while frames < MAX_FRAMES {
        frames += 1;
        masonry.on_scroll(scroll);
        masonry.commit(&mut host, scroll);

        let frame = masonry.compose();
        let rendered: usize = frame.columns.iter().map(|column| column.items.len()).sum();
        max_rendered = max_rendered.max(rendered);
        if frames % 100 == 0 {
            log::info!("frame {frames}: scroll {scroll:.0}, {rendered} cards rendered");
        }

        let content_height = masonry.content_height();
        if loader.on_scroll(ScrollMetrics::new(scroll, VIEWPORT_HEIGHT), content_height) {
            if loaded.len() >= total {
                break;
            }
            request = request.next();
            let page = feed.fetch_next_page(request)?;
            log::info!("loaded page {} ({} cards)", pages + 1, page.items.len());
            loaded.extend(page.items);
            pages += 1;
            masonry.set_items(Rc::from(loaded.clone()));
            masonry.commit(&mut host, scroll);
        } else {
            scroll += SCROLL_STEP;
        }
    }

    Ok(MasonryReport {
        frames,
        pages,
        loaded: loaded.len(),
        content_height: masonry.content_height(),
        max_rendered,
    })
}

pub struct GridReport {
    events: usize,
    window_after_swap: std::ops::Range<usize>,
    max_window: usize,
}

impl fmt::Display for GridReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "grid: {} scroll events, window never above {} cells, {:?} after swap",
            self.events, self.max_window, self.window_after_swap
        )
    }
}

fn tile_height(index: usize) -> f32 {
    150.0 + (index % 3) as f32 * 30.0
}

/// Plays the renderer's height callbacks for every composed tile.
fn record_tile_heights<T, R, C>(grid: &mut SlidingWindowGrid<T, R>)
where
    R: Fn(&T) -> C,
{
    let frame = grid.compose();
    for (index, _) in &frame.cells {
        grid.record_height(*index, tile_height(*index));
    }
}

/// Scrolls a sliding grid down and back, then swaps in a short collection.
pub fn run_grid_scene() -> GridReport {
    let tiles: Rc<[usize]> = (0..1000).collect();
    let mut grid = SlidingWindowGrid::new(
        tiles,
        |tile: &usize| format!("Tile {tile}"),
        GridConfig::default(),
    );

    record_tile_heights(&mut grid);
    grid.run_deferred();
    record_tile_heights(&mut grid);

    let mut events = 0;
    let mut max_window = grid.visible_window().len();
    let down = (0..60).map(|step| step as f32 * 400.0);
    let up = (0..60).rev().map(|step| step as f32 * 400.0);
    for scroll in down.chain(up) {
        events += 1;
        if grid.on_scroll(GridScroll::new(scroll)) {
            record_tile_heights(&mut grid);
        }
        max_window = max_window.max(grid.visible_window().len());
    }

    grid.set_items((0..50).collect());
    record_tile_heights(&mut grid);
    grid.run_deferred();
    record_tile_heights(&mut grid);

    GridReport {
        events,
        window_after_swap: grid.visible_window(),
        max_window,
    }
}
