//! Scene drivers that replay the host's frame loop against a layout.
//!
//! A frame is: scroll event, commit (measure and apply pending resets),
//! compose. The grid rule also plays the part of the renderer's height
//! callbacks for every cell it composes.

use std::ops::Range;
use std::rc::Rc;

use strata_foundation::virtualized::{
    ColumnFrame, GridFrame, GridScroll, MasonryFrame, MeasureHost, SlidingWindowGrid,
    VirtualColumn, VirtualMasonry,
};

pub struct ColumnTestRule<T, K, R, H> {
    column: VirtualColumn<T, K, R>,
    host: H,
    scroll: f32,
    frames: usize,
}

impl<T, K, R, C, H> ColumnTestRule<T, K, R, H>
where
    K: Fn(&T) -> String,
    R: Fn(&T) -> C,
    H: MeasureHost<C>,
{
    /// Wraps `column` and runs the mount frame.
    pub fn new(column: VirtualColumn<T, K, R>, host: H) -> Self {
        let mut rule = Self {
            column,
            host,
            scroll: 0.0,
            frames: 0,
        };
        rule.commit();
        rule
    }

    pub fn column(&self) -> &VirtualColumn<T, K, R> {
        &self.column
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Delivers a scroll event and finishes the frame.
    pub fn scroll_to(&mut self, window_scroll: f32) -> bool {
        self.scroll = window_scroll;
        let scrolled = self.column.on_scroll(window_scroll);
        self.commit() || scrolled
    }

    /// Swaps in a new collection and finishes the frame.
    pub fn set_items(&mut self, items: Rc<[T]>) -> bool {
        self.column.set_items(items);
        self.commit()
    }

    /// Finishes a frame at the current scroll position.
    pub fn commit(&mut self) -> bool {
        self.frames += 1;
        self.column.commit(&mut self.host, self.scroll)
    }

    pub fn frame(&self) -> ColumnFrame<C> {
        self.column.compose()
    }
}

pub struct MasonryTestRule<T, K, R, H> {
    masonry: VirtualMasonry<T, K, R>,
    host: H,
    scroll: f32,
}

impl<T, K, R, C, H> MasonryTestRule<T, K, R, H>
where
    T: Clone,
    K: Fn(&T) -> String,
    R: Fn(&T) -> C,
    H: MeasureHost<C>,
{
    pub fn new(masonry: VirtualMasonry<T, K, R>, host: H) -> Self {
        let mut rule = Self {
            masonry,
            host,
            scroll: 0.0,
        };
        rule.commit();
        rule
    }

    pub fn masonry(&self) -> &VirtualMasonry<T, K, R> {
        &self.masonry
    }

    pub fn masonry_mut(&mut self) -> &mut VirtualMasonry<T, K, R> {
        &mut self.masonry
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn scroll_to(&mut self, window_scroll: f32) -> bool {
        self.scroll = window_scroll;
        let scrolled = self.masonry.on_scroll(window_scroll);
        self.commit() || scrolled
    }

    pub fn set_items(&mut self, items: Rc<[T]>) -> bool {
        self.masonry.set_items(items);
        self.commit()
    }

    pub fn commit(&mut self) -> bool {
        self.masonry.commit(&mut self.host, self.scroll)
    }

    pub fn frame(&self) -> MasonryFrame<C> {
        self.masonry.compose()
    }

    /// Visible items of every column, column by column.
    pub fn visible(&self) -> Vec<Vec<T>> {
        self.masonry
            .columns()
            .iter()
            .map(|column| column.visible_items().cloned().collect())
            .collect()
    }
}

/// Drives a [`SlidingWindowGrid`], reporting a height for each composed
/// cell the way the renderer's ref callbacks would.
pub struct GridTestRule<T, R, F> {
    grid: SlidingWindowGrid<T, R>,
    cell_height: F,
}

impl<T, R, C, F> GridTestRule<T, R, F>
where
    R: Fn(&T) -> C,
    F: Fn(usize) -> f32,
{
    /// Mounts the grid: renders the full collection, then runs the
    /// deferred shrink.
    pub fn new(grid: SlidingWindowGrid<T, R>, cell_height: F) -> Self {
        let mut rule = Self { grid, cell_height };
        rule.render();
        rule.tick();
        rule
    }

    pub fn grid(&self) -> &SlidingWindowGrid<T, R> {
        &self.grid
    }

    pub fn window(&self) -> Range<usize> {
        self.grid.visible_window()
    }

    /// Composes the window and records a height for every cell in it.
    pub fn render(&mut self) -> GridFrame<C> {
        let frame = self.grid.compose();
        for (index, _) in &frame.cells {
            self.grid.record_height(*index, (self.cell_height)(*index));
        }
        frame
    }

    /// Runs deferred work, then renders.
    pub fn tick(&mut self) -> bool {
        let changed = self.grid.run_deferred();
        self.render();
        changed
    }

    /// Delivers one scroll event and renders.
    pub fn scroll(&mut self, scroll: GridScroll) -> bool {
        let moved = self.grid.on_scroll(scroll);
        self.render();
        moved
    }

    /// Delivers the same scroll event up to `events` times, stopping early
    /// once the window no longer moves. Returns the number of moves.
    ///
    /// Away from the collection edges the window keeps chasing the scroll
    /// position back and forth, so only edge positions stop early.
    pub fn scroll_repeatedly(&mut self, scroll: GridScroll, events: usize) -> usize {
        let mut moves = 0;
        for _ in 0..events {
            if !self.scroll(scroll) {
                break;
            }
            moves += 1;
        }
        log::trace!("grid test rule: {moves} of {events} scroll events moved the window");
        moves
    }

    /// Swaps the collection: renders the full window, then ticks.
    pub fn set_items(&mut self, items: Rc<[T]>) -> bool {
        let changed = self.grid.set_items(items);
        self.render();
        self.tick();
        changed
    }
}
