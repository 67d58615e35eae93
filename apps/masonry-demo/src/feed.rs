use strata_foundation::virtualized::{Page, PageRequest, PageSource};
use thiserror::Error;

/// Number of cards the feed serves.
pub const FEED_SIZE: usize = 10_000;

#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    pub id: usize,
    pub title: String,
    pub height: f32,
}

impl Card {
    pub fn key(&self) -> String {
        format!("card-{}", self.id)
    }
}

/// Rendered card content handed to the measuring host.
#[derive(Clone, Debug)]
pub struct CardView {
    pub label: String,
    pub height: f32,
}

pub fn render_card(card: &Card) -> CardView {
    CardView {
        label: card.title.clone(),
        height: card.height,
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("page offset {offset} is past the end of the feed ({total} cards)")]
    OutOfRange { offset: usize, total: usize },
    #[error("page limit must be at least 1")]
    EmptyPage,
}

/// In-memory feed of cards with deterministic pseudo-random heights.
#[derive(Debug)]
pub struct CardFeed {
    total: usize,
    seed: u64,
}

impl CardFeed {
    pub fn new(total: usize, seed: u64) -> Self {
        Self { total, seed }
    }

    fn card(&self, id: usize) -> Card {
        // splitmix64 step
        let mut z = self.seed.wrapping_add((id as u64 + 1).wrapping_mul(0x9e37_79b9_7f4a_7c15));
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        Card {
            id,
            title: format!("Card #{id}"),
            height: 120.0 + (z % 281) as f32,
        }
    }
}

impl PageSource<Card> for CardFeed {
    type Error = FeedError;

    fn fetch_next_page(&mut self, request: PageRequest) -> Result<Page<Card>, FeedError> {
        if request.limit == 0 {
            return Err(FeedError::EmptyPage);
        }
        if request.offset > self.total {
            return Err(FeedError::OutOfRange {
                offset: request.offset,
                total: self.total,
            });
        }
        let end = (request.offset + request.limit).min(self.total);
        log::debug!("card feed: serving {}..{end}", request.offset);
        Ok(Page {
            items: (request.offset..end).map(|id| self.card(id)).collect(),
            total: self.total,
        })
    }
}
