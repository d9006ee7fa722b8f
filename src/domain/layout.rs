//! Dashboard card layout.
//!
//! Cards are grouped into display rows: `wide` and `big` cards take a whole
//! row each, while runs of `small` and `tall` cards are dealt into two
//! columns. Rows are recomputed on every pass and hold no state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSize {
    Small,
    Wide,
    Tall,
    Big,
}

impl CardSize {
    /// Whether a card of this size occupies a row on its own
    pub fn is_full_width(self) -> bool {
        matches!(self, CardSize::Wide | CardSize::Big)
    }

    /// Next size in the resize cycle: small, wide, tall, big, small...
    pub fn next(self) -> Self {
        match self {
            CardSize::Small => CardSize::Wide,
            CardSize::Wide => CardSize::Tall,
            CardSize::Tall => CardSize::Big,
            CardSize::Big => CardSize::Small,
        }
    }

    pub fn frame(self, metrics: &CardMetrics) -> Frame {
        let double_width = metrics.tile_width * 2.0 + metrics.gutter;
        let double_height = metrics.tile_height * 2.0 + metrics.gutter;
        let (width, height) = match self {
            CardSize::Small => (metrics.tile_width, metrics.tile_height),
            CardSize::Wide => (double_width, metrics.tile_height),
            CardSize::Tall => (metrics.tile_width, double_height),
            CardSize::Big => (double_width, double_height),
        };
        Frame { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
}

/// Base tile dimensions in points
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct CardMetrics {
    pub tile_width: f64,
    pub tile_height: f64,
    pub gutter: f64,
}

impl Default for CardMetrics {
    fn default() -> Self {
        Self {
            tile_width: 165.0,
            tile_height: 110.0,
            gutter: 15.0,
        }
    }
}

/// Anything the partitioner can place
pub trait Placeable {
    fn card_size(&self) -> CardSize;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceCard {
    pub id: String,
    pub size: CardSize,
    pub visible: bool,
}

impl Placeable for DeviceCard {
    fn card_size(&self) -> CardSize {
        self.size
    }
}

impl<T: Placeable> Placeable for &T {
    fn card_size(&self) -> CardSize {
        (**self).card_size()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Row<T> {
    FullWidth { item: T },
    Paired { left: Vec<T>, right: Vec<T> },
}

impl<T> Row<T> {
    fn paired(buffer: Vec<T>) -> Self {
        let mut left = Vec::with_capacity(buffer.len().div_ceil(2));
        let mut right = Vec::with_capacity(buffer.len() / 2);
        for (index, item) in buffer.into_iter().enumerate() {
            if index % 2 == 0 {
                left.push(item);
            } else {
                right.push(item);
            }
        }
        Row::Paired { left, right }
    }

    pub fn items(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        match self {
            Row::FullWidth { item } => Box::new(std::iter::once(item)),
            Row::Paired { left, right } => Box::new(left.iter().chain(right.iter())),
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Row<U> {
        match self {
            Row::FullWidth { item } => Row::FullWidth { item: f(item) },
            Row::Paired { left, right } => Row::Paired {
                left: left.into_iter().map(&mut f).collect(),
                right: right.into_iter().map(&mut f).collect(),
            },
        }
    }
}

/// Group an ordered sequence of visible cards into display rows.
///
/// Order is preserved and a paired row never spans a full-width card.
pub fn partition<T, I>(cards: I) -> Vec<Row<T>>
where
    T: Placeable,
    I: IntoIterator<Item = T>,
{
    let mut rows = Vec::new();
    let mut buffer = Vec::new();

    for card in cards {
        if card.card_size().is_full_width() {
            if !buffer.is_empty() {
                rows.push(Row::paired(std::mem::take(&mut buffer)));
            }
            rows.push(Row::FullWidth { item: card });
        } else {
            buffer.push(card);
        }
    }

    if !buffer.is_empty() {
        rows.push(Row::paired(buffer));
    }

    rows
}

/// Index of the row holding the matching card, if any
pub fn active_row<T>(rows: &[Row<T>], mut is_active: impl FnMut(&T) -> bool) -> Option<usize> {
    rows.iter().position(|row| row.items().any(&mut is_active))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, size: CardSize) -> DeviceCard {
        DeviceCard {
            id: id.to_string(),
            size,
            visible: true,
        }
    }

    fn ids(items: &[DeviceCard]) -> Vec<&str> {
        items.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        let rows = partition(Vec::<DeviceCard>::new());
        assert!(rows.is_empty());
    }

    #[test]
    fn test_wide_splits_buffer() {
        let cards = vec![
            card("s1", CardSize::Small),
            card("s2", CardSize::Small),
            card("w", CardSize::Wide),
            card("t", CardSize::Tall),
        ];
        let rows = partition(cards.clone());

        assert_eq!(
            rows,
            vec![
                Row::Paired {
                    left: vec![cards[0].clone()],
                    right: vec![cards[1].clone()],
                },
                Row::FullWidth {
                    item: cards[2].clone()
                },
                Row::Paired {
                    left: vec![cards[3].clone()],
                    right: vec![],
                },
            ]
        );
    }

    #[test]
    fn test_alternating_columns() {
        let cards: Vec<DeviceCard> = (0..5)
            .map(|i| {
                let size = if i % 3 == 0 { CardSize::Tall } else { CardSize::Small };
                card(&format!("c{}", i), size)
            })
            .collect();
        let rows = partition(cards);

        assert_eq!(rows.len(), 1);
        match &rows[0] {
            Row::Paired { left, right } => {
                assert_eq!(ids(left), vec!["c0", "c2", "c4"]);
                assert_eq!(ids(right), vec!["c1", "c3"]);
            }
            other => panic!("expected paired row, got {:?}", other),
        }
    }

    #[test]
    fn test_consecutive_full_width() {
        let cards = vec![card("b", CardSize::Big), card("w", CardSize::Wide)];
        let rows = partition(cards);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| matches!(r, Row::FullWidth { .. })));
    }

    #[test]
    fn test_every_card_placed_once() {
        let sizes = [
            CardSize::Small,
            CardSize::Big,
            CardSize::Tall,
            CardSize::Tall,
            CardSize::Small,
            CardSize::Wide,
            CardSize::Small,
            CardSize::Wide,
            CardSize::Tall,
        ];
        let cards: Vec<DeviceCard> = sizes
            .iter()
            .enumerate()
            .map(|(i, s)| card(&format!("c{}", i), *s))
            .collect();

        let rows = partition(&cards);
        let mut placed: Vec<&str> = rows
            .iter()
            .flat_map(|r| r.items().map(|c| c.id.as_str()).collect::<Vec<_>>())
            .collect();
        placed.sort();
        let mut expected = ids(&cards);
        expected.sort();
        assert_eq!(placed, expected);

        for row in &rows {
            match row {
                Row::FullWidth { item } => assert!(item.size.is_full_width()),
                Row::Paired { left, right } => {
                    let n = left.len() + right.len();
                    assert_eq!(left.len(), n.div_ceil(2));
                    assert_eq!(right.len(), n / 2);
                    assert!(left.iter().chain(right.iter()).all(|c| !c.size.is_full_width()));
                }
            }
        }
    }

    #[test]
    fn test_active_row() {
        let cards = vec![
            card("a", CardSize::Small),
            card("b", CardSize::Wide),
            card("c", CardSize::Small),
            card("d", CardSize::Tall),
        ];
        let rows = partition(cards);

        assert_eq!(active_row(&rows, |c| c.id == "a"), Some(0));
        assert_eq!(active_row(&rows, |c| c.id == "b"), Some(1));
        assert_eq!(active_row(&rows, |c| c.id == "d"), Some(2));
        assert_eq!(active_row(&rows, |c| c.id == "zzz"), None);
    }

    #[test]
    fn test_frames() {
        let metrics = CardMetrics::default();
        assert_eq!(CardSize::Small.frame(&metrics), Frame { width: 165.0, height: 110.0 });
        assert_eq!(CardSize::Wide.frame(&metrics), Frame { width: 345.0, height: 110.0 });
        assert_eq!(CardSize::Tall.frame(&metrics), Frame { width: 165.0, height: 235.0 });
        assert_eq!(CardSize::Big.frame(&metrics), Frame { width: 345.0, height: 235.0 });
    }

    #[test]
    fn test_size_cycle() {
        assert_eq!(CardSize::Small.next(), CardSize::Wide);
        assert_eq!(CardSize::Wide.next(), CardSize::Tall);
        assert_eq!(CardSize::Tall.next(), CardSize::Big);
        assert_eq!(CardSize::Big.next(), CardSize::Small);
    }
}
