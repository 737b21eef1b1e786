use serde::Serialize;

use crate::types::Side;

/// Notional used for the average-fill-price fields.
pub const FILL_TARGET: f64 = 100.0;

/// Relative slack when deciding the target has been filled.
const FILL_EPSILON: f64 = 1e-9;

/// One resting bid level. Price is in cents (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Level {
    pub price: f64,
    pub quantity: f64,
}

impl Level {
    pub fn new(price: f64, quantity: f64) -> Self {
        Self { price, quantity }
    }
}

/// Normalized order book - resting bids for YES and NO, best price first.
///
/// Both platforms end up in this shape: Kalshi already quotes bids per side,
/// Polymarket asks are mirrored into NO bids (an ask on YES at p is a bid on NO
/// at 100 - p).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderBook {
    yes: Vec<Level>,
    no: Vec<Level>,
    /// Average price to buy 100 YES, walking the NO bids. None if too thin.
    pub yes_avg_price_100: Option<f64>,
    /// Average price to buy 100 NO, walking the YES bids. None if too thin.
    pub no_avg_price_100: Option<f64>,
}

impl OrderBook {
    /// Build a book from raw sides. Levels outside [0, 100] or with negative or
    /// non-finite quantity are dropped; both sides are sorted descending.
    pub fn new(yes: Vec<Level>, no: Vec<Level>) -> Self {
        let yes = sanitize(yes);
        let no = sanitize(no);
        let yes_avg_price_100 = avg_fill_price(&no, FILL_TARGET);
        let no_avg_price_100 = avg_fill_price(&yes, FILL_TARGET);
        Self {
            yes,
            no,
            yes_avg_price_100,
            no_avg_price_100,
        }
    }

    /// Book with both sides empty. Used when a book could not be fetched.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn side(&self, side: Side) -> &[Level] {
        match side {
            Side::Yes => &self.yes,
            Side::No => &self.no,
        }
    }

    pub fn yes(&self) -> &[Level] {
        &self.yes
    }

    pub fn no(&self) -> &[Level] {
        &self.no
    }

    pub fn is_empty(&self) -> bool {
        self.yes.is_empty() && self.no.is_empty()
    }

    /// Best bid for a side.
    pub fn best_bid(&self, side: Side) -> Option<Level> {
        self.side(side).first().copied()
    }

    /// Implied best ask for a side: 100 minus the opposite side's best bid.
    pub fn best_ask(&self, side: Side) -> Option<f64> {
        self.best_bid(side.opposite()).map(|l| 100.0 - l.price)
    }

    /// Average price to buy `target` units of `side`.
    pub fn avg_fill_price(&self, side: Side, target: f64) -> Option<f64> {
        avg_fill_price(self.side(side.opposite()), target)
    }
}

fn sanitize(mut levels: Vec<Level>) -> Vec<Level> {
    levels.retain(|l| {
        l.price.is_finite()
            && l.quantity.is_finite()
            && (0.0..=100.0).contains(&l.price)
            && l.quantity >= 0.0
    });
    levels.sort_by(|a, b| b.price.total_cmp(&a.price));
    levels
}

/// Volume-weighted average price to fill `target` units against the mirror
/// side's bids, taken in the order given.
///
/// Each level contributes `(100 - price) * filled`. All or nothing: if the
/// levels run out before `target` is reached the result is None.
pub fn avg_fill_price(mirror_bids: &[Level], target: f64) -> Option<f64> {
    if mirror_bids.is_empty() || target <= 0.0 {
        return None;
    }

    // Sizes are decimal; summing them in f64 can land a hair under target.
    let tolerance = FILL_EPSILON * target.max(1.0);
    let mut remaining = target;
    let mut weighted = 0.0;

    for level in mirror_bids {
        let take = level.quantity.min(remaining);
        if take <= 0.0 {
            continue;
        }
        weighted += (100.0 - level.price) * take;
        remaining -= take;
        if remaining <= tolerance {
            return Some(weighted / target);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_exact_fill_is_weighted_average() {
        // 60 @ (100-45)=55, 40 @ (100-40)=60
        let no = vec![Level::new(45.0, 60.0), Level::new(40.0, 40.0)];
        let book = OrderBook::new(vec![], no);

        let expected = (55.0 * 60.0 + 60.0 * 40.0) / 100.0;
        assert!(approx(book.yes_avg_price_100.unwrap(), expected));
    }

    #[test]
    fn test_decimal_sizes_summing_to_target_fill() {
        // 1.02 + 8.03 + 47.05 + 43.41 + 0.49 == 100.00 in decimal, not in f64.
        let sizes = [1.02, 8.03, 47.05, 43.41, 0.49];
        let no: Vec<Level> = sizes
            .iter()
            .enumerate()
            .map(|(i, q)| Level::new(60.0 - i as f64, *q))
            .collect();
        let expected: f64 = no
            .iter()
            .map(|l| (100.0 - l.price) * l.quantity)
            .sum::<f64>()
            / 100.0;

        let book = OrderBook::new(vec![], no);
        let avg = book.yes_avg_price_100.expect("book covers the target");
        assert!((avg - expected).abs() < 1e-6);
    }

    #[test]
    fn test_just_short_of_target_is_unavailable() {
        let no = vec![Level::new(60.0, 60.0), Level::new(50.0, 39.99)];
        let book = OrderBook::new(vec![], no);
        assert_eq!(book.yes_avg_price_100, None);
    }

    #[test]
    fn test_thin_book_is_unavailable() {
        let book = OrderBook::new(vec![Level::new(50.0, 50.0)], vec![Level::new(30.0, 50.0)]);
        assert_eq!(book.yes_avg_price_100, None);
        assert_eq!(book.no_avg_price_100, None);
    }

    #[test]
    fn test_empty_side_is_unavailable() {
        let book = OrderBook::new(vec![Level::new(40.0, 500.0)], vec![]);
        assert_eq!(book.yes_avg_price_100, None);
        assert!(approx(book.no_avg_price_100.unwrap(), 60.0));
    }

    #[test]
    fn test_fill_stops_at_target() {
        // First level alone covers the target; second level never touched.
        let no = vec![Level::new(70.0, 150.0), Level::new(10.0, 1000.0)];
        let book = OrderBook::new(vec![], no);
        assert!(approx(book.yes_avg_price_100.unwrap(), 30.0));
    }

    #[test]
    fn test_sides_sorted_descending() {
        let yes = vec![Level::new(10.0, 1.0), Level::new(30.0, 2.0), Level::new(20.0, 3.0)];
        let book = OrderBook::new(yes, vec![]);
        let prices: Vec<f64> = book.yes().iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![30.0, 20.0, 10.0]);
    }

    #[test]
    fn test_invalid_levels_dropped() {
        let yes = vec![
            Level::new(101.0, 5.0),
            Level::new(-1.0, 5.0),
            Level::new(50.0, -5.0),
            Level::new(f64::NAN, 5.0),
            Level::new(50.0, 5.0),
        ];
        let book = OrderBook::new(yes, vec![]);
        assert_eq!(book.yes(), &[Level::new(50.0, 5.0)]);
    }

    #[test]
    fn test_best_bid_and_implied_ask() {
        let book = OrderBook::new(
            vec![Level::new(40.0, 10.0), Level::new(38.0, 10.0)],
            vec![Level::new(55.0, 10.0)],
        );
        assert_eq!(book.best_bid(Side::Yes), Some(Level::new(40.0, 10.0)));
        assert!(approx(book.best_ask(Side::Yes).unwrap(), 45.0));
        assert!(approx(book.best_ask(Side::No).unwrap(), 60.0));
    }

    #[test]
    fn test_empty_book() {
        let book = OrderBook::empty();
        assert!(book.is_empty());
        assert_eq!(book.yes_avg_price_100, None);
        assert_eq!(book.best_ask(Side::Yes), None);
    }

    #[test]
    fn test_avg_fill_price_custom_target() {
        let book = OrderBook::new(vec![], vec![Level::new(60.0, 10.0)]);
        assert!(approx(book.avg_fill_price(Side::Yes, 10.0).unwrap(), 40.0));
        assert_eq!(book.avg_fill_price(Side::Yes, 11.0), None);
    }
}
