//! Wire representation of an order as a brokerage API expects it.
//!
//! The tagged `OrderKind` is converted exactly once — side and order-class
//! become strings, and only the price field relevant to the variant is set.

use serde::Serialize;

use crate::domain::{Order, OrderKind};

/// Flattened order ready for venue submission.
///
/// Outbound only: the static side/class/TIF strings make the conversion
/// allocation-free, at the price of not being deserializable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderTicket {
    pub symbol: String,
    pub qty: i64,
    /// `"buy"` or `"sell"`.
    pub side: &'static str,
    /// `"market"`, `"limit"`, or `"stop"`.
    pub order_class: &'static str,
    pub limit_price: Option<f64>,
    pub stop_price: Option<f64>,
    /// Always `"gtc"` in the reference behavior.
    pub time_in_force: &'static str,
}

impl From<&Order> for OrderTicket {
    fn from(order: &Order) -> Self {
        let (limit_price, stop_price) = match &order.kind {
            OrderKind::Market => (None, None),
            OrderKind::Limit { limit_price } => (Some(*limit_price), None),
            OrderKind::Stop { stop_price } => (None, Some(*stop_price)),
        };
        Self {
            symbol: order.symbol.clone(),
            qty: order.quantity,
            side: order.side.as_str(),
            order_class: order.kind.as_str(),
            limit_price,
            stop_price,
            time_in_force: "gtc",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderSide;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    #[test]
    fn market_ticket_has_no_prices() {
        let order = Order::market("SPY", OrderSide::Buy, 100, 50.0, date());
        let ticket = OrderTicket::from(&order);
        assert_eq!(ticket.side, "buy");
        assert_eq!(ticket.order_class, "market");
        assert_eq!(ticket.limit_price, None);
        assert_eq!(ticket.stop_price, None);
        assert_eq!(ticket.time_in_force, "gtc");
    }

    #[test]
    fn limit_ticket_carries_limit_price_only() {
        let order = Order::limit("SPY", OrderSide::Sell, 10, 51.5, date());
        let ticket = OrderTicket::from(&order);
        assert_eq!(ticket.side, "sell");
        assert_eq!(ticket.order_class, "limit");
        assert_eq!(ticket.limit_price, Some(51.5));
        assert_eq!(ticket.stop_price, None);
    }

    #[test]
    fn ticket_serializes_with_string_fields() {
        let order = Order::market("SPY", OrderSide::Buy, 100, 50.0, date());
        let json = serde_json::to_value(OrderTicket::from(&order)).unwrap();
        assert_eq!(json["side"], "buy");
        assert_eq!(json["order_class"], "market");
        assert_eq!(json["time_in_force"], "gtc");
        assert_eq!(json["qty"], 100);
    }

    #[test]
    fn stop_ticket_carries_stop_price_only() {
        let order = Order::stop("SPY", OrderSide::Sell, 10, 48.0, date());
        let ticket = OrderTicket::from(&order);
        assert_eq!(ticket.order_class, "stop");
        assert_eq!(ticket.limit_price, None);
        assert_eq!(ticket.stop_price, Some(48.0));
    }
}
