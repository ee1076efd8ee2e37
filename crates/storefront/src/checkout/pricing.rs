//! Order pricing calculator.
//!
//! Pure functions from cart contents and checkout selections to a quote.
//! The quote is derived state: it is recomputed whenever the cart, shipping
//! selection, payment method, or discount changes, and never cached across
//! those changes.

use auric_core::PaymentMethod;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::backend::types::{CartSummary, Discount, ShippingRate};
use crate::checkout::{FREE_SHIPPING_THRESHOLD, ONLINE_PAYMENT_DISCOUNT_RATE};
use auric_core::DiscountKind;

/// A computed order quote.
///
/// Derived, never stored or mutated in place. Each discount is capped at
/// the subtotal and the total is clamped at zero, so stacking the online
/// discount on a full-subtotal code discount cannot charge a negative
/// amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuote {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    /// Always zero; tax is included in displayed prices.
    pub tax: Decimal,
    /// 5% off the subtotal when paying online.
    pub online_discount: Decimal,
    /// Deduction from the applied discount code, capped at the subtotal.
    pub code_discount: Decimal,
    pub total: Decimal,
    /// Courier name of the selected rate, if any.
    pub shipping_method: Option<String>,
}

impl OrderQuote {
    /// The all-zero quote for an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            shipping: Decimal::ZERO,
            tax: Decimal::ZERO,
            online_discount: Decimal::ZERO,
            code_discount: Decimal::ZERO,
            total: Decimal::ZERO,
            shipping_method: None,
        }
    }
}

/// Cart subtotal: Σ (discounted unit price ?? unit price) × quantity.
#[must_use]
pub fn subtotal(cart: &CartSummary) -> Decimal {
    cart.lines
        .iter()
        .map(|line| {
            let unit = line.discounted_unit_price.unwrap_or(line.unit_price);
            unit * Decimal::from(line.quantity)
        })
        .sum()
}

/// Shipping cost for a subtotal and an optionally selected rate.
///
/// Free at or above the threshold regardless of the rate's own price;
/// zero when no rate is selected.
#[must_use]
pub fn shipping_cost(subtotal: Decimal, rate: Option<&ShippingRate>) -> Decimal {
    if subtotal >= FREE_SHIPPING_THRESHOLD {
        return Decimal::ZERO;
    }
    rate.map_or(Decimal::ZERO, |r| r.rate)
}

/// Deduction for an applied discount code, capped at the subtotal.
#[must_use]
pub fn code_discount_amount(subtotal: Decimal, discount: &Discount) -> Decimal {
    let raw = match discount.kind {
        DiscountKind::Fixed => discount.value,
        DiscountKind::Percentage => subtotal * discount.value / Decimal::ONE_HUNDRED,
    };
    raw.min(subtotal)
}

/// Compute the full quote for the current checkout selections.
///
/// No side effects. An empty cart yields the all-zero quote.
#[must_use]
pub fn quote(
    cart: &CartSummary,
    rate: Option<&ShippingRate>,
    payment_method: PaymentMethod,
    discount: Option<&Discount>,
) -> OrderQuote {
    if cart.is_empty() {
        return OrderQuote::empty();
    }

    let subtotal = subtotal(cart);
    let shipping = shipping_cost(subtotal, rate);
    let online_discount = match payment_method {
        PaymentMethod::Online => subtotal * ONLINE_PAYMENT_DISCOUNT_RATE,
        PaymentMethod::Cod => Decimal::ZERO,
    };
    let code_discount = discount.map_or(Decimal::ZERO, |d| code_discount_amount(subtotal, d));
    // Both discounts can together exceed the subtotal; never go below zero
    let total = (subtotal + shipping - online_discount - code_discount).max(Decimal::ZERO);

    OrderQuote {
        subtotal,
        shipping,
        tax: Decimal::ZERO,
        online_discount,
        code_discount,
        total,
        shipping_method: rate.map(|r| r.courier_name.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auric_core::{CartLineId, CourierId, ProductId};
    use rust_decimal_macros::dec;

    fn line(unit: Decimal, discounted: Option<Decimal>, quantity: u32) -> crate::backend::types::CartLine {
        crate::backend::types::CartLine {
            id: CartLineId::new(1),
            product_id: ProductId::new(1),
            title: "Pearl Pendant".to_string(),
            unit_price: unit,
            discounted_unit_price: discounted,
            quantity,
        }
    }

    fn cart(lines: Vec<crate::backend::types::CartLine>) -> CartSummary {
        CartSummary { lines }
    }

    fn rate(price: Decimal) -> ShippingRate {
        ShippingRate {
            courier_id: CourierId::new(2),
            courier_name: "BlueDart".to_string(),
            rate: price,
            etd: "3-5 days".to_string(),
        }
    }

    fn percentage(value: Decimal) -> Discount {
        Discount {
            code: "SAVE10".to_string(),
            kind: DiscountKind::Percentage,
            value,
        }
    }

    fn fixed(value: Decimal) -> Discount {
        Discount {
            code: "FLAT100".to_string(),
            kind: DiscountKind::Fixed,
            value,
        }
    }

    #[test]
    fn test_subtotal_prefers_discounted_price() {
        let cart = cart(vec![
            line(dec!(1200), None, 2),
            line(dec!(450), Some(dec!(399)), 1),
        ]);
        assert_eq!(subtotal(&cart), dec!(2799));
    }

    #[test]
    fn test_empty_cart_all_zero() {
        let quote = quote(
            &CartSummary::default(),
            Some(&rate(dec!(150))),
            PaymentMethod::Online,
            Some(&percentage(dec!(10))),
        );
        assert_eq!(quote, OrderQuote::empty());
    }

    #[test]
    fn test_free_shipping_at_threshold() {
        // subtotal >= 599 => shipping is zero regardless of the rate's price
        let cart = cart(vec![line(dec!(599), None, 1)]);
        let quote = quote(&cart, Some(&rate(dec!(300))), PaymentMethod::Cod, None);
        assert_eq!(quote.shipping, dec!(0));
        assert_eq!(quote.total, dec!(599));
    }

    #[test]
    fn test_shipping_charged_below_threshold() {
        let cart = cart(vec![line(dec!(450), None, 1)]);
        let quote = quote(&cart, Some(&rate(dec!(150))), PaymentMethod::Cod, None);
        assert_eq!(quote.shipping, dec!(150));
        assert_eq!(quote.total, dec!(600));
    }

    #[test]
    fn test_no_rate_selected_means_zero_shipping() {
        let cart = cart(vec![line(dec!(450), None, 1)]);
        let quote = quote(&cart, None, PaymentMethod::Cod, None);
        assert_eq!(quote.shipping, dec!(0));
        assert_eq!(quote.shipping_method, None);
    }

    #[test]
    fn test_online_payment_discount() {
        let cart = cart(vec![line(dec!(1000), None, 1)]);
        let quote = quote(&cart, None, PaymentMethod::Online, None);
        assert_eq!(quote.online_discount, dec!(50));
        assert_eq!(quote.total, dec!(950));
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        let cart = cart(vec![line(dec!(80), None, 1)]);
        let quote = quote(&cart, None, PaymentMethod::Cod, Some(&fixed(dec!(100))));
        assert_eq!(quote.code_discount, dec!(80));
        assert_eq!(quote.total, dec!(0));
    }

    #[test]
    fn test_percentage_discount() {
        // SAVE10 (10%) on 2000 => 200 off
        let cart = cart(vec![line(dec!(2000), None, 1)]);
        let quote = quote(&cart, None, PaymentMethod::Cod, Some(&percentage(dec!(10))));
        assert_eq!(quote.code_discount, dec!(200));
        assert_eq!(quote.total, dec!(1800));
    }

    #[test]
    fn test_discount_removed_recomputes() {
        let cart = cart(vec![line(dec!(2000), None, 1)]);
        let with = quote(&cart, None, PaymentMethod::Cod, Some(&percentage(dec!(10))));
        let without = quote(&cart, None, PaymentMethod::Cod, None);
        assert_eq!(with.code_discount, dec!(200));
        assert_eq!(without.code_discount, dec!(0));
        assert_eq!(without.total, dec!(2000));
    }

    #[test]
    fn test_total_identity_and_non_negative() {
        let cart = cart(vec![line(dec!(450), Some(dec!(400)), 1)]);
        let quote = quote(
            &cart,
            Some(&rate(dec!(150))),
            PaymentMethod::Online,
            Some(&fixed(dec!(1000))),
        );
        assert_eq!(
            quote.total,
            quote.subtotal + quote.shipping - quote.online_discount - quote.code_discount
        );
        assert!(quote.total >= Decimal::ZERO);
    }

    #[test]
    fn test_stacked_discounts_clamp_total_at_zero() {
        // 80 subtotal, no rate: 5% online discount (4) stacks on a fixed
        // discount capped at the full subtotal (80)
        let cart = cart(vec![line(dec!(80), None, 1)]);
        let quote = quote(&cart, None, PaymentMethod::Online, Some(&fixed(dec!(100))));
        assert_eq!(quote.online_discount, dec!(4));
        assert_eq!(quote.code_discount, dec!(80));
        assert_eq!(quote.total, dec!(0));
    }

    #[test]
    fn test_tax_always_zero() {
        let cart = cart(vec![line(dec!(1000), None, 3)]);
        let quote = quote(&cart, None, PaymentMethod::Online, None);
        assert_eq!(quote.tax, dec!(0));
    }
}
