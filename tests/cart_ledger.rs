//! Integration tests for the cart ledger priced against the bundled menu.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use rusty_money::{Money, iso};
use testresult::TestResult;

use canteen::prelude::*;

#[derive(Debug, Default)]
struct BadgeCounter {
    renders: usize,
    last: Option<CartEvent>,
}

impl CartObserver for BadgeCounter {
    fn on_change(&mut self, event: CartEvent) {
        self.renders += 1;
        self.last = Some(event);
    }
}

#[test]
fn worked_example_prices_against_bundled_menu() -> TestResult {
    let catalog = Catalog::default_menu()?;
    let mut cart = Cart::new();

    cart.set_quantity(MenuItemId::new(1), 2);
    cart.set_quantity(MenuItemId::new(2), 1);

    let totals = cart.compute_totals(&catalog);

    assert_eq!(totals.subtotal(), Decimal::new(200, 0));
    assert_eq!(totals.tax(), Decimal::new(10, 0));
    assert_eq!(totals.total(), Decimal::new(210, 0));
    assert_eq!(totals.tax_rate(), cart.tax_rate());

    let receipt = CartReceipt::from_totals(&totals)?;

    assert_eq!(receipt.total(), Money::from_minor(210_00, iso::INR));

    Ok(())
}

#[test]
fn tax_is_five_percent_of_subtotal_and_total_is_exact() -> TestResult {
    let catalog = Catalog::default_menu()?;
    let mut cart = Cart::new();

    for (id, quantity) in [(1, 3), (3, 1), (4, 2), (6, 5)] {
        cart.set_quantity(MenuItemId::new(id), quantity);
    }

    let totals = cart.compute_totals(&catalog);

    assert_eq!(totals.tax(), totals.subtotal() * Decimal::new(5, 2));
    assert_eq!(totals.total(), totals.subtotal() + totals.tax());

    Ok(())
}

#[test]
fn unknown_items_count_towards_quantity_but_not_totals() -> TestResult {
    let catalog = Catalog::default_menu()?;
    let mut cart = Cart::new();

    cart.set_quantity(MenuItemId::new(1), 1);
    cart.set_quantity(MenuItemId::new(999), 4);

    assert_eq!(cart.line_count(), 2);
    assert_eq!(cart.total_quantity(), 5);
    assert_eq!(cart.compute_totals(&catalog).subtotal(), Decimal::new(80, 0));

    Ok(())
}

#[test]
fn observer_re_renders_on_every_effective_change() -> TestResult {
    let mut cart = Cart::with_observer(BadgeCounter::default());
    let biryani = MenuItemId::new(4);

    cart.increment(biryani);
    cart.increment(biryani);
    cart.increment(biryani);
    cart.decrement(biryani);

    assert_eq!(cart.quantity(biryani), 2);
    assert_eq!(cart.observer().renders, 4);
    assert_eq!(
        cart.observer().last,
        Some(CartEvent::LineChanged {
            item_id: biryani,
            quantity: NonZeroU32::new(2).ok_or("zero")?,
        })
    );

    cart.add(biryani);

    assert_eq!(cart.observer().renders, 4);

    cart.clear();

    assert_eq!(cart.observer().last, Some(CartEvent::Cleared));
    assert_eq!(cart.total_quantity(), 0);

    Ok(())
}

#[test]
fn order_payload_snapshots_cart() -> TestResult {
    let catalog = Catalog::default_menu()?;
    let mut cart = Cart::new();

    cart.set_quantity(MenuItemId::new(3), 2);

    let request = cart.to_order_payload(BuyerId::new(3), "13:00-13:15", &catalog)?;

    cart.set_quantity(MenuItemId::new(3), 9);

    assert_eq!(request.time_slot(), "13:00-13:15");
    assert_eq!(request.line_items().len(), 1);
    assert_eq!(
        request.items().get(&MenuItemId::new(3)).map(|q| q.get()),
        Some(2)
    );
    assert_eq!(request.total(), Decimal::new(105, 0));

    Ok(())
}
