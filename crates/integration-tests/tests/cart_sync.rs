//! Cart synchronizer behavior against a recording fake backend.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use rust_decimal::Decimal;

use buildhive_core::CartLineId;
use buildhive_integration_tests::{
    RecordingCartGateway, StubIdentity, cart_line, product, stale_cart_line,
};
use buildhive_storefront::cart::{CartError, CartSynchronizer};
use buildhive_storefront::session::IdentitySource;

fn synced_cart(
    lines: Vec<buildhive_storefront::models::CartLine>,
) -> (
    Arc<RecordingCartGateway>,
    Arc<StubIdentity>,
    CartSynchronizer<Arc<RecordingCartGateway>>,
) {
    let gateway = Arc::new(RecordingCartGateway::with_lines(lines));
    let identity = Arc::new(StubIdentity::signed_in());
    let cart = CartSynchronizer::new(
        Arc::clone(&gateway),
        Arc::clone(&identity) as Arc<dyn IdentitySource>,
    );
    (gateway, identity, cart)
}

// =============================================================================
// Refresh and auth gating
// =============================================================================

#[tokio::test]
async fn test_refresh_pulls_server_lines() {
    let (_, _, cart) = synced_cart(vec![cart_line("l-1", "p-1", 2, 500)]);
    cart.refresh().await.expect("refresh");
    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.total_quantity(), 2);
}

#[tokio::test]
async fn test_refresh_while_signed_out_makes_no_request() {
    let (gateway, identity, cart) = synced_cart(vec![cart_line("l-1", "p-1", 2, 500)]);
    identity.set_signed_in(false);

    cart.refresh().await.expect("refresh is a no-op");

    assert!(gateway.call_log().is_empty());
    assert!(cart.lines().is_empty());
}

#[tokio::test]
async fn test_sign_out_keeps_mirror_until_next_sign_in() {
    let (gateway, identity, cart) = synced_cart(vec![cart_line("l-1", "p-1", 2, 500)]);
    cart.refresh().await.expect("refresh");

    identity.set_signed_in(false);
    cart.handle_auth_change(false).await.expect("sign-out");

    // The mirror survives sign-out; only a sign-in refetches.
    assert_eq!(cart.lines().len(), 1);
    assert_eq!(gateway.call_log(), vec!["fetch"]);
}

// =============================================================================
// Add
// =============================================================================

#[tokio::test]
async fn test_add_requires_sign_in() {
    let (gateway, identity, cart) = synced_cart(Vec::new());
    identity.set_signed_in(false);

    let err = cart
        .add(&product("p-1", 500, 10), 1)
        .await
        .expect_err("must be rejected");

    assert!(matches!(err, CartError::SignInRequired));
    assert_eq!(
        err.to_string(),
        "Please sign in to add items to your cart"
    );
    assert!(gateway.call_log().is_empty());
}

#[tokio::test]
async fn test_add_merges_into_existing_line() {
    let (gateway, _, cart) = synced_cart(vec![cart_line("l-1", "p-1", 2, 500)]);
    cart.refresh().await.expect("refresh");

    cart.add(&product("p-1", 500, 10), 3).await.expect("add");

    let lines = cart.lines();
    assert_eq!(lines.len(), 1, "one line per product");
    assert_eq!(cart.total_quantity(), 5);
    assert_eq!(gateway.call_log(), vec!["fetch", "add p-1 x3"]);
}

#[tokio::test]
async fn test_add_merge_ignores_echoed_response_quantity() {
    // The fake's add response carries the request quantity (3), not the
    // merged total (5). The mirror must sum locally.
    let (_, _, cart) = synced_cart(vec![cart_line("l-1", "p-1", 2, 500)]);
    cart.refresh().await.expect("refresh");

    cart.add(&product("p-1", 500, 10), 3).await.expect("add");

    let lines = cart.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(
        lines.first().map(|l| l.quantity),
        Some(5),
        "added amount sums into the existing line"
    );
}

#[tokio::test]
async fn test_add_new_product_appends_line() {
    let (_, _, cart) = synced_cart(vec![cart_line("l-1", "p-1", 1, 500)]);
    cart.refresh().await.expect("refresh");

    cart.add(&product("p-2", 300, 10), 2).await.expect("add");

    assert_eq!(cart.lines().len(), 2);
    assert_eq!(cart.subtotal().amount, Decimal::from(1100));
}

// =============================================================================
// Quantity updates
// =============================================================================

#[tokio::test]
async fn test_update_quantity_below_one_is_silently_ignored() {
    let (gateway, _, cart) = synced_cart(vec![cart_line("l-1", "p-1", 2, 500)]);
    cart.refresh().await.expect("refresh");

    cart.update_quantity(&CartLineId::new("l-1"), 0)
        .await
        .expect("no-op");

    assert_eq!(cart.total_quantity(), 2);
    assert_eq!(gateway.call_log(), vec!["fetch"], "no update request");
}

#[tokio::test]
async fn test_update_quantity_while_signed_out_is_silently_ignored() {
    let (gateway, identity, cart) = synced_cart(vec![cart_line("l-1", "p-1", 2, 500)]);
    cart.refresh().await.expect("refresh");
    identity.set_signed_in(false);

    cart.update_quantity(&CartLineId::new("l-1"), 5)
        .await
        .expect("no-op");

    assert_eq!(cart.total_quantity(), 2);
    assert_eq!(gateway.call_log(), vec!["fetch"]);
}

#[tokio::test]
async fn test_update_quantity_applies_optimistically() {
    let (_, _, cart) = synced_cart(vec![cart_line("l-1", "p-1", 2, 500)]);
    cart.refresh().await.expect("refresh");

    cart.update_quantity(&CartLineId::new("l-1"), 7)
        .await
        .expect("update");

    assert_eq!(cart.total_quantity(), 7);
}

#[tokio::test]
async fn test_update_quantity_rolls_back_on_failure() {
    let (gateway, _, cart) = synced_cart(vec![
        cart_line("l-1", "p-1", 2, 500),
        cart_line("l-2", "p-2", 1, 300),
    ]);
    cart.refresh().await.expect("refresh");
    gateway.fail_update.store(true, Ordering::SeqCst);

    let err = cart
        .update_quantity(&CartLineId::new("l-1"), 9)
        .await
        .expect_err("server rejected");

    assert!(matches!(err, CartError::Api(_)));
    // Mirror restored to the pre-change snapshot, both lines intact.
    let lines = cart.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines.iter().find(|l| l.id.as_str() == "l-1").map(|l| l.quantity),
        Some(2)
    );
}

#[tokio::test]
async fn test_update_quantity_for_unknown_line_is_ignored() {
    let (gateway, _, cart) = synced_cart(vec![cart_line("l-1", "p-1", 2, 500)]);
    cart.refresh().await.expect("refresh");

    cart.update_quantity(&CartLineId::new("l-missing"), 4)
        .await
        .expect("no-op");

    assert_eq!(gateway.call_log(), vec!["fetch"]);
}

// =============================================================================
// Remove and clear
// =============================================================================

#[tokio::test]
async fn test_remove_deletes_then_refetches() {
    let (gateway, _, cart) = synced_cart(vec![
        cart_line("l-1", "p-1", 2, 500),
        cart_line("l-2", "p-2", 1, 300),
    ]);
    cart.refresh().await.expect("refresh");

    cart.remove(&CartLineId::new("l-1")).await.expect("remove");

    assert_eq!(gateway.call_log(), vec!["fetch", "remove l-1", "fetch"]);
    assert_eq!(cart.lines().len(), 1);
}

#[tokio::test]
async fn test_remove_while_signed_out_makes_no_request() {
    let (gateway, identity, cart) = synced_cart(vec![cart_line("l-1", "p-1", 2, 500)]);
    cart.refresh().await.expect("refresh");
    identity.set_signed_in(false);

    cart.remove(&CartLineId::new("l-1")).await.expect("no-op");

    assert_eq!(cart.lines().len(), 1, "mirror untouched");
    assert_eq!(gateway.call_log(), vec!["fetch"]);
}

#[tokio::test]
async fn test_clear_while_signed_out_makes_no_request() {
    let (gateway, identity, cart) = synced_cart(vec![cart_line("l-1", "p-1", 2, 500)]);
    cart.refresh().await.expect("refresh");
    identity.set_signed_in(false);

    let cleared = cart.clear_with_prompt(|| true).await.expect("no-op");

    assert!(!cleared);
    assert_eq!(cart.lines().len(), 1, "mirror untouched");
    assert_eq!(gateway.call_log(), vec!["fetch"]);
}

#[tokio::test]
async fn test_clear_declined_prompt_touches_nothing() {
    let (gateway, _, cart) = synced_cart(vec![cart_line("l-1", "p-1", 2, 500)]);
    cart.refresh().await.expect("refresh");

    let cleared = cart.clear_with_prompt(|| false).await.expect("prompt");

    assert!(!cleared);
    assert_eq!(cart.lines().len(), 1);
    assert_eq!(gateway.call_log(), vec!["fetch"]);
}

#[tokio::test]
async fn test_clear_accepted_prompt_empties_server_and_mirror() {
    let (gateway, _, cart) = synced_cart(vec![cart_line("l-1", "p-1", 2, 500)]);
    cart.refresh().await.expect("refresh");

    let cleared = cart.clear_with_prompt(|| true).await.expect("clear");

    assert!(cleared);
    assert!(cart.lines().is_empty());
    assert_eq!(gateway.call_log(), vec!["fetch", "clear"]);
}

#[tokio::test]
async fn test_clear_after_order_is_local_only() {
    let (gateway, _, cart) = synced_cart(vec![cart_line("l-1", "p-1", 2, 500)]);
    cart.refresh().await.expect("refresh");

    cart.clear_after_order();

    assert!(cart.lines().is_empty());
    assert_eq!(gateway.call_log(), vec!["fetch"], "no clear request");
}

// =============================================================================
// Totals
// =============================================================================

#[tokio::test]
async fn test_subtotal_counts_stale_lines_as_zero() {
    let (_, _, cart) = synced_cart(vec![
        cart_line("l-1", "p-1", 2, 500),
        stale_cart_line("l-2", "p-2", 3),
    ]);
    cart.refresh().await.expect("refresh");

    assert_eq!(cart.subtotal().amount, Decimal::from(1000));
    assert_eq!(cart.total_quantity(), 5);
}
