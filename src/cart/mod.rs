//! Cart
//!
//! The shopping cart for one browsing session. [`CartStore`] owns the lines
//! and writes a full JSON snapshot to [`SessionStorage`] after every change so
//! the cart survives a page reload. Storage problems never reach the caller:
//! an unreadable snapshot loads as an empty cart and failed writes are logged.

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    products::ProductId,
    storage::{SessionStorage, StorageError},
};

mod line;
mod summary;

pub use line::{CartLine, LineItem, LineSelectionError};
pub use summary::{CartSummary, FLAT_SHIPPING_CENTS};

/// Session storage key holding the cart snapshot.
pub const CART_STORAGE_KEY: &str = "teemarket_cart";

/// Session cart backed by `S`.
#[derive(Debug)]
pub struct CartStore<S> {
    lines: Vec<CartLine>,
    storage: S,
}

impl<S: SessionStorage> CartStore<S> {
    /// Restore the cart from `storage`.
    ///
    /// A missing or unreadable snapshot yields an empty cart. Restored lines
    /// with a zero quantity are dropped and repeated variants are merged.
    pub fn load(storage: S) -> Self {
        let lines = match read_snapshot(&storage) {
            Ok(lines) => lines,
            Err(reason) => {
                warn!(key = CART_STORAGE_KEY, %reason, "discarding stored cart");
                Vec::new()
            }
        };

        debug!(lines = lines.len(), "cart restored from session storage");

        Self { lines, storage }
    }

    /// Add `quantity` units of `item`, merging with an existing line for the
    /// same product, size and colour.
    ///
    /// A missing or zero quantity adds a single unit.
    pub fn add_to_cart(&mut self, item: LineItem, quantity: Option<u32>) {
        let quantity = quantity.filter(|quantity| *quantity > 0).unwrap_or(1);

        debug!(
            product_id = %item.product_id,
            size = %item.size,
            color = %item.color,
            quantity,
            "add to cart"
        );

        line::merge_into(&mut self.lines, item, quantity);

        self.persist();
    }

    /// Remove the line for the given variant. Unknown variants are ignored.
    pub fn remove_from_cart(&mut self, product_id: ProductId, size: &str, color: &str) {
        debug!(%product_id, size, color, "remove from cart");

        self.lines
            .retain(|line| !line.is_variant(product_id, size, color));

        self.persist();
    }

    /// Set the quantity of the line for the given variant.
    ///
    /// A quantity of zero or less removes the line. Unknown variants are ignored.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        size: &str,
        color: &str,
        quantity: i64,
    ) {
        if quantity <= 0 {
            self.remove_from_cart(product_id, size, color);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        debug!(%product_id, size, color, quantity, "update cart quantity");

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.is_variant(product_id, size, color))
        {
            line.quantity = quantity;
        }

        self.persist();
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        debug!(lines = self.lines.len(), "clear cart");

        self.lines.clear();

        self.persist();
    }

    /// Sum of unit price times quantity over every line, in cents.
    pub fn total_cents(&self) -> u64 {
        self.lines
            .iter()
            .fold(0, |total, line| total.saturating_add(line.total_cents()))
    }

    /// Cart page totals, including shipping.
    pub fn summary(&self) -> CartSummary {
        CartSummary::for_subtotal(self.total_cents())
    }

    /// Lines in the order they were first added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// The backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&mut self) {
        let snapshot = match serde_json::to_string(&self.lines) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(%error, "failed to serialise cart");
                return;
            }
        };

        if let Err(error) = self.storage.set_item(CART_STORAGE_KEY, &snapshot) {
            warn!(key = CART_STORAGE_KEY, %error, "failed to save cart");
        }
    }
}

/// Reasons a stored cart snapshot is discarded.
#[derive(Debug, Error)]
enum SnapshotError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("malformed cart snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

fn read_snapshot<S: SessionStorage>(storage: &S) -> Result<Vec<CartLine>, SnapshotError> {
    let Some(snapshot) = storage.get_item(CART_STORAGE_KEY)? else {
        return Ok(Vec::new());
    };

    let stored: Vec<CartLine> = serde_json::from_str(&snapshot)?;

    let mut lines = Vec::with_capacity(stored.len());

    for CartLine { item, quantity } in stored {
        if quantity > 0 {
            line::merge_into(&mut lines, item, quantity);
        }
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        products::ImageRef,
        storage::{FileStorage, MemoryStorage},
    };

    use super::*;

    fn item(product_id: u32, size: &str, color: &str, unit_price_cents: u64) -> LineItem {
        LineItem {
            product_id: ProductId(product_id),
            title: format!("Product {product_id}"),
            unit_price_cents,
            size: size.to_string(),
            color: color.to_string(),
            image_ref: ImageRef::from_url(format!("https://cdn.example/{product_id}.jpg")),
        }
    }

    fn empty_cart() -> CartStore<MemoryStorage> {
        CartStore::load(MemoryStorage::new())
    }

    /// Storage that fails every operation.
    #[derive(Debug, Default)]
    struct BrokenStorage;

    impl SessionStorage for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Io(std::io::Error::other("unavailable")))
        }

        fn set_item(&mut self, _key: &str, value: &str) -> Result<(), StorageError> {
            Err(StorageError::QuotaExceeded { size: value.len() })
        }
    }

    #[test]
    fn repeated_adds_merge_into_one_line() {
        let mut cart = empty_cart();

        cart.add_to_cart(item(1, "M", "Red", 500), None);
        cart.add_to_cart(item(1, "M", "Red", 500), Some(2));
        cart.add_to_cart(item(1, "M", "Red", 500), Some(4));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines().first().map(|line| line.quantity), Some(7));
    }

    #[test]
    fn zero_quantity_add_counts_as_one() {
        let mut cart = empty_cart();

        cart.add_to_cart(item(1, "M", "Red", 500), Some(0));

        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn different_size_or_colour_makes_a_new_line() {
        let mut cart = empty_cart();

        cart.add_to_cart(item(1, "M", "Red", 500), None);
        cart.add_to_cart(item(1, "L", "Red", 500), None);
        cart.add_to_cart(item(1, "M", "Blue", 500), None);
        cart.add_to_cart(item(2, "M", "Red", 700), None);

        assert_eq!(cart.len(), 4);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn add_then_remove_leaves_empty_cart() {
        let mut cart = empty_cart();

        cart.add_to_cart(item(1, "M", "Red", 500), None);
        cart.remove_from_cart(ProductId(1), "M", "Red");

        assert!(cart.is_empty());
        assert_eq!(cart.total_cents(), 0);
    }

    #[test]
    fn removing_unknown_variant_is_a_no_op() {
        let mut cart = empty_cart();

        cart.add_to_cart(item(1, "M", "Red", 500), None);
        cart.remove_from_cart(ProductId(1), "S", "Red");

        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn update_quantity_replaces_rather_than_adds() {
        let mut cart = empty_cart();

        cart.add_to_cart(item(1, "M", "Red", 500), Some(3));
        cart.update_quantity(ProductId(1), "M", "Red", 2);

        assert_eq!(cart.lines().first().map(|line| line.quantity), Some(2));
    }

    #[test]
    fn update_quantity_to_zero_or_below_removes_line() {
        let mut cart = empty_cart();

        cart.add_to_cart(item(1, "M", "Red", 500), None);
        cart.add_to_cart(item(2, "M", "Red", 500), None);

        cart.update_quantity(ProductId(1), "M", "Red", 0);
        cart.update_quantity(ProductId(2), "M", "Red", -3);

        assert!(cart.is_empty());
    }

    #[test]
    fn update_quantity_for_unknown_variant_is_a_no_op() {
        let mut cart = empty_cart();

        cart.add_to_cart(item(1, "M", "Red", 500), None);
        cart.update_quantity(ProductId(9), "M", "Red", 5);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn total_sums_price_times_quantity() {
        let mut cart = empty_cart();

        assert_eq!(cart.total_cents(), 0);

        cart.add_to_cart(item(1, "M", "Red", 500), Some(2));
        cart.add_to_cart(item(2, "L", "Blue", 1_250), None);

        assert_eq!(cart.total_cents(), 2_250);
    }

    #[test]
    fn clear_cart_empties_and_persists() -> TestResult {
        let mut cart = empty_cart();

        cart.add_to_cart(item(1, "M", "Red", 500), None);
        cart.clear_cart();

        assert!(cart.is_empty());
        assert_eq!(
            cart.storage().get_item(CART_STORAGE_KEY)?.as_deref(),
            Some("[]")
        );

        Ok(())
    }

    #[test]
    fn reload_restores_the_same_cart() {
        let mut cart = empty_cart();

        cart.add_to_cart(item(1, "M", "Red", 500), Some(2));
        cart.add_to_cart(item(3, "S", "Green", 900), None);
        cart.update_quantity(ProductId(3), "S", "Green", 4);
        cart.add_to_cart(item(2, "XL", "Black", 1_100), None);
        cart.remove_from_cart(ProductId(2), "XL", "Black");

        let reloaded = CartStore::load(cart.storage().clone());

        assert_eq!(reloaded.lines(), cart.lines());
        assert_eq!(reloaded.total_cents(), cart.total_cents());
    }

    #[test]
    fn corrupt_snapshot_loads_as_empty_cart() -> TestResult {
        let mut storage = MemoryStorage::new();
        storage.set_item(CART_STORAGE_KEY, "{not json")?;

        let cart = CartStore::load(storage);

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn wrong_shape_snapshot_loads_as_empty_cart() -> TestResult {
        let mut storage = MemoryStorage::new();
        storage.set_item(CART_STORAGE_KEY, r#"{"productId": 1}"#)?;

        assert!(CartStore::load(storage).is_empty());

        Ok(())
    }

    #[test]
    fn snapshot_is_normalised_on_load() -> TestResult {
        let mut storage = MemoryStorage::new();
        storage.set_item(
            CART_STORAGE_KEY,
            r#"[
                {"productId":1,"title":"Tee","priceCents":500,"size":"M","color":"Red","quantity":1,"imageUrl":""},
                {"productId":2,"title":"Cap","priceCents":300,"size":"OS","color":"Blue","quantity":0,"imageUrl":""},
                {"productId":1,"title":"Tee","priceCents":500,"size":"M","color":"Red","quantity":2,"imageUrl":""}
            ]"#,
        )?;

        let cart = CartStore::load(storage);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 3);

        Ok(())
    }

    #[test]
    fn unreadable_storage_still_gives_a_working_cart() {
        let mut cart = CartStore::load(BrokenStorage);

        cart.add_to_cart(item(1, "M", "Red", 500), Some(2));
        cart.update_quantity(ProductId(1), "M", "Red", 3);

        assert_eq!(cart.total_cents(), 1_500);
    }

    #[test]
    fn quota_exceeded_keeps_the_cart_in_memory() -> TestResult {
        let mut cart = CartStore::load(MemoryStorage::with_quota(16));

        cart.add_to_cart(item(1, "M", "Red", 500), Some(2));

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.storage().get_item(CART_STORAGE_KEY)?, None);

        Ok(())
    }

    #[test]
    fn corrupt_session_file_is_replaced_on_next_change() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");
        std::fs::write(&path, "garbage")?;

        let mut cart = CartStore::load(FileStorage::new(&path));
        assert!(cart.is_empty());

        cart.add_to_cart(item(1, "M", "Red", 500), Some(2));

        let reloaded = CartStore::load(FileStorage::new(&path));
        assert_eq!(reloaded.lines(), cart.lines());
        assert_eq!(reloaded.item_count(), 2);

        Ok(())
    }
}
