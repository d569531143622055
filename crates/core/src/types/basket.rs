//! Customer basket and its line items.
//!
//! Both types serialize with camelCase field names
//! (`{"buyerId": "...", "items": [{"productId": 1, "quantity": 2}]}`).
//! Deserialization matches field names case-insensitively and skips unknown
//! fields, so a basket written by an older or differently-configured encoder
//! (`BuyerId`, `Items`, ...) still decodes.

use core::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use super::{BuyerId, ProductId};

/// One product-quantity pair in a basket.
///
/// `quantity` is stored as given. The 0..=10000 range is checked where
/// requests enter the service (see [`crate::Quantity`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketItem {
    pub product_id: ProductId,
    pub quantity: i32,
}

impl BasketItem {
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: i32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// The basket owned by a single buyer.
///
/// There is at most one basket per [`BuyerId`]; it is replaced as a whole,
/// never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBasket {
    pub buyer_id: BuyerId,
    pub items: Vec<BasketItem>,
}

impl CustomerBasket {
    /// Create an empty basket for `buyer_id`.
    #[must_use]
    pub const fn new(buyer_id: BuyerId) -> Self {
        Self {
            buyer_id,
            items: Vec::new(),
        }
    }

    /// Create a basket holding `items`.
    #[must_use]
    pub const fn with_items(buyer_id: BuyerId, items: Vec<BasketItem>) -> Self {
        Self { buyer_id, items }
    }

    /// Returns true if the basket has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Case-insensitive deserialization
// =============================================================================

/// Declares a field identifier enum whose names match case-insensitively.
/// Unrecognized names map to `Ignore`.
macro_rules! case_insensitive_fields {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        enum $name {
            $($variant,)+
            Ignore,
        }

        impl $name {
            const NAMES: &'static [&'static str] = &[$($wire),+];
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                struct FieldVisitor;

                impl Visitor<'_> for FieldVisitor {
                    type Value = $name;

                    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        f.write_str("a field identifier")
                    }

                    fn visit_str<E: de::Error>(self, value: &str) -> Result<$name, E> {
                        $(
                            if value.eq_ignore_ascii_case($wire) {
                                return Ok($name::$variant);
                            }
                        )+
                        Ok($name::Ignore)
                    }

                    fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<$name, E> {
                        match core::str::from_utf8(value) {
                            Ok(s) => self.visit_str(s),
                            Err(_) => Ok($name::Ignore),
                        }
                    }
                }

                deserializer.deserialize_identifier(FieldVisitor)
            }
        }
    };
}

case_insensitive_fields!(ItemField {
    ProductId => "productId",
    Quantity => "quantity",
});

case_insensitive_fields!(BasketField {
    BuyerId => "buyerId",
    Items => "items",
});

impl<'de> Deserialize<'de> for BasketItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ItemVisitor;

        impl<'de> Visitor<'de> for ItemVisitor {
            type Value = BasketItem;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a basket item")
            }

            fn visit_map<A>(self, mut map: A) -> Result<BasketItem, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut product_id: Option<ProductId> = None;
                let mut quantity: Option<i32> = None;

                while let Some(field) = map.next_key::<ItemField>()? {
                    match field {
                        ItemField::ProductId => {
                            if product_id.is_some() {
                                return Err(de::Error::duplicate_field("productId"));
                            }
                            product_id = Some(map.next_value()?);
                        }
                        ItemField::Quantity => {
                            if quantity.is_some() {
                                return Err(de::Error::duplicate_field("quantity"));
                            }
                            quantity = Some(map.next_value()?);
                        }
                        ItemField::Ignore => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }

                Ok(BasketItem {
                    product_id: product_id.ok_or_else(|| de::Error::missing_field("productId"))?,
                    quantity: quantity.ok_or_else(|| de::Error::missing_field("quantity"))?,
                })
            }
        }

        deserializer.deserialize_struct("BasketItem", ItemField::NAMES, ItemVisitor)
    }
}

impl<'de> Deserialize<'de> for CustomerBasket {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BasketVisitor;

        impl<'de> Visitor<'de> for BasketVisitor {
            type Value = CustomerBasket;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a customer basket")
            }

            fn visit_map<A>(self, mut map: A) -> Result<CustomerBasket, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut buyer_id: Option<BuyerId> = None;
                let mut items: Option<Vec<BasketItem>> = None;

                while let Some(field) = map.next_key::<BasketField>()? {
                    match field {
                        BasketField::BuyerId => {
                            if buyer_id.is_some() {
                                return Err(de::Error::duplicate_field("buyerId"));
                            }
                            buyer_id = Some(map.next_value()?);
                        }
                        BasketField::Items => {
                            if items.is_some() {
                                return Err(de::Error::duplicate_field("items"));
                            }
                            // A null list is read as empty.
                            items = Some(map.next_value::<Option<Vec<BasketItem>>>()?.unwrap_or_default());
                        }
                        BasketField::Ignore => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }

                Ok(CustomerBasket {
                    buyer_id: buyer_id.ok_or_else(|| de::Error::missing_field("buyerId"))?,
                    items: items.unwrap_or_default(),
                })
            }
        }

        deserializer.deserialize_struct("CustomerBasket", BasketField::NAMES, BasketVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn buyer(id: &str) -> BuyerId {
        BuyerId::parse(id).unwrap()
    }

    #[test]
    fn test_serializes_camel_case() {
        let basket = CustomerBasket::with_items(
            buyer("u1"),
            vec![BasketItem::new(ProductId::new(42), 3)],
        );

        let json = serde_json::to_string(&basket).unwrap();
        assert_eq!(
            json,
            r#"{"buyerId":"u1","items":[{"productId":42,"quantity":3}]}"#
        );
    }

    #[test]
    fn test_decodes_pascal_case() {
        let json = r#"{"BuyerId":"u1","Items":[{"ProductId":42,"Quantity":3}]}"#;
        let basket: CustomerBasket = serde_json::from_str(json).unwrap();

        assert_eq!(basket.buyer_id.as_str(), "u1");
        assert_eq!(basket.items, vec![BasketItem::new(ProductId::new(42), 3)]);
    }

    #[test]
    fn test_decodes_mixed_case() {
        let json = r#"{"BUYERID":"u1","iTeMs":[{"productid":1,"QUANTITY":0}]}"#;
        let basket: CustomerBasket = serde_json::from_str(json).unwrap();

        assert_eq!(basket.items.len(), 1);
        assert_eq!(basket.items[0].quantity, 0);
    }

    #[test]
    fn test_ignores_unknown_fields() {
        let json = r#"{
            "buyerId": "u1",
            "schemaVersion": 2,
            "items": [{"productId": 5, "quantity": 1, "unitPrice": {"amount": "9.99"}}],
            "updatedAt": null
        }"#;
        let basket: CustomerBasket = serde_json::from_str(json).unwrap();

        assert_eq!(basket.items, vec![BasketItem::new(ProductId::new(5), 1)]);
    }

    #[test]
    fn test_missing_items_is_empty() {
        let basket: CustomerBasket = serde_json::from_str(r#"{"buyerId":"u1"}"#).unwrap();
        assert!(basket.is_empty());

        let basket: CustomerBasket =
            serde_json::from_str(r#"{"buyerId":"u1","items":null}"#).unwrap();
        assert!(basket.is_empty());
    }

    #[test]
    fn test_missing_buyer_id_fails() {
        let result: Result<CustomerBasket, _> = serde_json::from_str(r#"{"items":[]}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("buyerId"), "unexpected error: {err}");
    }

    #[test]
    fn test_empty_buyer_id_fails() {
        let result: Result<CustomerBasket, _> =
            serde_json::from_str(r#"{"buyerId":"","items":[]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_item_field_fails() {
        let result: Result<CustomerBasket, _> =
            serde_json::from_str(r#"{"buyerId":"u1","items":[{"productId":1}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_field_differing_case_fails() {
        let result: Result<CustomerBasket, _> =
            serde_json::from_str(r#"{"buyerId":"u1","BuyerId":"u2"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_item_order_preserved() {
        let items = vec![
            BasketItem::new(ProductId::new(3), 1),
            BasketItem::new(ProductId::new(1), 2),
            BasketItem::new(ProductId::new(2), 3),
        ];
        let basket = CustomerBasket::with_items(buyer("u1"), items.clone());
        let json = serde_json::to_string(&basket).unwrap();
        let decoded: CustomerBasket = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.items, items);
    }
}
