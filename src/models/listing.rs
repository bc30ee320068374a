use serde::Serialize;
use std::fmt;

/// Output columns, in file order.
pub const CSV_COLUMNS: [&str; 4] = ["address", "sale_price", "home_size_sqft", "lot_size_sqft"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Address,
    SalePrice,
    HomeSizeSqft,
    LotSizeSqft,
}

impl FieldKind {
    pub const ALL: [FieldKind; 4] = [
        FieldKind::Address,
        FieldKind::SalePrice,
        FieldKind::HomeSizeSqft,
        FieldKind::LotSizeSqft,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            FieldKind::Address => "address",
            FieldKind::SalePrice => "sale_price",
            FieldKind::HomeSizeSqft => "home_size_sqft",
            FieldKind::LotSizeSqft => "lot_size_sqft",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// One listing as it leaves a page. The same shape is used before and after
/// normalization; every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListingRecord {
    pub address: Option<String>,
    pub sale_price: Option<String>,
    pub home_size_sqft: Option<String>,
    pub lot_size_sqft: Option<String>,
}

impl ListingRecord {
    pub fn field(&self, kind: FieldKind) -> Option<&str> {
        match kind {
            FieldKind::Address => self.address.as_deref(),
            FieldKind::SalePrice => self.sale_price.as_deref(),
            FieldKind::HomeSizeSqft => self.home_size_sqft.as_deref(),
            FieldKind::LotSizeSqft => self.lot_size_sqft.as_deref(),
        }
    }

    pub fn set_field(&mut self, kind: FieldKind, value: Option<String>) {
        match kind {
            FieldKind::Address => self.address = value,
            FieldKind::SalePrice => self.sale_price = value,
            FieldKind::HomeSizeSqft => self.home_size_sqft = value,
            FieldKind::LotSizeSqft => self.lot_size_sqft = value,
        }
    }
}

/// What the extractor found on a single page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtract {
    pub listings: Vec<ListingRecord>,
    /// Raw link attribute, not yet resolved against the page URL.
    pub next_page: Option<String>,
}
