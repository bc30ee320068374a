use crate::models::{FieldKind, ListingRecord};

/// Unit suffix stripped from size fields. Matched case-sensitively.
pub const SIZE_UNIT: &str = "sqft";

/// Strip formatting noise from a raw field value. Removal happens before
/// trimming so no boundary whitespace is left behind.
pub fn normalize(kind: FieldKind, raw: &str) -> String {
    match kind {
        FieldKind::Address => raw.to_string(),
        FieldKind::SalePrice => raw.replace('$', "").replace(',', "").trim().to_string(),
        FieldKind::HomeSizeSqft | FieldKind::LotSizeSqft => raw
            .replace(SIZE_UNIT, "")
            .replace(',', "")
            .trim()
            .to_string(),
    }
}

/// Absent stays absent.
pub fn normalize_opt(kind: FieldKind, raw: Option<&str>) -> Option<String> {
    raw.map(|value| normalize(kind, value))
}

impl ListingRecord {
    pub fn normalized(&self) -> ListingRecord {
        let mut record = ListingRecord::default();
        for kind in FieldKind::ALL {
            record.set_field(kind, normalize_opt(kind, self.field(kind)));
        }
        record
    }
}
