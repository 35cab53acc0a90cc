//! # Document Kinds
//!
//! The closed set of documents a trade carries. Each kind owns one ledger
//! table; the export kinds (bill of lading, invoice, packing list) share a
//! single status lifecycle and move together.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TradeError;

/// A trade document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Purchase order, submitted at trade initiation.
    #[serde(rename = "PO")]
    PurchaseOrder,
    /// Bill of lading. Its status is reported as the contract status.
    #[serde(rename = "BL")]
    BillOfLading,
    /// Commercial invoice.
    #[serde(rename = "INVOICE")]
    Invoice,
    /// Packing list.
    #[serde(rename = "PACKINGLIST")]
    PackingList,
}

impl DocumentKind {
    /// Export documents in fan-out order.
    pub const EXPORT: [DocumentKind; 3] = [
        DocumentKind::BillOfLading,
        DocumentKind::Invoice,
        DocumentKind::PackingList,
    ];

    /// Every kind, purchase order first.
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::PurchaseOrder,
        DocumentKind::BillOfLading,
        DocumentKind::Invoice,
        DocumentKind::PackingList,
    ];

    /// Wire tag used by the query surface (`getED` docType).
    pub fn tag(&self) -> &'static str {
        match self {
            Self::PurchaseOrder => "PO",
            Self::BillOfLading => "BL",
            Self::Invoice => "INVOICE",
            Self::PackingList => "PACKINGLIST",
        }
    }

    /// Name of the ledger table holding rows of this kind.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::PurchaseOrder => "POTable",
            Self::BillOfLading => "BLTable",
            Self::Invoice => "invoiceTable",
            Self::PackingList => "PLTable",
        }
    }

    /// Whether this kind follows the export document lifecycle.
    pub fn is_export(&self) -> bool {
        !matches!(self, Self::PurchaseOrder)
    }

    /// Parse a `getED` document type. Only export kinds are accepted.
    pub fn parse_export(s: &str) -> Result<Self, TradeError> {
        match s.parse::<Self>() {
            Ok(kind) if kind.is_export() => Ok(kind),
            _ => Err(TradeError::InvalidArgument(
                "Document type should be BL or INVOICE or PACKINGLIST".to_string(),
            )),
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DocumentKind {
    type Err = TradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| TradeError::InvalidArgument(format!("unknown document kind: {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_back() {
        for kind in DocumentKind::ALL {
            assert_eq!(kind.tag().parse::<DocumentKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parse_export_rejects_purchase_order() {
        assert!(DocumentKind::parse_export("PO").is_err());
        assert!(DocumentKind::parse_export("LC").is_err());
        assert_eq!(
            DocumentKind::parse_export("INVOICE").unwrap(),
            DocumentKind::Invoice
        );
    }

    #[test]
    fn table_names_are_distinct() {
        let mut names: Vec<_> = DocumentKind::ALL.iter().map(|k| k.table_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn export_order_is_bl_invoice_packing_list() {
        let tags: Vec<_> = DocumentKind::EXPORT.iter().map(|k| k.tag()).collect();
        assert_eq!(tags, ["BL", "INVOICE", "PACKINGLIST"]);
    }

    #[test]
    fn serde_uses_wire_tags() {
        let json = serde_json::to_string(&DocumentKind::PackingList).unwrap();
        assert_eq!(json, "\"PACKINGLIST\"");
    }
}
