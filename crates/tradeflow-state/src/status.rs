//! # Export Document Status
//!
//! Six statuses, two terminal, five legal edges. Everything not listed in
//! [`validate_transition`] is rejected, including self-loops and any edge
//! leaving a terminal status.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tradeflow_core::{ContractId, DocumentKind, TradeError};

// ─── Document Status ─────────────────────────────────────────────────

/// Lifecycle status of an export document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    /// Submitted by the exporter's bank. Initial status.
    SubmittedByEb,
    /// Accepted by the importer's bank.
    AcceptedByIb,
    /// Rejected by the importer's bank (terminal).
    RejectedByIb,
    /// Payment initiated by the importer's bank.
    PaymentInitiated,
    /// Payment in progress.
    #[serde(rename = "PAYMENT_INPROGRESS")]
    PaymentInProgress,
    /// Payment completed (terminal).
    PaymentCompleted,
}

impl DocumentStatus {
    /// Every status, initial first.
    pub const ALL: [DocumentStatus; 6] = [
        DocumentStatus::SubmittedByEb,
        DocumentStatus::AcceptedByIb,
        DocumentStatus::RejectedByIb,
        DocumentStatus::PaymentInitiated,
        DocumentStatus::PaymentInProgress,
        DocumentStatus::PaymentCompleted,
    ];

    /// Status assigned on submission.
    pub const INITIAL: DocumentStatus = DocumentStatus::SubmittedByEb;

    /// The stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubmittedByEb => "SUBMITTED_BY_EB",
            Self::AcceptedByIb => "ACCEPTED_BY_IB",
            Self::RejectedByIb => "REJECTED_BY_IB",
            Self::PaymentInitiated => "PAYMENT_INITIATED",
            Self::PaymentInProgress => "PAYMENT_INPROGRESS",
            Self::PaymentCompleted => "PAYMENT_COMPLETED",
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RejectedByIb | Self::PaymentCompleted)
    }

    /// Statuses reachable in one step.
    pub fn valid_transitions(&self) -> &'static [DocumentStatus] {
        match self {
            Self::SubmittedByEb => &[Self::AcceptedByIb, Self::RejectedByIb],
            Self::AcceptedByIb => &[Self::PaymentInitiated],
            Self::PaymentInitiated => &[Self::PaymentInProgress],
            Self::PaymentInProgress => &[Self::PaymentCompleted],
            Self::RejectedByIb | Self::PaymentCompleted => &[],
        }
    }

    /// The status an importer-bank acceptance moves to, if any.
    ///
    /// Acceptance walks the payment chain one step at a time; rejection is
    /// never reached this way.
    pub fn next_on_accept(&self) -> Option<DocumentStatus> {
        match self {
            Self::SubmittedByEb => Some(Self::AcceptedByIb),
            Self::AcceptedByIb => Some(Self::PaymentInitiated),
            Self::PaymentInitiated => Some(Self::PaymentInProgress),
            Self::PaymentInProgress => Some(Self::PaymentCompleted),
            Self::RejectedByIb | Self::PaymentCompleted => None,
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| StatusError::Unknown(s.to_string()))
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised by the status lifecycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// The pair is not one of the five legal edges.
    #[error("This state transition is not allowed: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: DocumentStatus,
        /// Attempted status.
        to: DocumentStatus,
    },

    /// The status is terminal; nothing follows it.
    #[error("document is in terminal status {0}")]
    TerminalState(DocumentStatus),

    /// The string is not a known status.
    #[error("unknown document status: {0:?}")]
    Unknown(String),
}

impl StatusError {
    /// Attach the document the rejection applies to.
    pub fn for_document(self, kind: DocumentKind, id: &ContractId) -> TradeError {
        match self {
            Self::Unknown(_) => TradeError::InvalidArgument(self.to_string()),
            Self::InvalidTransition { from, to } => TradeError::IllegalTransition {
                kind: kind.to_string(),
                id: id.to_string(),
                from: from.to_string(),
                to: to.to_string(),
            },
            Self::TerminalState(state) => TradeError::IllegalTransition {
                kind: kind.to_string(),
                id: id.to_string(),
                from: state.to_string(),
                to: "(none)".to_string(),
            },
        }
    }
}

// ─── Transition Table ────────────────────────────────────────────────

/// Validate a transition and return the target status.
pub fn validate_transition(
    from: DocumentStatus,
    to: DocumentStatus,
) -> Result<DocumentStatus, StatusError> {
    use DocumentStatus::*;
    match (from, to) {
        (SubmittedByEb, AcceptedByIb)
        | (SubmittedByEb, RejectedByIb)
        | (AcceptedByIb, PaymentInitiated)
        | (PaymentInitiated, PaymentInProgress)
        | (PaymentInProgress, PaymentCompleted) => Ok(to),
        _ => Err(StatusError::InvalidTransition { from, to }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_five_legal_edges() {
        let legal = DocumentStatus::ALL
            .iter()
            .flat_map(|from| DocumentStatus::ALL.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| validate_transition(*from, *to).is_ok())
            .count();
        assert_eq!(legal, 5);
    }

    #[test]
    fn table_agrees_with_valid_transitions() {
        for from in DocumentStatus::ALL {
            for to in DocumentStatus::ALL {
                assert_eq!(
                    validate_transition(from, to).is_ok(),
                    from.valid_transitions().contains(&to),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn self_loops_rejected() {
        for status in DocumentStatus::ALL {
            assert!(validate_transition(status, status).is_err());
        }
    }

    #[test]
    fn terminal_statuses_have_no_exits() {
        assert!(DocumentStatus::RejectedByIb.is_terminal());
        assert!(DocumentStatus::PaymentCompleted.is_terminal());
        assert!(DocumentStatus::RejectedByIb.valid_transitions().is_empty());
        assert!(DocumentStatus::PaymentCompleted.next_on_accept().is_none());
        assert!(!DocumentStatus::SubmittedByEb.is_terminal());
    }

    #[test]
    fn acceptance_walks_payment_chain() {
        let mut status = DocumentStatus::INITIAL;
        let mut seen = vec![status];
        while let Some(next) = status.next_on_accept() {
            validate_transition(status, next).unwrap();
            status = next;
            seen.push(status);
        }
        let names: Vec<_> = seen.iter().map(DocumentStatus::as_str).collect();
        assert_eq!(
            names,
            [
                "SUBMITTED_BY_EB",
                "ACCEPTED_BY_IB",
                "PAYMENT_INITIATED",
                "PAYMENT_INPROGRESS",
                "PAYMENT_COMPLETED"
            ]
        );
    }

    #[test]
    fn parse_matches_stored_strings() {
        for status in DocumentStatus::ALL {
            assert_eq!(status.as_str().parse::<DocumentStatus>().unwrap(), status);
        }
        assert_eq!(
            "PAYMENT_IN_PROGRESS".parse::<DocumentStatus>(),
            Err(StatusError::Unknown("PAYMENT_IN_PROGRESS".into()))
        );
    }

    #[test]
    fn serde_matches_display() {
        for status in DocumentStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn unknown_status_is_invalid_argument() {
        let id = ContractId::new("1000").unwrap();
        let err = StatusError::Unknown("SHIPPED".into())
            .for_document(DocumentKind::BillOfLading, &id);
        assert!(matches!(err, TradeError::InvalidArgument(_)));
    }

    #[test]
    fn rejection_names_document() {
        let id = ContractId::new("1001").unwrap();
        let err = StatusError::InvalidTransition {
            from: DocumentStatus::RejectedByIb,
            to: DocumentStatus::AcceptedByIb,
        }
        .for_document(DocumentKind::Invoice, &id);
        assert_eq!(
            err,
            TradeError::IllegalTransition {
                kind: "INVOICE".into(),
                id: "1001".into(),
                from: "REJECTED_BY_IB".into(),
                to: "ACCEPTED_BY_IB".into(),
            }
        );
    }

    proptest::proptest! {
        #[test]
        fn rejected_pairs_name_both_ends(a in 0usize..6, b in 0usize..6) {
            let (from, to) = (DocumentStatus::ALL[a], DocumentStatus::ALL[b]);
            if let Err(err) = validate_transition(from, to) {
                proptest::prop_assert_eq!(err, StatusError::InvalidTransition { from, to });
            }
        }
    }
}
