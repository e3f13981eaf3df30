//! Contract signing flow: read-gating and the admin/client signature
//! workflow around a [`SignatureImage`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::signature::SignatureImage;

/// Slack (in layout px) allowed between the scroll position and the true
/// bottom of the document.
pub const READ_SLACK: f64 = 50.0;

/// Tracks whether the signer has scrolled through the whole document.
///
/// Once satisfied it stays satisfied, even if the document later scrolls
/// back up or grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadGate {
    satisfied: bool,
}

impl ReadGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content that fits the viewport (within slack) counts as read.
    pub fn check_fits(&mut self, scroll_height: f64, client_height: f64) -> bool {
        if scroll_height <= client_height + READ_SLACK {
            self.satisfied = true;
        }
        self.satisfied
    }

    pub fn on_scroll(&mut self, scroll_top: f64, scroll_height: f64, client_height: f64) -> bool {
        if !self.satisfied && scroll_height - scroll_top <= client_height + READ_SLACK {
            debug!("contract read to the end");
            self.satisfied = true;
        }
        self.satisfied
    }

    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    #[default]
    Draft,
    SentToClient,
    Signed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerRole {
    Admin,
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("{role:?} cannot sign a contract in status {status:?}")]
    WrongStatus {
        role: SignerRole,
        status: ContractStatus,
    },
    #[error("the contract must be read to the end before signing")]
    Unread,
    #[error("{0:?} has not signed yet")]
    MissingSignature(SignerRole),
}

/// The state change produced by a successful submission, for the host to
/// persist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractUpdate {
    pub role: SignerRole,
    pub signature: SignatureImage,
    pub status: ContractStatus,
    /// Host clock at submission, in milliseconds since the epoch.
    pub at_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Contract {
    status: ContractStatus,
    admin_signature: Option<SignatureImage>,
    client_signature: Option<SignatureImage>,
    sent_at_ms: Option<u64>,
    signed_at_ms: Option<u64>,
    read_gate: ReadGate,
}

impl Contract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ContractStatus {
        self.status
    }

    pub fn read_gate(&self) -> &ReadGate {
        &self.read_gate
    }

    pub fn read_gate_mut(&mut self) -> &mut ReadGate {
        &mut self.read_gate
    }

    pub fn signature(&self, role: SignerRole) -> Option<&SignatureImage> {
        match role {
            SignerRole::Admin => self.admin_signature.as_ref(),
            SignerRole::Client => self.client_signature.as_ref(),
        }
    }

    pub fn sent_at_ms(&self) -> Option<u64> {
        self.sent_at_ms
    }

    pub fn signed_at_ms(&self) -> Option<u64> {
        self.signed_at_ms
    }

    /// Whether `role` may open the signature pad right now.
    pub fn can_sign(&self, role: SignerRole) -> Result<(), ContractError> {
        match (role, self.status) {
            (SignerRole::Admin, ContractStatus::Draft) => Ok(()),
            (SignerRole::Client, ContractStatus::SentToClient) => {
                if self.read_gate.is_satisfied() {
                    Ok(())
                } else {
                    Err(ContractError::Unread)
                }
            }
            (role, status) => Err(ContractError::WrongStatus { role, status }),
        }
    }

    /// Store (or replace) `role`'s signature.
    pub fn attach_signature(
        &mut self,
        role: SignerRole,
        image: SignatureImage,
    ) -> Result<(), ContractError> {
        self.can_sign(role).inspect_err(|err| warn!(%err, "signature rejected"))?;
        match role {
            SignerRole::Admin => self.admin_signature = Some(image),
            SignerRole::Client => self.client_signature = Some(image),
        }
        Ok(())
    }

    /// Advance the workflow with `role`'s signature: admin sends the
    /// draft to the client, the client finalizes it.
    pub fn submit(
        &mut self,
        role: SignerRole,
        at_ms: u64,
    ) -> Result<ContractUpdate, ContractError> {
        self.can_sign(role)?;
        let signature = self
            .signature(role)
            .cloned()
            .ok_or(ContractError::MissingSignature(role))?;

        let status = match role {
            SignerRole::Admin => {
                self.sent_at_ms = Some(at_ms);
                ContractStatus::SentToClient
            }
            SignerRole::Client => {
                self.signed_at_ms = Some(at_ms);
                ContractStatus::Signed
            }
        };
        debug!(?role, from = ?self.status, to = ?status, "contract advanced");
        self.status = status;
        Ok(ContractUpdate {
            role,
            signature,
            status,
            at_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(tag: u8) -> SignatureImage {
        SignatureImage {
            png: vec![tag],
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn read_gate_is_sticky() {
        let mut gate = ReadGate::new();
        assert!(!gate.on_scroll(0.0, 2000.0, 600.0));
        assert!(gate.on_scroll(1360.0, 2000.0, 600.0));
        assert!(gate.on_scroll(0.0, 2000.0, 600.0));
    }

    #[test]
    fn short_documents_count_as_read() {
        let mut gate = ReadGate::new();
        assert!(gate.check_fits(640.0, 600.0));
        let mut long = ReadGate::new();
        assert!(!long.check_fits(900.0, 600.0));
    }

    #[test]
    fn full_workflow() {
        let mut contract = Contract::new();
        assert_eq!(
            contract.submit(SignerRole::Admin, 1).unwrap_err(),
            ContractError::MissingSignature(SignerRole::Admin)
        );

        contract.attach_signature(SignerRole::Admin, sig(1)).unwrap();
        // re-signing replaces
        contract.attach_signature(SignerRole::Admin, sig(2)).unwrap();
        let sent = contract.submit(SignerRole::Admin, 100).unwrap();
        assert_eq!(sent.status, ContractStatus::SentToClient);
        assert_eq!(sent.signature.png, vec![2]);
        assert_eq!(contract.sent_at_ms(), Some(100));

        assert_eq!(
            contract.attach_signature(SignerRole::Client, sig(3)),
            Err(ContractError::Unread)
        );
        contract.read_gate_mut().on_scroll(1400.0, 2000.0, 600.0);
        contract.attach_signature(SignerRole::Client, sig(3)).unwrap();
        let signed = contract.submit(SignerRole::Client, 200).unwrap();
        assert_eq!(signed.status, ContractStatus::Signed);
        assert_eq!(contract.signed_at_ms(), Some(200));
    }

    #[test]
    fn roles_are_bound_to_status() {
        let mut contract = Contract::new();
        contract.read_gate_mut().check_fits(10.0, 600.0);
        assert!(matches!(
            contract.can_sign(SignerRole::Client),
            Err(ContractError::WrongStatus { .. })
        ));
        contract.attach_signature(SignerRole::Admin, sig(1)).unwrap();
        contract.submit(SignerRole::Admin, 5).unwrap();
        assert!(matches!(
            contract.attach_signature(SignerRole::Admin, sig(9)),
            Err(ContractError::WrongStatus { .. })
        ));
    }

    #[test]
    fn update_serializes_snake_case() {
        let mut contract = Contract::new();
        contract.attach_signature(SignerRole::Admin, sig(1)).unwrap();
        let update = contract.submit(SignerRole::Admin, 7).unwrap();
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["status"], "sent_to_client");
        assert_eq!(json["role"], "admin");
    }
}
