use crate::types::*;
use concordium_cis2::Cis2Event;
use concordium_std::{collections::BTreeMap, *};

// ---------------------------------------
// omi_token

/// Tag for the Approval event.
/// The CIS-2 events occupy the tags from 255 downwards.
pub const APPROVAL_EVENT_TAG: u8 = 1u8;
/// Tag for the Pause event.
pub const PAUSE_EVENT_TAG: u8 = 2u8;

/// Logged whenever an allowance is set or changed, with the resulting allowance.
#[derive(Debug, Serial, SchemaType, PartialEq, Eq)]
pub struct ApprovalEvent {
    pub owner: Address,
    pub spender: Address,
    pub amount: ContractTokenAmount,
}

#[derive(Debug, Serial, SchemaType, PartialEq, Eq)]
pub struct PauseEvent {
    pub paused: bool,
}

/// Tagged events of the token contract.
#[derive(Debug)]
pub enum TokenEvent {
    Cis2(Cis2Event<ContractTokenId, ContractTokenAmount>),
    Approval(ApprovalEvent),
    Pause(PauseEvent),
}

impl Serial for TokenEvent {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            // writes its own tag
            TokenEvent::Cis2(event) => event.serial(out),
            TokenEvent::Approval(event) => {
                out.write_u8(APPROVAL_EVENT_TAG)?;
                event.serial(out)
            }
            TokenEvent::Pause(event) => {
                out.write_u8(PAUSE_EVENT_TAG)?;
                event.serial(out)
            }
        }
    }
}

impl schema::SchemaType for TokenEvent {
    fn get_type() -> schema::Type {
        let mut event_map = match Cis2Event::<ContractTokenId, ContractTokenAmount>::get_type() {
            schema::Type::TaggedEnum(map) => map,
            _ => BTreeMap::new(),
        };
        event_map.insert(
            APPROVAL_EVENT_TAG,
            (
                "Approval".to_string(),
                schema::Fields::Named(vec![
                    (String::from("owner"), Address::get_type()),
                    (String::from("spender"), Address::get_type()),
                    (String::from("amount"), ContractTokenAmount::get_type()),
                ]),
            ),
        );
        event_map.insert(
            PAUSE_EVENT_TAG,
            (
                "Pause".to_string(),
                schema::Fields::Named(vec![(String::from("paused"), bool::get_type())]),
            ),
        );
        schema::Type::TaggedEnum(event_map)
    }
}

// ---------------------------------------
// omi_token_lock

/// Events of the lock ledger.
#[derive(Debug, Serial, SchemaType, PartialEq, Eq)]
pub enum LockEvent {
    Locked {
        beneficiary: Address,
        index: u32,
        amount: ContractTokenAmount,
        anchor: LockAnchor,
        duration: Duration,
    },
    Released {
        beneficiary: Address,
        index: u32,
        amount: ContractTokenAmount,
    },
    Revoked {
        beneficiary: Address,
        index: u32,
        amount: ContractTokenAmount,
    },
    CrowdsaleFinished {
        at: Timestamp,
    },
}

// ---------------------------------------
// omi_crowdsale

pub const PURCHASE_EVENT_TAG: u8 = 1u8;
pub const STAGE_ADVANCED_EVENT_TAG: u8 = 2u8;
pub const FINALIZED_EVENT_TAG: u8 = 3u8;
pub const RATE_UPDATED_EVENT_TAG: u8 = 4u8;

/// A token purchase. `rate` is the effective rate the tokens were priced at.
#[derive(Debug, Serial, SchemaType, PartialEq, Eq)]
pub struct PurchaseEvent {
    pub payer: Address,
    pub beneficiary: Address,
    pub value: Amount,
    pub tokens: u64,
    pub stage: Stage,
    pub rate: MicroCcd,
}

#[derive(Debug, Serial, SchemaType, PartialEq, Eq)]
pub struct StageAdvancedEvent {
    pub from: Stage,
    pub to: Stage,
}

#[derive(Debug, Serial, SchemaType, PartialEq, Eq)]
pub struct FinalizedEvent {
    pub at: Timestamp,
    pub tokens_sold: u64,
    pub usd_raised: UsdAmount,
}

#[derive(Debug, Serial, SchemaType, PartialEq, Eq)]
pub struct RateUpdatedEvent {
    pub old_rate: MicroCcd,
    pub new_rate: MicroCcd,
}

/// Tagged events of the crowdsale contract.
#[derive(Debug, PartialEq, Eq)]
pub enum SaleEvent {
    Purchase(PurchaseEvent),
    StageAdvanced(StageAdvancedEvent),
    Finalized(FinalizedEvent),
    RateUpdated(RateUpdatedEvent),
}

impl Serial for SaleEvent {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            SaleEvent::Purchase(event) => {
                out.write_u8(PURCHASE_EVENT_TAG)?;
                event.serial(out)
            }
            SaleEvent::StageAdvanced(event) => {
                out.write_u8(STAGE_ADVANCED_EVENT_TAG)?;
                event.serial(out)
            }
            SaleEvent::Finalized(event) => {
                out.write_u8(FINALIZED_EVENT_TAG)?;
                event.serial(out)
            }
            SaleEvent::RateUpdated(event) => {
                out.write_u8(RATE_UPDATED_EVENT_TAG)?;
                event.serial(out)
            }
        }
    }
}

impl schema::SchemaType for SaleEvent {
    fn get_type() -> schema::Type {
        let mut event_map = BTreeMap::new();
        event_map.insert(
            PURCHASE_EVENT_TAG,
            (
                "Purchase".to_string(),
                schema::Fields::Named(vec![
                    (String::from("payer"), Address::get_type()),
                    (String::from("beneficiary"), Address::get_type()),
                    (String::from("value"), Amount::get_type()),
                    (String::from("tokens"), u64::get_type()),
                    (String::from("stage"), Stage::get_type()),
                    (String::from("rate"), MicroCcd::get_type()),
                ]),
            ),
        );
        event_map.insert(
            STAGE_ADVANCED_EVENT_TAG,
            (
                "StageAdvanced".to_string(),
                schema::Fields::Named(vec![
                    (String::from("from"), Stage::get_type()),
                    (String::from("to"), Stage::get_type()),
                ]),
            ),
        );
        event_map.insert(
            FINALIZED_EVENT_TAG,
            (
                "Finalized".to_string(),
                schema::Fields::Named(vec![
                    (String::from("at"), Timestamp::get_type()),
                    (String::from("tokens_sold"), u64::get_type()),
                    (String::from("usd_raised"), UsdAmount::get_type()),
                ]),
            ),
        );
        event_map.insert(
            RATE_UPDATED_EVENT_TAG,
            (
                "RateUpdated".to_string(),
                schema::Fields::Named(vec![
                    (String::from("old_rate"), MicroCcd::get_type()),
                    (String::from("new_rate"), MicroCcd::get_type()),
                ]),
            ),
        );
        schema::Type::TaggedEnum(event_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concordium_cis2::{MintEvent, TokenIdUnit};
    use concordium_std::schema::SchemaType;

    #[test]
    fn test_token_event_tags() {
        let approval = TokenEvent::Approval(ApprovalEvent {
            owner: Address::Account(AccountAddress([1u8; 32])),
            spender: Address::Account(AccountAddress([2u8; 32])),
            amount: 10.into(),
        });
        assert_eq!(to_bytes(&approval)[0], APPROVAL_EVENT_TAG);

        let mint = TokenEvent::Cis2(Cis2Event::Mint(MintEvent {
            token_id: TokenIdUnit(),
            amount: 10.into(),
            owner: Address::Account(AccountAddress([1u8; 32])),
        }));
        assert_eq!(to_bytes(&mint)[0], concordium_cis2::MINT_EVENT_TAG);
    }

    #[test]
    fn test_token_event_schema_keeps_cis2_tags() {
        match TokenEvent::get_type() {
            schema::Type::TaggedEnum(map) => {
                assert!(map.contains_key(&concordium_cis2::TRANSFER_EVENT_TAG));
                assert!(map.contains_key(&concordium_cis2::MINT_EVENT_TAG));
                assert!(map.contains_key(&APPROVAL_EVENT_TAG));
                assert!(map.contains_key(&PAUSE_EVENT_TAG));
            }
            _ => panic!("event schema should be a tagged enum"),
        }
    }

    #[test]
    fn test_sale_event_tag() {
        let event = SaleEvent::StageAdvanced(StageAdvancedEvent {
            from: Stage::PreSale1,
            to: Stage::PreSale2,
        });
        assert_eq!(
            to_bytes(&event),
            vec![STAGE_ADVANCED_EVENT_TAG, 0u8, 1u8]
        );
    }
}
