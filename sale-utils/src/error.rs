use concordium_cis2::Cis2Error;
use concordium_std::{
    num, CallContractError, LogError, ParseError, Reject, SchemaType, Serialize, UnwrapAbort,
};
use core::num::TryFromIntError;

pub type ContractResult<A> = Result<A, ContractError>;

pub type ContractError = Cis2Error<CustomContractError>;

/// The different errors the contracts can produce.
#[derive(Serialize, Debug, PartialEq, Eq, Reject, SchemaType)]
pub enum CustomContractError {
    #[from(ParseError)]
    ParseParams, //1
    LogFull,                //
    LogMalformed,           //
    OverflowError,          //
    InvokeContractError,    //5
    AmountTooLarge,         //
    MissingAccount,         //
    MissingContract,        //
    MissingEntrypoint,      //
    MessageFailed,          //10
    Trap,                   //
    TransferError,          //
    ContractPaused,         //
    ContractNotPaused,      //
    ContractOnly,           //15
    InvalidInput,           //
    CapExceeded,            //
    InsufficientAllowance,  //
    NoLocks,                //
    LockNotFound,           //20
    AlreadyReleased,        //
    AlreadyRevoked,         //
    AlreadyMatured,         //
    AlreadyFinished,        //
    InsufficientDeposit,    //25
    InvalidIndexRange,      //
    SaleFinalized,          //
    SaleNotStarted,         //
    SaleNotClosed,          //
    NotWhitelisted,         //30
    BeneficiaryMismatch,    //
    BelowMinimumPurchase,   //
    AboveMaximumPurchase,   //
    StageCapExceeded,       //
    InvalidRate,            //35
    InvalidStage,           //
    InvalidSchedule,        //
}

impl From<CustomContractError> for ContractError {
    fn from(c: CustomContractError) -> Self {
        Cis2Error::Custom(c)
    }
}

impl From<LogError> for CustomContractError {
    #[inline(always)]
    fn from(le: LogError) -> Self {
        match le {
            LogError::Full => Self::LogFull,
            LogError::Malformed => Self::LogMalformed,
        }
    }
}

impl<T> From<CallContractError<T>> for CustomContractError {
    fn from(cce: CallContractError<T>) -> Self {
        match cce {
            CallContractError::AmountTooLarge => Self::AmountTooLarge,
            CallContractError::MissingAccount => Self::MissingAccount,
            CallContractError::MissingContract => Self::MissingContract,
            CallContractError::MissingEntrypoint => Self::MissingEntrypoint,
            CallContractError::MessageFailed => Self::MessageFailed,
            CallContractError::Trap => Self::Trap,
            CallContractError::LogicReject {
                reason: _,
                return_value: _,
            } => Self::InvokeContractError,
        }
    }
}

impl From<TryFromIntError> for CustomContractError {
    #[inline(always)]
    fn from(_: TryFromIntError) -> Self {
        Self::OverflowError
    }
}
