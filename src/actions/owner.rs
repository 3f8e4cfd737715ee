use crate::{
    ActionCall,
    abi::{self, ADD_OWNER_WITH_THRESHOLD},
    actions::ActionBuilder,
    error::ActionError,
};
use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::{Address, U256};
use tracing::debug;

/// `addOwnerWithThreshold(new_owner, threshold)` on every child
pub struct AddOwner {
    new_owner: Address,
    threshold: U256,
}

impl AddOwner {
    pub fn new(new_owner: Address, threshold: U256) -> Self {
        Self {
            new_owner,
            threshold,
        }
    }
}

#[async_trait]
impl ActionBuilder for AddOwner {
    async fn build(&self, parent: Address, child: Address) -> Result<Vec<ActionCall>, ActionError> {
        debug!(
            "addOwnerWithThreshold({:?}, {}) on {:?} from {:?}",
            self.new_owner, self.threshold, child, parent
        );
        let data = abi::encode_call(
            ADD_OWNER_WITH_THRESHOLD,
            &[Token::Address(self.new_owner), Token::Uint(self.threshold)],
        );
        Ok(vec![ActionCall::call(child, data)])
    }
}
